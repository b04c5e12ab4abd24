use super::*;
use crate::config::GenerationConfig;
use crate::llm::ChatRole;

#[test]
fn client_configuration() {
    let config = GenerationConfig {
        endpoint: "https://llm.test:9000".to_string(),
        model: "test-chat-model".to_string(),
        temperature: 0.5,
        max_tokens: 512,
        ..GenerationConfig::default()
    };
    let client = GroqClient::new(&config, "test-key").expect("Failed to create client");

    assert_eq!(client.model, "test-chat-model");
    assert_eq!(client.max_tokens, 512);
    assert_eq!(client.base_url.host_str(), Some("llm.test"));
    assert_eq!(client.base_url.port(), Some(9000));
    assert_eq!(client.retry_attempts, crate::http::DEFAULT_RETRY_ATTEMPTS);
}

#[test]
fn client_builder_methods() {
    let config = GenerationConfig::default();
    let client = GroqClient::new(&config, "test-key")
        .expect("Failed to create client")
        .with_timeout(std::time::Duration::from_secs(90))
        .with_retry_attempts(1);

    assert_eq!(client.retry_attempts, 1);
}

#[test]
fn chat_request_shape() {
    let messages = vec![
        ChatMessage::system("You answer from context."),
        ChatMessage::user("What is the travel policy?"),
    ];
    let request = ChatCompletionRequest {
        model: "llama-3.3-70b-versatile",
        messages: &messages,
        temperature: 0.2,
        max_tokens: 1024,
    };

    let json: serde_json::Value =
        serde_json::from_str(&serde_json::to_string(&request).expect("should serialize"))
            .expect("should parse");

    assert_eq!(json["model"], "llama-3.3-70b-versatile");
    assert_eq!(json["messages"][0]["role"], "system");
    assert_eq!(json["messages"][1]["role"], "user");
    assert_eq!(json["messages"][1]["content"], "What is the travel policy?");
}

#[test]
fn chat_response_parsing() {
    let body = r#"{
        "id": "chatcmpl-123",
        "choices": [
            {
                "index": 0,
                "message": {"role": "assistant", "content": "Flights are booked centrally."},
                "finish_reason": "stop"
            }
        ]
    }"#;

    let response: ChatCompletionResponse = serde_json::from_str(body).expect("should parse");

    assert_eq!(response.choices.len(), 1);
    assert_eq!(response.choices[0].message.role, ChatRole::Assistant);
    assert_eq!(
        response.choices[0].message.content,
        "Flights are booked centrally."
    );
}
