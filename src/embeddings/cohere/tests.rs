use super::*;
use crate::config::EmbeddingConfig;

#[test]
fn client_configuration() {
    let config = EmbeddingConfig {
        endpoint: "https://embed.test:8443".to_string(),
        model: "test-embed-model".to_string(),
        dimension: 256,
        batch_size: 32,
    };
    let client = CohereClient::new(&config, "test-key").expect("Failed to create client");

    assert_eq!(client.model, "test-embed-model");
    assert_eq!(client.batch_size, 32);
    assert_eq!(client.base_url.host_str(), Some("embed.test"));
    assert_eq!(client.base_url.port(), Some(8443));
    assert_eq!(client.retry_attempts, crate::http::DEFAULT_RETRY_ATTEMPTS);
}

#[test]
fn client_builder_methods() {
    let config = EmbeddingConfig::default();
    let client = CohereClient::new(&config, "test-key")
        .expect("Failed to create client")
        .with_timeout(std::time::Duration::from_secs(60))
        .with_retry_attempts(5);

    assert_eq!(client.retry_attempts, 5);
}

#[test]
fn input_type_serialization() {
    assert_eq!(
        serde_json::to_string(&InputType::SearchDocument).expect("should serialize"),
        "\"search_document\""
    );
    assert_eq!(
        serde_json::to_string(&InputType::SearchQuery).expect("should serialize"),
        "\"search_query\""
    );
}

#[test]
fn embed_request_shape() {
    let texts = vec!["first".to_string(), "second".to_string()];
    let request = EmbedRequest {
        model: "embed-english-v3.0",
        texts: &texts,
        input_type: InputType::SearchDocument,
        truncate: "END",
    };

    let json: serde_json::Value =
        serde_json::from_str(&serde_json::to_string(&request).expect("should serialize"))
            .expect("should parse");

    assert_eq!(json["model"], "embed-english-v3.0");
    assert_eq!(json["input_type"], "search_document");
    assert_eq!(json["texts"].as_array().expect("texts array").len(), 2);
}

#[test]
fn empty_document_batch_is_a_no_op() {
    let config = EmbeddingConfig::default();
    let client = CohereClient::new(&config, "test-key").expect("Failed to create client");

    let vectors = client.embed_documents(&[]).expect("should succeed");
    assert!(vectors.is_empty());
}
