use super::*;
use crate::llm::ChatRole;

fn template() -> PromptTemplate {
    PromptTemplate {
        persona: "You are a company policy assistant.".to_string(),
        fallback_sentence: "I could not find this in the selected documents.".to_string(),
    }
}

fn chunk(doc_name: &str, page: u32, content: &str) -> RetrievedChunk {
    RetrievedChunk {
        content: content.to_string(),
        doc_name: doc_name.to_string(),
        source: format!("data/{}.pdf", doc_name),
        page,
        score: 0.9,
    }
}

#[test]
fn system_message_comes_first_and_question_last() {
    let history = ConversationMemory::new(3);
    let context = vec![chunk("Travel Policy", 2, "Flights are booked centrally.")];

    let messages = template().build_messages(&history, &context, "How are flights booked?");

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, ChatRole::System);
    assert_eq!(messages[1].role, ChatRole::User);
    assert_eq!(messages[1].content, "How are flights booked?");
}

#[test]
fn instructions_contain_fallback_sentence_verbatim() {
    let history = ConversationMemory::new(3);

    let messages = template().build_messages(&history, &[], "Anything?");

    assert!(
        messages[0]
            .content
            .contains("I could not find this in the selected documents.")
    );
}

#[test]
fn context_blocks_carry_provenance() {
    let history = ConversationMemory::new(3);
    let context = vec![
        chunk("Travel Policy", 2, "Flights are booked centrally."),
        chunk("Remote Work", 1, "Two office days per week."),
    ];

    let messages = template().build_messages(&history, &context, "Question?");
    let system = &messages[0].content;

    assert!(system.contains("[Travel Policy, page 2]"));
    assert!(system.contains("Flights are booked centrally."));
    assert!(system.contains("[Remote Work, page 1]"));
    assert!(system.contains("Two office days per week."));
}

#[test]
fn empty_context_is_stated_explicitly() {
    let history = ConversationMemory::new(3);

    let messages = template().build_messages(&history, &[], "Question?");

    assert!(messages[0].content.contains(EMPTY_CONTEXT_NOTICE));
}

#[test]
fn history_is_replayed_between_system_and_question() {
    let mut history = ConversationMemory::new(3);
    history.append_exchange("What is the travel policy?", "Flights are booked centrally.");

    let messages = template().build_messages(&history, &[], "And for trains?");

    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0].role, ChatRole::System);
    assert_eq!(messages[1].role, ChatRole::User);
    assert_eq!(messages[1].content, "What is the travel policy?");
    assert_eq!(messages[2].role, ChatRole::Assistant);
    assert_eq!(messages[3].content, "And for trains?");
}

#[test]
fn persona_is_configurable() {
    let custom = PromptTemplate {
        persona: "You are an HR benefits specialist.".to_string(),
        fallback_sentence: "Not covered by these documents.".to_string(),
    };
    let history = ConversationMemory::new(3);

    let messages = custom.build_messages(&history, &[], "Question?");

    assert!(messages[0].content.starts_with("You are an HR benefits specialist."));
    assert!(messages[0].content.contains("Not covered by these documents."));
}
