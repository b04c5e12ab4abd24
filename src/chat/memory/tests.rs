use super::*;
use crate::llm::ChatRole;

#[test]
fn appends_in_order() {
    let mut memory = ConversationMemory::new(3);
    memory.append_exchange("first question", "first answer");
    memory.append_exchange("second question", "second answer");

    let turns: Vec<&ChatMessage> = memory.turns().collect();

    assert_eq!(turns.len(), 4);
    assert_eq!(turns[0].role, ChatRole::User);
    assert_eq!(turns[0].content, "first question");
    assert_eq!(turns[1].role, ChatRole::Assistant);
    assert_eq!(turns[1].content, "first answer");
    assert_eq!(turns[3].content, "second answer");
}

#[test]
fn evicts_oldest_exchange_beyond_window() {
    let mut memory = ConversationMemory::new(3);
    for i in 1..=4 {
        memory.append_exchange(&format!("question {}", i), &format!("answer {}", i));
    }

    assert_eq!(memory.exchanges(), 3);

    let turns: Vec<&ChatMessage> = memory.turns().collect();
    assert_eq!(turns[0].content, "question 2");
    assert_eq!(turns.last().expect("has turns").content, "answer 4");
    assert!(turns.iter().all(|t| !t.content.contains('1')));
}

#[test]
fn window_of_one_keeps_only_latest() {
    let mut memory = ConversationMemory::new(1);
    memory.append_exchange("old", "old answer");
    memory.append_exchange("new", "new answer");

    let turns: Vec<&ChatMessage> = memory.turns().collect();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].content, "new");
}

#[test]
fn clear_empties_memory() {
    let mut memory = ConversationMemory::new(3);
    memory.append_exchange("question", "answer");
    assert!(!memory.is_empty());

    memory.clear();

    assert!(memory.is_empty());
    assert_eq!(memory.exchanges(), 0);
}
