#[cfg(test)]
mod tests;

use std::fmt::Write;

use crate::chat::memory::ConversationMemory;
use crate::config::GenerationConfig;
use crate::llm::ChatMessage;
use crate::retrieval::RetrievedChunk;

const EMPTY_CONTEXT_NOTICE: &str = "(no matching context was found in the selected documents)";

/// Grounding-prompt wording, taken from configuration so persona and
/// fallback sentence are deployment choices rather than code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub persona: String,
    pub fallback_sentence: String,
}

impl PromptTemplate {
    #[inline]
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            persona: config.system_prompt.clone(),
            fallback_sentence: config.fallback_sentence.clone(),
        }
    }

    /// Assemble the full message sequence for one question: grounding
    /// instructions with the retrieved context, the remembered
    /// conversation turns, then the question itself.
    ///
    /// Each input is an explicit field of the assembly; nothing is spliced
    /// into the question string.
    #[inline]
    pub fn build_messages(
        &self,
        history: &ConversationMemory,
        context: &[RetrievedChunk],
        question: &str,
    ) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.turns().count() + 2);

        messages.push(ChatMessage::system(self.render_instructions(context)));
        messages.extend(history.turns().cloned());
        messages.push(ChatMessage::user(question));

        messages
    }

    fn render_instructions(&self, context: &[RetrievedChunk]) -> String {
        let mut instructions = String::new();

        instructions.push_str(&self.persona);
        instructions.push_str("\nAnswer based ONLY on the context provided below.\n");
        let _ = write!(
            instructions,
            "If the answer is not in the context, say: '{}'\n",
            self.fallback_sentence
        );
        instructions.push_str("Do not make up information.\n\nContext:\n");

        if context.is_empty() {
            instructions.push_str(EMPTY_CONTEXT_NOTICE);
        } else {
            for (i, chunk) in context.iter().enumerate() {
                if i > 0 {
                    instructions.push_str("\n\n");
                }
                let _ = write!(
                    instructions,
                    "[{}, page {}]\n{}",
                    chunk.doc_name, chunk.page, chunk.content
                );
            }
        }

        instructions
    }
}
