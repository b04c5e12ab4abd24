// Chat session orchestration
// One question flows retrieve → generate; memory is a session-local side
// effect of successful generation


pub mod memory;
pub mod prompt;

use tracing::debug;

use crate::llm::groq::GroqClient;
use crate::retrieval::{RetrievedChunk, Retriever};
use crate::{DocChatError, Result};

pub use memory::ConversationMemory;
pub use prompt::PromptTemplate;

/// Characters of chunk text shown in a citation
const EXCERPT_CHARS: usize = 200;

/// A per-session pipeline context: retriever policy, LLM client, prompt
/// wording, and conversation memory. Sessions are never shared; the
/// process-wide clients are created once and moved in here.
pub struct ChatSession {
    retriever: Retriever,
    llm: GroqClient,
    prompt: PromptTemplate,
    memory: ConversationMemory,
}

/// The answer to one question plus the chunks that grounded it
#[derive(Debug, Clone, PartialEq)]
pub struct ChatAnswer {
    pub answer: String,
    pub sources: Vec<SourceCitation>,
}

/// Provenance of a retrieved chunk for display alongside the answer
#[derive(Debug, Clone, PartialEq)]
pub struct SourceCitation {
    pub doc_name: String,
    pub page: u32,
    pub excerpt: String,
    pub score: f32,
}

impl SourceCitation {
    #[inline]
    pub fn from_chunk(chunk: &RetrievedChunk) -> Self {
        let mut excerpt: String = chunk.content.chars().take(EXCERPT_CHARS).collect();
        if chunk.content.chars().count() > EXCERPT_CHARS {
            excerpt.push_str("...");
        }

        Self {
            doc_name: chunk.doc_name.clone(),
            page: chunk.page,
            excerpt,
            score: chunk.score,
        }
    }
}

impl ChatSession {
    #[inline]
    pub fn new(
        retriever: Retriever,
        llm: GroqClient,
        prompt: PromptTemplate,
        memory_window: usize,
    ) -> Self {
        Self {
            retriever,
            llm,
            prompt,
            memory: ConversationMemory::new(memory_window),
        }
    }

    #[inline]
    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Retrieval phase: fetch the chunks grounding this question.
    /// An empty result is valid; the prompt handles it.
    #[inline]
    pub async fn retrieve(&self, question: &str) -> Result<Vec<RetrievedChunk>> {
        self.retriever.retrieve(question).await
    }

    /// Generation phase: build the grounding prompt from the retrieved
    /// context and the conversation so far, call the LLM once, and record
    /// the exchange. Memory is only updated on success, so a failed turn
    /// can be retried cleanly.
    #[inline]
    pub fn generate(&mut self, question: &str, context: &[RetrievedChunk]) -> Result<String> {
        debug!(
            "Generating answer with {} context chunks and {} remembered exchanges",
            context.len(),
            self.memory.exchanges()
        );

        let messages = self.prompt.build_messages(&self.memory, context, question);

        let answer = self
            .llm
            .chat(&messages)
            .map_err(|e| DocChatError::Generation(e.to_string()))?;

        self.memory.append_exchange(question, &answer);

        Ok(answer)
    }

    /// Process one question to completion: retrieve, generate, cite.
    /// The citations list every chunk supplied as context, whether or not
    /// the model drew on it.
    #[inline]
    pub async fn ask(&mut self, question: &str) -> Result<ChatAnswer> {
        let retrieved = self.retrieve(question).await?;
        let answer = self.generate(question, &retrieved)?;

        Ok(ChatAnswer {
            answer,
            sources: retrieved.iter().map(SourceCitation::from_chunk).collect(),
        })
    }
}
