//! Advisory orchestration: retrieval followed by answer generation.

use tracing::instrument;

use uian_core::Result;

use crate::answer::AnswerGenerator;
use crate::context::ContextRetriever;

/// Stateless request/response pipeline behind the chat endpoint.
///
/// Sequences the context retriever (never fails) and the answer generator
/// (failures propagate to the caller). Keeps no cross-call state; chat
/// history display is the caller's concern.
pub struct CaseAdvisor {
    retriever: ContextRetriever,
    generator: AnswerGenerator,
}

impl CaseAdvisor {
    /// Create a new advisor from its two stages.
    pub fn new(retriever: ContextRetriever, generator: AnswerGenerator) -> Self {
        Self {
            retriever,
            generator,
        }
    }

    /// Answer a free-text clinical question, grounded in similar past
    /// cases when retrieval produces any.
    #[instrument(skip(self, question), fields(subsystem = "rag", component = "advisor", op = "answer_question"))]
    pub async fn answer_question(&self, question: &str) -> Result<String> {
        let context = self.retriever.retrieve(question).await;
        self.generator.generate(question, &context).await
    }
}
