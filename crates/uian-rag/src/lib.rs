//! # uian-rag
//!
//! The retrieval-augmented advisory pipeline: embedding sync for case
//! records, similar-case retrieval with context rendering, answer
//! generation, and the orchestrator the HTTP layer calls.
//!
//! Control flow: question → [`ContextRetriever`] → (embedding provider,
//! vector search) → [`AnswerGenerator`] → answer. Retrieval is best-effort
//! and never prevents an answer from being attempted.

pub mod advisor;
pub mod answer;
pub mod context;
pub mod sync;

pub use advisor::CaseAdvisor;
pub use answer::{build_system_instruction, AnswerGenerator};
pub use context::ContextRetriever;
pub use sync::EmbeddingSync;
