//! # uian-inference
//!
//! AI provider clients for uian: the OpenAI embeddings API behind
//! `EmbeddingBackend` and the Anthropic messages API behind
//! `GenerationBackend`, plus deterministic mocks for tests.

pub mod claude;
pub mod mock;
pub mod openai;

pub use claude::{ClaudeBackend, ClaudeConfig};
pub use mock::{MockEmbeddingBackend, MockGenerationBackend, MockVectorGenerator};
pub use openai::{OpenAiBackend, OpenAiConfig};
