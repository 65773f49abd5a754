//! Core traits for uian abstractions.
//!
//! These traits define the seams between the advisory pipeline and its
//! external collaborators (case store, vector search, AI providers),
//! enabling pluggable backends and testability with substituted fakes.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// CASE REPOSITORY TRAITS
// =============================================================================

/// Repository for clinical case CRUD operations.
#[async_trait]
pub trait CaseRepository: Send + Sync {
    /// Insert a new case. Assigns id and case number; returns the id.
    async fn insert(&self, req: CreateCaseRequest) -> Result<Uuid>;

    /// Fetch a full case by id.
    async fn fetch(&self, id: Uuid) -> Result<ClinicalCase>;

    /// List cases with pagination, newest first.
    async fn list(&self, req: ListCasesRequest) -> Result<ListCasesResponse>;

    /// Update mutable fields of a case. Identity columns are never touched.
    async fn update(&self, id: Uuid, req: UpdateCaseRequest) -> Result<()>;

    /// Permanently delete a case. There is no recovery.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Every case whose embedding is null, oldest first.
    /// Used by the batch embedding sync.
    async fn list_missing_embedding(&self) -> Result<Vec<ClinicalCase>>;

    /// Replace the stored embedding for a case. Writes only the vector
    /// column; concurrent writers are last-write-wins.
    async fn update_embedding(&self, id: Uuid, vector: &Vector) -> Result<()>;
}

// =============================================================================
// SIMILARITY SEARCH TRAITS
// =============================================================================

/// Vector similarity search over stored case embeddings.
#[async_trait]
pub trait CaseSearchRepository: Send + Sync {
    /// Return cases whose embedding's cosine similarity to `query_vec` is
    /// at least `threshold`, ordered by descending similarity, capped at
    /// `limit`, each annotated with its score.
    async fn find_similar(
        &self,
        query_vec: &Vector,
        threshold: f32,
        limit: i64,
    ) -> Result<Vec<CaseMatch>>;
}

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for generating text embeddings.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Generate embeddings for the given texts.
    ///
    /// Returns a vector of embedding vectors, one per input text.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>>;

    /// Get the expected dimension of embedding vectors.
    fn dimension(&self) -> usize;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Backend for single-turn text generation (LLM).
///
/// The provider keeps no conversation state; callers resend full context
/// on every call.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate a completion for `user` under the given system instruction,
    /// bounded to `max_tokens` of output.
    async fn complete(&self, system: &str, user: &str, max_tokens: u32) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}
