//! Embedding synchronization for case records.
//!
//! Embedding is decoupled from the CRUD write path: callers trigger a sync
//! after a save (or run the batch) and a slow or failing provider never
//! blocks a user's save action. Vectors are therefore eventually consistent
//! with case content, not transactionally consistent.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use uian_core::{
    normalize, CaseRepository, ClinicalCase, EmbedBatchReport, EmbeddingBackend, Error, Result,
};

/// Computes and persists embeddings for case records.
pub struct EmbeddingSync {
    cases: Arc<dyn CaseRepository>,
    embedder: Option<Arc<dyn EmbeddingBackend>>,
}

impl EmbeddingSync {
    /// Create a new sync service. `embedder` is `None` when no embedding
    /// provider is configured; every sync operation then fails with a
    /// configuration error.
    pub fn new(
        cases: Arc<dyn CaseRepository>,
        embedder: Option<Arc<dyn EmbeddingBackend>>,
    ) -> Self {
        Self { cases, embedder }
    }

    /// Whether an embedding provider is configured.
    pub fn is_configured(&self) -> bool {
        self.embedder.is_some()
    }

    fn embedder(&self) -> Result<&Arc<dyn EmbeddingBackend>> {
        self.embedder
            .as_ref()
            .ok_or_else(|| Error::Config("OPENAI_API_KEY is not set".to_string()))
    }

    /// Normalize, embed, and persist the vector for one case. The single
    /// write happens last, so a provider or store failure leaves the record
    /// and any prior embedding unchanged.
    async fn embed_and_store(
        &self,
        embedder: &Arc<dyn EmbeddingBackend>,
        case: &ClinicalCase,
    ) -> Result<()> {
        let text = normalize(case);
        let vectors = embedder.embed_texts(&[text]).await?;
        let vector = vectors
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("Provider returned no vector".to_string()))?;
        self.cases.update_embedding(case.id, &vector).await
    }

    /// Recompute the embedding for a single case.
    #[instrument(skip(self), fields(subsystem = "rag", component = "embedding_sync", op = "embed_case", case_id = %case_id))]
    pub async fn embed_case(&self, case_id: Uuid) -> Result<()> {
        let embedder = self.embedder()?;
        let case = self.cases.fetch(case_id).await?;
        self.embed_and_store(embedder, &case).await
    }

    /// Embed every case whose embedding is null, one at a time.
    ///
    /// Best-effort batch: a single case's failure is recorded and the
    /// remaining cases still get processed.
    #[instrument(skip(self), fields(subsystem = "rag", component = "embedding_sync", op = "embed_all_pending"))]
    pub async fn embed_all_pending(&self) -> Result<EmbedBatchReport> {
        let embedder = self.embedder()?;
        let start = Instant::now();

        let pending = self.cases.list_missing_embedding().await?;
        let total = pending.len() as i64;

        let mut updated = 0;
        let mut errors = Vec::new();
        for case in &pending {
            match self.embed_and_store(embedder, case).await {
                Ok(()) => updated += 1,
                Err(e) => {
                    warn!(
                        subsystem = "rag",
                        component = "embedding_sync",
                        case_number = %case.case_number,
                        error = %e,
                        "Skipping case after embedding failure"
                    );
                    errors.push(format!("{}: {}", case.case_number, e));
                }
            }
        }

        info!(
            subsystem = "rag",
            component = "embedding_sync",
            total,
            updated,
            failed = errors.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Batch embedding complete"
        );

        Ok(EmbedBatchReport {
            total,
            updated,
            errors,
        })
    }
}
