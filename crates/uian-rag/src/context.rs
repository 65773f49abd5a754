//! Similar-case retrieval and context rendering.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use uian_core::defaults::CONTEXT_SEPARATOR;
use uian_core::{
    CaseMatch, CaseSearchRepository, EmbeddingBackend, Error, Result, RetrievalConfig,
};

/// Render an optional field, substituting "-" for absent or empty values.
fn field_or_dash(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "-",
    }
}

/// Render one retrieval hit as the multi-line block inserted into the
/// advisory context.
fn render_match(m: &CaseMatch) -> String {
    let outcome = m.outcome.map(|o| o.to_string());
    format!(
        "[{}] (유사도: {:.2})\n\
         - 연령/성별: {} {}\n\
         - 주소증: {}\n\
         - 설진: {}\n\
         - 맥진: {}\n\
         - 변증: {}\n\
         - 처방: {}\n\
         - 결과: {}\n\
         - 배운점: {}",
        m.case_number,
        m.similarity,
        m.age_group,
        m.gender,
        m.chief_complaint,
        field_or_dash(m.tongue_diagnosis.as_deref()),
        field_or_dash(m.pulse_diagnosis.as_deref()),
        field_or_dash(m.pattern_identification.as_deref()),
        m.prescription,
        field_or_dash(outcome.as_deref()),
        field_or_dash(m.learning_points.as_deref()),
    )
}

/// Retrieves past cases similar to a question and renders them into a
/// textual context block.
///
/// Retrieval is best-effort enrichment: every failure — missing embedding
/// configuration, provider outage, search error — degrades to an empty
/// context instead of propagating, so an answer can always be attempted.
pub struct ContextRetriever {
    embedder: Option<Arc<dyn EmbeddingBackend>>,
    search: Arc<dyn CaseSearchRepository>,
    config: RetrievalConfig,
}

impl ContextRetriever {
    /// Create a new retriever. `embedder` is `None` when no embedding
    /// provider is configured; retrieval then degrades to empty context
    /// without touching the store.
    pub fn new(
        embedder: Option<Arc<dyn EmbeddingBackend>>,
        search: Arc<dyn CaseSearchRepository>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            search,
            config,
        }
    }

    /// Retrieve the context block for a question. Never fails; returns an
    /// empty string when nothing can be retrieved.
    pub async fn retrieve(&self, question: &str) -> String {
        match self.try_retrieve(question).await {
            Ok(context) => context,
            Err(e) => {
                warn!(
                    subsystem = "rag",
                    component = "retriever",
                    error = %e,
                    "Similarity retrieval failed; answering without context"
                );
                String::new()
            }
        }
    }

    async fn try_retrieve(&self, question: &str) -> Result<String> {
        let Some(embedder) = &self.embedder else {
            debug!(
                subsystem = "rag",
                component = "retriever",
                "No embedding backend configured; skipping retrieval"
            );
            return Ok(String::new());
        };

        let start = Instant::now();

        let vectors = embedder.embed_texts(&[question.to_string()]).await?;
        let query_vec = vectors
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("Provider returned no vector".to_string()))?;

        let matches = self
            .search
            .find_similar(
                &query_vec,
                self.config.similarity_threshold,
                self.config.match_limit,
            )
            .await?;

        debug!(
            subsystem = "rag",
            component = "retriever",
            result_count = matches.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Similar-case retrieval complete"
        );

        if matches.is_empty() {
            return Ok(String::new());
        }

        Ok(matches
            .iter()
            .map(render_match)
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR))
    }
}
