//! Centralized default constants for the uian system.
//!
//! **This module is the single source of truth** for all shared default
//! values. Crates reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// RETRIEVAL
// =============================================================================

/// Minimum cosine similarity for a stored case to qualify as a retrieval
/// match. Overridable via `UIAN_SIMILARITY_THRESHOLD`.
pub const SIMILARITY_THRESHOLD: f32 = 0.3;

/// Maximum similar cases included in the advisory context.
/// Overridable via `UIAN_MATCH_LIMIT`.
pub const MATCH_LIMIT: i64 = 10;

/// Separator line between rendered case blocks in the context.
pub const CONTEXT_SEPARATOR: &str = "\n---\n";

// =============================================================================
// EMBEDDING
// =============================================================================

/// Default embedding model (OpenAI).
pub const EMBED_MODEL: &str = "text-embedding-3-small";

/// Embedding vector dimension for text-embedding-3-small.
pub const EMBED_DIMENSION: usize = 1536;

/// Default OpenAI API base URL.
pub const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Timeout for embedding requests in seconds.
pub const EMBED_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// GENERATION
// =============================================================================

/// Default generation model (Anthropic).
pub const GEN_MODEL: &str = "claude-opus-4-20250514";

/// Default Anthropic API base URL.
pub const ANTHROPIC_URL: &str = "https://api.anthropic.com";

/// Anthropic API version header value.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Upper bound on generated answer length, in tokens.
pub const ANSWER_MAX_TOKENS: u32 = 2000;

/// Timeout for generation requests in seconds.
pub const GEN_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for the case list endpoint.
pub const PAGE_LIMIT: i64 = 50;

/// Default page offset.
pub const PAGE_OFFSET: i64 = 0;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Retrieval tuning parameters.
///
/// The threshold and cap are deliberate configuration, not hardcoded
/// constants: read from environment variables at startup with fallback
/// to the defaults above.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalConfig {
    /// Similarity floor for retrieval matches.
    pub similarity_threshold: f32,
    /// Result-count cap for retrieval matches.
    pub match_limit: i64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: SIMILARITY_THRESHOLD,
            match_limit: MATCH_LIMIT,
        }
    }
}

impl RetrievalConfig {
    /// Load configuration from environment variables with fallback to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("UIAN_SIMILARITY_THRESHOLD") {
            if let Ok(t) = val.parse::<f32>() {
                config.similarity_threshold = t.clamp(0.0, 1.0);
            } else {
                tracing::warn!(value = %val, "Invalid UIAN_SIMILARITY_THRESHOLD, using default");
            }
        }

        if let Ok(val) = std::env::var("UIAN_MATCH_LIMIT") {
            if let Ok(n) = val.parse::<i64>() {
                if n > 0 {
                    config.match_limit = n;
                }
            } else {
                tracing::warn!(value = %val, "Invalid UIAN_MATCH_LIMIT, using default");
            }
        }

        config
    }
}
