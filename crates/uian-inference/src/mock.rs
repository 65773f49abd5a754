//! Mock inference backends for deterministic testing.
//!
//! These implement the core backend traits with fully deterministic
//! behavior: text-derived embeddings, fixed responses, and explicit
//! failure switches. Used by the pipeline tests in uian-rag and the
//! API tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use uian_core::{EmbeddingBackend, Error, GenerationBackend, Result, Vector};

/// Deterministic embedding generator.
pub struct MockVectorGenerator;

impl MockVectorGenerator {
    /// Generate a deterministic unit vector from text.
    ///
    /// Uses character-based hashing for reproducibility. The same text
    /// always produces the same embedding.
    pub fn generate(text: &str, dimension: usize) -> Vec<f32> {
        let mut vec = vec![0.0; dimension];
        for (i, c) in text.chars().enumerate() {
            let idx = (c as usize + i) % dimension;
            vec[idx] += 0.1;
        }
        Self::normalize(&mut vec);
        vec
    }

    fn normalize(vec: &mut [f32]) {
        let magnitude: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            vec.iter_mut().for_each(|x| *x /= magnitude);
        }
    }

    /// Calculate cosine similarity between two vectors.
    pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if mag_a > 0.0 && mag_b > 0.0 {
            dot / (mag_a * mag_b)
        } else {
            0.0
        }
    }
}

/// Mock embedding backend with a call log and an explicit failure switch.
#[derive(Clone)]
pub struct MockEmbeddingBackend {
    dimension: usize,
    failure: Option<String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockEmbeddingBackend {
    /// Create a new mock with the default dimension (8).
    pub fn new() -> Self {
        Self {
            dimension: 8,
            failure: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the embedding dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Make every call fail with the given message.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Texts embedded so far, in call order.
    pub fn embedded_texts(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of embed calls made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockEmbeddingBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingBackend for MockEmbeddingBackend {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        self.calls.lock().unwrap().extend(texts.iter().cloned());

        if let Some(message) = &self.failure {
            return Err(Error::Embedding(message.clone()));
        }

        Ok(texts
            .iter()
            .map(|t| Vector::from(MockVectorGenerator::generate(t, self.dimension)))
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "mock-embed"
    }
}

/// A recorded generation call: (system, user, max_tokens).
pub type GenerationCall = (String, String, u32);

/// Mock generation backend with a fixed response, a call log, and an
/// explicit failure switch.
#[derive(Clone)]
pub struct MockGenerationBackend {
    response: String,
    failure: Option<(Option<u16>, String)>,
    calls: Arc<Mutex<Vec<GenerationCall>>>,
}

impl MockGenerationBackend {
    /// Create a new mock returning a fixed default response.
    pub fn new() -> Self {
        Self {
            response: "Mock answer".to_string(),
            failure: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the fixed response.
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = response.into();
        self
    }

    /// Make every call fail with an upstream status and message.
    pub fn failing_with_status(mut self, status: u16, message: impl Into<String>) -> Self {
        self.failure = Some((Some(status), message.into()));
        self
    }

    /// Make every call fail without an upstream status.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some((None, message.into()));
        self
    }

    /// All recorded calls.
    pub fn calls(&self) -> Vec<GenerationCall> {
        self.calls.lock().unwrap().clone()
    }

    /// System instruction of the most recent call, if any.
    pub fn last_system(&self) -> Option<String> {
        self.calls.lock().unwrap().last().map(|c| c.0.clone())
    }

    /// Number of generation calls made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockGenerationBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn complete(&self, system: &str, user: &str, max_tokens: u32) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string(), max_tokens));

        if let Some((status, message)) = &self.failure {
            return Err(Error::Generation {
                status: *status,
                message: message.clone(),
            });
        }

        Ok(self.response.clone())
    }

    fn model_name(&self) -> &str {
        "mock-gen"
    }
}
