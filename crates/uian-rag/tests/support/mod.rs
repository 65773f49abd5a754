//! In-memory fakes for pipeline tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use uian_core::{
    AgeGroup, CaseMatch, CaseRepository, CaseSearchRepository, ClinicalCase, CreateCaseRequest,
    EmbeddingBackend, Error, Gender, ListCasesRequest, ListCasesResponse, Result,
    UpdateCaseRequest, Vector,
};
use uian_inference::MockVectorGenerator;

/// Build a minimal case for tests.
pub fn case(case_number: &str, chief_complaint: &str) -> ClinicalCase {
    ClinicalCase {
        id: Uuid::new_v4(),
        doctor_id: Uuid::new_v4(),
        case_number: case_number.to_string(),
        age_group: AgeGroup::Thirties,
        gender: Gender::Male,
        chief_complaint: chief_complaint.to_string(),
        tongue_diagnosis: None,
        pulse_diagnosis: None,
        pattern_identification: None,
        prescription: "평위산".to_string(),
        herb_details: vec![],
        treatment_duration: None,
        outcome: None,
        outcome_notes: None,
        clinical_notes: None,
        learning_points: None,
        tags: vec![],
        embedding: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Build a retrieval hit for tests.
pub fn case_match(case_number: &str, chief_complaint: &str, similarity: f32) -> CaseMatch {
    CaseMatch {
        case_number: case_number.to_string(),
        age_group: AgeGroup::Thirties,
        gender: Gender::Male,
        chief_complaint: chief_complaint.to_string(),
        tongue_diagnosis: None,
        pulse_diagnosis: None,
        pattern_identification: None,
        prescription: "평위산".to_string(),
        outcome: None,
        learning_points: None,
        similarity,
    }
}

/// In-memory CaseRepository. Keeps insertion order so batch runs are
/// deterministic.
pub struct MemoryCaseRepository {
    cases: Mutex<Vec<ClinicalCase>>,
    /// Case ids whose embedding writes fail, for no-partial-write tests.
    failing_writes: Mutex<Vec<Uuid>>,
}

impl MemoryCaseRepository {
    pub fn with_cases(cases: Vec<ClinicalCase>) -> Arc<Self> {
        Arc::new(Self {
            cases: Mutex::new(cases),
            failing_writes: Mutex::new(Vec::new()),
        })
    }

    pub fn fail_embedding_write_for(&self, id: Uuid) {
        self.failing_writes.lock().unwrap().push(id);
    }

    pub fn embedding_of(&self, id: Uuid) -> Option<Vector> {
        self.cases
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .and_then(|c| c.embedding.clone())
    }
}

#[async_trait]
impl CaseRepository for MemoryCaseRepository {
    async fn insert(&self, req: CreateCaseRequest) -> Result<Uuid> {
        let mut cases = self.cases.lock().unwrap();
        let mut record = case(&format!("C-{:03}", cases.len() + 1), &req.chief_complaint);
        record.doctor_id = req.doctor_id;
        record.prescription = req.prescription;
        let id = record.id;
        cases.push(record);
        Ok(id)
    }

    async fn fetch(&self, id: Uuid) -> Result<ClinicalCase> {
        self.cases
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(Error::CaseNotFound(id))
    }

    async fn list(&self, _req: ListCasesRequest) -> Result<ListCasesResponse> {
        let cases = self.cases.lock().unwrap().clone();
        let total = cases.len() as i64;
        Ok(ListCasesResponse { cases, total })
    }

    async fn update(&self, id: Uuid, req: UpdateCaseRequest) -> Result<()> {
        let mut cases = self.cases.lock().unwrap();
        let record = cases
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(Error::CaseNotFound(id))?;
        if let Some(chief_complaint) = req.chief_complaint {
            record.chief_complaint = chief_complaint;
        }
        if let Some(prescription) = req.prescription {
            record.prescription = prescription;
        }
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut cases = self.cases.lock().unwrap();
        let before = cases.len();
        cases.retain(|c| c.id != id);
        if cases.len() == before {
            return Err(Error::CaseNotFound(id));
        }
        Ok(())
    }

    async fn list_missing_embedding(&self) -> Result<Vec<ClinicalCase>> {
        Ok(self
            .cases
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.embedding.is_none())
            .cloned()
            .collect())
    }

    async fn update_embedding(&self, id: Uuid, vector: &Vector) -> Result<()> {
        if self.failing_writes.lock().unwrap().contains(&id) {
            return Err(Error::Internal("embedding write failed".to_string()));
        }
        let mut cases = self.cases.lock().unwrap();
        let record = cases
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(Error::CaseNotFound(id))?;
        record.embedding = Some(vector.clone());
        Ok(())
    }
}

/// In-memory CaseSearchRepository returning a fixed hit list and recording
/// the parameters of every call.
pub struct MemoryCaseSearch {
    matches: Vec<CaseMatch>,
    fail: bool,
    calls: Mutex<Vec<(f32, i64)>>,
}

impl MemoryCaseSearch {
    pub fn with_matches(matches: Vec<CaseMatch>) -> Arc<Self> {
        Arc::new(Self {
            matches,
            fail: false,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            matches: vec![],
            fail: true,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Option<(f32, i64)> {
        self.calls.lock().unwrap().last().copied()
    }
}

#[async_trait]
impl CaseSearchRepository for MemoryCaseSearch {
    async fn find_similar(
        &self,
        _query_vec: &Vector,
        threshold: f32,
        limit: i64,
    ) -> Result<Vec<CaseMatch>> {
        self.calls.lock().unwrap().push((threshold, limit));
        if self.fail {
            return Err(Error::Search("index unavailable".to_string()));
        }
        Ok(self.matches.clone())
    }
}

/// Embedding backend that fails only for inputs containing a marker,
/// so batch tests can poison a single case.
pub struct PoisonedEmbedder {
    marker: String,
    dimension: usize,
}

impl PoisonedEmbedder {
    pub fn new(marker: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            marker: marker.into(),
            dimension: 8,
        })
    }
}

#[async_trait]
impl EmbeddingBackend for PoisonedEmbedder {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if texts.iter().any(|t| t.contains(&self.marker)) {
            return Err(Error::Embedding("provider rejected input".to_string()));
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
        "poisoned-embed"
    }
}
