//! In-memory state and request helpers for API tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use chrono::Utc;
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use uian_api::{app, AppState};
use uian_core::{
    AgeGroup, CaseMatch, CaseRepository, CaseSearchRepository, ClinicalCase, CreateCaseRequest,
    EmbeddingBackend, Error, Gender, GenerationBackend, ListCasesRequest, ListCasesResponse,
    Result, RetrievalConfig, UpdateCaseRequest, Vector,
};
use uian_inference::{MockEmbeddingBackend, MockGenerationBackend};
use uian_rag::{AnswerGenerator, CaseAdvisor, ContextRetriever, EmbeddingSync};

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

/// In-memory CaseRepository.
pub struct MemoryCaseRepository {
    cases: Mutex<Vec<ClinicalCase>>,
}

impl MemoryCaseRepository {
    pub fn with_cases(cases: Vec<ClinicalCase>) -> Arc<Self> {
        Arc::new(Self {
            cases: Mutex::new(cases),
        })
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
        if req.chief_complaint.trim().is_empty() {
            return Err(Error::InvalidInput("chief_complaint is required".into()));
        }
        if req.prescription.trim().is_empty() {
            return Err(Error::InvalidInput("prescription is required".into()));
        }
        let mut cases = self.cases.lock().unwrap();
        let mut record = case(&format!("C-{:03}", cases.len() + 1), &req.chief_complaint);
        record.doctor_id = req.doctor_id;
        record.age_group = req.age_group;
        record.gender = req.gender;
        record.prescription = req.prescription;
        record.tags = req.tags;
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

    async fn list(&self, req: ListCasesRequest) -> Result<ListCasesResponse> {
        let cases: Vec<ClinicalCase> = self
            .cases
            .lock()
            .unwrap()
            .iter()
            .filter(|c| match &req.tag {
                Some(tag) => c.tags.contains(tag),
                None => true,
            })
            .cloned()
            .collect();
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
            if chief_complaint.trim().is_empty() {
                return Err(Error::InvalidInput("chief_complaint is required".into()));
            }
            record.chief_complaint = chief_complaint;
        }
        if let Some(prescription) = req.prescription {
            record.prescription = prescription;
        }
        if let Some(tags) = req.tags {
            record.tags = tags;
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
        let mut cases = self.cases.lock().unwrap();
        let record = cases
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(Error::CaseNotFound(id))?;
        record.embedding = Some(vector.clone());
        Ok(())
    }
}

/// CaseSearchRepository returning a fixed hit list.
pub struct MemoryCaseSearch {
    matches: Vec<CaseMatch>,
}

impl MemoryCaseSearch {
    pub fn with_matches(matches: Vec<CaseMatch>) -> Arc<Self> {
        Arc::new(Self { matches })
    }
}

#[async_trait]
impl CaseSearchRepository for MemoryCaseSearch {
    async fn find_similar(
        &self,
        _query_vec: &Vector,
        _threshold: f32,
        _limit: i64,
    ) -> Result<Vec<CaseMatch>> {
        Ok(self.matches.clone())
    }
}

/// Generation backend simulating a missing credential.
pub struct UnconfiguredGeneration;

#[async_trait]
impl GenerationBackend for UnconfiguredGeneration {
    async fn complete(&self, _system: &str, _user: &str, _max_tokens: u32) -> Result<String> {
        Err(Error::Config("CLAUDE_API_KEY is not set".to_string()))
    }

    fn model_name(&self) -> &str {
        "unconfigured"
    }
}

/// Everything a test needs to drive the router and inspect state.
pub struct TestApp {
    pub cases: Arc<MemoryCaseRepository>,
    pub state: AppState,
}

/// Build application state over in-memory fakes.
///
/// `generation` answers the chat endpoint; retrieval and embedding sync run
/// against the mock embedding backend and the given stored cases/matches.
pub fn test_app(
    generation: Arc<dyn GenerationBackend>,
    stored: Vec<ClinicalCase>,
    matches: Vec<CaseMatch>,
) -> TestApp {
    let cases = MemoryCaseRepository::with_cases(stored);
    let embedder: Arc<dyn EmbeddingBackend> = Arc::new(MockEmbeddingBackend::new());
    let retriever = ContextRetriever::new(
        Some(embedder.clone()),
        MemoryCaseSearch::with_matches(matches),
        RetrievalConfig::default(),
    );
    let advisor = Arc::new(CaseAdvisor::new(retriever, AnswerGenerator::new(generation)));
    let sync = Arc::new(EmbeddingSync::new(cases.clone(), Some(embedder)));

    let state = AppState {
        cases: cases.clone(),
        advisor,
        sync,
    };
    TestApp { cases, state }
}

/// Like [`test_app`], but with no embedding provider configured.
pub fn test_app_unconfigured_embedding(stored: Vec<ClinicalCase>) -> TestApp {
    let cases = MemoryCaseRepository::with_cases(stored);
    let retriever = ContextRetriever::new(
        None,
        MemoryCaseSearch::with_matches(vec![]),
        RetrievalConfig::default(),
    );
    let generation: Arc<dyn GenerationBackend> =
        Arc::new(MockGenerationBackend::new().with_response("답변입니다"));
    let advisor = Arc::new(CaseAdvisor::new(retriever, AnswerGenerator::new(generation)));
    let sync = Arc::new(EmbeddingSync::new(cases.clone(), None));

    let state = AppState {
        cases: cases.clone(),
        advisor,
        sync,
    };
    TestApp { cases, state }
}

/// Issue a JSON request against a fresh router over `state`.
pub async fn request(
    state: AppState,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let router = app(state);
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    let request = match body {
        Some(json) => builder.body(Body::from(json.to_string())).unwrap(),
        None => builder.body(Body::from("{}")).unwrap(),
    };

    let response: Response<Body> = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
