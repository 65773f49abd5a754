//! Domain models for clinical case records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Embedding vector type (re-exported from pgvector).
pub use pgvector::Vector;

// =============================================================================
// ENUMERATIONS
// =============================================================================

/// Patient age bracket. Wire values are the Korean labels used on the
/// record forms, which is also how they are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "10대")]
    Teens,
    #[serde(rename = "20대")]
    Twenties,
    #[serde(rename = "30대")]
    Thirties,
    #[serde(rename = "40대")]
    Forties,
    #[serde(rename = "50대")]
    Fifties,
    #[serde(rename = "60대")]
    Sixties,
    #[serde(rename = "70대 이상")]
    SeventiesPlus,
}

impl std::fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Teens => "10대",
            Self::Twenties => "20대",
            Self::Thirties => "30대",
            Self::Forties => "40대",
            Self::Fifties => "50대",
            Self::Sixties => "60대",
            Self::SeventiesPlus => "70대 이상",
        };
        write!(f, "{}", label)
    }
}

impl std::str::FromStr for AgeGroup {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "10대" => Ok(Self::Teens),
            "20대" => Ok(Self::Twenties),
            "30대" => Ok(Self::Thirties),
            "40대" => Ok(Self::Forties),
            "50대" => Ok(Self::Fifties),
            "60대" => Ok(Self::Sixties),
            "70대 이상" => Ok(Self::SeventiesPlus),
            _ => Err(format!("Invalid age group: {}", s)),
        }
    }
}

/// Patient gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "남")]
    Male,
    #[serde(rename = "여")]
    Female,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => write!(f, "남"),
            Self::Female => write!(f, "여"),
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "남" => Ok(Self::Male),
            "여" => Ok(Self::Female),
            _ => Err(format!("Invalid gender: {}", s)),
        }
    }
}

/// Treatment outcome category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "완치")]
    Resolved,
    #[serde(rename = "호전")]
    Improved,
    #[serde(rename = "변화없음")]
    Unchanged,
    #[serde(rename = "악화")]
    Worsened,
    #[serde(rename = "추적불가")]
    LostToFollowUp,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Resolved => "완치",
            Self::Improved => "호전",
            Self::Unchanged => "변화없음",
            Self::Worsened => "악화",
            Self::LostToFollowUp => "추적불가",
        };
        write!(f, "{}", label)
    }
}

impl std::str::FromStr for Outcome {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "완치" => Ok(Self::Resolved),
            "호전" => Ok(Self::Improved),
            "변화없음" => Ok(Self::Unchanged),
            "악화" => Ok(Self::Worsened),
            "추적불가" => Ok(Self::LostToFollowUp),
            _ => Err(format!("Invalid outcome: {}", s)),
        }
    }
}

// =============================================================================
// CASE TYPES
// =============================================================================

/// A single herb entry in a prescription, in formula order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HerbDetail {
    pub name: String,
    pub dose: String,
}

/// One anonymized patient encounter.
///
/// `chief_complaint` and `prescription` are non-empty for every persisted
/// case; the repository enforces this at the write boundary. The embedding
/// is computed out of band and may lag the source fields indefinitely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicalCase {
    pub id: Uuid,
    pub doctor_id: Uuid,
    /// Human-readable record number (e.g. "C-017"), immutable once assigned.
    pub case_number: String,
    pub age_group: AgeGroup,
    pub gender: Gender,
    pub chief_complaint: String,
    pub tongue_diagnosis: Option<String>,
    pub pulse_diagnosis: Option<String>,
    pub pattern_identification: Option<String>,
    pub prescription: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub herb_details: Vec<HerbDetail>,
    pub treatment_duration: Option<String>,
    pub outcome: Option<Outcome>,
    pub outcome_notes: Option<String>,
    pub clinical_notes: Option<String>,
    pub learning_points: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Vector representation of the case text; absent until computed.
    #[serde(skip)]
    pub embedding: Option<Vector>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClinicalCase {
    /// Whether an embedding has been computed for this case.
    pub fn has_embedding(&self) -> bool {
        self.embedding.is_some()
    }
}

// =============================================================================
// REQUEST / RESPONSE TYPES
// =============================================================================

/// Request for creating a new case record.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCaseRequest {
    pub doctor_id: Uuid,
    pub age_group: AgeGroup,
    pub gender: Gender,
    pub chief_complaint: String,
    pub tongue_diagnosis: Option<String>,
    pub pulse_diagnosis: Option<String>,
    pub pattern_identification: Option<String>,
    pub prescription: String,
    #[serde(default)]
    pub herb_details: Vec<HerbDetail>,
    pub treatment_duration: Option<String>,
    pub outcome: Option<Outcome>,
    pub outcome_notes: Option<String>,
    pub clinical_notes: Option<String>,
    pub learning_points: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request for updating a case record. `None` fields are left unchanged;
/// identity columns (id, case_number, doctor_id, created_at) never change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCaseRequest {
    pub age_group: Option<AgeGroup>,
    pub gender: Option<Gender>,
    pub chief_complaint: Option<String>,
    pub tongue_diagnosis: Option<String>,
    pub pulse_diagnosis: Option<String>,
    pub pattern_identification: Option<String>,
    pub prescription: Option<String>,
    pub herb_details: Option<Vec<HerbDetail>>,
    pub treatment_duration: Option<String>,
    pub outcome: Option<Outcome>,
    pub outcome_notes: Option<String>,
    pub clinical_notes: Option<String>,
    pub learning_points: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Request for listing case records.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListCasesRequest {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// Filter to cases carrying this tag.
    pub tag: Option<String>,
}

/// Response for listing case records.
#[derive(Debug, Clone, Serialize)]
pub struct ListCasesResponse {
    pub cases: Vec<ClinicalCase>,
    pub total: i64,
}

// =============================================================================
// RETRIEVAL TYPES
// =============================================================================

/// A similar-case hit from vector search: the fields the advisory context
/// renders, annotated with the cosine similarity score in [0, 1].
/// Produced only by retrieval; never persisted.
#[derive(Debug, Clone)]
pub struct CaseMatch {
    pub case_number: String,
    pub age_group: AgeGroup,
    pub gender: Gender,
    pub chief_complaint: String,
    pub tongue_diagnosis: Option<String>,
    pub pulse_diagnosis: Option<String>,
    pub pattern_identification: Option<String>,
    pub prescription: String,
    pub outcome: Option<Outcome>,
    pub learning_points: Option<String>,
    pub similarity: f32,
}

// =============================================================================
// EMBEDDING SYNC TYPES
// =============================================================================

/// Summary of a batch embedding run over cases missing a vector.
#[derive(Debug, Clone, Serialize)]
pub struct EmbedBatchReport {
    /// Cases considered (embedding was null at the start of the run).
    pub total: i64,
    /// Cases whose embedding was computed and persisted.
    pub updated: i64,
    /// Per-case failure messages, keyed by case number.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}
