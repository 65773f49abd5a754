//! Clinical case repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use uian_core::{
    CaseRepository, ClinicalCase, CreateCaseRequest, Error, HerbDetail, ListCasesRequest,
    ListCasesResponse, Result, UpdateCaseRequest, Vector,
};

/// Columns selected whenever a full case row is materialized.
const CASE_COLUMNS: &str = "id, doctor_id, case_number, age_group, gender, chief_complaint, \
     tongue_diagnosis, pulse_diagnosis, pattern_identification, prescription, herb_details, \
     treatment_duration, outcome, outcome_notes, clinical_notes, learning_points, tags, \
     embedding, created_at, updated_at";

/// Parse a stored enum label, surfacing corrupt rows as internal errors.
fn parse_label<T>(raw: &str) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse().map_err(Error::Internal)
}

/// Map a database row to a ClinicalCase.
fn map_case_row(row: PgRow) -> Result<ClinicalCase> {
    let age_group: String = row.get("age_group");
    let gender: String = row.get("gender");
    let outcome: Option<String> = row.get("outcome");
    let herb_details: serde_json::Value = row.get("herb_details");
    let herb_details: Vec<HerbDetail> =
        serde_json::from_value(herb_details).map_err(|e| Error::Serialization(e.to_string()))?;

    Ok(ClinicalCase {
        id: row.get("id"),
        doctor_id: row.get("doctor_id"),
        case_number: row.get("case_number"),
        age_group: parse_label(&age_group)?,
        gender: parse_label(&gender)?,
        chief_complaint: row.get("chief_complaint"),
        tongue_diagnosis: row.get("tongue_diagnosis"),
        pulse_diagnosis: row.get("pulse_diagnosis"),
        pattern_identification: row.get("pattern_identification"),
        prescription: row.get("prescription"),
        herb_details,
        treatment_duration: row.get("treatment_duration"),
        outcome: outcome.as_deref().map(parse_label).transpose()?,
        outcome_notes: row.get("outcome_notes"),
        clinical_notes: row.get("clinical_notes"),
        learning_points: row.get("learning_points"),
        tags: row.get("tags"),
        embedding: row.get("embedding"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Reject empty required text fields before they reach the database.
fn validate_required(chief_complaint: &str, prescription: &str) -> Result<()> {
    if chief_complaint.trim().is_empty() {
        return Err(Error::InvalidInput("chief_complaint is required".into()));
    }
    if prescription.trim().is_empty() {
        return Err(Error::InvalidInput("prescription is required".into()));
    }
    Ok(())
}

/// PostgreSQL implementation of CaseRepository.
#[derive(Clone)]
pub struct PgCaseRepository {
    pool: Pool<Postgres>,
}

impl PgCaseRepository {
    /// Create a new PgCaseRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CaseRepository for PgCaseRepository {
    async fn insert(&self, req: CreateCaseRequest) -> Result<Uuid> {
        validate_required(&req.chief_complaint, &req.prescription)?;

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // Case numbers come from a dedicated sequence so they stay unique
        // and human-readable regardless of deletions.
        let seq: i64 = sqlx::query("SELECT nextval('clinical_case_number_seq') AS n")
            .fetch_one(&mut *tx)
            .await
            .map_err(Error::Database)?
            .get("n");
        let case_number = format!("C-{:03}", seq);

        let id = Uuid::new_v4();
        let now = Utc::now();
        let herb_details = serde_json::to_value(&req.herb_details)
            .map_err(|e| Error::Serialization(e.to_string()))?;

        sqlx::query(
            "INSERT INTO clinical_case (
                 id, doctor_id, case_number, age_group, gender, chief_complaint,
                 tongue_diagnosis, pulse_diagnosis, pattern_identification, prescription,
                 herb_details, treatment_duration, outcome, outcome_notes,
                 clinical_notes, learning_points, tags, created_at, updated_at
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)",
        )
        .bind(id)
        .bind(req.doctor_id)
        .bind(&case_number)
        .bind(req.age_group.to_string())
        .bind(req.gender.to_string())
        .bind(&req.chief_complaint)
        .bind(&req.tongue_diagnosis)
        .bind(&req.pulse_diagnosis)
        .bind(&req.pattern_identification)
        .bind(&req.prescription)
        .bind(herb_details)
        .bind(&req.treatment_duration)
        .bind(req.outcome.map(|o| o.to_string()))
        .bind(&req.outcome_notes)
        .bind(&req.clinical_notes)
        .bind(&req.learning_points)
        .bind(&req.tags)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(id)
    }

    async fn fetch(&self, id: Uuid) -> Result<ClinicalCase> {
        let query = format!("SELECT {} FROM clinical_case WHERE id = $1", CASE_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::CaseNotFound(id))?;

        map_case_row(row)
    }

    async fn list(&self, req: ListCasesRequest) -> Result<ListCasesResponse> {
        let limit = req.limit.unwrap_or(uian_core::defaults::PAGE_LIMIT);
        let offset = req.offset.unwrap_or(uian_core::defaults::PAGE_OFFSET);

        let query = format!(
            "SELECT {} FROM clinical_case
             WHERE ($1::text IS NULL OR $1 = ANY(tags))
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3",
            CASE_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(&req.tag)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let cases = rows
            .into_iter()
            .map(map_case_row)
            .collect::<Result<Vec<_>>>()?;

        let total: i64 = sqlx::query(
            "SELECT COUNT(*) AS count FROM clinical_case
             WHERE ($1::text IS NULL OR $1 = ANY(tags))",
        )
        .bind(&req.tag)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?
        .get("count");

        Ok(ListCasesResponse { cases, total })
    }

    async fn update(&self, id: Uuid, req: UpdateCaseRequest) -> Result<()> {
        // Read-modify-write; last write wins. The stored embedding is left
        // untouched and may go stale until the next sync pass.
        let current = self.fetch(id).await?;

        let chief_complaint = req.chief_complaint.unwrap_or(current.chief_complaint);
        let prescription = req.prescription.unwrap_or(current.prescription);
        validate_required(&chief_complaint, &prescription)?;

        let age_group = req.age_group.unwrap_or(current.age_group);
        let gender = req.gender.unwrap_or(current.gender);
        let tongue_diagnosis = req.tongue_diagnosis.or(current.tongue_diagnosis);
        let pulse_diagnosis = req.pulse_diagnosis.or(current.pulse_diagnosis);
        let pattern_identification = req
            .pattern_identification
            .or(current.pattern_identification);
        let herb_details = req.herb_details.unwrap_or(current.herb_details);
        let treatment_duration = req.treatment_duration.or(current.treatment_duration);
        let outcome = req.outcome.or(current.outcome);
        let outcome_notes = req.outcome_notes.or(current.outcome_notes);
        let clinical_notes = req.clinical_notes.or(current.clinical_notes);
        let learning_points = req.learning_points.or(current.learning_points);
        let tags = req.tags.unwrap_or(current.tags);

        let herb_details = serde_json::to_value(&herb_details)
            .map_err(|e| Error::Serialization(e.to_string()))?;

        sqlx::query(
            "UPDATE clinical_case SET
                 age_group = $2, gender = $3, chief_complaint = $4,
                 tongue_diagnosis = $5, pulse_diagnosis = $6, pattern_identification = $7,
                 prescription = $8, herb_details = $9, treatment_duration = $10,
                 outcome = $11, outcome_notes = $12, clinical_notes = $13,
                 learning_points = $14, tags = $15, updated_at = $16
             WHERE id = $1",
        )
        .bind(id)
        .bind(age_group.to_string())
        .bind(gender.to_string())
        .bind(&chief_complaint)
        .bind(&tongue_diagnosis)
        .bind(&pulse_diagnosis)
        .bind(&pattern_identification)
        .bind(&prescription)
        .bind(herb_details)
        .bind(&treatment_duration)
        .bind(outcome.map(|o| o.to_string()))
        .bind(&outcome_notes)
        .bind(&clinical_notes)
        .bind(&learning_points)
        .bind(&tags)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM clinical_case WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::CaseNotFound(id));
        }
        Ok(())
    }

    async fn list_missing_embedding(&self) -> Result<Vec<ClinicalCase>> {
        let query = format!(
            "SELECT {} FROM clinical_case WHERE embedding IS NULL ORDER BY created_at",
            CASE_COLUMNS
        );
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        rows.into_iter().map(map_case_row).collect()
    }

    async fn update_embedding(&self, id: Uuid, vector: &Vector) -> Result<()> {
        let result = sqlx::query("UPDATE clinical_case SET embedding = $2 WHERE id = $1")
            .bind(id)
            .bind(vector)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::CaseNotFound(id));
        }
        Ok(())
    }
}
