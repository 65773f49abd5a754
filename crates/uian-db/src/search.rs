//! Vector similarity search over stored case embeddings.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use uian_core::{CaseMatch, CaseSearchRepository, Error, Result, Vector};

/// Parse a stored enum label, surfacing corrupt rows as internal errors.
fn parse_label<T>(raw: &str) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse().map_err(Error::Internal)
}

/// PostgreSQL implementation of CaseSearchRepository, backed by pgvector's
/// cosine distance operator.
#[derive(Clone)]
pub struct PgCaseSearchRepository {
    pool: Pool<Postgres>,
}

impl PgCaseSearchRepository {
    /// Create a new PgCaseSearchRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CaseSearchRepository for PgCaseSearchRepository {
    async fn find_similar(
        &self,
        query_vec: &Vector,
        threshold: f32,
        limit: i64,
    ) -> Result<Vec<CaseMatch>> {
        let rows = sqlx::query(
            r#"
            SELECT case_number, age_group, gender, chief_complaint,
                   tongue_diagnosis, pulse_diagnosis, pattern_identification,
                   prescription, outcome, learning_points,
                   1.0 - (embedding <=> $1::vector) AS similarity
            FROM clinical_case
            WHERE embedding IS NOT NULL
              AND 1.0 - (embedding <=> $1::vector) >= $2
            ORDER BY embedding <=> $1::vector
            LIMIT $3
            "#,
        )
        .bind(query_vec)
        .bind(threshold as f64)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter()
            .map(|row| {
                let age_group: String = row.get("age_group");
                let gender: String = row.get("gender");
                let outcome: Option<String> = row.get("outcome");
                Ok(CaseMatch {
                    case_number: row.get("case_number"),
                    age_group: parse_label(&age_group)?,
                    gender: parse_label(&gender)?,
                    chief_complaint: row.get("chief_complaint"),
                    tongue_diagnosis: row.get("tongue_diagnosis"),
                    pulse_diagnosis: row.get("pulse_diagnosis"),
                    pattern_identification: row.get("pattern_identification"),
                    prescription: row.get("prescription"),
                    outcome: outcome.as_deref().map(parse_label).transpose()?,
                    learning_points: row.get("learning_points"),
                    similarity: row.get::<f64, _>("similarity") as f32,
                })
            })
            .collect()
    }
}
