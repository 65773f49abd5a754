//! Route table and request handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use uian_core::{CreateCaseRequest, ListCasesRequest, UpdateCaseRequest};

use crate::error::ApiError;
use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/cases", post(create_case).get(list_cases))
        .route(
            "/api/cases/:id",
            get(get_case).patch(update_case).delete(delete_case),
        )
        .route("/api/chat", post(chat))
        .route("/api/embed", post(embed_case))
        .route("/api/embed-all", post(embed_all))
        .with_state(state)
}

/// Trigger an embedding sync for a case without blocking the response.
///
/// Detached task with its own failure handling: a slow or failing provider
/// never delays or fails the save, and the stored vector may lag the
/// record indefinitely until the next sync run.
fn spawn_embed(state: &AppState, case_id: Uuid) {
    if !state.sync.is_configured() {
        debug!(
            subsystem = "api",
            component = "cases",
            case_id = %case_id,
            "No embedding provider configured; skipping background sync"
        );
        return;
    }
    let sync = state.sync.clone();
    tokio::spawn(async move {
        if let Err(e) = sync.embed_case(case_id).await {
            warn!(
                subsystem = "api",
                component = "cases",
                case_id = %case_id,
                error = %e,
                "Background embedding sync failed"
            );
        }
    });
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// =============================================================================
// CASE CRUD
// =============================================================================

async fn create_case(
    State(state): State<AppState>,
    Json(req): Json<CreateCaseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state.cases.insert(req).await?;
    let case = state.cases.fetch(id).await?;

    spawn_embed(&state, id);

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": id, "case_number": case.case_number })),
    ))
}

async fn list_cases(
    State(state): State<AppState>,
    Query(req): Query<ListCasesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state.cases.list(req).await?;
    Ok(Json(response))
}

async fn get_case(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let case = state.cases.fetch(id).await?;
    Ok(Json(case))
}

async fn update_case(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCaseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.cases.update(id, req).await?;
    let case = state.cases.fetch(id).await?;

    spawn_embed(&state, id);

    Ok(Json(case))
}

async fn delete_case(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.cases.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// ADVISORY CHAT
// =============================================================================

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    question: Option<String>,
}

async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let question = req
        .question
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::BadRequest("질문을 입력해주세요.".to_string()))?;

    let answer = state.advisor.answer_question(question).await?;
    Ok(Json(serde_json::json!({ "answer": answer })))
}

// =============================================================================
// EMBEDDING SYNC
// =============================================================================

#[derive(Deserialize)]
struct EmbedRequest {
    #[serde(default)]
    case_id: Option<Uuid>,
}

async fn embed_case(
    State(state): State<AppState>,
    Json(req): Json<EmbedRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let case_id = req
        .case_id
        .ok_or_else(|| ApiError::BadRequest("case_id가 필요합니다.".to_string()))?;

    state.sync.embed_case(case_id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

async fn embed_all(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let report = state.sync.embed_all_pending().await?;
    Ok(Json(report))
}
