use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use concierge_catalog::{EditTarget, KnowledgeDraft, KnowledgeRecord, KnowledgeStats};
use concierge_core::repository::KnowledgeFilter;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct KnowledgeListResponse {
    pub records: Vec<KnowledgeRecord>,
    pub stats: KnowledgeStats,
}

#[derive(Debug, Serialize)]
pub struct EditTargetResponse {
    pub target: EditTarget,
    pub path: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/knowledge", get(list_knowledge).post(create_knowledge))
        .route(
            "/v1/knowledge/{id}",
            get(get_knowledge).put(update_knowledge).delete(delete_knowledge),
        )
        .route("/v1/knowledge/{id}/edit-target", get(edit_target))
}

/// GET /v1/knowledge
pub async fn list_knowledge(
    State(state): State<AppState>,
    Query(filter): Query<KnowledgeFilter>,
) -> Result<Json<KnowledgeListResponse>, AppError> {
    let (records, stats) = state.catalog.list_knowledge(&filter).await?;
    Ok(Json(KnowledgeListResponse { records, stats }))
}

/// POST /v1/knowledge
pub async fn create_knowledge(
    State(state): State<AppState>,
    Json(draft): Json<KnowledgeDraft>,
) -> Result<(StatusCode, Json<KnowledgeRecord>), AppError> {
    let record = state.catalog.create_knowledge(draft).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /v1/knowledge/{id}
pub async fn get_knowledge(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<KnowledgeRecord>, AppError> {
    Ok(Json(state.catalog.get_knowledge(id).await?))
}

/// PUT /v1/knowledge/{id}
///
/// Item-sourced records answer 409 with a redirect to the item.
pub async fn update_knowledge(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(draft): Json<KnowledgeDraft>,
) -> Result<Json<KnowledgeRecord>, AppError> {
    Ok(Json(state.catalog.update_knowledge(id, draft).await?))
}

/// DELETE /v1/knowledge/{id}
pub async fn delete_knowledge(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.catalog.delete_knowledge(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/knowledge/{id}/edit-target
pub async fn edit_target(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EditTargetResponse>, AppError> {
    let target = state.catalog.knowledge_edit_target(id).await?;
    Ok(Json(EditTargetResponse { path: target.path(), target }))
}
