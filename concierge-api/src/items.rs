use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use concierge_catalog::{Item, ItemDraft, ItemStats, PriceFormatter, PricingInput};
use concierge_core::repository::ItemFilter;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    #[serde(flatten)]
    pub item: Item,
    pub display_price: String,
    pub summary: Option<String>,
    /// Stored pricing as edit-form fields
    pub pricing_form: PricingInput,
}

impl ItemResponse {
    fn new(item: Item, formatter: &PriceFormatter) -> Self {
        Self {
            display_price: item.display_price(formatter),
            summary: item.summary(),
            pricing_form: PricingInput::from(&item.pricing),
            item,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ItemListResponse {
    pub items: Vec<ItemResponse>,
    pub stats: ItemStats,
}

#[derive(Debug, Serialize)]
pub struct DeleteItemResponse {
    pub id: Uuid,
    pub message: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/items", get(list_items).post(create_item))
        .route("/v1/items/{id}", get(get_item).put(update_item).delete(delete_item))
        .route("/v1/items/{id}/featured", post(toggle_featured))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /v1/items
pub async fn list_items(
    State(state): State<AppState>,
    Query(filter): Query<ItemFilter>,
) -> Result<Json<ItemListResponse>, AppError> {
    let (items, stats) = state.catalog.list_items(&filter).await?;
    let formatter = state.catalog.formatter();

    Ok(Json(ItemListResponse {
        items: items.into_iter().map(|item| ItemResponse::new(item, formatter)).collect(),
        stats,
    }))
}

/// POST /v1/items
pub async fn create_item(
    State(state): State<AppState>,
    Json(draft): Json<ItemDraft>,
) -> Result<(StatusCode, Json<ItemResponse>), AppError> {
    let item = state.catalog.create_item(draft).await?;
    Ok((StatusCode::CREATED, Json(ItemResponse::new(item, state.catalog.formatter()))))
}

/// GET /v1/items/{id}
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ItemResponse>, AppError> {
    let item = state.catalog.get_item(id).await?;
    Ok(Json(ItemResponse::new(item, state.catalog.formatter())))
}

/// PUT /v1/items/{id}
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(draft): Json<ItemDraft>,
) -> Result<Json<ItemResponse>, AppError> {
    let item = state.catalog.update_item(id, draft).await?;
    Ok(Json(ItemResponse::new(item, state.catalog.formatter())))
}

/// POST /v1/items/{id}/featured
pub async fn toggle_featured(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ItemResponse>, AppError> {
    let item = state.catalog.toggle_featured(id).await?;
    Ok(Json(ItemResponse::new(item, state.catalog.formatter())))
}

/// DELETE /v1/items/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteItemResponse>, AppError> {
    let item = state.catalog.delete_item(id).await?;

    Ok(Json(DeleteItemResponse {
        id: item.id,
        message: format!("Deleted \"{}\"; its knowledge base entry is removed as well", item.name),
    }))
}
