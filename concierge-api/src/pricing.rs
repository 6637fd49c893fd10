use axum::{extract::State, routing::post, Json, Router};
use concierge_catalog::{ItemCategory, PricingInput};
use concierge_core::service::PricingPreview;
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    #[serde(alias = "item_type")]
    pub category: ItemCategory,
    #[serde(default)]
    pub pricing: PricingInput,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/pricing/preview", post(preview))
}

/// POST /v1/pricing/preview
///
/// Resolves and formats form input without saving anything.
pub async fn preview(State(state): State<AppState>, Json(req): Json<PreviewRequest>) -> Json<PricingPreview> {
    Json(state.catalog.preview_pricing(req.category, &req.pricing))
}
