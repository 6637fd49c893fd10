use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use concierge_catalog::EditTarget;
use concierge_core::CoreError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    NotFoundError(String),

    /// Edit of a synced record; the client is sent to the owning item.
    #[error("{message}")]
    ItemOwnedError { message: String, redirect: String },

    #[error("{0}")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::ItemOwnedError { message, redirect } => (
                StatusCode::CONFLICT,
                json!({ "error": message, "redirect": redirect }),
            ),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal Server Error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationError(msg) => AppError::ValidationError(msg),
            CoreError::NotFound { .. } => AppError::NotFoundError(err.to_string()),
            CoreError::ItemOwnedKnowledge { item_id, .. } => AppError::ItemOwnedError {
                message: err.to_string(),
                redirect: EditTarget::Item { item_id }.path(),
            },
            CoreError::PersistenceError(_) | CoreError::InternalError(_) => {
                AppError::InternalServerError(err.to_string())
            }
        }
    }
}
