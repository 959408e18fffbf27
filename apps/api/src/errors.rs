use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures of a single layout pass.
///
/// Both variants abort the pass: geometry is checked before any placement is
/// produced, and a glyph that cannot be measured is never replaced by a guess.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// A numeric grid/font parameter is missing, unparsable, or out of range.
    #[error("invalid {field}: {reason}")]
    Configuration { field: &'static str, reason: String },

    /// The active font cannot measure this character.
    #[error("cannot measure character {character:?}: {reason}")]
    FontMeasurement { character: char, reason: String },
}

impl LayoutError {
    pub fn configuration(field: &'static str, reason: impl Into<String>) -> Self {
        LayoutError::Configuration {
            field,
            reason: reason.into(),
        }
    }

    pub fn font_measurement(character: char, reason: impl Into<String>) -> Self {
        LayoutError::FontMeasurement {
            character,
            reason: reason.into(),
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Layout(e @ LayoutError::Configuration { .. }) => {
                tracing::warn!("Layout configuration rejected: {e}");
                (StatusCode::BAD_REQUEST, "CONFIGURATION_ERROR", e.to_string())
            }
            AppError::Layout(e @ LayoutError::FontMeasurement { .. }) => {
                tracing::warn!("Layout aborted: {e}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "FONT_MEASUREMENT_ERROR",
                    e.to_string(),
                )
            }
            AppError::Settings(msg) => {
                tracing::error!("Settings error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SETTINGS_ERROR",
                    "Settings could not be read or written".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
