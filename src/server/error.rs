//! Error responses for the HTTP API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Errors surfaced to API clients. Only these generic messages cross the boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Failed to fetch exchange rates")]
    RatesUnavailable,

    #[error("Missing required parameters")]
    MissingParameters,

    #[error("Invalid amount format")]
    InvalidAmount,

    /// Covers both an unavailable source table and an unknown target currency.
    #[error("Conversion not possible. Check currency codes.")]
    ConversionNotPossible,

    #[error("Invalid JSON body")]
    InvalidBody,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::RatesUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MissingParameters
            | ApiError::InvalidAmount
            | ApiError::ConversionNotPossible
            | ApiError::InvalidBody => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({"error": self.to_string()}))).into_response()
    }
}
