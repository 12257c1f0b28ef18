//! JSON API handlers.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::{SharedState, error::ApiError};
use crate::core::{ConversionError, ConversionRequest, ConversionResult, RateTable, RatesQuery};

#[derive(Debug, Default, Deserialize)]
pub struct RatesParams {
    pub base: Option<String>,
    pub currencies: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RatesResponse {
    pub base: String,
    pub rates: RateTable,
}

/// `GET /health` — liveness check.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}

/// `GET /rates` — rates for `base`, optionally restricted to `currencies`.
///
/// # Errors
/// Returns [`ApiError::RatesUnavailable`] when the provider yields no table.
pub async fn rates(
    State(state): State<SharedState>,
    Query(params): Query<RatesParams>,
) -> Result<Json<RatesResponse>, ApiError> {
    let query = RatesQuery::new(params.base.as_deref(), params.currencies.as_deref());

    let table = state
        .provider
        .fetch_rates(&query.base)
        .await
        .map_err(|e| {
            debug!(base = %query.base, error = %e, "Rates unavailable");
            ApiError::RatesUnavailable
        })?;

    let rates = query.select(&table);
    Ok(Json(RatesResponse {
        base: query.base,
        rates,
    }))
}

/// `POST /convert` — convert `amount` from one currency to another.
///
/// # Errors
/// Returns a 400 [`ApiError`] for an unreadable body, missing fields, a bad
/// amount, or when no rate links the two currencies.
pub async fn convert(
    State(state): State<SharedState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ConversionResult>, ApiError> {
    let body = match body {
        Ok(Json(body)) if body.is_object() => body,
        Ok(_) => return Err(ApiError::InvalidBody),
        Err(rejection) => {
            debug!(error = %rejection, "Rejected convert body");
            return Err(ApiError::InvalidBody);
        }
    };

    let request = ConversionRequest::from_json(&body)?;
    let result = request.execute(state.provider.as_ref()).await?;
    info!(
        from = %result.from_currency,
        to = %result.to_currency,
        amount = result.original_amount,
        converted = result.converted_amount,
        "Converted"
    );
    Ok(Json(result))
}

impl From<ConversionError> for ApiError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::MissingParameters => ApiError::MissingParameters,
            ConversionError::InvalidAmount => ApiError::InvalidAmount,
            ConversionError::RatesUnavailable(e) => {
                debug!(error = %e, "Conversion failed, source rates unavailable");
                ApiError::ConversionNotPossible
            }
            ConversionError::OutOfRange => {
                debug!("Conversion failed, result out of range");
                ApiError::InvalidAmount
            }
            ConversionError::UnknownCurrency(code) => {
                debug!(currency = %code, "Conversion failed, unknown target currency");
                ApiError::ConversionNotPossible
            }
        }
    }
}
