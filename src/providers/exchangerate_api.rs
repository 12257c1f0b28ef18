use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::core::rates::{FetchError, RateProvider, RateTable};

/// Client for the ExchangeRate-API `latest` endpoint.
pub struct ExchangeRateApiProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("xrate/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(ExchangeRateApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    fn latest_url(&self, base: &str) -> String {
        format!("{}/{}/latest/{}", self.base_url, self.api_key, base)
    }
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[serde(default)]
    conversion_rates: RateTable,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

#[async_trait]
impl RateProvider for ExchangeRateApiProvider {
    #[instrument(name = "ExchangeRateFetch", skip(self), fields(base = %base))]
    async fn fetch_rates(&self, base: &str) -> Result<RateTable, FetchError> {
        let result = self.request_latest(base).await;
        if let Err(e) = &result {
            warn!(error = %e, "Error fetching exchange rates");
        }
        result
    }
}

impl ExchangeRateApiProvider {
    async fn request_latest(&self, base: &str) -> Result<RateTable, FetchError> {
        debug!("Requesting exchange rates from {}/<key>/latest/{}", self.base_url, base);

        let response = self
            .client
            .get(self.latest_url(base))
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.without_url()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.without_url()))?;

        if status != reqwest::StatusCode::OK {
            let error_type = serde_json::from_str::<ErrorResponse>(&text)
                .ok()
                .and_then(|body| body.error_type);
            return Err(FetchError::Status {
                status: status.as_u16(),
                error_type,
            });
        }

        let data: LatestResponse = serde_json::from_str(&text)?;
        if data.conversion_rates.is_empty() {
            return Err(FetchError::EmptyTable);
        }
        debug!(count = data.conversion_rates.len(), "Received exchange rates");
        Ok(data.conversion_rates)
    }
}
