//! Exchange rate tables and the provider abstraction

use async_trait::async_trait;
use indexmap::IndexMap;
use thiserror::Error;

/// Base currency used when a query does not name one.
pub const DEFAULT_BASE: &str = "USD";

/// Point-in-time rates relative to one implicit base currency, in provider order.
pub type RateTable = IndexMap<String, f64>;

/// Reasons a rate table could not be obtained from the upstream provider.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider responded with {status}")]
    Status {
        status: u16,
        /// The provider's `error-type` field, when the body carried one.
        error_type: Option<String>,
    },

    #[error("failed to parse provider response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("provider returned no conversion rates")]
    EmptyTable,
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches the full rate table for `base`. Every call goes upstream.
    async fn fetch_rates(&self, base: &str) -> Result<RateTable, FetchError>;
}

/// A normalized `/rates` query.
#[derive(Debug, Clone, PartialEq)]
pub struct RatesQuery {
    pub base: String,
    /// Requested target codes, `None` when the whole table is wanted.
    pub currencies: Option<Vec<String>>,
}

impl RatesQuery {
    pub fn new(base: Option<&str>, currencies: Option<&str>) -> Self {
        let base = base.unwrap_or(DEFAULT_BASE).trim().to_uppercase();
        let currencies = currencies.filter(|c| !c.is_empty()).map(|list| {
            list.split(',')
                .map(|code| code.trim().to_uppercase())
                .collect()
        });
        Self { base, currencies }
    }

    /// Restricts `table` to the requested codes. Codes the table lacks are dropped.
    pub fn select(&self, table: &RateTable) -> RateTable {
        match &self.currencies {
            None => table.clone(),
            Some(codes) => codes
                .iter()
                .filter_map(|code| table.get(code).map(|rate| (code.clone(), *rate)))
                .collect(),
        }
    }
}
