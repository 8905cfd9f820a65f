//! Looks up same-day exchange rates from the public currency-rate table.

use std::collections::HashMap;

use reqwest::Client;

/// The CDN serving the daily rate tables.
pub const DEFAULT_RATES_URL: &str =
    "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@latest/v1";

/// A rate table keyed by the base currency, e.g. `{"usd": {"uah": 41.2, ...}}`.
type RateTable = HashMap<String, serde_json::Value>;

/// A cheaply cloneable client for the currency-rate table.
#[derive(Debug, Clone)]
pub struct RateClient {
    http: Client,
    base_url: String,
}

impl RateClient {
    /// Create a client for the rate tables served at `base_url`.
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Fetch how many units of `to` one unit of `from` buys.
    ///
    /// Returns `None` when the lookup fails for any reason. Callers keep the
    /// previous coefficient in that case, so failures are only logged.
    pub async fn fetch_rate(&self, from: &str, to: &str) -> Option<f64> {
        let from = from.trim().to_lowercase();
        let to = to.trim().to_lowercase();
        let url = format!("{}/currencies/{from}.json", self.base_url);

        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!("Could not fetch the rate table {url}: {error}");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(
                "The rate table {url} responded with {}",
                response.status()
            );
            return None;
        }

        let table: RateTable = match response.json().await {
            Ok(table) => table,
            Err(error) => {
                tracing::warn!("Could not decode the rate table {url}: {error}");
                return None;
            }
        };

        let rate = table
            .get(&from)
            .and_then(|rates| rates.get(&to))
            .and_then(serde_json::Value::as_f64);

        if rate.is_none() {
            tracing::warn!("The rate table {url} has no rate for {from} to {to}");
        }

        rate
    }
}
