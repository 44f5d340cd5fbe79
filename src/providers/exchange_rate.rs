use super::util::with_retry;
use crate::core::currency::{RateSource, Rates};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

const RETRY_DELAY_MS: u64 = 500;

/// Fetches the latest rates from an ExchangeRate-API compatible endpoint.
pub struct ExchangeRateApiProvider {
    base_url: String,
    client: reqwest::Client,
    retries: usize,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str, timeout: Duration, retries: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("finboard/1.0")
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ExchangeRateApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            retries,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default, rename = "error-type")]
    error_type: Option<String>,
    #[serde(default)]
    rates: Option<Rates>,
}

#[async_trait]
impl RateSource for ExchangeRateApiProvider {
    #[instrument(name = "fetch_latest_rates", skip(self), fields(base_url = %self.base_url))]
    async fn fetch_latest(&self, base: &str) -> Result<Rates> {
        let url = format!("{}/latest/{}", self.base_url, base);
        debug!("Requesting exchange rates from {}", url);

        let response = with_retry(
            || async { self.client.get(&url).send().await },
            self.retries,
            RETRY_DELAY_MS,
        )
        .await
        .map_err(|e| anyhow!("Request error: {} for base currency: {}", e, base))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for base currency: {}",
                response.status(),
                base
            ));
        }

        let text = response.text().await?;
        let data: LatestRatesResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", base, e))?;

        if data.result.as_deref() == Some("error") {
            return Err(anyhow!(
                "Rate service error: {} for base currency: {}",
                data.error_type.as_deref().unwrap_or("unknown"),
                base
            ));
        }

        let rates = data
            .rates
            .ok_or_else(|| anyhow!("No rate data found for base currency: {}", base))?;
        debug!(base, count = rates.len(), "Fetched exchange rates");
        Ok(rates)
    }
}
