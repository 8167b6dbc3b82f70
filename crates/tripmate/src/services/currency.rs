use anyhow::{anyhow, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::http_client;
use crate::validation::CurrencyCode;

pub const EXCHANGE_RATE_HOST: &str = "https://v6.exchangerate-api.com";

#[derive(Debug, Deserialize)]
struct LatestRates {
    #[serde(default)]
    conversion_rates: HashMap<String, f64>,
}

/// exchangerate-api.com v6 `latest` endpoint
pub struct ExchangeRateClient {
    client: Client,
    host: String,
    api_key: String,
}

impl ExchangeRateClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            host: EXCHANGE_RATE_HOST.to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub async fn convert(&self, amount: f64, from: &CurrencyCode, to: &CurrencyCode) -> Result<f64> {
        let url = format!(
            "{}/v6/{}/latest/{}",
            self.host.trim_end_matches('/'),
            self.api_key,
            from
        );
        tracing::info!(%from, %to, amount, "converting currency");

        let response = self.client.get(&url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(anyhow!("Exchange rate API call failed with status {}", response.status()));
        }

        let rates: LatestRates = response.json().await?;
        let rate = rates
            .conversion_rates
            .get(to.as_str())
            .ok_or_else(|| anyhow!("{} not found in the exchange rates", to))?;

        Ok(amount * rate)
    }
}
