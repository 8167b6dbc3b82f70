use anyhow::Result;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

use super::http_client;

pub const OPENWEATHER_HOST: &str = "https://api.openweathermap.org";

/// OpenWeatherMap current-weather and 5-day forecast endpoints
pub struct OpenWeatherClient {
    client: Client,
    host: String,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            host: OPENWEATHER_HOST.to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Current conditions; `None` when the API answers with a non-200 status
    pub async fn current(&self, place: &str) -> Result<Option<Value>> {
        self.get("weather", &[("q", place), ("units", "metric")]).await
    }

    /// Forecast in 3-hour steps, limited to ten entries
    pub async fn forecast(&self, place: &str) -> Result<Option<Value>> {
        self.get("forecast", &[("q", place), ("cnt", "10"), ("units", "metric")])
            .await
    }

    async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Option<Value>> {
        let url = format!("{}/data/2.5/{}", self.host.trim_end_matches('/'), endpoint);
        tracing::info!(endpoint, "fetching weather data");

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(Some(response.json().await?)),
            status => {
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(%status, body = %body, endpoint, "weather request failed");
                Ok(None)
            }
        }
    }
}
