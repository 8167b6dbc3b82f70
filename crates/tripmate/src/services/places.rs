//! Place search with a primary provider and a fallback.
//!
//! Google Places answers first. Any error, including an empty result, hands the
//! same query to Tavily exactly once. When both fail the caller still gets a
//! string it can show the model; nothing is raised out of this layer.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use strum_macros::{Display, EnumIter};

use super::http_client;

pub const GOOGLE_PLACES_HOST: &str = "https://maps.googleapis.com";
pub const TAVILY_HOST: &str = "https://api.tavily.com";

/// Number of Google results kept in the summary
const MAX_PLACES: usize = 10;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Provider name used in logs and failure messages
    fn name(&self) -> &'static str;

    /// Run a free-text search; an empty result is an error
    async fn search(&self, query: &str) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum PlaceCategory {
    #[strum(serialize = "attractions")]
    Attractions,
    #[strum(serialize = "restaurants")]
    Restaurants,
    #[strum(serialize = "activities")]
    Activities,
    #[strum(serialize = "modes of transportation")]
    Transportation,
}

impl PlaceCategory {
    pub fn query(&self, place: &str) -> String {
        match self {
            PlaceCategory::Attractions => format!("top attractive places in and around {}", place),
            PlaceCategory::Restaurants => format!(
                "what are the top 10 restaurants and eateries in and around {}?",
                place
            ),
            PlaceCategory::Activities => format!("Activities in and around {}", place),
            PlaceCategory::Transportation => format!(
                "What are the different modes of transportations available in {}",
                place
            ),
        }
    }
}

pub struct FallbackPlaceSearch {
    primary: Arc<dyn PlaceSearch>,
    secondary: Arc<dyn PlaceSearch>,
}

impl FallbackPlaceSearch {
    pub fn new(primary: Arc<dyn PlaceSearch>, secondary: Arc<dyn PlaceSearch>) -> Self {
        Self { primary, secondary }
    }

    pub async fn search(&self, category: PlaceCategory, place: &str) -> String {
        let query = category.query(place);
        tracing::info!(%category, place, provider = self.primary.name(), "searching places");

        let primary_error = match non_empty(self.primary.search(&query).await) {
            Ok(found) => {
                return format!(
                    "Following are the {} of {} as suggested by google: {}",
                    category, place, found
                )
            }
            Err(e) => e,
        };

        tracing::warn!(
            place,
            error = %primary_error,
            "{} search failed, falling back to {}",
            self.primary.name(),
            self.secondary.name()
        );

        match non_empty(self.secondary.search(&query).await) {
            Ok(found) => format!(
                "Google search failed. Following are the {} of {} from fallback search: {}",
                category, place, found
            ),
            Err(secondary_error) => {
                tracing::error!(place, error = %secondary_error, "fallback place search failed");
                format!(
                    "Could not find any {} for {}. {} search failed ({:#}) and {} search failed ({:#}). \
                     Tell the user the place information is unavailable right now.",
                    category,
                    place,
                    self.primary.name(),
                    primary_error,
                    self.secondary.name(),
                    secondary_error
                )
            }
        }
    }
}

fn non_empty(result: Result<String>) -> Result<String> {
    match result {
        Ok(text) if text.trim().is_empty() => Err(anyhow!("empty result")),
        other => other,
    }
}

#[derive(Debug, Deserialize)]
struct GoogleTextSearch {
    #[serde(default)]
    status: String,
    #[serde(default)]
    results: Vec<GooglePlace>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GooglePlace {
    name: String,
    formatted_address: Option<String>,
    rating: Option<f64>,
}

/// Google Places text search
pub struct GooglePlacesClient {
    client: Client,
    host: String,
    api_key: String,
}

impl GooglePlacesClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            host: GOOGLE_PLACES_HOST.to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }
}

#[async_trait]
impl PlaceSearch for GooglePlacesClient {
    fn name(&self) -> &'static str {
        "Google Places"
    }

    async fn search(&self, query: &str) -> Result<String> {
        let url = format!(
            "{}/maps/api/place/textsearch/json",
            self.host.trim_end_matches('/')
        );
        let response = self
            .client
            .get(&url)
            .query(&[("query", query), ("key", self.api_key.as_str())])
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(anyhow!("Google Places returned status {}", response.status()));
        }

        let body: GoogleTextSearch = response.json().await?;
        match body.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => return Err(anyhow!("no results")),
            status => {
                return Err(anyhow!(
                    "Google Places status {}: {}",
                    status,
                    body.error_message.unwrap_or_default()
                ))
            }
        }
        if body.results.is_empty() {
            return Err(anyhow!("no results"));
        }

        let summary = body
            .results
            .iter()
            .take(MAX_PLACES)
            .enumerate()
            .map(|(i, place)| {
                let mut line = format!("{}. {}", i + 1, place.name);
                if let Some(address) = &place.formatted_address {
                    line.push_str(&format!("\nAddress: {}", address));
                }
                if let Some(rating) = place.rating {
                    line.push_str(&format!("\nRating: {}", rating));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(summary)
    }
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    answer: Option<String>,
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    title: String,
    #[serde(default)]
    content: String,
}

/// Tavily web search, used for its generated answer
pub struct TavilyClient {
    client: Client,
    host: String,
    api_key: String,
}

impl TavilyClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            host: TAVILY_HOST.to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }
}

#[async_trait]
impl PlaceSearch for TavilyClient {
    fn name(&self) -> &'static str {
        "Tavily"
    }

    async fn search(&self, query: &str) -> Result<String> {
        let url = format!("{}/search", self.host.trim_end_matches('/'));
        let payload = json!({
            "api_key": self.api_key,
            "query": query,
            "topic": "general",
            "include_answer": "advanced",
        });

        let response = self.client.post(&url).json(&payload).send().await?;
        if response.status() != StatusCode::OK {
            return Err(anyhow!("Tavily returned status {}", response.status()));
        }

        let body: TavilyResponse = response.json().await?;
        if let Some(answer) = body.answer.filter(|a| !a.trim().is_empty()) {
            return Ok(answer);
        }

        Ok(body
            .results
            .iter()
            .map(|r| format!("{}: {}", r.title, r.content))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
