//! Thin async clients for the remote travel APIs.
//!
//! Each client makes one HTTP call per operation with a request timeout and
//! no retry or caching. Hosts are configurable so tests can point the clients
//! at a local mock server.
pub mod amadeus;
pub mod currency;
pub mod places;
pub mod weather;

use anyhow::Result;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ApiKeys;
use amadeus::AmadeusClient;
use currency::ExchangeRateClient;
use places::{FallbackPlaceSearch, GooglePlacesClient, TavilyClient};
use weather::OpenWeatherClient;

/// Build the HTTP client shared by one service
pub fn http_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Every remote client, built once at startup and shared by the workers
#[derive(Clone)]
pub struct ServiceClients {
    pub weather: Arc<OpenWeatherClient>,
    pub places: Arc<FallbackPlaceSearch>,
    pub currency: Arc<ExchangeRateClient>,
    pub amadeus: Arc<AmadeusClient>,
}

impl ServiceClients {
    pub fn from_keys(keys: &ApiKeys, timeout: Duration) -> Result<Self> {
        let places = FallbackPlaceSearch::new(
            Arc::new(GooglePlacesClient::new(&keys.google_places, timeout)?),
            Arc::new(TavilyClient::new(&keys.tavily, timeout)?),
        );

        Ok(Self {
            weather: Arc::new(OpenWeatherClient::new(&keys.openweather, timeout)?),
            places: Arc::new(places),
            currency: Arc::new(ExchangeRateClient::new(&keys.exchange_rate, timeout)?),
            amadeus: Arc::new(AmadeusClient::new(
                &keys.amadeus_key,
                &keys.amadeus_secret,
                timeout,
            )?),
        })
    }
}
