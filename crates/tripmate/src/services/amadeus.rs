//! Amadeus self-service APIs for flight and hotel offers.
//!
//! Every search fetches a fresh client-credentials token; tokens are not
//! cached between searches.

use anyhow::{anyhow, Context, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use super::http_client;
use crate::validation::{IataCode, IsoDate};

pub const AMADEUS_HOST: &str = "https://test.api.amadeus.com";

/// Offers kept in a summary
const MAX_OFFERS: usize = 5;
/// Hotels priced per search
const MAX_HOTELS: usize = 20;

#[derive(Debug, Clone)]
pub struct FlightQuery {
    pub origin: IataCode,
    pub destination: IataCode,
    pub departure_date: IsoDate,
    pub return_date: Option<IsoDate>,
    pub adults: u8,
}

#[derive(Debug, Clone)]
pub struct HotelQuery {
    pub city_code: IataCode,
    pub check_in: IsoDate,
    pub check_out: IsoDate,
    pub adults: u8,
}

#[derive(Debug, Deserialize)]
struct AccessToken {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct DataList<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct FlightOffer {
    price: Price,
    #[serde(default)]
    itineraries: Vec<Itinerary>,
}

#[derive(Debug, Deserialize)]
struct Price {
    currency: String,
    total: String,
}

#[derive(Debug, Deserialize)]
struct Itinerary {
    #[serde(default)]
    duration: String,
    #[serde(default)]
    segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Segment {
    departure: Endpoint,
    arrival: Endpoint,
    carrier_code: String,
    number: String,
}

#[derive(Debug, Deserialize)]
struct Endpoint {
    #[serde(rename = "iataCode")]
    iata_code: String,
    at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HotelRef {
    hotel_id: String,
}

#[derive(Debug, Deserialize)]
struct HotelOffers {
    hotel: HotelInfo,
    #[serde(default)]
    offers: Vec<HotelOffer>,
}

#[derive(Debug, Deserialize)]
struct HotelInfo {
    name: String,
}

#[derive(Debug, Deserialize)]
struct HotelOffer {
    price: HotelPrice,
    room: Option<Room>,
}

#[derive(Debug, Deserialize)]
struct HotelPrice {
    currency: String,
    total: String,
}

#[derive(Debug, Deserialize)]
struct Room {
    description: Option<RoomDescription>,
}

#[derive(Debug, Deserialize)]
struct RoomDescription {
    text: String,
}

pub struct AmadeusClient {
    client: Client,
    host: String,
    api_key: String,
    api_secret: String,
}

impl AmadeusClient {
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            host: AMADEUS_HOST.to_string(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        })
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.host.trim_end_matches('/'), path)
    }

    async fn token(&self) -> Result<String> {
        let response = self
            .client
            .post(self.url("/v1/security/oauth2/token"))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.api_key.as_str()),
                ("client_secret", self.api_secret.as_str()),
            ])
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(anyhow!("Amadeus authentication failed with status {}", response.status()));
        }
        let token: AccessToken = response.json().await?;
        Ok(token.access_token)
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Amadeus {} returned {}: {}", path, status, body));
        }
        Ok(response.json().await?)
    }

    /// Cheapest flight offers, summarized one per line
    pub async fn search_flights(&self, query: &FlightQuery) -> Result<String> {
        let token = self.token().await.context("requesting Amadeus token")?;

        let mut params = vec![
            ("originLocationCode", query.origin.to_string()),
            ("destinationLocationCode", query.destination.to_string()),
            ("departureDate", query.departure_date.to_string()),
            ("adults", query.adults.to_string()),
            ("max", MAX_OFFERS.to_string()),
        ];
        if let Some(return_date) = query.return_date {
            params.push(("returnDate", return_date.to_string()));
        }

        tracing::info!(origin = %query.origin, destination = %query.destination, "searching flight offers");
        let offers: DataList<FlightOffer> = self
            .get(&token, "/v2/shopping/flight-offers", &params)
            .await?;

        if offers.data.is_empty() {
            return Ok(format!(
                "No flights found from {} to {} on {}",
                query.origin, query.destination, query.departure_date
            ));
        }

        let lines = offers
            .data
            .iter()
            .take(MAX_OFFERS)
            .enumerate()
            .map(|(i, offer)| format!("{}. {}", i + 1, summarize_flight(offer)))
            .collect::<Vec<_>>();

        Ok(format!(
            "Flight offers from {} to {}:\n{}",
            query.origin,
            query.destination,
            lines.join("\n")
        ))
    }

    /// Hotels in a city with their cheapest offer for the stay
    pub async fn search_hotels(&self, query: &HotelQuery) -> Result<String> {
        let token = self.token().await.context("requesting Amadeus token")?;

        tracing::info!(city = %query.city_code, "listing hotels");
        let hotels: DataList<HotelRef> = self
            .get(
                &token,
                "/v1/reference-data/locations/hotels/by-city",
                &[("cityCode", query.city_code.to_string())],
            )
            .await?;

        if hotels.data.is_empty() {
            return Ok(format!("No hotels found in {}", query.city_code));
        }

        let hotel_ids = hotels
            .data
            .iter()
            .take(MAX_HOTELS)
            .map(|h| h.hotel_id.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let offers: DataList<HotelOffers> = self
            .get(
                &token,
                "/v3/shopping/hotel-offers",
                &[
                    ("hotelIds", hotel_ids),
                    ("checkInDate", query.check_in.to_string()),
                    ("checkOutDate", query.check_out.to_string()),
                    ("adults", query.adults.to_string()),
                ],
            )
            .await?;

        let lines = offers
            .data
            .iter()
            .filter_map(|h| h.offers.first().map(|o| (h, o)))
            .take(MAX_OFFERS)
            .enumerate()
            .map(|(i, (hotel, offer))| {
                let mut line = format!(
                    "{}. {}: {} {}",
                    i + 1,
                    hotel.hotel.name,
                    offer.price.total,
                    offer.price.currency
                );
                if let Some(text) = offer
                    .room
                    .as_ref()
                    .and_then(|r| r.description.as_ref())
                    .map(|d| d.text.replace('\n', " "))
                {
                    line.push_str(&format!(" ({})", text));
                }
                line
            })
            .collect::<Vec<_>>();

        if lines.is_empty() {
            return Ok(format!(
                "No hotel offers available in {} from {} to {}",
                query.city_code, query.check_in, query.check_out
            ));
        }

        Ok(format!(
            "Hotel offers in {} from {} to {}:\n{}",
            query.city_code,
            query.check_in,
            query.check_out,
            lines.join("\n")
        ))
    }
}

fn summarize_flight(offer: &FlightOffer) -> String {
    let legs = offer
        .itineraries
        .iter()
        .map(|itinerary| {
            let flights = itinerary
                .segments
                .iter()
                .map(|s| {
                    format!(
                        "{}{} {} {} -> {} {}",
                        s.carrier_code, s.number, s.departure.iata_code, s.departure.at,
                        s.arrival.iata_code, s.arrival.at
                    )
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("{} [{}]", flights, itinerary.duration)
        })
        .collect::<Vec<_>>()
        .join(" | return: ");

    format!("{} {}: {}", offer.price.total, offer.price.currency, legs)
}
