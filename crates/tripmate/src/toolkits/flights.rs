use async_trait::async_trait;
use chrono::Local;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::Toolkit;
use crate::errors::{ToolError, ToolResult};
use crate::models::content::Content;
use crate::models::tool::{Tool, ToolCall};
use crate::services::amadeus::{AmadeusClient, FlightQuery};
use crate::validation::{ensure_not_past, parse_arguments, IataCode, IsoDate};

fn default_adults() -> u8 {
    1
}

#[derive(Debug, Deserialize)]
struct SearchTransportArgs {
    origin: IataCode,
    destination: IataCode,
    departure_date: IsoDate,
    return_date: Option<IsoDate>,
    #[serde(default = "default_adults")]
    adults: u8,
}

/// Check traveller count shared by flight and hotel searches
pub(crate) fn ensure_adults(tool: &str, adults: u8) -> ToolResult<()> {
    if !(1..=9).contains(&adults) {
        return Err(ToolError::InvalidParameters(format!(
            "{}: adults must be between 1 and 9, got {}",
            tool, adults
        )));
    }
    Ok(())
}

pub struct FlightsToolkit {
    tools: Vec<Tool>,
    client: Arc<AmadeusClient>,
}

impl FlightsToolkit {
    pub fn new(client: Arc<AmadeusClient>) -> Self {
        let search = Tool::new(
            "search_transport",
            "Search flight offers between two cities for a departure date and an optional return date.",
            json!({
                "type": "object",
                "required": ["origin", "destination", "departure_date"],
                "properties": {
                    "origin": {
                        "type": "string",
                        "description": "3-letter IATA city or airport code of departure, e.g. PAR"
                    },
                    "destination": {
                        "type": "string",
                        "description": "3-letter IATA city or airport code of arrival, e.g. NYC"
                    },
                    "departure_date": {
                        "type": "string",
                        "description": "Departure date as YYYY-MM-DD"
                    },
                    "return_date": {
                        "type": "string",
                        "description": "Return date as YYYY-MM-DD for round trips; omit for one-way"
                    },
                    "adults": {
                        "type": "integer",
                        "default": 1,
                        "description": "Number of adult travellers (1-9)"
                    }
                }
            }),
        );

        Self {
            tools: vec![search],
            client,
        }
    }

    async fn search_transport(&self, arguments: Value) -> ToolResult<Vec<Content>> {
        const TOOL: &str = "search_transport";
        let args: SearchTransportArgs = parse_arguments(TOOL, arguments)?;

        ensure_adults(TOOL, args.adults)?;
        ensure_not_past("departure_date", args.departure_date, Local::now().date_naive())?;
        if let Some(return_date) = args.return_date {
            if return_date < args.departure_date {
                return Err(ToolError::InvalidParameters(format!(
                    "return_date {} is before departure_date {}",
                    return_date, args.departure_date
                )));
            }
        }
        if args.origin == args.destination {
            return Err(ToolError::InvalidParameters(format!(
                "origin and destination are both {}",
                args.origin
            )));
        }

        let query = FlightQuery {
            origin: args.origin,
            destination: args.destination,
            departure_date: args.departure_date,
            return_date: args.return_date,
            adults: args.adults,
        };

        let summary = self
            .client
            .search_flights(&query)
            .await
            .map_err(|e| ToolError::ExecutionError(format!("{:#}", e)))?;
        Ok(vec![Content::text(summary)])
    }
}

#[async_trait]
impl Toolkit for FlightsToolkit {
    fn name(&self) -> &str {
        "flights"
    }

    fn description(&self) -> &str {
        "Flight offers from the Amadeus flight search"
    }

    fn instructions(&self) -> &str {
        "Flight search needs IATA codes. Translate city names yourself (Paris is PAR, London is \
         LON, New York is NYC) and ask the user for the travel date if they did not give one."
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall) -> ToolResult<Vec<Content>> {
        match tool_call.name.as_str() {
            "search_transport" => self.search_transport(tool_call.arguments).await,
            _ => Err(ToolError::NotFound(tool_call.name)),
        }
    }
}
