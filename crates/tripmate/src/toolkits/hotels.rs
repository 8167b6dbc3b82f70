use async_trait::async_trait;
use chrono::Local;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::flights::ensure_adults;
use super::Toolkit;
use crate::errors::{ToolError, ToolResult};
use crate::models::content::Content;
use crate::models::tool::{Tool, ToolCall};
use crate::services::amadeus::{AmadeusClient, HotelQuery};
use crate::validation::{ensure_not_past, parse_arguments, IataCode, IsoDate};

fn default_adults() -> u8 {
    1
}

#[derive(Debug, Deserialize)]
struct SearchHotelsArgs {
    city_code: IataCode,
    check_in: IsoDate,
    check_out: IsoDate,
    #[serde(default = "default_adults")]
    adults: u8,
}

pub struct HotelsToolkit {
    tools: Vec<Tool>,
    client: Arc<AmadeusClient>,
}

impl HotelsToolkit {
    pub fn new(client: Arc<AmadeusClient>) -> Self {
        let search = Tool::new(
            "search_hotels",
            "Search hotel offers in a city for the given check-in and check-out dates.",
            json!({
                "type": "object",
                "required": ["city_code", "check_in", "check_out"],
                "properties": {
                    "city_code": {
                        "type": "string",
                        "description": "3-letter IATA city code, e.g. PAR"
                    },
                    "check_in": {
                        "type": "string",
                        "description": "Check-in date as YYYY-MM-DD"
                    },
                    "check_out": {
                        "type": "string",
                        "description": "Check-out date as YYYY-MM-DD"
                    },
                    "adults": {
                        "type": "integer",
                        "default": 1,
                        "description": "Number of adult guests (1-9)"
                    }
                }
            }),
        );

        Self {
            tools: vec![search],
            client,
        }
    }

    async fn search_hotels(&self, arguments: Value) -> ToolResult<Vec<Content>> {
        const TOOL: &str = "search_hotels";
        let args: SearchHotelsArgs = parse_arguments(TOOL, arguments)?;

        ensure_adults(TOOL, args.adults)?;
        ensure_not_past("check_in", args.check_in, Local::now().date_naive())?;
        if args.check_out <= args.check_in {
            return Err(ToolError::InvalidParameters(format!(
                "check_out {} must be after check_in {}",
                args.check_out, args.check_in
            )));
        }

        let query = HotelQuery {
            city_code: args.city_code,
            check_in: args.check_in,
            check_out: args.check_out,
            adults: args.adults,
        };

        let summary = self
            .client
            .search_hotels(&query)
            .await
            .map_err(|e| ToolError::ExecutionError(format!("{:#}", e)))?;
        Ok(vec![Content::text(summary)])
    }
}

#[async_trait]
impl Toolkit for HotelsToolkit {
    fn name(&self) -> &str {
        "hotels"
    }

    fn description(&self) -> &str {
        "Hotel availability and prices from the Amadeus hotel search"
    }

    fn instructions(&self) -> &str {
        "Hotel search needs an IATA city code and both stay dates. Prices are totals for the \
         whole stay in the currency the hotel quotes."
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall) -> ToolResult<Vec<Content>> {
        match tool_call.name.as_str() {
            "search_hotels" => self.search_hotels(tool_call.arguments).await,
            _ => Err(ToolError::NotFound(tool_call.name)),
        }
    }
}
