use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::{require_text, single_string_schema, Toolkit};
use crate::errors::{ToolError, ToolResult};
use crate::models::content::Content;
use crate::models::tool::{Tool, ToolCall};
use crate::services::weather::OpenWeatherClient;
use crate::validation::parse_arguments;

#[derive(Debug, Deserialize)]
struct CityArgs {
    city: String,
}

pub struct WeatherToolkit {
    tools: Vec<Tool>,
    client: Arc<OpenWeatherClient>,
}

impl WeatherToolkit {
    pub fn new(client: Arc<OpenWeatherClient>) -> Self {
        let current = Tool::new(
            "get_current_weather",
            "Get the current weather for a specific city.",
            single_string_schema("city", "The name of the city, e.g. Paris"),
        );
        let forecast = Tool::new(
            "get_weather_forecast",
            "Get the weather forecast for a specific city in 3-hour steps.",
            single_string_schema("city", "The name of the city, e.g. Paris"),
        );

        Self {
            tools: vec![current, forecast],
            client,
        }
    }

    async fn current_weather(&self, arguments: Value) -> ToolResult<Vec<Content>> {
        let args: CityArgs = parse_arguments("get_current_weather", arguments)?;
        require_text("get_current_weather", "city", &args.city)?;

        let data = self
            .client
            .current(&args.city)
            .await
            .map_err(|e| ToolError::ExecutionError(format!("{:#}", e)))?;

        let text = match data {
            Some(data) => {
                let temp = display_or_na(&data["main"]["temp"]);
                let description = display_or_na(&data["weather"][0]["description"]);
                format!("Current weather in {}: {}°C, {}", args.city, temp, description)
            }
            None => format!("Couldn't fetch current weather details for {}", args.city),
        };
        Ok(vec![Content::text(text)])
    }

    async fn weather_forecast(&self, arguments: Value) -> ToolResult<Vec<Content>> {
        let args: CityArgs = parse_arguments("get_weather_forecast", arguments)?;
        require_text("get_weather_forecast", "city", &args.city)?;

        let data = self
            .client
            .forecast(&args.city)
            .await
            .map_err(|e| ToolError::ExecutionError(format!("{:#}", e)))?;

        let entries = data
            .as_ref()
            .and_then(|d| d["list"].as_array())
            .filter(|list| !list.is_empty());

        let Some(entries) = entries else {
            return Ok(vec![Content::text(format!(
                "Could not fetch the forecast for {}",
                args.city
            ))]);
        };

        let lines = entries
            .iter()
            .map(|item| {
                let date = item["dt_txt"]
                    .as_str()
                    .and_then(|dt| dt.split(' ').next())
                    .unwrap_or("N/A");
                format!(
                    "{}: {} degree Celsius, {}",
                    date,
                    display_or_na(&item["main"]["temp"]),
                    display_or_na(&item["weather"][0]["description"])
                )
            })
            .collect::<Vec<_>>();

        Ok(vec![Content::text(format!(
            "Weather forecast for {}:\n{}",
            args.city,
            lines.join("\n")
        ))])
    }
}

fn display_or_na(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "N/A".to_string(),
        other => other.to_string(),
    }
}

#[async_trait]
impl Toolkit for WeatherToolkit {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Current weather and short-range forecasts from OpenWeatherMap"
    }

    fn instructions(&self) -> &str {
        "Use get_current_weather for today's conditions and get_weather_forecast when the user \
         travels in the next few days. Temperatures are in degrees Celsius."
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall) -> ToolResult<Vec<Content>> {
        match tool_call.name.as_str() {
            "get_current_weather" => self.current_weather(tool_call.arguments).await,
            "get_weather_forecast" => self.weather_forecast(tool_call.arguments).await,
            _ => Err(ToolError::NotFound(tool_call.name)),
        }
    }
}
