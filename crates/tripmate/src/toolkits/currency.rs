use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::Toolkit;
use crate::errors::{ToolError, ToolResult};
use crate::models::content::Content;
use crate::models::tool::{Tool, ToolCall};
use crate::services::currency::ExchangeRateClient;
use crate::validation::{parse_arguments, Amount, CurrencyCode};

#[derive(Debug, Deserialize)]
struct ConvertArgs {
    amount: Amount,
    from_currency: CurrencyCode,
    to_currency: CurrencyCode,
}

pub struct CurrencyToolkit {
    tools: Vec<Tool>,
    client: Arc<ExchangeRateClient>,
}

impl CurrencyToolkit {
    pub fn new(client: Arc<ExchangeRateClient>) -> Self {
        let convert = Tool::new(
            "convert_currency",
            "Convert an amount from one currency to another using today's exchange rate.",
            json!({
                "type": "object",
                "required": ["amount", "from_currency", "to_currency"],
                "properties": {
                    "amount": {
                        "type": ["number", "string"],
                        "description": "The amount to convert, e.g. 120 or \"$120\""
                    },
                    "from_currency": {
                        "type": "string",
                        "description": "ISO-4217 code of the source currency, e.g. USD"
                    },
                    "to_currency": {
                        "type": "string",
                        "description": "ISO-4217 code of the target currency, e.g. EUR"
                    }
                }
            }),
        );

        Self {
            tools: vec![convert],
            client,
        }
    }

    async fn convert(&self, arguments: Value) -> ToolResult<Vec<Content>> {
        let args: ConvertArgs = parse_arguments("convert_currency", arguments)?;

        let converted = self
            .client
            .convert(args.amount.0, &args.from_currency, &args.to_currency)
            .await
            .map_err(|e| ToolError::ExecutionError(format!("{:#}", e)))?;

        Ok(vec![Content::text(format!(
            "{} {} = {:.2} {}",
            args.amount.0, args.from_currency, converted, args.to_currency
        ))])
    }
}

#[async_trait]
impl Toolkit for CurrencyToolkit {
    fn name(&self) -> &str {
        "currency"
    }

    fn description(&self) -> &str {
        "Currency conversion at current exchange rates"
    }

    fn instructions(&self) -> &str {
        "Convert prices into the user's currency when they mention one. Currency codes are \
         three-letter ISO-4217 codes such as USD, EUR or INR."
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall) -> ToolResult<Vec<Content>> {
        match tool_call.name.as_str() {
            "convert_currency" => self.convert(tool_call.arguments).await,
            _ => Err(ToolError::NotFound(tool_call.name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn toolkit_for(server: &MockServer) -> CurrencyToolkit {
        let client = ExchangeRateClient::new("fx-key", Duration::from_secs(5))
            .unwrap()
            .with_host(server.uri());
        CurrencyToolkit::new(Arc::new(client))
    }

    #[tokio::test]
    async fn test_convert_currency_formats_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v6/fx-key/latest/USD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "conversion_rates": {"INR": 83.125}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = toolkit_for(&server)
            .await
            .call(ToolCall::new(
                "convert_currency",
                json!({"amount": "$100", "from_currency": "usd", "to_currency": "inr"}),
            ))
            .await
            .unwrap();

        assert_eq!(result[0].as_text(), Some("100 USD = 8312.50 INR"));
    }

    #[tokio::test]
    async fn test_invalid_code_never_reaches_the_api() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = toolkit_for(&server)
            .await
            .call(ToolCall::new(
                "convert_currency",
                json!({"amount": 10, "from_currency": "dollars", "to_currency": "EUR"}),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParameters(_)));
    }

    #[tokio::test]
    async fn test_remote_failure_is_execution_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = toolkit_for(&server)
            .await
            .call(ToolCall::new(
                "convert_currency",
                json!({"amount": 10, "from_currency": "GBP", "to_currency": "EUR"}),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::ExecutionError(_)));
    }
}
