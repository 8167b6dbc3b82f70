use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::Toolkit;
use crate::calculator;
use crate::errors::{ToolError, ToolResult};
use crate::models::content::Content;
use crate::models::tool::{Tool, ToolCall};
use crate::validation::{parse_arguments, Amount};

#[derive(Debug, Deserialize)]
struct HotelCostArgs {
    price_per_night: Amount,
    total_days: Amount,
}

#[derive(Debug, Deserialize)]
struct TotalArgs {
    costs: Vec<Amount>,
}

#[derive(Debug, Deserialize)]
struct DailyBudgetArgs {
    total_cost: Amount,
    days: Amount,
}

const AMOUNT_SCHEMA: &str = "A number, or text containing one such as \"$120\"";

pub struct ExpensesToolkit {
    tools: Vec<Tool>,
}

impl Default for ExpensesToolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpensesToolkit {
    pub fn new() -> Self {
        let amount = |description: &str| {
            json!({
                "type": ["number", "string"],
                "description": format!("{}. {}", description, AMOUNT_SCHEMA)
            })
        };

        let hotel_cost = Tool::new(
            "estimate_total_hotel_cost",
            "Calculate the total hotel cost from the price per night and the number of nights.",
            json!({
                "type": "object",
                "required": ["price_per_night", "total_days"],
                "properties": {
                    "price_per_night": amount("The cost of the hotel per night"),
                    "total_days": amount("The number of nights stayed")
                }
            }),
        );
        let total = Tool::new(
            "calculate_total_expense",
            "Calculate the total expense of the trip by summing all individual costs.",
            json!({
                "type": "object",
                "required": ["costs"],
                "properties": {
                    "costs": {
                        "type": "array",
                        "items": amount("One cost"),
                        "description": "Every individual cost of the trip"
                    }
                }
            }),
        );
        let daily = Tool::new(
            "calculate_daily_expense_budget",
            "Calculate the budget per day from the total cost and the number of days.",
            json!({
                "type": "object",
                "required": ["total_cost", "days"],
                "properties": {
                    "total_cost": amount("The total cost of the trip"),
                    "days": amount("The number of days of the trip")
                }
            }),
        );

        Self {
            tools: vec![hotel_cost, total, daily],
        }
    }

    fn hotel_cost(&self, arguments: Value) -> ToolResult<Vec<Content>> {
        let args: HotelCostArgs = parse_arguments("estimate_total_hotel_cost", arguments)?;
        let cost = calculator::multiply(args.price_per_night.0, args.total_days.0);
        tracing::debug!(cost, "estimated hotel cost");
        Ok(vec![Content::text(cost.to_string())])
    }

    fn total(&self, arguments: Value) -> ToolResult<Vec<Content>> {
        let args: TotalArgs = parse_arguments("calculate_total_expense", arguments)?;
        Ok(vec![Content::text(
            calculator::calculate_total(&args.costs).to_string(),
        )])
    }

    fn daily_budget(&self, arguments: Value) -> ToolResult<Vec<Content>> {
        let args: DailyBudgetArgs = parse_arguments("calculate_daily_expense_budget", arguments)?;
        Ok(vec![Content::text(
            calculator::calculate_daily_budget(args.total_cost.0, args.days.0).to_string(),
        )])
    }
}

#[async_trait]
impl Toolkit for ExpensesToolkit {
    fn name(&self) -> &str {
        "expenses"
    }

    fn description(&self) -> &str {
        "Trip cost totals, hotel cost estimates and daily budgets"
    }

    fn instructions(&self) -> &str {
        "Always use these tools for cost arithmetic instead of computing totals yourself."
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall) -> ToolResult<Vec<Content>> {
        match tool_call.name.as_str() {
            "estimate_total_hotel_cost" => self.hotel_cost(tool_call.arguments),
            "calculate_total_expense" => self.total(tool_call.arguments),
            "calculate_daily_expense_budget" => self.daily_budget(tool_call.arguments),
            _ => Err(ToolError::NotFound(tool_call.name)),
        }
    }
}
