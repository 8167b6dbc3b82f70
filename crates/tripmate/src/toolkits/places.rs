use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::{require_text, single_string_schema, Toolkit};
use crate::errors::{ToolError, ToolResult};
use crate::models::content::Content;
use crate::models::tool::{Tool, ToolCall};
use crate::services::places::{FallbackPlaceSearch, PlaceCategory};
use crate::validation::parse_arguments;

#[derive(Debug, Deserialize)]
struct PlaceArgs {
    place: String,
}

pub struct PlacesToolkit {
    tools: Vec<Tool>,
    search: Arc<FallbackPlaceSearch>,
}

impl PlacesToolkit {
    pub fn new(search: Arc<FallbackPlaceSearch>) -> Self {
        let schema = || single_string_schema("place", "The name of the place, e.g. Kyoto");
        let tools = vec![
            Tool::new(
                "search_attractions",
                "Search for attractions in a specific place.",
                schema(),
            ),
            Tool::new(
                "search_restaurants",
                "Search for restaurants and eateries in a specific place.",
                schema(),
            ),
            Tool::new(
                "search_activities",
                "Search for activities in and around a specific place.",
                schema(),
            ),
            Tool::new(
                "search_transportation",
                "Search for the modes of transportation available in a specific place.",
                schema(),
            ),
        ];

        Self { tools, search }
    }

    async fn search(
        &self,
        tool: &str,
        category: PlaceCategory,
        arguments: Value,
    ) -> ToolResult<Vec<Content>> {
        let args: PlaceArgs = parse_arguments(tool, arguments)?;
        require_text(tool, "place", &args.place)?;

        let text = self.search.search(category, args.place.trim()).await;
        Ok(vec![Content::text(text)])
    }
}

#[async_trait]
impl Toolkit for PlacesToolkit {
    fn name(&self) -> &str {
        "places"
    }

    fn description(&self) -> &str {
        "Attractions, restaurants, activities and local transport for a destination"
    }

    fn instructions(&self) -> &str {
        "Results come from Google Places, or from a web search when Google fails. If a result \
         says nothing could be found, tell the user instead of inventing places."
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall) -> ToolResult<Vec<Content>> {
        let category = match tool_call.name.as_str() {
            "search_attractions" => PlaceCategory::Attractions,
            "search_restaurants" => PlaceCategory::Restaurants,
            "search_activities" => PlaceCategory::Activities,
            "search_transportation" => PlaceCategory::Transportation,
            _ => return Err(ToolError::NotFound(tool_call.name)),
        };
        self.search(&tool_call.name, category, tool_call.arguments)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::places::MockPlaceSearch;
    use serde_json::json;

    fn toolkit(primary: MockPlaceSearch, secondary: MockPlaceSearch) -> PlacesToolkit {
        PlacesToolkit::new(Arc::new(FallbackPlaceSearch::new(
            Arc::new(primary),
            Arc::new(secondary),
        )))
    }

    #[tokio::test]
    async fn test_search_restaurants_routes_category() {
        let mut primary = MockPlaceSearch::new();
        primary.expect_name().return_const("Google Places");
        primary
            .expect_search()
            .withf(|q: &str| q.contains("restaurants and eateries in and around Kyoto"))
            .times(1)
            .returning(|_| Ok("1. Ippudo".to_string()));
        let mut secondary = MockPlaceSearch::new();
        secondary.expect_name().return_const("Tavily");
        secondary.expect_search().times(0);

        let result = toolkit(primary, secondary)
            .call(ToolCall::new("search_restaurants", json!({"place": "Kyoto"})))
            .await
            .unwrap();

        assert_eq!(
            result[0].as_text(),
            Some("Following are the restaurants of Kyoto as suggested by google: 1. Ippudo")
        );
    }

    #[tokio::test]
    async fn test_double_failure_is_still_a_result() {
        let mut primary = MockPlaceSearch::new();
        primary.expect_name().return_const("Google Places");
        primary
            .expect_search()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("denied")));
        let mut secondary = MockPlaceSearch::new();
        secondary.expect_name().return_const("Tavily");
        secondary
            .expect_search()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("unreachable")));

        let result = toolkit(primary, secondary)
            .call(ToolCall::new("search_attractions", json!({"place": "Lima"})))
            .await;

        let content = result.expect("place search never fails the tool call");
        assert!(content[0].as_text().unwrap().contains("Could not find any attractions for Lima"));
    }

    #[tokio::test]
    async fn test_blank_place_is_rejected_before_searching() {
        let mut primary = MockPlaceSearch::new();
        primary.expect_search().times(0);
        let mut secondary = MockPlaceSearch::new();
        secondary.expect_search().times(0);

        let err = toolkit(primary, secondary)
            .call(ToolCall::new("search_activities", json!({"place": ""})))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParameters(_)));
    }
}
