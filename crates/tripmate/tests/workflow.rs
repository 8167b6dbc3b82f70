use anyhow::Result;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use tripmate::config::WorkflowSettings;
use tripmate::errors::WorkflowError;
use tripmate::providers::base::Provider;
use tripmate::providers::configs::{GroqProviderConfig, ProviderConfig};
use tripmate::providers::factory::get_provider;
use tripmate::registry::AgentRegistry;
use tripmate::services::amadeus::AmadeusClient;
use tripmate::services::currency::ExchangeRateClient;
use tripmate::services::places::{FallbackPlaceSearch, GooglePlacesClient, TavilyClient};
use tripmate::services::weather::OpenWeatherClient;
use tripmate::services::ServiceClients;
use tripmate::supervisor::LlmSupervisor;
use tripmate::workflow::Workflow;

/// Stands in for the chat-completions endpoint.
///
/// Supervisor requests (the only ones offering `route`) go to the itinerary
/// worker until some assistant has answered in text, then finish. Worker
/// requests call the weather tool once and then summarize its result.
#[derive(Clone, Default)]
struct TravelLlm {
    offered: Arc<Mutex<Vec<Vec<String>>>>,
}

impl TravelLlm {
    fn offered(&self) -> Vec<Vec<String>> {
        self.offered.lock().unwrap().clone()
    }
}

fn tool_call(name: &str, arguments: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": format!("call_{}", name),
                    "type": "function",
                    "function": {"name": name, "arguments": arguments.to_string()}
                }]
            }
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    }))
}

fn text(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"message": {"role": "assistant", "content": content}}],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    }))
}

impl Respond for TravelLlm {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = request.body_json().unwrap();
        let messages = body["messages"].as_array().cloned().unwrap_or_default();
        let tools: Vec<String> = body["tools"]
            .as_array()
            .map(|tools| {
                tools
                    .iter()
                    .filter_map(|t| t["function"]["name"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();
        self.offered.lock().unwrap().push(tools.clone());

        if tools == ["route"] {
            let answered = messages.iter().any(|m| {
                m["role"] == "assistant"
                    && m.get("tool_calls").is_none()
                    && m["content"].as_str().is_some_and(|c| !c.is_empty())
            });
            return if answered {
                tool_call("route", json!({"next": "FINISH", "reason": "answered"}))
            } else {
                tool_call("route", json!({"next": "ItineraryAgent", "reason": "weather question"}))
            };
        }

        match messages.last() {
            Some(last) if last["role"] == "tool" => text(&format!(
                "Here is the latest report. {}",
                last["content"].as_str().unwrap_or_default()
            )),
            _ => tool_call("weather__get_current_weather", json!({"city": "Paris"})),
        }
    }
}

fn services(weather_host: &str, unused_host: &str) -> Result<ServiceClients> {
    let timeout = Duration::from_secs(5);
    Ok(ServiceClients {
        weather: Arc::new(OpenWeatherClient::new("owm-key", timeout)?.with_host(weather_host)),
        places: Arc::new(FallbackPlaceSearch::new(
            Arc::new(GooglePlacesClient::new("gp-key", timeout)?.with_host(unused_host)),
            Arc::new(TavilyClient::new("tv-key", timeout)?.with_host(unused_host)),
        )),
        currency: Arc::new(ExchangeRateClient::new("fx-key", timeout)?.with_host(unused_host)),
        amadeus: Arc::new(
            AmadeusClient::new("am-key", "am-secret", timeout)?.with_host(unused_host),
        ),
    })
}

fn workflow(llm_host: &str, services: &ServiceClients) -> Result<Workflow> {
    let provider: Arc<dyn Provider> = Arc::from(get_provider(ProviderConfig::Groq(
        GroqProviderConfig {
            host: llm_host.to_string(),
            api_key: "gsk-test".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: None,
            max_tokens: None,
        },
    ))?);

    let settings = WorkflowSettings::default();
    let registry = AgentRegistry::new(provider.clone(), services, &settings);
    let supervisor = LlmSupervisor::new(provider, &registry.workers())?;

    Ok(Workflow::new(
        Arc::new(supervisor),
        Arc::new(registry),
        settings.max_round_trips,
    ))
}

#[tokio::test]
async fn test_weather_question_end_to_end() -> Result<()> {
    let llm_server = MockServer::start().await;
    let llm = TravelLlm::default();
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(llm.clone())
        .mount(&llm_server)
        .await;

    let weather_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Paris"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "main": {"temp": 18.4},
            "weather": [{"description": "light rain"}]
        })))
        .expect(1)
        .mount(&weather_server)
        .await;

    let unused_server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&unused_server)
        .await;

    let services = services(&weather_server.uri(), &unused_server.uri())?;
    let workflow = workflow(&llm_server.uri(), &services)?;

    let answer = workflow
        .run("What's the weather in Paris?", std::future::pending())
        .await?;

    assert!(answer.contains("18.4°C"), "answer was {:?}", answer);
    assert!(answer.contains("light rain"), "answer was {:?}", answer);

    // supervisor, itinerary worker twice, supervisor
    let offered = llm.offered();
    assert_eq!(offered.len(), 4);
    assert_eq!(offered[0], vec!["route"]);
    assert!(offered[1].contains(&"weather__get_current_weather".to_string()));
    assert!(!offered[1].contains(&"flights__search_transport".to_string()));
    assert_eq!(offered[3], vec!["route"]);
    Ok(())
}

#[tokio::test]
async fn test_empty_query_is_an_error() -> Result<()> {
    let llm_server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&llm_server)
        .await;

    let services = services(&llm_server.uri(), &llm_server.uri())?;
    let workflow = workflow(&llm_server.uri(), &services)?;

    let err = workflow.run("", std::future::pending()).await.unwrap_err();
    assert!(matches!(err, WorkflowError::EmptyQuery));
    assert_eq!(err.to_string(), "Query must not be empty");
    Ok(())
}

#[tokio::test]
async fn test_llm_outage_fails_the_request() -> Result<()> {
    let llm_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&llm_server)
        .await;

    let services = services(&llm_server.uri(), &llm_server.uri())?;
    let workflow = workflow(&llm_server.uri(), &services)?;

    let err = workflow
        .run("Find me a hotel in Rome", std::future::pending())
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("Supervisor model call failed"));
    Ok(())
}
