use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::base::{Provider, Usage};
use super::configs::GroqProviderConfig;
use super::utils::{
    create_openai_request_payload, get_openai_usage, openai_response_to_message,
    post_chat_completion,
};
use crate::models::message::Message;
use crate::models::tool::Tool;

/// Groq serves an OpenAI-compatible API under this prefix
pub const GROQ_HOST: &str = "https://api.groq.com/openai";
pub const GROQ_MODEL: &str = "llama-3.3-70b-versatile";

pub struct GroqProvider {
    client: Client,
    config: GroqProviderConfig,
}

impl GroqProvider {
    pub fn new(config: GroqProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Provider for GroqProvider {
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
    ) -> Result<(Message, Usage)> {
        let payload = create_openai_request_payload(
            &self.config.model,
            system,
            messages,
            tools,
            self.config.temperature,
            self.config.max_tokens,
        )?;

        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );
        let response = post_chat_completion(&self.client, &url, &self.config.api_key, &payload).await?;

        if let Some(error) = response.get("error") {
            return Err(anyhow!("Groq API error: {}", error));
        }

        let usage = get_openai_usage(&response);
        let message = openai_response_to_message(response)?;
        tracing::debug!(model = %self.config.model, ?usage, "groq completion");

        Ok((message, usage))
    }
}
