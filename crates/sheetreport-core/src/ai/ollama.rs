use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::ReportError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    // Either "json" or a full JSON schema for structured outputs
    format: &'a Value,
}

#[derive(Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}

#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn generate_json(
        &self,
        model: &str,
        prompt: &str,
        schema: &Value,
    ) -> Result<String, ReportError> {
        let url = format!("{}/api/generate", self.base_url);

        let request = OllamaRequest {
            model,
            prompt,
            stream: false,
            format: schema,
        };

        debug!(model, url = %url, "sending Ollama generate request");
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ReportError::Api { status, body });
        }

        let ollama_response: OllamaResponse = response.json().await?;
        if ollama_response.response.trim().is_empty() {
            return Err(ReportError::EmptyResponse);
        }
        Ok(ollama_response.response)
    }
}
