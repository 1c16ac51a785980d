use chrono::Local;
use serde_json::Value;
use tracing::{info, warn};

use crate::ai::{GeminiClient, OllamaClient, OpenAIClient};
use crate::config::Config;
use crate::error::ReportError;
use crate::provider::Provider;
use crate::record::SalesRecord;
use crate::report::{decode_report, report_schema, AiReport};

/// The remote service a report request goes to
#[derive(Clone)]
pub enum Backend {
    Gemini(GeminiClient),
    Ollama(OllamaClient),
    OpenAI(OpenAIClient),
    /// Selected provider has no credential; every request fails
    Unconfigured(Provider),
}

impl Backend {
    pub fn provider(&self) -> Provider {
        match self {
            Backend::Gemini(_) => Provider::Gemini,
            Backend::Ollama(_) => Provider::Ollama,
            Backend::OpenAI(_) => Provider::OpenAI,
            Backend::Unconfigured(provider) => *provider,
        }
    }

    async fn generate_json(
        &self,
        model: &str,
        prompt: &str,
        schema: &Value,
    ) -> Result<String, ReportError> {
        match self {
            Backend::Gemini(client) => client.generate_json(model, prompt, schema).await,
            Backend::Ollama(client) => client.generate_json(model, prompt, schema).await,
            Backend::OpenAI(client) => client.generate_json(model, prompt, schema).await,
            Backend::Unconfigured(provider) => Err(ReportError::MissingCredential {
                provider: *provider,
            }),
        }
    }
}

/// Turns a data sheet into an `AiReport` with one request to the backend
#[derive(Clone)]
pub struct ReportClient {
    backend: Backend,
    model: String,
}

impl ReportClient {
    pub fn new(backend: Backend, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let provider = config.provider();
        let backend = match provider {
            Provider::Gemini => config
                .gemini_api_key()
                .map(|key| Backend::Gemini(GeminiClient::new(&key)))
                .unwrap_or(Backend::Unconfigured(provider)),
            Provider::OpenAI => config
                .openai_api_key()
                .map(|key| Backend::OpenAI(OpenAIClient::new(&key)))
                .unwrap_or(Backend::Unconfigured(provider)),
            Provider::Ollama => Backend::Ollama(OllamaClient::new(&config.ollama_url())),
        };
        Self::new(backend, config.model())
    }

    pub fn provider(&self) -> Provider {
        self.backend.provider()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One attempt, no retry. The report is dated when the response arrives.
    pub async fn generate(&self, records: &[SalesRecord]) -> Result<AiReport, ReportError> {
        if records.is_empty() {
            return Err(ReportError::EmptyDataset);
        }

        let prompt = build_prompt(records)?;
        info!(
            provider = self.provider().as_str(),
            model = %self.model,
            records = records.len(),
            "requesting sales report"
        );

        let text = self
            .backend
            .generate_json(&self.model, &prompt, &report_schema())
            .await?;

        decode_report(&text, Local::now().date_naive()).inspect_err(|err| {
            warn!(error = %err, "report response rejected");
        })
    }
}

pub fn build_prompt(records: &[SalesRecord]) -> Result<String, ReportError> {
    let data = serde_json::to_string(records).map_err(|e| ReportError::Encode {
        message: e.to_string(),
    })?;

    let mut prompt = String::new();
    prompt.push_str("Act as a senior business analyst. Analyze the following sales data JSON.\n");
    prompt.push_str("Generate a concise but professional executive report.\n\n");
    prompt.push_str("Data: ");
    prompt.push_str(&data);
    prompt.push_str("\n\nProvide the output in strict JSON format.\n");
    prompt.push_str("- \"summary\": A paragraph summarizing the overall performance.\n");
    prompt.push_str("- \"keyInsights\": An array of strings with 3-4 bullet points regarding trends, top products, or concerns.\n");
    prompt.push_str("- \"recommendation\": A strategic action item based on the data.\n");

    Ok(prompt)
}
