//! Text-generation backends
//!
//! The fine-tuned flow model runs out of process behind an OpenAI-compatible
//! completions API (vLLM, TGI, llama.cpp server). [`CompletionsGenerator`]
//! sends one non-streaming request per prompt:
//! ```text
//! POST {endpoint}/completions
//! {"model":"flow-classifier","prompt":"[INST] ...","max_tokens":1000,"temperature":0.1,"top_p":0.9,"n":1}
//! ```

use crate::config::GeneratorConfig;
use async_trait::async_trait;
use flowsiem_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Anything that turns a prompt into generated text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`, returning only the new text
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Generator backed by an OpenAI-compatible `/completions` endpoint
#[derive(Debug, Clone)]
pub struct CompletionsGenerator {
    client: reqwest::Client,
    url: String,
    config: GeneratorConfig,
}

impl CompletionsGenerator {
    /// Build a generator from configuration
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::inference(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.completions_url(),
            config,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }
}

#[async_trait]
impl TextGenerator for CompletionsGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = CompletionRequest {
            model: &self.config.model,
            prompt,
            max_tokens: self.config.max_new_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            n: 1,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::inference(format!("Generation request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::inference(format!(
                "Generation backend returned {}: {}",
                status, body
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::inference(format!("Malformed generation response: {}", e)))?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or_else(|| Error::inference("Generation response contained no choices"))?;

        debug!(chars = text.len(), "Generated completion");
        Ok(text)
    }
}

// =============================================================================
// Completions API Structures
// =============================================================================

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    n: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
    // finish_reason: Option<String>,
}
