//! Configuration for the text-generation backend

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for the completions server hosting the fine-tuned flow model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Base URL of an OpenAI-compatible API (the `/completions` path is appended)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name as registered with the server (base model plus adapter)
    #[serde(default = "default_model")]
    pub model: String,

    /// Upper bound on generated tokens per flow
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling cutoff
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl GeneratorConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Full URL of the completions endpoint
    pub fn completions_url(&self) -> String {
        format!("{}/completions", self.endpoint.trim_end_matches('/'))
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            max_new_tokens: default_max_new_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8000/v1".to_string()
}

fn default_model() -> String {
    "flow-classifier".to_string()
}

fn default_max_new_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.1
}

fn default_top_p() -> f32 {
    0.9
}

fn default_timeout_secs() -> u64 {
    300 // generation on CPU can be slow
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config =
            GeneratorConfig::from_yaml("model: mistral-flows\ntemperature: 0.0\n").unwrap();

        assert_eq!(config.model, "mistral-flows");
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.max_new_tokens, 1000);
        assert_eq!(config.top_p, 0.9);
    }

    #[test]
    fn test_completions_url_trims_slash() {
        let config = GeneratorConfig {
            endpoint: "http://gpu-box:8000/v1/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.completions_url(), "http://gpu-box:8000/v1/completions");
    }
}
