//! Runtime configuration

use crate::cli::Cli;
use flowsiem_classifiers::GeneratorConfig;
use flowsiem_delivery::SiemConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration shared by all run modes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Text-generation backend hosting the flow model
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// SIEM manager connection settings
    #[serde(default)]
    pub siem: SiemConfig,
}

impl AppConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            Self::from_yaml(&content)?
        } else {
            Self::default()
        };

        // Apply CLI overrides
        if let Some(url) = &cli.generator_url {
            config.generator.endpoint = url.clone();
        }

        if let Some(model) = &cli.model {
            config.generator.model = model.clone();
        }

        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}
