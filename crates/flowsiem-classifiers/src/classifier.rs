//! Classifier trait and the generative flow classifier

use crate::config::GeneratorConfig;
use crate::generator::{CompletionsGenerator, TextGenerator};
use crate::label::extract_label;
use async_trait::async_trait;
use flowsiem_core::{Label, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Trait for all flow classifiers
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify a free-text flow description
    async fn classify(&self, flow_text: &str) -> Result<Label>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Build the instruction prompt the flow model was fine-tuned on
pub fn flow_prompt(flow_text: &str) -> String {
    format!(
        "[INST] ###instruction: Check if the given traffic flow is normal or of an attacker or a victim\n###input: {}\n#output: [/INST]",
        flow_text
    )
}

/// Classifier that prompts a text-generation model and reads the label out
/// of its answer
///
/// This is the run-scoped model handle: the controller constructs it once
/// and every `classify` call goes through the same generator.
#[derive(Clone)]
pub struct GenerativeClassifier {
    name: String,
    generator: Arc<dyn TextGenerator>,
}

impl GenerativeClassifier {
    /// Wrap an existing generator
    pub fn new(name: impl Into<String>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            name: name.into(),
            generator,
        }
    }

    /// Connect to the configured completions backend
    pub fn load(config: GeneratorConfig) -> Result<Self> {
        info!(
            "Loading flow classifier: model={} endpoint={}",
            config.model, config.endpoint
        );
        let name = config.model.clone();
        let generator = CompletionsGenerator::new(config)?;
        Ok(Self::new(name, Arc::new(generator)))
    }
}

#[async_trait]
impl Classifier for GenerativeClassifier {
    async fn classify(&self, flow_text: &str) -> Result<Label> {
        let start = Instant::now();

        let response = self.generator.generate(&flow_prompt(flow_text)).await?;
        let label = extract_label(&response);

        debug!(
            %label,
            latency_ms = start.elapsed().as_millis() as u64,
            "Classified flow"
        );
        Ok(label)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
