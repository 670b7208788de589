//! flowsiem Classifiers
//!
//! Flow classification through a text-generation model prompted as a
//! classifier.
//!
//! The model answers in free text; [`extract_label`] maps that answer onto a
//! [`Label`](flowsiem_core::Label). The pipeline only depends on the
//! [`Classifier`] trait so tests can substitute deterministic stubs.

pub mod classifier;
pub mod config;
pub mod generator;
pub mod label;

pub use classifier::{flow_prompt, Classifier, GenerativeClassifier};
pub use config::GeneratorConfig;
pub use generator::{CompletionsGenerator, TextGenerator};
pub use label::extract_label;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{Classifier, GenerativeClassifier};
    pub use crate::config::GeneratorConfig;
    pub use crate::generator::TextGenerator;
}
