//! flowsiem CLI
//!
//! Run modes, configuration, and the pipeline controller behind the
//! `flowsiem` binary.

pub mod cli;
pub mod config;
pub mod pipeline;

pub use cli::{Cli, Commands};
pub use config::AppConfig;
pub use pipeline::{
    classify_and_persist, classify_and_send, persist_and_send, run, RunMode, RunSummary,
};
