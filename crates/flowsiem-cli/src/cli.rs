use crate::config::AppConfig;
use crate::pipeline::{self, RunMode, RunSummary};
use clap::{Parser, Subcommand};
use flowsiem_delivery::Credentials;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "flowsiem")]
#[command(
    author,
    version,
    about = "Classify network flows with a language model and forward attacker/victim events to a SIEM"
)]
#[command(propagate_version = true, arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "flowsiem.yaml", global = true)]
    pub config: String,

    /// Base URL of the completions API serving the flow model
    #[arg(long, global = true)]
    pub generator_url: Option<String>,

    /// Model name to request from the completions API
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify flows and send flagged events to the SIEM API
    Send {
        /// Newline-delimited JSON flow file
        input_file: PathBuf,

        /// SIEM API user
        user: String,

        /// SIEM API password
        password: String,

        /// SIEM manager host
        host: String,
    },

    /// Classify flows and save flagged events to a file
    Save {
        /// Newline-delimited JSON flow file
        input_file: PathBuf,

        /// Event file to write
        output_file: PathBuf,
    },

    /// Send events from a saved file to the SIEM API
    #[command(name = "sendfile")]
    SendFile {
        /// Event file written by `save`
        input_file: PathBuf,

        /// SIEM API user
        user: String,

        /// SIEM API password
        password: String,

        /// SIEM manager host
        host: String,
    },
}

impl Cli {
    /// Load configuration and perform the selected run
    ///
    /// A failure is logged at error level before it is returned.
    pub async fn execute(self) -> anyhow::Result<RunSummary> {
        let result = self.execute_inner().await;
        if let Err(e) = &result {
            error!("Run failed: {:#}", e);
        }
        result
    }

    async fn execute_inner(self) -> anyhow::Result<RunSummary> {
        let config = AppConfig::load(&self.config, &self)?;
        info!("Configuration loaded");
        info!("Generator: {} ({})", config.generator.endpoint, config.generator.model);

        let summary = pipeline::run(self.command.into_run_mode(), &config).await?;
        if summary.batches_failed > 0 {
            warn!(
                "{} of {} batches were rejected by the SIEM",
                summary.batches_failed, summary.batches_sent
            );
        }
        Ok(summary)
    }
}

impl Commands {
    /// Select the run mode for this invocation
    pub fn into_run_mode(self) -> RunMode {
        match self {
            Self::Send {
                input_file,
                user,
                password,
                host,
            } => RunMode::Send {
                input: input_file,
                credentials: Credentials::new(user, password),
                host,
            },
            Self::Save {
                input_file,
                output_file,
            } => RunMode::Save {
                input: input_file,
                output: output_file,
            },
            Self::SendFile {
                input_file,
                user,
                password,
                host,
            } => RunMode::SendFile {
                input: input_file,
                credentials: Credentials::new(user, password),
                host,
            },
        }
    }
}
