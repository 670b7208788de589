//! Pipeline controller
//!
//! One run is one pass over its input in one of three modes:
//! - `send`: classify flows, batch flagged events, post them to the SIEM
//! - `save`: classify flows, write all flagged events to a file once
//! - `sendfile`: load a saved file and post it to the SIEM in batches
//!
//! Processing is strictly sequential. A flow is read, classified, filtered,
//! and offered to the batch accumulator before the next one is read, so
//! events reach the sink in input order.

use flowsiem_classifiers::{Classifier, GenerativeClassifier};
use flowsiem_core::{Event, FlowReader, Result, SerializedEvent};
use flowsiem_delivery::{
    BatchAccumulator, Credentials, HttpConnector, PersistenceStore, SiemConnector, SinkTarget,
};
use std::path::{Path, PathBuf};
use tokio::io::AsyncBufRead;
use tracing::{info, info_span, Instrument};

use crate::config::AppConfig;

/// Run mode selected once per invocation
#[derive(Debug, Clone)]
pub enum RunMode {
    /// Classify `input` and send flagged events to `host`
    Send {
        input: PathBuf,
        credentials: Credentials,
        host: String,
    },

    /// Classify `input` and save flagged events to `output`
    Save { input: PathBuf, output: PathBuf },

    /// Send the events saved in `input` to `host`
    SendFile {
        input: PathBuf,
        credentials: Credentials,
        host: String,
    },
}

impl RunMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Send { .. } => "send",
            Self::Save { .. } => "save",
            Self::SendFile { .. } => "sendfile",
        }
    }
}

/// What a run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Flow records read from the input
    pub flows_read: usize,

    /// Events produced (classified as attacker or victim, or loaded from file)
    pub events: usize,

    /// Batches posted to the SIEM
    pub batches_sent: usize,

    /// Posted batches the SIEM answered with a non-2xx status
    pub batches_failed: usize,
}

/// Execute one run, constructing the model handle and SIEM connection the
/// mode needs
pub async fn run(mode: RunMode, config: &AppConfig) -> Result<RunSummary> {
    let span = info_span!("run", mode = mode.name(), run_id = %uuid::Uuid::new_v4());

    async move {
        let summary = match mode {
            RunMode::Send {
                input,
                credentials,
                host,
            } => {
                let classifier = GenerativeClassifier::load(config.generator.clone())?;
                let connector = HttpConnector::new(&config.siem, host)?;
                classify_and_send(&classifier, &connector, &credentials, &input).await?
            }
            RunMode::Save { input, output } => {
                let classifier = GenerativeClassifier::load(config.generator.clone())?;
                classify_and_persist(&classifier, &input, &PersistenceStore::new(output)).await?
            }
            RunMode::SendFile {
                input,
                credentials,
                host,
            } => {
                let connector = HttpConnector::new(&config.siem, host)?;
                persist_and_send(&connector, &credentials, &PersistenceStore::new(input)).await?
            }
        };

        info!(
            flows_read = summary.flows_read,
            events = summary.events,
            batches_sent = summary.batches_sent,
            batches_failed = summary.batches_failed,
            "Run complete"
        );
        Ok::<_, flowsiem_core::Error>(summary)
    }
    .instrument(span)
    .await
}

/// Classify every flow in `input` and post flagged events in batches
///
/// Authentication happens before the input is opened; a rejected login
/// leaves the input untouched.
pub async fn classify_and_send<C, K>(
    classifier: &C,
    connector: &K,
    credentials: &Credentials,
    input: &Path,
) -> Result<RunSummary>
where
    C: Classifier + ?Sized,
    K: SiemConnector + ?Sized,
{
    let sink = connector.connect(credentials).await?;
    let mut flows = FlowReader::open(input).await?;
    let mut summary = RunSummary::default();

    let mut accumulator = BatchAccumulator::new(SinkTarget::new(sink));
    while let Some(event) = next_flagged(classifier, &mut flows, &mut summary).await? {
        accumulator.offer(event).await?;
    }

    let (target, stats) = accumulator.finish().await?;
    summary.batches_sent = stats.batches;
    summary.batches_failed = target.failed();
    Ok(summary)
}

/// Classify every flow in `input` and write the flagged events to `store`
/// in one save at end of input
pub async fn classify_and_persist<C>(
    classifier: &C,
    input: &Path,
    store: &PersistenceStore,
) -> Result<RunSummary>
where
    C: Classifier + ?Sized,
{
    let mut flows = FlowReader::open(input).await?;
    let mut summary = RunSummary::default();

    let mut events = Vec::new();
    while let Some(event) = next_flagged(classifier, &mut flows, &mut summary).await? {
        events.push(event);
    }

    store.save(&events)?;
    Ok(summary)
}

/// Replay the events in `store` to the SIEM in batches
pub async fn persist_and_send<K>(
    connector: &K,
    credentials: &Credentials,
    store: &PersistenceStore,
) -> Result<RunSummary>
where
    K: SiemConnector + ?Sized,
{
    let sink = connector.connect(credentials).await?;
    let events = store.load()?;
    info!("Replaying {} saved events from {:?}", events.len(), store.path());

    let mut accumulator = BatchAccumulator::new(SinkTarget::new(sink));
    for event in events {
        accumulator.offer(event).await?;
    }

    let (target, stats) = accumulator.finish().await?;
    Ok(RunSummary {
        flows_read: 0,
        events: stats.events,
        batches_sent: stats.batches,
        batches_failed: target.failed(),
    })
}

/// Read and classify flows until one is flagged, or input ends
async fn next_flagged<C, R>(
    classifier: &C,
    flows: &mut FlowReader<R>,
    summary: &mut RunSummary,
) -> Result<Option<SerializedEvent>>
where
    C: Classifier + ?Sized,
    R: AsyncBufRead + Unpin,
{
    while let Some(record) = flows.next_record().await? {
        summary.flows_read += 1;

        let label = classifier.classify(&record.input).await?;
        metrics::counter!("flowsiem_flows_classified_total", "label" => label.as_str())
            .increment(1);

        if let Some(event) = Event::flagged(&record, label) {
            summary.events += 1;
            metrics::counter!("flowsiem_events_flagged_total").increment(1);
            return Ok(Some(event.serialize()?));
        }
    }

    Ok(None)
}
