//! Fixed-size batching of security events

use crate::sink::EventSink;
use async_trait::async_trait;
use flowsiem_core::{Batch, Result, SerializedEvent};
use tracing::{info, warn};

/// Receiver of full (and final partial) batches
#[async_trait]
pub trait BatchTarget: Send {
    async fn flush(&mut self, batch: Batch) -> Result<()>;
}

/// Counters kept by a [`BatchAccumulator`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccumulatorStats {
    /// Events accepted through `offer`
    pub events: usize,

    /// Batches handed to the target
    pub batches: usize,
}

/// Buffers events and hands them to a [`BatchTarget`] in batches of
/// [`BATCH_CAPACITY`](flowsiem_core::BATCH_CAPACITY)
///
/// Every accepted event reaches the target exactly once and in the order it
/// was offered. All batches but the last hold exactly `BATCH_CAPACITY`
/// events; [`finish`](Self::finish) delivers the remainder and never flushes
/// an empty batch.
pub struct BatchAccumulator<T> {
    target: T,
    current: Batch,
    stats: AccumulatorStats,
}

impl<T: BatchTarget> BatchAccumulator<T> {
    pub fn new(target: T) -> Self {
        Self {
            target,
            current: Batch::new(),
            stats: AccumulatorStats::default(),
        }
    }

    /// Append an event, flushing if the batch is now full
    pub async fn offer(&mut self, event: SerializedEvent) -> Result<()> {
        self.current.push(event);
        self.stats.events += 1;

        if self.current.is_full() {
            self.flush_current().await?;
        }
        Ok(())
    }

    /// Flush any partial batch and give back the target
    pub async fn finish(mut self) -> Result<(T, AccumulatorStats)> {
        if !self.current.is_empty() {
            self.flush_current().await?;
        }
        Ok((self.target, self.stats))
    }

    /// Events waiting for the next flush
    pub fn pending(&self) -> usize {
        self.current.len()
    }

    pub fn stats(&self) -> AccumulatorStats {
        self.stats
    }

    async fn flush_current(&mut self) -> Result<()> {
        let batch = std::mem::replace(&mut self.current, Batch::new());
        self.stats.batches += 1;
        self.target.flush(batch).await
    }
}

/// [`BatchTarget`] that posts each batch to an [`EventSink`]
///
/// Rejected batches are logged and counted, never retried.
pub struct SinkTarget<S> {
    sink: S,
    delivered: usize,
    failed: usize,
}

impl<S: EventSink> SinkTarget<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            delivered: 0,
            failed: 0,
        }
    }

    /// Batches the endpoint accepted
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Batches the endpoint answered with a non-2xx status
    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[async_trait]
impl<S: EventSink> BatchTarget for SinkTarget<S> {
    async fn flush(&mut self, batch: Batch) -> Result<()> {
        let events = batch.len();
        let report = self.sink.send_batch(&batch).await?;

        if report.is_success() {
            self.delivered += 1;
            metrics::counter!("flowsiem_batches_sent_total", "outcome" => "success").increment(1);
            info!(status = report.status, events, body = %report.body, "Batch delivered");
        } else {
            self.failed += 1;
            metrics::counter!("flowsiem_batches_sent_total", "outcome" => "failure").increment(1);
            warn!(status = report.status, events, body = %report.body, "Batch rejected");
        }
        Ok(())
    }
}
