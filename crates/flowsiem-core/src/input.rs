//! Newline-delimited flow record input

use crate::{Error, FlowRecord, Result};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::debug;

/// Reads [`FlowRecord`]s one line at a time, in file order
///
/// Lines are pulled lazily so a run never holds more than one record in
/// memory. Every line must be a JSON object with a string `input` field;
/// anything else, including a blank line, fails the read. The terminator of
/// the final line is optional.
pub struct FlowReader<R> {
    lines: Lines<R>,
    line_number: usize,
}

impl FlowReader<BufReader<File>> {
    /// Open a flow file for reading
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).await?;
        debug!("Opened flow input {:?}", path);
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: AsyncBufRead + Unpin> FlowReader<R> {
    /// Wrap any buffered async reader
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }

    /// Read the next record, or `None` at end of input
    pub async fn next_record(&mut self) -> Result<Option<FlowRecord>> {
        while let Some(line) = self.lines.next_line().await? {
            self.line_number += 1;

            let record = serde_json::from_str(&line).map_err(|source| Error::InvalidRecord {
                line: self.line_number,
                source,
            })?;
            return Ok(Some(record));
        }

        Ok(None)
    }

    /// Number of lines consumed so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}
