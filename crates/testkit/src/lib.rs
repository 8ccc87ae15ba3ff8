#![warn(missing_docs)]
//! Deterministic testing surfaces: JSONL event logs, JSON snapshots and
//! tick-by-tick micro-worldtest capture.

mod micro_worldtest;
mod snapshot;

use anyhow::{Context, Result};
use clawcade_core::SimTick;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub use micro_worldtest::*;
pub use snapshot::*;

/// Primary event record captured by headless tests.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a> {
    /// Simulation tick when the event occurred.
    pub tick: SimTick,
    /// Human-readable kind label.
    pub kind: &'a str,
    /// Free-form payload.
    pub payload: &'a str,
}

/// Owned form of [`EventRecord`], used when reading a log back.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OwnedEventRecord {
    /// Simulation tick when the event occurred.
    pub tick: SimTick,
    /// Kind label.
    pub kind: String,
    /// Payload.
    pub payload: String,
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    writer: BufWriter<File>,
    path: PathBuf,
    written: usize,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent directories if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create event log {}", path.display()))?;
        Ok(Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
            written: 0,
        })
    }

    /// Append an event to the log.
    pub fn write(&mut self, event: &EventRecord<'_>) -> Result<()> {
        let line = serde_json::to_string(event)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }

    /// Append an event whose payload is `payload` serialized as JSON.
    pub fn write_json<T: Serialize>(&mut self, tick: SimTick, kind: &str, payload: &T) -> Result<()> {
        let payload = serde_json::to_string(payload)?;
        self.write(&EventRecord {
            tick,
            kind,
            payload: &payload,
        })
    }

    /// Number of records written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Where the log lives.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Read every record of a JSONL event log.
pub fn read_jsonl<P: AsRef<Path>>(path: P) -> Result<Vec<OwnedEventRecord>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read event log {}", path.display()))?;
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(idx, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("Bad record on line {} of {}", idx + 1, path.display()))
        })
        .collect()
}
