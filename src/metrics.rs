//! Metrics describing what a partition run wrote.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Metrics captured for each written shard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SplitMetrics {
    /// Sequential split number (1-indexed, matches the shard file name).
    pub split: usize,
    /// Shard that was created.
    pub output: PathBuf,
    /// Input files consolidated into the shard.
    pub files: usize,
    /// Lines written, one per input line.
    pub lines: usize,
    /// Bytes written including the newline terminators.
    pub bytes: usize,
    /// Time spent writing the shard.
    pub elapsed: Duration,
}

/// Aggregate report produced by a partition run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartitionReport {
    /// Number of inputs handed to the partitioner.
    pub input_files: usize,
    /// Fixed number of files taken by every split.
    pub per_split_size: usize,
    /// Per-shard snapshots in write order.
    pub splits: Vec<SplitMetrics>,
    /// Inputs that no split consumed.
    pub unassigned: Vec<PathBuf>,
    /// Distinct characters written to the vocabulary file.
    pub vocab_size: usize,
    /// Location of the vocabulary file.
    pub vocab_path: PathBuf,
    /// Wall-clock duration of the whole run.
    pub total_duration: Duration,
}

impl PartitionReport {
    /// Total lines written across every shard.
    #[must_use]
    pub fn total_lines(&self) -> usize {
        self.splits.iter().map(|split| split.lines).sum()
    }

    /// Total bytes written across every shard.
    #[must_use]
    pub fn total_bytes(&self) -> usize {
        self.splits.iter().map(|split| split.bytes).sum()
    }

    /// Renders the report as JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}
