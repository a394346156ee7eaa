//! Partitioning of input files into training shards.
//!
//! Every split takes the same number of files, computed once from the initial
//! input count, from the front of a working list that shrinks after each split.
//! When the split count does not divide the number of inputs the trailing files
//! are never written anywhere; [`SplitPlan::unassigned`] names them.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};

use crate::config::SplitConfig;
use crate::corpus::{collect_inputs, for_each_line};
use crate::error::{CorpusError, Result};
use crate::metrics::{PartitionReport, SplitMetrics};
use crate::vocab::Vocabulary;

const LINE_PROGRESS_INTERVAL: usize = 4096;

/// Files assigned to each split, computed without touching the filesystem.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPlan {
    /// Number of files every split takes.
    pub per_split_size: usize,
    /// File groups in split order; there is one entry per split.
    pub splits: Vec<Vec<PathBuf>>,
    /// Files left in the working list after the last split.
    pub unassigned: Vec<PathBuf>,
}

/// Returns `file_count / split_count`, or `file_count` when `split_count` is zero.
#[must_use]
pub fn per_split_size(file_count: usize, split_count: usize) -> usize {
    if split_count == 0 {
        file_count
    } else {
        file_count / split_count
    }
}

/// Assigns files to `split_count` splits.
///
/// Each split takes the first `per_split_size` entries of the working list, after
/// which those entries are dropped from it.  With `split_count == 0` no split is
/// produced and every file stays unassigned.
pub fn plan_splits(files: &[PathBuf], split_count: usize) -> SplitPlan {
    let per_split = per_split_size(files.len(), split_count);
    let mut remaining = files;
    let mut splits = Vec::with_capacity(split_count);
    for _ in 0..split_count {
        let (taken, rest) = remaining.split_at(per_split.min(remaining.len()));
        splits.push(taken.to_vec());
        remaining = rest;
    }
    SplitPlan {
        per_split_size: per_split,
        splits,
        unassigned: remaining.to_vec(),
    }
}

/// Strips surrounding whitespace from `line` and terminates it with a single `\n`.
#[must_use]
pub fn normalize_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 1);
    push_normalized(&mut out, line);
    out
}

fn push_normalized(out: &mut String, line: &str) {
    out.push_str(line.trim_matches(is_strippable));
    out.push('\n');
}

/// Unicode whitespace plus the ASCII file, group, record and unit separators.
fn is_strippable(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Output of a completed run.
#[must_use]
#[derive(Debug, Clone)]
pub struct PartitionArtifacts {
    /// Characters observed across every shard.
    pub vocabulary: Vocabulary,
    /// What was written, and where.
    pub report: PartitionReport,
}

/// Writes shards and the vocabulary file for a [`SplitConfig`].
#[derive(Debug, Clone)]
pub struct Partitioner {
    cfg: SplitConfig,
}

impl Partitioner {
    /// Creates a partitioner for the supplied configuration.
    #[must_use]
    pub fn new(cfg: SplitConfig) -> Self {
        Self { cfg }
    }

    /// Returns an immutable reference to the underlying configuration.
    #[must_use]
    pub fn config(&self) -> &SplitConfig {
        &self.cfg
    }

    /// Lists the inputs under the data directory and partitions them.
    pub fn run(&self) -> Result<PartitionArtifacts> {
        let files = collect_inputs(&self.cfg)?;
        info!(
            "discovered {} input files ending in {:?} under {}",
            files.len(),
            self.cfg.suffix,
            self.cfg.data_dir.display()
        );
        self.partition(&files)
    }

    /// Writes one shard per split of `files`, then the vocabulary file.
    ///
    /// File names are resolved against the data directory.  The vocabulary file is
    /// written only after every shard succeeded, so its absence marks an aborted run.
    pub fn partition(&self, files: &[PathBuf]) -> Result<PartitionArtifacts> {
        self.cfg.validate()?;
        let start = Instant::now();
        let plan = plan_splits(files, self.cfg.split_count);
        if self.cfg.output_dir != self.cfg.data_dir {
            fs::create_dir_all(&self.cfg.output_dir)
                .map_err(|err| CorpusError::io(err, Some(self.cfg.output_dir.clone())))?;
        }

        let mut vocabulary = Vocabulary::new();
        let mut splits = Vec::with_capacity(plan.splits.len());
        for (index, group) in plan.splits.iter().enumerate() {
            let output = self.cfg.shard_path(index);
            let metrics = self.write_split(index, group, &output, &mut vocabulary)?;
            info!(
                "wrote split {}: files={} lines={} bytes={} duration={:.2?} -> {}",
                metrics.split,
                metrics.files,
                metrics.lines,
                metrics.bytes,
                metrics.elapsed,
                output.display()
            );
            splits.push(metrics);
        }

        if !plan.unassigned.is_empty() && self.cfg.split_count > 0 {
            warn!(
                "{} input files were not assigned to any split (per_split_size={})",
                plan.unassigned.len(),
                plan.per_split_size
            );
        }

        let vocab_path = self.cfg.vocab_path();
        vocabulary.save(&vocab_path)?;
        info!(
            "wrote vocabulary of {} characters to {}",
            vocabulary.len(),
            vocab_path.display()
        );

        let report = PartitionReport {
            input_files: files.len(),
            per_split_size: plan.per_split_size,
            splits,
            unassigned: plan.unassigned,
            vocab_size: vocabulary.len(),
            vocab_path,
            total_duration: start.elapsed(),
        };
        Ok(PartitionArtifacts { vocabulary, report })
    }

    fn write_split(
        &self,
        index: usize,
        group: &[PathBuf],
        output: &Path,
        vocabulary: &mut Vocabulary,
    ) -> Result<SplitMetrics> {
        let start = Instant::now();
        let file =
            File::create(output).map_err(|err| CorpusError::io(err, Some(output.to_path_buf())))?;
        let mut writer = BufWriter::new(file);
        let progress = self.progress_bar(index, group.len());

        let mut lines = 0usize;
        let mut bytes = 0usize;
        let mut normalized = String::new();
        for name in group {
            let path = self.cfg.data_dir.join(name);
            debug!("split {}: reading {}", index + 1, path.display());
            let read = for_each_line(&path, |line| {
                normalized.clear();
                push_normalized(&mut normalized, line);
                writer
                    .write_all(normalized.as_bytes())
                    .map_err(|err| CorpusError::io(err, Some(output.to_path_buf())))?;
                vocabulary.observe(&normalized);
                bytes += normalized.len();
                lines += 1;
                if lines % LINE_PROGRESS_INTERVAL == 0 {
                    progress.set_message(format!("{lines} lines"));
                }
                Ok(())
            })?;
            debug!("split {}: {} lines from {}", index + 1, read, path.display());
            progress.inc(1);
        }
        writer
            .flush()
            .map_err(|err| CorpusError::io(err, Some(output.to_path_buf())))?;
        progress.finish_with_message(format!("{lines} lines"));

        Ok(SplitMetrics {
            split: index + 1,
            output: output.to_path_buf(),
            files: group.len(),
            lines,
            bytes,
            elapsed: start.elapsed(),
        })
    }

    fn progress_bar(&self, index: usize, len: usize) -> ProgressBar {
        if !self.cfg.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        let style = ProgressStyle::with_template(
            "{prefix} [{bar:30}] {pos}/{len} files {msg} {elapsed}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
        pb.set_style(style);
        pb.set_prefix(format!("split {}", index + 1));
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }
}

/// Partitions `files` found in `dir` into `split_count` shards written to `dir`.
///
/// Convenience wrapper around [`Partitioner`] with progress output disabled.
pub fn partition_and_write(
    dir: &Path,
    files: &[PathBuf],
    split_count: usize,
) -> Result<PartitionArtifacts> {
    let cfg = SplitConfig::builder(dir)
        .split_count(split_count)
        .show_progress(false)
        .build()?;
    Partitioner::new(cfg).partition(files)
}
