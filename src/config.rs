//! Configuration for a corpus split run.

use std::path::{Path, PathBuf};

use crate::error::{CorpusError, Result};
use serde::{Deserialize, Serialize};

/// Environment key naming the directory holding inputs and outputs.
pub const DATA_DIR_VAR: &str = "DATA_DIR";
/// Environment key holding the number of output shards.
pub const SPLIT_COUNT_VAR: &str = "NUMBER_OF_FILES_SPLIT";
/// Default input file suffix.
pub const DEFAULT_SUFFIX: &str = ".txt";

/// Configuration for listing inputs and writing training shards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SplitConfig {
    /// Directory scanned for input files.
    pub data_dir: PathBuf,
    /// Directory receiving `train_data_<i>.txt` and `vocab.txt`.
    pub output_dir: PathBuf,
    /// Number of output shards; `0` writes only an empty vocabulary.
    pub split_count: usize,
    /// Case-sensitive suffix an entry name must end with to be an input.
    pub suffix: String,
    /// Descends into subdirectories when listing inputs.
    pub recursive: bool,
    /// Follows symlinked directories during recursive listing.
    pub follow_symlinks: bool,
    /// Sorts inputs by name instead of keeping directory enumeration order.
    pub sort_inputs: bool,
    /// Renders progress bars while shards are written.
    pub show_progress: bool,
}

impl SplitConfig {
    /// Returns a builder rooted at `data_dir` with every other field defaulted.
    #[must_use]
    pub fn builder(data_dir: impl Into<PathBuf>) -> SplitBuilder {
        SplitBuilder::new(data_dir)
    }

    /// Loads `DATA_DIR` and `NUMBER_OF_FILES_SPLIT` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the two required keys through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup(DATA_DIR_VAR)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                CorpusError::InvalidConfig(format!("{DATA_DIR_VAR} is not set"))
            })?;
        let raw_count = lookup(SPLIT_COUNT_VAR).ok_or_else(|| {
            CorpusError::InvalidConfig(format!("{SPLIT_COUNT_VAR} is not set"))
        })?;
        let split_count = parse_split_count(&raw_count)?;
        Self::builder(data_dir).split_count(split_count).build()
    }

    /// Validates the invariants required for a run.
    pub fn validate(&self) -> Result<()> {
        if self.suffix.is_empty() {
            return Err(CorpusError::InvalidConfig(
                "suffix must not be empty".into(),
            ));
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(CorpusError::InvalidConfig(
                "data_dir must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Path of the shard written for the 0-based split `index`.
    #[must_use]
    pub fn shard_path(&self, index: usize) -> PathBuf {
        shard_path(&self.output_dir, index)
    }

    /// Path of the vocabulary file.
    #[must_use]
    pub fn vocab_path(&self) -> PathBuf {
        vocab_path(&self.output_dir)
    }
}

/// Returns `<dir>/train_data_<index + 1>.txt`.
#[must_use]
pub fn shard_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("train_data_{}.txt", index + 1))
}

/// Returns `<dir>/vocab.txt`.
#[must_use]
pub fn vocab_path(dir: &Path) -> PathBuf {
    dir.join("vocab.txt")
}

/// Parses a split count, accepting surrounding whitespace.
pub fn parse_split_count(raw: &str) -> Result<usize> {
    raw.trim().parse::<usize>().map_err(|err| {
        CorpusError::InvalidConfig(format!(
            "{SPLIT_COUNT_VAR} must be a non-negative integer, got {raw:?}: {err}"
        ))
    })
}

/// Builder for [`SplitConfig`].
#[derive(Debug, Clone)]
pub struct SplitBuilder {
    cfg: SplitConfig,
    output_dir: Option<PathBuf>,
}

impl SplitBuilder {
    /// Creates a builder for the given data directory.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            cfg: SplitConfig {
                output_dir: data_dir.clone(),
                data_dir,
                split_count: 1,
                suffix: DEFAULT_SUFFIX.into(),
                recursive: false,
                follow_symlinks: false,
                sort_inputs: true,
                show_progress: true,
            },
            output_dir: None,
        }
    }

    /// Sets the number of output shards.
    #[must_use]
    pub fn split_count(mut self, value: usize) -> Self {
        self.cfg.split_count = value;
        self
    }

    /// Writes outputs somewhere other than the data directory.
    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Overrides the input suffix filter.
    #[must_use]
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.cfg.suffix = suffix.into();
        self
    }

    /// Enables or disables recursive listing.
    #[must_use]
    pub fn recursive(mut self, enabled: bool) -> Self {
        self.cfg.recursive = enabled;
        self
    }

    /// Enables or disables following of symlinks when listing recursively.
    #[must_use]
    pub fn follow_symlinks(mut self, enabled: bool) -> Self {
        self.cfg.follow_symlinks = enabled;
        self
    }

    /// Enables or disables sorting inputs by name.
    #[must_use]
    pub fn sort_inputs(mut self, enabled: bool) -> Self {
        self.cfg.sort_inputs = enabled;
        self
    }

    /// Enables or disables progress bars.
    #[must_use]
    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.cfg.show_progress = enabled;
        self
    }

    /// Finalises the builder, returning a validated [`SplitConfig`].
    pub fn build(mut self) -> Result<SplitConfig> {
        if let Some(dir) = self.output_dir.take() {
            self.cfg.output_dir = dir;
        }
        self.cfg.validate()?;
        Ok(self.cfg)
    }
}
