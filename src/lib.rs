//! Training corpus consolidation library and CLI.
//!
//! The crate reads the text files of a directory, concatenates their
//! whitespace-normalised lines into a fixed number of `train_data_<i>.txt`
//! shards, and records every distinct character it wrote in `vocab.txt`.
//!
//! ```no_run
//! use corpus_split::{Partitioner, SplitConfig};
//!
//! # fn main() -> corpus_split::Result<()> {
//! let cfg = SplitConfig::builder("/path/to/corpus")
//!     .split_count(4)
//!     .show_progress(false)
//!     .build()?;
//! let artifacts = Partitioner::new(cfg).run()?;
//! println!("vocabulary has {} characters", artifacts.vocabulary.len());
//! # Ok(())
//! # }
//! ```
//!
//! The CLI is enabled by default through the `cli` feature.  Users targeting the
//! library portion only can disable default features to avoid the CLI
//! dependencies: `corpus-split = { version = "...", default-features = false }`.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    clippy::all,
    rust_2018_idioms,
    future_incompatible,
    unused_lifetimes,
    unreachable_pub
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::doc_markdown
)]

pub mod config;
pub mod corpus;
pub mod error;
pub mod metrics;
pub mod partition;
pub mod vocab;

pub use config::{SplitBuilder, SplitConfig};
pub use corpus::{collect_inputs, list_files};
pub use error::{CorpusError, Result};
pub use metrics::{PartitionReport, SplitMetrics};
pub use partition::{
    partition_and_write, plan_splits, PartitionArtifacts, Partitioner, SplitPlan,
};
pub use vocab::Vocabulary;
