//! `mdcorpus_core` acquires and curates the markdown corpus used to tune and
//! evaluate lint rules. It resolves external repositories pinned to exact
//! commits through an on-disk clone cache, then filters the records an
//! external scanner collects from them so the final corpus is free of
//! duplicates and balanced across categories.
//!
//! ## Pipeline
//!
//! ```text
//! SourceConfig
//!   → SourceResolver (normalize url → cache key → clone/fetch/checkout → local root)
//!   → external scanner (local tree → CollectedRecords)
//!   → drop_exact_duplicates → drop_near_duplicates → cap_readmes → apply_balance
//!   → kept records + balance violations
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `mdcorpus.toml`: sources, cache
//!   directory and curation settings.
//! - [`git`]: The [`GitRunner`] capability and its subprocess adapter.
//! - [`resolver`]: Source resolution against the clone cache.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use mdcorpus_core::{CorpusConfig, SourceResolver, TracingProgress, curate};
//!
//! let root = Path::new(".");
//! let config = CorpusConfig::load(root).unwrap().unwrap_or_default();
//! let resolver = SourceResolver::new();
//!
//! for source in &config.sources {
//!     let local_root = resolver
//!         .resolve(source, &config.cache_dir(root), Some(&TracingProgress))
//!         .unwrap();
//!     println!("{}: {}", source.name, local_root.display());
//! }
//!
//! let report = curate(Vec::new(), &config.curation);
//! assert!(report.kept.is_empty());
//! ```

pub use balance::*;
pub use config::*;
pub use curate::*;
pub use dedup::*;
pub use error::*;
pub use git::*;
pub use heartbeat::Progress;
pub use heartbeat::HEARTBEAT_INTERVAL;
pub use heartbeat::TracingProgress;
pub use readme::*;
pub use record::*;
pub use resolver::*;

mod balance;
pub mod config;
mod curate;
mod dedup;
#[allow(unused_assignments)]
mod error;
pub mod git;
mod heartbeat;
mod readme;
mod record;
pub mod resolver;

#[cfg(test)]
mod __fixtures;
