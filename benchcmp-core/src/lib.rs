#![forbid(unsafe_code)]

//! Turns a directory of benchmark runs into comparable records and scores.
//!
//! [`scanner`] finds the runs, [`parser`] merges each run's artifacts into a
//! [`CanonicalRecord`], and [`normalizer`] scores the batch. [`pipeline`] ties
//! the three together with skip-and-continue handling of broken runs.

/// Run configuration and renderer style.
pub mod config;
/// Error type.
pub mod error;
pub mod narrative;
pub mod normalizer;
/// Per-candidate artifact loading and merging.
pub mod parser;
/// Scan, parse and score with skip-and-continue semantics.
pub mod pipeline;
/// Candidate discovery.
pub mod scanner;
/// The canonical record and its phases.
pub mod types;

pub use config::{ArtifactLayout, ChartStyle, CompareConfig};
pub use error::{Error, Result};
pub use narrative::Extraction;
pub use normalizer::{normalize, Category, ScoreVector};
pub use parser::parse_candidate;
pub use pipeline::{
	load_batch, load_batch_concurrent, parse, parse_batch, parse_batch_concurrent, Batch, ComparisonDocument, SkippedCandidate,
};
pub use scanner::{scan, Candidate};
pub use types::CanonicalRecord;
