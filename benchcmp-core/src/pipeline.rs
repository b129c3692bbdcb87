use crate::{
	config::{ChartStyle, CompareConfig},
	error::{Error, Result},
	normalizer::{self, ScoreVector},
	parser,
	scanner::{self, Candidate},
	types::CanonicalRecord,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{path::Path, sync::Arc};
use tracing::{info, warn};

/// A candidate that qualified but could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCandidate {
	/// Candidate directory name.
	pub name: String,
	/// Error that excluded it.
	pub reason: String,
}

/// Records and their scores, in scanner order.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
	/// Successfully parsed records.
	pub records: Vec<CanonicalRecord>,
	/// `scores[i]` belongs to `records[i]`.
	pub scores: Vec<ScoreVector>,
	/// Candidates dropped with their reasons.
	pub skipped: Vec<SkippedCandidate>,
}

/// What the external renderer receives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonDocument {
	/// When the document was assembled.
	pub generated_at: DateTime<Utc>,
	/// Renderer settings.
	pub style: ChartStyle,
	/// Same as [`Batch::records`].
	pub records: Vec<CanonicalRecord>,
	/// Same as [`Batch::scores`].
	pub scores: Vec<ScoreVector>,
	/// Same as [`Batch::skipped`].
	pub skipped: Vec<SkippedCandidate>,
}

impl Batch {
	/// Stamp the batch with the current time and attach the renderer style.
	pub fn into_document(self, style: ChartStyle) -> ComparisonDocument {
		ComparisonDocument { generated_at: Utc::now(), style, records: self.records, scores: self.scores, skipped: self.skipped }
	}
}

fn assemble(outcomes: Vec<(String, Result<CanonicalRecord>)>) -> Result<Batch> {
	let qualified = outcomes.len();
	let mut records = Vec::with_capacity(qualified);
	let mut skipped = Vec::new();
	for (name, outcome) in outcomes {
		match outcome {
			Ok(r) => records.push(r),
			Err(e) => {
				warn!(candidate = %name, error = %e, "skipping candidate");
				skipped.push(SkippedCandidate { name, reason: e.to_string() });
			}
		}
	}
	if records.is_empty() {
		return Err(Error::EmptyBatch);
	}
	let scores = normalizer::normalize(&records);
	info!(qualified, parsed = records.len(), skipped = skipped.len(), "batch loaded");
	Ok(Batch { records, scores, skipped })
}

/// Parse already-scanned candidates in the given order and score the batch.
pub fn parse_batch(candidates: Vec<Candidate>, config: &CompareConfig) -> Result<Batch> {
	let outcomes = candidates.into_iter().map(|c| {
		let r = parser::parse_candidate(&c, config);
		(c.name, r)
	});
	assemble(outcomes.collect())
}

/// Like [`parse_batch`], but each candidate is parsed on the blocking pool.
/// Results are collected back into input order before scoring.
pub async fn parse_batch_concurrent(candidates: Vec<Candidate>, config: &CompareConfig) -> Result<Batch> {
	let names: Vec<String> = candidates.iter().map(|c| c.name.clone()).collect();
	let shared = Arc::new(config.clone());
	let tasks = candidates.into_iter().map(|c: Candidate| {
		let cfg = Arc::clone(&shared);
		tokio::task::spawn_blocking(move || parser::parse_candidate(&c, &cfg))
	});
	let joined = futures::future::join_all(tasks).await;
	let outcomes = names
		.into_iter()
		.zip(joined)
		.map(|(name, j)| {
			let r = j.unwrap_or_else(|e| Err(Error::malformed(&name, format!("parser task failed: {e}"))));
			(name, r)
		})
		.collect();
	assemble(outcomes)
}

/// Dispatch on [`CompareConfig::concurrent_parse`].
pub async fn parse(candidates: Vec<Candidate>, config: &CompareConfig) -> Result<Batch> {
	if config.concurrent_parse {
		parse_batch_concurrent(candidates, config).await
	} else {
		parse_batch(candidates, config)
	}
}

/// Scan, parse each candidate in name order, and score the batch.
pub fn load_batch(root: impl AsRef<Path>, filter: Option<&str>, config: &CompareConfig) -> Result<Batch> {
	let candidates = scanner::scan(root, filter, &config.layout)?;
	parse_batch(candidates, config)
}

/// Scan, then [`parse_batch_concurrent`].
pub async fn load_batch_concurrent(root: impl AsRef<Path>, filter: Option<&str>, config: &CompareConfig) -> Result<Batch> {
	let candidates = scanner::scan(root, filter, &config.layout)?;
	parse_batch_concurrent(candidates, config).await
}
