//! Batch-relative 0..=100 scores for multi-metric comparison.

use crate::types::CanonicalRecord;
use serde::{Deserialize, Serialize};

/// Comparison axis. Every axis is scored so that higher is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
	/// Inverse of average TTFT.
	Responsiveness,
	/// Inverse of average end-to-end latency.
	GenerationSpeed,
	/// Token throughput.
	Throughput,
	/// Requests per second.
	RequestRate,
	/// Success rate as a percentage.
	SuccessRate,
	/// Summarization tokens per second.
	SummarizationRate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
	LowerIsBetter,
	HigherIsBetter,
	/// Already a fraction in `[0, 1]`.
	Absolute,
}

impl Category {
	/// Every category, in display order.
	pub const ALL: [Category; 6] = [
		Category::Responsiveness,
		Category::GenerationSpeed,
		Category::Throughput,
		Category::RequestRate,
		Category::SuccessRate,
		Category::SummarizationRate,
	];

	/// Field name used in the comparison document.
	pub fn key(self) -> &'static str {
		match self {
			Category::Responsiveness => "responsiveness",
			Category::GenerationSpeed => "generation_speed",
			Category::Throughput => "throughput",
			Category::RequestRate => "request_rate",
			Category::SuccessRate => "success_rate",
			Category::SummarizationRate => "summarization_rate",
		}
	}

	fn direction(self) -> Direction {
		match self {
			Category::Responsiveness | Category::GenerationSpeed => Direction::LowerIsBetter,
			Category::SuccessRate => Direction::Absolute,
			_ => Direction::HigherIsBetter,
		}
	}

	/// Raw input metric for this category.
	pub fn value(self, r: &CanonicalRecord) -> f64 {
		match self {
			Category::Responsiveness => r.performance.ttft.avg_ms,
			Category::GenerationSpeed => r.performance.latency.avg_ms,
			Category::Throughput => r.performance.token_throughput,
			Category::RequestRate => r.performance.rps,
			Category::SuccessRate => r.performance.success_rate,
			Category::SummarizationRate => r.summarization.tokens_per_second,
		}
	}
}

/// Scores of one record, each in `[0, 100]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreVector {
	/// Record this vector belongs to.
	pub name: String,
	/// [`Category::Responsiveness`].
	pub responsiveness: f64,
	/// [`Category::GenerationSpeed`].
	pub generation_speed: f64,
	/// [`Category::Throughput`].
	pub throughput: f64,
	/// [`Category::RequestRate`].
	pub request_rate: f64,
	/// [`Category::SuccessRate`].
	pub success_rate: f64,
	/// [`Category::SummarizationRate`].
	pub summarization_rate: f64,
}

impl ScoreVector {
	/// Score for one category.
	pub fn get(&self, c: Category) -> f64 {
		match c {
			Category::Responsiveness => self.responsiveness,
			Category::GenerationSpeed => self.generation_speed,
			Category::Throughput => self.throughput,
			Category::RequestRate => self.request_rate,
			Category::SuccessRate => self.success_rate,
			Category::SummarizationRate => self.summarization_rate,
		}
	}

	fn set(&mut self, c: Category, v: f64) {
		let slot = match c {
			Category::Responsiveness => &mut self.responsiveness,
			Category::GenerationSpeed => &mut self.generation_speed,
			Category::Throughput => &mut self.throughput,
			Category::RequestRate => &mut self.request_rate,
			Category::SuccessRate => &mut self.success_rate,
			Category::SummarizationRate => &mut self.summarization_rate,
		};
		*slot = v;
	}
}

fn score(direction: Direction, value: f64, max: f64) -> f64 {
	let s = match direction {
		Direction::LowerIsBetter => (1.0 - value / max) * 100.0,
		Direction::HigherIsBetter => value / max * 100.0,
		Direction::Absolute => value * 100.0,
	};
	if s.is_finite() { s.clamp(0.0, 100.0) } else { 0.0 }
}

/// Score every record against the batch maximum of each category.
///
/// When a category's batch maximum is zero the whole batch scores 0 on it,
/// whichever its direction. Output order matches input order.
pub fn normalize(records: &[CanonicalRecord]) -> Vec<ScoreVector> {
	let mut out: Vec<ScoreVector> =
		records.iter().map(|r| ScoreVector { name: r.name.clone(), ..ScoreVector::default() }).collect();
	for c in Category::ALL {
		let max = records.iter().map(|r| c.value(r)).fold(0.0_f64, f64::max);
		for (r, s) in records.iter().zip(out.iter_mut()) {
			let v = if max > 0.0 { score(c.direction(), c.value(r), max) } else { 0.0 };
			s.set(c, v);
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::PerformancePhase;

	fn record(name: &str, ttft: f64, throughput: f64) -> CanonicalRecord {
		let mut p = PerformancePhase::default();
		p.ttft.avg_ms = ttft;
		p.token_throughput = throughput;
		CanonicalRecord::new(name, "m", p)
	}

	#[test]
	fn lower_is_better_inversion() {
		let batch = vec![record("a", 100.0, 0.0), record("b", 200.0, 0.0), record("c", 300.0, 0.0)];
		let scores = normalize(&batch);
		let r: Vec<f64> = scores.iter().map(|s| s.responsiveness).collect();
		assert!((r[0] - 100.0 / 3.0 * 2.0).abs() < 1e-9);
		assert!((r[1] - 100.0 / 3.0).abs() < 1e-9);
		assert_eq!(r[2], 0.0);
	}

	#[test]
	fn zero_maximum_scores_zero() {
		let scores = normalize(&[record("a", 0.0, 0.0), record("b", 0.0, 0.0)]);
		for s in &scores {
			assert_eq!(s.responsiveness, 0.0);
			assert_eq!(s.throughput, 0.0);
			assert_eq!(s.request_rate, 0.0);
			assert_eq!(s.summarization_rate, 0.0);
		}
	}

	#[test]
	fn get_matches_fields() {
		let scores = normalize(&[record("a", 10.0, 5.0)]);
		assert_eq!(scores[0].get(Category::Throughput), scores[0].throughput);
		assert_eq!(scores[0].name, "a");
		assert_eq!(Category::ALL.len(), 6);
		let keys: Vec<&str> = Category::ALL.iter().map(|c| c.key()).collect();
		let json = serde_json::to_value(&scores[0]).unwrap();
		for k in keys {
			assert!(json.get(k).is_some(), "{k} missing from serialized scores");
		}
	}
}
