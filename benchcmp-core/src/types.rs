use serde::{Deserialize, Serialize};

/// Model name used when the performance artifact does not carry one.
pub const UNKNOWN_MODEL: &str = "Unknown";

/// Clamp a decoded metric to a finite, non-negative value.
pub(crate) fn non_negative(v: f64) -> f64 {
	if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

/// Occurrence count of one error key reported by the benchmark runner.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorStat {
	/// Error message or class as the runner grouped it.
	#[serde(default)]
	pub key: String,
	/// Occurrences.
	#[serde(default)]
	pub count: u64,
}

/// Mean and tail percentiles of one latency measure, in milliseconds.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct LatencyStats {
	/// Mean.
	pub avg_ms: f64,
	/// Median.
	pub p50_ms: f64,
	/// 95th percentile.
	pub p95_ms: f64,
	/// 99th percentile.
	pub p99_ms: f64,
}

impl LatencyStats {
	pub(crate) fn sanitized(self) -> Self {
		Self {
			avg_ms: non_negative(self.avg_ms),
			p50_ms: non_negative(self.p50_ms),
			p95_ms: non_negative(self.p95_ms),
			p99_ms: non_negative(self.p99_ms),
		}
	}
}

/// Load-test results. Always present on a record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PerformancePhase {
	/// Provider name as written by the runner, empty when missing.
	pub provider: String,
	/// Run start timestamp, verbatim.
	pub started_at: String,
	/// Total wall time of the load test.
	pub wall_time_ms: f64,
	/// Requests issued.
	pub total_requests: u64,
	/// Requests that completed.
	pub success: u64,
	/// Requests that errored.
	pub failure: u64,
	/// Fraction in `[0, 1]`.
	pub success_rate: f64,
	/// Time to first token.
	pub ttft: LatencyStats,
	/// End-to-end request latency.
	pub latency: LatencyStats,
	/// How the runner counted tokens (e.g. `usage` or `estimate`).
	pub token_mode: String,
	/// Output tokens per second.
	pub token_throughput: f64,
	/// Requests per second.
	pub rps: f64,
	/// Raw TTFT samples; display only.
	pub ttft_distribution_ms: Vec<f64>,
	/// Raw latency samples; display only.
	pub latency_distribution_ms: Vec<f64>,
	/// Most frequent errors.
	pub errors_top_n: Vec<ErrorStat>,
}

/// Outcome of the function-call check. Defaults to unsupported.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FunctionCallPhase {
	/// Whether the model produced a tool call.
	pub supported: bool,
	/// Called function, when supported.
	pub function_name: String,
	/// Raw argument JSON, when supported.
	pub arguments: String,
	/// Response latency of the check.
	pub latency_ms: f64,
	/// Error reported by the run when the call was not supported.
	pub error: String,
}

/// One context-length trial of the long-context test.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ContextTrial {
	/// Target context length.
	pub context_length: u64,
	/// Prompt tokens actually sent.
	pub input_tokens: u64,
	/// Time to first token.
	pub ttft_ms: f64,
	/// Total latency.
	pub latency_ms: f64,
	/// Output tokens per second.
	pub throughput: f64,
	/// Whether the model answered.
	pub success: bool,
}

/// Long-context trials and their aggregates. Empty by default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LongContextPhase {
	/// Largest context length that produced a successful response.
	pub max_context_length: u64,
	/// Mean TTFT over successful trials.
	pub avg_ttft_ms: f64,
	/// Mean latency over successful trials.
	pub avg_latency_ms: f64,
	/// Mean throughput over successful trials.
	pub avg_throughput: f64,
	/// Trials in report order.
	pub trials: Vec<ContextTrial>,
}

impl LongContextPhase {
	/// Derive the phase from trial rows: maximum and averages over successful rows only.
	pub fn from_trials(trials: Vec<ContextTrial>) -> Self {
		let ok: Vec<ContextTrial> = trials.iter().filter(|t| t.success).copied().collect();
		let mean = |f: fn(&ContextTrial) -> f64| -> f64 {
			if ok.is_empty() { 0.0 } else { ok.iter().map(f).sum::<f64>() / ok.len() as f64 }
		};
		Self {
			max_context_length: ok.iter().map(|t| t.context_length).max().unwrap_or(0),
			avg_ttft_ms: mean(|t| t.ttft_ms),
			avg_latency_ms: mean(|t| t.latency_ms),
			avg_throughput: mean(|t| t.throughput),
			trials,
		}
	}
}

/// Incremental summarization run. Zero by default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SummarizationPhase {
	/// Chunks the document was split into.
	pub total_chunks: u64,
	/// Prompt tokens over all chunks.
	pub prompt_tokens: u64,
	/// Completion tokens over all chunks.
	pub completion_tokens: u64,
	/// Prompt plus completion.
	pub total_tokens: u64,
	/// Seconds spent processing.
	pub processing_time_secs: f64,
	/// Seconds per chunk.
	pub avg_time_per_chunk_secs: f64,
	/// Summarization rate.
	pub tokens_per_second: f64,
	/// The context window overflowed during the run.
	pub overflow_detected: bool,
	/// Chunk at which the overflow happened.
	pub overflow_at_chunk: u64,
	/// Accumulated tokens at the overflow.
	pub overflow_at_tokens: u64,
}

/// Merged, defaulted view of one test's full result set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanonicalRecord {
	/// Candidate directory name; unique within a batch.
	pub name: String,
	/// Model name, [`UNKNOWN_MODEL`] when missing.
	pub model: String,
	/// Mandatory load-test phase.
	pub performance: PerformancePhase,
	/// Optional function-call phase.
	pub function_call: FunctionCallPhase,
	/// Optional long-context phase.
	pub long_context: LongContextPhase,
	/// Optional summarization phase.
	pub summarization: SummarizationPhase,
}

impl CanonicalRecord {
	/// A record with only the mandatory phase populated.
	pub fn new(name: impl Into<String>, model: impl Into<String>, performance: PerformancePhase) -> Self {
		Self {
			name: name.into(),
			model: model.into(),
			performance,
			function_call: FunctionCallPhase::default(),
			long_context: LongContextPhase::default(),
			summarization: SummarizationPhase::default(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn trial(ctx: u64, latency_ms: f64, success: bool) -> ContextTrial {
		ContextTrial { context_length: ctx, input_tokens: ctx / 2, ttft_ms: 10.0, latency_ms, throughput: 5.0, success }
	}

	#[test]
	fn from_trials_ignores_failed_rows() {
		let phase = LongContextPhase::from_trials(vec![trial(1000, 400.0, true), trial(4000, 900.0, false), trial(2000, 600.0, true)]);
		assert_eq!(phase.max_context_length, 2000);
		assert_eq!(phase.avg_latency_ms, 500.0);
		assert_eq!(phase.trials.len(), 3);
		assert_eq!(phase.trials.iter().filter(|t| t.success).count(), 2);
        assert_eq!(phase.avg_throughput, 5.0);
	}

	#[test]
	fn from_trials_all_failed_is_zeroed() {
		let phase = LongContextPhase::from_trials(vec![trial(1000, 400.0, false)]);
		assert_eq!(phase.max_context_length, 0);
		assert_eq!(phase.avg_ttft_ms, 0.0);
		assert_eq!(phase.avg_throughput, 0.0);
	}

	#[test]
	fn non_negative_clamps() {
		assert_eq!(non_negative(-3.0), 0.0);
		assert_eq!(non_negative(f64::NAN), 0.0);
		assert_eq!(non_negative(2.5), 2.5);
	}
}
