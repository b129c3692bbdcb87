use crate::{
	config::CompareConfig,
	error::{Error, Result},
	narrative::{self, Extraction},
	scanner::Candidate,
	types::{non_negative, CanonicalRecord, ErrorStat, LatencyStats, PerformancePhase, SummarizationPhase, UNKNOWN_MODEL},
};
use serde::Deserialize;
use std::{fs, path::Path};
use tracing::{debug, warn};

/// On-disk shape of `benchmark/summary.json`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PerformanceArtifact {
	model: Option<String>,
	provider: Option<String>,
	started_at: Option<String>,
	wall_time_ms: f64,
	total_requests: u64,
	success: u64,
	failure: u64,
	success_rate: f64,
	avg_ttft_ms: f64,
	p50_ttft_ms: f64,
	p95_ttft_ms: f64,
	p99_ttft_ms: f64,
	avg_latency_ms: f64,
	p50_latency_ms: f64,
	p95_latency_ms: f64,
	p99_latency_ms: f64,
	token_mode: Option<String>,
	token_throughput: f64,
	rps: f64,
	ttft_distribution_ms: Option<Vec<f64>>,
	latency_distribution_ms: Option<Vec<f64>>,
	errors_top_n: Option<Vec<ErrorStat>>,
}

impl PerformanceArtifact {
	fn into_phase(self) -> (String, PerformancePhase) {
		let model = self.model.filter(|m| !m.trim().is_empty()).unwrap_or_else(|| UNKNOWN_MODEL.to_string());
		let samples = |v: Option<Vec<f64>>| v.unwrap_or_default().into_iter().map(non_negative).collect::<Vec<_>>();
		let rate = self.success_rate;
		let phase = PerformancePhase {
			provider: self.provider.unwrap_or_default(),
			started_at: self.started_at.unwrap_or_default(),
			wall_time_ms: non_negative(self.wall_time_ms),
			total_requests: self.total_requests,
			success: self.success,
			failure: self.failure,
			success_rate: if rate.is_finite() { rate.clamp(0.0, 1.0) } else { 0.0 },
			ttft: LatencyStats {
				avg_ms: self.avg_ttft_ms,
				p50_ms: self.p50_ttft_ms,
				p95_ms: self.p95_ttft_ms,
				p99_ms: self.p99_ttft_ms,
			}
			.sanitized(),
			latency: LatencyStats {
				avg_ms: self.avg_latency_ms,
				p50_ms: self.p50_latency_ms,
				p95_ms: self.p95_latency_ms,
				p99_ms: self.p99_latency_ms,
			}
			.sanitized(),
			token_mode: self.token_mode.unwrap_or_default(),
			token_throughput: non_negative(self.token_throughput),
			rps: non_negative(self.rps),
			ttft_distribution_ms: samples(self.ttft_distribution_ms),
			latency_distribution_ms: samples(self.latency_distribution_ms),
			errors_top_n: self.errors_top_n.unwrap_or_default(),
		};
		(model, phase)
	}
}

/// On-disk shape of the summarization metrics. Durations are integer ticks.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SummarizationArtifact {
	total_chunks: u64,
	total_prompt_tokens: u64,
	total_completion_tokens: u64,
	total_tokens: u64,
	total_processing_time: i64,
	average_time_per_chunk: i64,
	tokens_per_second: f64,
	overflow_detected: bool,
	overflow_at_chunk: u64,
	overflow_at_tokens: u64,
}

impl SummarizationArtifact {
	fn into_phase(self, ticks_per_second: u64) -> SummarizationPhase {
		let secs = |ticks: i64| non_negative(ticks as f64 / ticks_per_second as f64);
		SummarizationPhase {
			total_chunks: self.total_chunks,
			prompt_tokens: self.total_prompt_tokens,
			completion_tokens: self.total_completion_tokens,
			total_tokens: self.total_tokens,
			processing_time_secs: secs(self.total_processing_time),
			avg_time_per_chunk_secs: secs(self.average_time_per_chunk),
			tokens_per_second: non_negative(self.tokens_per_second),
			overflow_detected: self.overflow_detected,
			overflow_at_chunk: self.overflow_at_chunk,
			overflow_at_tokens: self.overflow_at_tokens,
		}
	}
}

/// Read the mandatory performance artifact. Missing file and decode failures are errors.
pub fn load_performance(path: &Path) -> Result<(String, PerformancePhase)> {
	if !path.is_file() {
		return Err(Error::MissingArtifact(path.to_path_buf()));
	}
	let data = fs::read_to_string(path).map_err(|e| Error::malformed(path, e))?;
	let raw: PerformanceArtifact = serde_json::from_str(&data).map_err(|e| Error::malformed(path, e))?;
	Ok(raw.into_phase())
}

/// Read the optional summarization artifact.
pub fn load_summarization(path: &Path, ticks_per_second: u64) -> Extraction<SummarizationPhase> {
	if !path.is_file() {
		return Extraction::Absent;
	}
	let data = match fs::read_to_string(path) {
		Ok(d) => d,
		Err(e) => return Extraction::Malformed(e.to_string()),
	};
	match serde_json::from_str::<SummarizationArtifact>(&data) {
		Ok(raw) => Extraction::Found(raw.into_phase(ticks_per_second)),
		Err(e) => Extraction::Malformed(e.to_string()),
	}
}

/// Resolve an optional phase to its value or default, reporting malformed content.
fn settle<T: Default>(candidate: &str, phase: &str, outcome: Extraction<T>) -> T {
	match outcome {
		Extraction::Found(v) => v,
		Extraction::Absent => {
			debug!(candidate, phase, "phase absent, using default");
			T::default()
		}
		Extraction::Malformed(reason) => {
			warn!(candidate, phase, %reason, "phase malformed, using default");
			T::default()
		}
	}
}

/// Merge one candidate's artifacts into a canonical record.
pub fn parse_candidate(candidate: &Candidate, config: &CompareConfig) -> Result<CanonicalRecord> {
	let layout = &config.layout;
	let (model, performance) = load_performance(&candidate.artifact(&layout.performance))?;
	let mut record = CanonicalRecord::new(candidate.name.clone(), model, performance);

	record.summarization = settle(
		&candidate.name,
		"summarization",
		load_summarization(&candidate.artifact(&layout.summarization), config.ticks_per_second),
	);

	let narrative_path = candidate.artifact(&layout.narrative);
	let text = if narrative_path.is_file() {
		match fs::read_to_string(&narrative_path) {
			Ok(t) => Some(t),
			Err(e) => {
				warn!(candidate = %candidate.name, path = %narrative_path.display(), error = %e, "narrative report unreadable");
				None
			}
		}
	} else {
		None
	};
	if let Some(text) = text {
		record.function_call = settle(&candidate.name, "function_call", narrative::extract_function_call(&text));
		record.long_context = settle(
			&candidate.name,
			"long_context",
			narrative::extract_long_context(&text).map(narrative::LongContextReport::into_phase),
		);
	} else {
		debug!(candidate = %candidate.name, "no narrative report");
	}

	Ok(record)
}
