//! Tolerant extraction of optional phases from the Markdown narrative report.
//!
//! Each rule returns an [`Extraction`], so a caller can tell a report that
//! never mentions a phase apart from one whose section exists but cannot be
//! read. Both cases fall back to the phase default when merged into a record.

use crate::types::{non_negative, ContextTrial, FunctionCallPhase, LongContextPhase};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Outcome of one extraction rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction<T> {
	/// The report does not mention this phase.
	Absent,
	/// The phase marker exists but its content could not be read.
	Malformed(String),
	/// The phase was read.
	Found(T),
}

impl<T> Extraction<T> {
	/// Transform a found value, keeping `Absent` and `Malformed` as they are.
	pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Extraction<U> {
		match self {
			Self::Absent => Extraction::Absent,
			Self::Malformed(r) => Extraction::Malformed(r),
			Self::Found(v) => Extraction::Found(f(v)),
		}
	}
}

static FC_NEGATIVE: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"(?i)不支持\s*Function\s*Call|Function\s*Call\s+(?:is\s+)?not\s+supported").expect("valid regex"));
static FC_POSITIVE: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"(?i)支持\s*Function\s*Call|Function\s*Call\s+(?:is\s+)?supported").expect("valid regex"));
static FC_NAME: Lazy<Regex> = Lazy::new(|| labeled_line(r"函数名|Function(?:\s+name)?"));
static FC_ARGS: Lazy<Regex> = Lazy::new(|| labeled_line(r"参数|Arguments"));
static FC_LATENCY: Lazy<Regex> = Lazy::new(|| labeled_line(r"响应延迟|Latency"));
static FC_ERROR: Lazy<Regex> = Lazy::new(|| labeled_line(r"错误信息|Error"));

static LC_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)长上下文|long[\s-]*context").expect("valid regex"));
static LC_ROW: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"^\|\s*(\d+)\s*\|\s*(\d+)\s*\|\s*(\d+(?:\.\d+)?)\s*\|\s*(\d+(?:\.\d+)?)\s*\|\s*(\d+(?:\.\d+)?)\s*\|\s*(✅|✓|❌|✗)[^|]*\|?\s*$")
		.expect("valid regex")
});
static LC_ROW_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\|\s*\d").expect("valid regex"));
static LC_SUMMARY: Lazy<Regex> = Lazy::new(|| {
	Regex::new(concat!(
		r"(?i)(?:最大支持上下文|max(?:imum)?\s+context(?:\s+length)?)\**\s*[:：]\s*\**\s*(\d+)",
		r".*?(?:平均\s*TTFT|avg\s+TTFT)\**\s*[:：]\s*\**\s*(\d+(?:\.\d+)?)",
		r".*?(?:平均吞吐量?|avg\s+throughput)\**\s*[:：]\s*\**\s*(\d+(?:\.\d+)?)",
	))
	.expect("valid regex")
});

/// `- Label: value` (bullet optional, ASCII or full-width colon). Captures the value.
fn labeled_line(label: &str) -> Regex {
	Regex::new(&format!(r"(?m)^\s*[-*]?\s*(?:{label})\s*[:：]\s*(.+?)\s*$")).expect("valid regex")
}

fn unquote(s: &str) -> String { s.trim().trim_matches('`').trim().to_string() }

fn parse_ms(s: &str) -> Option<f64> {
	let v = s.trim().trim_end_matches("ms").trim().parse::<f64>().ok()?;
	Some(non_negative(v))
}

fn capture<'a>(re: &Regex, block: &'a str) -> Option<&'a str> {
	re.captures(block).and_then(|c| c.get(1)).map(|v| v.as_str())
}

/// The text from `start` up to (not including) the next Markdown heading line.
fn until_next_heading(text: &str, start: usize) -> &str {
	let rest = &text[start..];
	let mut offset = 0;
	for line in rest.split_inclusive('\n') {
		// the marker's own line never ends the block
		if offset > 0 && line.trim_start().starts_with('#') {
			return &rest[..offset];
		}
		offset += line.len();
	}
	rest
}

/// Function-call phase from the report's support marker and its labeled lines.
pub fn extract_function_call(text: &str) -> Extraction<FunctionCallPhase> {
	let (supported, m) = match FC_NEGATIVE.find(text) {
		Some(m) => (false, m),
		None => match FC_POSITIVE.find(text) {
			Some(m) => (true, m),
			None => return Extraction::Absent,
		},
	};
	let block = until_next_heading(text, m.end());

	let mut phase = FunctionCallPhase { supported, ..FunctionCallPhase::default() };
	if supported {
		phase.function_name = capture(&FC_NAME, block).map(unquote).unwrap_or_default();
		phase.arguments = capture(&FC_ARGS, block).map(unquote).unwrap_or_default();
		if let Some(raw) = capture(&FC_LATENCY, block) {
			match parse_ms(raw) {
				Some(v) => phase.latency_ms = v,
				None => return Extraction::Malformed(format!("unreadable function call latency: {raw}")),
			}
		}
	} else {
		phase.error = capture(&FC_ERROR, block).map(unquote).unwrap_or_default();
	}
	Extraction::Found(phase)
}

/// Values declared on the long-context summary line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextSummary {
	/// Declared maximum context length.
	pub max_context_length: u64,
	/// Declared mean TTFT.
	pub avg_ttft_ms: f64,
	/// Declared mean throughput.
	pub avg_throughput: f64,
}

/// Raw content of the long-context section before reconciliation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LongContextReport {
	/// Parsed rows in table order.
	pub trials: Vec<ContextTrial>,
	/// First summary line inside the section, if any.
	pub summary: Option<ContextSummary>,
	/// Table lines that looked like trial rows but did not match the row pattern.
	pub rejected_rows: usize,
}

impl LongContextReport {
	/// Build the phase. Trial rows are authoritative; the summary line is used
	/// only when no row could be parsed. Average latency always comes from rows.
	pub fn into_phase(self) -> LongContextPhase {
		match (self.trials.is_empty(), self.summary) {
			(true, Some(s)) => LongContextPhase {
				max_context_length: s.max_context_length,
				avg_ttft_ms: s.avg_ttft_ms,
				avg_throughput: s.avg_throughput,
				..LongContextPhase::default()
			},
			_ => {
				let phase = LongContextPhase::from_trials(self.trials);
				if let Some(s) = self.summary {
					if s.max_context_length != phase.max_context_length {
						debug!(declared = s.max_context_length, derived = phase.max_context_length, "summary line disagrees with trial rows; keeping rows");
					}
				}
				phase
			}
		}
	}
}

fn heading_level(line: &str) -> Option<usize> {
	let t = line.trim_start();
	let level = t.chars().take_while(|c| *c == '#').count();
	(level > 0).then_some(level)
}

fn parse_row(line: &str) -> Option<ContextTrial> {
	let c = LC_ROW.captures(line)?;
	let num = |i: usize| c.get(i).map(|m| m.as_str()).unwrap_or_default();
	Some(ContextTrial {
		context_length: num(1).parse().ok()?,
		input_tokens: num(2).parse().ok()?,
		ttft_ms: non_negative(num(3).parse().ok()?),
		latency_ms: non_negative(num(4).parse().ok()?),
		throughput: non_negative(num(5).parse().ok()?),
		success: matches!(num(6), "✅" | "✓"),
	})
}

fn parse_summary(line: &str) -> Option<ContextSummary> {
	let c = LC_SUMMARY.captures(line)?;
	Some(ContextSummary {
		max_context_length: c.get(1)?.as_str().parse().ok()?,
		avg_ttft_ms: non_negative(c.get(2)?.as_str().parse().ok()?),
		avg_throughput: non_negative(c.get(3)?.as_str().parse().ok()?),
	})
}

/// Trial rows and summary line of the long-context section.
pub fn extract_long_context(text: &str) -> Extraction<LongContextReport> {
	let mut lines = text.lines();
	let level = loop {
		match lines.next() {
			None => return Extraction::Absent,
			Some(line) => {
				if let Some(level) = heading_level(line) {
					if LC_HEADING.is_match(line) { break level; }
				}
			}
		}
	};

	let mut report = LongContextReport::default();
	for line in lines {
		if heading_level(line).is_some_and(|l| l <= level) { break; }
		let line = line.trim();
		if let Some(trial) = parse_row(line) {
			report.trials.push(trial);
		} else if LC_ROW_LIKE.is_match(line) {
			report.rejected_rows += 1;
		} else if report.summary.is_none() {
			report.summary = parse_summary(line);
		}
	}

	if report.trials.is_empty() && report.summary.is_none() {
		return Extraction::Malformed(match report.rejected_rows {
			0 => "long context section has no trial rows".to_string(),
			n => format!("long context section has {n} unreadable trial rows"),
		});
	}
	Extraction::Found(report)
}
