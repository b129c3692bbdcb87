use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{
	fs,
	path::{Path, PathBuf},
};

/// Nanosecond ticks per second; durations in the summarization artifact use this unit.
pub const DEFAULT_TICKS_PER_SECOND: u64 = 1_000_000_000;

/// Where each artifact lives relative to a candidate directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArtifactLayout {
	/// Mandatory performance summary. Its presence is what makes a directory a candidate.
	pub performance: PathBuf,
	/// Optional summarization metrics.
	pub summarization: PathBuf,
	/// Optional narrative report.
	pub narrative: PathBuf,
}

impl Default for ArtifactLayout {
	fn default() -> Self {
		Self {
			performance: PathBuf::from("benchmark/summary.json"),
			summarization: PathBuf::from("summary/performance_metrics.json"),
			narrative: PathBuf::from("full_test_report.md"),
		}
	}
}

impl ArtifactLayout {
	fn validate(&self) -> Result<()> {
		for (name, p) in [
			("performance", &self.performance),
			("summarization", &self.summarization),
			("narrative", &self.narrative),
		] {
			if p.as_os_str().is_empty() {
				return Err(Error::config(format!("{name} artifact path is empty")));
			}
			if p.is_absolute() {
				return Err(Error::config(format!("{name} artifact path must be relative: {}", p.display())));
			}
		}
		Ok(())
	}
}

/// Presentation settings handed to the external renderer as plain data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChartStyle {
	/// Renderer template name.
	pub template: String,
	/// Chart height in pixels.
	pub chart_height: u32,
	/// Series colors, used in order.
	pub palette: Vec<String>,
}

impl Default for ChartStyle {
	fn default() -> Self {
		Self {
			template: "plotly_white".into(),
			chart_height: 500,
			palette: ["#3498db", "#2ecc71", "#f39c12", "#e74c3c", "#9b59b6", "#1abc9c"]
				.iter()
				.map(|c| c.to_string())
				.collect(),
		}
	}
}

/// Settings for one comparison run. Every field has a default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompareConfig {
	/// One of `trace`, `debug`, `info`, `warn`, `error`.
	pub log_level: String,
	/// Parse candidates as independent blocking tasks instead of one after another.
	pub concurrent_parse: bool,
	/// Divisor turning summarization ticks into seconds.
	pub ticks_per_second: u64,
	/// Artifact locations inside each candidate.
	pub layout: ArtifactLayout,
	/// Passed through to the comparison document.
	pub style: ChartStyle,
}

impl Default for CompareConfig {
	fn default() -> Self {
		Self {
			log_level: "info".into(),
			concurrent_parse: false,
			ticks_per_second: DEFAULT_TICKS_PER_SECOND,
			layout: ArtifactLayout::default(),
			style: ChartStyle::default(),
		}
	}
}

impl CompareConfig {
	/// Start from defaults.
	pub fn builder() -> CompareConfigBuilder { CompareConfigBuilder::default() }

	/// Read and validate a TOML file. Missing keys take their defaults.
	pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
		let data = fs::read_to_string(path)?;
		let cfg: Self = toml::from_str(&data).map_err(|e| Error::config(format!("toml parse error: {e}")))?;
		cfg.validate()?;
		Ok(cfg)
	}

	/// Write as pretty TOML.
	pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
		let s = toml::to_string_pretty(self).map_err(|e| Error::config(format!("toml encode error: {e}")))?;
		fs::write(path, s)?;
		Ok(())
	}

	/// Defaults overlaid with `BENCHCMP_*` variables.
	pub fn from_env() -> Result<Self> {
		let mut cfg = Self::default();
		cfg.apply_env()?;
		Ok(cfg)
	}

	/// Overlay `BENCHCMP_*` environment variables onto an existing config.
	pub fn apply_env(&mut self) -> Result<()> {
		if let Ok(v) = std::env::var("BENCHCMP_LOG_LEVEL") { self.log_level = v; }
		if let Ok(v) = std::env::var("BENCHCMP_CONCURRENT") { self.concurrent_parse = v == "1" || v.eq_ignore_ascii_case("true"); }
		if let Ok(v) = std::env::var("BENCHCMP_TICKS_PER_SECOND") {
			self.ticks_per_second = v.trim().parse().map_err(|_| Error::config(format!("invalid BENCHCMP_TICKS_PER_SECOND: {v}")))?;
		}
		self.validate()
	}

	/// Reject unknown log levels, a zero tick divisor and empty or absolute artifact paths.
	pub fn validate(&self) -> Result<()> {
		let allowed = ["trace", "debug", "info", "warn", "error"];
		if !allowed.contains(&self.log_level.as_str()) {
			return Err(Error::config(format!("invalid log_level: {}", self.log_level)));
		}
		if self.ticks_per_second == 0 {
			return Err(Error::config("ticks_per_second must be non-zero"));
		}
		self.layout.validate()
	}
}

/// Builder for [`CompareConfig`]; [`build`](Self::build) validates.
#[derive(Debug, Default)]
pub struct CompareConfigBuilder {
	inner: CompareConfig,
}

#[allow(missing_docs)]
impl CompareConfigBuilder {
	pub fn log_level(mut self, level: impl Into<String>) -> Self { self.inner.log_level = level.into(); self }
	pub fn concurrent_parse(mut self, on: bool) -> Self { self.inner.concurrent_parse = on; self }
	pub fn ticks_per_second(mut self, ticks: u64) -> Self { self.inner.ticks_per_second = ticks; self }
	pub fn layout(mut self, layout: ArtifactLayout) -> Self { self.inner.layout = layout; self }
	pub fn style(mut self, style: ChartStyle) -> Self { self.inner.style = style; self }

	/// Validate and return the config.
	pub fn build(self) -> Result<CompareConfig> {
		self.inner.validate()?;
		Ok(self.inner)
	}
}
