#![forbid(unsafe_code)]

use anyhow::Context;
use benchcmp_core::{Batch, Category, CompareConfig};
use clap::Parser;
use comfy_table::{presets::UTF8_FULL, Table};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "benchcmp", version, about = "Collect benchmark runs into one comparison document")]
struct Cli {
	/// Directory containing one subdirectory per benchmark run
	#[arg(short, long, default_value = "output")]
	input: PathBuf,
	/// Where to write the comparison document (JSON)
	#[arg(short, long, default_value = "comparison_report.json")]
	output: PathBuf,
	/// Only include runs whose directory name contains this substring (e.g. "fulltest_")
	#[arg(short, long)]
	pattern: Option<String>,
	/// TOML config file. Default: $BENCHCMP_CONFIG, then ./benchcmp.toml when present
	#[arg(long)]
	config: Option<PathBuf>,
	/// Parse runs as parallel tasks
	#[arg(long)]
	concurrent: bool,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	let mut cfg = resolve_config(cli.config.as_deref())?;
	if cli.concurrent { cfg.concurrent_parse = true; }
	init_tracing(&cfg.log_level);
	tracing::debug!(?cfg, "resolved config");

	println!("Scanning {} for benchmark results...", cli.input.display());
	let context = || format!("comparing results under {}", cli.input.display());
	let candidates = benchcmp_core::scan(&cli.input, cli.pattern.as_deref(), &cfg.layout).with_context(context)?;
	println!("Found {} benchmark results:", candidates.len());
	for c in &candidates {
		println!("   - {}", c.name);
	}
	let batch = benchcmp_core::parse(candidates, &cfg).await.with_context(context)?;

	print_summary(&batch);

	let doc = batch.into_document(cfg.style.clone());
	if let Some(parent) = cli.output.parent().filter(|p| !p.as_os_str().is_empty()) {
		std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
	}
	let json = serde_json::to_string_pretty(&doc)?;
	std::fs::write(&cli.output, json).with_context(|| format!("writing {}", cli.output.display()))?;
	println!("Comparison data written: {}", cli.output.display());
	Ok(())
}

/// Explicit `--config`, then `$BENCHCMP_CONFIG`, then `./benchcmp.toml`; env overrides last.
fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<CompareConfig> {
	let path = explicit
		.map(Path::to_path_buf)
		.or_else(|| std::env::var("BENCHCMP_CONFIG").ok().filter(|p| !p.trim().is_empty()).map(PathBuf::from))
		.or_else(|| Some(PathBuf::from("benchcmp.toml")).filter(|p| p.is_file()));
	let mut cfg = match path {
		Some(p) => CompareConfig::load_from_file(&p).with_context(|| format!("loading config {}", p.display()))?,
		None => CompareConfig::default(),
	};
	cfg.apply_env()?;
	Ok(cfg)
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
	let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).try_init();
}

fn print_summary(batch: &Batch) {
	println!("Loaded {} benchmark results ({} skipped):", batch.records.len(), batch.skipped.len());
	let mut table = Table::new();
	table.load_preset(UTF8_FULL);
	table.set_header(vec![
		"Name", "Model", "Avg TTFT (ms)", "P99 TTFT (ms)", "Avg Latency (ms)", "P99 Latency (ms)",
		"Throughput (tok/s)", "RPS", "Success", "Function Call", "Max Context",
	]);
	for r in &batch.records {
		let p = &r.performance;
		table.add_row(vec![
			r.name.clone(),
			r.model.clone(),
			format!("{:.2}", p.ttft.avg_ms),
			format!("{:.0}", p.ttft.p99_ms),
			format!("{:.2}", p.latency.avg_ms),
			format!("{:.0}", p.latency.p99_ms),
			format!("{:.2}", p.token_throughput),
			format!("{:.2}", p.rps),
			format!("{:.1}%", p.success_rate * 100.0),
			if r.function_call.supported { "yes".to_string() } else { "no".to_string() },
			r.long_context.max_context_length.to_string(),
		]);
	}
	println!("{table}");

	let mut scores = Table::new();
	scores.load_preset(UTF8_FULL);
	scores.set_header(std::iter::once("name").chain(Category::ALL.iter().map(|c| c.key())).collect::<Vec<_>>());
	for s in &batch.scores {
		let mut row = vec![s.name.clone()];
		row.extend(Category::ALL.iter().map(|c| format!("{:.1}", s.get(*c))));
		scores.add_row(row);
	}
	println!("{scores}");
	for s in &batch.skipped {
		println!("   skipped {}: {}", s.name, s.reason);
	}
}
