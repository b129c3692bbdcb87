use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Failure modes of the comparison pipeline.
///
/// Only [`Error::RootNotFound`] and [`Error::EmptyBatch`] are fatal to a run;
/// the artifact variants are confined to a single candidate and the pipeline
/// skips that candidate and keeps going.
#[derive(Debug, Error)]
pub enum Error {
	/// Filesystem access outside of a single candidate's artifacts.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Invalid or unreadable configuration.
	#[error("config: {0}")]
	Config(String),
	/// The scan root does not exist or is not a directory.
	#[error("scan root not found: {}", .0.display())]
	RootNotFound(PathBuf),
	/// A candidate lacks its mandatory performance artifact.
	#[error("missing performance artifact: {}", .0.display())]
	MissingArtifact(PathBuf),
	/// An artifact exists but could not be read or decoded.
	#[error("malformed artifact {}: {reason}", .path.display())]
	MalformedArtifact {
		/// Artifact that failed.
		path: PathBuf,
		/// Read or decode error text.
		reason: String,
	},
	/// No candidate qualified, or every qualifying candidate failed.
	#[error("no benchmark results could be loaded")]
	EmptyBatch,
}

impl Error {
	/// Shorthand for [`Error::Config`].
	pub fn config(msg: impl Into<String>) -> Self { Self::Config(msg.into()) }

	/// Shorthand for [`Error::MalformedArtifact`].
	pub fn malformed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
		Self::MalformedArtifact { path: path.into(), reason: reason.to_string() }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn malformed_message_names_path() {
		let e = Error::malformed("run_a/benchmark/summary.json", "expected value");
		let msg = e.to_string();
		assert!(msg.contains("run_a/benchmark/summary.json"));
		assert!(msg.contains("expected value"));
	}

	#[test]
	fn root_not_found_names_root() {
		let msg = Error::RootNotFound(PathBuf::from("/nope/output")).to_string();
		assert_eq!(msg, "scan root not found: /nope/output");
	}
}
