use crate::{
	config::ArtifactLayout,
	error::{Error, Result},
};
use std::{
	fs,
	path::{Path, PathBuf},
};
use tracing::debug;

/// A directory holding the mandatory performance artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
	/// Directory name; becomes the record name.
	pub name: String,
	/// Absolute or root-relative path of the directory.
	pub dir: PathBuf,
}

impl Candidate {
	/// Path of an artifact given relative to the candidate directory.
	pub fn artifact(&self, relative: &Path) -> PathBuf { self.dir.join(relative) }
}

/// List qualifying candidates under `root`, sorted by name.
///
/// Only immediate subdirectories are considered. A subdirectory qualifies when
/// `layout.performance` exists beneath it and, if `filter` is given, its name
/// contains that substring.
pub fn scan(root: impl AsRef<Path>, filter: Option<&str>, layout: &ArtifactLayout) -> Result<Vec<Candidate>> {
	let root = root.as_ref();
	if !root.is_dir() {
		return Err(Error::RootNotFound(root.to_path_buf()));
	}

	let mut out = Vec::new();
	for entry in fs::read_dir(root)? {
		let entry = match entry {
			Ok(e) => e,
			Err(e) => {
				debug!(root = %root.display(), error = %e, "skipping unreadable entry");
				continue;
			}
		};
		let dir = entry.path();
		if !dir.is_dir() { continue; }
		let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
			debug!(path = %dir.display(), "skipping non-utf8 directory name");
			continue;
		};
		if !dir.join(&layout.performance).is_file() {
			debug!(candidate = %name, "no performance artifact, not a candidate");
			continue;
		}
		if let Some(f) = filter {
			if !name.contains(f) { continue; }
		}
		out.push(Candidate { name, dir });
	}
	out.sort_by(|a, b| a.name.cmp(&b.name));
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn touch(root: &Path, rel: &str) {
		let p = root.join(rel);
		fs::create_dir_all(p.parent().unwrap()).unwrap();
		fs::write(p, "{}").unwrap();
	}

	#[test]
	fn filters_and_sorts() {
		let dir = tempfile::tempdir().unwrap();
		let root = dir.path();
		touch(root, "fulltest_b/benchmark/summary.json");
		touch(root, "fulltest_a/benchmark/summary.json");
		touch(root, "summary_x/benchmark/summary.json");
		touch(root, "fulltest_c/summary/performance_metrics.json");
		touch(root, "loose_file.json");

		let layout = ArtifactLayout::default();
		let names: Vec<_> = scan(root, Some("fulltest_"), &layout).unwrap().into_iter().map(|c| c.name).collect();
		assert_eq!(names, vec!["fulltest_a", "fulltest_b"]);

		let all: Vec<_> = scan(root, None, &layout).unwrap().into_iter().map(|c| c.name).collect();
		assert_eq!(all, vec!["fulltest_a", "fulltest_b", "summary_x"]);
	}

	#[test]
	fn empty_root_is_not_an_error() {
		let dir = tempfile::tempdir().unwrap();
		assert!(scan(dir.path(), None, &ArtifactLayout::default()).unwrap().is_empty());
	}

	#[test]
	fn missing_root() {
		let dir = tempfile::tempdir().unwrap();
		let err = scan(dir.path().join("absent"), None, &ArtifactLayout::default()).unwrap_err();
		assert!(matches!(err, Error::RootNotFound(_)));
	}
}
