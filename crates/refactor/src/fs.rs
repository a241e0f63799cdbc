//! A [`FilePort`] over the local filesystem.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use splice_ports::{FilePort, PortError, PortResult};

/// Reads and writes files under `root`. Relative paths resolve against it;
/// absolute paths are used as given.
#[derive(Debug, Clone)]
pub struct DiskFiles {
	root: PathBuf,
}

impl DiskFiles {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	fn resolve(&self, path: &Path) -> PathBuf {
		self.root.join(path)
	}
}

#[async_trait]
impl FilePort for DiskFiles {
	async fn read_file(&self, path: &Path) -> PortResult<String> {
		tokio::fs::read_to_string(self.resolve(path))
			.await
			.map_err(|e| PortError::io(path, &e))
	}

	async fn write_file(&self, path: &Path, contents: &str) -> PortResult<()> {
		let full = self.resolve(path);
		if let Some(parent) = full.parent()
			&& !parent.as_os_str().is_empty()
		{
			tokio::fs::create_dir_all(parent)
				.await
				.map_err(|e| PortError::io(path, &e))?;
		}
		tokio::fs::write(&full, contents)
			.await
			.map_err(|e| PortError::io(path, &e))
	}
}
