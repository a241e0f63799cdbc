use std::path::{Path, PathBuf};

use thiserror::Error;

/// A convenient type alias for `Result` with `E` = [`PortError`].
pub type PortResult<T> = Result<T, PortError>;

/// Failures reported by an injected collaborator.
///
/// Cloneable so one failure can be handed to every caller waiting on a
/// coalesced computation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
	/// The collaborator does not implement this capability.
	#[error("capability not provided: {0}")]
	Unsupported(&'static str),
	#[error("file not found: {}", .0.display())]
	NotFound(PathBuf),
	#[error("i/o error on {}: {message}", path.display())]
	Io { path: PathBuf, message: String },
	#[error("failed to parse {}: {message}", path.display())]
	Parse { path: PathBuf, message: String },
	#[error("{0}")]
	Failed(String),
}

impl PortError {
	pub fn io(path: &Path, err: &std::io::Error) -> Self {
		if err.kind() == std::io::ErrorKind::NotFound {
			return Self::NotFound(path.to_path_buf());
		}
		Self::Io {
			path: path.to_path_buf(),
			message: err.to_string(),
		}
	}

	pub fn failed(message: impl Into<String>) -> Self {
		Self::Failed(message.into())
	}
}
