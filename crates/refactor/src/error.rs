use splice_cache::ComputeAborted;
use splice_ports::PortError;
use splice_primitives::{EditError, SymbolIdError};
use thiserror::Error;

/// A convenient type alias for `Result` with `E` = [`RefactorError`].
pub type Result<T, E = RefactorError> = std::result::Result<T, E>;

/// Failures raised by the rename engine.
///
/// Conflicts and edit-validation problems are not errors; they come back as
/// structured results. These variants cover bad input, missing providers and
/// collaborator failures on the write side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefactorError {
	#[error("invalid {field}: {reason}")]
	InvalidInput { field: &'static str, reason: String },
	#[error(transparent)]
	MalformedSymbolId(#[from] SymbolIdError),
	#[error("'{name}' is not a valid identifier: {reason}")]
	InvalidIdentifier { name: String, reason: String },
	#[error("{0} requires an injected provider")]
	ProviderRequired(&'static str),
	#[error("failed to apply edits to {path}: {source}")]
	Apply { path: String, source: EditError },
	#[error(transparent)]
	Port(#[from] PortError),
	#[error("invalid configuration: {0}")]
	Config(String),
	#[error(transparent)]
	Aborted(#[from] ComputeAborted),
}

impl RefactorError {
	pub(crate) fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
		Self::InvalidInput {
			field,
			reason: reason.into(),
		}
	}
}
