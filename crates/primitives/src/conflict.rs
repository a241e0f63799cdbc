//! Typed conflict records produced while validating a rename.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// What kind of problem a conflict describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
	/// The new name is not a valid identifier.
	InvalidIdentifier,
	/// The new name is a reserved keyword or built-in constant.
	Reserved,
	/// The new name already resolves to another symbol in an affected scope or file.
	Shadow,
	/// The symbol being renamed does not exist.
	MissingSymbol,
	/// The rename touches an unusually large number of occurrences.
	LargeRename,
	/// The symbol has an unusually large number of dependents.
	ManyDependents,
	/// A collaborator failed while the rename was being analyzed.
	AnalysisError,
}

impl ConflictKind {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::InvalidIdentifier => "invalid_identifier",
			Self::Reserved => "reserved",
			Self::Shadow => "shadow",
			Self::MissingSymbol => "missing_symbol",
			Self::LargeRename => "large_rename",
			Self::ManyDependents => "many_dependents",
			Self::AnalysisError => "analysis_error",
		}
	}
}

impl fmt::Display for ConflictKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Errors invalidate a rename plan; warnings are advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
	Error,
	Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictRecord {
	#[serde(rename = "type")]
	pub kind: ConflictKind,
	pub message: String,
	pub severity: Severity,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub path: Option<PathBuf>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub suggestions: Vec<String>,
}

impl ConflictRecord {
	pub fn error(kind: ConflictKind, message: impl Into<String>) -> Self {
		Self {
			kind,
			message: message.into(),
			severity: Severity::Error,
			path: None,
			suggestions: Vec::new(),
		}
	}

	pub fn warning(kind: ConflictKind, message: impl Into<String>) -> Self {
		Self {
			severity: Severity::Warning,
			..Self::error(kind, message)
		}
	}

	pub fn at(mut self, path: impl Into<PathBuf>) -> Self {
		self.path = Some(path.into());
		self
	}

	pub fn suggest<I, S>(mut self, suggestions: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.suggestions.extend(suggestions.into_iter().map(Into::into));
		self
	}

	pub fn is_error(&self) -> bool {
		self.severity == Severity::Error
	}
}

/// Returns true when any record in `conflicts` blocks the rename.
pub fn has_blocking(conflicts: &[ConflictRecord]) -> bool {
	conflicts.iter().any(ConflictRecord::is_error)
}
