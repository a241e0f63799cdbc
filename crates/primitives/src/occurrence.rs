use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Opaque scope identifier assigned by the semantic index.
pub type ScopeId = String;

/// Whether an occurrence declares the symbol or refers to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceKind {
	Definition,
	Reference,
}

/// One textual appearance of a symbol's name.
///
/// Offsets are a half-open byte range into the file's current content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolOccurrence {
	pub path: PathBuf,
	pub start: usize,
	pub end: usize,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub scope: Option<ScopeId>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub kind: Option<OccurrenceKind>,
}

impl SymbolOccurrence {
	pub fn new(path: impl Into<PathBuf>, start: usize, end: usize) -> Self {
		Self {
			path: path.into(),
			start,
			end,
			scope: None,
			kind: None,
		}
	}

	pub fn in_scope(mut self, scope: impl Into<ScopeId>) -> Self {
		self.scope = Some(scope.into());
		self
	}

	pub fn with_kind(mut self, kind: OccurrenceKind) -> Self {
		self.kind = Some(kind);
		self
	}

	pub fn is_definition(&self) -> bool {
		self.kind == Some(OccurrenceKind::Definition)
	}
}
