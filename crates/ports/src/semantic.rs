//! The semantic index port.
//!
//! Every method is optional. A port advertises what it implements through
//! [`SemanticPort::capabilities`]; callers check the flag once per call site
//! and fall back to a named default when it is missing. Unimplemented methods
//! return [`PortError::Unsupported`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use splice_primitives::{SymbolId, SymbolOccurrence};

use crate::{PortError, PortResult};

bitflags! {
	/// Methods a [`SemanticPort`] actually implements.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct SemanticCapabilities: u8 {
		const HAS_SYMBOL = 1 << 0;
		const OCCURRENCES = 1 << 1;
		const FILE_SYMBOLS = 1 << 2;
		const DEPENDENTS = 1 << 3;
		const RESERVED_KEYWORDS = 1 << 4;
		const LOOKUP = 1 << 5;
	}
}

/// A symbol that depends on one of the queried symbols.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependent {
	pub symbol_id: SymbolId,
	pub path: PathBuf,
	/// The queried symbol this dependent was reached from, when the index knows it.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub depends_on: Option<SymbolId>,
}

impl Dependent {
	pub fn new(symbol_id: SymbolId, path: impl Into<PathBuf>) -> Self {
		Self {
			symbol_id,
			path: path.into(),
			depends_on: None,
		}
	}

	pub fn via(mut self, depends_on: SymbolId) -> Self {
		self.depends_on = Some(depends_on);
		self
	}
}

/// The result of resolving a name in a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupHit {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub symbol_id: Option<SymbolId>,
}

/// Read-only access to the project's symbol index.
#[async_trait]
pub trait SemanticPort: Send + Sync {
	fn capabilities(&self) -> SemanticCapabilities;

	async fn has_symbol(&self, _id: &SymbolId) -> PortResult<bool> {
		Err(PortError::Unsupported("has_symbol"))
	}

	/// Every occurrence of `name` across the project.
	async fn symbol_occurrences(&self, _name: &str) -> PortResult<Vec<SymbolOccurrence>> {
		Err(PortError::Unsupported("symbol_occurrences"))
	}

	/// Symbols declared in `path`.
	async fn file_symbols(&self, _path: &Path) -> PortResult<Vec<SymbolId>> {
		Err(PortError::Unsupported("file_symbols"))
	}

	/// Direct dependents of any symbol in `ids`.
	async fn dependents(&self, _ids: &[SymbolId]) -> PortResult<Vec<Dependent>> {
		Err(PortError::Unsupported("dependents"))
	}

	async fn reserved_keywords(&self) -> PortResult<Vec<String>> {
		Err(PortError::Unsupported("reserved_keywords"))
	}

	/// Resolves `name` as seen from `scope` (`None` is the global scope).
	async fn lookup(&self, _name: &str, _scope: Option<&str>) -> PortResult<Option<LookupHit>> {
		Err(PortError::Unsupported("lookup"))
	}
}
