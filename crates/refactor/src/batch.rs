//! Rename requests and the checks that only make sense across a batch.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use splice_primitives::SymbolId;

use crate::graph::find_cycles;
use crate::identifier::validate_identifier;
use crate::{RefactorError, Result};

/// A request to rename one symbol, as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenameRequest {
	pub symbol_id: String,
	pub new_name: String,
}

impl RenameRequest {
	pub fn new(symbol_id: impl Into<String>, new_name: impl Into<String>) -> Self {
		Self {
			symbol_id: symbol_id.into(),
			new_name: new_name.into(),
		}
	}

	/// Structural checks that run before any port is consulted.
	///
	/// In order: both fields present, symbol id well formed, target a valid
	/// identifier, target different from the current name.
	pub fn parse(&self) -> Result<ParsedRename> {
		if self.symbol_id.trim().is_empty() {
			return Err(RefactorError::invalid_input("symbol_id", "must be a non-empty string"));
		}
		if self.new_name.is_empty() {
			return Err(RefactorError::invalid_input("new_name", "must be a non-empty string"));
		}
		let symbol_id = SymbolId::parse(&self.symbol_id)?;
		if let Err(issue) = validate_identifier(&self.new_name) {
			return Err(RefactorError::InvalidIdentifier {
				name: self.new_name.clone(),
				reason: issue.to_string(),
			});
		}
		if self.new_name.trim() == symbol_id.simple_name() {
			return Err(RefactorError::invalid_input(
				"new_name",
				format!("'{}' matches the current name", self.new_name),
			));
		}
		Ok(ParsedRename {
			old_name: symbol_id.simple_name().to_string(),
			new_name: self.new_name.clone(),
			symbol_id,
		})
	}
}

/// A request that passed [`RenameRequest::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRename {
	pub symbol_id: SymbolId,
	pub old_name: String,
	pub new_name: String,
}

impl ParsedRename {
	/// The id the symbol will have after the rename.
	pub fn renamed_id(&self) -> SymbolId {
		self.symbol_id.with_simple_name(&self.new_name)
	}
}

/// Errors that arise from combining requests, independent of the project.
///
/// Covers a symbol requested twice, two symbols renamed to the same target,
/// and rename chains that loop back on themselves.
pub fn batch_errors(renames: &[ParsedRename]) -> Vec<String> {
	let mut errors = Vec::new();

	let mut by_symbol: FxHashMap<&SymbolId, &str> = FxHashMap::default();
	for rename in renames {
		if let Some(previous) = by_symbol.insert(&rename.symbol_id, &rename.new_name) {
			errors.push(format!(
				"Symbol {} is renamed more than once ('{previous}' and '{}')",
				rename.symbol_id, rename.new_name
			));
		}
	}

	let mut by_target: FxHashMap<&str, &SymbolId> = FxHashMap::default();
	for rename in renames {
		match by_target.get(rename.new_name.as_str()) {
			Some(first) if *first != &rename.symbol_id => errors.push(format!(
				"Duplicate rename target '{}': both {first} and {} would be renamed to it",
				rename.new_name, rename.symbol_id
			)),
			Some(_) => {}
			None => {
				by_target.insert(&rename.new_name, &rename.symbol_id);
			}
		}
	}

	for cycle in rename_cycles(renames) {
		errors.push(format!("Circular rename chain: {}", cycle.join(" -> ")));
	}
	errors
}

/// Cycles in the graph with one edge `old name -> new name` per request.
pub fn rename_cycles(renames: &[ParsedRename]) -> Vec<Vec<String>> {
	let mut edges: FxHashMap<String, Vec<String>> = FxHashMap::default();
	for rename in renames {
		edges.entry(rename.old_name.clone()).or_default().push(rename.new_name.clone());
	}
	find_cycles(renames.iter().map(|r| r.old_name.clone()), &edges)
}
