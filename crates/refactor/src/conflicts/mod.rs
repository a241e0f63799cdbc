//! Conflict detection for a proposed rename.
//!
//! Checks run cheapest first and the syntactic ones short-circuit: an invalid
//! or reserved target never reaches the semantic port.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use splice_ports::{LookupHit, SemanticCapabilities, SemanticPort};
use splice_primitives::{ConflictKind, ConflictRecord, ScopeId, SymbolId, SymbolOccurrence};
use tracing::{trace, warn};

use crate::RefactorConfig;
use crate::identifier::{reserved_alternatives, suggest_identifiers, validate_identifier};

/// Symbols that will no longer carry their current name once the rename runs.
///
/// A lookup that resolves to one of these is not a conflict: the renamed
/// symbol never shadows itself, and within a batch a target may reuse a name
/// another request frees up.
#[derive(Debug, Clone, Default)]
pub struct RenamedAway {
	ids: FxHashSet<SymbolId>,
	names: FxHashSet<String>,
}

impl RenamedAway {
	pub fn single(id: &SymbolId) -> Self {
		let mut away = Self::default();
		away.insert(id);
		away
	}

	pub fn insert(&mut self, id: &SymbolId) {
		self.names.insert(id.simple_name().to_string());
		self.ids.insert(id.clone());
	}

	pub fn contains_id(&self, id: &SymbolId) -> bool {
		self.ids.contains(id)
	}

	/// Hits without a symbol id are matched by name.
	pub fn contains_hit(&self, hit: &LookupHit) -> bool {
		match &hit.symbol_id {
			Some(id) => self.ids.contains(id),
			None => self.names.contains(&hit.name),
		}
	}
}

/// One rename as seen by the detector.
#[derive(Debug, Clone, Copy)]
pub struct ConflictQuery<'a> {
	pub old_name: &'a str,
	pub new_name: &'a str,
	pub occurrences: &'a [SymbolOccurrence],
	pub renamed_away: &'a RenamedAway,
}

pub struct ConflictDetector {
	reserved: FxHashSet<String>,
	large_rename_threshold: usize,
}

impl ConflictDetector {
	pub fn new(config: &RefactorConfig) -> Self {
		Self {
			reserved: config.reserved_keywords.iter().cloned().collect(),
			large_rename_threshold: config.large_rename_threshold,
		}
	}

	/// Whether `name` is in the configured keyword list.
	pub fn is_reserved(&self, name: &str) -> bool {
		self.reserved.contains(name)
	}

	/// Checks the configured list, then the port's keyword list when it has one.
	///
	/// A failing keyword query is logged and the configured list stands.
	pub async fn is_reserved_with(&self, name: &str, semantic: Option<&dyn SemanticPort>) -> bool {
		if self.is_reserved(name) {
			return true;
		}
		let Some(port) = semantic.filter(|p| p.capabilities().contains(SemanticCapabilities::RESERVED_KEYWORDS)) else {
			return false;
		};
		match port.reserved_keywords().await {
			Ok(keywords) => keywords.iter().any(|k| k == name),
			Err(error) => {
				warn!(%error, "conflicts.reserved_keywords.failed");
				false
			}
		}
	}

	/// Structural and semantic conflicts for renaming `old_name` to `new_name`.
	///
	/// Returns a single `invalid_identifier` or `reserved` record when the
	/// target fails those checks; otherwise one `shadow` record per distinct
	/// scope in which the target already resolves to another symbol.
	pub async fn detect_rename_conflicts(
		&self,
		query: &ConflictQuery<'_>,
		semantic: Option<&dyn SemanticPort>,
	) -> Vec<ConflictRecord> {
		if let Some(record) = self.syntax_conflict(query.new_name) {
			return vec![record];
		}
		if self.is_reserved_with(query.new_name, semantic).await {
			return vec![reserved_conflict(query.new_name)];
		}

		let Some(port) = semantic.filter(|p| p.capabilities().contains(SemanticCapabilities::LOOKUP)) else {
			trace!(new_name = query.new_name, "conflicts.shadow.skipped");
			return Vec::new();
		};

		let mut conflicts = Vec::new();
		for (scope, path) in distinct_scopes(query.occurrences) {
			match port.lookup(query.new_name, scope.as_deref()).await {
				Ok(Some(hit)) if !query.renamed_away.contains_hit(&hit) => {
					conflicts.push(shadow_conflict(query.new_name, scope.as_deref(), path));
				}
				Ok(_) => {}
				Err(error) => {
					warn!(%error, new_name = query.new_name, "conflicts.lookup.failed");
					conflicts.push(
						ConflictRecord::error(
							ConflictKind::AnalysisError,
							format!("Could not check whether '{}' is already bound: {error}", query.new_name),
						)
						.at(path),
					);
				}
			}
		}
		conflicts
	}

	/// File-level collisions plus the large-rename warning.
	///
	/// For each file the rename touches, any other symbol declared there with
	/// the target name is a `shadow` error scoped to that file.
	pub async fn validate_cross_file_consistency(
		&self,
		symbol_id: &SymbolId,
		query: &ConflictQuery<'_>,
		semantic: Option<&dyn SemanticPort>,
	) -> Vec<ConflictRecord> {
		let mut conflicts = Vec::new();

		if let Some(port) = semantic.filter(|p| p.capabilities().contains(SemanticCapabilities::FILE_SYMBOLS)) {
			let mut files: Vec<&PathBuf> = query.occurrences.iter().map(|o| &o.path).collect();
			files.sort();
			files.dedup();

			let listings = futures::future::join_all(files.iter().map(|path| port.file_symbols(path))).await;
			for (path, listing) in files.into_iter().zip(listings) {
				match listing {
					Ok(symbols) => {
						let clash = symbols.iter().find(|other| {
							other.simple_name() == query.new_name
								&& *other != symbol_id
								&& !query.renamed_away.contains_id(other)
						});
						if let Some(other) = clash {
							conflicts.push(
								ConflictRecord::error(
									ConflictKind::Shadow,
									format!(
										"'{}' is already declared in {} as {other}",
										query.new_name,
										path.display()
									),
								)
								.at(path.clone())
								.suggest([
									format!("Rename {other} first"),
									format!("Choose a name other than '{}'", query.new_name),
								]),
							);
						}
					}
					Err(error) => {
						warn!(%error, path = %path.display(), "conflicts.file_symbols.failed");
						conflicts.push(
							ConflictRecord::error(
								ConflictKind::AnalysisError,
								format!("Could not list symbols in {}: {error}", path.display()),
							)
							.at(path.clone()),
						);
					}
				}
			}
		}

		if query.occurrences.len() > self.large_rename_threshold {
			conflicts.push(
				ConflictRecord::warning(
					ConflictKind::LargeRename,
					format!(
						"Renaming '{}' touches {} occurrences",
						query.old_name,
						query.occurrences.len()
					),
				)
				.suggest([
					"Run the test suite after applying the rename",
					"Commit pending work to version control before applying",
				]),
			);
		}
		conflicts
	}

	fn syntax_conflict(&self, new_name: &str) -> Option<ConflictRecord> {
		let issue = validate_identifier(new_name).err()?;
		Some(
			ConflictRecord::error(
				ConflictKind::InvalidIdentifier,
				format!("'{new_name}' is not a valid identifier: {issue}"),
			)
			.suggest(suggest_identifiers(new_name)),
		)
	}
}

pub(crate) fn reserved_conflict(new_name: &str) -> ConflictRecord {
	ConflictRecord::error(
		ConflictKind::Reserved,
		format!("'{new_name}' is a reserved keyword or built-in constant"),
	)
	.suggest(reserved_alternatives(new_name))
}

fn shadow_conflict(new_name: &str, scope: Option<&str>, path: &Path) -> ConflictRecord {
	let location = match scope {
		Some(scope) => format!("scope '{scope}'"),
		None => "the global scope".to_string(),
	};
	ConflictRecord::error(
		ConflictKind::Shadow,
		format!("'{new_name}' already refers to another symbol in {location}"),
	)
	.at(path)
	.suggest([
		format!("Rename the existing '{new_name}' first"),
		format!("Choose a different target name than '{new_name}'"),
	])
}

/// Each distinct scope among `occurrences`, with the first file it was seen in.
///
/// Unscoped occurrences share one global entry regardless of file.
fn distinct_scopes(occurrences: &[SymbolOccurrence]) -> Vec<(Option<ScopeId>, &PathBuf)> {
	let mut seen: FxHashSet<Option<&ScopeId>> = FxHashSet::default();
	occurrences
		.iter()
		.filter(|o| seen.insert(o.scope.as_ref()))
		.map(|o| (o.scope.clone(), &o.path))
		.collect()
}
