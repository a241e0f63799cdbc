use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use splice_cache::CacheStats;
use splice_ports::ScriptPatch;
use splice_primitives::{ConflictRecord, SymbolId, ValidationReport, WorkspaceEdit, has_blocking};

use crate::{CascadeResult, HotReloadSafety};

/// Outcome of validating one rename without planning edits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenameValidation {
	pub valid: bool,
	pub errors: Vec<String>,
	pub warnings: Vec<String>,
	pub conflicts: Vec<ConflictRecord>,
	pub occurrence_count: usize,
}

impl RenameValidation {
	pub(crate) fn from_conflicts(conflicts: Vec<ConflictRecord>, mut warnings: Vec<String>, occurrence_count: usize) -> Self {
		let mut errors = Vec::new();
		for conflict in &conflicts {
			if conflict.is_error() {
				errors.push(conflict.message.clone());
			} else {
				warnings.push(conflict.message.clone());
			}
		}
		Self {
			valid: !has_blocking(&conflicts),
			errors,
			warnings,
			conflicts,
			occurrence_count,
		}
	}

	pub(crate) fn input_error(message: String) -> Self {
		Self {
			valid: false,
			errors: vec![message],
			..Self::default()
		}
	}
}

/// A rename's edits together with everything learned while planning them.
///
/// When `valid` is false the edit set is empty or must not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenamePlan {
	pub symbol_id: SymbolId,
	pub old_name: String,
	pub new_name: String,
	pub valid: bool,
	pub workspace_edit: WorkspaceEdit,
	pub conflicts: Vec<ConflictRecord>,
	pub errors: Vec<String>,
	pub warnings: Vec<String>,
	pub occurrence_count: usize,
	/// File of the symbol's definition occurrence, when the index reported one.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub definition_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenameOptions {
	/// Compute new file contents without writing them.
	pub dry_run: bool,
	/// Run hot-reload classification, the dependency cascade and patch generation.
	pub validate_hot_reload: bool,
	/// Re-read edited files and check them after writing.
	pub verify_integrity: bool,
}

/// Hot-reload results attached to an applied rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HotReloadReport {
	pub safety: HotReloadSafety,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub cascade: Option<CascadeResult>,
	pub patches: Vec<ScriptPatch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameOutcome {
	pub plan: RenamePlan,
	/// True once files were written. Always false for dry runs and invalid plans.
	pub applied: bool,
	/// New content of every edited file, written or not.
	pub files: BTreeMap<PathBuf, String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub hot_reload: Option<HotReloadReport>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub integrity: Option<ValidationReport>,
}

/// Validation of a whole batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchValidation {
	pub valid: bool,
	pub errors: Vec<String>,
	pub warnings: Vec<String>,
	pub conflicts: Vec<ConflictRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchRenameOutcome {
	pub validation: BatchValidation,
	pub plans: Vec<RenamePlan>,
	pub workspace_edit: WorkspaceEdit,
	pub applied: bool,
	pub files: BTreeMap<PathBuf, String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub hot_reload: Option<HotReloadReport>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub integrity: Option<ValidationReport>,
}

/// Summary of what a rename would touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactAnalysis {
	pub symbol_id: SymbolId,
	pub old_name: String,
	pub new_name: String,
	pub valid: bool,
	pub affected_files: Vec<PathBuf>,
	pub total_occurrences: usize,
	pub definitions: usize,
	pub references: usize,
	pub dependents: Vec<SymbolId>,
	pub conflicts: Vec<ConflictRecord>,
	pub warnings: Vec<String>,
}

/// A script whose patch should be regenerated from `path`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PatchTarget {
	pub symbol_id: SymbolId,
	pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineCacheStats {
	pub query: CacheStats,
	pub validation: CacheStats,
}
