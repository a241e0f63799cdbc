//! The rename orchestrator.
//!
//! A single rename walks a fixed sequence: structural checks, existence,
//! occurrence gathering, conflict detection, edit construction, edit
//! validation, optional hot-reload analysis, application and optional
//! verification. Structural and conflict errors stop the walk before any file
//! is read; edit-validation errors stop it before any file is written.
//!
//! Every collaborator is optional. Semantic queries go through a
//! [`QueryCache`] owned by the engine, so repeated analysis of the same
//! project state stays cheap.

mod apply;
mod batch;
mod hot_reload;
mod project;
mod types;
mod verify;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use splice_cache::{QueryCache, ValidationCache, ValidationKey};
use splice_ports::{FilePort, ParserPort, ProjectAnalysisPort, SemanticCapabilities, SemanticPort, TranspilerPort};
use splice_primitives::{
	ConflictKind, ConflictRecord, OccurrenceKind, SymbolId, SymbolOccurrence, WorkspaceEdit, has_blocking,
};
use tracing::{debug, info, warn};
pub use types::{
	BatchRenameOutcome, BatchValidation, EngineCacheStats, HotReloadReport, ImpactAnalysis, PatchTarget,
	RenameOptions, RenameOutcome, RenamePlan, RenameValidation,
};

use crate::batch::{ParsedRename, RenameRequest};
use crate::conflicts::{ConflictDetector, ConflictQuery, RenamedAway};
use crate::{CascadeEngine, RefactorConfig, Result};

/// What the analysis phase learned about one rename.
#[derive(Debug, Default)]
struct Analysis {
	occurrences: Vec<SymbolOccurrence>,
	conflicts: Vec<ConflictRecord>,
	warnings: Vec<String>,
}

/// Plans, validates and applies symbol renames against injected collaborators.
pub struct RenameEngine {
	config: RefactorConfig,
	detector: ConflictDetector,
	cascade: CascadeEngine,
	queries: Option<Arc<QueryCache>>,
	files: Option<Arc<dyn FilePort>>,
	parser: Option<Arc<dyn ParserPort>>,
	transpiler: Option<Arc<dyn TranspilerPort>>,
	project: Option<Arc<dyn ProjectAnalysisPort>>,
	validations: ValidationCache<RenameValidation, crate::RefactorError>,
}

/// Collects collaborators for a [`RenameEngine`].
#[derive(Default)]
pub struct RenameEngineBuilder {
	config: RefactorConfig,
	semantic: Option<Arc<dyn SemanticPort>>,
	files: Option<Arc<dyn FilePort>>,
	parser: Option<Arc<dyn ParserPort>>,
	transpiler: Option<Arc<dyn TranspilerPort>>,
	project: Option<Arc<dyn ProjectAnalysisPort>>,
}

impl RenameEngineBuilder {
	pub fn config(mut self, config: RefactorConfig) -> Self {
		self.config = config;
		self
	}

	/// The semantic index. It is wrapped in a [`QueryCache`] on build.
	pub fn semantic(mut self, port: Arc<dyn SemanticPort>) -> Self {
		self.semantic = Some(port);
		self
	}

	pub fn files(mut self, port: Arc<dyn FilePort>) -> Self {
		self.files = Some(port);
		self
	}

	pub fn parser(mut self, port: Arc<dyn ParserPort>) -> Self {
		self.parser = Some(port);
		self
	}

	pub fn transpiler(mut self, port: Arc<dyn TranspilerPort>) -> Self {
		self.transpiler = Some(port);
		self
	}

	pub fn project_analysis(mut self, port: Arc<dyn ProjectAnalysisPort>) -> Self {
		self.project = Some(port);
		self
	}

	pub fn build(self) -> RenameEngine {
		let config = self.config;
		RenameEngine {
			detector: ConflictDetector::new(&config),
			cascade: CascadeEngine::new(config.reload_cost),
			queries: self
				.semantic
				.map(|port| Arc::new(QueryCache::new(port, config.query_cache))),
			files: self.files,
			parser: self.parser,
			transpiler: self.transpiler,
			project: self.project,
			validations: ValidationCache::new(config.validation_cache),
			config,
		}
	}
}

impl RenameEngine {
	pub fn builder() -> RenameEngineBuilder {
		RenameEngineBuilder::default()
	}

	pub fn config(&self) -> &RefactorConfig {
		&self.config
	}

	fn semantic(&self) -> Option<&dyn SemanticPort> {
		self.queries.as_deref().map(|cache| cache as &dyn SemanticPort)
	}

	fn semantic_with(&self, capability: SemanticCapabilities) -> Option<&dyn SemanticPort> {
		self.semantic().filter(|port| port.capabilities().contains(capability))
	}

	/// Whether the rename can go ahead, without planning edits.
	///
	/// Malformed requests come back as an invalid result rather than an error.
	/// Outcomes are cached per `(symbol id, new name)` and concurrent identical
	/// requests share one computation.
	pub async fn validate_rename_request(&self, request: &RenameRequest) -> Result<RenameValidation> {
		let rename = match request.parse() {
			Ok(rename) => rename,
			Err(error) => return Ok(RenameValidation::input_error(error.to_string())),
		};
		let key = ValidationKey::new(rename.symbol_id.as_str(), &rename.new_name);
		// Outcomes built on a failed port read are not stored.
		self.validations
			.get_or_compute_if(
				key,
				|| async {
					let analysis = self.analyze(&rename, &RenamedAway::single(&rename.symbol_id)).await;
					Ok(RenameValidation::from_conflicts(
						analysis.conflicts,
						analysis.warnings,
						analysis.occurrences.len(),
					))
				},
				|validation: &RenameValidation| {
					!validation
						.conflicts
						.iter()
						.any(|c| c.kind == ConflictKind::AnalysisError)
				},
			)
			.await
	}

	/// Builds and validates the edit set for one rename. Reads and writes nothing.
	pub async fn plan_rename(&self, request: &RenameRequest) -> Result<RenamePlan> {
		let rename = request.parse()?;
		Ok(self.plan_parsed(&rename, &RenamedAway::single(&rename.symbol_id)).await)
	}

	/// What renaming would touch: files, occurrence counts and direct dependents.
	pub async fn analyze_rename_impact(&self, request: &RenameRequest) -> Result<ImpactAnalysis> {
		let rename = request.parse()?;
		let mut analysis = self.analyze(&rename, &RenamedAway::single(&rename.symbol_id)).await;

		let mut dependents: Vec<SymbolId> = Vec::new();
		if let Some(port) = self.semantic_with(SemanticCapabilities::DEPENDENTS) {
			match port.dependents(std::slice::from_ref(&rename.symbol_id)).await {
				Ok(found) => {
					dependents = found.into_iter().map(|d| d.symbol_id).collect();
					dependents.sort();
					dependents.dedup();
				}
				Err(error) => {
					warn!(%error, symbol = %rename.symbol_id, "rename.impact.dependents_failed");
					analysis.conflicts.push(ConflictRecord::error(
						ConflictKind::AnalysisError,
						format!("Could not list dependents of {}: {error}", rename.symbol_id),
					));
				}
			}
		}
		if dependents.len() > self.config.many_dependents_threshold {
			analysis.conflicts.push(
				ConflictRecord::warning(
					ConflictKind::ManyDependents,
					format!("{} has {} direct dependents", rename.symbol_id, dependents.len()),
				)
				.suggest(["Review the hot-reload cascade before applying"]),
			);
		}

		let mut affected_files: Vec<PathBuf> = analysis.occurrences.iter().map(|o| o.path.clone()).collect();
		affected_files.sort();
		affected_files.dedup();
		let definitions = analysis
			.occurrences
			.iter()
			.filter(|o| o.kind == Some(OccurrenceKind::Definition))
			.count();

		let mut warnings = analysis.warnings;
		warnings.extend(analysis.conflicts.iter().filter(|c| !c.is_error()).map(|c| c.message.clone()));
		Ok(ImpactAnalysis {
			valid: !has_blocking(&analysis.conflicts),
			total_occurrences: analysis.occurrences.len(),
			references: analysis.occurrences.len() - definitions,
			definitions,
			affected_files,
			dependents,
			conflicts: analysis.conflicts,
			warnings,
			symbol_id: rename.symbol_id,
			old_name: rename.old_name,
			new_name: rename.new_name,
		})
	}

	/// Plans, checks and applies one rename.
	///
	/// An invalid plan is returned unapplied. Write failures are raised; a
	/// failure partway through leaves earlier files written.
	pub async fn rename_symbol(&self, request: &RenameRequest, options: RenameOptions) -> Result<RenameOutcome> {
		let rename = request.parse()?;
		let away = RenamedAway::single(&rename.symbol_id);
		let plan = self.plan_parsed(&rename, &away).await;
		if !plan.valid {
			info!(symbol = %rename.symbol_id, errors = plan.errors.len(), "rename.rejected");
			return Ok(RenameOutcome {
				plan,
				applied: false,
				files: Default::default(),
				hot_reload: None,
				integrity: None,
			});
		}

		let files = self.render_workspace_edit(&plan.workspace_edit).await?;
		let hot_reload = if options.validate_hot_reload {
			Some(self.hot_reload_report(std::slice::from_ref(&plan), &files).await)
		} else {
			None
		};

		if !options.dry_run {
			self.write_files(&files).await?;
		}
		let integrity = if !options.verify_integrity {
			None
		} else if options.dry_run {
			Some(self.verify_contents(&rename, &files, &away, &[]).await)
		} else {
			let paths: Vec<PathBuf> = files.keys().cloned().collect();
			Some(self.verify_post_edit_integrity(request, &paths).await?)
		};

		info!(
			symbol = %rename.symbol_id,
			new_name = %rename.new_name,
			files = files.len(),
			dry_run = options.dry_run,
			"rename.completed"
		);
		Ok(RenameOutcome {
			plan,
			applied: !options.dry_run,
			files,
			hot_reload,
			integrity,
		})
	}

	/// Drops cached state that depends on `path`.
	///
	/// Validation outcomes cannot be traced to files, so all of them go.
	pub fn invalidate_file(&self, path: &Path) {
		if let Some(queries) = &self.queries {
			queries.invalidate_file(path);
		}
		self.validations.clear();
	}

	pub fn invalidate_symbol(&self, id: &SymbolId) {
		if let Some(queries) = &self.queries {
			queries.invalidate_symbol(id);
		}
		self.validations.invalidate_symbol(id.as_str());
	}

	pub fn clear_caches(&self) {
		if let Some(queries) = &self.queries {
			queries.clear();
		}
		self.validations.clear();
	}

	pub fn cache_stats(&self) -> EngineCacheStats {
		EngineCacheStats {
			query: self.queries.as_ref().map(|q| q.stats()).unwrap_or_default(),
			validation: self.validations.stats(),
		}
	}

	/// Existence, occurrences and conflicts for one parsed rename.
	///
	/// Read-side port failures become `analysis_error` records. A missing or
	/// failed existence check stops before occurrences are gathered.
	async fn analyze(&self, rename: &ParsedRename, away: &RenamedAway) -> Analysis {
		let mut analysis = Analysis::default();
		let semantic = self.semantic();

		match self.semantic_with(SemanticCapabilities::HAS_SYMBOL) {
			Some(port) => match port.has_symbol(&rename.symbol_id).await {
				Ok(true) => {}
				Ok(false) => {
					analysis.conflicts.push(ConflictRecord::error(
						ConflictKind::MissingSymbol,
						format!("Symbol {} does not exist", rename.symbol_id),
					));
					return analysis;
				}
				Err(error) => {
					warn!(%error, symbol = %rename.symbol_id, "rename.has_symbol.failed");
					analysis.conflicts.push(ConflictRecord::error(
						ConflictKind::AnalysisError,
						format!("Could not confirm that {} exists: {error}", rename.symbol_id),
					));
					return analysis;
				}
			},
			None => analysis.warnings.push(format!(
				"No semantic analyzer available; assuming {} exists",
				rename.symbol_id
			)),
		}

		match self.semantic_with(SemanticCapabilities::OCCURRENCES) {
			Some(port) => match port.symbol_occurrences(&rename.old_name).await {
				Ok(found) => analysis.occurrences = found,
				Err(error) => {
					warn!(%error, name = %rename.old_name, "rename.occurrences.failed");
					analysis.conflicts.push(ConflictRecord::error(
						ConflictKind::AnalysisError,
						format!("Could not gather occurrences of '{}': {error}", rename.old_name),
					));
					return analysis;
				}
			},
			None => analysis
				.warnings
				.push(format!("Occurrences of '{}' cannot be listed; no edits can be planned", rename.old_name)),
		}

		let query = ConflictQuery {
			old_name: &rename.old_name,
			new_name: &rename.new_name,
			occurrences: &analysis.occurrences,
			renamed_away: away,
		};
		let mut conflicts = self.detector.detect_rename_conflicts(&query, semantic).await;
		if !has_blocking(&conflicts) {
			conflicts.extend(
				self.detector
					.validate_cross_file_consistency(&rename.symbol_id, &query, semantic)
					.await,
			);
		}
		debug!(
			symbol = %rename.symbol_id,
			occurrences = analysis.occurrences.len(),
			conflicts = conflicts.len(),
			"rename.analyzed"
		);
		analysis.conflicts.extend(conflicts);
		analysis
	}

	async fn plan_parsed(&self, rename: &ParsedRename, away: &RenamedAway) -> RenamePlan {
		let analysis = self.analyze(rename, away).await;
		self.plan_from(rename, analysis)
	}

	/// Turns an analysis into a plan, building edits only when nothing blocks.
	fn plan_from(&self, rename: &ParsedRename, analysis: Analysis) -> RenamePlan {
		let mut errors: Vec<String> = Vec::new();
		let mut warnings = analysis.warnings;
		for conflict in &analysis.conflicts {
			if conflict.is_error() {
				errors.push(conflict.message.clone());
			} else {
				warnings.push(conflict.message.clone());
			}
		}

		let mut workspace_edit = WorkspaceEdit::new();
		if errors.is_empty() {
			for occurrence in &analysis.occurrences {
				workspace_edit.add_edit(
					occurrence.path.clone(),
					occurrence.start,
					occurrence.end,
					rename.new_name.clone(),
				);
			}
			let report = workspace_edit.validate(self.config.large_edit_threshold);
			errors.extend(report.errors);
			warnings.extend(report.warnings);
		}

		RenamePlan {
			symbol_id: rename.symbol_id.clone(),
			old_name: rename.old_name.clone(),
			new_name: rename.new_name.clone(),
			valid: errors.is_empty(),
			occurrence_count: analysis.occurrences.len(),
			definition_path: analysis
				.occurrences
				.iter()
				.find(|o| o.is_definition())
				.map(|o| o.path.clone()),
			workspace_edit,
			conflicts: analysis.conflicts,
			errors,
			warnings,
		}
	}
}

#[cfg(test)]
mod tests;
