use std::path::PathBuf;

use splice_primitives::{ValidationReport, WorkspaceEdit};
use tracing::{debug, info};

use super::{BatchRenameOutcome, BatchValidation, RenameEngine, RenameOptions, RenamePlan};
use crate::batch::{ParsedRename, RenameRequest, batch_errors};
use crate::conflicts::RenamedAway;
use crate::{RefactorError, Result};

/// Per-request plans and the merged edit set of a batch.
struct BatchPlan {
	validation: BatchValidation,
	plans: Vec<RenamePlan>,
	workspace_edit: WorkspaceEdit,
}

impl BatchPlan {
	fn rejected(errors: Vec<String>) -> Self {
		Self {
			validation: BatchValidation {
				valid: false,
				errors,
				..BatchValidation::default()
			},
			plans: Vec::new(),
			workspace_edit: WorkspaceEdit::new(),
		}
	}
}

impl RenameEngine {
	/// Validates a batch as a unit.
	///
	/// Malformed requests, a symbol requested twice, duplicate targets and
	/// circular chains are reported before any port is consulted. Then every
	/// request is analyzed with the whole batch renamed away, and the merged
	/// edit set is checked for overlaps between requests.
	pub async fn validate_batch_rename(&self, requests: &[RenameRequest]) -> BatchValidation {
		let mut errors = Vec::new();
		let mut renames = Vec::with_capacity(requests.len());
		for (index, request) in requests.iter().enumerate() {
			match request.parse() {
				Ok(rename) => renames.push(rename),
				Err(error) => errors.push(format!("Request {index} ({}): {error}", request.symbol_id)),
			}
		}
		if requests.is_empty() {
			errors.push("No renames requested".to_string());
		}
		if !errors.is_empty() {
			return BatchValidation {
				valid: false,
				errors,
				..BatchValidation::default()
			};
		}
		self.plan_batch(&renames).await.validation
	}

	/// Plans, validates and applies a batch.
	///
	/// Nothing is read unless the whole batch validates, and nothing is
	/// written unless the merged edit set does. Files are written one at a
	/// time; a write failure is raised with earlier files already written.
	pub async fn execute_batch_rename(
		&self,
		requests: &[RenameRequest],
		options: RenameOptions,
	) -> Result<BatchRenameOutcome> {
		let renames = requests.iter().map(RenameRequest::parse).collect::<Result<Vec<_>>>()?;
		if renames.is_empty() {
			return Err(RefactorError::invalid_input("requests", "must contain at least one rename"));
		}

		let batch = self.plan_batch(&renames).await;
		if !batch.validation.valid {
			info!(
				renames = renames.len(),
				errors = batch.validation.errors.len(),
				"rename.batch.rejected"
			);
			return Ok(BatchRenameOutcome {
				validation: batch.validation,
				plans: batch.plans,
				workspace_edit: batch.workspace_edit,
				applied: false,
				files: Default::default(),
				hot_reload: None,
				integrity: None,
			});
		}

		let files = self.render_workspace_edit(&batch.workspace_edit).await?;
		let hot_reload = if options.validate_hot_reload {
			Some(self.hot_reload_report(&batch.plans, &files).await)
		} else {
			None
		};
		if !options.dry_run {
			self.write_files(&files).await?;
		}

		let integrity = if options.verify_integrity {
			let (contents, mut report) = if options.dry_run {
				(files.clone(), ValidationReport::new())
			} else {
				let paths: Vec<PathBuf> = files.keys().cloned().collect();
				self.read_back(&paths).await?
			};
			let away = renamed_away(&renames);
			let targets: Vec<&str> = renames.iter().map(|r| r.new_name.as_str()).collect();
			for rename in &renames {
				report.merge(self.verify_contents(rename, &contents, &away, &targets).await);
			}
			Some(report)
		} else {
			None
		};

		info!(
			renames = renames.len(),
			files = files.len(),
			dry_run = options.dry_run,
			"rename.batch.completed"
		);
		Ok(BatchRenameOutcome {
			validation: batch.validation,
			plans: batch.plans,
			workspace_edit: batch.workspace_edit,
			applied: !options.dry_run,
			files,
			hot_reload,
			integrity,
		})
	}

	async fn plan_batch(&self, renames: &[ParsedRename]) -> BatchPlan {
		let errors = batch_errors(renames);
		if !errors.is_empty() {
			return BatchPlan::rejected(errors);
		}

		let away = renamed_away(renames);
		let analyses = futures::future::join_all(renames.iter().map(|rename| self.analyze(rename, &away))).await;
		let plans: Vec<RenamePlan> = renames
			.iter()
			.zip(analyses)
			.map(|(rename, analysis)| self.plan_from(rename, analysis))
			.collect();

		let mut validation = BatchValidation::default();
		let mut workspace_edit = WorkspaceEdit::new();
		for plan in &plans {
			let symbol = &plan.symbol_id;
			validation
				.errors
				.extend(plan.errors.iter().map(|e| format!("{symbol}: {e}")));
			validation
				.warnings
				.extend(plan.warnings.iter().map(|w| format!("{symbol}: {w}")));
			validation.conflicts.extend(plan.conflicts.iter().cloned());
			workspace_edit.merge(plan.workspace_edit.clone());
		}

		if validation.errors.is_empty() {
			let merged = workspace_edit.validate(self.config.large_edit_threshold);
			validation.errors.extend(merged.errors);
			validation.warnings.extend(merged.warnings);
		}
		validation.valid = validation.errors.is_empty();
		debug!(
			renames = renames.len(),
			edits = workspace_edit.len(),
			valid = validation.valid,
			"rename.batch.planned"
		);
		BatchPlan {
			validation,
			plans,
			workspace_edit,
		}
	}
}

fn renamed_away(renames: &[ParsedRename]) -> RenamedAway {
	let mut away = RenamedAway::default();
	for rename in renames {
		away.insert(&rename.symbol_id);
	}
	away
}
