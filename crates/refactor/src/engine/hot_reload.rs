use std::collections::BTreeMap;
use std::path::PathBuf;

use splice_primitives::{ConflictKind, SymbolId, SymbolKind};
use tracing::{debug, warn};

use super::{HotReloadReport, PatchTarget, RenameEngine, RenamePlan};
use crate::batch::RenameRequest;
use crate::conflicts::RenamedAway;
use crate::{CascadeResult, HotReloadSafety, ImpactGraph, Result};

impl RenameEngine {
	/// Whether the rename can be applied to a running program.
	///
	/// Runs the same checks as conflict detection. Shadowing is unsafe but
	/// fixable; anything that prevents a verdict fails closed.
	pub async fn check_hot_reload_safety(&self, request: &RenameRequest) -> HotReloadSafety {
		let rename = match request.parse() {
			Ok(rename) => rename,
			Err(error) => return HotReloadSafety::fail_closed(error.to_string()),
		};
		if self.semantic().is_none() {
			return HotReloadSafety::fail_closed("No semantic analyzer available to confirm the rename is safe");
		}

		let analysis = self.analyze(&rename, &RenamedAway::single(&rename.symbol_id)).await;
		let mut shadowed = false;
		for conflict in analysis.conflicts.iter().filter(|c| c.is_error()) {
			match conflict.kind {
				ConflictKind::Shadow => shadowed = true,
				ConflictKind::InvalidIdentifier
				| ConflictKind::Reserved
				| ConflictKind::MissingSymbol
				| ConflictKind::AnalysisError
				| ConflictKind::LargeRename
				| ConflictKind::ManyDependents => return HotReloadSafety::fail_closed(conflict.message.clone()),
			}
		}
		if shadowed {
			return HotReloadSafety::shadowed(&rename.new_name);
		}
		HotReloadSafety::for_symbol(&rename.symbol_id)
	}

	/// Everything that must reload after `changed` changes.
	pub async fn compute_hot_reload_cascade(&self, changed: &[SymbolId]) -> Result<CascadeResult> {
		Ok(self.cascade.compute_hot_reload_cascade(self.semantic(), changed).await?)
	}

	pub async fn compute_rename_impact_graph(&self, symbol_id: &SymbolId) -> Result<ImpactGraph> {
		Ok(self.cascade.compute_rename_impact_graph(self.semantic(), symbol_id).await?)
	}

	/// Safety verdict, cascade and patches for validated plans.
	///
	/// Failures here never block the rename: a failed cascade is left out and
	/// patches that cannot be built are skipped.
	pub(super) async fn hot_reload_report(
		&self,
		plans: &[RenamePlan],
		rendered: &BTreeMap<PathBuf, String>,
	) -> HotReloadReport {
		let safety = plans
			.iter()
			.map(|plan| match self.semantic() {
				Some(_) => HotReloadSafety::for_symbol(&plan.symbol_id),
				None => HotReloadSafety::fail_closed("No semantic analyzer available to confirm the rename is safe"),
			})
			.reduce(least_safe)
			.unwrap_or_else(|| HotReloadSafety::fail_closed("Nothing to reload"));

		let changed: Vec<SymbolId> = plans.iter().map(|p| p.symbol_id.clone()).collect();
		let cascade = match self.compute_hot_reload_cascade(&changed).await {
			Ok(cascade) => Some(cascade),
			Err(error) => {
				warn!(%error, changed = changed.len(), "rename.cascade.failed");
				None
			}
		};

		let patches = if self.transpiler.is_some() {
			let targets = patch_targets(plans, cascade.as_ref());
			self.generate_transpiler_patches(&targets, rendered)
				.await
				.unwrap_or_else(|error| {
					warn!(%error, "rename.patches.failed");
					Vec::new()
				})
		} else {
			debug!("rename.patches.no_transpiler");
			Vec::new()
		};

		HotReloadReport {
			safety,
			cascade,
			patches,
		}
	}
}

/// The verdict that asks more of the caller: restart over recompile over nothing.
fn least_safe(a: HotReloadSafety, b: HotReloadSafety) -> HotReloadSafety {
	let rank = |s: &HotReloadSafety| (s.requires_restart, !s.safe);
	if rank(&b) > rank(&a) { b } else { a }
}

/// Code-bearing symbols in the cascade, under their post-rename ids.
fn patch_targets(plans: &[RenamePlan], cascade: Option<&CascadeResult>) -> Vec<PatchTarget> {
	let renamed = |id: &SymbolId| plans.iter().find(|p| p.symbol_id == *id);
	let mut targets: Vec<PatchTarget> = Vec::new();
	let mut push = |symbol_id: SymbolId, path: Option<PathBuf>| {
		let Some(path) = path else {
			return;
		};
		if !matches!(symbol_id.kind(), SymbolKind::Script | SymbolKind::Event) {
			return;
		}
		let target = PatchTarget { symbol_id, path };
		if !targets.contains(&target) {
			targets.push(target);
		}
	};

	match cascade {
		Some(cascade) => {
			for entry in &cascade.cascade {
				match renamed(&entry.symbol_id) {
					Some(plan) => push(
						plan.symbol_id.with_simple_name(&plan.new_name),
						plan.definition_path.clone().or_else(|| entry.path.clone()),
					),
					None => push(entry.symbol_id.clone(), entry.path.clone()),
				}
			}
		}
		None => {
			for plan in plans {
				push(
					plan.symbol_id.with_simple_name(&plan.new_name),
					plan.definition_path.clone(),
				);
			}
		}
	}
	targets
}
