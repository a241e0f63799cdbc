//! Pass-throughs to the project-analysis provider.
//!
//! Each method fails with [`RefactorError::ProviderRequired`] when no provider
//! was injected.

use std::path::{Path, PathBuf};

use splice_ports::{
	FeatherRenamePlan, FeatherRenameRequest, FeatherSkipReason, GlobalVarRewriteAssessment, LoopHoistRequest,
	ProjectAnalysisPort,
};
use tracing::trace;

use super::RenameEngine;
use crate::identifier::is_valid_identifier;
use crate::{RefactorError, Result};

impl RenameEngine {
	fn project(&self, operation: &'static str) -> Result<&dyn ProjectAnalysisPort> {
		self.project.as_deref().ok_or(RefactorError::ProviderRequired(operation))
	}

	pub async fn is_identifier_occupied(&self, name: &str) -> Result<bool> {
		Ok(self.project("is_identifier_occupied")?.is_identifier_occupied(name).await?)
	}

	pub async fn identifier_occurrence_files(&self, name: &str) -> Result<Vec<PathBuf>> {
		Ok(self
			.project("identifier_occurrence_files")?
			.identifier_occurrence_files(name)
			.await?)
	}

	/// Plans linter-requested renames, one plan per request in request order.
	///
	/// Replacements that are not identifiers, are reserved or equal the
	/// current name are skipped here; the rest go to the provider.
	pub async fn plan_feather_renames(&self, requests: &[FeatherRenameRequest]) -> Result<Vec<FeatherRenamePlan>> {
		let project = self.project("plan_feather_renames")?;

		let mut plans: Vec<Option<FeatherRenamePlan>> = Vec::with_capacity(requests.len());
		let mut forwarded = Vec::new();
		for request in requests {
			let skip = if !is_valid_identifier(&request.preferred_replacement) {
				Some(FeatherSkipReason::InvalidIdentifier)
			} else if self.detector.is_reserved(&request.preferred_replacement) {
				Some(FeatherSkipReason::Reserved)
			} else if request.preferred_replacement == request.identifier_name {
				Some(FeatherSkipReason::Unchanged)
			} else {
				None
			};
			match skip {
				Some(reason) => plans.push(Some(FeatherRenamePlan {
					identifier_name: request.identifier_name.clone(),
					replacement: None,
					skip_reason: Some(reason),
				})),
				None => {
					plans.push(None);
					forwarded.push(request.clone());
				}
			}
		}
		trace!(
			requested = requests.len(),
			forwarded = forwarded.len(),
			"rename.feather.screened"
		);

		let provided = if forwarded.is_empty() {
			Vec::new()
		} else {
			project.plan_feather_renames(&forwarded).await?
		};
		let mut provided = provided.into_iter();
		Ok(plans
			.into_iter()
			.zip(requests)
			.map(|(screened, request)| {
				screened.or_else(|| provided.next()).unwrap_or_else(|| FeatherRenamePlan {
					identifier_name: request.identifier_name.clone(),
					replacement: None,
					skip_reason: Some(FeatherSkipReason::Other("provider returned no plan".to_string())),
				})
			})
			.collect())
	}

	pub async fn assess_global_var_rewrite(
		&self,
		path: Option<&Path>,
		has_initializer: bool,
	) -> Result<GlobalVarRewriteAssessment> {
		Ok(self
			.project("assess_global_var_rewrite")?
			.assess_global_var_rewrite(path, has_initializer)
			.await?)
	}

	pub async fn resolve_loop_hoist_identifier(&self, request: &LoopHoistRequest) -> Result<Option<String>> {
		Ok(self
			.project("resolve_loop_hoist_identifier")?
			.resolve_loop_hoist_identifier(request)
			.await?)
	}
}
