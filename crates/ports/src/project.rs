//! Project-wide analysis provider, used by linter integrations.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::PortResult;

/// A rename the linter would like to perform on a flagged identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatherRenameRequest {
	pub identifier_name: String,
	pub preferred_replacement: String,
}

/// Why a requested linter rename was not planned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatherSkipReason {
	InvalidIdentifier,
	Reserved,
	Occupied,
	Unchanged,
	Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatherRenamePlan {
	pub identifier_name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub replacement: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub skip_reason: Option<FeatherSkipReason>,
}

impl FeatherRenamePlan {
	pub fn is_planned(&self) -> bool {
		self.replacement.is_some() && self.skip_reason.is_none()
	}
}

/// Whether a `globalvar` declaration can be rewritten to `global.` access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalVarRewriteAssessment {
	pub allow_rewrite: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopHoistRequest {
	pub preferred_name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub path: Option<PathBuf>,
	#[serde(default)]
	pub local_names: Vec<String>,
}

#[async_trait]
pub trait ProjectAnalysisPort: Send + Sync {
	async fn is_identifier_occupied(&self, name: &str) -> PortResult<bool>;

	async fn identifier_occurrence_files(&self, name: &str) -> PortResult<Vec<PathBuf>>;

	async fn plan_feather_renames(&self, requests: &[FeatherRenameRequest]) -> PortResult<Vec<FeatherRenamePlan>>;

	async fn assess_global_var_rewrite(&self, path: Option<&Path>, has_initializer: bool) -> PortResult<GlobalVarRewriteAssessment>;

	/// Picks a collision-free name for an identifier hoisted out of a loop.
	async fn resolve_loop_hoist_identifier(&self, request: &LoopHoistRequest) -> PortResult<Option<String>>;
}
