//! Engine configuration.
//!
//! Everything here has a documented default, so an empty TOML document is a
//! valid configuration.

use serde::{Deserialize, Serialize};
use splice_cache::CachePolicy;
use splice_primitives::LARGE_EDIT_THRESHOLD;

use crate::{RefactorError, Result};

/// Keywords and built-in constants of the scripting language.
pub const DEFAULT_RESERVED_KEYWORDS: &[&str] = &[
	"all",
	"and",
	"begin",
	"break",
	"case",
	"catch",
	"constructor",
	"continue",
	"default",
	"delete",
	"div",
	"do",
	"else",
	"end",
	"enum",
	"exit",
	"false",
	"finally",
	"for",
	"function",
	"global",
	"globalvar",
	"if",
	"infinity",
	"mod",
	"NaN",
	"new",
	"noone",
	"not",
	"or",
	"other",
	"pi",
	"pointer_invalid",
	"pointer_null",
	"repeat",
	"return",
	"self",
	"static",
	"switch",
	"then",
	"throw",
	"true",
	"try",
	"undefined",
	"until",
	"var",
	"while",
	"with",
	"xor",
];

/// Parameters of the reload-time estimate.
///
/// The estimate is `base_ms + per_symbol_ms * nodes + per_level_ms * depth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReloadCostModel {
	pub base_ms: u64,
	pub per_symbol_ms: u64,
	pub per_level_ms: u64,
}

impl ReloadCostModel {
	pub fn estimate_ms(&self, nodes: usize, depth: usize) -> u64 {
		self.base_ms.max(1) + self.per_symbol_ms.max(1) * nodes as u64 + self.per_level_ms * depth as u64
	}
}

impl Default for ReloadCostModel {
	fn default() -> Self {
		Self {
			base_ms: 5,
			per_symbol_ms: 12,
			per_level_ms: 20,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefactorConfig {
	/// Names a rename may never target.
	pub reserved_keywords: Vec<String>,
	/// Occurrence count above which a rename draws a `large_rename` warning.
	pub large_rename_threshold: usize,
	/// Edit count above which edit validation warns.
	pub large_edit_threshold: usize,
	/// Dependent count above which impact analysis warns.
	pub many_dependents_threshold: usize,
	pub query_cache: CachePolicy,
	pub validation_cache: CachePolicy,
	pub reload_cost: ReloadCostModel,
}

impl Default for RefactorConfig {
	fn default() -> Self {
		Self {
			reserved_keywords: DEFAULT_RESERVED_KEYWORDS.iter().map(|s| s.to_string()).collect(),
			large_rename_threshold: 20,
			large_edit_threshold: LARGE_EDIT_THRESHOLD,
			many_dependents_threshold: 10,
			query_cache: CachePolicy::default(),
			validation_cache: CachePolicy::default(),
			reload_cost: ReloadCostModel::default(),
		}
	}
}

impl RefactorConfig {
	pub fn from_toml_str(source: &str) -> Result<Self> {
		toml::from_str(source).map_err(|e| RefactorError::Config(e.to_string()))
	}
}
