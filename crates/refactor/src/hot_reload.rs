//! Hot-reload verdicts for a rename.

use serde::Serialize;
use splice_primitives::{SymbolId, SymbolKind};

/// Whether a rename can be patched into a running program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HotReloadSafety {
	pub safe: bool,
	pub reason: String,
	pub requires_restart: bool,
	pub can_auto_fix: bool,
	pub suggestions: Vec<String>,
}

impl HotReloadSafety {
	/// The verdict when safety cannot be established.
	pub fn fail_closed(reason: impl Into<String>) -> Self {
		Self {
			safe: false,
			reason: reason.into(),
			requires_restart: true,
			can_auto_fix: false,
			suggestions: vec!["Restart the running program after applying the rename".to_string()],
		}
	}

	/// The new name would shadow another symbol; renaming that symbol first fixes it.
	pub fn shadowed(new_name: &str) -> Self {
		Self {
			safe: false,
			reason: format!("'{new_name}' would shadow an existing symbol"),
			requires_restart: false,
			can_auto_fix: true,
			suggestions: vec![
				format!("Rename the existing '{new_name}' first"),
				"Choose a target name that is not already bound".to_string(),
			],
		}
	}

	/// The verdict for a conflict-free rename of `id`.
	pub fn for_symbol(id: &SymbolId) -> Self {
		match id.kind() {
			SymbolKind::Script => Self::safe(
				"Script renames can be hot-reloaded",
				["Dependent scripts are re-patched with the new name"],
			),
			SymbolKind::Var if id.member().is_some() => Self::safe(
				"Instance variable renames can be hot-reloaded",
				["Accesses through other instances must use the qualified name"],
			),
			SymbolKind::Var => Self::safe(
				"Global variable renames can be hot-reloaded",
				["Persisted save-state keys are unaffected by the rename"],
			),
			SymbolKind::Event => Self::safe(
				"Event handler renames can be hot-reloaded",
				["The object's event table is re-registered on reload"],
			),
			SymbolKind::Macro | SymbolKind::Enum => Self {
				safe: false,
				reason: format!(
					"{} values are inlined at compile time; every dependent script must be recompiled",
					if id.kind() == SymbolKind::Macro { "Macro" } else { "Enum" }
				),
				requires_restart: false,
				can_auto_fix: true,
				suggestions: vec!["Recompile dependent scripts instead of restarting".to_string()],
			},
		}
	}

	fn safe<const N: usize>(reason: &str, suggestions: [&str; N]) -> Self {
		Self {
			safe: true,
			reason: reason.to_string(),
			requires_restart: false,
			can_auto_fix: true,
			suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn verdict(raw: &str) -> HotReloadSafety {
		HotReloadSafety::for_symbol(&SymbolId::parse(raw).unwrap())
	}

	#[test]
	fn compile_time_kinds_need_recompilation_not_restart() {
		for raw in ["gml/macro/MAX_HP", "gml/enum/Color", "gml/enum/Color::Red"] {
			let v = verdict(raw);
			assert!(!v.safe && !v.requires_restart && v.can_auto_fix, "{raw}");
		}
	}

	#[test]
	fn runtime_kinds_are_safe() {
		for raw in ["gml/script/scr_move", "gml/var/score", "gml/var/obj_player::hp", "gml/event/obj_player::step"] {
			let v = verdict(raw);
			assert!(v.safe && !v.requires_restart, "{raw}");
		}
		assert!(verdict("gml/var/obj_player::hp").reason.starts_with("Instance"));
		assert!(verdict("gml/var/score").reason.starts_with("Global"));
	}

	#[test]
	fn fail_closed_never_approves() {
		let v = HotReloadSafety::fail_closed("no analyzer");
		assert!(!v.safe && v.requires_restart && !v.can_auto_fix);
	}
}
