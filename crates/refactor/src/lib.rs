//! Conflict-checked symbol renames for GML projects.
//!
//! [`RenameEngine`] is the entry point. It plans a rename into a
//! [`WorkspaceEdit`](splice_primitives::WorkspaceEdit), rejects it when the new
//! name is invalid, reserved or would shadow another symbol, applies it
//! through an injected [`FilePort`](splice_ports::FilePort), and can report
//! which running code must be reloaded afterwards.
//!
//! The pieces it composes are usable on their own:
//! - [`ConflictDetector`]: identifier, keyword and shadowing checks.
//! - [`CascadeEngine`]: transitive dependents with reload order and cycles.
//! - [`HotReloadSafety`]: per-kind verdicts for live patching.
//! - [`batch_errors`]: duplicate-target and circular-chain checks for batches.

pub mod batch;
pub mod cascade;
pub mod config;
pub mod conflicts;
mod engine;
mod error;
pub mod fs;
mod graph;
mod hot_reload;
pub mod identifier;
pub mod verify;

#[cfg(test)]
mod test_support;

pub use batch::{ParsedRename, RenameRequest, batch_errors};
pub use cascade::{CascadeEngine, CascadeEntry, CascadeMetadata, CascadeResult, ImpactGraph, ImpactNode};
pub use config::{RefactorConfig, ReloadCostModel};
pub use conflicts::{ConflictDetector, ConflictQuery, RenamedAway};
pub use engine::{
	BatchRenameOutcome, BatchValidation, EngineCacheStats, HotReloadReport, ImpactAnalysis, PatchTarget,
	RenameEngine, RenameEngineBuilder, RenameOptions, RenameOutcome, RenamePlan, RenameValidation,
};
pub use error::{RefactorError, Result};
pub use fs::DiskFiles;
pub use graph::find_cycles;
pub use hot_reload::HotReloadSafety;
