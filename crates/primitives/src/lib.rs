//! Core data types for symbol renaming: ids, occurrences, edits, and conflicts.

/// Conflict taxonomy and records.
pub mod conflict;
/// Workspace edits: grouping, validation, and application.
pub mod edit;
/// Occurrences reported by the semantic index.
pub mod occurrence;
/// Error/warning reports.
pub mod report;
/// Structured symbol identifiers.
pub mod symbol;

pub use conflict::{ConflictKind, ConflictRecord, Severity, has_blocking};
pub use edit::{EditError, LARGE_EDIT_THRESHOLD, Overlap, TextEdit, WorkspaceEdit, apply_edits};
pub use occurrence::{OccurrenceKind, ScopeId, SymbolOccurrence};
pub use report::ValidationReport;
pub use symbol::{SymbolId, SymbolIdError, SymbolKind};
