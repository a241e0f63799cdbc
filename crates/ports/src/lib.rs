//! Capability ports the rename engine consumes.
//!
//! Parsing, symbol indexing, transpiling and file I/O all live outside the
//! engine. They are injected as trait objects and awaited at each call site.

mod error;
mod io;
mod project;
mod semantic;

pub use error::{PortError, PortResult};
pub use io::{FilePort, ParserPort, ScriptPatch, TranspileRequest, TranspilerPort};
pub use project::{
	FeatherRenamePlan, FeatherRenameRequest, FeatherSkipReason, GlobalVarRewriteAssessment, LoopHoistRequest,
	ProjectAnalysisPort,
};
pub use semantic::{Dependent, LookupHit, SemanticCapabilities, SemanticPort};
