//! File, parser and transpiler ports.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use splice_primitives::SymbolId;

use crate::PortResult;

/// Asynchronous access to project files.
#[async_trait]
pub trait FilePort: Send + Sync {
	async fn read_file(&self, path: &Path) -> PortResult<String>;
	async fn write_file(&self, path: &Path, contents: &str) -> PortResult<()>;
}

/// Parses a file to confirm it is still syntactically valid.
#[async_trait]
pub trait ParserPort: Send + Sync {
	async fn parse(&self, path: &Path, source: &str) -> PortResult<()>;
}

/// Input to [`TranspilerPort::transpile_script`].
#[derive(Debug, Clone, Copy)]
pub struct TranspileRequest<'a> {
	pub symbol_id: &'a SymbolId,
	pub source_text: &'a str,
}

/// An executable patch the live runtime can swap in without restarting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptPatch {
	pub symbol_id: SymbolId,
	pub source_path: PathBuf,
	pub body: String,
}

/// Turns script source into a hot-reload patch body.
#[async_trait]
pub trait TranspilerPort: Send + Sync {
	async fn transpile_script(&self, request: TranspileRequest<'_>) -> PortResult<String>;
}
