use std::collections::BTreeMap;
use std::path::PathBuf;

use splice_ports::{FilePort, ScriptPatch, TranspileRequest};
use splice_primitives::{WorkspaceEdit, apply_edits};
use tracing::{debug, trace, warn};

use super::{PatchTarget, RenameEngine};
use crate::{RefactorError, Result};

impl RenameEngine {
	fn file_port(&self, operation: &'static str) -> Result<&dyn FilePort> {
		self.files.as_deref().ok_or(RefactorError::ProviderRequired(operation))
	}

	/// Applies `edit` and returns the new content of every file it touches.
	///
	/// The edit set is validated first; an invalid set is rejected before any
	/// file is read. With `dry_run` nothing is written.
	pub async fn apply_workspace_edit(&self, edit: &WorkspaceEdit, dry_run: bool) -> Result<BTreeMap<PathBuf, String>> {
		let report = edit.validate(self.config.large_edit_threshold);
		if !report.is_valid() {
			return Err(RefactorError::invalid_input("workspace_edit", report.errors.join("; ")));
		}
		let files = self.render_workspace_edit(edit).await?;
		if !dry_run {
			self.write_files(&files).await?;
		}
		Ok(files)
	}

	/// Reads every touched file and splices its edits in, writing nothing.
	pub(super) async fn render_workspace_edit(&self, edit: &WorkspaceEdit) -> Result<BTreeMap<PathBuf, String>> {
		let port = self.file_port("apply_workspace_edit")?;
		let mut rendered = BTreeMap::new();
		for (path, edits) in edit.group_by_file() {
			let original = port.read_file(&path).await?;
			let updated = apply_edits(&original, &edits).map_err(|source| RefactorError::Apply {
				path: path.display().to_string(),
				source,
			})?;
			trace!(path = %path.display(), edits = edits.len(), "rename.file.rendered");
			rendered.insert(path, updated);
		}
		Ok(rendered)
	}

	/// Writes files one at a time, invalidating cached queries for each.
	///
	/// The first failure stops the loop; files already written stay written.
	pub(super) async fn write_files(&self, files: &BTreeMap<PathBuf, String>) -> Result<()> {
		let port = self.file_port("apply_workspace_edit")?;
		for (path, text) in files {
			port.write_file(path, text).await?;
			if let Some(queries) = &self.queries {
				queries.invalidate_file(path);
			}
		}
		self.validations.clear();
		debug!(files = files.len(), "rename.files.written");
		Ok(())
	}

	/// Hot-reload patches for `targets`.
	///
	/// Source comes from `sources` when it has the path, otherwise from the
	/// file port. A target that cannot be read or transpiled is logged and
	/// left out.
	pub async fn generate_transpiler_patches(
		&self,
		targets: &[PatchTarget],
		sources: &BTreeMap<PathBuf, String>,
	) -> Result<Vec<ScriptPatch>> {
		let transpiler = self
			.transpiler
			.as_deref()
			.ok_or(RefactorError::ProviderRequired("generate_transpiler_patches"))?;

		let mut patches = Vec::with_capacity(targets.len());
		for target in targets {
			let read;
			let source_text = match sources.get(&target.path) {
				Some(text) => text.as_str(),
				None => {
					let Some(port) = self.files.as_deref() else {
						warn!(symbol = %target.symbol_id, path = %target.path.display(), "rename.patch.no_source");
						continue;
					};
					match port.read_file(&target.path).await {
						Ok(text) => {
							read = text;
							read.as_str()
						}
						Err(error) => {
							warn!(%error, symbol = %target.symbol_id, "rename.patch.read_failed");
							continue;
						}
					}
				}
			};

			let request = TranspileRequest {
				symbol_id: &target.symbol_id,
				source_text,
			};
			match transpiler.transpile_script(request).await {
				Ok(body) => patches.push(ScriptPatch {
					symbol_id: target.symbol_id.clone(),
					source_path: target.path.clone(),
					body,
				}),
				Err(error) => warn!(%error, symbol = %target.symbol_id, "rename.patch.transpile_failed"),
			}
		}
		debug!(requested = targets.len(), generated = patches.len(), "rename.patches.generated");
		Ok(patches)
	}
}
