use std::collections::BTreeMap;
use std::path::PathBuf;

use splice_ports::SemanticCapabilities;
use splice_primitives::ValidationReport;
use tracing::{debug, warn};

use super::RenameEngine;
use crate::batch::{ParsedRename, RenameRequest};
use crate::conflicts::RenamedAway;
use crate::verify::FileScan;
use crate::{RefactorError, Result};

impl RenameEngine {
	/// Re-reads `files` after a rename and checks that it took.
	///
	/// Errors: the old name left in live code, the new name reserved, a file
	/// that no longer parses or cannot be read. Warnings: the old name left in
	/// comments or strings, the new name absent, the new name colliding with
	/// another symbol.
	pub async fn verify_post_edit_integrity(
		&self,
		request: &RenameRequest,
		files: &[PathBuf],
	) -> Result<ValidationReport> {
		let rename = request.parse()?;
		let (contents, mut report) = self.read_back(files).await?;
		report.merge(
			self.verify_contents(&rename, &contents, &RenamedAway::single(&rename.symbol_id), &[])
				.await,
		);
		Ok(report)
	}

	/// Current content of `files`. Unreadable files are reported as errors.
	pub(super) async fn read_back(&self, files: &[PathBuf]) -> Result<(BTreeMap<PathBuf, String>, ValidationReport)> {
		let port = self
			.files
			.as_deref()
			.ok_or(RefactorError::ProviderRequired("verify_post_edit_integrity"))?;
		let mut contents = BTreeMap::new();
		let mut report = ValidationReport::new();
		for path in files {
			match port.read_file(path).await {
				Ok(text) => {
					contents.insert(path.clone(), text);
				}
				Err(error) => report.error(format!("Could not read {} for verification: {error}", path.display())),
			}
		}
		Ok((contents, report))
	}

	/// The checks behind [`Self::verify_post_edit_integrity`] over in-memory contents.
	///
	/// `retargeted` lists names another rename in the same batch now uses, so
	/// their presence in code is expected rather than a leftover.
	pub(super) async fn verify_contents(
		&self,
		rename: &ParsedRename,
		contents: &BTreeMap<PathBuf, String>,
		away: &RenamedAway,
		retargeted: &[&str],
	) -> ValidationReport {
		let mut report = ValidationReport::new();
		let semantic = self.semantic();

		let check_leftovers = !retargeted.contains(&rename.old_name.as_str());
		let mut new_in_code = 0;
		for (path, text) in contents {
			let scan = FileScan::new(text, &rename.old_name, &rename.new_name);
			if check_leftovers {
				scan.record(path, &rename.old_name, &mut report);
			}
			new_in_code += scan.new_in_code;
		}
		if new_in_code == 0 {
			report.warn(format!("'{}' does not appear in code in any edited file", rename.new_name));
		}

		if self.detector.is_reserved_with(&rename.new_name, semantic).await {
			report.error(format!("'{}' is a reserved keyword", rename.new_name));
		}

		if let Some(port) = self.semantic_with(SemanticCapabilities::LOOKUP) {
			let renamed = rename.renamed_id();
			match port.lookup(&rename.new_name, None).await {
				Ok(Some(hit)) => {
					if let Some(other) = hit
						.symbol_id
						.filter(|other| *other != renamed && !away.contains_id(other))
					{
						report.warn(format!("'{}' may collide with existing symbol {other}", rename.new_name));
					}
				}
				Ok(None) => {}
				Err(error) => {
					warn!(%error, new_name = %rename.new_name, "rename.verify.lookup_failed");
					report.warn(format!("Could not check '{}' for collisions: {error}", rename.new_name));
				}
			}
		}

		if let Some(parser) = self.parser.as_deref() {
			for (path, text) in contents {
				if let Err(error) = parser.parse(path, text).await {
					report.error(format!("{} no longer parses: {error}", path.display()));
				}
			}
		}

		debug!(
			symbol = %rename.symbol_id,
			files = contents.len(),
			errors = report.errors.len(),
			warnings = report.warnings.len(),
			"rename.verified"
		);
		report
	}
}
