//! Multi-file text edits.
//!
//! A [`WorkspaceEdit`] is an append-only bag of [`TextEdit`]s. Edits are grouped
//! per file and ordered by descending start offset, so that splicing from the
//! end of a file toward its beginning never invalidates an earlier offset.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::ValidationReport;

/// Edit count above which validation emits a size warning.
pub const LARGE_EDIT_THRESHOLD: usize = 50;

/// A single replacement of `[start, end)` in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
	pub path: PathBuf,
	pub start: usize,
	pub end: usize,
	pub replacement: String,
}

impl TextEdit {
	pub fn range(&self) -> Range<usize> {
		self.start..self.end
	}

	/// Whether two edits in the same file touch a shared span.
	///
	/// Two insertions at the same offset also count, since their relative order
	/// would be ambiguous.
	pub fn overlaps(&self, other: &TextEdit) -> bool {
		if self.start == self.end && other.start == other.end {
			return self.start == other.start;
		}
		self.start < other.end && other.start < self.end
	}
}

/// Two overlapping edits found in the same file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlap {
	pub path: PathBuf,
	pub first: Range<usize>,
	pub second: Range<usize>,
}

impl fmt::Display for Overlap {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"Overlapping edits in {}: [{}, {}) vs [{}, {})",
			self.path.display(),
			self.first.start,
			self.first.end,
			self.second.start,
			self.second.end
		)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
	#[error("edit [{start}, {end}) is reversed")]
	Reversed { start: usize, end: usize },
	#[error("edit [{start}, {end}) exceeds content length {len}")]
	OutOfBounds { start: usize, end: usize, len: usize },
	#[error("edit offset {0} is not on a character boundary")]
	NotCharBoundary(usize),
	#[error("edits are not in descending order or overlap at offset {0}")]
	Unordered(usize),
}

/// A multi-file set of text edits planned for one refactoring request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkspaceEdit {
	edits: Vec<TextEdit>,
}

impl WorkspaceEdit {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_edit(&mut self, path: impl Into<PathBuf>, start: usize, end: usize, replacement: impl Into<String>) {
		self.edits.push(TextEdit {
			path: path.into(),
			start,
			end,
			replacement: replacement.into(),
		});
	}

	pub fn push(&mut self, edit: TextEdit) {
		self.edits.push(edit);
	}

	/// Moves every edit of `other` into this set.
	pub fn merge(&mut self, other: WorkspaceEdit) {
		self.edits.extend(other.edits);
	}

	pub fn len(&self) -> usize {
		self.edits.len()
	}

	pub fn is_empty(&self) -> bool {
		self.edits.is_empty()
	}

	/// Edits in insertion order.
	pub fn edits(&self) -> &[TextEdit] {
		&self.edits
	}

	/// Distinct files touched, in path order.
	pub fn files(&self) -> Vec<&Path> {
		let mut files: Vec<&Path> = self.edits.iter().map(|e| e.path.as_path()).collect();
		files.sort();
		files.dedup();
		files
	}

	/// Groups edits by file, each group sorted by descending start offset.
	///
	/// Ties on start put the wider edit first so that an insertion at the same
	/// offset lands in front of the replaced text.
	pub fn group_by_file(&self) -> BTreeMap<PathBuf, Vec<TextEdit>> {
		let mut grouped: BTreeMap<PathBuf, Vec<TextEdit>> = BTreeMap::new();
		for edit in &self.edits {
			grouped.entry(edit.path.clone()).or_default().push(edit.clone());
		}
		for edits in grouped.values_mut() {
			edits.sort_by_key(|edit| (Reverse(edit.start), Reverse(edit.end)));
		}
		grouped
	}

	/// Every pair of overlapping edits, independent of insertion order.
	pub fn overlaps(&self) -> Vec<Overlap> {
		let mut found = Vec::new();
		for (path, mut edits) in self.group_by_file() {
			edits.reverse();
			for (i, first) in edits.iter().enumerate() {
				for second in &edits[i + 1..] {
					if second.start > first.end {
						break;
					}
					if first.overlaps(second) {
						found.push(Overlap {
							path: path.clone(),
							first: first.range(),
							second: second.range(),
						});
					}
				}
			}
		}
		found
	}

	/// Checks the edit set before application.
	///
	/// Errors: empty set, reversed ranges, overlapping ranges. Warnings: more
	/// than `large_threshold` edits.
	pub fn validate(&self, large_threshold: usize) -> ValidationReport {
		let mut report = ValidationReport::new();
		if self.edits.is_empty() {
			report.error("No changes to apply");
			return report;
		}

		for edit in &self.edits {
			if edit.start > edit.end {
				report.error(format!(
					"Invalid edit range in {}: [{}, {})",
					edit.path.display(),
					edit.start,
					edit.end
				));
			}
		}
		for overlap in self.overlaps() {
			report.error(overlap.to_string());
		}

		if self.edits.len() > large_threshold {
			report.warn(format!(
				"Large number of edits planned ({} edits across {} files)",
				self.edits.len(),
				self.files().len()
			));
		}
		report
	}
}

/// Applies one file's edits to its original content.
///
/// `edits` must be in descending start order, as produced by
/// [`WorkspaceEdit::group_by_file`]. The result is assembled from immutable
/// slices of `source`, walking from the end of the file toward its start.
pub fn apply_edits(source: &str, edits: &[TextEdit]) -> Result<String, EditError> {
	let mut pieces: Vec<&str> = Vec::with_capacity(edits.len() * 2 + 1);
	let mut cursor = source.len();

	for edit in edits {
		if edit.start > edit.end {
			return Err(EditError::Reversed {
				start: edit.start,
				end: edit.end,
			});
		}
		if edit.end > source.len() {
			return Err(EditError::OutOfBounds {
				start: edit.start,
				end: edit.end,
				len: source.len(),
			});
		}
		for offset in [edit.start, edit.end] {
			if !source.is_char_boundary(offset) {
				return Err(EditError::NotCharBoundary(offset));
			}
		}
		if edit.end > cursor {
			return Err(EditError::Unordered(edit.start));
		}

		pieces.push(&source[edit.end..cursor]);
		pieces.push(&edit.replacement);
		cursor = edit.start;
	}
	pieces.push(&source[..cursor]);

	Ok(pieces.into_iter().rev().collect())
}
