//! Post-edit integrity checks over rewritten file contents.

mod scan;

use std::path::Path;

pub use scan::{Region, WordMatch, find_word};
use splice_primitives::ValidationReport;

/// How often the old and new names appear in one rewritten file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileScan {
	pub old_in_code: usize,
	pub old_elsewhere: usize,
	pub new_in_code: usize,
}

impl FileScan {
	pub fn new(text: &str, old_name: &str, new_name: &str) -> Self {
		let mut scan = Self::default();
		for found in find_word(text, old_name) {
			match found.region {
				Region::Code => scan.old_in_code += 1,
				Region::Comment | Region::String => scan.old_elsewhere += 1,
			}
		}
		scan.new_in_code = find_word(text, new_name)
			.iter()
			.filter(|m| m.region == Region::Code)
			.count();
		scan
	}

	/// Adds this file's findings to `report`.
	///
	/// A leftover old name in code means the rename missed a reference; in a
	/// comment or string it only deserves a second look.
	pub fn record(&self, path: &Path, old_name: &str, report: &mut ValidationReport) {
		if self.old_in_code > 0 {
			report.error(format!(
				"'{old_name}' still appears {} time(s) in code in {}",
				self.old_in_code,
				path.display()
			));
		} else if self.old_elsewhere > 0 {
			report.warn(format!(
				"'{old_name}' still appears in comments or strings in {}",
				path.display()
			));
		}
	}
}
