use serde::Serialize;

/// Outcome of a validation pass: blocking errors plus advisory warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
	pub errors: Vec<String>,
	pub warnings: Vec<String>,
}

impl ValidationReport {
	pub fn new() -> Self {
		Self::default()
	}

	/// A report is valid when it carries no errors; warnings never block.
	pub fn is_valid(&self) -> bool {
		self.errors.is_empty()
	}

	pub fn error(&mut self, message: impl Into<String>) {
		self.errors.push(message.into());
	}

	pub fn warn(&mut self, message: impl Into<String>) {
		self.warnings.push(message.into());
	}

	/// Appends another report's findings to this one.
	pub fn merge(&mut self, other: ValidationReport) {
		self.errors.extend(other.errors);
		self.warnings.extend(other.warnings);
	}
}
