//! Identifier grammar checks.
//!
//! Identifiers start with an ASCII letter or underscore and continue with
//! ASCII letters, digits or underscores.

use std::fmt;

/// Why a string is not a valid identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierIssue {
	Empty,
	SurroundingWhitespace,
	InvalidStart(char),
	InvalidChar(char),
}

impl fmt::Display for IdentifierIssue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Empty => f.write_str("identifier is empty"),
			Self::SurroundingWhitespace => f.write_str("identifier has leading or trailing whitespace"),
			Self::InvalidStart(c) => write!(f, "identifier cannot start with '{c}'"),
			Self::InvalidChar(c) => write!(f, "identifier cannot contain '{c}'"),
		}
	}
}

fn is_start(c: char) -> bool {
	c.is_ascii_alphabetic() || c == '_'
}

fn is_continue(c: char) -> bool {
	c.is_ascii_alphanumeric() || c == '_'
}

pub fn validate_identifier(name: &str) -> Result<(), IdentifierIssue> {
	if name.is_empty() {
		return Err(IdentifierIssue::Empty);
	}
	if name.trim() != name {
		return Err(IdentifierIssue::SurroundingWhitespace);
	}
	let mut chars = name.chars();
	if let Some(first) = chars.next()
		&& !is_start(first)
	{
		return Err(IdentifierIssue::InvalidStart(first));
	}
	match chars.find(|c| !is_continue(*c)) {
		Some(bad) => Err(IdentifierIssue::InvalidChar(bad)),
		None => Ok(()),
	}
}

pub fn is_valid_identifier(name: &str) -> bool {
	validate_identifier(name).is_ok()
}

/// Valid identifiers close to `name`, best first.
///
/// Never empty: when nothing can be salvaged from `name`, a generic fallback
/// is offered.
pub fn suggest_identifiers(name: &str) -> Vec<String> {
	let stripped: String = name.trim().chars().filter(|c| is_continue(*c)).collect();
	let mut suggestions = Vec::new();
	let mut offer = |candidate: String| {
		if is_valid_identifier(&candidate) && candidate != name && !suggestions.contains(&candidate) {
			suggestions.push(candidate);
		}
	};

	if !stripped.is_empty() {
		offer(stripped.clone());
		offer(format!("_{stripped}"));
	}
	let underscored: String = name
		.trim()
		.chars()
		.map(|c| if is_continue(c) { c } else { '_' })
		.collect();
	if !underscored.is_empty() {
		offer(format!("_{underscored}"));
	}
	if suggestions.is_empty() {
		suggestions.push("new_name".to_string());
	}
	suggestions
}

/// Alternatives offered when `word` is reserved: `word_value` and `myWord`.
pub fn reserved_alternatives(word: &str) -> Vec<String> {
	let mut chars = word.chars();
	let capitalized = match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
		None => String::new(),
	};
	vec![format!("{word}_value"), format!("my{capitalized}")]
}
