//! Structured symbol identifiers.
//!
//! A symbol id has the shape `namespace/kind/name`, where `name` may carry a
//! scoped member as `name::member`. The kind segment is a closed set; any
//! other value is a data error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of symbol kinds the refactoring engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
	/// A script (free function or constructor).
	Script,
	/// A global or instance variable.
	Var,
	/// An object event handler.
	Event,
	/// A compile-time macro.
	Macro,
	/// An enum or one of its members.
	Enum,
}

impl SymbolKind {
	/// All kinds, in declaration order.
	pub const ALL: [SymbolKind; 5] = [Self::Script, Self::Var, Self::Event, Self::Macro, Self::Enum];

	/// Returns the id segment for this kind.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Script => "script",
			Self::Var => "var",
			Self::Event => "event",
			Self::Macro => "macro",
			Self::Enum => "enum",
		}
	}

	/// Whether references to this kind are inlined into dependents at compile time.
	///
	/// Renaming such a symbol forces every dependent script to be recompiled.
	pub const fn is_compile_time(self) -> bool {
		matches!(self, Self::Macro | Self::Enum)
	}
}

impl fmt::Display for SymbolKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for SymbolKind {
	type Err = SymbolIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|kind| kind.as_str() == s)
			.ok_or_else(|| SymbolIdError::UnknownKind(s.to_string()))
	}
}

/// Reasons a symbol id string fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolIdError {
	#[error("symbol id is empty")]
	Empty,
	#[error("symbol id '{0}' must have the form namespace/kind/name")]
	Shape(String),
	#[error("symbol id '{id}' has an empty {segment} segment")]
	EmptySegment { id: String, segment: &'static str },
	#[error("unknown symbol kind '{0}' (expected script, var, event, macro or enum)")]
	UnknownKind(String),
}

/// A parsed, immutable symbol identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId {
	raw: String,
	kind: SymbolKind,
	namespace_len: usize,
	name_start: usize,
	member_start: Option<usize>,
}

impl SymbolId {
	/// Parses a `namespace/kind/name[::member]` string.
	pub fn parse(raw: &str) -> Result<Self, SymbolIdError> {
		if raw.trim().is_empty() {
			return Err(SymbolIdError::Empty);
		}

		let mut parts = raw.splitn(3, '/');
		let (Some(namespace), Some(kind), Some(name)) = (parts.next(), parts.next(), parts.next()) else {
			return Err(SymbolIdError::Shape(raw.to_string()));
		};
		let empty = |segment| SymbolIdError::EmptySegment {
			id: raw.to_string(),
			segment,
		};
		if namespace.is_empty() {
			return Err(empty("namespace"));
		}
		if name.is_empty() {
			return Err(empty("name"));
		}
		if name.contains('/') {
			return Err(SymbolIdError::Shape(raw.to_string()));
		}
		let kind = kind.parse::<SymbolKind>()?;

		let name_start = namespace.len() + 1 + kind.as_str().len() + 1;
		let member_start = match name.split_once("::") {
			Some(("", _)) => return Err(empty("name")),
			Some((_, "")) => return Err(empty("member")),
			Some((head, _)) => Some(name_start + head.len() + 2),
			None => None,
		};

		Ok(Self {
			raw: raw.to_string(),
			kind,
			namespace_len: namespace.len(),
			name_start,
			member_start,
		})
	}

	/// The id exactly as it was supplied.
	pub fn as_str(&self) -> &str {
		&self.raw
	}

	pub fn namespace(&self) -> &str {
		&self.raw[..self.namespace_len]
	}

	pub const fn kind(&self) -> SymbolKind {
		self.kind
	}

	/// The `name` segment, excluding any `::member` suffix.
	pub fn name(&self) -> &str {
		match self.member_start {
			Some(member) => &self.raw[self.name_start..member - 2],
			None => &self.raw[self.name_start..],
		}
	}

	/// The scoped member, if the id names one.
	pub fn member(&self) -> Option<&str> {
		self.member_start.map(|start| &self.raw[start..])
	}

	/// The identifier that appears in source text: the member if present, else the name.
	pub fn simple_name(&self) -> &str {
		self.member().unwrap_or_else(|| self.name())
	}

	/// Returns the id this symbol would have after renaming its simple name.
	pub fn with_simple_name(&self, new_name: &str) -> Self {
		let raw = match self.member_start {
			Some(start) => format!("{}{}", &self.raw[..start], new_name),
			None => format!("{}{}", &self.raw[..self.name_start], new_name),
		};
		Self {
			raw,
			..self.clone()
		}
	}
}

impl fmt::Display for SymbolId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.raw)
	}
}

impl FromStr for SymbolId {
	type Err = SymbolIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl Serialize for SymbolId {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.raw)
	}
}

impl<'de> Deserialize<'de> for SymbolId {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = String::deserialize(deserializer)?;
		Self::parse(&raw).map_err(serde::de::Error::custom)
	}
}
