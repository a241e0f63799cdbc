//! Lexical classification of identifier matches.
//!
//! Understands line comments, block comments, escaped string literals
//! (`"..."`, `'...'`) and verbatim strings (`@"..."`, `@'...'`). Everything
//! else is code.

/// Where in the source a match sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
	Code,
	Comment,
	String,
}

/// One whole-word match of an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordMatch {
	pub start: usize,
	pub end: usize,
	pub region: Region,
}

fn is_ident_start(b: u8) -> bool {
	b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
	b.is_ascii_alphanumeric() || b == b'_'
}

/// Every whole-word match of `word` in `source`, in source order.
pub fn find_word(source: &str, word: &str) -> Vec<WordMatch> {
	let bytes = source.as_bytes();
	let mut found = Vec::new();
	if word.is_empty() {
		return found;
	}

	let mut region = Region::Code;
	let mut closer: &[u8] = b"";
	let mut escapes = false;
	let mut i = 0;

	while i < bytes.len() {
		let rest = &bytes[i..];
		if region == Region::Code {
			let opened = if rest.starts_with(b"//") {
				Some((Region::Comment, &b"\n"[..], false, 2))
			} else if rest.starts_with(b"/*") {
				Some((Region::Comment, &b"*/"[..], false, 2))
			} else if rest.starts_with(b"@\"") {
				Some((Region::String, &b"\""[..], false, 2))
			} else if rest.starts_with(b"@'") {
				Some((Region::String, &b"'"[..], false, 2))
			} else if rest[0] == b'"' {
				Some((Region::String, &b"\""[..], true, 1))
			} else if rest[0] == b'\'' {
				Some((Region::String, &b"'"[..], true, 1))
			} else {
				None
			};
			if let Some((next, terminator, escaped, width)) = opened {
				region = next;
				closer = terminator;
				escapes = escaped;
				i += width;
				continue;
			}
		} else if escapes && rest[0] == b'\\' {
			i += 2;
			continue;
		} else if rest.starts_with(closer) {
			region = Region::Code;
			i += closer.len();
			continue;
		}

		let b = bytes[i];
		if is_ident_start(b) && (i == 0 || !is_ident_continue(bytes[i - 1])) {
			let start = i;
			let mut end = i + 1;
			while end < bytes.len() && is_ident_continue(bytes[end]) {
				end += 1;
			}
			if &bytes[start..end] == word.as_bytes() {
				found.push(WordMatch { start, end, region });
			}
			i = end;
			continue;
		}
		i += 1;
	}
	found
}
