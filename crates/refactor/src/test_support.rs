//! In-memory project used by the engine tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use splice_ports::{
	Dependent, FilePort, LookupHit, ParserPort, PortError, PortResult, SemanticCapabilities, SemanticPort,
	TranspileRequest, TranspilerPort,
};
use splice_primitives::{OccurrenceKind, SymbolId, SymbolOccurrence};

use crate::verify::{Region, find_word};

pub(crate) fn id(raw: &str) -> SymbolId {
	SymbolId::parse(raw).unwrap()
}

#[derive(Debug, Default)]
pub(crate) struct Calls {
	pub has_symbol: AtomicUsize,
	pub occurrences: AtomicUsize,
	pub file_symbols: AtomicUsize,
	pub dependents: AtomicUsize,
	pub lookup: AtomicUsize,
	pub reads: AtomicUsize,
	pub writes: AtomicUsize,
	pub parses: AtomicUsize,
	pub transpiles: AtomicUsize,
}

pub(crate) fn count(counter: &AtomicUsize) -> usize {
	counter.load(Ordering::SeqCst)
}

#[derive(Default)]
struct ProjectState {
	files: BTreeMap<PathBuf, String>,
	symbols: Vec<(SymbolId, PathBuf)>,
	/// `(dependency, dependent)`
	edges: Vec<(SymbolId, SymbolId)>,
	/// Explicit `(scope, name) -> symbol` bindings consulted before declared symbols.
	bindings: Vec<(Option<String>, String, Option<SymbolId>)>,
	scopes: BTreeMap<PathBuf, String>,
	keywords: Vec<String>,
	failing: FxHashSet<&'static str>,
	anonymous_dependents: bool,
	transpile_failures: FxHashSet<SymbolId>,
}

/// A project held in memory that serves every port.
///
/// Occurrences are found by scanning file text for the name in code regions,
/// so they stay consistent with whatever was last written.
pub(crate) struct InMemoryProject {
	state: Mutex<ProjectState>,
	capabilities: SemanticCapabilities,
	pub calls: Calls,
}

impl InMemoryProject {
	pub fn new() -> Self {
		Self {
			state: Mutex::new(ProjectState::default()),
			capabilities: SemanticCapabilities::all(),
			calls: Calls::default(),
		}
	}

	pub fn file(self, path: &str, text: &str) -> Self {
		self.state.lock().files.insert(path.into(), text.to_string());
		self
	}

	/// Declares `raw` in `path`.
	pub fn symbol(self, raw: &str, path: &str) -> Self {
		self.state.lock().symbols.push((id(raw), path.into()));
		self
	}

	/// `dependent` depends on `dependency`.
	pub fn dependency(self, dependency: &str, dependent: &str) -> Self {
		self.state.lock().edges.push((id(dependency), id(dependent)));
		self
	}

	pub fn bind(self, scope: Option<&str>, name: &str, target: Option<&str>) -> Self {
		self.state
			.lock()
			.bindings
			.push((scope.map(str::to_string), name.to_string(), target.map(id)));
		self
	}

	/// Every occurrence in `path` is reported in `scope`.
	pub fn scoped(self, path: &str, scope: &str) -> Self {
		self.state.lock().scopes.insert(path.into(), scope.to_string());
		self
	}

	pub fn keywords(self, keywords: &[&str]) -> Self {
		self.state.lock().keywords = keywords.iter().map(|k| k.to_string()).collect();
		self
	}

	pub fn without(mut self, capabilities: SemanticCapabilities) -> Self {
		self.capabilities.remove(capabilities);
		self
	}

	/// Makes the named port method fail.
	pub fn failing(self, method: &'static str) -> Self {
		self.state.lock().failing.insert(method);
		self
	}

	/// Undoes [`failing`](Self::failing) on a shared project.
	pub fn recover(&self, method: &str) {
		self.state.lock().failing.remove(method);
	}

	/// Dependents come back without the edge they were reached through.
	pub fn anonymous_dependents(self) -> Self {
		self.state.lock().anonymous_dependents = true;
		self
	}

	pub fn failing_transpile(self, raw: &str) -> Self {
		self.state.lock().transpile_failures.insert(id(raw));
		self
	}

	pub fn text(&self, path: &str) -> Option<String> {
		self.state.lock().files.get(Path::new(path)).cloned()
	}

	fn check(&self, method: &'static str) -> PortResult<()> {
		if self.state.lock().failing.contains(method) {
			return Err(PortError::failed(format!("{method} unavailable")));
		}
		Ok(())
	}
}

#[async_trait]
impl SemanticPort for InMemoryProject {
	fn capabilities(&self) -> SemanticCapabilities {
		self.capabilities
	}

	async fn has_symbol(&self, id: &SymbolId) -> PortResult<bool> {
		self.calls.has_symbol.fetch_add(1, Ordering::SeqCst);
		self.check("has_symbol")?;
		Ok(self.state.lock().symbols.iter().any(|(s, _)| s == id))
	}

	async fn symbol_occurrences(&self, name: &str) -> PortResult<Vec<SymbolOccurrence>> {
		self.calls.occurrences.fetch_add(1, Ordering::SeqCst);
		self.check("symbol_occurrences")?;
		let state = self.state.lock();
		let mut found = Vec::new();
		for (path, text) in &state.files {
			let declares = state
				.symbols
				.iter()
				.any(|(s, p)| p == path && s.simple_name() == name);
			let matches = find_word(text, name).into_iter().filter(|m| m.region == Region::Code);
			for (index, m) in matches.enumerate() {
				let kind = if declares && index == 0 {
					OccurrenceKind::Definition
				} else {
					OccurrenceKind::Reference
				};
				let mut occurrence = SymbolOccurrence::new(path.clone(), m.start, m.end).with_kind(kind);
				if let Some(scope) = state.scopes.get(path) {
					occurrence = occurrence.in_scope(scope.clone());
				}
				found.push(occurrence);
			}
		}
		Ok(found)
	}

	async fn file_symbols(&self, path: &Path) -> PortResult<Vec<SymbolId>> {
		self.calls.file_symbols.fetch_add(1, Ordering::SeqCst);
		self.check("file_symbols")?;
		Ok(self
			.state
			.lock()
			.symbols
			.iter()
			.filter(|(_, p)| p == path)
			.map(|(s, _)| s.clone())
			.collect())
	}

	async fn dependents(&self, ids: &[SymbolId]) -> PortResult<Vec<Dependent>> {
		self.calls.dependents.fetch_add(1, Ordering::SeqCst);
		self.check("dependents")?;
		let state = self.state.lock();
		let path_of = |target: &SymbolId| {
			state
				.symbols
				.iter()
				.find(|(s, _)| s == target)
				.map(|(_, p)| p.clone())
				.unwrap_or_default()
		};
		Ok(state
			.edges
			.iter()
			.filter(|(dependency, _)| ids.contains(dependency))
			.map(|(dependency, dependent)| {
				let found = Dependent::new(dependent.clone(), path_of(dependent));
				if state.anonymous_dependents {
					found
				} else {
					found.via(dependency.clone())
				}
			})
			.collect())
	}

	async fn reserved_keywords(&self) -> PortResult<Vec<String>> {
		self.check("reserved_keywords")?;
		Ok(self.state.lock().keywords.clone())
	}

	async fn lookup(&self, name: &str, scope: Option<&str>) -> PortResult<Option<LookupHit>> {
		self.calls.lookup.fetch_add(1, Ordering::SeqCst);
		self.check("lookup")?;
		let state = self.state.lock();
		if let Some((_, _, target)) = state
			.bindings
			.iter()
			.find(|(s, n, _)| n == name && s.as_deref() == scope)
		{
			return Ok(Some(LookupHit {
				name: name.to_string(),
				symbol_id: target.clone(),
			}));
		}
		Ok(state
			.symbols
			.iter()
			.find(|(s, _)| s.simple_name() == name)
			.map(|(s, _)| LookupHit {
				name: name.to_string(),
				symbol_id: Some(s.clone()),
			}))
	}
}

#[async_trait]
impl FilePort for InMemoryProject {
	async fn read_file(&self, path: &Path) -> PortResult<String> {
		self.calls.reads.fetch_add(1, Ordering::SeqCst);
		self.check("read_file")?;
		self.state
			.lock()
			.files
			.get(path)
			.cloned()
			.ok_or_else(|| PortError::NotFound(path.to_path_buf()))
	}

	async fn write_file(&self, path: &Path, contents: &str) -> PortResult<()> {
		self.calls.writes.fetch_add(1, Ordering::SeqCst);
		self.check("write_file")?;
		self.state.lock().files.insert(path.to_path_buf(), contents.to_string());
		Ok(())
	}
}

#[async_trait]
impl ParserPort for InMemoryProject {
	/// Accepts any source whose braces balance.
	async fn parse(&self, path: &Path, source: &str) -> PortResult<()> {
		self.calls.parses.fetch_add(1, Ordering::SeqCst);
		let mut depth: i64 = 0;
		for c in source.chars() {
			match c {
				'{' => depth += 1,
				'}' => depth -= 1,
				_ => {}
			}
			if depth < 0 {
				break;
			}
		}
		if depth != 0 {
			return Err(PortError::Parse {
				path: path.to_path_buf(),
				message: "unbalanced braces".to_string(),
			});
		}
		Ok(())
	}
}

#[async_trait]
impl TranspilerPort for InMemoryProject {
	async fn transpile_script(&self, request: TranspileRequest<'_>) -> PortResult<String> {
		self.calls.transpiles.fetch_add(1, Ordering::SeqCst);
		if self.state.lock().transpile_failures.contains(request.symbol_id) {
			return Err(PortError::failed(format!("cannot transpile {}", request.symbol_id)));
		}
		Ok(format!("// patch {}\n{}", request.symbol_id, request.source_text))
	}
}
