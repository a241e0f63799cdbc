//! Memoizing decorator for the semantic port.
//!
//! [`QueryCache`] implements [`SemanticPort`] itself, so every component that
//! needs semantic data can hold it in place of the raw port. Existence,
//! occurrence, file-symbol and dependents queries are cached; scope lookups
//! and keyword lists pass straight through.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use splice_ports::{Dependent, LookupHit, PortResult, SemanticCapabilities, SemanticPort};
use splice_primitives::{SymbolId, SymbolOccurrence};
use tracing::trace;

use crate::{CachePolicy, CacheStats, TtlStore};

struct QueryState {
	existence: TtlStore<SymbolId, bool>,
	occurrences: TtlStore<String, Vec<SymbolOccurrence>>,
	file_symbols: TtlStore<PathBuf, Vec<SymbolId>>,
	dependents: TtlStore<Vec<SymbolId>, Vec<Dependent>>,
	/// Names seen with a definition occurrence in each file.
	defined_names: FxHashMap<PathBuf, FxHashSet<String>>,
}

impl QueryState {
	fn new(policy: CachePolicy) -> Self {
		Self {
			existence: TtlStore::new(policy),
			occurrences: TtlStore::new(policy),
			file_symbols: TtlStore::new(policy),
			dependents: TtlStore::new(policy),
			defined_names: FxHashMap::default(),
		}
	}

	fn note_definitions(&mut self, occurrences: &[SymbolOccurrence], name: &str) {
		for occurrence in occurrences.iter().filter(|o| o.is_definition()) {
			self.defined_names
				.entry(occurrence.path.clone())
				.or_default()
				.insert(name.to_string());
		}
	}
}

/// Caching wrapper around a [`SemanticPort`].
pub struct QueryCache {
	inner: Arc<dyn SemanticPort>,
	state: Mutex<QueryState>,
}

impl QueryCache {
	pub fn new(inner: Arc<dyn SemanticPort>, policy: CachePolicy) -> Self {
		Self {
			inner,
			state: Mutex::new(QueryState::new(policy)),
		}
	}

	/// The wrapped port.
	pub fn inner(&self) -> &Arc<dyn SemanticPort> {
		&self.inner
	}

	/// Symbols for many files, querying the port only for files not already cached.
	pub async fn file_symbols_batch(&self, paths: &[PathBuf]) -> PortResult<FxHashMap<PathBuf, Vec<SymbolId>>> {
		let mut found = FxHashMap::with_capacity_and_hasher(paths.len(), Default::default());
		let mut missing = Vec::new();
		{
			let mut state = self.state.lock();
			for path in paths {
				if found.contains_key(path) || missing.contains(path) {
					continue;
				}
				match state.file_symbols.get(path) {
					Some(symbols) => {
						found.insert(path.clone(), symbols);
					}
					None => missing.push(path.clone()),
				}
			}
		}
		trace!(cached = found.len(), missing = missing.len(), "cache.file_symbols_batch");

		let fetched = futures::future::try_join_all(missing.iter().map(|path| self.inner.file_symbols(path))).await?;

		let mut state = self.state.lock();
		for (path, symbols) in missing.into_iter().zip(fetched) {
			state.file_symbols.insert(path.clone(), symbols.clone());
			found.insert(path, symbols);
		}
		Ok(found)
	}

	/// Drops everything that may be stale after `path` changed on disk.
	///
	/// That covers the file's symbol list, any occurrence query with an
	/// occurrence in the file, and existence/dependents entries for symbols the
	/// file defines.
	pub fn invalidate_file(&self, path: &Path) {
		let mut state = self.state.lock();
		let owned_ids: FxHashSet<SymbolId> = state
			.file_symbols
			.remove(&path.to_path_buf())
			.unwrap_or_default()
			.into_iter()
			.collect();
		let mut owned_names = state.defined_names.remove(path).unwrap_or_default();
		owned_names.extend(owned_ids.iter().map(|id| id.simple_name().to_string()));

		let is_owned = |id: &SymbolId| owned_ids.contains(id) || owned_names.contains(id.simple_name());
		state.occurrences.retain(|_, occurrences| !occurrences.iter().any(|o| o.path == path));
		state.existence.retain(|id, _| !is_owned(id));
		state.dependents.retain(|ids, _| !ids.iter().any(|id| is_owned(id)));
		trace!(path = %path.display(), owned = owned_names.len(), "cache.invalidate_file");
	}

	/// Drops every entry keyed by, or listing, `id`.
	pub fn invalidate_symbol(&self, id: &SymbolId) {
		let mut state = self.state.lock();
		state.existence.remove(id);
		state.occurrences.remove(&id.simple_name().to_string());
		state.dependents.retain(|ids, _| !ids.contains(id));
	}

	pub fn clear(&self) {
		let mut state = self.state.lock();
		state.existence.clear();
		state.occurrences.clear();
		state.file_symbols.clear();
		state.dependents.clear();
		state.defined_names.clear();
	}

	/// Combined counters across all query kinds.
	pub fn stats(&self) -> CacheStats {
		let state = self.state.lock();
		state
			.existence
			.stats()
			.combine(state.occurrences.stats())
			.combine(state.file_symbols.stats())
			.combine(state.dependents.stats())
	}
}

fn dependents_key(ids: &[SymbolId]) -> Vec<SymbolId> {
	let mut key = ids.to_vec();
	key.sort();
	key.dedup();
	key
}

#[async_trait]
impl SemanticPort for QueryCache {
	fn capabilities(&self) -> SemanticCapabilities {
		self.inner.capabilities()
	}

	async fn has_symbol(&self, id: &SymbolId) -> PortResult<bool> {
		let cached = self.state.lock().existence.get(id);
		if let Some(exists) = cached {
			trace!(%id, "cache.has_symbol.hit");
			return Ok(exists);
		}
		let exists = self.inner.has_symbol(id).await?;
		self.state.lock().existence.insert(id.clone(), exists);
		Ok(exists)
	}

	async fn symbol_occurrences(&self, name: &str) -> PortResult<Vec<SymbolOccurrence>> {
		let key = name.to_string();
		let cached = self.state.lock().occurrences.get(&key);
		if let Some(occurrences) = cached {
			trace!(name, "cache.occurrences.hit");
			return Ok(occurrences);
		}
		let occurrences = self.inner.symbol_occurrences(name).await?;
		let mut state = self.state.lock();
		state.note_definitions(&occurrences, name);
		state.occurrences.insert(key, occurrences.clone());
		Ok(occurrences)
	}

	async fn file_symbols(&self, path: &Path) -> PortResult<Vec<SymbolId>> {
		let mut batch = self.file_symbols_batch(&[path.to_path_buf()]).await?;
		Ok(batch.remove(path).unwrap_or_default())
	}

	async fn dependents(&self, ids: &[SymbolId]) -> PortResult<Vec<Dependent>> {
		let key = dependents_key(ids);
		let cached = self.state.lock().dependents.get(&key);
		if let Some(dependents) = cached {
			trace!(count = key.len(), "cache.dependents.hit");
			return Ok(dependents);
		}
		let dependents = self.inner.dependents(&key).await?;
		self.state.lock().dependents.insert(key, dependents.clone());
		Ok(dependents)
	}

	async fn reserved_keywords(&self) -> PortResult<Vec<String>> {
		self.inner.reserved_keywords().await
	}

	async fn lookup(&self, name: &str, scope: Option<&str>) -> PortResult<Option<LookupHit>> {
		self.inner.lookup(name, scope).await
	}
}
