//! Insertion-ordered store with TTL expiry and a capacity bound.

use std::hash::Hash;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Capacity and lifetime limits shared by every cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CachePolicy {
	/// Maximum live entries. Zero disables caching: every insert is evicted at once.
	pub capacity: usize,
	/// Entry lifetime in milliseconds, checked lazily on read.
	pub ttl_ms: u64,
}

impl CachePolicy {
	pub const fn new(capacity: usize, ttl: Duration) -> Self {
		Self {
			capacity,
			ttl_ms: ttl.as_millis() as u64,
		}
	}

	pub const fn ttl(&self) -> Duration {
		Duration::from_millis(self.ttl_ms)
	}
}

impl Default for CachePolicy {
	fn default() -> Self {
		Self::new(512, Duration::from_secs(30))
	}
}

/// Point-in-time counters for one cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
	pub hits: u64,
	pub misses: u64,
	/// Entries dropped for capacity or expiry. Explicit invalidation is not counted.
	pub evictions: u64,
	pub size: usize,
}

impl CacheStats {
	/// Sums two snapshots.
	pub fn combine(self, other: CacheStats) -> CacheStats {
		CacheStats {
			hits: self.hits + other.hits,
			misses: self.misses + other.misses,
			evictions: self.evictions + other.evictions,
			size: self.size + other.size,
		}
	}
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
	value: V,
	expires_at: Instant,
}

/// Map whose oldest insertion is evicted once `capacity` is exceeded.
#[derive(Debug)]
pub struct TtlStore<K, V> {
	entries: IndexMap<K, CacheEntry<V>>,
	policy: CachePolicy,
	hits: u64,
	misses: u64,
	evictions: u64,
}

impl<K: Hash + Eq, V: Clone> TtlStore<K, V> {
	pub fn new(policy: CachePolicy) -> Self {
		Self {
			entries: IndexMap::new(),
			policy,
			hits: 0,
			misses: 0,
			evictions: 0,
		}
	}

	/// Returns a live entry, dropping it first if it has expired.
	pub fn get(&mut self, key: &K) -> Option<V> {
		let now = Instant::now();
		match self.entries.get_index_of(key) {
			Some(index) if self.entries[index].expires_at <= now => {
				self.entries.shift_remove_index(index);
				self.evictions += 1;
				self.misses += 1;
				None
			}
			Some(index) => {
				self.hits += 1;
				Some(self.entries[index].value.clone())
			}
			None => {
				self.misses += 1;
				None
			}
		}
	}

	/// Like [`TtlStore::get`] but leaves the hit/miss counters alone.
	pub fn peek(&self, key: &K) -> Option<&V> {
		self.entries
			.get(key)
			.filter(|entry| entry.expires_at > Instant::now())
			.map(|entry| &entry.value)
	}

	/// Inserts `value`, moving `key` to the newest position.
	pub fn insert(&mut self, key: K, value: V) {
		self.entries.shift_remove(&key);
		self.entries.insert(
			key,
			CacheEntry {
				value,
				expires_at: Instant::now() + self.policy.ttl(),
			},
		);
		while self.entries.len() > self.policy.capacity {
			self.entries.shift_remove_index(0);
			self.evictions += 1;
		}
	}

	pub fn remove(&mut self, key: &K) -> Option<V> {
		self.entries.shift_remove(key).map(|entry| entry.value)
	}

	/// Keeps only entries for which `keep` returns true.
	pub fn retain(&mut self, mut keep: impl FnMut(&K, &V) -> bool) {
		self.entries.retain(|key, entry| keep(key, &entry.value));
	}

	pub fn clear(&mut self) {
		self.entries.clear();
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn stats(&self) -> CacheStats {
		CacheStats {
			hits: self.hits,
			misses: self.misses,
			evictions: self.evictions,
			size: self.entries.len(),
		}
	}
}
