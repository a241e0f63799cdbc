//! Memoized rename validation with in-flight coalescing.
//!
//! Callers asking for the same `(symbol id, new name)` while a computation is
//! outstanding wait on the leader's result instead of starting their own.
//! Only successful results are stored; a failure is handed to every waiter
//! and then forgotten, so the next call recomputes. Callers can also keep a
//! successful value out of the store with [`ValidationCache::get_or_compute_if`].

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::{CachePolicy, CacheStats, TtlStore};

/// Cache key for one rename validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ValidationKey {
	pub symbol_id: String,
	pub new_name: String,
}

impl ValidationKey {
	pub fn new(symbol_id: impl Into<String>, new_name: impl Into<String>) -> Self {
		Self {
			symbol_id: symbol_id.into(),
			new_name: new_name.into(),
		}
	}
}

/// The leader computation was dropped before it produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("validation was cancelled before it completed")]
pub struct ComputeAborted;

type Published<V, E> = Option<Arc<Result<V, E>>>;

/// A computation in progress for one key.
struct InFlight<V, E> {
	tx: watch::Sender<Published<V, E>>,
}

type InFlightMap<V, E> = Mutex<FxHashMap<ValidationKey, Arc<InFlight<V, E>>>>;

enum Role<V, E> {
	Hit(V),
	Waiter(watch::Receiver<Published<V, E>>),
	Leader(Arc<InFlight<V, E>>),
}

/// TTL cache of validation outcomes with singleflight computation.
pub struct ValidationCache<V, E> {
	store: Mutex<TtlStore<ValidationKey, V>>,
	inflight: InFlightMap<V, E>,
}

impl<V, E> ValidationCache<V, E>
where
	V: Clone,
	E: Clone + From<ComputeAborted>,
{
	pub fn new(policy: CachePolicy) -> Self {
		Self {
			store: Mutex::new(TtlStore::new(policy)),
			inflight: Mutex::new(FxHashMap::default()),
		}
	}

	/// Returns the cached value for `key`, or runs `compute` exactly once across
	/// all concurrent callers and shares its result.
	pub async fn get_or_compute<F, Fut>(&self, key: ValidationKey, compute: F) -> Result<V, E>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<V, E>>,
	{
		self.get_or_compute_if(key, compute, |_| true).await
	}

	/// Like [`get_or_compute`](Self::get_or_compute), but a successful value is
	/// stored only when `keep` accepts it. Rejected values still reach every
	/// waiter of this computation.
	pub async fn get_or_compute_if<F, Fut, K>(&self, key: ValidationKey, compute: F, keep: K) -> Result<V, E>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<V, E>>,
		K: FnOnce(&V) -> bool,
	{
		let role = {
			let mut inflight = self.inflight.lock();
			match inflight.get(&key) {
				Some(flight) => Role::Waiter(flight.tx.subscribe()),
				None => match self.store.lock().get(&key) {
					Some(value) => Role::Hit(value),
					None => {
						let (tx, _) = watch::channel(None);
						let flight = Arc::new(InFlight { tx });
						inflight.insert(key.clone(), flight.clone());
						Role::Leader(flight)
					}
				},
			}
		};

		match role {
			Role::Hit(value) => {
				trace!(symbol = %key.symbol_id, new_name = %key.new_name, "validation_cache.hit");
				Ok(value)
			}
			Role::Waiter(rx) => {
				trace!(symbol = %key.symbol_id, new_name = %key.new_name, "validation_cache.coalesced");
				wait_for_leader(rx).await
			}
			Role::Leader(flight) => {
				let guard = LeaderGuard {
					key,
					inflight: &self.inflight,
					flight,
					completed: false,
				};
				let result = compute().await;
				match &result {
					Ok(value) if keep(value) => {
						self.store.lock().insert(guard.key.clone(), value.clone());
					}
					Ok(_) => debug!(symbol = %guard.key.symbol_id, new_name = %guard.key.new_name, "validation_cache.not_stored"),
					Err(_) => {}
				}
				guard.complete(result)
			}
		}
	}

	/// Drops every cached outcome for `symbol_id`, whatever the target name.
	pub fn invalidate_symbol(&self, symbol_id: &str) {
		self.store.lock().retain(|key, _| key.symbol_id != symbol_id);
	}

	pub fn clear(&self) {
		self.store.lock().clear();
	}

	pub fn stats(&self) -> CacheStats {
		self.store.lock().stats()
	}

	/// Number of computations currently running.
	pub fn in_flight(&self) -> usize {
		self.inflight.lock().len()
	}
}

async fn wait_for_leader<V, E>(mut rx: watch::Receiver<Published<V, E>>) -> Result<V, E>
where
	V: Clone,
	E: Clone + From<ComputeAborted>,
{
	loop {
		let published = rx.borrow_and_update().clone();
		if let Some(result) = published {
			return (*result).clone();
		}
		if rx.changed().await.is_err() {
			return Err(ComputeAborted.into());
		}
	}
}

/// Owned by the leader. Unregisters the in-flight entry however the leader exits.
///
/// Waiters only hold receivers, so once the entry is removed and the guard is
/// dropped the sender closes and any waiter still pending sees [`ComputeAborted`].
struct LeaderGuard<'a, V, E> {
	key: ValidationKey,
	inflight: &'a InFlightMap<V, E>,
	flight: Arc<InFlight<V, E>>,
	completed: bool,
}

impl<V, E> LeaderGuard<'_, V, E>
where
	V: Clone,
	E: Clone,
{
	fn complete(mut self, result: Result<V, E>) -> Result<V, E> {
		self.completed = true;
		self.inflight.lock().remove(&self.key);
		self.flight.tx.send_replace(Some(Arc::new(result.clone())));
		result
	}
}

impl<V, E> Drop for LeaderGuard<'_, V, E> {
	fn drop(&mut self) {
		if self.completed {
			return;
		}
		debug!(symbol = %self.key.symbol_id, new_name = %self.key.new_name, "validation_cache.leader_dropped");
		let mut inflight = self.inflight.lock();
		if inflight
			.get(&self.key)
			.is_some_and(|flight| Arc::ptr_eq(flight, &self.flight))
		{
			inflight.remove(&self.key);
		}
	}
}
