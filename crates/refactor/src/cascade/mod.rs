//! Transitive dependent discovery for hot reload.
//!
//! Traversal is breadth-first with one `dependents` call per frontier level,
//! so a wide graph costs one round trip per level rather than per node. Each
//! symbol is recorded once, at the first (smallest) distance it was reached.

mod impact;

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::path::PathBuf;

pub use impact::{ImpactGraph, ImpactNode};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use splice_ports::{Dependent, PortResult, SemanticCapabilities, SemanticPort};
use splice_primitives::SymbolId;
use tracing::{debug, trace};

use crate::ReloadCostModel;
use crate::graph::find_cycles;

/// One symbol that must reload, and how far it sits from the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeEntry {
	pub symbol_id: SymbolId,
	pub distance: usize,
	pub reason: String,
	/// File the index places the symbol in. Unknown for the changed symbols.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CascadeMetadata {
	pub total_symbols: usize,
	pub max_distance: usize,
	pub has_circular: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CascadeResult {
	/// Entries in discovery order.
	pub cascade: Vec<CascadeEntry>,
	/// Reload order: each symbol after everything it depends on, cycles permitting.
	pub order: Vec<SymbolId>,
	/// Closed cycles, first element repeated last.
	pub circular: Vec<Vec<SymbolId>>,
	pub metadata: CascadeMetadata,
}

/// Everything the breadth-first pass learned.
#[derive(Debug, Default)]
pub(crate) struct Traversal {
	/// Symbols in the order they were first reached.
	pub discovered: Vec<SymbolId>,
	pub distance: FxHashMap<SymbolId, usize>,
	/// `parent -> children`, where each child depends on its parent.
	pub edges: FxHashMap<SymbolId, Vec<SymbolId>>,
	pub parents: FxHashMap<SymbolId, Vec<SymbolId>>,
	pub paths: FxHashMap<SymbolId, PathBuf>,
}

impl Traversal {
	fn visit(&mut self, id: SymbolId, distance: usize) -> bool {
		if self.distance.contains_key(&id) {
			return false;
		}
		self.distance.insert(id.clone(), distance);
		self.discovered.push(id);
		true
	}

	fn link(&mut self, parent: &SymbolId, child: &SymbolId) {
		let children = self.edges.entry(parent.clone()).or_default();
		if children.contains(child) {
			return;
		}
		children.push(child.clone());
		self.parents.entry(child.clone()).or_default().push(parent.clone());
	}

	pub fn max_distance(&self) -> usize {
		self.distance.values().copied().max().unwrap_or(0)
	}

	/// The first-recorded parent one level closer to the roots.
	pub fn nearest_parent(&self, id: &SymbolId) -> Option<&SymbolId> {
		let distance = *self.distance.get(id)?;
		self.parents
			.get(id)?
			.iter()
			.find(|parent| self.distance.get(*parent).is_some_and(|d| *d + 1 == distance))
	}
}

pub struct CascadeEngine {
	cost: ReloadCostModel,
}

impl CascadeEngine {
	pub fn new(cost: ReloadCostModel) -> Self {
		Self { cost }
	}

	pub fn cost(&self) -> ReloadCostModel {
		self.cost
	}

	/// Everything that must reload after `changed` changes, with reload order
	/// and any dependency cycles.
	///
	/// A port without dependents support yields only the changed symbols.
	pub async fn compute_hot_reload_cascade(
		&self,
		semantic: Option<&dyn SemanticPort>,
		changed: &[SymbolId],
	) -> PortResult<CascadeResult> {
		let traversal = traverse(semantic, changed).await?;

		let cascade = traversal
			.discovered
			.iter()
			.map(|id| {
				let distance = traversal.distance[id];
				let reason = match traversal.nearest_parent(id) {
					Some(parent) if distance > 0 => format!("depends on {parent}"),
					_ => "changed directly".to_string(),
				};
				CascadeEntry {
					symbol_id: id.clone(),
					distance,
					reason,
					path: traversal.paths.get(id).cloned(),
				}
			})
			.collect::<Vec<_>>();

		let circular = find_cycles(traversal.discovered.iter().cloned(), &traversal.edges);
		let order = reload_order(&traversal);
		let metadata = CascadeMetadata {
			total_symbols: cascade.len(),
			max_distance: traversal.max_distance(),
			has_circular: !circular.is_empty(),
		};
		debug!(
			changed = changed.len(),
			total = metadata.total_symbols,
			depth = metadata.max_distance,
			cycles = circular.len(),
			"cascade.computed"
		);
		Ok(CascadeResult {
			cascade,
			order,
			circular,
			metadata,
		})
	}

	/// The cascade of a single symbol as an indexed graph with a critical path
	/// and a reload-time estimate.
	pub async fn compute_rename_impact_graph(
		&self,
		semantic: Option<&dyn SemanticPort>,
		symbol_id: &SymbolId,
	) -> PortResult<ImpactGraph> {
		let traversal = traverse(semantic, std::slice::from_ref(symbol_id)).await?;
		Ok(ImpactGraph::from_traversal(symbol_id, &traversal, self.cost))
	}
}

/// Breadth-first discovery from `roots`.
pub(crate) async fn traverse(semantic: Option<&dyn SemanticPort>, roots: &[SymbolId]) -> PortResult<Traversal> {
	let mut traversal = Traversal::default();
	let mut frontier: Vec<SymbolId> = Vec::new();
	for root in roots {
		if traversal.visit(root.clone(), 0) {
			frontier.push(root.clone());
		}
	}

	let Some(port) = semantic.filter(|p| p.capabilities().contains(SemanticCapabilities::DEPENDENTS)) else {
		trace!(roots = roots.len(), "cascade.no_dependents_capability");
		return Ok(traversal);
	};

	let mut level = 0;
	while !frontier.is_empty() {
		let found = level_edges(port, &frontier).await?;
		trace!(level, frontier = frontier.len(), edges = found.len(), "cascade.level");

		let mut next = Vec::new();
		for (parent, dependent) in found {
			traversal.link(&parent, &dependent.symbol_id);
			traversal
				.paths
				.entry(dependent.symbol_id.clone())
				.or_insert(dependent.path);
			if traversal.visit(dependent.symbol_id.clone(), level + 1) {
				next.push(dependent.symbol_id);
			}
		}
		frontier = next;
		level += 1;
	}
	Ok(traversal)
}

/// Dependents of one frontier, each paired with the frontier member it depends on.
///
/// One batched call suffices when the port reports `depends_on` (or the
/// frontier has a single member). Otherwise the level is re-queried member by
/// member to recover the edges.
async fn level_edges(port: &dyn SemanticPort, frontier: &[SymbolId]) -> PortResult<Vec<(SymbolId, Dependent)>> {
	let dependents = port.dependents(frontier).await?;
	let members: FxHashSet<&SymbolId> = frontier.iter().collect();

	let attributable = frontier.len() == 1
		|| dependents
			.iter()
			.all(|d| d.depends_on.as_ref().is_some_and(|p| members.contains(p)));
	if attributable {
		return Ok(dependents
			.into_iter()
			.map(|d| {
				let parent = d
					.depends_on
					.clone()
					.filter(|p| members.contains(p))
					.unwrap_or_else(|| frontier[0].clone());
				(parent, d)
			})
			.collect());
	}

	trace!(frontier = frontier.len(), "cascade.level.per_member");
	let per_member = futures::future::try_join_all(
		frontier
			.iter()
			.map(|member| port.dependents(std::slice::from_ref(member))),
	)
	.await?;
	Ok(frontier
		.iter()
		.zip(per_member)
		.flat_map(|(member, found)| found.into_iter().map(move |d| (member.clone(), d)))
		.collect())
}

/// Kahn's algorithm over the discovered edges, smallest `(distance, id)` first.
///
/// When only cycle members remain, the smallest remaining symbol is emitted
/// regardless of its unresolved parents, so every symbol appears exactly once.
fn reload_order(traversal: &Traversal) -> Vec<SymbolId> {
	let mut indegree: FxHashMap<&SymbolId, usize> = traversal.discovered.iter().map(|id| (id, 0)).collect();
	for children in traversal.edges.values() {
		for child in children {
			if let Some(count) = indegree.get_mut(child) {
				*count += 1;
			}
		}
	}

	let key = |id: &SymbolId| Reverse((traversal.distance[id], id.clone()));
	let mut ready: BinaryHeap<Reverse<(usize, SymbolId)>> = indegree
		.iter()
		.filter(|(_, count)| **count == 0)
		.map(|(id, _)| key(*id))
		.collect();
	let mut emitted: FxHashSet<SymbolId> = FxHashSet::default();
	let mut order = Vec::with_capacity(traversal.discovered.len());

	while order.len() < traversal.discovered.len() {
		let Some(Reverse((_, id))) = ready.pop() else {
			let forced = traversal
				.discovered
				.iter()
				.filter(|id| !emitted.contains(*id))
				.min_by_key(|id| (traversal.distance[*id], (*id).clone()));
			match forced {
				Some(id) => ready.push(key(id)),
				None => break,
			}
			continue;
		};
		if !emitted.insert(id.clone()) {
			continue;
		}
		for child in traversal.edges.get(&id).into_iter().flatten() {
			if let Some(count) = indegree.get_mut(child) {
				*count = count.saturating_sub(1);
				if *count == 0 && !emitted.contains(child) {
					ready.push(key(child));
				}
			}
		}
		order.push(id);
	}
	order
}
