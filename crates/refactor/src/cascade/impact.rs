use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use splice_primitives::SymbolId;

use super::Traversal;
use crate::ReloadCostModel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactNode {
	pub symbol_id: SymbolId,
	pub distance: usize,
	/// Root or an immediate dependent of it.
	pub direct: bool,
	pub dependents: Vec<SymbolId>,
	pub depends_on: Vec<SymbolId>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub path: Option<PathBuf>,
}

/// The cascade of one symbol, indexed by symbol id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactGraph {
	pub root: SymbolId,
	pub nodes: BTreeMap<SymbolId, ImpactNode>,
	/// Root to the deepest dependent, one hop per step.
	pub critical_path: Vec<SymbolId>,
	pub max_depth: usize,
	/// Dependents, excluding the root.
	pub total_affected: usize,
	pub estimated_total_reload_ms: u64,
}

impl ImpactGraph {
	pub(crate) fn from_traversal(root: &SymbolId, traversal: &Traversal, cost: ReloadCostModel) -> Self {
		let nodes: BTreeMap<SymbolId, ImpactNode> = traversal
			.discovered
			.iter()
			.map(|id| {
				let distance = traversal.distance[id];
				let node = ImpactNode {
					symbol_id: id.clone(),
					distance,
					direct: distance <= 1,
					dependents: traversal.edges.get(id).cloned().unwrap_or_default(),
					depends_on: traversal.parents.get(id).cloned().unwrap_or_default(),
					path: traversal.paths.get(id).cloned(),
				};
				(id.clone(), node)
			})
			.collect();

		let max_depth = traversal.max_distance();
		Self {
			root: root.clone(),
			critical_path: critical_path(traversal),
			max_depth,
			total_affected: nodes.len().saturating_sub(1),
			estimated_total_reload_ms: cost.estimate_ms(nodes.len(), max_depth),
			nodes,
		}
	}

	pub fn node(&self, id: &SymbolId) -> Option<&ImpactNode> {
		self.nodes.get(id)
	}
}

/// Walks back from the deepest node (smallest id on ties) through nearest parents.
fn critical_path(traversal: &Traversal) -> Vec<SymbolId> {
	let deepest = traversal
		.discovered
		.iter()
		.max_by(|a, b| traversal.distance[*a].cmp(&traversal.distance[*b]).then_with(|| b.cmp(a)));
	let Some(mut current) = deepest else {
		return Vec::new();
	};

	let mut path = vec![current.clone()];
	while let Some(parent) = traversal.nearest_parent(current) {
		path.push(parent.clone());
		current = parent;
	}
	path.reverse();
	path
}
