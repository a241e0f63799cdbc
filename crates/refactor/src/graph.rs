//! Cycle search over small directed graphs.

use std::hash::Hash;

use rustc_hash::{FxHashMap, FxHashSet};

/// Closed cycles (`first == last`) reachable from `roots`.
///
/// Depth-first with a visited set and an on-path set: only an edge back into
/// the current path closes a cycle, so a diamond that re-converges on an
/// already-finished node is not reported. Each cycle is reported once,
/// whichever node it was entered from.
///
/// Nodes are expanded at most once, so every node-disjoint cycle is found but
/// cycles sharing nodes with one already found may not be: with `a -> b -> c
/// -> a` and `a -> c`, only the first is listed.
pub fn find_cycles<N>(roots: impl IntoIterator<Item = N>, edges: &FxHashMap<N, Vec<N>>) -> Vec<Vec<N>>
where
	N: Clone + Eq + Hash + Ord,
{
	let mut visited: FxHashSet<N> = FxHashSet::default();
	let mut reported: FxHashSet<Vec<N>> = FxHashSet::default();
	let mut cycles = Vec::new();

	for root in roots {
		if !visited.insert(root.clone()) {
			continue;
		}
		let mut path = vec![root.clone()];
		let mut on_path: FxHashMap<N, usize> = FxHashMap::default();
		on_path.insert(root.clone(), 0);
		let mut stack = vec![(root, 0usize)];

		while let Some((node, index)) = stack.last_mut() {
			let next = edges.get(&*node).and_then(|children| children.get(*index)).cloned();
			*index += 1;

			let Some(child) = next else {
				if let Some((done, _)) = stack.pop() {
					path.pop();
					on_path.remove(&done);
				}
				continue;
			};

			if let Some(&start) = on_path.get(&child) {
				let members = &path[start..];
				if reported.insert(canonical_rotation(members)) {
					let mut cycle = members.to_vec();
					cycle.push(child);
					cycles.push(cycle);
				}
			} else if visited.insert(child.clone()) {
				on_path.insert(child.clone(), path.len());
				path.push(child.clone());
				stack.push((child, 0));
			}
		}
	}
	cycles
}

/// The rotation of `members` that starts at its smallest element.
fn canonical_rotation<N: Clone + Ord>(members: &[N]) -> Vec<N> {
	let start = members
		.iter()
		.enumerate()
		.min_by(|a, b| a.1.cmp(b.1))
		.map_or(0, |(i, _)| i);
	members[start..].iter().chain(&members[..start]).cloned().collect()
}
