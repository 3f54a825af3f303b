//! Recalculation ordering and circular dependency detection.
//!
//! When a cell changes, every cell that (transitively) reads it must be
//! recomputed, and each one only after the cells it reads. A depth-first
//! walk over dependents, recording nodes in post-order, gives exactly that
//! once reversed. Meeting a node that is still on the current path means
//! the edit closed a loop, and the walk stops there.

use std::collections::HashSet;
use std::fmt;

use super::DependencyGraph;

/// A dependency loop found while ordering a recalculation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cycle {
    /// Nodes along the loop; the first and last entries are the same node.
    pub path: Vec<String>,
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path.join(" -> "))
    }
}

/// Order in which `start` and everything depending on it must be recomputed.
///
/// `start` comes first, and every node appears after all the nodes it
/// depends on. Neighbours are visited in sorted order, so the result is
/// deterministic for a given graph.
///
/// The walk keeps its own stack, so chain length is bounded by memory only.
pub fn recalc_order(graph: &DependencyGraph, start: &str) -> Result<Vec<String>, Cycle> {
    let mut walk = Walk::new(graph);
    walk.enter(start);

    while let Some(frame) = walk.pending.last_mut() {
        match frame.pop() {
            Some(next) => {
                if walk.on_path.contains(next) {
                    let cycle = walk.cycle_to(next);
                    log::debug!("cycle while ordering from {}: {}", start, cycle);
                    return Err(cycle);
                }
                if !walk.done.contains(next) {
                    walk.enter(next);
                }
            }
            None => walk.leave(),
        }
    }

    let mut order = walk.finished;
    order.reverse();
    log::trace!("recalc order from {}: {:?}", start, order);
    Ok(order)
}

/// Depth-first walk state. `path[i]` is the node whose unvisited
/// dependents are `pending[i]`.
struct Walk<'g> {
    graph: &'g DependencyGraph,
    path: Vec<String>,
    on_path: HashSet<String>,
    /// Reverse-sorted, so `pop` yields the smallest name first.
    pending: Vec<Vec<&'g str>>,
    done: HashSet<String>,
    finished: Vec<String>,
}

impl<'g> Walk<'g> {
    fn new(graph: &'g DependencyGraph) -> Self {
        Walk {
            graph,
            path: Vec::new(),
            on_path: HashSet::new(),
            pending: Vec::new(),
            done: HashSet::new(),
            finished: Vec::new(),
        }
    }

    fn enter(&mut self, node: &str) {
        let mut next: Vec<&'g str> = self.graph.dependents(node).collect();
        next.sort_unstable_by(|a, b| b.cmp(a));
        self.path.push(node.to_string());
        self.on_path.insert(node.to_string());
        self.pending.push(next);
    }

    fn leave(&mut self) {
        self.pending.pop();
        if let Some(node) = self.path.pop() {
            self.on_path.remove(&node);
            self.done.insert(node.clone());
            self.finished.push(node);
        }
    }

    /// The loop closed by revisiting `node`, which is on the current path.
    fn cycle_to(&self, node: &str) -> Cycle {
        let from = self.path.iter().rposition(|p| p == node).unwrap_or_default();
        let mut path = self.path[from..].to_vec();
        path.push(node.to_string());
        Cycle { path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(edges: &[(&str, &str)]) -> DependencyGraph {
        let mut g = DependencyGraph::new();
        for (s, t) in edges {
            g.add_edge(s, t).unwrap();
        }
        g
    }

    #[test]
    fn test_isolated_node() {
        let g = DependencyGraph::new();
        assert_eq!(recalc_order(&g, "A1").unwrap(), vec!["A1"]);
    }

    #[test]
    fn test_diamond_orders_dependencies_first() {
        // B1 and C1 read A1; D1 reads B1 and C1.
        let g = chain(&[("A1", "B1"), ("A1", "C1"), ("B1", "D1"), ("C1", "D1")]);
        let order = recalc_order(&g, "A1").unwrap();
        assert_eq!(order.len(), 4);
        assert_eq!(order[0], "A1");
        assert_eq!(order[3], "D1");
    }

    #[test]
    fn test_only_reachable_nodes() {
        let g = chain(&[("A1", "B1"), ("Z1", "Y1")]);
        assert_eq!(recalc_order(&g, "A1").unwrap(), vec!["A1", "B1"]);
    }

    #[test]
    fn test_detects_cycle() {
        let g = chain(&[("A1", "B1"), ("B1", "C1"), ("C1", "A1")]);
        let cycle = recalc_order(&g, "A1").unwrap_err();
        assert_eq!(cycle.path, vec!["A1", "B1", "C1", "A1"]);
        assert_eq!(cycle.to_string(), "A1 -> B1 -> C1 -> A1");
    }

    #[test]
    fn test_cycle_deep_in_the_walk() {
        let g = chain(&[("A1", "B1"), ("B1", "C1"), ("C1", "D1"), ("D1", "B1")]);
        let cycle = recalc_order(&g, "A1").unwrap_err();
        assert_eq!(cycle.path, vec!["B1", "C1", "D1", "B1"]);
    }

    #[test]
    fn test_long_chain_does_not_recurse() {
        let names: Vec<String> = (0..200_000).map(|i| format!("n{}", i)).collect();
        let mut g = DependencyGraph::new();
        for pair in names.windows(2) {
            g.add_edge(&pair[0], &pair[1]).unwrap();
        }
        let order = recalc_order(&g, "n0").unwrap();
        assert_eq!(order, names);
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let g = chain(&[("A1", "A1")]);
        assert!(recalc_order(&g, "A1").is_err());
    }
}
