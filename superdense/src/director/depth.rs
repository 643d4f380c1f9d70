//! Topological sort of the actor graph.
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::event::Depth;

/// Dependency graph between actors, with one node per actor in registration
/// order.
pub(super) type ActorGraph = DiGraph<(), ()>;

/// Assigns to each node its rank in a topological order of the graph.
///
/// If the graph has cycles, the sorted indices of all nodes lying on a cycle
/// are returned instead.
pub(super) fn topological_depths(graph: &ActorGraph) -> Result<Vec<Depth>, Vec<usize>> {
    match toposort(graph, None) {
        Ok(order) => {
            let mut depths = vec![0; graph.node_count()];
            for (rank, node) in order.into_iter().enumerate() {
                depths[node.index()] = rank as Depth;
            }

            Ok(depths)
        }
        Err(_) => {
            let mut nodes: Vec<usize> = tarjan_scc(graph)
                .into_iter()
                .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
                .flatten()
                .map(NodeIndex::index)
                .collect();
            nodes.sort_unstable();

            Err(nodes)
        }
    }
}
