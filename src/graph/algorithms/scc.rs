//! Strongly connected components via Kosaraju's algorithm.
//!
//! Two passes over the graph: the first records nodes in order of DFS
//! completion, the second walks edges in reverse starting from the latest
//! unassigned finisher. Every tree grown by the second pass is exactly one
//! strongly connected component. Both passes are iterative.

use crate::graph::{
    algorithms::traversal::{depth_first_visit, Control, Direction},
    DirectedGraph, NodeId, Predecessors,
};
use crate::Result;

/// Computes the strongly connected components of `graph`.
///
/// Every node is assigned to exactly one component, including isolated nodes
/// (which form singleton components) and nodes unreachable from any root.
/// Component membership is the contract; neither the order of components nor
/// the order of nodes within a component is guaranteed. Callers needing an
/// inter-component order should build the [`condensation`] and topologically
/// sort it.
#[must_use]
pub fn strongly_connected_components<G: Predecessors>(graph: &G) -> Vec<Vec<NodeId>> {
    let node_count = graph.node_count();

    // Pass 1: nodes in order of DFS completion, across all roots.
    let mut finish_order: Vec<NodeId> = Vec::with_capacity(node_count);
    let mut visited = vec![false; node_count];

    enum State {
        Enter(NodeId),
        Exit(NodeId),
    }

    for root in (0..node_count).map(NodeId::new) {
        if visited[root.index()] {
            continue;
        }
        let mut stack = vec![State::Enter(root)];
        while let Some(state) = stack.pop() {
            match state {
                State::Enter(node) => {
                    if visited[node.index()] {
                        continue;
                    }
                    visited[node.index()] = true;
                    stack.push(State::Exit(node));
                    for successor in graph.successors(node) {
                        if !visited[successor.index()] {
                            stack.push(State::Enter(successor));
                        }
                    }
                }
                State::Exit(node) => finish_order.push(node),
            }
        }
    }

    // Pass 2: reverse walks from the latest finishers carve out components.
    let mut assigned = vec![false; node_count];
    let mut components = Vec::new();

    for &root in finish_order.iter().rev() {
        if assigned[root.index()] {
            continue;
        }
        let mut component = Vec::new();
        depth_first_visit(graph, root, Direction::Reverse, |discovery| {
            if assigned[discovery.node.index()] {
                Control::Prune
            } else {
                if discovery.first_visit {
                    assigned[discovery.node.index()] = true;
                    component.push(discovery.node);
                }
                Control::Continue
            }
        });
        components.push(component);
    }

    components
}

/// Builds the condensation of `graph`: one node per strongly connected
/// component, one edge per distinct inter-component edge.
///
/// Each condensation node carries the member list of its component. The
/// condensation is acyclic by construction, so it can be topologically
/// sorted without `ignore_cycles`.
///
/// # Errors
///
/// Returns [`Error::GraphError`](crate::Error::GraphError) only if the input
/// graph yields successors outside `0..node_count()`, which violates the
/// [`Successors`](crate::graph::Successors) contract.
pub fn condensation<G: Predecessors>(graph: &G) -> Result<DirectedGraph<Vec<NodeId>, ()>> {
    let components = strongly_connected_components(graph);

    let mut membership = vec![usize::MAX; graph.node_count()];
    for (index, component) in components.iter().enumerate() {
        for &node in component {
            membership[node.index()] = index;
        }
    }

    let mut condensed: DirectedGraph<Vec<NodeId>, ()> =
        DirectedGraph::with_capacity(components.len(), 0);
    let component_nodes: Vec<NodeId> = components
        .iter()
        .map(|component| condensed.add_node(component.clone()))
        .collect();

    let mut seen_pairs = std::collections::HashSet::new();
    for node in (0..graph.node_count()).map(NodeId::new) {
        let from = membership[node.index()];
        for successor in graph.successors(node) {
            let to = membership[successor.index()];
            if from != to && seen_pairs.insert((from, to)) {
                condensed.add_edge(component_nodes[from], component_nodes[to], ())?;
            }
        }
    }

    Ok(condensed)
}
