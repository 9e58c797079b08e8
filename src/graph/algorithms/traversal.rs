//! Iterative depth-first traversal with caller hooks.
//!
//! The core primitive is [`depth_first_visit`]: an explicit-stack DFS that
//! reports every edge crossing to a visitor closure and lets the visitor steer
//! the walk ([`Control::Continue`], [`Control::Prune`], [`Control::Abort`]).
//! [`postorder`] and [`reverse_postorder`] are built on the same explicit
//! enter/exit stack discipline and are what the ordering-sensitive algorithms
//! (dominators, block layout) consume.

use crate::graph::{NodeId, Predecessors, Successors};

/// Which adjacency relation a traversal follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Follow edges from source to target.
    Forward,
    /// Follow edges from target to source.
    Reverse,
}

/// A single step of a depth-first walk, handed to the visitor closure.
#[derive(Debug, Clone, Copy)]
pub struct Discovery {
    /// The node being reached.
    pub node: NodeId,
    /// The node the walk arrived from, or `None` for the start node.
    pub origin: Option<NodeId>,
    /// `true` the first time `node` is reached; `false` for every later edge
    /// into an already-visited node (back-edges, cross-edges).
    pub first_visit: bool,
}

/// The visitor's verdict on a [`Discovery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Keep walking; explore the discovered node's neighbors (only meaningful
    /// on a first visit).
    Continue,
    /// Mark the node visited but do not explore its neighbors.
    Prune,
    /// Stop the entire traversal immediately.
    Abort,
}

/// Walks the graph depth-first from `start`, reporting every edge crossing.
///
/// The visitor is invoked once for the start node (with `origin == None`) and
/// once per edge followed, including edges into already-visited nodes. Only a
/// [`Control::Continue`] verdict on a `first_visit` discovery causes the
/// node's neighbors to be pushed; revisit discoveries never re-expand a node
/// regardless of verdict, so the walk terminates on cyclic graphs.
///
/// Neighbors are explored in the order the graph yields them.
///
/// # Returns
///
/// `true` if the traversal ran to completion, `false` if the visitor aborted.
pub fn depth_first_visit<G, F>(graph: &G, start: NodeId, direction: Direction, mut visit: F) -> bool
where
    G: Predecessors,
    F: FnMut(&Discovery) -> Control,
{
    let mut visited = vec![false; graph.node_count()];
    let mut stack: Vec<(NodeId, Option<NodeId>)> = vec![(start, None)];

    while let Some((node, origin)) = stack.pop() {
        let first_visit = !visited[node.index()];
        let discovery = Discovery {
            node,
            origin,
            first_visit,
        };

        match visit(&discovery) {
            Control::Abort => return false,
            Control::Prune => {
                visited[node.index()] = true;
            }
            Control::Continue => {
                if first_visit {
                    visited[node.index()] = true;
                    // Push in reverse so the first neighbor is explored first.
                    let neighbors: Vec<NodeId> = match direction {
                        Direction::Forward => graph.successors(node).collect(),
                        Direction::Reverse => graph.predecessors(node).collect(),
                    };
                    for neighbor in neighbors.into_iter().rev() {
                        stack.push((neighbor, Some(node)));
                    }
                }
            }
        }
    }

    true
}

/// Computes a depth-first preorder sequence of all nodes reachable from
/// `start`: each node appears at the moment it is first discovered.
#[must_use]
pub fn dfs<G: Successors>(graph: &G, start: NodeId) -> Vec<NodeId> {
    let mut order = Vec::new();
    let mut visited = vec![false; graph.node_count()];
    let mut stack = vec![start];

    while let Some(node) = stack.pop() {
        if visited[node.index()] {
            continue;
        }
        visited[node.index()] = true;
        order.push(node);
        let successors: Vec<NodeId> = graph.successors(node).collect();
        for successor in successors.into_iter().rev() {
            if !visited[successor.index()] {
                stack.push(successor);
            }
        }
    }

    order
}

/// Phase marker for the enter/exit stack used by the ordering traversals.
enum State {
    Enter(NodeId),
    Exit(NodeId),
}

/// Computes a postorder sequence of all nodes reachable from `start`.
///
/// A node appears after all of its tree descendants. Unreachable nodes are
/// absent from the result.
#[must_use]
pub fn postorder<G: Successors>(graph: &G, start: NodeId) -> Vec<NodeId> {
    let mut order = Vec::new();
    let mut visited = vec![false; graph.node_count()];
    let mut stack = vec![State::Enter(start)];

    while let Some(state) = stack.pop() {
        match state {
            State::Enter(node) => {
                if visited[node.index()] {
                    continue;
                }
                visited[node.index()] = true;
                stack.push(State::Exit(node));
                let successors: Vec<NodeId> = graph.successors(node).collect();
                for successor in successors.into_iter().rev() {
                    if !visited[successor.index()] {
                        stack.push(State::Enter(successor));
                    }
                }
            }
            State::Exit(node) => order.push(node),
        }
    }

    order
}

/// Computes a reverse postorder sequence of all nodes reachable from `start`.
///
/// Reverse postorder visits every node before any of its non-back-edge
/// successors, which is the iteration order required for forward data-flow
/// problems and dominator computation.
#[must_use]
pub fn reverse_postorder<G: Successors>(graph: &G, start: NodeId) -> Vec<NodeId> {
    let mut order = postorder(graph, start);
    order.reverse();
    order
}
