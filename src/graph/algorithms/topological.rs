//! Cycle-aware topological sorting.
//!
//! Three-color depth-first sort with an explicit agenda. A gray node reached
//! again while still on the current path is a back-edge; depending on the
//! caller this is either a hard error or an edge to skip (control flow graphs
//! with loops still want a useful "mostly topological" block order).

use crate::graph::{NodeId, Successors};
use crate::{Error, Result};

#[derive(Clone, Copy, PartialEq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Topologically sorts nodes reachable from `roots`, resolving children
/// through a closure.
///
/// The closure form exists so callers can sort orders that are not plain
/// graph adjacency, such as dominator-tree children reordered for structured
/// output. `node_count` bounds the identifier space; `children` is invoked
/// once per non-black node expansion.
///
/// The result contains each reachable node exactly once, parents before
/// children along every tree edge. With `ignore_cycles` set, back-edges are
/// skipped and every node still appears exactly once.
///
/// # Errors
///
/// Returns [`Error::CycleDetected`] when a back-edge is found and
/// `ignore_cycles` is `false`.
pub fn topological_sort_by<F, C>(
    node_count: usize,
    roots: &[NodeId],
    mut children: F,
    ignore_cycles: bool,
) -> Result<Vec<NodeId>>
where
    F: FnMut(NodeId) -> C,
    C: IntoIterator<Item = NodeId>,
{
    let mut colors = vec![Color::White; node_count];
    let mut order = Vec::with_capacity(node_count);

    enum State {
        Enter(NodeId),
        Exit(NodeId),
    }

    for &root in roots {
        if colors[root.index()] != Color::White {
            continue;
        }
        let mut stack = vec![State::Enter(root)];
        while let Some(state) = stack.pop() {
            match state {
                State::Enter(node) => match colors[node.index()] {
                    Color::Black => {}
                    Color::Gray => {
                        if !ignore_cycles {
                            return Err(Error::CycleDetected);
                        }
                    }
                    Color::White => {
                        colors[node.index()] = Color::Gray;
                        stack.push(State::Exit(node));
                        let child_list: Vec<NodeId> = children(node).into_iter().collect();
                        for child in child_list.into_iter().rev() {
                            match colors[child.index()] {
                                Color::Black => {}
                                Color::Gray => {
                                    if !ignore_cycles {
                                        return Err(Error::CycleDetected);
                                    }
                                }
                                Color::White => stack.push(State::Enter(child)),
                            }
                        }
                    }
                },
                State::Exit(node) => {
                    colors[node.index()] = Color::Black;
                    order.push(node);
                }
            }
        }
    }

    order.reverse();
    Ok(order)
}

/// Topologically sorts every node of `graph`, treating all nodes as roots.
///
/// Convenience wrapper over [`topological_sort_by`] using plain graph
/// adjacency; disconnected nodes are included.
///
/// # Errors
///
/// Returns [`Error::CycleDetected`] when the graph contains a cycle and
/// `ignore_cycles` is `false`.
pub fn topological_sort<G: Successors>(graph: &G, ignore_cycles: bool) -> Result<Vec<NodeId>> {
    let roots: Vec<NodeId> = (0..graph.node_count()).map(NodeId::new).collect();
    topological_sort_by(
        graph.node_count(),
        &roots,
        |node| graph.successors(node).collect::<Vec<_>>(),
        ignore_cycles,
    )
}
