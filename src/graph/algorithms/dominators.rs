//! Dominator tree construction.
//!
//! Uses the Cooper-Harvey-Kennedy iterative scheme: process nodes in reverse
//! postorder, intersect the dominator-tree paths of each node's processed
//! predecessors, and repeat until no immediate dominator changes. On the
//! mostly reducible graphs bytecode methods produce, the fixed point is
//! reached in two or three passes.

use crate::graph::{NodeId, Predecessors};

/// The dominator tree of a rooted graph.
///
/// Node `a` dominates node `b` when every path from the entry to `b` passes
/// through `a`. The tree stores only each node's *immediate* dominator; all
/// other dominance queries walk idom chains.
///
/// Nodes unreachable from the entry have no immediate dominator and answer
/// `false` to every dominance query except the reflexive one.
#[derive(Debug, Clone)]
pub struct DominatorTree {
    entry: NodeId,
    idom: Vec<Option<NodeId>>,
}

impl DominatorTree {
    /// Returns the entry node the tree is rooted at.
    #[must_use]
    pub fn entry(&self) -> NodeId {
        self.entry
    }

    /// Returns the immediate dominator of `node`.
    ///
    /// `None` for the entry node itself and for nodes unreachable from the
    /// entry.
    #[must_use]
    pub fn immediate_dominator(&self, node: NodeId) -> Option<NodeId> {
        if node == self.entry {
            return None;
        }
        self.idom.get(node.index()).copied().flatten()
    }

    /// Returns `true` if `node` is reachable from the entry.
    #[must_use]
    pub fn is_reachable(&self, node: NodeId) -> bool {
        node == self.entry || self.immediate_dominator(node).is_some()
    }

    /// Returns `true` if `a` dominates `b` (reflexively: every node dominates
    /// itself).
    #[must_use]
    pub fn dominates(&self, a: NodeId, b: NodeId) -> bool {
        if a == b {
            return true;
        }
        let mut current = b;
        while let Some(idom) = self.immediate_dominator(current) {
            if idom == a {
                return true;
            }
            current = idom;
        }
        false
    }

    /// Returns `true` if `a` dominates `b` and `a != b`.
    #[must_use]
    pub fn strictly_dominates(&self, a: NodeId, b: NodeId) -> bool {
        a != b && self.dominates(a, b)
    }

    /// Returns the children of `node` in the dominator tree, i.e. the nodes
    /// whose immediate dominator is `node`.
    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        (0..self.idom.len())
            .map(NodeId::new)
            .filter(|&candidate| {
                candidate != self.entry && self.immediate_dominator(candidate) == Some(node)
            })
            .collect()
    }

    /// Returns the nodes dominated by `node` transitively but not
    /// immediately: strict descendants in the dominator tree that are not
    /// direct children. Structuring passes use these to rank emission order.
    #[must_use]
    pub fn indirect_children(&self, node: NodeId) -> Vec<NodeId> {
        (0..self.idom.len())
            .map(NodeId::new)
            .filter(|&candidate| {
                candidate != node
                    && self.immediate_dominator(candidate) != Some(node)
                    && self.strictly_dominates(node, candidate)
            })
            .collect()
    }

    /// Returns the full dominator set of `node`, from its immediate dominator
    /// up to the entry.
    pub fn dominators(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.immediate_dominator(node), |&current| {
            self.immediate_dominator(current)
        })
    }

    /// Returns the depth of `node` in the dominator tree (entry has depth 0),
    /// or `None` for unreachable nodes.
    #[must_use]
    pub fn depth(&self, node: NodeId) -> Option<usize> {
        if !self.is_reachable(node) {
            return None;
        }
        Some(self.dominators(node).count())
    }
}

/// Computes the dominator tree of `graph` rooted at `entry`.
///
/// Runs the reverse-postorder intersection algorithm to a fixed point. Nodes
/// unreachable from `entry` are left without a dominator.
#[must_use]
pub fn compute_dominators<G: Predecessors>(graph: &G, entry: NodeId) -> DominatorTree {
    let order = crate::graph::algorithms::traversal::reverse_postorder(graph, entry);

    // Work in reverse-postorder ranks: the intersection walk then only climbs
    // toward smaller ranks, with UNDEFINED marking not-yet-processed nodes.
    const UNDEFINED: usize = usize::MAX;
    let mut rank = vec![UNDEFINED; graph.node_count()];
    for (position, &node) in order.iter().enumerate() {
        rank[node.index()] = position;
    }

    // idom_by_rank[r] is the rank of the immediate dominator of order[r].
    let mut idom_by_rank = vec![UNDEFINED; order.len()];
    if !order.is_empty() {
        idom_by_rank[0] = 0;
    }

    fn intersect(idom_by_rank: &[usize], mut a: usize, mut b: usize) -> usize {
        while a != b {
            while a > b {
                a = idom_by_rank[a];
            }
            while b > a {
                b = idom_by_rank[b];
            }
        }
        a
    }

    let mut changed = true;
    while changed {
        changed = false;
        for (node_rank, &node) in order.iter().enumerate().skip(1) {
            let mut new_idom = UNDEFINED;
            for predecessor in graph.predecessors(node) {
                let pred_rank = rank[predecessor.index()];
                if pred_rank == UNDEFINED || idom_by_rank[pred_rank] == UNDEFINED {
                    continue;
                }
                new_idom = if new_idom == UNDEFINED {
                    pred_rank
                } else {
                    intersect(&idom_by_rank, new_idom, pred_rank)
                };
            }
            if new_idom != UNDEFINED && idom_by_rank[node_rank] != new_idom {
                idom_by_rank[node_rank] = new_idom;
                changed = true;
            }
        }
    }

    let mut idom: Vec<Option<NodeId>> = vec![None; graph.node_count()];
    // Rank 0 is the entry; its self-idom is an algorithm artifact, not result.
    for (node_rank, &node) in order.iter().enumerate().skip(1) {
        let dominator_rank = idom_by_rank[node_rank];
        if dominator_rank != UNDEFINED {
            idom[node.index()] = Some(order[dominator_rank]);
        }
    }

    DominatorTree { entry, idom }
}
