//! Node identifier for directed graphs.
//!
//! This module provides the [`NodeId`] type, a strongly-typed identifier for nodes
//! within a directed graph arena. The newtype wrapper prevents accidental confusion
//! between node indices and other integer values.

use std::fmt;

/// A strongly-typed identifier for nodes within a directed graph.
///
/// `NodeId` wraps a `usize` arena index. Node IDs are assigned sequentially
/// starting from 0 as nodes are added to a graph, and remain stable for the
/// lifetime of that graph. Because cyclic structures (control flow graphs,
/// data flow graphs, dominator trees) address each other through these keys
/// rather than through direct references, no reference cycles ever form.
///
/// # Usage
///
/// Node IDs are created by [`DirectedGraph::add_node`](crate::graph::DirectedGraph::add_node)
/// and should not typically be constructed manually. They are used to:
///
/// - Reference nodes when adding edges
/// - Look up node payloads
/// - Query adjacency relationships
/// - Store analysis results indexed by node
///
/// # Thread Safety
///
/// `NodeId` is [`Copy`], [`Send`], and [`Sync`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Creates a new `NodeId` from a raw index value.
    ///
    /// Primarily intended for internal use and testing; normal usage obtains
    /// `NodeId` values from [`DirectedGraph::add_node`](crate::graph::DirectedGraph::add_node).
    ///
    /// # Arguments
    ///
    /// * `index` - The raw node index (0-based)
    #[must_use]
    #[inline]
    pub const fn new(index: usize) -> Self {
        NodeId(index)
    }

    /// Returns the raw index value of this node identifier.
    ///
    /// The index is a 0-based position suitable for indexing vectors that
    /// store per-node data.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl From<usize> for NodeId {
    #[inline]
    fn from(index: usize) -> Self {
        NodeId(index)
    }
}

impl From<NodeId> for usize {
    #[inline]
    fn from(node: NodeId) -> Self {
        node.0
    }
}
