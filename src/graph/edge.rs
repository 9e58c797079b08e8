//! Edge identifier for directed graphs.
//!
//! This module provides the [`EdgeId`] type, a strongly-typed identifier for edges
//! within a directed graph arena, distinct at the type level from [`NodeId`]
//! (crate::graph::NodeId).

use std::fmt;

/// A strongly-typed identifier for edges within a directed graph.
///
/// `EdgeId` wraps a `usize` arena index. Edge IDs are assigned sequentially
/// starting from 0 as edges are added to a graph. Edges store their endpoint
/// node keys rather than references, so graphs with cycles remain plain
/// index-addressed arenas.
///
/// # Usage
///
/// Edge IDs are created by [`DirectedGraph::add_edge`](crate::graph::DirectedGraph::add_edge)
/// and used to:
///
/// - Look up edge payloads
/// - Query edge endpoints (origin and target nodes)
/// - Store analysis results indexed by edge
///
/// # Thread Safety
///
/// `EdgeId` is [`Copy`], [`Send`], and [`Sync`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub(crate) usize);

impl EdgeId {
    /// Creates a new `EdgeId` from a raw index value.
    ///
    /// Primarily intended for internal use and testing; normal usage obtains
    /// `EdgeId` values from [`DirectedGraph::add_edge`](crate::graph::DirectedGraph::add_edge).
    ///
    /// # Arguments
    ///
    /// * `index` - The raw edge index (0-based)
    #[must_use]
    #[inline]
    pub const fn new(index: usize) -> Self {
        EdgeId(index)
    }

    /// Returns the raw index value of this edge identifier.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EdgeId({})", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

impl From<usize> for EdgeId {
    #[inline]
    fn from(index: usize) -> Self {
        EdgeId(index)
    }
}

impl From<EdgeId> for usize {
    #[inline]
    fn from(edge: EdgeId) -> Self {
        edge.0
    }
}
