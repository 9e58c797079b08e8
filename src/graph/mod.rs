//! Generic directed graph arena and the algorithms that run on it.
//!
//! This module provides [`DirectedGraph`], an arena-based directed graph with
//! stable integer identifiers, plus the adjacency traits ([`Successors`],
//! [`Predecessors`], [`RootedGraph`]) that let the algorithms in
//! [`algorithms`] run against any graph-shaped structure.
//!
//! # Design
//!
//! Nodes and edges live in flat vectors and are addressed by [`NodeId`] and
//! [`EdgeId`] index newtypes. Cyclic structures (control flow graphs, data
//! flow graphs) reference each other through these keys rather than through
//! `Rc`/`RefCell` webs, so ownership stays trivial and traversal never fights
//! the borrow checker.
//!
//! Nodes and edges cannot be removed; identifiers stay valid for the lifetime
//! of the graph, which lets analyses store per-node results in plain vectors
//! indexed by [`NodeId::index`].
//!
//! # Examples
//!
//! ```rust,ignore
//! use flowscope::graph::DirectedGraph;
//!
//! let mut graph: DirectedGraph<&str, ()> = DirectedGraph::new();
//! let a = graph.add_node("entry");
//! let b = graph.add_node("exit");
//! graph.add_edge(a, b, ())?;
//!
//! assert_eq!(graph.successors(a).collect::<Vec<_>>(), vec![b]);
//! # Ok::<(), flowscope::Error>(())
//! ```

pub mod algorithms;
mod edge;
mod node;

pub use edge::EdgeId;
pub use node::NodeId;

use crate::{Error, Result};

/// Internal storage for a single edge: its endpoints plus the caller's payload.
#[derive(Debug, Clone)]
struct EdgeRecord<E> {
    source: NodeId,
    target: NodeId,
    data: E,
}

/// An arena-based directed graph with stable integer identifiers.
///
/// `N` is the per-node payload type, `E` the per-edge payload type. Adjacency
/// is maintained in both directions, so successor and predecessor queries are
/// both O(degree).
///
/// Parallel edges and self-loops are allowed; it is the caller's layer (e.g.
/// the control flow graph) that imposes stricter shape rules.
#[derive(Debug, Clone)]
pub struct DirectedGraph<N, E> {
    nodes: Vec<N>,
    edges: Vec<EdgeRecord<E>>,
    outgoing: Vec<Vec<EdgeId>>,
    incoming: Vec<Vec<EdgeId>>,
}

impl<N, E> Default for DirectedGraph<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, E> DirectedGraph<N, E> {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        DirectedGraph {
            nodes: Vec::new(),
            edges: Vec::new(),
            outgoing: Vec::new(),
            incoming: Vec::new(),
        }
    }

    /// Creates an empty graph with capacity reserved for `nodes` nodes and
    /// `edges` edges.
    #[must_use]
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        DirectedGraph {
            nodes: Vec::with_capacity(nodes),
            edges: Vec::with_capacity(edges),
            outgoing: Vec::with_capacity(nodes),
            incoming: Vec::with_capacity(nodes),
        }
    }

    /// Adds a node carrying `data` and returns its identifier.
    ///
    /// Identifiers are assigned sequentially from 0 and never invalidated.
    pub fn add_node(&mut self, data: N) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(data);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        id
    }

    /// Adds a directed edge from `source` to `target` carrying `data`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GraphError`] if either endpoint does not belong to
    /// this graph.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, data: E) -> Result<EdgeId> {
        if source.index() >= self.nodes.len() {
            return Err(Error::GraphError(format!(
                "edge source {source} is not a node of this graph"
            )));
        }
        if target.index() >= self.nodes.len() {
            return Err(Error::GraphError(format!(
                "edge target {target} is not a node of this graph"
            )));
        }

        let id = EdgeId::new(self.edges.len());
        self.edges.push(EdgeRecord {
            source,
            target,
            data,
        });
        self.outgoing[source.index()].push(id);
        self.incoming[target.index()].push(id);
        Ok(id)
    }

    /// Returns the payload of `node`, or `None` if the identifier does not
    /// belong to this graph.
    #[must_use]
    pub fn node(&self, node: NodeId) -> Option<&N> {
        self.nodes.get(node.index())
    }

    /// Returns a mutable reference to the payload of `node`.
    pub fn node_mut(&mut self, node: NodeId) -> Option<&mut N> {
        self.nodes.get_mut(node.index())
    }

    /// Returns the payload of `edge`, or `None` if the identifier does not
    /// belong to this graph.
    #[must_use]
    pub fn edge(&self, edge: EdgeId) -> Option<&E> {
        self.edges.get(edge.index()).map(|record| &record.data)
    }

    /// Returns the `(source, target)` endpoints of `edge`.
    #[must_use]
    pub fn edge_endpoints(&self, edge: EdgeId) -> Option<(NodeId, NodeId)> {
        self.edges
            .get(edge.index())
            .map(|record| (record.source, record.target))
    }

    /// Returns the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if the graph contains no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns an iterator over all node identifiers in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::new)
    }

    /// Returns an iterator over the successor nodes of `node`.
    ///
    /// Parallel edges yield the same successor more than once. An unknown
    /// identifier yields an empty iterator.
    pub fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.outgoing
            .get(node.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(|edge| self.edges[edge.index()].target)
    }

    /// Returns an iterator over the predecessor nodes of `node`.
    pub fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.incoming
            .get(node.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(|edge| self.edges[edge.index()].source)
    }

    /// Returns an iterator over the outgoing edges of `node` as
    /// `(edge id, payload)` pairs.
    pub fn outgoing_edges(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, &E)> + '_ {
        self.outgoing
            .get(node.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(|edge| (*edge, &self.edges[edge.index()].data))
    }

    /// Returns an iterator over the incoming edges of `node` as
    /// `(edge id, payload)` pairs.
    pub fn incoming_edges(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, &E)> + '_ {
        self.incoming
            .get(node.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(|edge| (*edge, &self.edges[edge.index()].data))
    }

    /// Returns the out-degree of `node`.
    #[must_use]
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.outgoing.get(node.index()).map_or(0, Vec::len)
    }

    /// Returns the in-degree of `node`.
    #[must_use]
    pub fn in_degree(&self, node: NodeId) -> usize {
        self.incoming.get(node.index()).map_or(0, Vec::len)
    }
}

/// Forward adjacency: the minimal view the traversal algorithms need.
///
/// Implemented by [`DirectedGraph`] and by wrapper types (such as the control
/// flow graph) that want the generic algorithms without exposing their arena.
pub trait Successors {
    /// Returns the number of nodes addressable in this graph.
    ///
    /// Node identifiers are assumed to be dense in `0..node_count()`.
    fn node_count(&self) -> usize;

    /// Returns an iterator over the successors of `node`.
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_;
}

/// Backward adjacency, required by algorithms that walk edges against their
/// direction (reverse traversal, Kosaraju's second pass, dominators).
pub trait Predecessors: Successors {
    /// Returns an iterator over the predecessors of `node`.
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_;
}

/// A graph with a distinguished entry node.
pub trait RootedGraph: Successors {
    /// Returns the entry node from which reachability is measured.
    fn entry(&self) -> NodeId;
}

impl<N, E> Successors for DirectedGraph<N, E> {
    fn node_count(&self) -> usize {
        self.node_count()
    }

    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.successors(node)
    }
}

impl<N, E> Predecessors for DirectedGraph<N, E> {
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.predecessors(node)
    }
}
