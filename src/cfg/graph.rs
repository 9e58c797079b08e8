//! The control flow graph.

use crate::cfg::{BasicBlock, CfgEdge, EdgeKind, RegionId};
use crate::graph::{
    algorithms::{
        compute_dominators, postorder, reverse_postorder, topological_sort_by, DominatorTree,
    },
    DirectedGraph, EdgeId, NodeId, Predecessors, RootedGraph, Successors,
};
use crate::instruction::Instruction;
use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::OnceLock;

use super::region::RegionTree;

/// A natural loop: a back-edge target plus every node that can reach the
/// back-edge source without passing through the header.
#[derive(Debug, Clone)]
pub struct NaturalLoop {
    /// The loop header (the back-edge's target, which dominates the source).
    pub header: NodeId,
    /// All nodes in the loop body, header included.
    pub body: Vec<NodeId>,
}

impl NaturalLoop {
    /// Returns `true` if `node` belongs to this loop.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.body.contains(&node)
    }
}

/// A control flow graph over basic blocks of instructions of type `I`.
///
/// Nodes wrap exactly one [`BasicBlock`]; edges carry a [`CfgEdge`] recording
/// the transfer kind. The graph owns its blocks exclusively and enforces the
/// structural invariant that a node has at most one outgoing fall-through
/// edge.
///
/// Dominators and natural loops are computed lazily on first use and cached;
/// the graph is immutable once a builder hands it out, so the cache never
/// goes stale.
#[derive(Debug)]
pub struct ControlFlowGraph<I> {
    graph: DirectedGraph<BasicBlock<I>, CfgEdge>,
    entry: NodeId,
    /// Block start offset to node.
    offsets: HashMap<u64, NodeId>,
    regions: RegionTree,
    dominators: OnceLock<DominatorTree>,
    loops: OnceLock<Vec<NaturalLoop>>,
}

impl<I: Instruction> ControlFlowGraph<I> {
    /// Creates an empty graph. The first block added becomes the entry.
    #[must_use]
    pub fn new() -> Self {
        ControlFlowGraph {
            graph: DirectedGraph::new(),
            entry: NodeId::new(0),
            offsets: HashMap::new(),
            regions: RegionTree::new(0),
            dominators: OnceLock::new(),
            loops: OnceLock::new(),
        }
    }

    /// Adds a basic block and returns its node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GraphError`] if a block already starts at the same
    /// offset.
    pub fn add_block(&mut self, block: BasicBlock<I>) -> Result<NodeId> {
        let start = block.start_offset();
        if self.offsets.contains_key(&start) {
            return Err(Error::GraphError(format!(
                "a basic block already starts at offset {start:#x}"
            )));
        }
        let node = self.graph.add_node(block);
        self.offsets.insert(start, node);
        self.regions.grow(self.graph.node_count());
        Ok(node)
    }

    /// Adds a typed control edge from `source` to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GraphError`] if either endpoint is unknown or if
    /// `source` would end up with a second fall-through edge.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, kind: EdgeKind) -> Result<EdgeId> {
        if kind.is_fall_through()
            && self
                .graph
                .outgoing_edges(source)
                .any(|(_, edge)| edge.kind.is_fall_through())
        {
            return Err(Error::GraphError(format!(
                "node {source} already has a fall-through edge"
            )));
        }
        let target_offset = self
            .graph
            .node(target)
            .map(BasicBlock::start_offset)
            .ok_or_else(|| Error::GraphError(format!("edge target {target} is not a node")))?;
        self.graph
            .add_edge(source, target, CfgEdge::new(target_offset, kind))
    }

    /// Returns the entry node.
    #[must_use]
    pub fn entry(&self) -> NodeId {
        self.entry
    }

    /// Designates `node` as the entry.
    ///
    /// Must be called before any lazy analysis (dominators, loops) runs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GraphError`] if `node` is not a node of this graph.
    pub fn set_entry(&mut self, node: NodeId) -> Result<()> {
        if self.graph.node(node).is_none() {
            return Err(Error::GraphError(format!("entry {node} is not a node")));
        }
        self.entry = node;
        Ok(())
    }

    /// Returns the number of basic blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of control edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns the basic block wrapped by `node`.
    #[must_use]
    pub fn block(&self, node: NodeId) -> Option<&BasicBlock<I>> {
        self.graph.node(node)
    }

    /// Returns the node whose block starts at `offset`.
    #[must_use]
    pub fn node_at_offset(&self, offset: u64) -> Option<NodeId> {
        self.offsets.get(&offset).copied()
    }

    /// Returns an iterator over all nodes.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_ids()
    }

    /// Returns an iterator over the successors of `node`.
    pub fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.successors(node)
    }

    /// Returns an iterator over the predecessors of `node`.
    pub fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.predecessors(node)
    }

    /// Returns the outgoing edges of `node` with their payloads.
    pub fn outgoing_edges(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, &CfgEdge)> + '_ {
        self.graph.outgoing_edges(node)
    }

    /// Returns the `(source, target)` endpoints of `edge`.
    #[must_use]
    pub fn edge_endpoints(&self, edge: EdgeId) -> Option<(NodeId, NodeId)> {
        self.graph.edge_endpoints(edge)
    }

    /// Returns the underlying directed graph, for running generic algorithms
    /// directly.
    #[must_use]
    pub fn graph(&self) -> &DirectedGraph<BasicBlock<I>, CfgEdge> {
        &self.graph
    }

    /// Returns the dominator tree, computing it on first use.
    pub fn dominators(&self) -> &DominatorTree {
        self.dominators
            .get_or_init(|| compute_dominators(&self.graph, self.entry))
    }

    /// Returns `true` if `a` dominates `b`.
    #[must_use]
    pub fn dominates(&self, a: NodeId, b: NodeId) -> bool {
        self.dominators().dominates(a, b)
    }

    /// Returns the immediate dominator of `node`.
    #[must_use]
    pub fn immediate_dominator(&self, node: NodeId) -> Option<NodeId> {
        self.dominators().immediate_dominator(node)
    }

    /// Returns the nodes reachable from the entry in reverse postorder.
    #[must_use]
    pub fn reverse_postorder(&self) -> Vec<NodeId> {
        reverse_postorder(&self.graph, self.entry)
    }

    /// Returns the nodes reachable from the entry in postorder.
    #[must_use]
    pub fn postorder(&self) -> Vec<NodeId> {
        postorder(&self.graph, self.entry)
    }

    /// Returns the natural loops of the graph, computing them on first use.
    ///
    /// One loop per back-edge target: an edge `s -> h` where `h` dominates
    /// `s`. Back-edges sharing a header are folded into a single loop.
    pub fn loops(&self) -> &[NaturalLoop] {
        self.loops.get_or_init(|| self.compute_loops())
    }

    /// Returns the innermost (smallest) loop containing `node`, if any.
    #[must_use]
    pub fn innermost_loop(&self, node: NodeId) -> Option<&NaturalLoop> {
        self.loops()
            .iter()
            .filter(|l| l.contains(node))
            .min_by_key(|l| l.body.len())
    }

    fn compute_loops(&self) -> Vec<NaturalLoop> {
        let dominators = self.dominators();
        let mut bodies: HashMap<NodeId, Vec<NodeId>> = HashMap::new();

        for source in self.graph.node_ids() {
            for header in self.graph.successors(source) {
                if !dominators.dominates(header, source) {
                    continue;
                }
                // Natural loop body: walk predecessors back from the
                // back-edge source, stopping at the header.
                let body = bodies.entry(header).or_insert_with(|| vec![header]);
                let mut stack = vec![source];
                while let Some(node) = stack.pop() {
                    if body.contains(&node) {
                        continue;
                    }
                    body.push(node);
                    stack.extend(self.graph.predecessors(node));
                }
            }
        }

        let mut loops: Vec<NaturalLoop> = bodies
            .into_iter()
            .map(|(header, mut body)| {
                body.sort();
                NaturalLoop { header, body }
            })
            .collect();
        loops.sort_by_key(|l| l.header);
        loops
    }

    /// Returns the dominator-tree children of `node` reordered for
    /// structured linearization:
    ///
    /// 1. nodes with no outgoing edges sort last,
    /// 2. the node reached by `node`'s fall-through edge sorts first,
    /// 3. otherwise original relative order is preserved.
    #[must_use]
    pub fn structured_children(&self, node: NodeId) -> Vec<NodeId> {
        let children = self.dominators().children(node);

        let fall_through_target = self
            .graph
            .outgoing_edges(node)
            .find(|(_, edge)| edge.kind.is_fall_through())
            .and_then(|(edge, _)| self.graph.edge_endpoints(edge))
            .map(|(_, target)| target);

        let mut ordered = children;
        ordered.sort_by_key(|&child| {
            let is_exit = self.graph.successors(child).next().is_none();
            let is_fall_through = fall_through_target == Some(child);
            // Stable sort keeps the original relative order within a class.
            (is_exit, !is_fall_through)
        });
        ordered
    }

    /// Returns a structured linearization of all reachable nodes: a
    /// topological order over the dominator tree using
    /// [`structured_children`](Self::structured_children) as the child
    /// lister.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::CycleDetected`] only if the dominator tree is
    /// malformed, which cannot happen for graphs built by this crate.
    pub fn structured_order(&self) -> Result<Vec<NodeId>> {
        topological_sort_by(
            self.graph.node_count(),
            &[self.entry],
            |node| self.structured_children(node),
            false,
        )
    }

    /// Creates a new region, optionally nested inside `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RegionError`] if `parent` does not exist.
    pub fn add_region(&mut self, parent: Option<RegionId>) -> Result<RegionId> {
        self.regions.add_region(parent)
    }

    /// Adds `node` to `region`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RegionError`] if the node does not belong to this
    /// graph or already belongs to a different region.
    pub fn add_node_to_region(&mut self, region: RegionId, node: NodeId) -> Result<()> {
        self.regions.add_node(region, node)
    }

    /// Returns the region owning `node`, if any.
    #[must_use]
    pub fn region_of(&self, node: NodeId) -> Option<RegionId> {
        self.regions.region_of(node)
    }

    /// Returns the parent of `region`, or `None` for top-level regions.
    #[must_use]
    pub fn region_parent(&self, region: RegionId) -> Option<RegionId> {
        self.regions.parent(region)
    }

    /// Returns the child regions nested inside `region`.
    #[must_use]
    pub fn region_children(&self, region: RegionId) -> &[RegionId] {
        self.regions.children(region)
    }

    /// Returns the member nodes of `region`.
    #[must_use]
    pub fn region_nodes(&self, region: RegionId) -> &[NodeId] {
        self.regions.nodes(region)
    }

    /// Returns the number of regions.
    #[must_use]
    pub fn region_count(&self) -> usize {
        self.regions.region_count()
    }

    /// Renders the graph in Graphviz DOT format, one record per block.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph cfg {\n    node [shape=box];\n");
        for node in self.graph.node_ids() {
            if let Some(block) = self.graph.node(node) {
                let _ = writeln!(
                    out,
                    "    {} [label=\"{:#x} ({} instructions)\"];",
                    node.index(),
                    block.start_offset(),
                    block.len()
                );
            }
        }
        for node in self.graph.node_ids() {
            for (edge_id, edge) in self.graph.outgoing_edges(node) {
                if let Some((source, target)) = self.graph.edge_endpoints(edge_id) {
                    let _ = writeln!(
                        out,
                        "    {} -> {} [label=\"{}\"];",
                        source.index(),
                        target.index(),
                        edge.kind
                    );
                }
            }
        }
        out.push_str("}\n");
        out
    }
}

impl<I: Instruction> Default for ControlFlowGraph<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Instruction> Successors for ControlFlowGraph<I> {
    fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.successors(node)
    }
}

impl<I: Instruction> Predecessors for ControlFlowGraph<I> {
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.predecessors(node)
    }
}

impl<I: Instruction> RootedGraph for ControlFlowGraph<I> {
    fn entry(&self) -> NodeId {
        self.entry
    }
}
