//! Control flow graph model: basic blocks, typed edges, regions, dominance.
//!
//! The [`ControlFlowGraph`] wraps the generic graph arena with
//! bytecode-specific structure: every node is a [`BasicBlock`] identified by
//! its start offset, every edge carries an [`EdgeKind`], and lazily computed
//! dominator and loop information hangs off the graph. Graphs are produced
//! by the builders in [`crate::builder`]; callers normally only read them.

mod block;
mod edge;
mod graph;
mod region;

pub use block::BasicBlock;
pub use edge::{CfgEdge, EdgeKind};
pub use graph::{ControlFlowGraph, NaturalLoop};
pub use region::RegionId;
