//! Data flow graph model.
//!
//! Records, for every analyzed instruction, where each of its consumed
//! operands may have come from. Nodes are instruction-backed or external
//! sources; dependencies are kept per consumed stack slot and per read
//! variable; producers know their consumers through dependant links.
//!
//! The graph is produced as a side effect of symbolic flow graph
//! construction; see [`builder::SymbolicFlowGraphBuilder`](crate::builder::SymbolicFlowGraphBuilder).

mod graph;
mod node;
mod value;

pub use graph::DataFlowGraph;
pub use node::{DataFlowNode, Dependency};
pub use value::SymbolicValue;
