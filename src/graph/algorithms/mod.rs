//! Graph algorithms shared by every analysis in the crate.
//!
//! All algorithms here are iterative with explicit work stacks. Control flow
//! graphs of obfuscated or machine-generated code routinely contain thousands
//! of blocks in a single chain, so recursion depth must not scale with graph
//! size.
//!
//! - [`traversal`] - depth-first visiting with caller hooks, plus postorder
//!   and reverse postorder sequences
//! - [`scc`] - Kosaraju strongly connected components and graph condensation
//! - [`topological`] - cycle-aware topological sorting
//! - [`dominators`] - dominator tree construction by reverse-postorder
//!   intersection

pub mod dominators;
pub mod scc;
pub mod topological;
pub mod traversal;

pub use dominators::{compute_dominators, DominatorTree};
pub use scc::{condensation, strongly_connected_components};
pub use topological::{topological_sort, topological_sort_by};
pub use traversal::{
    depth_first_visit, dfs, postorder, reverse_postorder, Control, Direction, Discovery,
};
