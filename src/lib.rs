// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]

//! # flowscope
//!
//! An architecture-agnostic library for reconstructing control flow graphs (CFGs)
//! and data flow graphs (DFGs) from linear bytecode instruction streams.
//!
//! `flowscope` knows nothing about any concrete instruction set. Callers describe
//! their architecture through a small set of traits — how big each instruction is,
//! how many values it pops from and pushes to an evaluation stack, which variables
//! it reads and writes, and where control can go next — and the library
//! reconstructs the program's structure: basic blocks, typed control edges,
//! dominance, loops, and the provenance of every operand every instruction
//! consumes.
//!
//! ## Features
//!
//! - **🧱 Generic graph core** - Arena-based directed graphs with stable integer
//!   node/edge identifiers, shared by every analysis
//! - **🔍 Graph algorithms** - Iterative DFS traversal with visitor hooks,
//!   Kosaraju strongly connected components, cycle-aware topological sorting,
//!   and dominator trees with direct/indirect child classification
//! - **⚡ Static CFG construction** - Basic-block discovery driven purely by
//!   each instruction's statically declared successors
//! - **🧮 Symbolic CFG+DFG construction** - Worklist abstract interpretation over
//!   a symbolic stack/variable state that resolves per-instruction data
//!   dependencies, with state merging at join points and fixed-point iteration
//!   across loop back-edges
//! - **🛡️ Structured errors** - Every failure carries the offset and context
//!   needed to build a precise diagnostic
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flowscope::prelude::*;
//!
//! // Implement Instruction + InstructionProvider + SuccessorResolver for
//! // your architecture, then:
//! let builder = StaticFlowGraphBuilder::new(&provider, &resolver);
//! let cfg = builder.build(0, &[])?;
//!
//! println!("{} basic blocks", cfg.block_count());
//! for node in cfg.reverse_postorder() {
//!     let block = cfg.block(node).unwrap();
//!     println!("block at offset {:#x}", block.start_offset());
//! }
//! # Ok::<(), flowscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `flowscope` is organized into several key modules:
//!
//! - [`graph`] - Generic directed graph arena and the algorithms that run on it
//! - [`instruction`] - The traits an architecture implements to drive analysis
//! - [`cfg`] - Basic blocks, typed control edges, regions, and the
//!   [`ControlFlowGraph`](cfg::ControlFlowGraph)
//! - [`dfg`] - Symbolic values, dependency collections, and the
//!   [`DataFlowGraph`](dfg::DataFlowGraph)
//! - [`state`] - The symbolic machine state used during abstract interpretation
//! - [`builder`] - The static and symbolic flow graph builders
//!
//! ## Scope
//!
//! The library is a pure in-memory computation core. It performs no I/O, spawns
//! no threads, and resolves no indirect branch targets on its own — concrete
//! decoding, emulation, serialization, and hosting concerns live in the caller.
//! Builds against the *same* graph must not run concurrently; independent
//! instruction streams can be analyzed from separate threads because every
//! build allocates its own CFG, DFG, and visited set.

pub mod builder;
pub mod cfg;
pub mod dfg;
mod error;
pub mod graph;
pub mod instruction;
pub mod state;

pub use error::Error;

/// Result type used throughout the crate, with [`Error`] as the failure variant.
pub type Result<T> = std::result::Result<T, Error>;

/// Convenient re-exports of the most commonly used types and traits.
///
/// ```rust,ignore
/// use flowscope::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        builder::{
            StateTransitioner, StaticFlowGraphBuilder, SymbolicFlowGraphBuilder,
            SymbolicFlowResult, Transition,
        },
        cfg::{BasicBlock, CfgEdge, ControlFlowGraph, EdgeKind, RegionId},
        dfg::{DataFlowGraph, DataFlowNode, SymbolicValue},
        graph::{DirectedGraph, EdgeId, NodeId},
        instruction::{
            Instruction, InstructionProvider, SuccessorDescriptor, SuccessorResolver, VariableId,
        },
        state::ProgramState,
        Error, Result,
    };
}
