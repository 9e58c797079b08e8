//! Flow graph builders.
//!
//! Two construction strategies share one assembly backend:
//!
//! - [`StaticFlowGraphBuilder`] discovers blocks purely from each
//!   instruction's statically declared successors. Fast, no machine state.
//! - [`SymbolicFlowGraphBuilder`] abstractly executes instructions against a
//!   symbolic stack/variable state, producing a data flow graph alongside
//!   the CFG and supporting successors that depend on computed values.
//!
//! Both run a worklist over instruction offsets, record the block headers
//! and successor descriptors they discover, and hand the result to
//! [`assemble`] to group contiguous unheadered instructions into basic
//! blocks and wire the typed edges.

mod static_flow;
mod symbolic;

pub use static_flow::StaticFlowGraphBuilder;
pub use symbolic::{StateTransitioner, SymbolicFlowGraphBuilder, SymbolicFlowResult, Transition};

use crate::cfg::{BasicBlock, ControlFlowGraph};
use crate::instruction::{Instruction, SuccessorDescriptor};
use crate::{Error, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// The raw result of a builder's worklist pass: every instruction reached,
/// the block headers discovered, and each instruction's successor
/// descriptors.
///
/// Unreachable code is never visited and therefore never appears here unless
/// pre-declared as a known header.
#[derive(Debug, Clone)]
pub struct InstructionTraversal<I> {
    /// Offsets at which a basic block must start.
    pub headers: BTreeSet<u64>,
    /// Every visited instruction, keyed and ordered by offset.
    pub instructions: BTreeMap<u64, I>,
    /// Per visited instruction, its distinct successor descriptors.
    pub successors: HashMap<u64, Vec<SuccessorDescriptor>>,
}

impl<I> InstructionTraversal<I> {
    pub(crate) fn new(entry: u64, known_headers: &[u64]) -> Self {
        let mut headers: BTreeSet<u64> = known_headers.iter().copied().collect();
        headers.insert(entry);
        InstructionTraversal {
            headers,
            instructions: BTreeMap::new(),
            successors: HashMap::new(),
        }
    }

    /// Returns `true` if the instruction at `offset` was already visited.
    #[must_use]
    pub fn visited(&self, offset: u64) -> bool {
        self.instructions.contains_key(&offset)
    }
}

/// Groups a traversal's instructions into basic blocks and wires the control
/// edges, producing the final graph.
///
/// A block starts at every header and at every contiguity gap (an
/// instruction not starting where its predecessor ends). Only each block's
/// last instruction contributes edges; intermediate instructions are
/// straight-line by construction of the header rules.
///
/// # Errors
///
/// Returns [`Error::GraphError`] when a successor descriptor does not land
/// on a block start, or [`Error::UndefinedInstruction`] when the entry was
/// never visited.
pub(crate) fn assemble<I: Instruction>(
    entry: u64,
    traversal: &InstructionTraversal<I>,
) -> Result<ControlFlowGraph<I>> {
    let mut cfg = ControlFlowGraph::new();

    // Group sorted instructions into blocks.
    let mut current: Vec<I> = Vec::new();
    let mut current_start = entry;
    let mut previous_end: Option<u64> = None;

    for (&offset, instruction) in &traversal.instructions {
        let breaks_contiguity = previous_end.is_some_and(|end| end != offset);
        if (traversal.headers.contains(&offset) || breaks_contiguity) && !current.is_empty() {
            cfg.add_block(BasicBlock::new(current_start, std::mem::take(&mut current)))?;
        }
        if current.is_empty() {
            current_start = offset;
        }
        previous_end = Some(offset + instruction.size());
        current.push(instruction.clone());
    }
    if !current.is_empty() {
        cfg.add_block(BasicBlock::new(current_start, current))?;
    }

    let entry_node = cfg
        .node_at_offset(entry)
        .ok_or(Error::UndefinedInstruction { offset: entry })?;
    cfg.set_entry(entry_node)?;

    // Wire edges from each block's terminating instruction.
    for node in cfg.node_ids().collect::<Vec<_>>() {
        let last_offset = match cfg.block(node).and_then(BasicBlock::last) {
            Some(last) => last.offset(),
            None => continue,
        };
        let descriptors = match traversal.successors.get(&last_offset) {
            Some(descriptors) => descriptors.clone(),
            None => continue,
        };
        for descriptor in descriptors {
            let target = cfg.node_at_offset(descriptor.offset).ok_or_else(|| {
                Error::GraphError(format!(
                    "successor {:#x} of instruction {last_offset:#x} is not a block start",
                    descriptor.offset
                ))
            })?;
            cfg.add_edge(node, target, descriptor.kind)?;
        }
    }

    Ok(cfg)
}

/// Deduplicates successor descriptors by `(offset, kind)`, preserving the
/// resolver's order.
pub(crate) fn distinct_descriptors(
    descriptors: Vec<SuccessorDescriptor>,
) -> Vec<SuccessorDescriptor> {
    let mut distinct: Vec<SuccessorDescriptor> = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        if !distinct.contains(&descriptor) {
            distinct.push(descriptor);
        }
    }
    distinct
}

/// Applies the block-header promotion rules for one resolved instruction.
///
/// Every branched-to destination other than the literal next instruction
/// becomes a header. The next instruction itself becomes a header when the
/// instruction branches (more than one successor) or terminates (the next
/// instruction is not a successor at all).
pub(crate) fn promote_headers(
    headers: &mut BTreeSet<u64>,
    next: u64,
    descriptors: &[SuccessorDescriptor],
) {
    for descriptor in descriptors {
        if descriptor.offset != next {
            headers.insert(descriptor.offset);
        }
    }
    if descriptors.len() > 1 || !descriptors.iter().any(|d| d.offset == next) {
        headers.insert(next);
    }
}
