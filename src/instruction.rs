//! The traits an architecture implements to drive analysis.
//!
//! `flowscope` never decodes bytes itself. A caller supplies three things:
//!
//! - an [`Instruction`] type describing one decoded instruction's footprint
//!   (offset, size, stack behavior, variable accesses),
//! - an [`InstructionProvider`] that materializes the instruction at a given
//!   offset on demand, and
//! - a [`SuccessorResolver`] that enumerates where control can go after an
//!   instruction, as typed [`SuccessorDescriptor`]s.
//!
//! Everything else — block discovery, edge typing, dominance, data
//! dependencies — is derived from these answers.

use crate::cfg::EdgeKind;
use crate::Result;
use std::fmt;

/// A strongly-typed identifier for a variable slot (local, argument, or any
/// other architecture-defined storage location).
///
/// The library only compares variable identifiers for equality; what a slot
/// *means* is the architecture's business.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VariableId(
    /// The raw slot index.
    pub usize,
);

impl VariableId {
    /// Creates a new variable identifier from a raw slot index.
    #[must_use]
    #[inline]
    pub const fn new(index: usize) -> Self {
        VariableId(index)
    }

    /// Returns the raw slot index.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VariableId({})", self.0)
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// One possible control transfer out of an instruction: the destination
/// offset plus the kind of edge the transfer represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuccessorDescriptor {
    /// The offset of the destination instruction.
    pub offset: u64,
    /// How control reaches the destination.
    pub kind: EdgeKind,
}

impl SuccessorDescriptor {
    /// Creates a descriptor for a transfer to `offset` via an edge of `kind`.
    #[must_use]
    pub const fn new(offset: u64, kind: EdgeKind) -> Self {
        SuccessorDescriptor { offset, kind }
    }

    /// Shorthand for a fall-through transfer to `offset`.
    #[must_use]
    pub const fn fall_through(offset: u64) -> Self {
        SuccessorDescriptor::new(offset, EdgeKind::FallThrough)
    }

    /// Shorthand for a conditional-branch transfer to `offset`.
    #[must_use]
    pub const fn conditional(offset: u64) -> Self {
        SuccessorDescriptor::new(offset, EdgeKind::Conditional)
    }

    /// Shorthand for an unconditional-jump transfer to `offset`.
    #[must_use]
    pub const fn unconditional(offset: u64) -> Self {
        SuccessorDescriptor::new(offset, EdgeKind::Unconditional)
    }
}

/// One decoded instruction's analysis-relevant footprint.
///
/// Implementations are typically thin views over a caller-owned decoded
/// form. The library clones instructions into basic blocks and data flow
/// nodes, so `Clone` should be cheap.
///
/// # Contract
///
/// - `offset() + size()` is the offset of the textually next instruction.
/// - `pop_count()` values are consumed from the evaluation stack before
///   `push_count()` values are produced.
/// - `reads()` and `writes()` cover variable slots only, not stack traffic.
pub trait Instruction: Clone {
    /// The offset of this instruction within its stream.
    fn offset(&self) -> u64;

    /// The encoded size of this instruction in bytes.
    fn size(&self) -> u64;

    /// The number of values this instruction pops from the evaluation stack.
    fn pop_count(&self) -> usize;

    /// The number of values this instruction pushes onto the evaluation stack.
    fn push_count(&self) -> usize;

    /// The variable slots this instruction reads.
    fn reads(&self) -> Vec<VariableId> {
        Vec::new()
    }

    /// The variable slots this instruction writes.
    fn writes(&self) -> Vec<VariableId> {
        Vec::new()
    }

    /// The size in bytes of the values this instruction produces (pushes or
    /// writes). Used to size the symbolic values that model them.
    fn value_size(&self) -> u32 {
        0
    }
}

/// Materializes instructions by offset, on demand.
///
/// The builders pull instructions lazily as traversal discovers offsets, so
/// providers backed by a streaming decoder never decode bytes control flow
/// cannot reach.
pub trait InstructionProvider {
    /// The instruction type this provider materializes.
    type Instruction: Instruction;

    /// Returns the instruction starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UndefinedInstruction`](crate::Error::UndefinedInstruction)
    /// when no instruction starts at `offset`. The builders propagate this
    /// unchanged, so a malformed branch target surfaces with the exact
    /// offending offset.
    fn instruction_at(&self, offset: u64) -> Result<Self::Instruction>;
}

/// Enumerates the possible control transfers out of an instruction.
///
/// Separated from [`InstructionProvider`] because successor knowledge can
/// come from a different place than decoding (e.g. an exception-handler table
/// contributing [`EdgeKind::Abnormal`] edges the instruction bytes alone do
/// not express).
pub trait SuccessorResolver<I: Instruction> {
    /// Returns every possible transfer out of `instruction`.
    ///
    /// An empty list marks a terminator (return, abort). The same destination
    /// may appear more than once with different kinds; the builders keep one
    /// edge per distinct `(offset, kind)` pair.
    ///
    /// # Errors
    ///
    /// Implementations may fail when the instruction's operands are malformed
    /// (e.g. a branch displacement pointing outside the stream).
    fn successors(&self, instruction: &I) -> Result<Vec<SuccessorDescriptor>>;
}
