//! Basic blocks.

use crate::instruction::Instruction;

/// A maximal straight-line run of instructions.
///
/// Control enters only at the first instruction and leaves only after the
/// last. Instructions are stored in offset order and are contiguous: each
/// instruction starts where its predecessor ends.
#[derive(Debug, Clone)]
pub struct BasicBlock<I> {
    start: u64,
    instructions: Vec<I>,
}

impl<I: Instruction> BasicBlock<I> {
    /// Creates a block starting at `start` with the given instructions.
    ///
    /// The instruction list may be empty during construction; the builders
    /// never expose an empty block.
    #[must_use]
    pub fn new(start: u64, instructions: Vec<I>) -> Self {
        BasicBlock {
            start,
            instructions,
        }
    }

    /// Returns the offset of the block's first instruction.
    ///
    /// This is the block's identity: exactly one block starts at any given
    /// offset.
    #[must_use]
    pub fn start_offset(&self) -> u64 {
        self.start
    }

    /// Returns the block's instructions in offset order.
    #[must_use]
    pub fn instructions(&self) -> &[I] {
        &self.instructions
    }

    /// Returns the number of instructions in the block.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns `true` if the block holds no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Returns the block's last instruction, the only one that can transfer
    /// control out of the block.
    #[must_use]
    pub fn last(&self) -> Option<&I> {
        self.instructions.last()
    }

    /// Returns the total encoded size of the block in bytes.
    #[must_use]
    pub fn byte_size(&self) -> u64 {
        self.instructions
            .iter()
            .map(Instruction::size)
            .sum()
    }

    /// Returns the offset one past the block's last instruction.
    #[must_use]
    pub fn end_offset(&self) -> u64 {
        self.instructions
            .last()
            .map_or(self.start, |last| last.offset() + last.size())
    }

    /// Returns `true` if `offset` is the start of an instruction in this
    /// block.
    #[must_use]
    pub fn contains_offset(&self, offset: u64) -> bool {
        self.instructions
            .iter()
            .any(|instruction| instruction.offset() == offset)
    }
}
