//! The symbolic machine state used during abstract interpretation.
//!
//! One [`ProgramState`] models the evaluation stack and variable slots at a
//! single program point. States are created per instruction being processed,
//! merged into a per-offset resident state when control paths converge, and
//! discarded once the build finishes; their useful residue is the data flow
//! graph they produced along the way.

use crate::dfg::SymbolicValue;
use crate::instruction::VariableId;
use crate::{Error, Result};
use std::collections::HashMap;

/// Symbolic evaluation stack plus variable state at one program point.
#[derive(Debug, Clone, Default)]
pub struct ProgramState {
    stack: Vec<SymbolicValue>,
    variables: HashMap<VariableId, SymbolicValue>,
}

impl ProgramState {
    /// Creates an empty state: no stack values, no variables written.
    #[must_use]
    pub fn new() -> Self {
        ProgramState::default()
    }

    /// Pushes `value` onto the evaluation stack.
    pub fn push(&mut self, value: SymbolicValue) {
        self.stack.push(value);
    }

    /// Pops the top of the evaluation stack.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StackImbalance`] when the stack is empty, carrying
    /// `offset` so the caller can point at the instruction that over-popped.
    pub fn pop(&mut self, offset: u64) -> Result<SymbolicValue> {
        self.stack.pop().ok_or(Error::StackImbalance {
            offset,
            expected: 1,
            actual: 0,
        })
    }

    /// Returns the current stack depth.
    #[must_use]
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns the stack value at `slot` counted from the top (0 = top).
    #[must_use]
    pub fn peek(&self, slot: usize) -> Option<&SymbolicValue> {
        self.stack.len().checked_sub(slot + 1).map(|i| &self.stack[i])
    }

    /// Returns the current value of `variable`, or `None` if never written
    /// on any path reaching this point.
    #[must_use]
    pub fn variable(&self, variable: VariableId) -> Option<&SymbolicValue> {
        self.variables.get(&variable)
    }

    /// Replaces the value of `variable`.
    pub fn set_variable(&mut self, variable: VariableId, value: SymbolicValue) {
        self.variables.insert(variable, value);
    }

    /// Merges `other` into this state.
    ///
    /// Stack slots are merged pairwise; variables are unioned per identity,
    /// with a variable absent on one side treated as that side still holding
    /// the architecture's default value (so the incoming origins are adopted
    /// as-is). Returns `true` if anything changed, which is the symbolic
    /// builder's fixed-point signal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StackImbalance`] when the two stacks disagree on
    /// depth; `offset` identifies the convergence point for diagnostics.
    pub fn merge_with(&mut self, other: &ProgramState, offset: u64) -> Result<bool> {
        if self.stack.len() != other.stack.len() {
            return Err(Error::StackImbalance {
                offset,
                expected: self.stack.len(),
                actual: other.stack.len(),
            });
        }

        let mut changed = false;
        for (slot, incoming) in self.stack.iter_mut().zip(&other.stack) {
            changed |= slot.merge_with(incoming);
        }
        for (&variable, incoming) in &other.variables {
            match self.variables.get_mut(&variable) {
                Some(existing) => changed |= existing.merge_with(incoming),
                None => {
                    self.variables.insert(variable, incoming.clone());
                    changed = true;
                }
            }
        }
        Ok(changed)
    }
}
