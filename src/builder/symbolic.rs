//! Symbolic control and data flow graph construction.
//!
//! Worklist abstract interpretation: every reachable instruction is executed
//! against a symbolic stack/variable state, join points merge incoming
//! states into a per-offset resident state, and loop bodies are revisited
//! until their resident state stops changing. Termination is guaranteed by
//! the monotonic merge: origin sets only grow and are bounded by the number
//! of data flow nodes.

use crate::builder::{assemble, distinct_descriptors, promote_headers, InstructionTraversal};
use crate::cfg::ControlFlowGraph;
use crate::dfg::{DataFlowGraph, SymbolicValue};
use crate::graph::NodeId;
use crate::instruction::{Instruction, InstructionProvider, SuccessorDescriptor};
use crate::state::ProgramState;
use crate::Result;
use std::collections::HashMap;

/// One resulting control transfer out of a symbolically executed
/// instruction: the state the destination starts in, plus where it goes.
#[derive(Debug, Clone)]
pub struct Transition {
    /// The program state at the destination.
    pub state: ProgramState,
    /// The destination and edge kind.
    pub successor: SuccessorDescriptor,
}

impl Transition {
    /// Creates a transition carrying `state` to `successor`.
    #[must_use]
    pub fn new(state: ProgramState, successor: SuccessorDescriptor) -> Self {
        Transition { state, successor }
    }
}

/// Resolves where control goes after an instruction, given the symbolic
/// state the instruction produced.
///
/// This is the architecture-specific half of symbolic construction. The
/// builder itself handles the generic stack/variable execution (pops,
/// pushes, reads, writes) and dependency recording; the transitioner only
/// decides the successors, consulting the post-execution state when a
/// target is computed (a branch whose condition or destination comes from
/// dataflow).
pub trait StateTransitioner<I: Instruction> {
    /// Returns every possible transition out of `instruction`.
    ///
    /// `state` is the symbolic state after the instruction's stack and
    /// variable effects were applied. Most transitions forward it
    /// unchanged; a transitioner may refine per-successor copies (e.g.
    /// narrowing a value on the taken arm). An empty list marks a
    /// terminator.
    ///
    /// # Errors
    ///
    /// Implementations fail when the instruction's operands are malformed
    /// or a computed target cannot be an instruction offset.
    fn transitions(&self, state: ProgramState, instruction: &I) -> Result<Vec<Transition>>;
}

/// The output of a symbolic build: the control flow graph plus the data
/// flow graph accumulated while executing it.
#[derive(Debug)]
pub struct SymbolicFlowResult<I> {
    /// The reconstructed control flow graph.
    pub cfg: ControlFlowGraph<I>,
    /// Operand provenance for every analyzed instruction.
    pub dfg: DataFlowGraph<I>,
}

/// Builds a control flow graph and data flow graph simultaneously by
/// abstract interpretation.
///
/// Use this instead of
/// [`StaticFlowGraphBuilder`](crate::builder::StaticFlowGraphBuilder) when
/// successors cannot be determined without simulating operand state, or
/// when operand provenance is wanted as an output in its own right.
pub struct SymbolicFlowGraphBuilder<'a, P, T> {
    provider: &'a P,
    transitioner: &'a T,
}

impl<'a, P, T> SymbolicFlowGraphBuilder<'a, P, T>
where
    P: InstructionProvider,
    T: StateTransitioner<P::Instruction>,
{
    /// Creates a builder over the given provider and transitioner.
    pub fn new(provider: &'a P, transitioner: &'a T) -> Self {
        SymbolicFlowGraphBuilder {
            provider,
            transitioner,
        }
    }

    /// Runs the abstract interpretation to its fixed point and assembles
    /// the graphs.
    ///
    /// `known_headers` pre-declares additional block starts and traversal
    /// roots, each entered with an empty symbolic state.
    ///
    /// # Errors
    ///
    /// Propagates provider and transitioner failures, and raises
    /// [`Error::StackImbalance`](crate::Error::StackImbalance) when
    /// converging paths disagree on stack depth or an instruction pops more
    /// than is available.
    pub fn build(
        &self,
        entry: u64,
        known_headers: &[u64],
    ) -> Result<SymbolicFlowResult<P::Instruction>> {
        let mut traversal: InstructionTraversal<P::Instruction> =
            InstructionTraversal::new(entry, known_headers);
        let mut dfg: DataFlowGraph<P::Instruction> = DataFlowGraph::new();
        let mut resident: HashMap<u64, ProgramState> = HashMap::new();

        let mut agenda: Vec<(u64, ProgramState)> = Vec::with_capacity(known_headers.len() + 1);
        agenda.push((entry, ProgramState::new()));
        for &header in known_headers {
            agenda.push((header, ProgramState::new()));
        }

        while let Some((offset, incoming)) = agenda.pop() {
            // Merge into the resident state; an unchanged merge is the
            // fixed-point stopping condition for loop bodies.
            let mut state = match resident.entry(offset) {
                std::collections::hash_map::Entry::Occupied(mut entry) => {
                    if !entry.get_mut().merge_with(&incoming, offset)? {
                        continue;
                    }
                    entry.get().clone()
                }
                std::collections::hash_map::Entry::Vacant(entry) => entry.insert(incoming).clone(),
            };

            let instruction = match traversal.instructions.get(&offset) {
                Some(instruction) => instruction.clone(),
                None => {
                    let instruction = self.provider.instruction_at(offset)?;
                    traversal.instructions.insert(offset, instruction.clone());
                    instruction
                }
            };

            let node = dfg.ensure_instruction_node(&instruction);
            self.execute(&mut dfg, &mut state, node, &instruction)?;

            let transitions = self.transitioner.transitions(state, &instruction)?;
            let descriptors =
                distinct_descriptors(transitions.iter().map(|t| t.successor).collect());
            let next = instruction.offset() + instruction.size();
            promote_headers(&mut traversal.headers, next, &descriptors);
            traversal.successors.insert(offset, descriptors);

            for transition in transitions {
                agenda.push((transition.successor.offset, transition.state));
            }
        }

        let cfg = assemble(entry, &traversal)?;
        Ok(SymbolicFlowResult { cfg, dfg })
    }

    /// Applies one instruction's declared stack and variable effects to
    /// `state`, recording every dependency in the data flow graph.
    fn execute(
        &self,
        dfg: &mut DataFlowGraph<P::Instruction>,
        state: &mut ProgramState,
        node: NodeId,
        instruction: &P::Instruction,
    ) -> Result<()> {
        let offset = instruction.offset();

        for slot in 0..instruction.pop_count() {
            let value = state.pop(offset)?;
            dfg.record_stack_dependency(node, slot, &value);
        }

        for variable in instruction.reads() {
            let value = match state.variable(variable) {
                Some(value) => value.clone(),
                None => {
                    // Read before any write: the value enters from outside.
                    let external = dfg.external_for_variable(variable);
                    let value = SymbolicValue::new(external, instruction.value_size());
                    state.set_variable(variable, value.clone());
                    value
                }
            };
            dfg.record_variable_dependency(node, variable, &value);
        }

        for variable in instruction.writes() {
            state.set_variable(variable, SymbolicValue::new(node, instruction.value_size()));
        }

        for _ in 0..instruction.push_count() {
            state.push(SymbolicValue::new(node, instruction.value_size()));
        }

        Ok(())
    }
}
