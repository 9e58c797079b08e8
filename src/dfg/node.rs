//! Data flow graph nodes and dependency collections.

use crate::dfg::SymbolicValue;
use crate::graph::NodeId;
use crate::instruction::VariableId;

/// The producers a consumed operand slot may have come from.
///
/// A dependency with no sources is "unknown": the slot's size is still
/// meaningful but its provenance is not (e.g. a value produced outside the
/// analyzed region without a declared external node).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dependency {
    /// The data flow nodes that may have produced the consumed value.
    pub sources: Vec<NodeId>,
    /// The byte size of the consumed value.
    pub size: u32,
}

impl Dependency {
    /// Builds a dependency from the origin set of a consumed symbolic value.
    #[must_use]
    pub fn from_value(value: &SymbolicValue) -> Self {
        Dependency {
            sources: value.origins().iter().copied().collect(),
            size: value.size(),
        }
    }

    /// Returns `true` if no producer is known.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.sources.is_empty()
    }

    /// Unions `value`'s origins into this dependency's source set.
    ///
    /// Returns `true` if the set changed.
    pub fn merge_value(&mut self, value: &SymbolicValue) -> bool {
        let mut changed = false;
        for &origin in value.origins() {
            if !self.sources.contains(&origin) {
                self.sources.push(origin);
                changed = true;
            }
        }
        changed
    }
}

/// One node of the data flow graph.
///
/// Either mirrors one instruction of the control flow graph or stands in for
/// a value entering the analyzed region from outside (a function argument, a
/// variable never written before its first read).
#[derive(Debug, Clone)]
pub enum DataFlowNode<I> {
    /// A node backed by an instruction.
    Instruction {
        /// The mirrored instruction.
        instruction: I,
        /// Per consumed stack slot (0 = first popped), who produced it.
        stack_dependencies: Vec<Dependency>,
        /// Per read variable, who produced its current value.
        variable_dependencies: Vec<(VariableId, Dependency)>,
        /// Nodes that consume a value this node produced.
        dependants: Vec<NodeId>,
    },
    /// A value entering from outside the analyzed region.
    External {
        /// The variable slot the external value stands in for.
        variable: VariableId,
        /// Nodes that consume the external value.
        dependants: Vec<NodeId>,
    },
}

impl<I> DataFlowNode<I> {
    /// Returns the nodes that consume a value this node produced.
    #[must_use]
    pub fn dependants(&self) -> &[NodeId] {
        match self {
            DataFlowNode::Instruction { dependants, .. }
            | DataFlowNode::External { dependants, .. } => dependants,
        }
    }

    pub(crate) fn dependants_mut(&mut self) -> &mut Vec<NodeId> {
        match self {
            DataFlowNode::Instruction { dependants, .. }
            | DataFlowNode::External { dependants, .. } => dependants,
        }
    }

    /// Returns the backed instruction, or `None` for external nodes.
    #[must_use]
    pub fn instruction(&self) -> Option<&I> {
        match self {
            DataFlowNode::Instruction { instruction, .. } => Some(instruction),
            DataFlowNode::External { .. } => None,
        }
    }

    /// Returns `true` for external-source nodes.
    #[must_use]
    pub fn is_external(&self) -> bool {
        matches!(self, DataFlowNode::External { .. })
    }

    /// Returns the per-slot stack dependencies, empty for external nodes.
    #[must_use]
    pub fn stack_dependencies(&self) -> &[Dependency] {
        match self {
            DataFlowNode::Instruction {
                stack_dependencies, ..
            } => stack_dependencies,
            DataFlowNode::External { .. } => &[],
        }
    }

    /// Returns the per-variable dependencies, empty for external nodes.
    #[must_use]
    pub fn variable_dependencies(&self) -> &[(VariableId, Dependency)] {
        match self {
            DataFlowNode::Instruction {
                variable_dependencies,
                ..
            } => variable_dependencies,
            DataFlowNode::External { .. } => &[],
        }
    }
}
