//! The data flow graph.

use crate::dfg::{DataFlowNode, Dependency, SymbolicValue};
use crate::graph::NodeId;
use crate::instruction::{Instruction, VariableId};
use std::collections::HashMap;
use std::fmt::Write as _;

/// A data flow graph: which instruction's output feeds which instruction's
/// input.
///
/// Built as a side effect of symbolic flow graph construction. Nodes are
/// either instruction-backed (one node per analyzed instruction, keyed by
/// offset) or external sources (one node per variable read before any
/// write). Dependencies point from consumer to producers; each producer also
/// records its consumers as dependants, so the graph can be walked in either
/// direction.
#[derive(Debug, Clone, Default)]
pub struct DataFlowGraph<I> {
    nodes: Vec<DataFlowNode<I>>,
    /// Instruction offset to node, for dedup across loop revisits.
    by_offset: HashMap<u64, NodeId>,
    /// Variable to its external-source node.
    externals: HashMap<VariableId, NodeId>,
}

impl<I: Instruction> DataFlowGraph<I> {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        DataFlowGraph {
            nodes: Vec::new(),
            by_offset: HashMap::new(),
            externals: HashMap::new(),
        }
    }

    /// Returns the node backing the instruction at `offset`, creating it on
    /// first sight. Loop revisits of the same instruction reuse the node.
    pub fn ensure_instruction_node(&mut self, instruction: &I) -> NodeId {
        let offset = instruction.offset();
        if let Some(&node) = self.by_offset.get(&offset) {
            return node;
        }
        let node = NodeId::new(self.nodes.len());
        self.nodes.push(DataFlowNode::Instruction {
            instruction: instruction.clone(),
            stack_dependencies: Vec::new(),
            variable_dependencies: Vec::new(),
            dependants: Vec::new(),
        });
        self.by_offset.insert(offset, node);
        node
    }

    /// Returns the external-source node for `variable`, creating it on first
    /// use.
    pub fn external_for_variable(&mut self, variable: VariableId) -> NodeId {
        if let Some(&node) = self.externals.get(&variable) {
            return node;
        }
        let node = NodeId::new(self.nodes.len());
        self.nodes.push(DataFlowNode::External {
            variable,
            dependants: Vec::new(),
        });
        self.externals.insert(variable, node);
        node
    }

    /// Records that `consumer`'s stack slot `slot` was fed by the origins of
    /// `value`, wiring dependant links back from every origin.
    ///
    /// Revisits merge into the existing dependency rather than appending a
    /// duplicate slot.
    pub fn record_stack_dependency(&mut self, consumer: NodeId, slot: usize, value: &SymbolicValue) {
        if let Some(DataFlowNode::Instruction {
            stack_dependencies, ..
        }) = self.nodes.get_mut(consumer.index())
        {
            if stack_dependencies.len() <= slot {
                stack_dependencies.resize(slot + 1, Dependency::default());
                stack_dependencies[slot].size = value.size();
            }
            stack_dependencies[slot].merge_value(value);
        }
        self.link_dependants(consumer, value);
    }

    /// Records that `consumer` read `variable` whose current value is
    /// `value`, wiring dependant links back from every origin.
    pub fn record_variable_dependency(
        &mut self,
        consumer: NodeId,
        variable: VariableId,
        value: &SymbolicValue,
    ) {
        if let Some(DataFlowNode::Instruction {
            variable_dependencies,
            ..
        }) = self.nodes.get_mut(consumer.index())
        {
            match variable_dependencies
                .iter_mut()
                .find(|(existing, _)| *existing == variable)
            {
                Some((_, dependency)) => {
                    dependency.merge_value(value);
                }
                None => variable_dependencies.push((variable, Dependency::from_value(value))),
            }
        }
        self.link_dependants(consumer, value);
    }

    fn link_dependants(&mut self, consumer: NodeId, value: &SymbolicValue) {
        for &origin in value.origins() {
            if let Some(producer) = self.nodes.get_mut(origin.index()) {
                let dependants = producer.dependants_mut();
                if !dependants.contains(&consumer) {
                    dependants.push(consumer);
                }
            }
        }
    }

    /// Returns the node at `id`.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&DataFlowNode<I>> {
        self.nodes.get(id.index())
    }

    /// Returns the node backing the instruction at `offset`, if analyzed.
    #[must_use]
    pub fn node_at_offset(&self, offset: u64) -> Option<NodeId> {
        self.by_offset.get(&offset).copied()
    }

    /// Returns the external-source node for `variable`, if one was created.
    #[must_use]
    pub fn external_node(&self, variable: VariableId) -> Option<NodeId> {
        self.externals.get(&variable).copied()
    }

    /// Returns the number of nodes, external sources included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns an iterator over all node identifiers.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::new)
    }

    /// Renders the graph in Graphviz DOT format.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph dfg {\n    node [shape=ellipse];\n");
        for (index, node) in self.nodes.iter().enumerate() {
            let label = match node {
                DataFlowNode::Instruction { instruction, .. } => {
                    format!("{:#x}", instruction.offset())
                }
                DataFlowNode::External { variable, .. } => format!("external {variable}"),
            };
            let _ = writeln!(out, "    {index} [label=\"{label}\"];");
        }
        for (index, node) in self.nodes.iter().enumerate() {
            for dependant in node.dependants() {
                let _ = writeln!(out, "    {index} -> {};", dependant.index());
            }
        }
        out.push_str("}\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Instruction;

    #[derive(Debug, Clone)]
    struct TestInstruction {
        offset: u64,
    }

    impl Instruction for TestInstruction {
        fn offset(&self) -> u64 {
            self.offset
        }
        fn size(&self) -> u64 {
            1
        }
        fn pop_count(&self) -> usize {
            0
        }
        fn push_count(&self) -> usize {
            0
        }
    }

    #[test]
    fn test_instruction_nodes_dedup_by_offset() {
        let mut dfg: DataFlowGraph<TestInstruction> = DataFlowGraph::new();
        let a = dfg.ensure_instruction_node(&TestInstruction { offset: 0x10 });
        let b = dfg.ensure_instruction_node(&TestInstruction { offset: 0x10 });
        let c = dfg.ensure_instruction_node(&TestInstruction { offset: 0x20 });

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(dfg.node_count(), 2);
        assert_eq!(dfg.node_at_offset(0x10), Some(a));
    }

    #[test]
    fn test_external_nodes_dedup_by_variable() {
        let mut dfg: DataFlowGraph<TestInstruction> = DataFlowGraph::new();
        let a = dfg.external_for_variable(VariableId::new(0));
        let b = dfg.external_for_variable(VariableId::new(0));
        assert_eq!(a, b);
        assert!(dfg.node(a).unwrap().is_external());
        assert_eq!(dfg.external_node(VariableId::new(0)), Some(a));
        assert_eq!(dfg.external_node(VariableId::new(1)), None);
    }

    #[test]
    fn test_stack_dependency_wires_both_directions() {
        let mut dfg: DataFlowGraph<TestInstruction> = DataFlowGraph::new();
        let producer = dfg.ensure_instruction_node(&TestInstruction { offset: 0x00 });
        let consumer = dfg.ensure_instruction_node(&TestInstruction { offset: 0x01 });

        let value = SymbolicValue::new(producer, 4);
        dfg.record_stack_dependency(consumer, 0, &value);

        let deps = dfg.node(consumer).unwrap().stack_dependencies();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].sources, vec![producer]);
        assert_eq!(deps[0].size, 4);

        assert_eq!(dfg.node(producer).unwrap().dependants(), &[consumer]);
    }

    #[test]
    fn test_stack_dependency_revisit_merges() {
        let mut dfg: DataFlowGraph<TestInstruction> = DataFlowGraph::new();
        let first = dfg.ensure_instruction_node(&TestInstruction { offset: 0x00 });
        let second = dfg.ensure_instruction_node(&TestInstruction { offset: 0x01 });
        let consumer = dfg.ensure_instruction_node(&TestInstruction { offset: 0x02 });

        dfg.record_stack_dependency(consumer, 0, &SymbolicValue::new(first, 4));
        dfg.record_stack_dependency(consumer, 0, &SymbolicValue::new(second, 4));
        dfg.record_stack_dependency(consumer, 0, &SymbolicValue::new(second, 4));

        let deps = dfg.node(consumer).unwrap().stack_dependencies();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].sources.len(), 2);
        assert_eq!(dfg.node(second).unwrap().dependants(), &[consumer]);
    }

    #[test]
    fn test_variable_dependency() {
        let mut dfg: DataFlowGraph<TestInstruction> = DataFlowGraph::new();
        let consumer = dfg.ensure_instruction_node(&TestInstruction { offset: 0x00 });
        let external = dfg.external_for_variable(VariableId::new(2));

        dfg.record_variable_dependency(consumer, VariableId::new(2), &SymbolicValue::new(external, 8));

        let deps = dfg.node(consumer).unwrap().variable_dependencies();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].0, VariableId::new(2));
        assert_eq!(deps[0].1.sources, vec![external]);
        assert_eq!(dfg.node(external).unwrap().dependants(), &[consumer]);
    }

    #[test]
    fn test_unknown_value_records_unknown_dependency() {
        let mut dfg: DataFlowGraph<TestInstruction> = DataFlowGraph::new();
        let consumer = dfg.ensure_instruction_node(&TestInstruction { offset: 0x00 });

        dfg.record_stack_dependency(consumer, 0, &SymbolicValue::unknown(4));

        let deps = dfg.node(consumer).unwrap().stack_dependencies();
        assert!(deps[0].is_unknown());
        assert_eq!(deps[0].size, 4);
    }

    #[test]
    fn test_to_dot() {
        let mut dfg: DataFlowGraph<TestInstruction> = DataFlowGraph::new();
        let producer = dfg.ensure_instruction_node(&TestInstruction { offset: 0x10 });
        let consumer = dfg.ensure_instruction_node(&TestInstruction { offset: 0x11 });
        dfg.record_stack_dependency(consumer, 0, &SymbolicValue::new(producer, 4));

        let dot = dfg.to_dot();
        assert!(dot.contains("digraph dfg"));
        assert!(dot.contains("0x10"));
        assert!(dot.contains("0 -> 1;"));
    }
}
