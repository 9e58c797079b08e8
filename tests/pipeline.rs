//! End-to-end tests driving the full pipeline of a toy stack architecture:
//! decode -> static/symbolic construction -> dominance and loop queries ->
//! data flow inspection.

use flowscope::prelude::*;
use std::collections::HashMap;

/// A minimal stack machine: every instruction is one byte.
#[derive(Debug, Clone, PartialEq)]
enum Op {
    Push,
    Store(VariableId),
    Load(VariableId),
    BranchIfZero(u64),
    Jump(u64),
    Return,
}

#[derive(Debug, Clone)]
struct ToyInstruction {
    offset: u64,
    op: Op,
}

impl Instruction for ToyInstruction {
    fn offset(&self) -> u64 {
        self.offset
    }
    fn size(&self) -> u64 {
        1
    }
    fn pop_count(&self) -> usize {
        match self.op {
            Op::Push | Op::Load(_) | Op::Jump(_) => 0,
            Op::Store(_) | Op::BranchIfZero(_) | Op::Return => 1,
        }
    }
    fn push_count(&self) -> usize {
        match self.op {
            Op::Push | Op::Load(_) => 1,
            _ => 0,
        }
    }
    fn reads(&self) -> Vec<VariableId> {
        match self.op {
            Op::Load(variable) => vec![variable],
            _ => vec![],
        }
    }
    fn writes(&self) -> Vec<VariableId> {
        match self.op {
            Op::Store(variable) => vec![variable],
            _ => vec![],
        }
    }
    fn value_size(&self) -> u32 {
        4
    }
}

struct ToyProgram {
    instructions: HashMap<u64, ToyInstruction>,
}

impl ToyProgram {
    fn new(ops: Vec<Op>) -> Self {
        ToyProgram {
            instructions: ops
                .into_iter()
                .enumerate()
                .map(|(offset, op)| {
                    let offset = offset as u64;
                    (offset, ToyInstruction { offset, op })
                })
                .collect(),
        }
    }
}

impl InstructionProvider for ToyProgram {
    type Instruction = ToyInstruction;

    fn instruction_at(&self, offset: u64) -> flowscope::Result<ToyInstruction> {
        self.instructions
            .get(&offset)
            .cloned()
            .ok_or(Error::UndefinedInstruction { offset })
    }
}

/// Static resolution: successors read straight off the opcode.
struct ToyResolver;

impl SuccessorResolver<ToyInstruction> for ToyResolver {
    fn successors(
        &self,
        instruction: &ToyInstruction,
    ) -> flowscope::Result<Vec<SuccessorDescriptor>> {
        let next = instruction.offset() + instruction.size();
        Ok(match instruction.op {
            Op::Return => vec![],
            Op::Jump(target) => vec![SuccessorDescriptor::unconditional(target)],
            Op::BranchIfZero(target) => vec![
                SuccessorDescriptor::conditional(target),
                SuccessorDescriptor::fall_through(next),
            ],
            _ => vec![SuccessorDescriptor::fall_through(next)],
        })
    }
}

/// Symbolic resolution: same successor logic, forwarded state.
struct ToyTransitioner;

impl StateTransitioner<ToyInstruction> for ToyTransitioner {
    fn transitions(
        &self,
        state: ProgramState,
        instruction: &ToyInstruction,
    ) -> flowscope::Result<Vec<Transition>> {
        let next = instruction.offset() + instruction.size();
        Ok(match instruction.op {
            Op::Return => vec![],
            Op::Jump(target) => vec![Transition::new(
                state,
                SuccessorDescriptor::unconditional(target),
            )],
            Op::BranchIfZero(target) => vec![
                Transition::new(state.clone(), SuccessorDescriptor::conditional(target)),
                Transition::new(state, SuccessorDescriptor::fall_through(next)),
            ],
            _ => vec![Transition::new(
                state,
                SuccessorDescriptor::fall_through(next),
            )],
        })
    }
}

/// A diamond with a loop around it:
///
/// ```text
/// 0: push            (condition seed)
/// 1: branch_if_zero 5
/// 2: push            (then arm)
/// 3: store v0
/// 4: jump 7
/// 5: push            (else arm)
/// 6: store v0
/// 7: load v0
/// 8: branch_if_zero 0   (loop back to the top)
/// 9: push
/// 10: return
/// ```
fn looped_diamond() -> Vec<Op> {
    vec![
        Op::Push,
        Op::BranchIfZero(5),
        Op::Push,
        Op::Store(VariableId::new(0)),
        Op::Jump(7),
        Op::Push,
        Op::Store(VariableId::new(0)),
        Op::Load(VariableId::new(0)),
        Op::BranchIfZero(0),
        Op::Push,
        Op::Return,
    ]
}

#[test]
fn static_and_symbolic_builders_agree_on_shape() {
    let program = ToyProgram::new(looped_diamond());

    let static_cfg = StaticFlowGraphBuilder::new(&program, &ToyResolver)
        .build(0, &[])
        .unwrap();
    let result = SymbolicFlowGraphBuilder::new(&program, &ToyTransitioner)
        .build(0, &[])
        .unwrap();

    assert_eq!(static_cfg.block_count(), result.cfg.block_count());
    assert_eq!(static_cfg.edge_count(), result.cfg.edge_count());

    for node in static_cfg.node_ids() {
        let offset = static_cfg.block(node).unwrap().start_offset();
        assert!(result.cfg.node_at_offset(offset).is_some());
    }
}

#[test]
fn blocks_partition_reachable_instructions() {
    let program = ToyProgram::new(looped_diamond());
    let cfg = StaticFlowGraphBuilder::new(&program, &ToyResolver)
        .build(0, &[])
        .unwrap();

    let mut covered: Vec<u64> = Vec::new();
    for node in cfg.node_ids() {
        let block = cfg.block(node).unwrap();
        assert!(!block.is_empty());
        // Contiguity inside a block.
        let mut expected = block.start_offset();
        for instruction in block.instructions() {
            assert_eq!(instruction.offset(), expected);
            expected += instruction.size();
        }
        covered.extend(block.instructions().iter().map(Instruction::offset));
    }

    covered.sort_unstable();
    let all: Vec<u64> = (0..11).collect();
    assert_eq!(covered, all);
}

#[test]
fn dominators_follow_the_diamond() {
    let program = ToyProgram::new(looped_diamond());
    let cfg = StaticFlowGraphBuilder::new(&program, &ToyResolver)
        .build(0, &[])
        .unwrap();

    let entry = cfg.entry();
    let then_arm = cfg.node_at_offset(2).unwrap();
    let else_arm = cfg.node_at_offset(5).unwrap();
    let join = cfg.node_at_offset(7).unwrap();

    assert_eq!(cfg.immediate_dominator(join), Some(entry));
    assert!(cfg.dominates(entry, join));
    assert!(!cfg.dominates(then_arm, join));
    assert!(!cfg.dominates(else_arm, join));

    let tree = cfg.dominators();
    assert!(tree.is_reachable(join));
    assert_eq!(tree.depth(entry), Some(0));
}

#[test]
fn natural_loop_covers_the_whole_cycle() {
    let program = ToyProgram::new(looped_diamond());
    let cfg = StaticFlowGraphBuilder::new(&program, &ToyResolver)
        .build(0, &[])
        .unwrap();

    let loops = cfg.loops();
    assert_eq!(loops.len(), 1);
    assert_eq!(loops[0].header, cfg.entry());

    // Everything except the exit block (offset 9) is in the loop.
    let exit = cfg.node_at_offset(9).unwrap();
    assert!(!loops[0].contains(exit));
    assert_eq!(loops[0].body.len(), cfg.block_count() - 1);
}

#[test]
fn scc_groups_the_loop() {
    let program = ToyProgram::new(looped_diamond());
    let cfg = StaticFlowGraphBuilder::new(&program, &ToyResolver)
        .build(0, &[])
        .unwrap();

    let components = flowscope::graph::algorithms::strongly_connected_components(cfg.graph());

    let exit = cfg.node_at_offset(9).unwrap();
    let looped: Vec<_> = components.iter().filter(|c| c.len() > 1).collect();
    assert_eq!(looped.len(), 1);
    assert_eq!(looped[0].len(), cfg.block_count() - 1);
    assert!(!looped[0].contains(&exit));
}

#[test]
fn reverse_postorder_respects_forward_edges() {
    let program = ToyProgram::new(looped_diamond());
    let cfg = StaticFlowGraphBuilder::new(&program, &ToyResolver)
        .build(0, &[])
        .unwrap();

    let order = cfg.reverse_postorder();
    assert_eq!(order.len(), cfg.block_count());
    assert_eq!(order[0], cfg.entry());

    let pos = |offset: u64| {
        let node = cfg.node_at_offset(offset).unwrap();
        order.iter().position(|&n| n == node).unwrap()
    };
    assert!(pos(0) < pos(2));
    assert!(pos(0) < pos(5));
    assert!(pos(2) < pos(7));
    assert!(pos(5) < pos(7));
}

#[test]
fn symbolic_build_merges_variable_origins_across_arms() {
    let program = ToyProgram::new(looped_diamond());
    let result = SymbolicFlowGraphBuilder::new(&program, &ToyTransitioner)
        .build(0, &[])
        .unwrap();

    // The load at 7 may see the store at 3 or the store at 6.
    let load = result.dfg.node_at_offset(7).unwrap();
    let deps = result.dfg.node(load).unwrap().variable_dependencies();
    assert_eq!(deps.len(), 1);

    let mut sources = deps[0].1.sources.clone();
    sources.sort();
    let mut expected = vec![
        result.dfg.node_at_offset(3).unwrap(),
        result.dfg.node_at_offset(6).unwrap(),
    ];
    expected.sort();
    assert_eq!(sources, expected);

    // v0 is always written before it is read, so no external source exists.
    assert!(result.dfg.external_node(VariableId::new(0)).is_none());
}

#[test]
fn dead_code_is_excluded_until_declared() {
    // 0: jump 4, 1..3 dead, 4: return. Then re-run declaring 1 as a header.
    let ops = vec![
        Op::Jump(4),
        Op::Push,
        Op::Push,
        Op::Return,
        Op::Return,
    ];
    let program = ToyProgram::new(ops);
    let builder = StaticFlowGraphBuilder::new(&program, &ToyResolver);

    let cfg = builder.build(0, &[]).unwrap();
    assert_eq!(cfg.block_count(), 2);
    assert!(cfg.node_at_offset(1).is_none());

    let cfg = builder.build(0, &[1]).unwrap();
    assert!(cfg.node_at_offset(1).is_some());
    assert_eq!(cfg.block_count(), 3);
}

#[test]
fn structured_order_visits_every_block_once() {
    let program = ToyProgram::new(looped_diamond());
    let cfg = StaticFlowGraphBuilder::new(&program, &ToyResolver)
        .build(0, &[])
        .unwrap();

    let order = cfg.structured_order().unwrap();
    assert_eq!(order.len(), cfg.block_count());
    let mut sorted = order.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), cfg.block_count());
    assert_eq!(order[0], cfg.entry());
}

#[test]
fn dot_output_renders_both_graphs() {
    let program = ToyProgram::new(looped_diamond());
    let result = SymbolicFlowGraphBuilder::new(&program, &ToyTransitioner)
        .build(0, &[])
        .unwrap();

    let cfg_dot = result.cfg.to_dot();
    assert!(cfg_dot.contains("digraph cfg"));
    assert!(cfg_dot.contains("Conditional"));

    let dfg_dot = result.dfg.to_dot();
    assert!(dfg_dot.contains("digraph dfg"));
}
