//! Static control flow graph construction.

use crate::builder::{assemble, distinct_descriptors, promote_headers, InstructionTraversal};
use crate::cfg::ControlFlowGraph;
use crate::instruction::{Instruction, InstructionProvider, SuccessorResolver};
use crate::Result;

/// Builds a control flow graph purely from each instruction's statically
/// declared successors.
///
/// No machine state is simulated: the resolver must be able to enumerate
/// every successor of an instruction in isolation. When successors depend on
/// computed values, use
/// [`SymbolicFlowGraphBuilder`](crate::builder::SymbolicFlowGraphBuilder)
/// instead.
///
/// # Examples
///
/// ```rust,ignore
/// use flowscope::prelude::*;
///
/// let builder = StaticFlowGraphBuilder::new(&provider, &resolver);
/// let cfg = builder.build(0, &[])?;
/// # Ok::<(), flowscope::Error>(())
/// ```
pub struct StaticFlowGraphBuilder<'a, P, R> {
    provider: &'a P,
    resolver: &'a R,
}

impl<'a, P, R> StaticFlowGraphBuilder<'a, P, R>
where
    P: InstructionProvider,
    R: SuccessorResolver<P::Instruction>,
{
    /// Creates a builder over the given provider and resolver.
    pub fn new(provider: &'a P, resolver: &'a R) -> Self {
        StaticFlowGraphBuilder { provider, resolver }
    }

    /// Runs the worklist discovery pass without assembling blocks.
    ///
    /// `known_headers` pre-declares block starts the instruction stream
    /// alone cannot reveal (exception handler entries, jump-table targets
    /// recovered elsewhere); each is also used as an additional traversal
    /// root, so otherwise-unreachable handler code is still covered.
    ///
    /// # Errors
    ///
    /// Propagates provider and resolver failures, most notably
    /// [`Error::UndefinedInstruction`](crate::Error::UndefinedInstruction)
    /// when control flows into an offset without an instruction.
    pub fn traverse(
        &self,
        entry: u64,
        known_headers: &[u64],
    ) -> Result<InstructionTraversal<P::Instruction>> {
        let mut traversal = InstructionTraversal::new(entry, known_headers);
        let mut agenda: Vec<u64> = Vec::with_capacity(known_headers.len() + 1);
        agenda.push(entry);
        agenda.extend_from_slice(known_headers);

        while let Some(offset) = agenda.pop() {
            if traversal.visited(offset) {
                continue;
            }
            let instruction = self.provider.instruction_at(offset)?;
            let next = instruction.offset() + instruction.size();
            let descriptors = distinct_descriptors(self.resolver.successors(&instruction)?);

            for descriptor in &descriptors {
                agenda.push(descriptor.offset);
            }
            promote_headers(&mut traversal.headers, next, &descriptors);

            traversal.successors.insert(offset, descriptors);
            traversal.instructions.insert(offset, instruction);
        }

        Ok(traversal)
    }

    /// Discovers and assembles the full control flow graph.
    ///
    /// # Errors
    ///
    /// Propagates traversal failures, plus
    /// [`Error::GraphError`](crate::Error::GraphError) when a resolved
    /// successor does not land on a block boundary.
    pub fn build(&self, entry: u64, known_headers: &[u64]) -> Result<ControlFlowGraph<P::Instruction>> {
        let traversal = self.traverse(entry, known_headers)?;
        assemble(entry, &traversal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::EdgeKind;
    use crate::instruction::{Instruction, SuccessorDescriptor};
    use crate::Error;
    use std::collections::HashMap;

    /// One instruction of a toy architecture: offset, size, and its static
    /// successor descriptors.
    #[derive(Debug, Clone)]
    struct TestInstruction {
        offset: u64,
        size: u64,
        successors: Vec<SuccessorDescriptor>,
    }

    impl Instruction for TestInstruction {
        fn offset(&self) -> u64 {
            self.offset
        }
        fn size(&self) -> u64 {
            self.size
        }
        fn pop_count(&self) -> usize {
            0
        }
        fn push_count(&self) -> usize {
            0
        }
    }

    struct TestStream {
        instructions: HashMap<u64, TestInstruction>,
    }

    impl TestStream {
        fn new(instructions: Vec<TestInstruction>) -> Self {
            TestStream {
                instructions: instructions.into_iter().map(|i| (i.offset, i)).collect(),
            }
        }
    }

    impl InstructionProvider for TestStream {
        type Instruction = TestInstruction;

        fn instruction_at(&self, offset: u64) -> crate::Result<TestInstruction> {
            self.instructions
                .get(&offset)
                .cloned()
                .ok_or(Error::UndefinedInstruction { offset })
        }
    }

    struct StaticResolver;

    impl SuccessorResolver<TestInstruction> for StaticResolver {
        fn successors(
            &self,
            instruction: &TestInstruction,
        ) -> crate::Result<Vec<SuccessorDescriptor>> {
            Ok(instruction.successors.clone())
        }
    }

    fn seq(offset: u64) -> TestInstruction {
        TestInstruction {
            offset,
            size: 1,
            successors: vec![SuccessorDescriptor::fall_through(offset + 1)],
        }
    }

    fn branch(offset: u64, taken: u64) -> TestInstruction {
        TestInstruction {
            offset,
            size: 1,
            successors: vec![
                SuccessorDescriptor::conditional(taken),
                SuccessorDescriptor::fall_through(offset + 1),
            ],
        }
    }

    fn jump(offset: u64, target: u64) -> TestInstruction {
        TestInstruction {
            offset,
            size: 1,
            successors: vec![SuccessorDescriptor::unconditional(target)],
        }
    }

    fn ret(offset: u64) -> TestInstruction {
        TestInstruction {
            offset,
            size: 1,
            successors: vec![],
        }
    }

    #[test]
    fn test_straight_line_is_one_block() {
        let stream = TestStream::new(vec![seq(0), seq(1), seq(2), ret(3)]);
        let cfg = StaticFlowGraphBuilder::new(&stream, &StaticResolver)
            .build(0, &[])
            .unwrap();

        assert_eq!(cfg.block_count(), 1);
        assert_eq!(cfg.edge_count(), 0);
        assert_eq!(cfg.block(cfg.entry()).unwrap().len(), 4);
    }

    #[test]
    fn test_branch_splits_blocks() {
        // 0: branch to 3 / fall through 1; 1-2 then; 3 join.
        let stream = TestStream::new(vec![branch(0, 3), seq(1), seq(2), ret(3)]);
        let cfg = StaticFlowGraphBuilder::new(&stream, &StaticResolver)
            .build(0, &[])
            .unwrap();

        assert_eq!(cfg.block_count(), 3);
        let entry = cfg.entry();
        assert_eq!(cfg.successors(entry).count(), 2);

        let join = cfg.node_at_offset(3).unwrap();
        assert_eq!(cfg.predecessors(join).count(), 2);

        let kinds: Vec<EdgeKind> = cfg.outgoing_edges(entry).map(|(_, e)| e.kind).collect();
        assert!(kinds.contains(&EdgeKind::Conditional));
        assert!(kinds.contains(&EdgeKind::FallThrough));
    }

    #[test]
    fn test_branch_target_mid_stream_becomes_header() {
        // 0 -> 1 -> 2, and 0 also branches to 2: block must split at 2.
        let stream = TestStream::new(vec![branch(0, 2), seq(1), ret(2)]);
        let cfg = StaticFlowGraphBuilder::new(&stream, &StaticResolver)
            .build(0, &[])
            .unwrap();

        assert_eq!(cfg.block_count(), 3);
        assert!(cfg.node_at_offset(2).is_some());
    }

    #[test]
    fn test_loop_back_edge() {
        // 0; 1: body; 2: branch back to 1 or fall through 3; 3: ret.
        let stream = TestStream::new(vec![seq(0), seq(1), branch(2, 1), ret(3)]);
        let cfg = StaticFlowGraphBuilder::new(&stream, &StaticResolver)
            .build(0, &[])
            .unwrap();

        let header = cfg.node_at_offset(1).unwrap();
        // The body block branches back to itself: 1 is both header and latch.
        assert!(cfg.successors(header).any(|n| n == header));
        assert_eq!(cfg.loops().len(), 1);
        assert_eq!(cfg.loops()[0].header, header);
    }

    #[test]
    fn test_unreachable_code_not_visited() {
        // 0: jump over 1; 1 is dead; 2: ret.
        let stream = TestStream::new(vec![jump(0, 2), seq(1), ret(2)]);
        let builder = StaticFlowGraphBuilder::new(&stream, &StaticResolver);

        let traversal = builder.traverse(0, &[]).unwrap();
        assert!(!traversal.visited(1));

        let cfg = builder.build(0, &[]).unwrap();
        assert_eq!(cfg.block_count(), 2);
        assert!(cfg.node_at_offset(1).is_none());
    }

    #[test]
    fn test_known_header_forces_visit_and_split() {
        // Same stream, but offset 1 is pre-declared (e.g. a handler entry).
        let stream = TestStream::new(vec![jump(0, 2), seq(1), ret(2)]);
        let cfg = StaticFlowGraphBuilder::new(&stream, &StaticResolver)
            .build(0, &[1])
            .unwrap();

        assert_eq!(cfg.block_count(), 3);
        assert!(cfg.node_at_offset(1).is_some());
    }

    #[test]
    fn test_instruction_after_terminator_starts_new_block() {
        // 0: branch to 2 / fall 1; 1: ret; 2: ret. The ret at 1 must not
        // swallow the instruction at 2.
        let stream = TestStream::new(vec![branch(0, 2), ret(1), ret(2)]);
        let cfg = StaticFlowGraphBuilder::new(&stream, &StaticResolver)
            .build(0, &[])
            .unwrap();

        assert_eq!(cfg.block_count(), 3);
        assert_eq!(cfg.block(cfg.node_at_offset(1).unwrap()).unwrap().len(), 1);
        assert_eq!(cfg.block(cfg.node_at_offset(2).unwrap()).unwrap().len(), 1);
    }

    #[test]
    fn test_undefined_offset_is_reported() {
        // Branch into the void at 0x50.
        let stream = TestStream::new(vec![jump(0, 0x50)]);
        let result = StaticFlowGraphBuilder::new(&stream, &StaticResolver).build(0, &[]);

        assert!(matches!(
            result,
            Err(Error::UndefinedInstruction { offset: 0x50 })
        ));
    }

    #[test]
    fn test_duplicate_successors_produce_one_edge() {
        // A two-way branch where both arms land on the same offset.
        let stream = TestStream::new(vec![
            TestInstruction {
                offset: 0,
                size: 1,
                successors: vec![
                    SuccessorDescriptor::conditional(2),
                    SuccessorDescriptor::conditional(2),
                ],
            },
            ret(2),
        ]);
        let cfg = StaticFlowGraphBuilder::new(&stream, &StaticResolver)
            .build(0, &[])
            .unwrap();

        assert_eq!(cfg.edge_count(), 1);
    }

    #[test]
    fn test_self_loop_instruction() {
        // 0 branches to itself or falls through to 1.
        let stream = TestStream::new(vec![branch(0, 0), ret(1)]);
        let cfg = StaticFlowGraphBuilder::new(&stream, &StaticResolver)
            .build(0, &[])
            .unwrap();

        assert_eq!(cfg.block_count(), 2);
        let entry = cfg.entry();
        assert!(cfg.successors(entry).any(|n| n == entry));
    }
}
