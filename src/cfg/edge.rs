//! Control flow edge types.

use strum::{Display, EnumIter};

/// Classification of a control flow edge.
///
/// The kind records *how* control moves between two basic blocks, which is
/// what downstream consumers (decompilers, structured-output passes) need to
/// reconstruct source-level constructs.
#[derive(Debug, Display, EnumIter, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Implicit sequential flow into the textually next block.
    ///
    /// A block has at most one outgoing fall-through edge.
    FallThrough,
    /// Taken branch of a conditional instruction.
    Conditional,
    /// Unconditional jump.
    Unconditional,
    /// Non-standard transfer such as an exception handler entry.
    Abnormal,
}

impl EdgeKind {
    /// Returns `true` for edges that depend on a runtime condition.
    #[must_use]
    pub fn is_conditional(self) -> bool {
        matches!(self, EdgeKind::Conditional)
    }

    /// Returns `true` for fall-through edges.
    #[must_use]
    pub fn is_fall_through(self) -> bool {
        matches!(self, EdgeKind::FallThrough)
    }

    /// Returns `true` for transfers outside normal instruction semantics.
    #[must_use]
    pub fn is_abnormal(self) -> bool {
        matches!(self, EdgeKind::Abnormal)
    }
}

/// Payload of a control flow graph edge.
///
/// Stores the destination's instruction offset alongside the [`EdgeKind`].
/// The offset is redundant with the graph's target node but keeps edge
/// inspection self-contained when rendering or diffing graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CfgEdge {
    /// The instruction offset the edge transfers control to.
    pub target_offset: u64,
    /// How control reaches the target.
    pub kind: EdgeKind,
}

impl CfgEdge {
    /// Creates an edge to the block starting at `target_offset` with the
    /// given kind.
    #[must_use]
    pub const fn new(target_offset: u64, kind: EdgeKind) -> Self {
        CfgEdge {
            target_offset,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_edge_kind_predicates() {
        assert!(EdgeKind::Conditional.is_conditional());
        assert!(EdgeKind::FallThrough.is_fall_through());
        assert!(EdgeKind::Abnormal.is_abnormal());
        assert!(!EdgeKind::Unconditional.is_conditional());
        assert!(!EdgeKind::Unconditional.is_fall_through());
    }

    #[test]
    fn test_edge_kind_display() {
        assert_eq!(EdgeKind::FallThrough.to_string(), "FallThrough");
        assert_eq!(EdgeKind::Abnormal.to_string(), "Abnormal");
    }

    #[test]
    fn test_edge_kind_iterates_all_variants() {
        assert_eq!(EdgeKind::iter().count(), 4);
    }

    #[test]
    fn test_cfg_edge_new() {
        let edge = CfgEdge::new(0x40, EdgeKind::Conditional);
        assert_eq!(edge.target_offset, 0x40);
        assert!(edge.kind.is_conditional());
    }
}
