//! Symbolic values.

use crate::graph::NodeId;
use std::collections::BTreeSet;

/// A symbolic value: the set of data flow nodes that may have produced it,
/// plus its declared byte size.
///
/// Values are merged in place when control paths converge. Merging is
/// monotonic: the origin set only grows, and is bounded by the number of
/// data flow nodes, which is what guarantees fixed-point termination of the
/// symbolic builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolicValue {
    origins: BTreeSet<NodeId>,
    size: u32,
}

impl SymbolicValue {
    /// Creates a value produced by the single data flow node `origin`.
    #[must_use]
    pub fn new(origin: NodeId, size: u32) -> Self {
        let mut origins = BTreeSet::new();
        origins.insert(origin);
        SymbolicValue { origins, size }
    }

    /// Creates a value with no known origin.
    ///
    /// Used for values that enter the analyzed region from outside and for
    /// the architecture's default value of never-written variables. The size
    /// is still meaningful; the provenance is not.
    #[must_use]
    pub fn unknown(size: u32) -> Self {
        SymbolicValue {
            origins: BTreeSet::new(),
            size,
        }
    }

    /// Returns the set of data flow nodes that may have produced this value.
    #[must_use]
    pub fn origins(&self) -> &BTreeSet<NodeId> {
        &self.origins
    }

    /// Returns `true` if no producer is known.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.origins.is_empty()
    }

    /// Returns the declared byte size of the value.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Unions `other`'s origin set into this value.
    ///
    /// Returns `true` if the origin set changed, which the symbolic builder
    /// uses as its convergence signal.
    pub fn merge_with(&mut self, other: &SymbolicValue) -> bool {
        let before = self.origins.len();
        self.origins.extend(other.origins.iter().copied());
        self.origins.len() != before
    }
}
