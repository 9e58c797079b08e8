use thiserror::Error;

/// The generic Error type, which provides coverage for all errors this library can
/// potentially return.
///
/// Every failure is local and synchronous: it is raised at the point of detection,
/// never retried, and carries enough context (offset, expected vs. actual stack
/// depth) for the caller to build a precise diagnostic. A failed build produces no
/// partial result.
///
/// # Error Categories
///
/// ## Build Failures
/// - [`Error::UndefinedInstruction`] - An offset the provider or resolver cannot explain
/// - [`Error::StackImbalance`] - Converging paths disagree on evaluation stack depth
///
/// ## Algorithm Failures
/// - [`Error::CycleDetected`] - Topological sort encountered a back-edge
///
/// ## Argument Validation
/// - [`Error::RegionError`] - Region/ownership contract violated
/// - [`Error::GraphError`] - Graph construction or lookup contract violated
///
/// # Examples
///
/// ```rust,ignore
/// use flowscope::Error;
///
/// match builder.build(entry, &[]) {
///     Ok(cfg) => println!("{} blocks", cfg.block_count()),
///     Err(Error::UndefinedInstruction { offset }) => {
///         eprintln!("fell into invalid data at {offset:#x}");
///     }
///     Err(Error::StackImbalance { offset, expected, actual }) => {
///         eprintln!("stack depth {actual}, expected {expected} at {offset:#x}");
///     }
///     Err(e) => eprintln!("build failed: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The instruction provider or successor resolver was asked about an offset it
    /// cannot explain.
    ///
    /// This typically means control flow fell into invalid data, or a resolver
    /// produced a branch target outside the instruction stream. Fatal to the
    /// current build.
    #[error("No instruction is defined at offset {offset:#x}")]
    UndefinedInstruction {
        /// The offending offset.
        offset: u64,
    },

    /// Two converging control paths presented symbolic stacks of different sizes,
    /// or an instruction's declared pop count exceeded the values available.
    ///
    /// Fatal to the current build. The offset identifies where the inconsistency
    /// was detected so callers can report a precise location.
    #[error("Stack imbalance at offset {offset:#x}: expected depth {expected}, found {actual}")]
    StackImbalance {
        /// The offset at which the imbalance was detected.
        offset: u64,
        /// The stack depth the analysis expected at this point.
        expected: usize,
        /// The stack depth actually present.
        actual: usize,
    },

    /// The topological sorter reached a node that is still on the current path.
    ///
    /// Recoverable: callers for whom back-edges are semantically acceptable
    /// (e.g. sorting a graph with known loops) can re-invoke the sort with
    /// `ignore_cycles = true`.
    #[error("Cycle detected during topological ordering")]
    CycleDetected,

    /// A region/ownership contract was violated.
    ///
    /// Raised when adding a node to a region while the node does not belong to
    /// the owning graph, or when re-parenting an already-owned region. These are
    /// programmer errors surfaced as argument validation, not analysis failures.
    #[error("{0}")]
    RegionError(String),

    /// A graph construction or lookup contract was violated.
    ///
    /// Covers edge insertion against unknown nodes, successor descriptors that
    /// do not land on a block boundary, and duplicate fall-through edges.
    #[error("{0}")]
    GraphError(String),
}
