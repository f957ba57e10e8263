//! Error taxonomy (§7).
//!
//! These are the only conditions the core treats as errors. A propagation-time conflict is not
//! one of them — it is the normal signal consumed by conflict analysis.
use thiserror::Error;

/// Why a `solve()` call returned `Unknown` instead of a definite verdict.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum BudgetReason {
    Conflicts,
    Decisions,
    Time,
}

impl std::fmt::Display for BudgetReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BudgetReason::Conflicts => "conflict limit reached",
            BudgetReason::Decisions => "decision limit reached",
            BudgetReason::Time => "time budget exceeded",
        };
        f.write_str(s)
    }
}

/// Errors surfaced by the solver core.
///
/// `OutOfMemory` is fatal to the current solve: the caller should discard the solver. The other
/// two leave the solver in a valid, reusable state.
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum SolverError {
    /// A growable structure (clause arena, watch lists, per-variable arrays) could not grow.
    #[error("out of memory")]
    OutOfMemory,

    /// `add_clause` discovered a level-0 conflict; the formula is unsatisfiable.
    #[error("formula is unsatisfiable")]
    ImmediateUnsat,

    /// A configured limit (conflicts, decisions, wall-clock) was reached.
    #[error("search budget exceeded: {0}")]
    BudgetExceeded(BudgetReason),
}
