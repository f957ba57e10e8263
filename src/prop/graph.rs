//! The implication graph: per-variable decision level and reason clause.
use crate::clause::{ClauseAlloc, ClauseRef};
use crate::lit::{Lit, Var};

/// Why a literal became true.
///
/// `Decision` doubles as the sentinel for level-0 facts: both are assignments with no reason
/// clause, distinguished only by their level.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Reason {
    Decision,
    Binary(Lit),
    Long(ClauseRef),
}

impl Reason {
    /// The other literals of the reason clause (excluding the propagated literal itself).
    ///
    /// For a binary reason this is the single other literal, written into `scratch` since there
    /// is no backing storage to borrow from directly; for a long clause it is `lits[1..]`, since
    /// the propagated literal is always kept at `lits[0]`.
    pub fn antecedents<'a>(&self, alloc: &'a ClauseAlloc, scratch: &'a mut [Lit; 1]) -> &'a [Lit] {
        match self {
            Reason::Decision => &[],
            Reason::Binary(lit) => {
                scratch[0] = *lit;
                &scratch[..]
            }
            Reason::Long(cref) => &alloc.lits(*cref)[1..],
        }
    }

    pub fn is_decision(&self) -> bool {
        matches!(self, Reason::Decision)
    }
}

/// A clause found to be false under the current assignment.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Conflict {
    Binary(Lit, Lit),
    Long(ClauseRef),
}

impl Conflict {
    pub fn lits<'a>(&'a self, alloc: &'a ClauseAlloc, scratch: &'a mut [Lit; 2]) -> &'a [Lit] {
        match self {
            Conflict::Binary(a, b) => {
                scratch[0] = *a;
                scratch[1] = *b;
                &scratch[..]
            }
            Conflict::Long(cref) => alloc.lits(*cref),
        }
    }
}

#[derive(Copy, Clone)]
struct ImplNode {
    reason: Reason,
    level: u32,
}

impl Default for ImplNode {
    fn default() -> ImplNode {
        ImplNode {
            reason: Reason::Decision,
            level: 0,
        }
    }
}

/// Per-variable decision level and reason, i.e. the implication graph's nodes.
///
/// Only valid for currently-assigned variables; stale for unassigned ones (consistent with the
/// rest of the solver, which never reads level/reason without first checking the assignment).
#[derive(Default)]
pub struct ImplGraph {
    nodes: Vec<ImplNode>,
}

impl ImplGraph {
    pub fn set_var_count(&mut self, num_vars: usize) {
        self.nodes.resize(num_vars, ImplNode::default());
    }

    pub fn reason(&self, var: Var) -> Reason {
        self.nodes[var.index()].reason
    }

    pub fn level(&self, var: Var) -> usize {
        self.nodes[var.index()].level as usize
    }

    pub fn set(&mut self, var: Var, reason: Reason, level: usize) {
        self.nodes[var.index()] = ImplNode {
            reason,
            level: level as u32,
        };
    }

    /// Rewrites every [`ClauseRef`] held in a `Reason::Long`, called after arena compaction.
    pub fn relocate(&mut self, mut relocate: impl FnMut(ClauseRef) -> ClauseRef) {
        for node in &mut self.nodes {
            if let Reason::Long(cref) = node.reason {
                node.reason = Reason::Long(relocate(cref));
            }
        }
    }
}
