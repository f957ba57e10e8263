//! Partial assignment and the trail.
use crate::lit::{Lit, TriBool, Var};
use crate::vsids::Vsids;

use super::graph::{ImplGraph, Reason};

/// The current partial truth assignment.
#[derive(Default)]
pub struct Assignment {
    values: Vec<TriBool>,
    /// Last value a variable held before being unassigned; the default for phase saving.
    last_value: Vec<bool>,
}

impl Assignment {
    pub fn set_var_count(&mut self, num_vars: usize) {
        self.values.resize(num_vars, None);
        self.last_value.resize(num_vars, false);
    }

    pub fn var_value(&self, var: Var) -> TriBool {
        self.values[var.index()]
    }

    pub fn lit_value(&self, lit: Lit) -> TriBool {
        self.values[lit.index()].map(|v| v ^ lit.is_negative())
    }

    pub fn is_true(&self, lit: Lit) -> bool {
        self.values[lit.index()] == Some(lit.is_positive())
    }

    pub fn is_false(&self, lit: Lit) -> bool {
        self.values[lit.index()] == Some(lit.is_negative())
    }

    pub fn is_unassigned(&self, lit: Lit) -> bool {
        self.values[lit.index()].is_none()
    }

    /// Last value `var` held, or the saved-phase default of `false` if never assigned.
    pub fn saved_phase(&self, var: Var) -> bool {
        self.last_value[var.index()]
    }

    /// Overwrites the saved phase directly, used by rephasing (§4.8).
    pub fn set_saved_phase(&mut self, var: Var, value: bool) {
        self.last_value[var.index()] = value;
    }

    fn assign(&mut self, lit: Lit) {
        debug_assert!(self.values[lit.index()].is_none());
        self.values[lit.index()] = Some(lit.is_positive());
    }

    fn unassign(&mut self, var: Var) {
        let slot = &mut self.values[var.index()];
        self.last_value[var.index()] = *slot == Some(true);
        *slot = None;
    }
}

/// Ordered assignment history, partitioned into decision levels.
///
/// `level_starts[d]` is the trail index of the first assignment at level `d + 1` (level 0
/// assignments occupy `[0, level_starts.first())` or the whole trail if there are no decisions
/// yet).
#[derive(Default)]
pub struct Trail {
    trail: Vec<Lit>,
    queue_head: usize,
    level_starts: Vec<u32>,
}

impl Trail {
    pub fn trail(&self) -> &[Lit] {
        &self.trail
    }

    pub fn current_level(&self) -> usize {
        self.level_starts.len()
    }

    pub fn level_start(&self, level: usize) -> usize {
        if level == 0 {
            0
        } else {
            self.level_starts[level - 1] as usize
        }
    }

    pub fn top_level_len(&self) -> usize {
        self.level_starts.first().copied().unwrap_or(self.trail.len() as u32) as usize
    }

    pub fn is_fully_propagated(&self) -> bool {
        self.queue_head == self.trail.len()
    }

    pub fn next_to_propagate(&self) -> Option<Lit> {
        self.trail.get(self.queue_head).copied()
    }

    pub fn advance_queue(&mut self) {
        self.queue_head += 1;
    }

    pub fn new_decision_level(&mut self) {
        self.level_starts.push(self.trail.len() as u32);
    }
}

/// Enqueues `lit` as true. Does not propagate; the caller is responsible for driving BCP.
///
/// `lit` must currently be unassigned.
pub fn enqueue(
    assignment: &mut Assignment,
    trail: &mut Trail,
    impl_graph: &mut ImplGraph,
    lit: Lit,
    reason: Reason,
) {
    assignment.assign(lit);
    let level = trail.current_level();
    impl_graph.set(lit.var(), reason, level);
    trail.trail.push(lit);
}

/// Undoes every assignment made at a decision level deeper than `level`, restoring phases and
/// re-inserting the freed variables into the branching heap.
pub fn backtrack(
    assignment: &mut Assignment,
    trail: &mut Trail,
    vsids: &mut Vsids,
    level: usize,
) {
    if level >= trail.current_level() {
        return;
    }

    let new_len = trail.level_starts[level] as usize;

    trail.level_starts.truncate(level);

    for &lit in &trail.trail[new_len..] {
        assignment.unassign(lit.var());
        vsids.make_available(lit.var());
    }
    trail.trail.truncate(new_len);
    trail.queue_head = trail.queue_head.min(new_len);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lit::lit;

    #[test]
    fn enqueue_then_backtrack_restores_phase() {
        let mut assignment = Assignment::default();
        let mut trail = Trail::default();
        let mut impl_graph = ImplGraph::default();
        let mut vsids = Vsids::default();
        assignment.set_var_count(4);
        impl_graph.set_var_count(4);
        vsids.set_var_count(4);
        for _ in 0..4 {
            vsids.pop_max();
        }

        trail.new_decision_level();
        enqueue(&mut assignment, &mut trail, &mut impl_graph, lit!(1), Reason::Decision);
        trail.new_decision_level();
        enqueue(&mut assignment, &mut trail, &mut impl_graph, lit!(-2), Reason::Decision);

        assert!(assignment.is_true(lit!(1)));
        assert!(assignment.is_true(lit!(-2)));
        assert_eq!(trail.current_level(), 2);

        backtrack(&mut assignment, &mut trail, &mut vsids, 1);

        assert!(assignment.is_true(lit!(1)));
        assert!(assignment.is_unassigned(lit!(-2)));
        assert_eq!(trail.current_level(), 1);
        assert!(assignment.saved_phase(lit!(2).var()));

        backtrack(&mut assignment, &mut trail, &mut vsids, 0);
        assert!(assignment.is_unassigned(lit!(1)));
        assert_eq!(trail.current_level(), 0);
    }
}
