//! Decision heuristic: VSIDS variable selection, phase choice, and rephasing triggers (§4.8).
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::lit::{Lit, Var};
use crate::prop::Assignment;
use crate::variables::PhaseState;
use crate::vsids::Vsids;

/// Picks decision variables off the branching heap and chooses their polarity.
pub struct DecisionHeuristic {
    rng: StdRng,
    pub phase_saving: bool,
    pub random_phase_prob: f64,
    pub adaptive_random: bool,
    pub rephase_interval: u64,
    conflicts_since_rephase: u64,
    /// Alternates with every rephasing point: `false` decides off the saved phase, `true` off the
    /// best-known ("target") phase.
    use_best_phase: bool,
}

impl Default for DecisionHeuristic {
    fn default() -> DecisionHeuristic {
        DecisionHeuristic {
            rng: StdRng::seed_from_u64(0),
            phase_saving: true,
            random_phase_prob: 0.01,
            adaptive_random: true,
            rephase_interval: 1000,
            conflicts_since_rephase: 0,
            use_best_phase: false,
        }
    }
}

impl DecisionHeuristic {
    /// Reseeds the random-phase generator. Exposed so callers can make runs reproducible; the
    /// default seed is fixed for the same reason.
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Pops the highest-activity still-unassigned variable off `vsids`, discarding any stale
    /// entries for variables that got assigned since they were last in the heap.
    pub fn pick_var(&mut self, vsids: &mut Vsids, assignment: &Assignment) -> Option<Var> {
        loop {
            let var = vsids.pop_max()?;
            if assignment.is_unassigned(var.positive()) {
                return Some(var);
            }
        }
    }

    fn effective_random_prob(&self) -> f64 {
        if self.adaptive_random && self.use_best_phase {
            // Rephasing just perturbed the saved phases; a moment of extra noise helps escape a
            // search region the best-phase snapshot might otherwise pin us back into.
            (self.random_phase_prob * 2.0).min(1.0)
        } else {
            self.random_phase_prob
        }
    }

    /// Chooses `var`'s polarity: occasional random, otherwise the target (best) phase while
    /// rephased, otherwise the saved phase, otherwise `false`.
    pub fn choose_phase(&mut self, var: Var, assignment: &Assignment, phases: &PhaseState) -> bool {
        let prob = self.effective_random_prob();
        if prob > 0.0 && self.rng.gen_bool(prob) {
            return self.rng.gen_bool(0.5);
        }
        if self.use_best_phase {
            phases.best_phase(var)
        } else if self.phase_saving {
            assignment.saved_phase(var)
        } else {
            false
        }
    }

    /// Builds the literal to enqueue for a freshly chosen decision variable.
    pub fn literal_for(&mut self, var: Var, assignment: &Assignment, phases: &PhaseState) -> Lit {
        let positive = self.choose_phase(var, assignment, phases);
        Lit::from_var(var, !positive)
    }

    /// Advances the rephasing counter by one conflict; returns whether this call crossed a
    /// rephasing point (the caller must then copy the best phase over the saved phases).
    pub fn record_conflict(&mut self) -> bool {
        self.conflicts_since_rephase += 1;
        if self.conflicts_since_rephase >= self.rephase_interval {
            self.conflicts_since_rephase = 0;
            self.use_best_phase = !self.use_best_phase;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_var_skips_already_assigned() {
        let mut vsids = Vsids::default();
        vsids.set_var_count(3);
        let mut assignment = Assignment::default();
        assignment.set_var_count(3);

        let v0 = Var::from_index(0);
        let mut heuristic = DecisionHeuristic::default();

        // Force var 0 to the top of the heap, then assign it directly (as backtracking leaves a
        // stale heap entry behind rather than eagerly removing it).
        for _ in 0..5 {
            vsids.bump(v0);
        }
        let dummy_lit = v0.positive();
        let mut trail = crate::prop::Trail::default();
        let mut impl_graph = crate::prop::ImplGraph::default();
        impl_graph.set_var_count(3);
        crate::prop::enqueue(&mut assignment, &mut trail, &mut impl_graph, dummy_lit, crate::prop::Reason::Decision);

        let picked = heuristic.pick_var(&mut vsids, &assignment);
        assert_ne!(picked, Some(v0));
        assert!(picked.is_some());
    }

    #[test]
    fn choose_phase_follows_saved_phase_when_not_random() {
        let mut assignment = Assignment::default();
        assignment.set_var_count(1);
        let var = Var::from_index(0);
        assignment.set_saved_phase(var, true);
        let mut phases = PhaseState::default();
        phases.set_var_count(1);

        let mut heuristic = DecisionHeuristic::default();
        heuristic.random_phase_prob = 0.0;
        assert!(heuristic.choose_phase(var, &assignment, &phases));

        assignment.set_saved_phase(var, false);
        assert!(!heuristic.choose_phase(var, &assignment, &phases));
    }

    #[test]
    fn choose_phase_follows_best_phase_once_rephased() {
        let mut assignment = Assignment::default();
        assignment.set_var_count(1);
        let var = Var::from_index(0);
        assignment.set_saved_phase(var, false);

        let mut phases = PhaseState::default();
        phases.set_var_count(1);
        let mut trail = crate::prop::Trail::default();
        let mut impl_graph = crate::prop::ImplGraph::default();
        impl_graph.set_var_count(1);
        let mut depth_assignment = Assignment::default();
        depth_assignment.set_var_count(1);
        trail.new_decision_level();
        crate::prop::enqueue(
            &mut depth_assignment,
            &mut trail,
            &mut impl_graph,
            var.positive(),
            crate::prop::Reason::Decision,
        );
        phases.observe_depth(&trail);
        assert!(phases.best_phase(var));

        let mut heuristic = DecisionHeuristic::default();
        heuristic.random_phase_prob = 0.0;
        heuristic.rephase_interval = 1;
        assert!(heuristic.record_conflict());
        assert!(heuristic.use_best_phase);

        // Saved phase says false, best phase says true: this must follow the best phase.
        assert!(heuristic.choose_phase(var, &assignment, &phases));
    }

    #[test]
    fn record_conflict_fires_exactly_at_the_interval() {
        let mut heuristic = DecisionHeuristic::default();
        heuristic.rephase_interval = 3;
        assert!(!heuristic.record_conflict());
        assert!(!heuristic.record_conflict());
        assert!(heuristic.record_conflict());
        assert!(heuristic.use_best_phase);
    }
}
