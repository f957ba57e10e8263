//! First-UIP conflict analysis, LBD computation, and recursive clause minimization (§4.4).
use std::mem::swap;

use crate::clause::{ClauseAlloc, ClauseRef};
use crate::lit::{Lit, Var};
use crate::prop::{Conflict, ImplGraph, Reason, Trail};
use crate::stats::Stats;
use crate::vsids::Vsids;

/// Reusable scratch state for conflict analysis, sized once per variable count.
///
/// Kept across conflicts to avoid reallocating the "seen" bitset and clause buffer on every
/// learned clause.
#[derive(Default)]
pub struct AnalyzeConflict {
    clause: Vec<Lit>,
    current_level_count: usize,
    var_flags: Vec<bool>,
    to_clean: Vec<Var>,
    involved: Vec<ClauseRef>,
    stack: Vec<Lit>,
    level_flags: Vec<bool>,
}

impl AnalyzeConflict {
    pub fn set_var_count(&mut self, count: usize) {
        self.var_flags.resize(count, false);
        // A decision level can never exceed the number of variables.
        self.level_flags.resize(count + 1, false);
    }

    /// The learned clause, asserting literal first, second-highest-level literal second.
    pub fn clause(&self) -> &[Lit] {
        &self.clause
    }

    /// Long clauses whose variables were resolved on, for clause-activity bumping.
    pub fn involved(&self) -> &[ClauseRef] {
        &self.involved
    }
}

/// The outcome of [`analyze`]: where to backjump, and the learned clause's LBD.
pub struct AnalyzeResult {
    pub backjump_level: usize,
    pub lbd: u32,
}

/// Derives an asserting learned clause from `conflict` via first-UIP resolution.
///
/// The learned clause is left in `state.clause()`; it has a single literal (and `backjump_level`
/// of 0) iff the conflict occurred with no decisions pending, meaning the formula is
/// unsatisfiable once that literal is also found false at level 0 — callers distinguish that case
/// by checking `trail.current_level() == 0` themselves before calling `analyze`.
pub fn analyze(
    state: &mut AnalyzeConflict,
    vsids: &mut Vsids,
    alloc: &ClauseAlloc,
    impl_graph: &ImplGraph,
    trail: &Trail,
    conflict: &Conflict,
    stats: &mut Stats,
) -> AnalyzeResult {
    analyze_with_minimization(state, vsids, alloc, impl_graph, trail, conflict, true, stats)
}

/// As [`analyze`], but minimization can be disabled (§6 `minimize_learned` option).
pub fn analyze_with_minimization(
    state: &mut AnalyzeConflict,
    vsids: &mut Vsids,
    alloc: &ClauseAlloc,
    impl_graph: &ImplGraph,
    trail: &Trail,
    conflict: &Conflict,
    minimize: bool,
    stats: &mut Stats,
) -> AnalyzeResult {
    state.clause.clear();
    state.involved.clear();
    state.current_level_count = 0;

    let mut scratch = [Lit::from_dimacs(1), Lit::from_dimacs(2)];
    let conflict_lits = conflict.lits(alloc, &mut scratch).to_vec();

    if trail.current_level() == 0 {
        return AnalyzeResult {
            backjump_level: 0,
            lbd: 0,
        };
    }

    for &lit in &conflict_lits {
        add_literal(state, vsids, impl_graph, trail, lit);
    }

    if let Conflict::Long(cref) = conflict {
        state.involved.push(*cref);
    }

    // Resolve away every literal of the current level but one, walking the trail backwards so
    // reasons are visited in reverse propagation order.
    for &lit in trail.trail().iter().rev() {
        let present = &mut state.var_flags[lit.index()];
        if !*present {
            continue;
        }
        *present = false;
        state.current_level_count -= 1;
        if state.current_level_count == 0 {
            // `lit` is the last current-level literal left in the clause: it is the UIP, and the
            // clause asserts `!lit`.
            state.clause.push(!lit);
            let end = state.clause.len() - 1;
            state.clause.swap(0, end);
            break;
        }

        let reason = impl_graph.reason(lit.var());
        let mut scratch = [Lit::from_dimacs(1)];
        let reason_lits: Vec<Lit> = reason.antecedents(alloc, &mut scratch).to_vec();
        for reason_lit in reason_lits {
            add_literal(state, vsids, impl_graph, trail, reason_lit);
        }
        if let Reason::Long(cref) = reason {
            state.involved.push(cref);
        }
    }

    if minimize {
        minimize_clause(state, alloc, impl_graph, stats);
    }

    for var in state.to_clean.drain(..) {
        state.var_flags[var.index()] = false;
    }

    // Move the literal with the highest remaining level into position 1, so the watched pair
    // after backtracking is (asserting literal, second-highest-level literal).
    let mut backjump_level = 0;
    if state.clause.len() > 1 {
        let (prefix, rest) = state.clause.split_at_mut(2);
        let lit_1 = &mut prefix[1];
        backjump_level = impl_graph.level(lit_1.var());
        for lit in rest.iter_mut() {
            let lit_level = impl_graph.level(lit.var());
            if lit_level > backjump_level {
                backjump_level = lit_level;
                swap(lit_1, lit);
            }
        }
    }

    vsids.decay();

    let clause_lits = state.clause.clone();
    let lbd = compute_lbd(state, impl_graph, &clause_lits);

    AnalyzeResult {
        backjump_level,
        lbd,
    }
}

/// Adds a literal to the clause being built, bumping its variable's activity.
///
/// Level-0 literals are always true and need not appear in the learned clause. Literals at the
/// current decision level are counted rather than stored, since all but one will be resolved
/// away below.
fn add_literal(
    state: &mut AnalyzeConflict,
    vsids: &mut Vsids,
    impl_graph: &ImplGraph,
    trail: &Trail,
    lit: Lit,
) {
    let level = impl_graph.level(lit.var());
    if level > 0 && !state.var_flags[lit.index()] {
        vsids.bump(lit.var());
        state.var_flags[lit.index()] = true;
        if level == trail.current_level() {
            state.current_level_count += 1;
        } else {
            state.clause.push(lit);
            state.to_clean.push(lit.var());
        }
    }
}

/// A Bloom filter of decision levels, used to cheaply rule out non-redundant literals during
/// minimization without an exact set.
#[derive(Default)]
struct LevelAbstraction {
    bits: u64,
}

impl LevelAbstraction {
    fn add(&mut self, level: usize) {
        self.bits |= 1 << (level % 64);
    }

    fn test(&self, level: usize) -> bool {
        self.bits & (1 << (level % 64)) != 0
    }
}

/// Recursive clause minimization (§4.4 step 4).
///
/// A non-UIP literal `q` is redundant if every literal of its reason clause is either already in
/// the learned clause or is itself redundant. This is a DFS over the implication graph, following
/// reason edges backwards from `!q`. The search aborts as soon as it reaches a decision (a literal
/// with no reason) that isn't in the clause, or a literal whose level the clause doesn't touch at
/// all (cheaply ruled out via the level Bloom filter).
///
/// `var_flags` doubles as both "literal is in the clause" and "literal visited during this DFS":
/// when a literal turns out redundant its flag is left set, so later searches don't re-expand it;
/// when the search aborts, every flag set during *this* DFS is rolled back via `to_clean`.
fn minimize_clause(state: &mut AnalyzeConflict, alloc: &ClauseAlloc, impl_graph: &ImplGraph, stats: &mut Stats) {
    let mut involved_levels = LevelAbstraction::default();
    for &lit in &state.clause {
        involved_levels.add(impl_graph.level(lit.var()));
    }

    let mut keep = vec![true; state.clause.len()];
    // Literal 0 (the asserting UIP) is always kept.
    for i in 1..state.clause.len() {
        let lit = state.clause[i];
        if impl_graph.reason(lit.var()).is_decision() {
            continue;
        }

        state.stack.clear();
        state.stack.push(!lit);
        let top = state.to_clean.len();
        let mut redundant = true;

        while let Some(cur) = state.stack.pop() {
            let reason = impl_graph.reason(cur.var());
            let mut scratch = [Lit::from_dimacs(1)];
            let reason_lits: Vec<Lit> = reason.antecedents(alloc, &mut scratch).to_vec();
            for reason_lit in reason_lits {
                let reason_level = impl_graph.level(reason_lit.var());
                if reason_level == 0 || state.var_flags[reason_lit.index()] {
                    continue;
                }
                if impl_graph.reason(reason_lit.var()).is_decision()
                    || !involved_levels.test(reason_level)
                {
                    redundant = false;
                    break;
                }
                state.var_flags[reason_lit.index()] = true;
                state.to_clean.push(reason_lit.var());
                state.stack.push(!reason_lit);
            }
            if !redundant {
                break;
            }
        }

        if !redundant {
            for var in state.to_clean.drain(top..) {
                state.var_flags[var.index()] = false;
            }
        } else {
            keep[i] = false;
        }
    }

    stats.minimized_literals += keep.iter().filter(|&&k| !k).count() as u64;

    let mut i = 0;
    state.clause.retain(|_| {
        let k = keep[i];
        i += 1;
        k
    });
}

/// Literal Block Distance: the number of distinct decision levels among `lits`.
fn compute_lbd(state: &mut AnalyzeConflict, impl_graph: &ImplGraph, lits: &[Lit]) -> u32 {
    let mut lbd = 0;
    for &lit in lits {
        let level = impl_graph.level(lit.var());
        if !state.level_flags[level] {
            state.level_flags[level] = true;
            lbd += 1;
        }
    }
    for &lit in lits {
        state.level_flags[impl_graph.level(lit.var())] = false;
    }
    lbd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::BinaryClauses;
    use crate::lit::lit;
    use crate::prop::{enqueue, Assignment, Watchlists};

    struct Fixture {
        assignment: Assignment,
        trail: Trail,
        impl_graph: ImplGraph,
        watchlists: Watchlists,
        alloc: ClauseAlloc,
        binary: BinaryClauses,
        vsids: Vsids,
        analyze: AnalyzeConflict,
        stats: Stats,
    }

    impl Fixture {
        fn new(num_vars: usize) -> Fixture {
            let mut f = Fixture {
                assignment: Assignment::default(),
                trail: Trail::default(),
                impl_graph: ImplGraph::default(),
                watchlists: Watchlists::default(),
                alloc: ClauseAlloc::default(),
                binary: BinaryClauses::default(),
                vsids: Vsids::default(),
                analyze: AnalyzeConflict::default(),
                stats: Stats::default(),
            };
            f.assignment.set_var_count(num_vars);
            f.impl_graph.set_var_count(num_vars);
            f.watchlists.set_var_count(num_vars);
            f.binary.set_var_count(num_vars);
            f.vsids.set_var_count(num_vars);
            f.analyze.set_var_count(num_vars);
            f
        }

        fn add_long(&mut self, lits: &[Lit]) {
            let cref = self.alloc.allocate(lits, false).unwrap();
            self.watchlists.attach(cref, [lits[0], lits[1]]);
        }

        fn decide(&mut self, lit: Lit) {
            self.trail.new_decision_level();
            enqueue(&mut self.assignment, &mut self.trail, &mut self.impl_graph, lit, Reason::Decision);
        }

        fn propagate(&mut self) -> Result<(), Conflict> {
            crate::prop::propagate(
                &mut self.assignment,
                &mut self.trail,
                &mut self.impl_graph,
                &mut self.watchlists,
                &mut self.alloc,
                &self.binary,
                &mut self.stats,
            )
        }
    }

    #[test]
    fn first_uip_across_two_levels() {
        let mut f = Fixture::new(5);
        // (-1 v -2 v 4): 1, 2 true forces 4.
        f.add_long(&[lit!(-1), lit!(-2), lit!(4)]);
        // (-3 v -4 v 5): 3, 4 true forces 5.
        f.add_long(&[lit!(-3), lit!(-4), lit!(5)]);
        // (-5 v -2): conflicts once 5 and 2 are both true.
        f.binary.add_clause(lit!(-5), lit!(-2));

        f.decide(lit!(1));
        assert!(f.propagate().is_ok());
        f.decide(lit!(2));
        assert!(f.propagate().is_ok());
        assert!(f.assignment.is_true(lit!(4)));
        f.decide(lit!(3));
        let conflict = f.propagate().unwrap_err();

        let mut scratch = [lit!(1), lit!(1)];
        let conflict_lits = conflict.lits(&f.alloc, &mut scratch).to_vec();
        assert_eq!(conflict_lits, vec![lit!(-5), lit!(-2)]);

        let result = analyze(
            &mut f.analyze,
            &mut f.vsids,
            &f.alloc,
            &f.impl_graph,
            &f.trail,
            &conflict,
            &mut f.stats,
        );

        assert_eq!(f.analyze.clause(), &[lit!(-5), lit!(-2)]);
        assert_eq!(result.backjump_level, 2);
        assert_eq!(result.lbd, 2);
    }

    #[test]
    fn conflict_at_level_zero_yields_empty_clause() {
        let mut f = Fixture::new(2);
        f.binary.add_clause(lit!(1), lit!(2));
        f.binary.add_clause(lit!(1), lit!(-2));
        f.binary.add_clause(lit!(-1), lit!(2));

        enqueue(&mut f.assignment, &mut f.trail, &mut f.impl_graph, lit!(-1), Reason::Decision);
        let conflict = f.propagate().unwrap_err();

        let result = analyze(
            &mut f.analyze,
            &mut f.vsids,
            &f.alloc,
            &f.impl_graph,
            &f.trail,
            &conflict,
            &mut f.stats,
        );

        assert_eq!(result.backjump_level, 0);
        assert!(f.analyze.clause().is_empty());
    }

    #[test]
    fn minimize_clause_drops_a_literal_subsumed_by_an_existing_one() {
        // Reason clause (2 v -1): literal 2's only antecedent, -1, is already in the learned
        // clause, so 2 is redundant and should be dropped.
        let mut alloc = ClauseAlloc::new();
        let cref = alloc.allocate(&[lit!(2), lit!(-1)], true).unwrap();

        let mut impl_graph = ImplGraph::default();
        impl_graph.set_var_count(2);
        impl_graph.set(lit!(1).var(), Reason::Decision, 1);
        impl_graph.set(lit!(2).var(), Reason::Long(cref), 2);

        let mut state = AnalyzeConflict::default();
        state.set_var_count(2);
        state.clause = vec![lit!(-1), lit!(2)];
        state.var_flags[lit!(1).var().index()] = true;
        state.var_flags[lit!(2).var().index()] = true;

        let mut stats = Stats::default();
        minimize_clause(&mut state, &alloc, &impl_graph, &mut stats);

        assert_eq!(state.clause, vec![lit!(-1)]);
        assert_eq!(stats.minimized_literals, 1);
    }
}
