//! The top-level solver: owns every component and drives the Search Orchestrator (§4.8).
use std::time::Instant;

use crate::binary::BinaryClauses;
use crate::clause::activity::{bump_clause_activity, decay_clause_activity, ClauseActivity};
use crate::clause::reduce::reduce;
use crate::clause::{ClauseAlloc, ClauseDb, ClauseView};
use crate::config::SolverConfig;
use crate::decision::DecisionHeuristic;
use crate::error::{BudgetReason, SolverError};
use crate::lit::{Lit, Var};
use crate::prop::{backtrack, enqueue, propagate, Assignment, ImplGraph, Reason, Trail, Watchlists};
use crate::proof::ProofSink;
use crate::restart::{RestartController, RestartParams};
use crate::stats::Stats;
use crate::variables::PhaseState;
use crate::vsids::Vsids;
use crate::analyze::{self, analyze_with_minimization};

/// The result of a [`Solver::solve`] call.
#[derive(Debug)]
pub enum Outcome {
    Sat,
    Unsat,
    Unknown(BudgetReason),
}

fn restart_params(config: &SolverConfig) -> RestartParams {
    RestartParams {
        strategy: config.restart_strategy,
        luby_unit: config.luby_unit,
        ema_fast: config.ema_fast,
        ema_slow: config.ema_slow,
        min_conflicts: config.min_conflicts_before_restart,
        window_size: config.window_size,
        window_k: config.window_k,
        postpone_min_trail: config.restart_postpone_min_trail,
    }
}

/// Owns every piece of solver state and wires them together into the CDCL loop.
///
/// Non-incremental: clauses should be added with [`Solver::add_clause`] before the first
/// [`Solver::solve`] call. Nothing prevents calling `add_clause` afterward, but the core makes no
/// promise of reusing prior search progress across it.
pub struct Solver {
    config: SolverConfig,
    var_count: usize,
    unsat: bool,

    assignment: Assignment,
    trail: Trail,
    impl_graph: ImplGraph,
    watchlists: Watchlists,
    alloc: ClauseAlloc,
    binary: BinaryClauses,
    db: ClauseDb,
    clause_activity: ClauseActivity,
    vsids: Vsids,
    analyze: analyze::AnalyzeConflict,
    phases: PhaseState,
    decision: DecisionHeuristic,
    restarts: RestartController,
    stats: Stats,
    proof_sink: Option<Box<dyn ProofSink>>,

    conflicts_since_reduce: u64,
    scratch: Vec<Lit>,
    simplified: Vec<Lit>,
}

impl Default for Solver {
    fn default() -> Solver {
        Solver::new(SolverConfig::default())
    }
}

impl Solver {
    pub fn new(config: SolverConfig) -> Solver {
        let mut vsids = Vsids::default();
        vsids.set_decay(config.var_decay);

        let mut clause_activity = ClauseActivity::default();
        clause_activity.set_decay(config.clause_decay);

        let mut decision = DecisionHeuristic::default();
        decision.phase_saving = config.phase_saving;
        decision.random_phase_prob = config.random_phase_prob;
        decision.adaptive_random = config.adaptive_random;
        decision.rephase_interval = config.rephase_interval;

        Solver {
            restarts: RestartController::new(restart_params(&config)),
            config,
            var_count: 0,
            unsat: false,

            assignment: Assignment::default(),
            trail: Trail::default(),
            impl_graph: ImplGraph::default(),
            watchlists: Watchlists::default(),
            alloc: ClauseAlloc::default(),
            binary: BinaryClauses::default(),
            db: ClauseDb::default(),
            clause_activity,
            vsids,
            analyze: analyze::AnalyzeConflict::default(),
            phases: PhaseState::default(),
            decision,
            stats: Stats::default(),
            proof_sink: None,

            conflicts_since_reduce: 0,
            scratch: Vec::new(),
            simplified: Vec::new(),
        }
    }

    pub fn set_proof_sink(&mut self, sink: Box<dyn ProofSink>) {
        self.proof_sink = Some(sink);
    }

    pub fn seed_decisions(&mut self, seed: u64) {
        self.decision.seed(seed);
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Allocates a fresh variable identifier, growing every per-variable structure to match.
    pub fn new_variable(&mut self) -> Var {
        let var = Var::from_index(self.var_count);
        self.var_count += 1;
        self.grow_to(self.var_count);
        var
    }

    fn grow_to(&mut self, count: usize) {
        self.assignment.set_var_count(count);
        self.impl_graph.set_var_count(count);
        self.watchlists.set_var_count(count);
        self.binary.set_var_count(count);
        self.vsids.set_var_count(count);
        self.analyze.set_var_count(count);
        self.phases.set_var_count(count);
    }

    /// Adds a clause to the formula (§6 "Formula ingestion interface").
    ///
    /// Duplicate literals are removed, tautological clauses are dropped with no effect, and
    /// literals already false at level 0 are dropped from the stored clause. Variables referenced
    /// here must already have been allocated with [`Solver::new_variable`].
    pub fn add_clause(&mut self, literals: &[Lit]) -> Result<(), SolverError> {
        debug_assert!(self.trail.current_level() == 0);
        debug_assert!(literals.iter().all(|lit| lit.var().index() < self.var_count));

        if self.unsat {
            return Ok(());
        }

        self.scratch.clear();
        self.scratch.extend_from_slice(literals);
        self.scratch.sort_unstable();
        self.scratch.dedup();

        let mut last = None;
        for &lit in self.scratch.iter() {
            if last == Some(!lit) {
                return Ok(());
            }
            last = Some(lit);
        }

        self.simplified.clear();
        for &lit in self.scratch.iter() {
            match self.assignment.lit_value(lit) {
                Some(true) => return Ok(()),
                Some(false) => {}
                None => self.simplified.push(lit),
            }
        }

        if let Some(sink) = self.proof_sink.as_deref_mut() {
            sink.on_add(&self.simplified);
        }

        match self.simplified.len() {
            0 => {
                self.unsat = true;
                if let Some(sink) = self.proof_sink.as_deref_mut() {
                    sink.on_final_empty();
                }
                Err(SolverError::ImmediateUnsat)
            }
            1 => {
                // Only enqueued here, not propagated: a later `add_clause` call may still
                // supply the binary/long clause this unit's consequences depend on. The first
                // `solve()` call runs propagation to fixpoint before making any decision, which
                // is where a conflict among accumulated units is actually discovered (§6).
                let lit = self.simplified[0];
                enqueue(&mut self.assignment, &mut self.trail, &mut self.impl_graph, lit, Reason::Decision);
                Ok(())
            }
            2 => {
                self.binary.add_clause(self.simplified[0], self.simplified[1]);
                Ok(())
            }
            _ => {
                let cref = self.alloc.allocate(&self.simplified, false)?;
                let lits = [self.simplified[0], self.simplified[1]];
                self.watchlists.attach(cref, lits);
                Ok(())
            }
        }
    }

    /// The learnt clauses currently live in the database, for introspection and testing.
    pub fn learnt_clauses(&self) -> impl Iterator<Item = ClauseView> + '_ {
        let alloc = &self.alloc;
        self.db.learnt_clauses().iter().map(move |&cref| ClauseView {
            header: alloc.header(cref),
            lits: alloc.lits(cref),
        })
    }

    /// Runs the Search Orchestrator main loop until a definite verdict or a budget is exhausted.
    pub fn solve(&mut self) -> Result<Outcome, SolverError> {
        if self.unsat {
            return Ok(Outcome::Unsat);
        }

        let start = Instant::now();

        loop {
            if let Some(max_conflicts) = self.config.max_conflicts {
                if self.stats.conflicts > max_conflicts {
                    return Ok(Outcome::Unknown(BudgetReason::Conflicts));
                }
            }
            if let Some(max_decisions) = self.config.max_decisions {
                if self.stats.decisions > max_decisions {
                    return Ok(Outcome::Unknown(BudgetReason::Decisions));
                }
            }
            if let Some(time_budget) = self.config.time_budget {
                if start.elapsed().as_secs_f64() > time_budget {
                    return Ok(Outcome::Unknown(BudgetReason::Time));
                }
            }

            let propagation = propagate(
                &mut self.assignment,
                &mut self.trail,
                &mut self.impl_graph,
                &mut self.watchlists,
                &mut self.alloc,
                &self.binary,
                &mut self.stats,
            );

            match propagation {
                Err(conflict) => {
                    self.stats.record_conflict();

                    if self.trail.current_level() == 0 {
                        self.unsat = true;
                        if let Some(sink) = self.proof_sink.as_deref_mut() {
                            sink.on_final_empty();
                        }
                        return Ok(Outcome::Unsat);
                    }

                    let result = analyze_with_minimization(
                        &mut self.analyze,
                        &mut self.vsids,
                        &self.alloc,
                        &self.impl_graph,
                        &self.trail,
                        &conflict,
                        self.config.minimize_learned,
                        &mut self.stats,
                    );

                    for &cref in self.analyze.involved() {
                        bump_clause_activity(&mut self.clause_activity, &mut self.alloc, &self.db, cref);
                    }
                    decay_clause_activity(&mut self.clause_activity, &mut self.alloc, &self.db);

                    backtrack(&mut self.assignment, &mut self.trail, &mut self.vsids, result.backjump_level);

                    let clause = self.analyze.clause().to_vec();
                    let is_glue = result.lbd <= self.config.glue_lbd;

                    if let Some(sink) = self.proof_sink.as_deref_mut() {
                        sink.on_add(&clause);
                    }

                    match clause.len() {
                        0 => {
                            self.unsat = true;
                            if let Some(sink) = self.proof_sink.as_deref_mut() {
                                sink.on_final_empty();
                            }
                            return Ok(Outcome::Unsat);
                        }
                        1 => {
                            enqueue(&mut self.assignment, &mut self.trail, &mut self.impl_graph, clause[0], Reason::Decision);
                        }
                        2 => {
                            self.binary.add_clause(clause[0], clause[1]);
                            enqueue(
                                &mut self.assignment,
                                &mut self.trail,
                                &mut self.impl_graph,
                                clause[0],
                                Reason::Binary(clause[1]),
                            );
                        }
                        _ => {
                            let cref = self.alloc.allocate(&clause, true)?;
                            self.alloc.header_mut(cref).lbd = result.lbd;
                            self.watchlists.attach(cref, [clause[0], clause[1]]);
                            self.db.add_learnt(cref);
                            enqueue(
                                &mut self.assignment,
                                &mut self.trail,
                                &mut self.impl_graph,
                                clause[0],
                                Reason::Long(cref),
                            );
                        }
                    }

                    self.stats.record_learned_clause(result.lbd, is_glue);
                    self.restarts.record_conflict(result.lbd);

                    self.conflicts_since_reduce += 1;
                    // Size-based trigger (§4.7): reduce as soon as the learnt database grows past
                    // a multiple of the problem size, independent of the conflict-interval clock,
                    // so reduction keeps pace with instances that learn clauses unusually fast.
                    let size_due = self.db.len() as u64 > self.var_count as u64 * 4 + 1000;
                    if self.conflicts_since_reduce >= self.config.reduce_interval || size_due {
                        self.conflicts_since_reduce = 0;
                        let mut proof_sink = self.proof_sink.take();
                        reduce(
                            &mut self.db,
                            &mut self.alloc,
                            &mut self.watchlists,
                            &self.trail,
                            &self.impl_graph,
                            &mut self.stats,
                            self.config.glue_lbd,
                            self.config.reduce_fraction,
                            self.config.max_lbd_to_keep,
                            |lits| {
                                if let Some(sink) = proof_sink.as_deref_mut() {
                                    sink.on_delete(lits);
                                }
                            },
                        );
                        self.proof_sink = proof_sink;
                    }

                    if self.decision.record_conflict() {
                        self.phases.rephase_to_best(&mut self.assignment, self.var_count);
                    }
                }
                Ok(()) => {
                    self.phases.observe_depth(&self.trail);

                    if self.restarts.should_restart(self.trail.trail().len()) {
                        backtrack(&mut self.assignment, &mut self.trail, &mut self.vsids, 0);
                        self.restarts.note_restart();
                        self.stats.restarts += 1;
                    }

                    match self.decision.pick_var(&mut self.vsids, &self.assignment) {
                        None => return Ok(Outcome::Sat),
                        Some(var) => {
                            let lit = self.decision.literal_for(var, &self.assignment, &self.phases);
                            self.trail.new_decision_level();
                            enqueue(&mut self.assignment, &mut self.trail, &mut self.impl_graph, lit, Reason::Decision);
                            self.stats.decisions += 1;
                        }
                    }
                }
            }
        }
    }

    /// The truth value assigned to `var`. Only meaningful after `solve()` returns
    /// [`Outcome::Sat`].
    pub fn model(&self, var: Var) -> bool {
        self.assignment.var_value(var).unwrap_or(false)
    }
}
