//! Solver configuration (§6 "Options").
use crate::restart::RestartStrategy;

/// Tunable knobs for a [`crate::solver::Solver`] run.
///
/// Every field defaults to the value §6 lists; construct with [`SolverConfig::default`] and
/// override only the fields a caller cares about.
#[derive(Copy, Clone, Debug)]
pub struct SolverConfig {
    /// Which restart signal to use. (Default: Luby)
    pub restart_strategy: RestartStrategy,
    /// Scale factor applied to the Luby sequence. (Default: 100)
    pub luby_unit: u64,
    /// EMA smoothing factor for the fast (short-memory) LBD average. (Default: 0.8)
    pub ema_fast: f64,
    /// EMA smoothing factor for the slow (long-memory) LBD average. (Default: 0.9999)
    pub ema_slow: f64,
    /// Conflicts required before the EMA-LBD strategy may fire. (Default: 100)
    pub min_conflicts_before_restart: u64,
    /// Sliding window length for the window-LBD strategy. (Default: 50)
    pub window_size: usize,
    /// Degradation factor required to trigger a window-LBD restart. (Default: 0.8)
    pub window_k: f64,
    /// Restarts are suppressed below this trail length. (Default: 10)
    pub restart_postpone_min_trail: usize,

    /// Conflicts between clause database reductions. (Default: 2000)
    pub reduce_interval: u64,
    /// Fraction of non-glue learnt clauses kept by each reduction. (Default: 0.5)
    pub reduce_fraction: f64,
    /// LBD at or below which a learnt clause is a glue clause, exempt from reduction.
    /// (Default: 2)
    pub glue_lbd: u32,
    /// Learnt clauses with LBD above this are never kept past the conflict that derived them.
    /// (Default: 30)
    pub max_lbd_to_keep: u32,

    /// Whether decisions reuse a variable's last polarity. (Default: true)
    pub phase_saving: bool,
    /// Probability a decision's polarity is chosen uniformly at random. (Default: 0.01)
    pub random_phase_prob: f64,
    /// Whether the random-phase probability increases right after rephasing. (Default: true)
    pub adaptive_random: bool,
    /// Conflicts between rephasing points. (Default: 1000)
    pub rephase_interval: u64,

    /// VSIDS activity decay factor. (Default: 0.95)
    pub var_decay: f64,
    /// Clause activity decay factor. (Default: 0.999)
    pub clause_decay: f64,

    /// Whether learned clauses are run through recursive minimization. (Default: true)
    pub minimize_learned: bool,

    /// Conflict budget for a single `solve()` call. (Default: unlimited)
    pub max_conflicts: Option<u64>,
    /// Decision budget for a single `solve()` call. (Default: unlimited)
    pub max_decisions: Option<u64>,
    /// Wall-clock budget, in seconds, for a single `solve()` call. (Default: unlimited)
    pub time_budget: Option<f64>,
}

impl Default for SolverConfig {
    fn default() -> SolverConfig {
        SolverConfig {
            restart_strategy: RestartStrategy::Luby,
            luby_unit: 100,
            ema_fast: 0.8,
            ema_slow: 0.9999,
            min_conflicts_before_restart: 100,
            window_size: 50,
            window_k: 0.8,
            restart_postpone_min_trail: 10,

            reduce_interval: 2000,
            reduce_fraction: 0.5,
            glue_lbd: 2,
            max_lbd_to_keep: 30,

            phase_saving: true,
            random_phase_prob: 0.01,
            adaptive_random: true,
            rephase_interval: 1000,

            var_decay: 0.95,
            clause_decay: 0.999,

            minimize_learned: true,

            max_conflicts: None,
            max_decisions: None,
            time_budget: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let config = SolverConfig::default();
        assert_eq!(config.restart_strategy, RestartStrategy::Luby);
        assert_eq!(config.luby_unit, 100);
        assert_eq!(config.reduce_interval, 2000);
        assert_eq!(config.reduce_fraction, 0.5);
        assert_eq!(config.glue_lbd, 2);
        assert!(config.phase_saving);
        assert_eq!(config.random_phase_prob, 0.01);
        assert!(config.adaptive_random);
        assert_eq!(config.rephase_interval, 1000);
        assert_eq!(config.var_decay, 0.95);
        assert!(config.minimize_learned);
        assert_eq!(config.max_conflicts, None);
    }
}
