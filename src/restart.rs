//! Restart scheduling: Luby, EMA-LBD, and sliding-window-LBD strategies, with postponement
//! (§4.6).
//!
//! All three strategies track their state unconditionally regardless of which one is active;
//! picking a strategy only changes which signal `should_restart` consults. This keeps switching
//! strategies mid-run (not currently exposed, but cheap) free of any transition cost.
use std::collections::VecDeque;

pub mod luby;

use luby::LubySequence;

/// Which signal triggers a restart.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum RestartStrategy {
    Luby,
    EmaLbd,
    WindowLbd,
}

impl Default for RestartStrategy {
    fn default() -> RestartStrategy {
        RestartStrategy::Luby
    }
}

/// Tunables for all three strategies, mirroring the solver's configuration (§6).
#[derive(Copy, Clone, Debug)]
pub struct RestartParams {
    pub strategy: RestartStrategy,
    pub luby_unit: u64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub min_conflicts: u64,
    pub window_size: usize,
    pub window_k: f64,
    /// Restarts are suppressed while the trail is shorter than this, to avoid discarding
    /// progress that hasn't had a chance to accumulate yet.
    pub postpone_min_trail: usize,
}

impl Default for RestartParams {
    fn default() -> RestartParams {
        RestartParams {
            strategy: RestartStrategy::Luby,
            luby_unit: 100,
            ema_fast: 0.8,
            ema_slow: 0.9999,
            min_conflicts: 100,
            window_size: 50,
            window_k: 0.8,
            postpone_min_trail: 10,
        }
    }
}

/// Running state for every restart strategy, plus the active selection.
pub struct RestartController {
    params: RestartParams,

    luby: LubySequence,
    luby_term: u64,
    conflicts_since_restart: u64,

    fast_ema: f64,
    slow_ema: f64,
    total_conflicts: u64,

    window: VecDeque<u32>,
    window_sum: f64,
    total_lbd_sum: f64,
    total_lbd_count: u64,
}

impl Default for RestartController {
    fn default() -> RestartController {
        RestartController::new(RestartParams::default())
    }
}

impl RestartController {
    pub fn new(params: RestartParams) -> RestartController {
        let mut luby = LubySequence::default();
        let luby_term = luby.advance();
        RestartController {
            params,
            luby,
            luby_term,
            conflicts_since_restart: 0,
            fast_ema: 0.0,
            slow_ema: 0.0,
            total_conflicts: 0,
            window: VecDeque::with_capacity(params.window_size),
            window_sum: 0.0,
            total_lbd_sum: 0.0,
            total_lbd_count: 0,
        }
    }

    /// Feeds the LBD of a just-learned clause into every strategy's running state.
    pub fn record_conflict(&mut self, lbd: u32) {
        self.conflicts_since_restart += 1;
        self.total_conflicts += 1;

        if self.total_lbd_count == 0 {
            self.fast_ema = lbd as f64;
            self.slow_ema = lbd as f64;
        } else {
            self.fast_ema = self.params.ema_fast * self.fast_ema + (1.0 - self.params.ema_fast) * lbd as f64;
            self.slow_ema = self.params.ema_slow * self.slow_ema + (1.0 - self.params.ema_slow) * lbd as f64;
        }

        self.total_lbd_sum += lbd as f64;
        self.total_lbd_count += 1;

        self.window.push_back(lbd);
        self.window_sum += lbd as f64;
        if self.window.len() > self.params.window_size {
            if let Some(evicted) = self.window.pop_front() {
                self.window_sum -= evicted as f64;
            }
        }
    }

    fn signal(&self) -> bool {
        match self.params.strategy {
            RestartStrategy::Luby => {
                self.conflicts_since_restart >= self.luby_term * self.params.luby_unit
            }
            RestartStrategy::EmaLbd => {
                self.total_conflicts >= self.params.min_conflicts && self.fast_ema > self.slow_ema
            }
            RestartStrategy::WindowLbd => {
                if self.window.len() < self.params.window_size || self.total_lbd_count == 0 {
                    return false;
                }
                let window_mean = self.window_sum / self.window.len() as f64;
                let overall_mean = self.total_lbd_sum / self.total_lbd_count as f64;
                window_mean > self.params.window_k * overall_mean
            }
        }
    }

    /// Whether the active strategy's signal fires, subject to postponement.
    pub fn should_restart(&self, trail_len: usize) -> bool {
        trail_len >= self.params.postpone_min_trail && self.signal()
    }

    /// Called once a restart actually happens, to reset per-restart bookkeeping.
    pub fn note_restart(&mut self) {
        self.conflicts_since_restart = 0;
        self.luby_term = self.luby.advance();
        self.window.clear();
        self.window_sum = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luby_restart_fires_at_scaled_terms() {
        let mut ctrl = RestartController::new(RestartParams {
            luby_unit: 2,
            ..RestartParams::default()
        });
        // First Luby term is 1, so threshold is 1 * 2 = 2 conflicts.
        ctrl.record_conflict(3);
        assert!(!ctrl.should_restart(100));
        ctrl.record_conflict(3);
        assert!(ctrl.should_restart(100));

        ctrl.note_restart();
        // Second term is also 1: threshold 2 again.
        ctrl.record_conflict(3);
        assert!(!ctrl.should_restart(100));
        ctrl.record_conflict(3);
        assert!(ctrl.should_restart(100));
    }

    #[test]
    fn postponement_suppresses_firing_on_a_short_trail() {
        let mut ctrl = RestartController::new(RestartParams {
            luby_unit: 1,
            postpone_min_trail: 10,
            ..RestartParams::default()
        });
        ctrl.record_conflict(3);
        assert!(ctrl.signal());
        assert!(!ctrl.should_restart(5));
        assert!(ctrl.should_restart(10));
    }

    #[test]
    fn ema_lbd_fires_once_fast_overtakes_slow() {
        let mut ctrl = RestartController::new(RestartParams {
            strategy: RestartStrategy::EmaLbd,
            min_conflicts: 3,
            ..RestartParams::default()
        });
        for _ in 0..3 {
            ctrl.record_conflict(2);
        }
        assert!(!ctrl.should_restart(100));
        for _ in 0..10 {
            ctrl.record_conflict(50);
        }
        assert!(ctrl.should_restart(100));
    }

    #[test]
    fn window_lbd_waits_for_a_full_window() {
        let mut ctrl = RestartController::new(RestartParams {
            strategy: RestartStrategy::WindowLbd,
            window_size: 4,
            window_k: 1.0,
            ..RestartParams::default()
        });
        ctrl.record_conflict(2);
        ctrl.record_conflict(2);
        ctrl.record_conflict(2);
        assert!(!ctrl.should_restart(100));

        ctrl.record_conflict(2);
        assert!(!ctrl.should_restart(100));

        for _ in 0..4 {
            ctrl.record_conflict(20);
        }
        assert!(ctrl.should_restart(100));
    }
}
