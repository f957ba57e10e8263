//! Clause activity bumping and decay, mirroring the VSIDS treatment given to variables.
//!
//! Per-clause activity values live in the clause's own header; this module only tracks the global
//! bump increment and rescales every clause's activity when that increment risks overflowing an
//! `f32`.
use super::{ClauseAlloc, ClauseDb};

/// Global state for clause activity bumping, shared across all learnt clauses.
pub struct ClauseActivity {
    bump: f32,
    inv_decay: f32,
}

impl Default for ClauseActivity {
    fn default() -> ClauseActivity {
        ClauseActivity {
            bump: 1.0,
            inv_decay: 1.0 / 0.999,
        }
    }
}

impl ClauseActivity {
    pub fn set_decay(&mut self, decay: f64) {
        assert!(decay < 1.0 && decay > 1.0 / 16.0);
        self.inv_decay = 1.0 / decay as f32;
    }
}

fn rescale_limit() -> f32 {
    f32::MAX / 16.0
}

/// Bumps `cref`'s activity, rescaling every learnt clause's activity if it would overflow.
pub fn bump_clause_activity(
    activity: &mut ClauseActivity,
    alloc: &mut ClauseAlloc,
    db: &ClauseDb,
    cref: super::ClauseRef,
) {
    let header = alloc.header_mut(cref);
    let bumped = header.activity + activity.bump;
    header.activity = bumped;

    if bumped > rescale_limit() {
        rescale_clause_activities(activity, alloc, db);
    }
}

fn rescale_clause_activities(activity: &mut ClauseActivity, alloc: &mut ClauseAlloc, db: &ClauseDb) {
    let factor = 1.0 / rescale_limit();
    for &cref in db.learnt_clauses() {
        let header = alloc.header_mut(cref);
        if !header.deleted {
            header.activity *= factor;
        }
    }
    activity.bump *= factor;
}

/// Decays the global clause activity bump, applied once per conflict.
pub fn decay_clause_activity(activity: &mut ClauseActivity, alloc: &mut ClauseAlloc, db: &ClauseDb) {
    activity.bump *= activity.inv_decay;
    if activity.bump >= rescale_limit() {
        rescale_clause_activities(activity, alloc, db);
    }
}
