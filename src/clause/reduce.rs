//! Learned-clause database reduction (§4.7).
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::lit::Lit;
use crate::prop::{ImplGraph, Reason, Trail, Watchlists};
use crate::stats::Stats;

use super::{ClauseAlloc, ClauseDb, ClauseRef};

/// Deletes the worse half of non-glue learnt clauses, keeping glue clauses and anything currently
/// serving as a reason for a trail assignment.
///
/// Non-glue, unprotected clauses whose LBD exceeds `max_lbd_to_keep` are always deleted, on top of
/// the fraction-based cutoff below (§4.7).
///
/// `on_delete` is invoked with the literals of every deleted clause before it is tombstoned, so a
/// caller can forward an [`crate::proof::Delete`] event.
pub fn reduce(
    db: &mut ClauseDb,
    alloc: &mut ClauseAlloc,
    watchlists: &mut Watchlists,
    trail: &Trail,
    impl_graph: &ImplGraph,
    stats: &mut Stats,
    glue_lbd: u32,
    reduce_fraction: f64,
    max_lbd_to_keep: u32,
    mut on_delete: impl FnMut(&[Lit]),
) {
    db.retain_live(alloc);

    let protected: HashSet<ClauseRef> = trail
        .trail()
        .iter()
        .filter_map(|lit| match impl_graph.reason(lit.var()) {
            Reason::Long(cref) => Some(cref),
            _ => None,
        })
        .collect();

    let mut candidates: Vec<ClauseRef> = db
        .learnt_clauses()
        .iter()
        .copied()
        .filter(|&cref| {
            let header = alloc.header(cref);
            !header.is_glue(glue_lbd) && !protected.contains(&cref)
        })
        .collect();

    // (lbd asc, activity desc): clauses worth keeping sort to the front. Past-the-cap clauses
    // sort to the very back regardless of activity, so the force-delete split below lines up
    // with the fraction-based one.
    candidates.sort_unstable_by(|&a, &b| {
        let ha = alloc.header(a);
        let hb = alloc.header(b);
        let over_cap_a = ha.lbd() > max_lbd_to_keep;
        let over_cap_b = hb.lbd() > max_lbd_to_keep;
        over_cap_a
            .cmp(&over_cap_b)
            .then_with(|| ha.lbd().cmp(&hb.lbd()))
            .then_with(|| hb.activity().partial_cmp(&ha.activity()).unwrap_or(Ordering::Equal))
    });

    let over_cap_count = candidates.iter().filter(|&&cref| alloc.header(cref).lbd() > max_lbd_to_keep).count();
    let under_cap_count = candidates.len() - over_cap_count;

    let delete_count = (under_cap_count as f64 * (1.0 - reduce_fraction)).round() as usize;
    let keep = under_cap_count.saturating_sub(delete_count);

    for &cref in &candidates[keep..] {
        let lits = alloc.lits(cref);
        on_delete(lits);
        watchlists.detach(cref, [lits[0], lits[1]]);
        alloc.mark_deleted(cref);
        stats.deleted_clauses += 1;
    }

    db.retain_live(alloc);
    stats.reductions += 1;
}
