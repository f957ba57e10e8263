//! Boolean constraint propagation (unit propagation).
use crate::binary::BinaryClauses;
use crate::clause::ClauseAlloc;
use crate::lit::Lit;
use crate::stats::Stats;

use super::assignment::{enqueue, Assignment, Trail};
use super::graph::{Conflict, ImplGraph, Reason};
use super::watch::{Watch, Watchlists};

/// Propagates every pending trail entry to fixpoint, or returns the first conflict found.
///
/// On conflict, the propagation head is left past the literal that produced it; entries queued
/// before the conflict remain processed, satisfying the invariant that only the conflicting clause
/// may be left without a non-false watch (§3, invariant 5).
///
/// Counts one propagation per trail entry dequeued into `stats.propagations` (§6): each such entry
/// is what drives a round of watched-clause inspection below.
pub fn propagate(
    assignment: &mut Assignment,
    trail: &mut Trail,
    impl_graph: &mut ImplGraph,
    watchlists: &mut Watchlists,
    alloc: &mut ClauseAlloc,
    binary: &BinaryClauses,
    stats: &mut Stats,
) -> Result<(), Conflict> {
    while let Some(p) = trail.next_to_propagate() {
        trail.advance_queue();
        stats.propagations += 1;

        if let Some(conflict) = propagate_binary(assignment, trail, impl_graph, binary, p) {
            return Err(conflict);
        }

        propagate_long(assignment, trail, impl_graph, watchlists, alloc, p)?;
    }
    Ok(())
}

/// Enqueues every literal implied by `p` through a binary clause, or detects a conflict.
fn propagate_binary(
    assignment: &mut Assignment,
    trail: &mut Trail,
    impl_graph: &mut ImplGraph,
    binary: &BinaryClauses,
    p: Lit,
) -> Option<Conflict> {
    for &implied in binary.implied_by(p) {
        if assignment.is_false(implied) {
            return Some(Conflict::Binary(!p, implied));
        }
        if assignment.is_unassigned(implied) {
            enqueue(assignment, trail, impl_graph, implied, Reason::Binary(!p));
        }
    }
    None
}

/// Scans the watch list of `p` — the clauses watching literal `!p`, which just became false —
/// restoring the two-watched-literal invariant and enqueuing any resulting unit propagations.
///
/// This is the "iterate-and-rewrite" idiom: `read` walks the existing list while `write` appends
/// the watches that are kept, so a watch can be dropped (by not advancing `write`) or replace
/// itself in a *different* literal's list (via [`Watchlists::add_watch`]) without any out-of-place
/// allocation. The list is truncated to `write` once the scan completes.
fn propagate_long(
    assignment: &mut Assignment,
    trail: &mut Trail,
    impl_graph: &mut ImplGraph,
    watchlists: &mut Watchlists,
    alloc: &mut ClauseAlloc,
    p: Lit,
) -> Result<(), Conflict> {
    // Clauses watching literal `!p` are recorded under index `p` (see `Watchlists::attach`):
    // `!p` just became false, so those are exactly the clauses that may need rewatching.
    let false_lit = !p;
    let list = std::mem::take(watchlists.watches_mut(p));
    let mut result = Ok(());

    let mut write = 0;
    let mut read = 0;
    let mut kept = list;

    while read < kept.len() {
        let watch = kept[read];
        read += 1;

        if assignment.is_true(watch.blocking) {
            kept[write] = watch;
            write += 1;
            continue;
        }

        let cref = watch.cref;
        let lits = alloc.lits_mut(cref);

        // Ensure the *other* watched literal lives at position 0.
        if lits[0] == false_lit {
            lits.swap(0, 1);
        }
        debug_assert_eq!(lits[1], false_lit);

        let first = lits[0];
        let new_watch = Watch {
            cref,
            blocking: first,
        };

        if first != watch.blocking && assignment.is_true(first) {
            kept[write] = new_watch;
            write += 1;
            continue;
        }

        let mut replaced = false;
        for i in 2..lits.len() {
            if !assignment.is_false(lits[i]) {
                lits.swap(1, i);
                let new_blocking_lit = lits[1];
                watchlists.add_watch(!new_blocking_lit, new_watch);
                replaced = true;
                break;
            }
        }
        if replaced {
            continue;
        }

        kept[write] = new_watch;
        write += 1;

        if assignment.is_false(first) {
            // Conflict. Copy over the remaining unprocessed watches verbatim before bailing.
            while read < kept.len() {
                kept[write] = kept[read];
                write += 1;
                read += 1;
            }
            result = Err(Conflict::Long(cref));
            break;
        }

        enqueue(assignment, trail, impl_graph, first, Reason::Long(cref));
    }

    kept.truncate(write);
    *watchlists.watches_mut(p) = kept;
    result
}
