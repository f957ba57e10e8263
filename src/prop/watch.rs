//! Watch lists for two-watched-literal propagation.
//!
//! Each long clause (3+ literals) keeps its first two literals in positions 0 and 1. Those two
//! literals are *watched*: the clause appears in `watches(!lits[0])` and `watches(!lits[1])`. A
//! watch entry also stores a *blocking* literal — some other literal of the clause — so that the
//! propagator can skip a satisfied clause without touching the arena at all (Sörensson & Eén,
//! MiniSat 2.1).
use crate::clause::ClauseRef;
use crate::lit::Lit;

/// One entry in a literal's watch list.
#[derive(Copy, Clone)]
pub struct Watch {
    /// The clause watching this literal's negation.
    pub cref: ClauseRef,
    /// A literal of that clause, other than the watched one, that may short-circuit inspection.
    pub blocking: Lit,
}

/// Per-literal watch lists.
///
/// Buffers grow geometrically via `Vec`'s own growth policy when [`Watchlists::set_var_count`]
/// enlarges them, satisfying the "no linear growth" capacity policy in §4.2.
#[derive(Default)]
pub struct Watchlists {
    watches: Vec<Vec<Watch>>,
}

impl Watchlists {
    pub fn set_var_count(&mut self, num_vars: usize) {
        self.watches.resize_with(num_vars * 2, Vec::new);
    }

    /// Starts watching `cref` on its first two literals, `lits[0]` and `lits[1]`.
    pub fn attach(&mut self, cref: ClauseRef, lits: [Lit; 2]) {
        self.watches[(!lits[0]).code()].push(Watch {
            cref,
            blocking: lits[1],
        });
        self.watches[(!lits[1]).code()].push(Watch {
            cref,
            blocking: lits[0],
        });
    }

    /// Adds a single watch entry directly (used while re-homing a watch during propagation).
    pub fn add_watch(&mut self, lit: Lit, watch: Watch) {
        self.watches[lit.code()].push(watch);
    }

    /// Removes every watch referring to `cref`. Used when a clause is deleted by reduction.
    ///
    /// O(clause count watching the two affected literals); reduction already pays for a full scan
    /// of the clause database, so this does not change the asymptotic cost of a reduce pass.
    pub fn detach(&mut self, cref: ClauseRef, lits: [Lit; 2]) {
        for &lit in &lits {
            let list = &mut self.watches[(!lit).code()];
            if let Some(pos) = list.iter().position(|w| w.cref == cref) {
                list.swap_remove(pos);
            }
        }
    }

    pub fn watches(&self, lit: Lit) -> &[Watch] {
        &self.watches[lit.code()]
    }

    pub fn watches_mut(&mut self, lit: Lit) -> &mut Vec<Watch> {
        &mut self.watches[lit.code()]
    }

    /// Rewrites every [`ClauseRef`] held in watch entries via `relocate`, called after arena
    /// compaction.
    pub fn relocate(&mut self, mut relocate: impl FnMut(ClauseRef) -> ClauseRef) {
        for list in &mut self.watches {
            for watch in list.iter_mut() {
                watch.cref = relocate(watch.cref);
            }
        }
    }
}
