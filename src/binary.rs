//! Binary clauses, kept out of the clause arena as a fast path.
//!
//! Grounded on the same idea the spec calls out for watch entries: a binary clause `(a, b)` never
//! needs a watch-list scan to detect when it becomes unit, because as soon as one literal is false
//! the other is forced. Each literal's implication list is walked directly off the trail.
use crate::lit::Lit;

/// Binary clauses, indexed by (falsified) literal.
#[derive(Default)]
pub struct BinaryClauses {
    by_lit: Vec<Vec<Lit>>,
    count: usize,
}

impl BinaryClauses {
    /// Grows per-literal storage to cover `num_vars` variables.
    pub fn set_var_count(&mut self, num_vars: usize) {
        self.by_lit.resize_with(num_vars * 2, Vec::new);
    }

    /// Adds a binary clause `(a, b)`.
    pub fn add_clause(&mut self, a: Lit, b: Lit) {
        self.by_lit[(!a).code()].push(b);
        self.by_lit[(!b).code()].push(a);
        self.count += 1;
    }

    /// Literals implied by `lit` being true, i.e. the other literal of every binary clause
    /// containing `!lit`.
    pub fn implied_by(&self, lit: Lit) -> &[Lit] {
        &self.by_lit[lit.code()]
    }

    pub fn count(&self) -> usize {
        self.count
    }
}
