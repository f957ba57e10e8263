//! The VSIDS branching heuristic (§4.5).
//!
//! Keeps an activity value per variable, bumped for every variable touched during conflict
//! analysis and periodically decayed. Decisions pick the unassigned variable with the highest
//! activity.
//!
//! As an optimization, instead of decaying every activity on each conflict, the bump increment
//! itself is divided by the decay factor; this is equivalent up to a common scale factor, and only
//! relative order matters here. Values (and the bump) are periodically rescaled to avoid overflow.
use ordered_float::OrderedFloat;

use crate::lit::Var;

/// Activity-ordered max-heap over unassigned variables.
pub struct Vsids {
    activity: Vec<OrderedFloat<f32>>,
    heap: Vec<Var>,
    position: Vec<Option<usize>>,
    bump: f32,
    inv_decay: f32,
}

impl Default for Vsids {
    fn default() -> Vsids {
        Vsids {
            activity: vec![],
            heap: vec![],
            position: vec![],
            bump: 1.0,
            inv_decay: 1.0 / 0.95,
        }
    }
}

impl Vsids {
    pub fn set_var_count(&mut self, count: usize) {
        let old_count = self.activity.len();
        debug_assert!(!self.heap.iter().any(|&v| v.index() >= count));
        self.activity.resize(count, OrderedFloat(0.0));
        self.position.resize(count, None);

        for i in old_count..count {
            self.make_available(Var::from_index(i));
        }
    }

    fn rescale_limit() -> f32 {
        f32::MAX / 16.0
    }

    pub fn set_decay(&mut self, decay: f64) {
        assert!(decay < 1.0 && decay > 1.0 / 16.0);
        self.inv_decay = 1.0 / decay as f32;
    }

    pub fn activity(&self, var: Var) -> f32 {
        self.activity[var.index()].0
    }

    /// Whether `a` should sit above `b` in the heap: higher activity first, ties broken toward
    /// the smaller variable identifier for deterministic runs.
    fn higher_priority(&self, a: Var, b: Var) -> bool {
        let (aa, ab) = (self.activity[a.index()], self.activity[b.index()]);
        aa > ab || (aa == ab && a.index() < b.index())
    }

    /// Increases `var`'s activity by the current bump value.
    pub fn bump(&mut self, var: Var) {
        let rescale = {
            let value = &mut self.activity[var.index()];
            value.0 += self.bump;
            value.0 >= Self::rescale_limit()
        };
        if rescale {
            self.rescale();
        }
        if let Some(pos) = self.position[var.index()] {
            self.sift_up(pos);
        }
    }

    /// Decays the global bump value, applied once per conflict.
    pub fn decay(&mut self) {
        self.bump *= self.inv_decay;
        if self.bump >= Self::rescale_limit() {
            self.rescale();
        }
    }

    fn rescale(&mut self) {
        let factor = 1.0 / Self::rescale_limit();
        for activity in &mut self.activity {
            activity.0 *= factor;
        }
        self.bump *= factor;
    }

    /// Re-inserts `var` into the heap if it isn't already present. Used both for never-decided
    /// variables and for variables freed by backtracking.
    pub fn make_available(&mut self, var: Var) {
        if self.position[var.index()].is_none() {
            let position = self.heap.len();
            self.position[var.index()] = Some(position);
            self.heap.push(var);
            self.sift_up(position);
        }
    }

    fn sift_up(&mut self, mut pos: usize) {
        let var = self.heap[pos];
        loop {
            if pos == 0 {
                return;
            }
            let parent_pos = (pos - 1) / 2;
            let parent_var = self.heap[parent_pos];
            if self.higher_priority(parent_var, var) {
                return;
            }
            self.position[var.index()] = Some(parent_pos);
            self.heap[parent_pos] = var;
            self.position[parent_var.index()] = Some(pos);
            self.heap[pos] = parent_var;
            pos = parent_pos;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let var = self.heap[pos];
        loop {
            let mut largest_pos = pos;
            let mut largest_var = var;

            let left_pos = pos * 2 + 1;
            if left_pos < self.heap.len() {
                let left_var = self.heap[left_pos];
                if self.higher_priority(left_var, largest_var) {
                    largest_pos = left_pos;
                    largest_var = left_var;
                }
            }

            let right_pos = pos * 2 + 2;
            if right_pos < self.heap.len() {
                let right_var = self.heap[right_pos];
                if self.higher_priority(right_var, largest_var) {
                    largest_pos = right_pos;
                    largest_var = right_var;
                }
            }

            if largest_pos == pos {
                return;
            }

            self.position[var.index()] = Some(largest_pos);
            self.heap[largest_pos] = var;
            self.position[largest_var.index()] = Some(pos);
            self.heap[pos] = largest_var;
            pos = largest_pos;
        }
    }

    /// Removes and returns the variable with the highest activity, or `None` if the heap is
    /// empty. Callers are responsible for skipping any result that turns out to already be
    /// assigned (lazy deletion, §4.5).
    pub fn pop_max(&mut self) -> Option<Var> {
        if self.heap.is_empty() {
            return None;
        }
        let var = self.heap.swap_remove(0);
        if !self.heap.is_empty() {
            let top_var = self.heap[0];
            self.position[top_var.index()] = Some(0);
            self.sift_down(0);
        }
        self.position[var.index()] = None;
        Some(var)
    }
}
