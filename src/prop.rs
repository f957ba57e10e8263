//! Unit propagation: the trail, the implication graph, watch lists, and BCP itself.
pub mod assignment;
pub mod graph;
pub mod propagate;
pub mod watch;

pub use assignment::{backtrack, enqueue, Assignment, Trail};
pub use graph::{Conflict, ImplGraph, Reason};
pub use propagate::propagate;
pub use watch::{Watch, Watchlists};
