//! Event sink for observing clause lifecycle events (§4.9).
//!
//! Trimmed to exactly the three events the search core can report without extra bookkeeping: a
//! clause was learned, a clause was deleted by reduction, and the empty clause was derived. There
//! is no hash-chaining or proof-format framing here; a caller that wants DRAT/LRAT output builds
//! it on top of this stream.
use crate::lit::Lit;

/// Receives clause lifecycle events as the search progresses.
///
/// All three methods default to doing nothing, so implementors only need to override the events
/// they care about.
pub trait ProofSink {
    /// A new clause (original or learned) became part of the formula.
    fn on_add(&mut self, _literals: &[Lit]) {}

    /// A learned clause was removed by database reduction.
    fn on_delete(&mut self, _literals: &[Lit]) {}

    /// The empty clause was derived: the formula is unsatisfiable.
    fn on_final_empty(&mut self) {}
}

/// A sink that discards every event, used when no proof output is configured.
#[derive(Default)]
pub struct NullSink;

impl ProofSink for NullSink {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lit::lit;

    #[derive(Default)]
    struct RecordingSink {
        added: Vec<Vec<Lit>>,
        deleted: Vec<Vec<Lit>>,
        final_empty: bool,
    }

    impl ProofSink for RecordingSink {
        fn on_add(&mut self, literals: &[Lit]) {
            self.added.push(literals.to_vec());
        }

        fn on_delete(&mut self, literals: &[Lit]) {
            self.deleted.push(literals.to_vec());
        }

        fn on_final_empty(&mut self) {
            self.final_empty = true;
        }
    }

    #[test]
    fn records_every_event_kind() {
        let mut sink = RecordingSink::default();
        sink.on_add(&[lit!(1), lit!(-2)]);
        sink.on_delete(&[lit!(3)]);
        sink.on_final_empty();

        assert_eq!(sink.added, vec![vec![lit!(1), lit!(-2)]]);
        assert_eq!(sink.deleted, vec![vec![lit!(3)]]);
        assert!(sink.final_empty);
    }

    #[test]
    fn null_sink_accepts_everything_silently() {
        let mut sink = NullSink;
        sink.on_add(&[lit!(1)]);
        sink.on_delete(&[lit!(1)]);
        sink.on_final_empty();
    }
}
