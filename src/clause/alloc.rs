//! Clause allocator.
//!
//! Clauses of 3 or more literals live here in two parallel buffers: one holding metadata headers,
//! one holding literals contiguously. [`ClauseRef`] is a stable opaque handle (an index into the
//! header buffer) that remains valid until an explicit [`ClauseAlloc::compact`]. Binary and unit
//! clauses never reach the arena — see [`crate::binary::BinaryClauses`] and the unit-propagation
//! path in [`crate::solver`].
use crate::error::SolverError;
use crate::lit::Lit;

use super::ClauseHeader;

/// Opaque, stable reference to a clause stored in a [`ClauseAlloc`].
///
/// Backed by a plain index rather than a raw pointer or byte offset, so the allocator's backing
/// `Vec`s can grow without invalidating outstanding references.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct ClauseRef(u32);

impl ClauseRef {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone)]
struct Span {
    offset: u32,
    len: u32,
}

/// Bump allocator for clause storage.
///
/// Clauses cannot be freed individually; [`ClauseAlloc::mark_deleted`] only sets a tombstone.
/// Reclaiming space requires [`ClauseAlloc::compact`], which rebuilds both buffers and reports the
/// new location of every surviving clause through a caller-supplied callback, so that watch lists
/// and per-variable reasons can update the references they hold.
#[derive(Default)]
pub struct ClauseAlloc {
    headers: Vec<ClauseHeader>,
    spans: Vec<Span>,
    lits: Vec<Lit>,
}

impl ClauseAlloc {
    pub fn new() -> ClauseAlloc {
        ClauseAlloc::default()
    }

    pub fn with_capacity(lits_capacity: usize, clause_capacity: usize) -> ClauseAlloc {
        ClauseAlloc {
            headers: Vec::with_capacity(clause_capacity),
            spans: Vec::with_capacity(clause_capacity),
            lits: Vec::with_capacity(lits_capacity),
        }
    }

    /// Allocates a new clause, returning a stable reference to it.
    ///
    /// `lits` must have at least 2 elements; callers route unit and binary clauses elsewhere
    /// before reaching this allocator.
    pub fn allocate(&mut self, lits: &[Lit], learnt: bool) -> Result<ClauseRef, SolverError> {
        debug_assert!(lits.len() >= 2);

        let offset = self.lits.len();
        let new_len = offset
            .checked_add(lits.len())
            .ok_or(SolverError::OutOfMemory)?;
        if new_len > u32::max_value() as usize || self.headers.len() >= u32::max_value() as usize {
            return Err(SolverError::OutOfMemory);
        }

        self.lits.try_reserve(lits.len()).map_err(|_| SolverError::OutOfMemory)?;
        self.lits.extend_from_slice(lits);

        self.headers.push(ClauseHeader {
            learnt,
            ..ClauseHeader::default()
        });
        self.spans.push(Span {
            offset: offset as u32,
            len: lits.len() as u32,
        });

        Ok(ClauseRef((self.headers.len() - 1) as u32))
    }

    fn span(&self, cref: ClauseRef) -> Span {
        self.spans[cref.index()]
    }

    pub fn header(&self, cref: ClauseRef) -> &ClauseHeader {
        &self.headers[cref.index()]
    }

    pub fn header_mut(&mut self, cref: ClauseRef) -> &mut ClauseHeader {
        &mut self.headers[cref.index()]
    }

    pub fn lits(&self, cref: ClauseRef) -> &[Lit] {
        let span = self.span(cref);
        &self.lits[span.offset as usize..(span.offset + span.len) as usize]
    }

    pub fn lits_mut(&mut self, cref: ClauseRef) -> &mut [Lit] {
        let span = self.span(cref);
        &mut self.lits[span.offset as usize..(span.offset + span.len) as usize]
    }

    pub fn len(&self, cref: ClauseRef) -> usize {
        self.span(cref).len as usize
    }

    /// Marks a clause as deleted. The reference stays valid (and the literals readable) until the
    /// next [`ClauseAlloc::compact`].
    pub fn mark_deleted(&mut self, cref: ClauseRef) {
        self.headers[cref.index()].deleted = true;
    }

    /// Number of `LitIdx`-sized slots used by the literal buffer, deleted clauses included.
    pub fn buffer_size(&self) -> usize {
        self.lits.len()
    }

    /// Wasted literal slots belonging to tombstoned clauses.
    pub fn garbage_size(&self) -> usize {
        self.headers
            .iter()
            .zip(self.spans.iter())
            .filter(|(h, _)| h.deleted)
            .map(|(_, s)| s.len as usize)
            .sum()
    }

    /// Reclaims space used by deleted clauses.
    ///
    /// Rebuilds the allocator keeping only non-deleted clauses, and invokes `notify(old, new)` for
    /// every surviving clause so callers can fix up any [`ClauseRef`] they cached (watch lists,
    /// per-variable reasons, the clause database's own clause lists).
    pub fn compact(&mut self, mut notify: impl FnMut(ClauseRef, ClauseRef)) {
        let mut new_headers = Vec::with_capacity(self.headers.len());
        let mut new_spans = Vec::with_capacity(self.spans.len());
        let mut new_lits = Vec::with_capacity(self.lits.len() - self.garbage_size());

        for old_index in 0..self.headers.len() {
            let old = ClauseRef(old_index as u32);
            if self.headers[old_index].deleted {
                continue;
            }
            let span = self.spans[old_index];
            let new_offset = new_lits.len() as u32;
            new_lits.extend_from_slice(
                &self.lits[span.offset as usize..(span.offset + span.len) as usize],
            );
            new_headers.push(self.headers[old_index].clone());
            new_spans.push(Span {
                offset: new_offset,
                len: span.len,
            });
            let new = ClauseRef((new_headers.len() - 1) as u32);
            notify(old, new);
        }

        self.headers = new_headers;
        self.spans = new_spans;
        self.lits = new_lits;
    }
}
