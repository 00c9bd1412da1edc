//! Lazy occurrence sequence of one series.

use super::candidates::Candidates;
use super::exception::{ExceptionIndex, Resolution};
use super::materialize::Materializer;
use super::range::{Membership, RangeFilter};
use super::slot::SeriesAnchor;
use crate::calendar::model::Occurrence;

/// Lazy, forward-only sequence of occurrences in original slot order.
///
/// Borrows the master event and change exceptions it was built from.
#[derive(Debug)]
pub struct RecurrenceIterator<'a> {
    anchor: SeriesAnchor,
    candidates: Candidates,
    exceptions: ExceptionIndex<'a>,
    materializer: Materializer<'a>,
    filter: RangeFilter,
    position: usize,
    emitted: usize,
    done: bool,
}

impl<'a> RecurrenceIterator<'a> {
    pub(super) fn new(
        anchor: SeriesAnchor,
        candidates: Candidates,
        exceptions: ExceptionIndex<'a>,
        materializer: Materializer<'a>,
        filter: RangeFilter,
    ) -> Self {
        Self {
            anchor,
            candidates,
            exceptions,
            materializer,
            filter,
            position: 0,
            emitted: 0,
            done: false,
        }
    }

    /// Number of occurrences produced so far.
    #[must_use]
    pub fn emitted(&self) -> usize {
        self.emitted
    }
}

impl Iterator for RecurrenceIterator<'_> {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            if self.filter.limit_reached(self.emitted) {
                tracing::trace!(emitted = self.emitted, "Limit reached");
                self.done = true;
                break;
            }

            let Some(candidate) = self.candidates.next() else {
                self.done = true;
                break;
            };
            self.position += 1;

            let (slot_start, slot_end) = self.anchor.slot_bounds(candidate.key);
            match self.filter.membership(slot_start, slot_end) {
                Membership::Before => continue,
                Membership::After => {
                    tracing::trace!(slot_start = %slot_start, "Passed range end");
                    self.done = true;
                    break;
                }
                Membership::Inside => {}
            }

            let occurrence = match self.exceptions.resolve(&candidate.key) {
                Resolution::Deleted => {
                    tracing::trace!(position = self.position, "Skipping deleted slot");
                    continue;
                }
                Resolution::Changed(exception) => {
                    self.materializer.exception(exception, self.position)
                }
                Resolution::Regular => {
                    self.materializer
                        .regular(candidate.key, candidate.local, self.position)
                }
            };

            self.emitted += 1;
            return Some(occurrence);
        }
        None
    }
}

impl std::iter::FusedIterator for RecurrenceIterator<'_> {}
