//! Calendar buckets.
//!
//! A bucket is a sorted, singly-linked list of events. The cells of all
//! buckets of a calendar queue live in a single slab owned by the queue, so
//! that links are plain slab indices and cells are recycled across insertions
//! and resizes.
use std::cmp::Ordering;
use std::iter;

use slab::Slab;

use crate::event::Event;

/// Storage shared by all buckets of a calendar queue.
pub(super) type Cells = Slab<Cell>;

/// A linked list node.
#[derive(Debug)]
pub(super) struct Cell {
    event: Event,
    next: Option<usize>,
}

/// A list of events sorted by scheduling order.
///
/// Events which compare equal are kept in insertion order.
#[derive(Debug, Default)]
pub(super) struct Bucket {
    head: Option<usize>,
    len: usize,
}

impl Bucket {
    /// Returns `true` if the bucket contains no event.
    pub(super) fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns the number of events in the bucket.
    #[cfg(test)]
    pub(super) fn len(&self) -> usize {
        self.len
    }

    /// Returns the first event without removing it.
    pub(super) fn peek<'a>(&self, cells: &'a Cells) -> Option<&'a Event> {
        self.head.map(|idx| &cells[idx].event)
    }

    /// Removes and returns the first event.
    pub(super) fn take(&mut self, cells: &mut Cells) -> Option<Event> {
        let idx = self.head?;
        let cell = cells.remove(idx);
        self.head = cell.next;
        self.len -= 1;

        Some(cell.event)
    }

    /// Inserts an event after all events which do not follow it in scheduling
    /// order.
    ///
    /// Insertion cannot fail: if no later event is found, the event is
    /// appended.
    pub(super) fn insert(&mut self, cells: &mut Cells, event: Event) -> bool {
        let mut prev = None;
        let mut cur = self.head;
        while let Some(idx) = cur {
            if cells[idx].event.schedule_cmp(&event) == Ordering::Greater {
                break;
            }
            prev = Some(idx);
            cur = cells[idx].next;
        }

        let new_idx = cells.insert(Cell { event, next: cur });
        match prev {
            None => self.head = Some(new_idx),
            Some(prev_idx) => cells[prev_idx].next = Some(new_idx),
        }
        self.len += 1;

        true
    }

    /// Removes the first event equal to the argument.
    ///
    /// Returns `true` if such an event was found.
    pub(super) fn remove(&mut self, cells: &mut Cells, event: &Event) -> bool {
        let mut prev = None;
        let mut cur = self.head;
        while let Some(idx) = cur {
            let next = cells[idx].next;
            if cells[idx].event == *event {
                match prev {
                    None => self.head = next,
                    Some(prev_idx) => cells[prev_idx].next = next,
                }
                cells.remove(idx);
                self.len -= 1;

                return true;
            }
            prev = Some(idx);
            cur = next;
        }

        false
    }

    /// Checks whether the bucket holds an event with the same tag and the
    /// same target as the argument.
    pub(super) fn includes(&self, cells: &Cells, event: &Event) -> bool {
        self.iter(cells)
            // Events are sorted by tag, so the scan can stop at the first
            // later tag.
            .take_while(|e| e.tag() <= event.tag())
            .any(|e| e.has_same_tag_and_target(event))
    }

    /// Returns an iterator over the events in scheduling order.
    pub(super) fn iter<'a>(&self, cells: &'a Cells) -> impl Iterator<Item = &'a Event> + 'a {
        iter::successors(self.head, move |&idx| cells[idx].next).map(move |idx| &cells[idx].event)
    }
}
