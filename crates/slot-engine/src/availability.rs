//! Yes/no availability checks over a timeline with a booked-slot overlay.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::error::Result;
use crate::interval::in_slot;
use crate::slot::{Occurrence, Slot};
use crate::timeline::Timeline;

/// Upper bound on how many weeks ahead a recurrent check will walk.
///
/// Bookings are not expected to extend anywhere near this horizon; hitting it
/// means the booked overlay is malformed, and the check panics rather than
/// walking forever.
pub const MAX_RECURRENT_WEEKS: usize = 100;

/// Read-only view of a timeline minus already-booked sub-ranges.
///
/// Constructed for a query session and discarded; the booked overlay is fixed
/// at construction.
pub struct Availability<'a> {
    timeline: &'a Timeline,
    booked: Vec<Slot>,
}

impl<'a> Availability<'a> {
    pub(crate) fn new(timeline: &'a Timeline, booked: Vec<Slot>) -> Self {
        Self { timeline, booked }
    }

    /// Free slots in the window after subtracting the booked overlay.
    pub fn get(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Slot>> {
        self.timeline.get(from, to, &self.booked)
    }

    /// True when the window falls inside a free slot.
    ///
    /// Only the first returned slot is inspected. Results come back sorted by
    /// start and post-subtraction slots are disjoint, so the first slot that
    /// enters the window is the only one that can contain it.
    pub fn is_available<Tz: TimeZone>(&self, from: DateTime<Tz>, to: DateTime<Tz>) -> bool {
        let from = from.with_timezone(&Utc);
        let to = to.with_timezone(&Utc);

        match self.get(from, to) {
            Ok(slots) => !slots.is_empty() && in_slot(&slots[0], from, to),
            Err(_) => false,
        }
    }

    /// True when the window is free on a recurring basis.
    ///
    /// With no booked overlay a single query decides. With bookings, the
    /// window is re-checked week by week until the last booked instant, every
    /// returned slot having to contain it, bounded by [`MAX_RECURRENT_WEEKS`].
    pub fn is_available_recurrent(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        if self.booked.is_empty() {
            let slots = match self.get(from, to) {
                Ok(slots) => slots,
                Err(_) => return false,
            };

            return match slots.first() {
                Some(first) => first.occurrence != Occurrence::None && in_slot(first, from, to),
                None => false,
            };
        }

        let Some(last_booked) = self.booked.iter().map(|slot| slot.to).max() else {
            return false;
        };

        let mut from = from;
        let mut to = to;
        let mut count = 0usize;

        while from < last_booked {
            let slots = match self.get(from, to) {
                Ok(slots) => slots,
                Err(_) => return false,
            };

            if slots.is_empty() {
                return false;
            }

            if slots.iter().any(|slot| !in_slot(slot, from, to)) {
                return false;
            }

            if count > MAX_RECURRENT_WEEKS {
                panic!("recurrent availability walk exceeded {MAX_RECURRENT_WEEKS} weeks");
            }

            from += Duration::days(7);
            to += Duration::days(7);
            count += 1;
        }

        true
    }
}
