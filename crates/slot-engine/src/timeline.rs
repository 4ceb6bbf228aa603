//! Merge-on-insert slot collection with windowed recurrence expansion.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::availability::Availability;
use crate::error::{Result, TimelineError};
use crate::interval::{is_between, shift, slot_enters, subtract};
use crate::slot::{Occurrence, Slot};

/// Ordered, non-overlapping set of availability slots.
///
/// Contiguous or overlapping slots with the same occurrence are merged on
/// insertion; overlap across occurrence classes is a validation error. The
/// slot list sits behind a read-write lock: `add` holds the write lock for
/// the whole batch, queries read under the shared lock.
#[derive(Debug, Default)]
pub struct Timeline {
    slots: RwLock<Vec<Slot>>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    /// Snapshot of the stored slots, ascending by start.
    pub fn slots(&self) -> Vec<Slot> {
        self.slots.read().clone()
    }

    /// Insert slots, merging each into the stored set one boundary at a time.
    ///
    /// A new slot whose `from` instant lands inside a stored slot of the same
    /// occurrence extends that slot; likewise for its `to` instant. A slot
    /// whose both instants land in the same stored slot already exists. A
    /// slot bridging two distinct stored slots is left unresolved: the greedy
    /// merge handles one boundary per insert.
    pub fn add(&self, slots: impl IntoIterator<Item = Slot>) -> Result<()> {
        let incoming: Vec<Slot> = slots.into_iter().collect();
        if incoming.is_empty() {
            return Err(TimelineError::NoSlots);
        }

        let mut stored = self.slots.write();

        for slot in incoming {
            if slot.to <= slot.from {
                return Err(TimelineError::InvalidSlot);
            }

            let at_from = index_at(&stored, slot.from);
            let at_to = index_at(&stored, slot.to);

            match (at_from, at_to) {
                (Some(i), Some(j)) => {
                    if stored[i].occurrence != slot.occurrence {
                        return Err(TimelineError::OccurrenceMismatch);
                    }
                    if i == j {
                        return Err(TimelineError::AlreadyExists);
                    }
                    // Bridges two stored slots: no-op, see above.
                }
                (Some(i), None) => {
                    if stored[i].occurrence != slot.occurrence {
                        return Err(TimelineError::OccurrenceMismatch);
                    }
                    let merged = Slot {
                        id: slot.id,
                        from: stored[i].from,
                        to: slot.to,
                        occurrence: slot.occurrence,
                    };
                    stored.remove(i);
                    stored.push(merged);
                }
                (None, Some(j)) => {
                    if stored[j].occurrence != slot.occurrence {
                        return Err(TimelineError::OccurrenceMismatch);
                    }
                    let merged = Slot {
                        id: slot.id,
                        from: slot.from,
                        to: stored[j].to,
                        occurrence: slot.occurrence,
                    };
                    stored.remove(j);
                    stored.push(merged);
                }
                (None, None) => stored.push(slot),
            }
        }

        stored.sort_by_key(|slot| slot.from);

        Ok(())
    }

    /// Resolve the free slots over `[from, to]`, expanding weekly recurrence
    /// and carving out every `diff` slot (booked or blackout time).
    ///
    /// Two-week slots are stored and validated but not expanded here.
    pub fn get(&self, from: DateTime<Utc>, to: DateTime<Utc>, diff: &[Slot]) -> Result<Vec<Slot>> {
        if from > to {
            return Err(TimelineError::InvalidRange);
        }

        let mut out = Vec::new();

        {
            let stored = self.slots.read();

            for slot in stored.iter() {
                // Cannot intersect the window.
                if slot.from > to {
                    continue;
                }

                match slot.occurrence {
                    Occurrence::None => {
                        if slot_enters(slot, from, to) {
                            out.push(slot.clone());
                        }
                    }
                    Occurrence::Weekly => {
                        if slot_enters(slot, from, to) {
                            out.push(slot.clone());
                        }

                        let mut next = shift(slot, from, to);
                        while let Some(instance) = next {
                            next = shift(&instance, from, to);
                            out.push(instance);
                        }
                    }
                    Occurrence::TwoWeeks => {}
                }
            }
        }

        if out.is_empty() || diff.is_empty() {
            return Ok(out);
        }

        for sub in diff {
            if sub.occurrence == Occurrence::Weekly {
                if slot_enters(sub, from, to) {
                    out = subtract(sub, out, from, to);
                }

                let mut next = shift(sub, from, to);
                while let Some(instance) = next {
                    out = subtract(&instance, out, from, to);
                    next = shift(&instance, from, to);
                }

                continue;
            }

            out = subtract(sub, out, from, to);
        }

        Ok(out)
    }

    /// Bind this timeline to a fixed overlay of already-booked slots.
    pub fn availability(&self, booked: Vec<Slot>) -> Availability<'_> {
        Availability::new(self, booked)
    }
}

fn index_at(slots: &[Slot], t: DateTime<Utc>) -> Option<usize> {
    slots
        .iter()
        .position(|slot| is_between(t, slot.from, slot.to))
}
