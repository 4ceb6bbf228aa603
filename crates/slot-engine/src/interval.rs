//! Pure predicates and decompositions over slots and query windows.
//!
//! Every comparison here is bounds-inclusive, and the overlap test is an
//! explicit four-way case split rather than a generic max/min check. The
//! higher layers depend on the exact boundary behavior of these functions.

use chrono::{DateTime, Duration, Utc};

use crate::slot::Slot;

/// True iff `from <= t <= to`, both bounds inclusive.
///
/// Written as a two-clause disjunction so that a degenerate window with
/// `from == to` rejects its own boundary.
pub fn is_between(t: DateTime<Utc>, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
    (t >= from && t < to) || (t <= to && t > from)
}

/// The slot lies entirely inside `[from, to]`.
pub fn slot_in(slot: &Slot, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
    is_between(slot.from, from, to) && is_between(slot.to, from, to)
}

/// The window `[from, to]` lies entirely inside the slot.
pub fn in_slot(slot: &Slot, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
    is_between(from, slot.from, slot.to) && is_between(to, slot.from, slot.to)
}

/// The slot appears in the window, in any of four shapes.
pub fn slot_enters(slot: &Slot, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
    // WIN   [----]
    // SLOT [--------]
    if slot.from < from && slot.to > to {
        return true;
    }

    // WIN  [--------]
    // SLOT  [----]
    if is_between(slot.from, from, to) && is_between(slot.to, from, to) {
        return true;
    }

    // WIN  [----]
    // SLOT    [----]
    if slot.to > to && slot.from < to && slot.from >= from {
        return true;
    }

    // WIN     [----]
    // SLOT [----]
    if slot.from < from && slot.to > from && slot.to <= to {
        return true;
    }

    false
}

/// Remove `sub` from `slot`, returning the 0-2 remainders.
///
/// Returns an empty list unless `sub` is fully contained in `slot`.
/// Remainders keep the parent slot's id and occurrence.
pub fn split(slot: &Slot, sub: &Slot) -> Vec<Slot> {
    let mut out = Vec::new();

    if !in_slot(slot, sub.from, sub.to) {
        return out;
    }

    if sub.from > slot.from {
        out.push(Slot {
            id: slot.id.clone(),
            from: slot.from,
            to: sub.from,
            occurrence: slot.occurrence,
        });
    }

    if slot.to > sub.to {
        out.push(Slot {
            id: slot.id.clone(),
            from: sub.to,
            to: slot.to,
            occurrence: slot.occurrence,
        });
    }

    out
}

/// Advance a recurring slot by whole weeks until an instance enters the
/// window. Returns `None` once the start has passed `to`, meaning there are
/// no further occurrences in range.
pub fn shift(slot: &Slot, from: DateTime<Utc>, to: DateTime<Utc>) -> Option<Slot> {
    if slot.from > to {
        return None;
    }

    let duration = slot.duration();
    let mut start = slot.from;

    while start < to {
        start += Duration::days(7);

        let next = Slot {
            id: slot.id.clone(),
            from: start,
            to: start + duration,
            occurrence: slot.occurrence,
        };

        if slot_enters(&next, from, to) {
            return Some(next);
        }
    }

    None
}

/// Carve `item` out of every list entry that fully contains it.
///
/// Worklist loop: find a containing entry, remove it, split it around `item`,
/// re-append the remainders that still enter the window, repeat until no
/// container is left. Quadratic in list length, which stays in the tens for
/// a single resource's timeline.
pub fn subtract(
    item: &Slot,
    mut list: Vec<Slot>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Vec<Slot> {
    loop {
        let Some(idx) = list.iter().position(|slot| in_slot(slot, item.from, item.to)) else {
            return list;
        };

        let covering = list.remove(idx);
        for chunk in split(&covering, item) {
            if slot_enters(&chunk, from, to) {
                list.push(chunk);
            }
        }
    }
}
