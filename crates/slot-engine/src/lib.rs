//! # slot-engine
//!
//! Calendar-interval algebra for recurring availability, plus an adaptive
//! scheduler that fires callbacks at the next due marker time.
//!
//! A [`Timeline`] holds a resource's free time as a set of non-overlapping
//! [`Slot`]s, one-off or weekly-recurring, merged on insertion. Wrapping it
//! in an [`Availability`] overlays already-booked ranges, answering
//! "is `[from, to)` free?" after subtraction. Independently, an [`Updater`]
//! polls a caller-supplied provider for upcoming [`Marker`]s and invokes a
//! callback as each one comes due, sleeping exactly until the earliest one.
//!
//! The engine persists nothing and knows nothing about users or bookings as
//! domain concepts; it operates on abstract intervals and opaque markers.
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use slot_engine::{Occurrence, Slot, Timeline};
//!
//! let timeline = Timeline::new();
//! timeline.add([Slot::new(
//!     "monday-morning",
//!     Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
//!     Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap(),
//!     Occurrence::Weekly,
//! )])?;
//!
//! let availability = timeline.availability(vec![]);
//! assert!(availability.is_available(
//!     Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap(),
//!     Utc.with_ymd_and_hms(2026, 3, 2, 11, 0, 0).unwrap(),
//! ));
//! # Ok::<(), slot_engine::TimelineError>(())
//! ```
//!
//! ## Modules
//!
//! - [`slot`] — slot values and recurrence tags
//! - [`interval`] — pure interval predicates, `split`/`shift`/`subtract`
//! - [`timeline`] — merge-on-insert slot collection with windowed expansion
//! - [`availability`] — booked-overlay facade with yes/no checks
//! - [`updater`] — marker polling loop
//! - [`error`] — error types

pub mod availability;
pub mod error;
pub mod interval;
pub mod slot;
pub mod timeline;
pub mod updater;

pub use availability::{Availability, MAX_RECURRENT_WEEKS};
pub use error::{Result, TimelineError};
pub use interval::{in_slot, is_between, shift, slot_enters, slot_in, split, subtract};
pub use slot::{Occurrence, Slot, SlotProvider};
pub use timeline::Timeline;
pub use updater::{Marker, MarkerCallback, MarkerProvider, Updater, UpdaterConfig, UpdaterHandle};
