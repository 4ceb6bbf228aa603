//! Slot values and the occurrence tags that drive recurrence expansion.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Recurrence class of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occurrence {
    /// A single concrete instance.
    #[default]
    None,
    /// Repeats every 7 days.
    Weekly,
    /// Repeats every 14 days.
    TwoWeeks,
}

/// A half-open `[from, to)` time interval with an optional recurrence tag.
///
/// Slots are immutable by convention: the timeline never mutates a stored
/// slot, it replaces it. The invariant `to > from` is enforced at insertion,
/// not at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    #[serde(default)]
    pub occurrence: Occurrence,
}

impl Slot {
    pub fn new(
        id: impl Into<String>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        occurrence: Occurrence,
    ) -> Self {
        Self {
            id: id.into(),
            from,
            to,
            occurrence,
        }
    }

    /// Span equality: same bounds and occurrence. Ids are ignored, so a
    /// merged slot still coincides with the range it was merged from.
    pub fn coincides(&self, other: &Slot) -> bool {
        self.from == other.from && self.to == other.to && self.occurrence == other.occurrence
    }

    pub fn duration(&self) -> Duration {
        self.to - self.from
    }

    /// View both bounds in an IANA timezone. The instants are unchanged,
    /// only their representation.
    pub fn localized(&self, tz: Tz) -> (DateTime<Tz>, DateTime<Tz>) {
        (self.from.with_timezone(&tz), self.to.with_timezone(&tz))
    }

    /// Build an owned slot from any caller-side slot representation.
    pub fn from_provider(provider: &dyn SlotProvider) -> Self {
        Self {
            id: provider.id().to_string(),
            from: provider.from_time(),
            to: provider.to_time(),
            occurrence: provider.occurrence(),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout = "%Y %a %b %-d %H:%M %z";
        write!(
            f,
            "[ {} ] - [ {} ]",
            self.from.format(layout),
            self.to.format(layout)
        )
    }
}

/// Caller-side slot capability: anything persisted elsewhere that can stand
/// in for a slot. Convert with [`Slot::from_provider`] before handing it to
/// the timeline.
pub trait SlotProvider {
    fn id(&self) -> &str;
    fn from_time(&self) -> DateTime<Utc>;
    fn to_time(&self) -> DateTime<Utc>;
    fn occurrence(&self) -> Occurrence;
}

impl SlotProvider for Slot {
    fn id(&self) -> &str {
        &self.id
    }

    fn from_time(&self) -> DateTime<Utc> {
        self.from
    }

    fn to_time(&self) -> DateTime<Utc> {
        self.to
    }

    fn occurrence(&self) -> Occurrence {
        self.occurrence
    }
}
