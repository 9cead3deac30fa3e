//! Calendar-day statistics and day arithmetic.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use time::macros::{date, format_description};
use time::{Date, Duration};

/// Day before the earliest history any package can have.
pub const EPOCH: Date = date!(2009 - 09 - 29);

/// Downloads value for a day the upstream reported as unavailable.
///
/// Distinct from `0`, which is an observed day with no downloads.
pub const UNAVAILABLE: i64 = -1;

/// Downloads for one package on one calendar day (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DailyStatistic {
    #[serde(with = "serde_day")]
    pub day: Date,
    pub downloads: i64,
}

impl DailyStatistic {
    pub fn new(day: Date, downloads: i64) -> Self {
        Self { day, downloads }
    }

    pub fn unavailable(day: Date) -> Self {
        Self::new(day, UNAVAILABLE)
    }

    pub fn is_unavailable(&self) -> bool {
        self.downloads == UNAVAILABLE
    }
}

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchRange {
    pub start: Date,
    pub end: Date,
}

impl FetchRange {
    /// Create a range, rejecting `start > end`.
    pub fn new(start: Date, end: Date) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Number of days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).whole_days() + 1
    }

    /// Iterate every day from `start` to `end` in ascending order.
    pub fn iter_days(&self) -> impl Iterator<Item = Date> {
        let end = self.end;
        std::iter::successors(Some(self.start), move |day| {
            day.next_day().filter(|next| *next <= end)
        })
    }
}

impl std::fmt::Display for FetchRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Shift a day by a signed number of days, clamping at the representable range.
pub fn add_days(day: Date, days: i64) -> Date {
    day.saturating_add(Duration::days(days))
}

/// Whole days from `earlier` to `later` (negative if `later` precedes `earlier`).
pub fn days_between(earlier: Date, later: Date) -> i64 {
    (later - earlier).whole_days()
}

/// Parse a `YYYY-MM-DD` day.
pub fn parse_day(input: &str) -> std::result::Result<Date, time::error::Parse> {
    Date::parse(input, format_description!("[year]-[month]-[day]"))
}

/// Serde adapter for `YYYY-MM-DD` days.
pub mod serde_day {
    use super::parse_day;
    use serde::{Deserialize, Deserializer, Serializer, de};
    use time::Date;

    pub fn serialize<S: Serializer>(day: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(day)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_day(&raw).map_err(de::Error::custom)
    }

    /// Same format for optional days (missing or empty means `None`).
    pub mod option {
        use super::parse_day;
        use serde::{Deserialize, Deserializer, Serializer, de};
        use time::Date;

        pub fn serialize<S: Serializer>(
            day: &Option<Date>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match day {
                Some(day) => serializer.collect_str(day),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Date>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) if !raw.is_empty() => parse_day(&raw).map(Some).map_err(de::Error::custom),
                _ => Ok(None),
            }
        }
    }
}
