//! Festival calendar: maps a point in time (or a debug override) to the
//! current day of the eight-day festival.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A day of the festival, always in 1..=8.
/// "Not in the festival" is `Option<FestivalDay>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FestivalDay(u8);

impl FestivalDay {
    pub const FIRST: FestivalDay = FestivalDay(1);
    pub const LAST: FestivalDay = FestivalDay(8);

    pub fn new(day: u8) -> Option<Self> {
        (1..=8).contains(&day).then_some(Self(day))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// The following day, or `None` after the last one.
    pub fn next(self) -> Option<Self> {
        Self::new(self.0 + 1)
    }

    /// All eight days in order.
    pub fn all() -> impl Iterator<Item = FestivalDay> {
        (1..=8).map(FestivalDay)
    }
}

/// Map an external override value to a day. 0 and out-of-range values clear it.
pub fn override_from_raw(raw: u32) -> Option<FestivalDay> {
    u8::try_from(raw).ok().and_then(FestivalDay::new)
}

/// Start dates of each festival day for one year.
///
/// JSON shape: `{"year": 2025, "dates": {"day1": "2025-12-14", ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateTable {
    pub year: i32,
    pub dates: BTreeMap<String, NaiveDate>,
}

impl DateTable {
    /// The embedded table for 2025.
    pub fn hanukkah_2025() -> Self {
        let dates = FestivalDay::all()
            .filter_map(|day| {
                let date = NaiveDate::from_ymd_opt(2025, 12, 13 + day.get() as u32)?;
                Some((format!("day{}", day.get()), date))
            })
            .collect();
        Self { year: 2025, dates }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// UTC midnight of the day's date, if the table has it.
    pub fn start_of(&self, day: FestivalDay) -> Option<DateTime<Utc>> {
        let date = self.dates.get(&format!("day{}", day.get()))?;
        Some(date.and_hms_opt(0, 0, 0)?.and_utc())
    }

    /// Half-open interval `[start, end)` covered by `day`.
    /// The last day ends 24 hours after it starts.
    pub fn interval(&self, day: FestivalDay) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = self.start_of(day)?;
        let end = match day.next() {
            Some(next) => self.start_of(next)?,
            None => start + Duration::hours(24),
        };
        Some((start, end))
    }
}

impl Default for DateTable {
    fn default() -> Self {
        Self::hanukkah_2025()
    }
}

/// Resolves the current festival day from a date table.
#[derive(Debug, Clone, Default)]
pub struct CalendarResolver {
    table: Option<DateTable>,
}

impl CalendarResolver {
    pub fn new(table: Option<DateTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> Option<&DateTable> {
        self.table.as_ref()
    }

    /// The override wins unconditionally; otherwise scan the table.
    /// A missing table resolves to `None`.
    pub fn resolve(
        &self,
        now: DateTime<Utc>,
        override_day: Option<FestivalDay>,
    ) -> Option<FestivalDay> {
        if override_day.is_some() {
            return override_day;
        }
        let table = self.table.as_ref()?;
        FestivalDay::all().find(|&day| {
            table
                .interval(day)
                .is_some_and(|(start, end)| now >= start && now < end)
        })
    }
}
