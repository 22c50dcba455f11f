//! Date gates: pure functions of "now" deciding whether a feed may act.

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use dp_domain::error::{Error, Result};

/// `true` once the UTC hour has reached `start_hour`.
pub fn eligible_hour(now: DateTime<Utc>, start_hour: u32) -> bool {
    now.hour() >= start_hour
}

/// Month/day on which the annual lesson cycle starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnualEpoch {
    month: u32,
    day: u32,
}

impl AnnualEpoch {
    pub const MARCH_1: AnnualEpoch = AnnualEpoch { month: 3, day: 1 };

    /// Reject dates that do not exist in every year (Feb 29 included).
    pub fn new(month: u32, day: u32) -> Result<Self> {
        // 2023 is not a leap year.
        if NaiveDate::from_ymd_opt(2023, month, day).is_none() {
            return Err(Error::Config(format!(
                "annual epoch {month}/{day} is not a date in every year"
            )));
        }
        Ok(Self { month, day })
    }

    pub fn is_today(&self, now: DateTime<Utc>) -> bool {
        now.month() == self.month && now.day() == self.day
    }

    /// Most recent occurrence of the epoch at or before `now` (UTC date).
    pub fn last_start(&self, now: DateTime<Utc>) -> NaiveDate {
        let today = now.date_naive();
        let year = if (today.month(), today.day()) < (self.month, self.day) {
            today.year() - 1
        } else {
            today.year()
        };
        // Valid in every year, checked in `new`.
        NaiveDate::from_ymd_opt(year, self.month, self.day).unwrap_or(today)
    }
}

impl Default for AnnualEpoch {
    fn default() -> Self {
        Self::MARCH_1
    }
}

/// 1-based day number of `now` within the annual cycle starting at `epoch`.
pub fn annual_cycle_day(now: DateTime<Utc>, epoch: AnnualEpoch) -> i64 {
    (now.date_naive() - epoch.last_start(now)).num_days() + 1
}

/// The day number padded with spaces, as it appears inside lesson titles
/// (`"* LESSON 40 *"` contains `" 40 "`).
pub fn day_token(day: i64) -> String {
    format!(" {day} ")
}

/// Granularity of a per-feed "already posted" key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayKeyFormat {
    /// `January 2`, repeating every year.
    MonthDay,
    /// `2006 January 2`
    YearMonthDay,
}

/// Format the UTC date of `now` as a dedupe key.
pub fn calendar_day_key(now: DateTime<Utc>, format: DayKeyFormat) -> String {
    match format {
        DayKeyFormat::MonthDay => now.format("%B %-d").to_string(),
        DayKeyFormat::YearMonthDay => now.format("%Y %B %-d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn hour_gate_boundary() {
        assert!(!eligible_hour(at(2024, 6, 1, 3), 4));
        assert!(eligible_hour(at(2024, 6, 1, 4), 4));
        assert!(eligible_hour(at(2024, 6, 1, 0), 0));
        assert!(!eligible_hour(at(2024, 6, 1, 23), 24));
    }

    #[test]
    fn epoch_day_is_day_one() {
        assert_eq!(annual_cycle_day(at(2024, 3, 1, 0), AnnualEpoch::MARCH_1), 1);
        assert_eq!(annual_cycle_day(at(2024, 3, 1, 23), AnnualEpoch::MARCH_1), 1);
        assert_eq!(annual_cycle_day(at(2024, 4, 9, 5), AnnualEpoch::MARCH_1), 40);
    }

    #[test]
    fn before_epoch_counts_from_previous_year() {
        // 2023-03-01 .. 2024-02-29 spans a leap day.
        assert_eq!(annual_cycle_day(at(2024, 2, 29, 12), AnnualEpoch::MARCH_1), 366);
        assert_eq!(annual_cycle_day(at(2023, 2, 28, 12), AnnualEpoch::MARCH_1), 365);
        assert_eq!(annual_cycle_day(at(2025, 1, 1, 12), AnnualEpoch::MARCH_1), 307);
    }

    #[test]
    fn custom_epoch_compares_month_and_day() {
        let epoch = AnnualEpoch::new(3, 15).unwrap();
        assert_eq!(annual_cycle_day(at(2024, 3, 14, 8), epoch), 366);
        assert_eq!(annual_cycle_day(at(2024, 3, 15, 8), epoch), 1);
    }

    #[test]
    fn leap_day_epoch_rejected() {
        assert!(AnnualEpoch::new(2, 29).is_err());
        assert!(AnnualEpoch::new(13, 1).is_err());
    }

    #[test]
    fn epoch_today() {
        assert!(AnnualEpoch::MARCH_1.is_today(at(2025, 3, 1, 10)));
        assert!(!AnnualEpoch::MARCH_1.is_today(at(2025, 3, 2, 10)));
    }

    #[test]
    fn day_keys() {
        let now = at(2024, 1, 2, 9);
        assert_eq!(calendar_day_key(now, DayKeyFormat::MonthDay), "January 2");
        assert_eq!(calendar_day_key(now, DayKeyFormat::YearMonthDay), "2024 January 2");
    }

    #[test]
    fn day_token_is_space_padded() {
        assert_eq!(day_token(40), " 40 ");
        assert!("* LESSON 40 *".contains(&day_token(40)));
        assert!(!"* LESSON 140 *".contains(&day_token(40)));
    }
}
