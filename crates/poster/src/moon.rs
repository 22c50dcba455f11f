//! Lunar phase from a fixed synodic-month approximation.
//!
//! Elapsed time since a reference new moon, modulo the mean synodic month,
//! places `now` in the cycle.  Only the 24 hours ending at an exact new or
//! full moon instant are reported.

use chrono::{DateTime, Duration, Utc};

/// 2020-12-14T16:16:00Z, a new moon.
pub const REFERENCE_NEW_MOON_MS: i64 = 1_607_962_560_000;

/// Mean synodic month: 2 551 443 s.
pub const SYNODIC_MONTH_MS: i64 = 2_551_443_000;

const HALF_CYCLE_MS: i64 = SYNODIC_MONTH_MS / 2;
const DAY_MS: i64 = 24 * 60 * 60 * 1000;

const NEW_MOON_MARK: &str = "○";
const FULL_MOON_MARK: &str = "●";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoonPhase {
    New,
    Full,
}

impl MoonPhase {
    pub fn label(self) -> &'static str {
        match self {
            MoonPhase::New => "New Moon",
            MoonPhase::Full => "Full Moon",
        }
    }

    fn opposite(self) -> Self {
        match self {
            MoonPhase::New => MoonPhase::Full,
            MoonPhase::Full => MoonPhase::New,
        }
    }
}

/// Milliseconds since the most recent new moon.
fn since_new_moon_ms(now: DateTime<Utc>) -> i64 {
    (now.timestamp_millis() - REFERENCE_NEW_MOON_MS).rem_euclid(SYNODIC_MONTH_MS)
}

/// The phase whose exact instant falls within the next 24 hours
/// (inclusive of now), if any.
pub fn phase_today(now: DateTime<Utc>) -> Option<MoonPhase> {
    let since_new = since_new_moon_ms(now);
    let till_new = (SYNODIC_MONTH_MS - since_new).rem_euclid(SYNODIC_MONTH_MS);
    if till_new < DAY_MS {
        return Some(MoonPhase::New);
    }
    let till_full = HALF_CYCLE_MS - since_new;
    if (0..DAY_MS).contains(&till_full) {
        return Some(MoonPhase::Full);
    }
    None
}

/// Announcement for today, or `None` on ordinary days.
pub fn moon_phase_today(now: DateTime<Utc>) -> Option<String> {
    let phase = phase_today(now)?;
    let next = now + Duration::milliseconds(HALF_CYCLE_MS);
    Some(format!(
        "Today {} is {}; next {} is on {}.",
        now.format("%A, %B %-d"),
        phase.label(),
        phase.opposite().label(),
        next.format("%A, %B %-d"),
    ))
}

/// About a year of alternating new and full moons, grouped by year and
/// month, starting from the most recent new moon.
pub fn moon_calendar(now: DateTime<Utc>) -> String {
    let last_new = now - Duration::milliseconds(since_new_moon_ms(now));
    let horizon = last_new + Duration::weeks(54);
    let half = Duration::milliseconds(HALF_CYCLE_MS);

    let mut out = String::new();
    let mut year = String::new();
    let mut month = String::new();
    let mut moment = last_new;
    let mut i = 0usize;
    while moment < horizon {
        let y = moment.format("%Y").to_string();
        if y != year {
            out.push_str(&format!("\n\nYear {y}\n"));
            year = y;
        }
        let m = moment.format("%b").to_string();
        if m != month {
            out.push_str(&format!("\n{m} "));
            month = m;
        }
        let mark = if i % 2 == 0 { NEW_MOON_MARK } else { FULL_MOON_MARK };
        // Dates are shown a few hours earlier so late-UTC phases land on
        // the evening they are visible in the Americas.
        let shown = moment - Duration::hours(4);
        out.push_str(&format!("{}:{mark} ", shown.format("%a/%-d")));
        moment += half;
        i += 1;
    }
    out
}
