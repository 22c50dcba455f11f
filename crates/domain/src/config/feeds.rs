use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Feeds
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedsConfig {
    #[serde(default)]
    pub moon_phase: MoonPhaseFeedConfig,
    #[serde(default)]
    pub book_of_days: BookOfDaysFeedConfig,
    #[serde(default)]
    pub lesson: LessonFeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoonPhaseFeedConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Destination chat.  Empty falls back to `telegram.log_chat_id`.
    #[serde(default)]
    pub chat_id: String,
    #[serde(default = "d_moon_key")]
    pub cursor_key: String,
}

impl Default for MoonPhaseFeedConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            chat_id: String::new(),
            cursor_key: d_moon_key(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookOfDaysFeedConfig {
    /// Corpus file.  The feed is disabled while this is unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub chat_id: String,
    /// Regex template; every literal `monthday` is replaced with today's
    /// date formatted as `January 2` before compiling.
    #[serde(default)]
    pub pattern_template: String,
    #[serde(default = "d_book_key")]
    pub cursor_key: String,
}

impl Default for BookOfDaysFeedConfig {
    fn default() -> Self {
        Self {
            path: None,
            chat_id: String::new(),
            pattern_template: String::new(),
            cursor_key: d_book_key(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonFeedConfig {
    /// Corpus file.  The feed is disabled while this is unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub chat_id: String,
    /// Titles matching this pattern end the tick after they are posted.
    /// `None` ends the tick after every entry.
    #[serde(default = "d_terminal_pattern")]
    pub terminal_pattern: Option<String>,
    /// Title of the first lesson; the annual reset leaves this cursor alone.
    #[serde(default = "d_first_title")]
    pub first_title: String,
    #[serde(default = "d_epoch_month")]
    pub epoch_month: u32,
    #[serde(default = "d_epoch_day")]
    pub epoch_day: u32,
    #[serde(default = "d_max_len")]
    pub max_len: usize,
    #[serde(default = "d_lesson_key")]
    pub cursor_key: String,
}

impl Default for LessonFeedConfig {
    fn default() -> Self {
        Self {
            path: None,
            chat_id: String::new(),
            terminal_pattern: d_terminal_pattern(),
            first_title: d_first_title(),
            epoch_month: d_epoch_month(),
            epoch_day: d_epoch_day(),
            max_len: d_max_len(),
            cursor_key: d_lesson_key(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_moon_key() -> String {
    "MoonPhaseTodayLast".into()
}
fn d_book_key() -> String {
    "ABookOfDaysLast".into()
}
fn d_lesson_key() -> String {
    "ACourseInMiraclesWorkbookLast".into()
}
fn d_terminal_pattern() -> Option<String> {
    Some(r"^\* LESSON ".into())
}
fn d_first_title() -> String {
    "* LESSON 1 *".into()
}
fn d_epoch_month() -> u32 {
    3
}
fn d_epoch_day() -> u32 {
    1
}
fn d_max_len() -> usize {
    4000
}
