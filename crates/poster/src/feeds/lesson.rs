//! Resumable lesson feed.
//!
//! Walks the corpus in document order, skipping everything up to and
//! including the entry whose title equals the stored cursor, then posts
//! entries until one matches the terminal pattern.  Each entry is committed
//! as soon as all of its chunks are sent.

use std::path::PathBuf;

use async_trait::async_trait;
use dp_corpus::segment;
use dp_domain::config::LessonFeedConfig;
use dp_domain::error::{Error, Result};
use regex::Regex;

use super::{
    publish_entry, read_corpus, skipped, CursorMirror, Feed, SkipReason, TickContext, TickOutcome,
};
use crate::gate::{annual_cycle_day, day_token, eligible_hour, AnnualEpoch};

const NAME: &str = "lesson";

pub struct LessonFeed {
    path: Option<PathBuf>,
    chat_id: String,
    terminal: Option<Regex>,
    first_title: String,
    epoch: AnnualEpoch,
    max_len: usize,
    start_hour: u32,
    cursor: CursorMirror,
}

impl LessonFeed {
    pub fn from_config(cfg: &LessonFeedConfig, start_hour: u32) -> Result<Self> {
        let terminal = cfg
            .terminal_pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| Error::Config(format!("feeds.lesson.terminal_pattern: {e}")))?;
        if cfg.max_len == 0 {
            return Err(Error::Config("feeds.lesson.max_len must be positive".into()));
        }
        Ok(Self {
            path: cfg.path.clone(),
            chat_id: cfg.chat_id.clone(),
            terminal,
            first_title: cfg.first_title.clone(),
            epoch: AnnualEpoch::new(cfg.epoch_month, cfg.epoch_day)?,
            max_len: cfg.max_len,
            start_hour,
            cursor: CursorMirror::new(cfg.cursor_key.clone()),
        })
    }

    fn is_terminal(&self, title: &str) -> bool {
        match &self.terminal {
            Some(re) => re.is_match(title),
            None => true,
        }
    }

    /// Everything after the gates, against an already loaded corpus.
    pub async fn run_once(&mut self, corpus: &str, ctx: &TickContext<'_>) -> Result<TickOutcome> {
        let mut last = self.cursor.load(ctx.store).await?;

        if self.epoch.is_today(ctx.now) && last != self.first_title {
            tracing::info!(previous = %last, "annual cycle restarts");
            self.cursor.replace("");
            last.clear();
        }

        let entries = segment(corpus)?;

        let day = annual_cycle_day(ctx.now, self.epoch);
        tracing::debug!(day, cursor = %last, "lesson cycle day");
        // Loose on purpose: titles embed the day number, e.g. "* LESSON 40 *".
        if last.contains(&day_token(day)) {
            return Ok(skipped(NAME, SkipReason::AlreadyPostedToday));
        }

        let mut skip = !last.is_empty();
        let mut resumed = last.is_empty();
        let mut titles = Vec::new();

        for entry in &entries {
            if entry.title == last {
                skip = false;
                resumed = true;
                continue;
            }
            if skip {
                continue;
            }

            let chunks = publish_entry(NAME, ctx.sender, &self.chat_id, entry, self.max_len).await?;
            self.cursor.commit(NAME, ctx.store, entry.title).await?;
            tracing::info!(title = %entry.title, chunks, "lesson posted");

            last = entry.title.to_owned();
            titles.push(last.clone());

            if self.is_terminal(entry.title) {
                break;
            }
        }

        if !resumed {
            tracing::warn!(
                cursor = %last,
                entries = entries.len(),
                "cursor title not found in corpus; nothing posted"
            );
        }

        if titles.is_empty() {
            return Ok(skipped(NAME, SkipReason::NothingToPost));
        }
        Ok(TickOutcome::Posted { titles })
    }
}

#[async_trait]
impl Feed for LessonFeed {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn tick(&mut self, ctx: &TickContext<'_>) -> Result<TickOutcome> {
        let Some(path) = self.path.clone() else {
            return Ok(skipped(NAME, SkipReason::NotConfigured));
        };
        if !eligible_hour(ctx.now, self.start_hour) {
            return Ok(skipped(NAME, SkipReason::TooEarly));
        }
        let corpus = read_corpus(&path).await?;
        self.run_once(&corpus, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use dp_store::MemoryStore;
    use dp_telegram::{MessageRef, Sender};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    #[async_trait]
    impl Sender for Recorder {
        async fn send(&self, text: &str, _chat_id: &str) -> Result<MessageRef> {
            let mut sent = self.0.lock();
            sent.push(text.to_owned());
            Ok(MessageRef(sent.len() as i64))
        }
    }

    const LESSONS: &str = "INTRO\n\nwelcome\n\n\n\n* LESSON 1 *\n\none\n\n\n\n* LESSON 2 *\n\ntwo\n\n\n\nREVIEW\n\nnotes\n\n\n\n* LESSON 3 *\n\nthree";

    fn feed() -> LessonFeed {
        LessonFeed::from_config(&LessonFeedConfig::default(), 4).unwrap()
    }

    fn at(m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, m, d, 6, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn empty_cursor_posts_until_first_terminal_title() {
        let sender = Recorder::default();
        let store = MemoryStore::new();
        let ctx = TickContext { now: at(6, 10), sender: &sender, store: &store };

        let out = feed().run_once(LESSONS, &ctx).await.unwrap();
        assert_eq!(
            out,
            TickOutcome::Posted { titles: vec!["INTRO".into(), "* LESSON 1 *".into()] }
        );
        assert_eq!(
            store.peek("ACourseInMiraclesWorkbookLast").as_deref(),
            Some("* LESSON 1 *")
        );
    }

    #[tokio::test]
    async fn non_terminal_entries_ride_along_with_the_next_lesson() {
        let sender = Recorder::default();
        let store = MemoryStore::with_values([("ACourseInMiraclesWorkbookLast", "* LESSON 2 *")]);
        let ctx = TickContext { now: at(6, 10), sender: &sender, store: &store };

        let out = feed().run_once(LESSONS, &ctx).await.unwrap();
        assert_eq!(
            out,
            TickOutcome::Posted { titles: vec!["REVIEW".into(), "* LESSON 3 *".into()] }
        );
        assert_eq!(sender.0.lock().len(), 2);
    }

    #[tokio::test]
    async fn cursor_naming_todays_day_number_short_circuits() {
        let sender = Recorder::default();
        // 2025-03-02 is day 2 of the cycle.
        let store = MemoryStore::with_values([("ACourseInMiraclesWorkbookLast", "* LESSON 2 *")]);
        let ctx = TickContext { now: at(3, 2), sender: &sender, store: &store };

        let out = feed().run_once(LESSONS, &ctx).await.unwrap();
        assert_eq!(out, TickOutcome::Skipped(SkipReason::AlreadyPostedToday));
        assert!(sender.0.lock().is_empty());
    }

    #[tokio::test]
    async fn unknown_cursor_posts_nothing() {
        let sender = Recorder::default();
        let store = MemoryStore::with_values([("ACourseInMiraclesWorkbookLast", "* LESSON 99 *")]);
        let ctx = TickContext { now: at(6, 10), sender: &sender, store: &store };

        let out = feed().run_once(LESSONS, &ctx).await.unwrap();
        assert_eq!(out, TickOutcome::Skipped(SkipReason::NothingToPost));
    }

    #[tokio::test]
    async fn cursor_at_last_entry_posts_nothing() {
        let sender = Recorder::default();
        let store = MemoryStore::with_values([("ACourseInMiraclesWorkbookLast", "* LESSON 3 *")]);
        let ctx = TickContext { now: at(6, 10), sender: &sender, store: &store };

        let out = feed().run_once(LESSONS, &ctx).await.unwrap();
        assert_eq!(out, TickOutcome::Skipped(SkipReason::NothingToPost));
        assert!(sender.0.lock().is_empty());
    }

    #[test]
    fn bad_terminal_pattern_is_a_config_error() {
        let cfg = LessonFeedConfig {
            terminal_pattern: Some("(".into()),
            ..LessonFeedConfig::default()
        };
        assert!(matches!(LessonFeed::from_config(&cfg, 4), Err(Error::Config(_))));
    }

    #[test]
    fn no_terminal_pattern_makes_every_entry_terminal() {
        let cfg = LessonFeedConfig {
            terminal_pattern: None,
            ..LessonFeedConfig::default()
        };
        let feed = LessonFeed::from_config(&cfg, 4).unwrap();
        assert!(feed.is_terminal("anything"));
    }
}
