//! Feeds: one pipeline per corpus or almanac, driven once per tick.
//!
//! Every feed shares the same collaborators ([`Sender`], [`CursorStore`],
//! the tick's `now`) and the same helpers for loading a corpus, publishing
//! an entry chunk by chunk, and committing a cursor.

pub mod book_of_days;
pub mod lesson;
pub mod moon_phase;

pub use book_of_days::BookOfDaysFeed;
pub use lesson::LessonFeed;
pub use moon_phase::MoonPhaseFeed;

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dp_corpus::Entry;
use dp_domain::error::{Error, Result};
use dp_domain::trace::TraceEvent;
use dp_store::CursorStore;
use dp_telegram::Sender;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tick types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Why a tick ended without posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No corpus path (or the feed is disabled).
    NotConfigured,
    /// Before the posting start hour.
    TooEarly,
    /// Today's key or day token is already recorded.
    AlreadyPostedToday,
    /// Nothing left after the resume point, or nothing matched today.
    NothingToPost,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::NotConfigured => "not_configured",
            SkipReason::TooEarly => "too_early",
            SkipReason::AlreadyPostedToday => "already_posted_today",
            SkipReason::NothingToPost => "nothing_to_post",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Skipped(SkipReason),
    /// Titles (or a one-line summary for the almanac feeds) of what went out.
    Posted { titles: Vec<String> },
}

impl TickOutcome {
    pub fn posted(&self) -> usize {
        match self {
            TickOutcome::Skipped(_) => 0,
            TickOutcome::Posted { titles } => titles.len(),
        }
    }
}

/// Collaborators handed to a feed for one tick.
pub struct TickContext<'a> {
    pub now: DateTime<Utc>,
    pub sender: &'a dyn Sender,
    pub store: &'a dyn CursorStore,
}

#[async_trait]
pub trait Feed: Send {
    /// Stable name used in logs, trace events, and operator notices.
    fn name(&self) -> &'static str;

    /// Run the feed once.  Returning `Err` never stops the control loop.
    async fn tick(&mut self, ctx: &TickContext<'_>) -> Result<TickOutcome>;
}

pub(crate) fn skipped(feed: &str, reason: SkipReason) -> TickOutcome {
    TraceEvent::FeedSkipped {
        feed: feed.to_owned(),
        reason: reason.as_str().to_owned(),
    }
    .emit();
    TickOutcome::Skipped(reason)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Shared pipeline steps
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Load a corpus fresh from disk.
pub async fn read_corpus(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Send every chunk of `entry` in order.  Stops at the first failure.
///
/// Returns the number of messages sent.
pub async fn publish_entry(
    feed: &str,
    sender: &dyn Sender,
    chat_id: &str,
    entry: &Entry<'_>,
    max_len: usize,
) -> Result<usize> {
    let chunks = entry.chunks(max_len);
    if let Some(big) = chunks.iter().find(|c| c.len() >= max_len) {
        tracing::warn!(
            feed,
            title = %entry.title,
            bytes = big.len(),
            max_len,
            "paragraph exceeds the message ceiling; sending it whole"
        );
    }

    let messages = entry.messages(max_len);
    for (i, text) in messages.iter().enumerate() {
        sender.send(text, chat_id).await.map_err(|e| match e {
            Error::Send(_) => e,
            other => Error::Send(other.to_string()),
        })?;
        tracing::debug!(feed, title = %entry.title, chunk = i, of = messages.len(), "chunk sent");
    }

    TraceEvent::EntryPublished {
        feed: feed.to_owned(),
        title: entry.title.to_owned(),
        chunks: messages.len(),
    }
    .emit();
    Ok(messages.len())
}

fn store_failure(op: &str, key: &str, e: Error) -> Error {
    match e {
        Error::Store(_) => e,
        other => Error::Store(format!("{op} {key}: {other}")),
    }
}

/// A feed's view of one stored string.
///
/// Loaded from the store on first use and kept in memory afterwards.  The
/// mirror advances before the store write, so a failed write is retried
/// with the next commit rather than resending the entry.
#[derive(Debug, Clone)]
pub struct CursorMirror {
    key: String,
    value: Option<String>,
}

impl CursorMirror {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current value, reading through to the store the first time.
    pub async fn load(&mut self, store: &dyn CursorStore) -> Result<String> {
        if let Some(v) = &self.value {
            return Ok(v.clone());
        }
        let v = store
            .get(&self.key)
            .await
            .map_err(|e| store_failure("get", &self.key, e))?;
        tracing::debug!(key = %self.key, value = %v, backend = store.backend(), "cursor loaded");
        self.value = Some(v.clone());
        Ok(v)
    }

    /// Change the in-memory value only.
    pub fn replace(&mut self, value: impl Into<String>) {
        self.value = Some(value.into());
    }

    /// Advance the mirror and persist the value immediately.
    pub async fn commit(&mut self, feed: &str, store: &dyn CursorStore, value: &str) -> Result<()> {
        self.value = Some(value.to_owned());
        store
            .set(&self.key, value)
            .await
            .map_err(|e| store_failure("set", &self.key, e))?;
        TraceEvent::CursorCommitted {
            feed: feed.to_owned(),
            key: self.key.clone(),
            value: value.to_owned(),
        }
        .emit();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dp_store::MemoryStore;

    #[tokio::test]
    async fn mirror_reads_store_once() {
        let store = MemoryStore::with_values([("k", "A")]);
        let mut mirror = CursorMirror::new("k");
        assert_eq!(mirror.load(&store).await.unwrap(), "A");

        store.set("k", "changed behind our back").await.unwrap();
        assert_eq!(mirror.load(&store).await.unwrap(), "A");
    }

    #[tokio::test]
    async fn commit_writes_through() {
        let store = MemoryStore::new();
        let mut mirror = CursorMirror::new("k");
        mirror.commit("test", &store, "B").await.unwrap();
        assert_eq!(store.peek("k").as_deref(), Some("B"));
        assert_eq!(mirror.load(&store).await.unwrap(), "B");
    }

    #[tokio::test]
    async fn replace_stays_in_memory() {
        let store = MemoryStore::with_values([("k", "A")]);
        let mut mirror = CursorMirror::new("k");
        mirror.replace("");
        assert_eq!(mirror.load(&store).await.unwrap(), "");
        assert_eq!(store.peek("k").as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn missing_corpus_is_a_read_error() {
        let err = read_corpus(Path::new("/nonexistent/daypost/corpus.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Read { .. }), "{err}");
    }

    #[test]
    fn outcome_counts_posts() {
        assert_eq!(TickOutcome::Skipped(SkipReason::TooEarly).posted(), 0);
        let posted = TickOutcome::Posted {
            titles: vec!["A".into()],
        };
        assert_eq!(posted.posted(), 1);
    }
}
