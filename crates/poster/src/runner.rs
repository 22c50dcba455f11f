//! Control loop: every interval, run each feed once, strictly in order.

use std::sync::Arc;
use std::time::Duration;

use dp_domain::error::Result;
use dp_store::CursorStore;
use dp_telegram::Sender;
use tracing::Instrument;

use crate::clock::Clock;
use crate::feeds::{Feed, TickContext, TickOutcome};
use crate::notify::Notifier;

/// One feed's result for one tick.
pub struct FeedReport {
    pub feed: &'static str,
    pub result: Result<TickOutcome>,
}

pub struct Runner {
    feeds: Vec<Box<dyn Feed>>,
    sender: Arc<dyn Sender>,
    store: Arc<dyn CursorStore>,
    clock: Arc<dyn Clock>,
    notifier: Notifier,
    interval: Duration,
}

impl Runner {
    pub fn new(
        sender: Arc<dyn Sender>,
        store: Arc<dyn CursorStore>,
        clock: Arc<dyn Clock>,
        notifier: Notifier,
        interval: Duration,
    ) -> Self {
        Self {
            feeds: Vec::new(),
            sender,
            store,
            clock,
            notifier,
            interval,
        }
    }

    /// Feeds run in the order they are added.
    pub fn with_feed(mut self, feed: impl Feed + 'static) -> Self {
        self.feeds.push(Box::new(feed));
        self
    }

    pub fn feed_names(&self) -> Vec<&'static str> {
        self.feeds.iter().map(|f| f.name()).collect()
    }

    /// Run every feed once.  A failing feed is logged and reported to the
    /// operator chat; the remaining feeds still run.
    pub async fn tick(&mut self) -> Vec<FeedReport> {
        let now = self.clock.now();
        let ctx = TickContext {
            now,
            sender: self.sender.as_ref(),
            store: self.store.as_ref(),
        };

        let mut reports = Vec::with_capacity(self.feeds.len());
        for feed in self.feeds.iter_mut() {
            let name = feed.name();
            let span = tracing::info_span!("feed", feed = name, now = %now);
            let result = feed.tick(&ctx).instrument(span).await;
            match &result {
                Ok(TickOutcome::Posted { titles }) => {
                    tracing::info!(feed = name, posted = titles.len(), "feed posted");
                }
                Ok(TickOutcome::Skipped(reason)) => {
                    tracing::debug!(feed = name, %reason, "feed skipped");
                }
                Err(e) => {
                    tracing::error!(feed = name, error = %e, "feed failed");
                    self.notifier.report(&format!("ERROR {name} {e}")).await;
                }
            }
            reports.push(FeedReport { feed: name, result });
        }
        reports
    }

    /// Tick, sleep for the rest of the interval, repeat.
    pub async fn run_forever(&mut self) {
        tracing::info!(
            feeds = ?self.feed_names(),
            interval_secs = self.interval.as_secs(),
            store = self.store.backend(),
            "runner started"
        );
        loop {
            let started = tokio::time::Instant::now();
            self.tick().await;
            match self.interval.checked_sub(started.elapsed()) {
                Some(rest) => tokio::time::sleep(rest).await,
                None => tracing::warn!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "tick took longer than the interval"
                ),
            }
        }
    }
}

/// Resolves on SIGINT or SIGTERM with the signal's name.
pub async fn termination_signal() -> std::io::Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            r = tokio::signal::ctrl_c() => r.map(|_| "SIGINT"),
            _ = sigterm.recv() => Ok("SIGTERM"),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.map(|_| "SIGINT")
    }
}
