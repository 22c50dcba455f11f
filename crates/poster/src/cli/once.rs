//! `daypost once`: a single tick, optionally dry.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dp_domain::config::Config;
use dp_domain::error::Result;
use dp_store::{CursorStore, MemoryStore};
use dp_telegram::{Sender, StdoutSender};

use crate::bootstrap;
use crate::clock::{Clock, FixedClock, SystemClock};
use crate::feeds::TickOutcome;
use crate::notify::Notifier;

/// Reads through to the configured store; writes stay in memory and are
/// printed.
pub struct DryRunStore {
    inner: Arc<dyn CursorStore>,
    pending: MemoryStore,
}

impl DryRunStore {
    pub fn new(inner: Arc<dyn CursorStore>) -> Self {
        Self {
            inner,
            pending: MemoryStore::new(),
        }
    }
}

#[async_trait]
impl CursorStore for DryRunStore {
    async fn get(&self, key: &str) -> Result<String> {
        match self.pending.peek(key) {
            Some(v) => Ok(v),
            None => self.inner.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        println!("── would set {key} = {value:?} ──");
        self.pending.set(key, value).await
    }

    fn backend(&self) -> &'static str {
        "dry-run"
    }
}

/// Returns `false` when any feed failed.
pub async fn run(config: &Config, dry_run: bool, at: Option<DateTime<Utc>>) -> anyhow::Result<bool> {
    // A dry run never talks to Telegram.
    let ignored: &[&str] = if dry_run { &["telegram.token"] } else { &[] };
    bootstrap::check_config(config, ignored)?;

    let clock: Arc<dyn Clock> = match at {
        Some(now) => Arc::new(FixedClock::new(now)),
        None => Arc::new(SystemClock),
    };
    let store = bootstrap::build_store(config)?;
    let (sender, store): (Arc<dyn Sender>, Arc<dyn CursorStore>) = if dry_run {
        (Arc::new(StdoutSender::new()), Arc::new(DryRunStore::new(store)))
    } else {
        (bootstrap::build_sender(&config.telegram)?, store)
    };
    let notifier = Notifier::new(sender.clone(), config.telegram.log_chat_id.clone());

    let mut runner = bootstrap::build_runner(config, sender, store, clock, notifier)?;
    let mut ok = true;
    for report in runner.tick().await {
        match report.result {
            Ok(TickOutcome::Posted { titles }) => {
                println!("{}: posted {}", report.feed, titles.join(" | "));
            }
            Ok(TickOutcome::Skipped(reason)) => println!("{}: skipped ({reason})", report.feed),
            Err(e) => {
                ok = false;
                println!("{}: error: {e}", report.feed);
            }
        }
    }
    Ok(ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dry_run_store_never_writes_through() {
        let real = Arc::new(MemoryStore::with_values([("k", "A")]));
        let dry = DryRunStore::new(real.clone());

        assert_eq!(dry.get("k").await.unwrap(), "A");
        dry.set("k", "B").await.unwrap();
        assert_eq!(dry.get("k").await.unwrap(), "B");
        assert_eq!(real.peek("k").as_deref(), Some("A"));
    }
}
