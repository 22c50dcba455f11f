//! Wiring shared by `serve` and `once`: config checks, sender, store,
//! feeds and the runner.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use dp_domain::config::{Config, ConfigSeverity, TelegramConfig};
use dp_store::{create_store, CursorStore};
use dp_telegram::{Sender, TelegramSender};

use crate::clock::Clock;
use crate::feeds::{BookOfDaysFeed, LessonFeed, MoonPhaseFeed};
use crate::notify::Notifier;
use crate::runner::Runner;

/// Log every config issue and fail when any of them is an error.  Issues
/// on `ignored_fields` are dropped.
pub fn check_config(config: &Config, ignored_fields: &[&str]) -> anyhow::Result<()> {
    let issues: Vec<_> = config
        .validate()
        .into_iter()
        .filter(|i| !ignored_fields.contains(&i.field.as_str()))
        .collect();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    let errors = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if errors > 0 {
        anyhow::bail!("config validation failed with {errors} error(s)");
    }
    Ok(())
}

pub fn build_sender(cfg: &TelegramConfig) -> anyhow::Result<Arc<dyn Sender>> {
    let token = cfg
        .resolve_token()
        .with_context(|| format!("no bot token (set ${} or telegram.token)", cfg.token_env))?;
    let sender = TelegramSender::new(cfg, token).context("building telegram client")?;
    tracing::info!(api_base = %cfg.api_base, "telegram sender ready");
    Ok(Arc::new(sender))
}

pub fn build_store(config: &Config) -> anyhow::Result<Arc<dyn CursorStore>> {
    create_store(&config.store).context("creating cursor store")
}

/// Feeds in tick order: moon phase, book of days, lesson.
pub fn build_runner(
    config: &Config,
    sender: Arc<dyn Sender>,
    store: Arc<dyn CursorStore>,
    clock: Arc<dyn Clock>,
    notifier: Notifier,
) -> anyhow::Result<Runner> {
    let hour = config.posting_start_hour;
    let feeds = &config.feeds;

    let moon = MoonPhaseFeed::from_config(&feeds.moon_phase, &config.telegram.log_chat_id, hour);
    let book = BookOfDaysFeed::from_config(&feeds.book_of_days, hour);
    let lesson = LessonFeed::from_config(&feeds.lesson, hour).context("configuring lesson feed")?;

    Ok(Runner::new(
        sender,
        store,
        clock,
        notifier,
        Duration::from_secs(config.interval_secs),
    )
    .with_feed(moon)
    .with_feed(book)
    .with_feed(lesson))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dp_store::MemoryStore;
    use dp_telegram::StdoutSender;

    use crate::clock::SystemClock;

    #[test]
    fn runner_orders_feeds() {
        let sender: Arc<dyn Sender> = Arc::new(StdoutSender::new());
        let runner = build_runner(
            &Config::default(),
            sender.clone(),
            Arc::new(MemoryStore::new()),
            Arc::new(SystemClock),
            Notifier::new(sender, ""),
        )
        .unwrap();
        assert_eq!(runner.feed_names(), ["moon_phase", "book_of_days", "lesson"]);
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = Config {
            posting_start_hour: 24,
            ..Config::default()
        };
        assert!(check_config(&config, &[]).is_err());
    }

    #[test]
    fn ignored_fields_are_dropped() {
        let config = Config {
            telegram: TelegramConfig {
                token_env: "DP_TEST_TOKEN_THAT_IS_NEVER_SET".into(),
                ..TelegramConfig::default()
            },
            ..Config::default()
        };
        assert!(check_config(&config, &[]).is_err());
        assert!(check_config(&config, &["telegram.token"]).is_ok());
    }

    #[test]
    fn missing_token_is_reported() {
        let cfg = TelegramConfig {
            token_env: "DP_TEST_TOKEN_THAT_IS_NEVER_SET".into(),
            token: None,
            ..TelegramConfig::default()
        };
        let err = build_sender(&cfg).err().unwrap();
        assert!(err.to_string().contains("DP_TEST_TOKEN_THAT_IS_NEVER_SET"));
    }
}
