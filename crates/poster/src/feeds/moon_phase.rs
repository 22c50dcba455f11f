//! New/full moon announcements, at most one per UTC day.

use async_trait::async_trait;
use dp_domain::config::MoonPhaseFeedConfig;
use dp_domain::error::Result;

use super::{skipped, CursorMirror, Feed, SkipReason, TickContext, TickOutcome};
use crate::gate::{calendar_day_key, eligible_hour, DayKeyFormat};
use crate::moon::moon_phase_today;

const NAME: &str = "moon_phase";

pub struct MoonPhaseFeed {
    enabled: bool,
    chat_id: String,
    start_hour: u32,
    posted: CursorMirror,
}

impl MoonPhaseFeed {
    /// An empty `chat_id` falls back to `fallback_chat_id`.
    pub fn from_config(cfg: &MoonPhaseFeedConfig, fallback_chat_id: &str, start_hour: u32) -> Self {
        let chat_id = if cfg.chat_id.is_empty() {
            fallback_chat_id
        } else {
            &cfg.chat_id
        };
        Self {
            enabled: cfg.enabled,
            chat_id: chat_id.to_owned(),
            start_hour,
            posted: CursorMirror::new(cfg.cursor_key.clone()),
        }
    }
}

#[async_trait]
impl Feed for MoonPhaseFeed {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn tick(&mut self, ctx: &TickContext<'_>) -> Result<TickOutcome> {
        if !self.enabled || self.chat_id.is_empty() {
            return Ok(skipped(NAME, SkipReason::NotConfigured));
        }
        if !eligible_hour(ctx.now, self.start_hour) {
            return Ok(skipped(NAME, SkipReason::TooEarly));
        }

        let today = calendar_day_key(ctx.now, DayKeyFormat::YearMonthDay);
        if self.posted.load(ctx.store).await? == today {
            return Ok(skipped(NAME, SkipReason::AlreadyPostedToday));
        }

        let message = moon_phase_today(ctx.now);
        if let Some(text) = &message {
            ctx.sender.send(text, &self.chat_id).await?;
            tracing::info!(%today, "moon phase posted");
        }
        // Recorded on quiet days too, so the phase is computed once a day.
        self.posted.commit(NAME, ctx.store, &today).await?;

        Ok(match message {
            Some(text) => TickOutcome::Posted { titles: vec![text] },
            None => skipped(NAME, SkipReason::NothingToPost),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_chat_falls_back() {
        let feed = MoonPhaseFeed::from_config(&MoonPhaseFeedConfig::default(), "-100log", 4);
        assert_eq!(feed.chat_id, "-100log");

        let cfg = MoonPhaseFeedConfig {
            chat_id: "-100moon".into(),
            ..MoonPhaseFeedConfig::default()
        };
        let feed = MoonPhaseFeed::from_config(&cfg, "-100log", 4);
        assert_eq!(feed.chat_id, "-100moon");
    }
}
