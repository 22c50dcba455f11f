//! Daily almanac feed: one excerpt per calendar day, picked by a regex
//! built from today's `January 2` date.

use std::path::PathBuf;

use async_trait::async_trait;
use dp_corpus::{title_of, Entry, MAX_LEN};
use dp_domain::config::BookOfDaysFeedConfig;
use dp_domain::error::{Error, Result};
use regex::Regex;

use super::{
    publish_entry, read_corpus, skipped, CursorMirror, Feed, SkipReason, TickContext, TickOutcome,
};
use crate::gate::{calendar_day_key, eligible_hour, DayKeyFormat};

const NAME: &str = "book_of_days";

/// Literal replaced with today's key inside the pattern template.
pub const MONTHDAY_PLACEHOLDER: &str = "monthday";

pub struct BookOfDaysFeed {
    path: Option<PathBuf>,
    chat_id: String,
    template: String,
    start_hour: u32,
    posted: CursorMirror,
}

impl BookOfDaysFeed {
    pub fn from_config(cfg: &BookOfDaysFeedConfig, start_hour: u32) -> Self {
        Self {
            path: cfg.path.clone(),
            chat_id: cfg.chat_id.clone(),
            template: cfg.pattern_template.clone(),
            start_hour,
            posted: CursorMirror::new(cfg.cursor_key.clone()),
        }
    }

    /// Today's excerpt, trimmed, or `None` when the pattern finds nothing.
    pub fn excerpt<'a>(&self, corpus: &'a str, monthday: &str) -> Result<Option<&'a str>> {
        let pattern = self.template.replace(MONTHDAY_PLACEHOLDER, monthday);
        let re = Regex::new(&pattern)
            .map_err(|e| Error::Config(format!("feeds.book_of_days.pattern_template: {e}")))?;
        Ok(re
            .find(corpus)
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty()))
    }
}

#[async_trait]
impl Feed for BookOfDaysFeed {
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
        if self.template.is_empty() {
            return Err(Error::Config("feeds.book_of_days.pattern_template is empty".into()));
        }

        let raw = read_corpus(&path).await?;
        let corpus = raw.trim();
        if corpus.is_empty() {
            return Err(Error::EmptyCorpus(path.display().to_string()));
        }

        let monthday = calendar_day_key(ctx.now, DayKeyFormat::MonthDay);
        if self.posted.load(ctx.store).await? == monthday {
            return Ok(skipped(NAME, SkipReason::AlreadyPostedToday));
        }

        let Some(text) = self.excerpt(corpus, &monthday)? else {
            tracing::info!(%monthday, "no book of days text for today");
            return Ok(skipped(NAME, SkipReason::NothingToPost));
        };

        let entry = Entry {
            index: 0,
            title: title_of(text),
            body: text,
        };
        publish_entry(NAME, ctx.sender, &self.chat_id, &entry, MAX_LEN).await?;
        self.posted.commit(NAME, ctx.store, &monthday).await?;

        Ok(TickOutcome::Posted {
            titles: vec![entry.title.to_owned()],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(template: &str) -> BookOfDaysFeed {
        BookOfDaysFeed::from_config(
            &BookOfDaysFeedConfig {
                pattern_template: template.into(),
                ..BookOfDaysFeedConfig::default()
            },
            4,
        )
    }

    const CORPUS: &str = "January 1\n\nNew year.\n\n\n\nJanuary 2\n\nSecond day.\n\n\n\nJanuary 3\n\nThird.";

    #[test]
    fn excerpt_uses_todays_key() {
        let f = feed(r"(?s)monthday\n.*?(\n\n\n\n|$)");
        assert_eq!(
            f.excerpt(CORPUS, "January 2").unwrap(),
            Some("January 2\n\nSecond day.")
        );
    }

    #[test]
    fn no_match_is_none() {
        let f = feed(r"(?s)monthday\n.*?(\n\n\n\n|$)");
        assert_eq!(f.excerpt(CORPUS, "March 9").unwrap(), None);
    }

    #[test]
    fn broken_template_is_a_config_error() {
        let f = feed("monthday(");
        assert!(matches!(f.excerpt(CORPUS, "January 2"), Err(Error::Config(_))));
    }
}
