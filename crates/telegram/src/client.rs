//! Telegram Bot API implementation of [`Sender`].
//!
//! Messages go out through `sendMessage` with `parse_mode = MarkdownV2`
//! and link previews disabled.  Feed text keeps its `*`/`_` emphasis;
//! operator notices are escaped completely and sent silently.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dp_domain::config::TelegramConfig;
use dp_domain::error::{Error, Result};
use dp_domain::trace::TraceEvent;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::escape::{escape, escape_feed_text};
use crate::sender::{MessageRef, Sender};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    link_preview_options: LinkPreviewOptions,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    disable_notification: bool,
}

#[derive(Debug, Serialize)]
struct LinkPreviewOptions {
    is_disabled: bool,
}

#[derive(Debug, Deserialize)]
struct TgResponse {
    ok: bool,
    #[serde(default)]
    description: String,
    result: Option<TgMessage>,
}

#[derive(Debug, Deserialize)]
struct TgMessage {
    message_id: i64,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Created once and reused for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct TelegramSender {
    http: Client,
    api_base: String,
    token: String,
}

impl TelegramSender {
    pub fn new(cfg: &TelegramConfig, token: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            api_base: cfg.api_base.trim_end_matches('/').to_owned(),
            token,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    async fn send_message(&self, req: &SendMessageRequest<'_>) -> Result<MessageRef> {
        let start = Instant::now();
        let resp = self
            .http
            .post(self.method_url("sendMessage"))
            .json(req)
            .send()
            .await
            // The request URL embeds the bot token.
            .map_err(|e| Error::Send(e.without_url().to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::Send(e.without_url().to_string()))?;
        let parsed: TgResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Send(format!("sendMessage returned {status}: {e}: {body}")))?;

        if !parsed.ok {
            return Err(Error::Send(format!(
                "sendMessage returned {status}: {}",
                parsed.description
            )));
        }
        let message = parsed
            .result
            .ok_or_else(|| Error::Send("sendMessage returned ok without a message".into()))?;

        TraceEvent::MessageSent {
            chat_id: req.chat_id.to_owned(),
            chars: req.text.chars().count(),
            duration_ms: start.elapsed().as_millis() as u64,
        }
        .emit();

        Ok(MessageRef(message.message_id))
    }
}

#[async_trait]
impl Sender for TelegramSender {
    async fn send(&self, text: &str, chat_id: &str) -> Result<MessageRef> {
        let text = escape_feed_text(text);
        tracing::debug!(chat_id, text = %text, "sending message");
        self.send_message(&SendMessageRequest {
            chat_id,
            text: &text,
            parse_mode: "MarkdownV2",
            link_preview_options: LinkPreviewOptions { is_disabled: true },
            disable_notification: false,
        })
        .await
    }

    async fn notify(&self, text: &str, chat_id: &str) -> Result<MessageRef> {
        let text = escape(text);
        self.send_message(&SendMessageRequest {
            chat_id,
            text: &text,
            parse_mode: "MarkdownV2",
            link_preview_options: LinkPreviewOptions { is_disabled: true },
            disable_notification: true,
        })
        .await
    }
}
