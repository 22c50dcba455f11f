use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dp_domain::error::Result;

/// Identifier the transport assigned to a delivered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef(pub i64);

/// Delivers text to a destination chat.
///
/// Any non-success outcome must come back as an error; callers never
/// inspect the returned [`MessageRef`] to decide success.
#[async_trait]
pub trait Sender: Send + Sync {
    /// Publish feed text.  Emphasis markers (`*`, `_`) in `text` are kept.
    async fn send(&self, text: &str, chat_id: &str) -> Result<MessageRef>;

    /// Send an operator notice: literal text, no notification sound.
    async fn notify(&self, text: &str, chat_id: &str) -> Result<MessageRef> {
        self.send(text, chat_id).await
    }
}

/// Prints every message to stdout instead of sending it.
#[derive(Debug, Default)]
pub struct StdoutSender {
    next_id: AtomicI64,
}

impl StdoutSender {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Sender for StdoutSender {
    async fn send(&self, text: &str, chat_id: &str) -> Result<MessageRef> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        println!("── message {id} → {chat_id} ({} bytes) ──", text.len());
        println!("{text}");
        Ok(MessageRef(id))
    }
}
