//! Operator channel: feed errors and lifecycle notices go to an admin chat.

use std::sync::Arc;

use dp_telegram::Sender;

#[derive(Clone)]
pub struct Notifier {
    sender: Arc<dyn Sender>,
    chat_id: String,
}

impl Notifier {
    /// An empty `chat_id` turns every report into a no-op.
    pub fn new(sender: Arc<dyn Sender>, chat_id: impl Into<String>) -> Self {
        Self {
            sender,
            chat_id: chat_id.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.chat_id.is_empty()
    }

    /// Best effort.  Failures are logged and swallowed.
    pub async fn report(&self, text: &str) {
        if !self.is_enabled() {
            return;
        }
        if let Err(e) = self.sender.notify(text, &self.chat_id).await {
            tracing::warn!(error = %e, notice = text, "operator notice not delivered");
        }
    }
}
