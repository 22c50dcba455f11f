use serde::Serialize;

/// Structured trace events emitted across all daypost crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    MessageSent {
        chat_id: String,
        chars: usize,
        duration_ms: u64,
    },
    EntryPublished {
        feed: String,
        title: String,
        chunks: usize,
    },
    CursorCommitted {
        feed: String,
        key: String,
        value: String,
    },
    FeedSkipped {
        feed: String,
        reason: String,
    },
    StoreCall {
        backend: String,
        op: String,
        key: String,
        status: u16,
        duration_ms: u64,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "dp_event");
    }
}
