//! `dp-telegram` — the outbound side of daypost.
//!
//! [`Sender`] is the seam the feeds publish through.  [`TelegramSender`]
//! talks to the Bot API with MarkdownV2 formatting, [`StdoutSender`] prints
//! messages for dry runs.

pub mod client;
pub mod escape;
pub mod sender;

pub use client::TelegramSender;
pub use escape::{escape, escape_except, escape_feed_text, escape_underscore_runs};
pub use sender::{MessageRef, Sender, StdoutSender};
