//! `dp-poster` — date gates, the moon calculator, the three feeds and the
//! control loop that drives them, plus the `daypost` CLI.

pub mod bootstrap;
pub mod cli;
pub mod clock;
pub mod feeds;
pub mod gate;
pub mod moon;
pub mod notify;
pub mod runner;

/// Name used in operator notices.
pub const PROGRAM: &str = "daypost";
