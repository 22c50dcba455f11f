//! `dp-domain` — types shared by every daypost crate: the error taxonomy,
//! the TOML configuration tree, and structured trace events.

pub mod config;
pub mod error;
pub mod trace;
