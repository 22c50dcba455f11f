pub mod config;
pub mod inspect;
pub mod once;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

/// daypost — publishes slow-moving text corpora to Telegram, one day at a time.
#[derive(Debug, Parser)]
#[command(name = "daypost", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the posting loop (default when no subcommand is given).
    Serve,
    /// Run every feed once and exit.
    Once {
        /// Print messages and cursor writes instead of sending and storing them.
        #[arg(long)]
        dry_run: bool,
        /// Pretend the current time is this RFC 3339 instant.
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// List the entries of a corpus file that will be split into chunks.
    Inspect {
        /// Corpus file.
        path: PathBuf,
        /// Chunk threshold in bytes.
        #[arg(long, default_value_t = dp_corpus::MAX_LEN)]
        max_len: usize,
    },
    /// Print about a year of new and full moon dates.
    MoonCalendar {
        /// Start from this RFC 3339 instant instead of now.
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `DP_CONFIG` (or `daypost.toml`
/// by default).  A missing file yields the defaults.  Returns the parsed
/// [`Config`](dp_domain::config::Config) and the path that was used.
pub fn load_config() -> anyhow::Result<(dp_domain::config::Config, String)> {
    let config_path = std::env::var("DP_CONFIG").unwrap_or_else(|_| "daypost.toml".into());

    let config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
        toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))?
    } else {
        dp_domain::config::Config::default()
    };

    Ok((config, config_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["daypost"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn once_accepts_rfc3339_instant() {
        let cli =
            Cli::try_parse_from(["daypost", "once", "--dry-run", "--at", "2025-03-01T05:00:00Z"])
                .unwrap();
        match cli.command {
            Some(Command::Once { dry_run, at }) => {
                assert!(dry_run);
                assert_eq!(at.unwrap().to_rfc3339(), "2025-03-01T05:00:00+00:00");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn inspect_defaults_to_transport_ceiling() {
        let cli = Cli::try_parse_from(["daypost", "inspect", "lessons.txt"]).unwrap();
        match cli.command {
            Some(Command::Inspect { max_len, .. }) => assert_eq!(max_len, 4000),
            other => panic!("unexpected {other:?}"),
        }
    }
}
