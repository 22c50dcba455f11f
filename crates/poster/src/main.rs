use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig as _;

use dp_domain::config::{Config, ObservabilityConfig};
use dp_poster::bootstrap;
use dp_poster::cli::{Cli, Command, ConfigCommand};
use dp_poster::clock::SystemClock;
use dp_poster::notify::Notifier;
use dp_poster::runner::termination_signal;
use dp_poster::PROGRAM;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Default to serve when no subcommand is given.
        None | Some(Command::Serve) => {
            let (config, config_path) = dp_poster::cli::load_config()?;
            let tracer_provider = init_tracing(&config.observability);
            serve(config, config_path, tracer_provider).await
        }
        Some(Command::Once { dry_run, at }) => {
            init_cli_tracing();
            let (config, _) = dp_poster::cli::load_config()?;
            if !dp_poster::cli::once::run(&config, dry_run, at).await? {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Inspect { path, max_len }) => {
            init_cli_tracing();
            dp_poster::cli::inspect::run(&path, max_len)
        }
        Some(Command::MoonCalendar { at }) => {
            println!("{}", dp_poster::moon::moon_calendar(at.unwrap_or_else(Utc::now)));
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Validate)) => {
            let (config, config_path) = dp_poster::cli::load_config()?;
            if !dp_poster::cli::config::validate(&config, &config_path) {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            let (config, _config_path) = dp_poster::cli::load_config()?;
            dp_poster::cli::config::show(&config)
        }
        Some(Command::Version) => {
            println!("{PROGRAM} {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Initialize structured JSON tracing (only for the `serve` command).
///
/// When `otlp_endpoint` is configured, an OpenTelemetry layer is added
/// so that every feed tick span is also exported via OTLP/gRPC.  The
/// returned provider must be shut down on exit to flush pending spans.
fn init_tracing(obs: &ObservabilityConfig) -> Option<opentelemetry_sdk::trace::SdkTracerProvider> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,dp_poster=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer().json();

    let Some(endpoint) = &obs.otlp_endpoint else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
        return None;
    };

    let exporter = match opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
    {
        Ok(e) => e,
        Err(e) => {
            eprintln!(
                "WARNING: failed to create OTLP exporter for {endpoint}: {e}; \
                 starting without OpenTelemetry"
            );
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .init();
            return None;
        }
    };

    let resource = opentelemetry_sdk::Resource::builder()
        .with_service_name(obs.service_name.clone())
        .build();

    let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_sampler(opentelemetry_sdk::trace::Sampler::TraceIdRatioBased(
            obs.sample_rate,
        ))
        .with_resource(resource)
        .build();

    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer_provider.tracer(PROGRAM));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .init();

    Some(tracer_provider)
}

/// Initialize compact stderr-only tracing for CLI one-shot commands.
///
/// Defaults to `warn` level so diagnostic output does not pollute stdout.
fn init_cli_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn shutdown_tracer(tracer_provider: Option<opentelemetry_sdk::trace::SdkTracerProvider>) {
    if let Some(provider) = tracer_provider {
        if let Err(e) = provider.shutdown() {
            tracing::warn!(error = ?e, "OpenTelemetry tracer provider shutdown failed");
        }
    }
}

/// Run the posting loop until SIGINT or SIGTERM.
///
/// The signal interrupts whatever tick is in flight.  A cursor is only
/// written after its entry is fully sent, so the interrupted entry is
/// simply retried by the next process.
async fn serve(
    config: Config,
    config_path: String,
    tracer_provider: Option<opentelemetry_sdk::trace::SdkTracerProvider>,
) -> anyhow::Result<()> {
    tracing::info!(config = %config_path, version = env!("CARGO_PKG_VERSION"), "daypost starting");

    bootstrap::check_config(&config, &[])?;
    let sender = bootstrap::build_sender(&config.telegram)?;
    let store = bootstrap::build_store(&config)?;
    let notifier = Notifier::new(sender.clone(), config.telegram.log_chat_id.clone());
    let mut runner = bootstrap::build_runner(
        &config,
        sender,
        store,
        Arc::new(SystemClock),
        notifier.clone(),
    )?;

    let signal = tokio::select! {
        _ = runner.run_forever() => None,
        signal = termination_signal() => Some(signal.context("installing signal handlers")?),
    };

    if let Some(signal) = signal {
        tracing::warn!(signal, "terminating");
        notifier.report(&format!("{PROGRAM} sigterm")).await;
    }
    shutdown_tracer(tracer_provider);
    std::process::exit(1);
}
