//! Levelwatch CLI
//!
//! Runs the ingestion server and a couple of maintenance commands.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use levelwatch::alerting::{Notifier, SmsNotifier, ThresholdAlerter};
use levelwatch::api::HttpServer;
use levelwatch::config::{Config, LogFormat, LoggingConfig};
use levelwatch::db::ReadingStore;
use levelwatch::error::StoreError;

/// Levelwatch - level telemetry with threshold SMS alerts
#[derive(Parser)]
#[command(name = "levelwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// SQLite database URL
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP ingestion server (default)
    Serve {
        /// HTTP port, overrides PORT
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the latest stored level
    Latest,

    /// Send a test SMS through the configured gateway
    NotifyTest {
        /// Message text
        #[arg(long, default_value = "Levelwatch test notification")]
        message: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before clap so `env = ...` arguments see it too.
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    let cli = Cli::parse();

    let mut config = match Config::from_lookup(|key| std::env::var(key).ok()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.logging, cli.verbose);

    if !dotenv_loaded {
        info!("No .env file found");
    }

    if let Some(url) = cli.database_url {
        config.database.url = url;
    }

    let result = match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            run_serve(config).await
        }
        Commands::Latest => run_latest(config).await,
        Commands::NotifyTest { message } => run_notify_test(config, &message).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(config: &LoggingConfig, verbose: bool) {
    let default_level = if verbose { "debug" } else { config.level.as_str() };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match config.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn run_serve(config: Config) -> anyhow::Result<()> {
    let store = ReadingStore::connect(&config.database)
        .await
        .context("Failed to initialize database")?;

    let notifier = SmsNotifier::new(config.sms.clone())?;

    match config.alerting.threshold {
        Some(threshold) => {
            info!(
                threshold,
                cooldown = %humantime::format_duration(config.alerting.cooldown),
                "Threshold alerting enabled"
            );
            if !notifier.is_configured() {
                warn!("SMS_API_KEY or SMS_PHONE_NUMBER missing; alerts will fail to send");
            }
        }
        None => info!("LEVEL_THRESHOLD not set, threshold alerting disabled"),
    }

    let alerter = Arc::new(ThresholdAlerter::new(Arc::new(notifier), &config.alerting));
    let server = HttpServer::new(store.clone(), alerter);

    info!("Server starting on {}", config.server.addr());
    server.serve(&config.server.addr(), shutdown_signal()).await?;

    info!("Shutting down...");
    store.close().await;

    Ok(())
}

async fn run_latest(config: Config) -> anyhow::Result<()> {
    let store = ReadingStore::connect(&config.database)
        .await
        .context("Failed to initialize database")?;

    let result = store.latest().await;
    store.close().await;

    match result {
        Ok(level) => {
            println!("{level}");
            Ok(())
        }
        Err(StoreError::Empty) => anyhow::bail!("No level data found"),
        Err(e) => Err(e.into()),
    }
}

async fn run_notify_test(config: Config, message: &str) -> anyhow::Result<()> {
    let notifier = SmsNotifier::new(config.sms)?;
    notifier
        .send(message)
        .await
        .context("Failed to send test notification")?;

    println!("Notification sent");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
