//! OBS Tally - tally light control for OBS Studio using Raspberry Pi GPIO
//!
//! Mirrors the on-air state of OBS sources onto GPIO-driven tally lights,
//! reconnecting and resynchronizing whenever OBS goes away.

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod bindings;
mod config;
mod obs;
mod outputs;
mod projector;
mod session;
mod source;
mod store;
mod sync;

use crate::bindings::SourceBindings;
use crate::config::AppConfig;
use crate::obs::ObsSource;
use crate::projector::OutputProjector;
use crate::session::SessionManager;
use crate::store::ActivityStore;
use crate::sync::SyncLoop;
use std::sync::Arc;

/// Tally light control for OBS Studio using Raspberry Pi GPIO
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// obs-websocket server address (HOST:PORT)
    #[arg(short, long, value_name = "HOST:PORT")]
    connect: Option<String>,

    /// obs-websocket password
    #[arg(short, long, env = "OBS_PASSWORD")]
    password: Option<String>,

    /// Assign a source to a GPIO pin (PIN=SOURCE_NAME), repeatable
    #[arg(short, long = "assign", value_name = "PIN=SOURCE_NAME")]
    assign: Vec<String>,

    /// Path to a YAML configuration file
    #[arg(short = 'f', long = "config")]
    config: Option<String>,

    /// Run as a service: absorb connection failures and retry forever
    #[arg(short, long)]
    daemon: bool,

    /// Increase verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_logging(args.verbose)?;

    info!("Starting OBS Tally...");

    let mut config = match &args.config {
        Some(path) => AppConfig::load(path).await?,
        None => AppConfig::default(),
    };
    if let Some(spec) = &args.connect {
        config.apply_endpoint(spec)?;
    }
    if args.password.is_some() {
        config.obs.password = args.password.clone();
    }
    config.apply_assigns(&args.assign)?;
    if args.daemon {
        config.daemon = true;
    }

    let bindings = Arc::new(SourceBindings::new(&config.assigns));
    if bindings.is_empty() {
        warn!("no pin assignments configured; tally outputs will stay dark");
    }
    info!(
        "{} sources bound to {} pins",
        bindings.len(),
        bindings.pins().len()
    );

    let output = outputs::probe();
    let projector = OutputProjector::new(output, Arc::clone(&bindings))?;
    let store = ActivityStore::new(Arc::clone(&bindings));

    let source = ObsSource::new(
        config.obs.host.clone(),
        config.obs.port,
        config.obs.password.clone(),
    );
    let session = SessionManager::new(Box::new(source), Arc::clone(&bindings), config.daemon);

    let mut sync = SyncLoop::new(session, store, projector);

    let result = tokio::select! {
        res = sync.run() => res,
        _ = shutdown_signal() => Ok(()),
    };

    // Leave no tally light lit behind us.
    sync.blackout();
    result?;

    info!("OBS Tally shutdown complete");
    Ok(())
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    info!("🛑 Shutdown signal received");
}
