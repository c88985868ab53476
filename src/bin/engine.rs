//! Engine binary: load the XML configuration, start the application, and run
//! until SIGINT/SIGTERM.

use clap::Parser;
use matchbook::app::Application;
use matchbook::config::EngineConfig;
use matchbook::orders::{ValidatorChain, set_default_validator};
use std::process;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "engine", about = "Multi-symbol limit-order matching engine")]
struct Args {
    /// Path to the XML configuration file.
    #[arg(long, default_value = "config.xml")]
    config: String,

    /// Metrics CSV file replayed into the assignment manager.
    #[arg(long)]
    metrics: Option<String>,

    /// Submit a pair of crossing demo orders after startup.
    #[arg(long)]
    demo: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    // Install the standard validation chain before any order can be built.
    set_default_validator(Arc::new(ValidatorChain::standard()));

    let config = match EngineConfig::load(&args.config) {
        Ok(config) => config,
        Err(err) => {
            error!(%err, path = %args.config, "failed to load configuration");
            process::exit(1);
        }
    };

    let mut app = Application::new(config);
    if let Err(err) = app.start() {
        error!(%err, "application failed to start");
        process::exit(1);
    }

    if let Some(path) = &args.metrics
        && let Err(err) = app.start_metrics(path)
    {
        warn!(%err, path, "metrics producer failed to start; continuing without it");
    }

    if args.demo
        && let Err(err) = app.simulate()
    {
        warn!(%err, "demo orders were not accepted");
    }

    // Block until a shutdown signal arrives; the handler runs on its own
    // thread, so it only pokes the channel.
    let (shutdown_tx, shutdown_rx) = crossbeam::channel::bounded::<()>(1);
    if let Err(err) = ctrlc::set_handler(move || {
        let _ = shutdown_tx.try_send(());
    }) {
        error!(%err, "failed to install signal handler");
        process::exit(1);
    }

    info!("engine running; send SIGINT or SIGTERM to stop");
    let _ = shutdown_rx.recv();

    app.shutdown();
}
