//! Lintel - decoration input routing for stacking compositors
//!
//! Drives the decoration input core from recorded input traces: hover
//! feedback, titlebar clicks and double-clicks, the titlebar wheel, and
//! interactive moves and resizes from both pointer and touch.
//!
//! # Features
//! - Pointer and multi-touch decoration input
//! - Move/resize with drag threshold, delayed start and minimum size clamp
//! - Borderless decorations with invisible resize margins
//! - TOML configuration with runtime reload
//! - JSON input trace replay through the winit backend adapter

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod trace;

use lintel_backend_winit::{run_headless_test, WinitBackend};
use lintel_core::config::Config;
use lintel_core::Core;

/// Lintel - decoration input core
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Run in debug mode with verbose logging
    #[arg(short, long)]
    debug: bool,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,

    /// Print default configuration to stdout
    #[arg(long)]
    print_default_config: bool,

    /// Replay a JSON input trace through the backend
    #[arg(short, long)]
    replay: Option<String>,

    /// With --replay, print every resulting action as a JSON line
    #[arg(long)]
    dump_actions: bool,

    /// Run the built-in headless drag check and exit
    #[arg(long)]
    self_test: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Lintel v{} starting...", env!("CARGO_PKG_VERSION"));

    // Handle special commands
    if args.print_default_config {
        println!("{}", Config::default_config_string());
        return Ok(());
    }

    if args.validate {
        // Validation must fail loudly instead of falling back to defaults.
        Config::load(args.config.as_deref())?;
        info!("Configuration is valid");
        return Ok(());
    }

    // Load configuration
    let config = match Config::load(args.config.as_deref()) {
        Ok(cfg) => {
            info!("Configuration loaded successfully");
            cfg
        },
        Err(e) => {
            warn!("Failed to load config: {:#}, using defaults", e);
            Config::default()
        },
    };

    if args.self_test {
        let moved = run_headless_test(config)?;
        anyhow::ensure!(moved, "Headless drag did not move the window");
        info!("Headless drag check passed");
        return Ok(());
    }

    let Some(path) = args.replay else {
        info!("Nothing to replay; pass --replay <trace.json> or --self-test");
        return Ok(());
    };
    let events = trace::load(&path)?;
    info!("Replaying {} events from {}", events.len(), path);

    if args.dump_actions {
        let mut core = Core::new(config);
        for event in events {
            for action in core.handle_event(event) {
                println!("{}", trace::action_line(&action)?);
            }
        }
        return Ok(());
    }

    WinitBackend::new(config).run(events)
}
