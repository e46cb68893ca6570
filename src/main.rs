use clap::{Parser, Subcommand};
use slatecast::api::types::PlayerInput;
use slatecast::config::LoggingConfig;
use slatecast::error::{Result, SlatecastError};
use slatecast::providers::SignalSource;
use slatecast::services::SignalWatcher;
use slatecast::{create_router, AppConfig, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "slatecast")]
#[command(author = "Slatecast Team")]
#[command(version = "0.1.0")]
#[command(about = "Fantasy slate projection enhancement and alerting service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config directory path
    #[arg(short, long, default_value = "config")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server with background signal polling
    Serve {
        /// Override the configured listen port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Enhance a slate from a JSON file and print the projections
    Enhance {
        /// Path to a JSON array of players
        file: String,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
    /// Validate configuration and exit
    Check {
        /// Print the effective configuration as TOML
        #[arg(long)]
        print: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Enhance { file, pretty }) => {
            init_logging_simple();
            run_enhance_mode(&cli.config, file, *pretty).await?;
        }
        Some(Commands::Check { print }) => {
            init_logging_simple();
            run_check_mode(&cli.config, *print)?;
        }
        Some(Commands::Serve { port }) => {
            run_server(&cli.config, *port).await?;
        }
        None => {
            run_server(&cli.config, None).await?;
        }
    }

    Ok(())
}

async fn run_server(config_dir: &str, port_override: Option<u16>) -> Result<()> {
    let mut config = match AppConfig::load_from(config_dir) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            eprintln!("Using default configuration");
            AppConfig::default_config()
        }
    };

    if let Some(port) = port_override {
        config.server.port = port;
    }

    init_logging(&config.logging);

    if let Err(errors) = config.validate() {
        for err in &errors {
            error!("Configuration error: {}", err);
        }
        return Err(SlatecastError::InvalidInput(format!(
            "configuration invalid ({} problems)",
            errors.len()
        )));
    }

    info!("Starting slatecast");

    let state = AppState::build(config)?;
    info!(
        "Enabled providers: {:?}",
        state.providers.enabled_providers()
    );

    // Restore the usage ledger, then flush it on an interval
    state.usage.load_snapshot().await;
    let persistence_handle =
        Arc::clone(&state.usage).spawn_persistence(state.config.usage.flush_secs);

    // Expired alert suppression entries are swept in the background
    let sweep_handle = Arc::clone(&state.alerts).spawn_suppression_sweep();

    // Background watcher re-polls weather and sentiment for the loaded slate
    let watcher_handle = if state.config.watcher.enabled {
        let watcher = SignalWatcher::new(
            &state.config.watcher,
            Arc::clone(&state.providers) as Arc<dyn SignalSource>,
            Arc::clone(&state.slate),
            Arc::clone(&state.alerts),
        );
        Some(tokio::spawn(async move {
            if let Err(e) = watcher.start().await {
                error!("Signal watcher error: {}", e);
            }
        }))
    } else {
        info!("Signal watcher disabled");
        None
    };

    // Periodic status logging
    let status_handle = {
        let metrics = Arc::clone(&state.metrics);
        tokio::spawn(async move {
            let mut status_interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                status_interval.tick().await;
                metrics.log_status();
            }
        })
    };

    let addr = format!("{}:{}", state.config.server.bind, state.config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("API server listening on http://{}", addr);

    let usage = Arc::clone(&state.usage);
    let app = create_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down...");

    if let Err(e) = usage.flush_snapshot().await {
        warn!("Final usage flush failed: {}", e);
    }

    if let Some(handle) = watcher_handle {
        handle.abort();
    }
    persistence_handle.abort();
    sweep_handle.abort();
    status_handle.abort();

    info!("Shutdown complete");
    Ok(())
}

/// One-shot enhancement of a slate file, projections printed to stdout
async fn run_enhance_mode(config_dir: &str, file: &str, pretty: bool) -> Result<()> {
    let config = match AppConfig::load_from(config_dir) {
        Ok(c) => c,
        Err(_) => AppConfig::default_config(),
    };

    let raw = std::fs::read_to_string(file)?;
    let inputs: Vec<PlayerInput> = serde_json::from_str(&raw)?;

    if inputs.is_empty() {
        return Err(SlatecastError::InvalidInput(
            "players must not be empty".to_string(),
        ));
    }

    let mut players = Vec::with_capacity(inputs.len());
    for input in inputs {
        let player = input.into_player();
        player
            .validate()
            .map_err(|e| SlatecastError::InvalidInput(format!("player {}: {e}", player.id)))?;
        players.push(player);
    }

    let state = AppState::build(config)?;
    state.usage.load_snapshot().await;

    let results = state.projections.enhance_slate(&players).await;

    let output = if pretty {
        serde_json::to_string_pretty(&results)?
    } else {
        serde_json::to_string(&results)?
    };
    println!("{output}");

    if let Err(e) = state.usage.flush_snapshot().await {
        warn!("Usage flush failed: {}", e);
    }

    Ok(())
}

fn run_check_mode(config_dir: &str, print: bool) -> Result<()> {
    let config = AppConfig::load_from(config_dir)?;

    match config.validate() {
        Ok(()) => {
            println!("\x1b[32m✓ Configuration OK\x1b[0m");
            println!("  Server: {}:{}", config.server.bind, config.server.port);
            println!(
                "  Alerts: projection {:.1}%, sentiment {:.2}, weather severity {:.1}",
                config.alerts.projection_change_pct * 100.0,
                config.alerts.sentiment_delta,
                config.alerts.weather_severity_delta
            );
            println!(
                "  Watcher: {} (weather {}s, social {}s)",
                if config.watcher.enabled {
                    "enabled"
                } else {
                    "disabled"
                },
                config.watcher.weather_interval_secs,
                config.watcher.social_interval_secs
            );
            if print {
                let rendered = toml::to_string_pretty(&config)
                    .map_err(|e| SlatecastError::Internal(format!("failed to render config: {e}")))?;
                println!();
                println!("{rendered}");
            }
            Ok(())
        }
        Err(errors) => {
            for err in &errors {
                println!("\x1b[31m✗ {err}\x1b[0m");
            }
            Err(SlatecastError::InvalidInput(format!(
                "configuration invalid ({} problems)",
                errors.len()
            )))
        }
    }
}

fn init_logging(logging: &LoggingConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},slatecast=debug", logging.level)));

    // Check if we should write to file (prefer SLATECAST_LOG_DIR, fallback to LOG_DIR).
    let log_dir = std::env::var("SLATECAST_LOG_DIR")
        .or_else(|_| std::env::var("LOG_DIR"))
        .unwrap_or_else(|_| "/var/log/slatecast".to_string());

    // Try to create log directory.
    //
    // Important: `tracing_appender::rolling::daily` will panic (and in our release build,
    // abort) if it can't create the initial log file. So we must preflight writability.
    let file_layer = if std::fs::create_dir_all(&log_dir).is_ok() {
        let test_path = std::path::Path::new(&log_dir).join(".slatecast_write_test");
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&test_path)
        {
            Ok(_) => {
                let _ = std::fs::remove_file(&test_path);

                // Daily rotating file appender
                let file_appender = tracing_appender::rolling::daily(&log_dir, "slatecast.log");
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

                // Keep the guard alive by leaking it (acceptable for long-running process)
                Box::leak(Box::new(guard));

                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false) // No color codes in file
                        .with_target(true),
                )
            }
            Err(e) => {
                eprintln!(
                    "Warning: Could not write to log directory {} ({}), file logging disabled",
                    log_dir, e
                );
                None
            }
        }
    } else {
        eprintln!(
            "Warning: Could not create log directory {}, file logging disabled",
            log_dir
        );
        None
    };

    let file_logging_enabled = file_layer.is_some();
    let base = tracing_subscriber::registry().with(filter).with(file_layer);

    if logging.json {
        base.with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        base.with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .init();
    }

    if file_logging_enabled {
        eprintln!("Logging to: {}/slatecast.log", log_dir);
    }
}

fn init_logging_simple() {
    // Minimal logging for CLI commands
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
