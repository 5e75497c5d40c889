use std::sync::Arc;

use clap::Parser;

use smartcastd::api;
use smartcastd::api::AppState;
use smartcastd::Config;

#[derive(Debug, Parser)]
#[command(name = "smartcastd", about = "HTTP control surface for SmartCast TVs")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    listen: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(parse_log_level(&args.log_level))
        .init();

    let config = Config::from_env()?;

    tracing::info!("smartcastd starting");
    match &config.tv_ip {
        Some(ip) => tracing::info!("TV address: {}:{}", ip, config.tv_port),
        None => tracing::warn!("VIZIO_IP not set; device operations will fail until it is"),
    }
    tracing::info!("Auth token set: {}", config.auth_token_set());

    let state = Arc::new(AppState::new(config));

    // Warm up the device connection; failure is logged, not fatal, so the
    // API can still report health and pairing guidance.
    if let Err(err) = state.tv.get(&state.config).await {
        tracing::error!("Failed to initialize TV connection: {err}");
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received shutdown signal"),
            Err(err) => tracing::error!("Failed to listen for shutdown signal: {err}"),
        }
        shutdown_tx.send(()).ok();
    });

    api::serve(args.listen, args.port, state, shutdown_rx).await?;

    tracing::info!("smartcastd shutdown complete");
    Ok(())
}

fn parse_log_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to INFO", level);
            tracing::Level::INFO
        }
    }
}
