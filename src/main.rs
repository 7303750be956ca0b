//! Mycelium - embeddable deployment micro-kernel.

mod cli;
mod register;

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mycelium_config::{ConfigError, ConfigLoader, ConfigValidator, KernelConfig};

use crate::cli::{Cli, Commands};

/// Default log directory, `~/.mycelium/logs`.
fn default_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".mycelium").join("logs"))
        .unwrap_or_else(|| PathBuf::from(".mycelium/logs"))
}

/// Initialize tracing with console and daily rolling file output.
fn init_tracing(log_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("mycelium")
        .filename_suffix("log")
        .max_log_files(14)
        .build(log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Flushes the file writer on exit.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

/// Load the config file, falling back to defaults when it does not exist.
fn load_config(path: &Path, home: Option<PathBuf>) -> Result<KernelConfig, ConfigError> {
    let mut config = match ConfigLoader::load(path) {
        Ok(config) => config,
        Err(ConfigError::NotFound(_)) => {
            warn!(path = %path.display(), "Config file not found, using defaults");
            KernelConfig::default()
        }
        Err(e) => return Err(e),
    };
    if home.is_some() {
        config.home = home;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_dir = cli.log_dir.clone().unwrap_or_else(default_log_dir);
    init_tracing(&log_dir)?;

    let config = load_config(&cli.config, cli.home.clone())?;

    match cli.command {
        None => run_kernel(config, false).await,
        Some(Commands::Run { sequential }) => run_kernel(config, sequential).await,
        Some(Commands::Validate { json }) => validate_config(&cli.config, &config, json),
    }
}

/// Boot the kernel and block until Ctrl-C.
async fn run_kernel(
    mut config: KernelConfig,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting Mycelium v{}", env!("CARGO_PKG_VERSION"));

    if sequential {
        config.parallel_deploy = false;
    }
    for warning in ConfigValidator::validate(&config)?.into_result()? {
        warn!(path = %warning.path, "{}", warning.message);
    }

    let kernel = register::build_kernel(config);
    if let Err(e) = kernel.start().await {
        error!("Kernel failed to start: {}", e);
        return Err(e.into());
    }

    if let Some(root) = kernel.root_dir() {
        info!(root = %root.display(), "Kernel running, press Ctrl-C to stop");
    }

    let mut shutdown = kernel.shutdown_signal().subscribe();
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Interrupt received");
        }
        _ = shutdown.recv() => {
            info!("Shutdown requested");
        }
    }

    kernel.shutdown().await?;
    info!("Mycelium stopped");
    Ok(())
}

/// Print validation errors and warnings; fail when any error is found.
fn validate_config(
    path: &Path,
    config: &KernelConfig,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = ConfigValidator::validate(config)?;

    if json {
        let report = serde_json::json!({
            "config": path.display().to_string(),
            "valid": result.is_valid(),
            "errors": result.errors.iter().map(|e| serde_json::json!({
                "path": e.path,
                "message": e.message,
            })).collect::<Vec<_>>(),
            "warnings": result.warnings.iter().map(|w| serde_json::json!({
                "path": w.path,
                "message": w.message,
            })).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for error in &result.errors {
            println!("error: {}: {}", error.path, error.message);
        }
        for warning in &result.warnings {
            println!("warning: {}: {}", warning.path, warning.message);
        }
        if result.is_valid() {
            println!("{}: ok", path.display());
        }
    }

    result.into_result()?;
    Ok(())
}
