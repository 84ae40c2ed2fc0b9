// Main entrypoint for the bid router.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use bidrouter::app::App;
use bidrouter::config::{Config, ConfigTrait};
use bidrouter::controller::metrics::init_prometheus_exporter;
use bidrouter::lifecycle::ValidationMode;
use bidrouter::shutdown::GracefulShutdown;
use bidrouter::{liveness, time};

const CONFIG_PATH: &str = "cfg/bidrouter.cfg.yaml";
const CONFIG_PATH_LOCAL: &str = "cfg/bidrouter.cfg.local.yaml";

/// Bid router with adaptive trace sampling
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, value_name = "FILE")]
    cfg: Option<PathBuf>,

    /// Validate the configuration (warnings included) and exit
    #[arg(long)]
    check_config: bool,
}

/// Number of runtime worker threads, `0` in the config means all cores.
fn worker_threads(cfg: &Config) -> usize {
    match cfg.runtime().num_cpus {
        0 => num_cpus::get(),
        n => n,
    }
}

/// Loads the configuration struct from YAML file.
/// Tries local config first, then falls back to default config.
fn load_cfg(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    if let Some(custom_path) = path {
        let cfg = Config::load(&custom_path)
            .with_context(|| format!("failed to load custom config from {:?}", custom_path))?;
        return Ok((cfg, custom_path));
    }

    match Config::load(CONFIG_PATH_LOCAL) {
        Ok(cfg) => Ok((cfg, PathBuf::from(CONFIG_PATH_LOCAL))),
        Err(_) => {
            let cfg = Config::load(CONFIG_PATH)
                .with_context(|| format!("failed to load config from {}", CONFIG_PATH))?;
            Ok((cfg, PathBuf::from(CONFIG_PATH)))
        }
    }
}

/// Configures structured logging based on configuration.
fn configure_logger(cfg: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let default_level = if cfg.router.debug { "debug" } else { "info" };
    let log_level = cfg
        .logs()
        .and_then(|logs| logs.level.as_deref())
        .unwrap_or(default_level);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if cfg.is_prod() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty())
            .init();
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let (cfg, path) = match load_cfg(args.cfg) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    configure_logger(&cfg);
    info!(
        component = "config",
        event = "load_success",
        path = ?path,
        "config loaded"
    );

    // The recorder needs no runtime, install it before one exists.
    if let Err(e) = init_prometheus_exporter() {
        warn!(
            component = "main",
            event = "metrics_disabled",
            error = %e,
            "metrics endpoint will not be available"
        );
    }

    let threads = worker_threads(&cfg);
    info!(
        component = "main",
        event = "num_cpus_configured",
        num_cpus = threads,
        "runtime worker threads configured"
    );

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(threads)
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(component = "main", event = "runtime_failed", error = %e, "failed to create tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(async_main(cfg, args.check_config))
}

async fn async_main(cfg: Config, check_only: bool) -> ExitCode {
    let shutdown_token = CancellationToken::new();

    // Cached clock for the sampling windows.
    let clock_token = time::start(Duration::from_millis(100));

    let probe_timeout = cfg
        .k8s()
        .and_then(|k8s| k8s.probe.timeout)
        .unwrap_or(Duration::from_secs(5));
    let probe = Arc::new(liveness::Probe::new(probe_timeout));

    let app = App::new(shutdown_token.clone(), cfg, probe);

    let mode = if check_only {
        ValidationMode::ValidateAll
    } else {
        ValidationMode::ValidateErrorsOnly
    };

    let code = match app.validate(mode).await {
        Ok(true) if check_only => {
            info!(component = "main", event = "config_ok", "configuration is valid");
            ExitCode::SUCCESS
        }
        Ok(true) => run(&app, shutdown_token).await,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(component = "main", event = "validate_failed", error = %e, "validation failed");
            ExitCode::FAILURE
        }
    };

    clock_token.cancel();
    code
}

async fn run(app: &App, shutdown_token: CancellationToken) -> ExitCode {
    if let Err(e) = app.start().await {
        error!(
            component = "main",
            scope = "app",
            event = "start_failed",
            error = %e,
            "failed to start router"
        );
        // Stops whatever did start.
        if let Err(e) = app.close().await {
            error!(component = "main", event = "shutdown_failed", error = %e, "shutdown after failed start");
        }
        return ExitCode::FAILURE;
    }

    app.serve().await;

    GracefulShutdown::new(shutdown_token).await_signal().await;

    match app.close().await {
        Ok(()) => {
            info!(
                component = "main",
                event = "shutdown_success",
                "router was gracefully shut down"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(
                component = "main",
                event = "graceful_shutdown_failed",
                error = %e,
                "failed to gracefully shut down router"
            );
            ExitCode::FAILURE
        }
    }
}
