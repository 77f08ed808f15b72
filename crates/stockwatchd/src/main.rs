// # stockwatchd - Inventory Watch Daemon
//
// This daemon is a THIN integration layer. All polling, comparison,
// logging and notification logic lives in stockwatch-core.
//
// The stockwatchd daemon is responsible for:
// 1. Reading operator controls (flags, with environment fallbacks)
// 2. Initializing tracing and the runtime
// 3. Building the inventory source, state store, log and sinks
// 4. Running the poll engine and mapping its outcome to an exit code
//
// ## Configuration
//
// Every flag can also be set through the environment:
//
// - `--region` / `STOCKWATCH_REGION`: Two-letter country code (default DE)
// - `--webhook-url` / `STOCKWATCH_WEBHOOK_URL`: Chat webhook sink
// - `--push-url` / `STOCKWATCH_PUSH_URL`: Push notification sink
// - `--role-mapping` / `STOCKWATCH_ROLE_MAPPING`: JSON file, package id → role id
// - `--log-dir` / `STOCKWATCH_LOG_DIR`: Daily CSV log directory (logging off if unset)
// - `--state-dir` / `STOCKWATCH_STATE_DIR`: Directory for per-package state files
// - `--package` / `STOCKWATCH_PACKAGE`: Only poll this package id
// - `--interval` / `STOCKWATCH_INTERVAL`: Seconds between cycles, ≤0 runs once
//
// ## Example
//
// ```bash
// export STOCKWATCH_WEBHOOK_URL=https://discord.com/api/webhooks/...
// stockwatchd --region DE --log-dir /var/log/stockwatch --interval 300
// ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use stockwatch_core::config::DEFAULT_REGION;
use stockwatch_core::notify::throttle::DEFAULT_ERROR_NOTIFY_WINDOW_SECS;
use stockwatch_core::traits::NotificationSink;
use stockwatch_core::{
    CsvAvailabilityLog, FileStateStore, Notifier, PollConfig, PollEngine, Region, RoleMapping,
    RunOutcome, SystemClock,
};
use stockwatch_inventory_steam::{STEAM_API_BASE, SteamInventory};
use stockwatch_notify_http::{DiscordWebhookSink, PushSink};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// - 0: Clean shutdown (single run finished, or signal received)
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
/// - 3: A poll cycle had failed SKUs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StockwatchExitCode {
    CleanShutdown = 0,
    ConfigError = 1,
    RuntimeError = 2,
    CycleFailed = 3,
}

impl From<StockwatchExitCode> for ExitCode {
    fn from(code: StockwatchExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Poll an inventory API and notify when availability changes
#[derive(Parser, Debug)]
#[command(name = "stockwatchd", version, about)]
struct Cli {
    /// Two-letter country code to query
    #[arg(long, env = "STOCKWATCH_REGION", default_value = DEFAULT_REGION)]
    region: String,

    /// Chat webhook URL for notifications
    #[arg(long, env = "STOCKWATCH_WEBHOOK_URL")]
    webhook_url: Option<String>,

    /// Push endpoint URL; the message is posted as the raw body
    #[arg(long, env = "STOCKWATCH_PUSH_URL")]
    push_url: Option<String>,

    /// JSON file mapping package ids to role ids to mention
    #[arg(long, env = "STOCKWATCH_ROLE_MAPPING")]
    role_mapping: Option<PathBuf>,

    /// Directory for daily CSV availability logs
    #[arg(long, env = "STOCKWATCH_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Directory holding per-package state files
    #[arg(long, env = "STOCKWATCH_STATE_DIR", default_value = ".")]
    state_dir: PathBuf,

    /// Only poll this package id
    #[arg(long, env = "STOCKWATCH_PACKAGE")]
    package: Option<String>,

    /// Seconds between poll cycles; 0 or less runs a single cycle
    #[arg(long, env = "STOCKWATCH_INTERVAL", default_value_t = 0, allow_negative_numbers = true)]
    interval: i64,

    /// Notify the sinks when an inventory check fails
    #[arg(long, env = "STOCKWATCH_NOTIFY_ERRORS")]
    notify_errors: bool,

    /// Minimum seconds between error notifications for the same condition
    #[arg(long, env = "STOCKWATCH_ERROR_NOTIFY_WINDOW", default_value_t = DEFAULT_ERROR_NOTIFY_WINDOW_SECS)]
    error_notify_window: u64,

    /// HTTP timeout in seconds for inventory and notification requests
    #[arg(long, env = "STOCKWATCH_HTTP_TIMEOUT", default_value_t = 10)]
    timeout: u64,

    /// Inventory API base URL
    #[arg(long, env = "STOCKWATCH_API_BASE", default_value = STEAM_API_BASE)]
    api_base: String,

    /// Product label used in notification text
    #[arg(long, env = "STOCKWATCH_PRODUCT", default_value = "steam deck")]
    product: String,

    /// Log level (trace, debug, info, warn, error); RUST_LOG overrides
    #[arg(long, env = "STOCKWATCH_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    /// Validate values clap cannot check on its own
    fn validate(&self) -> Result<()> {
        Region::new(&self.region)?;

        if !(1..=120).contains(&self.timeout) {
            anyhow::bail!(
                "--timeout must be between 1 and 120 seconds. Got: {}",
                self.timeout
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "Log level '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        if self.webhook_url.as_deref().is_some_and(str::is_empty)
            || self.push_url.as_deref().is_some_and(str::is_empty)
        {
            anyhow::bail!("Sink URLs cannot be empty; omit the flag to disable a sink");
        }

        Ok(())
    }

    fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    fn poll_config(&self) -> Result<PollConfig> {
        let config = PollConfig::new(Region::new(&self.region)?)
            .with_only_package(self.package.clone())
            .with_interval_secs(self.interval)
            .with_product(self.product.clone())
            .with_error_notifications(self.notify_errors, self.error_notify_window);
        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(level: &str) -> Result<()> {
    // Base level from the flag, still overridable via RUST_LOG.
    let default = format!("{level},reqwest=warn,hyper=warn");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                StockwatchExitCode::ConfigError.into()
            } else {
                StockwatchExitCode::CleanShutdown.into()
            };
        }
    };

    if let Err(e) = cli.validate() {
        eprintln!("Configuration validation error: {}", e);
        return StockwatchExitCode::ConfigError.into();
    }

    if let Err(e) = init_tracing(&cli.log_level.to_lowercase()) {
        eprintln!("{}", e);
        return StockwatchExitCode::ConfigError.into();
    }

    info!("Starting stockwatchd");

    // Polling is strictly sequential, one thread is all it needs
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return StockwatchExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        let engine = match build_engine(&cli).await {
            Ok(engine) => engine,
            Err(e) => {
                error!("Startup error: {:#}", e);
                return StockwatchExitCode::ConfigError;
            }
        };

        run_daemon(engine).await
    })
    .into()
}

/// Wire up every component from the operator controls
async fn build_engine(cli: &Cli) -> Result<PollEngine> {
    let config = cli.poll_config()?;
    info!("Country code: {}", config.region);

    let source = SteamInventory::with_base_url(cli.api_base.clone(), cli.http_timeout())
        .context("inventory source")?;

    let state_store = FileStateStore::new(&cli.state_dir)
        .await
        .context("state store")?;
    info!("State directory: {}", cli.state_dir.display());

    let mut sinks: Vec<Box<dyn NotificationSink>> = Vec::new();
    if let Some(ref url) = cli.webhook_url {
        sinks.push(Box::new(DiscordWebhookSink::new(url, cli.http_timeout())?));
        info!("Webhook sink enabled");
    }
    if let Some(ref url) = cli.push_url {
        sinks.push(Box::new(PushSink::new(url, cli.http_timeout())?));
        info!("Push sink enabled");
    }

    let roles = RoleMapping::load(cli.role_mapping.as_deref()).await;

    let mut engine = PollEngine::new(
        Box::new(source),
        Box::new(state_store),
        Notifier::new(sinks),
        config,
    )?
    .with_roles(roles);

    if let Some(ref dir) = cli.log_dir {
        info!("Logging enabled to: {}", dir.display());
        engine = engine.with_log(Box::new(CsvAvailabilityLog::new(
            dir.clone(),
            Arc::new(SystemClock),
        )));
    }

    Ok(engine)
}

/// Run the engine until it finishes or a shutdown signal arrives
async fn run_daemon(engine: PollEngine) -> StockwatchExitCode {
    tokio::select! {
        result = engine.run() => match result {
            Ok(RunOutcome::Completed { cycles }) => {
                info!("Finished after {} cycle(s)", cycles);
                StockwatchExitCode::CleanShutdown
            }
            Ok(RunOutcome::CycleFailed { cycles, failed }) => {
                warn!("Exiting after cycle {} with {} failed package(s)", cycles, failed.len());
                StockwatchExitCode::CycleFailed
            }
            Err(e) => {
                error!("Daemon error: {}", e);
                if matches!(e, stockwatch_core::Error::Log(_)) {
                    StockwatchExitCode::ConfigError
                } else {
                    StockwatchExitCode::RuntimeError
                }
            }
        },

        signal = wait_for_shutdown() => match signal {
            Ok(name) => {
                info!("Received shutdown signal: {}", name);
                StockwatchExitCode::CleanShutdown
            }
            Err(e) => {
                error!("Shutdown error: {}", e);
                StockwatchExitCode::RuntimeError
            }
        },
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
