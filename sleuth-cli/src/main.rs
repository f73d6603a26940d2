//! Sleuth CLI — research a topic from the terminal or serve the web page.

mod commands;

use clap::Parser;
use sleuth_core::config::{
    DEFAULT_SECRETS_FILE, Secrets, SleuthConfig, load_config, load_secrets,
};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Sleuth: turn a research topic into a report
#[derive(Parser, Debug)]
#[command(name = "sleuth", version, about, long_about = None)]
struct Cli {
    /// Secrets file (KEY=VALUE per line)
    #[arg(short, long, default_value = DEFAULT_SECRETS_FILE)]
    secrets: PathBuf,

    /// Settings file (defaults to ./sleuth.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: commands::Commands,
}

/// Install the stderr and JSON file layers. The guard flushes the file
/// writer on drop and must outlive the program's work.
fn init_tracing(verbose: u8, quiet: bool) -> tracing_appender::non_blocking::WorkerGuard {
    let filter = match verbose {
        0 if quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let stderr_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(stderr_filter);

    let log_dir = directories::ProjectDirs::from("dev", "sleuth", "sleuth")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "sleuth.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();
    guard
}

/// Load secrets, export them, then load settings.
///
/// Settings are read after the export so that `SLEUTH_*` overrides kept in
/// the secrets file apply. Commands that need no credentials skip the
/// secrets file entirely.
///
/// # Safety
///
/// Writes the process environment. Call before any other thread exists.
unsafe fn load_startup(cli: &Cli) -> anyhow::Result<(SleuthConfig, Secrets)> {
    let secrets = if cli.command.needs_secrets() {
        let secrets = load_secrets(&cli.secrets)
            .map_err(|e| anyhow::anyhow!("Secrets error: {}", e))?;
        // SAFETY: upheld by the caller.
        unsafe { secrets.export_to_env() };
        secrets
    } else {
        Secrets::default()
    };

    let config = load_config(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    Ok((config, secrets))
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // SAFETY: still single-threaded; the log writer and the async runtime
    // are started below.
    let (config, secrets) = unsafe { load_startup(&cli)? };

    let _guard = init_tracing(cli.verbose, cli.quiet);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(commands::handle_command(cli.command, config, secrets))
}
