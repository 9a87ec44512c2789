mod api;
mod config;
mod list;
mod server;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use diffview_core::{run, ChangeStore, DiffMode, RunReport};
use diffview_logging::{init_tracing, LogFormat};

use config::{ProjectConfig, DEFAULT_ADDR, DEFAULT_LOG_LEVEL, DEFAULT_PORT};

#[derive(Parser, Debug)]
#[command(
    name = "diffview",
    about = "Browse the changes in a git working copy or between two directories",
    version,
    author
)]
struct Cli {
    /// Directory holding the old version (compares against AFTER instead of git)
    #[arg(requires = "after")]
    before: Option<PathBuf>,

    /// Directory holding the new version
    after: Option<PathBuf>,

    /// Working directory (default: current directory)
    #[arg(short = 'd', long)]
    working_dir: Option<PathBuf>,

    /// Interface to bind the server to (default: 127.0.0.1)
    #[arg(long)]
    addr: Option<String>,

    /// Port to listen on (default: 6111)
    #[arg(short, long)]
    port: Option<u16>,

    /// Do not open a browser once the server is up
    #[arg(long)]
    no_open: bool,

    /// Print the detected changes and exit
    #[arg(long)]
    list: bool,

    /// Log output format
    #[arg(long, value_enum)]
    log_format: Option<LogFormatChoice>,

    /// Log level or filter directive (e.g. "debug", "diffview_core=trace")
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let working_dir = match &cli.working_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let config = ProjectConfig::load_layered(&working_dir)?;

    let log_level = cli
        .log_level
        .clone()
        .or_else(|| config.log_level.clone())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    let log_format = cli
        .log_format
        .map(LogFormat::from)
        .or(config.log_format)
        .unwrap_or_default();
    init_tracing(&log_level, log_format);

    let mode = diff_mode(&cli, &working_dir);
    let store = Arc::new(ChangeStore::new());

    let report = build(mode, Arc::clone(&store)).await?;
    tracing::debug!(root = %report.root.display(), "Change set ready");

    if cli.list {
        list::print_changes(&store.all());
        return Ok(());
    }

    let addr = bind_address(
        cli.addr.as_deref().or(config.addr.as_deref()).unwrap_or(DEFAULT_ADDR),
        cli.port.or(config.port).unwrap_or(DEFAULT_PORT),
    );
    let open_browser = !cli.no_open && config.open_browser.unwrap_or(true);

    server::serve(store, &addr, open_browser).await
}

fn diff_mode(cli: &Cli, working_dir: &Path) -> DiffMode {
    match (&cli.before, &cli.after) {
        (Some(before), Some(after)) => DiffMode::Directories {
            before: working_dir.join(before),
            after: working_dir.join(after),
        },
        _ => DiffMode::WorkingCopy {
            dir: working_dir.to_path_buf(),
        },
    }
}

/// Run the engine off the async runtime; it walks and reads files synchronously.
async fn build(mode: DiffMode, store: Arc<ChangeStore>) -> Result<RunReport> {
    let description = match &mode {
        DiffMode::WorkingCopy { dir } => format!("git changes in {}", dir.display()),
        DiffMode::Directories { before, after } => {
            format!("{} against {}", before.display(), after.display())
        }
    };

    tokio::task::spawn_blocking(move || run(&mode, &store))
        .await
        .context("Change detection task panicked")?
        .with_context(|| format!("Failed to compare {}", description))
}

fn bind_address(addr: &str, port: u16) -> String {
    if addr.contains(':') && !addr.starts_with('[') {
        format!("[{}]:{}", addr, port)
    } else {
        format!("{}:{}", addr, port)
    }
}
