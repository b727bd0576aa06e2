use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use memopad_api::MemoPad;
use memopad_store_sqlite::{StorePaths, DEFAULT_STORE_NAME};
use tracing_subscriber::EnvFilter;

mod commands;
mod prompter;
mod render;
mod repl;

use prompter::LinePrompter;

const DEFAULT_HOME_DIR: &str = ".memopad";

#[derive(Debug, Parser)]
#[command(name = "memopad")]
#[command(about = "Personal memo pad backed by SQLite")]
struct Cli {
    /// Directory holding the memo store and its backup. Defaults to ~/.memopad.
    #[arg(long, env = "MEMOPAD_HOME")]
    home: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_STORE_NAME)]
    db_name: String,

    /// Log filter directive, e.g. `debug` or `memopad_api=info`. Overrides RUST_LOG.
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref())?;

    let home = match cli.home {
        Some(home) => home,
        None => dirs::home_dir()
            .map(|dir| dir.join(DEFAULT_HOME_DIR))
            .ok_or_else(|| anyhow!("cannot determine the home directory; pass --home"))?,
    };
    let paths = StorePaths::new(home, &cli.db_name);
    paths.ensure_working_dir()?;
    tracing::debug!(store = %paths.store.display(), "memo pad configured");

    let pad = MemoPad::new(paths);
    let stdin = io::stdin();
    let mut prompter = LinePrompter::new(stdin.lock(), io::stdout());
    repl::run(&pad, &mut prompter)
}

fn init_tracing(directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log level `{directive}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}
