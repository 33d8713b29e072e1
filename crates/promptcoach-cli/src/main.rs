//! `prompt-coach`: score a prompt and print an improved rewrite.

use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use promptcoach_runtime::{CoachConfig, PromptCoach};

mod render;
mod serve;

use render::OutputMode;

#[derive(Parser, Debug)]
#[command(name = "prompt-coach", version, about = "Prompt Coach (AI Prompt Optimizer)")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Read prompt from file (otherwise stdin)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Print improved prompt only
    #[arg(long)]
    print_improved: bool,

    /// Show unified diff between original and improved
    #[arg(long)]
    show_diff: bool,

    /// Path to write improved prompt
    #[arg(short, long)]
    write: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the scoring API over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8088")]
        addr: SocketAddr,
    },
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn level_for(verbose: u8, base: &'static str) -> &'static str {
    match (verbose, base) {
        (0, base) => base,
        (1, "warn") => "info",
        _ => "debug",
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = CoachConfig::from_env();

    match cli.command {
        Some(Command::Serve { addr }) => {
            init_tracing(level_for(cli.verbose, "info"));
            serve::run(addr, config).await
        }
        None => {
            init_tracing(level_for(cli.verbose, "warn"));
            run_once(&cli, &config?).await
        }
    }
}

async fn run_once(cli: &Cli, config: &CoachConfig) -> anyhow::Result<()> {
    let raw = match &cli.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read prompt from {}", path.display()))?,
        None => io::read_to_string(io::stdin()).context("failed to read prompt from stdin")?,
    };

    let coach = PromptCoach::from_config(config)?;
    let result = coach.evaluate(&raw).await?;

    let mode = OutputMode::from_flags(cli.print_improved, cli.show_diff);
    if mode == OutputMode::Json {
        if let Some(path) = &cli.write {
            write_improved(path, &result.improved)?;
        }
    }

    println!("{}", render::render(&result, mode)?);
    Ok(())
}

/// Write the rewrite to `path`, creating parent directories.
fn write_improved(path: &Path, improved: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, improved).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote improved prompt");
    Ok(())
}
