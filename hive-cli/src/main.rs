//! Hive CLI - Command-line interface
//!
//! Commands:
//! - moves: List legal moves for a position
//! - eval: Score a position
//! - best: Search a position for the best move
//! - selfplay: Play engine-vs-engine games

mod analyze;
mod record;
mod selfplay;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hive")]
#[command(about = "Hive rules engine and best-response AI")]
struct Cli {
    /// Random seed for reproducibility
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List legal moves for the player on turn
    Moves(analyze::MovesArgs),
    /// Evaluate a position (positive favors White)
    Eval(analyze::EvalArgs),
    /// Search for the best move
    Best(analyze::BestArgs),
    /// Play engine-vs-engine games
    Selfplay(selfplay::SelfplayArgs),
}

/// Position and rule options shared by every command
#[derive(Args, Clone, Debug, Default)]
pub struct PositionArgs {
    /// Board snapshot JSON file (empty board when omitted)
    #[arg(long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Game options JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Moves(args) => analyze::run_moves(args),
        Commands::Eval(args) => analyze::run_eval(args),
        Commands::Best(args) => analyze::run_best(args),
        Commands::Selfplay(args) => selfplay::run(args, cli.seed),
    }
}
