//! Selfplay command - engine vs engine from the empty board
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_match(), report_results()
//! - Level 3: play_single_game(), compute_statistics()
//! - Level 4: formatting utilities

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use hive_core::{BestResponseAI, Board, GameConfig, GameResult, Move, SearchConfig};

use crate::analyze::{load_config, load_weights};
use crate::record::GameRecorder;

/// Name the engine signs its records with
const ENGINE_NAME: &str = "best-response";

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SelfplayArgs {
    /// Number of games to play
    #[arg(long, default_value = "1")]
    pub games: usize,

    /// Search generations per move
    #[arg(long, default_value = "3")]
    pub depth: u32,

    /// Stop each search after this many milliseconds
    #[arg(long)]
    pub time_limit_ms: Option<u64>,

    /// Random plies played before the engine takes over
    #[arg(long, default_value = "0")]
    pub random_opening: usize,

    /// Maximum plies per game
    #[arg(long, default_value = "100")]
    pub max_plies: usize,

    /// Evaluator weights JSON file (built-in table when omitted)
    #[arg(long, value_name = "FILE")]
    pub weights: Option<PathBuf>,

    /// Game options JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory to save one record per game
    #[arg(long, value_name = "DIR")]
    pub record_dir: Option<PathBuf>,

    /// Time control written into records
    #[arg(long, default_value = "untimed")]
    pub time_control: String,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameSummary {
    game_number: usize,
    result: GameResult,
    plies: usize,
    moves: Vec<Move>,
}

/// Aggregated results
#[derive(Clone, Debug)]
struct MatchResults {
    games: Vec<GameSummary>,
    white_wins: usize,
    black_wins: usize,
    draws: usize,
    unfinished: usize,
    avg_plies: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run selfplay command
///
/// 1. Load options and weights, build the engine
/// 2. Play the games
/// 3. Report results
pub fn run(args: SelfplayArgs, seed: Option<u64>) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let weights = load_weights(args.weights.as_deref())?;

    let mut search = SearchConfig::with_depth(args.depth);
    if let Some(ms) = args.time_limit_ms {
        search = search.with_time_limit(Duration::from_millis(ms));
    }
    let ai = BestResponseAI::new(search, weights);

    if let Some(dir) = &args.record_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create record directory: {}", dir.display()))?;
    }

    tracing::info!(
        "Starting selfplay: {} games, depth={}, random opening={} plies",
        args.games,
        args.depth,
        args.random_opening
    );

    let results = play_match(&ai, config, &args, seed)?;

    report_results(&results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play all games
fn play_match(
    ai: &BestResponseAI,
    config: GameConfig,
    args: &SelfplayArgs,
    seed: Option<u64>,
) -> Result<MatchResults> {
    let mut rng = create_rng(seed);
    let mut games = Vec::with_capacity(args.games);

    let pb = ProgressBar::new(args.games as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} games ({eta})")?
            .progress_chars("=>-"),
    );

    for game_num in 0..args.games {
        let summary = play_single_game(ai, config, game_num + 1, args, &mut rng)?;

        pb.suspend(|| {
            tracing::info!(
                "Game {}: {} ({} plies)",
                summary.game_number,
                summary.result,
                summary.plies
            )
        });
        pb.inc(1);

        games.push(summary);
    }
    pb.finish_with_message("selfplay complete");

    Ok(compute_match_statistics(games))
}

/// Report results
fn report_results(results: &MatchResults, args: &SelfplayArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one game, recording every position when asked to
fn play_single_game(
    ai: &BestResponseAI,
    config: GameConfig,
    game_number: usize,
    args: &SelfplayArgs,
    rng: &mut ChaCha8Rng,
) -> Result<GameSummary> {
    let mut board = Board::new(config);
    let mut moves = Vec::new();
    let mut recorder = args
        .record_dir
        .as_ref()
        .map(|_| GameRecorder::start(ENGINE_NAME, ENGINE_NAME, &args.time_control));

    if let Some(rec) = recorder.as_mut() {
        rec.log_position(board.snapshot());
    }

    while board.result() == GameResult::Ongoing && moves.len() < args.max_plies {
        let choice = if moves.len() < args.random_opening {
            board.legal_moves().choose(rng).copied()
        } else {
            ai.best_move(&board).context("Search failed")?
        };

        let Some(mv) = choice else {
            tracing::warn!(
                "Game {}: {} cannot move, stopping undecided after {} plies",
                game_number,
                board.player_on_turn(),
                moves.len()
            );
            break;
        };

        board
            .apply(mv)
            .with_context(|| format!("Illegal move in game {}: {}", game_number, mv))?;
        moves.push(mv);

        if let Some(rec) = recorder.as_mut() {
            rec.log_position(board.snapshot());
        }
    }

    let result = board.result();
    if let (Some(rec), Some(dir)) = (recorder.as_mut(), &args.record_dir) {
        rec.log_result(result);
        let path = rec.save(dir)?;
        tracing::debug!("Saved game {} to {}", game_number, path.display());
    }

    Ok(GameSummary {
        game_number,
        result,
        plies: moves.len(),
        moves,
    })
}

/// Compute aggregate statistics from game summaries
fn compute_match_statistics(games: Vec<GameSummary>) -> MatchResults {
    let count = |r: GameResult| games.iter().filter(|g| g.result == r).count();
    let white_wins = count(GameResult::WhiteWins);
    let black_wins = count(GameResult::BlackWins);
    let draws = count(GameResult::Draw);
    let unfinished = count(GameResult::Ongoing);

    let total_plies: usize = games.iter().map(|g| g.plies).sum();
    let avg_plies = if games.is_empty() {
        0.0
    } else {
        total_plies as f32 / games.len() as f32
    };

    MatchResults {
        games,
        white_wins,
        black_wins,
        draws,
        unfinished,
        avg_plies,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Print results as JSON
fn print_json_results(results: &MatchResults) {
    #[derive(serde::Serialize)]
    struct JsonGame<'a> {
        game_number: usize,
        result: String,
        plies: usize,
        moves: &'a [Move],
    }

    #[derive(serde::Serialize)]
    struct JsonOutput<'a> {
        total_games: usize,
        white_wins: usize,
        black_wins: usize,
        draws: usize,
        unfinished: usize,
        avg_plies: f32,
        games: Vec<JsonGame<'a>>,
    }

    let output = JsonOutput {
        total_games: results.games.len(),
        white_wins: results.white_wins,
        black_wins: results.black_wins,
        draws: results.draws,
        unfinished: results.unfinished,
        avg_plies: results.avg_plies,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                result: g.result.to_string(),
                plies: g.plies,
                moves: &g.moves,
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text
fn print_text_results(results: &MatchResults) {
    let total = results.games.len();

    println!("\n=== Selfplay Results ===");
    println!("Total games: {}", total);
    println!("White wins:  {} ({:.1}%)", results.white_wins, percent(results.white_wins, total));
    println!("Black wins:  {} ({:.1}%)", results.black_wins, percent(results.black_wins, total));
    println!("Draws:       {} ({:.1}%)", results.draws, percent(results.draws, total));
    println!("Unfinished:  {} ({:.1}%)", results.unfinished, percent(results.unfinished, total));
    println!("Avg plies:   {:.1}", results.avg_plies);
}

fn percent(count: usize, total: usize) -> f32 {
    if total == 0 {
        0.0
    } else {
        100.0 * count as f32 / total as f32
    }
}
