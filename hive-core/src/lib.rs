//! Hive Core - Rules engine and AI
//!
//! This crate provides the core game logic for Hive:
//! - Hex geometry (sliding, gates, hive connectivity)
//! - Piece kinds, movement rules and stacking
//! - Board model, snapshots and move requests
//! - Legal move enumeration
//! - Position evaluation with a typed weight table
//! - Best-response tree search

pub mod hex;
pub mod pieces;
pub mod board;
pub mod state;
pub mod movegen;
pub mod eval;
pub mod search;
pub mod config;
pub mod error;

// Re-exports for convenient access
pub use hex::{Hex, HexSet, DIRECTIONS, ORIGIN};
pub use pieces::{Color, Piece, PieceKind, STANDARD_BAG};
pub use board::Board;
pub use state::{BoardSnapshot, ByColor, GameResult, Move, PieceRecord};
pub use movegen::legal_moves;
pub use eval::{evaluate, EvalWeights, KindWeights};
pub use search::{BestResponseAI, SearchConfig, SearchResult};
pub use config::{Expansions, GameConfig};
pub use error::{ConfigError, InvariantViolation, MoveError, SnapshotError};
