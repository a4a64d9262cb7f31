//! Error types

use crate::hex::Hex;
use crate::pieces::{Color, PieceKind};
use std::path::PathBuf;

/// A move request the board refused. The board is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("no unplaced {color} {kind} left to place")]
    NoUnplacedPiece { color: Color, kind: PieceKind },

    #[error("no piece on top at {0}")]
    EmptySource(Hex),

    #[error("piece at {from} belongs to {owner}, but {mover} is on turn")]
    NotOwnPiece { from: Hex, owner: Color, mover: Color },

    #[error("{requested} requested a move but {on_turn} is on turn")]
    OutOfTurn { on_turn: Color, requested: Color },

    #[error("{color} cannot place at {location}")]
    IllegalPlacement { color: Color, location: Hex },

    #[error("{from} -> {to} is not a legal move")]
    IllegalDestination { from: Hex, to: Hex },

    #[error("{color} must place the queen this turn")]
    QueenRequired { color: Color },

    #[error("{0} movement is not implemented")]
    Unimplemented(PieceKind),

    #[error("game is already over")]
    GameOver,
}

/// A snapshot that does not fit the configured piece bag, or describes a
/// board legal play cannot reach
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot places more {color} {kind} pieces than the bag holds")]
    ExtraPiece { color: Color, kind: PieceKind },

    #[error("snapshot is not a reachable board: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// Unreadable or incomplete configuration. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Board state that legal play can never produce
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("hive is split into more than one cluster")]
    HiveDisconnected,

    #[error("more than one piece on top at {0}")]
    DuplicateTop(Hex),

    #[error("stack at {0} is not contiguous")]
    BrokenStack(Hex),
}
