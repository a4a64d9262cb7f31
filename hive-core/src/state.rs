//! Move requests and the serializable board snapshot exchanged with callers

use crate::hex::{Hex, HexSet};
use crate::pieces::{Color, PieceKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// A request that advances the game by one ply (or restarts it)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Move {
    Placement { color: Color, kind: PieceKind, to: Hex },
    Movement { from: Hex, to: Hex },
    Reset,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Placement { color, kind, to } => write!(f, "place {color} {kind} at {to}"),
            Move::Movement { from, to } => write!(f, "move {from} -> {to}"),
            Move::Reset => write!(f, "reset"),
        }
    }
}

/// Game result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    BlackWins,
    WhiteWins,
    /// Both queens surrounded by the same move
    Draw,
}

impl GameResult {
    pub fn from_wins(wins: &ByColor<bool>) -> Self {
        match (wins.black, wins.white) {
            (false, false) => GameResult::Ongoing,
            (true, false) => GameResult::BlackWins,
            (false, true) => GameResult::WhiteWins,
            (true, true) => GameResult::Draw,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Ongoing => write!(f, "ongoing"),
            GameResult::BlackWins => write!(f, "black wins"),
            GameResult::WhiteWins => write!(f, "white wins"),
            GameResult::Draw => write!(f, "draw"),
        }
    }
}

/// One value per color
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByColor<T> {
    pub black: T,
    pub white: T,
}

impl<T> ByColor<T> {
    pub fn from_fn(mut f: impl FnMut(Color) -> T) -> Self {
        Self {
            black: f(Color::Black),
            white: f(Color::White),
        }
    }
}

impl<T> Index<Color> for ByColor<T> {
    type Output = T;

    fn index(&self, color: Color) -> &T {
        match color {
            Color::Black => &self.black,
            Color::White => &self.white,
        }
    }
}

impl<T> IndexMut<Color> for ByColor<T> {
    fn index_mut(&mut self, color: Color) -> &mut T {
        match color {
            Color::Black => &mut self.black,
            Color::White => &mut self.white,
        }
    }
}

/// One piece as seen by external callers, with its legal destinations
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceRecord {
    pub kind: PieceKind,
    pub color: Color,
    pub location: Option<Hex>,
    pub stack_depth: i32,
    /// Sorted. Empty for unplaced, buried or pinned pieces.
    pub moves: Vec<Hex>,
}

/// Full board state. Enough to rebuild a board exactly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    /// Every piece in bag order, placed or not
    pub pieces: Vec<PieceRecord>,
    pub player_turn: Color,
    /// Sorted legal placement hexes
    pub placements: ByColor<Vec<Hex>>,
    pub must_place_queen: ByColor<bool>,
    pub wins: ByColor<bool>,
    pub turns: ByColor<u32>,
}

impl BoardSnapshot {
    pub fn occupied(&self) -> HexSet {
        self.pieces.iter().filter_map(|p| p.location).collect()
    }

    pub fn result(&self) -> GameResult {
        GameResult::from_wins(&self.wins)
    }

    pub fn is_game_over(&self) -> bool {
        self.wins.black || self.wins.white
    }

    /// Topmost piece at `hex`
    pub fn top_at(&self, hex: Hex) -> Option<&PieceRecord> {
        self.pieces
            .iter()
            .find(|p| p.location == Some(hex) && p.stack_depth == 0)
    }

    pub fn queen_location(&self, color: Color) -> Option<Hex> {
        self.pieces
            .iter()
            .find(|p| p.kind == PieceKind::Queen && p.color == color)
            .and_then(|p| p.location)
    }

    /// Pieces of `color` still in hand
    pub fn unplaced(&self, color: Color) -> impl Iterator<Item = &PieceRecord> + '_ {
        self.pieces
            .iter()
            .filter(move |p| p.color == color && p.location.is_none())
    }
}
