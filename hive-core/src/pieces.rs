//! Piece kinds, colors, and per-kind movement rules

use crate::hex::{all_slidable_moves, is_hive_intact, slidable_moves, Hex, HexSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Player color. Black always moves first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub const BOTH: [Color; 2] = [Color::Black, Color::White];

    pub fn opponent(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

/// Piece kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Queen,
    Ant,
    Spider,
    Beetle,
    Grasshopper,
    // Expansion pieces: in the bag when enabled, but no movement rules yet
    Mosquito,
    Ladybug,
    Mealworm,
}

/// Per-color piece counts for a standard game, in bag order
pub const STANDARD_BAG: [(PieceKind, usize); 5] = [
    (PieceKind::Queen, 1),
    (PieceKind::Ant, 3),
    (PieceKind::Spider, 2),
    (PieceKind::Beetle, 2),
    (PieceKind::Grasshopper, 3),
];

impl PieceKind {
    pub const ALL: [PieceKind; 8] = [
        PieceKind::Queen,
        PieceKind::Ant,
        PieceKind::Spider,
        PieceKind::Beetle,
        PieceKind::Grasshopper,
        PieceKind::Mosquito,
        PieceKind::Ladybug,
        PieceKind::Mealworm,
    ];

    /// Whether this kind has movement rules. Reserved kinds never appear in
    /// move enumeration.
    pub fn is_implemented(self) -> bool {
        !matches!(
            self,
            PieceKind::Mosquito | PieceKind::Ladybug | PieceKind::Mealworm
        )
    }

    /// Sliding pieces are stuck when every open neighbor is gated.
    /// Beetles and jumpers lift over gates instead.
    pub fn obeys_slide_rule(self) -> bool {
        !matches!(
            self,
            PieceKind::Beetle | PieceKind::Grasshopper | PieceKind::Ladybug
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            PieceKind::Queen => "queen",
            PieceKind::Ant => "ant",
            PieceKind::Spider => "spider",
            PieceKind::Beetle => "beetle",
            PieceKind::Grasshopper => "grasshopper",
            PieceKind::Mosquito => "mosquito",
            PieceKind::Ladybug => "ladybug",
            PieceKind::Mealworm => "mealworm",
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A game piece. Allocated once per game; only its position mutates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    /// None while the piece is still in hand
    pub location: Option<Hex>,
    /// 0 on top of its stack, -1 under one piece, and so on
    pub stack_depth: i32,
    /// Set while the piece sits on top of at least one other piece
    pub on_top_of_hive: bool,
}

impl Piece {
    pub fn new(kind: PieceKind, color: Color) -> Self {
        Self {
            kind,
            color,
            location: None,
            stack_depth: 0,
            on_top_of_hive: false,
        }
    }

    pub fn is_placed(&self) -> bool {
        self.location.is_some()
    }

    pub fn is_buried(&self) -> bool {
        self.stack_depth < 0
    }

    /// Whether this piece is on top of the stack at `hex`
    pub fn is_top_at(&self, hex: Hex) -> bool {
        self.location == Some(hex) && self.stack_depth == 0
    }

    /// All six neighbors occupied. Unplaced pieces are never surrounded.
    pub fn is_surrounded(&self, occupied: &HexSet) -> bool {
        match self.location {
            Some(loc) => loc.neighbors().iter().all(|h| occupied.contains(h)),
            None => false,
        }
    }

    /// Eligibility to move at all, checked before any per-kind generation.
    ///
    /// Buried pieces are pinned, sliding pieces with no open slide are
    /// pinned, and no piece may leave if its absence splits the hive.
    pub fn can_move(&self, occupied: &HexSet) -> bool {
        let location = match self.location {
            Some(loc) => loc,
            None => return false,
        };

        if !self.kind.is_implemented() || self.is_buried() {
            return false;
        }

        if self.kind.obeys_slide_rule() && slidable_moves(location, occupied).is_empty() {
            return false;
        }

        let mut remaining = occupied.clone();
        remaining.remove(&location);
        is_hive_intact(&remaining)
    }

    /// Hexes this piece may move to, given the occupied set.
    pub fn movement_locations(&self, occupied: &HexSet) -> HexSet {
        let location = match self.location {
            Some(loc) => loc,
            None => return HexSet::default(),
        };

        // A beetle up on the hive can step down anywhere
        if self.kind == PieceKind::Beetle && self.on_top_of_hive && !self.is_buried() {
            return location.neighbors().into_iter().collect();
        }

        if !self.can_move(occupied) {
            return HexSet::default();
        }

        match self.kind {
            PieceKind::Queen => slidable_moves(location, occupied),
            PieceKind::Ant => all_slidable_moves(location, occupied, false),
            PieceKind::Spider => all_slidable_moves(location, occupied, true),
            PieceKind::Beetle => {
                let mut moves = slidable_moves(location, occupied);
                moves.extend(location.occupied_neighbors(occupied));
                moves
            }
            PieceKind::Grasshopper => grasshopper_hops(location, occupied),
            PieceKind::Mosquito | PieceKind::Ladybug | PieceKind::Mealworm => HexSet::default(),
        }
    }

    /// Another piece climbed on top
    pub fn cover(&mut self) {
        self.stack_depth -= 1;
    }

    /// The piece above climbed off
    pub fn uncover(&mut self) {
        self.stack_depth += 1;
    }
}

/// One landing hex per occupied direction: the first open hex past the line
/// of pieces in that direction.
fn grasshopper_hops(location: Hex, occupied: &HexSet) -> HexSet {
    let mut hops = HexSet::default();

    for neighbor in location.occupied_neighbors(occupied) {
        let step = neighbor - location;
        let mut landing = neighbor;
        while occupied.contains(&landing) {
            landing = landing + step;
        }
        hops.insert(landing);
    }

    hops
}
