//! Hex grid geometry on an unbounded, doubled-row axial layout
//!
//! Neighbor offsets, as drawn around the origin:
//!
//! ```text
//!                 (0, 2)
//!       (-1, 1)           (1, 1)
//!                 (0, 0)
//!       (-1,-1)           (1,-1)
//!                 (0,-2)
//! ```
//!
//! Everything here is a pure function of a set of occupied hexes. Stacking is
//! invisible at this level: a hex is either occupied or open.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::ops::{Add, Sub};

/// Set of hexes (occupied locations, movement targets)
pub type HexSet = FxHashSet<Hex>;

/// Hex coordinate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

/// Black's first piece always lands here
pub const ORIGIN: Hex = Hex::new(0, 0);

/// Direction vectors (dq, dr), clockwise from north
pub const DIRECTIONS: [(i32, i32); 6] = [
    (0, 2),   // N
    (1, 1),   // NE
    (1, -1),  // SE
    (0, -2),  // S
    (-1, -1), // SW
    (-1, 1),  // NW
];

impl Hex {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Get neighbor in direction (0-5)
    pub fn neighbor(&self, direction: usize) -> Hex {
        let (dq, dr) = DIRECTIONS[direction % 6];
        Hex::new(self.q + dq, self.r + dr)
    }

    /// The six surrounding hexes
    pub fn neighbors(&self) -> [Hex; 6] {
        std::array::from_fn(|dir| self.neighbor(dir))
    }

    pub fn is_adjacent(&self, other: Hex) -> bool {
        let d = other - *self;
        DIRECTIONS.contains(&(d.q, d.r))
    }

    /// Occupied hexes around this one
    pub fn occupied_neighbors(&self, occupied: &HexSet) -> HexSet {
        self.neighbors()
            .into_iter()
            .filter(|h| occupied.contains(h))
            .collect()
    }
}

impl Add for Hex {
    type Output = Hex;

    fn add(self, rhs: Hex) -> Hex {
        Hex::new(self.q + rhs.q, self.r + rhs.r)
    }
}

impl Sub for Hex {
    type Output = Hex;

    fn sub(self, rhs: Hex) -> Hex {
        Hex::new(self.q - rhs.q, self.r - rhs.r)
    }
}

impl From<(i32, i32)> for Hex {
    fn from((q, r): (i32, i32)) -> Self {
        Hex::new(q, r)
    }
}

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// Hexes in ascending (q, r) order
pub fn sorted(hexes: impl IntoIterator<Item = Hex>) -> Vec<Hex> {
    let mut v: Vec<Hex> = hexes.into_iter().collect();
    v.sort_unstable();
    v
}

// ============================================================================
// SLIDING
// ============================================================================

/// A slide between two adjacent hexes is blocked when both share exactly two
/// occupied neighbors: the gate is too narrow to pass without lifting the piece.
///
/// Only meaningful for adjacent `start`/`end`.
pub fn is_slide_locked(start: Hex, end: Hex, occupied: &HexSet) -> bool {
    let start_neighbors = start.occupied_neighbors(occupied);
    end.neighbors()
        .iter()
        .filter(|h| start_neighbors.contains(h))
        .count()
        == 2
}

/// Open neighbors of `start` a piece can slide into in one step.
///
/// The target must not be gated, must touch some occupied hex other than
/// `start`, and must share an occupied neighbor with `start` so the piece
/// keeps contact with the hive while sliding.
pub fn slidable_moves(start: Hex, occupied: &HexSet) -> HexSet {
    let start_neighbors = start.occupied_neighbors(occupied);

    start
        .neighbors()
        .into_iter()
        .filter(|h| !occupied.contains(h))
        .filter(|&h| !is_slide_locked(start, h, occupied))
        .filter(|h| {
            let target_neighbors = h.occupied_neighbors(occupied);
            target_neighbors.iter().any(|n| *n != start)
                && target_neighbors.iter().any(|n| start_neighbors.contains(n))
        })
        .collect()
}

/// Breadth-first closure of single slides from `start`, with `start` lifted
/// off the board first.
///
/// With `exactly_three_steps` only the third ring of the expansion is
/// returned (the Spider); otherwise everything reachable except `start`
/// (the Ant).
pub fn all_slidable_moves(start: Hex, occupied: &HexSet, exactly_three_steps: bool) -> HexSet {
    let mut lifted = occupied.clone();
    lifted.remove(&start);

    let mut frontier = slidable_moves(start, &lifted);
    let mut reached = frontier.clone();
    let mut expansions = 0;

    while !frontier.is_empty() {
        expansions += 1;

        let mut next = HexSet::default();
        for hex in &frontier {
            next.extend(slidable_moves(*hex, &lifted));
        }
        next.retain(|h| !reached.contains(h));
        reached.extend(next.iter().copied());
        frontier = next;

        if exactly_three_steps && expansions == 2 {
            return frontier;
        }
    }

    if exactly_three_steps {
        return HexSet::default();
    }

    reached.remove(&start);
    reached
}

// ============================================================================
// CONNECTIVITY
// ============================================================================

/// True when every occupied hex belongs to a single connected cluster.
///
/// Does not modify `occupied`. An empty set counts as intact.
pub fn is_hive_intact(occupied: &HexSet) -> bool {
    let start = match occupied.iter().next() {
        Some(h) => *h,
        None => return true,
    };

    let mut visited = HexSet::default();
    visited.insert(start);
    let mut queue = VecDeque::from([start]);

    while let Some(hex) = queue.pop_front() {
        for n in hex.neighbors() {
            if occupied.contains(&n) && visited.insert(n) {
                queue.push_back(n);
            }
        }
    }

    visited.len() == occupied.len()
}
