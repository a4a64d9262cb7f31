//! Board model: the piece bag, turn counters, placement and movement rules

use crate::config::GameConfig;
use crate::error::{InvariantViolation, MoveError, SnapshotError};
use crate::hex::{is_hive_intact, sorted, Hex, HexSet, ORIGIN};
use crate::movegen;
use crate::pieces::{Color, Piece, PieceKind};
use crate::state::{BoardSnapshot, ByColor, GameResult, Move, PieceRecord};
use rustc_hash::FxHashMap;

/// Personal turn count at which an unplaced queen becomes mandatory
const QUEEN_DEADLINE_TURNS: u32 = 3;

/// Game board (clone to fork)
#[derive(Clone, Debug)]
pub struct Board {
    /// Every piece of both colors in bag order, placed or not
    pieces: Vec<Piece>,
    turns: ByColor<u32>,
    config: GameConfig,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl Board {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Empty board with a full bag for both colors
    pub fn new(config: GameConfig) -> Self {
        Self {
            pieces: fill_bag(&config),
            turns: ByColor::default(),
            config,
        }
    }

    /// Rebuild a board from a snapshot.
    ///
    /// Pieces are matched to bag slots in order, so a snapshot taken from a
    /// board with the same config restores piece-for-piece. `on_top_of_hive`
    /// is rederived from the stack depths. A snapshot legal play could not
    /// reach (split hive, two pieces on top of one hex, gapped stack) is
    /// refused.
    pub fn from_snapshot(snapshot: &BoardSnapshot, config: GameConfig) -> Result<Self, SnapshotError> {
        let mut board = Board::new(config);
        let mut used = vec![false; board.pieces.len()];

        for record in &snapshot.pieces {
            let slot = board
                .pieces
                .iter()
                .enumerate()
                .position(|(i, p)| !used[i] && p.kind == record.kind && p.color == record.color)
                .ok_or(SnapshotError::ExtraPiece {
                    color: record.color,
                    kind: record.kind,
                })?;
            used[slot] = true;

            let piece = &mut board.pieces[slot];
            piece.location = record.location;
            piece.stack_depth = if record.location.is_some() {
                record.stack_depth
            } else {
                0
            };
        }

        // Anything with a piece beneath it sits on top of the hive
        let resting: Vec<bool> = board
            .pieces
            .iter()
            .map(|p| {
                p.location.is_some()
                    && board
                        .pieces
                        .iter()
                        .any(|q| q.location == p.location && q.stack_depth < p.stack_depth)
            })
            .collect();
        for (piece, on_top) in board.pieces.iter_mut().zip(resting) {
            piece.on_top_of_hive = on_top;
        }

        board.turns = snapshot.turns;
        board.check_invariants()?;
        Ok(board)
    }

    /// Put every piece back in hand and zero the turn counters
    pub fn reset(&mut self) {
        *self = Board::new(self.config);
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn turns(&self, color: Color) -> u32 {
        self.turns[color]
    }

    /// Black when the counters are level, so Black always opens
    pub fn player_on_turn(&self) -> Color {
        if self.turns.white >= self.turns.black {
            Color::Black
        } else {
            Color::White
        }
    }

    /// Every hex holding at least one piece
    pub fn occupied(&self) -> HexSet {
        self.pieces.iter().filter_map(|p| p.location).collect()
    }

    fn top_index(&self, hex: Hex) -> Option<usize> {
        self.pieces.iter().position(|p| p.is_top_at(hex))
    }

    /// Topmost piece at `hex`
    pub fn top_piece(&self, hex: Hex) -> Option<&Piece> {
        self.top_index(hex).map(|i| &self.pieces[i])
    }

    pub fn queen_location(&self, color: Color) -> Option<Hex> {
        self.pieces
            .iter()
            .find(|p| p.kind == PieceKind::Queen && p.color == color)
            .and_then(|p| p.location)
    }

    pub fn is_queen_placed(&self, color: Color) -> bool {
        self.queen_location(color).is_some()
    }

    pub fn unplaced_count(&self, color: Color, kind: PieceKind) -> usize {
        self.pieces
            .iter()
            .filter(|p| p.color == color && p.kind == kind && !p.is_placed())
            .count()
    }

    // ========================================================================
    // RULES
    // ========================================================================

    /// The queen is due: three personal turns played without it.
    /// Never due in sandbox mode.
    pub fn must_place_queen(&self, color: Color) -> bool {
        !self.config.sandbox_mode
            && self.turns[color] >= QUEEN_DEADLINE_TURNS
            && !self.is_queen_placed(color)
    }

    /// `color` has surrounded the opposing queen
    pub fn wins(&self, color: Color) -> bool {
        let occupied = self.occupied();
        self.pieces
            .iter()
            .find(|p| p.kind == PieceKind::Queen && p.color == color.opponent())
            .map_or(false, |queen| queen.is_surrounded(&occupied))
    }

    pub fn result(&self) -> GameResult {
        GameResult::from_wins(&ByColor::from_fn(|c| self.wins(c)))
    }

    /// Open hexes touching a top-of-stack piece of `color`
    fn open_spaces(&self, color: Color, occupied: &HexSet) -> HexSet {
        self.pieces
            .iter()
            .filter(|p| p.color == color && !p.is_buried())
            .filter_map(|p| p.location)
            .flat_map(|loc| loc.neighbors())
            .filter(|h| !occupied.contains(h))
            .collect()
    }

    /// Hexes where `color` may drop a new piece.
    ///
    /// Black opens at the origin, and White's first piece may touch Black's.
    /// After that a new piece must touch its own color and no enemy piece.
    pub fn placement_locations(&self, color: Color) -> HexSet {
        let occupied = self.occupied();
        let opening_reply =
            color == Color::White && self.turns.black == 1 && self.turns.white == 0;

        match color {
            Color::Black if self.turns.black == 0 => HexSet::from_iter([ORIGIN]),
            _ if opening_reply => self.open_spaces(Color::Black, &occupied),
            _ => {
                let enemy = self.open_spaces(color.opponent(), &occupied);
                let mut own = self.open_spaces(color, &occupied);
                own.retain(|h| !enemy.contains(h));
                own
            }
        }
    }

    /// Destinations for the top piece at `hex`. Nothing moves before its
    /// color's queen is on the board.
    pub fn movement_locations(&self, hex: Hex) -> HexSet {
        match self.top_piece(hex) {
            Some(piece) => self.piece_moves(piece, &self.occupied()),
            None => HexSet::default(),
        }
    }

    fn piece_moves(&self, piece: &Piece, occupied: &HexSet) -> HexSet {
        if self.is_queen_placed(piece.color) {
            piece.movement_locations(occupied)
        } else {
            HexSet::default()
        }
    }

    /// All legal requests for the player on turn
    pub fn legal_moves(&self) -> Vec<Move> {
        movegen::legal_moves(&self.snapshot())
    }

    // ========================================================================
    // MUTATION
    // ========================================================================

    /// Bind the first unplaced (color, kind) piece to `location`.
    ///
    /// No legality checks beyond the piece existing; `apply` is the checked
    /// entry point.
    pub fn place_piece(
        &mut self,
        color: Color,
        location: Hex,
        kind: PieceKind,
        stack_depth: i32,
    ) -> Result<(), MoveError> {
        let piece = self
            .pieces
            .iter_mut()
            .find(|p| p.color == color && p.kind == kind && !p.is_placed())
            .ok_or(MoveError::NoUnplacedPiece { color, kind })?;

        piece.location = Some(location);
        piece.stack_depth = stack_depth;
        self.turns[color] += 1;
        Ok(())
    }

    /// Move the top piece at `from` to `to`, restacking both hexes.
    ///
    /// No legality checks beyond a piece being there; `apply` is the checked
    /// entry point.
    pub fn move_piece(&mut self, from: Hex, to: Hex) -> Result<(), MoveError> {
        let mover = self.top_index(from).ok_or(MoveError::EmptySource(from))?;

        self.pieces[mover].location = Some(to);
        let color = self.pieces[mover].color;
        self.turns[color] += 1;
        self.restack(mover, from, to);
        Ok(())
    }

    /// Uncover `from` before covering `to`: a beetle stepping from one stack
    /// onto another must end up on top of the hive.
    fn restack(&mut self, mover: usize, from: Hex, to: Hex) {
        let mut uncovered = false;
        for (i, piece) in self.pieces.iter_mut().enumerate() {
            if i != mover && piece.location == Some(from) {
                piece.uncover();
                uncovered = true;
            }
        }
        if uncovered {
            self.pieces[mover].on_top_of_hive = false;
        }

        let mut covered = false;
        for (i, piece) in self.pieces.iter_mut().enumerate() {
            if i != mover && piece.location == Some(to) {
                piece.cover();
                covered = true;
            }
        }
        if covered {
            self.pieces[mover].on_top_of_hive = true;
        }
    }

    /// Apply a request from outside, rejecting anything illegal without
    /// touching the board.
    pub fn apply(&mut self, mv: Move) -> Result<(), MoveError> {
        if mv != Move::Reset && self.result() != GameResult::Ongoing {
            return Err(MoveError::GameOver);
        }

        let on_turn = self.player_on_turn();
        match mv {
            Move::Reset => {}
            Move::Placement { color, kind, to } => {
                if color != on_turn {
                    return Err(MoveError::OutOfTurn {
                        on_turn,
                        requested: color,
                    });
                }
                if !kind.is_implemented() {
                    return Err(MoveError::Unimplemented(kind));
                }
                if self.must_place_queen(color) && kind != PieceKind::Queen {
                    return Err(MoveError::QueenRequired { color });
                }
                if self.unplaced_count(color, kind) == 0 {
                    return Err(MoveError::NoUnplacedPiece { color, kind });
                }
                if !self.placement_locations(color).contains(&to) {
                    return Err(MoveError::IllegalPlacement {
                        color,
                        location: to,
                    });
                }
            }
            Move::Movement { from, to } => {
                let piece = self.top_piece(from).ok_or(MoveError::EmptySource(from))?;
                if piece.color != on_turn {
                    return Err(MoveError::NotOwnPiece {
                        from,
                        owner: piece.color,
                        mover: on_turn,
                    });
                }
                if !piece.kind.is_implemented() {
                    return Err(MoveError::Unimplemented(piece.kind));
                }
                if self.must_place_queen(on_turn) {
                    return Err(MoveError::QueenRequired { color: on_turn });
                }
                if !self.movement_locations(from).contains(&to) {
                    return Err(MoveError::IllegalDestination { from, to });
                }
            }
        }

        self.commit(mv)?;
        debug_assert_eq!(self.check_invariants(), Ok(()), "after {mv}");
        Ok(())
    }

    /// Apply a move already known to be legal (from the move enumerator)
    pub(crate) fn commit(&mut self, mv: Move) -> Result<(), MoveError> {
        match mv {
            Move::Placement { color, kind, to } => self.place_piece(color, to, kind, 0),
            Move::Movement { from, to } => self.move_piece(from, to),
            Move::Reset => {
                self.reset();
                Ok(())
            }
        }
    }

    /// Verify stacking and connectivity. Legal play never fails this.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut stacks: FxHashMap<Hex, Vec<i32>> = FxHashMap::default();
        for piece in &self.pieces {
            if let Some(loc) = piece.location {
                stacks.entry(loc).or_default().push(piece.stack_depth);
            }
        }

        for (hex, mut depths) in stacks {
            if depths.iter().filter(|&&d| d == 0).count() > 1 {
                return Err(InvariantViolation::DuplicateTop(hex));
            }
            depths.sort_unstable_by(|a, b| b.cmp(a));
            if depths.iter().zip(0..).any(|(&d, i)| d != -i) {
                return Err(InvariantViolation::BrokenStack(hex));
            }
        }

        if !is_hive_intact(&self.occupied()) {
            return Err(InvariantViolation::HiveDisconnected);
        }
        Ok(())
    }

    // ========================================================================
    // SNAPSHOT
    // ========================================================================

    /// Full serializable state, with every piece's legal destinations
    pub fn snapshot(&self) -> BoardSnapshot {
        let occupied = self.occupied();

        let pieces = self
            .pieces
            .iter()
            .map(|p| {
                let moves = match p.location {
                    Some(_) if p.stack_depth == 0 => sorted(self.piece_moves(p, &occupied)),
                    _ => Vec::new(),
                };
                PieceRecord {
                    kind: p.kind,
                    color: p.color,
                    location: p.location,
                    stack_depth: p.stack_depth,
                    moves,
                }
            })
            .collect();

        BoardSnapshot {
            pieces,
            player_turn: self.player_on_turn(),
            placements: ByColor::from_fn(|c| sorted(self.placement_locations(c))),
            must_place_queen: ByColor::from_fn(|c| self.must_place_queen(c)),
            wins: ByColor::from_fn(|c| self.wins(c)),
            turns: self.turns,
        }
    }
}

/// Kind-major bag: all queens, then all ants, and so on; Black first per kind
fn fill_bag(config: &GameConfig) -> Vec<Piece> {
    let mut pieces = Vec::new();
    for (kind, count) in config.bag() {
        for color in Color::BOTH {
            for _ in 0..count {
                pieces.push(Piece::new(kind, color));
            }
        }
    }
    pieces
}

// ============================================================================
// TESTS
// ============================================================================
