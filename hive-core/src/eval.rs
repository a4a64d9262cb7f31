//! Position evaluation
//!
//! Scores are White-positive: each color's component is computed the same
//! way and the result is `white - black`.

use crate::error::ConfigError;
use crate::hex::{slidable_moves, HexSet};
use crate::pieces::{Color, PieceKind};
use crate::state::BoardSnapshot;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One weight per implemented piece kind
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KindWeights {
    pub queen: f32,
    pub ant: f32,
    pub spider: f32,
    pub beetle: f32,
    pub grasshopper: f32,
}

impl KindWeights {
    /// Reserved kinds weigh nothing
    pub fn get(&self, kind: PieceKind) -> f32 {
        match kind {
            PieceKind::Queen => self.queen,
            PieceKind::Ant => self.ant,
            PieceKind::Spider => self.spider,
            PieceKind::Beetle => self.beetle,
            PieceKind::Grasshopper => self.grasshopper,
            PieceKind::Mosquito | PieceKind::Ladybug | PieceKind::Mealworm => 0.0,
        }
    }
}

/// Evaluator weight table.
///
/// Every field is required when loading from JSON, and unknown keys are
/// rejected, so a typo is a startup error rather than a silent zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvalWeights {
    // Queen safety
    pub queen_open_hex: f32,
    pub queen_slidable_hex: f32,
    pub queen_surrounded_penalty: f32,

    /// Per placed piece
    pub in_play: KindWeights,

    // Mobility
    pub total_moves: f32,
    pub queen_moves: f32,
    /// Per friendly piece next to the friendly queen that can still move
    pub queen_adjacent_mobile_piece: f32,

    // Placement pressure, only while pieces remain in hand
    pub total_placements: f32,
    pub enemy_queen_adjacent_placement: f32,

    // Stacking, keyed by the kind of the buried piece
    pub beetle_on_enemy: KindWeights,
    pub beetle_on_friendly: KindWeights,

    pub turn_bonus: f32,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            queen_open_hex: 2.0,
            queen_slidable_hex: 1.0,
            queen_surrounded_penalty: 1000.0,
            in_play: KindWeights {
                queen: 3.0,
                ant: 2.0,
                spider: 1.0,
                beetle: 1.5,
                grasshopper: 1.0,
            },
            total_moves: 0.2,
            queen_moves: 0.5,
            queen_adjacent_mobile_piece: 0.5,
            total_placements: 0.3,
            enemy_queen_adjacent_placement: 1.0,
            beetle_on_enemy: KindWeights {
                queen: 8.0,
                ant: 3.0,
                spider: 1.5,
                beetle: 2.0,
                grasshopper: 1.5,
            },
            beetle_on_friendly: KindWeights {
                queen: 6.0,
                ant: 1.0,
                spider: 0.5,
                beetle: 0.5,
                grasshopper: 0.5,
            },
            turn_bonus: 0.5,
        }
    }
}

impl EvalWeights {
    /// Load from JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Evaluate a snapshot. Positive favors White.
pub fn evaluate(snapshot: &BoardSnapshot, weights: &EvalWeights) -> f32 {
    let occupied = snapshot.occupied();
    component(snapshot, Color::White, weights, &occupied)
        - component(snapshot, Color::Black, weights, &occupied)
}

fn component(
    snapshot: &BoardSnapshot,
    color: Color,
    weights: &EvalWeights,
    occupied: &HexSet,
) -> f32 {
    let mut score = queen_safety(snapshot, color, weights, occupied);

    // Material in play and mobility
    let queen = snapshot.queen_location(color);
    for piece in snapshot.pieces.iter().filter(|p| p.color == color) {
        let Some(loc) = piece.location else { continue };
        score += weights.in_play.get(piece.kind);

        let moves = piece.moves.len() as f32;
        score += moves * weights.total_moves;
        if piece.kind == PieceKind::Queen {
            score += moves * weights.queen_moves;
        }
        if !piece.moves.is_empty() && queen.map_or(false, |q| q.is_adjacent(loc)) {
            score += weights.queen_adjacent_mobile_piece;
        }
    }

    score += placement_pressure(snapshot, color, weights);

    // Buried pieces under a friendly top piece
    for buried in snapshot.pieces.iter().filter(|p| p.stack_depth < 0) {
        let Some(loc) = buried.location else { continue };
        match snapshot.top_at(loc) {
            Some(top) if top.color == color => {
                if buried.color == color {
                    score -= weights.beetle_on_friendly.get(buried.kind);
                } else {
                    score += weights.beetle_on_enemy.get(buried.kind);
                }
            }
            _ => {}
        }
    }

    if snapshot.player_turn == color {
        score += weights.turn_bonus;
    }

    score
}

fn queen_safety(
    snapshot: &BoardSnapshot,
    color: Color,
    weights: &EvalWeights,
    occupied: &HexSet,
) -> f32 {
    let Some(queen) = snapshot.queen_location(color) else {
        return 0.0;
    };

    let open = queen.neighbors().iter().filter(|h| !occupied.contains(h)).count();
    if open == 0 {
        return -weights.queen_surrounded_penalty;
    }
    let escapes = slidable_moves(queen, occupied).len();
    open as f32 * weights.queen_open_hex - escapes as f32 * weights.queen_slidable_hex
}

fn placement_pressure(snapshot: &BoardSnapshot, color: Color, weights: &EvalWeights) -> f32 {
    if !snapshot.unplaced(color).any(|p| p.kind.is_implemented()) {
        return 0.0;
    }

    let placements = &snapshot.placements[color];
    let mut score = placements.len() as f32 * weights.total_placements;

    if let Some(enemy_queen) = snapshot.queen_location(color.opponent()) {
        let adjacent = placements.iter().filter(|h| enemy_queen.is_adjacent(**h)).count();
        score += adjacent as f32 * weights.enemy_queen_adjacent_placement;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::hex::Hex;

    fn zero_weights() -> EvalWeights {
        EvalWeights {
            queen_open_hex: 0.0,
            queen_slidable_hex: 0.0,
            queen_surrounded_penalty: 0.0,
            in_play: KindWeights::default(),
            total_moves: 0.0,
            queen_moves: 0.0,
            queen_adjacent_mobile_piece: 0.0,
            total_placements: 0.0,
            enemy_queen_adjacent_placement: 0.0,
            beetle_on_enemy: KindWeights::default(),
            beetle_on_friendly: KindWeights::default(),
            turn_bonus: 0.0,
        }
    }

    fn board_with(placements: &[(Color, (i32, i32), PieceKind, i32)]) -> Board {
        let mut board = Board::default();
        for &(color, loc, kind, depth) in placements {
            board.place_piece(color, loc.into(), kind, depth).unwrap();
        }
        board
    }

    fn two_queens() -> Board {
        board_with(&[
            (Color::Black, (0, 0), PieceKind::Queen, 0),
            (Color::White, (0, 2), PieceKind::Queen, 0),
        ])
    }

    #[test]
    fn test_empty_board_only_turn_bonus() {
        let weights = EvalWeights::default();
        let score = evaluate(&Board::default().snapshot(), &weights);
        // Black is on turn and holds the only placement hex
        let expected = -weights.turn_bonus - weights.total_placements;
        assert!((score - expected).abs() < 1e-4);
    }

    #[test]
    fn test_symmetric_position() {
        let weights = EvalWeights::default();
        let score = evaluate(&two_queens().snapshot(), &weights);
        assert!((score + weights.turn_bonus).abs() < 1e-4);
    }

    #[test]
    fn test_queen_safety_terms() {
        let weights = EvalWeights {
            queen_open_hex: 1.0,
            queen_slidable_hex: 10.0,
            ..zero_weights()
        };
        // Lone white queen next to a black ant: 5 open, 2 slidable
        let board = board_with(&[
            (Color::Black, (0, 0), PieceKind::Ant, 0),
            (Color::White, (0, 2), PieceKind::Queen, 0),
        ]);
        let score = evaluate(&board.snapshot(), &weights);
        assert!((score - (5.0 - 20.0)).abs() < 1e-4);
    }

    #[test]
    fn test_surrounded_queen_penalty() {
        let board = board_with(&[
            (Color::Black, (0, 0), PieceKind::Queen, 0),
            (Color::White, (0, 2), PieceKind::Queen, 0),
            (Color::White, (1, 1), PieceKind::Ant, 0),
            (Color::White, (1, -1), PieceKind::Ant, 0),
            (Color::White, (0, -2), PieceKind::Ant, 0),
            (Color::White, (-1, -1), PieceKind::Spider, 0),
            (Color::White, (-1, 1), PieceKind::Spider, 0),
        ]);
        let weights = EvalWeights::default();
        assert!(evaluate(&board.snapshot(), &weights) > weights.queen_surrounded_penalty / 2.0);
    }

    #[test]
    fn test_material_in_play() {
        let weights = EvalWeights {
            in_play: KindWeights {
                ant: 2.0,
                ..Default::default()
            },
            ..zero_weights()
        };
        let board = board_with(&[
            (Color::Black, (0, 0), PieceKind::Queen, 0),
            (Color::White, (0, 2), PieceKind::Ant, 0),
            (Color::White, (0, 4), PieceKind::Ant, 0),
        ]);
        assert!((evaluate(&board.snapshot(), &weights) - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_mobility_terms() {
        let weights = EvalWeights {
            total_moves: 1.0,
            queen_moves: 10.0,
            ..zero_weights()
        };
        // Both queens have two slides each; White's are worth the same
        let score = evaluate(&two_queens().snapshot(), &weights);
        assert!(score.abs() < 1e-4);

        // Black queen still in hand: only White moves count
        let board = board_with(&[
            (Color::Black, (0, 0), PieceKind::Ant, 0),
            (Color::White, (0, 2), PieceKind::Queen, 0),
        ]);
        let snapshot = board.snapshot();
        let white_moves = snapshot.top_at(Hex::new(0, 2)).unwrap().moves.len() as f32;
        assert!(white_moves > 0.0);
        assert!((evaluate(&snapshot, &weights) - white_moves * 11.0).abs() < 1e-4);
    }

    #[test]
    fn test_placement_pressure() {
        let weights = EvalWeights {
            enemy_queen_adjacent_placement: 1.0,
            ..zero_weights()
        };
        // White's opening reply may drop anywhere around the black queen
        let board = board_with(&[(Color::Black, (0, 0), PieceKind::Queen, 0)]);
        assert!((evaluate(&board.snapshot(), &weights) - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_beetle_stacking() {
        let weights = EvalWeights {
            beetle_on_enemy: KindWeights {
                queen: 5.0,
                ..Default::default()
            },
            beetle_on_friendly: KindWeights {
                ant: 3.0,
                ..Default::default()
            },
            ..zero_weights()
        };

        // White beetle on the black queen
        let board = board_with(&[
            (Color::Black, (0, 0), PieceKind::Queen, -1),
            (Color::White, (0, 0), PieceKind::Beetle, 0),
            (Color::White, (0, 2), PieceKind::Queen, 0),
        ]);
        assert!((evaluate(&board.snapshot(), &weights) - 5.0).abs() < 1e-4);

        // Black beetle on its own ant
        let board = board_with(&[
            (Color::Black, (0, 0), PieceKind::Ant, -1),
            (Color::Black, (0, 0), PieceKind::Beetle, 0),
            (Color::White, (0, 2), PieceKind::Queen, 0),
        ]);
        assert!((evaluate(&board.snapshot(), &weights) - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_weights_json_requires_every_field() {
        let json = serde_json::to_string(&EvalWeights::default()).unwrap();
        let parsed: EvalWeights = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, EvalWeights::default());

        let mut value = serde_json::to_value(EvalWeights::default()).unwrap();
        value.as_object_mut().unwrap().remove("turn_bonus");
        assert!(serde_json::from_value::<EvalWeights>(value).is_err());

        let mut value = serde_json::to_value(EvalWeights::default()).unwrap();
        value["queen_open_hex"] = serde_json::json!("lots");
        assert!(serde_json::from_value::<EvalWeights>(value).is_err());

        let mut value = serde_json::to_value(EvalWeights::default()).unwrap();
        value["queen_open_hexes"] = serde_json::json!(1.0);
        assert!(serde_json::from_value::<EvalWeights>(value).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = EvalWeights::load(Path::new("/nonexistent/weights.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("hive_eval_weights_test.json");
        let weights = EvalWeights {
            turn_bonus: 7.0,
            ..EvalWeights::default()
        };
        std::fs::write(&path, serde_json::to_string_pretty(&weights).unwrap()).unwrap();
        assert_eq!(EvalWeights::load(&path).unwrap(), weights);
        std::fs::remove_file(&path).ok();
    }
}
