//! Legal move enumeration over a board snapshot

use crate::pieces::PieceKind;
use crate::state::{BoardSnapshot, Move};

/// Every legal move for the color on turn, sorted.
///
/// Placements cross each placeable kind with every placement hex; only the
/// queen is placeable once the deadline is due. Movements come from the
/// destinations precomputed in the snapshot. A finished game has no moves.
pub fn legal_moves(snapshot: &BoardSnapshot) -> Vec<Move> {
    if snapshot.is_game_over() {
        return Vec::new();
    }

    let color = snapshot.player_turn;
    let mut moves = Vec::new();

    let mut kinds: Vec<PieceKind> = if snapshot.must_place_queen[color] {
        snapshot
            .unplaced(color)
            .map(|p| p.kind)
            .filter(|&k| k == PieceKind::Queen)
            .collect()
    } else {
        snapshot
            .unplaced(color)
            .map(|p| p.kind)
            .filter(|k| k.is_implemented())
            .collect()
    };
    kinds.sort_unstable();
    kinds.dedup();

    for kind in kinds {
        for &to in &snapshot.placements[color] {
            moves.push(Move::Placement { color, kind, to });
        }
    }

    for piece in snapshot.pieces.iter().filter(|p| p.color == color && p.kind.is_implemented()) {
        if let Some(from) = piece.location {
            moves.extend(piece.moves.iter().map(|&to| Move::Movement { from, to }));
        }
    }

    moves.sort_unstable();
    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::config::{Expansions, GameConfig};
    use crate::hex::{Hex, ORIGIN};
    use crate::pieces::Color;

    #[test]
    fn test_opening_moves() {
        let moves = legal_moves(&Board::default().snapshot());
        // One per implemented kind, all at the origin
        assert_eq!(moves.len(), 5);
        assert!(moves.iter().all(|m| matches!(
            m,
            Move::Placement { color: Color::Black, to: ORIGIN, .. }
        )));
    }

    #[test]
    fn test_reply_moves() {
        let mut board = Board::default();
        board
            .apply(Move::Placement {
                color: Color::Black,
                kind: PieceKind::Queen,
                to: ORIGIN,
            })
            .unwrap();
        let moves = legal_moves(&board.snapshot());
        assert_eq!(moves.len(), 5 * 6);
        assert!(moves.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_movements_included() {
        let mut board = Board::default();
        board.place_piece(Color::Black, ORIGIN, PieceKind::Queen, 0).unwrap();
        board.place_piece(Color::White, Hex::new(0, 2), PieceKind::Queen, 0).unwrap();

        let moves = legal_moves(&board.snapshot());
        let movements: Vec<_> = moves
            .iter()
            .filter(|m| matches!(m, Move::Movement { .. }))
            .collect();
        assert_eq!(
            movements,
            vec![
                &Move::Movement { from: ORIGIN, to: Hex::new(-1, 1) },
                &Move::Movement { from: ORIGIN, to: Hex::new(1, 1) },
            ]
        );
        // Four kinds left in hand, three placement hexes each
        assert_eq!(moves.len(), 2 + 4 * 3);
    }

    #[test]
    fn test_queen_deadline_restricts_placements() {
        let mut board = Board::default();
        for (color, kind, q, r) in [
            (Color::Black, PieceKind::Ant, 0, 0),
            (Color::White, PieceKind::Ant, 0, 2),
            (Color::Black, PieceKind::Ant, 0, -2),
            (Color::White, PieceKind::Ant, 0, 4),
            (Color::Black, PieceKind::Spider, 0, -4),
            (Color::White, PieceKind::Spider, 0, 6),
        ] {
            board
                .apply(Move::Placement { color, kind, to: Hex::new(q, r) })
                .unwrap();
        }

        let moves = legal_moves(&board.snapshot());
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|m| matches!(
            m,
            Move::Placement { kind: PieceKind::Queen, .. }
        )));
    }

    #[test]
    fn test_reserved_kinds_never_enumerated() {
        let config = GameConfig {
            expansions: Expansions {
                mosquito: true,
                ladybug: true,
                mealworm: true,
            },
            ..Default::default()
        };
        let moves = legal_moves(&Board::new(config).snapshot());
        assert_eq!(moves.len(), 5);
        assert!(moves.iter().all(|m| match m {
            Move::Placement { kind, .. } => kind.is_implemented(),
            _ => false,
        }));
    }

    #[test]
    fn test_game_over_has_no_moves() {
        let mut board = Board::default();
        for (color, kind, q, r) in [
            (Color::Black, PieceKind::Queen, 0, 0),
            (Color::White, PieceKind::Queen, 0, 2),
            (Color::White, PieceKind::Ant, 1, 1),
            (Color::White, PieceKind::Ant, 1, -1),
            (Color::White, PieceKind::Ant, -1, -1),
            (Color::White, PieceKind::Spider, -1, 1),
            (Color::White, PieceKind::Spider, 0, -2),
        ] {
            board.place_piece(color, Hex::new(q, r), kind, 0).unwrap();
        }
        let snapshot = board.snapshot();
        assert!(snapshot.wins.white);
        assert!(legal_moves(&snapshot).is_empty());
    }
}
