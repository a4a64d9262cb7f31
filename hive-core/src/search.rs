//! Best-response tree search
//!
//! Not minimax: every generation expands all leaves by every legal move, and
//! after each odd generation (the opponent's replies) every expanded node
//! keeps only the reply that is best for the opponent. The searcher's own
//! options stay fully expanded while the opponent is assumed to play its
//! single best reply.
//!
//! Leaves are expanded on private clones of the root board, so the board
//! passed in is never touched.

use crate::board::Board;
use crate::error::MoveError;
use crate::eval::{evaluate, EvalWeights};
use crate::movegen::legal_moves;
use crate::pieces::Color;
use crate::state::{GameResult, Move};
use std::time::{Duration, Instant};
use tracing::{debug, info};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Search configuration
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Generations to expand
    pub depth: u32,
    /// Checked between generations only; the generation in flight finishes
    pub time_limit: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: 5,
            time_limit: None,
        }
    }
}

impl SearchConfig {
    pub fn with_depth(depth: u32) -> Self {
        Self {
            depth,
            ..Default::default()
        }
    }

    /// Set wall-clock budget
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}

/// Outcome of one search
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    /// None when the side on turn has no legal move
    pub best_move: Option<Move>,
    /// White-positive evaluation of the leaf the chosen line leads to
    pub evaluation: f32,
    /// Nodes created, root included
    pub nodes: usize,
    /// Generations actually expanded
    pub generations: u32,
}

// ============================================================================
// SEARCH TREE
// ============================================================================

type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Clone, Debug)]
struct SearchNode {
    mv: Option<Move>,
    /// White-positive
    evaluation: f32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Expanded and found to have no legal moves
    terminal: bool,
}

/// Arena-backed tree. Pruned children stay in the arena, detached.
struct SearchTree {
    nodes: Vec<SearchNode>,
}

impl SearchTree {
    fn new(root_evaluation: f32) -> Self {
        Self {
            nodes: vec![SearchNode {
                mv: None,
                evaluation: root_evaluation,
                parent: None,
                children: Vec::new(),
                terminal: false,
            }],
        }
    }

    fn add_child(&mut self, parent: NodeId, mv: Move, evaluation: f32) {
        let id = self.nodes.len();
        self.nodes.push(SearchNode {
            mv: Some(mv),
            evaluation,
            parent: Some(parent),
            children: Vec::new(),
            terminal: false,
        });
        self.nodes[parent].children.push(id);
    }

    /// Unexpanded nodes reachable from the root, in tree order
    fn leaves(&self) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![ROOT];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.children.is_empty() {
                if !node.terminal {
                    leaves.push(id);
                }
            } else {
                stack.extend(node.children.iter().rev());
            }
        }
        leaves
    }

    /// Moves from the root down to `id`
    fn path(&self, id: NodeId) -> Vec<Move> {
        let mut moves = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = &self.nodes[current];
            moves.extend(node.mv);
            cursor = node.parent;
        }
        moves.reverse();
        moves
    }

    /// Drop every child except the one best for `side`. Ties keep the first.
    fn keep_best_child(&mut self, id: NodeId, side: Color) {
        let nodes = &self.nodes;
        let best = self.nodes[id].children.iter().copied().reduce(|best, child| {
            if signed(nodes[child].evaluation, side) > signed(nodes[best].evaluation, side) {
                child
            } else {
                best
            }
        });
        if let Some(best) = best {
            self.nodes[id].children = vec![best];
        }
    }

    /// Best leaf value reachable below `id`, signed for `side`
    fn best_leaf_value(&self, id: NodeId, side: Color) -> f32 {
        let node = &self.nodes[id];
        node.children
            .iter()
            .map(|&child| self.best_leaf_value(child, side))
            .fold(None, |acc: Option<f32>, v| Some(acc.map_or(v, |a| a.max(v))))
            .unwrap_or_else(|| signed(node.evaluation, side))
    }
}

/// Evaluation from `side`'s point of view
fn signed(evaluation: f32, side: Color) -> f32 {
    match side {
        Color::White => evaluation,
        Color::Black => -evaluation,
    }
}

/// Children produced by expanding one leaf
struct Expansion {
    node: NodeId,
    to_move: Color,
    children: Vec<(Move, f32)>,
}

fn expand(
    root: &Board,
    weights: &EvalWeights,
    node: NodeId,
    path: &[Move],
) -> Result<Expansion, MoveError> {
    let mut board = root.clone();
    for &mv in path {
        board.commit(mv)?;
    }
    let snapshot = board.snapshot();

    let children = legal_moves(&snapshot)
        .into_iter()
        .map(|mv| {
            let mut child = board.clone();
            child.commit(mv)?;
            Ok((mv, evaluate(&child.snapshot(), weights)))
        })
        .collect::<Result<Vec<_>, MoveError>>()?;

    Ok(Expansion {
        node,
        to_move: snapshot.player_turn,
        children,
    })
}

#[cfg(feature = "parallel")]
fn expand_all(
    root: &Board,
    weights: &EvalWeights,
    work: &[(NodeId, Vec<Move>)],
) -> Result<Vec<Expansion>, MoveError> {
    use rayon::prelude::*;

    work.par_iter()
        .map(|(node, path)| expand(root, weights, *node, path))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn expand_all(
    root: &Board,
    weights: &EvalWeights,
    work: &[(NodeId, Vec<Move>)],
) -> Result<Vec<Expansion>, MoveError> {
    work.iter()
        .map(|(node, path)| expand(root, weights, *node, path))
        .collect()
}

// ============================================================================
// ENGINE
// ============================================================================

/// Best-response AI player
#[derive(Clone, Debug, Default)]
pub struct BestResponseAI {
    pub config: SearchConfig,
    pub weights: EvalWeights,
}

impl BestResponseAI {
    pub fn new(config: SearchConfig, weights: EvalWeights) -> Self {
        Self { config, weights }
    }

    /// Run a full search from `board`.
    ///
    /// Errors only if an enumerated move fails to apply on a scratch board,
    /// which means the rules disagree with themselves.
    pub fn search(&self, board: &Board) -> Result<SearchResult, MoveError> {
        let start = Instant::now();
        let searcher = board.player_on_turn();
        let mut tree = SearchTree::new(evaluate(&board.snapshot(), &self.weights));
        let mut generations = 0;

        for generation in 0..self.config.depth {
            let work: Vec<(NodeId, Vec<Move>)> = tree
                .leaves()
                .into_iter()
                .map(|id| (id, tree.path(id)))
                .collect();
            if work.is_empty() {
                break;
            }

            // Collecting every expansion first is the barrier before pruning
            let expansions = expand_all(board, &self.weights, &work)?;
            for expansion in expansions {
                if expansion.children.is_empty() {
                    tree.nodes[expansion.node].terminal = true;
                }
                for (mv, evaluation) in expansion.children {
                    tree.add_child(expansion.node, mv, evaluation);
                }
                if generation % 2 == 1 {
                    tree.keep_best_child(expansion.node, expansion.to_move);
                }
            }
            generations += 1;

            debug!(
                generation,
                leaves = work.len(),
                nodes = tree.nodes.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "search generation complete"
            );

            if let Some(limit) = self.config.time_limit {
                if start.elapsed() >= limit {
                    debug!(generation, "search time limit reached");
                    break;
                }
            }
        }

        let mut best: Option<(NodeId, f32)> = None;
        for &child in &tree.nodes[ROOT].children {
            let value = tree.best_leaf_value(child, searcher);
            if best.map_or(true, |(_, v)| value > v) {
                best = Some((child, value));
            }
        }

        let result = match best {
            Some((child, value)) => SearchResult {
                best_move: tree.nodes[child].mv,
                evaluation: signed(value, searcher),
                nodes: tree.nodes.len(),
                generations,
            },
            None => SearchResult {
                best_move: None,
                evaluation: tree.nodes[ROOT].evaluation,
                nodes: tree.nodes.len(),
                generations,
            },
        };

        match result.best_move {
            Some(mv) => info!(
                color = %searcher,
                best = %mv,
                evaluation = result.evaluation,
                nodes = result.nodes,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "search complete"
            ),
            None => info!(color = %searcher, "no legal move"),
        }

        Ok(result)
    }

    /// Get best move for the player on turn
    pub fn best_move(&self, board: &Board) -> Result<Option<Move>, MoveError> {
        Ok(self.search(board)?.best_move)
    }

    /// Play until the game ends, the side on turn is stuck, or `max_plies`
    pub fn play_game(&self, initial: Board, max_plies: usize) -> Result<(Board, Vec<Move>), MoveError> {
        let mut board = initial;
        let mut history = Vec::new();

        while board.result() == GameResult::Ongoing && history.len() < max_plies {
            match self.best_move(&board)? {
                Some(mv) => {
                    board.apply(mv)?;
                    history.push(mv);
                }
                None => break,
            }
        }

        Ok((board, history))
    }

    /// Evaluate a position
    pub fn evaluate(&self, board: &Board) -> f32 {
        evaluate(&board.snapshot(), &self.weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::hex::Hex;
    use crate::pieces::PieceKind;

    fn engine(depth: u32) -> BestResponseAI {
        BestResponseAI::new(SearchConfig::with_depth(depth), EvalWeights::default())
    }

    fn board_with(placements: &[(Color, (i32, i32), PieceKind)]) -> Board {
        let mut board = Board::default();
        for &(color, loc, kind) in placements {
            board.place_piece(color, loc.into(), kind, 0).unwrap();
        }
        board
    }

    /// White queen boxed in on five sides; a black ant can close the sixth
    fn black_to_win() -> Board {
        let board = board_with(&[
            (Color::White, (0, 0), PieceKind::Queen),
            (Color::Black, (0, 2), PieceKind::Queen),
            (Color::Black, (1, 1), PieceKind::Ant),
            (Color::Black, (1, -1), PieceKind::Ant),
            (Color::Black, (0, -2), PieceKind::Spider),
            (Color::Black, (-1, -1), PieceKind::Spider),
            (Color::Black, (-1, 3), PieceKind::Ant),
        ]);
        let mut snapshot = board.snapshot();
        snapshot.turns.white = snapshot.turns.black;
        Board::from_snapshot(&snapshot, GameConfig::default()).unwrap()
    }

    #[test]
    fn test_terminal_position_returns_no_move() {
        let mut board = black_to_win();
        board.move_piece(Hex::new(-1, 3), Hex::new(-1, 1)).unwrap();
        assert_eq!(board.result(), GameResult::BlackWins);

        let result = engine(3).search(&board).unwrap();
        assert_eq!(result.best_move, None);
        assert_eq!(result.nodes, 1);
    }

    #[test]
    fn test_stuck_player_returns_no_move() {
        // Black queen boxed in on five sides, its last neighbor slide-locked
        let board = board_with(&[
            (Color::Black, (0, 0), PieceKind::Queen),
            (Color::White, (0, 2), PieceKind::Queen),
            (Color::White, (1, 1), PieceKind::Ant),
            (Color::White, (1, -1), PieceKind::Ant),
            (Color::White, (-1, -1), PieceKind::Spider),
            (Color::White, (-1, 1), PieceKind::Spider),
        ]);
        assert_eq!(board.result(), GameResult::Ongoing);
        assert_eq!(board.player_on_turn(), Color::Black);
        assert!(board.legal_moves().is_empty());

        let result = engine(3).search(&board).unwrap();
        assert_eq!(result.best_move, None);
        assert_eq!(result.nodes, 1);
        assert_eq!(result.evaluation, engine(3).evaluate(&board));

        let (end, history) = engine(1).play_game(board.clone(), 10).unwrap();
        assert!(history.is_empty());
        assert_eq!(end.snapshot(), board.snapshot());
    }

    #[test]
    fn test_takes_immediate_win() {
        let board = black_to_win();
        assert_eq!(board.player_on_turn(), Color::Black);

        let result = engine(1).search(&board).unwrap();
        assert_eq!(
            result.best_move,
            Some(Move::Movement {
                from: Hex::new(-1, 3),
                to: Hex::new(-1, 1),
            })
        );
        assert!(result.evaluation < 0.0);
        assert_eq!(result.generations, 1);
    }

    #[test]
    fn test_search_leaves_board_untouched() {
        let mut board = Board::default();
        board
            .apply(Move::Placement {
                color: Color::Black,
                kind: PieceKind::Queen,
                to: Hex::new(0, 0),
            })
            .unwrap();
        let before = board.snapshot();

        let result = engine(3).search(&board).unwrap();
        let mv = result.best_move.unwrap();
        assert!(board.legal_moves().contains(&mv));
        assert_eq!(board.snapshot(), before);
        assert_eq!(result.generations, 3);
    }

    #[test]
    fn test_time_limit_stops_after_one_generation() {
        let ai = BestResponseAI::new(
            SearchConfig::default().with_time_limit(Duration::ZERO),
            EvalWeights::default(),
        );
        let result = ai.search(&Board::default()).unwrap();
        assert_eq!(result.generations, 1);
        assert!(result.best_move.is_some());
    }

    #[test]
    fn test_keep_best_child_per_side() {
        let mut tree = SearchTree::new(0.0);
        let mv = Move::Reset;
        tree.add_child(ROOT, mv, 1.0);
        tree.add_child(ROOT, mv, -3.0);
        tree.add_child(ROOT, mv, 2.0);
        tree.add_child(ROOT, mv, -3.0);

        let mut black = SearchTree { nodes: tree.nodes.clone() };
        black.keep_best_child(ROOT, Color::Black);
        assert_eq!(black.nodes[ROOT].children, vec![2]);

        tree.keep_best_child(ROOT, Color::White);
        assert_eq!(tree.nodes[ROOT].children, vec![3]);
        assert_eq!(tree.leaves(), vec![3]);
        assert_eq!(tree.path(3), vec![mv]);
    }

    #[test]
    fn test_play_game() {
        let (board, history) = engine(1).play_game(Board::default(), 6).unwrap();
        assert_eq!(history.len(), 6);
        assert_eq!(board.turns(Color::Black) + board.turns(Color::White), 6);
        assert_eq!(board.check_invariants(), Ok(()));
    }
}
