//! One-ply best-move search over the heuristic evaluator.

use shakmaty::{Chess, Color, Move, Position};

use crate::eval;

/// Pick the legal move with the best one-ply evaluation for the side to
/// move. Ties keep the first-encountered move; `None` means no legal moves
/// exist (checkmate or stalemate), which is a terminal case, not an error.
pub fn best_move(pos: &Chess) -> Option<Move> {
    let mut best: Option<(Move, i32)> = None;
    for mv in pos.legal_moves() {
        let mut next = pos.clone();
        next.play_unchecked(&mv);
        let white_score = eval::evaluate(&next);
        let score = if pos.turn() == Color::White {
            white_score
        } else {
            -white_score
        };
        match &best {
            Some((_, top)) if *top >= score => {}
            _ => best = Some((mv, score)),
        }
    }
    best.map(|(mv, _)| mv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::BoardState;
    use shakmaty::Square;

    fn pos(fen: &str) -> Chess {
        BoardState::from_fen(fen).unwrap().position().clone()
    }

    #[test]
    fn test_no_move_in_stalemate() {
        let p = pos("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert!(p.is_stalemate());
        assert!(best_move(&p).is_none());
    }

    #[test]
    fn test_no_move_in_checkmate() {
        let p = pos("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert!(p.is_checkmate());
        assert!(best_move(&p).is_none());
    }

    #[test]
    fn test_takes_the_hanging_queen() {
        let p = pos("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1");
        let mv = best_move(&p).unwrap();
        assert_eq!(mv.to(), Square::D5);
        assert!(mv.is_capture());
    }

    #[test]
    fn test_deterministic_choice() {
        let p = Chess::default();
        let first = best_move(&p).unwrap();
        assert_eq!(best_move(&p).unwrap(), first);
    }
}
