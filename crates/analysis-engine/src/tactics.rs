//! Tactical motif classification over attack sets.
//!
//! Pin/skewer and discovered-attack detection are deliberate approximations:
//! every slider move is a pin candidate, and a discovered attack is inferred
//! from the mover's attacked-square count growing, not from ray geometry.

use std::fmt;

use serde::{Deserialize, Serialize};
use shakmaty::{attacks, Board, Chess, Color, Move, Position, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TacticalLabel {
    Capture,
    Check,
    Fork,
    Pin,
    DiscoveredAttack,
}

impl fmt::Display for TacticalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TacticalLabel::Capture => "capture",
            TacticalLabel::Check => "check",
            TacticalLabel::Fork => "fork",
            TacticalLabel::Pin => "pin",
            TacticalLabel::DiscoveredAttack => "discovered_attack",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

const SEVERITY_HIGH_CP: i32 = 300;
const SEVERITY_MEDIUM_CP: i32 = 200;

impl Severity {
    /// Tier for an evaluation delta in centipawns.
    pub fn for_delta(delta: i32) -> Self {
        if delta > SEVERITY_HIGH_CP {
            Severity::High
        } else if delta > SEVERITY_MEDIUM_CP {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

/// Classify a move played in `pos`. Labels come back in headline-priority
/// order; the input position is never mutated.
pub fn classify(pos: &Chess, mv: &Move) -> Vec<TacticalLabel> {
    let mover = pos.turn();
    let mut after = pos.clone();
    after.play_unchecked(mv);

    let mut labels = Vec::new();

    if mv.is_capture() {
        labels.push(TacticalLabel::Capture);
    }

    if after.is_check() {
        labels.push(TacticalLabel::Check);
    }

    // Fork: the moved piece attacks two or more enemy pieces from its
    // destination square.
    let dest = mv.to();
    if let Some(piece) = after.board().piece_at(dest) {
        let targets = attacks::attacks(dest, piece, after.board().occupied())
            & after.board().by_color(!mover);
        if targets.count() >= 2 {
            labels.push(TacticalLabel::Fork);
        }
    }

    if matches!(mv.role(), Role::Bishop | Role::Rook | Role::Queen) {
        labels.push(TacticalLabel::Pin);
    }

    if attacked_square_count(after.board(), mover) > attacked_square_count(pos.board(), mover) {
        labels.push(TacticalLabel::DiscoveredAttack);
    }

    labels
}

/// Total squares attacked by one side, counting multiplicity across pieces.
fn attacked_square_count(board: &Board, color: Color) -> u32 {
    let occupied = board.occupied();
    let mut count = 0;
    for sq in board.by_color(color) {
        if let Some(piece) = board.piece_at(sq) {
            count += attacks::attacks(sq, piece, occupied).count() as u32;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::BoardState;

    fn classify_san(fen: &str, san: &str) -> Vec<TacticalLabel> {
        let board = BoardState::from_fen(fen).unwrap();
        let mv = board.parse_san(san).unwrap();
        classify(board.position(), &mv)
    }

    #[test]
    fn test_knight_fork_on_two_rooks() {
        let labels = classify_san("4k3/8/2r1r3/8/8/1N6/8/4K3 w - - 0 1", "Nd4");
        assert!(labels.contains(&TacticalLabel::Fork));
        assert!(!labels.contains(&TacticalLabel::Capture));
        assert!(!labels.contains(&TacticalLabel::Pin));
    }

    #[test]
    fn test_capturing_check_is_both() {
        let board = BoardState::start();
        let (board, _) = board.apply_san("e4").unwrap();
        let (board, _) = board.apply_san("e5").unwrap();
        let (board, _) = board.apply_san("Qh5").unwrap();
        let (board, _) = board.apply_san("Nc6").unwrap();
        let mv = board.parse_san("Qxf7+").unwrap();
        let labels = classify(board.position(), &mv);
        assert_eq!(labels.first(), Some(&TacticalLabel::Capture));
        assert!(labels.contains(&TacticalLabel::Check));
        // Queen move, so the pin approximation tags it too.
        assert!(labels.contains(&TacticalLabel::Pin));
    }

    #[test]
    fn test_slider_moves_are_pin_candidates() {
        let board = BoardState::start();
        let (board, _) = board.apply_san("e4").unwrap();
        let (board, _) = board.apply_san("e5").unwrap();
        let mv = board.parse_san("Bc4").unwrap();
        let labels = classify(board.position(), &mv);
        assert!(labels.contains(&TacticalLabel::Pin));
    }

    #[test]
    fn test_knight_lift_uncovers_rook_file() {
        let labels = classify_san("4k3/8/8/8/3N4/8/8/3RK3 w - - 0 1", "Nf5");
        assert_eq!(labels, vec![TacticalLabel::DiscoveredAttack]);
    }

    #[test]
    fn test_severity_tiers() {
        assert_eq!(Severity::for_delta(150), Severity::Low);
        assert_eq!(Severity::for_delta(250), Severity::Medium);
        assert_eq!(Severity::for_delta(300), Severity::Medium);
        assert_eq!(Severity::for_delta(301), Severity::High);
    }
}
