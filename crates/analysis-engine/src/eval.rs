//! Heuristic position evaluation — pure functions, White-positive centipawns.
//!
//! The total is additive over independent terms so each term can be tested
//! in isolation. Deterministic by contract: same position, same score.

use shakmaty::{Board, CastlingSide, Chess, Color, Position, Role, Square};

const PAWN_VALUE: i32 = 100;
const KNIGHT_VALUE: i32 = 320;
const BISHOP_VALUE: i32 = 330;
const ROOK_VALUE: i32 = 500;
const QUEEN_VALUE: i32 = 900;

const MOBILITY_PER_MOVE: i32 = 4;
const MOBILITY_CAPTURE_BONUS: i32 = 15;
const MOBILITY_CHECK_BONUS: i32 = 20;
const MOBILITY_MINOR_BONUS: i32 = 5;

const CHECK_PENALTY: i32 = 60;
const CASTLING_RIGHT_BONUS: i32 = 25;

const DOUBLED_PAWN_PENALTY: i32 = 25;
const ISOLATED_PAWN_PENALTY: i32 = 20;

const CENTER_BONUS: i32 = 35;
const ATTACKED_SQUARE_BONUS: i32 = 2;

const CENTER_SQUARES: [Square; 4] = [Square::D4, Square::D5, Square::E4, Square::E5];

fn piece_value(role: Role) -> i32 {
    match role {
        Role::Pawn => PAWN_VALUE,
        Role::Knight => KNIGHT_VALUE,
        Role::Bishop => BISHOP_VALUE,
        Role::Rook => ROOK_VALUE,
        Role::Queen => QUEEN_VALUE,
        Role::King => 0,
    }
}

/// Full evaluation: sum of all terms.
pub fn evaluate(pos: &Chess) -> i32 {
    material(pos.board())
        + mobility(pos)
        + king_safety(pos)
        + pawn_structure(pos.board())
        + positional(pos)
}

/// Signed material balance.
pub fn material(board: &Board) -> i32 {
    let mut score = 0;
    for sq in board.occupied() {
        if let Some(piece) = board.piece_at(sq) {
            let value = piece_value(piece.role);
            score += if piece.color == Color::White { value } else { -value };
        }
    }
    score
}

/// Mobility of the side to move, sign-flipped to White's perspective.
pub fn mobility(pos: &Chess) -> i32 {
    let mut score = 0;
    for mv in pos.legal_moves() {
        score += MOBILITY_PER_MOVE;
        if mv.is_capture() {
            score += MOBILITY_CAPTURE_BONUS;
        }
        if matches!(mv.role(), Role::Knight | Role::Bishop) {
            score += MOBILITY_MINOR_BONUS;
        }
        let mut next = pos.clone();
        next.play_unchecked(&mv);
        if next.is_check() {
            score += MOBILITY_CHECK_BONUS;
        }
    }
    if pos.turn() == Color::White {
        score
    } else {
        -score
    }
}

/// Check penalty plus remaining castling rights.
pub fn king_safety(pos: &Chess) -> i32 {
    let mut score = 0;
    if pos.is_check() {
        score += if pos.turn() == Color::White {
            -CHECK_PENALTY
        } else {
            CHECK_PENALTY
        };
    }
    let castles = pos.castles();
    for side in [CastlingSide::KingSide, CastlingSide::QueenSide] {
        if castles.has(Color::White, side) {
            score += CASTLING_RIGHT_BONUS;
        }
        if castles.has(Color::Black, side) {
            score -= CASTLING_RIGHT_BONUS;
        }
    }
    score
}

/// Doubled and isolated pawn penalties, per file and color.
pub fn pawn_structure(board: &Board) -> i32 {
    let mut score = 0;
    for color in [Color::White, Color::Black] {
        let mut per_file = [0i32; 8];
        for sq in board.pawns() & board.by_color(color) {
            per_file[sq.file() as usize] += 1;
        }
        let sign = if color == Color::White { 1 } else { -1 };
        for file in 0..8 {
            let count = per_file[file];
            if count > 1 {
                score -= sign * DOUBLED_PAWN_PENALTY * (count - 1);
            }
            let left = if file > 0 { per_file[file - 1] } else { 0 };
            let right = if file < 7 { per_file[file + 1] } else { 0 };
            if count == 1 && left == 0 && right == 0 {
                score -= sign * ISOLATED_PAWN_PENALTY;
            }
        }
    }
    score
}

/// Center occupancy plus an attacked-squares bonus derived from the side to
/// move's legal-move list.
pub fn positional(pos: &Chess) -> i32 {
    let mut score = 0;
    for sq in CENTER_SQUARES {
        if let Some(piece) = pos.board().piece_at(sq) {
            score += if piece.color == Color::White {
                CENTER_BONUS
            } else {
                -CENTER_BONUS
            };
        }
    }
    let attacked = pos.legal_moves().len() as i32 * ATTACKED_SQUARE_BONUS;
    score + if pos.turn() == Color::White { attacked } else { -attacked }
}
