//! Board state snapshots backed by the shakmaty rules engine.

use shakmaty::{
    fen::Fen,
    san::{San, SanPlus},
    CastlingMode, CastlingSide, Chess, Color, EnPassantMode, Move, MoveList, Position,
};

use crate::error::CoreError;

/// An immutable position snapshot. Applying a move produces a new
/// `BoardState` instead of mutating the original.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    pos: Chess,
}

impl BoardState {
    /// The standard starting position.
    pub fn start() -> Self {
        Self::default()
    }

    pub fn from_fen(fen: &str) -> Result<Self, CoreError> {
        let parsed: Fen = fen
            .parse()
            .map_err(|e| CoreError::InvalidFen(format!("{fen}: {e}")))?;
        let pos = parsed
            .into_position::<Chess>(CastlingMode::Standard)
            .map_err(|e| CoreError::InvalidFen(format!("{fen}: {e}")))?;
        Ok(Self { pos })
    }

    /// Parse a FEN, falling back to the starting position when the text is
    /// malformed. For call sites where analysis must continue regardless.
    pub fn from_fen_or_start(fen: &str) -> Self {
        Self::from_fen(fen).unwrap_or_default()
    }

    pub fn to_fen(&self) -> String {
        Fen::from_position(self.pos.clone(), EnPassantMode::Legal).to_string()
    }

    /// Apply a legal move, returning the resulting snapshot.
    pub fn apply(&self, mv: &Move) -> Result<Self, CoreError> {
        self.pos
            .clone()
            .play(mv)
            .map(|pos| Self { pos })
            .map_err(|_| CoreError::IllegalMove(mv.to_string()))
    }

    /// Parse a SAN token against this position.
    pub fn parse_san(&self, san: &str) -> Result<Move, CoreError> {
        let parsed: SanPlus = san
            .parse()
            .map_err(|_| CoreError::IllegalMove(san.to_string()))?;
        parsed
            .san
            .to_move(&self.pos)
            .map_err(|_| CoreError::IllegalMove(san.to_string()))
    }

    /// Parse and apply a SAN token in one step.
    pub fn apply_san(&self, san: &str) -> Result<(Self, Move), CoreError> {
        let mv = self.parse_san(san)?;
        let next = self.apply(&mv)?;
        Ok((next, mv))
    }

    /// Render a move as SAN for this position.
    pub fn san(&self, mv: &Move) -> String {
        San::from_move(&self.pos, mv).to_string()
    }

    pub fn legal_moves(&self) -> MoveList {
        self.pos.legal_moves()
    }

    pub fn turn(&self) -> Color {
        self.pos.turn()
    }

    pub fn is_check(&self) -> bool {
        self.pos.is_check()
    }

    pub fn is_checkmate(&self) -> bool {
        self.pos.is_checkmate()
    }

    pub fn is_stalemate(&self) -> bool {
        self.pos.is_stalemate()
    }

    /// Remaining castling rights (0..=2) for one side.
    pub fn castling_rights(&self, color: Color) -> u32 {
        let castles = self.pos.castles();
        [CastlingSide::KingSide, CastlingSide::QueenSide]
            .iter()
            .filter(|&&side| castles.has(color, side))
            .count() as u32
    }

    /// Access to the underlying rules-engine position.
    pub fn position(&self) -> &Chess {
        &self.pos
    }
}

impl PartialEq for BoardState {
    fn eq(&self, other: &Self) -> bool {
        self.to_fen() == other.to_fen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_fen_round_trip_start() {
        let board = BoardState::start();
        assert_eq!(board.to_fen(), START_FEN);
        assert_eq!(BoardState::from_fen(START_FEN).unwrap(), board);
    }

    #[test]
    fn test_fen_round_trip_after_moves() {
        let board = BoardState::start();
        let (board, _) = board.apply_san("e4").unwrap();
        let (board, _) = board.apply_san("c5").unwrap();
        let (board, _) = board.apply_san("Nf3").unwrap();

        let fen = board.to_fen();
        let restored = BoardState::from_fen(&fen).unwrap();
        assert_eq!(restored, board);
        assert_eq!(restored.to_fen(), fen);
    }

    #[test]
    fn test_invalid_fen_rejected() {
        assert!(BoardState::from_fen("not a fen").is_err());
        assert!(BoardState::from_fen("8/8/8/8/8/8/8 w - - 0 1").is_err());
    }

    #[test]
    fn test_from_fen_or_start_falls_back() {
        let board = BoardState::from_fen_or_start("garbage");
        assert_eq!(board, BoardState::start());
    }

    #[test]
    fn test_illegal_san_rejected() {
        let board = BoardState::start();
        assert!(board.apply_san("Qxf7").is_err());
        assert!(board.apply_san("e5").is_err());
        assert!(board.apply_san("zzz").is_err());
    }

    #[test]
    fn test_castling_rights_counted() {
        let board = BoardState::start();
        assert_eq!(board.castling_rights(Color::White), 2);
        assert_eq!(board.castling_rights(Color::Black), 2);

        let board =
            BoardState::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w Kq - 0 1").unwrap();
        assert_eq!(board.castling_rights(Color::White), 1);
        assert_eq!(board.castling_rights(Color::Black), 1);
    }

    #[test]
    fn test_apply_does_not_mutate_source() {
        let board = BoardState::start();
        let (after, _) = board.apply_san("e4").unwrap();
        assert_eq!(board.to_fen(), START_FEN);
        assert_ne!(after.to_fen(), START_FEN);
    }
}
