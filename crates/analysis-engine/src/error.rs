//! Analysis error types

use chess_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid game text: {0}")]
    InvalidGameText(String),

    #[error("Illegal move during analysis: {0}")]
    IllegalMove(String),
}

impl From<CoreError> for AnalysisError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidGameText(s) => AnalysisError::InvalidGameText(s),
            CoreError::IllegalMove(s) => AnalysisError::IllegalMove(s),
            // Malformed FEN never reaches the pipeline boundary except via
            // game text, so it reports as a game-text problem.
            CoreError::InvalidFen(s) => AnalysisError::InvalidGameText(s),
        }
    }
}
