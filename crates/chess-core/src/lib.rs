pub mod error;
pub mod game_data;
pub mod pgn;
pub mod position;

pub use error::CoreError;
pub use game_data::{GameMetadata, GameRecord};
pub use position::BoardState;
