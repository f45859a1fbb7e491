pub mod config;
pub mod error;
pub mod eval;
pub mod oracle;
pub mod pipeline;
pub mod search;
pub mod tactics;

pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use oracle::{HttpOracle, LocalOracle, Oracle, OracleError, OracleRequest, OracleResponse};
pub use pipeline::{analyze_game, CancelFlag, GameAnalysisResult, MoveEvaluation, TacticalOpportunity};
