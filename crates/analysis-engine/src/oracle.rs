//! Engine oracle boundary: one request/response interface over
//! interchangeable backends (local heuristic engine or an HTTP analysis
//! service).

use std::time::Instant;

use serde::Deserialize;
use thiserror::Error;

use chess_core::BoardState;

use crate::{eval, search};

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Oracle timed out")]
    Timeout,

    #[error("Oracle unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone)]
pub struct OracleRequest {
    pub fen: String,
    pub depth: u32,
}

/// Evaluation of one position, White-positive centipawns. Fields the backend
/// could not supply stay at their neutral defaults.
#[derive(Debug, Clone, Default)]
pub struct OracleResponse {
    pub eval_cp: i32,
    pub mate: Option<i32>,
    pub best_move: Option<String>,
    pub nodes: Option<u64>,
    pub elapsed_ms: Option<u64>,
}

impl OracleResponse {
    /// The value a failed or timed-out query degrades to.
    pub fn neutral() -> Self {
        Self::default()
    }
}

pub trait Oracle {
    async fn evaluate(&self, req: &OracleRequest) -> Result<OracleResponse, OracleError>;
}

/// In-process oracle: heuristic evaluator plus the one-ply search.
#[derive(Debug, Clone, Default)]
pub struct LocalOracle;

impl Oracle for LocalOracle {
    async fn evaluate(&self, req: &OracleRequest) -> Result<OracleResponse, OracleError> {
        let started = Instant::now();
        let board = BoardState::from_fen_or_start(&req.fen);
        let eval_cp = eval::evaluate(board.position());
        let best_move = search::best_move(board.position()).map(|mv| board.san(&mv));
        Ok(OracleResponse {
            eval_cp,
            mate: None,
            best_move,
            nodes: Some(board.legal_moves().len() as u64),
            elapsed_ms: Some(started.elapsed().as_millis() as u64),
        })
    }
}

/// Wire shape of the HTTP analysis service. Every field is optional so a
/// malformed reply degrades instead of erroring.
#[derive(Debug, Deserialize)]
struct WireResponse {
    success: Option<bool>,
    evaluation: Option<f64>,
    mate: Option<i32>,
    bestmove: Option<String>,
}

/// Oracle backed by a stockfish.online-style HTTP evaluation endpoint.
pub struct HttpOracle {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpOracle {
    pub fn new(endpoint: &str) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .user_agent("TourneyPrep/1.0")
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| OracleError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

impl Oracle for HttpOracle {
    async fn evaluate(&self, req: &OracleRequest) -> Result<OracleResponse, OracleError> {
        let started = Instant::now();

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("fen", req.fen.clone()), ("depth", req.depth.to_string())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout
                } else {
                    OracleError::Unavailable(e.to_string())
                }
            })?;

        if !resp.status().is_success() {
            return Err(OracleError::Unavailable(format!("HTTP {}", resp.status())));
        }

        let wire: WireResponse = resp
            .json()
            .await
            .map_err(|e| OracleError::Unavailable(format!("Bad response body: {e}")))?;

        if wire.success == Some(false) {
            return Err(OracleError::Unavailable(
                "engine reported failure".to_string(),
            ));
        }

        // Evaluation arrives in pawns, White-positive.
        let eval_cp = wire
            .evaluation
            .map(|pawns| (pawns * 100.0).round() as i32)
            .unwrap_or(0);

        Ok(OracleResponse {
            eval_cp,
            mate: wire.mate,
            best_move: wire.bestmove.as_deref().and_then(parse_bestmove_token),
            nodes: None,
            elapsed_ms: Some(started.elapsed().as_millis() as u64),
        })
    }
}

/// The service echoes a whole engine line ("bestmove e2e4 ponder e7e5");
/// the move itself is the token after "bestmove".
fn parse_bestmove_token(raw: &str) -> Option<String> {
    let mut parts = raw.split_whitespace();
    match parts.next() {
        Some("bestmove") => parts.next().map(str::to_string),
        Some(first) => Some(first.to_string()),
        None => None,
    }
}
