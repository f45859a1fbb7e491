//! Game analysis pipeline: drives per-move evaluation across a whole game
//! for one target side, integrating an oracle with rate limiting, timeouts,
//! and cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use shakmaty::{uci::UciMove, Color, Move};
use tracing::{info, warn};

use chess_core::{pgn, BoardState};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::eval;
use crate::oracle::{Oracle, OracleRequest, OracleResponse};
use crate::tactics::{self, Severity, TacticalLabel};

/// Cooperative cancellation handle, checked between plies. Evaluations
/// produced before the flag flips stay valid and are returned.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveEvaluation {
    pub ply: usize,
    pub san: String,
    /// White-perspective centipawns
    pub eval_cp: i32,
    pub mate: Option<i32>,
    pub best_move: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TacticalOpportunity {
    pub move_number: u32,
    pub fen_before: String,
    pub played: String,
    pub best_move: String,
    pub tactic: TacticalLabel,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameAnalysisResult {
    pub game_id: String,
    pub game_text: String,
    pub evaluations: Vec<MoveEvaluation>,
    pub opportunities: Vec<TacticalOpportunity>,
    pub log_lines: Vec<String>,
    pub total_moves: usize,
    pub blunder: bool,
}

/// Analyze one game for the given target side.
///
/// Plies of the other side, and target plies past the analyzed-ply cap, are
/// applied to the running position without evaluation. Oracle failures and
/// timeouts degrade to a neutral evaluation for that ply; only unusable game
/// text or an illegal move in the validated record fail the request.
pub async fn analyze_game<O: Oracle>(
    oracle: &O,
    config: &AnalysisConfig,
    game_id: &str,
    game_text: &str,
    target: Color,
    cancel: &CancelFlag,
) -> Result<GameAnalysisResult, AnalysisError> {
    let record = pgn::parse_game_text(game_text)?;
    let total_moves = record.moves.len();

    info!(game_id, total_moves, side = %target_name(target), "Starting game analysis");

    let mut board = BoardState::start();
    let mut evaluations: Vec<MoveEvaluation> = Vec::new();
    let mut opportunities: Vec<TacticalOpportunity> = Vec::new();
    let mut log_lines: Vec<String> = Vec::new();
    let mut last_call: Option<Instant> = None;

    if total_moves == 0 {
        log_lines.push("No moves to analyze".to_string());
    }

    for (ply, san) in record.moves.iter().enumerate() {
        if cancel.is_cancelled() {
            warn!(game_id, analyzed = evaluations.len(), "Analysis cancelled");
            log_lines.push(format!(
                "Analysis cancelled after {} evaluated plies",
                evaluations.len()
            ));
            break;
        }

        // The record was validated during parsing, so a rejected token here
        // means the game is corrupt. Fatal for this game; no substitutions.
        let mv = board.parse_san(san)?;

        if board.turn() != target || evaluations.len() >= config.max_analyzed_plies {
            board = board.apply(&mv)?;
            continue;
        }

        let before = board.clone();
        let response = query_oracle(oracle, config, &before, &mut last_call).await;
        board = before.apply(&mv)?;

        let move_number = (ply / 2 + 1) as u32;
        log_lines.push(format!(
            "Move {}: {:<7} | Eval: {}",
            move_number,
            san,
            format_eval(response.eval_cp, response.mate)
        ));

        if let Some(suggested) = response.best_move.as_deref() {
            if let Some(opp) = detect_opportunity(
                config,
                &before,
                &mv,
                san,
                suggested,
                response.eval_cp,
                move_number,
            ) {
                opportunities.push(opp);
            }
        }

        evaluations.push(MoveEvaluation {
            ply,
            san: san.clone(),
            eval_cp: response.eval_cp,
            mate: response.mate,
            best_move: response.best_move,
        });
    }

    let evals: Vec<i32> = evaluations.iter().map(|e| e.eval_cp).collect();
    let blunder = has_blunder(&evals, config.blunder_threshold_cp);

    info!(
        game_id,
        total_moves,
        analyzed = evaluations.len(),
        opportunities = opportunities.len(),
        blunder,
        "Game analysis complete"
    );

    Ok(GameAnalysisResult {
        game_id: game_id.to_string(),
        game_text: game_text.to_string(),
        evaluations,
        opportunities,
        log_lines,
        total_moves,
        blunder,
    })
}

/// One rate-limited, timeout-bounded oracle query. Failures never escape:
/// they degrade to the neutral response.
async fn query_oracle<O: Oracle>(
    oracle: &O,
    config: &AnalysisConfig,
    board: &BoardState,
    last_call: &mut Option<Instant>,
) -> OracleResponse {
    if let Some(prev) = *last_call {
        let spacing = Duration::from_millis(config.min_oracle_spacing_ms);
        let elapsed = prev.elapsed();
        if elapsed < spacing {
            tokio::time::sleep(spacing - elapsed).await;
        }
    }
    *last_call = Some(Instant::now());

    let req = OracleRequest {
        fen: board.to_fen(),
        depth: config.oracle_depth,
    };

    match tokio::time::timeout(
        Duration::from_millis(config.oracle_timeout_ms),
        oracle.evaluate(&req),
    )
    .await
    {
        Ok(Ok(resp)) => resp,
        Ok(Err(e)) => {
            warn!(error = %e, "Oracle query failed, using neutral evaluation");
            OracleResponse::neutral()
        }
        Err(_) => {
            warn!(
                timeout_ms = config.oracle_timeout_ms,
                "Oracle query timed out, using neutral evaluation"
            );
            OracleResponse::neutral()
        }
    }
}

/// Compare the oracle's suggestion with the move actually played and emit an
/// opportunity when following the suggestion would have swung the evaluation
/// past the threshold. Any failure here (unparseable suggestion, no tactical
/// label) drops the opportunity for this ply only.
fn detect_opportunity(
    config: &AnalysisConfig,
    before: &BoardState,
    played: &Move,
    played_san: &str,
    suggested: &str,
    eval_before: i32,
    move_number: u32,
) -> Option<TacticalOpportunity> {
    let suggestion = parse_move_text(before, suggested)?;
    if suggestion == *played {
        return None;
    }

    let after_suggested = before.apply(&suggestion).ok()?;
    let delta = (eval::evaluate(after_suggested.position()) - eval_before).abs();
    if delta <= config.opportunity_threshold_cp {
        return None;
    }

    let labels = tactics::classify(before.position(), &suggestion);
    let tactic = labels.first().copied()?;

    Some(TacticalOpportunity {
        move_number,
        fen_before: before.to_fen(),
        played: played_san.to_string(),
        best_move: before.san(&suggestion),
        tactic,
        severity: Severity::for_delta(delta),
    })
}

/// Oracles answer in UCI or SAN depending on the backend; accept either.
fn parse_move_text(board: &BoardState, text: &str) -> Option<Move> {
    if let Ok(uci) = text.parse::<UciMove>() {
        if let Ok(mv) = uci.to_move(board.position()) {
            return Some(mv);
        }
    }
    board.parse_san(text).ok()
}

/// True iff any two chronologically adjacent evaluations differ by more
/// than the threshold.
pub fn has_blunder(evals: &[i32], threshold_cp: i32) -> bool {
    evals
        .windows(2)
        .any(|pair| (pair[1] - pair[0]).abs() > threshold_cp)
}

fn format_eval(eval_cp: i32, mate: Option<i32>) -> String {
    match mate {
        Some(n) => format!("#{n}"),
        None => format!("{:+.2}", f64::from(eval_cp) / 100.0),
    }
}

fn target_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blunder_flag_on_big_swing() {
        assert!(has_blunder(&[0, 50, -200], 100));
    }

    #[test]
    fn test_no_blunder_flag_on_small_swings() {
        assert!(!has_blunder(&[0, 50, 90], 100));
        assert!(!has_blunder(&[], 100));
        assert!(!has_blunder(&[500], 100));
    }

    #[test]
    fn test_format_eval() {
        assert_eq!(format_eval(150, None), "+1.50");
        assert_eq!(format_eval(-37, None), "-0.37");
        assert_eq!(format_eval(0, None), "+0.00");
        assert_eq!(format_eval(0, Some(3)), "#3");
    }

    #[test]
    fn test_parse_move_text_accepts_uci_and_san() {
        let board = BoardState::start();
        let uci = parse_move_text(&board, "e2e4").unwrap();
        let san = parse_move_text(&board, "e4").unwrap();
        assert_eq!(uci, san);
        assert!(parse_move_text(&board, "nonsense").is_none());
    }
}
