//! Pipeline configuration from environment variables

use std::env;

#[derive(Clone, Debug)]
pub struct AnalysisConfig {
    /// Hard cap on analyzed plies per game (bounds external-call volume)
    pub max_analyzed_plies: usize,

    /// Eval delta (centipawns) above which a tactical opportunity is emitted
    pub opportunity_threshold_cp: i32,

    /// Adjacent-eval delta (centipawns) that flags a game as containing a blunder
    pub blunder_threshold_cp: i32,

    /// Minimum spacing between consecutive oracle calls, in milliseconds
    pub min_oracle_spacing_ms: u64,

    /// Per-call oracle timeout, in milliseconds
    pub oracle_timeout_ms: u64,

    /// Search depth passed to the oracle
    pub oracle_depth: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_analyzed_plies: 30,
            opportunity_threshold_cp: 100,
            blunder_threshold_cp: 100,
            min_oracle_spacing_ms: 300,
            oracle_timeout_ms: 10_000,
            oracle_depth: 15,
        }
    }
}

impl AnalysisConfig {
    /// Load configuration, with environment variables overriding the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_analyzed_plies = env::var("MAX_ANALYZED_PLIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_analyzed_plies);

        let opportunity_threshold_cp = env::var("OPPORTUNITY_THRESHOLD_CP")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.opportunity_threshold_cp);

        let blunder_threshold_cp = env::var("BLUNDER_THRESHOLD_CP")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.blunder_threshold_cp);

        let min_oracle_spacing_ms = env::var("MIN_ORACLE_SPACING_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.min_oracle_spacing_ms);

        let oracle_timeout_ms = env::var("ORACLE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.oracle_timeout_ms);

        let oracle_depth = env::var("ORACLE_DEPTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.oracle_depth);

        Self {
            max_analyzed_plies,
            opportunity_threshold_cp,
            blunder_threshold_cp,
            min_oracle_spacing_ms,
            oracle_timeout_ms,
            oracle_depth,
        }
    }
}
