//! Game analysis CLI
//!
//! Reads a PGN from a file (or stdin) and prints the per-move report for one
//! side, using the local heuristic oracle unless an HTTP endpoint is given.

use std::io::Read;

use anyhow::{bail, Context, Result};
use shakmaty::Color;
use tracing::info;

use analysis_engine::{analyze_game, AnalysisConfig, CancelFlag, HttpOracle, LocalOracle};

struct CliArgs {
    pgn_path: Option<String>,
    side: Color,
    oracle_url: Option<String>,
    game_id: String,
}

fn parse_args() -> Result<CliArgs> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut pgn_path = None;
    let mut side = Color::White;
    let mut oracle_url = None;
    let mut game_id = "local".to_string();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--side" => {
                i += 1;
                side = match args.get(i).map(String::as_str) {
                    Some("white") => Color::White,
                    Some("black") => Color::Black,
                    other => bail!("--side must be white or black, got {other:?}"),
                };
            }
            "--oracle-url" => {
                i += 1;
                oracle_url = Some(args.get(i).context("--oracle-url needs a value")?.clone());
            }
            "--game-id" => {
                i += 1;
                game_id = args.get(i).context("--game-id needs a value")?.clone();
            }
            other => pgn_path = Some(other.to_string()),
        }
        i += 1;
    }

    Ok(CliArgs {
        pgn_path,
        side,
        oracle_url,
        game_id,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    let args = parse_args()?;

    let game_text = match &args.pgn_path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?
        }
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            buf
        }
    };

    let config = AnalysisConfig::from_env();
    let cancel = CancelFlag::new();

    let result = match &args.oracle_url {
        Some(url) => {
            info!(url = %url, "Using HTTP oracle");
            let oracle = HttpOracle::new(url)?;
            analyze_game(&oracle, &config, &args.game_id, &game_text, args.side, &cancel).await?
        }
        None => {
            info!("Using local heuristic oracle");
            let oracle = LocalOracle;
            analyze_game(&oracle, &config, &args.game_id, &game_text, args.side, &cancel).await?
        }
    };

    for line in &result.log_lines {
        println!("{line}");
    }
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
