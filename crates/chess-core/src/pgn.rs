//! Game text parsing — strict streaming loader with a regex-based fallback
//! extractor for malformed input.

use pgn_reader::{BufferedReader, RawHeader, SanPlus, Skip, Visitor};
use regex::Regex;
use shakmaty::{Chess, Position};

use crate::error::CoreError;
use crate::game_data::{GameMetadata, GameRecord};
use crate::position::BoardState;

/// SAN plus castling token pattern shared by the fallback extractor.
const MOVE_PATTERN: &str = r"[KQRBN]?[a-h]?[1-8]?x?[a-h][1-8](?:=[QRBN])?[+#]?|O-O-O|O-O";

/// Parse portable game text into a validated `GameRecord`.
///
/// The strict loader runs first; any token it cannot replay fails the whole
/// strict pass and the fallback extractor takes over. The fallback truncates
/// at the first illegal token instead of failing, so a malformed game still
/// yields its legal prefix. Only empty or entirely unparseable text is an
/// error.
pub fn parse_game_text(text: &str) -> Result<GameRecord, CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::InvalidGameText("empty game text".to_string()));
    }

    if let Some(record) = load_strict(text) {
        return Ok(record);
    }

    let tokens = fallback_moves(text);
    let moves = replay_tokens(&tokens);
    let metadata = extract_metadata(text);

    if moves.is_empty() && !has_headers(text) {
        return Err(CoreError::InvalidGameText(
            "no parsable headers or moves".to_string(),
        ));
    }

    Ok(GameRecord {
        metadata,
        moves,
        pgn: text.to_string(),
    })
}

/// Strict primary path: stream the text through the PGN reader and replay
/// every SAN against a running position. Any rejected token fails the pass.
fn load_strict(text: &str) -> Option<GameRecord> {
    struct StrictLoader {
        board: Chess,
        moves: Vec<String>,
        metadata: GameMetadata,
        saw_header: bool,
        failed: bool,
    }

    impl Visitor for StrictLoader {
        type Result = ();

        fn begin_game(&mut self) {
            self.board = Chess::default();
        }

        fn header(&mut self, name: &[u8], value: RawHeader<'_>) {
            let (key, value) = match (
                std::str::from_utf8(name),
                std::str::from_utf8(value.as_bytes()),
            ) {
                (Ok(k), Ok(v)) => (k, v.trim_matches('"').to_string()),
                _ => return,
            };
            self.saw_header = true;
            match key {
                "White" => self.metadata.white = value,
                "Black" => self.metadata.black = value,
                "Result" => self.metadata.result = value,
                "Date" => self.metadata.date = Some(value),
                "Event" => self.metadata.event = Some(value),
                _ => {}
            }
        }

        fn begin_variation(&mut self) -> Skip {
            Skip(true)
        }

        fn san(&mut self, sp: SanPlus) {
            if self.failed {
                return;
            }
            match sp.san.to_move(&self.board) {
                Ok(mv) => {
                    self.moves.push(sp.to_string());
                    self.board.play_unchecked(&mv);
                }
                Err(_) => self.failed = true,
            }
        }

        fn end_game(&mut self) {}
    }

    let mut loader = StrictLoader {
        board: Chess::default(),
        moves: Vec::new(),
        metadata: GameMetadata::default(),
        saw_header: false,
        failed: false,
    };

    let mut reader = BufferedReader::new_cursor(text);
    match reader.read_game(&mut loader) {
        Ok(Some(())) if !loader.failed && (loader.saw_header || !loader.moves.is_empty()) => {
            Some(GameRecord {
                metadata: loader.metadata,
                moves: loader.moves,
                pgn: text.to_string(),
            })
        }
        _ => None,
    }
}

/// Fallback tokenizer: line-classify headers vs movetext, keep text trailing
/// a header's closing bracket, strip result markers, then match SAN and
/// castling tokens. Tokens are not validated here; see `replay_tokens`.
pub fn fallback_moves(text: &str) -> Vec<String> {
    let header_re = Regex::new(r#"^\[\w+\s+"[^"]*"\]"#).unwrap();
    let move_re = Regex::new(MOVE_PATTERN).unwrap();

    let mut movetext = String::new();
    for line in text.lines() {
        let mut rest = line.trim();
        // Anything after a header's closing bracket on the same line counts
        // as movetext.
        while let Some(m) = header_re.find(rest) {
            rest = rest[m.end()..].trim_start();
        }
        let rest = rest
            .trim_end_matches("1/2-1/2")
            .trim_end_matches("1-0")
            .trim_end_matches("0-1")
            .trim_end_matches('*')
            .trim();
        if rest.is_empty() {
            continue;
        }
        movetext.push_str(rest);
        movetext.push(' ');
    }

    move_re
        .find_iter(&movetext)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Replay extracted tokens from the starting position. The first token the
/// rules engine rejects truncates the list; everything after it is dropped.
fn replay_tokens(tokens: &[String]) -> Vec<String> {
    let mut board = BoardState::start();
    let mut moves = Vec::with_capacity(tokens.len());
    for token in tokens {
        match board.apply_san(token) {
            Ok((next, _)) => {
                board = next;
                moves.push(token.clone());
            }
            Err(_) => break,
        }
    }
    moves
}

fn has_headers(text: &str) -> bool {
    let header_re = Regex::new(r#"\[\w+\s+"[^"]*"\]"#).unwrap();
    header_re.is_match(text)
}

fn extract_metadata(text: &str) -> GameMetadata {
    let mut metadata = GameMetadata::default();
    if let Some(v) = extract_header(text, "White") {
        metadata.white = v;
    }
    if let Some(v) = extract_header(text, "Black") {
        metadata.black = v;
    }
    if let Some(v) = extract_header(text, "Result") {
        metadata.result = v;
    }
    metadata.date = extract_header(text, "Date");
    metadata.event = extract_header(text, "Event");
    metadata
}

/// Extract a string value from a PGN header (e.g. Event, WhiteTitle).
pub fn extract_header(pgn: &str, header_name: &str) -> Option<String> {
    let pattern = format!(r#"\[{}\s+"([^"]*)"\]"#, regex::escape(header_name));
    let re = Regex::new(&pattern).ok()?;
    let value = re.captures(pgn)?.get(1)?.as_str().to_string();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Extract an integer value from a PGN header (e.g. WhiteElo).
pub fn extract_header_int(pgn: &str, header_name: &str) -> Option<i32> {
    let pattern = format!(r#"\[{}\s+"(\d+)"\]"#, regex::escape(header_name));
    let re = Regex::new(&pattern).ok()?;
    re.captures(pgn)?.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed_pgn() {
        let pgn = r#"[Event "Club Championship"]
[White "Player1"]
[Black "Player2"]
[Result "1-0"]
[Date "2025.01.15"]

1. e4 e5 2. Nf3 Nc6 1-0"#;

        let record = parse_game_text(pgn).unwrap();
        assert_eq!(record.metadata.white, "Player1");
        assert_eq!(record.metadata.black, "Player2");
        assert_eq!(record.metadata.result, "1-0");
        assert_eq!(record.metadata.event.as_deref(), Some("Club Championship"));
        assert_eq!(record.moves.len(), 4);
        assert_eq!(record.moves[0], "e4");
    }

    #[test]
    fn test_fallback_header_with_trailing_movetext() {
        let tokens = fallback_moves(r#"[Event "Test"] 1. e4 e5 2. Nf3"#);
        assert_eq!(tokens, vec!["e4", "e5", "Nf3"]);
    }

    #[test]
    fn test_parse_header_with_trailing_movetext() {
        let record = parse_game_text(r#"[Event "Test"] 1. e4 e5 2. Nf3"#).unwrap();
        assert_eq!(record.moves, vec!["e4", "e5", "Nf3"]);
    }

    #[test]
    fn test_fallback_strips_result_tokens() {
        let tokens = fallback_moves("1. e4 e5 1/2-1/2");
        assert_eq!(tokens, vec!["e4", "e5"]);
    }

    #[test]
    fn test_truncation_at_first_illegal_token() {
        // Ra5 is blocked by the a2 pawn; everything after it is discarded.
        let record = parse_game_text("1. e4 e5 2. Ra5 Nc6 3. d4").unwrap();
        assert_eq!(record.moves, vec!["e4", "e5"]);
    }

    #[test]
    fn test_empty_text_is_an_error() {
        assert!(parse_game_text("").is_err());
        assert!(parse_game_text("   \n  ").is_err());
    }

    #[test]
    fn test_unparseable_text_is_an_error() {
        assert!(parse_game_text("hello world, nothing chess-like here").is_err());
    }

    #[test]
    fn test_headers_only_yields_zero_moves() {
        let record = parse_game_text(r#"[Event "Abandoned"] [White "A"] [Black "B"]"#).unwrap();
        assert_eq!(record.moves.len(), 0);
        assert_eq!(record.metadata.event.as_deref(), Some("Abandoned"));
    }

    #[test]
    fn test_extract_header_int() {
        let pgn = r#"[WhiteElo "1500"]
[BlackElo "1600"]"#;

        assert_eq!(extract_header_int(pgn, "WhiteElo"), Some(1500));
        assert_eq!(extract_header_int(pgn, "BlackElo"), Some(1600));
        assert_eq!(extract_header_int(pgn, "Missing"), None);
    }
}
