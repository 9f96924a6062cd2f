//! Parsing of engine-to-GUI messages.

use crate::error::UciError;

/// Engine evaluation from the side to move's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    /// Advantage in centipawns.
    Centipawns(i32),
    /// Mate in this many moves; negative when the side to move is mated.
    Mate(i32),
}

/// The fields of an `info` line the GUI cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchInfo {
    /// Search depth in plies.
    pub depth: Option<u32>,
    /// Evaluation of the best line.
    pub score: Option<Score>,
    /// Nodes searched.
    pub nodes: Option<u64>,
    /// Principal variation, in UCI notation.
    pub pv: Vec<String>,
}

/// The engine's answer to a `go` command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BestMove {
    /// The chosen move in UCI notation; `None` if the engine has no move.
    pub best: Option<String>,
    /// The move the engine expects in reply.
    pub ponder: Option<String>,
    /// The last `info` reported during the search.
    pub info: Option<SearchInfo>,
}

/// A parsed engine message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineMessage {
    /// `id name <name>`.
    IdName(String),
    /// `id author <author>`.
    IdAuthor(String),
    /// `uciok` -- the engine finished identifying itself.
    UciOk,
    /// `readyok` -- answer to `isready`.
    ReadyOk,
    /// `option name <name> ...` -- an option the engine supports.
    Option {
        /// Option name.
        name: String,
    },
    /// `info ...` -- search progress.
    Info(SearchInfo),
    /// `bestmove <move> [ponder <move>]`.
    BestMove {
        /// The chosen move; `None` for `0000` or `(none)`.
        best: Option<String>,
        /// Expected reply.
        ponder: Option<String>,
    },
    /// Anything else (ignored per UCI convention).
    Unknown(String),
}

/// Parse a single line of engine output into an [`EngineMessage`].
pub fn parse_message(line: &str) -> Result<EngineMessage, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(EngineMessage::Unknown(String::new()));
    }

    match tokens[0] {
        "uciok" => Ok(EngineMessage::UciOk),
        "readyok" => Ok(EngineMessage::ReadyOk),
        "id" => Ok(parse_id(&tokens[1..], line)),
        "option" => Ok(parse_option(&tokens[1..], line)),
        "info" => parse_info(&tokens[1..], line).map(EngineMessage::Info),
        "bestmove" => parse_bestmove(&tokens[1..], line),
        _ => Ok(EngineMessage::Unknown(line.to_string())),
    }
}

fn parse_id(tokens: &[&str], line: &str) -> EngineMessage {
    match tokens.split_first() {
        Some((&"name", rest)) => EngineMessage::IdName(rest.join(" ")),
        Some((&"author", rest)) => EngineMessage::IdAuthor(rest.join(" ")),
        _ => EngineMessage::Unknown(line.to_string()),
    }
}

/// `option name <words...> type <kind> ...` -- option names may contain spaces.
fn parse_option(tokens: &[&str], line: &str) -> EngineMessage {
    if tokens.first() != Some(&"name") {
        return EngineMessage::Unknown(line.to_string());
    }
    let name: Vec<&str> = tokens[1..]
        .iter()
        .take_while(|t| **t != "type")
        .copied()
        .collect();
    if name.is_empty() {
        return EngineMessage::Unknown(line.to_string());
    }
    EngineMessage::Option {
        name: name.join(" "),
    }
}

/// Parse the `info` arguments.
///
/// Supports: depth, nodes, score cp/mate (bounds ignored), pv.
/// `string` consumes the rest of the line; unknown tokens are skipped.
fn parse_info(tokens: &[&str], line: &str) -> Result<SearchInfo, UciError> {
    let mut info = SearchInfo::default();

    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            "depth" => {
                info.depth = Some(parse_value(tokens.get(i + 1), line)?);
                i += 2;
            }
            "nodes" => {
                info.nodes = Some(parse_value(tokens.get(i + 1), line)?);
                i += 2;
            }
            "score" => {
                let value = parse_value(tokens.get(i + 2), line)?;
                info.score = match tokens.get(i + 1) {
                    Some(&"cp") => Some(Score::Centipawns(value)),
                    Some(&"mate") => Some(Score::Mate(value)),
                    _ => return Err(malformed(line)),
                };
                i += 3;
            }
            "pv" => {
                info.pv = tokens[i + 1..].iter().map(|m| m.to_string()).collect();
                break;
            }
            "string" => break,
            _ => {
                // Unknown token -- skip per UCI convention
                i += 1;
            }
        }
    }

    Ok(info)
}

fn parse_bestmove(tokens: &[&str], line: &str) -> Result<EngineMessage, UciError> {
    let best = tokens.first().ok_or_else(|| malformed(line))?;
    let best = match *best {
        "0000" | "(none)" => None,
        mv => Some(mv.to_string()),
    };
    let ponder = match tokens.get(1) {
        Some(&"ponder") => tokens.get(2).map(|m| m.to_string()),
        _ => None,
    };
    Ok(EngineMessage::BestMove { best, ponder })
}

fn parse_value<T: std::str::FromStr>(token: Option<&&str>, line: &str) -> Result<T, UciError> {
    let value = token.ok_or_else(|| malformed(line))?;
    value.parse().map_err(|_| malformed(line))
}

fn malformed(line: &str) -> UciError {
    UciError::MalformedMessage {
        line: line.to_string(),
    }
}
