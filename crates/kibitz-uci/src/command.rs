//! Commands sent from the GUI to the engine.

use std::fmt;
use std::time::Duration;

/// Parameters for the `go` command.
///
/// All fields are optional; a bare `go` leaves the limit to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    /// White's remaining time.
    pub wtime: Option<Duration>,
    /// Black's remaining time.
    pub btime: Option<Duration>,
    /// White's increment per move.
    pub winc: Option<Duration>,
    /// Black's increment per move.
    pub binc: Option<Duration>,
    /// Moves until next time control.
    pub movestogo: Option<u32>,
    /// Search to this depth only.
    pub depth: Option<u8>,
    /// Search for exactly this duration.
    pub movetime: Option<Duration>,
    /// Search this many nodes only.
    pub nodes: Option<u64>,
    /// Search until `stop` (no time limit).
    pub infinite: bool,
}

impl GoParams {
    /// Search for a fixed time per move.
    pub fn movetime(movetime: Duration) -> GoParams {
        GoParams {
            movetime: Some(movetime),
            ..GoParams::default()
        }
    }

    /// Search to a fixed depth.
    pub fn depth(depth: u8) -> GoParams {
        GoParams {
            depth: Some(depth),
            ..GoParams::default()
        }
    }

    /// Upper bound on how long the engine should need for this search.
    ///
    /// `None` when the search is not bounded by time.
    pub fn expected_duration(&self) -> Option<Duration> {
        if self.infinite {
            return None;
        }
        if let Some(movetime) = self.movetime {
            return Some(movetime);
        }
        match (self.wtime, self.btime) {
            (Some(w), Some(b)) => Some(w.max(b)),
            (Some(t), None) | (None, Some(t)) => Some(t),
            (None, None) => None,
        }
    }
}

impl fmt::Display for GoParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "go")?;
        let millis = [
            ("wtime", self.wtime),
            ("btime", self.btime),
            ("winc", self.winc),
            ("binc", self.binc),
        ];
        for (name, value) in millis {
            if let Some(value) = value {
                write!(f, " {name} {}", value.as_millis())?;
            }
        }
        if let Some(movestogo) = self.movestogo {
            write!(f, " movestogo {movestogo}")?;
        }
        if let Some(depth) = self.depth {
            write!(f, " depth {depth}")?;
        }
        if let Some(nodes) = self.nodes {
            write!(f, " nodes {nodes}")?;
        }
        if let Some(movetime) = self.movetime {
            write!(f, " movetime {}", movetime.as_millis())?;
        }
        if self.infinite {
            write!(f, " infinite")?;
        }
        Ok(())
    }
}

/// A position as the engine sees it: a start plus the moves played from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionSpec {
    /// Starting FEN, or `None` for `startpos`.
    pub fen: Option<String>,
    /// Moves in UCI notation, oldest first.
    pub moves: Vec<String>,
}

impl PositionSpec {
    /// The standard starting position with no moves.
    pub fn startpos() -> PositionSpec {
        PositionSpec::default()
    }

    /// A custom starting position with no moves.
    pub fn fen(fen: impl Into<String>) -> PositionSpec {
        PositionSpec {
            fen: Some(fen.into()),
            moves: Vec::new(),
        }
    }

    /// Append moves played after the start.
    pub fn with_moves<I, S>(mut self, moves: I) -> PositionSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.moves.extend(moves.into_iter().map(Into::into));
        self
    }
}

/// A command the GUI sends to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `uci` -- switch the engine to UCI mode.
    Uci,
    /// `isready` -- synchronization ping.
    IsReady,
    /// `ucinewgame` -- the next position belongs to a new game.
    UciNewGame,
    /// `setoption name <name> value <value>`.
    SetOption {
        /// Option name as advertised by the engine.
        name: String,
        /// Option value; empty for button options.
        value: String,
    },
    /// `position` -- set up the position to search.
    Position(PositionSpec),
    /// `go` -- start searching.
    Go(GoParams),
    /// `stop` -- halt the current search.
    Stop,
    /// `quit` -- exit the engine.
    Quit,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Uci => write!(f, "uci"),
            Command::IsReady => write!(f, "isready"),
            Command::UciNewGame => write!(f, "ucinewgame"),
            Command::SetOption { name, value } if value.is_empty() => {
                write!(f, "setoption name {name}")
            }
            Command::SetOption { name, value } => {
                write!(f, "setoption name {name} value {value}")
            }
            Command::Position(spec) => {
                match &spec.fen {
                    Some(fen) => write!(f, "position fen {fen}")?,
                    None => write!(f, "position startpos")?,
                }
                if !spec.moves.is_empty() {
                    write!(f, " moves {}", spec.moves.join(" "))?;
                }
                Ok(())
            }
            Command::Go(params) => write!(f, "{params}"),
            Command::Stop => write!(f, "stop"),
            Command::Quit => write!(f, "quit"),
        }
    }
}
