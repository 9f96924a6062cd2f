//! Game status as reported by the rules provider.

use std::fmt;

use shakmaty::Color;

/// Return the lowercase name of a color.
pub(crate) const fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

/// Why a game ended in a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawReason {
    /// Neither side can possibly deliver mate.
    InsufficientMaterial,
    /// 100 half-moves without a capture or pawn move.
    FiftyMoves,
    /// The same position occurred three times.
    Repetition,
}

impl fmt::Display for DrawReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawReason::InsufficientMaterial => write!(f, "insufficient material"),
            DrawReason::FiftyMoves => write!(f, "fifty-move rule"),
            DrawReason::Repetition => write!(f, "threefold repetition"),
        }
    }
}

/// Whether the game is still running, and how it ended if not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStatus {
    /// The side to move has at least one legal move and no draw rule applies.
    Ongoing,
    /// The side to move is mated.
    Checkmate {
        /// The side that delivered mate.
        winner: Color,
    },
    /// The side to move has no legal moves and is not in check.
    Stalemate,
    /// The game is drawn by rule.
    Draw(DrawReason),
}

impl GameStatus {
    /// Return `true` if the game has ended.
    #[inline]
    pub const fn is_over(self) -> bool {
        !matches!(self, GameStatus::Ongoing)
    }

    /// Return the winner, if the game ended decisively.
    #[inline]
    pub const fn winner(self) -> Option<Color> {
        match self {
            GameStatus::Checkmate { winner } => Some(winner),
            _ => None,
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Ongoing => write!(f, "ongoing"),
            GameStatus::Checkmate { winner } => {
                write!(f, "checkmate, {} wins", color_name(*winner))
            }
            GameStatus::Stalemate => write!(f, "stalemate"),
            GameStatus::Draw(reason) => write!(f, "draw by {reason}"),
        }
    }
}
