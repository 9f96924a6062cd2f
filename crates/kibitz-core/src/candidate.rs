//! Candidate moves built from user input or engine output.

use std::fmt;

use shakmaty::{Color, Role, Square};

/// A proposed move: origin, destination, and an optional promotion piece.
///
/// Candidates are not validated; [`Game::legality`](crate::Game::legality)
/// decides whether one may be played. Castling is expressed as the king's
/// two-square move (`e1g1`), as in UCI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Candidate {
    /// Square the piece moves from.
    pub from: Square,
    /// Square the piece moves to.
    pub to: Square,
    /// Piece a pawn promotes to, if any.
    pub promotion: Option<Role>,
}

impl Candidate {
    /// Create a candidate without promotion.
    #[inline]
    pub const fn new(from: Square, to: Square) -> Candidate {
        Candidate {
            from,
            to,
            promotion: None,
        }
    }

    /// Return a copy of this candidate promoting to `role`.
    #[inline]
    pub const fn with_promotion(self, role: Role) -> Candidate {
        Candidate {
            promotion: Some(role),
            ..self
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(role) = self.promotion {
            write!(f, "{}", role.char())?;
        }
        Ok(())
    }
}

/// A move that passed validation and was applied to the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedMove {
    /// The move as it was requested.
    pub candidate: Candidate,
    /// The side that made the move.
    pub side: Color,
    /// UCI notation, as sent to engines.
    pub uci: String,
    /// Standard algebraic notation with check/mate suffix.
    pub san: String,
}
