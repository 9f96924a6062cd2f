//! Rules-provider seam: game state, move validation, and game-ending conditions.
//!
//! Move legality and position bookkeeping are delegated to [`shakmaty`];
//! this crate adds the move history, repetition tracking and the
//! draw-by-rule checks a playing session needs.

mod candidate;
mod error;
mod game;
mod status;

pub use candidate::{Candidate, PlayedMove};
pub use error::RulesError;
pub use game::{Game, Legality};
pub use status::{DrawReason, GameStatus};

pub use shakmaty::{Color, File, Piece, Rank, Role, Square};
