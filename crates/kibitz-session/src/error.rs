//! Session errors and move rejections.

use kibitz_core::{RulesError, Square};
use kibitz_uci::UciError;

/// Why a human move was not played. All rejections leave the game unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The game already ended.
    #[error("game is over")]
    GameOver,

    /// It is the engine's turn.
    #[error("not your turn")]
    NotHumanTurn,

    /// The move is not legal in the current position.
    #[error("Invalid move!")]
    Illegal {
        /// The rejected move in UCI notation.
        uci_move: String,
    },

    /// A pawn reaches the last rank; ask for the promotion piece and retry.
    #[error("choose a promotion piece")]
    NeedsPromotion {
        /// Origin of the pawn move.
        from: Square,
        /// Destination on the last rank.
        to: Square,
    },
}

/// Fatal session errors. The session cannot continue after one of these.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The configured start position is invalid.
    #[error("cannot set up the game: {0}")]
    Setup(#[from] RulesError),

    /// The engine process failed.
    #[error("engine failure: {0}")]
    Engine(#[from] UciError),

    /// The engine was asked to move on a human turn or after the game ended.
    #[error("engine asked to move out of turn")]
    NotEngineTurn,

    /// The engine claimed it has no move in a position that is not over.
    #[error("engine returned no move")]
    NoMove,

    /// The engine returned a move the rules provider rejected.
    #[error("engine played an illegal move: {uci_move}")]
    IllegalEngineMove {
        /// The move text as the engine sent it.
        uci_move: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn illegal_rejection_uses_notice_text() {
        let rejection = Rejection::Illegal {
            uci_move: "e2e5".to_string(),
        };
        assert_eq!(rejection.to_string(), "Invalid move!");
    }

    #[test]
    fn engine_error_wraps_uci_error() {
        let err: SessionError = UciError::EngineExited {
            status: "exit status: 1".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "engine failure: engine exited unexpectedly (exit status: 1)"
        );
    }
}
