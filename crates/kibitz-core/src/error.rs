//! Errors reported by the rules provider.

/// Errors that occur when setting up a game or applying a move.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    /// The FEN string could not be parsed.
    #[error("invalid FEN: {fen}")]
    InvalidFen {
        /// The FEN string that failed to parse.
        fen: String,
    },

    /// The FEN parsed but describes an illegal position.
    #[error("illegal position: {reason}")]
    InvalidPosition {
        /// Why the position was rejected.
        reason: String,
    },

    /// A move string is not valid UCI notation.
    #[error("malformed move: {text}")]
    MalformedMove {
        /// The text that failed to parse.
        text: String,
    },

    /// The move is not legal in the current position.
    #[error("illegal move: {uci_move}")]
    IllegalMove {
        /// The rejected move in UCI notation.
        uci_move: String,
    },

    /// A pawn reaches the last rank but no promotion piece was given.
    #[error("move requires a promotion piece: {uci_move}")]
    NeedsPromotion {
        /// The incomplete move in UCI notation.
        uci_move: String,
    },
}

#[cfg(test)]
mod tests {
    use super::RulesError;

    #[test]
    fn illegal_move_display() {
        let err = RulesError::IllegalMove {
            uci_move: "e2e5".to_string(),
        };
        assert_eq!(format!("{err}"), "illegal move: e2e5");
    }

    #[test]
    fn invalid_fen_display() {
        let err = RulesError::InvalidFen {
            fen: "nonsense".to_string(),
        };
        assert_eq!(format!("{err}"), "invalid FEN: nonsense");
    }
}
