//! Game state: the current position plus everything needed to report it to
//! an engine and to detect draws by rule.

use std::collections::HashMap;

use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::uci::UciMove;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Piece, Position, Role, Square};
use tracing::debug;

use crate::candidate::{Candidate, PlayedMove};
use crate::error::RulesError;
use crate::status::{DrawReason, GameStatus};

/// Half-move clock value at which the fifty-move rule ends the game.
const FIFTY_MOVE_PLIES: u32 = 100;

/// Number of occurrences of one position that ends the game.
const REPETITION_LIMIT: u32 = 3;

/// Result of checking a [`Candidate`] against the current position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Legality {
    /// The move is legal and resolves to this rules-level move.
    Legal(Move),
    /// A pawn reaches the last rank and a promotion piece must be chosen.
    NeedsPromotion,
    /// The move is not legal.
    Illegal,
}

/// One game of chess from a fixed starting position.
///
/// The position itself is owned by the rules provider; `Game` only applies
/// moves the provider has confirmed as legal.
#[derive(Debug, Clone)]
pub struct Game {
    position: Chess,
    start_fen: Option<String>,
    history: Vec<PlayedMove>,
    repetitions: HashMap<Zobrist64, u32>,
}

impl Game {
    /// Create a game from the standard starting position.
    pub fn new() -> Game {
        Game::with_position(Chess::default(), None)
    }

    /// Create a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Game, RulesError> {
        let fen = fen.trim();
        let parsed: Fen = fen.parse().map_err(|_| RulesError::InvalidFen {
            fen: fen.to_string(),
        })?;
        let position: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|err| RulesError::InvalidPosition {
                reason: err.to_string(),
            })?;
        Ok(Game::with_position(position, Some(fen.to_string())))
    }

    fn with_position(position: Chess, start_fen: Option<String>) -> Game {
        let mut game = Game {
            position,
            start_fen,
            history: Vec::new(),
            repetitions: HashMap::new(),
        };
        game.record_repetition();
        game
    }

    /// The side to move.
    #[inline]
    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    /// The piece on `square`, if any.
    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position.board().piece_at(square)
    }

    /// Return `true` if the side to move is in check.
    #[inline]
    pub fn is_check(&self) -> bool {
        self.position.is_check()
    }

    /// The full-move number, starting at 1 and incremented after Black moves.
    #[inline]
    pub fn fullmoves(&self) -> u32 {
        self.position.fullmoves().get()
    }

    /// Number of legal moves for the side to move.
    pub fn legal_move_count(&self) -> usize {
        self.position.legal_moves().len()
    }

    /// All legal moves for the side to move, as candidates.
    pub fn legal_candidates(&self) -> Vec<Candidate> {
        self.position
            .legal_moves()
            .into_iter()
            .filter_map(|m| match m.to_uci(CastlingMode::Standard) {
                UciMove::Normal {
                    from,
                    to,
                    promotion,
                } => Some(Candidate { from, to, promotion }),
                _ => None,
            })
            .collect()
    }

    /// The FEN this game started from, or `None` for the standard start.
    #[inline]
    pub fn start_fen(&self) -> Option<&str> {
        self.start_fen.as_deref()
    }

    /// Moves played so far, oldest first.
    #[inline]
    pub fn history(&self) -> &[PlayedMove] {
        &self.history
    }

    /// The most recently played move.
    #[inline]
    pub fn last_move(&self) -> Option<&PlayedMove> {
        self.history.last()
    }

    /// UCI strings of all moves played so far.
    pub fn uci_moves(&self) -> impl Iterator<Item = &str> + '_ {
        self.history.iter().map(|m| m.uci.as_str())
    }

    /// Parse a UCI move string in the context of this game.
    ///
    /// Only the syntax is checked; use [`legality`](Self::legality) to
    /// validate the result.
    pub fn parse_uci(&self, text: &str) -> Result<Candidate, RulesError> {
        let malformed = || RulesError::MalformedMove {
            text: text.to_string(),
        };
        match text.trim().parse::<UciMove>().map_err(|_| malformed())? {
            UciMove::Normal {
                from,
                to,
                promotion,
            } => Ok(Candidate { from, to, promotion }),
            _ => Err(malformed()),
        }
    }

    /// Check whether `candidate` may be played in the current position.
    pub fn legality(&self, candidate: &Candidate) -> Legality {
        if let Some(m) = self.resolve(candidate) {
            return Legality::Legal(m);
        }
        if candidate.promotion.is_none()
            && self
                .resolve(&candidate.with_promotion(Role::Queen))
                .is_some()
        {
            return Legality::NeedsPromotion;
        }
        Legality::Illegal
    }

    /// Return `true` if `candidate` is legal as given.
    #[inline]
    pub fn is_legal(&self, candidate: &Candidate) -> bool {
        matches!(self.legality(candidate), Legality::Legal(_))
    }

    /// Validate and play `candidate`.
    ///
    /// On error the game is left unchanged.
    pub fn apply(&mut self, candidate: Candidate) -> Result<PlayedMove, RulesError> {
        let m = match self.legality(&candidate) {
            Legality::Legal(m) => m,
            Legality::NeedsPromotion => {
                return Err(RulesError::NeedsPromotion {
                    uci_move: candidate.to_string(),
                });
            }
            Legality::Illegal => {
                return Err(RulesError::IllegalMove {
                    uci_move: candidate.to_string(),
                });
            }
        };

        let side = self.position.turn();
        let uci = m.to_uci(CastlingMode::Standard).to_string();
        let mut san = San::from_move(&self.position, m.clone()).to_string();

        self.position.play_unchecked(m);

        if self.position.is_checkmate() {
            san.push('#');
        } else if self.position.is_check() {
            san.push('+');
        }

        let played = PlayedMove {
            candidate,
            side,
            uci,
            san,
        };
        debug!(uci = %played.uci, san = %played.san, "move applied");
        self.history.push(played.clone());
        self.record_repetition();
        Ok(played)
    }

    /// Report whether the game is over and why.
    pub fn status(&self) -> GameStatus {
        let position = &self.position;
        if position.is_checkmate() {
            GameStatus::Checkmate {
                winner: !position.turn(),
            }
        } else if position.is_stalemate() {
            GameStatus::Stalemate
        } else if position.is_insufficient_material() {
            GameStatus::Draw(DrawReason::InsufficientMaterial)
        } else if position.halfmoves() >= FIFTY_MOVE_PLIES {
            GameStatus::Draw(DrawReason::FiftyMoves)
        } else if self.repetition_count() >= REPETITION_LIMIT {
            GameStatus::Draw(DrawReason::Repetition)
        } else {
            GameStatus::Ongoing
        }
    }

    /// How many times the current position has occurred in this game.
    pub fn repetition_count(&self) -> u32 {
        self.repetitions
            .get(&self.repetition_key())
            .copied()
            .unwrap_or(0)
    }

    fn resolve(&self, candidate: &Candidate) -> Option<Move> {
        let uci = UciMove::Normal {
            from: candidate.from,
            to: candidate.to,
            promotion: candidate.promotion,
        };
        uci.to_move(&self.position).ok()
    }

    // Positions are equal when placement, turn, castling rights and
    // legal en passant captures match.
    fn repetition_key(&self) -> Zobrist64 {
        self.position.zobrist_hash(EnPassantMode::Legal)
    }

    fn record_repetition(&mut self) {
        *self.repetitions.entry(self.repetition_key()).or_insert(0) += 1;
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
