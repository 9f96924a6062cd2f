//! The session controller: turn order between the human and the engine.

use std::time::Duration;

use kibitz_core::{Candidate, Color, Game, GameStatus, Legality, PlayedMove, Role, Square};
use kibitz_uci::{EngineProvider, GoParams, PositionSpec, Score, SearchInfo};
use tracing::{debug, info, warn};

use crate::error::{Rejection, SessionError};
use crate::mode::GameMode;

/// Per-session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Search limits for every engine move.
    pub limits: GoParams,
    /// Custom starting position; `None` for the standard start.
    pub start_fen: Option<String>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            limits: GoParams::movetime(Duration::from_millis(100)),
            start_fen: None,
        }
    }
}

/// How a finished session ended, from the viewer's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionResult {
    /// The terminal status reported by the rules provider.
    pub status: GameStatus,
    /// The human's side, or `None` when watching engine vs engine.
    pub human: Option<Color>,
}

impl SessionResult {
    /// Headline shown to the user.
    pub fn message(&self) -> &'static str {
        match (self.status.winner(), self.human) {
            (Some(winner), Some(human)) if winner == human => "You won!",
            (Some(_), Some(_)) => "You lost!",
            (Some(Color::White), None) => "White wins!",
            (Some(Color::Black), None) => "Black wins!",
            (None, _) => "It's a draw!",
        }
    }

    /// How the game ended, e.g. "checkmate" or "threefold repetition".
    pub fn detail(&self) -> String {
        match self.status {
            GameStatus::Checkmate { .. } => "checkmate".to_string(),
            GameStatus::Stalemate => "stalemate".to_string(),
            GameStatus::Draw(reason) => reason.to_string(),
            GameStatus::Ongoing => "in progress".to_string(),
        }
    }
}

/// Evaluation reported with the most recent engine move.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Evaluation {
    /// Side the engine searched for; UCI scores are relative to it.
    side: Color,
    info: SearchInfo,
}

/// One game from start to terminal result.
///
/// Owns the game state and the engine. Moves are applied one at a time, human
/// and engine moves alike only after the rules provider accepts them.
pub struct Session<E: EngineProvider> {
    game: Game,
    mode: GameMode,
    engine: E,
    limits: GoParams,
    status: GameStatus,
    evaluation: Option<Evaluation>,
}

impl<E: EngineProvider> Session<E> {
    /// Set up the board and tell the engine a new game begins.
    ///
    /// In [`GameMode::EngineVersusEngine`] the caller drives play by calling
    /// [`request_engine_move`](Self::request_engine_move) until the session
    /// is over; otherwise it alternates with human input.
    pub fn start(
        mode: GameMode,
        mut engine: E,
        settings: &SessionSettings,
    ) -> Result<Self, SessionError> {
        let game = match &settings.start_fen {
            Some(fen) => Game::from_fen(fen)?,
            None => Game::new(),
        };
        engine.new_game()?;
        let status = game.status();
        info!(%mode, engine = engine.name(), limits = %settings.limits, "session started");
        if status.is_over() {
            warn!(%status, "session starts in a finished position");
        }
        Ok(Self {
            game,
            mode,
            engine,
            limits: settings.limits.clone(),
            status,
            evaluation: None,
        })
    }

    #[inline]
    pub fn game(&self) -> &Game {
        &self.game
    }

    #[inline]
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    #[inline]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[inline]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Return `true` once a terminal condition was reached.
    #[inline]
    pub fn is_over(&self) -> bool {
        self.status.is_over()
    }

    /// Return `true` if the game waits for the human.
    pub fn is_human_turn(&self) -> bool {
        !self.is_over() && self.mode.human_side() == Some(self.game.turn())
    }

    /// Return `true` if the game waits for the engine.
    pub fn is_engine_turn(&self) -> bool {
        !self.is_over() && self.mode.engine_plays(self.game.turn())
    }

    /// The outcome, once the session is over.
    pub fn result(&self) -> Option<SessionResult> {
        self.is_over().then_some(SessionResult {
            status: self.status,
            human: self.mode.human_side(),
        })
    }

    /// The current game as a UCI `position`.
    pub fn position_spec(&self) -> PositionSpec {
        let start = match self.game.start_fen() {
            Some(fen) => PositionSpec::fen(fen),
            None => PositionSpec::startpos(),
        };
        start.with_moves(self.game.uci_moves())
    }

    /// The last engine evaluation, converted to White's point of view.
    pub fn white_score(&self) -> Option<Score> {
        let evaluation = self.evaluation.as_ref()?;
        let sign = match evaluation.side {
            Color::White => 1,
            Color::Black => -1,
        };
        evaluation.info.score.map(|score| match score {
            Score::Centipawns(cp) => Score::Centipawns(cp.saturating_mul(sign)),
            Score::Mate(moves) => Score::Mate(moves.saturating_mul(sign)),
        })
    }

    /// Search depth of the last engine evaluation.
    pub fn last_depth(&self) -> Option<u32> {
        self.evaluation.as_ref().and_then(|e| e.info.depth)
    }

    /// Play a human move if it is the human's turn and the move is legal.
    ///
    /// Any rejection leaves the game exactly as it was.
    pub fn submit_human_move(
        &mut self,
        origin: Square,
        destination: Square,
        promotion: Option<Role>,
    ) -> Result<PlayedMove, Rejection> {
        if self.is_over() {
            return Err(Rejection::GameOver);
        }
        if !self.is_human_turn() {
            return Err(Rejection::NotHumanTurn);
        }

        let candidate = Candidate {
            from: origin,
            to: destination,
            promotion,
        };
        let illegal = || Rejection::Illegal {
            uci_move: candidate.to_string(),
        };
        match self.game.legality(&candidate) {
            Legality::Legal(_) => {}
            Legality::NeedsPromotion => {
                return Err(Rejection::NeedsPromotion {
                    from: origin,
                    to: destination,
                });
            }
            Legality::Illegal => {
                debug!(mv = %candidate, "illegal human move rejected");
                return Err(illegal());
            }
        }

        let played = self.game.apply(candidate).map_err(|_| illegal())?;
        self.record(&played);
        Ok(played)
    }

    /// Ask the engine for a move and play it after validating it.
    ///
    /// Blocks while the engine searches. Any engine misbehaviour is fatal:
    /// a move the rules provider rejects is never applied.
    pub fn request_engine_move(&mut self) -> Result<PlayedMove, SessionError> {
        if !self.is_engine_turn() {
            return Err(SessionError::NotEngineTurn);
        }

        let side = self.game.turn();
        let reply = self.engine.best_move(&self.position_spec(), &self.limits)?;
        if let Some(info) = reply.info {
            self.evaluation = Some(Evaluation { side, info });
        }

        let text = reply.best.ok_or(SessionError::NoMove)?;
        let illegal = || SessionError::IllegalEngineMove {
            uci_move: text.clone(),
        };
        let candidate = self.game.parse_uci(&text).map_err(|_| illegal())?;
        let played = self.game.apply(candidate).map_err(|err| {
            warn!(error = %err, "engine move rejected");
            illegal()
        })?;
        self.record(&played);
        Ok(played)
    }

    fn record(&mut self, played: &PlayedMove) {
        self.status = self.game.status();
        info!(
            side = ?played.side,
            san = %played.san,
            uci = %played.uci,
            move_number = self.game.fullmoves(),
            "move played"
        );
        if self.is_over() {
            info!(status = %self.status, "session over");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use kibitz_core::DrawReason;
    use kibitz_uci::{BestMove, UciError};

    use super::*;

    /// Engine double that replays a fixed list of answers.
    #[derive(Default)]
    struct ScriptedEngine {
        replies: VecDeque<Option<&'static str>>,
        positions: Vec<String>,
        new_games: usize,
        score: Option<Score>,
    }

    impl ScriptedEngine {
        fn new(replies: &[&'static str]) -> Self {
            Self {
                replies: replies.iter().map(|r| Some(*r)).collect(),
                ..Self::default()
            }
        }
    }

    impl EngineProvider for ScriptedEngine {
        fn name(&self) -> &str {
            "scripted"
        }

        fn new_game(&mut self) -> Result<(), UciError> {
            self.new_games += 1;
            Ok(())
        }

        fn best_move(
            &mut self,
            position: &PositionSpec,
            _limits: &GoParams,
        ) -> Result<BestMove, UciError> {
            self.positions
                .push(kibitz_uci::Command::Position(position.clone()).to_string());
            let best = self.replies.pop_front().ok_or(UciError::EngineExited {
                status: "script exhausted".to_string(),
            })?;
            Ok(BestMove {
                best: best.map(str::to_string),
                ponder: None,
                info: Some(SearchInfo {
                    depth: Some(7),
                    score: self.score,
                    ..SearchInfo::default()
                }),
            })
        }
    }

    fn vs_engine(human: Color) -> GameMode {
        GameMode::VersusEngine { human }
    }

    fn from_fen(fen: &str) -> SessionSettings {
        SessionSettings {
            start_fen: Some(fen.to_string()),
            ..SessionSettings::default()
        }
    }

    fn start(mode: GameMode, engine: ScriptedEngine) -> Session<ScriptedEngine> {
        Session::start(mode, engine, &SessionSettings::default()).unwrap()
    }

    #[test]
    fn start_announces_new_game() {
        let session = start(vs_engine(Color::White), ScriptedEngine::default());
        assert_eq!(session.engine().new_games, 1);
        assert!(session.is_human_turn());
        assert!(!session.is_engine_turn());
        assert!(session.result().is_none());
    }

    #[test]
    fn human_as_black_waits_for_engine() {
        let mut session = start(vs_engine(Color::Black), ScriptedEngine::new(&["e2e4"]));
        assert!(session.is_engine_turn());
        assert_eq!(
            session.submit_human_move(Square::E7, Square::E5, None),
            Err(Rejection::NotHumanTurn)
        );
        let played = session.request_engine_move().unwrap();
        assert_eq!(played.uci, "e2e4");
        assert!(session.is_human_turn());
    }

    #[test]
    fn legal_move_applies_once_and_hands_over() {
        let mut session = start(vs_engine(Color::White), ScriptedEngine::new(&["e7e5"]));
        let played = session
            .submit_human_move(Square::E2, Square::E4, None)
            .unwrap();
        assert_eq!(played.san, "e4");
        assert_eq!(session.game().history().len(), 1);
        assert_eq!(session.game().turn(), Color::Black);
        assert!(session.is_engine_turn());

        session.request_engine_move().unwrap();
        assert_eq!(session.game().history().len(), 2);
        assert_eq!(
            session.engine().positions,
            ["position startpos moves e2e4"]
        );
        assert!(session.is_human_turn());
    }

    #[test]
    fn illegal_move_is_rejected_without_change() {
        let mut session = start(vs_engine(Color::White), ScriptedEngine::default());
        let rejection = session
            .submit_human_move(Square::E2, Square::E5, None)
            .unwrap_err();
        assert_eq!(
            rejection,
            Rejection::Illegal {
                uci_move: "e2e5".to_string()
            }
        );
        assert!(session.game().history().is_empty());
        assert_eq!(session.game().turn(), Color::White);
        assert!(session.is_human_turn());
    }

    #[test]
    fn engine_cannot_move_on_human_turn() {
        let mut session = start(vs_engine(Color::White), ScriptedEngine::new(&["e2e4"]));
        assert!(matches!(
            session.request_engine_move(),
            Err(SessionError::NotEngineTurn)
        ));
        assert!(session.engine().positions.is_empty());
    }

    #[test]
    fn illegal_engine_move_is_fatal_and_not_applied() {
        let mut session = start(GameMode::EngineVersusEngine, ScriptedEngine::new(&["e2e5"]));
        let err = session.request_engine_move().unwrap_err();
        assert!(
            matches!(err, SessionError::IllegalEngineMove { ref uci_move } if uci_move == "e2e5")
        );
        assert!(session.game().history().is_empty());
    }

    #[test]
    fn garbage_engine_move_is_fatal() {
        let mut session = start(GameMode::EngineVersusEngine, ScriptedEngine::new(&["xyzzy"]));
        assert!(matches!(
            session.request_engine_move(),
            Err(SessionError::IllegalEngineMove { .. })
        ));
    }

    #[test]
    fn engine_without_move_is_fatal() {
        let engine = ScriptedEngine {
            replies: VecDeque::from([None]),
            ..ScriptedEngine::default()
        };
        let mut session = start(GameMode::EngineVersusEngine, engine);
        assert!(matches!(
            session.request_engine_move(),
            Err(SessionError::NoMove)
        ));
    }

    #[test]
    fn engine_failure_propagates() {
        let mut session = start(GameMode::EngineVersusEngine, ScriptedEngine::default());
        assert!(matches!(
            session.request_engine_move(),
            Err(SessionError::Engine(UciError::EngineExited { .. }))
        ));
    }

    #[test]
    fn mate_in_one_ends_session() {
        let mut session = Session::start(
            vs_engine(Color::White),
            ScriptedEngine::default(),
            &from_fen("6k1/8/6K1/8/8/8/8/R7 w - - 0 1"),
        )
        .unwrap();
        let played = session
            .submit_human_move(Square::A1, Square::A8, None)
            .unwrap();
        assert_eq!(played.san, "Ra8#");
        assert!(session.is_over());

        let result = session.result().unwrap();
        assert_eq!(
            result.status,
            GameStatus::Checkmate {
                winner: Color::White
            }
        );
        assert_eq!(result.message(), "You won!");
        assert_eq!(result.detail(), "checkmate");

        assert_eq!(
            session.submit_human_move(Square::G6, Square::F6, None),
            Err(Rejection::GameOver)
        );
        assert!(matches!(
            session.request_engine_move(),
            Err(SessionError::NotEngineTurn)
        ));
        assert_eq!(session.game().history().len(), 1);
    }

    #[test]
    fn human_can_lose() {
        let mut session = start(
            vs_engine(Color::White),
            ScriptedEngine::new(&["e7e5", "d8h4"]),
        );
        session
            .submit_human_move(Square::F2, Square::F3, None)
            .unwrap();
        session.request_engine_move().unwrap();
        session
            .submit_human_move(Square::G2, Square::G4, None)
            .unwrap();
        session.request_engine_move().unwrap();
        assert_eq!(session.result().unwrap().message(), "You lost!");
    }

    #[test]
    fn engine_vs_engine_runs_without_input() {
        let engine = ScriptedEngine::new(&["f2f3", "e7e5", "g2g4", "d8h4", "e1f2"]);
        let mut session = start(GameMode::EngineVersusEngine, engine);
        let mut plies = 0;
        while session.is_engine_turn() {
            session.request_engine_move().unwrap();
            plies += 1;
        }
        assert_eq!(plies, 4);
        assert!(!session.is_human_turn());
        assert_eq!(session.result().unwrap().message(), "Black wins!");
        assert_eq!(session.engine().replies.len(), 1);
    }

    #[test]
    fn promotion_needs_a_piece() {
        let mut session = Session::start(
            vs_engine(Color::White),
            ScriptedEngine::default(),
            &from_fen("8/4P3/8/8/8/8/k7/7K w - - 0 1"),
        )
        .unwrap();
        assert_eq!(
            session.submit_human_move(Square::E7, Square::E8, None),
            Err(Rejection::NeedsPromotion {
                from: Square::E7,
                to: Square::E8
            })
        );
        assert!(session.game().history().is_empty());

        let played = session
            .submit_human_move(Square::E7, Square::E8, Some(Role::Queen))
            .unwrap();
        assert_eq!(played.uci, "e7e8q");
    }

    #[test]
    fn fen_start_is_sent_to_engine() {
        let fen = "6k1/8/6K1/8/8/8/8/R7 b - - 0 1";
        let mut session = Session::start(
            vs_engine(Color::White),
            ScriptedEngine::new(&["g8h8"]),
            &from_fen(fen),
        )
        .unwrap();
        session.request_engine_move().unwrap();
        assert_eq!(session.engine().positions, [format!("position fen {fen}")]);
        assert_eq!(
            session.position_spec(),
            PositionSpec::fen(fen).with_moves(["g8h8"])
        );
    }

    #[test]
    fn white_score_flips_for_black_searches() {
        let engine = ScriptedEngine {
            score: Some(Score::Centipawns(40)),
            ..ScriptedEngine::new(&["e2e4", "e7e5"])
        };
        let mut session = start(GameMode::EngineVersusEngine, engine);
        assert_eq!(session.white_score(), None);

        session.request_engine_move().unwrap();
        assert_eq!(session.white_score(), Some(Score::Centipawns(40)));
        session.request_engine_move().unwrap();
        assert_eq!(session.white_score(), Some(Score::Centipawns(-40)));
        assert_eq!(session.last_depth(), Some(7));
    }

    #[test]
    fn extreme_black_score_saturates() {
        let engine = ScriptedEngine {
            score: Some(Score::Centipawns(i32::MIN)),
            ..ScriptedEngine::new(&["e2e4", "e7e5"])
        };
        let mut session = start(GameMode::EngineVersusEngine, engine);
        session.request_engine_move().unwrap();
        assert_eq!(session.white_score(), Some(Score::Centipawns(i32::MIN)));
        session.request_engine_move().unwrap();
        assert_eq!(session.white_score(), Some(Score::Centipawns(i32::MAX)));
    }

    #[test]
    fn finished_start_position_is_a_draw() {
        let session = Session::start(
            GameMode::EngineVersusEngine,
            ScriptedEngine::default(),
            &from_fen("8/8/8/4k3/8/8/8/4K3 w - - 0 1"),
        )
        .unwrap();
        assert!(!session.is_engine_turn());
        let result = session.result().unwrap();
        assert_eq!(result.status, GameStatus::Draw(DrawReason::InsufficientMaterial));
        assert_eq!(result.message(), "It's a draw!");
        assert_eq!(result.detail(), "insufficient material");
    }

    #[test]
    fn invalid_start_fen_fails_setup() {
        let result = Session::start(
            GameMode::EngineVersusEngine,
            ScriptedEngine::default(),
            &from_fen("garbage"),
        );
        assert!(matches!(result, Err(SessionError::Setup(_))));
    }
}
