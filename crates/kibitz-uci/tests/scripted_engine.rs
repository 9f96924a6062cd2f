//! Drives `UciEngine` against small shell-script engines.
#![cfg(unix)]

use std::path::PathBuf;
use std::time::{Duration, Instant};

use kibitz_uci::{
    EngineConfig, EngineProvider, GoParams, PositionSpec, Score, UciEngine, UciError,
};

const WELL_BEHAVED: &str = r#"
while read -r line; do
  case "$line" in
    uci)
      echo "id name Scripted Engine"
      echo "id author kibitz"
      echo "option name Hash type spin default 16 min 1 max 64"
      echo "option name Skill Level type spin default 20 min 0 max 20"
      echo "uciok"
      ;;
    isready) echo "readyok" ;;
    go*)
      echo "info string thinking"
      echo "info depth 3 score cp 25 nodes 120 pv e2e4 e7e5"
      echo "bestmove e2e4 ponder e7e5"
      ;;
    quit) exit 0 ;;
  esac
done
"#;

const CRASHES_ON_GO: &str = r#"
while read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    go*) exit 3 ;;
  esac
done
"#;

const NO_MOVE: &str = r#"
while read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    go*) echo "bestmove (none)" ;;
    quit) exit 0 ;;
  esac
done
"#;

const SLOW_SEARCH: &str = r#"
while read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    go*) sleep 2; echo "bestmove d2d4" ;;
    quit) exit 0 ;;
  esac
done
"#;

const WAITS_FOR_STOP: &str = r#"
while read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    stop) echo "bestmove g1f3" ;;
    quit) exit 0 ;;
  esac
done
"#;

const IGNORES_STOP: &str = r#"
while read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    quit) exit 0 ;;
  esac
done
"#;

const INVALID_UTF8: &str = r#"
while read -r line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    go*)
      printf 'info string \377\376 garbage\n'
      echo "bestmove e2e4"
      ;;
    quit) exit 0 ;;
  esac
done
"#;

const SILENT: &str = r#"
while read -r line; do
  :
done
"#;

fn script_config(script: &str) -> EngineConfig {
    EngineConfig {
        path: PathBuf::from("sh"),
        args: vec!["-c".to_string(), script.to_string()],
        handshake_timeout: Duration::from_secs(5),
        reply_timeout: Duration::from_secs(5),
        ..EngineConfig::default()
    }
}

#[test]
fn handshake_reads_identity_and_options() {
    let engine = UciEngine::spawn(&script_config(WELL_BEHAVED)).unwrap();
    assert_eq!(engine.name(), "Scripted Engine");
    assert_eq!(engine.options(), ["Hash", "Skill Level"]);
    assert!(engine.supports_option("skill level"));
    assert!(!engine.supports_option("Threads"));
    engine.quit().unwrap();
}

#[test]
fn options_are_applied_during_handshake() {
    let mut config = script_config(WELL_BEHAVED);
    config.options = vec![
        ("Skill Level".to_string(), "3".to_string()),
        ("Threads".to_string(), "2".to_string()),
    ];
    let mut engine = UciEngine::spawn(&config).unwrap();
    engine.sync().unwrap();
}

#[test]
fn best_move_returns_move_ponder_and_info() {
    let mut engine = UciEngine::spawn(&script_config(WELL_BEHAVED)).unwrap();
    engine.new_game().unwrap();

    let position = PositionSpec::startpos();
    let limits = GoParams::movetime(Duration::from_millis(50));
    let reply = engine.best_move(&position, &limits).unwrap();

    assert_eq!(reply.best.as_deref(), Some("e2e4"));
    assert_eq!(reply.ponder.as_deref(), Some("e7e5"));
    let info = reply.info.unwrap();
    assert_eq!(info.depth, Some(3));
    assert_eq!(info.score, Some(Score::Centipawns(25)));
    assert_eq!(info.pv, ["e2e4", "e7e5"]);
}

#[test]
fn repeated_searches_on_one_process() {
    let mut engine = UciEngine::spawn(&script_config(WELL_BEHAVED)).unwrap();
    let limits = GoParams::depth(1);
    for moves in [vec![], vec!["d2d4"], vec!["d2d4", "d7d5"]] {
        let position = PositionSpec::startpos().with_moves(moves);
        let reply = engine.best_move(&position, &limits).unwrap();
        assert!(reply.best.is_some());
    }
}

#[test]
fn engine_without_move_reports_none() {
    let mut engine = UciEngine::spawn(&script_config(NO_MOVE)).unwrap();
    let position = PositionSpec::fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
    let reply = engine.best_move(&position, &GoParams::depth(1)).unwrap();
    assert_eq!(reply.best, None);
    assert_eq!(reply.info, None);
}

#[test]
fn crash_mid_session_is_reported() {
    let mut engine = UciEngine::spawn(&script_config(CRASHES_ON_GO)).unwrap();
    let err = engine
        .best_move(&PositionSpec::startpos(), &GoParams::depth(1))
        .unwrap_err();
    assert!(matches!(err, UciError::EngineExited { .. }), "got {err}");

    // Later requests fail the same way instead of hanging.
    let err = engine
        .best_move(&PositionSpec::startpos(), &GoParams::depth(1))
        .unwrap_err();
    assert!(matches!(err, UciError::EngineExited { .. }), "got {err}");
}

#[test]
fn depth_search_waits_past_reply_timeout() {
    let mut config = script_config(SLOW_SEARCH);
    config.reply_timeout = Duration::from_secs(1);
    let mut engine = UciEngine::spawn(&config).unwrap();
    let reply = engine
        .best_move(&PositionSpec::startpos(), &GoParams::depth(30))
        .unwrap();
    assert_eq!(reply.best.as_deref(), Some("d2d4"));
}

#[test]
fn overrunning_timed_search_is_stopped() {
    let mut config = script_config(WAITS_FOR_STOP);
    config.reply_timeout = Duration::from_millis(200);
    let mut engine = UciEngine::spawn(&config).unwrap();
    let limits = GoParams::movetime(Duration::from_millis(50));
    let reply = engine.best_move(&PositionSpec::startpos(), &limits).unwrap();
    assert_eq!(reply.best.as_deref(), Some("g1f3"));
}

#[test]
fn engine_ignoring_stop_times_out() {
    let mut config = script_config(IGNORES_STOP);
    config.handshake_timeout = Duration::from_millis(300);
    config.reply_timeout = Duration::from_millis(200);
    let mut engine = UciEngine::spawn(&config).unwrap();
    let limits = GoParams::movetime(Duration::from_millis(50));
    let err = engine
        .best_move(&PositionSpec::startpos(), &limits)
        .unwrap_err();
    assert!(matches!(err, UciError::Timeout { expected: "bestmove", .. }), "got {err}");
}

#[test]
fn invalid_utf8_output_is_tolerated() {
    let mut engine = UciEngine::spawn(&script_config(INVALID_UTF8)).unwrap();
    let reply = engine
        .best_move(&PositionSpec::startpos(), &GoParams::depth(1))
        .unwrap();
    assert_eq!(reply.best.as_deref(), Some("e2e4"));
}

#[test]
fn silent_engine_times_out_and_is_killed() {
    let mut config = script_config(SILENT);
    config.handshake_timeout = Duration::from_millis(200);

    let started = Instant::now();
    let err = UciEngine::spawn(&config).err().unwrap();
    assert!(matches!(err, UciError::Timeout { expected: "uciok", .. }), "got {err}");
    // Handshake timeout plus the quit grace period, with slack.
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[test]
fn spawn_failure_names_the_path() {
    let config = EngineConfig {
        path: PathBuf::from("/nonexistent/stockfish"),
        ..EngineConfig::default()
    };
    let err = UciEngine::spawn(&config).err().unwrap();
    assert_eq!(err.to_string(), "engine not found at /nonexistent/stockfish");
}
