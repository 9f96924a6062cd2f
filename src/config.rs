//! Command-line configuration.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use kibitz_core::Game;
use kibitz_session::{GameMode, SessionSettings, SideChoice};
use kibitz_uci::{EngineConfig, GoParams, default_engine_path};

/// Play chess against a UCI engine, or watch it play itself, in the terminal.
#[derive(Debug, Parser)]
#[command(name = "kibitz", version, about, long_about = None)]
pub struct Args {
    /// Engine executable.
    #[arg(
        long,
        env = "KIBITZ_ENGINE",
        value_name = "PATH",
        default_value_os_t = default_engine_path()
    )]
    pub engine: PathBuf,

    /// Argument passed to the engine (repeatable).
    #[arg(long = "engine-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub engine_args: Vec<String>,

    /// UCI option set after the handshake (repeatable).
    #[arg(long = "option", value_name = "NAME=VALUE", value_parser = parse_option)]
    pub options: Vec<(String, String)>,

    /// Engine thinking time per move, in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 100)]
    pub movetime: u64,

    /// Search to a fixed depth instead of a fixed time.
    #[arg(long, value_name = "N")]
    pub depth: Option<u8>,

    /// Pause between moves in engine vs engine games, in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 500)]
    pub ai_delay: u64,

    /// Start every game from this position.
    #[arg(long)]
    pub fen: Option<String>,

    /// Skip the main menu.
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Skip the side menu; implies `--mode vs-engine`.
    #[arg(long, value_enum)]
    pub side: Option<SideArg>,

    /// Where log output goes.
    #[arg(long, value_name = "PATH", default_value = "kibitz.log")]
    pub log_file: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    VsEngine,
    EngineVsEngine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SideArg {
    White,
    Black,
    Random,
}

impl From<SideArg> for SideChoice {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::White => SideChoice::White,
            SideArg::Black => SideChoice::Black,
            SideArg::Random => SideChoice::Random,
        }
    }
}

/// What the frontend shows first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartScreen {
    #[default]
    Menu,
    SideMenu,
    /// Confirm the side, then play.
    VersusEngine(SideChoice),
    EngineVersusEngine,
}

/// Settings of the terminal frontend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendConfig {
    pub ai_delay: Duration,
    pub start: StartScreen,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            ai_delay: Duration::from_millis(500),
            start: StartScreen::Menu,
        }
    }
}

impl Args {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            path: self.engine.clone(),
            args: self.engine_args.clone(),
            options: self.options.clone(),
            ..EngineConfig::default()
        }
    }

    /// Session settings; fails if `--fen` is not a valid position.
    pub fn session_settings(&self) -> Result<SessionSettings> {
        if let Some(fen) = &self.fen {
            Game::from_fen(fen).context("invalid --fen")?;
        }
        let limits = match self.depth {
            Some(depth) => GoParams::depth(depth),
            None => GoParams::movetime(Duration::from_millis(self.movetime)),
        };
        Ok(SessionSettings {
            limits,
            start_fen: self.fen.clone(),
        })
    }

    pub fn frontend_config(&self) -> FrontendConfig {
        let start = match (self.mode, self.side) {
            (Some(ModeArg::EngineVsEngine), _) => StartScreen::EngineVersusEngine,
            (_, Some(side)) => StartScreen::VersusEngine(side.into()),
            (Some(ModeArg::VsEngine), None) => StartScreen::SideMenu,
            (None, None) => StartScreen::Menu,
        };
        FrontendConfig {
            ai_delay: Duration::from_millis(self.ai_delay),
            start,
        }
    }
}

impl StartScreen {
    /// The mode to start directly, if no menu interaction is needed.
    pub fn mode(self) -> Option<GameMode> {
        match self {
            StartScreen::EngineVersusEngine => Some(GameMode::EngineVersusEngine),
            _ => None,
        }
    }
}

/// Parse `NAME=VALUE`. The value may be empty (button options).
fn parse_option(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{s}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing option name in `{s}`"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("kibitz").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let args = parse(&[]);
        assert_eq!(args.movetime, 100);
        assert_eq!(args.ai_delay, 500);
        assert_eq!(args.log_file, PathBuf::from("kibitz.log"));
        assert_eq!(args.frontend_config(), FrontendConfig::default());

        let settings = args.session_settings().unwrap();
        assert_eq!(settings, SessionSettings::default());
    }

    #[test]
    fn engine_options_are_collected() {
        let args = parse(&[
            "--engine",
            "/usr/games/stockfish",
            "--engine-arg",
            "--quiet",
            "--option",
            "Skill Level=3",
            "--option",
            "Clear Hash=",
        ]);
        let config = args.engine_config();
        assert_eq!(config.path, PathBuf::from("/usr/games/stockfish"));
        assert_eq!(config.args, ["--quiet"]);
        assert_eq!(
            config.options,
            [
                ("Skill Level".to_string(), "3".to_string()),
                ("Clear Hash".to_string(), String::new())
            ]
        );
    }

    #[test]
    fn malformed_option_is_rejected() {
        assert!(Args::try_parse_from(["kibitz", "--option", "Hash"]).is_err());
        assert!(Args::try_parse_from(["kibitz", "--option", "=5"]).is_err());
    }

    #[test]
    fn depth_replaces_movetime() {
        let settings = parse(&["--depth", "12"]).session_settings().unwrap();
        assert_eq!(settings.limits, GoParams::depth(12));

        let settings = parse(&["--movetime", "250"]).session_settings().unwrap();
        assert_eq!(settings.limits, GoParams::movetime(Duration::from_millis(250)));
    }

    #[test]
    fn fen_is_validated() {
        let args = parse(&["--fen", "not a position"]);
        assert!(args.session_settings().is_err());

        let fen = "6k1/8/6K1/8/8/8/8/R7 w - - 0 1";
        let settings = parse(&["--fen", fen]).session_settings().unwrap();
        assert_eq!(settings.start_fen.as_deref(), Some(fen));
    }

    #[test]
    fn start_screen_presets() {
        let start = |args: &[&str]| parse(args).frontend_config().start;
        assert_eq!(start(&[]), StartScreen::Menu);
        assert_eq!(start(&["--mode", "vs-engine"]), StartScreen::SideMenu);
        assert_eq!(
            start(&["--side", "black"]),
            StartScreen::VersusEngine(SideChoice::Black)
        );
        assert_eq!(
            start(&["--mode", "vs-engine", "--side", "random"]),
            StartScreen::VersusEngine(SideChoice::Random)
        );
        assert_eq!(
            start(&["--mode", "engine-vs-engine"]),
            StartScreen::EngineVersusEngine
        );
        assert_eq!(
            StartScreen::EngineVersusEngine.mode(),
            Some(GameMode::EngineVersusEngine)
        );
        assert_eq!(StartScreen::Menu.mode(), None);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(Args::try_parse_from(["kibitz", "--mode", "blitz"]).is_err());
    }
}
