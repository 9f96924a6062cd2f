//! Game modes and side selection.

use std::fmt;

use kibitz_core::Color;
use rand::Rng;

/// Who controls each side. Fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameMode {
    /// A human plays `human`; the engine plays the other side.
    VersusEngine {
        /// The side the human controls.
        human: Color,
    },
    /// The engine plays both sides.
    EngineVersusEngine,
}

impl GameMode {
    /// The side the human controls, if any.
    #[inline]
    pub const fn human_side(self) -> Option<Color> {
        match self {
            GameMode::VersusEngine { human } => Some(human),
            GameMode::EngineVersusEngine => None,
        }
    }

    /// Return `true` if the engine moves for `side`.
    #[inline]
    pub fn engine_plays(self, side: Color) -> bool {
        self.human_side() != Some(side)
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMode::VersusEngine {
                human: Color::White,
            } => write!(f, "you (white) vs engine"),
            GameMode::VersusEngine {
                human: Color::Black,
            } => write!(f, "engine vs you (black)"),
            GameMode::EngineVersusEngine => write!(f, "engine vs engine"),
        }
    }
}

/// The side picked in the side menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SideChoice {
    White,
    Black,
    Random,
}

impl SideChoice {
    /// Resolve the choice to a concrete side, drawing from `rng` for `Random`.
    pub fn resolve<R: Rng>(self, rng: &mut R) -> Color {
        match self {
            SideChoice::White => Color::White,
            SideChoice::Black => Color::Black,
            SideChoice::Random if rng.gen_bool(0.5) => Color::White,
            SideChoice::Random => Color::Black,
        }
    }
}
