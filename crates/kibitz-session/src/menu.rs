//! Menu state machine: mode selection, side selection, side confirmation.

use std::time::{Duration, Instant};

use kibitz_core::Color;
use rand::Rng;

use crate::mode::{GameMode, SideChoice};

/// How long "You are playing as ..." stays up before the game starts.
pub const CONFIRM_DURATION: Duration = Duration::from_secs(2);

/// A clickable menu entry, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Button {
    pub label: &'static str,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Button {
    const fn at_row(label: &'static str, y: u16) -> Button {
        Button {
            label,
            x: 4,
            y,
            width: 24,
            height: 1,
        }
    }

    /// Return `true` if `(x, y)` lies on the button.
    pub fn contains(&self, x: u16, y: u16) -> bool {
        (self.x..self.x + self.width).contains(&x) && (self.y..self.y + self.height).contains(&y)
    }
}

const MAIN_BUTTONS: [Button; 2] = [
    Button::at_row("1. Play vs. engine", 4),
    Button::at_row("2. Engine vs. engine", 6),
];

const SIDE_BUTTONS: [Button; 3] = [
    Button::at_row("1. White", 4),
    Button::at_row("2. Black", 6),
    Button::at_row("3. Random", 8),
];

const SIDE_CHOICES: [SideChoice; 3] = [SideChoice::White, SideChoice::Black, SideChoice::Random];

/// The screen the menu is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuScreen {
    /// Choose between playing and watching.
    Main,
    /// Choose a side to play.
    Side,
    /// Show the resolved side until `until`.
    Confirm { human: Color, until: Instant },
}

/// Result of feeding input to the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOutcome {
    /// Still in the menu.
    Pending,
    /// Start a session in this mode.
    Start(GameMode),
}

/// Menu flow: `Main` -> (`Side` -> `Confirm`) -> start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Menu {
    screen: MenuScreen,
}

impl Menu {
    /// Menu opened on the main screen.
    pub fn new() -> Menu {
        Menu {
            screen: MenuScreen::Main,
        }
    }

    /// Menu opened directly on the side screen.
    pub fn side_menu() -> Menu {
        Menu {
            screen: MenuScreen::Side,
        }
    }

    #[inline]
    pub fn screen(&self) -> MenuScreen {
        self.screen
    }

    pub fn title(&self) -> &'static str {
        match self.screen {
            MenuScreen::Main => "kibitz",
            MenuScreen::Side => "Choose your side",
            MenuScreen::Confirm { .. } => "Get ready",
        }
    }

    /// Buttons on the current screen.
    pub fn buttons(&self) -> &'static [Button] {
        match self.screen {
            MenuScreen::Main => &MAIN_BUTTONS,
            MenuScreen::Side => &SIDE_BUTTONS,
            MenuScreen::Confirm { .. } => &[],
        }
    }

    /// The confirmation line, while it is showing.
    pub fn confirmation(&self) -> Option<String> {
        match self.screen {
            MenuScreen::Confirm { human, .. } => {
                let name = match human {
                    Color::White => "White",
                    Color::Black => "Black",
                };
                Some(format!("You are playing as {name}"))
            }
            _ => None,
        }
    }

    /// Handle a click at `(x, y)`.
    pub fn click<R: Rng>(&mut self, x: u16, y: u16, now: Instant, rng: &mut R) -> MenuOutcome {
        match self.buttons().iter().position(|b| b.contains(x, y)) {
            Some(index) => self.choose(index, now, rng),
            None => MenuOutcome::Pending,
        }
    }

    /// Activate the button at `index` (0-based), as a click or hot-key would.
    pub fn choose<R: Rng>(&mut self, index: usize, now: Instant, rng: &mut R) -> MenuOutcome {
        match (self.screen, index) {
            (MenuScreen::Main, 0) => {
                self.screen = MenuScreen::Side;
                MenuOutcome::Pending
            }
            (MenuScreen::Main, 1) => MenuOutcome::Start(GameMode::EngineVersusEngine),
            (MenuScreen::Side, i) if i < SIDE_CHOICES.len() => {
                let human = SIDE_CHOICES[i].resolve(rng);
                self.screen = MenuScreen::Confirm {
                    human,
                    until: now + CONFIRM_DURATION,
                };
                MenuOutcome::Pending
            }
            _ => MenuOutcome::Pending,
        }
    }

    /// Go back one screen. Returns `false` on the main screen.
    pub fn back(&mut self) -> bool {
        match self.screen {
            MenuScreen::Main => false,
            MenuScreen::Side | MenuScreen::Confirm { .. } => {
                self.screen = MenuScreen::Main;
                true
            }
        }
    }

    /// Advance time; starts the game once the confirmation has been shown.
    pub fn tick(&mut self, now: Instant) -> MenuOutcome {
        match self.screen {
            MenuScreen::Confirm { human, until } if now >= until => {
                MenuOutcome::Start(GameMode::VersusEngine { human })
            }
            _ => MenuOutcome::Pending,
        }
    }
}

impl Default for Menu {
    fn default() -> Self {
        Self::new()
    }
}
