//! The terminal frontend: event loop, screens and input handling.

use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use crossterm::{cursor, execute, terminal};
use kibitz_core::{Color, Role, Square};
use kibitz_session::{
    BoardGeometry, GameMode, Menu, MenuOutcome, NoticeBoard, Orientation, Rejection, Selection,
    SelectionEvent, Session, SessionSettings, SideChoice,
};
use kibitz_uci::{EngineConfig, EngineProvider, UciEngine};
use rand::rngs::ThreadRng;
use scopeguard::defer;
use tracing::{error, info};

use crate::config::{Args, FrontendConfig, StartScreen};
use crate::tui::{self, GameView};

/// Input poll timeout; bounds how late notices expire and timers fire.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// What a key press asks for, before screen-specific handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Quit,
    Back,
    Char(char),
    Other,
}

fn key_action(key: &KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
        KeyCode::Esc => KeyAction::Back,
        KeyCode::Char(c) => KeyAction::Char(c.to_ascii_lowercase()),
        _ => KeyAction::Other,
    }
}

/// Promotion piece for a prompt key.
fn promotion_role(c: char) -> Option<Role> {
    match c {
        'q' => Some(Role::Queen),
        'r' => Some(Role::Rook),
        'b' => Some(Role::Bishop),
        'n' => Some(Role::Knight),
        _ => None,
    }
}

/// Menu hot-keys: `1` is the first button.
fn menu_index(c: char) -> Option<usize> {
    c.to_digit(10)
        .filter(|&d| d >= 1)
        .map(|d| d as usize - 1)
}

/// A running game and its input state.
struct Playing<E: EngineProvider> {
    session: Session<E>,
    selection: Selection,
    notices: NoticeBoard,
    geometry: BoardGeometry,
    /// A pawn move on the last rank waiting for its promotion piece.
    promotion: Option<(Square, Square)>,
    last_engine_move: Option<Instant>,
    /// Fatal engine error; the game is frozen until the user leaves.
    failure: Option<String>,
}

impl<E: EngineProvider> Playing<E> {
    fn new(session: Session<E>, orientation: Orientation) -> Playing<E> {
        Playing {
            session,
            selection: Selection::new(),
            notices: NoticeBoard::new(),
            geometry: tui::board_geometry(orientation),
            promotion: None,
            last_engine_move: None,
            failure: None,
        }
    }

    /// Destinations of the legal moves from the selected square.
    fn targets(&self) -> Vec<Square> {
        let Some(from) = self.selection.selected() else {
            return Vec::new();
        };
        let mut targets: Vec<Square> = Vec::new();
        for candidate in self.session.game().legal_candidates() {
            if candidate.from == from && !targets.contains(&candidate.to) {
                targets.push(candidate.to);
            }
        }
        targets
    }

    fn is_finished(&self) -> bool {
        self.failure.is_some() || self.session.is_over()
    }

    fn engine_move_due(&self, now: Instant, ai_delay: Duration) -> bool {
        if self.failure.is_some() || !self.session.is_engine_turn() {
            return false;
        }
        match (self.session.mode(), self.last_engine_move) {
            (GameMode::EngineVersusEngine, Some(last)) => now >= last + ai_delay,
            _ => true,
        }
    }

    fn play_engine_move(&mut self) {
        match self.session.request_engine_move() {
            Ok(_) => self.last_engine_move = Some(Instant::now()),
            Err(err) => {
                error!(error = %err, "session aborted");
                self.failure = Some(err.to_string());
            }
        }
    }

    fn press(&mut self, x: u16, y: u16, now: Instant) {
        let Some(square) = self.geometry.square_at(x, y) else {
            self.selection.clear();
            return;
        };
        if !self.session.is_human_turn() || self.promotion.is_some() {
            return;
        }
        let game = self.session.game();
        let own_piece = game
            .piece_at(square)
            .is_some_and(|piece| piece.color == game.turn());
        let event = self.selection.press(square, own_piece);
        self.handle_selection(event, now);
    }

    fn release(&mut self, x: u16, y: u16, now: Instant) {
        if let Some(square) = self.geometry.square_at(x, y) {
            let event = self.selection.release(square);
            self.handle_selection(event, now);
        }
    }

    fn handle_selection(&mut self, event: SelectionEvent, now: Instant) {
        if let SelectionEvent::Attempt { from, to } = event {
            self.submit(from, to, None, now);
        }
    }

    fn submit(&mut self, from: Square, to: Square, promotion: Option<Role>, now: Instant) {
        match self.session.submit_human_move(from, to, promotion) {
            Ok(_) => self.notices.clear(),
            Err(Rejection::NeedsPromotion { from, to }) => self.promotion = Some((from, to)),
            Err(rejection) => self.notices.post(rejection.to_string(), now),
        }
    }

    fn promote(&mut self, role: Role, now: Instant) {
        if let Some((from, to)) = self.promotion.take() {
            self.submit(from, to, Some(role), now);
        }
    }
}

enum Screen {
    Menu(Menu),
    Playing(Box<Playing<UciEngine>>),
}

struct App {
    frontend: FrontendConfig,
    engine: EngineConfig,
    settings: SessionSettings,
    screen: Screen,
    rng: ThreadRng,
    /// The next draw starts from a cleared terminal.
    repaint: bool,
    quit: bool,
}

impl App {
    fn new(frontend: FrontendConfig, engine: EngineConfig, settings: SessionSettings) -> App {
        let mut rng = rand::thread_rng();
        let menu = match frontend.start {
            StartScreen::Menu | StartScreen::EngineVersusEngine => Menu::new(),
            StartScreen::SideMenu => Menu::side_menu(),
            StartScreen::VersusEngine(choice) => {
                let mut menu = Menu::side_menu();
                let index = match choice {
                    SideChoice::White => 0,
                    SideChoice::Black => 1,
                    SideChoice::Random => 2,
                };
                menu.choose(index, Instant::now(), &mut rng);
                menu
            }
        };
        App {
            frontend,
            engine,
            settings,
            screen: Screen::Menu(menu),
            rng,
            repaint: true,
            quit: false,
        }
    }

    fn start_session(&mut self, mode: GameMode) -> Result<()> {
        let engine = UciEngine::spawn(&self.engine)
            .with_context(|| format!("cannot start engine {}", self.engine.path.display()))?;
        let session =
            Session::start(mode, engine, &self.settings).context("cannot start the game")?;
        let orientation = Orientation::for_side(mode.human_side().unwrap_or(Color::White));
        self.screen = Screen::Playing(Box::new(Playing::new(session, orientation)));
        self.repaint = true;
        Ok(())
    }

    fn back_to_menu(&mut self) {
        if let Screen::Playing(playing) = &self.screen {
            info!(moves = playing.session.game().history().len(), "session ended");
        }
        self.screen = Screen::Menu(Menu::new());
        self.repaint = true;
    }

    fn event_loop(&mut self, out: &mut Stdout) -> Result<()> {
        if let Some(mode) = self.frontend.start.mode() {
            self.start_session(mode)?;
        }
        while !self.quit {
            let now = Instant::now();
            if let Screen::Menu(menu) = &mut self.screen {
                if let MenuOutcome::Start(mode) = menu.tick(now) {
                    self.start_session(mode)?;
                }
            }

            self.draw(out, now)?;

            if let Screen::Playing(playing) = &mut self.screen {
                if playing.engine_move_due(now, self.frontend.ai_delay) {
                    playing.play_engine_move();
                    continue;
                }
            }

            if event::poll(POLL_INTERVAL)? {
                let event = event::read()?;
                self.handle_event(event, Instant::now())?;
            }
        }
        Ok(())
    }

    fn draw(&mut self, out: &mut Stdout, now: Instant) -> io::Result<()> {
        if self.repaint {
            tui::clear(out)?;
            self.repaint = false;
        }
        match &mut self.screen {
            Screen::Menu(menu) => tui::draw_menu(out, menu),
            Screen::Playing(playing) => {
                let notice = playing.notices.current(now).map(|n| n.text().to_string());
                let targets = playing.targets();
                let view = GameView {
                    geometry: &playing.geometry,
                    selected: playing.selection.selected(),
                    targets: &targets,
                    notice: notice.as_deref(),
                    promoting: playing.promotion.is_some(),
                    failure: playing.failure.as_deref(),
                };
                tui::draw_game(out, &playing.session, &view)
            }
        }
    }

    fn handle_event(&mut self, event: Event, now: Instant) -> Result<()> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(&key, now),
            Event::Mouse(mouse) => self.handle_mouse(mouse, now),
            Event::Resize(..) => {
                self.repaint = true;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn handle_key(&mut self, key: &KeyEvent, now: Instant) -> Result<()> {
        let action = key_action(key);
        if action == KeyAction::Quit {
            self.quit = true;
            return Ok(());
        }

        match &mut self.screen {
            Screen::Menu(menu) => match action {
                KeyAction::Char('q') => self.quit = true,
                KeyAction::Back => {
                    if menu.back() {
                        self.repaint = true;
                    }
                }
                KeyAction::Char(c) => {
                    if let Some(index) = menu_index(c) {
                        let before = menu.screen();
                        let outcome = menu.choose(index, now, &mut self.rng);
                        self.repaint |= before != menu.screen();
                        if let MenuOutcome::Start(mode) = outcome {
                            self.start_session(mode)?;
                        }
                    }
                }
                _ => {}
            },
            Screen::Playing(playing) if playing.promotion.is_some() => match action {
                KeyAction::Back => playing.promotion = None,
                KeyAction::Char(c) => {
                    if let Some(role) = promotion_role(c) {
                        playing.promote(role, now);
                    }
                }
                _ => {}
            },
            Screen::Playing(playing) if playing.is_finished() => match action {
                KeyAction::Char('q') => self.quit = true,
                _ => self.back_to_menu(),
            },
            Screen::Playing(_) => match action {
                KeyAction::Char('q') => self.quit = true,
                KeyAction::Back => self.back_to_menu(),
                _ => {}
            },
        }
        Ok(())
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) -> Result<()> {
        let (x, y) = (mouse.column, mouse.row);
        match (&mut self.screen, mouse.kind) {
            (Screen::Menu(menu), MouseEventKind::Down(MouseButton::Left)) => {
                let before = menu.screen();
                let outcome = menu.click(x, y, now, &mut self.rng);
                self.repaint |= before != menu.screen();
                if let MenuOutcome::Start(mode) = outcome {
                    self.start_session(mode)?;
                }
            }
            (Screen::Playing(playing), MouseEventKind::Down(MouseButton::Left)) => {
                if playing.is_finished() {
                    self.back_to_menu();
                } else {
                    playing.press(x, y, now);
                }
            }
            (Screen::Playing(playing), MouseEventKind::Up(MouseButton::Left)) => {
                playing.release(x, y, now);
            }
            _ => {}
        }
        Ok(())
    }
}

/// Run the frontend until the user quits.
///
/// The terminal is restored on every exit path, so fatal errors are printed
/// on a normal screen by the caller.
pub fn run(args: &Args) -> Result<()> {
    let settings = args.session_settings()?;
    let mut app = App::new(args.frontend_config(), args.engine_config(), settings);

    let mut stdout = io::stdout();
    terminal::enable_raw_mode().context("cannot switch the terminal to raw mode")?;
    defer! { let _ = terminal::disable_raw_mode(); }
    execute!(
        stdout,
        terminal::EnterAlternateScreen,
        event::EnableMouseCapture,
        cursor::Hide
    )?;
    defer! {
        let mut stdout = io::stdout();
        let _ = execute!(
            stdout,
            event::DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        );
        let _ = stdout.flush();
    }

    app.event_loop(&mut stdout)
}
