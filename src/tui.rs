//! Terminal rendering with crossterm.

use std::io::{self, Write};

use crossterm::style::{self, Color as TermColor, Stylize};
use crossterm::{cursor, queue, terminal};
use kibitz_core::{Color, Piece, PlayedMove, Role, Square};
use kibitz_session::{BoardGeometry, Menu, Orientation, Session};
use kibitz_uci::{EngineProvider, Score};

/// Board placement: 5x2 terminal cells per square, leaving room for coordinates.
pub const BOARD_X: u16 = 3;
pub const BOARD_Y: u16 = 2;
pub const CELL_WIDTH: u16 = 5;
pub const CELL_HEIGHT: u16 = 2;

const PANEL_X: u16 = BOARD_X + 8 * CELL_WIDTH + 3;
const MOVE_LIST_ROWS: usize = 10;

const LIGHT: TermColor = TermColor::Rgb { r: 238, g: 238, b: 210 };
const DARK: TermColor = TermColor::Rgb { r: 119, g: 149, b: 86 };
const SELECTED: TermColor = TermColor::Rgb { r: 246, g: 246, b: 105 };
const LAST_MOVE: TermColor = TermColor::Rgb { r: 186, g: 202, b: 68 };
const TARGET: TermColor = TermColor::Rgb { r: 90, g: 90, b: 90 };
const BUTTON: TermColor = TermColor::Rgb { r: 60, g: 60, b: 60 };

pub fn board_geometry(orientation: Orientation) -> BoardGeometry {
    BoardGeometry::new(BOARD_X, BOARD_Y, CELL_WIDTH, CELL_HEIGHT, orientation)
}

/// Everything the game screen shows besides the session itself.
pub struct GameView<'a> {
    pub geometry: &'a BoardGeometry,
    pub selected: Option<Square>,
    /// Legal destinations of the selected piece.
    pub targets: &'a [Square],
    pub notice: Option<&'a str>,
    pub promoting: bool,
    pub failure: Option<&'a str>,
}

pub fn clear(out: &mut impl Write) -> io::Result<()> {
    queue!(out, style::ResetColor, terminal::Clear(terminal::ClearType::All))
}

pub fn draw_menu(out: &mut impl Write, menu: &Menu) -> io::Result<()> {
    line(out, 4, 1, menu.title().bold())?;
    for button in menu.buttons() {
        let label = format!(" {:<width$}", button.label, width = usize::from(button.width) - 1);
        line(out, button.x, button.y, label.on(BUTTON).with(TermColor::White))?;
    }
    if let Some(confirmation) = menu.confirmation() {
        line(out, 4, 4, confirmation.with(TermColor::Green))?;
    }
    let help = match menu.buttons().len() {
        0 => "Esc: back   q: quit",
        _ => "click or press a number   Esc: back   q: quit",
    };
    line(out, 4, 12, help.with(TermColor::DarkGrey))?;
    out.flush()
}

pub fn draw_game<E: EngineProvider>(
    out: &mut impl Write,
    session: &Session<E>,
    view: &GameView<'_>,
) -> io::Result<()> {
    let geometry = view.geometry;
    draw_board(out, session, view)?;
    draw_panel(out, session)?;

    let left = geometry.origin_x;
    let below = geometry.origin_y + geometry.height() + 1;
    let back = "press any key to return to the menu";
    match (view.failure, session.result()) {
        (Some(failure), _) => {
            line(out, left, below, failure.red().bold())?;
            line(out, left, below + 1, back.dark_grey())?;
        }
        (None, Some(result)) => {
            let banner = format!("{} ({})", result.message(), result.detail());
            line(out, left, below, banner.magenta().bold())?;
            line(out, left, below + 1, back.dark_grey())?;
        }
        (None, None) if view.promoting => {
            let prompt = "Promote to: (q)ueen (r)ook (b)ishop k(n)ight";
            line(out, left, below, prompt.yellow())?;
            line(out, left, below + 1, "Esc: cancel".dark_grey())?;
        }
        (None, None) => {
            line(out, left, below, "".stylize())?;
            line(out, left, below + 1, "Esc: menu   q: quit".dark_grey())?;
        }
    }

    if let Some(notice) = view.notice {
        let text = format!(" {notice} ");
        let width = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
        let x = geometry.origin_x + geometry.width().saturating_sub(width) / 2;
        let y = geometry.origin_y + geometry.height() / 2 - 1;
        queue!(
            out,
            cursor::MoveTo(x, y),
            style::PrintStyledContent(text.white().on_red().bold())
        )?;
    }
    out.flush()
}

fn draw_board<E: EngineProvider>(
    out: &mut impl Write,
    session: &Session<E>,
    view: &GameView<'_>,
) -> io::Result<()> {
    let game = session.game();
    let geometry = view.geometry;
    let last = game
        .last_move()
        .map(|played| (played.candidate.from, played.candidate.to));

    for row in 0..8 {
        for col in 0..8 {
            let square = geometry.square_at_cell(row, col);
            let background = if view.selected == Some(square) {
                SELECTED
            } else if last.is_some_and(|(from, to)| square == from || square == to) {
                LAST_MOVE
            } else if is_light(square) {
                LIGHT
            } else {
                DARK
            };
            let (x, y) = geometry.origin_of(square);
            let blank = " ".repeat(usize::from(CELL_WIDTH));
            for dy in 0..CELL_HEIGHT {
                queue!(
                    out,
                    cursor::MoveTo(x, y + dy),
                    style::PrintStyledContent(blank.as_str().on(background))
                )?;
            }
            let center = cursor::MoveTo(x + CELL_WIDTH / 2, y + CELL_HEIGHT / 2);
            let target = view.targets.contains(&square);
            match game.piece_at(square) {
                Some(piece) => {
                    let foreground = match (target, piece.color) {
                        (true, _) => TermColor::Red,
                        (false, Color::White) => TermColor::White,
                        (false, Color::Black) => TermColor::Black,
                    };
                    queue!(
                        out,
                        center,
                        style::PrintStyledContent(glyph(piece).with(foreground).on(background))
                    )?;
                }
                None if target => {
                    let dot = "•".with(TARGET).on(background);
                    queue!(out, center, style::PrintStyledContent(dot))?;
                }
                None => {}
            }
        }
    }

    // Coordinates.
    for i in 0..8 {
        let square = geometry.square_at_cell(i, i);
        let (_, y) = geometry.origin_of(square);
        queue!(
            out,
            cursor::MoveTo(geometry.origin_x.saturating_sub(2), y + CELL_HEIGHT / 2),
            style::Print(square.rank().char())
        )?;
        let (x, _) = geometry.origin_of(square);
        queue!(
            out,
            cursor::MoveTo(x + CELL_WIDTH / 2, geometry.origin_y + geometry.height()),
            style::Print(square.file().char())
        )?;
    }
    Ok(())
}

fn draw_panel<E: EngineProvider>(out: &mut impl Write, session: &Session<E>) -> io::Result<()> {
    let game = session.game();
    let turn = if session.is_over() {
        "game over".to_string()
    } else if session.is_engine_turn() {
        format!("{} to move, engine thinking...", color_name(game.turn()))
    } else {
        format!("{} to move, your turn", color_name(game.turn()))
    };
    let check = if game.is_check() && !session.is_over() {
        "check!"
    } else {
        ""
    };
    let eval = match (session.white_score(), session.last_depth()) {
        (Some(score), Some(depth)) => format!("eval {} (depth {depth})", format_score(score)),
        (Some(score), None) => format!("eval {}", format_score(score)),
        _ => String::new(),
    };

    line(out, PANEL_X, BOARD_Y, session.engine().name().bold())?;
    line(out, PANEL_X, BOARD_Y + 1, session.mode().to_string().as_str().stylize())?;
    line(out, PANEL_X, BOARD_Y + 3, turn.as_str().stylize())?;
    line(out, PANEL_X, BOARD_Y + 4, check.yellow())?;
    line(out, PANEL_X, BOARD_Y + 5, eval.as_str().stylize())?;

    let moves = move_list(game.history());
    let skip = moves.len().saturating_sub(MOVE_LIST_ROWS);
    for i in 0..MOVE_LIST_ROWS {
        let text = moves.get(skip + i).map(String::as_str).unwrap_or("");
        let y = BOARD_Y + 7 + i as u16;
        line(out, PANEL_X, y, text.stylize())?;
    }
    Ok(())
}

/// Print `content` at `(x, y)` and blank the rest of the line.
fn line<D: std::fmt::Display>(
    out: &mut impl Write,
    x: u16,
    y: u16,
    content: style::StyledContent<D>,
) -> io::Result<()> {
    queue!(
        out,
        cursor::MoveTo(x, y),
        style::PrintStyledContent(content),
        style::ResetColor,
        terminal::Clear(terminal::ClearType::UntilNewLine)
    )
}

fn is_light(square: Square) -> bool {
    (u32::from(square.file()) + u32::from(square.rank())) % 2 == 1
}

fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}

/// Solid piece glyph; the color comes from the foreground.
pub fn glyph(piece: Piece) -> &'static str {
    match piece.role {
        Role::King => "♚",
        Role::Queen => "♛",
        Role::Rook => "♜",
        Role::Bishop => "♝",
        Role::Knight => "♞",
        Role::Pawn => "♟",
    }
}

/// Evaluation as shown in the panel, from White's point of view.
pub fn format_score(score: Score) -> String {
    match score {
        Score::Centipawns(cp) => format!("{:+.2}", f64::from(cp) / 100.0),
        Score::Mate(moves) => format!("#{moves}"),
    }
}

/// Numbered move pairs, one line per full move.
pub fn move_list(history: &[PlayedMove]) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for (i, played) in history.iter().enumerate() {
        match (i, played.side) {
            // A game from a FEN may start with Black to move.
            (0, Color::Black) => lines.push(format!("1. ... {}", played.san)),
            (_, Color::White) => lines.push(format!("{}. {}", lines.len() + 1, played.san)),
            (_, Color::Black) => match lines.last_mut() {
                Some(last) => {
                    last.push(' ');
                    last.push_str(&played.san);
                }
                None => lines.push(played.san.clone()),
            },
        }
    }
    lines
}
