//! Drawing
//!
//! The game never draws pixels itself. A frame is a list of pen-plotter style
//! [`DrawCommand`]s handed to a [`Renderer`]; the terminal front end uses
//! [`ascii_board`] instead.

use maze_core::{Direction, Position};
use serde::Serialize;

use crate::session::{Mode, Session};

/// 0xRRGGBB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color(pub u32);

impl Color {
    pub const PLAYER: Color = Color(0x0000FF);
    pub const AI: Color = Color(0xFF0000);
    pub const WALL: Color = Color(0x000000);
    pub const ENTRANCE: Color = Color(0x00FF00);
    pub const EXIT: Color = Color(0xFF0000);
    pub const PATH: Color = Color(0x00FF00);
    pub const TEXT: Color = Color(0x000000);
}

/// Wall line width, in pixels
pub const WALL_WIDTH: u32 = 2;

/// One pen instruction
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    SetColor { color: Color },
    SetLineWidth { width: u32 },
    PenUp,
    PenDown,
    Text { x: f64, y: f64, text: String },
}

/// Something that can carry out draw commands
pub trait Renderer {
    /// Called once before each full redraw
    fn begin_frame(&mut self) {}

    fn draw(&mut self, command: DrawCommand);
}

/// Records a frame, replacing the previous one
impl Renderer for Vec<DrawCommand> {
    fn begin_frame(&mut self) {
        self.clear();
    }

    fn draw(&mut self, command: DrawCommand) {
        self.push(command);
    }
}

/// `MM:SS`
pub fn format_time(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// HUD move counter: `Moves: h` solo, `Moves: h/a` competitive
pub fn moves_label(mode: &Mode) -> String {
    match mode.ai() {
        Some(ai) => format!("Moves: {}/{}", mode.human().moves(), ai.moves()),
        None => format!("Moves: {}", mode.human().moves()),
    }
}

/// Draw the whole scene: maze, openings, optional path, agents and HUD
pub fn draw_scene<R: Renderer + ?Sized>(
    session: &Session,
    overlay: Option<&[Direction]>,
    renderer: &mut R,
) {
    let maze = session.maze();
    let size = session.cell_size() as f64;
    renderer.begin_frame();

    // Walls: top and left of every cell, plus the far right and bottom edges
    renderer.draw(DrawCommand::SetLineWidth { width: WALL_WIDTH });
    renderer.draw(DrawCommand::SetColor { color: Color::WALL });
    for (position, cell) in maze.grid().cells() {
        for direction in Direction::ALL {
            let outer = match direction {
                Direction::Up | Direction::Left => true,
                Direction::Right => position.x == maze.width() - 1,
                Direction::Down => position.y == maze.height() - 1,
            };
            if outer && cell.has_wall(direction) {
                edge(renderer, position, direction, size);
            }
        }
    }

    for (opening, color) in [
        (maze.entrance_opening(), Color::ENTRANCE),
        (maze.exit_opening(), Color::EXIT),
    ] {
        renderer.draw(DrawCommand::SetColor { color });
        edge(renderer, opening.cell, opening.side.outward(), size);
    }

    if let Some(path) = overlay {
        renderer.draw(DrawCommand::SetColor { color: Color::PATH });
        let mut position = session.mode().human().position();
        let (x, y) = center(position, size);
        renderer.draw(DrawCommand::MoveTo { x, y });
        renderer.draw(DrawCommand::PenDown);
        for &direction in path {
            if !maze.grid().can_move(position, direction) {
                break;
            }
            let Some(next) = position.step(direction) else {
                break;
            };
            position = next;
            let (x, y) = center(position, size);
            renderer.draw(DrawCommand::LineTo { x, y });
        }
        renderer.draw(DrawCommand::PenUp);
    }

    let radius = (session.cell_size() / 3) as f64;
    let mode = session.mode();
    renderer.draw(DrawCommand::SetColor {
        color: Color::PLAYER,
    });
    circle(renderer, mode.human().position(), radius, size);
    if let Some(ai) = mode.ai() {
        renderer.draw(DrawCommand::SetColor { color: Color::AI });
        circle(renderer, ai.position(), radius, size);
    }

    let hud_y = maze.height() as f64 * size + size;
    renderer.draw(DrawCommand::SetColor { color: Color::TEXT });
    renderer.draw(DrawCommand::Text {
        x: 0.0,
        y: hud_y,
        text: format!("Time: {}", format_time(session.elapsed_secs())),
    });
    renderer.draw(DrawCommand::Text {
        x: maze.width() as f64 * size / 2.0,
        y: hud_y,
        text: moves_label(mode),
    });
}

fn center(position: Position, size: f64) -> (f64, f64) {
    (
        position.x as f64 * size + size / 2.0,
        position.y as f64 * size + size / 2.0,
    )
}

/// One wall of one cell as a single stroke
fn edge<R: Renderer + ?Sized>(renderer: &mut R, position: Position, direction: Direction, size: f64) {
    let left = position.x as f64 * size;
    let top = position.y as f64 * size;
    let (right, bottom) = (left + size, top + size);
    let ((x1, y1), (x2, y2)) = match direction {
        Direction::Up => ((left, top), (right, top)),
        Direction::Right => ((right, top), (right, bottom)),
        Direction::Down => ((left, bottom), (right, bottom)),
        Direction::Left => ((left, top), (left, bottom)),
    };
    renderer.draw(DrawCommand::PenUp);
    renderer.draw(DrawCommand::MoveTo { x: x1, y: y1 });
    renderer.draw(DrawCommand::PenDown);
    renderer.draw(DrawCommand::LineTo { x: x2, y: y2 });
    renderer.draw(DrawCommand::PenUp);
}

/// Agent marker: a closed polyline in 10 degree steps
fn circle<R: Renderer + ?Sized>(renderer: &mut R, position: Position, radius: f64, size: f64) {
    let (cx, cy) = center(position, size);
    renderer.draw(DrawCommand::PenUp);
    renderer.draw(DrawCommand::MoveTo { x: cx + radius, y: cy });
    renderer.draw(DrawCommand::PenDown);
    for degrees in (0..=360).step_by(10) {
        let radians = (degrees as f64).to_radians();
        renderer.draw(DrawCommand::LineTo {
            x: cx + radius * radians.cos(),
            y: cy + radius * radians.sin(),
        });
    }
    renderer.draw(DrawCommand::PenUp);
}

/// Text board for terminals
///
/// `#` wall, `P` human, `A` AI, `X` both on one cell, `.` path overlay.
/// The entrance and exit show as gaps in the outer wall. A HUD line follows.
pub fn ascii_board(session: &Session, overlay: Option<&[Direction]>) -> String {
    let maze = session.maze();
    let binary = maze.grid().to_binary_grid();
    let mut chars: Vec<Vec<char>> = binary
        .iter()
        .map(|row| row.iter().map(|&v| if v == 0 { '#' } else { ' ' }).collect())
        .collect();

    if let Some(path) = overlay {
        let mut position = session.mode().human().position();
        for &direction in path {
            if !maze.grid().can_move(position, direction) {
                break;
            }
            let Some(next) = position.step(direction) else {
                break;
            };
            // Mark the passage between the two cell centres as well
            let (dx, dy) = direction.delta();
            let row = (position.y * 2 + 1).checked_add_signed(dy);
            let col = (position.x * 2 + 1).checked_add_signed(dx);
            if let (Some(row), Some(col)) = (row, col) {
                chars[row][col] = '.';
            }
            position = next;
            mark(&mut chars, position, '.');
        }
    }

    let mode = session.mode();
    let human = mode.human().position();
    match mode.ai().map(|ai| ai.position()) {
        Some(ai) if ai == human => mark(&mut chars, human, 'X'),
        Some(ai) => {
            mark(&mut chars, human, 'P');
            mark(&mut chars, ai, 'A');
        }
        None => mark(&mut chars, human, 'P'),
    }

    let mut board: String = chars
        .into_iter()
        .map(|row| row.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n");
    board.push('\n');
    board.push_str(&format!(
        "Time: {}  {}",
        format_time(session.elapsed_secs()),
        moves_label(mode)
    ));
    board
}

fn mark(chars: &mut [Vec<char>], position: Position, symbol: char) {
    chars[position.y * 2 + 1][position.x * 2 + 1] = symbol;
}
