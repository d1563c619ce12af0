//! Maze generation using Recursive Backtracker algorithm
//!
//! Algorithm: Recursive Backtracker (DFS with backtracking)
//! 1. Start at (0, 0), mark as visited, push it
//! 2. While stack is not empty:
//!    - Peek the top cell and collect its unvisited neighbours (Up, Right, Down, Left)
//!    - If neighbours exist:
//!      * Choose one with the shared random source
//!      * Remove wall between current and neighbour
//!      * Mark neighbour as visited, push to stack
//!    - Else: backtrack (pop from stack)
//! 3. Open an entrance and an exit on two different sides of the perimeter
//!
//! The result is a spanning tree over the grid: every cell reachable, no cycles.

use serde::{Deserialize, Serialize};

use crate::connectivity;
use crate::error::MazeError;
use crate::grid::{Direction, Grid, Position};
use crate::rng::SimpleLCG;
use crate::solver;
use crate::Path;

/// One of the four edges of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    /// Direction pointing out of the grid through this side
    pub fn outward(self) -> Direction {
        match self {
            Side::Top => Direction::Up,
            Side::Right => Direction::Right,
            Side::Bottom => Direction::Down,
            Side::Left => Direction::Left,
        }
    }

    fn contains(self, grid: &Grid, position: Position) -> bool {
        match self {
            Side::Top => position.y == 0,
            Side::Right => position.x == grid.width() - 1,
            Side::Bottom => position.y == grid.height() - 1,
            Side::Left => position.x == 0,
        }
    }
}

/// An entrance or exit: a perimeter cell and the side its wall was opened on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opening {
    pub cell: Position,
    pub side: Side,
}

/// A carved grid plus its entrance and exit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    grid: Grid,
    entrance: Opening,
    exit: Opening,
}

impl Maze {
    /// Generate a maze using the recursive backtracker algorithm
    ///
    /// # Arguments
    /// * `width` - Number of cell columns
    /// * `height` - Number of cell rows
    /// * `rng` - Shared random source; the same state yields the same maze
    pub fn generate(width: usize, height: usize, rng: &mut SimpleLCG) -> Result<Self, MazeError> {
        let mut grid = Grid::new(width, height)?;
        let (entrance, exit) = carve(&mut grid, rng)?;
        tracing::debug!(
            "generated {}x{} maze, entrance {:?}, exit {:?}",
            width,
            height,
            entrance,
            exit
        );
        Ok(Self {
            grid,
            entrance,
            exit,
        })
    }

    /// Re-carve in place: new spanning tree, new entrance and exit, same size
    pub fn regenerate(&mut self, rng: &mut SimpleLCG) -> Result<(), MazeError> {
        self.grid.reset();
        let (entrance, exit) = carve(&mut self.grid, rng)?;
        self.entrance = entrance;
        self.exit = exit;
        Ok(())
    }

    /// Assemble a maze from stored parts, checking the opening invariants.
    /// Reachability is not checked here; see [`Maze::exit_reachable_from`].
    pub fn from_parts(grid: Grid, entrance: Opening, exit: Opening) -> Result<Self, MazeError> {
        for opening in [entrance, exit] {
            grid.index_of(opening.cell)?;
            if !opening.side.contains(&grid, opening.cell) {
                return Err(MazeError::NotOnSide(opening.cell, opening.side));
            }
            if grid.has_wall(opening.cell, opening.side.outward())? {
                return Err(MazeError::OpeningClosed(opening.cell, opening.side));
            }
        }
        if entrance.side == exit.side {
            return Err(MazeError::SameSide(entrance.side));
        }
        if entrance.cell == exit.cell && grid.len() > 1 {
            return Err(MazeError::SameCell(entrance.cell));
        }

        Ok(Self {
            grid,
            entrance,
            exit,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn entrance(&self) -> Position {
        self.entrance.cell
    }

    pub fn exit(&self) -> Position {
        self.exit.cell
    }

    pub fn entrance_opening(&self) -> Opening {
        self.entrance
    }

    pub fn exit_opening(&self) -> Opening {
        self.exit
    }

    /// First path found from `start` to the exit, empty if none
    pub fn solve(&self, start: Position) -> Result<Path, MazeError> {
        solver::solve(&self.grid, start, self.exit.cell)
    }

    /// The first `steps` moves of [`Maze::solve`]
    pub fn first_steps(&self, start: Position, steps: usize) -> Result<Path, MazeError> {
        solver::first_steps(&self.grid, start, self.exit.cell, steps)
    }

    pub fn exit_reachable_from(&self, start: Position) -> Result<bool, MazeError> {
        connectivity::exit_reachable(&self.grid, start, self.exit.cell)
    }

    /// Replay moves from `start`; `None` as soon as one of them is illegal
    pub fn walk(&self, start: Position, moves: &[Direction]) -> Option<Position> {
        moves.iter().try_fold(start, |position, &direction| {
            if self.grid.can_move(position, direction) {
                position.step(direction)
            } else {
                None
            }
        })
    }
}

/// Carve a fully walled grid and open its entrance and exit
fn carve(grid: &mut Grid, rng: &mut SimpleLCG) -> Result<(Opening, Opening), MazeError> {
    let visited = recursive_backtracker(grid, rng)?;
    debug_assert_eq!(visited, grid.len());
    create_entrance_and_exit(grid, rng)
}

/// Recursive backtracker algorithm (iterative with explicit stack)
///
/// Returns how many cells were visited, which is always every cell.
fn recursive_backtracker(grid: &mut Grid, rng: &mut SimpleLCG) -> Result<usize, MazeError> {
    let start = Position::new(0, 0);
    let mut stack = Vec::with_capacity(grid.len());
    let mut visited = 1;

    grid.mark_visited(start)?;
    stack.push(start);

    while let Some(&current) = stack.last() {
        let (neighbors, neighbor_count) = unvisited_neighbors(grid, current);

        if neighbor_count > 0 {
            let next = neighbors[rng.choice_index(neighbor_count)];

            grid.remove_wall_between(current, next)?;
            grid.mark_visited(next)?;
            stack.push(next);
            visited += 1;
        } else {
            // No unvisited neighbours, backtrack
            stack.pop();
        }
    }

    Ok(visited)
}

/// Unvisited in-bounds neighbours in Up, Right, Down, Left order
///
/// Returns: fixed array of neighbours with count (max 4 neighbours)
fn unvisited_neighbors(grid: &Grid, position: Position) -> ([Position; 4], usize) {
    let mut neighbors = [position; 4];
    let mut count = 0;

    for direction in Direction::ALL {
        if let Some(next) = grid.neighbor(position, direction) {
            let unvisited = grid.cell_at(next).map(|c| !c.is_visited()).unwrap_or(false);
            if unvisited {
                neighbors[count] = next;
                count += 1;
            }
        }
    }

    (neighbors, count)
}

/// Open an entrance and an exit on two different sides
///
/// The exit side is resampled until it differs from the entrance side. When
/// the grid has more than one cell the exit is also redrawn if it lands on
/// the entrance cell, which can happen at a corner.
fn create_entrance_and_exit(
    grid: &mut Grid,
    rng: &mut SimpleLCG,
) -> Result<(Opening, Opening), MazeError> {
    let entrance = pick_opening(grid, Side::ALL[rng.choice_index(4)], rng);

    let exit = loop {
        let side = Side::ALL[rng.choice_index(4)];
        if side == entrance.side {
            continue;
        }
        let candidate = pick_opening(grid, side, rng);
        if candidate.cell != entrance.cell || grid.len() == 1 {
            break candidate;
        }
    };

    grid.open_boundary(entrance.cell, entrance.side.outward())?;
    grid.open_boundary(exit.cell, exit.side.outward())?;
    Ok((entrance, exit))
}

/// Uniformly random cell along the given side
fn pick_opening(grid: &Grid, side: Side, rng: &mut SimpleLCG) -> Opening {
    let last_x = grid.width() - 1;
    let last_y = grid.height() - 1;
    let cell = match side {
        Side::Top => Position::new(rng.choice_index(grid.width()), 0),
        Side::Right => Position::new(last_x, rng.choice_index(grid.height())),
        Side::Bottom => Position::new(rng.choice_index(grid.width()), last_y),
        Side::Left => Position::new(0, rng.choice_index(grid.height())),
    };
    Opening { cell, side }
}
