//! Depth-first path search to the exit
//!
//! Runs with explicit stack frames instead of recursion so large mazes cannot
//! exhaust the call stack, while keeping the recursive search order exactly:
//! directions are tried Up, Right, Down, Left and the first path that reaches
//! the exit wins. It is not necessarily the shortest, although on a perfect
//! maze it is the only simple one.

use crate::error::MazeError;
use crate::grid::{Direction, Grid, Position};
use crate::Path;

/// One level of the search: a cell and the next direction to try from it
struct Frame {
    position: Position,
    next_direction: usize,
}

/// Find a path from `start` to `exit` over open adjacencies
///
/// # Returns
/// * `Ok(path)` - Moves that lead from `start` to `exit`; empty when `start`
///   already is the exit or when the exit cannot be reached
/// * `Err(OutOfBounds)` - If `start` or `exit` lies outside the grid
pub fn solve(grid: &Grid, start: Position, exit: Position) -> Result<Path, MazeError> {
    let start_index = grid.index_of(start)?;
    grid.index_of(exit)?;

    let mut path: Path = Vec::new();
    if start == exit {
        return Ok(path);
    }

    let mut visited = vec![false; grid.len()];
    visited[start_index] = true;
    let mut frames = vec![Frame {
        position: start,
        next_direction: 0,
    }];

    while let Some(frame) = frames.last_mut() {
        let current = frame.position;
        let mut descended = None;

        while frame.next_direction < Direction::ALL.len() {
            let direction = Direction::ALL[frame.next_direction];
            frame.next_direction += 1;

            if !grid.can_move(current, direction) {
                continue;
            }
            let Some(next) = grid.neighbor(current, direction) else {
                continue;
            };
            let index = grid.index_of(next)?;
            if visited[index] {
                continue;
            }

            descended = Some((direction, next, index));
            break;
        }

        match descended {
            Some((direction, next, index)) => {
                path.push(direction);
                if next == exit {
                    return Ok(path);
                }
                visited[index] = true;
                frames.push(Frame {
                    position: next,
                    next_direction: 0,
                });
            }
            None => {
                // Dead end: free the cell for other branches and undo the move into it
                visited[grid.index_of(current)?] = false;
                frames.pop();
                path.pop();
            }
        }
    }

    tracing::debug!("no path from {:?} to {:?}", start, exit);
    Ok(Vec::new())
}

/// The first `steps` moves of the solution from `start`
pub fn first_steps(
    grid: &Grid,
    start: Position,
    exit: Position,
    steps: usize,
) -> Result<Path, MazeError> {
    let mut path = solve(grid, start, exit)?;
    path.truncate(steps);
    Ok(path)
}
