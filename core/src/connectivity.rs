//! Reachability checks over open adjacencies
//!
//! Answers only "can the exit be reached from here", never how. Regeneration
//! uses it to make sure no agent is left stranded.

use crate::error::MazeError;
use crate::grid::{Direction, Grid, Position};

/// Whether `exit` can be reached from `start`
pub fn exit_reachable(grid: &Grid, start: Position, exit: Position) -> Result<bool, MazeError> {
    grid.index_of(exit)?;
    let mut found = false;
    flood(grid, start, |position| {
        found = position == exit;
        found
    })?;
    Ok(found)
}

/// Number of cells reachable from `start`, `start` included
pub fn reachable_count(grid: &Grid, start: Position) -> Result<usize, MazeError> {
    let mut count = 0;
    flood(grid, start, |_| {
        count += 1;
        false
    })?;
    Ok(count)
}

/// Depth-first flood fill calling `visit` once per reached cell until it returns true
fn flood<F>(grid: &Grid, start: Position, mut visit: F) -> Result<(), MazeError>
where
    F: FnMut(Position) -> bool,
{
    let mut visited = vec![false; grid.len()];
    let mut stack = vec![start];
    visited[grid.index_of(start)?] = true;

    while let Some(current) = stack.pop() {
        if visit(current) {
            return Ok(());
        }

        for direction in Direction::ALL {
            if !grid.can_move(current, direction) {
                continue;
            }
            if let Some(next) = grid.neighbor(current, direction) {
                let index = grid.index_of(next)?;
                if !visited[index] {
                    visited[index] = true;
                    stack.push(next);
                }
            }
        }
    }

    Ok(())
}
