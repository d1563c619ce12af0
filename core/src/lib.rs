//! Maze data structures and algorithms
//!
//! This crate holds everything that has real invariants in the maze game:
//! the wall lattice, the recursive backtracker that carves a perfect maze
//! into it, the depth-first solver and the reachability check used to guard
//! regeneration.
//!
//! All randomness flows through a single seeded [`SimpleLCG`] so that a seed
//! fully determines the sequence of mazes a game goes through.

pub mod connectivity;
pub mod error;
pub mod grid;
pub mod maze_gen;
pub mod rng;
pub mod solver;

// Re-export commonly used types for convenience
pub use error::MazeError;
pub use grid::{Cell, Direction, Grid, Position};
pub use maze_gen::{Maze, Opening, Side};
pub use rng::SimpleLCG;

/// Smallest allowed maze side, in cells
pub const MIN_SIZE: usize = 1;

/// A planned or replayed sequence of moves
pub type Path = Vec<Direction>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_size_is_one_cell() {
        assert_eq!(MIN_SIZE, 1);
        assert!(Grid::new(MIN_SIZE, MIN_SIZE).is_ok());
    }
}
