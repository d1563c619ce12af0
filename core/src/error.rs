use thiserror::Error;

use crate::grid::{Direction, Position};
use crate::maze_gen::Side;

/// Contract violations on the grid and maze structure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MazeError {
    #[error("maze dimensions must be at least 1x1 and fit in memory, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("cell ({}, {}) is outside the {width}x{height} grid", .position.x, .position.y)]
    OutOfBounds {
        position: Position,
        width: usize,
        height: usize,
    },

    #[error("cells {0:?} and {1:?} are not adjacent")]
    NotAdjacent(Position, Position),

    #[error("wall {1:?} of cell {0:?} does not face the outside of the grid")]
    NotOutward(Position, Direction),

    #[error("expected {expected} cells, found {actual}")]
    CellCountMismatch { expected: usize, actual: usize },

    #[error("wall {direction:?} of cell {position:?} disagrees with its neighbour")]
    InconsistentWall {
        position: Position,
        direction: Direction,
    },

    #[error("cell {0:?} does not lie on the {1:?} side")]
    NotOnSide(Position, Side),

    #[error("opening at {0:?} on the {1:?} side still has its wall")]
    OpeningClosed(Position, Side),

    #[error("entrance and exit are both on the {0:?} side")]
    SameSide(Side),

    #[error("entrance and exit share cell {0:?}")]
    SameCell(Position),
}
