//! Cell lattice and wall topology
//!
//! Walls are stored per cell as `[Up, Right, Down, Left]`. Interior walls
//! only ever disappear in matched pairs through [`Grid::remove_wall_between`];
//! the only walls removed alone are the outward ones of the entrance and exit,
//! through [`Grid::open_boundary`].

use serde::{Deserialize, Serialize};

use crate::error::MazeError;

/// A move or wall side, in the fixed order used for wall indices and search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All directions in index order
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Index into a cell's wall array
    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// (dx, dy) with y growing downwards
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    /// Keyboard symbol (WASD)
    pub fn symbol(self) -> char {
        match self {
            Direction::Up => 'w',
            Direction::Right => 'd',
            Direction::Down => 's',
            Direction::Left => 'a',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol.to_ascii_lowercase() {
            'w' => Some(Direction::Up),
            'd' => Some(Direction::Right),
            's' => Some(Direction::Down),
            'a' => Some(Direction::Left),
            _ => None,
        }
    }
}

/// Column `x`, row `y`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// The position one step away, or `None` when it would go below zero.
    /// Upper bounds are the grid's business.
    pub fn step(self, direction: Direction) -> Option<Position> {
        let (dx, dy) = direction.delta();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Position { x, y })
    }

    /// Direction leading from `self` to an orthogonally adjacent `other`
    pub fn direction_to(self, other: Position) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|&dir| self.step(dir) == Some(other))
    }
}

/// A cell in the maze with walls in four directions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    walls: [bool; 4], // [Up, Right, Down, Left]
    visited: bool,
}

impl Cell {
    fn new() -> Self {
        Self {
            walls: [true, true, true, true], // All walls present initially
            visited: false,
        }
    }

    pub fn has_wall(&self, direction: Direction) -> bool {
        self.walls[direction.index()]
    }

    pub fn walls(&self) -> [bool; 4] {
        self.walls
    }

    /// Only meaningful while a carve is in progress
    pub fn is_visited(&self) -> bool {
        self.visited
    }
}

/// Fixed-size rectangular array of cells, stored row by row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridRecord", into = "GridRecord")]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid where every cell has all four walls
    pub fn new(width: usize, height: usize) -> Result<Self, MazeError> {
        let len = cell_count(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![Cell::new(); len],
        })
    }

    /// Put every wall back and clear visited flags, keeping the dimensions
    pub fn reset(&mut self) {
        self.cells.fill(Cell::new());
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x < self.width && position.y < self.height
    }

    pub(crate) fn index_of(&self, position: Position) -> Result<usize, MazeError> {
        if !self.contains(position) {
            return Err(MazeError::OutOfBounds {
                position,
                width: self.width,
                height: self.height,
            });
        }
        Ok(position.y * self.width + position.x)
    }

    pub(crate) fn position_of(&self, index: usize) -> Position {
        Position::new(index % self.width, index / self.width)
    }

    pub fn cell_at(&self, position: Position) -> Result<&Cell, MazeError> {
        let index = self.index_of(position)?;
        Ok(&self.cells[index])
    }

    fn cell_at_mut(&mut self, position: Position) -> Result<&mut Cell, MazeError> {
        let index = self.index_of(position)?;
        Ok(&mut self.cells[index])
    }

    /// Iterate cells with their coordinates, row by row
    pub fn cells(&self) -> impl Iterator<Item = (Position, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (self.position_of(i), cell))
    }

    /// In-bounds neighbour in the given direction, walls ignored
    pub fn neighbor(&self, position: Position, direction: Direction) -> Option<Position> {
        position
            .step(direction)
            .filter(|&next| self.contains(next))
    }

    pub fn has_wall(&self, position: Position, direction: Direction) -> Result<bool, MazeError> {
        Ok(self.cell_at(position)?.has_wall(direction))
    }

    /// A move is legal iff the destination is in bounds and the current
    /// cell's wall on that side is absent. Out-of-bounds origins are never legal.
    pub fn can_move(&self, position: Position, direction: Direction) -> bool {
        match self.cell_at(position) {
            Ok(cell) => {
                !cell.has_wall(direction) && self.neighbor(position, direction).is_some()
            }
            Err(_) => false,
        }
    }

    /// Clear the matching walls of two adjacent cells
    pub fn remove_wall_between(&mut self, a: Position, b: Position) -> Result<(), MazeError> {
        self.index_of(a)?;
        self.index_of(b)?;
        let direction = a.direction_to(b).ok_or(MazeError::NotAdjacent(a, b))?;

        self.cell_at_mut(a)?.walls[direction.index()] = false;
        self.cell_at_mut(b)?.walls[direction.opposite().index()] = false;
        Ok(())
    }

    /// Clear an outward-facing wall of a perimeter cell
    pub fn open_boundary(&mut self, position: Position, direction: Direction) -> Result<(), MazeError> {
        self.index_of(position)?;
        if self.neighbor(position, direction).is_some() {
            return Err(MazeError::NotOutward(position, direction));
        }
        self.cell_at_mut(position)?.walls[direction.index()] = false;
        Ok(())
    }

    pub(crate) fn mark_visited(&mut self, position: Position) -> Result<(), MazeError> {
        self.cell_at_mut(position)?.visited = true;
        Ok(())
    }

    /// Number of interior wall pairs that have been removed.
    /// A perfect maze has exactly `width * height - 1`.
    pub fn passage_count(&self) -> usize {
        self.cells()
            .map(|(pos, cell)| {
                [Direction::Right, Direction::Down]
                    .into_iter()
                    .filter(|&dir| !cell.has_wall(dir) && self.neighbor(pos, dir).is_some())
                    .count()
            })
            .sum()
    }

    /// Convert maze to binary grid representation
    ///
    /// Creates a grid where:
    /// - 0 = wall
    /// - 1 = path (walkable cell or open passage)
    ///
    /// For a maze with W columns and H rows:
    /// - Grid size is (H*2 + 1) rows × (W*2 + 1) columns
    /// - Cell centers are at (y*2+1, x*2+1)
    /// - Entrance and exit show up as 1s on the outer border
    pub fn to_binary_grid(&self) -> Vec<Vec<u8>> {
        let mut grid = vec![vec![0u8; self.width * 2 + 1]; self.height * 2 + 1];

        for (pos, cell) in self.cells() {
            // Cell center position in grid
            let gr = pos.y * 2 + 1;
            let gc = pos.x * 2 + 1;

            // Cell center is always a path
            grid[gr][gc] = 1;

            // Open passages based on walls
            if !cell.has_wall(Direction::Up) {
                grid[gr - 1][gc] = 1;
            }
            if !cell.has_wall(Direction::Down) {
                grid[gr + 1][gc] = 1;
            }
            if !cell.has_wall(Direction::Right) {
                grid[gr][gc + 1] = 1;
            }
            if !cell.has_wall(Direction::Left) {
                grid[gr][gc - 1] = 1;
            }
        }

        grid
    }

    /// Every interior wall must agree with its neighbour's facing wall
    fn check_consistency(&self) -> Result<(), MazeError> {
        for (position, cell) in self.cells() {
            for direction in [Direction::Right, Direction::Down] {
                if let Some(next) = self.neighbor(position, direction) {
                    let facing = self.cell_at(next)?.has_wall(direction.opposite());
                    if cell.has_wall(direction) != facing {
                        return Err(MazeError::InconsistentWall {
                            position,
                            direction,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Cells in a `width` x `height` grid, if that is a usable size
fn cell_count(width: usize, height: usize) -> Result<usize, MazeError> {
    match width.checked_mul(height) {
        Some(len) if len > 0 => Ok(len),
        _ => Err(MazeError::InvalidDimensions { width, height }),
    }
}

/// On-disk shape of a grid: dimensions plus one wall array per cell
#[derive(Serialize, Deserialize)]
struct GridRecord {
    width: usize,
    height: usize,
    walls: Vec<[bool; 4]>,
}

impl From<Grid> for GridRecord {
    fn from(grid: Grid) -> Self {
        GridRecord {
            width: grid.width,
            height: grid.height,
            walls: grid.cells.iter().map(|cell| cell.walls).collect(),
        }
    }
}

impl TryFrom<GridRecord> for Grid {
    type Error = MazeError;

    fn try_from(record: GridRecord) -> Result<Self, Self::Error> {
        // The wall array bounds the allocation, not the stated dimensions
        let expected = cell_count(record.width, record.height)?;
        if record.walls.len() != expected {
            return Err(MazeError::CellCountMismatch {
                expected,
                actual: record.walls.len(),
            });
        }

        let mut grid = Grid::new(record.width, record.height)?;

        for (cell, walls) in grid.cells.iter_mut().zip(record.walls) {
            cell.walls = walls;
        }
        grid.check_consistency()?;
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_fully_walled() {
        let grid = Grid::new(4, 3).unwrap();
        assert_eq!(grid.len(), 12);
        for (_, cell) in grid.cells() {
            assert_eq!(cell.walls(), [true; 4]);
            assert!(!cell.is_visited());
        }
        assert_eq!(grid.passage_count(), 0);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert_eq!(
            Grid::new(0, 5),
            Err(MazeError::InvalidDimensions { width: 0, height: 5 })
        );
        assert!(Grid::new(5, 0).is_err());
    }

    #[test]
    fn test_cell_at_out_of_bounds() {
        let grid = Grid::new(3, 2).unwrap();
        assert!(grid.cell_at(Position::new(2, 1)).is_ok());
        assert!(matches!(
            grid.cell_at(Position::new(3, 0)),
            Err(MazeError::OutOfBounds { .. })
        ));
        assert!(matches!(
            grid.cell_at(Position::new(0, 2)),
            Err(MazeError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_remove_wall_between_is_symmetric() {
        let mut grid = Grid::new(3, 3).unwrap();
        let before = grid.clone();
        let a = Position::new(1, 1);
        let b = Position::new(2, 1);

        grid.remove_wall_between(a, b).unwrap();

        assert!(!grid.has_wall(a, Direction::Right).unwrap());
        assert!(!grid.has_wall(b, Direction::Left).unwrap());

        // No other wall flag changed
        let mut changed = 0;
        for ((pos, cell), (_, old)) in grid.cells().zip(before.cells()) {
            for dir in Direction::ALL {
                if cell.has_wall(dir) != old.has_wall(dir) {
                    changed += 1;
                    assert!(
                        (pos == a && dir == Direction::Right) || (pos == b && dir == Direction::Left)
                    );
                }
            }
        }
        assert_eq!(changed, 2);
        assert_eq!(grid.passage_count(), 1);
    }

    #[test]
    fn test_remove_wall_between_vertical_neighbours() {
        let mut grid = Grid::new(2, 2).unwrap();
        grid.remove_wall_between(Position::new(0, 1), Position::new(0, 0))
            .unwrap();
        assert!(!grid.has_wall(Position::new(0, 0), Direction::Down).unwrap());
        assert!(!grid.has_wall(Position::new(0, 1), Direction::Up).unwrap());
    }

    #[test]
    fn test_remove_wall_between_non_adjacent_fails() {
        let mut grid = Grid::new(3, 3).unwrap();
        let before = grid.clone();

        assert_eq!(
            grid.remove_wall_between(Position::new(0, 0), Position::new(1, 1)),
            Err(MazeError::NotAdjacent(Position::new(0, 0), Position::new(1, 1)))
        );
        assert!(grid
            .remove_wall_between(Position::new(0, 0), Position::new(0, 0))
            .is_err());
        assert!(grid
            .remove_wall_between(Position::new(2, 2), Position::new(3, 2))
            .is_err());
        assert_eq!(grid, before);
    }

    #[test]
    fn test_open_boundary_only_outward() {
        let mut grid = Grid::new(3, 3).unwrap();
        assert!(grid.open_boundary(Position::new(0, 1), Direction::Left).is_ok());
        assert!(!grid.has_wall(Position::new(0, 1), Direction::Left).unwrap());
        assert_eq!(
            grid.open_boundary(Position::new(1, 1), Direction::Up),
            Err(MazeError::NotOutward(Position::new(1, 1), Direction::Up))
        );
    }

    #[test]
    fn test_can_move() {
        let mut grid = Grid::new(2, 1).unwrap();
        let origin = Position::new(0, 0);
        assert!(!grid.can_move(origin, Direction::Right));

        grid.remove_wall_between(origin, Position::new(1, 0)).unwrap();
        assert!(grid.can_move(origin, Direction::Right));
        assert!(grid.can_move(Position::new(1, 0), Direction::Left));

        // An opened boundary wall still leads out of bounds
        grid.open_boundary(origin, Direction::Up).unwrap();
        assert!(!grid.can_move(origin, Direction::Up));
        assert!(!grid.can_move(Position::new(5, 5), Direction::Up));
    }

    #[test]
    fn test_reset_restores_walls() {
        let mut grid = Grid::new(2, 2).unwrap();
        grid.remove_wall_between(Position::new(0, 0), Position::new(1, 0))
            .unwrap();
        grid.mark_visited(Position::new(1, 1)).unwrap();

        grid.reset();
        assert_eq!(grid, Grid::new(2, 2).unwrap());
    }

    #[test]
    fn test_to_binary_grid() {
        let mut grid = Grid::new(2, 1).unwrap();
        grid.remove_wall_between(Position::new(0, 0), Position::new(1, 0))
            .unwrap();
        grid.open_boundary(Position::new(0, 0), Direction::Left).unwrap();

        let binary = grid.to_binary_grid();
        assert_eq!(
            binary,
            vec![
                vec![0, 0, 0, 0, 0],
                vec![1, 1, 1, 1, 0],
                vec![0, 0, 0, 0, 0],
            ]
        );
    }

    #[test]
    fn test_record_with_inconsistent_walls_rejected() {
        let record = GridRecord {
            width: 2,
            height: 1,
            walls: vec![[true, false, true, true], [true, true, true, true]],
        };
        assert_eq!(
            Grid::try_from(record),
            Err(MazeError::InconsistentWall {
                position: Position::new(0, 0),
                direction: Direction::Right,
            })
        );
    }

    #[test]
    fn test_oversized_dimensions_rejected() {
        let width = usize::MAX / 2;
        assert_eq!(
            Grid::new(width, 4),
            Err(MazeError::InvalidDimensions { width, height: 4 })
        );

        let record = GridRecord {
            width,
            height: 4,
            walls: vec![[true; 4]; 4],
        };
        assert_eq!(
            Grid::try_from(record),
            Err(MazeError::InvalidDimensions { width, height: 4 })
        );
    }

    #[test]
    fn test_huge_record_checked_before_allocating() {
        let record = GridRecord {
            width: 1_000_000,
            height: 1_000_000,
            walls: vec![[true; 4]; 2],
        };
        assert_eq!(
            Grid::try_from(record),
            Err(MazeError::CellCountMismatch {
                expected: 1_000_000_000_000,
                actual: 2
            })
        );
    }

    #[test]
    fn test_record_with_wrong_cell_count_rejected() {
        let record = GridRecord {
            width: 2,
            height: 2,
            walls: vec![[true; 4]],
        };
        assert_eq!(
            Grid::try_from(record),
            Err(MazeError::CellCountMismatch {
                expected: 4,
                actual: 1
            })
        );
    }

    #[test]
    fn test_record_round_trip_keeps_walls_and_drops_visited() {
        let mut grid = Grid::new(3, 2).unwrap();
        grid.remove_wall_between(Position::new(1, 0), Position::new(1, 1))
            .unwrap();
        grid.open_boundary(Position::new(2, 1), Direction::Right).unwrap();
        let mut visited = grid.clone();
        visited.mark_visited(Position::new(0, 0)).unwrap();

        let restored = Grid::try_from(GridRecord::from(visited)).unwrap();
        assert_eq!(restored, grid);
    }
}
