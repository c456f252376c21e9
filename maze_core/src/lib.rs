use serde::{Deserialize, Serialize};

pub mod generator;
pub mod map;
pub mod maze;
pub mod solver;

pub use generator::{GenerationStyle, GeneratorConfig, MazeGenerator, generate};
pub use map::{DimensionError, Grid};
pub use maze::{
    Cell, Endpoint, Maze, MazeError, is_passable, locate_endpoints, render, render_text,
};
pub use solver::{BreadthFirst, DepthFirst, SolveOutcome, Solver, Strategy, solve_bfs, solve_dfs};

/// A 0-indexed `(row, col)` coordinate on a maze grid.
///
/// Positions are plain values: they are compared, hashed and copied by
/// coordinate, so they double as node identities during a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    /// Returns the adjacent position in `direction`.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant.
    /// Upper bounds are the grid's concern, see [`Grid::contains`].
    #[inline]
    pub fn step(self, direction: Direction) -> Option<Position> {
        self.offset(direction, 1)
    }

    /// Returns the position `distance` cells away in `direction`.
    pub fn offset(self, direction: Direction, distance: usize) -> Option<Position> {
        let (dr, dc) = direction.delta();
        let distance = isize::try_from(distance).ok()?;
        self.translate(dr.checked_mul(distance)?, dc.checked_mul(distance)?)
    }

    /// Shifts the position by a signed `(row, col)` delta.
    pub fn translate(self, dr: isize, dc: isize) -> Option<Position> {
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        Some(Position { row, col })
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the four axis-aligned moves. Diagonals are never used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    /// Neighbor exploration order shared by both solvers: right, down, left, up.
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];

    /// Returns the `(row, col)` delta of a single step.
    #[inline]
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Up => (-1, 0),
        }
    }
}
