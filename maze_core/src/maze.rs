use std::{fmt, str::FromStr};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    Position,
    map::{DimensionError, Grid},
};

/// State of a single maze cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Wall,
    Open,
    Start,
    End,
    /// A cell on a solution route. Only produced by [`render`].
    Path,
}

impl Cell {
    /// Everything except a wall can be walked on.
    #[inline]
    pub const fn is_passable(self) -> bool {
        !matches!(self, Cell::Wall)
    }

    #[inline]
    pub const fn is_endpoint(self) -> bool {
        matches!(self, Cell::Start | Cell::End)
    }

    /// Maps a textual symbol to a cell.
    ///
    /// `#` is a wall, `S` the start, `E` the end; any other non-whitespace
    /// symbol is open floor. Whitespace has no meaning and yields `None`.
    pub fn from_symbol(symbol: char) -> Option<Cell> {
        match symbol {
            '#' => Some(Cell::Wall),
            'S' => Some(Cell::Start),
            'E' => Some(Cell::End),
            c if c.is_whitespace() => None,
            _ => Some(Cell::Open),
        }
    }

    pub const fn symbol(self) -> char {
        match self {
            Cell::Wall => '#',
            Cell::Open => '=',
            Cell::Start => 'S',
            Cell::End => 'E',
            Cell::Path => '+',
        }
    }
}

/// Names the endpoint(s) a grid is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
    Both,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Start => write!(f, "start ('S')"),
            Endpoint::End => write!(f, "end ('E')"),
            Endpoint::Both => write!(f, "start ('S') and end ('E')"),
        }
    }
}

/// Errors surfaced by maze construction, loading and generation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MazeError {
    #[error("invalid maze dimensions: {0}")]
    InvalidDimensions(#[from] DimensionError),
    #[error("maze has no {0} cell")]
    MissingEndpoint(Endpoint),
    #[error("whitespace {symbol:?} at ({row}, {col}) is not a maze symbol")]
    InvalidSymbol { row: usize, col: usize, symbol: char },
    #[error("generator setting `{name}` is invalid: {detail}")]
    InvalidConfig { name: &'static str, detail: String },
}

/// Finds the start and end cells of a grid.
///
/// Scans in row-major order. When a marker appears more than once the last
/// occurrence wins.
pub fn locate_endpoints(grid: &Grid<Cell>) -> Result<(Position, Position), MazeError> {
    let mut start = None;
    let mut end = None;
    for (pos, cell) in grid.enumerate() {
        match cell {
            Cell::Start => start = Some(pos),
            Cell::End => end = Some(pos),
            _ => {}
        }
    }
    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        (None, Some(_)) => Err(MazeError::MissingEndpoint(Endpoint::Start)),
        (Some(_), None) => Err(MazeError::MissingEndpoint(Endpoint::End)),
        (None, None) => Err(MazeError::MissingEndpoint(Endpoint::Both)),
    }
}

/// Returns whether `pos` can be walked on. Out-of-bounds positions never can.
#[inline]
pub fn is_passable(grid: &Grid<Cell>, pos: Position) -> bool {
    grid.get(pos).is_some_and(|cell| cell.is_passable())
}

/// Projects a grid and an optional route into rows of cells for display.
///
/// Route cells are marked [`Cell::Path`] unless they hold an endpoint.
/// Positions outside the grid are ignored. The grid itself is untouched.
pub fn render(grid: &Grid<Cell>, path: Option<&[Position]>) -> Vec<Vec<Cell>> {
    let mut rows = grid.to_rows();
    for pos in path.unwrap_or_default() {
        if let Some(cell) = rows.get_mut(pos.row).and_then(|row| row.get_mut(pos.col)) {
            if !cell.is_endpoint() {
                *cell = Cell::Path;
            }
        }
    }
    rows
}

/// Formats rendered rows as text, one line per row.
pub fn render_text(rows: &[Vec<Cell>]) -> String {
    let mut text = String::new();
    for row in rows {
        text.extend(row.iter().map(|cell| cell.symbol()));
        text.push('\n');
    }
    text
}

/// A validated maze: a grid of cells with a known start and end.
///
/// A `Maze` is never mutated after construction; solvers borrow it
/// immutably, so any number of them may read it at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Maze {
    cells: Grid<Cell>,
    start: Position,
    end: Position,
}

impl Maze {
    /// Assembles a maze whose endpoints the caller has already placed.
    ///
    /// `start` and `end` may coincide, which only the smallest generated
    /// maze does.
    pub(crate) fn from_parts(cells: Grid<Cell>, start: Position, end: Position) -> Self {
        Maze { cells, start, end }
    }

    /// Builds a maze from nested rows of cells.
    ///
    /// Fails with [`MazeError::InvalidDimensions`] when there are no rows or
    /// the rows differ in length, and with [`MazeError::MissingEndpoint`]
    /// when no start or no end is present.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, MazeError> {
        Self::from_grid(Grid::from_rows(rows)?)
    }

    /// Validates a grid of cells and wraps it.
    ///
    /// Route markers are read back as open floor. If several cells carry the
    /// same endpoint marker, the last one in row-major order is kept and the
    /// others become open floor.
    pub fn from_grid(mut cells: Grid<Cell>) -> Result<Self, MazeError> {
        if cells.rows() == 0 || cells.cols() == 0 {
            return Err(DimensionError::Empty.into());
        }
        let (start, end) = locate_endpoints(&cells)?;

        let stale: Vec<Position> = cells
            .enumerate()
            .filter(|(pos, cell)| match cell {
                Cell::Start => *pos != start,
                Cell::End => *pos != end,
                Cell::Path => true,
                _ => false,
            })
            .map(|(pos, _)| pos)
            .collect();
        for pos in stale {
            if cells[pos].is_endpoint() {
                warn!(
                    "Demoting duplicate {:?} marker at {} to open floor",
                    cells[pos], pos
                );
            }
            cells[pos] = Cell::Open;
        }

        Ok(Maze { cells, start, end })
    }

    /// Parses the textual grid convention, one row per line.
    ///
    /// Trailing whitespace on a line and trailing blank lines are ignored.
    pub fn parse(text: &str) -> Result<Self, MazeError> {
        let mut rows = Vec::new();
        for (row, line) in text.trim_end().lines().enumerate() {
            let cells = line
                .trim_end()
                .chars()
                .enumerate()
                .map(|(col, symbol)| {
                    Cell::from_symbol(symbol).ok_or(MazeError::InvalidSymbol { row, col, symbol })
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(cells);
        }
        Self::from_rows(rows)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.cells.rows()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cells.cols()
    }

    #[inline]
    pub fn start(&self) -> Position {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Position {
        self.end
    }

    pub fn cells(&self) -> &Grid<Cell> {
        &self.cells
    }

    /// Returns the cell at `pos`, or `None` if out of bounds.
    pub fn cell(&self, pos: Position) -> Option<Cell> {
        self.cells.get(pos).copied()
    }

    #[inline]
    pub fn is_passable(&self, pos: Position) -> bool {
        is_passable(&self.cells, pos)
    }

    /// Counts the cells that are not walls.
    pub fn passable_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_passable()).count()
    }

    /// See [`render`].
    pub fn render(&self, path: Option<&[Position]>) -> Vec<Vec<Cell>> {
        render(&self.cells, path)
    }
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.row_slices() {
            for cell in row {
                write!(f, "{}", cell.symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl FromStr for Maze {
    type Err = MazeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Maze::parse(s)
    }
}
