use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::{Direction, Position};

/// Reasons a grid shape is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DimensionError {
    #[error("grid has no rows")]
    Empty,
    #[error("inconsistent width at row {row}: expected {expected}, found {found}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("{rows}x{cols} is too small, a maze needs at least 3x3 cells")]
    TooSmall { rows: usize, cols: usize },
    #[error("{rows}x{cols} cells do not fit in memory")]
    TooLarge { rows: usize, cols: usize },
}

/// Returns the cell count of a `rows x cols` grid, failing on overflow.
pub fn checked_area(rows: usize, cols: usize) -> Result<usize, DimensionError> {
    rows.checked_mul(cols)
        .filter(|&area| area <= isize::MAX as usize)
        .ok_or(DimensionError::TooLarge { rows, cols })
}

/// A generic rectangular grid.
///
/// Stores elements of type `T` in a flat vector using row-major order and is
/// addressed by [`Position`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Creates a grid of `rows x cols` cells, each a clone of `value`.
    ///
    /// Fails with [`DimensionError::TooLarge`] if the cell count overflows.
    pub fn try_filled(rows: usize, cols: usize, value: T) -> Result<Self, DimensionError>
    where
        T: Clone,
    {
        let size = checked_area(rows, cols)?;
        Ok(Grid {
            rows,
            cols,
            cells: vec![value; size],
        })
    }

    /// Creates a grid of `rows x cols` cells, each a clone of `value`.
    ///
    /// For dimensions taken from an existing grid, which cannot overflow.
    pub(crate) fn filled(rows: usize, cols: usize, value: T) -> Self
    where
        T: Clone,
    {
        Grid {
            rows,
            cols,
            cells: vec![value; rows * cols],
        }
    }

    /// Creates a grid of `rows x cols` default values.
    pub fn new(rows: usize, cols: usize) -> Result<Self, DimensionError>
    where
        T: Default + Clone,
    {
        Self::try_filled(rows, cols, T::default())
    }

    /// Creates a grid whose cells are produced by `f`, called in row-major order.
    pub fn from_generator<F>(rows: usize, cols: usize, mut f: F) -> Result<Self, DimensionError>
    where
        F: FnMut(Position) -> T,
    {
        let size = checked_area(rows, cols)?;
        let mut cells = Vec::with_capacity(size);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(f(Position { row, col }));
            }
        }
        Ok(Grid { rows, cols, cells })
    }

    /// Builds a grid from nested rows.
    ///
    /// Fails if there are no rows or if any row's length differs from the first.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, DimensionError> {
        let cols = rows.first().ok_or(DimensionError::Empty)?.len();
        let row_count = rows.len();
        let mut cells = Vec::with_capacity(row_count * cols);
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(DimensionError::RaggedRow {
                    row: index,
                    expected: cols,
                    found: row.len(),
                });
            }
            cells.extend(row);
        }
        Ok(Grid {
            rows: row_count,
            cols,
            cells,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Converts a position to a flat vector index, or `None` if out of bounds.
    #[inline]
    fn index_of(&self, pos: Position) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.row * self.cols + pos.col)
        } else {
            None
        }
    }

    /// Checks if the position lies within the grid.
    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Checks if the position lies strictly inside the one-cell outer border.
    #[inline]
    pub fn is_interior(&self, pos: Position) -> bool {
        pos.row > 0 && pos.col > 0 && pos.row + 1 < self.rows && pos.col + 1 < self.cols
    }

    /// Gets a reference to the cell at `pos`, or `None` if out of bounds.
    pub fn get(&self, pos: Position) -> Option<&T> {
        self.index_of(pos).map(|index| &self.cells[index])
    }

    /// Gets a mutable reference to the cell at `pos`, or `None` if out of bounds.
    pub fn get_mut(&mut self, pos: Position) -> Option<&mut T> {
        match self.index_of(pos) {
            Some(index) => self.cells.get_mut(index),
            None => None,
        }
    }

    /// Returns the in-bounds neighbors of `pos` in [`Direction::ALL`] order.
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| pos.step(direction))
            .filter(|next| self.contains(*next))
    }

    /// Returns an iterator over the cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.cells.iter()
    }

    /// Returns an iterator that yields `(Position, &T)` for each cell in row-major order.
    pub fn enumerate(&self) -> impl Iterator<Item = (Position, &T)> {
        let cols = self.cols;
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let pos = Position {
                row: index / cols,
                col: index % cols,
            };
            (pos, cell)
        })
    }

    /// Returns an iterator over the rows as slices.
    pub fn row_slices(&self) -> impl Iterator<Item = &[T]> {
        // chunks(0) panics; a zero-width grid has no visible rows anyway
        self.cells.chunks(self.cols.max(1))
    }

    /// Copies the grid out as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<T>>
    where
        T: Clone,
    {
        self.row_slices().map(<[T]>::to_vec).collect()
    }
}

impl<T> Index<Position> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, pos: Position) -> &Self::Output {
        match self.index_of(pos) {
            Some(idx) => &self.cells[idx],
            None => panic!(
                "Grid index {} out of bounds for grid size ({}, {})",
                pos, self.rows, self.cols
            ),
        }
    }
}

impl<T> IndexMut<Position> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, pos: Position) -> &mut Self::Output {
        let (rows, cols) = (self.rows, self.cols);
        match self.index_of(pos) {
            Some(idx) => &mut self.cells[idx],
            None => panic!(
                "Grid index {} out of bounds for grid size ({}, {})",
                pos, rows, cols
            ),
        }
    }
}
