//! The solution matrix: which piece belongs in which grid cell.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{GridPosition, PieceId};

/// Errors detected when checking a [`SolutionMatrix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MatrixError {
    /// A row has a different length than `cols`.
    #[display("row {row} has {len} cells, expected {expected}")]
    Ragged {
        /// Offending row.
        row: usize,
        /// Its length.
        len: usize,
        /// The declared column count.
        expected: usize,
    },
    /// The number of rows differs from `rows`.
    #[display("matrix has {len} rows, expected {expected}")]
    RowCount {
        /// Actual number of rows.
        len: usize,
        /// Declared row count.
        expected: usize,
    },
    /// A cell has no piece.
    #[display("cell ({}, {}) is empty", pos.row, pos.col)]
    Hole {
        /// The empty cell.
        pos: GridPosition,
    },
    /// A piece id appears in more than one cell.
    #[display("piece {id} appears more than once")]
    DuplicateId {
        /// The repeated id.
        id: PieceId,
    },
}

/// Mapping from grid cell to the id of the piece that belongs there.
///
/// The canonical matrix built by decomposition is dense: every cell holds a piece and
/// every piece appears exactly once. Sparse matrices (cells set to `None`) are used to
/// describe partial progress.
///
/// # Examples
///
/// ```
/// use jigcut_core::{GridPosition, PieceId, SolutionMatrix};
///
/// let matrix = SolutionMatrix::row_major(2, 2);
/// assert_eq!(matrix.get(GridPosition::new(1, 0)), Some(PieceId::new(2)));
/// assert_eq!(matrix.find(PieceId::new(1)), Some(GridPosition::new(0, 1)));
/// assert!(matrix.check_dense().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionMatrix {
    rows: usize,
    cols: usize,
    grid: Vec<Vec<Option<PieceId>>>,
}

impl SolutionMatrix {
    /// Creates a `rows × cols` matrix with no pieces placed.
    #[must_use]
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            grid: vec![vec![None; cols]; rows],
        }
    }

    /// Creates a dense `rows × cols` matrix whose ids count up in row-major order.
    #[must_use]
    pub fn row_major(rows: usize, cols: usize) -> Self {
        let grid = (0..rows)
            .map(|row| {
                (0..cols)
                    .map(|col| Some(PieceId::new(row * cols + col)))
                    .collect()
            })
            .collect();
        Self { rows, cols, grid }
    }

    /// Builds a matrix from explicit rows.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Ragged`] if the rows have different lengths.
    pub fn from_rows(grid: Vec<Vec<Option<PieceId>>>) -> Result<Self, MatrixError> {
        let rows = grid.len();
        let cols = grid.first().map_or(0, Vec::len);
        let this = Self { rows, cols, grid };
        this.check_shape()?;
        Ok(this)
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells (`rows * cols`).
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Returns `true` if `pos` addresses a cell of this matrix.
    #[must_use]
    pub fn contains(&self, pos: GridPosition) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Returns the piece at `pos`, or `None` if the cell is empty or out of range.
    #[must_use]
    pub fn get(&self, pos: GridPosition) -> Option<PieceId> {
        self.grid.get(pos.row)?.get(pos.col).copied().flatten()
    }

    /// Sets the cell at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of range.
    pub fn set(&mut self, pos: GridPosition, id: Option<PieceId>) {
        assert!(self.contains(pos), "cell {pos:?} is out of range");
        self.grid[pos.row][pos.col] = id;
    }

    /// Finds the cell that holds `id`.
    #[must_use]
    pub fn find(&self, id: PieceId) -> Option<GridPosition> {
        self.iter()
            .find(|(_, cell)| *cell == Some(id))
            .map(|(pos, _)| pos)
    }

    /// Iterates over every cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (GridPosition, Option<PieceId>)> + '_ {
        self.grid.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(col, cell)| (GridPosition::new(row, col), *cell))
        })
    }

    /// Number of cells that hold a piece.
    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.iter().filter(|(_, cell)| cell.is_some()).count()
    }

    /// Raw rows of the matrix.
    #[must_use]
    pub fn as_rows(&self) -> &[Vec<Option<PieceId>>] {
        &self.grid
    }

    /// Checks that the declared dimensions match the stored rows.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::RowCount`] or [`MatrixError::Ragged`] on a shape mismatch.
    pub fn check_shape(&self) -> Result<(), MatrixError> {
        if self.grid.len() != self.rows {
            return Err(MatrixError::RowCount {
                len: self.grid.len(),
                expected: self.rows,
            });
        }
        for (row, cells) in self.grid.iter().enumerate() {
            if cells.len() != self.cols {
                return Err(MatrixError::Ragged {
                    row,
                    len: cells.len(),
                    expected: self.cols,
                });
            }
        }
        Ok(())
    }

    /// Checks the canonical invariants: correct shape, no empty cell, no repeated id.
    ///
    /// # Errors
    ///
    /// Returns the first [`MatrixError`] found.
    pub fn check_dense(&self) -> Result<(), MatrixError> {
        self.check_shape()?;
        let mut seen = HashSet::with_capacity(self.cell_count());
        for (pos, cell) in self.iter() {
            let id = cell.ok_or(MatrixError::Hole { pos })?;
            if !seen.insert(id) {
                return Err(MatrixError::DuplicateId { id });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_major_is_dense_and_ordered() {
        let matrix = SolutionMatrix::row_major(3, 4);
        assert_eq!(matrix.cell_count(), 12);
        assert!(matrix.check_dense().is_ok());
        let ids = matrix.iter().map(|(_, id)| id.unwrap().index()).collect::<Vec<_>>();
        assert_eq!(ids, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn empty_matrix_reports_holes() {
        let mut matrix = SolutionMatrix::empty(2, 2);
        assert_eq!(matrix.filled_count(), 0);
        assert_eq!(
            matrix.check_dense(),
            Err(MatrixError::Hole {
                pos: GridPosition::new(0, 0)
            })
        );

        matrix.set(GridPosition::new(1, 1), Some(PieceId::new(3)));
        assert_eq!(matrix.filled_count(), 1);
        assert_eq!(matrix.find(PieceId::new(3)), Some(GridPosition::new(1, 1)));
        assert_eq!(matrix.get(GridPosition::new(5, 5)), None);
    }

    #[test]
    fn detects_duplicates_and_ragged_rows() {
        let dup = SolutionMatrix::from_rows(vec![
            vec![Some(PieceId::new(0)), Some(PieceId::new(1))],
            vec![Some(PieceId::new(1)), Some(PieceId::new(2))],
        ])
        .unwrap();
        assert_eq!(
            dup.check_dense(),
            Err(MatrixError::DuplicateId {
                id: PieceId::new(1)
            })
        );

        let ragged = SolutionMatrix::from_rows(vec![vec![Some(PieceId::new(0))], vec![]]);
        assert_eq!(
            ragged,
            Err(MatrixError::Ragged {
                row: 1,
                len: 0,
                expected: 1
            })
        );
    }

    #[test]
    fn serialized_shape_matches_record_layout() {
        let matrix = SolutionMatrix::row_major(1, 2);
        let json = serde_json::to_string(&matrix).unwrap();
        assert_eq!(json, r#"{"rows":1,"cols":2,"grid":[[0,1]]}"#);
    }
}
