//! Grid addressing: piece ids, cells, directions, and neighbor links.

use serde::{Deserialize, Serialize};

/// Identifier of a piece, stable for the lifetime of a puzzle.
///
/// Ids are assigned in row-major order by decomposition, so the piece at row `r` and
/// column `c` of a grid with `cols` columns has id `r * cols + c`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
#[display("{_0}")]
pub struct PieceId(usize);

impl PieceId {
    /// Creates a piece id from its raw index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A `(row, col)` cell address in the puzzle grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct GridPosition {
    /// Zero-based row, top to bottom.
    pub row: usize,
    /// Zero-based column, left to right.
    pub col: usize,
}

impl GridPosition {
    /// Creates a grid position.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Returns the neighboring cell in `dir`, or `None` at the grid edge.
    ///
    /// # Examples
    ///
    /// ```
    /// use jigcut_core::{Direction, GridPosition};
    ///
    /// let pos = GridPosition::new(0, 1);
    /// assert_eq!(pos.neighbor(Direction::Top, 2, 2), None);
    /// assert_eq!(pos.neighbor(Direction::Bottom, 2, 2), Some(GridPosition::new(1, 1)));
    /// assert_eq!(pos.neighbor(Direction::Right, 2, 2), None);
    /// ```
    #[must_use]
    pub fn neighbor(self, dir: Direction, rows: usize, cols: usize) -> Option<Self> {
        match dir {
            Direction::Top if self.row > 0 => Some(Self::new(self.row - 1, self.col)),
            Direction::Right if self.col + 1 < cols => Some(Self::new(self.row, self.col + 1)),
            Direction::Bottom if self.row + 1 < rows => Some(Self::new(self.row + 1, self.col)),
            Direction::Left if self.col > 0 => Some(Self::new(self.row, self.col - 1)),
            _ => None,
        }
    }
}

/// One of the four grid directions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum Direction {
    /// Towards row 0.
    #[display("top")]
    Top,
    /// Towards the last column.
    #[display("right")]
    Right,
    /// Towards the last row.
    #[display("bottom")]
    Bottom,
    /// Towards column 0.
    #[display("left")]
    Left,
}

impl Direction {
    /// All directions, clockwise from the top.
    pub const ALL: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    /// Returns the opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Right => Direction::Left,
            Direction::Bottom => Direction::Top,
            Direction::Left => Direction::Right,
        }
    }
}

/// Ids of a piece's grid neighbors; `None` at the grid edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connections {
    /// Piece above.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<PieceId>,
    /// Piece to the right.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<PieceId>,
    /// Piece below.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<PieceId>,
    /// Piece to the left.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<PieceId>,
}

impl Connections {
    /// Returns the neighbor in `dir`.
    #[must_use]
    pub fn get(&self, dir: Direction) -> Option<PieceId> {
        match dir {
            Direction::Top => self.top,
            Direction::Right => self.right,
            Direction::Bottom => self.bottom,
            Direction::Left => self.left,
        }
    }

    /// Sets the neighbor in `dir`.
    pub fn set(&mut self, dir: Direction, id: Option<PieceId>) {
        let slot = match dir {
            Direction::Top => &mut self.top,
            Direction::Right => &mut self.right,
            Direction::Bottom => &mut self.bottom,
            Direction::Left => &mut self.left,
        };
        *slot = id;
    }

    /// Iterates over the existing neighbors, clockwise from the top.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, PieceId)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(|dir| self.get(dir).map(|id| (dir, id)))
    }

    /// Returns the direction in which `id` is a neighbor, if it is one.
    #[must_use]
    pub fn direction_of(&self, id: PieceId) -> Option<Direction> {
        self.iter().find(|(_, other)| *other == id).map(|(dir, _)| dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_respect_grid_edges() {
        let corner = GridPosition::new(0, 0);
        assert_eq!(corner.neighbor(Direction::Top, 3, 4), None);
        assert_eq!(corner.neighbor(Direction::Left, 3, 4), None);
        assert_eq!(
            corner.neighbor(Direction::Right, 3, 4),
            Some(GridPosition::new(0, 1))
        );

        let far = GridPosition::new(2, 3);
        assert_eq!(far.neighbor(Direction::Bottom, 3, 4), None);
        assert_eq!(far.neighbor(Direction::Right, 3, 4), None);
        assert_eq!(far.neighbor(Direction::Top, 3, 4), Some(GridPosition::new(1, 3)));
    }

    #[test]
    fn opposite_is_involution() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_ne!(dir.opposite(), dir);
        }
    }

    #[test]
    fn connections_iterate_and_serialize_sparse() {
        let mut connections = Connections::default();
        connections.set(Direction::Right, Some(PieceId::new(1)));
        connections.set(Direction::Bottom, Some(PieceId::new(2)));

        let listed = connections.iter().collect::<Vec<_>>();
        assert_eq!(
            listed,
            vec![
                (Direction::Right, PieceId::new(1)),
                (Direction::Bottom, PieceId::new(2))
            ]
        );
        assert_eq!(connections.direction_of(PieceId::new(2)), Some(Direction::Bottom));
        assert_eq!(connections.direction_of(PieceId::new(3)), None);

        let json = serde_json::to_string(&connections).unwrap();
        assert_eq!(json, r#"{"right":1,"bottom":2}"#);
    }
}
