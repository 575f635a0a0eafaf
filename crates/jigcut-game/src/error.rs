use jigcut_core::{MatrixError, PieceId};

/// Errors returned by [`Game`](crate::Game) and [`GroupBoard`](crate::GroupBoard).
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GameError {
    /// The puzzle has no pieces.
    #[display("puzzle has no pieces")]
    NoPieces,
    /// A piece id is not part of this puzzle.
    #[display("unknown piece {id}")]
    UnknownPiece {
        /// The rejected id.
        id: PieceId,
    },
    /// Pieces are not stored in id order.
    #[display("piece at index {index} has id {id}")]
    PieceOrder {
        /// Position in the piece list.
        index: usize,
        /// Id found there.
        id: PieceId,
    },
    /// The solution matrix does not place every piece exactly once.
    #[display("invalid solution matrix: {_0}")]
    InvalidSolution(#[error(source)] MatrixError),
    /// Saved positions do not cover a piece.
    #[display("no saved position for piece {id}")]
    MissingPosition {
        /// The piece without a position.
        id: PieceId,
    },
}

impl From<MatrixError> for GameError {
    fn from(e: MatrixError) -> Self {
        Self::InvalidSolution(e)
    }
}
