//! Where each cell of the solution grid sits on the board.

use jigcut_core::{GridPosition, PieceId, Point, Size, SolutionMatrix};
use jigcut_generator::Piece;

/// Computes the on-board top-left corner of every piece's solved position.
///
/// Cells are not uniform: the `x` of a cell is the sum of the display widths of the
/// cells to its left in the same row, and its `y` the sum of the display heights above
/// it in the same column. Each row (column) is centered horizontally (vertically) on
/// the board, and a piece smaller than its cell is centered inside the cell.
///
/// `pieces` must be in id order and `solution` must place every piece. The result is
/// indexed by piece id.
///
/// # Panics
///
/// Panics if a piece is missing from `solution` or a cell refers to a piece outside
/// `pieces`. Both are unreachable for a session built from a validated decomposition.
#[must_use]
pub fn expected_positions(pieces: &[Piece], solution: &SolutionMatrix, board: Size) -> Vec<Point> {
    let size_at = |pos: GridPosition| -> Size {
        let id = solution
            .get(pos)
            .unwrap_or_else(|| panic!("solution cell ({}, {}) is empty", pos.row, pos.col));
        let piece = piece(pieces, id);
        piece.display_size(board)
    };

    pieces
        .iter()
        .map(|piece| {
            let id = piece.id();
            let cell = solution
                .find(id)
                .unwrap_or_else(|| panic!("piece {id} is not in the solution matrix"));

            let row_widths = (0..solution.cols())
                .map(|col| size_at(GridPosition::new(cell.row, col)).width)
                .collect::<Vec<_>>();
            let col_heights = (0..solution.rows())
                .map(|row| size_at(GridPosition::new(row, cell.col)).height)
                .collect::<Vec<_>>();

            let start_x = (board.width - row_widths.iter().sum::<f64>()) / 2.0;
            let start_y = (board.height - col_heights.iter().sum::<f64>()) / 2.0;
            let x = start_x + row_widths[..cell.col].iter().sum::<f64>();
            let y = start_y + col_heights[..cell.row].iter().sum::<f64>();

            let cell_size = size_at(cell);
            let own = piece.display_size(board);
            Point::new(
                x + (cell_size.width - own.width) / 2.0,
                y + (cell_size.height - own.height) / 2.0,
            )
        })
        .collect()
}

fn piece(pieces: &[Piece], id: PieceId) -> &Piece {
    pieces
        .get(id.index())
        .unwrap_or_else(|| panic!("solution refers to unknown piece {id}"))
}
