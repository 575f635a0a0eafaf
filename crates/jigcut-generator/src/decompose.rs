//! Cutting an image into rectangular pieces along a set of cut lines.

use image::{RgbaImage, imageops};
use jigcut_core::{
    Connections, CutLines, Direction, GridPosition, PieceId, Rect, Size, SolutionMatrix,
};
use rayon::prelude::*;

use crate::Piece;

/// The result of cutting an image: the pieces and the matrix that places them.
///
/// Pieces are stored in id order, so `pieces()[i].id().index() == i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    image_size: Size,
    pieces: Vec<Piece>,
    solution: SolutionMatrix,
}

impl Decomposition {
    /// A decomposition with no pieces.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            image_size: Size::default(),
            pieces: Vec::new(),
            solution: SolutionMatrix::empty(0, 0),
        }
    }

    /// Reassembles a decomposition from stored parts.
    ///
    /// The caller is responsible for `pieces` being in id order and matching `solution`.
    #[must_use]
    pub fn from_parts(image_size: Size, pieces: Vec<Piece>, solution: SolutionMatrix) -> Self {
        Self {
            image_size,
            pieces,
            solution,
        }
    }

    /// Source size of the decomposed image.
    #[must_use]
    pub fn image_size(&self) -> Size {
        self.image_size
    }

    /// Pieces in id order.
    #[must_use]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Looks up a piece by id.
    #[must_use]
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.index())
    }

    /// The solution matrix.
    #[must_use]
    pub fn solution(&self) -> &SolutionMatrix {
        &self.solution
    }

    /// Returns `true` if there are no pieces.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Splits into the image size, the pieces, and the solution.
    #[must_use]
    pub fn into_parts(self) -> (Size, Vec<Piece>, SolutionMatrix) {
        (self.image_size, self.pieces, self.solution)
    }
}

/// Cuts `image` into `(horizontal + 1) × (vertical + 1)` pieces.
///
/// Cell boundaries are `[0, lines..., extent]` on each axis. Lines outside the open
/// interval `(0, extent)` are ignored, so the pieces always tile the image exactly.
///
/// Ids are assigned in row-major order and every piece records its grid neighbors.
/// Bitmaps are cropped in parallel; pixel edges are the rounded cut coordinates, so
/// adjacent bitmaps share their boundary pixel column or row.
///
/// # Examples
///
/// ```
/// use image::RgbaImage;
/// use jigcut_core::{CutLines, GridPosition, PieceId};
/// use jigcut_generator::decompose;
///
/// let image = RgbaImage::new(300, 200);
/// let lines = CutLines::from_unvalidated(&[100.0], &[150.0]);
/// let decomposition = decompose(&image, &lines);
///
/// assert_eq!(decomposition.pieces().len(), 4);
/// assert_eq!(
///     decomposition.solution().get(GridPosition::new(1, 0)),
///     Some(PieceId::new(2))
/// );
/// ```
#[must_use]
pub fn decompose(image: &RgbaImage, lines: &CutLines) -> Decomposition {
    let (width, height) = image.dimensions();
    let image_size = Size::new(f64::from(width), f64::from(height));
    if image_size.is_empty() {
        log::warn!("cannot decompose an empty {width}x{height} image");
        return Decomposition::empty();
    }

    let ys = boundaries(lines.horizontal(), image_size.height);
    let xs = boundaries(lines.vertical(), image_size.width);
    let rows = ys.len() - 1;
    let cols = xs.len() - 1;
    log::debug!("decomposing {width}x{height} image into {rows}x{cols} pieces");

    let pieces = (0..rows * cols)
        .into_par_iter()
        .map(|index| {
            let pos = GridPosition::new(index / cols, index % cols);
            let bounds = Rect::new(
                xs[pos.col],
                ys[pos.row],
                xs[pos.col + 1] - xs[pos.col],
                ys[pos.row + 1] - ys[pos.row],
            );
            let bitmap = crop(image, bounds);
            Piece::new(
                PieceId::new(index),
                bitmap,
                bounds,
                image_size,
                pos,
                connections(pos, rows, cols),
            )
        })
        .collect::<Vec<_>>();

    Decomposition {
        image_size,
        pieces,
        solution: SolutionMatrix::row_major(rows, cols),
    }
}

fn boundaries(lines: &[f64], extent: f64) -> Vec<f64> {
    let mut bounds = Vec::with_capacity(lines.len() + 2);
    bounds.push(0.0);
    for &line in lines {
        if line > 0.0 && line < extent {
            bounds.push(line);
        } else {
            log::debug!("ignoring cut line {line} outside 0..{extent}");
        }
    }
    bounds.push(extent);
    bounds
}

fn connections(pos: GridPosition, rows: usize, cols: usize) -> Connections {
    let mut connections = Connections::default();
    for dir in Direction::ALL {
        let id = pos
            .neighbor(dir, rows, cols)
            .map(|n| PieceId::new(n.row * cols + n.col));
        connections.set(dir, id);
    }
    connections
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn crop(image: &RgbaImage, bounds: Rect) -> RgbaImage {
    let x0 = bounds.left().round() as u32;
    let y0 = bounds.top().round() as u32;
    let x1 = bounds.right().round() as u32;
    let y1 = bounds.bottom().round() as u32;
    imageops::crop_imm(image, x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0)).to_image()
}
