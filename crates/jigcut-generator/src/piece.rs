use image::RgbaImage;
use jigcut_core::{Connections, GridPosition, PieceId, Point, Rect, Size};

/// One rectangular region cut out of the source image.
///
/// All geometry is in source-image pixels. The bitmap is owned by the piece and never
/// changes after creation.
///
/// The width and height ratios are derived from the source image size, so multiplying
/// them by any board size yields the piece's displayed size on that board.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    id: PieceId,
    bitmap: RgbaImage,
    bounds: Rect,
    width_ratio: f64,
    height_ratio: f64,
    grid_position: GridPosition,
    connections: Connections,
}

impl Piece {
    /// Creates a piece, deriving its size ratios from `image_size`.
    ///
    /// A degenerate `image_size` yields zero ratios.
    #[must_use]
    pub fn new(
        id: PieceId,
        bitmap: RgbaImage,
        bounds: Rect,
        image_size: Size,
        grid_position: GridPosition,
        connections: Connections,
    ) -> Self {
        let ratio = |extent: f64, total: f64| if total > 0.0 { extent / total } else { 0.0 };
        Self {
            id,
            bitmap,
            bounds,
            width_ratio: ratio(bounds.size.width, image_size.width),
            height_ratio: ratio(bounds.size.height, image_size.height),
            grid_position,
            connections,
        }
    }

    /// The piece id.
    #[must_use]
    pub fn id(&self) -> PieceId {
        self.id
    }

    /// The cropped pixels of this piece.
    #[must_use]
    pub fn bitmap(&self) -> &RgbaImage {
        &self.bitmap
    }

    /// Bounding box in the source image.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Top-left corner in the source image.
    #[must_use]
    pub fn origin(&self) -> Point {
        self.bounds.origin
    }

    /// Size in source-image pixels.
    #[must_use]
    pub fn size(&self) -> Size {
        self.bounds.size
    }

    /// `width / image width`.
    #[must_use]
    pub fn width_ratio(&self) -> f64 {
        self.width_ratio
    }

    /// `height / image height`.
    #[must_use]
    pub fn height_ratio(&self) -> f64 {
        self.height_ratio
    }

    /// Size of this piece when the whole image is displayed at `board` size.
    #[must_use]
    pub fn display_size(&self, board: Size) -> Size {
        Size::new(self.width_ratio * board.width, self.height_ratio * board.height)
    }

    /// The cell this piece belongs to.
    #[must_use]
    pub fn grid_position(&self) -> GridPosition {
        self.grid_position
    }

    /// Ids of the grid neighbors.
    #[must_use]
    pub fn connections(&self) -> &Connections {
        &self.connections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratios_scale_to_any_board() {
        let piece = Piece::new(
            PieceId::new(0),
            RgbaImage::new(150, 100),
            Rect::new(150.0, 100.0, 150.0, 100.0),
            Size::new(300.0, 200.0),
            GridPosition::new(1, 1),
            Connections::default(),
        );
        assert!((piece.width_ratio() - 0.5).abs() < 1e-12);
        assert!((piece.height_ratio() - 0.5).abs() < 1e-12);
        assert_eq!(piece.display_size(Size::new(800.0, 600.0)), Size::new(400.0, 300.0));
        assert_eq!(piece.display_size(Size::new(300.0, 200.0)), piece.size());
    }
}
