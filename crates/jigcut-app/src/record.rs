use image::RgbaImage;
use jigcut_core::{Connections, GridPosition, MatrixError, PieceId, Rect, Size, SolutionMatrix};
use jigcut_generator::{
    BitmapError, Decomposition, Piece,
    bitmap::{decode_data_url, encode_data_url},
};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

/// Errors turning a stored record back into pieces.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum RecordError {
    /// An embedded bitmap could not be decoded.
    #[display("invalid embedded bitmap: {_0}")]
    Bitmap(#[from] BitmapError),
    /// The stored solution matrix is malformed.
    #[display("invalid solution matrix: {_0}")]
    Solution(#[from] MatrixError),
    /// Piece records are not stored in id order.
    #[display("piece record {index} has id {id}")]
    PieceOrder {
        /// Position in the record list.
        index: usize,
        /// Id found there.
        id: PieceId,
    },
}

/// Text attached to a puzzle by an external captioning service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiContent {
    /// Suggested title.
    pub title: String,
    /// Short description of the image.
    pub description: String,
    /// Background information.
    pub context: String,
}

/// A stored piece. Geometry is in source-image pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceRecord {
    /// Row-major piece id.
    pub id: PieceId,
    /// The piece bitmap as a PNG `data:` URL.
    pub image_src: String,
    /// Left edge in the source image.
    pub x: f64,
    /// Top edge in the source image.
    pub y: f64,
    /// Width in source pixels.
    pub width: f64,
    /// Height in source pixels.
    pub height: f64,
    /// Width as a fraction of the image width.
    pub width_ratio: f64,
    /// Height as a fraction of the image height.
    pub height_ratio: f64,
    /// Cell in the solution grid.
    pub grid_position: GridPosition,
    /// Neighbouring pieces in the solved image.
    pub connections: Connections,
}

/// A stored puzzle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    /// Identifier derived from the content; see [`puzzle_id`].
    pub id: String,
    /// Display title.
    pub title: String,
    /// The whole source image as a PNG `data:` URL.
    pub image_url: String,
    /// Creation time in seconds since the Unix epoch.
    pub created_at: u64,
    /// Pieces in id order.
    pub pieces: Vec<PieceRecord>,
    /// Source image width in pixels.
    pub original_width: f64,
    /// Source image height in pixels.
    pub original_height: f64,
    /// Which piece belongs in each grid cell.
    pub solution: SolutionMatrix,
    /// Optional caption text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_content: Option<AiContent>,
}

impl Puzzle {
    /// Builds a record from an authored image and its decomposition.
    ///
    /// # Errors
    ///
    /// Returns [`BitmapError`] if a bitmap cannot be encoded.
    pub fn from_decomposition(
        title: impl Into<String>,
        image: &RgbaImage,
        decomposition: &Decomposition,
        created_at: u64,
    ) -> Result<Self, BitmapError> {
        let pieces = decomposition
            .pieces()
            .iter()
            .map(|piece| {
                let bounds = piece.bounds();
                Ok(PieceRecord {
                    id: piece.id(),
                    image_src: encode_data_url(piece.bitmap())?,
                    x: bounds.left(),
                    y: bounds.top(),
                    width: bounds.size.width,
                    height: bounds.size.height,
                    width_ratio: piece.width_ratio(),
                    height_ratio: piece.height_ratio(),
                    grid_position: piece.grid_position(),
                    connections: *piece.connections(),
                })
            })
            .collect::<Result<Vec<_>, BitmapError>>()?;
        let size = decomposition.image_size();
        Ok(Self {
            id: puzzle_id(image, decomposition, created_at),
            title: title.into(),
            image_url: encode_data_url(image)?,
            created_at,
            pieces,
            original_width: size.width,
            original_height: size.height,
            solution: decomposition.solution().clone(),
            ai_content: None,
        })
    }

    /// Source image size.
    #[must_use]
    pub fn image_size(&self) -> Size {
        Size::new(self.original_width, self.original_height)
    }

    /// Decodes the whole source image.
    ///
    /// # Errors
    ///
    /// Returns [`BitmapError`] if the embedded image is invalid.
    pub fn image(&self) -> Result<RgbaImage, BitmapError> {
        decode_data_url(&self.image_url)
    }

    /// Decodes the pieces and solution back into a decomposition.
    ///
    /// Size ratios are recomputed from the stored geometry.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if a bitmap cannot be decoded, the pieces are out of
    /// order, or the solution matrix is not dense.
    pub fn to_decomposition(&self) -> Result<Decomposition, RecordError> {
        self.solution.check_dense()?;
        let image_size = self.image_size();
        let pieces = self
            .pieces
            .iter()
            .enumerate()
            .map(|(index, record)| {
                if record.id.index() != index {
                    return Err(RecordError::PieceOrder {
                        index,
                        id: record.id,
                    });
                }
                Ok(Piece::new(
                    record.id,
                    decode_data_url(&record.image_src)?,
                    Rect::new(record.x, record.y, record.width, record.height),
                    image_size,
                    record.grid_position,
                    record.connections,
                ))
            })
            .collect::<Result<Vec<_>, RecordError>>()?;
        Ok(Decomposition::from_parts(
            image_size,
            pieces,
            self.solution.clone(),
        ))
    }
}

/// Derives a puzzle id: the first 16 hex digits of a SHA-256 over the image pixels,
/// the piece rectangles and the creation time.
///
/// Two puzzles cut from the same image get different ids unless they share both the
/// cut layout and the creation second, in which case they are the same puzzle.
#[must_use]
pub fn puzzle_id(image: &RgbaImage, decomposition: &Decomposition, created_at: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(image.width().to_le_bytes());
    hasher.update(image.height().to_le_bytes());
    hasher.update(image.as_raw());
    for piece in decomposition.pieces() {
        let bounds = piece.bounds();
        for value in [bounds.left(), bounds.top(), bounds.size.width, bounds.size.height] {
            hasher.update(value.to_le_bytes());
        }
    }
    hasher.update(created_at.to_le_bytes());
    let digest = hasher.finalize();
    digest[..8].iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use image::Rgba;
    use jigcut_core::CutLines;
    use jigcut_generator::decompose;

    use super::*;

    fn authored() -> (RgbaImage, Puzzle) {
        let image = RgbaImage::from_fn(60, 40, |x, y| {
            Rgba([u8::try_from(x).unwrap(), u8::try_from(y).unwrap(), 7, 255])
        });
        let decomposition = decompose(&image, &CutLines::from_unvalidated(&[20.0], &[30.0]));
        let puzzle = Puzzle::from_decomposition("gradient", &image, &decomposition, 1_700_000_000)
            .unwrap();
        (image, puzzle)
    }

    #[test]
    fn record_restores_pieces() {
        let (image, puzzle) = authored();
        assert_eq!(puzzle.id.len(), 16);
        assert_eq!(puzzle.image().unwrap(), image);

        let decomposition = puzzle.to_decomposition().unwrap();
        assert_eq!(decomposition, decompose(&image, &CutLines::from_unvalidated(&[20.0], &[30.0])));
    }

    #[test]
    fn json_uses_camel_case_fields() {
        let (_, puzzle) = authored();
        let json = serde_json::to_value(&puzzle).unwrap();
        assert_eq!(json["originalWidth"], 60.0);
        assert_eq!(json["createdAt"], 1_700_000_000);
        assert_eq!(json["pieces"][1]["gridPosition"]["col"], 1);
        assert_eq!(json["pieces"][1]["widthRatio"], 0.5);
        assert_eq!(json["pieces"][0]["connections"]["right"], 1);
        assert!(json.get("aiContent").is_none());
    }

    #[test]
    fn rejects_reordered_pieces() {
        let (_, mut puzzle) = authored();
        puzzle.pieces.swap(0, 1);
        assert!(matches!(
            puzzle.to_decomposition(),
            Err(RecordError::PieceOrder { index: 0, .. })
        ));
    }

    #[test]
    fn id_depends_on_pixels_cuts_and_time() {
        let a = RgbaImage::new(40, 40);
        let mut b = a.clone();
        b.put_pixel(0, 0, Rgba([1, 0, 0, 0]));
        let grid = CutLines::from_unvalidated(&[20.0], &[20.0]);
        let strips = CutLines::from_unvalidated(&[], &[10.0, 20.0, 30.0]);

        let id = |image: &RgbaImage, lines: &CutLines, created_at| {
            puzzle_id(image, &decompose(image, lines), created_at)
        };
        assert_eq!(id(&a, &grid, 5), id(&a.clone(), &grid, 5));
        assert_ne!(id(&a, &grid, 5), id(&b, &grid, 5));
        assert_ne!(id(&a, &grid, 5), id(&a, &strips, 5));
        assert_ne!(id(&a, &grid, 5), id(&a, &grid, 6));
    }
}
