//! Conversion between source-image pixels and display pixels.
//!
//! Pieces, cut lines, and the solution matrix live in source-image space. Pointer input
//! and on-board positions live in display space. The functions here are the only place
//! where one is turned into the other, and they always scale both axes by the same
//! factor so that pieces are never distorted.

use serde::{Deserialize, Serialize};

use crate::{Point, Rect, Size};

/// The fixed display box an image is fitted into for authoring and play.
pub const DISPLAY_BUDGET: Size = Size::new(800.0, 600.0);

/// Multipliers from source-image pixels to display pixels.
///
/// Values produced by [`compute_scale_factors`] are always uniform (`x == y`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleFactors {
    /// Horizontal multiplier.
    pub x: f64,
    /// Vertical multiplier.
    pub y: f64,
}

impl ScaleFactors {
    /// Scale factors that leave coordinates unchanged.
    pub const IDENTITY: Self = Self::uniform(1.0);

    /// Creates scale factors with the same multiplier on both axes.
    #[must_use]
    pub const fn uniform(scale: f64) -> Self {
        Self { x: scale, y: scale }
    }

    /// Returns `true` if both axes use the same multiplier.
    #[must_use]
    #[expect(clippy::float_cmp)]
    pub fn is_uniform(self) -> bool {
        self.x == self.y
    }
}

impl Default for ScaleFactors {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// The result of fitting an image into a display box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayFit {
    /// Size of the image once displayed.
    pub size: Size,
    /// Multipliers from source to display space.
    pub scale: ScaleFactors,
}

/// Chooses the largest uniform scale that fits `original` inside `board`.
///
/// The aspect ratio is preserved. The image is always scaled to touch the board on one
/// axis, which means small images are scaled up as well as large images scaled down.
///
/// A degenerate `original` or `board` yields [`ScaleFactors::IDENTITY`] and the original
/// size.
///
/// # Examples
///
/// ```
/// use jigcut_core::{Size, compute_scale_factors};
///
/// let fit = compute_scale_factors(Size::new(1600.0, 800.0), Size::new(800.0, 600.0));
/// assert_eq!(fit.size, Size::new(800.0, 400.0));
/// assert!(fit.scale.is_uniform());
/// ```
#[must_use]
pub fn compute_scale_factors(original: Size, board: Size) -> DisplayFit {
    if original.is_empty() || board.is_empty() {
        return DisplayFit {
            size: original,
            scale: ScaleFactors::IDENTITY,
        };
    }

    let scale = (board.width / original.width).min(board.height / original.height);
    DisplayFit {
        size: Size::new(original.width * scale, original.height * scale),
        scale: ScaleFactors::uniform(scale),
    }
}

/// Converts a source-image point to display space.
#[must_use]
pub fn to_display(source: Point, scale: ScaleFactors) -> Point {
    Point::new(source.x * scale.x, source.y * scale.y)
}

/// Converts a display point back to source-image space.
#[must_use]
pub fn to_source(display: Point, scale: ScaleFactors) -> Point {
    Point::new(display.x / scale.x, display.y / scale.y)
}

/// Converts a source-image rectangle to display space.
#[must_use]
pub fn rect_to_display(source: Rect, scale: ScaleFactors) -> Rect {
    Rect::new(
        source.origin.x * scale.x,
        source.origin.y * scale.y,
        source.size.width * scale.x,
        source.size.height * scale.y,
    )
}
