//! Turning an image into puzzle pieces, and scattering them.
//!
//! # Overview
//!
//! - [`PuzzleEditor`] holds the authoring state: the loaded image, how it is displayed,
//!   and the cut lines drawn on it.
//! - [`decompose`] cuts an image along a [`CutLines`](jigcut_core::CutLines) set into a
//!   [`Decomposition`]: the [`Piece`]s with their cropped bitmaps, and the solution
//!   matrix.
//! - [`ShuffleEngine`] computes the two-phase scattered layout of the pieces. Runs are
//!   reproducible when driven by a [`ShuffleSeed`].
//! - [`bitmap`] embeds bitmaps as PNG `data:` URLs for storage and fits oversized
//!   images to a size budget.
//!
//! # Examples
//!
//! ```
//! use image::RgbaImage;
//! use jigcut_core::{Axis, Size};
//! use jigcut_generator::{PuzzleEditor, ShuffleEngine, ShuffleSeed};
//!
//! let mut editor = PuzzleEditor::new();
//! editor.load_image(RgbaImage::new(300, 200))?;
//! editor.try_add_source_line(Axis::Horizontal, 100.0)?;
//! editor.try_add_source_line(Axis::Vertical, 150.0)?;
//! let decomposition = editor.break_image();
//!
//! let mut rng = ShuffleSeed::from_label("example").rng();
//! let plan = ShuffleEngine::default().shuffle(
//!     Size::new(800.0, 600.0),
//!     decomposition.pieces(),
//!     &mut rng,
//! );
//! assert_eq!(plan.spread.len(), 4);
//! # Ok::<(), jigcut_generator::EditorError>(())
//! ```

pub mod bitmap;
mod decompose;
mod editor;
mod piece;
mod seed;
pub mod shuffle;

pub use self::{
    bitmap::BitmapError,
    decompose::{Decomposition, decompose},
    editor::{EditorError, PuzzleEditor},
    piece::Piece,
    seed::{ParseSeedError, ShuffleSeed},
    shuffle::{Layout, SHUFFLE_PHASE_DELAY, ShuffleConfig, ShuffleEngine, ShufflePlan},
};
