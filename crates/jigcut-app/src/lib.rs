//! Persistence and command-line shell for jigcut.
//!
//! A [`Puzzle`] is the serializable form of an authored puzzle: the source image and
//! every piece bitmap embedded as PNG `data:` URLs, the piece geometry in source-image
//! pixels, and the solution matrix. Puzzles live in a [`PuzzleStore`], which also keeps
//! the piece positions of an unfinished play session so it can be resumed with
//! [`start_session`].
//!
//! # Examples
//!
//! ```
//! use image::RgbaImage;
//! use jigcut_app::{MemoryStore, Puzzle, PuzzleStore, default_board, start_session};
//! use jigcut_core::CutLines;
//! use jigcut_generator::{ShuffleSeed, decompose};
//!
//! let image = RgbaImage::new(200, 100);
//! let decomposition = decompose(&image, &CutLines::from_unvalidated(&[50.0], &[100.0]));
//! let puzzle = Puzzle::from_decomposition("blank", &image, &decomposition, 0)?;
//!
//! let mut store = MemoryStore::new();
//! store.save(&puzzle)?;
//!
//! let mut rng = ShuffleSeed::from_label("docs").rng();
//! let mut game = start_session(&store, &puzzle, default_board(&puzzle), &mut rng)?;
//! game.finish_shuffle();
//! assert_eq!(game.placed_count(), 0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod record;
mod session;
mod store;

pub use self::{
    record::{AiContent, PieceRecord, Puzzle, RecordError, puzzle_id},
    session::{SessionError, default_board, save_session, start_session},
    store::{DirStore, MemoryStore, PuzzleStore, StoreError},
};
