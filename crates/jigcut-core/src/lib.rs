//! Core data structures for jigcut puzzles.
//!
//! This crate holds the pieces of the puzzle model that do not depend on image data or
//! on play-session state. They are shared by decomposition, shuffling, and solving.
//!
//! # Overview
//!
//! 1. **Geometry** - [`geometry`]: [`Point`], [`Size`], and [`Rect`] in `f64` pixels.
//!
//! 2. **Coordinate spaces** - [`coordinate`]: conversion between source-image pixels and
//!    display pixels through uniform [`ScaleFactors`].
//!
//! 3. **Cut lines** - [`cut_lines`]: the sorted horizontal and vertical cut positions of
//!    a puzzle, with [`CutLineStore`] validating candidate lines against the image edges
//!    and against each other.
//!
//! 4. **Grid addressing** - [`grid`]: [`PieceId`], [`GridPosition`], [`Direction`], and
//!    the per-piece [`Connections`] to grid neighbors.
//!
//! 5. **Solution matrix** - [`solution`]: the authoritative cell-to-piece mapping.
//!
//! 6. **Pointer input** - [`pointer`]: a single [`PointerSample`] type produced from
//!    mouse or touch input.
//!
//! Everything persisted (cut lines, piece rectangles, the solution matrix) is expressed
//! in source-image space. Only [`coordinate`] converts to and from display space.
//!
//! # Examples
//!
//! ```
//! use jigcut_core::{Axis, CutLineStore, Size};
//!
//! let mut store = CutLineStore::new(Size::new(300.0, 200.0));
//! assert!(store.try_add_line(Axis::Vertical, 150.0).is_accepted());
//! // Too close to the line we just added.
//! assert!(store.try_add_line(Axis::Vertical, 152.0).is_rejected());
//! // Too close to the top edge.
//! assert!(store.try_add_line(Axis::Horizontal, 2.0).is_rejected());
//! ```

pub mod coordinate;
pub mod cut_lines;
pub mod geometry;
pub mod grid;
pub mod pointer;
pub mod solution;

pub use self::{
    coordinate::{DISPLAY_BUDGET, DisplayFit, ScaleFactors, compute_scale_factors},
    cut_lines::{Axis, CutLineConfig, CutLineStore, CutLines, LineOutcome, LineRejection},
    geometry::{Point, Rect, Size},
    grid::{Connections, Direction, GridPosition, PieceId},
    pointer::{PointerInput, PointerSample},
    solution::{MatrixError, SolutionMatrix},
};
