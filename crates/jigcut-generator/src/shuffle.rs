//! Two-phase scattering of pieces across a container.
//!
//! The **grid phase** lays the pieces out in a random order on a roughly square grid
//! centered in the container. The **spread phase** then pushes every piece outwards in
//! one of four directions, chosen round-robin, so the pieces end up scattered but never
//! off-screen.
//!
//! All positions are top-left corners in display space, and every piece is sized as
//! `ratio × container`.

use std::{collections::BTreeMap, f64::consts::FRAC_PI_4, time::Duration};

use jigcut_core::{PieceId, Point, Size};
use rand::Rng;

use crate::Piece;

/// Piece positions keyed by id.
pub type Layout = BTreeMap<PieceId, Point>;

/// Time a UI shell should show the grid phase before applying the spread phase.
pub const SHUFFLE_PHASE_DELAY: Duration = Duration::from_millis(500);

/// Angle ranges of the spread directions, in radians with `y` growing downwards.
///
/// Pieces are assigned to these ranges round-robin in piece order.
const SPREAD_QUADRANTS: [(f64, f64); 4] = [
    (-FRAC_PI_4, FRAC_PI_4),
    (FRAC_PI_4, 3.0 * FRAC_PI_4),
    (3.0 * FRAC_PI_4, 5.0 * FRAC_PI_4),
    (-3.0 * FRAC_PI_4, -FRAC_PI_4),
];

/// Distances used by the shuffle phases, in display pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShuffleConfig {
    /// Minimum distance between a piece and the container edge in the grid phase.
    pub padding: f64,
    /// Gap between neighboring grid cells.
    pub spacing: f64,
    /// Minimum distance between a piece and the container edge in the spread phase.
    pub spread_padding: f64,
    /// How far each piece is pushed in the spread phase.
    pub spread_distance: f64,
}

impl Default for ShuffleConfig {
    fn default() -> Self {
        Self {
            padding: 20.0,
            spacing: 10.0,
            spread_padding: 40.0,
            spread_distance: 500.0,
        }
    }
}

/// Both layouts produced by one shuffle.
#[derive(Debug, Clone, PartialEq)]
pub struct ShufflePlan {
    /// Positions after the grid phase.
    pub grid: Layout,
    /// Positions after the spread phase; the final scattered state.
    pub spread: Layout,
}

/// Computes shuffle layouts.
///
/// # Examples
///
/// ```
/// use image::RgbaImage;
/// use jigcut_core::{CutLines, Size};
/// use jigcut_generator::{ShuffleEngine, ShuffleSeed, decompose};
///
/// let decomposition = decompose(
///     &RgbaImage::new(300, 200),
///     &CutLines::from_unvalidated(&[100.0], &[150.0]),
/// );
/// let container = Size::new(800.0, 600.0);
/// let engine = ShuffleEngine::default();
///
/// let mut rng = ShuffleSeed::from_label("demo").rng();
/// let plan = engine.shuffle(container, decomposition.pieces(), &mut rng);
/// assert_eq!(plan.spread.len(), 4);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ShuffleEngine {
    config: ShuffleConfig,
}

impl ShuffleEngine {
    /// Creates an engine with the given distances.
    #[must_use]
    pub fn new(config: ShuffleConfig) -> Self {
        Self { config }
    }

    /// The configured distances.
    #[must_use]
    pub fn config(&self) -> &ShuffleConfig {
        &self.config
    }

    /// Runs both phases.
    pub fn shuffle<R>(&self, container: Size, pieces: &[Piece], rng: &mut R) -> ShufflePlan
    where
        R: Rng + ?Sized,
    {
        let grid = self.grid_phase(container, pieces, rng);
        let spread = self.spread_phase(container, pieces, &grid, rng);
        ShufflePlan { grid, spread }
    }

    /// Places the pieces in a random permutation on a centered grid.
    ///
    /// The grid has `ceil(sqrt(n))` cells per row. Every cell is as large as the largest
    /// piece, plus [`ShuffleConfig::spacing`] between cells. Positions are clamped to keep
    /// [`ShuffleConfig::padding`] from the container edges; a piece too large for that is
    /// centered on the axis instead.
    #[allow(clippy::cast_precision_loss)]
    pub fn grid_phase<R>(&self, container: Size, pieces: &[Piece], rng: &mut R) -> Layout
    where
        R: Rng + ?Sized,
    {
        let n = pieces.len();
        if n == 0 {
            return Layout::new();
        }

        // Fisher-Yates
        let mut order = (0..n).collect::<Vec<_>>();
        for i in (1..n).rev() {
            let j = rng.random_range(0..=i);
            order.swap(i, j);
        }

        let cell = pieces
            .iter()
            .map(|p| p.display_size(container))
            .fold(Size::default(), |acc, s| {
                Size::new(acc.width.max(s.width), acc.height.max(s.height))
            });
        let mut per_row = n.isqrt();
        if per_row * per_row < n {
            per_row += 1;
        }
        let rows = n.div_ceil(per_row);

        let pitch_x = cell.width + self.config.spacing;
        let pitch_y = cell.height + self.config.spacing;
        let grid_width = pitch_x * per_row as f64 - self.config.spacing;
        let grid_height = pitch_y * rows as f64 - self.config.spacing;
        let start_x = (container.width - grid_width) / 2.0;
        let start_y = (container.height - grid_height) / 2.0;

        order
            .into_iter()
            .enumerate()
            .map(|(slot, index)| {
                let piece = &pieces[index];
                let size = piece.display_size(container);
                let row = slot / per_row;
                let col = slot % per_row;
                let x = start_x + col as f64 * pitch_x;
                let y = start_y + row as f64 * pitch_y;
                let pos = Point::new(
                    clamp_axis(x, size.width, container.width, self.config.padding),
                    clamp_axis(y, size.height, container.height, self.config.padding),
                );
                (piece.id(), pos)
            })
            .collect()
    }

    /// Pushes every piece [`ShuffleConfig::spread_distance`] away from its grid position.
    ///
    /// The direction is a random angle inside one of four quadrants (right, down, left,
    /// up), assigned round-robin in piece order. Results are clamped like the grid
    /// phase, using [`ShuffleConfig::spread_padding`]. Pieces missing from `grid` start
    /// from the container center.
    pub fn spread_phase<R>(
        &self,
        container: Size,
        pieces: &[Piece],
        grid: &Layout,
        rng: &mut R,
    ) -> Layout
    where
        R: Rng + ?Sized,
    {
        let center = Point::new(container.width / 2.0, container.height / 2.0);
        pieces
            .iter()
            .enumerate()
            .map(|(i, piece)| {
                let (min, max) = SPREAD_QUADRANTS[i % SPREAD_QUADRANTS.len()];
                let angle = rng.random_range(min..max);
                let from = grid.get(&piece.id()).copied().unwrap_or(center);
                let size = piece.display_size(container);
                let distance = self.config.spread_distance;
                let pos = Point::new(
                    clamp_axis(
                        from.x + angle.cos() * distance,
                        size.width,
                        container.width,
                        self.config.spread_padding,
                    ),
                    clamp_axis(
                        from.y + angle.sin() * distance,
                        size.height,
                        container.height,
                        self.config.spread_padding,
                    ),
                );
                (piece.id(), pos)
            })
            .collect()
    }
}

/// Clamps a top-left coordinate so the piece stays `padding` inside `[0, extent]`.
///
/// If the piece cannot fit with that padding, it is centered instead.
fn clamp_axis(value: f64, size: f64, extent: f64, padding: f64) -> f64 {
    let low = padding;
    let high = extent - size - padding;
    if high < low {
        (extent - size) / 2.0
    } else {
        value.clamp(low, high)
    }
}
