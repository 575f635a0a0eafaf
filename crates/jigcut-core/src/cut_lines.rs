//! Cut lines and their validation.
//!
//! A cut line is a single coordinate in source-image space: a [`Axis::Horizontal`] line
//! sits at a fixed `y`, a [`Axis::Vertical`] line at a fixed `x`. Together with the image
//! boundary the lines of both axes partition the image into a grid of rectangles.
//!
//! [`CutLineStore`] is the only way to add lines. It rejects lines that would produce
//! degenerate or unusably thin pieces, keeping every stored set sorted and free of
//! near-duplicates.

use serde::{Deserialize, Serialize};

use crate::Size;

/// Orientation of a cut line.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
pub enum Axis {
    /// A line of constant `y`, splitting the image into rows.
    #[display("horizontal")]
    Horizontal,
    /// A line of constant `x`, splitting the image into columns.
    #[display("vertical")]
    Vertical,
}

impl Axis {
    /// Both axes.
    pub const ALL: [Self; 2] = [Self::Horizontal, Self::Vertical];

    /// Returns the image extent the coordinate of a line on this axis ranges over.
    #[must_use]
    pub fn extent(self, image: Size) -> f64 {
        match self {
            Axis::Horizontal => image.height,
            Axis::Vertical => image.width,
        }
    }
}

/// Validation thresholds for cut lines.
///
/// Both values are fractions of the image extent on the axis of the candidate line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutLineConfig {
    /// Lines must lie strictly inside `(margin, extent - margin)`.
    pub edge_margin_ratio: f64,
    /// Two lines on the same axis must be at least this far apart.
    pub proximity_ratio: f64,
}

impl Default for CutLineConfig {
    fn default() -> Self {
        Self {
            edge_margin_ratio: 0.03,
            proximity_ratio: 0.03,
        }
    }
}

/// The reason a candidate cut line was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
pub enum LineRejection {
    /// The coordinate is NaN or infinite.
    #[display("{axis} line coordinate is not finite")]
    NotFinite {
        /// Axis of the candidate.
        axis: Axis,
    },
    /// The coordinate lies within the edge margin (or outside the image).
    #[display("{axis} line at {coordinate} is within {margin} of the image edge")]
    NearEdge {
        /// Axis of the candidate.
        axis: Axis,
        /// Candidate coordinate.
        coordinate: f64,
        /// Edge margin in pixels.
        margin: f64,
    },
    /// An existing line on the same axis is too close.
    #[display("{axis} line at {coordinate} is too close to existing line at {existing}")]
    NearLine {
        /// Axis of the candidate.
        axis: Axis,
        /// Candidate coordinate.
        coordinate: f64,
        /// The conflicting line.
        existing: f64,
    },
}

/// The observable result of [`CutLineStore::try_add_line`].
#[derive(Debug, Clone, Copy, PartialEq, derive_more::IsVariant)]
pub enum LineOutcome {
    /// The line was inserted.
    Accepted,
    /// The line was not inserted; the store is unchanged.
    Rejected(LineRejection),
}

impl LineOutcome {
    /// Returns the rejection reason, if any.
    #[must_use]
    pub fn rejection(&self) -> Option<LineRejection> {
        match self {
            LineOutcome::Accepted => None,
            LineOutcome::Rejected(reason) => Some(*reason),
        }
    }
}

/// Sorted horizontal and vertical cut positions, in source-image pixels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CutLines {
    horizontal: Vec<f64>,
    vertical: Vec<f64>,
}

impl CutLines {
    /// Creates an empty set of lines.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a line set from raw coordinates, sorting them and dropping exact duplicates
    /// and non-finite values.
    ///
    /// No margin or proximity validation is applied; use [`CutLineStore`] for that.
    #[must_use]
    pub fn from_unvalidated(horizontal: &[f64], vertical: &[f64]) -> Self {
        Self {
            horizontal: normalized(horizontal),
            vertical: normalized(vertical),
        }
    }

    /// Sorted `y` coordinates of horizontal lines.
    #[must_use]
    pub fn horizontal(&self) -> &[f64] {
        &self.horizontal
    }

    /// Sorted `x` coordinates of vertical lines.
    #[must_use]
    pub fn vertical(&self) -> &[f64] {
        &self.vertical
    }

    /// Sorted coordinates of the lines on `axis`.
    #[must_use]
    pub fn on_axis(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::Horizontal => &self.horizontal,
            Axis::Vertical => &self.vertical,
        }
    }

    /// Total number of lines on both axes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.horizontal.len() + self.vertical.len()
    }

    /// Returns `true` if no line has been added on either axis.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.horizontal.is_empty() && self.vertical.is_empty()
    }

    fn on_axis_mut(&mut self, axis: Axis) -> &mut Vec<f64> {
        match axis {
            Axis::Horizontal => &mut self.horizontal,
            Axis::Vertical => &mut self.vertical,
        }
    }

    fn clear(&mut self) {
        self.horizontal.clear();
        self.vertical.clear();
    }
}

fn normalized(values: &[f64]) -> Vec<f64> {
    let mut values = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .collect::<Vec<_>>();
    values.sort_by(f64::total_cmp);
    values.dedup();
    values
}

/// Holds the cut lines of one image and validates new candidates.
///
/// # Examples
///
/// ```
/// use jigcut_core::{Axis, CutLineStore, LineRejection, Size};
///
/// let mut store = CutLineStore::new(Size::new(1000.0, 500.0));
/// assert!(store.try_add_line(Axis::Vertical, 600.0).is_accepted());
/// assert!(store.try_add_line(Axis::Vertical, 300.0).is_accepted());
/// assert_eq!(store.lines().vertical(), &[300.0, 600.0]);
///
/// // 3% of 1000px is 30px.
/// let outcome = store.try_add_line(Axis::Vertical, 320.0);
/// assert!(matches!(
///     outcome.rejection(),
///     Some(LineRejection::NearLine { existing, .. }) if existing == 300.0
/// ));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CutLineStore {
    image: Size,
    config: CutLineConfig,
    lines: CutLines,
}

impl CutLineStore {
    /// Creates an empty store for an image of the given source size.
    #[must_use]
    pub fn new(image: Size) -> Self {
        Self::with_config(image, CutLineConfig::default())
    }

    /// Creates an empty store with explicit thresholds.
    #[must_use]
    pub fn with_config(image: Size, config: CutLineConfig) -> Self {
        Self {
            image,
            config,
            lines: CutLines::new(),
        }
    }

    /// Source size of the image the lines belong to.
    #[must_use]
    pub fn image_size(&self) -> Size {
        self.image
    }

    /// Validation thresholds in use.
    #[must_use]
    pub fn config(&self) -> &CutLineConfig {
        &self.config
    }

    /// The lines accepted so far.
    #[must_use]
    pub fn lines(&self) -> &CutLines {
        &self.lines
    }

    /// Edge margin in pixels for lines on `axis`.
    #[must_use]
    pub fn edge_margin(&self, axis: Axis) -> f64 {
        axis.extent(self.image) * self.config.edge_margin_ratio
    }

    /// Minimum spacing in pixels between lines on `axis`.
    #[must_use]
    pub fn proximity_threshold(&self, axis: Axis) -> f64 {
        axis.extent(self.image) * self.config.proximity_ratio
    }

    /// Checks whether a line could be added, without adding it.
    ///
    /// # Errors
    ///
    /// Returns the [`LineRejection`] that [`try_add_line`](Self::try_add_line) would
    /// report.
    pub fn check_line(&self, axis: Axis, coordinate: f64) -> Result<(), LineRejection> {
        if !coordinate.is_finite() {
            return Err(LineRejection::NotFinite { axis });
        }

        let extent = axis.extent(self.image);
        let margin = self.edge_margin(axis);
        if coordinate <= margin || coordinate >= extent - margin {
            return Err(LineRejection::NearEdge {
                axis,
                coordinate,
                margin,
            });
        }

        let threshold = self.proximity_threshold(axis);
        let existing = self.lines.on_axis(axis);
        // Only the two sorted neighbors of the insertion point can be closest.
        let idx = existing.partition_point(|v| *v < coordinate);
        let neighbors = [idx.checked_sub(1), Some(idx)];
        for existing in neighbors.into_iter().flatten().filter_map(|i| existing.get(i)) {
            if (existing - coordinate).abs() < threshold {
                return Err(LineRejection::NearLine {
                    axis,
                    coordinate,
                    existing: *existing,
                });
            }
        }

        Ok(())
    }

    /// Tries to add a cut line at `coordinate` (source-image pixels) on `axis`.
    ///
    /// On rejection the store is left untouched and the reason is returned so the caller
    /// can present feedback.
    pub fn try_add_line(&mut self, axis: Axis, coordinate: f64) -> LineOutcome {
        if let Err(reason) = self.check_line(axis, coordinate) {
            log::debug!("rejected cut line: {reason}");
            return LineOutcome::Rejected(reason);
        }

        let lines = self.lines.on_axis_mut(axis);
        let idx = lines.partition_point(|v| *v < coordinate);
        lines.insert(idx, coordinate);
        log::debug!("added {axis} cut line at {coordinate}");
        LineOutcome::Accepted
    }

    /// Removes every line on both axes.
    ///
    /// Pieces decomposed from the previous lines are stale after this call and must be
    /// decomposed again.
    pub fn reset(&mut self) {
        self.lines.clear();
    }

    /// Consumes the store, returning the accepted lines.
    #[must_use]
    pub fn into_lines(self) -> CutLines {
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn store() -> CutLineStore {
        CutLineStore::new(Size::new(300.0, 200.0))
    }

    #[test]
    fn accepts_interior_lines_in_sorted_order() {
        let mut store = store();
        assert!(store.try_add_line(Axis::Vertical, 200.0).is_accepted());
        assert!(store.try_add_line(Axis::Vertical, 100.0).is_accepted());
        assert!(store.try_add_line(Axis::Vertical, 150.0).is_accepted());
        assert!(store.try_add_line(Axis::Horizontal, 100.0).is_accepted());

        assert_eq!(store.lines().vertical(), &[100.0, 150.0, 200.0]);
        assert_eq!(store.lines().horizontal(), &[100.0]);
        assert_eq!(store.lines().len(), 4);
    }

    #[test]
    fn rejects_lines_near_edges() {
        let mut store = store();
        // Vertical margin is 9px (3% of 300), horizontal margin 6px (3% of 200).
        for x in [0.0, 5.0, 8.0, 292.0, 300.0, 450.0, -10.0] {
            let outcome = store.try_add_line(Axis::Vertical, x);
            assert!(
                matches!(outcome, LineOutcome::Rejected(LineRejection::NearEdge { .. })),
                "x = {x}: {outcome:?}"
            );
        }
        assert!(store.try_add_line(Axis::Vertical, 10.0).is_accepted());
        assert!(store.try_add_line(Axis::Horizontal, 7.0).is_accepted());
        assert!(store.try_add_line(Axis::Horizontal, 195.0).is_rejected());
    }

    #[test]
    fn rejects_lines_near_existing_on_same_axis_only() {
        let mut store = store();
        assert!(store.try_add_line(Axis::Vertical, 100.0).is_accepted());
        // 9px threshold on the vertical axis.
        assert!(store.try_add_line(Axis::Vertical, 107.0).is_rejected());
        assert!(store.try_add_line(Axis::Vertical, 93.0).is_rejected());
        assert!(store.try_add_line(Axis::Vertical, 100.0).is_rejected());
        // The horizontal axis is independent.
        assert!(store.try_add_line(Axis::Horizontal, 100.0).is_accepted());
        assert!(store.try_add_line(Axis::Vertical, 110.0).is_accepted());
        assert_eq!(store.lines().vertical(), &[100.0, 110.0]);
    }

    #[test]
    fn rejects_non_finite() {
        let mut store = store();
        assert_eq!(
            store.try_add_line(Axis::Horizontal, f64::NAN).rejection(),
            Some(LineRejection::NotFinite {
                axis: Axis::Horizontal
            })
        );
        assert!(store.lines().is_empty());
    }

    #[test]
    fn reset_clears_both_axes() {
        let mut store = store();
        assert!(store.try_add_line(Axis::Horizontal, 100.0).is_accepted());
        assert!(store.try_add_line(Axis::Vertical, 100.0).is_accepted());
        store.reset();
        assert!(store.lines().is_empty());
        assert!(store.try_add_line(Axis::Vertical, 100.0).is_accepted());
    }

    #[test]
    fn from_unvalidated_sorts_and_dedups() {
        let lines = CutLines::from_unvalidated(&[50.0, 10.0, 50.0, f64::INFINITY], &[]);
        assert_eq!(lines.horizontal(), &[10.0, 50.0]);
        assert!(lines.vertical().is_empty());
    }

    #[test]
    fn serializes_as_plain_arrays() {
        let lines = CutLines::from_unvalidated(&[100.0], &[150.0]);
        let json = serde_json::to_string(&lines).unwrap();
        assert_eq!(json, r#"{"horizontal":[100.0],"vertical":[150.0]}"#);
    }

    proptest! {
        #[test]
        fn accepted_lines_respect_invariants(
            candidates in proptest::collection::vec((any::<bool>(), -50.0f64..350.0), 0..64),
        ) {
            let mut store = store();
            for (horizontal, coordinate) in candidates {
                let axis = if horizontal { Axis::Horizontal } else { Axis::Vertical };
                let before = store.lines().clone();
                let outcome = store.try_add_line(axis, coordinate);
                if outcome.is_rejected() {
                    prop_assert_eq!(store.lines(), &before);
                }
            }

            for axis in Axis::ALL {
                let extent = axis.extent(store.image_size());
                let margin = store.edge_margin(axis);
                let threshold = store.proximity_threshold(axis);
                let lines = store.lines().on_axis(axis);
                for v in lines {
                    prop_assert!(*v > margin && *v < extent - margin);
                }
                for pair in lines.windows(2) {
                    prop_assert!(pair[0] < pair[1]);
                    prop_assert!(pair[1] - pair[0] >= threshold);
                }
            }
        }
    }
}
