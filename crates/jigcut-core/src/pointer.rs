//! Pointer input unified behind one sample type.

use crate::{
    Point, ScaleFactors,
    coordinate::{to_display, to_source},
};

/// A pointer location in display space, relative to the board's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerSample {
    /// Horizontal display coordinate.
    pub x: f64,
    /// Vertical display coordinate.
    pub y: f64,
}

impl PointerSample {
    /// Creates a sample from display coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The sample as a display-space point.
    #[must_use]
    pub fn point(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Converts the sample to source-image space.
    #[must_use]
    pub fn to_source(self, scale: ScaleFactors) -> Point {
        to_source(self.point(), scale)
    }

    /// Creates the sample located at a source-image point.
    #[must_use]
    pub fn from_source(source: Point, scale: ScaleFactors) -> Self {
        let p = to_display(source, scale);
        Self::new(p.x, p.y)
    }
}

/// Raw input as delivered by a UI shell, in viewport (client) coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerInput {
    /// A mouse event.
    Mouse {
        /// Viewport `x`.
        client_x: f64,
        /// Viewport `y`.
        client_y: f64,
    },
    /// A touch event with every active touch point.
    Touch {
        /// Active touch points in viewport coordinates.
        touches: Vec<Point>,
    },
}

impl PointerInput {
    /// Produces a board-relative sample, given the board's top-left corner in viewport
    /// coordinates.
    ///
    /// Touch input uses the first active touch. Returns `None` for a touch event without
    /// any active touch point.
    ///
    /// # Examples
    ///
    /// ```
    /// use jigcut_core::{Point, PointerInput, PointerSample};
    ///
    /// let board = Point::new(100.0, 50.0);
    /// let mouse = PointerInput::Mouse { client_x: 130.0, client_y: 70.0 };
    /// assert_eq!(mouse.sample(board), Some(PointerSample::new(30.0, 20.0)));
    ///
    /// let lifted = PointerInput::Touch { touches: vec![] };
    /// assert_eq!(lifted.sample(board), None);
    /// ```
    #[must_use]
    pub fn sample(&self, board_origin: Point) -> Option<PointerSample> {
        let client = match self {
            PointerInput::Mouse { client_x, client_y } => Point::new(*client_x, *client_y),
            PointerInput::Touch { touches } => *touches.first()?,
        };
        Some(PointerSample::new(
            client.x - board_origin.x,
            client.y - board_origin.y,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_uses_first_point() {
        let input = PointerInput::Touch {
            touches: vec![Point::new(10.0, 10.0), Point::new(99.0, 99.0)],
        };
        assert_eq!(
            input.sample(Point::new(5.0, 5.0)),
            Some(PointerSample::new(5.0, 5.0))
        );
    }

    #[test]
    fn converts_to_source_space() {
        let sample = PointerSample::new(100.0, 50.0);
        let source = sample.to_source(ScaleFactors::uniform(0.5));
        assert_eq!(source, Point::new(200.0, 100.0));
        assert_eq!(
            PointerSample::from_source(source, ScaleFactors::uniform(0.5)),
            sample
        );
    }
}
