//! Puzzle authoring: load an image, draw cut lines, break it into pieces.

use image::RgbaImage;
use jigcut_core::{
    Axis, CutLineConfig, CutLineStore, CutLines, DISPLAY_BUDGET, DisplayFit, LineOutcome,
    PointerSample, Size, compute_scale_factors,
};

use crate::{Decomposition, decompose};

/// Errors raised by [`PuzzleEditor`].
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum EditorError {
    /// An operation that needs an image was called before one was loaded.
    #[display("no image loaded")]
    NotLoaded,
    /// The image has a zero dimension.
    #[display("image is empty ({width}x{height})")]
    EmptyImage {
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
    },
    /// The image bytes could not be decoded.
    #[display("failed to decode image: {_0}")]
    Decode(#[from] image::ImageError),
}

#[derive(Debug, Clone)]
struct LoadedImage {
    image: RgbaImage,
    fit: DisplayFit,
    lines: CutLineStore,
}

/// Authoring state for one puzzle.
///
/// The editor starts without an image. Loading an image computes how it is displayed
/// within the display budget; cut lines are then added from pointer samples in display
/// space and stored in source-image space. Breaking the image produces the pieces.
///
/// # Examples
///
/// ```
/// use image::RgbaImage;
/// use jigcut_core::{Axis, PointerSample};
/// use jigcut_generator::PuzzleEditor;
///
/// let mut editor = PuzzleEditor::new();
/// assert!(editor.try_add_line(Axis::Vertical, PointerSample::new(10.0, 10.0)).is_err());
///
/// // A 400x300 image is shown at 800x600, so display coordinates are halved.
/// editor.load_image(RgbaImage::new(400, 300))?;
/// let outcome = editor.try_add_line(Axis::Vertical, PointerSample::new(400.0, 0.0))?;
/// assert!(outcome.is_accepted());
/// assert_eq!(editor.lines().unwrap().vertical(), &[200.0]);
///
/// let decomposition = editor.break_image();
/// assert_eq!(decomposition.pieces().len(), 2);
/// # Ok::<(), jigcut_generator::EditorError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PuzzleEditor {
    display_budget: Size,
    config: CutLineConfig,
    loaded: Option<LoadedImage>,
    decomposition: Option<Decomposition>,
}

impl Default for PuzzleEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl PuzzleEditor {
    /// Creates an editor with the default display budget and line thresholds.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DISPLAY_BUDGET, CutLineConfig::default())
    }

    /// Creates an editor with explicit settings.
    #[must_use]
    pub fn with_config(display_budget: Size, config: CutLineConfig) -> Self {
        Self {
            display_budget,
            config,
            loaded: None,
            decomposition: None,
        }
    }

    /// Decodes an encoded image (PNG or JPEG) and loads it.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::Decode`] if the bytes are not a supported image, or
    /// [`EditorError::EmptyImage`] if it has no pixels.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), EditorError> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        self.load_image(image)
    }

    /// Loads an image, discarding any previous lines and pieces.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::EmptyImage`] if the image has no pixels. The editor state
    /// is left untouched in that case.
    pub fn load_image(&mut self, image: RgbaImage) -> Result<(), EditorError> {
        let (width, height) = image.dimensions();
        let size = Size::new(f64::from(width), f64::from(height));
        if size.is_empty() {
            return Err(EditorError::EmptyImage { width, height });
        }
        let fit = compute_scale_factors(size, self.display_budget);
        log::info!(
            "loaded {width}x{height} image, displayed at {:.0}x{:.0}",
            fit.size.width,
            fit.size.height
        );
        self.loaded = Some(LoadedImage {
            image,
            fit,
            lines: CutLineStore::with_config(size, self.config),
        });
        self.decomposition = None;
        Ok(())
    }

    /// Returns `true` once an image has been loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// The loaded image.
    #[must_use]
    pub fn image(&self) -> Option<&RgbaImage> {
        self.loaded.as_ref().map(|l| &l.image)
    }

    /// How the loaded image is displayed.
    #[must_use]
    pub fn display_fit(&self) -> Option<DisplayFit> {
        self.loaded.as_ref().map(|l| l.fit)
    }

    /// The accepted cut lines, in source-image space.
    #[must_use]
    pub fn lines(&self) -> Option<&CutLines> {
        self.loaded.as_ref().map(|l| l.lines.lines())
    }

    /// Adds a line through a display-space pointer sample.
    ///
    /// The sample's `y` is used for a horizontal line and its `x` for a vertical one.
    /// Any previous decomposition is discarded when the line is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NotLoaded`] if no image is loaded.
    pub fn try_add_line(
        &mut self,
        axis: Axis,
        sample: PointerSample,
    ) -> Result<LineOutcome, EditorError> {
        let loaded = self.loaded.as_ref().ok_or(EditorError::NotLoaded)?;
        let source = sample.to_source(loaded.fit.scale);
        let coordinate = match axis {
            Axis::Horizontal => source.y,
            Axis::Vertical => source.x,
        };
        self.try_add_source_line(axis, coordinate)
    }

    /// Adds a horizontal and a vertical line crossing at a display-space sample.
    ///
    /// Each line is validated independently.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NotLoaded`] if no image is loaded.
    pub fn try_add_cross(
        &mut self,
        sample: PointerSample,
    ) -> Result<[LineOutcome; 2], EditorError> {
        Ok([
            self.try_add_line(Axis::Horizontal, sample)?,
            self.try_add_line(Axis::Vertical, sample)?,
        ])
    }

    /// Adds a line given directly in source-image space.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NotLoaded`] if no image is loaded.
    pub fn try_add_source_line(
        &mut self,
        axis: Axis,
        coordinate: f64,
    ) -> Result<LineOutcome, EditorError> {
        let loaded = self.loaded.as_mut().ok_or(EditorError::NotLoaded)?;
        let outcome = loaded.lines.try_add_line(axis, coordinate);
        if outcome.is_accepted() {
            self.decomposition = None;
        }
        Ok(outcome)
    }

    /// Removes every cut line and any decomposition.
    pub fn reset_lines(&mut self) {
        if let Some(loaded) = &mut self.loaded {
            loaded.lines.reset();
        }
        self.decomposition = None;
    }

    /// Cuts the loaded image along the current lines.
    ///
    /// Without an image or without any line there is nothing to break; a warning is
    /// logged and an empty decomposition is returned.
    pub fn break_image(&mut self) -> &Decomposition {
        let decomposition = match &self.loaded {
            None => {
                log::warn!("cannot break the image: no image loaded");
                Decomposition::empty()
            }
            Some(loaded) if loaded.lines.lines().is_empty() => {
                log::warn!("cannot break the image: no cut lines");
                Decomposition::empty()
            }
            Some(loaded) => decompose(&loaded.image, loaded.lines.lines()),
        };
        self.decomposition.insert(decomposition)
    }

    /// The result of the last [`break_image`](Self::break_image), if still current.
    #[must_use]
    pub fn decomposition(&self) -> Option<&Decomposition> {
        self.decomposition.as_ref()
    }

    /// Takes ownership of the last decomposition.
    pub fn take_decomposition(&mut self) -> Option<Decomposition> {
        self.decomposition.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations_before_load() {
        let mut editor = PuzzleEditor::new();
        assert!(!editor.is_loaded());
        assert!(matches!(
            editor.try_add_source_line(Axis::Horizontal, 10.0),
            Err(EditorError::NotLoaded)
        ));
        assert!(editor.break_image().is_empty());
        assert!(editor.lines().is_none());
    }

    #[test]
    fn rejects_empty_and_undecodable_images() {
        let mut editor = PuzzleEditor::new();
        assert!(matches!(
            editor.load_image(RgbaImage::new(0, 5)),
            Err(EditorError::EmptyImage { width: 0, height: 5 })
        ));
        assert!(matches!(
            editor.load_bytes(b"not an image"),
            Err(EditorError::Decode(_))
        ));
        assert!(!editor.is_loaded());
    }

    #[test]
    fn break_without_lines_is_empty() {
        let mut editor = PuzzleEditor::new();
        editor.load_image(RgbaImage::new(300, 200)).unwrap();
        assert!(editor.break_image().is_empty());
    }

    #[test]
    fn cross_adds_both_lines() {
        let mut editor = PuzzleEditor::new();
        // 300x200 fits 800x600 at scale 8/3.
        editor.load_image(RgbaImage::new(300, 200)).unwrap();
        let fit = editor.display_fit().unwrap();
        let sample = PointerSample::from_source(jigcut_core::Point::new(150.0, 100.0), fit.scale);
        let [h, v] = editor.try_add_cross(sample).unwrap();
        assert!(h.is_accepted());
        assert!(v.is_accepted());

        let lines = editor.lines().unwrap();
        assert!((lines.horizontal()[0] - 100.0).abs() < 1e-9);
        assert!((lines.vertical()[0] - 150.0).abs() < 1e-9);

        let decomposition = editor.break_image();
        assert_eq!(decomposition.pieces().len(), 4);
        assert_eq!(decomposition.solution().rows(), 2);
    }

    #[test]
    fn new_line_and_reset_invalidate_pieces() {
        let mut editor = PuzzleEditor::new();
        editor.load_image(RgbaImage::new(300, 200)).unwrap();
        editor.try_add_source_line(Axis::Vertical, 150.0).unwrap();
        editor.break_image();
        assert!(editor.decomposition().is_some());

        let rejected = editor.try_add_source_line(Axis::Vertical, 151.0).unwrap();
        assert!(rejected.is_rejected());
        assert!(editor.decomposition().is_some());

        editor.try_add_source_line(Axis::Vertical, 75.0).unwrap();
        assert!(editor.decomposition().is_none());

        editor.break_image();
        editor.reset_lines();
        assert!(editor.decomposition().is_none());
        assert!(editor.lines().unwrap().is_empty());
    }
}
