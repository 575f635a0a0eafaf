//! Embedding bitmaps as `data:` URLs and fitting images for storage.

use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{ImageFormat, RgbaImage, imageops::FilterType};
use jigcut_core::Size;

/// Prefix of every URL produced by [`encode_data_url`].
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Errors from encoding or decoding embedded bitmaps.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum BitmapError {
    /// The string is not a base64 `data:` URL.
    #[display("not a base64 data URL")]
    NotDataUrl,
    /// The payload is not valid base64.
    #[display("invalid base64 payload: {_0}")]
    Base64(#[from] base64::DecodeError),
    /// The image could not be encoded or decoded.
    #[display("image codec failed: {_0}")]
    Image(#[from] image::ImageError),
}

/// Encodes `image` as a PNG `data:` URL.
///
/// # Errors
///
/// Returns [`BitmapError::Image`] if PNG encoding fails.
pub fn encode_data_url(image: &RgbaImage) -> Result<String, BitmapError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(format!("{PNG_DATA_URL_PREFIX}{}", STANDARD.encode(&bytes)))
}

/// Decodes a base64 `data:` URL holding any supported raster format.
///
/// # Errors
///
/// Returns [`BitmapError::NotDataUrl`] if the string is not a base64 `data:` URL,
/// [`BitmapError::Base64`] for a corrupt payload, and [`BitmapError::Image`] if the
/// payload is not a decodable image.
pub fn decode_data_url(url: &str) -> Result<RgbaImage, BitmapError> {
    let (meta, payload) = url
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or(BitmapError::NotDataUrl)?;
    if !meta.ends_with(";base64") {
        return Err(BitmapError::NotDataUrl);
    }
    let bytes = STANDARD.decode(payload)?;
    Ok(image::load_from_memory(&bytes)?.to_rgba8())
}

/// Returns `image` scaled down to fit inside `max`, preserving aspect ratio.
///
/// Images that already fit are returned unchanged.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn fit_within(image: &RgbaImage, max: Size) -> RgbaImage {
    let (width, height) = image.dimensions();
    if f64::from(width) <= max.width && f64::from(height) <= max.height {
        return image.clone();
    }
    let scale = (max.width / f64::from(width)).min(max.height / f64::from(height));
    let new_width = ((f64::from(width) * scale).floor() as u32).max(1);
    let new_height = ((f64::from(height) * scale).floor() as u32).max(1);
    log::debug!("fitting {width}x{height} image into {new_width}x{new_height}");
    image::imageops::resize(image, new_width, new_height, FilterType::Triangle)
}
