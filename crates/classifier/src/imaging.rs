use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{imageops::FilterType, DynamicImage, GenericImageView, ImageFormat};
use thiserror::Error;

/// Longest edge sent to the vision model.
pub const MAX_VISION_EDGE: u32 = 1024;

#[derive(Debug, Error)]
pub enum ImagingError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("failed to encode png: {0}")]
    Encode(#[source] image::ImageError),
}

/// Decodes an uploaded image, shrinks it to fit the vision model and returns
/// it as base64 encoded PNG.
pub fn prepare_for_vision(bytes: &[u8]) -> Result<String, ImagingError> {
    let img = image::load_from_memory(bytes).map_err(ImagingError::Decode)?;
    let png = encode_png(&fit_within(img, MAX_VISION_EDGE))?;
    Ok(STANDARD.encode(png))
}

/// Scales down so both edges are at most `max_edge`. Never upscales.
pub fn fit_within(img: DynamicImage, max_edge: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width <= max_edge && height <= max_edge {
        return img;
    }
    img.resize(max_edge, max_edge, FilterType::Triangle)
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, ImagingError> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png)
        .map_err(ImagingError::Encode)?;
    Ok(buffer.into_inner())
}
