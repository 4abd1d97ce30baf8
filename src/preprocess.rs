//! Turns an uploaded image into the model's input tensor.

use image::{imageops::FilterType, DynamicImage, GenericImageView};
use ndarray::Array3;

use crate::error::RelayError;
use crate::models::{NormalizedTensor, CHANNELS, INPUT_SIZE};

/// Decodes `bytes`, fits the image to 224x224 and scales every channel into [-1, 1].
pub fn normalize_image(bytes: &[u8]) -> Result<NormalizedTensor, RelayError> {
    let img = image::load_from_memory(bytes)?;
    to_tensor(&img)
}

fn to_tensor(img: &DynamicImage) -> Result<NormalizedTensor, RelayError> {
    // Crop a centered square in source pixels, then resample only that square.
    let (width, height) = img.dimensions();
    let side = width.min(height);
    let cropped = img.crop_imm((width - side) / 2, (height - side) / 2, side, side);

    // Grayscale is expanded and alpha dropped before resampling.
    let fitted = DynamicImage::ImageRgb8(cropped.to_rgb8())
        .resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::Lanczos3)
        .to_rgb8();

    let side = INPUT_SIZE as usize;
    let pixels = Array3::from_shape_vec((side, side, CHANNELS), fitted.into_raw())
        .map_err(|e| RelayError::internal(format!("Unexpected image shape: {}", e)))?;

    Ok(NormalizedTensor(pixels.mapv(scale_channel)))
}

#[inline]
fn scale_channel(value: u8) -> f32 {
    f32::from(value) / 127.5 - 1.0
}
