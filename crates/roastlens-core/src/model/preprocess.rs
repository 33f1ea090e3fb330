//! Image preprocessing for the CLIP vision encoder.
//!
//! CLIP ViT-B/32 expects:
//! - Input size: 224×224 pixels
//! - Normalization: per-channel `(pixel/255 - mean) / std` with the
//!   checkpoint's RGB statistics
//! - Tensor layout: NCHW [batch, channels, height, width]

use image::RgbImage;
use ndarray::Array4;

/// Number of color channels (RGB).
const CHANNELS: usize = 3;

/// CLIP normalization mean, RGB order.
const NORM_MEAN: [f32; CHANNELS] = [0.481_454_66, 0.457_827_5, 0.408_210_73];

/// CLIP normalization std, RGB order.
const NORM_STD: [f32; CHANNELS] = [0.268_629_54, 0.261_302_58, 0.275_777_11];

/// Preprocess an RGB image for CLIP inference.
///
/// Resizes to `image_size × image_size`, normalizes per channel, and returns
/// an NCHW tensor suitable for ONNX Runtime.
pub fn preprocess(image: &RgbImage, image_size: u32) -> Array4<f32> {
    let resized = image::imageops::resize(
        image,
        image_size,
        image_size,
        image::imageops::FilterType::Lanczos3,
    );

    let size = image_size as usize;
    let mut tensor = Array4::<f32>::zeros((1, CHANNELS, size, size));

    // Walk the raw RGB bytes directly rather than per-pixel accessors; the
    // tensor slice is contiguous by construction.
    let raw = resized.as_raw();
    let tensor_data = tensor.as_slice_mut().unwrap();
    for (i, pixel) in raw.chunks_exact(CHANNELS).enumerate() {
        let y = i / size;
        let x = i % size;
        for (c, &val) in pixel.iter().enumerate() {
            // NCHW layout: offset = c * size * size + y * size + x
            let idx = c * size * size + y * size + x;
            tensor_data[idx] = (val as f32 / 255.0 - NORM_MEAN[c]) / NORM_STD[c];
        }
    }

    tensor
}
