//! Image preprocessing for WD tagger inference.
//!
//! The tagger expects:
//! - A square input of the model's native dimension
//! - Transparency flattened onto a white background, centered white
//!   padding to square
//! - BGR channel order, raw 0-255 float values (no normalization)
//! - Tensor layout: NHWC [batch, height, width, channels]

use image::{imageops, DynamicImage, Rgb, RgbImage, RgbaImage};
use ndarray::Array4;

/// Number of color channels.
const CHANNELS: usize = 3;

/// Preprocess an image for WD tagger inference.
pub fn preprocess(image: &DynamicImage, input_size: u32) -> Array4<f32> {
    let flattened = flatten_onto_white(image);
    let squared = pad_to_square(flattened);
    let resized = if squared.width() != input_size {
        imageops::resize(
            &squared,
            input_size,
            input_size,
            imageops::FilterType::CatmullRom,
        )
    } else {
        squared
    };

    let size = input_size as usize;
    let mut tensor = Array4::<f32>::zeros((1, size, size, CHANNELS));

    // Walk the raw RGB bytes directly; Array4::zeros is standard layout
    // so the flat slice is always available.
    let raw = resized.as_raw();
    let tensor_data = tensor.as_slice_mut().unwrap();
    for (i, pixel) in raw.chunks_exact(CHANNELS).enumerate() {
        let base = i * CHANNELS;
        // Reverse the channel order: RGB -> BGR.
        tensor_data[base] = pixel[2] as f32;
        tensor_data[base + 1] = pixel[1] as f32;
        tensor_data[base + 2] = pixel[0] as f32;
    }

    tensor
}

/// Composite the image onto a white background, discarding transparency.
fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    let rgba: RgbaImage = image.to_rgba8();
    let mut canvas = RgbImage::from_pixel(rgba.width(), rgba.height(), Rgb([255, 255, 255]));
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let alpha = pixel[3] as f32 / 255.0;
        let background = canvas.get_pixel_mut(x, y);
        for channel in 0..CHANNELS {
            let blended =
                pixel[channel] as f32 * alpha + background[channel] as f32 * (1.0 - alpha);
            background[channel] = blended.round() as u8;
        }
    }
    canvas
}

/// Pad to a centered square on a white canvas.
fn pad_to_square(image: RgbImage) -> RgbImage {
    if image.width() == image.height() {
        return image;
    }
    let max_dimension = image.width().max(image.height());
    let mut canvas = RgbImage::from_pixel(max_dimension, max_dimension, Rgb([255, 255, 255]));
    let horizontal = (max_dimension - image.width()) / 2;
    let vertical = (max_dimension - image.height()) / 2;
    imageops::replace(&mut canvas, &image, horizontal as i64, vertical as i64);
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_preprocess_shape() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(640, 480));
        let tensor = preprocess(&img, 448);
        assert_eq!(tensor.shape(), &[1, 448, 448, 3]);
    }

    #[test]
    fn test_channel_order_reversed() {
        // Pure red (255, 0, 0) must land as BGR (0, 0, 255).
        let img =
            DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([255, 0, 0])));
        let tensor = preprocess(&img, 4);
        assert_eq!(tensor[[0, 0, 0, 0]], 0.0);
        assert_eq!(tensor[[0, 0, 0, 1]], 0.0);
        assert_eq!(tensor[[0, 0, 0, 2]], 255.0);
    }

    #[test]
    fn test_values_are_raw_not_normalized() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([255, 255, 255])));
        let tensor = preprocess(&img, 4);
        assert!(tensor.iter().all(|&v| v == 255.0));
    }

    #[test]
    fn test_padding_is_white_and_centered() {
        // A 4x2 black image padded to 4x4: top and bottom rows are white,
        // the middle rows are black.
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 2, Rgb([0, 0, 0])));
        let tensor = preprocess(&img, 4);
        assert_eq!(tensor[[0, 0, 0, 0]], 255.0); // padding row
        assert_eq!(tensor[[0, 1, 0, 0]], 0.0); // image row
        assert_eq!(tensor[[0, 2, 0, 0]], 0.0); // image row
        assert_eq!(tensor[[0, 3, 0, 0]], 255.0); // padding row
    }

    #[test]
    fn test_transparency_flattened_onto_white() {
        let img = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            4,
            4,
            Rgba([0, 0, 0, 0]),
        ));
        let tensor = preprocess(&img, 4);
        assert!(tensor.iter().all(|&v| v == 255.0));
    }
}
