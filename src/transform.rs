//! Geometric transforms on grayscale images
//!
//! Angles follow image coordinates (y grows downward): a positive angle
//! turns content clockwise as seen on screen.

use image::{imageops, GrayImage, Luma};

/// Rotate an image 90 degrees clockwise (width and height swap)
pub fn rotate_90_clockwise(image: &GrayImage) -> GrayImage {
    imageops::rotate90(image)
}

/// Rotate an image 90 degrees counter-clockwise (width and height swap)
pub fn rotate_90_counter_clockwise(image: &GrayImage) -> GrayImage {
    imageops::rotate270(image)
}

/// Rotate about the image centre by `degrees`, keeping the original size
///
/// Resampling is bilinear. Source coordinates that fall outside the image
/// take the value of the nearest border pixel.
pub fn rotate_about_center(image: &GrayImage, degrees: f32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let (sin, cos) = degrees.to_radians().sin_cos();
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;

    GrayImage::from_fn(width, height, |x, y| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        // Inverse mapping: destination -> source
        let sx = cos * dx + sin * dy + cx;
        let sy = -sin * dx + cos * dy + cy;
        Luma([sample_bilinear_replicate(image, sx, sy)])
    })
}

fn sample_bilinear_replicate(image: &GrayImage, x: f32, y: f32) -> u8 {
    let (width, height) = image.dimensions();
    let x = x.clamp(0.0, (width - 1) as f32);
    let y = y.clamp(0.0, (height - 1) as f32);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p = |px: u32, py: u32| image.get_pixel(px, py).0[0] as f32;
    let top = p(x0, y0) * (1.0 - fx) + p(x1, y0) * fx;
    let bottom = p(x0, y1) * (1.0 - fx) + p(x1, y1) * fx;
    let value = top * (1.0 - fy) + bottom * fy;

    value.round().clamp(0.0, 255.0) as u8
}
