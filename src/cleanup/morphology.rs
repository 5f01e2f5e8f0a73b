//! Binary morphology with thin rectangular structuring elements
//!
//! Pixels outside the image are treated as background.
//!
//! The line openings scan runs directly: a run of at least the element
//! length is exactly what an opening with a 1-pixel-thin line keeps, in
//! one pass per row or column, and with no cap on the element length.
//! Dilation goes through [`imageproc::morphology`].

use image::{GrayImage, Luma};
use imageproc::morphology::{grayscale_dilate, Mask};

use super::types::{BinaryImage, FOREGROUND};

/// Opening with a `length × 1` horizontal element
///
/// Keeps exactly the foreground pixels lying on a horizontal run of at
/// least `length` pixels.
pub fn open_horizontal(binary: &BinaryImage, length: u32) -> BinaryImage {
    let (width, height) = binary.dimensions();
    let mut out = BinaryImage::new(width, height);
    let length = length.max(1);

    for y in 0..height {
        let mut x = 0;
        while x < width {
            if !binary.is_foreground(x, y) {
                x += 1;
                continue;
            }
            let start = x;
            while x < width && binary.is_foreground(x, y) {
                x += 1;
            }
            if x - start >= length {
                for rx in start..x {
                    out.set(rx, y, true);
                }
            }
        }
    }

    out
}

/// Opening with a `1 × length` vertical element
///
/// Keeps exactly the foreground pixels lying on a vertical run of at
/// least `length` pixels.
pub fn open_vertical(binary: &BinaryImage, length: u32) -> BinaryImage {
    let (width, height) = binary.dimensions();
    let mut out = BinaryImage::new(width, height);
    let length = length.max(1);

    for x in 0..width {
        let mut y = 0;
        while y < height {
            if !binary.is_foreground(x, y) {
                y += 1;
                continue;
            }
            let start = y;
            while y < height && binary.is_foreground(x, y) {
                y += 1;
            }
            if y - start >= length {
                for ry in start..y {
                    out.set(x, ry, true);
                }
            }
        }
    }

    out
}

/// Largest dilation element side an imageproc [`Mask`] can hold
pub const MAX_DILATION_SIZE: u32 = 511;

/// Dilation with a `size × size` square anchored at its centre
///
/// For size `s` a destination pixel reads sources at offsets
/// `-(s/2) ..= (s-1) - s/2` on each axis, so a 2×2 element grows strokes
/// by one pixel right and down. Sizes above [`MAX_DILATION_SIZE`] are
/// clamped.
pub fn dilate_square(binary: &BinaryImage, size: u32) -> BinaryImage {
    if size <= 1 {
        return binary.clone();
    }
    let size = size.min(MAX_DILATION_SIZE);
    let anchor = (size / 2) as u8;
    let element = GrayImage::from_pixel(size, size, Luma([FOREGROUND]));
    let mask = Mask::from_image(&element, anchor, anchor);

    BinaryImage::from_gray_unchecked(grayscale_dilate(binary.as_gray(), &mask))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic pseudo-random binary image, roughly 40% foreground
    fn noise(width: u32, height: u32, seed: u32) -> BinaryImage {
        let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(12_345);
        BinaryImage::from_fn(width, height, |_, _| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state % 10 < 4
        })
    }

    #[test]
    fn test_open_horizontal_keeps_long_runs() {
        let binary = BinaryImage::from_fn(20, 3, |x, y| {
            (y == 0 && x < 10) || (y == 2 && (3..7).contains(&x))
        });
        let opened = open_horizontal(&binary, 8);
        assert_eq!(opened.foreground_count(), 10);
        assert!(opened.is_foreground(0, 0));
        assert!(opened.is_foreground(9, 0));
        assert!(!opened.is_foreground(4, 2));
    }

    #[test]
    fn test_open_horizontal_run_touching_border() {
        let binary = BinaryImage::from_fn(10, 1, |x, _| x >= 5);
        assert_eq!(open_horizontal(&binary, 6).foreground_count(), 0);
        assert_eq!(open_horizontal(&binary, 5).foreground_count(), 5);
    }

    #[test]
    fn test_open_vertical_keeps_long_runs() {
        let binary = BinaryImage::from_fn(3, 20, |x, y| (x == 1 && y < 15) || (x == 2 && y < 4));
        let opened = open_vertical(&binary, 12);
        assert_eq!(opened.foreground_count(), 15);
        assert!(!opened.is_foreground(2, 0));
    }

    #[test]
    fn test_dilate_2x2_grows_right_and_down() {
        let mut binary = BinaryImage::new(5, 5);
        binary.set(2, 2, true);
        let dilated = dilate_square(&binary, 2);
        assert_eq!(dilated.foreground_count(), 4);
        assert!(dilated.is_foreground(2, 2));
        assert!(dilated.is_foreground(3, 2));
        assert!(dilated.is_foreground(2, 3));
        assert!(dilated.is_foreground(3, 3));
    }

    #[test]
    fn test_dilate_3x3_is_symmetric() {
        let mut binary = BinaryImage::new(5, 5);
        binary.set(2, 2, true);
        let dilated = dilate_square(&binary, 3);
        assert_eq!(dilated.foreground_count(), 9);
        assert!(dilated.is_foreground(1, 1));
        assert!(dilated.is_foreground(3, 3));
    }

    #[test]
    fn test_dilate_size_one_is_identity() {
        let binary = BinaryImage::from_fn(6, 6, |x, y| (x + y) % 3 == 0);
        assert_eq!(dilate_square(&binary, 1), binary);
    }

    #[test]
    fn test_dilate_oversized_element_is_clamped() {
        let mut binary = BinaryImage::new(8, 8);
        binary.set(0, 0, true);
        let dilated = dilate_square(&binary, 10_000);
        assert_eq!(dilated.foreground_count(), 64);
    }

    #[test]
    fn test_dilate_2x2_matches_shifted_union() {
        for seed in 0..20 {
            let binary = noise(97, 61, seed);
            let dilated = dilate_square(&binary, 2);
            let expected = BinaryImage::from_fn(97, 61, |x, y| {
                let at = |dx: u32, dy: u32| {
                    x >= dx && y >= dy && binary.is_foreground(x - dx, y - dy)
                };
                at(0, 0) || at(1, 0) || at(0, 1) || at(1, 1)
            });
            assert_eq!(dilated, expected, "seed {seed}");
        }
    }

    #[test]
    fn test_open_horizontal_agrees_with_masked_opening_inside() {
        use imageproc::morphology::grayscale_open;

        let length = 5;
        let element = GrayImage::from_pixel(length, 1, Luma([FOREGROUND]));
        let mask = Mask::from_image(&element, (length / 2) as u8, 0);

        for seed in 0..20 {
            let binary = noise(97, 61, seed);
            let runs = open_horizontal(&binary, length);
            let masked = grayscale_open(binary.as_gray(), &mask);
            // Near the border imageproc ignores outside pixels instead of
            // treating them as background
            for y in 0..61 {
                for x in length..97 - length {
                    assert_eq!(
                        runs.is_foreground(x, y),
                        masked.get_pixel(x, y).0[0] == FOREGROUND,
                        "seed {seed} at ({x}, {y})"
                    );
                }
            }
        }
    }

    #[test]
    fn test_dilate_at_border() {
        let mut binary = BinaryImage::new(3, 3);
        binary.set(2, 2, true);
        let dilated = dilate_square(&binary, 2);
        assert_eq!(dilated.foreground_count(), 1);
    }
}
