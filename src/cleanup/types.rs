//! Common types for the cleanup module

use image::{GrayImage, Luma};
use thiserror::Error;

/// Foreground (ink) sample value
pub const FOREGROUND: u8 = 255;

/// Background sample value
pub const BACKGROUND: u8 = 0;

/// Cleanup error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CleanupError {
    #[error("Image is not two-level: found sample value {value} at ({x}, {y})")]
    NotBinary { value: u8, x: u32, y: u32 },

    #[error("Dimension mismatch: {left:?} vs {right:?}")]
    DimensionMismatch { left: (u32, u32), right: (u32, u32) },
}

pub type Result<T> = std::result::Result<T, CleanupError>;

/// Two-level image whose samples are exactly [`FOREGROUND`] or [`BACKGROUND`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryImage(GrayImage);

impl BinaryImage {
    /// All-background image
    pub fn new(width: u32, height: u32) -> Self {
        Self(GrayImage::from_pixel(width, height, Luma([BACKGROUND])))
    }

    /// Build from a predicate returning `true` for foreground pixels
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        Self(GrayImage::from_fn(width, height, |x, y| {
            Luma([if f(x, y) { FOREGROUND } else { BACKGROUND }])
        }))
    }

    /// Wrap a grayscale image, checking that it is two-level
    pub fn from_gray(gray: GrayImage) -> Result<Self> {
        if let Some((x, y, p)) = gray
            .enumerate_pixels()
            .find(|(_, _, p)| p.0[0] != FOREGROUND && p.0[0] != BACKGROUND)
        {
            return Err(CleanupError::NotBinary { value: p.0[0], x, y });
        }
        Ok(Self(gray))
    }

    /// Wrap an image the caller has already made two-level
    pub(crate) fn from_gray_unchecked(gray: GrayImage) -> Self {
        debug_assert!(gray
            .pixels()
            .all(|p| p.0[0] == FOREGROUND || p.0[0] == BACKGROUND));
        Self(gray)
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    /// Is the pixel at (x, y) foreground?
    #[inline]
    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.0.get_pixel(x, y).0[0] == FOREGROUND
    }

    /// Set the pixel at (x, y)
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, foreground: bool) {
        let value = if foreground { FOREGROUND } else { BACKGROUND };
        self.0.put_pixel(x, y, Luma([value]));
    }

    /// Number of foreground pixels
    pub fn foreground_count(&self) -> u64 {
        self.0.pixels().filter(|p| p.0[0] == FOREGROUND).count() as u64
    }

    /// Pixel-wise OR
    pub fn union(&self, other: &BinaryImage) -> Result<BinaryImage> {
        self.combine(other, |a, b| a.max(b))
    }

    /// Pixel-wise saturating subtraction (`self AND NOT other`)
    pub fn subtract(&self, other: &BinaryImage) -> Result<BinaryImage> {
        self.combine(other, u8::saturating_sub)
    }

    fn combine(&self, other: &BinaryImage, op: impl Fn(u8, u8) -> u8) -> Result<BinaryImage> {
        if self.dimensions() != other.dimensions() {
            return Err(CleanupError::DimensionMismatch {
                left: self.dimensions(),
                right: other.dimensions(),
            });
        }
        let mut out = self.0.clone();
        for (dst, src) in out.pixels_mut().zip(other.0.pixels()) {
            dst.0[0] = op(dst.0[0], src.0[0]);
        }
        Ok(Self(out))
    }

    /// Borrow the underlying grayscale image
    pub fn as_gray(&self) -> &GrayImage {
        &self.0
    }

    /// Consume and return the underlying grayscale image
    pub fn into_gray(self) -> GrayImage {
        self.0
    }
}

impl TryFrom<GrayImage> for BinaryImage {
    type Error = CleanupError;

    fn try_from(gray: GrayImage) -> Result<Self> {
        Self::from_gray(gray)
    }
}
