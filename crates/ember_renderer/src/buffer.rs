//! Pixel storage.
//!
//! [`PixelBuffer`] is the shared buffer workers write into while a render is
//! in flight. Each channel is an `f32` stored in an `AtomicU32`, so observers
//! can read any pixel at any time without locking. Tiles never overlap, so
//! every pixel has exactly one writer.

use crate::Color;
use std::sync::atomic::{AtomicU32, Ordering};

/// Shared, lock-free RGB buffer filled progressively by the workers.
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: Vec<AtomicU32>,
}

impl PixelBuffer {
    /// Create a new buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize * 3;
        let channels = (0..len).map(|_| AtomicU32::new(0.0f32.to_bits())).collect();
        Self {
            width,
            height,
            channels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        (y as usize * self.width as usize + x as usize) * 3
    }

    /// Get the pixel at (x, y). Row 0 is the top of the image.
    pub fn get(&self, x: u32, y: u32) -> Color {
        let i = self.offset(x, y);
        Color::new(
            f32::from_bits(self.channels[i].load(Ordering::Relaxed)),
            f32::from_bits(self.channels[i + 1].load(Ordering::Relaxed)),
            f32::from_bits(self.channels[i + 2].load(Ordering::Relaxed)),
        )
    }

    /// Set the pixel at (x, y).
    ///
    /// Callers must own the pixel through their tile.
    pub fn set(&self, x: u32, y: u32, color: Color) {
        let i = self.offset(x, y);
        self.channels[i].store(color.x.to_bits(), Ordering::Relaxed);
        self.channels[i + 1].store(color.y.to_bits(), Ordering::Relaxed);
        self.channels[i + 2].store(color.z.to_bits(), Ordering::Relaxed);
    }

    /// Copy the current contents. Not a consistent snapshot while workers run.
    pub fn snapshot(&self) -> ImageBuffer {
        let mut image = ImageBuffer::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                image.set(x, y, self.get(x, y));
            }
        }
        image
    }
}

/// Convert an already gamma-encoded color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let quantize = |c: f32| (255.99 * c.clamp(0.0, 1.0)) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z), 255]
}

/// Owned copy of a render's pixels, gamma-encoded and clamped to `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// All black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Average of every channel of every pixel.
    pub fn mean(&self) -> f32 {
        if self.pixels.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.pixels.iter().map(|c| c.x + c.y + c.z).sum();
        sum / (self.pixels.len() * 3) as f32
    }

    /// Convert to RGBA bytes, rows top to bottom.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color));
        }
        bytes
    }
}
