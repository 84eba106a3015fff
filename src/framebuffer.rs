//! The finished color buffer and its hand-off to image files.

use std::path::Path;

use thiserror::Error;

use crate::color::Rgb;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
}

/// A width x height grid of RGB samples, bottom-left origin. Channels
/// are normalized to [0, 1] and clamp-rounded to 8 bits at save time.
#[derive(Debug, Clone)]
pub struct ColorBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl ColorBuffer {
    pub fn filled(width: usize, height: usize, color: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        self.pixels[y * self.width + x]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Rgb) {
        self.pixels[y * self.width + x] = color;
    }

    /// Writes the buffer to `path`; the format follows the extension
    /// (png, jpg, bmp). Rows are flipped for the top-left origin of
    /// image files.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SaveError> {
        let mut img = image::RgbImage::new(self.width as u32, self.height as u32);
        for (x, y, out) in img.enumerate_pixels_mut() {
            let src = self.pixel(x as usize, self.height - 1 - y as usize);
            *out = image::Rgb(src.to_bytes());
        }
        img.save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_and_set() {
        let mut buffer = ColorBuffer::filled(3, 2, Rgb::BLACK);
        buffer.set_pixel(2, 1, Rgb::WHITE);
        assert_eq!(buffer.pixel(0, 0), Rgb::BLACK);
        assert_eq!(buffer.pixel(2, 1), Rgb::WHITE);
        assert_eq!(buffer.width(), 3);
        assert_eq!(buffer.height(), 2);
    }
}
