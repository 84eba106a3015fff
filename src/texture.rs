//! Texture sampling: a 2-D grid of color samples with a bottom-left
//! origin, addressed by normalized UV with clamping.

use std::path::Path;

use crate::color::Rgb;
use crate::loader::LoadError;

#[derive(Debug, Clone)]
pub struct Texture {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Texture {
    /// `pixels` in row-major order starting at the bottom-left.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Rgb>) -> Self {
        assert_eq!(pixels.len(), width * height);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn solid(width: usize, height: usize, color: Rgb) -> Self {
        Self::from_pixels(width, height, vec![color; width * height])
    }

    /// Decodes an image file (PNG/JPEG/BMP), flipping rows into the
    /// bottom-left convention.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let img = image::open(path)?.to_rgb8();
        let (width, height) = (img.width() as usize, img.height() as usize);
        let mut pixels = vec![Rgb::BLACK; width * height];
        for (x, y, p) in img.enumerate_pixels() {
            pixels[(height - 1 - y as usize) * width + x as usize] =
                Rgb::from_bytes([p[0], p[1], p[2]]);
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
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

    /// Nearest sample at normalized UV, clamped to the last
    /// row/column; (0, 0) is the bottom-left corner.
    pub fn sample(&self, u: f64, v: f64) -> Rgb {
        let x = ((u * self.width as f64) as i64).clamp(0, self.width as i64 - 1);
        let y = ((v * self.height as f64) as i64).clamp(0, self.height as i64 - 1);
        self.pixel(x as usize, y as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> Texture {
        let mut pixels = Vec::new();
        for y in 0..4 {
            for x in 0..4 {
                pixels.push(Rgb::new(x as f64 / 3.0, y as f64 / 3.0, 0.0));
            }
        }
        Texture::from_pixels(4, 4, pixels)
    }

    #[test]
    fn test_sample_corners() {
        let t = gradient();
        assert_eq!(t.sample(0.0, 0.0), Rgb::new(0.0, 0.0, 0.0));
        assert_eq!(t.sample(0.99, 0.99), Rgb::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_sample_clamps_out_of_range_uv() {
        let t = gradient();
        assert_eq!(t.sample(-0.5, 0.0), t.sample(0.0, 0.0));
        assert_eq!(t.sample(1.5, 2.0), t.sample(0.99, 0.99));
    }
}
