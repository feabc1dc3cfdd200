use crate::draw::model::Color;

/// Tightly packed RGBA8 pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RgbaBuffer {
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        let len = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        let mut buffer = Self {
            width,
            height,
            pixels: vec![0u8; len],
        };
        buffer.fill(fill);
        buffer
    }

    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        assert_eq!(pixels.len(), (width as usize) * (height as usize) * 4);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn fill(&mut self, color: Color) {
        let rgba = color.to_array();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Returns `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize * self.width as usize) + x as usize) * 4;
        Some(Color::rgba(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ))
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = ((y as usize * self.width as usize) + x as usize) * 4;
        self.pixels[idx..idx + 4].copy_from_slice(&color.to_array());
    }

    pub fn is_uniform(&self, color: Color) -> bool {
        let rgba = color.to_array();
        self.pixels.chunks_exact(4).all(|px| px == rgba)
    }

    pub fn count_pixels(&self, color: Color) -> usize {
        let rgba = color.to_array();
        self.pixels
            .chunks_exact(4)
            .filter(|px| *px == rgba)
            .count()
    }
}
