use crate::app::layout::{Rect, Vec2};

pub type Rgba = [u8; 4];

/// CPU-side RGBA8 pixel buffer. All drawing is clipped; out-of-range writes are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; buffer_len(width, height)],
        }
    }

    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == buffer_len(width, height)).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![0; buffer_len(width, height)];
    }

    pub fn clear(&mut self, color: Rgba) {
        for pixel in self.pixels.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        let offset = self.offset(x as i32, y as i32)?;
        let mut color = [0; 4];
        color.copy_from_slice(&self.pixels[offset..offset + 4]);
        Some(color)
    }

    /// Source-over blend of `color` onto the pixel at (`x`, `y`).
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        let Some(offset) = self.offset(x, y) else {
            return;
        };
        let alpha = color[3] as u32;
        if alpha == 0 {
            return;
        }
        let dst = &mut self.pixels[offset..offset + 4];
        if alpha == 255 {
            dst.copy_from_slice(&color);
            return;
        }
        let inverse = 255 - alpha;
        for channel in 0..3 {
            dst[channel] =
                ((color[channel] as u32 * alpha + dst[channel] as u32 * inverse) / 255) as u8;
        }
        dst[3] = (alpha + dst[3] as u32 * inverse / 255).min(255) as u8;
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgba) {
        let start_x = x.max(0);
        let start_y = y.max(0);
        let end_x = x.saturating_add(width).min(self.width as i32);
        let end_y = y.saturating_add(height).min(self.height as i32);
        if end_x <= start_x || end_y <= start_y {
            return;
        }
        for py in start_y..end_y {
            for px in start_x..end_x {
                self.blend_pixel(px, py, color);
            }
        }
    }

    pub fn outline_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgba) {
        if width <= 1 || height <= 1 {
            return;
        }
        self.fill_rect(x, y, width, 1, color);
        self.fill_rect(x, y + height - 1, width, 1, color);
        self.fill_rect(x, y, 1, height, color);
        self.fill_rect(x + width - 1, y, 1, height, color);
    }

    pub fn fill(&mut self, rect: Rect, color: Rgba) {
        let (x, y, width, height) = snap(rect);
        self.fill_rect(x, y, width, height, color);
    }

    pub fn outline(&mut self, rect: Rect, color: Rgba) {
        let (x, y, width, height) = snap(rect);
        self.outline_rect(x, y, width, height, color);
    }

    /// Composites all of `source` with its top-left corner at (`x`, `y`).
    pub fn blit(&mut self, source: &Surface, x: i32, y: i32) {
        for sy in 0..source.height {
            for sx in 0..source.width {
                let offset = ((sy * source.width + sx) * 4) as usize;
                let mut color = [0; 4];
                color.copy_from_slice(&source.pixels[offset..offset + 4]);
                self.blend_pixel(x + sx as i32, y + sy as i32, color);
            }
        }
    }

    /// Nearest-neighbour scale of a region of an RGBA buffer into `dest`.
    pub fn blit_scaled(&mut self, source: &ImageRegion<'_>, dest: Rect) {
        let (dx, dy, dw, dh) = snap(dest);
        if dw <= 0 || dh <= 0 || source.width == 0 || source.height == 0 {
            return;
        }
        for py in 0..dh {
            let sy = source.y + (py as u32 * source.height) / dh as u32;
            for px in 0..dw {
                let sx = source.x + (px as u32 * source.width) / dw as u32;
                if let Some(color) = source.sample(sx, sy) {
                    self.blend_pixel(dx + px, dy + py, color);
                }
            }
        }
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        let pixel = (y as usize)
            .checked_mul(self.width as usize)?
            .checked_add(x as usize)?;
        let offset = pixel.checked_mul(4)?;
        (offset + 4 <= self.pixels.len()).then_some(offset)
    }
}

/// Borrowed rectangle of a decoded RGBA image.
#[derive(Debug, Clone, Copy)]
pub struct ImageRegion<'a> {
    pub pixels: &'a [u8],
    pub stride: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ImageRegion<'_> {
    fn sample(&self, x: u32, y: u32) -> Option<Rgba> {
        let offset = ((y as usize).checked_mul(self.stride as usize)? + x as usize) * 4;
        let bytes = self.pixels.get(offset..offset + 4)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

fn buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

fn snap(rect: Rect) -> (i32, i32, i32, i32) {
    (
        rect.x.round() as i32,
        rect.y.round() as i32,
        rect.width.round() as i32,
        rect.height.round() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_clips_to_surface() {
        let mut surface = Surface::new(4, 4);
        surface.fill_rect(-2, -2, 4, 4, [255, 0, 0, 255]);

        assert_eq!(surface.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(1, 1), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(2, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn tiny_surfaces_never_write_out_of_bounds() {
        for (width, height) in [(0, 0), (1, 0), (0, 1), (1, 1), (2, 3)] {
            let mut surface = Surface::new(width, height);
            surface.fill_rect(-10, -10, 40, 40, [1, 2, 3, 255]);
            surface.outline_rect(0, 0, 5, 5, [1, 2, 3, 255]);
            surface.blend_pixel(100, 100, [1, 2, 3, 255]);
        }
    }

    #[test]
    fn half_alpha_blends_toward_source() {
        let mut surface = Surface::new(1, 1);
        surface.clear([0, 0, 0, 255]);
        surface.blend_pixel(0, 0, [255, 255, 255, 128]);

        let [r, _, _, a] = surface.pixel(0, 0).expect("pixel");
        assert!((120..=135).contains(&r));
        assert_eq!(a, 255);
    }

    #[test]
    fn blit_offsets_source_pixels() {
        let mut source = Surface::new(1, 1);
        source.clear([9, 9, 9, 255]);
        let mut target = Surface::new(3, 3);

        target.blit(&source, 2, 1);

        assert_eq!(target.pixel(2, 1), Some([9, 9, 9, 255]));
        assert_eq!(target.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn blit_scaled_samples_only_the_region() {
        let pixels = [
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 255, 255, 255, 255, 255, 255,
        ];
        let region = ImageRegion {
            pixels: &pixels,
            stride: 2,
            x: 1,
            y: 0,
            width: 1,
            height: 1,
        };
        let mut target = Surface::new(2, 2);

        target.blit_scaled(&region, Rect::new(0.0, 0.0, 2.0, 2.0));

        assert_eq!(target.pixel(1, 1), Some([0, 255, 0, 255]));
    }

    #[test]
    fn from_rgba_rejects_wrong_length() {
        assert!(Surface::from_rgba(2, 2, vec![0; 15]).is_none());
        assert!(Surface::from_rgba(2, 2, vec![0; 16]).is_some());
    }
}
