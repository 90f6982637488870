//! 2D textures for material sampling.

use std::path::Path;

use crate::math::{Color, Vec2};

/// An immutable RGBA8 texture sampled with clamped nearest-neighbor
/// filtering.
///
/// Pixels are stored tightly packed in row-major order, four bytes per
/// texel, no mipmaps. The software path always point-samples; the filter
/// mode setting only concerns a hardware backend.
pub struct Texture {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Texture {
    /// Load a texture from an image file (PNG, JPG, etc.)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, image::ImageError> {
        Ok(Self::from_image(image::open(path)?.to_rgba8()))
    }

    /// Wrap an already-decoded RGBA8 image.
    pub fn from_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            data: img.into_raw(),
            width,
            height,
        }
    }

    /// Build a texture from raw RGBA8 bytes.
    ///
    /// # Panics
    /// Panics if `data.len() != width * height * 4`.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            (width * height * 4) as usize,
            "pixel data does not match dimensions"
        );
        Self {
            data,
            width,
            height,
        }
    }

    /// Sample the texture at normalized UV coordinates.
    ///
    /// UVs are clamped to [0, 1] — never wrapped — and the resulting texel
    /// index is clamped to the last row/column so uv = 1.0 stays in
    /// bounds. Bytes are scaled by 1/255 into linear floats; no sRGB
    /// decode.
    #[inline]
    pub fn sample(&self, uv: Vec2) -> Color {
        let col = ((uv.x.clamp(0.0, 1.0) * self.width as f32) as u32).min(self.width - 1);
        let row = ((uv.y.clamp(0.0, 1.0) * self.height as f32) as u32).min(self.height - 1);

        let idx = ((row * self.width + col) * 4) as usize;
        Color::rgba(
            self.data[idx] as f32 / 255.0,
            self.data[idx + 1] as f32 / 255.0,
            self.data[idx + 2] as f32 / 255.0,
            self.data[idx + 3] as f32 / 255.0,
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// 2x2 texture: red, green / blue, white.
    fn checker() -> Texture {
        #[rustfmt::skip]
        let data = vec![
            255, 0, 0, 255,   0, 255, 0, 255,
            0, 0, 255, 255,   255, 255, 255, 128,
        ];
        Texture::from_rgba8(2, 2, data)
    }

    #[test]
    fn samples_expected_texel() {
        let tex = checker();
        let c = tex.sample(Vec2::new(0.0, 0.0));
        assert_relative_eq!(c.r, 1.0);
        assert_relative_eq!(c.g, 0.0);

        let c = tex.sample(Vec2::new(0.9, 0.9));
        assert_relative_eq!(c.r, 1.0);
        assert_relative_eq!(c.a, 128.0 / 255.0);
    }

    #[test]
    fn out_of_range_uv_clamps_to_edge_texel() {
        let tex = checker();
        // u beyond 1 lands on the last column, v below 0 on the first row
        let c = tex.sample(Vec2::new(1.5, -0.2));
        assert_relative_eq!(c.g, 1.0);
        assert_relative_eq!(c.r, 0.0);
    }

    #[test]
    fn uv_exactly_one_stays_in_bounds() {
        let tex = checker();
        let c = tex.sample(Vec2::ONE);
        assert_relative_eq!(c.a, 128.0 / 255.0);
    }
}
