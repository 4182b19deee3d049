//! Font faces and CPU text rasterization.
//!
//! A [`FontFace`] wraps a parsed font. [`FontFace::rasterize`] lays a text
//! run out along the baseline and produces a tinted RGBA [`TextBitmap`]
//! that drivers blit (CPU) or upload as a texture (GPU).

use std::path::Path;

use fontdue::{Font, FontSettings, LineMetrics};

use edo_core::Color;

use crate::AssetError;

/// A rasterized text run: RGBA8 pixels, row-major.
#[derive(Clone, Debug)]
pub struct TextBitmap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// A parsed font face.
pub struct FontFace {
    font: Font,
}

impl FontFace {
    /// Load and parse a TTF/OTF font file.
    ///
    /// # Errors
    ///
    /// I/O failure or an unparsable font.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        log::info!("loading font: {}", path.display());

        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Parse a font from raw bytes.
    ///
    /// # Errors
    ///
    /// When the bytes are not a parsable font.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(AssetError::Font)?;
        Ok(Self { font })
    }

    /// Vertical line metrics at the given pixel size, with a fallback for
    /// fonts that lack horizontal metrics.
    fn line_metrics(&self, px: f32) -> LineMetrics {
        self.font
            .horizontal_line_metrics(px)
            .unwrap_or(LineMetrics {
                ascent: px * 0.8,
                descent: -(px * 0.2),
                line_gap: 0.0,
                new_line_size: px,
            })
    }

    /// Measured size in pixels of `text` rasterized at `px`.
    pub fn measure(&self, text: &str, px: f32) -> (u32, u32) {
        let line = self.line_metrics(px);
        let height = ((line.ascent - line.descent).ceil() as u32).max(1);

        let advance: f32 = text
            .chars()
            .map(|ch| self.font.metrics(ch, px).advance_width)
            .sum();
        let width = (advance.ceil() as u32).max(1);

        (width, height)
    }

    /// Rasterize a single line of text at `px` pixels, tinted with `color`.
    ///
    /// Glyphs are placed along the baseline using their `xmin`/`ymin`
    /// offsets; coverage becomes the alpha channel scaled by the tint's
    /// alpha.
    pub fn rasterize(&self, text: &str, px: f32, color: Color) -> TextBitmap {
        let line = self.line_metrics(px);
        let ascent = line.ascent.ceil() as i32;
        let (width, height) = self.measure(text, px);
        let (w, h) = (width as usize, height as usize);

        let mut data = vec![0u8; w * h * 4];
        let mut pen = 0.0f32;

        for ch in text.chars() {
            let (metrics, bitmap) = self.font.rasterize(ch, px);
            let x0 = pen.round() as i32 + metrics.xmin;
            let y0 = ascent - metrics.ymin - metrics.height as i32;

            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let coverage = bitmap[gy * metrics.width + gx];
                    if coverage == 0 {
                        continue;
                    }
                    let x = x0 + gx as i32;
                    let y = y0 + gy as i32;
                    if x < 0 || y < 0 || x >= w as i32 || y >= h as i32 {
                        continue;
                    }

                    let i = ((y as usize) * w + x as usize) * 4;
                    let alpha = (coverage as u16 * color.a() as u16 / 255) as u8;
                    data[i] = color.r();
                    data[i + 1] = color.g();
                    data[i + 2] = color.b();
                    // Glyph boxes may overlap by a pixel; keep the stronger
                    // coverage.
                    data[i + 3] = data[i + 3].max(alpha);
                }
            }

            pen += metrics.advance_width;
        }

        TextBitmap {
            width,
            height,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_fail_to_parse() {
        assert!(matches!(
            FontFace::from_bytes(b"definitely not a font"),
            Err(AssetError::Font(_))
        ));
    }
}
