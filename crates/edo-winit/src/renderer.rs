//! Composes a scene into a CPU pixel buffer.
//!
//! The frame buffer holds `0x00RRGGBB` pixels in softbuffer's format.
//! Images are blitted with nearest-neighbor scaling and alpha blending;
//! text runs are rasterized once per (text, size, colour) and memoized.

use std::collections::HashMap;

use edo_assets::{Assets, Image, TextBitmap};
use edo_core::{Color, DrawCmd, Point, Rect, Scene};

/// Memoization key for rasterized text runs.
#[derive(Clone, Hash, PartialEq, Eq)]
struct TextKey {
    text: String,
    /// Bit pattern of the pixel size (`f32` is not `Hash`).
    size: u32,
    color: Color,
}

pub(crate) struct FrameRenderer {
    assets: Assets,
    width: usize,
    height: usize,
    /// `0x00RRGGBB` pixel buffer, `width * height`.
    pixels: Vec<u32>,
    text_cache: HashMap<TextKey, TextBitmap>,
}

impl FrameRenderer {
    pub fn new(width: usize, height: usize, assets: Assets) -> Self {
        Self {
            assets,
            width,
            height,
            pixels: vec![0; width * height],
            text_cache: HashMap::new(),
        }
    }

    /// Clear the frame and draw every scene command in order.
    pub fn render_scene(&mut self, scene: &Scene) {
        self.pixels.fill(pack_color(scene.clear_color()));

        for cmd in scene.cmds() {
            match cmd {
                DrawCmd::Image { image, dst } => {
                    if let Some(img) = self.assets.image(*image) {
                        blit_image(&mut self.pixels, self.width, self.height, img, *dst);
                    } else {
                        log::debug!("image {image:?} not loaded, skipping draw");
                    }
                }
                DrawCmd::Text {
                    text,
                    pos,
                    size,
                    color,
                } => {
                    let Some(font) = self.assets.font() else {
                        log::debug!("no font loaded, skipping text draw");
                        continue;
                    };
                    let key = TextKey {
                        text: text.clone(),
                        size: size.to_bits(),
                        color: *color,
                    };
                    let bitmap = self
                        .text_cache
                        .entry(key)
                        .or_insert_with(|| font.rasterize(text, *size, *color));
                    blit_bitmap(&mut self.pixels, self.width, self.height, bitmap, *pos);
                }
            }
        }
    }

    /// Copy the frame into the window surface buffer, clearing any border
    /// when the surface is larger than the frame.
    pub fn blit_to_buffer(&self, buf: &mut [u32], buf_width: usize, buf_height: usize) {
        let copy_w = self.width.min(buf_width);
        let copy_h = self.height.min(buf_height);

        if buf_width > self.width || buf_height > self.height {
            buf.fill(0);
        }

        for y in 0..copy_h {
            let src_start = y * self.width;
            let dst_start = y * buf_width;
            buf[dst_start..dst_start + copy_w]
                .copy_from_slice(&self.pixels[src_start..src_start + copy_w]);
        }
    }

    #[cfg(test)]
    fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }
}

// ---------------------------------------------------------------------------
// Blitting
// ---------------------------------------------------------------------------

#[inline]
fn pack_color(c: Color) -> u32 {
    ((c.r() as u32) << 16) | ((c.g() as u32) << 8) | (c.b() as u32)
}

/// Alpha-blend an RGBA source pixel over a packed destination pixel.
#[inline]
fn blend(dst: &mut u32, r: u8, g: u8, b: u8, a: u8) {
    match a {
        0 => {}
        0xFF => *dst = ((r as u32) << 16) | ((g as u32) << 8) | (b as u32),
        a => {
            let (dr, dg, db) = ((*dst >> 16) & 0xFF, (*dst >> 8) & 0xFF, *dst & 0xFF);
            let a = a as u32;
            let inv = 255 - a;
            let r = (r as u32 * a + dr * inv) / 255;
            let g = (g as u32 * a + dg * inv) / 255;
            let b = (b as u32 * a + db * inv) / 255;
            *dst = (r << 16) | (g << 8) | b;
        }
    }
}

/// Blit `img` scaled into `dst`, clipped against the frame bounds.
fn blit_image(pixels: &mut [u32], width: usize, height: usize, img: &Image, dst: Rect) {
    if dst.is_empty() || img.width() == 0 || img.height() == 0 {
        return;
    }
    let clipped = dst.intersect(Rect::new(0, 0, width as i32, height as i32));

    for y in clipped.min.y..clipped.max.y {
        for x in clipped.min.x..clipped.max.x {
            // Nearest-neighbor source sample.
            let sx = ((x - dst.min.x) as i64 * img.width() as i64 / dst.width() as i64) as u32;
            let sy = ((y - dst.min.y) as i64 * img.height() as i64 / dst.height() as i64) as u32;
            if let Some([r, g, b, a]) = img.pixel(sx, sy) {
                blend(&mut pixels[y as usize * width + x as usize], r, g, b, a);
            }
        }
    }
}

/// Blit a rasterized text bitmap with its top-left corner at `pos`.
fn blit_bitmap(pixels: &mut [u32], width: usize, height: usize, bitmap: &TextBitmap, pos: Point) {
    for gy in 0..bitmap.height {
        for gx in 0..bitmap.width {
            let x = pos.x + gx as i32;
            let y = pos.y + gy as i32;
            if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
                continue;
            }
            let i = ((gy * bitmap.width + gx) * 4) as usize;
            blend(
                &mut pixels[y as usize * width + x as usize],
                bitmap.data[i],
                bitmap.data[i + 1],
                bitmap.data[i + 2],
                bitmap.data[i + 3],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edo_core::ImageId;

    fn solid_image(width: u32, height: u32, rgba: [u8; 4]) -> Image {
        let data = rgba
            .iter()
            .copied()
            .cycle()
            .take((width * height * 4) as usize)
            .collect();
        Image::from_rgba(width, height, data)
    }

    #[test]
    fn clear_fills_the_frame() {
        let mut renderer = FrameRenderer::new(4, 4, Assets::new());
        renderer.render_scene(&Scene::new(Color::from_rgb(0xF0, 0xF0, 0xF0)));
        assert_eq!(renderer.pixel(0, 0), 0x00F0F0F0);
        assert_eq!(renderer.pixel(3, 3), 0x00F0F0F0);
    }

    #[test]
    fn image_blits_at_destination() {
        let mut assets = Assets::new();
        let id = assets.insert_image(solid_image(2, 2, [0xFF, 0x00, 0x00, 0xFF]));
        let mut renderer = FrameRenderer::new(8, 8, assets);

        let mut scene = Scene::new(Color::BLACK);
        scene.draw_image(id, Rect::sized(Point::new(2, 3), 2, 2));
        renderer.render_scene(&scene);

        assert_eq!(renderer.pixel(2, 3), 0x00FF0000);
        assert_eq!(renderer.pixel(3, 4), 0x00FF0000);
        // Outside the destination rect the clear colour remains.
        assert_eq!(renderer.pixel(1, 3), 0x00000000);
        assert_eq!(renderer.pixel(4, 3), 0x00000000);
    }

    #[test]
    fn image_scales_to_destination() {
        let mut assets = Assets::new();
        let id = assets.insert_image(solid_image(1, 1, [0x00, 0xFF, 0x00, 0xFF]));
        let mut renderer = FrameRenderer::new(8, 8, assets);

        let mut scene = Scene::new(Color::BLACK);
        scene.draw_image(id, Rect::sized(Point::ZERO, 4, 4));
        renderer.render_scene(&scene);

        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(renderer.pixel(x, y), 0x0000FF00);
            }
        }
        assert_eq!(renderer.pixel(4, 4), 0);
    }

    #[test]
    fn off_screen_draws_are_clipped() {
        let mut assets = Assets::new();
        let id = assets.insert_image(solid_image(2, 2, [0xFF, 0xFF, 0xFF, 0xFF]));
        let mut renderer = FrameRenderer::new(4, 4, assets);

        let mut scene = Scene::new(Color::BLACK);
        scene.draw_image(id, Rect::sized(Point::new(-1, -1), 2, 2));
        scene.draw_image(id, Rect::sized(Point::new(100, 100), 2, 2));
        renderer.render_scene(&scene);

        assert_eq!(renderer.pixel(0, 0), 0x00FFFFFF);
        assert_eq!(renderer.pixel(1, 1), 0x00000000);
    }

    #[test]
    fn missing_resources_are_skipped() {
        let mut renderer = FrameRenderer::new(4, 4, Assets::new());
        let mut scene = Scene::new(Color::BLACK);
        scene.draw_image(ImageId(0), Rect::sized(Point::ZERO, 2, 2));
        scene.draw_text("edo", Point::ZERO, 12.0, Color::WHITE);
        renderer.render_scene(&scene);

        assert_eq!(renderer.pixel(0, 0), 0);
    }

    #[test]
    fn semi_transparent_blend() {
        let mut assets = Assets::new();
        let id = assets.insert_image(solid_image(1, 1, [0xFF, 0xFF, 0xFF, 0x80]));
        let mut renderer = FrameRenderer::new(2, 2, assets);

        let mut scene = Scene::new(Color::BLACK);
        scene.draw_image(id, Rect::sized(Point::ZERO, 1, 1));
        renderer.render_scene(&scene);

        let px = renderer.pixel(0, 0);
        // Half white over black lands mid-gray on every channel.
        assert_eq!((px >> 16) & 0xFF, 0x80);
        assert_eq!((px >> 8) & 0xFF, 0x80);
        assert_eq!(px & 0xFF, 0x80);
    }

    #[test]
    fn blit_to_larger_buffer_clears_border() {
        let mut renderer = FrameRenderer::new(2, 2, Assets::new());
        renderer.render_scene(&Scene::new(Color::WHITE));

        let mut buf = vec![0xDEADBEEF_u32; 3 * 3];
        renderer.blit_to_buffer(&mut buf, 3, 3);

        assert_eq!(buf[0], 0x00FFFFFF);
        assert_eq!(buf[1 * 3 + 1], 0x00FFFFFF);
        assert_eq!(buf[2 * 3 + 2], 0);
    }
}
