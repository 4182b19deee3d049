//! Decoded images as plain pixel records.

use std::path::Path;

use crate::AssetError;

/// A decoded image: RGBA8 pixels in row-major order.
#[derive(Clone, Debug)]
pub struct Image {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Image {
    /// Decode an image file (PNG, BMP, and whatever else the decoder
    /// understands) into an RGBA8 record.
    ///
    /// # Errors
    ///
    /// I/O failure or an undecodable file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        log::info!("loading image: {}", path.display());

        let decoded = ::image::open(path)?.to_rgba8();
        let (width, height) = decoded.dimensions();

        Ok(Self {
            width,
            height,
            data: decoded.into_raw(),
        })
    }

    /// Decode an in-memory encoded image.
    ///
    /// # Errors
    ///
    /// When the bytes are not a decodable image.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let decoded = ::image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = decoded.dimensions();

        Ok(Self {
            width,
            height,
            data: decoded.into_raw(),
        })
    }

    /// Build an image from raw RGBA8 pixels.
    ///
    /// # Panics
    ///
    /// When `data` is not exactly `width * height * 4` bytes.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            (width * height * 4) as usize,
            "pixel buffer does not match dimensions"
        );
        Self {
            width,
            height,
            data,
        }
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 pixel bytes, row-major.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The RGBA bytes of the pixel at (x, y), if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ::image::RgbaImage::from_pixel(width, height, ::image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ::image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn decode_round_trips_dimensions() {
        let img = Image::from_bytes(&png_bytes(7, 3)).unwrap();
        assert_eq!((img.width(), img.height()), (7, 3));
        assert_eq!(img.data().len(), 7 * 3 * 4);
        assert_eq!(img.pixel(0, 0), Some([10, 20, 30, 255]));
        assert_eq!(img.pixel(7, 0), None);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            Image::from_bytes(b"definitely not an image"),
            Err(AssetError::Image(_))
        ));
    }

    #[test]
    #[should_panic(expected = "pixel buffer does not match dimensions")]
    fn from_rgba_checks_length() {
        let _ = Image::from_rgba(2, 2, vec![0; 3]);
    }
}
