//! The [`Assets`] store handed to a driver at startup.

use std::path::Path;

use edo_core::ImageId;

use crate::font::FontFace;
use crate::image::Image;
use crate::AssetError;

/// All resources the game loaded at startup.
///
/// The store is moved into the driver configuration; after that the driver
/// owns every resource exclusively until the process exits.
#[derive(Default)]
pub struct Assets {
    images: Vec<Image>,
    font: Option<FontFace>,
}

impl Assets {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a decoded image, returning its handle.
    pub fn insert_image(&mut self, image: Image) -> ImageId {
        let id = ImageId(self.images.len());
        self.images.push(image);
        id
    }

    /// Load an image file and register it.
    ///
    /// # Errors
    ///
    /// See [`Image::load`].
    pub fn load_image(&mut self, path: impl AsRef<Path>) -> Result<ImageId, AssetError> {
        Ok(self.insert_image(Image::load(path)?))
    }

    /// Look up a registered image.
    #[inline]
    pub fn image(&self, id: ImageId) -> Option<&Image> {
        self.images.get(id.0)
    }

    /// All registered images, in handle order.
    #[inline]
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Set the font used for text commands.
    pub fn set_font(&mut self, font: FontFace) {
        self.font = Some(font);
    }

    /// Load a font file and set it.
    ///
    /// # Errors
    ///
    /// See [`FontFace::load`].
    pub fn load_font(&mut self, path: impl AsRef<Path>) -> Result<(), AssetError> {
        self.set_font(FontFace::load(path)?);
        Ok(())
    }

    /// The font, when one was loaded. Text commands are skipped without it.
    #[inline]
    pub fn font(&self) -> Option<&FontFace> {
        self.font.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_handles_round_trip() {
        let mut assets = Assets::new();
        let a = assets.insert_image(Image::from_rgba(1, 1, vec![1, 2, 3, 4]));
        let b = assets.insert_image(Image::from_rgba(2, 1, vec![0; 8]));

        assert_ne!(a, b);
        assert_eq!(assets.image(a).unwrap().width(), 1);
        assert_eq!(assets.image(b).unwrap().width(), 2);
        assert!(assets.image(ImageId(99)).is_none());
    }

    #[test]
    fn font_is_optional() {
        let assets = Assets::new();
        assert!(assets.font().is_none());
    }
}
