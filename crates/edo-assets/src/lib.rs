//! **edo-assets** — resource loading for the *edo* workspace.
//!
//! Resources are plain data records: [`Image`] holds decoded RGBA8 pixels,
//! [`FontFace`] a parsed font able to rasterize text runs. Uploading to a
//! render device is a separate, explicit step performed by the drivers.
//! Everything is loaded once at startup and owned exclusively by the
//! [`Assets`] store; there is no cache, no sharing and no fallback asset.

pub mod font;
pub mod image;
pub mod store;

pub use self::image::Image;
pub use font::{FontFace, TextBitmap};
pub use store::Assets;

use thiserror::Error;

/// Error produced when loading a resource from disk.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image decode error: {0}")]
    Image(#[from] ::image::ImageError),
    #[error("font parse error: {0}")]
    Font(&'static str),
}
