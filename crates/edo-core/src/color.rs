//! Colors: the packed [`Color`] type and the hex-string parser.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// An RGBA colour packed into a `u32` (0xRRGGBBAA).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Self = Self::from_rgb(0x00, 0x00, 0x00);
    pub const WHITE: Self = Self::from_rgb(0xFF, 0xFF, 0xFF);

    /// Construct from individual RGB components, fully opaque.
    #[inline]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba(r, g, b, 0xFF)
    }

    /// Construct from individual RGBA components.
    #[inline]
    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | (a as u32))
    }

    /// Red component.
    #[inline]
    pub const fn r(self) -> u8 {
        ((self.0 >> 24) & 0xFF) as u8
    }

    /// Green component.
    #[inline]
    pub const fn g(self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    /// Blue component.
    #[inline]
    pub const fn b(self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    /// Alpha component (0xFF = opaque).
    #[inline]
    pub const fn a(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// Parse a `"RRGGBB"` or `"RRGGBBAA"` hex string into a colour.
    ///
    /// Each channel is the value of its own two-hex-digit group; alpha
    /// defaults to `0xFF` when only six digits are given. Hex digits may be
    /// upper or lower case and a leading `#` is accepted.
    pub fn from_hex(s: &str) -> Result<Self, ParseColorError> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if digits.len() != 6 && digits.len() != 8 {
            return Err(ParseColorError::Length(digits.len()));
        }
        if !digits.is_ascii() {
            return Err(ParseColorError::Digit(digits.to_owned()));
        }

        let channel = |group: &str| {
            u8::from_str_radix(group, 16).map_err(|_| ParseColorError::Digit(group.to_owned()))
        };

        let r = channel(&digits[0..2])?;
        let g = channel(&digits[2..4])?;
        let b = channel(&digits[4..6])?;
        let a = if digits.len() == 8 {
            channel(&digits[6..8])?
        } else {
            0xFF
        };

        Ok(Self::from_rgba(r, g, b, a))
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ParseColorError
// ---------------------------------------------------------------------------

/// Error produced by [`Color::from_hex`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseColorError {
    /// The string was neither 6 nor 8 hex digits long.
    #[error("expected 6 or 8 hex digits, got {0}")]
    Length(usize),
    /// A channel group contained a non-hex character.
    #[error("invalid hex digit group {0:?}")]
    Digit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba_round_trip() {
        let c = Color::from_rgba(0xAB, 0xCD, 0xEF, 0x7F);
        assert_eq!(c.r(), 0xAB);
        assert_eq!(c.g(), 0xCD);
        assert_eq!(c.b(), 0xEF);
        assert_eq!(c.a(), 0x7F);
    }

    #[test]
    fn hex_six_digits_maps_each_group() {
        // Each channel must equal its own two-digit group.
        let c = Color::from_hex("1A2B3C").unwrap();
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (0x1A, 0x2B, 0x3C, 0xFF));

        let c = Color::from_hex("0000FF").unwrap();
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (0x00, 0x00, 0xFF, 0xFF));
    }

    #[test]
    fn hex_eight_digits_sets_alpha() {
        let c = Color::from_hex("1A2B3C80").unwrap();
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (0x1A, 0x2B, 0x3C, 0x80));
    }

    #[test]
    fn hex_case_and_prefix() {
        assert_eq!(
            Color::from_hex("#f0f0f0").unwrap(),
            Color::from_rgb(0xF0, 0xF0, 0xF0)
        );
        assert_eq!(Color::from_hex("aBcDeF").unwrap(), "ABCDEF".parse().unwrap());
    }

    #[test]
    fn hex_rejects_bad_input() {
        assert_eq!(Color::from_hex("12345"), Err(ParseColorError::Length(5)));
        assert_eq!(Color::from_hex("1234567"), Err(ParseColorError::Length(7)));
        assert!(matches!(
            Color::from_hex("GG0000"),
            Err(ParseColorError::Digit(_))
        ));
        // Multi-byte characters must error, not panic on a slice boundary.
        assert!(matches!(
            Color::from_hex("ééé"),
            Err(ParseColorError::Digit(_))
        ));
    }
}
