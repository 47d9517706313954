// src/color.rs

//! RGB color type with hex parsing, darkening, and the blend operations the
//! raster surface composites with.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A packed 8-bit-per-channel RGB color.
///
/// Serializes as a `#rrggbb` hex string so theme and config files stay
/// readable and match the persisted key-value format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);
    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);

    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rgb` or `#rrggbb` (leading `#` optional, case-insensitive).
    ///
    /// # Returns
    /// `None` if the string is not a valid hex color.
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix('#').unwrap_or(s);
        let expanded;
        let hex = match s.len() {
            3 => {
                let mut buf = String::with_capacity(6);
                for ch in s.chars() {
                    buf.push(ch);
                    buf.push(ch);
                }
                expanded = buf;
                expanded.as_str()
            }
            6 => s,
            _ => return None,
        };
        let num = u32::from_str_radix(hex, 16).ok()?;
        Some(Self::new(
            ((num >> 16) & 0xff) as u8,
            ((num >> 8) & 0xff) as u8,
            (num & 0xff) as u8,
        ))
    }

    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Scales each channel to `floor(channel * (1 - factor))`.
    ///
    /// A factor of 0.85 leaves 15% of the original brightness; it is the
    /// shade applied to twin-prime pixels.
    #[must_use]
    pub fn darken(self, factor: f64) -> Self {
        let scale = |c: u8| ((f64::from(c)) * (1.0 - factor)).floor() as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }

    /// Alpha-composites `src` over `self` with coverage `alpha` in `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn blend_over(self, src: Rgb, alpha: f64) -> Self {
        let a = alpha.clamp(0.0, 1.0);
        let mix = |d: u8, s: u8| (f64::from(d) * (1.0 - a) + f64::from(s) * a).round() as u8;
        Self::new(mix(self.r, src.r), mix(self.g, src.g), mix(self.b, src.b))
    }

    /// Multiply blend: `dst * src / 255` per channel. Used by the shaded
    /// overlay faces so the spiral stays visible underneath.
    #[inline]
    #[must_use]
    pub fn multiply(self, src: Rgb) -> Self {
        let mul = |d: u8, s: u8| ((u16::from(d) * u16::from(s)) / 255) as u8;
        Self::new(mul(self.r, src.r), mul(self.g, src.g), mul(self.b, src.b))
    }

    /// Linear interpolation between two colors, `t` in `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn lerp(self, other: Rgb, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Self::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }
}

/// Module-level aliases for the two extremes, for call sites that use
/// them as plain named colors.
pub const WHITE: Rgb = Rgb::WHITE;
pub const BLACK: Rgb = Rgb::BLACK;

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgb::from_hex(&s).ok_or_else(|| D::Error::custom(format!("invalid hex color: {s:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_six_digit_hex() {
        assert_eq!(Rgb::from_hex("#ec646f"), Some(Rgb::new(0xec, 0x64, 0x6f)));
        assert_eq!(Rgb::from_hex("444444"), Some(Rgb::new(0x44, 0x44, 0x44)));
    }

    #[test]
    fn expands_three_digit_hex() {
        assert_eq!(Rgb::from_hex("#abc"), Some(Rgb::new(0xaa, 0xbb, 0xcc)));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert_eq!(Rgb::from_hex("#12345"), None);
        assert_eq!(Rgb::from_hex("#gggggg"), None);
        assert_eq!(Rgb::from_hex(""), None);
    }

    #[test]
    fn hex_round_trip() {
        let c = Rgb::new(0x6a, 0x9a, 0xca);
        assert_eq!(Rgb::from_hex(&c.to_hex()), Some(c));
    }

    #[test]
    fn darken_floors_channels() {
        // 0x44 = 68; 68 * 0.15 = 10.2 -> 10 = 0x0a
        let twin = Rgb::from_hex("#444444").unwrap().darken(0.85);
        assert_eq!(twin.to_hex(), "#0a0a0a");
    }

    #[test]
    fn blend_endpoints() {
        let d = Rgb::new(10, 20, 30);
        let s = Rgb::new(200, 100, 50);
        assert_eq!(d.blend_over(s, 0.0), d);
        assert_eq!(d.blend_over(s, 1.0), s);
    }

    #[test]
    fn multiply_white_is_identity() {
        let c = Rgb::new(12, 99, 200);
        assert_eq!(c.multiply(Rgb::WHITE), c);
        assert_eq!(c.multiply(Rgb::BLACK), Rgb::BLACK);
    }

    #[test]
    fn serde_as_hex_string() {
        let c = Rgb::new(0x92, 0xda, 0x9f);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"#92da9f\"");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
