use std::fmt;

use crate::error::ColourError;

/// An RGBA colour. Channels are 0-255, alpha is 0-1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Colour {
    pub const WHITE: Colour = Colour::new(255, 255, 255, 1.0);

    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Colour { r, g, b, a }
    }

    /// Parse a `#rgb` or `#rrggbb` colour (the `#` is optional) with the given opacity.
    pub fn from_hex(hex: &str, opacity: f32) -> Result<Self, ColourError> {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(ColourError::OpacityOutOfRange(opacity));
        }

        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColourError::BadHex(hex.to_string()));
        }

        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return Err(ColourError::BadHex(hex.to_string())),
        };

        let channel = |i: usize| {
            u8::from_str_radix(&expanded[i..i + 2], 16)
                .map_err(|_| ColourError::BadHex(hex.to_string()))
        };

        Ok(Colour::new(channel(0)?, channel(2)?, channel(4)?, opacity))
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Colour { a, ..self }
    }
}

impl Default for Colour {
    fn default() -> Self {
        Colour::WHITE
    }
}

/// Renders the canonical `rgba(r, g, b, a)` form.
impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_six_digit_hex() {
        let colour = Colour::from_hex("#ff0000", 0.5).unwrap();
        assert_eq!(colour, Colour::new(255, 0, 0, 0.5));
    }

    #[test]
    fn parses_without_hash_and_mixed_case() {
        let colour = Colour::from_hex("1A2b3C", 1.0).unwrap();
        assert_eq!((colour.r, colour.g, colour.b), (0x1a, 0x2b, 0x3c));
    }

    #[test]
    fn expands_shorthand_by_doubling_digits() {
        let colour = Colour::from_hex("#f80", 1.0).unwrap();
        assert_eq!((colour.r, colour.g, colour.b), (0xff, 0x88, 0x00));
    }

    #[test]
    fn rejects_bad_hex() {
        for hex in ["", "#ff", "#ff00", "#ggg", "#12345z", "##fff", "#fffffff"] {
            assert!(
                matches!(Colour::from_hex(hex, 1.0), Err(ColourError::BadHex(_))),
                "{} should be rejected",
                hex
            );
        }
    }

    #[test]
    fn rejects_opacity_outside_unit_range() {
        assert_eq!(
            Colour::from_hex("#fff", 1.5),
            Err(ColourError::OpacityOutOfRange(1.5))
        );
        assert!(Colour::from_hex("#fff", -0.1).is_err());
        assert!(Colour::from_hex("#fff", 0.0).is_ok());
    }

    #[test]
    fn display_string() {
        let colour = Colour::new(10, 20, 30, 0.25);
        assert_eq!(colour.to_string(), "rgba(10, 20, 30, 0.25)");
    }
}
