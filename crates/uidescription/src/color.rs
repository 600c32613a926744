//! 8-bit RGBA color values and the `#rrggbb[aa]` literal form used by the description format.

use core::fmt;

/// A color with 8-bit channels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Color {
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const GREY: Self = Self::new(127, 127, 127, 255);
    pub const RED: Self = Self::new(255, 0, 0, 255);
    pub const GREEN: Self = Self::new(0, 255, 0, 255);
    pub const BLUE: Self = Self::new(0, 0, 255, 255);
    pub const YELLOW: Self = Self::new(255, 255, 0, 255);
    pub const CYAN: Self = Self::new(0, 255, 255, 255);
    pub const MAGENTA: Self = Self::new(255, 0, 255, 255);
    pub const TRANSPARENT: Self = Self::new(255, 255, 255, 0);

    #[inline]
    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Parse a `#RRGGBB` (opaque) or `#RRGGBBAA` literal.
    ///
    /// Returns `None` for any other length, a missing `#`, or non-hex digits.
    #[inline]
    pub fn parse_hex(text: &str) -> Option<Self> {
        let digits = text.strip_prefix('#')?;
        if !digits.is_ascii() {
            return None;
        }
        let channel = |index: usize| -> Option<u8> {
            let pair = digits.get(index * 2..index * 2 + 2)?;
            u8::from_str_radix(pair, 16).ok()
        };
        match digits.len() {
            6 => Some(Self::new(channel(0)?, channel(1)?, channel(2)?, 255)),
            8 => Some(Self::new(
                channel(0)?,
                channel(1)?,
                channel(2)?,
                channel(3)?,
            )),
            _ => None,
        }
    }

    /// Canonical `#rrggbbaa` form, lowercase.
    #[inline]
    pub fn to_hex_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "#{:02x}{:02x}{:02x}{:02x}",
            self.red, self.green, self.blue, self.alpha
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn parses_both_literal_lengths() {
        assert_eq!(Color::parse_hex("#112233"), Some(Color::new(0x11, 0x22, 0x33, 255)));
        assert_eq!(
            Color::parse_hex("#FF8800FF"),
            Some(Color::new(0xff, 0x88, 0x00, 0xff))
        );
        assert_eq!(Color::parse_hex("112233"), None);
        assert_eq!(Color::parse_hex("#12345"), None);
        assert_eq!(Color::parse_hex("#gg0000"), None);
    }

    #[test]
    fn writes_lowercase_rgba() {
        assert_eq!(Color::new(255, 0, 171, 100).to_hex_string(), "#ff00ab64");
    }
}
