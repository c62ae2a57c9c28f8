// ABOUTME: Normalizes hex and channel-triple color literals to RGB and back to hex
// ABOUTME: Provides linear per-channel mixing used to derive missing shades

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?(?:\d+\.?\d*|\.\d+)").expect("valid regex"));

/// An opaque sRGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a color literal.
    ///
    /// Accepts `#rgb`/`#rrggbb` (marker optional), `rgb(r, g, b)` style calls
    /// with comma or space separators, bare `r g b` triples with an optional
    /// `/ alpha` suffix, and as a last resort any text carrying at least three
    /// numbers. Alpha is ignored. Returns `None` when no triple can be found.
    pub fn parse(literal: &str) -> Option<Self> {
        let literal = literal.trim();
        if literal.is_empty() {
            return None;
        }
        Self::from_hex(literal).or_else(|| Self::from_channels(literal))
    }

    fn from_hex(literal: &str) -> Option<Self> {
        let digits = literal.strip_prefix('#').unwrap_or(literal);
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        let expanded = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 => digits.to_string(),
            _ => return None,
        };

        let r = u8::from_str_radix(&expanded[0..2], 16).ok()?;
        let g = u8::from_str_radix(&expanded[2..4], 16).ok()?;
        let b = u8::from_str_radix(&expanded[4..6], 16).ok()?;
        Some(Self::new(r, g, b))
    }

    fn from_channels(literal: &str) -> Option<Self> {
        // Anything after a slash is an alpha segment
        let channels = literal.split('/').next().unwrap_or(literal);

        let mut numbers = NUMBER
            .find_iter(channels)
            .filter_map(|m| m.as_str().parse::<f64>().ok());
        let r = numbers.next()?;
        let g = numbers.next()?;
        let b = numbers.next()?;
        Some(Self::new(channel(r), channel(g), channel(b)))
    }

    /// Mix toward `other`; `weight` is the percentage (0-100) of `other`.
    pub fn mix(self, other: Rgb, weight: f64) -> Rgb {
        let w = (weight / 100.0).clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| channel(f64::from(a) * (1.0 - w) + f64::from(b) * w);
        Rgb::new(
            lerp(self.r, other.r),
            lerp(self.g, other.g),
            lerp(self.b, other.b),
        )
    }

    /// Lowercase six-digit hex with leading `#`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Sum of channels, a crude brightness measure used for ordering shades.
    pub fn channel_sum(self) -> u16 {
        u16::from(self.r) + u16::from(self.g) + u16::from(self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn channel(value: f64) -> u8 {
    // Bounded by the clamp, so the cast cannot truncate
    value.round().clamp(0.0, 255.0) as u8
}

/// Mix two color literals and format the result as hex.
///
/// `None` when either side does not parse.
pub fn mix_colors(base: &str, other: &str, weight: f64) -> Option<String> {
    let base = Rgb::parse(base)?;
    let other = Rgb::parse(other)?;
    Some(base.mix(other, weight).to_hex())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(Rgb::parse("#ff0000"), Some(Rgb::new(255, 0, 0)));
        assert_eq!(Rgb::parse("00FF7f"), Some(Rgb::new(0, 255, 127)));
        assert_eq!(Rgb::parse("#abc"), Some(Rgb::new(0xaa, 0xbb, 0xcc)));
        assert_eq!(Rgb::parse("fff"), Some(Rgb::WHITE));
    }

    #[test]
    fn test_parse_function_forms() {
        assert_eq!(Rgb::parse("rgb(37, 99, 235)"), Some(Rgb::new(37, 99, 235)));
        assert_eq!(Rgb::parse("rgb(37 99 235)"), Some(Rgb::new(37, 99, 235)));
        assert_eq!(
            Rgb::parse("rgba(10, 20, 30, 0.5)"),
            Some(Rgb::new(10, 20, 30))
        );
    }

    #[test]
    fn test_parse_bare_triples() {
        assert_eq!(Rgb::parse("37 99 235"), Some(Rgb::new(37, 99, 235)));
        assert_eq!(Rgb::parse("37 99 235 / 0.25"), Some(Rgb::new(37, 99, 235)));
        assert_eq!(Rgb::parse("12.4 12.6 300"), Some(Rgb::new(12, 13, 255)));
    }

    #[test]
    fn test_parse_fallback_extraction() {
        assert_eq!(
            Rgb::parse("color(srgb-ish 1 2 3 extra)"),
            Some(Rgb::new(1, 2, 3))
        );
    }

    #[test]
    fn test_parse_failures() {
        assert_eq!(Rgb::parse(""), None);
        assert_eq!(Rgb::parse("transparent"), None);
        assert_eq!(Rgb::parse("currentColor"), None);
        assert_eq!(Rgb::parse("#ff00"), None);
        assert_eq!(Rgb::parse("var(--color-missing)"), None);
        assert_eq!(Rgb::parse("rgb(1, 2)"), None);
    }

    #[test]
    fn test_mix_endpoints() {
        let red = Rgb::new(255, 0, 0);
        assert_eq!(red.mix(Rgb::WHITE, 0.0), red);
        assert_eq!(red.mix(Rgb::WHITE, 100.0), Rgb::WHITE);
        assert_eq!(red.mix(Rgb::BLACK, 50.0), Rgb::new(128, 0, 0));
        assert_eq!(red.mix(Rgb::WHITE, 90.0), Rgb::new(255, 230, 230));
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(Rgb::new(255, 0, 10).to_hex(), "#ff000a");
        assert_eq!(Rgb::new(1, 2, 3).to_string(), "#010203");
    }

    #[test]
    fn test_mix_colors_strings() {
        assert_eq!(
            mix_colors("#ff0000", "#000000", 80.0).as_deref(),
            Some("#330000")
        );
        assert_eq!(mix_colors("transparent", "#000", 50.0), None);
    }
}
