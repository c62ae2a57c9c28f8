// ABOUTME: Classification of metadata token keys into the roles they play in generation
// ABOUTME: Recognizes utility flags, color shades and defaults, single colors, variants and breakpoints

use std::fmt;

/// One of the eleven standardized lightness steps of a color family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShadeRung(u16);

impl ShadeRung {
    pub const ALL: [ShadeRung; 11] = [
        ShadeRung(50),
        ShadeRung(100),
        ShadeRung(200),
        ShadeRung(300),
        ShadeRung(400),
        ShadeRung(500),
        ShadeRung(600),
        ShadeRung(700),
        ShadeRung(800),
        ShadeRung(900),
        ShadeRung(950),
    ];

    pub const BASE: ShadeRung = ShadeRung(500);

    /// Recognize a one-to-three digit numeral from the allow-list.
    pub fn parse(numeral: &str) -> Option<Self> {
        if numeral.is_empty() || numeral.len() > 3 || !numeral.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value: u16 = numeral.parse().ok()?;
        Self::ALL.into_iter().find(|rung| rung.0 == value)
    }

    pub fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for ShadeRung {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

const UTILITY_FLAG_PREFIX: &str = "config-color-";
const SINGLE_COLOR_PREFIX: &str = "single-color-";
const COLOR_PREFIX: &str = "color-";
const VARIANT_PREFIX: &str = "variant-";
const BREAKPOINT_PREFIX: &str = "breakpoint-";

/// The role a metadata token plays, derived from its key alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind<'a> {
    /// `config-color-<prefix>`: marks a utility prefix as color-aware when the value is "true".
    UtilityFlag { prefix: &'a str },
    /// `color-<name>-<rung>` with a recognized rung.
    ColorShade { name: &'a str, rung: ShadeRung },
    /// `color-<name>` where `<name>` carries no recognized rung suffix.
    ColorDefault { name: &'a str },
    /// `single-color-<name>`: a color that is never shaded.
    SingleColor { name: &'a str },
    Variant { name: &'a str },
    Breakpoint { name: &'a str },
    Unrecognized,
}

/// Classify a token key (custom property marker already stripped).
pub fn classify(key: &str) -> TokenKind<'_> {
    if let Some(prefix) = non_empty_suffix(key, UTILITY_FLAG_PREFIX) {
        return TokenKind::UtilityFlag { prefix };
    }
    if let Some(name) = non_empty_suffix(key, SINGLE_COLOR_PREFIX) {
        return TokenKind::SingleColor { name };
    }
    if let Some(rest) = non_empty_suffix(key, COLOR_PREFIX) {
        return classify_color(rest);
    }
    if let Some(name) = non_empty_suffix(key, VARIANT_PREFIX) {
        return TokenKind::Variant { name };
    }
    if let Some(name) = non_empty_suffix(key, BREAKPOINT_PREFIX) {
        return TokenKind::Breakpoint { name };
    }
    TokenKind::Unrecognized
}

fn classify_color(rest: &str) -> TokenKind<'_> {
    if let Some((name, numeral)) = rest.rsplit_once('-') {
        if !name.is_empty() {
            if let Some(rung) = ShadeRung::parse(numeral) {
                return TokenKind::ColorShade { name, rung };
            }
        }
    }
    // Unknown numerals such as `gray-1000` stay part of the color name.
    TokenKind::ColorDefault { name: rest }
}

fn non_empty_suffix<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    key.strip_prefix(prefix).filter(|rest| !rest.is_empty())
}
