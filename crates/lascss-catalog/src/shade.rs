// ABOUTME: Derives a shade rung from a family's base color by mixing toward white or black
// ABOUTME: Linear, hue-naive approximation used when no explicit per-shade value exists

use crate::classify::ShadeRung;
use crate::color::Rgb;

/// Keywords that have no meaningful lighter or darker form.
const SHADE_INVARIANT_KEYWORDS: [&str; 2] = ["transparent", "currentColor"];

/// Produce the color for `rung` from `base`.
///
/// Rung 500 and the invariant keywords return `base` unchanged. Lighter rungs
/// mix toward white by `(500 - rung) / 500`, darker rungs toward black by
/// `(rung - 500) / 500`. The model is not perceptually uniform; it only has
/// to give a recognizable swatch. `None` when `base` is not a parseable color.
pub fn synthesize_shade(base: &str, rung: ShadeRung) -> Option<String> {
    let base = base.trim();
    if rung == ShadeRung::BASE || SHADE_INVARIANT_KEYWORDS.contains(&base) {
        return Some(base.to_string());
    }

    let color = Rgb::parse(base)?;
    let value = f64::from(rung.value());
    let mixed = if value < 500.0 {
        color.mix(Rgb::WHITE, (500.0 - value) / 500.0 * 100.0)
    } else {
        color.mix(Rgb::BLACK, (value - 500.0) / 500.0 * 100.0)
    };
    Some(mixed.to_hex())
}
