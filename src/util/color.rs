//! Color helpers: HSL conversion and deterministic string-hashed colors.

/// Convert HSL (`hue` in degrees, `saturation`/`lightness` in `[0, 1]`) to
/// RGB in `[0, 1]`.
#[must_use]
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [f32; 3] {
    let h = hue.rem_euclid(360.0);
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    [r + m, g + m, b + m]
}

/// Hue in `0..360` derived from a string.
///
/// Folds UTF-16 code units with `h = unit + (h << 5) - h` in wrapping 32-bit
/// arithmetic, then takes `|h| mod 360`.
#[must_use]
pub fn string_hue(key: &str) -> u32 {
    let hash = key.encode_utf16().fold(0_i32, |h, unit| {
        i32::from(unit).wrapping_add(h.wrapping_shl(5).wrapping_sub(h))
    });
    hash.unsigned_abs() % 360
}

/// Deterministic RGB color for a string key.
#[must_use]
pub fn hash_color(key: &str, saturation: f32, lightness: f32) -> [f32; 3] {
    hsl_to_rgb(string_hue(key) as f32, saturation, lightness)
}
