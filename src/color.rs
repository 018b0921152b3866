//! Turns escape times into colors by treating the count as a hue on
//! the HSV color wheel.

/// An 8-bit-per-channel color, in red, green, blue, alpha order.
pub type Rgba = [u8; 4];

/// Opaque black, the color of every point inside the set.
pub const BLACK: Rgba = [0, 0, 0, 255];

/// Convert a hue (in degrees), saturation and value to an opaque RGBA
/// color.
///
/// A hue of exactly 0 is black rather than red.  Escape time 0 means
/// "never escaped", and this is how those points come out black
/// without a separate check.  Hues of 360 and beyond fall off the
/// wheel and are black as well.
pub fn hsv_to_rgba(h: f64, s: f64, v: f64) -> Rgba {
    if h == 0.0 {
        return BLACK;
    }

    let hp = h / 60.0;
    let c = v * s;
    let x = c * (1.0 - ((hp % 2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match hp.floor() as i64 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        5 => (c, 0.0, x),
        _ => (0.0, 0.0, 0.0),
    };

    [channel(m + r), channel(m + g), channel(m + b), 255]
}

#[inline]
fn channel(f: f64) -> u8 {
    (f * 255.0).round() as u8
}

/// The color of a pixel whose point escaped at `count`.
#[inline]
pub fn iteration_color(count: usize) -> Rgba {
    hsv_to_rgba(count as f64, 1.0, 1.0)
}
