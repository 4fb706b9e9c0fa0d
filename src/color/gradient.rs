use std::fmt;

use serde::{Serialize, Serializer};

/// An 8-bit RGB color. Displays and serializes as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const RED: Rgb = Rgb::new(0xff, 0x00, 0x00);
    pub const GREEN: Rgb = Rgb::new(0x00, 0xff, 0x00);
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Two-stop linear gradient in RGB space.
///
/// `at(0.0)` is exactly `start`, `at(1.0)` is exactly `end`; channels in
/// between are rounded half away from zero (`127.5` becomes `128`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gradient {
    pub start: Rgb,
    pub end: Rgb,
}

/// Weight scale used for edges: lowest weight red, highest green.
pub const WEIGHT_SCALE: Gradient = Gradient::new(Rgb::RED, Rgb::GREEN);

impl Gradient {
    pub const fn new(start: Rgb, end: Rgb) -> Self {
        Gradient { start, end }
    }

    /// Color at position `t`; `t` is clamped to `[0, 1]`, NaN maps to the start.
    pub fn at(&self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        Rgb {
            r: lerp_channel(self.start.r, self.end.r, t),
            g: lerp_channel(self.start.g, self.end.g, t),
            b: lerp_channel(self.start.b, self.end.b, t),
        }
    }
}

fn lerp_channel(a: u8, b: u8, t: f64) -> u8 {
    let a = a as f64;
    let b = b as f64;
    (a + (b - a) * t).round() as u8
}
