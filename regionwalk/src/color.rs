use std::fmt::Display;

use image::{Rgb, Rgba};
use serde::{Deserialize, Serialize};

/// A plain additive RGB color with 8 bits per channel
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Per-channel arithmetic mean, truncated towards zero.
    ///
    /// Returns `None` for an empty sample, there is no meaningful mean to report.
    pub fn mean<I: IntoIterator<Item = Color>>(colors: I) -> Option<Color> {
        let (sums, count) = Self::sums(colors);
        Self::from_sums(sums, count)
    }

    /// Mean over `count` samples of which only the given colors are not black
    pub fn mean_padded<I: IntoIterator<Item = Color>>(colors: I, count: u128) -> Option<Color> {
        let (sums, seen) = Self::sums(colors);
        Self::from_sums(sums, count.max(seen))
    }

    fn sums<I: IntoIterator<Item = Color>>(colors: I) -> ([u128; 3], u128) {
        let mut count = 0u128;
        let mut sums = [0u128; 3];

        for c in colors {
            sums[0] += c.r as u128;
            sums[1] += c.g as u128;
            sums[2] += c.b as u128;
            count += 1;
        }

        (sums, count)
    }

    fn from_sums(sums: [u128; 3], count: u128) -> Option<Color> {
        if count == 0 {
            return None;
        }

        // each quotient is bounded by the largest sample and therefore fits in a u8
        Some(Color {
            r: (sums[0] / count) as u8,
            g: (sums[1] / count) as u8,
            b: (sums[2] / count) as u8,
        })
    }

    /// Euclidean distance over the three channels, without any weighting
    pub fn distance(&self, other: &Color) -> f64 {
        let dr = other.r as f64 - self.r as f64;
        let dg = other.g as f64 - self.g as f64;
        let db = other.b as f64 - self.b as f64;

        (dr * dr + dg * dg + db * db).sqrt()
    }

    /// Fully opaque pixel of this color
    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, u8::MAX])
    }
}

impl From<Rgb<u8>> for Color {
    fn from(p: Rgb<u8>) -> Self {
        let [r, g, b] = p.0;
        Color { r, g, b }
    }
}

impl From<Rgba<u8>> for Color {
    fn from(p: Rgba<u8>) -> Self {
        let [r, g, b, _] = p.0;
        Color { r, g, b }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
