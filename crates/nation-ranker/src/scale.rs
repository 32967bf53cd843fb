//! Value range and color scale for the choropleth

use crate::scorer::RankedNation;
use crate::{RankerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Score bounds bound to the color scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Used when there is nothing to scan
    pub const EMPTY_DEFAULT: ValueRange = ValueRange { min: 0.0, max: 10.0 };

    /// Position of `value` inside the range, clamped to `[0, 1]`.
    ///
    /// A degenerate range (every score equal) maps to the midpoint.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span.abs() < 1e-10 {
            return 0.5;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

/// Min and max score of a ranking, [`ValueRange::EMPTY_DEFAULT`] if empty
pub fn value_range(entries: &[RankedNation]) -> ValueRange {
    let mut scores = entries.iter().map(|e| e.score);
    let Some(first) = scores.next() else {
        return ValueRange::EMPTY_DEFAULT;
    };

    scores.fold(ValueRange { min: first, max: first }, |range, score| ValueRange {
        min: range.min.min(score),
        max: range.max.max(score),
    })
}

/// 24-bit color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = RankerError;

    /// Accepts `#rrggbb` or `rrggbb`
    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || RankerError::InvalidColor(s.to_string());
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Diverging blue → yellow → red palette, low scores blue
pub const DEFAULT_STOPS: [Rgb; 11] = [
    Rgb::new(0x31, 0x36, 0x95),
    Rgb::new(0x45, 0x75, 0xb4),
    Rgb::new(0x74, 0xad, 0xd1),
    Rgb::new(0xab, 0xd9, 0xe9),
    Rgb::new(0xe0, 0xf3, 0xf8),
    Rgb::new(0xff, 0xff, 0xbf),
    Rgb::new(0xfe, 0xe0, 0x90),
    Rgb::new(0xfd, 0xae, 0x61),
    Rgb::new(0xf4, 0x6d, 0x43),
    Rgb::new(0xd7, 0x30, 0x27),
    Rgb::new(0xa5, 0x00, 0x26),
];

/// Evenly spaced color stops interpolated linearly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Rgb>", into = "Vec<Rgb>")]
pub struct ColorScale {
    stops: Vec<Rgb>,
}

impl TryFrom<Vec<Rgb>> for ColorScale {
    type Error = RankerError;

    fn try_from(stops: Vec<Rgb>) -> Result<Self> {
        Self::new(stops)
    }
}

impl From<ColorScale> for Vec<Rgb> {
    fn from(scale: ColorScale) -> Self {
        scale.stops
    }
}

impl Default for ColorScale {
    fn default() -> Self {
        Self {
            stops: DEFAULT_STOPS.to_vec(),
        }
    }
}

impl ColorScale {
    pub fn new(stops: Vec<Rgb>) -> Result<Self> {
        if stops.is_empty() {
            return Err(RankerError::EmptyColorScale);
        }
        Ok(Self { stops })
    }

    /// Parse hex stops such as `["#313695", "#a50026"]`
    pub fn from_hex<S: AsRef<str>>(stops: &[S]) -> Result<Self> {
        let stops = stops
            .iter()
            .map(|s| s.as_ref().parse())
            .collect::<Result<Vec<Rgb>>>()?;
        Self::new(stops)
    }

    pub fn stops(&self) -> &[Rgb] {
        &self.stops
    }

    /// Color at position `t` in `[0, 1]`
    pub fn at(&self, t: f64) -> Rgb {
        let last = self.stops.len() - 1;
        if last == 0 {
            return self.stops[0];
        }
        let pos = t.clamp(0.0, 1.0) * last as f64;
        let lower = (pos.floor() as usize).min(last - 1);
        self.stops[lower].lerp(self.stops[lower + 1], pos - lower as f64)
    }

    /// Fill color for a score within `range`
    pub fn color_for(&self, value: f64, range: &ValueRange) -> Rgb {
        self.at(range.normalize(value))
    }
}
