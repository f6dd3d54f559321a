//! Breakdown chart segments and the colors attached to them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One child category's proportional share of its parent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    /// Id of the child category the segment represents.
    pub key: String,
    pub label: String,
    pub value: f64,
    /// Share of the parent's grand total, rounded to a whole percent.
    pub percent: u32,
    pub color: HslColor,
}

/// A color in HSL space; saturation and lightness are percentages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HslColor {
    pub hue: f64,
    pub saturation: u8,
    pub lightness: u8,
}

impl HslColor {
    pub fn new(hue: f64, saturation: u8, lightness: u8) -> Self {
        Self {
            hue: hue.rem_euclid(360.0),
            saturation: saturation.min(100),
            lightness: lightness.min(100),
        }
    }

    /// Converts to 8-bit RGB channels.
    pub fn to_rgb(self) -> (u8, u8, u8) {
        let s = f64::from(self.saturation) / 100.0;
        let l = f64::from(self.lightness) / 100.0;
        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let sector = self.hue / 60.0;
        let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
        let (r, g, b) = match sector as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = l - chroma / 2.0;
        let channel = |value: f64| ((value + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        (channel(r), channel(g), channel(b))
    }

    pub fn to_hex(self) -> String {
        let (r, g, b) = self.to_rgb();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

impl fmt::Display for HslColor {
    /// The hue is shown to three decimals.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hue = (self.hue * 1000.0).round() / 1000.0;
        write!(f, "hsl({}, {}%, {}%)", hue, self.saturation, self.lightness)
    }
}
