use anyhow::{Result, bail};
use serde::Serialize;

/// An RGB colour as the Sheets API expects it, each channel in 0.0–1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl Color {
    pub const WHITE: Color = Color {
        red: 1.0,
        green: 1.0,
        blue: 1.0,
    };

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Color {
            red: r as f64 / 255.0,
            green: g as f64 / 255.0,
            blue: b as f64 / 255.0,
        }
    }
}

/// Parses `#RRGGBB` or `#RGB`.
pub fn hex_to_color(hex: &str) -> Result<Color> {
    let hex = hex.trim();
    let Some(digits) = hex.strip_prefix('#') else {
        bail!("Color must be hex like #RRGGBB, got '{hex}'");
    };

    let digits: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => bail!("Color must be hex like #RRGGBB, got '{hex}'"),
    };

    let channel = |i: usize| -> Result<u8> {
        digits
            .get(i..i + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .ok_or_else(|| anyhow::anyhow!("Invalid hex digits in color '{hex}'"))
    };

    Ok(Color::from_rgb8(channel(0)?, channel(2)?, channel(4)?))
}

/// Converts hue, saturation and lightness (each 0.0–1.0) to RGB.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Color {
    if s == 0.0 {
        return Color {
            red: l,
            green: l,
            blue: l,
        };
    }
    let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let m1 = 2.0 * l - m2;
    Color {
        red: hue_channel(m1, m2, h + 1.0 / 3.0),
        green: hue_channel(m1, m2, h),
        blue: hue_channel(m1, m2, h - 1.0 / 3.0),
    }
}

fn hue_channel(m1: f64, m2: f64, hue: f64) -> f64 {
    let hue = hue.rem_euclid(1.0);
    if hue < 1.0 / 6.0 {
        m1 + (m2 - m1) * hue * 6.0
    } else if hue < 0.5 {
        m2
    } else if hue < 2.0 / 3.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - hue) * 6.0
    } else {
        m1
    }
}
