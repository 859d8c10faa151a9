//! Sheet style configuration.
//!
//! Loaded from a JSON file shaped like
//!
//! ```json
//! {
//!   "header": { "backgroundColor": "#356854", "textColor": "#FFFFFF", "fontSize": 10 },
//!   "planet": { "has_planet": true, "planet_color": "#356854" },
//!   "columns": {
//!     "Summary": { "wrap": true, "columnWidth": 320 },
//!     "G": { "numberFormat": "NUMBER", "horizontal": "RIGHT" }
//!   }
//! }
//! ```
//!
//! Every field is optional.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub header: HeaderStyle,
    pub planet: PlanetStyle,
    /// Keyed by column letters, 1-based number, or header name.
    pub columns: BTreeMap<String, ColumnStyle>,
}

impl StyleConfig {
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
        serde_json::from_str(&content).with_context(|| format!("Invalid style config {path}"))
    }

    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

/// First-row styling. The header row is also frozen.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeaderStyle {
    pub background_color: String,
    pub text_color: String,
    pub bold: bool,
    pub font_size: u32,
    #[serde(rename = "header_height_px")]
    pub height_px: u32,
}

impl Default for HeaderStyle {
    fn default() -> Self {
        Self {
            background_color: "#356854".to_string(),
            text_color: "#FFFFFF".to_string(),
            bold: true,
            font_size: 10,
            height_px: 40,
        }
    }
}

/// Outer border and column-group lines drawn around the report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlanetStyle {
    pub has_planet: bool,
    pub planet_color: String,
    /// 1-based row of the table's top-left cell.
    pub start_row: usize,
    /// 1-based column of the table's top-left cell.
    pub start_col: usize,
}

impl Default for PlanetStyle {
    fn default() -> Self {
        Self {
            has_planet: true,
            planet_color: "#356854".to_string(),
            start_row: 1,
            start_col: 1,
        }
    }
}

/// Text wrapping, either as a flag or as a Sheets wrap strategy name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Wrap {
    Flag(bool),
    Mode(String),
}

impl Default for Wrap {
    fn default() -> Self {
        Wrap::Flag(false)
    }
}

impl Wrap {
    /// Sheets `wrapStrategy` value.
    pub fn strategy(&self) -> Result<&'static str> {
        match self {
            Wrap::Flag(true) => Ok("WRAP"),
            Wrap::Flag(false) => Ok("OVERFLOW_CELL"),
            Wrap::Mode(mode) => match mode.to_ascii_uppercase().as_str() {
                "WRAP" => Ok("WRAP"),
                "CLIP" => Ok("CLIP"),
                "OVERFLOW" | "OVERFLOW_CELL" => Ok("OVERFLOW_CELL"),
                _ => bail!("wrap must be a bool or 'WRAP'/'CLIP'/'OVERFLOW', got '{mode}'"),
            },
        }
    }
}

/// Styling for one data column. Background colours are left untouched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColumnStyle {
    pub font_family: String,
    pub font_size: u32,
    pub bold: bool,
    pub italic: bool,
    pub foreground_color: String,
    pub wrap: Wrap,
    pub horizontal: String,
    pub vertical: String,
    /// Pixel width; unset or 0 keeps the current width.
    pub column_width: Option<u32>,
    #[serde(alias = "exclude_header")]
    pub exclude_header: bool,
    /// `PERCENT`, `NUMBER`, `CURRENCY`, or any other Sheets number format type.
    pub number_format: Option<String>,
}

impl Default for ColumnStyle {
    fn default() -> Self {
        Self {
            font_family: "Roboto".to_string(),
            font_size: 10,
            bold: false,
            italic: false,
            foreground_color: "#434343".to_string(),
            wrap: Wrap::default(),
            horizontal: "LEFT".to_string(),
            vertical: "MIDDLE".to_string(),
            column_width: None,
            exclude_header: true,
            number_format: None,
        }
    }
}
