//! Run settings.
//!
//! Settings come from an optional JSON file and are then overridden by
//! command-line flags. Secrets are never stored here; they are read from the
//! environment (see `main`).
//!
//! ```json
//! {
//!   "source": "https://example.com/exports/idea-map",
//!   "scores": {
//!     "novelty": "novelty_score",
//!     "feasibility": "feasibility_score",
//!     "marketability": "marketability_score"
//!   },
//!   "title_field": "title",
//!   "sheet_url": "https://docs.google.com/spreadsheets/d/<id>/edit",
//!   "sheet_name": "Sheet1",
//!   "style_path": "design/default.json"
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::report::{ReportConfig, ScoreColumns};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Export directory or base URL.
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub scores: ScoreColumns,
    #[serde(default)]
    pub title_field: Option<String>,
    #[serde(default)]
    pub summary_field: Option<String>,
    #[serde(default)]
    pub category_field: Option<String>,
    #[serde(default)]
    pub sheet_url: Option<String>,
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    /// Sheet style JSON; built-in defaults when unset.
    #[serde(default)]
    pub style_path: Option<String>,
}

fn default_sheet_name() -> String {
    "Sheet1".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: None,
            scores: ScoreColumns::default(),
            title_field: None,
            summary_field: None,
            category_field: None,
            sheet_url: None,
            sheet_name: default_sheet_name(),
            style_path: None,
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
        serde_json::from_str(&content).with_context(|| format!("Invalid settings file {path}"))
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Aggregation options derived from these settings.
    pub fn report_config(&self) -> ReportConfig {
        ReportConfig {
            scores: self.scores.clone(),
            title_field: self.title_field.clone(),
            summary_field: self.summary_field.clone(),
            category_field: self.category_field.clone(),
        }
    }
}

/// Command-line overrides; `None` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub source: Option<String>,
    pub novelty: Option<String>,
    pub feasibility: Option<String>,
    pub marketability: Option<String>,
    pub title_field: Option<String>,
    pub summary_field: Option<String>,
    pub category_field: Option<String>,
    pub sheet_url: Option<String>,
    pub sheet_name: Option<String>,
    pub style_path: Option<String>,
}

impl Settings {
    pub fn apply(mut self, o: Overrides) -> Self {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *slot = v;
            }
        }
        fn set_opt<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        set_opt(&mut self.source, o.source);
        set(&mut self.scores.novelty, o.novelty);
        set(&mut self.scores.feasibility, o.feasibility);
        set(&mut self.scores.marketability, o.marketability);
        set_opt(&mut self.title_field, o.title_field);
        set_opt(&mut self.summary_field, o.summary_field);
        set_opt(&mut self.category_field, o.category_field);
        set_opt(&mut self.sheet_url, o.sheet_url);
        set(&mut self.sheet_name, o.sheet_name);
        set_opt(&mut self.style_path, o.style_path);
        self
    }
}
