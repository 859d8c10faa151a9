//! Writing a topic report to a spreadsheet.
//!
//! [`write_report`] drives any [`SpreadsheetApi`]: it finds or adds the
//! target sheet, writes the values, then sends a single styling
//! `batchUpdate` built by the pure functions in [`requests`].

pub mod api;
pub mod color;
pub mod range;
pub mod requests;
pub mod style;
mod writer;

pub use api::{SheetInfo, SpreadsheetApi};
pub use range::extract_spreadsheet_id;
pub use style::StyleConfig;
pub use writer::{report_values, sheet_url, write_report};
