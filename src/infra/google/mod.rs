//! Google Sheets access.
//!
//! [`GoogleCredentials`] resolves an access token from the environment and
//! [`GoogleSheetsClient`] implements [`topic_report::sheets::SpreadsheetApi`]
//! over the Sheets v4 REST API.

mod client;
mod token;

pub use client::GoogleSheetsClient;
pub use token::GoogleCredentials;
