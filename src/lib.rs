pub mod config;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod report;
pub mod sheets;
pub mod source;
pub mod table;
