//! Per-topic score aggregation.
//!
//! Item rows are grouped by the two-level topic hierarchy, their three score
//! dimensions are normalized and averaged, threshold counts and ratios are
//! computed, and the best item of every topic is captured. The result is one
//! flat [`TopicReport`] per topic node.

pub mod aggregate;
pub mod assemble;
pub mod best;
pub mod normalize;
pub mod ratio;
pub mod types;
pub mod utility;

pub use assemble::build_report;
pub use types::{ReportConfig, ScoreColumns, TopicReport};
