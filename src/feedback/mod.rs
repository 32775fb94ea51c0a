//! 反馈层：单题点评与整场总评

pub mod aggregator;

pub use aggregator::{FeedbackAggregator, OVERALL_PLACEHOLDER};
