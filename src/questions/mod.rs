//! 题目层：容错解析、兜底题库、出题与作答推进

pub mod parser;
pub mod pool;
pub mod sequencer;

pub use parser::{parse_list, parse_questions, ParseStrategy, ParsedList};
pub use pool::{fallback_questions, FALLBACK_QUESTIONS};
pub use sequencer::QuestionSequencer;
