//! 答案层：答案抽取与合并

pub mod extractor;
pub mod reconciler;

pub use extractor::{extract_answers, extract_corrected_answers};
pub use reconciler::{merge_answers, AnswerSet};
