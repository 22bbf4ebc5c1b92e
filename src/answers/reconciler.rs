//! 答案合并：更正答案优先

use serde::Serialize;

use crate::answers::extractor::{extract_answers, extract_corrected_answers};
use crate::models::{AnswerMap, Question};

/// 合并原始答案与更正答案（纯函数，不修改输入）
pub fn merge_answers(original: &AnswerMap, corrected: &AnswerMap) -> AnswerMap {
    let mut merged = original.clone();
    merged.extend(corrected.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// 一份试卷的三张答案表
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnswerSet {
    pub original: AnswerMap,
    pub corrected: AnswerMap,
    pub merged: AnswerMap,
}

impl AnswerSet {
    pub fn new(original: AnswerMap, corrected: AnswerMap) -> Self {
        let merged = merge_answers(&original, &corrected);
        Self {
            original,
            corrected,
            merged,
        }
    }

    /// 从答案文本抽取
    pub fn from_text(text: &str) -> Self {
        Self::new(extract_answers(text), extract_corrected_answers(text))
    }

    pub fn is_empty(&self) -> bool {
        self.merged.is_empty()
    }

    /// 把答案写到题目上，返回有最终答案的题数
    pub fn apply(&self, questions: &mut [Question]) -> usize {
        let mut answered = 0;
        for question in questions.iter_mut() {
            let key = question.number.to_string();
            question.correct_answer = self.original.get(&key).cloned().unwrap_or_default();
            question.corrected_answer = self.corrected.get(&key).cloned().unwrap_or_default();
            question.final_answer = self.merged.get(&key).cloned().unwrap_or_default();
            if !question.final_answer.is_empty() {
                answered += 1;
            }
        }
        answered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> AnswerMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_corrected_overrides() {
        let merged = merge_answers(&map(&[("1", "A"), ("2", "B")]), &map(&[("1", "C")]));
        assert_eq!(merged, map(&[("1", "C"), ("2", "B")]));
    }

    #[test]
    fn test_empty_merge() {
        assert!(merge_answers(&AnswerMap::new(), &AnswerMap::new()).is_empty());
    }

    #[test]
    fn test_corrected_only_entries_pass_through() {
        let merged = merge_answers(&AnswerMap::new(), &map(&[("7", "D")]));
        assert_eq!(merged, map(&[("7", "D")]));
    }

    #[test]
    fn test_apply_sets_all_three_fields() {
        let set = AnswerSet::new(map(&[("1", "A"), ("2", "B")]), map(&[("2", "D")]));
        let mut questions = vec![
            Question::choice(1, "題目一", vec![]),
            Question::choice(2, "題目二", vec![]),
            Question::choice(3, "題目三", vec![]),
        ];
        assert_eq!(set.apply(&mut questions), 2);
        assert_eq!(questions[1].correct_answer, "B");
        assert_eq!(questions[1].corrected_answer, "D");
        assert_eq!(questions[1].final_answer, "D");
        assert_eq!(questions[0].corrected_answer, "");
        assert_eq!(questions[2].final_answer, "");
    }
}
