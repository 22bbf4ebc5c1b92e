use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::category::Category;

/// 答案表：题号（十进制字符串）→ 单个大写字母 A-D
///
/// 原始答案与更正答案各一份，合并时生成新的表，不在原表上修改
pub type AnswerMap = BTreeMap<String, String>;

/// 选项字母
pub const OPTION_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// 选择题
    Choice,
    /// 申论题 / 问答题
    Essay,
    /// 克漏字（选项嵌在文章中的填空）
    FillBlank,
}

/// 难度（按题干长度粗略估计，仅供参考）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// 根据题干字数估计难度
    pub fn from_text(text: &str) -> Self {
        match text.chars().count() {
            0..=39 => Difficulty::Easy,
            40..=119 => Difficulty::Medium,
            _ => Difficulty::Hard,
        }
    }
}

/// 题目记录
///
/// 字段名是下游 CSV 序列化的约定，不要随意改名
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub number: u32,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: String,
    #[serde(default)]
    pub corrected_answer: String,
    #[serde(default)]
    pub final_answer: String,
    #[serde(default)]
    pub is_group_member: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    pub difficulty: Difficulty,
    pub category: String,
    #[serde(default)]
    pub notes: String,
}

impl Question {
    /// 创建选择题（最多保留 4 个选项）
    pub fn choice(number: u32, text: impl Into<String>, mut options: Vec<String>) -> Self {
        options.truncate(OPTION_LETTERS.len());
        Self::build(number, text.into(), QuestionType::Choice, options)
    }

    /// 创建克漏字题
    pub fn fill_blank(number: u32, text: impl Into<String>, mut options: Vec<String>) -> Self {
        options.truncate(OPTION_LETTERS.len());
        Self::build(number, text.into(), QuestionType::FillBlank, options)
    }

    /// 创建申论题（无选项）
    pub fn essay(number: u32, text: impl Into<String>) -> Self {
        Self::build(number, text.into(), QuestionType::Essay, Vec::new())
    }

    fn build(number: u32, text: String, question_type: QuestionType, options: Vec<String>) -> Self {
        let difficulty = Difficulty::from_text(&text);
        let category = Category::classify(&text).name().to_string();
        Self {
            number,
            text,
            question_type,
            options,
            correct_answer: String::new(),
            corrected_answer: String::new(),
            final_answer: String::new(),
            is_group_member: false,
            group_id: None,
            difficulty,
            category,
            notes: String::new(),
        }
    }

    /// 标记为题组成员
    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.is_group_member = true;
        self.group_id = Some(group_id.into());
        self
    }

    /// 追加备注，多条备注用分号分隔
    pub fn with_note(mut self, note: impl AsRef<str>) -> Self {
        let note = note.as_ref();
        if !note.is_empty() {
            if !self.notes.is_empty() {
                self.notes.push_str("; ");
            }
            self.notes.push_str(note);
        }
        self
    }
}

/// 题组编号，例如 "51-60"
pub fn group_id(first: u32, last: u32) -> String {
    format!("{}-{}", first, last)
}
