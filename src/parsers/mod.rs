//! 解析策略层
//!
//! 每个策略都是一个纯函数 `(text, ctx) -> Result<StrategyOutput, ParseError>`，
//! 由 [`ParserStrategy`] 统一分发。空文本返回空结果，不报错。
//! 找到题号却没能构成题目的，连同原因记在 `rejected` 里。

pub mod common;
pub mod comprehensive;
pub mod embedded;
pub mod essay;
pub mod intelligent;
pub mod no_label;
pub mod question_group;
pub mod standard;

use serde::Serialize;

use crate::error::ParseError;
use crate::models::{FormatType, Question};
use crate::workflow::ParsingContext;

/// 被策略丢弃的题号
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub number: u32,
    pub reason: String,
}

/// 一次策略运行的产出
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyOutput {
    pub questions: Vec<Question>,
    pub rejected: Vec<Rejection>,
}

impl StrategyOutput {
    pub fn reject(&mut self, number: u32, reason: impl Into<String>) {
        self.rejected.push(Rejection {
            number,
            reason: reason.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl From<Vec<Question>> for StrategyOutput {
    fn from(questions: Vec<Question>) -> Self {
        Self {
            questions,
            rejected: Vec::new(),
        }
    }
}

/// 解析策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParserStrategy {
    /// 智能策略：多种题号写法 + 题组合并
    Intelligent,
    /// 基线策略：行首 "N." + 括号字母选项
    Standard,
    /// 只抽取题组
    QuestionGroup,
    /// 私用区符号选项 + 题组
    EmbeddedCloze,
    /// 无选项标签
    NoLabel,
    /// 申论题
    Essay,
    /// 申论 + 选择综合
    Comprehensive,
}

impl ParserStrategy {
    pub fn name(self) -> &'static str {
        match self {
            ParserStrategy::Intelligent => "intelligent",
            ParserStrategy::Standard => "standard",
            ParserStrategy::QuestionGroup => "question_group",
            ParserStrategy::EmbeddedCloze => "embedded_cloze",
            ParserStrategy::NoLabel => "no_label",
            ParserStrategy::Essay => "essay",
            ParserStrategy::Comprehensive => "comprehensive",
        }
    }

    /// 已经由分类器确定版式的专用策略；标准选择题没有专用策略，走回退链
    pub fn dedicated_for(format: FormatType) -> Option<Self> {
        match format {
            FormatType::Comprehensive | FormatType::Mixed => Some(ParserStrategy::Comprehensive),
            FormatType::EmbeddedChoice => Some(ParserStrategy::EmbeddedCloze),
            FormatType::Essay => Some(ParserStrategy::Essay),
            FormatType::StandardChoice => None,
        }
    }

    /// 运行策略
    pub fn run(self, text: &str, ctx: &ParsingContext) -> Result<StrategyOutput, ParseError> {
        match self {
            ParserStrategy::Intelligent => intelligent::parse(text, ctx),
            ParserStrategy::Standard => standard::parse(text, ctx),
            ParserStrategy::QuestionGroup => question_group::parse(text, ctx),
            ParserStrategy::EmbeddedCloze => embedded::parse(text, ctx),
            ParserStrategy::NoLabel => no_label::parse(text, ctx),
            ParserStrategy::Essay => essay::parse(text, ctx),
            ParserStrategy::Comprehensive => comprehensive::parse(text, ctx),
        }
    }
}

impl std::fmt::Display for ParserStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
