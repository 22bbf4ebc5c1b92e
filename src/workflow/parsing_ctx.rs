//! 解析上下文
//!
//! 封装所有解析策略共用的阈值，显式传入各组件，便于测试时调整

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// 申论判定的权重与阈值
///
/// 这些常数是针对同一批试卷调出来的经验值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EssayPolicy {
    /// 申论关键词满分贡献
    pub keyword_weight: f64,
    /// 配分标记满分贡献
    pub score_mark_weight: f64,
    /// 中文数字题号满分贡献
    pub header_weight: f64,
    /// 选项标记最大扣分
    pub choice_penalty: f64,
    /// 阿拉伯数字题号过密时的扣分
    pub density_penalty: f64,
    /// 超过多少行阿拉伯数字题号视为选择题
    pub density_line_threshold: usize,
    pub keyword_cap: usize,
    pub score_mark_cap: usize,
    pub header_cap: usize,
    pub choice_marker_cap: usize,
    /// is_essay 判定阈值
    pub essay_threshold: f64,
    /// 编排层直接跳过选择题解析的阈值
    pub gate_threshold: f64,
}

impl Default for EssayPolicy {
    fn default() -> Self {
        Self {
            keyword_weight: 0.30,
            score_mark_weight: 0.25,
            header_weight: 0.20,
            choice_penalty: 0.30,
            density_penalty: 0.25,
            density_line_threshold: 10,
            keyword_cap: 5,
            score_mark_cap: 4,
            header_cap: 4,
            choice_marker_cap: 20,
            essay_threshold: 0.30,
            gate_threshold: 0.60,
        }
    }
}

/// 解析上下文
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingContext {
    /// 一般选择题题干最短字数
    pub min_question_length: usize,
    /// 题组题目内容最短字数
    pub min_group_question_length: usize,
    /// 申论题内容最短字数
    pub min_essay_length: usize,
    /// 策略结果至少要有几题才算可用
    pub min_viable_questions: usize,
    /// 相邻题号允许的最大跳号
    pub max_number_gap: u32,
    /// 题组标记前取多少字作为上下文
    pub group_window_before: usize,
    /// 题组标记后最多取多少字
    pub group_window_after: usize,
    /// 单个题组最多包含多少题
    pub max_group_span: u32,
    pub essay: EssayPolicy,
}

impl Default for ParsingContext {
    fn default() -> Self {
        Self {
            min_question_length: 10,
            min_group_question_length: 10,
            min_essay_length: 10,
            min_viable_questions: 2,
            max_number_gap: 3,
            group_window_before: 300,
            group_window_after: 1500,
            max_group_span: 40,
            essay: EssayPolicy::default(),
        }
    }
}

impl ParsingContext {
    /// 从 TOML 文本解析（缺省字段取默认值），并检查取值范围
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        let ctx: ParsingContext = toml::from_str(content)?;
        ctx.validate()?;
        Ok(ctx)
    }

    /// 检查参数是否合法
    pub fn validate(&self) -> AppResult<()> {
        if self.min_viable_questions == 0 {
            return Err(AppError::invalid_policy("min_viable_questions", "必须大于 0"));
        }
        if self.max_number_gap == 0 {
            return Err(AppError::invalid_policy("max_number_gap", "必须大于 0"));
        }
        if self.group_window_after == 0 {
            return Err(AppError::invalid_policy("group_window_after", "必须大于 0"));
        }
        for (name, value) in [
            ("essay.essay_threshold", self.essay.essay_threshold),
            ("essay.gate_threshold", self.essay.gate_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AppError::invalid_policy(name, "必须在 [0, 1] 之间"));
            }
        }
        if self.essay.gate_threshold < self.essay.essay_threshold {
            return Err(AppError::invalid_policy(
                "essay.gate_threshold",
                "不能低于 essay_threshold",
            ));
        }
        for (name, cap) in [
            ("essay.keyword_cap", self.essay.keyword_cap),
            ("essay.score_mark_cap", self.essay.score_mark_cap),
            ("essay.header_cap", self.essay.header_cap),
            ("essay.choice_marker_cap", self.essay.choice_marker_cap),
        ] {
            if cap == 0 {
                return Err(AppError::invalid_policy(name, "必须大于 0"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ParsingContext::default().validate().is_ok());
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let ctx = ParsingContext::from_toml_str("").unwrap();
        assert_eq!(ctx, ParsingContext::default());
    }

    #[test]
    fn test_gate_below_threshold_rejected() {
        let result = ParsingContext::from_toml_str("[essay]\ngate_threshold = 0.1\n");
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_bad_toml_rejected() {
        let result = ParsingContext::from_toml_str("min_question_length = \"ten\"");
        assert!(matches!(result, Err(AppError::File(_))));
    }
}
