//! 版式分类
//!
//! 按固定顺序判断，第一个命中的版式胜出，都不命中则为标准选择题

use tracing::debug;

use crate::detection::features::{self, LayoutFeatures};
use crate::models::FormatType;
use crate::parsers::{essay, standard};
use crate::workflow::ParsingContext;

pub struct FormatClassifier<'a> {
    ctx: &'a ParsingContext,
}

impl<'a> FormatClassifier<'a> {
    pub fn new(ctx: &'a ParsingContext) -> Self {
        Self { ctx }
    }

    /// 判定试卷版式（同样的输入总是得到同样的结果）
    pub fn classify(&self, text: &str, filename: &str) -> FormatType {
        let layout = features::scan(text);
        let format = self.decide(text, filename, &layout);
        debug!("版式判定: {} ({:?})", format, layout);
        format
    }

    fn decide(&self, text: &str, filename: &str, f: &LayoutFeatures) -> FormatType {
        if (f.has_essay_section && f.has_choice_section)
            || (f.has_choice_section && f.has_group_marker && f.has_single_digit_line)
        {
            return FormatType::Comprehensive;
        }

        if features::filename_signals_composition(filename) || (f.has_essay_part && f.has_test_part)
        {
            return FormatType::Mixed;
        }

        if f.has_group_marker && f.has_pua_glyph {
            return FormatType::EmbeddedChoice;
        }

        // 试跑一次申论策略
        match essay::parse(text, self.ctx) {
            Ok(essays)
                if !essays.is_empty()
                    && !self.choice_dominated(text, f, essays.questions.len()) =>
            {
                FormatType::Essay
            }
            _ => FormatType::StandardChoice,
        }
    }

    /// 带括号选项的题目占多数：题号行超过密度阈值，或能解析出的选择题多于申论题
    fn choice_dominated(&self, text: &str, f: &LayoutFeatures, essay_count: usize) -> bool {
        if !f.has_bracketed_options {
            return false;
        }
        if features::count_arabic_numbered_lines(text) > self.ctx.essay.density_line_threshold {
            return true;
        }
        standard::parse(text, self.ctx).is_ok_and(|choices| choices.questions.len() > essay_count)
    }
}
