//! 嵌入式选项试卷
//!
//! 选项符号是私用区字符（规整后变成 (A)…(D)），并且带有题组。
//! 题组抽取的结果优先，其余题目用基线策略补齐。

use crate::error::ParseError;
use crate::parsers::common::{char_len, normalize_text};
use crate::parsers::question_group::{extract_groups, merge_with_groups};
use crate::parsers::{standard, StrategyOutput};
use crate::workflow::ParsingContext;

/// 最后一个选项比其他选项长出这么多倍，就认为后面粘上了下一段文章
const TAIL_RATIO: usize = 3;
const TAIL_MIN_CHARS: usize = 40;

pub fn parse(text: &str, ctx: &ParsingContext) -> Result<StrategyOutput, ParseError> {
    let normalized = normalize_text(text);
    if normalized.trim().is_empty() {
        return Ok(StrategyOutput::default());
    }

    let groups = extract_groups(&normalized, ctx)?;
    let sequential = standard::parse(&normalized, ctx)?;
    let mut output = merge_with_groups(groups, sequential);
    for question in &mut output.questions {
        trim_trailing_passage(&mut question.options);
    }
    Ok(output)
}

/// 截掉最后一个选项后面粘上的文章：保留到第一个句末标点
fn trim_trailing_passage(options: &mut [String]) {
    let Some((last, others)) = options.split_last_mut() else {
        return;
    };
    let longest_other = others.iter().map(|o| char_len(o)).max().unwrap_or(0);
    if char_len(last) < TAIL_MIN_CHARS.max(longest_other * TAIL_RATIO) {
        return;
    }
    if let Some((pos, c)) = last.char_indices().find(|(_, c)| matches!(c, '。' | '？' | '！')) {
        last.truncate(pos + c.len_utf8());
    }
}
