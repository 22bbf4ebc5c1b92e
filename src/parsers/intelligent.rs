//! 智能策略
//!
//! 在基线策略之上：
//! - 先去掉页眉页脚
//! - 题号既可以是 "N." 也可以是 "N 题干"，也接受同一行中长空白之后的题号
//! - 合并题组抽取的结果

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ParseError;
use crate::parsers::common::{
    drop_decimal_starts, normalize_text, numbered_starts, sequence_blocks, strip_page_furniture,
    NumberedStart,
};
use crate::parsers::question_group::{extract_groups, merge_with_groups};
use crate::parsers::standard::bracketed_choice;
use crate::parsers::StrategyOutput;
use crate::workflow::ParsingContext;

static LINE_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[\t \x{3000}]*(\d{1,3})(?:[\t ]*[.、]|[\t \x{3000}]+)").expect("static regex")
});

// 两栏排版时题号出现在行中
static INLINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\t \x{3000}]{2,}(\d{1,3})[\t ]*[.、]").expect("static regex")
});

pub fn parse(text: &str, ctx: &ParsingContext) -> Result<StrategyOutput, ParseError> {
    let text = strip_page_furniture(&normalize_text(text));
    if text.trim().is_empty() {
        return Ok(StrategyOutput::default());
    }

    let starts = drop_decimal_starts(candidates(&text), &text);
    let mut sequential = StrategyOutput::default();
    for block in sequence_blocks(&starts, text.len(), ctx.max_number_gap) {
        let body = &text[block.body_start..block.body_end];
        match bracketed_choice(block.number, body, ctx.min_question_length) {
            Ok(question) => sequential.questions.push(question),
            Err(reason) => sequential.reject(block.number, reason),
        }
    }

    let groups = extract_groups(&text, ctx)?;
    Ok(merge_with_groups(groups, sequential))
}

/// 行首与行中的题号候选，按位置排序并去掉重叠的
fn candidates(text: &str) -> Vec<NumberedStart> {
    let mut starts = numbered_starts(&LINE_START_RE, text);
    starts.extend(numbered_starts(&INLINE_RE, text));
    starts.sort_by_key(|s| s.start);

    let mut result: Vec<NumberedStart> = Vec::with_capacity(starts.len());
    for start in starts {
        if result.last().map_or(true, |prev| start.start >= prev.body_start) {
            result.push(start);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spaced_and_inline_numbers() {
        let text = "1 下列何者為行政處分？(A)甲 (B)乙 (C)丙 (D)丁\n2. 下列何者為法規命令？(A)甲 (B)乙    3. 下列何者為行政規則？(A)甲 (B)乙\n";
        let questions = parse(text, &ParsingContext::default()).unwrap().questions;
        assert_eq!(questions.iter().map(|q| q.number).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(questions[1].options, vec!["甲", "乙"]);
    }

    #[test]
    fn test_group_members_are_marked() {
        let text = "1. 下列何者為行政處分？(A)甲 (B)乙 (C)丙 (D)丁\n請依下文回答第2題至第3題\n某甲申請建築執照遭拒。\n2. 依上文，下列敘述何者正確？(A)甲 (B)乙 (C)丙 (D)丁\n3. 依上文，下列敘述何者錯誤？(A)甲 (B)乙 (C)丙 (D)丁\n";
        let questions = parse(text, &ParsingContext::default()).unwrap().questions;
        assert_eq!(questions.len(), 3);
        assert!(!questions[0].is_group_member);
        assert_eq!(questions[0].options.len(), 4);
        assert_eq!(questions[2].group_id.as_deref(), Some("2-3"));
    }

    #[test]
    fn test_page_furniture_ignored() {
        let text = "1. 下列何者為行政處分？(A)甲 (B)乙\n頁次：4-1\n2. 下列何者為法規命令？(A)甲 (B)乙\n";
        let questions = parse(text, &ParsingContext::default()).unwrap().questions;
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].options[1], "乙");
    }
}
