//! 基线策略：行首 "N." 题号，(A)(B)(C)(D) 选项

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ParseError;
use crate::models::Question;
use crate::parsers::common::{
    char_len, clean_text, drop_decimal_starts, normalize_text, numbered_starts, sequence_blocks,
    split_bracket_options, strip_page_furniture,
};
use crate::parsers::StrategyOutput;
use crate::workflow::ParsingContext;

static DOTTED_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[\t \x{3000}]*(\d{1,3})[\t ]*[.、]").expect("static regex")
});

pub fn parse(text: &str, ctx: &ParsingContext) -> Result<StrategyOutput, ParseError> {
    let text = strip_page_furniture(&normalize_text(text));
    let mut output = StrategyOutput::default();
    if text.trim().is_empty() {
        return Ok(output);
    }

    let starts = drop_decimal_starts(numbered_starts(&DOTTED_LINE_RE, &text), &text);
    for block in sequence_blocks(&starts, text.len(), ctx.max_number_gap) {
        let body = &text[block.body_start..block.body_end];
        match bracketed_choice(block.number, body, ctx.min_question_length) {
            Ok(question) => output.questions.push(question),
            Err(reason) => output.reject(block.number, reason),
        }
    }
    Ok(output)
}

/// 用括号字母选项构造选择题；失败时返回丢弃原因
pub(crate) fn bracketed_choice(
    number: u32,
    body: &str,
    min_length: usize,
) -> Result<Question, &'static str> {
    let Some((stem, options)) = split_bracket_options(body) else {
        return Err("切不出括号选项");
    };
    if stem.is_empty() {
        return Err("题干为空");
    }
    if char_len(&clean_text(body)) < min_length {
        return Err("内容过短");
    }
    Ok(Question::choice(number, stem, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_paper() {
        let text = "代號：1101\n1. 下列何者為行政處分？(A)甲案 (B)乙案 (C)丙案 (D)丁案\n2.依行政程序法規定，下列敘述何者正確？\n(A)甲說 (B)乙說\n(C)丙說 (D)丁說\n3、下列何者錯誤？(A)一 (B)二 (C)三 (D)四\n";
        let questions = parse(text, &ParsingContext::default()).unwrap().questions;
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[1].number, 2);
        assert_eq!(questions[1].text, "依行政程序法規定，下列敘述何者正確？");
        assert_eq!(questions[1].options, vec!["甲說", "乙說", "丙說", "丁說"]);
    }

    #[test]
    fn test_full_width_numbers() {
        let text = "１．下列何者為行政處分之要件？（Ａ）甲 （Ｂ）乙 （Ｃ）丙 （Ｄ）丁\n";
        let questions = parse(text, &ParsingContext::default()).unwrap().questions;
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].options.len(), 4);
    }

    #[test]
    fn test_question_without_options_is_dropped() {
        let text = "1. 下列何者為行政處分之要件？\n2. 下列何者正確無誤？(A)甲 (B)乙 (C)丙 (D)丁\n";
        let output = parse(text, &ParsingContext::default()).unwrap();
        let numbers: Vec<u32> = output.questions.iter().map(|q| q.number).collect();
        assert_eq!(numbers, vec![2]);
        assert_eq!(output.rejected[0].number, 1);
        assert_eq!(output.rejected[0].reason, "切不出括号选项");
    }

    #[test]
    fn test_empty_and_whitespace() {
        let ctx = ParsingContext::default();
        assert!(parse("", &ctx).unwrap().is_empty());
        assert!(parse("  \n\t ", &ctx).unwrap().is_empty());
    }
}
