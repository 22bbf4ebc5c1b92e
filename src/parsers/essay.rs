//! 申论题策略
//!
//! 优先按 "一、二、三、" 中文数字题号切分；没有中文题号时，
//! 退回阿拉伯数字题号，但要求带配分标记且没有选项。
//! "注意：" 之后的考生须知条目不算题目。

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use crate::detection::features::{
    chinese_numeral_value, first_score_mark, has_bracketed_options, is_notice_text,
    notice_marker_end,
};
use crate::error::ParseError;
use crate::models::Question;
use crate::parsers::common::{
    char_len, clean_text, drop_decimal_starts, normalize_text, numbered_starts, sequence_blocks,
    strip_page_furniture,
};
use crate::parsers::StrategyOutput;
use crate::workflow::ParsingContext;

/// 章节标题里出现这些字样就不是题目
const SECTION_TITLE_WORDS: &[&str] = &["選擇題", "选择题", "測驗題", "测验题", "申論題", "申论题"];

/// 判断须知用语时只看题干开头这么多字
const NOTICE_PREFIX_CHARS: usize = 60;

static CHINESE_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[\t \x{3000}]*([一二三四五六七八九十]{1,3})[\t ]*[、.]").expect("static regex")
});

static ARABIC_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[\t \x{3000}]*(\d{1,2})[\t ]*[.、]").expect("static regex")
});

// 题目正文到 "乙、测验部分" 之类的分部标题为止
static PART_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[\t \x{3000}]*[甲乙丙丁][\t ]*[、.,，]").expect("static regex")
});

pub fn parse(text: &str, ctx: &ParsingContext) -> Result<StrategyOutput, ParseError> {
    let text = strip_page_furniture(&normalize_text(text));
    if text.trim().is_empty() {
        return Ok(StrategyOutput::default());
    }

    let mut output = parse_chinese_headers(&text, ctx);
    if !output.is_empty() {
        return Ok(output);
    }
    let arabic = parse_arabic_headers(&text, ctx);
    output.questions = arabic.questions;
    output.rejected.extend(arabic.rejected);
    Ok(output)
}

fn parse_chinese_headers(text: &str, ctx: &ParsingContext) -> StrategyOutput {
    let headers: Vec<(usize, usize, Option<u32>)> = CHINESE_HEADER_RE
        .captures_iter(text)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let numeral = cap.get(1)?.as_str();
            Some((whole.start(), whole.end(), chinese_numeral_value(numeral)))
        })
        .collect();

    let notice = notice_region(text, &headers);
    let mut output = StrategyOutput::default();
    for (i, &(start, body_start, number)) in headers.iter().enumerate() {
        if notice.as_ref().is_some_and(|r| r.contains(&start)) {
            continue;
        }
        let body_end = headers.get(i + 1).map_or(text.len(), |next| next.0);
        let body = cut_at_part_break(&text[body_start..body_end]);

        let title_line = body.lines().next().unwrap_or_default();
        if SECTION_TITLE_WORDS.iter().any(|w| title_line.contains(w)) {
            continue;
        }
        let Some(number) = number else {
            continue;
        };
        match essay_question(number, body, ctx) {
            Ok(question) => output.questions.push(question),
            Err(reason) => output.reject(number, reason),
        }
    }
    output
}

/// "注意：" 须知块的范围
///
/// 到第一个阿拉伯数字题号、分部标题或中文编号重新从头计数处为止
fn notice_region(text: &str, headers: &[(usize, usize, Option<u32>)]) -> Option<Range<usize>> {
    let start = notice_marker_end(text)?;
    let mut end = text.len();
    if let Some(m) = ARABIC_HEADER_RE.find_at(text, start) {
        end = end.min(m.start());
    }
    if let Some(m) = PART_BREAK_RE.find_at(text, start) {
        end = end.min(m.start());
    }

    let mut last = 0;
    for &(header_start, _, number) in headers.iter().filter(|h| h.0 >= start) {
        let Some(number) = number else {
            continue;
        };
        if number <= last {
            end = end.min(header_start);
            break;
        }
        last = number;
    }
    Some(start..end)
}

/// 没有配分标记的阿拉伯题号多半是选择题，不算丢弃
fn parse_arabic_headers(text: &str, ctx: &ParsingContext) -> StrategyOutput {
    let starts = drop_decimal_starts(numbered_starts(&ARABIC_HEADER_RE, text), text);
    let mut output = StrategyOutput::default();
    for block in sequence_blocks(&starts, text.len(), ctx.max_number_gap) {
        let body = cut_at_part_break(&text[block.body_start..block.body_end]);
        if first_score_mark(body).is_none() {
            continue;
        }
        match essay_question(block.number, body, ctx) {
            Ok(question) => output.questions.push(question),
            Err(reason) => output.reject(block.number, reason),
        }
    }
    output
}

fn cut_at_part_break(body: &str) -> &str {
    PART_BREAK_RE.find(body).map_or(body, |m| &body[..m.start()])
}

fn essay_question(number: u32, body: &str, ctx: &ParsingContext) -> Result<Question, &'static str> {
    if has_bracketed_options(body) {
        return Err("含有选项");
    }
    let text = clean_text(body);
    if char_len(&text) < ctx.min_essay_length {
        return Err("内容过短");
    }
    let prefix: String = text.chars().take(NOTICE_PREFIX_CHARS).collect();
    if is_notice_text(&prefix) {
        return Err("考生须知");
    }
    let question = Question::essay(number, text);
    Ok(match first_score_mark(body) {
        Some(score) => question.with_note(format!("配分: {}分", score)),
        None => question,
    })
}
