//! 无标签选项策略
//!
//! 选项没有 (A)(B)(C)(D) 标记时使用：
//! - 有题号：按题号切段，再按英文单词行 / 每行一个选项 / 长空白分隔恢复选项
//! - 没有题号：把每一行 3-4 个英文单词当成一道克漏字题，按顺序编号

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::ParseError;
use crate::models::{group_id, Question, QuestionType};
use crate::parsers::common::{
    char_len, clean_text, drop_decimal_starts, english_word_line, normalize_text,
    numbered_starts, recover_options, sequence_blocks, strip_page_furniture, OptionKind,
};
use crate::parsers::question_group::cloze_text;
use crate::parsers::StrategyOutput;
use crate::workflow::ParsingContext;

const CLOZE_NOTE: &str = "克漏字";

static NUMBERED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[\t \x{3000}]*(\d{1,3})(?:[\t ]*[.、]|[\t \x{3000}]+)").expect("static regex")
});

pub fn parse(text: &str, ctx: &ParsingContext) -> Result<StrategyOutput, ParseError> {
    let text = strip_page_furniture(&normalize_text(text));
    if text.trim().is_empty() {
        return Ok(StrategyOutput::default());
    }

    let numbered = parse_numbered(&text, ctx);
    if !numbered.is_empty() {
        return Ok(numbered);
    }

    // 按行编号的克漏字题和上面的题号无关，题号模式的丢弃记录只在两者都失败时保留
    let cloze = parse_cloze_lines(&text);
    debug!("无题号模式：识别到 {} 行克漏字选项", cloze.len());
    if cloze.is_empty() {
        return Ok(numbered);
    }
    Ok(cloze.into())
}

fn parse_numbered(text: &str, ctx: &ParsingContext) -> StrategyOutput {
    let starts = drop_decimal_starts(numbered_starts(&NUMBERED_RE, text), text);
    let mut output = StrategyOutput::default();

    for block in sequence_blocks(&starts, text.len(), ctx.max_number_gap) {
        let body = &text[block.body_start..block.body_end];
        let Some(recovered) = recover_options(body, true) else {
            output.reject(block.number, "未能恢复选项");
            continue;
        };
        if recovered.options.len() < 2 {
            output.reject(block.number, "选项不足");
            continue;
        }
        if recovered.kind == OptionKind::EnglishWords && recovered.stem.is_empty() {
            output.questions.push(Question::fill_blank(
                block.number,
                cloze_text(block.number),
                recovered.options,
            ));
        } else if recovered.stem.is_empty() {
            output.reject(block.number, "题干为空");
        } else if char_len(&clean_text(body)) < ctx.min_question_length {
            output.reject(block.number, "内容过短");
        } else {
            output
                .questions
                .push(Question::choice(block.number, recovered.stem, recovered.options));
        }
    }

    output.questions = mark_cloze_group(output.questions);
    output
}

fn parse_cloze_lines(text: &str) -> Vec<Question> {
    let questions = text
        .lines()
        .filter_map(english_word_line)
        .zip(1u32..)
        .map(|((_, words), number)| Question::fill_blank(number, cloze_text(number), words))
        .collect();
    mark_cloze_group(questions)
}

/// 克漏字题视为一个题组，题组范围取克漏字题的最小、最大题号
fn mark_cloze_group(questions: Vec<Question>) -> Vec<Question> {
    let numbers = questions
        .iter()
        .filter(|q| q.question_type == QuestionType::FillBlank)
        .map(|q| q.number);
    let (Some(first), Some(last)) = (numbers.clone().min(), numbers.max()) else {
        return questions;
    };
    let id = group_id(first, last);

    questions
        .into_iter()
        .map(|q| {
            if q.question_type == QuestionType::FillBlank {
                q.with_group(id.clone()).with_note(CLOZE_NOTE)
            } else {
                q
            }
        })
        .collect()
}
