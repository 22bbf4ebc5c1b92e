//! 综合试卷：申论 + 选择（含题组）
//!
//! 先按章节标记切成申论部分与选择部分，分别解析后合并。
//! 选择题保留原题号；申论题接在最后一道选择题之后重新编号。

use tracing::debug;

use crate::detection::features::{choice_section_start, essay_section_start};
use crate::error::ParseError;
use crate::models::Question;
use crate::parsers::common::normalize_text;
use crate::parsers::{essay, intelligent, no_label, standard, StrategyOutput};
use crate::workflow::ParsingContext;

/// 切出来的两个部分
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Sections<'a> {
    essay: &'a str,
    choice: &'a str,
    has_choice_marker: bool,
}

pub fn parse(text: &str, ctx: &ParsingContext) -> Result<StrategyOutput, ParseError> {
    let text = normalize_text(text);
    if text.trim().is_empty() {
        return Ok(StrategyOutput::default());
    }

    let sections = split_sections(&text);

    let mut essays = essay::parse(sections.essay, ctx)?;
    if essays.is_empty() && sections.essay.len() < text.len() {
        essays = essay::parse(&text, ctx)?;
    }

    let mut choices = parse_choice(sections.choice, sections.has_choice_marker, ctx)?;
    if choices.is_empty() && sections.choice.len() < text.len() {
        choices = parse_choice(&text, sections.has_choice_marker, ctx)?;
    }
    debug!(
        "综合试卷：选择题 {} 题，申论题 {} 题",
        choices.questions.len(),
        essays.questions.len()
    );

    // 申论题重新编号后，原题号的丢弃记录对不上新题号，只在不重新编号时保留
    let mut rejected = choices.rejected;
    if choices.questions.is_empty() {
        rejected.extend(essays.rejected);
    }
    Ok(StrategyOutput {
        questions: combine(choices.questions, essays.questions),
        rejected,
    })
}

fn split_sections(text: &str) -> Sections<'_> {
    match (essay_section_start(text), choice_section_start(text)) {
        (Some(e), Some(c)) if e < c => Sections {
            essay: &text[e..c],
            choice: &text[c..],
            has_choice_marker: true,
        },
        (Some(e), Some(c)) => Sections {
            essay: &text[e..],
            choice: &text[c..e],
            has_choice_marker: true,
        },
        (_, c) => Sections {
            essay: text,
            choice: text,
            has_choice_marker: c.is_some(),
        },
    }
}

/// 选择题部分依次尝试：智能 → 基线 → 无标签（只在确有选择题标记时）
fn parse_choice(
    text: &str,
    has_choice_marker: bool,
    ctx: &ParsingContext,
) -> Result<StrategyOutput, ParseError> {
    let output = intelligent::parse(text, ctx)?;
    if !output.is_empty() {
        return Ok(output);
    }
    let output = standard::parse(text, ctx)?;
    if !output.is_empty() || !has_choice_marker {
        return Ok(output);
    }
    no_label::parse(text, ctx)
}

/// 申论题接在选择题后面编号，备注里保留原题号
fn combine(mut choices: Vec<Question>, essays: Vec<Question>) -> Vec<Question> {
    let Some(last_choice) = choices.iter().map(|q| q.number).max() else {
        return essays;
    };
    choices.extend(essays.into_iter().enumerate().map(|(i, q)| {
        let original = q.number;
        let mut q = q.with_note(format!("申論第{}題", original));
        q.number = last_choice + i as u32 + 1;
        q
    }));
    choices.sort_by_key(|q| q.number);
    choices
}
