//! 答案抽取
//!
//! 支持两类写法，结果取并集，同一轮里先写入的不会被覆盖：
//! - 表格：题号行（第1题 第2题 … 或 "题号 1 2 3"）后跟一行以 "答案" 开头的字母
//! - 行内："1. A"、"1 A"、"第1题 A"、"1: A"
//!
//! 更正答案要求前面有 "更正" 字样，例如 "更正答案：第5题 B"、"第5题更正为B"，
//! 或者表格中以 "更正答案" 开头的行。

use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::models::AnswerMap;
use crate::parsers::common::normalize_text;

static HEADER_ORDINAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"第[ \t]*(\d{1,3})[ \t]*題").expect("static regex"));
static HEADER_PLAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t\x{3000}]*題[ \t]*號[ \t:]*((?:\d{1,3}[ \t\x{3000}]*)+)$").expect("static regex")
});
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{1,3}").expect("static regex"));
static ANSWER_ROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t\x{3000}]*(更正)?[ \t]*答[ \t]*案[ \t]*[:：]?(.*)$").expect("static regex")
});

// 行内写法，按顺序尝试
static INLINE_RES: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        r"第[ \t]*(\d{1,3})[ \t]*題[ \t]*[:：]?[ \t]*([A-Da-d])",
        r"(\d{1,3})[ \t]*[.、][ \t]*([A-Da-d])",
        r"(\d{1,3})[ \t]*[:：][ \t]*([A-Da-d])",
        r"(\d{1,3})[ \t]+([A-Da-d])",
    ]
    .map(|p| Regex::new(p).expect("static regex"))
});

static CORRECTED_RES: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        r"更正[ \t]*(?:答案)?[ \t]*[:：]?[ \t]*(?:第[ \t]*(\d{1,3})[ \t]*題|(\d{1,3}))[ \t]*[.、:：]?[ \t]*([A-Da-d])",
        r"第[ \t]*(\d{1,3})[ \t]*題[ \t]*(?:答案)?[ \t]*更正為[ \t]*()([A-Da-d])",
    ]
    .map(|p| Regex::new(p).expect("static regex"))
});

/// 抽取原始答案
pub fn extract_answers(text: &str) -> AnswerMap {
    let text = normalize_text(text);
    let mut answers = AnswerMap::new();

    let (tabular, _) = tabular_answers(&text);
    insert_all(&mut answers, tabular);

    // 更正答案的片段不参与原始答案抽取
    let masked = mask_corrections(&text);
    for re in INLINE_RES.iter() {
        for cap in re.captures_iter(&masked) {
            if let Some((number, letter)) = inline_entry(&masked, &cap, 1, 2) {
                answers.entry(number).or_insert(letter);
            }
        }
    }
    answers
}

/// 抽取更正答案
pub fn extract_corrected_answers(text: &str) -> AnswerMap {
    let text = normalize_text(text);
    let mut answers = AnswerMap::new();

    let (_, tabular) = tabular_answers(&text);
    insert_all(&mut answers, tabular);

    for re in CORRECTED_RES.iter() {
        for cap in re.captures_iter(&text) {
            let number_group = if cap.get(1).is_some() { 1 } else { 2 };
            if let Some((number, letter)) = inline_entry(&text, &cap, number_group, 3) {
                answers.entry(number).or_insert(letter);
            }
        }
    }
    answers
}

fn insert_all(answers: &mut AnswerMap, entries: Vec<(String, String)>) {
    for (number, letter) in entries {
        answers.entry(number).or_insert(letter);
    }
}

/// 检查边界后取出 (题号, 字母)：题号前不能紧贴数字，字母后不能紧贴字母
fn inline_entry(
    text: &str,
    cap: &Captures,
    number_group: usize,
    letter_group: usize,
) -> Option<(String, String)> {
    let number = cap.get(number_group)?;
    let letter = cap.get(letter_group)?;
    if text[..number.start()]
        .chars()
        .next_back()
        .map_or(false, |c| c.is_ascii_digit())
    {
        return None;
    }
    if text[letter.end()..]
        .chars()
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic())
    {
        return None;
    }
    let number: u32 = number.as_str().parse().ok()?;
    Some((number.to_string(), letter.as_str().to_ascii_uppercase()))
}

fn mask_corrections(text: &str) -> String {
    let mut masked = text.to_string();
    for re in CORRECTED_RES.iter() {
        let ranges: Vec<(usize, usize)> = re
            .find_iter(&masked)
            .map(|m| (m.start(), m.end()))
            .collect();
        for (start, end) in ranges {
            masked.replace_range(start..end, &" ".repeat(end - start));
        }
    }
    masked
}

/// 表格答案：返回 (原始, 更正)
fn tabular_answers(text: &str) -> (Vec<(String, String)>, Vec<(String, String)>) {
    let mut original = Vec::new();
    let mut corrected = Vec::new();
    let mut header: Option<Vec<u32>> = None;

    for line in text.lines() {
        if let Some(numbers) = header_numbers(line) {
            header = Some(numbers);
            continue;
        }
        let (Some(numbers), Some(cap)) = (&header, ANSWER_ROW_RE.captures(line)) else {
            continue;
        };
        let is_corrected = cap.get(1).is_some();
        let cells = answer_cells(cap.get(2).map_or("", |m| m.as_str()), numbers.len());

        let target = if is_corrected { &mut corrected } else { &mut original };
        for (number, cell) in numbers.iter().zip(cells) {
            if let Some(letter) = cell {
                target.push((number.to_string(), letter));
            }
        }
    }
    (original, corrected)
}

/// 题号行：至少两个 "第N题"，或者以 "题号" 开头的一串数字
fn header_numbers(line: &str) -> Option<Vec<u32>> {
    let ordinals: Vec<u32> = HEADER_ORDINAL_RE
        .captures_iter(line)
        .filter_map(|cap| cap.get(1)?.as_str().parse().ok())
        .collect();
    if ordinals.len() >= 2 {
        return Some(ordinals);
    }

    let cap = HEADER_PLAIN_RE.captures(line)?;
    let numbers: Vec<u32> = NUMBER_RE
        .find_iter(cap.get(1)?.as_str())
        .filter_map(|m| m.as_str().parse().ok())
        .collect();
    (numbers.len() >= 2).then_some(numbers)
}

/// 切出答案格，"#" 表示送分（位置保留，不产生答案）
///
/// 字母可以用空白分隔，也可以连写成 "ABCD"
fn answer_cells(row: &str, expected: usize) -> Vec<Option<String>> {
    let tokens: Vec<&str> = row.split_whitespace().collect();
    let cells: Vec<String> = match tokens.as_slice() {
        [single] if single.chars().count() == expected && expected > 1 => {
            single.chars().map(String::from).collect()
        }
        _ => tokens.iter().map(|t| t.to_string()).collect(),
    };

    cells
        .into_iter()
        .map(|cell| {
            let upper = cell.to_ascii_uppercase();
            matches!(upper.as_str(), "A" | "B" | "C" | "D").then_some(upper)
        })
        .collect()
}
