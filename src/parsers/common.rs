//! 各解析策略共用的工具：文本规整、选项切分、题号序列、按题号合并

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::detection::features::{option_index, PUA_OPTION_GLYPHS};
use crate::error::ParseError;
use crate::models::{Question, OPTION_LETTERS};

/// 规整后的选项标签 (A)…(D)
pub static OPTION_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*([A-D])\s*\)").expect("static regex"));

// 页眉页脚：代号、页次、座号、页码
static FURNITURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[\t \x{3000}]*(?:(?:代號|頁次|座號|考試時間)\s*[:：].*|第\s*\d+\s*頁.*|-\s*\d+\s*-|\d+\s*/\s*\d+)[\t \x{3000}]*$",
    )
    .expect("static regex")
});

// 最后一个选项之后出现这些内容，说明已经进入下一段
static TAIL_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[\t \x{3000}]*(?:[一二三四五六七八九十]{1,3}|[甲乙丙丁戊])\s*[、.]|(?:請?依|閱讀)下[文列][^\n]{0,12}?回答|回答第\s*\d",
    )
    .expect("static regex")
});

static ENGLISH_WORDS_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:(\d{1,3})\s*[.、]?\s+)?([A-Za-z][A-Za-z'\-]*(?:[ \t]+[A-Za-z][A-Za-z'\-]*){2,3})\s*$")
        .expect("static regex")
});

static LONG_WS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\t\x{3000}]+[ \t\x{3000}]*|[ ]{2,}").expect("static regex"));

/// 题号出现的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberedStart {
    pub number: u32,
    /// 题号本身的起始位置
    pub start: usize,
    /// 题号之后正文的起始位置
    pub body_start: usize,
}

/// 题号切出来的一段正文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberedBlock {
    pub number: u32,
    pub start: usize,
    pub body_start: usize,
    pub body_end: usize,
}

/// 从选项中恢复出来的结构
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveredOptions {
    pub stem: String,
    pub options: Vec<String>,
    pub kind: OptionKind,
}

/// 选项是用哪种方式切出来的
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// (A)(B)(C)(D)
    Bracketed,
    /// 一行 3-4 个英文单词（克漏字/词汇题）
    EnglishWords,
    /// 题干之后每行一个选项
    LinePerOption,
    /// 以长空白分隔的中文选项
    WhitespaceSegments,
}

/// 全角字母数字及编号用的标点转半角，私用区选项符号转 (A)…(D)，去掉 \r
///
/// 中文标点（，？。）保持原样
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if let Some(i) = PUA_OPTION_GLYPHS.iter().position(|&g| g == c) {
            out.push('(');
            out.push(OPTION_LETTERS[i]);
            out.push(')');
            continue;
        }
        match c {
            '\r' => {}
            '\u{FF01}'..='\u{FF5E}' => match char::from_u32(c as u32 - 0xFEE0) {
                Some(half) if half.is_ascii_alphanumeric() || "().:-/#".contains(half) => {
                    out.push(half)
                }
                _ => out.push(c),
            },
            _ => out.push(c),
        }
    }
    out
}

/// 去掉页眉页脚行
pub fn strip_page_furniture(text: &str) -> String {
    FURNITURE_RE.replace_all(text, "").into_owned()
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3000}'..='\u{303F}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{FF00}'..='\u{FFEF}')
}

/// 合并断行、压缩空白
///
/// 中文之间的断行直接拼接，英文之间补一个空格
pub fn clean_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for line in raw.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            continue;
        }
        if let (Some(prev), Some(next)) = (out.chars().last(), line.chars().next()) {
            if !is_cjk(prev) && !is_cjk(next) {
                out.push(' ');
            }
        }
        out.push_str(&line);
    }
    out
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub fn parse_number(raw: &str) -> Result<u32, ParseError> {
    raw.trim().parse().map_err(|_| ParseError::InvalidNumber {
        raw: raw.to_string(),
    })
}

/// 从 pos 往前数 n 个字符的位置
pub fn back_chars(text: &str, pos: usize, n: usize) -> usize {
    if n == 0 {
        return pos;
    }
    text[..pos]
        .char_indices()
        .rev()
        .nth(n - 1)
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// 从 pos 往后数 n 个字符的位置
pub fn forward_chars(text: &str, pos: usize, n: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(n)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

/// 用 (A)(B)(C)(D) 切分题干与选项
///
/// 从第一个 (A) 开始取连续递增的标签；再次出现 (A) 视为下一组选项，停止
pub fn split_bracket_options(body: &str) -> Option<(String, Vec<String>)> {
    let labels: Vec<(usize, usize, usize)> = OPTION_LABEL_RE
        .captures_iter(body)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let index = option_index(cap.get(1)?.as_str())?;
            Some((whole.start(), whole.end(), index))
        })
        .collect();

    let first_a = labels.iter().position(|l| l.2 == 0)?;
    let mut run = vec![labels[first_a]];
    for label in &labels[first_a + 1..] {
        let last_index = run[run.len() - 1].2;
        if label.2 == last_index + 1 {
            run.push(*label);
            if run.len() == OPTION_LETTERS.len() {
                break;
            }
        } else if label.2 == 0 {
            break;
        }
    }
    if run.len() < 2 {
        return None;
    }

    let stem = clean_text(&body[..run[0].0]);
    let mut options = Vec::with_capacity(run.len());
    for (i, label) in run.iter().enumerate() {
        let end = match run.get(i + 1) {
            Some(next) => next.0,
            None => {
                let tail = &body[label.1..];
                label.1 + TAIL_BREAK_RE.find(tail).map_or(tail.len(), |m| m.start())
            }
        };
        options.push(clean_text(&body[label.1..end]));
    }
    Some((stem, options))
}

/// 一行 3-4 个英文单词，返回 (可选的行首题号, 单词)
pub fn english_word_line(line: &str) -> Option<(Option<u32>, Vec<String>)> {
    let cap = ENGLISH_WORDS_LINE_RE.captures(line)?;
    let number = cap.get(1).and_then(|m| m.as_str().parse().ok());
    let words = cap
        .get(2)?
        .as_str()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    Some((number, words))
}

/// 按长空白（全角空格、制表符、连续两个以上空格）切分
pub fn whitespace_segments(text: &str) -> Vec<String> {
    LONG_WS_RE
        .split(text.trim())
        .map(clean_text)
        .filter(|s| !s.is_empty())
        .collect()
}

/// 依次尝试多种选项切分方式
///
/// 顺序：括号字母 → 英文单词行 → （可选）每行一个选项 → 长空白分隔
pub fn recover_options(body: &str, allow_line_options: bool) -> Option<RecoveredOptions> {
    if let Some((stem, options)) = split_bracket_options(body) {
        return Some(RecoveredOptions {
            stem,
            options,
            kind: OptionKind::Bracketed,
        });
    }

    let lines: Vec<&str> = body
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return None;
    }

    if let Some(pos) = lines.iter().position(|l| english_word_line(l).is_some()) {
        if let Some((_, words)) = english_word_line(lines[pos]) {
            let stem_lines: Vec<&str> = lines
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != pos)
                .map(|(_, l)| *l)
                .collect();
            return Some(RecoveredOptions {
                stem: clean_text(&stem_lines.join("\n")),
                options: words,
                kind: OptionKind::EnglishWords,
            });
        }
    }

    if allow_line_options && (3..=5).contains(&lines.len()) {
        let options: Vec<String> = lines[1..].iter().map(|l| clean_text(l)).collect();
        if options.iter().all(|o| char_len(o) <= 30) {
            return Some(RecoveredOptions {
                stem: clean_text(lines[0]),
                options,
                kind: OptionKind::LinePerOption,
            });
        }
    }

    let (stem, options) = if lines.len() >= 2 {
        (clean_text(lines[0]), whitespace_segments(&lines[1..].join("  ")))
    } else {
        let mut segments = whitespace_segments(lines[0]);
        if segments.is_empty() {
            return None;
        }
        let stem = segments.remove(0);
        (stem, segments)
    };
    if (2..=OPTION_LETTERS.len()).contains(&options.len()) {
        return Some(RecoveredOptions {
            stem,
            options,
            kind: OptionKind::WhitespaceSegments,
        });
    }

    None
}

/// 把题号候选整理成连续的题目段
///
/// 候选若能接上前一题（号码递增且跳号不超过 max_gap）则接受；
/// 否则只有在它是 1 号、或下一个候选能接上它时才视为新序列的开头，
/// 其余当作正文里的数字忽略
pub fn sequence_blocks(
    candidates: &[NumberedStart],
    text_len: usize,
    max_gap: u32,
) -> Vec<NumberedBlock> {
    let mut accepted: Vec<NumberedStart> = Vec::new();
    let mut last: Option<u32> = None;

    for (i, cand) in candidates.iter().enumerate() {
        if cand.number == 0 {
            continue;
        }
        let continues =
            last.map_or(true, |l| cand.number > l && cand.number <= l.saturating_add(max_gap));
        let restarts = !continues
            && (cand.number == 1
                || candidates.get(i + 1).map_or(false, |next| {
                    next.number > cand.number && next.number <= cand.number.saturating_add(max_gap)
                }));
        if continues || restarts {
            accepted.push(*cand);
            last = Some(cand.number);
        }
    }

    accepted
        .iter()
        .enumerate()
        .map(|(i, s)| NumberedBlock {
            number: s.number,
            start: s.start,
            body_start: s.body_start,
            body_end: accepted.get(i + 1).map_or(text_len, |next| next.start),
        })
        .collect()
}

/// 用正则找出题号候选（第一个捕获组是题号）
pub fn numbered_starts(re: &Regex, text: &str) -> Vec<NumberedStart> {
    re.captures_iter(text)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let number = parse_number(cap.get(1)?.as_str()).ok()?;
            Some(NumberedStart {
                number,
                start: whole.start(),
                body_start: whole.end(),
            })
        })
        .collect()
}

/// 去掉后面紧跟数字的候选（"1.5" 之类的小数）
pub fn drop_decimal_starts(starts: Vec<NumberedStart>, text: &str) -> Vec<NumberedStart> {
    starts
        .into_iter()
        .filter(|s| !text[s.body_start..].starts_with(|c: char| c.is_ascii_digit()))
        .collect()
}

/// 按题号合并两组结果：primary 中已有的题号以 primary 为准，结果按题号排序
pub fn merge_by_number(primary: Vec<Question>, secondary: Vec<Question>) -> Vec<Question> {
    let taken: BTreeSet<u32> = primary.iter().map(|q| q.number).collect();
    let mut merged = primary;
    merged.extend(secondary.into_iter().filter(|q| !taken.contains(&q.number)));
    merged.sort_by_key(|q| q.number);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_full_width_and_glyphs() {
        let text = "１．題目（Ａ）甲\u{E18D}乙\r\n";
        assert_eq!(normalize_text(text), "1.題目(A)甲(B)乙\n");
    }

    #[test]
    fn test_strip_page_furniture() {
        let text = "代號：1101\n頁次：4-1\n1. 題目\n第 2 頁\n- 3 -\n2. 題目";
        assert_eq!(strip_page_furniture(text).trim(), "1. 題目\n\n\n2. 題目");
    }

    #[test]
    fn test_clean_text_joins_lines() {
        assert_eq!(clean_text("下列何者\n正確？"), "下列何者正確？");
        assert_eq!(clean_text("the quick\nbrown   fox"), "the quick brown fox");
    }

    #[test]
    fn test_split_bracket_options() {
        let (stem, options) =
            split_bracket_options("下列何者正確？(A)甲 (B)乙 (C)丙 (D)丁\n二、複選題").unwrap();
        assert_eq!(stem, "下列何者正確？");
        assert_eq!(options, vec!["甲", "乙", "丙", "丁"]);
    }

    #[test]
    fn test_split_bracket_options_requires_two() {
        assert!(split_bracket_options("只有(A)一個").is_none());
        assert!(split_bracket_options("沒有選項").is_none());
    }

    #[test]
    fn test_english_word_line() {
        let (number, words) = english_word_line("apple banana cherry date").unwrap();
        assert_eq!(number, None);
        assert_eq!(words.len(), 4);
        let (number, _) = english_word_line("16. went goes going").unwrap();
        assert_eq!(number, Some(16));
        assert!(english_word_line("only two").is_none());
        assert!(english_word_line("one two three four five").is_none());
        assert!(english_word_line("中文 單詞 不算").is_none());
    }

    #[test]
    fn test_recover_whitespace_options() {
        let r = recover_options("下列何者為本文主旨？\n勤儉持家　　孝順父母　　敦親睦鄰", false).unwrap();
        assert_eq!(r.kind, OptionKind::WhitespaceSegments);
        assert_eq!(r.options.len(), 3);
        assert_eq!(r.stem, "下列何者為本文主旨？");
    }

    #[test]
    fn test_sequence_blocks_skips_stray_numbers() {
        let starts = vec![
            NumberedStart { number: 1, start: 0, body_start: 2 },
            NumberedStart { number: 2, start: 10, body_start: 12 },
            NumberedStart { number: 90, start: 15, body_start: 17 },
            NumberedStart { number: 3, start: 20, body_start: 22 },
        ];
        let blocks = sequence_blocks(&starts, 30, 3);
        let numbers: Vec<u32> = blocks.iter().map(|b| b.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(blocks[1].body_end, 20);
        assert_eq!(blocks[2].body_end, 30);
    }

    #[test]
    fn test_sequence_blocks_restarts_at_one() {
        // 注意事项 1-2，然后正式题目从 1 开始
        let starts = vec![
            NumberedStart { number: 1, start: 0, body_start: 2 },
            NumberedStart { number: 2, start: 5, body_start: 7 },
            NumberedStart { number: 1, start: 10, body_start: 12 },
            NumberedStart { number: 2, start: 20, body_start: 22 },
        ];
        let blocks = sequence_blocks(&starts, 30, 3);
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[1].body_end, 10);
    }

    #[test]
    fn test_sequence_blocks_huge_gap() {
        let starts = vec![
            NumberedStart { number: 999, start: 0, body_start: 4 },
            NumberedStart { number: 1, start: 10, body_start: 12 },
            NumberedStart { number: 2, start: 20, body_start: 22 },
        ];
        let blocks = sequence_blocks(&starts, 30, u32::MAX);
        let numbers: Vec<u32> = blocks.iter().map(|b| b.number).collect();
        assert_eq!(numbers, vec![999, 1, 2]);
    }

    #[test]
    fn test_merge_by_number_prefers_primary() {
        let primary = vec![Question::choice(2, "primary question", vec![])];
        let secondary = vec![
            Question::choice(1, "secondary one", vec![]),
            Question::choice(2, "secondary two", vec![]),
        ];
        let merged = merge_by_number(primary, secondary);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].number, 1);
        assert_eq!(merged[1].text, "primary question");
    }

    #[test]
    fn test_char_windows() {
        let text = "一二三四五";
        let pos = text.char_indices().nth(3).unwrap().0;
        assert_eq!(&text[back_chars(text, pos, 2)..pos], "二三");
        assert_eq!(&text[pos..forward_chars(text, pos, 1)], "四");
        assert_eq!(forward_chars(text, pos, 10), text.len());
    }
}
