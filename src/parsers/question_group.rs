//! 题组抽取
//!
//! "请依下文回答第 N 题至第 M 题" 之后的若干题共用一段阅读材料。
//! 对每个标记截取一段上下文窗口，在窗口内逐个定位题号，再从题目正文中恢复选项。

use regex::Regex;
use tracing::{debug, warn};

use crate::detection::features::{find_group_markers, GroupMarker};
use crate::error::ParseError;
use crate::models::{group_id, Question};
use crate::parsers::common::{
    back_chars, char_len, clean_text, forward_chars, merge_by_number, normalize_text,
    recover_options, OptionKind,
};
use crate::parsers::{Rejection, StrategyOutput};
use crate::workflow::ParsingContext;

/// 一次题组抽取的结果
#[derive(Debug, Clone, Default)]
pub struct GroupExtraction {
    /// 范围合法的题组标记
    pub markers: Vec<GroupMarker>,
    pub questions: Vec<Question>,
    /// 窗口内找不到或没能构成题目的题号
    pub rejected: Vec<Rejection>,
}

impl GroupExtraction {
    /// 题号是否落在某个题组范围内，返回题组编号
    pub fn group_for(&self, number: u32) -> Option<String> {
        self.markers
            .iter()
            .find(|m| m.contains(number))
            .map(|m| group_id(m.first, m.last))
    }
}

/// 题号在窗口中的位置
#[derive(Debug, Clone, Copy)]
struct Located {
    number: u32,
    start: usize,
    body_start: usize,
}

/// 单独作为策略运行：只返回题组中的题目
pub fn parse(text: &str, ctx: &ParsingContext) -> Result<StrategyOutput, ParseError> {
    let text = normalize_text(text);
    let extraction = extract_groups(&text, ctx)?;
    Ok(StrategyOutput {
        questions: extraction.questions,
        rejected: extraction.rejected,
    })
}

/// 在（已规整的）全文中抽取所有题组
pub fn extract_groups(text: &str, ctx: &ParsingContext) -> Result<GroupExtraction, ParseError> {
    let mut extraction = GroupExtraction::default();
    if text.trim().is_empty() {
        return Ok(extraction);
    }

    let markers = find_group_markers(text);
    for (i, marker) in markers.iter().enumerate() {
        if marker.first > marker.last || marker.last - marker.first >= ctx.max_group_span {
            let err = ParseError::InvalidGroupRange {
                start: marker.first,
                end: marker.last,
            };
            warn!("{}，跳过该题组", err);
            continue;
        }

        let prev = i.checked_sub(1).and_then(|j| markers.get(j));
        let window = group_window(text, marker, prev, markers.get(i + 1), ctx);
        let id = group_id(marker.first, marker.last);
        let output = extract_window(&window, marker, ctx)?;
        debug!(
            "题组 {}: 抽取到 {} / {} 题",
            id,
            output.questions.len(),
            marker.last - marker.first + 1
        );

        extraction
            .questions
            .extend(output.questions.into_iter().map(|q| q.with_group(id.clone())));
        extraction.rejected.extend(output.rejected);
        extraction.markers.push(*marker);
    }

    // 题组范围重叠时同一题号会被抽到两次：保留先抽到的，其余记为丢弃
    extraction.questions.sort_by_key(|q| q.number);
    let mut questions: Vec<Question> = Vec::with_capacity(extraction.questions.len());
    for question in std::mem::take(&mut extraction.questions) {
        if let Some(prev) = questions.last().filter(|prev| prev.number == question.number) {
            let kept = prev.group_id.clone().unwrap_or_default();
            warn!(
                "第{}题同时出现在题组 {} 和 {} 中，保留 {} 的结果",
                question.number,
                kept,
                question.group_id.as_deref().unwrap_or_default(),
                kept
            );
            extraction.rejected.push(Rejection {
                number: question.number,
                reason: format!("与题组 {} 重复", kept),
            });
            continue;
        }
        questions.push(question);
    }
    extraction.questions = questions;
    Ok(extraction)
}

/// 合并题组结果与顺序解析结果：题组范围内以题组抽取为准，
/// 只被顺序解析找到的题目补上题组字段
pub fn merge_with_groups(extraction: GroupExtraction, others: StrategyOutput) -> StrategyOutput {
    let grouped_others: Vec<Question> = others
        .questions
        .into_iter()
        .map(|q| match extraction.group_for(q.number) {
            Some(id) if !q.is_group_member => q.with_group(id),
            _ => q,
        })
        .collect();

    let mut rejected = others.rejected;
    rejected.extend(extraction.rejected);
    StrategyOutput {
        questions: merge_by_number(extraction.questions, grouped_others),
        rejected,
    }
}

/// 截取标记附近的窗口，并把标记本身替换成空白，避免 "第51题" 被当成题号
///
/// 窗口不越过前一个和后一个题组标记
fn group_window(
    text: &str,
    marker: &GroupMarker,
    prev: Option<&GroupMarker>,
    next: Option<&GroupMarker>,
    ctx: &ParsingContext,
) -> String {
    // 往前只从完整的一行开始取
    let mut start = back_chars(text, marker.start, ctx.group_window_before);
    if let Some(prev) = prev {
        start = start.max(prev.end.min(marker.start));
    }
    if start > 0 {
        start = text[start..marker.start]
            .find('\n')
            .map_or(marker.start, |p| start + p + 1);
    }

    let mut end = forward_chars(text, marker.end, ctx.group_window_after);
    if let Some(next) = next {
        end = end.min(next.start).max(marker.end);
    }

    let mut window = String::with_capacity(end - start);
    window.push_str(&text[start..marker.start]);
    window.push_str(&" ".repeat(marker.end - marker.start));
    window.push_str(&text[marker.end..end]);
    window
}

/// 某个题号的四种写法，按顺序尝试
fn number_patterns(number: u32) -> Result<[Regex; 4], ParseError> {
    Ok([
        Regex::new(&format!(r"(?m)^[\t \x{{3000}}]*{number}[\t \x{{3000}}]+"))?,
        Regex::new(&format!(r"第\s*{number}\s*題[:：.、]?\s*"))?,
        Regex::new(&format!(r"(?m)(?:^|\s){number}\s*[.、]\s*"))?,
        Regex::new(&format!(r"\(\s*{number}\s*\)\s*"))?,
    ])
}

/// 从 from 开始找题号，第一个能匹配的写法胜出
fn locate(window: &str, number: u32, from: usize) -> Result<Option<Located>, ParseError> {
    let haystack = &window[from..];
    for re in number_patterns(number)? {
        if let Some(m) = re.find(haystack) {
            return Ok(Some(Located {
                number,
                start: from + m.start(),
                body_start: from + m.end(),
            }));
        }
    }
    Ok(None)
}

fn extract_window(
    window: &str,
    marker: &GroupMarker,
    ctx: &ParsingContext,
) -> Result<StrategyOutput, ParseError> {
    let mut output = StrategyOutput::default();
    let mut located: Vec<Located> = Vec::new();
    let mut cursor = 0;
    for number in marker.first..=marker.last {
        match locate(window, number, cursor)? {
            Some(loc) => {
                cursor = loc.body_start;
                located.push(loc);
            }
            None => output.reject(number, "题组窗口内找不到题号"),
        }
    }

    for (i, loc) in located.iter().enumerate() {
        let body_end = match located.get(i + 1) {
            Some(next) => next.start,
            None => locate(window, marker.last + 1, loc.body_start)?
                .map_or(window.len(), |after| after.start),
        };
        let body = &window[loc.body_start..body_end];

        let Some(recovered) = recover_options(body, false) else {
            debug!("第{}题未能恢复选项，丢弃", loc.number);
            output.reject(loc.number, "未能恢复选项");
            continue;
        };
        if recovered.options.len() < 2 || char_len(&clean_text(body)) < ctx.min_group_question_length
        {
            debug!("第{}题内容过短或选项不足，丢弃", loc.number);
            output.reject(loc.number, "内容过短或选项不足");
            continue;
        }

        let question = if recovered.kind == OptionKind::EnglishWords && recovered.stem.is_empty() {
            Question::fill_blank(loc.number, cloze_text(loc.number), recovered.options)
        } else if recovered.stem.is_empty() {
            output.reject(loc.number, "题干为空");
            continue;
        } else {
            Question::choice(loc.number, recovered.stem, recovered.options)
        };
        output.questions.push(question);
    }
    Ok(output)
}

/// 克漏字题没有题干，用题号生成一个
pub fn cloze_text(number: u32) -> String {
    format!("第{}題（克漏字）", number)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_paper(first: u32, last: u32) -> String {
        let mut text = format!("請依下文回答第{}題至第{}題\n閱讀測驗文章內容，敘述各種情形。\n", first, last);
        for n in first..=last {
            text.push_str(&format!(
                "{}. 依本文，下列敘述何者正確？(A)甲說法 (B)乙說法 (C)丙說法 (D)丁說法\n",
                n
            ));
        }
        text
    }

    #[test]
    fn test_extracts_every_question_in_range() {
        let text = group_paper(51, 60);
        let extraction = extract_groups(&text, &ParsingContext::default()).unwrap();
        assert_eq!(extraction.questions.len(), 10);
        assert!(extraction
            .questions
            .iter()
            .all(|q| q.group_id.as_deref() == Some("51-60") && q.is_group_member));
        assert_eq!(extraction.questions[0].number, 51);
        assert_eq!(extraction.questions[0].options[3], "丁說法");
    }

    #[test]
    fn test_marker_numbers_are_not_questions() {
        // 标记里的 "第51題" 不能被当成第 51 题的位置
        let text = "請依下文回答第51題至第52題\n51. 下列何者為是？(A)甲甲 (B)乙乙\n52. 下列何者為非？(A)丙丙 (B)丁丁\n";
        let extraction = extract_groups(text, &ParsingContext::default()).unwrap();
        assert_eq!(extraction.questions.len(), 2);
        assert_eq!(extraction.questions[0].text, "下列何者為是？");
    }

    #[test]
    fn test_invalid_range_is_skipped() {
        let text = "請依下文回答第60題至第51題\n51. 下列何者為是？(A)甲甲 (B)乙乙\n";
        let extraction = extract_groups(text, &ParsingContext::default()).unwrap();
        assert!(extraction.markers.is_empty());
        assert!(extraction.questions.is_empty());
    }

    #[test]
    fn test_english_cloze_lines() {
        let text = "Answer questions 21 through 23 based on the passage.\nThe passage goes here.\n21 run runs ran running\n22 go goes went gone\n23 eat eats ate eaten\n";
        let extraction = extract_groups(text, &ParsingContext::default()).unwrap();
        assert_eq!(extraction.questions.len(), 3);
        assert_eq!(extraction.questions[1].options, vec!["go", "goes", "went", "gone"]);
        assert_eq!(extraction.questions[1].text, cloze_text(22));
    }

    #[test]
    fn test_merge_prefers_group_results() {
        let text = group_paper(3, 4);
        let extraction = extract_groups(&text, &ParsingContext::default()).unwrap();
        let others = vec![
            Question::choice(1, "一般題目", vec![]),
            Question::choice(3, "顺序解析的版本", vec![]),
        ];
        let merged = merge_with_groups(extraction, others.into()).questions;
        assert_eq!(merged.iter().map(|q| q.number).collect::<Vec<_>>(), vec![1, 3, 4]);
        assert_eq!(merged[1].text, "依本文，下列敘述何者正確？");
        assert!(!merged[0].is_group_member);
    }

    #[test]
    fn test_overlapping_groups_keep_first_and_report() {
        // 第二个标记的范围写错，和第一个题组重叠在第 2 题
        let text = "請依下文回答第1題至第2題\n某甲申請建築執照遭拒。\n1. 依上文，下列敘述何者正確？(A)甲說法 (B)乙說法\n2. 依上文，下列敘述何者錯誤？(A)甲說法 (B)乙說法\n請依下文回答第2題至第3題\n某乙提起訴願。\n3. 依上文，下列敘述何者為非？(A)甲說法 (B)乙說法\n";
        let extraction = extract_groups(text, &ParsingContext::default()).unwrap();
        let numbers: Vec<u32> = extraction.questions.iter().map(|q| q.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(extraction.questions[1].group_id.as_deref(), Some("1-2"));
        assert!(extraction
            .rejected
            .iter()
            .any(|r| r.number == 2 && r.reason.contains("1-2")));
    }

    #[test]
    fn test_missing_number_is_rejected() {
        let text = "請依下文回答第5題至第6題\n閱讀測驗文章內容，敘述各種情形。\n5. 依本文，下列敘述何者正確？(A)甲說法 (B)乙說法 (C)丙說法\n";
        let output = parse(text, &ParsingContext::default()).unwrap();
        assert_eq!(output.questions.len(), 1);
        assert_eq!(output.rejected.len(), 1);
        assert_eq!(output.rejected[0].number, 6);
    }

    #[test]
    fn test_empty_text() {
        assert!(parse("", &ParsingContext::default()).unwrap().is_empty());
    }
}
