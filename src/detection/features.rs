//! 版式特征扫描
//!
//! 一组无状态的检测函数：章节标题、题组标记、私用区选项符号、选项标签、题号行

use phf::phf_map;
use regex::Regex;
use std::sync::LazyLock;

/// 申论题章节标记
pub const ESSAY_SECTION_MARKERS: &[&str] = &["申論題", "申论题", "問答題"];

/// 选择题章节标记
pub const CHOICE_SECTION_MARKERS: &[&str] = &["選擇題", "选择题"];

/// 文件名中表示国文/作文类考试的字样
pub const COMPOSITION_FILENAME_HINTS: &[&str] = &["國文", "国文", "作文", "公文"];

/// 申论关键词
pub const ESSAY_KEYWORDS: &[&str] = &[
    "申論", "論述", "試述", "試說明", "請說明", "試分析", "請分析", "試比較", "試論", "何謂",
    "請闡述", "請舉例",
];

/// 试卷 "注意事项" 中的常见说法，出现即视为考生须知而非题目
pub const NOTICE_PHRASES: &[&str] = &[
    "本科目共", "本科目为", "本科目為", "本試題", "本试题", "本試卷", "本试卷", "2B鉛筆", "2B铅笔",
    "禁止使用", "不予計分", "不予计分", "不必抄題", "不必抄题", "答案卡", "電子計算器", "电子计算器",
];

/// 原始 PDF 中用作选项符号的私用区字符（依次对应 A-D）
pub const PUA_OPTION_GLYPHS: [char; 4] = ['\u{E18C}', '\u{E18D}', '\u{E18E}', '\u{E18F}'];

/// 中文数字
static CHINESE_DIGITS: phf::Map<char, u32> = phf_map! {
    '一' => 1,
    '二' => 2,
    '三' => 3,
    '四' => 4,
    '五' => 5,
    '六' => 6,
    '七' => 7,
    '八' => 8,
    '九' => 9,
    '十' => 10,
};

// 国文卷 "甲、作文部分" / "乙、测验部分"
static ESSAY_PART_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"甲\s*[、,，]\s*(?:申論|作文|公文)").expect("static regex")
});
static TEST_PART_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"乙\s*[、,，]\s*測驗").expect("static regex"));

// 题组标记："请依下文回答第51题至第60题"
static GROUP_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"回答第\s*(\d{1,3})\s*題\s*(?:至|到|~|～|－|-|—)\s*第?\s*(\d{1,3})\s*題",
    )
    .expect("static regex")
});
static GROUP_MARKER_EN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)answer\s+questions?\s+(\d{1,3})\s+(?:through|to)\s+(?:questions?\s+)?(\d{1,3})")
        .expect("static regex")
});

// "注意：" / "※注意事項" 独占一行开头
static NOTICE_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[\t \x{3000}※]*(?:注意|考生須知|考生须知)(?:事項|事项)?[\t ]*[:：]?")
        .expect("static regex")
});

static OPTION_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[(（]\s*([A-DＡ-Ｄ])\s*[)）]").expect("static regex"));
static SCORE_MARK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[(（]\s*(\d{1,3})\s*分\s*[)）]").expect("static regex"));
static CHINESE_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[\t \x{3000}]*[一二三四五六七八九十]{1,3}\s*[、．.]").expect("static regex")
});
static ARABIC_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[\t \x{3000}]*\d{1,3}(?:\s*[.．、]|[\t \x{3000}]+)\s*\S").expect("static regex")
});
static SINGLE_DIGIT_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[\t \x{3000}]*[1-9](?:\s*[.．、]|[\t \x{3000}]+)\s*\S").expect("static regex")
});

/// 题组标记位置与题号范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupMarker {
    /// 标记起止字节位置
    pub start: usize,
    pub end: usize,
    pub first: u32,
    pub last: u32,
}

impl GroupMarker {
    pub fn contains(&self, number: u32) -> bool {
        (self.first..=self.last).contains(&number)
    }
}

/// 一次扫描得到的版式特征
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutFeatures {
    pub has_essay_section: bool,
    pub has_choice_section: bool,
    pub has_essay_part: bool,
    pub has_test_part: bool,
    pub has_group_marker: bool,
    pub has_pua_glyph: bool,
    pub has_bracketed_options: bool,
    pub has_single_digit_line: bool,
}

/// 扫描全部特征
pub fn scan(text: &str) -> LayoutFeatures {
    LayoutFeatures {
        has_essay_section: has_essay_section(text),
        has_choice_section: has_choice_section(text),
        has_essay_part: ESSAY_PART_RE.is_match(text),
        has_test_part: TEST_PART_RE.is_match(text),
        has_group_marker: has_group_marker(text),
        has_pua_glyph: has_pua_glyph(text),
        has_bracketed_options: has_bracketed_options(text),
        has_single_digit_line: SINGLE_DIGIT_LINE_RE.is_match(text),
    }
}

pub fn has_essay_section(text: &str) -> bool {
    ESSAY_SECTION_MARKERS.iter().any(|m| text.contains(m))
}

pub fn has_choice_section(text: &str) -> bool {
    CHOICE_SECTION_MARKERS.iter().any(|m| text.contains(m))
}

pub fn has_group_marker(text: &str) -> bool {
    GROUP_MARKER_RE.is_match(text) || GROUP_MARKER_EN_RE.is_match(text)
}

pub fn has_pua_glyph(text: &str) -> bool {
    text.chars().any(|c| PUA_OPTION_GLYPHS.contains(&c))
}

/// 申论部分最早出现的位置
pub fn essay_section_start(text: &str) -> Option<usize> {
    earliest(text, ESSAY_SECTION_MARKERS, &ESSAY_PART_RE)
}

/// 选择/测验部分最早出现的位置
pub fn choice_section_start(text: &str) -> Option<usize> {
    earliest(text, CHOICE_SECTION_MARKERS, &TEST_PART_RE)
}

fn earliest(text: &str, markers: &[&str], part_re: &Regex) -> Option<usize> {
    markers
        .iter()
        .filter_map(|m| text.find(m))
        .chain(part_re.find(text).map(|m| m.start()))
        .min()
}

/// 是否存在 (A)(B) 形式的选项标签（至少出现两个不同字母且包含 A）
pub fn has_bracketed_options(text: &str) -> bool {
    let mut seen = [false; 4];
    for cap in OPTION_LABEL_RE.captures_iter(text) {
        if let Some(i) = cap.get(1).and_then(|m| option_index(m.as_str())) {
            seen[i] = true;
        }
    }
    seen[0] && seen.iter().filter(|&&s| s).count() >= 2
}

/// 文件名是否提示国文/作文类考试
/// 第一个 "注意事项" 标记结束的位置
pub fn notice_marker_end(text: &str) -> Option<usize> {
    NOTICE_MARKER_RE.find(text).map(|m| m.end())
}

/// 文本是否是考生须知
pub fn is_notice_text(text: &str) -> bool {
    NOTICE_PHRASES.iter().any(|p| text.contains(p))
}

pub fn filename_signals_composition(filename: &str) -> bool {
    COMPOSITION_FILENAME_HINTS.iter().any(|h| filename.contains(h))
}

/// 找出所有题组标记（按位置排序）
pub fn find_group_markers(text: &str) -> Vec<GroupMarker> {
    let mut markers = Vec::new();
    for re in [&*GROUP_MARKER_RE, &*GROUP_MARKER_EN_RE] {
        for cap in re.captures_iter(text) {
            let (Some(whole), Some(first), Some(last)) = (cap.get(0), cap.get(1), cap.get(2))
            else {
                continue;
            };
            let (Ok(first), Ok(last)) = (first.as_str().parse::<u32>(), last.as_str().parse::<u32>())
            else {
                continue;
            };
            markers.push(GroupMarker {
                start: whole.start(),
                end: whole.end(),
                first,
                last,
            });
        }
    }
    markers.sort_by_key(|m| m.start);
    markers.dedup_by(|b, a| b.start < a.end);
    markers
}

pub fn count_essay_keywords(text: &str) -> usize {
    ESSAY_KEYWORDS.iter().map(|k| text.matches(k).count()).sum()
}

pub fn count_score_marks(text: &str) -> usize {
    SCORE_MARK_RE.find_iter(text).count()
}

pub fn count_chinese_headers(text: &str) -> usize {
    CHINESE_HEADER_RE.find_iter(text).count()
}

pub fn count_option_labels(text: &str) -> usize {
    OPTION_LABEL_RE.find_iter(text).count()
}

pub fn count_arabic_numbered_lines(text: &str) -> usize {
    ARABIC_LINE_RE.find_iter(text).count()
}

/// 取第一个配分标记的分数
pub fn first_score_mark(text: &str) -> Option<u32> {
    SCORE_MARK_RE
        .captures(text)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// 中文数字转数值，支持到 99（"十二"、"二十"、"二十三"）
pub fn chinese_numeral_value(numeral: &str) -> Option<u32> {
    let digits: Vec<u32> = numeral
        .chars()
        .map(|c| CHINESE_DIGITS.get(&c).copied())
        .collect::<Option<Vec<_>>>()?;

    match digits.as_slice() {
        [d] => Some(*d),
        [10, d] if *d < 10 => Some(10 + d),
        [d, 10] if *d < 10 => Some(d * 10),
        [t, 10, d] if *t < 10 && *d < 10 => Some(t * 10 + d),
        _ => None,
    }
}

/// 选项字母 → 下标（兼容全角）
pub fn option_index(letter: &str) -> Option<usize> {
    match letter.chars().next()? {
        'A' | 'Ａ' => Some(0),
        'B' | 'Ｂ' => Some(1),
        'C' | 'Ｃ' => Some(2),
        'D' | 'Ｄ' => Some(3),
        _ => None,
    }
}
