use phf::phf_map;

/// 题目分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Category {
    /// 法律
    Law,
    /// 行政
    Administration,
    /// 经济
    Economics,
    /// 会计
    Accounting,
    /// 语文
    Language,
    /// 资讯
    Information,
    /// 综合（未命中任何关键词）
    General,
}

/// 关键词 → 分类
///
/// 试卷原文为繁体，关键词也用繁体
static CATEGORY_KEYWORDS: phf::Map<&'static str, Category> = phf_map! {
    "憲法" => Category::Law,
    "法律" => Category::Law,
    "民法" => Category::Law,
    "刑法" => Category::Law,
    "條例" => Category::Law,
    "訴訟" => Category::Law,
    "判決" => Category::Law,
    "行政" => Category::Administration,
    "公務員" => Category::Administration,
    "機關" => Category::Administration,
    "政策" => Category::Administration,
    "組織" => Category::Administration,
    "經濟" => Category::Economics,
    "需求" => Category::Economics,
    "供給" => Category::Economics,
    "通貨膨脹" => Category::Economics,
    "利率" => Category::Economics,
    "會計" => Category::Accounting,
    "借方" => Category::Accounting,
    "貸方" => Category::Accounting,
    "審計" => Category::Accounting,
    "預算" => Category::Accounting,
    "成語" => Category::Language,
    "文意" => Category::Language,
    "詞語" => Category::Language,
    "字形" => Category::Language,
    "閱讀" => Category::Language,
    "電腦" => Category::Information,
    "程式" => Category::Information,
    "網路" => Category::Information,
    "資料庫" => Category::Information,
};

/// 平票时的优先顺序
const PRIORITY: [Category; 6] = [
    Category::Law,
    Category::Administration,
    Category::Economics,
    Category::Accounting,
    Category::Language,
    Category::Information,
];

impl Category {
    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Category::Law => "法律",
            Category::Administration => "行政",
            Category::Economics => "經濟",
            Category::Accounting => "會計",
            Category::Language => "語文",
            Category::Information => "資訊",
            Category::General => "綜合",
        }
    }

    /// 按关键词命中次数判断分类
    pub fn classify(text: &str) -> Self {
        let mut hits = [0usize; PRIORITY.len()];
        for (keyword, category) in CATEGORY_KEYWORDS.entries() {
            let count = text.matches(keyword).count();
            if count == 0 {
                continue;
            }
            if let Some(i) = PRIORITY.iter().position(|c| c == category) {
                hits[i] += count;
            }
        }

        let mut best: Option<(usize, usize)> = None;
        for (i, &count) in hits.iter().enumerate() {
            if count > 0 && best.map_or(true, |(_, c)| count > c) {
                best = Some((i, count));
            }
        }
        best.map_or(Category::General, |(i, _)| PRIORITY[i])
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
