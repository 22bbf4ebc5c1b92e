use serde::{Deserialize, Serialize};

/// 试卷版式
///
/// 每份试卷只判定一次，决定后续使用哪种解析策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatType {
    /// 申论 + 选择（或选择 + 题组）的综合试卷
    Comprehensive,
    /// 国文类：作文/公文 + 测验
    Mixed,
    /// 题组内以私用区字符作为选项符号
    EmbeddedChoice,
    /// 纯申论
    Essay,
    /// 标准选择题
    StandardChoice,
}

impl FormatType {
    pub fn name(self) -> &'static str {
        match self {
            FormatType::Comprehensive => "comprehensive",
            FormatType::Mixed => "mixed",
            FormatType::EmbeddedChoice => "embedded_choice",
            FormatType::Essay => "essay",
            FormatType::StandardChoice => "standard_choice",
        }
    }
}

impl std::fmt::Display for FormatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
