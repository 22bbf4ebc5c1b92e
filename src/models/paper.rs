use std::path::Path;

/// 一份待解析的试卷
///
/// 文本由外部的 PDF 抽取工具产生，这里只当作不透明字符串
#[derive(Debug, Clone, Default)]
pub struct PaperInput {
    /// 试卷名称（文件名去掉扩展名）
    pub name: String,
    /// 原始文件路径，只用于版式判断的文件名提示
    pub file_path: String,
    pub text: String,
    /// 对应的答案文本（可能不存在）
    pub answer_text: Option<String>,
}

impl PaperInput {
    pub fn new(file_path: impl Into<String>, text: impl Into<String>) -> Self {
        let file_path = file_path.into();
        let name = Path::new(&file_path)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            name,
            file_path,
            text: text.into(),
            answer_text: None,
        }
    }

    pub fn with_answer_text(mut self, answer_text: impl Into<String>) -> Self {
        self.answer_text = Some(answer_text.into());
        self
    }

    /// 用于版式判断的文件名
    pub fn file_name(&self) -> String {
        Path::new(&self.file_path)
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}
