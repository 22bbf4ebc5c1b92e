//! 单份试卷处理器 - 编排层
//!
//! 一份试卷的完整流程：
//! 1. 版式分类
//! 2. 按版式编排解析策略（含申论检测）
//! 3. 完整性检查
//! 4. 抽取答案并合并到题目上
//!
//! 整个流程是同步的，批处理层把它放到 `spawn_blocking` 里运行。

use serde::Serialize;
use tracing::{info, warn};

use crate::answers::AnswerSet;
use crate::detection::{EssayDetectionResult, FormatClassifier};
use crate::models::{FormatType, PaperInput, Question};
use crate::parsers::ParserStrategy;
use crate::utils::logging::truncate_text;
use crate::workflow::{CompletenessTracker, ParserEnsemble, ParsingContext, ScanReport, StrategyAttempt};

/// 单份试卷的解析结果（序列化后写成 JSON）
#[derive(Debug, Clone, Serialize)]
pub struct PaperResult {
    pub paper: String,
    pub source_file: String,
    pub format: FormatType,
    pub strategy_used: Option<ParserStrategy>,
    pub questions: Vec<Question>,
    pub answers: AnswerSet,
    /// 有最终答案的题数
    pub answered: usize,
    pub attempts: Vec<StrategyAttempt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub essay_detection: Option<EssayDetectionResult>,
    /// 是否因申论置信度过高跳过了选择题解析
    pub gated: bool,
    pub report: ScanReport,
}

impl PaperResult {
    /// 需要人工检查时返回原因
    pub fn warning(&self) -> Option<String> {
        if self.questions.is_empty() {
            let reason = match &self.essay_detection {
                Some(d) => format!("未解析出任何题目（{}）", d.reason),
                None => "未解析出任何题目".to_string(),
            };
            return Some(reason);
        }
        (!self.report.is_complete).then(|| self.report.summary())
    }
}

/// 处理单份试卷
pub fn process_paper(paper: &PaperInput, ctx: &ParsingContext) -> PaperResult {
    log_paper_start(&paper.name, paper.text.chars().count());

    let format = FormatClassifier::new(ctx).classify(&paper.text, &paper.file_name());
    info!("[试卷 {}] 版式: {}", paper.name, format);

    let mut tracker = CompletenessTracker::new(paper.name.clone());
    let outcome = ParserEnsemble::new(ctx).parse(&paper.text, format, &mut tracker);
    let report = tracker.end_scan();

    let mut questions = outcome.questions;
    let answers = match &paper.answer_text {
        Some(text) => AnswerSet::from_text(text),
        None => AnswerSet::default(),
    };
    if paper.answer_text.is_some() && answers.is_empty() {
        warn!("[试卷 {}] 答案文本中没有识别出任何答案", paper.name);
    }
    let answered = answers.apply(&mut questions);
    if !answers.is_empty() && answered < questions.len() {
        warn!(
            "[试卷 {}] 有 {} 题没有对应答案",
            paper.name,
            questions.len() - answered
        );
    }

    let result = PaperResult {
        paper: paper.name.clone(),
        source_file: paper.file_path.clone(),
        format,
        strategy_used: outcome.strategy_used,
        questions,
        answers,
        answered,
        attempts: outcome.attempts,
        essay_detection: outcome.diagnostic,
        gated: outcome.gated,
        report,
    };
    log_paper_complete(&result);
    result
}

// ========== 日志辅助函数 ==========

fn log_paper_start(name: &str, char_count: usize) {
    info!("[试卷 {}] 开始解析，共 {} 个字符", name, char_count);
}

fn log_paper_complete(result: &PaperResult) {
    if let Some(first) = result.questions.first() {
        info!(
            "[试卷 {}] 第一题: {}",
            result.paper,
            truncate_text(&first.text, 30)
        );
    }
    info!(
        "[试卷 {}] 题目统计: 共 {} 题，有答案 {} 题，{}",
        result.paper,
        result.questions.len(),
        result.answered,
        result.report.summary()
    );
    match result.warning() {
        Some(reason) => warn!("[试卷 {}] ⚠️ {}", result.paper, reason),
        None => info!("[试卷 {}] ✅ 解析完成", result.paper),
    }
}
