//! # Exam Paper Parser
//!
//! 把考试试卷 PDF 抽取出的文本解析成结构化题目，并与答案表合并
//!
//! ## 架构设计
//!
//! ### ① 检测层（Detection）
//! - `detection/features` - 无状态的版式特征扫描
//! - `FormatClassifier` - 判定试卷版式
//! - `EssayDetector` - 申论题置信度
//!
//! ### ② 解析策略层（Parsers）
//! - `ParserStrategy` - 标准 / 智能 / 题组 / 嵌入式 / 无标签 / 申论 / 综合
//!
//! ### ③ 答案层（Answers）
//! - `extract_answers` / `extract_corrected_answers` - 表格与行内答案
//! - `merge_answers` / `AnswerSet` - 更正答案优先
//!
//! ### ④ 流程层（Workflow）
//! - `ParsingContext` - 所有阈值，显式传入
//! - `ParserEnsemble` - 按版式运行回退链
//! - `CompletenessTracker` - 缺号、重号检查
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/paper_processor` - 单份试卷
//! - `orchestrator/batch_processor` - 批量处理、并发控制、结果输出

pub mod answers;
pub mod config;
pub mod detection;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod parsers;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use answers::{extract_answers, extract_corrected_answers, merge_answers, AnswerSet};
pub use config::Config;
pub use detection::{EssayDetectionResult, EssayDetector, FormatClassifier};
pub use error::{AppError, AppResult};
pub use models::{AnswerMap, FormatType, PaperInput, Question, QuestionType};
pub use orchestrator::{process_paper, App, PaperResult, ProcessingStats};
pub use parsers::ParserStrategy;
pub use workflow::{CompletenessTracker, ParserEnsemble, ParsingContext, ScanReport};
