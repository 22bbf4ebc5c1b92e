//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量试卷处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载试卷文本与答案
//! - 控制并发数量（Semaphore），每份试卷一个阻塞任务
//! - 输出 JSON、warn 文件和全局统计
//!
//! ### `paper_processor` - 单份试卷处理器
//! - 版式分类 → 策略编排 → 完整性检查 → 答案合并
//! - 同步执行，不做 I/O
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<PaperInput>)
//!     ↓
//! paper_processor (处理一份试卷)
//!     ↓
//! workflow::ParserEnsemble / CompletenessTracker
//!     ↓
//! detection / parsers / answers
//! ```

pub mod batch_processor;
pub mod paper_processor;

pub use batch_processor::{App, ProcessingStats};
pub use paper_processor::{process_paper, PaperResult};
