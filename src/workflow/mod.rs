//! 流程层：解析上下文、策略编排、完整性检查

pub mod completeness;
pub mod ensemble;
pub mod parsing_ctx;

pub use completeness::{CompletenessTracker, ScanAttempt, ScanReport, ScanStatus, StrategyFailure};
pub use ensemble::{EnsembleOutcome, FallbackPlan, ParserEnsemble, PlanStep, StrategyAttempt};
pub use parsing_ctx::{EssayPolicy, ParsingContext};
