//! 解析策略编排
//!
//! 回退链是一组 `(策略, 最少题数)`，按顺序运行，第一个达到最少题数的结果胜出。
//! 策略报错等同于产出 0 题，只记日志，不向上传播。
//! 未采用的结果和策略丢弃的题号都记入 tracker，作为失败尝试。

use serde::Serialize;
use tracing::{info, warn};

use crate::detection::features::has_bracketed_options;
use crate::detection::{EssayDetectionResult, EssayDetector};
use crate::error::ParseError;
use crate::models::{FormatType, Question};
use crate::parsers::{ParserStrategy, Rejection, StrategyOutput};
use crate::workflow::completeness::CompletenessTracker;
use crate::workflow::ParsingContext;

/// 回退链中的一步
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanStep {
    pub strategy: ParserStrategy,
    pub min_viable: usize,
}

/// 某个策略的运行情况
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyAttempt {
    pub strategy: ParserStrategy,
    pub produced: usize,
    pub viable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 产出的题号
    #[serde(skip)]
    pub numbers: Vec<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<Rejection>,
}

/// 回退链的运行结果
#[derive(Debug, Clone, Default)]
pub struct PlanOutcome {
    pub questions: Vec<Question>,
    pub strategy_used: Option<ParserStrategy>,
    pub attempts: Vec<StrategyAttempt>,
}

/// 回退链
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackPlan {
    pub steps: Vec<PlanStep>,
}

impl FallbackPlan {
    /// 按版式生成回退链
    ///
    /// 专用版式只有一个策略，有结果即可；标准选择题：
    /// - 没有 (A)(B) 标签：直接走无标签策略
    /// - 否则：智能 → 基线 → 无标签
    pub fn for_format(format: FormatType, has_labels: bool, ctx: &ParsingContext) -> Self {
        if let Some(strategy) = ParserStrategy::dedicated_for(format) {
            return Self {
                steps: vec![PlanStep {
                    strategy,
                    min_viable: 1,
                }],
            };
        }

        let step = |strategy| PlanStep {
            strategy,
            min_viable: ctx.min_viable_questions,
        };
        let steps = if has_labels {
            vec![
                step(ParserStrategy::Intelligent),
                step(ParserStrategy::Standard),
                step(ParserStrategy::NoLabel),
            ]
        } else {
            vec![step(ParserStrategy::NoLabel)]
        };
        Self { steps }
    }

    /// 依次运行，第一个达标的结果提前返回
    pub fn evaluate<F>(&self, mut run: F) -> PlanOutcome
    where
        F: FnMut(ParserStrategy) -> Result<StrategyOutput, ParseError>,
    {
        let mut outcome = PlanOutcome::default();

        for step in &self.steps {
            let (output, error) = match run(step.strategy) {
                Ok(output) => (output, None),
                Err(e) => {
                    warn!("策略 {} 执行失败，按 0 题处理: {}", step.strategy, e);
                    (StrategyOutput::default(), Some(e.to_string()))
                }
            };
            let StrategyOutput {
                questions,
                rejected,
            } = output;
            let viable = questions.len() >= step.min_viable;
            outcome.attempts.push(StrategyAttempt {
                strategy: step.strategy,
                produced: questions.len(),
                viable,
                error,
                numbers: questions.iter().map(|q| q.number).collect(),
                rejected,
            });

            if viable {
                outcome.questions = questions;
                outcome.strategy_used = Some(step.strategy);
                return outcome;
            }
        }
        outcome
    }
}

/// 编排结果
#[derive(Debug, Clone)]
pub struct EnsembleOutcome {
    pub questions: Vec<Question>,
    pub strategy_used: Option<ParserStrategy>,
    pub attempts: Vec<StrategyAttempt>,
    /// 标准选择题会先做申论检测，结果留作诊断
    pub diagnostic: Option<EssayDetectionResult>,
    /// 是否因为申论置信度过高而跳过了选择题解析
    pub gated: bool,
}

pub struct ParserEnsemble<'a> {
    ctx: &'a ParsingContext,
}

impl<'a> ParserEnsemble<'a> {
    pub fn new(ctx: &'a ParsingContext) -> Self {
        Self { ctx }
    }

    /// 按版式解析，并把结果登记到 tracker
    pub fn parse(
        &self,
        text: &str,
        format: FormatType,
        tracker: &mut CompletenessTracker,
    ) -> EnsembleOutcome {
        let mut diagnostic = None;

        if format == FormatType::StandardChoice {
            let detection = EssayDetector::new(&self.ctx.essay).detect(text);
            if detection.confidence >= self.ctx.essay.gate_threshold {
                info!("判定为申论题，跳过选择题解析: {}", detection.reason);
                tracker.record_strategy_failure("essay_gate", detection.reason.clone());
                return EnsembleOutcome {
                    questions: Vec::new(),
                    strategy_used: None,
                    attempts: Vec::new(),
                    diagnostic: Some(detection),
                    gated: true,
                };
            }
            diagnostic = Some(detection);
        }

        let plan = FallbackPlan::for_format(format, has_bracketed_options(text), self.ctx);
        let outcome = plan.evaluate(|strategy| strategy.run(text, self.ctx));
        record_outcome(&outcome, tracker);

        match outcome.strategy_used {
            Some(strategy) => {
                info!("使用策略 {} 解析出 {} 题", strategy, outcome.questions.len());
            }
            None => match &diagnostic {
                Some(d) => warn!("所有策略都未能解析出足够的题目；申论检测: {}", d.reason),
                None => warn!("策略 {:?} 未能解析出题目", plan.steps),
            },
        }

        EnsembleOutcome {
            questions: outcome.questions,
            strategy_used: outcome.strategy_used,
            attempts: outcome.attempts,
            diagnostic,
            gated: false,
        }
    }
}

/// 把回退链的每次尝试记入 tracker：丢弃的题号、未采用结果里的题号记为失败，胜出结果登记
fn record_outcome(outcome: &PlanOutcome, tracker: &mut CompletenessTracker) {
    for attempt in &outcome.attempts {
        let name = attempt.strategy.name();
        for rejection in &attempt.rejected {
            tracker.record_attempt(rejection.number, name, false, Some(rejection.reason.clone()));
        }
        if attempt.viable {
            continue;
        }

        let reason = match &attempt.error {
            Some(e) => e.clone(),
            None => format!("只产出 {} 题", attempt.produced),
        };
        for &number in &attempt.numbers {
            tracker.record_attempt(number, name, false, Some(format!("{}，结果未采用", reason)));
        }
        tracker.record_strategy_failure(name, reason);
    }

    if let Some(strategy) = outcome.strategy_used {
        for question in &outcome.questions {
            tracker.register(question.number, strategy.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions(n: u32) -> StrategyOutput {
        (1..=n)
            .map(|i| Question::choice(i, format!("第{}題題目內容", i), vec![]))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_plan_for_labelled_standard_paper() {
        let ctx = ParsingContext::default();
        let plan = FallbackPlan::for_format(FormatType::StandardChoice, true, &ctx);
        let order: Vec<_> = plan.steps.iter().map(|s| s.strategy).collect();
        assert_eq!(
            order,
            vec![
                ParserStrategy::Intelligent,
                ParserStrategy::Standard,
                ParserStrategy::NoLabel
            ]
        );
        assert!(plan.steps.iter().all(|s| s.min_viable == 2));
    }

    #[test]
    fn test_plan_without_labels_goes_straight_to_no_label() {
        let ctx = ParsingContext::default();
        let plan = FallbackPlan::for_format(FormatType::StandardChoice, false, &ctx);
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].strategy, ParserStrategy::NoLabel);
    }

    #[test]
    fn test_evaluate_falls_back_until_viable() {
        let ctx = ParsingContext::default();
        let plan = FallbackPlan::for_format(FormatType::StandardChoice, true, &ctx);
        let mut calls = Vec::new();
        let outcome = plan.evaluate(|strategy| {
            calls.push(strategy);
            match strategy {
                ParserStrategy::Intelligent => Err(ParseError::InvalidNumber { raw: "x".into() }),
                ParserStrategy::Standard => Ok(questions(1)),
                _ => Ok(questions(3)),
            }
        });
        assert_eq!(calls.len(), 3);
        assert_eq!(outcome.strategy_used, Some(ParserStrategy::NoLabel));
        assert_eq!(outcome.questions.len(), 3);
        assert!(outcome.attempts[0].error.is_some());
        assert!(!outcome.attempts[1].viable);
    }

    #[test]
    fn test_evaluate_stops_early() {
        let ctx = ParsingContext::default();
        let plan = FallbackPlan::for_format(FormatType::StandardChoice, true, &ctx);
        let mut calls = 0;
        let outcome = plan.evaluate(|_| {
            calls += 1;
            Ok(questions(5))
        });
        assert_eq!(calls, 1);
        assert_eq!(outcome.strategy_used, Some(ParserStrategy::Intelligent));
    }

    #[test]
    fn test_evaluate_total_failure_is_empty() {
        let plan = FallbackPlan::for_format(FormatType::Essay, false, &ParsingContext::default());
        let outcome = plan.evaluate(|_| Ok(StrategyOutput::default()));
        assert!(outcome.questions.is_empty());
        assert_eq!(outcome.strategy_used, None);
        assert_eq!(outcome.attempts.len(), 1);
    }

    #[test]
    fn test_unused_attempt_is_recorded_as_failure() {
        let ctx = ParsingContext::default();
        let plan = FallbackPlan::for_format(FormatType::StandardChoice, true, &ctx);
        let outcome = plan.evaluate(|strategy| match strategy {
            ParserStrategy::Intelligent => Ok(questions(1)),
            _ => Ok(questions(3)),
        });
        assert_eq!(outcome.strategy_used, Some(ParserStrategy::Standard));

        let mut tracker = CompletenessTracker::new("卷");
        record_outcome(&outcome, &mut tracker);

        let history: Vec<_> = tracker
            .status(1)
            .unwrap()
            .attempts
            .iter()
            .map(|a| (a.parser.as_str(), a.success))
            .collect();
        assert_eq!(history, vec![("intelligent", false), ("standard", true)]);
        assert_eq!(tracker.status(2).unwrap().attempts.len(), 1);

        let report = tracker.end_scan();
        assert!(report.failed_attempts >= 1);
        assert!(report.is_complete);
        assert_eq!(report.strategy_failures.len(), 1);
        assert_eq!(report.strategy_failures[0].parser, "intelligent");
    }

    #[test]
    fn test_rejected_numbers_are_recorded() {
        let plan = FallbackPlan::for_format(FormatType::Essay, false, &ParsingContext::default());
        let outcome = plan.evaluate(|_| {
            let mut output = questions(2);
            output.reject(3, "内容过短");
            Ok(output)
        });

        let mut tracker = CompletenessTracker::new("卷");
        record_outcome(&outcome, &mut tracker);

        let attempts = &tracker.status(3).unwrap().attempts;
        assert_eq!(attempts.len(), 1);
        assert!(!attempts[0].success);
        assert_eq!(attempts[0].error.as_deref(), Some("内容过短"));
        assert!(!tracker.status(3).unwrap().scanned);
    }

    #[test]
    fn test_essay_gate_skips_choice_parsing() {
        let ctx = ParsingContext::default();
        let text = "一、試述行政處分之意義。（25分）\n二、何謂比例原則？請舉例說明。（25分）\n三、試分析信賴保護原則。（25分）\n四、試比較法規命令與行政規則。（25分）";
        let mut tracker = CompletenessTracker::new("卷");
        let outcome =
            ParserEnsemble::new(&ctx).parse(text, FormatType::StandardChoice, &mut tracker);
        assert!(outcome.gated);
        assert!(outcome.questions.is_empty());
        assert!(outcome.diagnostic.unwrap().is_essay);
    }

    #[test]
    fn test_standard_paper_registers_questions() {
        let ctx = ParsingContext::default();
        let text = "1. 下列何者為行政處分？(A)甲 (B)乙 (C)丙 (D)丁\n2. 下列何者為法規命令？(A)甲 (B)乙 (C)丙 (D)丁\n";
        let mut tracker = CompletenessTracker::new("卷");
        let outcome =
            ParserEnsemble::new(&ctx).parse(text, FormatType::StandardChoice, &mut tracker);
        assert_eq!(outcome.strategy_used, Some(ParserStrategy::Intelligent));
        assert!(!outcome.gated);
        let report = tracker.end_scan();
        assert!(report.is_complete);
        assert_eq!(report.parser_usage.get("intelligent"), Some(&2));
    }
}
