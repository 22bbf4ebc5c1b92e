//! 完整性检查
//!
//! 记录每个题号由哪个策略扫描到、尝试了几次、是否重复登记；
//! 扫描结束时计算缺号与重号。只报告，不修正。
//!
//! 每份试卷一个 tracker，`end_scan` 消耗 tracker 本身，结束后不能再登记。

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

/// 单次尝试
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanAttempt {
    pub parser: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

/// 单个题号的扫描状态
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStatus {
    pub scanned: bool,
    /// 第一次成功登记它的策略
    pub parser_used: String,
    pub attempts: Vec<ScanAttempt>,
    pub warnings: Vec<String>,
    /// 成功登记的次数，大于 1 即重号
    pub registrations: usize,
}

/// 整个策略失败（与具体题号无关）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyFailure {
    pub parser: String,
    pub error: String,
}

/// 扫描报告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    pub paper: String,
    pub total_scanned: usize,
    pub min_number: Option<u32>,
    pub max_number: Option<u32>,
    pub missing: Vec<u32>,
    pub duplicates: Vec<u32>,
    pub parser_usage: BTreeMap<String, usize>,
    pub failed_attempts: usize,
    pub strategy_failures: Vec<StrategyFailure>,
    pub is_complete: bool,
    pub statuses: BTreeMap<u32, ScanStatus>,
}

impl ScanReport {
    /// 一行摘要，用于日志和警告文件
    pub fn summary(&self) -> String {
        match (self.min_number, self.max_number) {
            (Some(min), Some(max)) => format!(
                "题号 {}-{}，共 {} 题，缺 {:?}，重复 {:?}",
                min, max, self.total_scanned, self.missing, self.duplicates
            ),
            _ => "未扫描到任何题目".to_string(),
        }
    }
}

pub struct CompletenessTracker {
    paper: String,
    statuses: BTreeMap<u32, ScanStatus>,
    strategy_failures: Vec<StrategyFailure>,
}

fn now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

impl CompletenessTracker {
    pub fn new(paper: impl Into<String>) -> Self {
        Self {
            paper: paper.into(),
            statuses: BTreeMap::new(),
            strategy_failures: Vec::new(),
        }
    }

    /// 记录一次针对某题号的尝试（成功与否都记）
    pub fn record_attempt(&mut self, number: u32, parser: &str, success: bool, error: Option<String>) {
        self.statuses
            .entry(number)
            .or_default()
            .attempts
            .push(ScanAttempt {
                parser: parser.to_string(),
                success,
                error,
                timestamp: now(),
            });
    }

    /// 登记扫描到的题号；重复登记返回 false，不覆盖第一次的结果
    pub fn register(&mut self, number: u32, parser: &str) -> bool {
        self.record_attempt(number, parser, true, None);
        let status = self.statuses.entry(number).or_default();
        status.registrations += 1;

        if !status.scanned {
            status.scanned = true;
            status.parser_used = parser.to_string();
            return true;
        }

        let message = format!(
            "第{}题重复登记：已由 {} 扫描，{} 再次登记",
            number, status.parser_used, parser
        );
        warn!("[试卷 {}] {}", self.paper, message);
        status.warnings.push(message);
        false
    }

    /// 记录整个策略的失败
    pub fn record_strategy_failure(&mut self, parser: &str, error: impl Into<String>) {
        let error = error.into();
        debug!("[试卷 {}] 策略 {} 未采用: {}", self.paper, parser, error);
        self.strategy_failures.push(StrategyFailure {
            parser: parser.to_string(),
            error,
        });
    }

    pub fn status(&self, number: u32) -> Option<&ScanStatus> {
        self.statuses.get(&number)
    }

    /// 结束扫描，计算缺号、重号和各策略使用次数
    pub fn end_scan(self) -> ScanReport {
        let scanned: Vec<u32> = self
            .statuses
            .iter()
            .filter(|(_, s)| s.scanned)
            .map(|(&n, _)| n)
            .collect();
        let min_number = scanned.first().copied();
        let max_number = scanned.last().copied();

        let missing: Vec<u32> = match (min_number, max_number) {
            (Some(min), Some(max)) => (min..=max)
                .filter(|n| !self.statuses.get(n).is_some_and(|s| s.scanned))
                .collect(),
            _ => Vec::new(),
        };
        let duplicates: Vec<u32> = self
            .statuses
            .iter()
            .filter(|(_, s)| s.registrations > 1)
            .map(|(&n, _)| n)
            .collect();

        let mut parser_usage = BTreeMap::new();
        for status in self.statuses.values().filter(|s| s.scanned) {
            *parser_usage.entry(status.parser_used.clone()).or_insert(0) += 1;
        }
        let failed_attempts = self
            .statuses
            .values()
            .flat_map(|s| &s.attempts)
            .filter(|a| !a.success)
            .count();

        let is_complete = !scanned.is_empty() && missing.is_empty() && duplicates.is_empty();
        if !is_complete && !scanned.is_empty() {
            warn!(
                "[试卷 {}] 题号不完整：缺 {:?}，重复 {:?}",
                self.paper, missing, duplicates
            );
        }

        ScanReport {
            paper: self.paper,
            total_scanned: scanned.len(),
            min_number,
            max_number,
            missing,
            duplicates,
            parser_usage,
            failed_attempts,
            strategy_failures: self.strategy_failures,
            is_complete,
            statuses: self.statuses,
        }
    }
}
