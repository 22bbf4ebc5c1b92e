//! 申论题检测
//!
//! 五个特征分别计数、封顶、归一化，按权重相加：
//! 申论关键词、配分标记、中文数字题号为正分；选项标签为扣分；
//! 阿拉伯数字题号行过多时再扣一笔（典型的选择题特征）。

use serde::Serialize;

use crate::detection::features;
use crate::workflow::EssayPolicy;

/// 特征计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EssayFeatures {
    pub essay_keywords: usize,
    pub score_marks: usize,
    pub chinese_headers: usize,
    pub choice_markers: usize,
    pub arabic_lines: usize,
}

impl EssayFeatures {
    pub fn extract(text: &str) -> Self {
        Self {
            essay_keywords: features::count_essay_keywords(text),
            score_marks: features::count_score_marks(text),
            chinese_headers: features::count_chinese_headers(text),
            choice_markers: features::count_option_labels(text),
            arabic_lines: features::count_arabic_numbered_lines(text),
        }
    }
}

/// 检测结果（每次调用新建，不持久化）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EssayDetectionResult {
    pub is_essay: bool,
    /// 置信度 [0, 1]
    pub confidence: f64,
    pub features: EssayFeatures,
    /// 哪些特征影响了判定
    pub reason: String,
}

pub struct EssayDetector<'a> {
    policy: &'a EssayPolicy,
}

impl<'a> EssayDetector<'a> {
    pub fn new(policy: &'a EssayPolicy) -> Self {
        Self { policy }
    }

    pub fn detect(&self, text: &str) -> EssayDetectionResult {
        if text.trim().is_empty() {
            return EssayDetectionResult {
                is_essay: false,
                confidence: 0.0,
                features: EssayFeatures::default(),
                reason: "文本为空".to_string(),
            };
        }

        let p = self.policy;
        let f = EssayFeatures::extract(text);
        let mut parts = Vec::new();
        let mut score = 0.0;

        for (label, count, cap, weight) in [
            ("申论关键词", f.essay_keywords, p.keyword_cap, p.keyword_weight),
            ("配分标记", f.score_marks, p.score_mark_cap, p.score_mark_weight),
            ("中文题号", f.chinese_headers, p.header_cap, p.header_weight),
            ("选项标签", f.choice_markers, p.choice_marker_cap, -p.choice_penalty),
        ] {
            if count == 0 {
                continue;
            }
            let delta = weight * count.min(cap) as f64 / cap as f64;
            score += delta;
            parts.push(format!("{} {} 个 ({:+.2})", label, count, delta));
        }

        if f.arabic_lines > p.density_line_threshold {
            score -= p.density_penalty;
            parts.push(format!(
                "阿拉伯数字题号 {} 行 ({:+.2})",
                f.arabic_lines, -p.density_penalty
            ));
        }

        let confidence = score.clamp(0.0, 1.0);
        let is_essay = confidence >= p.essay_threshold;
        if parts.is_empty() {
            parts.push("无明显特征".to_string());
        }

        EssayDetectionResult {
            is_essay,
            confidence,
            features: f,
            reason: format!(
                "{}；置信度 {:.2}{}",
                parts.join("；"),
                confidence,
                if is_essay { "，判定为申论题" } else { "" }
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ESSAY: &str = "一、試述行政處分之意義。（25分）\n二、何謂比例原則？請舉例說明。（25分）\n三、試分析信賴保護原則。（25分）\n四、試比較法規命令與行政規則。（25分）";

    fn choice_paper(n: usize) -> String {
        (1..=n)
            .map(|i| format!("{}. 下列何者正確？(A)甲 (B)乙 (C)丙 (D)丁", i))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_essay_paper_passes_gate() {
        let policy = EssayPolicy::default();
        let result = EssayDetector::new(&policy).detect(ESSAY);
        assert!(result.is_essay);
        assert!(result.confidence >= policy.gate_threshold);
        assert_eq!(result.features.score_marks, 4);
        assert_eq!(result.features.chinese_headers, 4);
        assert!(result.reason.contains("判定为申论题"));
    }

    #[test]
    fn test_choice_paper_is_not_essay() {
        let policy = EssayPolicy::default();
        let result = EssayDetector::new(&policy).detect(&choice_paper(20));
        assert!(!result.is_essay);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.features.arabic_lines, 20);
    }

    #[test]
    fn test_empty_text() {
        let policy = EssayPolicy::default();
        let result = EssayDetector::new(&policy).detect("  ");
        assert!(!result.is_essay);
        assert_eq!(result.reason, "文本为空");
    }

    #[test]
    fn test_monotonic_in_keywords() {
        let policy = EssayPolicy::default();
        let detector = EssayDetector::new(&policy);
        let mut text = choice_paper(3);
        let mut previous = detector.detect(&text).confidence;
        for _ in 0..8 {
            text.push_str("\n試述之");
            let current = detector.detect(&text).confidence;
            assert!(current >= previous);
            previous = current;
        }
    }
}
