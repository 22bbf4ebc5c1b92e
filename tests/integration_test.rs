use exam_paper_parser::detection::EssayDetector;
use exam_paper_parser::models::AnswerMap;
use exam_paper_parser::{
    extract_answers, merge_answers, process_paper, CompletenessTracker, FormatClassifier,
    FormatType, PaperInput, ParserEnsemble, ParserStrategy, ParsingContext, QuestionType,
};

fn init_logging() {
    let _ = tracing_subscriber::fmt::try_init();
}

fn standard_paper(n: u32) -> String {
    (1..=n)
        .map(|i| {
            format!(
                "{}. 依行政程序法規定，下列第{}項敘述何者正確？(A)甲說 (B)乙說 (C)丙說 (D)丁說",
                i, i
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn map(entries: &[(&str, &str)]) -> AnswerMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_standard_paper_is_complete() {
    init_logging();
    let ctx = ParsingContext::default();
    let text = standard_paper(40);

    let format = FormatClassifier::new(&ctx).classify(&text, "行政法.txt");
    assert_eq!(format, FormatType::StandardChoice);

    let mut tracker = CompletenessTracker::new("行政法");
    let outcome = ParserEnsemble::new(&ctx).parse(&text, format, &mut tracker);
    let numbers: Vec<u32> = outcome.questions.iter().map(|q| q.number).collect();
    assert_eq!(numbers, (1..=40).collect::<Vec<_>>());

    let report = tracker.end_scan();
    assert!(report.is_complete);
    assert!(report.missing.is_empty());
    assert!(report.duplicates.is_empty());
}

#[test]
fn test_standard_paper_with_notice_block() {
    init_logging();
    let ctx = ParsingContext::default();
    for n in [3, 20] {
        let text = format!(
            "注意：\n一、本試題為單一選擇題，請選出一個正確或最適當的答案。\n二、本科目共{}題，每題須用2B鉛筆在試卡上依題號清楚劃記。\n三、禁止使用電子計算器。\n{}",
            n,
            standard_paper(n)
        );
        let paper = PaperInput::new("行政法.txt", text);
        let result = process_paper(&paper, &ctx);

        assert_eq!(result.format, FormatType::StandardChoice, "{} 題", n);
        assert!(!result.gated);
        assert_eq!(result.questions.len(), n as usize);
        assert!(result
            .questions
            .iter()
            .all(|q| q.question_type == QuestionType::Choice && q.options.len() == 4));
        assert!(result.report.is_complete);
    }
}

#[test]
fn test_parse_is_deterministic() {
    let ctx = ParsingContext::default();
    let text = format!(
        "{}\n請依下文回答第41題至第42題\n某機關作成處分。\n41. 依上文，下列何者正確？(A)甲 (B)乙 (C)丙 (D)丁\n42. 依上文，下列何者錯誤？(A)甲 (B)乙 (C)丙 (D)丁\n",
        standard_paper(40)
    );

    let run = || {
        let mut tracker = CompletenessTracker::new("卷");
        ParserEnsemble::new(&ctx)
            .parse(&text, FormatType::StandardChoice, &mut tracker)
            .questions
    };
    let first = run();
    assert_eq!(first.len(), 42);
    assert_eq!(first, run());
}

#[test]
fn test_essay_detector_monotonic_in_keywords() {
    let ctx = ParsingContext::default();
    let detector = EssayDetector::new(&ctx.essay);
    let mut text = "一、行政處分之意義為何？（25分）".to_string();
    let mut previous = detector.detect(&text).confidence;
    for keyword in ["試述", "試說明", "試分析", "何謂", "試比較", "試論"] {
        text.push_str(keyword);
        let current = detector.detect(&text).confidence;
        assert!(current >= previous, "{} < {}", current, previous);
        previous = current;
    }
}

#[test]
fn test_merge_answers_properties() {
    assert_eq!(
        merge_answers(&map(&[("1", "A"), ("2", "B")]), &map(&[("1", "C")])),
        map(&[("1", "C"), ("2", "B")])
    );
    assert_eq!(merge_answers(&AnswerMap::new(), &AnswerMap::new()), AnswerMap::new());
}

#[test]
fn test_essay_and_choice_sections_classify_as_comprehensive() {
    let ctx = ParsingContext::default();
    let classifier = FormatClassifier::new(&ctx);
    let text = "申論題部分\n一、試述行政處分之意義。（25分）\n選擇題部分\n1. 下列何者正確？(A)甲 (B)乙";
    assert_eq!(classifier.classify(text, "行政法.txt"), FormatType::Comprehensive);
    // 文件名提示国文时也不会被判成申论或标准选择题
    assert_eq!(classifier.classify(text, "國文.txt"), FormatType::Comprehensive);
}

#[test]
fn test_fifteen_cloze_lines() {
    let text = [
        "apple banana cherry grape",
        "run runs ran running",
        "go goes went gone",
        "eat eats ate eaten",
        "big bigger biggest large",
        "in on at by",
        "who whom whose which",
        "can could may might",
        "one two three four",
        "red blue green yellow",
        "cat dog bird fish",
        "up down left right",
        "slow fast quick rapid",
        "sun moon star sky",
        "hot cold warm cool",
    ]
    .join("\n");

    let questions = ParserStrategy::NoLabel
        .run(&text, &ParsingContext::default())
        .unwrap()
        .questions;
    assert_eq!(questions.len(), 15);
    assert!(questions.iter().all(|q| q.is_group_member));
    assert!(questions
        .iter()
        .all(|q| q.question_type == QuestionType::FillBlank && q.options.len() == 4));
    assert_eq!(questions[5].options, vec!["in", "on", "at", "by"]);
}

#[test]
fn test_group_51_to_60() {
    let mut text = "請依下文回答第51題至第60題\n某甲向主管機關申請建築執照，主管機關以不符法規為由駁回。\n".to_string();
    for n in 51..=60 {
        text.push_str(&format!(
            "{}. 依上文，下列敘述何者正確？(A)甲說法 (B)乙說法 (C)丙說法 (D)丁說法\n",
            n
        ));
    }

    let questions = ParserStrategy::QuestionGroup
        .run(&text, &ParsingContext::default())
        .unwrap()
        .questions;
    assert_eq!(questions.len(), 10);
    assert!(questions
        .iter()
        .all(|q| q.group_id.as_deref() == Some("51-60")));
    assert_eq!(
        questions.iter().map(|q| q.number).collect::<Vec<_>>(),
        (51..=60).collect::<Vec<_>>()
    );
}

#[test]
fn test_tabular_answer_key() {
    let answers = extract_answers("第1題 第2題 第3題\n答案 A B C\n");
    assert_eq!(answers, map(&[("1", "A"), ("2", "B"), ("3", "C")]));
}

#[test]
fn test_comprehensive_paper_end_to_end() {
    init_logging();
    let text = "甲、申論題部分\n一、試述行政處分之意義及其要件。（25分）\n二、何謂信賴保護原則？請舉例說明之。（25分）\n乙、測驗題部分\n本測驗為單一選擇題\n1. 下列何者為行政處分？(A)甲案 (B)乙案 (C)丙案 (D)丁案\n2. 下列何者為法規命令？(A)甲案 (B)乙案 (C)丙案 (D)丁案\n3. 下列何者為行政規則？(A)甲案 (B)乙案 (C)丙案 (D)丁案\n";
    let paper = PaperInput::new("行政法.txt", text).with_answer_text("1. B\n2. C\n3. D\n更正 3. A\n");

    let result = process_paper(&paper, &ParsingContext::default());
    assert_eq!(result.format, FormatType::Comprehensive);
    assert_eq!(result.strategy_used, Some(ParserStrategy::Comprehensive));
    assert_eq!(result.questions.len(), 5);
    assert_eq!(result.questions[3].question_type, QuestionType::Essay);
    assert_eq!(result.questions[3].number, 4);
    assert_eq!(result.questions[2].correct_answer, "D");
    assert_eq!(result.questions[2].final_answer, "A");
    assert!(result.report.is_complete);
}

#[test]
fn test_garbage_input_does_not_panic() {
    let ctx = ParsingContext::default();
    for text in ["", "   ", "%%%", "\u{E18C}\u{E18D}", "回答第1題至第999題", "一、\n二、\n1.\n2."] {
        let paper = PaperInput::new("garbled.txt", text);
        let result = process_paper(&paper, &ctx);
        assert!(result.questions.len() <= 2);
    }
}
