//! 题目切分模块（业务能力层）
//!
//! 对提取出的纯文本做单次前向行扫描，产出结构化的选择题/简答题
//! 记录。输入格式不规整时产出空列表而不是报错——错误留给上游的
//! I/O 和解码层。

pub mod patterns;
pub mod policy;
mod scan;

use tracing::debug;

use crate::models::{DocumentExtractionResult, ShortAnswerRecord};

use patterns::SegmenterPatterns;
use policy::{DefaultTemplatePolicy, QuestionTypePolicy};
use scan::LineScanner;

/// 答案卷式简答答案的缺省前瞻窗口（行数）
pub const DEFAULT_LOOKAHEAD_WINDOW: usize = 10;

/// 题目切分器
///
/// 正则在构造时编译一次；`segment` 是文本上的纯函数，同一输入
/// 切分两次结果一致。
pub struct QuestionSegmenter {
    patterns: SegmenterPatterns,
    policy: Box<dyn QuestionTypePolicy>,
    lookahead_window: usize,
}

impl QuestionSegmenter {
    /// 用默认模板策略和默认前瞻窗口创建切分器
    pub fn new() -> Result<Self, regex::Error> {
        Self::with_policy(
            Box::new(DefaultTemplatePolicy::default()),
            DEFAULT_LOOKAHEAD_WINDOW,
        )
    }

    /// 用调用方提供的题型策略和前瞻窗口创建切分器
    pub fn with_policy(
        policy: Box<dyn QuestionTypePolicy>,
        lookahead_window: usize,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            patterns: SegmenterPatterns::new()?,
            policy,
            lookahead_window,
        })
    }

    /// 切分一份文档的纯文本
    ///
    /// `is_answer_sheet_hint` 来自调用方的启发式（通常按文件名判断）；
    /// 文本里出现答案卷标志短语时会就地升级该提示。
    pub fn segment(&self, text: &str, is_answer_sheet_hint: bool) -> DocumentExtractionResult {
        let is_answer_sheet =
            is_answer_sheet_hint || self.patterns.answer_sheet_markers.is_match(text);

        let scanner = LineScanner::new(
            &self.patterns,
            self.policy.as_ref(),
            self.lookahead_window,
            is_answer_sheet,
        );
        let (mcqs, mut shorts) = scanner.run(text);

        // 兜底：学生卷一道简答都没切出来时，说明自由文本和逐行扫描的
        // 假设对不上，改为对 Section B 之后的文本整体切块
        if !is_answer_sheet && shorts.is_empty() {
            shorts = self.fallback_short_pass(text);
            if !shorts.is_empty() {
                debug!("兜底重扫提取到 {} 道简答题", shorts.len());
            }
        }

        shorts.sort_by_key(|r| r.question_number);

        DocumentExtractionResult {
            mcqs,
            short_questions: shorts,
            is_answer_sheet,
            extracted_text: text.to_string(),
            error: None,
        }
    }

    /// Section B 之后的整体重扫
    ///
    /// regex 不支持前瞻断言，这里先定位所有题号行再按块切片：
    /// 题号行的剩余部分作为题干，到下一个题号行之前的全部文本作为答案。
    fn fallback_short_pass(&self, text: &str) -> Vec<ShortAnswerRecord> {
        let Some(marker) = self.patterns.section_b_marker.find(text) else {
            return Vec::new();
        };
        let tail = &text[marker.end()..];

        let heads: Vec<(usize, usize, u32)> = self
            .patterns
            .fallback_question_header
            .captures_iter(tail)
            .filter_map(|c| {
                let whole = c.get(0)?;
                let qn = c.get(1)?.as_str().parse::<u32>().ok()?;
                Some((whole.start(), whole.end(), qn))
            })
            .collect();

        let mut records = Vec::new();
        for (idx, &(_, head_end, qn)) in heads.iter().enumerate() {
            let block_end = heads.get(idx + 1).map(|h| h.0).unwrap_or(tail.len());
            let block = &tail[head_end..block_end];

            let mut block_lines = block.lines();
            let mut question_text = block_lines.next().unwrap_or("").trim().to_string();
            let marks = self.patterns.strip_marks(&mut question_text);
            let answer = block_lines
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join("\n");

            records.push(ShortAnswerRecord {
                question_number: qn,
                question_text: if question_text.is_empty() {
                    None
                } else {
                    Some(question_text)
                },
                section: Some("B".to_string()),
                answer,
                marks,
            });
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::policy::{ClassifyContext, QuestionKind};
    use super::*;

    fn segmenter() -> QuestionSegmenter {
        QuestionSegmenter::new().unwrap()
    }

    #[test]
    fn test_answer_sheet_mcq_key_line() {
        // 答案卷里带 "MCQ Answers" 标记的直接答案行
        let text = "Special Answer Sheet\nMCQ Answers\nQ1: c) Paris (5 marks)\n";
        let result = segmenter().segment(text, false);

        assert!(result.is_answer_sheet, "标志短语应升级答案卷提示");
        assert_eq!(result.mcqs.len(), 1);
        let record = &result.mcqs[0];
        assert_eq!(record.question_number, 1);
        assert_eq!(record.correct_answer.as_deref(), Some("C"));
        assert_eq!(record.answer_text.as_deref(), Some("Paris"));
        assert_eq!(record.marks, Some(5.0));
    }

    #[test]
    fn test_short_answer_accumulation_closes_before_next_header() {
        let text = "4. Explain photosynthesis. (10 marks)\n\
                    Plants convert sunlight into energy.\n\
                    Chlorophyll absorbs the light.\n\
                    5. Describe the water cycle. (10 marks)\n\
                    Evaporation and condensation.\n";
        let result = segmenter().segment(text, false);

        assert_eq!(result.short_questions.len(), 2);
        let q4 = &result.short_questions[0];
        assert_eq!(q4.question_number, 4);
        assert_eq!(q4.marks, Some(10.0));
        assert_eq!(
            q4.answer,
            "Plants convert sunlight into energy.\nChlorophyll absorbs the light."
        );
        assert_eq!(result.short_questions[1].question_number, 5);
    }

    #[test]
    fn test_blank_line_does_not_merge_questions() {
        let text = "4. First question. (5 marks)\n\
                    answer four\n\
                    \n\
                    5. Second question. (5 marks)\n\
                    answer five\n";
        let result = segmenter().segment(text, false);

        assert_eq!(result.short_questions.len(), 2);
        assert_eq!(result.short_questions[0].answer, "answer four");
        assert_eq!(result.short_questions[1].answer, "answer five");
    }

    #[test]
    fn test_segment_is_idempotent() {
        let text = "Section A: Multiple Choice Questions\n\
                    1. Capital of France? (1 mark)\n\
                    A) Paris\nB) London\nAnswer: A\n\
                    Section B: Short Answer Questions\n\
                    4. Explain gravity. (10 marks)\n\
                    Mass attracts mass.\n";
        let first = segmenter().segment(text, false);
        let second = segmenter().segment(text, false);
        assert_eq!(first.mcqs, second.mcqs);
        assert_eq!(first.short_questions, second.short_questions);
    }

    #[test]
    fn test_mcq_with_options_and_selected_answer() {
        let text = "Section A: Multiple Choice Questions\n\
                    1. Capital of France? (1 mark)\n\
                    A) Paris\n(2) London\nC: Rome\n\
                    Answer: a\n";
        let result = segmenter().segment(text, false);

        assert_eq!(result.mcqs.len(), 1);
        let record = &result.mcqs[0];
        assert_eq!(record.question_text.as_deref(), Some("Capital of France?"));
        assert_eq!(record.section.as_deref(), Some("A"));
        assert_eq!(record.marks, Some(1.0));
        // 数字 2 作为 B 的别名
        let labels: Vec<&str> = record.options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", "C"]);
        // 学生卷上行内答案归属 selected_answer
        assert_eq!(record.selected_answer.as_deref(), Some("A"));
        assert_eq!(record.correct_answer, None);
    }

    #[test]
    fn test_inline_answer_on_answer_sheet_goes_to_correct() {
        let text = "Special Answer Sheet\n\
                    Section A: Multiple Choice Questions\n\
                    1. Capital of France?\n\
                    Answer: b\n";
        let result = segmenter().segment(text, false);
        assert_eq!(result.mcqs.len(), 1);
        assert_eq!(result.mcqs[0].correct_answer.as_deref(), Some("B"));
        assert_eq!(result.mcqs[0].selected_answer, None);
    }

    #[test]
    fn test_question_number_heuristic_splits_types() {
        // 没有任何区段信息时，前三题按选择题处理，其余按简答
        let text = "1. First?\n2. Second?\n3. Third?\n4. Fourth?\nsome answer\n";
        let result = segmenter().segment(text, false);
        let mcq_numbers: Vec<u32> = result.mcqs.iter().map(|r| r.question_number).collect();
        assert_eq!(mcq_numbers, vec![1, 2, 3]);
        assert_eq!(result.short_questions.len(), 1);
        assert_eq!(result.short_questions[0].question_number, 4);
    }

    #[test]
    fn test_marks_first_match_wins() {
        let text = "4. Question header without marks\n\
                    body with (3 marks) inside\n\
                    trailing line (7 marks)\n";
        let result = segmenter().segment(text, false);
        assert_eq!(result.short_questions.len(), 1);
        let record = &result.short_questions[0];
        // 第一次出现的标注生效，后续的忽略但仍被剥离
        assert_eq!(record.marks, Some(3.0));
        assert_eq!(record.answer, "body with  inside\ntrailing line");
    }

    #[test]
    fn test_short_key_lines_with_bounded_lookahead() {
        let text = "Short Answer Keys\n\
                    Q4: The mitochondria is the powerhouse\n\
                    of the cell and produces energy.\n\
                    Q5: Water evaporates and condenses.\n";
        let result = segmenter().segment(text, true);

        assert_eq!(result.short_questions.len(), 2);
        assert_eq!(
            result.short_questions[0].answer,
            "The mitochondria is the powerhouse\nof the cell and produces energy."
        );
        assert_eq!(result.short_questions[1].answer, "Water evaporates and condenses.");
    }

    #[test]
    fn test_lookahead_window_is_configurable() {
        // 窗口缩小到 1 行，第二条补充行不再被吸收
        let seg = QuestionSegmenter::with_policy(
            Box::new(DefaultTemplatePolicy::default()),
            1,
        )
        .unwrap();
        let text = "Short Answer Keys\n\
                    Q4: first part\n\
                    second part\n\
                    third part\n";
        let result = seg.segment(text, true);
        assert_eq!(result.short_questions.len(), 1);
        assert_eq!(result.short_questions[0].answer, "first part\nsecond part");
    }

    #[test]
    fn test_fallback_pass_for_unstructured_section_b() {
        // 逐行扫描抓不到简答时，对 Section B 之后的文本整体切块。
        // 这里的题号标记都在行中间，逐行的题号行模式一条都不命中。
        let text = "Section B: Short Answer Questions\n\
                    Answers follow. Q4: Explain photosynthesis. (10 marks)\n\
                    Plants convert sunlight. Then Q5: Describe erosion.\n\
                    Wind and water wear down rock.\n";
        let result = segmenter().segment(text, false);

        assert_eq!(result.short_questions.len(), 2);
        let q4 = &result.short_questions[0];
        assert_eq!(q4.question_number, 4);
        assert_eq!(q4.question_text.as_deref(), Some("Explain photosynthesis."));
        assert_eq!(q4.marks, Some(10.0));
        assert_eq!(q4.answer, "Plants convert sunlight. Then");
        let q5 = &result.short_questions[1];
        assert_eq!(q5.question_text.as_deref(), Some("Describe erosion."));
        assert_eq!(q5.answer, "Wind and water wear down rock.");
    }

    #[test]
    fn test_fallback_not_used_when_primary_pass_found_records() {
        let text = "Section B: Short Answer Questions\n\
                    4. Explain photosynthesis.\n\
                    Plants convert sunlight.\n";
        let result = segmenter().segment(text, false);
        // 主扫描已产出记录，兜底不叠加
        assert_eq!(result.short_questions.len(), 1);
        assert_eq!(result.short_questions[0].answer, "Plants convert sunlight.");
    }

    #[test]
    fn test_short_records_sorted_by_question_number() {
        let text = "Short Answer Keys\nQ6: six\nQ4: four\nQ5: five\n";
        let result = segmenter().segment(text, true);
        let numbers: Vec<u32> = result
            .short_questions
            .iter()
            .map(|r| r.question_number)
            .collect();
        assert_eq!(numbers, vec![4, 5, 6]);
    }

    #[test]
    fn test_end_of_input_duplicate_discarded() {
        // 末尾重复题号的打开记录在收尾关闭时被丢弃
        let text = "4. Explain gravity.\nfirst answer\n\
                    5. Next question.\nanswer five\n\
                    4. Explain gravity again.\nduplicate answer\n";
        let result = segmenter().segment(text, false);
        let numbers: Vec<u32> = result
            .short_questions
            .iter()
            .map(|r| r.question_number)
            .collect();
        assert_eq!(numbers, vec![4, 5]);
    }

    #[test]
    fn test_unstructured_text_yields_empty_lists() {
        let result = segmenter().segment("just some prose\nwith no structure at all\n", false);
        assert!(result.mcqs.is_empty());
        assert!(result.short_questions.is_empty());
    }

    #[test]
    fn test_custom_policy_is_injectable() {
        struct AllMcq;
        impl QuestionTypePolicy for AllMcq {
            fn classify(&self, _ctx: &ClassifyContext<'_>) -> QuestionKind {
                QuestionKind::Mcq
            }
        }
        let seg =
            QuestionSegmenter::with_policy(Box::new(AllMcq), DEFAULT_LOOKAHEAD_WINDOW).unwrap();
        let result = seg.segment("7. Would be short by default\n", false);
        assert_eq!(result.mcqs.len(), 1);
        assert!(result.short_questions.is_empty());
    }
}
