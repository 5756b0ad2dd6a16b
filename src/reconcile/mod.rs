//! 答案核对模块（业务能力层）
//!
//! 把学生卷和答案卷各自的切分结果合并成角色正确、题号唯一的四份
//! 列表。核对从不报错：数据缺失或不一致时降级到哨兵/占位值，让
//! 下游评估照常运行并暴露出"明显不对但存在"的结果，而不是整批
//! 中止。

use std::collections::HashMap;

use regex::Regex;
use tracing::{debug, warn};

use crate::models::{DocumentExtractionResult, McqRecord, ShortAnswerRecord, UNKNOWN_ANSWER};

/// 核对完成的四份列表
#[derive(Debug, Clone)]
pub struct ReconciledLists {
    pub student_mcqs: Vec<McqRecord>,
    pub student_short_questions: Vec<ShortAnswerRecord>,
    pub answer_sheet_mcqs: Vec<McqRecord>,
    pub answer_sheet_short_questions: Vec<ShortAnswerRecord>,
}

/// 答案核对器
pub struct AnswerReconciler {
    mcq_answers_marker: Regex,
    short_keys_marker: Regex,
    mcq_key_pair: Regex,
}

impl AnswerReconciler {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            mcq_answers_marker: Regex::new(r"(?i)mcq answers")?,
            short_keys_marker: Regex::new(r"(?i)short answer keys")?,
            mcq_key_pair: Regex::new(r"(?im)^\s*q(\d+)\s*[:.]\s*([a-d])\b")?,
        })
    }

    /// 核对一对切分结果（学生卷 × 答案卷）
    ///
    /// 纯变换，不修改输入。
    pub fn reconcile(
        &self,
        submission: &DocumentExtractionResult,
        key: &DocumentExtractionResult,
    ) -> ReconciledLists {
        // 1. 各自按首次出现去重
        let mut student_mcqs = dedup_mcqs(&submission.mcqs, "学生卷");
        let mut key_mcqs = dedup_mcqs(&key.mcqs, "答案卷");

        // 2. 角色归一：学生卷只持有 selected_answer，答案卷只持有
        //    correct_answer；切分器归属错误的字段在这里搬正
        for record in &mut student_mcqs {
            if record.correct_answer.is_some() {
                if record.selected_answer.is_none() {
                    record.selected_answer = record.correct_answer.take();
                } else {
                    record.correct_answer = None;
                }
            }
        }
        for record in &mut key_mcqs {
            if record.selected_answer.is_some() {
                if record.correct_answer.is_none() {
                    record.correct_answer = record.selected_answer.take();
                } else {
                    record.selected_answer = None;
                }
            }
        }

        // 3. 兜底第一层：答案卷没切出任何选择题，但原文含 "MCQ Answers"
        //    区段时直接重扫该区段，建一份题号→标准答案的索引
        let key_answer_index = if key_mcqs.is_empty() {
            self.parse_mcq_answers_section(&key.extracted_text)
        } else {
            HashMap::new()
        };

        // 4. 兜底第二层：按学生卷的形状合成答案卷记录；索引里找不到
        //    答案时用显式的 "?" 哨兵，绝不默默猜一个字母
        if key_mcqs.is_empty() && !student_mcqs.is_empty() {
            debug!(
                "答案卷无选择题记录，按学生卷形状合成 {} 条（索引命中 {} 条）",
                student_mcqs.len(),
                key_answer_index.len()
            );
            key_mcqs = student_mcqs
                .iter()
                .map(|s| {
                    let correct_answer = key_answer_index
                        .get(&s.question_number)
                        .cloned()
                        .unwrap_or_else(|| UNKNOWN_ANSWER.to_string());
                    McqRecord {
                        question_number: s.question_number,
                        question_text: s.question_text.clone(),
                        section: s.section.clone(),
                        options: s.options.clone(),
                        selected_answer: None,
                        correct_answer: Some(correct_answer),
                        answer_text: None,
                        marks: s.marks,
                    }
                })
                .collect();
        }

        // 5. 简答题去重
        let student_short_questions = dedup_shorts(&submission.short_questions, "学生卷");
        let answer_sheet_short_questions = dedup_shorts(&key.short_questions, "答案卷");

        ReconciledLists {
            student_mcqs,
            student_short_questions,
            answer_sheet_mcqs: key_mcqs,
            answer_sheet_short_questions,
        }
    }

    /// 直接重扫答案卷原文中 "MCQ Answers" 区段的 `Q<n>: <letter>` 对
    fn parse_mcq_answers_section(&self, text: &str) -> HashMap<u32, String> {
        let Some(marker) = self.mcq_answers_marker.find(text) else {
            return HashMap::new();
        };
        let tail = &text[marker.end()..];
        // 区段到 "Short Answer Keys" 为止
        let section = match self.short_keys_marker.find(tail) {
            Some(m) => &tail[..m.start()],
            None => tail,
        };

        let mut answers = HashMap::new();
        for captures in self.mcq_key_pair.captures_iter(section) {
            if let Ok(qn) = captures[1].parse::<u32>() {
                answers
                    .entry(qn)
                    .or_insert_with(|| captures[2].to_uppercase());
            }
        }
        answers
    }
}

/// 首次出现生效的选择题去重，重复的记日志后丢弃
fn dedup_mcqs(records: &[McqRecord], origin: &str) -> Vec<McqRecord> {
    let mut seen = Vec::new();
    let mut result: Vec<McqRecord> = Vec::with_capacity(records.len());
    for record in records {
        if seen.contains(&record.question_number) {
            warn!("{} 选择题 Q{} 重复，丢弃后出现的记录", origin, record.question_number);
            continue;
        }
        seen.push(record.question_number);
        result.push(record.clone());
    }
    result
}

/// 首次出现生效的简答题去重
fn dedup_shorts(records: &[ShortAnswerRecord], origin: &str) -> Vec<ShortAnswerRecord> {
    let mut seen = Vec::new();
    let mut result: Vec<ShortAnswerRecord> = Vec::with_capacity(records.len());
    for record in records {
        if seen.contains(&record.question_number) {
            warn!("{} 简答题 Q{} 重复，丢弃后出现的记录", origin, record.question_number);
            continue;
        }
        seen.push(record.question_number);
        result.push(record.clone());
    }
    result
}
