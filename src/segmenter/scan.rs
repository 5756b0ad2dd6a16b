use tracing::debug;

use crate::models::{McqOption, McqRecord, ShortAnswerRecord};

use super::patterns::SegmenterPatterns;
use super::policy::{ClassifyContext, QuestionKind, QuestionTypePolicy};

/// 行扫描游标状态
///
/// 任一时刻最多只有一条打开的记录（"当前题目"游标）。
enum ScanState {
    Idle,
    OpenMcq(McqRecord),
    OpenShort(ShortAnswerRecord),
}

/// 单次前向行扫描
///
/// 每行（去空白、跳过空行）按固定优先级匹配模式类，命中即处理：
/// 区段标记 → 答案卷式答案行 → 区段标签 → 题号行 → 选项/行内答案 →
/// 简答内容累积。后面的状态依赖前面的行，因此不做并发。
pub(super) struct LineScanner<'a> {
    patterns: &'a SegmenterPatterns,
    policy: &'a dyn QuestionTypePolicy,
    lookahead_window: usize,
    is_answer_sheet: bool,
    current_section: Option<String>,
    current_kind: Option<QuestionKind>,
    in_mcq_answers_section: bool,
    state: ScanState,
    mcqs: Vec<McqRecord>,
    shorts: Vec<ShortAnswerRecord>,
}

impl<'a> LineScanner<'a> {
    pub(super) fn new(
        patterns: &'a SegmenterPatterns,
        policy: &'a dyn QuestionTypePolicy,
        lookahead_window: usize,
        is_answer_sheet: bool,
    ) -> Self {
        Self {
            patterns,
            policy,
            lookahead_window,
            is_answer_sheet,
            current_section: None,
            current_kind: None,
            in_mcq_answers_section: false,
            state: ScanState::Idle,
            mcqs: Vec::new(),
            shorts: Vec::new(),
        }
    }

    pub(super) fn run(mut self, text: &str) -> (Vec<McqRecord>, Vec<ShortAnswerRecord>) {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            if line.is_empty() {
                i += 1;
                continue;
            }

            // 区段标记：只切换题型模式，本身不产生记录
            if self.patterns.mcq_section_marker.is_match(line) {
                self.current_kind = Some(QuestionKind::Mcq);
                self.in_mcq_answers_section = true;
                i += 1;
                continue;
            }
            if self.patterns.short_section_marker.is_match(line) {
                self.current_kind = Some(QuestionKind::Short);
                self.in_mcq_answers_section = false;
                i += 1;
                continue;
            }

            // 答案卷式选择题答案行：仅在答案卷模式或 MCQ 答案区段内匹配
            if self.is_answer_sheet || self.in_mcq_answers_section {
                if let Some(c) = self.patterns.mcq_key_line.captures(line) {
                    if let Ok(qn) = c[1].parse::<u32>() {
                        let mut answer_text = c[3].trim().to_string();
                        let marks = self.patterns.strip_marks(&mut answer_text);
                        self.mcqs.push(McqRecord {
                            question_number: qn,
                            section: self.current_section.clone(),
                            correct_answer: Some(c[2].to_uppercase()),
                            answer_text: if answer_text.is_empty() {
                                None
                            } else {
                                Some(answer_text)
                            },
                            marks,
                            ..Default::default()
                        });
                        i += 1;
                        continue;
                    }
                }
            }

            // 答案卷式简答答案行：立即开闭一条记录，再做有界前瞻补齐
            // 跨多行的答案（这些行没有逐行标记）
            if self.is_answer_sheet && self.current_kind == Some(QuestionKind::Short) {
                if let Some(c) = self.patterns.short_key_line.captures(line) {
                    if let Ok(qn) = c[1].parse::<u32>() {
                        let mut answer = c[2].trim().to_string();
                        let marks = self.patterns.strip_marks(&mut answer);
                        let mut j = i + 1;
                        while j < lines.len() && (j - i) <= self.lookahead_window {
                            let next = lines[j];
                            if next.is_empty() {
                                j += 1;
                                continue;
                            }
                            if self.patterns.short_key_line.is_match(next)
                                || self.patterns.mcq_section_marker.is_match(next)
                                || self.patterns.short_section_marker.is_match(next)
                                || self.patterns.section_label.is_match(next)
                            {
                                break;
                            }
                            answer.push('\n');
                            answer.push_str(next);
                            j += 1;
                        }
                        self.shorts.push(ShortAnswerRecord {
                            question_number: qn,
                            question_text: None,
                            section: self
                                .current_section
                                .clone()
                                .or_else(|| Some("B".to_string())),
                            answer,
                            marks,
                        });
                        i = j;
                        continue;
                    }
                }
            }

            // 区段标签行：关闭打开的记录并重置区段/题型模式
            if let Some(c) = self.patterns.section_label.captures(line) {
                self.close_open(false);
                self.current_section = Some(c[1].to_uppercase());
                self.current_kind = match c.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
                    Some(k) if k.starts_with("multiple") => Some(QuestionKind::Mcq),
                    Some(k) if k.starts_with("short") => Some(QuestionKind::Short),
                    _ => None,
                };
                self.in_mcq_answers_section = false;
                i += 1;
                continue;
            }

            // 题号行：关闭上一条记录再打开新记录
            if let Some(c) = self.patterns.question_header.captures(line) {
                if let Ok(qn) = c[1].parse::<u32>() {
                    self.close_open(false);
                    let mut question_text = c[2].trim().to_string();
                    let marks = self.patterns.strip_marks(&mut question_text);
                    let question_text = if question_text.is_empty() {
                        None
                    } else {
                        Some(question_text)
                    };
                    let kind = self.policy.classify(&ClassifyContext {
                        question_number: qn,
                        current_section: self.current_section.as_deref(),
                        current_kind: self.current_kind,
                    });
                    self.state = match kind {
                        QuestionKind::Mcq => ScanState::OpenMcq(McqRecord {
                            question_number: qn,
                            question_text,
                            section: self.current_section.clone(),
                            marks,
                            ..Default::default()
                        }),
                        QuestionKind::Short => ScanState::OpenShort(ShortAnswerRecord {
                            question_number: qn,
                            question_text,
                            section: self
                                .current_section
                                .clone()
                                .or_else(|| Some("B".to_string())),
                            answer: String::new(),
                            marks,
                        }),
                    };
                    i += 1;
                    continue;
                }
            }

            // 打开的选择题内部：选项行与行内答案指示
            if let ScanState::OpenMcq(record) = &mut self.state {
                if let Some(c) = self.patterns.option_line.captures(line) {
                    record.options.push(McqOption {
                        label: normalize_option_label(&c[1]),
                        text: c[2].trim().to_string(),
                    });
                } else if let Some(c) = self.patterns.inline_answer.captures(line) {
                    let letter = c[1].to_uppercase();
                    if self.is_answer_sheet {
                        record.correct_answer = Some(letter);
                    } else {
                        record.selected_answer = Some(letter);
                    }
                }
                // 其余行在选择题内部不参与累积
                i += 1;
                continue;
            }

            // 打开的简答题内部：累积内容
            if matches!(self.state, ScanState::OpenShort(_)) {
                if let ScanState::OpenShort(record) = &mut self.state {
                    let mut content = line.to_string();
                    let captured = self.patterns.strip_marks(&mut content);
                    if record.marks.is_none() {
                        record.marks = captured;
                    }
                    if !content.is_empty() {
                        if !record.answer.is_empty() {
                            record.answer.push('\n');
                        }
                        record.answer.push_str(&content);
                    }
                }
                // 前瞻一行：下一行是题号行就立即关闭，避免一个多余的
                // 空行把两道题粘在一起
                let next_is_header = lines[i + 1..]
                    .iter()
                    .find(|l| !l.is_empty())
                    .map(|l| self.patterns.question_header.is_match(l))
                    .unwrap_or(false);
                if next_is_header {
                    self.close_open(false);
                }
                i += 1;
                continue;
            }

            // 游标空闲且没有任何模式命中：自由文本，跳过
            i += 1;
        }

        // 输入结束，关闭仍然打开的记录
        self.close_open(true);

        (self.mcqs, self.shorts)
    }

    /// 关闭当前打开的记录并推入对应列表
    ///
    /// `dedup` 仅在输入结束的关闭路径上开启：同题号的记录已存在时
    /// 丢弃本条而不是重复推入。
    fn close_open(&mut self, dedup: bool) {
        match std::mem::replace(&mut self.state, ScanState::Idle) {
            ScanState::Idle => {}
            ScanState::OpenMcq(record) => {
                if dedup
                    && self
                        .mcqs
                        .iter()
                        .any(|r| r.question_number == record.question_number)
                {
                    debug!("丢弃重复的选择题记录: Q{}", record.question_number);
                    return;
                }
                self.mcqs.push(record);
            }
            ScanState::OpenShort(record) => {
                if dedup
                    && self
                        .shorts
                        .iter()
                        .any(|r| r.question_number == record.question_number)
                {
                    debug!("丢弃重复的简答题记录: Q{}", record.question_number);
                    return;
                }
                self.shorts.push(record);
            }
        }
    }
}

fn normalize_option_label(raw: &str) -> String {
    match raw {
        "1" => "A".to_string(),
        "2" => "B".to_string(),
        "3" => "C".to_string(),
        "4" => "D".to_string(),
        other => other.to_ascii_uppercase(),
    }
}
