use regex::Regex;

/// 切分器使用的全部正则
///
/// 在切分器实例化时编译一次，之后跨调用复用；匹配本身无共享可变
/// 状态，切分器是可重入的。
pub struct SegmenterPatterns {
    /// 答案卷标志短语（全文探测，用于修正调用方的提示）
    pub answer_sheet_markers: Regex,
    /// "MCQ Answers" 区段标记行
    pub mcq_section_marker: Regex,
    /// "Short Answer Keys" 区段标记行
    pub short_section_marker: Regex,
    /// 答案卷式选择题答案行：`Q<n>: <letter>[)] <text> [(<n> marks)]`
    pub mcq_key_line: Regex,
    /// 区段标签行：`Section <Letter>: (Multiple Choice|Short) Questions`
    pub section_label: Regex,
    /// 题号行：可选 Q 前缀 + 数字 + 分隔符（`.` `:` `)` 或空白）
    pub question_header: Regex,
    /// 选项行：`[(]<letter|digit 1-4>[.:)\s]<text>`
    pub option_line: Regex,
    /// 行内答案指示：`Answer:` / `Correct:` 后跟字母
    pub inline_answer: Regex,
    /// 分值标注：`(<n> marks)`
    pub marks_annotation: Regex,
    /// 答案卷式简答答案行：`Q<n>: <text>`
    pub short_key_line: Regex,
    /// 兜底重扫用的 Section B 标记
    pub section_b_marker: Regex,
    /// 兜底重扫用的题号标记（不锚定行首，题号可以出现在行中间）
    pub fallback_question_header: Regex,
}

impl SegmenterPatterns {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            answer_sheet_markers: Regex::new(
                r"(?i)special answer sheet|mcq answers|short answer keys",
            )?,
            mcq_section_marker: Regex::new(r"(?i)^mcq answers\b")?,
            short_section_marker: Regex::new(r"(?i)^short answer keys\b")?,
            mcq_key_line: Regex::new(r"(?i)^q(\d+)\s*[:.]\s*([a-d])\b\s*\)?\s*(.*)$")?,
            section_label: Regex::new(
                r"(?i)^section\s+([a-z])\s*[:.]?\s*(multiple\s*choice|short)?",
            )?,
            question_header: Regex::new(r"^[Qq]?(\d+)\s*[.:)\s]\s*(.*)$")?,
            option_line: Regex::new(r"^\(?([A-Da-d1-4])[.:)\s]\s*(\S.*)$")?,
            inline_answer: Regex::new(r"(?i)^(?:answer|correct(?:\s+answer)?)\s*[:\-]\s*([a-d])\b")?,
            marks_annotation: Regex::new(r"(?i)\(\s*(\d+(?:\.\d+)?)\s*marks?\s*\)")?,
            short_key_line: Regex::new(r"^[Qq](\d+)\s*:\s*(.+)$")?,
            section_b_marker: Regex::new(r"(?i)section\s+b\s*[:.]?\s*short\s+answer\s+questions")?,
            fallback_question_header: Regex::new(r"(?i)\bq(\d+)\s*[:.]")?,
        })
    }

    /// 从文本中剥离首个分值标注，返回提取到的分值
    ///
    /// 后续出现的标注保持原样（首个匹配生效的约定由调用方保证）。
    pub fn strip_marks(&self, text: &mut String) -> Option<f64> {
        let captures = self.marks_annotation.captures(text)?;
        let marks = captures.get(1)?.as_str().parse::<f64>().ok();
        let range = captures.get(0)?.range();
        text.replace_range(range, "");
        let trimmed = text.trim().to_string();
        *text = trimmed;
        marks
    }
}
