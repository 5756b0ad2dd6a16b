use serde::{Deserialize, Serialize};

/// 无法确定正确答案时使用的显式哨兵值
///
/// 与任何真实选项字母都不同，下游（评分服务或人工复核）自行决定如何处理。
pub const UNKNOWN_ANSWER: &str = "?";

/// 选择题的单个选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McqOption {
    /// 选项标签（单个大写字母 A–D）
    pub label: String,
    /// 选项文本
    pub text: String,
}

/// 选择题记录
///
/// 同一条记录在核对完成后不会同时携带 `selected_answer` 和
/// `correct_answer`：学生卷一侧只持有前者，答案卷一侧只持有后者。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McqRecord {
    /// 题号（去重后在单份文档内唯一）
    pub question_number: u32,
    /// 题干文本（只匹配到答案行时可能缺失）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_text: Option<String>,
    /// 所属区段标签（"A"/"B" 等，仅供展示）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// 选项列表（可能为空）
    #[serde(default)]
    pub options: Vec<McqOption>,
    /// 学生选择的答案字母（仅学生卷一侧）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_answer: Option<String>,
    /// 标准答案字母（仅答案卷一侧）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    /// 标准答案对应的文本（例如选项原文）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_text: Option<String>,
    /// 分值，构建评估请求时缺省补 1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marks: Option<f64>,
}

/// 简答题记录
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortAnswerRecord {
    /// 题号（去重后在单份文档内唯一）
    pub question_number: u32,
    /// 题干文本
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_text: Option<String>,
    /// 所属区段标签，缺省为 "B"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// 答案内容，多行时以 `\n` 连接；留白为空字符串
    #[serde(default)]
    pub answer: String,
    /// 分值，构建评估请求时缺省补 5
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marks: Option<f64>,
}

/// 单份文档的切分结果
///
/// 切分完成后不再修改。识别不到任何结构时返回空列表而非错误。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentExtractionResult {
    #[serde(default)]
    pub mcqs: Vec<McqRecord>,
    #[serde(default)]
    pub short_questions: Vec<ShortAnswerRecord>,
    pub is_answer_sheet: bool,
    /// 提取出的原始纯文本（核对阶段的兜底重扫需要）
    #[serde(default)]
    pub extracted_text: String,
    /// 诊断信息（提取/切分层面不致命的问题）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 文档元数据，仅携带文件名和标识，不参与任何算法
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_id: Option<String>,
}

/// 评估请求中单份文档的载荷
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPayload {
    pub mcqs: Vec<McqRecord>,
    pub short_questions: Vec<ShortAnswerRecord>,
    pub metadata: DocumentMetadata,
}

/// 发送给外部评分服务的规范化评估请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledEvaluationRequest {
    pub student_submission: DocumentPayload,
    pub answer_sheet: DocumentPayload,
}

/// 评分汇总
///
/// 百分比按需计算，不做预存，避免数据陈旧。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub mcq_obtained: f64,
    pub mcq_total: f64,
    pub short_obtained: f64,
    pub short_total: f64,
    pub total_obtained: f64,
    pub total_marks: f64,
}

impl ScoreSummary {
    /// 选择题得分百分比，始终落在 [0, 100]
    pub fn mcq_percentage(&self) -> f64 {
        percentage(self.mcq_obtained, self.mcq_total)
    }

    /// 简答题得分百分比，始终落在 [0, 100]
    pub fn short_percentage(&self) -> f64 {
        percentage(self.short_obtained, self.short_total)
    }

    /// 总得分百分比，始终落在 [0, 100]
    pub fn overall_percentage(&self) -> f64 {
        percentage(self.total_obtained, self.total_marks)
    }
}

/// 百分比计算：四舍五入，总分为 0 时短路返回 0，结果钳制在 [0, 100]
///
/// 上游数据不一致（例如得分超过总分）时依然返回合法值。
pub fn percentage(obtained: f64, total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    (obtained / total * 100.0).round().clamp(0.0, 100.0)
}
