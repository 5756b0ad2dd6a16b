//! 评估请求构建（业务能力层）
//!
//! 把核对完成的四份列表打包成发送给评分服务的规范化请求。只在
//! 答案卷一侧补缺省分值：学生卷记录缺分值是正常情况，评分以答案
//! 卷为准。

use crate::models::{DocumentMetadata, DocumentPayload, ReconciledEvaluationRequest};
use crate::reconcile::ReconciledLists;

/// 选择题缺省分值
pub const DEFAULT_MCQ_MARKS: f64 = 1.0;
/// 简答题缺省分值
pub const DEFAULT_SHORT_MARKS: f64 = 5.0;

/// 构建评估请求
///
/// 元数据原样透传，列表顺序保持核对输出的顺序。
pub fn build_evaluation_request(
    lists: &ReconciledLists,
    student_metadata: DocumentMetadata,
    key_metadata: DocumentMetadata,
) -> ReconciledEvaluationRequest {
    let mut answer_sheet_mcqs = lists.answer_sheet_mcqs.clone();
    for record in &mut answer_sheet_mcqs {
        if record.marks.is_none() {
            record.marks = Some(DEFAULT_MCQ_MARKS);
        }
    }
    let mut answer_sheet_shorts = lists.answer_sheet_short_questions.clone();
    for record in &mut answer_sheet_shorts {
        if record.marks.is_none() {
            record.marks = Some(DEFAULT_SHORT_MARKS);
        }
    }

    ReconciledEvaluationRequest {
        student_submission: DocumentPayload {
            mcqs: lists.student_mcqs.clone(),
            short_questions: lists.student_short_questions.clone(),
            metadata: student_metadata,
        },
        answer_sheet: DocumentPayload {
            mcqs: answer_sheet_mcqs,
            short_questions: answer_sheet_shorts,
            metadata: key_metadata,
        },
    }
}
