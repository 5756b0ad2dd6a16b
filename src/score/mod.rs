//! 评分聚合模块（业务能力层）
//!
//! 把评分服务各种形态的响应折叠成统一的 [`ScoreSummary`]。聚合从
//! 不报错：字段缺失时按可解释的规则补全，优先相信服务自带的汇总
//! 块，其次是顶层总分，最后才自行求和。

use tracing::debug;

use crate::models::{OracleResponse, QuestionResult, ScoreSummary};

/// 聚合评分服务响应为统一汇总
pub fn aggregate(response: &OracleResponse) -> ScoreSummary {
    let mcq_obtained = sum_scores(&response.mcq_results);
    // 选择题满分缺失时按每题 1 分计
    let mcq_total: f64 = response
        .mcq_results
        .iter()
        .map(|r| r.max_score.unwrap_or(1.0))
        .sum();

    let short_obtained = sum_scores(&response.short_question_results);
    let short_total = short_total_marks(response, response.mcq_results.len());

    // 总分优先取服务自带汇总，其次顶层字段，最后自行求和
    let summary = response.score_summary.as_ref();
    let total_obtained = summary
        .and_then(|s| s.total_obtained)
        .or(response.total_score)
        .unwrap_or(mcq_obtained + short_obtained);
    let total_marks = summary
        .and_then(|s| s.total_marks)
        .or(response.max_score)
        .unwrap_or(mcq_total + short_total);

    debug!(
        "评分聚合完成: 选择题 {}/{}, 简答题 {}/{}, 总分 {}/{}",
        mcq_obtained, mcq_total, short_obtained, short_total, total_obtained, total_marks
    );

    ScoreSummary {
        mcq_obtained: mcq_obtained.max(0.0),
        mcq_total: mcq_total.max(0.0),
        short_obtained: short_obtained.max(0.0),
        short_total: short_total.max(0.0),
        total_obtained: total_obtained.max(0.0),
        total_marks: total_marks.max(0.0),
    }
}

fn sum_scores(results: &[QuestionResult]) -> f64 {
    results.iter().map(|r| r.score.unwrap_or(0.0)).sum()
}

/// 简答题满分：已知试卷总分时一律用 `max(试卷总分 − 选择题数, 简答题数)`
/// 推算（外部给出的上限比逐题求和更权威），没有试卷总分才退回逐题
/// 求和，缺失的按 0 分计
fn short_total_marks(response: &OracleResponse, mcq_count: usize) -> f64 {
    let results = &response.short_question_results;
    if results.is_empty() {
        return 0.0;
    }

    let overall_max = response
        .score_summary
        .as_ref()
        .and_then(|s| s.total_marks)
        .or(response.max_score);
    match overall_max {
        Some(overall) => (overall - mcq_count as f64).max(results.len() as f64),
        None => results.iter().map(|r| r.max_score.unwrap_or(0.0)).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: serde_json::Value) -> OracleResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_mcq_max_defaults_to_one_each() {
        // 三条选择题结果都不带满分字段：满分按每题 1 分计
        let summary = aggregate(&response(json!({
            "mcqResults": [
                {"questionNumber": 1, "score": 1},
                {"questionNumber": 2, "score": 0},
                {"questionNumber": 3, "score": 1}
            ]
        })));
        assert_eq!(summary.mcq_obtained, 2.0);
        assert_eq!(summary.mcq_total, 3.0);
        assert_eq!(summary.total_marks, 3.0);
    }

    #[test]
    fn test_short_total_inferred_from_overall_max() {
        // 试卷总分 20，4 条选择题，3 条简答题满分缺失：
        // 简答题满分 = max(20 - 4, 3) = 16
        let summary = aggregate(&response(json!({
            "scoreSummary": {"totalMarks": 20},
            "mcqResults": [
                {"score": 1}, {"score": 1}, {"score": 0}, {"score": 1}
            ],
            "shortQuestionResults": [
                {"score": 4}, {"score": 3}, {"score": 5}
            ]
        })));
        assert_eq!(summary.short_total, 16.0);
        assert_eq!(summary.short_obtained, 12.0);
        assert_eq!(summary.total_marks, 20.0);
    }

    #[test]
    fn test_short_total_floor_is_question_count() {
        // 推算结果比题数还小的时候取题数下限
        let summary = aggregate(&response(json!({
            "scoreSummary": {"totalMarks": 5},
            "mcqResults": [{"score": 1}, {"score": 1}, {"score": 1}, {"score": 1}],
            "shortQuestionResults": [{"score": 2}, {"score": 2}, {"score": 1}]
        })));
        assert_eq!(summary.short_total, 3.0);
    }

    #[test]
    fn test_per_question_sum_without_overall_max() {
        // 没有试卷总分时退回逐题满分求和
        let summary = aggregate(&response(json!({
            "mcqResults": [{"score": 2, "maxScore": 2}],
            "shortQuestionResults": [
                {"score": 4, "maxScore": 10},
                {"score": 3, "maxScore": 5}
            ]
        })));
        assert_eq!(summary.mcq_total, 2.0);
        assert_eq!(summary.short_total, 15.0);
        assert_eq!(summary.total_obtained, 9.0);
        assert_eq!(summary.total_marks, 17.0);
    }

    #[test]
    fn test_overall_max_ceiling_wins_over_per_question_sum() {
        // 逐题满分齐全但试卷总分也在：外部上限更权威，
        // 简答题满分 = max(20 - 2, 2) = 18 而不是 10 + 5 = 15
        let summary = aggregate(&response(json!({
            "scoreSummary": {"totalMarks": 20},
            "mcqResults": [
                {"score": 1, "maxScore": 1},
                {"score": 0, "maxScore": 1}
            ],
            "shortQuestionResults": [
                {"score": 4, "maxScore": 10},
                {"score": 3, "maxScore": 5}
            ]
        })));
        assert_eq!(summary.short_total, 18.0);
        assert_eq!(summary.total_marks, 20.0);
    }

    #[test]
    fn test_no_short_results_means_zero_short_total() {
        // 有试卷总分但一道简答都没有：不把上限算到简答头上
        let summary = aggregate(&response(json!({
            "scoreSummary": {"totalMarks": 20},
            "mcqResults": [{"score": 1, "maxScore": 1}]
        })));
        assert_eq!(summary.short_total, 0.0);
        assert_eq!(summary.total_marks, 20.0);
    }

    #[test]
    fn test_legacy_flat_totals_used() {
        let summary = aggregate(&response(json!({
            "mcqResults": [{"obtainedMarks": 1, "marks": 1}],
            "shortAnswerResults": [{"obtainedMarks": "4", "marks": 5}],
            "totalScore": 5,
            "maxScore": 6
        })));
        assert_eq!(summary.total_obtained, 5.0);
        assert_eq!(summary.total_marks, 6.0);
        assert_eq!(summary.short_obtained, 4.0);
    }

    #[test]
    fn test_summary_block_overrides_flat_fields() {
        let summary = aggregate(&response(json!({
            "scoreSummary": {"totalScore": 10, "maxScore": 20},
            "totalScore": 1,
            "maxScore": 2
        })));
        assert_eq!(summary.total_obtained, 10.0);
        assert_eq!(summary.total_marks, 20.0);
    }

    #[test]
    fn test_empty_response_yields_zeroes() {
        let summary = aggregate(&OracleResponse::default());
        assert_eq!(summary, ScoreSummary::default());
        assert_eq!(summary.overall_percentage(), 0.0);
    }

    #[test]
    fn test_negative_scores_clamped() {
        let summary = aggregate(&response(json!({
            "mcqResults": [{"score": -2, "maxScore": 1}]
        })));
        assert_eq!(summary.mcq_obtained, 0.0);
        assert_eq!(summary.total_obtained, 0.0);
    }
}
