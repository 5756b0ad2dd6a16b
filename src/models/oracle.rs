use serde::{Deserialize, Serialize};

/// 评分服务返回的单题结果
///
/// 字段命名兼容两种已知响应形态：得分字段可能叫 `score` 或
/// `obtainedMarks`，满分字段可能叫 `maxScore` 或 `marks`，且得分
/// 可能以字符串形式出现。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_number: Option<u32>,
    #[serde(
        default,
        alias = "obtainedMarks",
        deserialize_with = "deserialize_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub score: Option<f64>,
    #[serde(
        default,
        alias = "marks",
        deserialize_with = "deserialize_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// 评分服务自带的汇总块（结构化形态才有）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleScoreSummary {
    #[serde(
        default,
        alias = "totalScore",
        deserialize_with = "deserialize_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_obtained: Option<f64>,
    #[serde(
        default,
        alias = "maxScore",
        deserialize_with = "deserialize_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_marks: Option<f64>,
}

/// 评分服务响应
///
/// 至少兼容两种形态：带 `scoreSummary` 的结构化形态，以及把总分
/// 平铺在顶层的旧形态。无法识别的形态按"没有结构化汇总"处理，
/// 由聚合器从单题数组自行求和，而不是报错。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_summary: Option<OracleScoreSummary>,
    #[serde(default)]
    pub mcq_results: Vec<QuestionResult>,
    #[serde(default, alias = "shortAnswerResults")]
    pub short_question_results: Vec<QuestionResult>,
    // --- 旧形态的顶层总分字段 ---
    #[serde(
        default,
        alias = "totalObtained",
        deserialize_with = "deserialize_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_score: Option<f64>,
    #[serde(
        default,
        alias = "totalMarks",
        deserialize_with = "deserialize_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_score: Option<f64>,
}

// 把数字或数字字符串解析为 Option<f64>；无法解析时按缺失处理
fn deserialize_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct ScoreVisitor;

    impl<'de> Visitor<'de> for ScoreVisitor {
        type Value = Option<f64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number or a numeric string")
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value as f64))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value as f64))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.trim().parse::<f64>().ok())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(ScoreVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_score_accepts_number_and_string() {
        let result: QuestionResult =
            serde_json::from_value(json!({"questionNumber": 4, "score": "3.5", "maxScore": 10}))
                .unwrap();
        assert_eq!(result.score, Some(3.5));
        assert_eq!(result.max_score, Some(10.0));
    }

    #[test]
    fn test_score_field_aliases() {
        // 旧形态用 obtainedMarks/marks 命名
        let result: QuestionResult =
            serde_json::from_value(json!({"obtainedMarks": 2, "marks": 5})).unwrap();
        assert_eq!(result.score, Some(2.0));
        assert_eq!(result.max_score, Some(5.0));
    }

    #[test]
    fn test_unparseable_score_treated_as_missing() {
        let result: QuestionResult =
            serde_json::from_value(json!({"score": "N/A", "maxScore": null})).unwrap();
        assert_eq!(result.score, None);
        assert_eq!(result.max_score, None);
    }

    #[test]
    fn test_legacy_flat_response_shape() {
        let response: OracleResponse = serde_json::from_value(json!({
            "mcqResults": [{"score": 1, "maxScore": 1}],
            "shortAnswerResults": [{"score": "4", "marks": 5}],
            "totalScore": 5,
            "maxScore": 6
        }))
        .unwrap();
        assert!(response.score_summary.is_none());
        assert_eq!(response.mcq_results.len(), 1);
        assert_eq!(response.short_question_results.len(), 1);
        assert_eq!(response.total_score, Some(5.0));
        assert_eq!(response.max_score, Some(6.0));
    }
}
