//! HTTP client for the analytics service.
//!
//! One reqwest client with a configured timeout serves every facet
//! endpoint. Responses that arrive in a legacy shape (nested QLA question
//! lists, wrapped word-cloud payloads) are normalized here at the
//! boundary so the rest of the engine sees one canonical model.

use crate::api::{AnalyticsApi, FilterParams};
use crate::error::DashboardError;
use crate::models::{
    CommentThemes, Establishment, QlaData, QlaQuestion, SampleComment, Statistics,
    StudentResponseReport, Theme, WordCloudEntry,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Reqwest-backed implementation of [`AnalyticsApi`].
#[derive(Clone)]
pub struct AnalyticsClient {
    http: reqwest::Client,
    base_url: String,
}

impl AnalyticsClient {
    /// Create a client for the service at `base_url` with the given
    /// request timeout.
    pub fn new(base_url: &str, timeout_seconds: u64) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Service base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, DashboardError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} with {} params", url, params.len());

        let response = self
            .http
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DashboardError::Api(format!("request to {} timed out", path))
                } else if e.is_connect() {
                    DashboardError::Api(format!(
                        "cannot connect to analytics service at {}",
                        self.base_url
                    ))
                } else {
                    DashboardError::Api(format!("failed to send request: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DashboardError::Api(format!(
                "analytics service error {} on {}: {}",
                status, path, body
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| DashboardError::Api(format!("failed to parse {} response: {}", path, e)))
    }

    /// Look up the establishment bound to a staff email, if any.
    ///
    /// Zero records and records without an establishment reference both
    /// yield `None`; the context resolver decides whether that is fatal.
    pub async fn lookup_role_binding(
        &self,
        email: &str,
    ) -> Result<Option<String>, DashboardError> {
        let params = vec![("email".to_string(), email.to_string())];
        let payload: RoleBindingPayload = self.get_json("/api/role-bindings", &params).await?;

        Ok(payload
            .records
            .into_iter()
            .next()
            .and_then(|r| r.establishment_id))
    }
}

/// Translate canonical filter parameter names into the naming one
/// endpoint family expects.
///
/// The statistics and QLA endpoints take `yearGroup`/`studentId`; the
/// comment endpoints take `year_group`/`student_id`.
fn facet_params(
    establishment_id: &str,
    filters: &FilterParams,
    camel: bool,
) -> Vec<(String, String)> {
    let mut params = vec![(
        "establishment_id".to_string(),
        establishment_id.to_string(),
    )];

    for (key, value) in filters {
        let name = match (*key, camel) {
            ("year_group", true) => "yearGroup",
            ("student_id", true) => "studentId",
            (other, _) => other,
        };
        params.push((name.to_string(), value.clone()));
    }

    params
}

#[derive(Debug, Deserialize)]
struct SuperUserCheck {
    #[serde(default)]
    is_super_user: bool,
}

#[derive(Debug, Deserialize)]
struct RoleBindingPayload {
    #[serde(default)]
    records: Vec<RoleBindingRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoleBindingRecord {
    #[serde(default)]
    establishment_id: Option<String>,
}

/// QLA payload in either the canonical flat shape or the legacy shape
/// with the question lists nested under `highLowQuestions`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QlaPayload {
    Nested {
        #[serde(rename = "highLowQuestions")]
        high_low_questions: HighLowQuestions,
        #[serde(default)]
        insights: Vec<crate::models::QlaInsight>,
    },
    Flat(QlaData),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HighLowQuestions {
    #[serde(default)]
    top_questions: Vec<QlaQuestion>,
    #[serde(default)]
    bottom_questions: Vec<QlaQuestion>,
}

impl From<QlaPayload> for QlaData {
    fn from(payload: QlaPayload) -> Self {
        match payload {
            QlaPayload::Flat(data) => data,
            QlaPayload::Nested {
                high_low_questions,
                insights,
            } => QlaData {
                top_questions: high_low_questions.top_questions,
                bottom_questions: high_low_questions.bottom_questions,
                insights,
            },
        }
    }
}

/// Word-cloud payload: either a bare weighted term list or the wrapped
/// object form carrying extra totals.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WordCloudPayload {
    Bare(Vec<WordCloudEntry>),
    Wrapped {
        #[serde(rename = "wordCloudData")]
        word_cloud_data: Vec<WordCloudEntry>,
    },
}

impl From<WordCloudPayload> for Vec<WordCloudEntry> {
    fn from(payload: WordCloudPayload) -> Self {
        match payload {
            WordCloudPayload::Bare(entries) => entries,
            WordCloudPayload::Wrapped { word_cloud_data } => word_cloud_data,
        }
    }
}

/// Comment-themes payload: canonical flat shape or the legacy shape with
/// a nested `themes` object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CommentThemesPayload {
    Nested {
        themes: NestedThemes,
        #[serde(rename = "sampleComments", default)]
        sample_comments: Vec<SampleComment>,
    },
    Flat(CommentThemes),
}

#[derive(Debug, Deserialize)]
struct NestedThemes {
    #[serde(default)]
    positive: Vec<Theme>,
    #[serde(default)]
    improvement: Vec<Theme>,
}

impl From<CommentThemesPayload> for CommentThemes {
    fn from(payload: CommentThemesPayload) -> Self {
        match payload {
            CommentThemesPayload::Flat(themes) => themes,
            CommentThemesPayload::Nested {
                themes,
                sample_comments,
            } => CommentThemes {
                positive_themes: themes.positive,
                improvement_themes: themes.improvement,
                sample_comments,
            },
        }
    }
}

#[async_trait]
impl AnalyticsApi for AnalyticsClient {
    async fn get_establishments(&self) -> Result<Vec<Establishment>, DashboardError> {
        self.get_json("/api/schools", &[]).await
    }

    async fn check_super_user(&self, email: &str) -> Result<bool, DashboardError> {
        let params = vec![("email".to_string(), email.to_string())];
        let check: SuperUserCheck = self.get_json("/api/check-super-user", &params).await?;
        Ok(check.is_super_user)
    }

    async fn get_statistics(
        &self,
        establishment_id: &str,
        filters: &FilterParams,
    ) -> Result<Statistics, DashboardError> {
        let params = facet_params(establishment_id, filters, true);
        self.get_json("/api/statistics", &params).await
    }

    async fn get_question_level_analysis(
        &self,
        establishment_id: &str,
        filters: &FilterParams,
    ) -> Result<QlaData, DashboardError> {
        let params = facet_params(establishment_id, filters, true);
        let payload: QlaPayload = self.get_json("/api/qla", &params).await?;
        Ok(QlaData::from(payload).normalize())
    }

    async fn get_word_cloud(
        &self,
        establishment_id: &str,
        filters: &FilterParams,
    ) -> Result<Vec<WordCloudEntry>, DashboardError> {
        let params = facet_params(establishment_id, filters, false);
        let payload: WordCloudPayload = self.get_json("/api/comments/word-cloud", &params).await?;
        Ok(payload.into())
    }

    async fn get_comment_themes(
        &self,
        establishment_id: &str,
        filters: &FilterParams,
    ) -> Result<CommentThemes, DashboardError> {
        let params = facet_params(establishment_id, filters, false);
        let payload: CommentThemesPayload =
            self.get_json("/api/comments/themes", &params).await?;
        Ok(payload.into())
    }

    async fn get_student_responses(
        &self,
        student_id: &str,
        cycle: u32,
    ) -> Result<StudentResponseReport, DashboardError> {
        // Rejected before any network call.
        if student_id.trim().is_empty() {
            return Err(DashboardError::MissingField("student id"));
        }

        let params = vec![
            ("student_id".to_string(), student_id.to_string()),
            ("cycle".to_string(), cycle.to_string()),
        ];
        self.get_json("/api/student-responses", &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_facet_params_camel_naming() {
        let filters = vec![
            ("cycle", "2".to_string()),
            ("year_group", "11".to_string()),
            ("student_id", "stu_1".to_string()),
        ];

        let params = facet_params("est_1", &filters, true);
        assert_eq!(params[0], ("establishment_id".into(), "est_1".into()));
        assert!(params.contains(&("yearGroup".into(), "11".into())));
        assert!(params.contains(&("studentId".into(), "stu_1".into())));
        assert!(params.contains(&("cycle".into(), "2".into())));
    }

    #[test]
    fn test_facet_params_snake_naming() {
        let filters = vec![
            ("year_group", "11".to_string()),
            ("student_id", "stu_1".to_string()),
        ];

        let params = facet_params("est_1", &filters, false);
        assert!(params.contains(&("year_group".into(), "11".into())));
        assert!(params.contains(&("student_id".into(), "stu_1".into())));
    }

    #[test]
    fn test_qla_payload_nested_shape() {
        let payload: QlaPayload = serde_json::from_value(json!({
            "highLowQuestions": {
                "topQuestions": [{"id": "q14", "text": "goals", "score": 4.4}],
                "bottomQuestions": []
            },
            "insights": [{
                "id": "growth_mindset",
                "title": "Growth Mindset",
                "percentageAgreement": 55.0,
                "questionIds": ["Q5", "Q26"],
                "icon": "🌱",
                "totalResponses": 200
            }]
        }))
        .unwrap();

        let data = QlaData::from(payload).normalize();
        assert_eq!(data.top_questions.len(), 1);
        assert_eq!(data.insights[0].question_ids, vec!["q5", "q26"]);
    }

    #[test]
    fn test_qla_payload_flat_shape() {
        let payload: QlaPayload = serde_json::from_value(json!({
            "topQuestions": [],
            "bottomQuestions": [{"id": "q4", "text": "homework", "score": 2.1}],
            "insights": []
        }))
        .unwrap();

        let data = QlaData::from(payload);
        assert_eq!(data.bottom_questions.len(), 1);
    }

    #[test]
    fn test_word_cloud_payload_shapes() {
        let bare: WordCloudPayload =
            serde_json::from_value(json!([{"text": "revision", "size": 45.0}])).unwrap();
        let entries: Vec<WordCloudEntry> = bare.into();
        assert_eq!(entries[0].text, "revision");

        let wrapped: WordCloudPayload = serde_json::from_value(json!({
            "wordCloudData": [{"text": "practice", "size": 38.0, "count": 187}],
            "totalComments": 1234
        }))
        .unwrap();
        let entries: Vec<WordCloudEntry> = wrapped.into();
        assert_eq!(entries[0].count, Some(187));
    }

    #[test]
    fn test_comment_themes_payload_nested_shape() {
        let payload: CommentThemesPayload = serde_json::from_value(json!({
            "themes": {
                "positive": [{"name": "Strong Work Ethic", "count": 45, "id": "pos_1"}],
                "improvement": [{"name": "Time Management", "count": 28, "id": "imp_1"}]
            },
            "sampleComments": [{"text": "Practice tests help.", "yearGroup": "10"}]
        }))
        .unwrap();

        let themes = CommentThemes::from(payload);
        assert_eq!(themes.positive_themes[0].name, "Strong Work Ethic");
        assert_eq!(themes.improvement_themes[0].count, 28);
        assert_eq!(themes.sample_comments.len(), 1);
    }

    #[tokio::test]
    async fn test_student_responses_requires_student_id() {
        let client = AnalyticsClient::new("http://localhost:9", 5);
        let err = client.get_student_responses("  ", 1).await.unwrap_err();
        assert!(matches!(err, DashboardError::MissingField("student id")));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = AnalyticsClient::new("http://localhost:8000/", 5);
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
