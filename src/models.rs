//! Data models for the dashboard engine.
//!
//! This module contains the core data structures shared across the
//! application: score bands, facet payloads returned by the analytics
//! service, and the merged dashboard view model.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Raw per-question survey responses keyed by response-field name.
///
/// Values may be numbers, numeric strings, or null; anything else is
/// ignored by the score calculator.
pub type RawResponseSet = HashMap<String, serde_json::Value>;

/// Qualitative band derived from a numeric category score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Poor,
    Average,
    Good,
    Excellent,
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Band::Excellent => write!(f, "Excellent"),
            Band::Good => write!(f, "Good"),
            Band::Average => write!(f, "Average"),
            Band::Poor => write!(f, "Poor"),
        }
    }
}

impl Band {
    /// Derive the band from a mean score on the 1-5 response scale.
    ///
    /// Thresholds are evaluated high-to-low and are non-overlapping:
    /// >= 4.0 excellent, >= 3.0 good, >= 2.0 average, otherwise poor.
    pub fn from_score(score: f64) -> Self {
        if score >= 4.0 {
            Band::Excellent
        } else if score >= 3.0 {
            Band::Good
        } else if score >= 2.0 {
            Band::Average
        } else {
            Band::Poor
        }
    }

    /// Fixed presentation color token for the band.
    #[allow(dead_code)] // For consumers rendering the JSON report
    pub fn color(&self) -> &'static str {
        match self {
            Band::Excellent => "#10b981", // green
            Band::Good => "#3b82f6",      // blue
            Band::Average => "#f59e0b",   // amber
            Band::Poor => "#ef4444",      // red
        }
    }
}

/// Derived score for one insight category.
///
/// A `None` mean represents "no data", never a numeric zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightScore {
    /// Category id from the insight catalog.
    pub category_id: String,
    /// Arithmetic mean of accepted response values, in [1,5].
    pub mean: Option<f64>,
    /// Band derived from the mean; absent when the mean is undefined.
    pub band: Option<Band>,
    /// Number of questions that contributed an accepted value.
    pub count: usize,
}

/// An establishment (school) that scopes all data queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Establishment {
    pub id: String,
    pub name: String,
    /// Establishment type, e.g. "Secondary". Defaults to "School".
    #[serde(rename = "type", default = "default_establishment_type")]
    pub kind: String,
}

fn default_establishment_type() -> String {
    "School".to_string()
}

/// Aggregate survey metrics for the selected scope.
///
/// The backend owns this shape; headline fields are typed and everything
/// else is carried through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    #[serde(default)]
    pub total_students: Option<u64>,
    #[serde(default)]
    pub total_responses: Option<u64>,
    #[serde(default)]
    pub completion_rate: Option<f64>,
    #[serde(default)]
    pub average_score: Option<f64>,
    /// Remaining backend-specific metrics, passed through to the report.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A single question entry in the QLA top/bottom lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QlaQuestion {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub score: Option<f64>,
}

/// One insight entry as aggregated by the analytics service.
///
/// `percentage_agreement` is backend-owned; the engine carries it through
/// verbatim and never recomputes it locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QlaInsight {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub percentage_agreement: f64,
    #[serde(default)]
    pub question_ids: Vec<String>,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub total_responses: u64,
}

/// Question-level analysis facet: per-question extremes plus per-insight
/// aggregates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QlaData {
    #[serde(default)]
    pub top_questions: Vec<QlaQuestion>,
    #[serde(default)]
    pub bottom_questions: Vec<QlaQuestion>,
    #[serde(default)]
    pub insights: Vec<QlaInsight>,
}

impl QlaData {
    /// Well-formed empty result used when the QLA facet fails: the rest of
    /// the view model must still assemble.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Collapse question-id casing drift from the service into the one
    /// canonical lower-case form.
    pub fn normalize(mut self) -> Self {
        for insight in &mut self.insights {
            for qid in &mut insight.question_ids {
                *qid = qid.to_lowercase();
            }
        }
        self
    }
}

/// A weighted term from the comment word cloud.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordCloudEntry {
    pub text: String,
    #[serde(default)]
    pub size: f64,
    #[serde(default)]
    pub count: Option<u64>,
}

/// A named comment theme with its occurrence count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub count: u64,
}

/// A sampled free-text comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleComment {
    pub text: String,
    #[serde(default)]
    pub year_group: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// Comment-theme facet: positive and improvement themes plus samples.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThemes {
    #[serde(default)]
    pub positive_themes: Vec<Theme>,
    #[serde(default)]
    pub improvement_themes: Vec<Theme>,
    #[serde(default)]
    pub sample_comments: Vec<SampleComment>,
}

/// Red/amber/green rating for a single student response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RagRating {
    Green,
    Amber,
    Red,
    None,
}

impl fmt::Display for RagRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RagRating::Green => write!(f, "green"),
            RagRating::Amber => write!(f, "amber"),
            RagRating::Red => write!(f, "red"),
            RagRating::None => write!(f, "none"),
        }
    }
}

/// RAG summary counts over a student's responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagSummary {
    #[serde(default)]
    pub green: u64,
    #[serde(default)]
    pub amber: u64,
    #[serde(default)]
    pub red: u64,
    #[serde(default)]
    pub none: u64,
}

/// Identity fields of the student a response report belongs to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// One raw per-question response within a student report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentResponse {
    pub question_id: String,
    #[serde(default)]
    pub question_text: String,
    #[serde(default)]
    pub response_value: Option<serde_json::Value>,
    #[serde(default = "default_rag")]
    pub rag_rating: RagRating,
}

fn default_rag() -> RagRating {
    RagRating::None
}

/// Per-student raw responses plus a RAG summary for one cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentResponseReport {
    #[serde(default)]
    pub student: StudentInfo,
    #[serde(default)]
    pub cycle: u32,
    #[serde(default)]
    pub summary: RagSummary,
    #[serde(default)]
    pub responses: Vec<StudentResponse>,
}

impl StudentResponseReport {
    /// Flatten the responses into a raw response set keyed by question id,
    /// ready for the score calculator's field-key probing.
    pub fn raw_responses(&self) -> RawResponseSet {
        self.responses
            .iter()
            .filter_map(|r| {
                r.response_value
                    .as_ref()
                    .map(|v| (r.question_id.clone(), v.clone()))
            })
            .collect()
    }
}

/// The acting user's resolved identity and scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContext {
    pub email: String,
    pub is_super_user: bool,
    /// Resolved establishment; `None` for a super-user who has not yet
    /// made an explicit selection.
    pub establishment_id: Option<String>,
}

/// The merged dashboard snapshot.
///
/// Each facet is independently optional: a facet that failed or has not
/// loaded is `None`. The orchestrator replaces the whole value atomically
/// after all four facet requests settle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardViewModel {
    pub statistics: Option<Statistics>,
    pub qla: Option<QlaData>,
    pub word_cloud: Option<Vec<WordCloudEntry>>,
    pub comment_themes: Option<CommentThemes>,
}

impl DashboardViewModel {
    /// True once the headline statistics facet has loaded.
    pub fn has_data(&self) -> bool {
        self.statistics.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_band_thresholds_exact() {
        assert_eq!(Band::from_score(4.0), Band::Excellent);
        assert_eq!(Band::from_score(3.9999), Band::Good);
        assert_eq!(Band::from_score(3.0), Band::Good);
        assert_eq!(Band::from_score(2.0), Band::Average);
        assert_eq!(Band::from_score(1.9999), Band::Poor);
        assert_eq!(Band::from_score(1.0), Band::Poor);
        assert_eq!(Band::from_score(5.0), Band::Excellent);
    }

    #[test]
    fn test_band_colors() {
        assert_eq!(Band::Excellent.color(), "#10b981");
        assert_eq!(Band::Good.color(), "#3b82f6");
        assert_eq!(Band::Average.color(), "#f59e0b");
        assert_eq!(Band::Poor.color(), "#ef4444");
    }

    #[test]
    fn test_band_ordering() {
        assert!(Band::Poor < Band::Average);
        assert!(Band::Average < Band::Good);
        assert!(Band::Good < Band::Excellent);
    }

    #[test]
    fn test_qla_normalize_lowercases_question_ids() {
        let qla = QlaData {
            insights: vec![QlaInsight {
                id: "growth_mindset".to_string(),
                title: "Growth Mindset".to_string(),
                percentage_agreement: 62.5,
                question_ids: vec!["Q5".to_string(), "Q26".to_string()],
                icon: String::new(),
                total_responses: 120,
            }],
            ..Default::default()
        };

        let normalized = qla.normalize();
        assert_eq!(normalized.insights[0].question_ids, vec!["q5", "q26"]);
    }

    #[test]
    fn test_qla_empty_is_well_formed() {
        let qla = QlaData::empty();
        assert!(qla.top_questions.is_empty());
        assert!(qla.bottom_questions.is_empty());
        assert!(qla.insights.is_empty());
    }

    #[test]
    fn test_statistics_keeps_unknown_fields() {
        let stats: Statistics = serde_json::from_value(json!({
            "totalStudents": 450,
            "completionRate": 89.0,
            "nationalERI": 70.2
        }))
        .unwrap();

        assert_eq!(stats.total_students, Some(450));
        assert_eq!(stats.completion_rate, Some(89.0));
        assert_eq!(stats.extra.get("nationalERI"), Some(&json!(70.2)));
    }

    #[test]
    fn test_student_report_raw_responses() {
        let report = StudentResponseReport {
            student: StudentInfo::default(),
            cycle: 1,
            summary: RagSummary::default(),
            responses: vec![
                StudentResponse {
                    question_id: "q5".to_string(),
                    question_text: String::new(),
                    response_value: Some(json!(4)),
                    rag_rating: RagRating::Green,
                },
                StudentResponse {
                    question_id: "q26".to_string(),
                    question_text: String::new(),
                    response_value: None,
                    rag_rating: RagRating::None,
                },
            ],
        };

        let raw = report.raw_responses();
        assert_eq!(raw.get("q5"), Some(&json!(4)));
        assert!(!raw.contains_key("q26"));
    }

    #[test]
    fn test_view_model_has_data() {
        let mut vm = DashboardViewModel::default();
        assert!(!vm.has_data());
        vm.statistics = Some(Statistics::default());
        assert!(vm.has_data());
    }
}
