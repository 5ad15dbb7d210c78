//! Markdown and JSON report generation.
//!
//! This module renders a loaded dashboard snapshot (and an optional
//! per-student breakdown) into the final report document.

use crate::catalog::get_insight;
use crate::models::{
    CommentThemes, DashboardViewModel, InsightScore, QlaData, RagSummary, Statistics, StudentInfo,
    StudentResponse, WordCloudEntry,
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// How many word-cloud terms the report includes.
const WORD_CLOUD_LIMIT: usize = 20;

/// Report header fields describing the scope of the snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub establishment_name: String,
    pub academic_year: String,
    pub cycle: u32,
    pub generated_at: DateTime<Utc>,
    /// Canonical key/value pairs of the filters that were active.
    pub active_filters: Vec<(String, String)>,
}

/// Per-student breakdown appended when a student filter was given.
#[derive(Debug, Clone, Serialize)]
pub struct StudentSection {
    pub student: StudentInfo,
    pub summary: RagSummary,
    pub responses: Vec<StudentResponse>,
    pub scores: Vec<InsightScore>,
}

/// The complete report: scope metadata, the dashboard snapshot, and the
/// optional student breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub metadata: ReportMetadata,
    pub dashboard: DashboardViewModel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentSection>,
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &DashboardReport) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# Insight Dashboard Report\n\n");

    // Metadata section
    output.push_str(&generate_metadata_section(&report.metadata));

    // Headline statistics
    if let Some(ref statistics) = report.dashboard.statistics {
        output.push_str(&generate_statistics_section(statistics));
    }

    // Question-level analysis
    output.push_str(&generate_qla_section(report.dashboard.qla.as_ref()));

    // Comment word cloud
    if let Some(ref word_cloud) = report.dashboard.word_cloud {
        output.push_str(&generate_word_cloud_section(word_cloud));
    }

    // Comment themes
    if let Some(ref themes) = report.dashboard.comment_themes {
        output.push_str(&generate_themes_section(themes));
    }

    // Per-student breakdown
    if let Some(ref student) = report.student {
        output.push_str(&generate_student_section(student));
    }

    // Footer
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Establishment:** {}\n",
        metadata.establishment_name
    ));
    section.push_str(&format!(
        "- **Academic Year:** {}\n",
        metadata.academic_year
    ));
    section.push_str(&format!("- **Cycle:** {}\n", metadata.cycle));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    // cycle and academic_year already have their own lines above
    let extra_filters: Vec<_> = metadata
        .active_filters
        .iter()
        .filter(|(k, _)| k != "cycle" && k != "academic_year")
        .collect();
    if !extra_filters.is_empty() {
        let rendered: Vec<String> = extra_filters
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        section.push_str(&format!("- **Filters:** {}\n", rendered.join(", ")));
    }
    section.push('\n');

    section
}

/// Generate the headline statistics section.
fn generate_statistics_section(statistics: &Statistics) -> String {
    let mut section = String::new();

    section.push_str("## Statistics\n\n");

    if let Some(total) = statistics.total_students {
        section.push_str(&format!("- **Total Students:** {}\n", total));
    }
    if let Some(total) = statistics.total_responses {
        section.push_str(&format!("- **Total Responses:** {}\n", total));
    }
    if let Some(rate) = statistics.completion_rate {
        section.push_str(&format!("- **Completion Rate:** {:.1}%\n", rate));
    }
    if let Some(score) = statistics.average_score {
        section.push_str(&format!("- **Average Score:** {:.2}\n", score));
    }
    for (key, value) in &statistics.extra {
        section.push_str(&format!("- **{}:** {}\n", key, render_json_value(value)));
    }
    section.push('\n');

    section
}

/// Generate the question-level analysis section.
fn generate_qla_section(qla: Option<&QlaData>) -> String {
    let mut section = String::new();

    section.push_str("## Question Level Analysis\n\n");

    let qla = match qla {
        Some(data) => data,
        None => {
            section.push_str("Question-level analysis was unavailable for this report.\n\n");
            return section;
        }
    };

    if qla.insights.is_empty() && qla.top_questions.is_empty() && qla.bottom_questions.is_empty() {
        section.push_str("Question-level analysis was unavailable for this report.\n\n");
        return section;
    }

    if !qla.insights.is_empty() {
        section.push_str("### Insights\n\n");
        section.push_str("| Insight | Agreement | Responses |\n");
        section.push_str("|:---|:---:|:---:|\n");
        for insight in &qla.insights {
            section.push_str(&format!(
                "| {} | {:.1}% | {} |\n",
                insight.title, insight.percentage_agreement, insight.total_responses
            ));
        }
        section.push('\n');
    }

    if !qla.top_questions.is_empty() {
        section.push_str(&generate_question_table(
            "Top Questions",
            &qla.top_questions,
        ));
    }
    if !qla.bottom_questions.is_empty() {
        section.push_str(&generate_question_table(
            "Bottom Questions",
            &qla.bottom_questions,
        ));
    }

    section
}

fn generate_question_table(title: &str, questions: &[crate::models::QlaQuestion]) -> String {
    let mut table = String::new();

    table.push_str(&format!("### {}\n\n", title));
    table.push_str("| Question | Score |\n");
    table.push_str("|:---|:---:|\n");
    for question in questions {
        let text = if question.text.is_empty() {
            &question.id
        } else {
            &question.text
        };
        let score = question
            .score
            .map(|s| format!("{:.2}", s))
            .unwrap_or_else(|| "-".to_string());
        table.push_str(&format!("| {} | {} |\n", text, score));
    }
    table.push('\n');

    table
}

/// Generate the word-cloud section.
fn generate_word_cloud_section(entries: &[WordCloudEntry]) -> String {
    let mut section = String::new();

    section.push_str("## Comment Word Cloud\n\n");

    if entries.is_empty() {
        section.push_str("No comment terms were returned for this scope.\n\n");
        return section;
    }

    let mut sorted: Vec<&WordCloudEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.size.partial_cmp(&a.size).unwrap_or(std::cmp::Ordering::Equal));

    section.push_str("| Term | Weight | Count |\n");
    section.push_str("|:---|:---:|:---:|\n");
    for entry in sorted.into_iter().take(WORD_CLOUD_LIMIT) {
        let count = entry
            .count
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        section.push_str(&format!(
            "| {} | {:.0} | {} |\n",
            entry.text, entry.size, count
        ));
    }
    section.push('\n');

    section
}

/// Generate the comment-themes section.
fn generate_themes_section(themes: &CommentThemes) -> String {
    let mut section = String::new();

    section.push_str("## Comment Themes\n\n");

    if !themes.positive_themes.is_empty() {
        section.push_str("### Positive Themes\n\n");
        for theme in &themes.positive_themes {
            section.push_str(&format!("- {} ({})\n", theme.name, theme.count));
        }
        section.push('\n');
    }

    if !themes.improvement_themes.is_empty() {
        section.push_str("### Improvement Themes\n\n");
        for theme in &themes.improvement_themes {
            section.push_str(&format!("- {} ({})\n", theme.name, theme.count));
        }
        section.push('\n');
    }

    if !themes.sample_comments.is_empty() {
        section.push_str("### Sample Comments\n\n");
        for comment in &themes.sample_comments {
            match &comment.year_group {
                Some(year_group) => section.push_str(&format!(
                    "> {} *(Year {})*\n\n",
                    comment.text, year_group
                )),
                None => section.push_str(&format!("> {}\n\n", comment.text)),
            }
        }
    }

    if themes.positive_themes.is_empty()
        && themes.improvement_themes.is_empty()
        && themes.sample_comments.is_empty()
    {
        section.push_str("No comment themes were returned for this scope.\n\n");
    }

    section
}

/// Generate the per-student breakdown section.
fn generate_student_section(student: &StudentSection) -> String {
    let mut section = String::new();

    section.push_str("## Student Breakdown\n\n");
    if !student.student.name.is_empty() {
        section.push_str(&format!("- **Name:** {}\n", student.student.name));
    }
    if !student.student.email.is_empty() {
        section.push_str(&format!("- **Email:** {}\n", student.student.email));
    }
    section.push_str(&format!(
        "- **RAG Summary:** {} green / {} amber / {} red / {} unrated\n\n",
        student.summary.green, student.summary.amber, student.summary.red, student.summary.none
    ));

    if !student.responses.is_empty() {
        section.push_str("### Responses\n\n");
        section.push_str("| Question | Response | RAG |\n");
        section.push_str("|:---|:---:|:---:|\n");
        for response in &student.responses {
            let text = if response.question_text.is_empty() {
                &response.question_id
            } else {
                &response.question_text
            };
            let value = response
                .response_value
                .as_ref()
                .map(render_json_value)
                .unwrap_or_else(|| "-".to_string());
            section.push_str(&format!(
                "| {} | {} | {} |\n",
                text, value, response.rag_rating
            ));
        }
        section.push('\n');
    }

    section.push_str("### Insight Scores\n\n");
    section.push_str("| Category | Score | Band |\n");
    section.push_str("|:---|:---:|:---:|\n");
    for score in &student.scores {
        section.push_str(&generate_score_row(score));
    }
    section.push('\n');

    for score in &student.scores {
        section.push_str(&generate_interpretation_block(score));
    }

    section
}

fn generate_score_row(score: &InsightScore) -> String {
    let title = get_insight(&score.category_id)
        .map(|c| c.title)
        .unwrap_or(score.category_id.as_str());

    match (score.mean, score.band) {
        (Some(mean), Some(band)) => format!("| {} | {:.2} | {} |\n", title, mean, band),
        _ => format!("| {} | - | No data |\n", title),
    }
}

fn generate_interpretation_block(score: &InsightScore) -> String {
    let (category, band) = match (get_insight(&score.category_id), score.band) {
        (Some(category), Some(band)) => (category, band),
        _ => return String::new(),
    };

    let mut block = String::new();

    block.push_str(&format!(
        "#### {} {} - {}\n\n",
        category.icon, category.title, band
    ));
    block.push_str(&format!("{}\n\n", category.description));
    for question in category.questions {
        block.push_str(&format!("- *{}*\n", question.text));
    }
    block.push('\n');
    block.push_str(&format!(
        "**Assessment:** {}\n\n",
        category.interpretation.for_band(band)
    ));
    block.push_str(&format!("> 💡 {}\n\n", category.rationale));

    block
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Report generated by insightdash*\n");

    footer
}

fn render_json_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Generate a JSON report.
pub fn generate_json_report(report: &DashboardReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write the rendered report content to a file.
#[allow(dead_code)] // Convenience wrapper
pub fn write_report_content(content: &str, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Band, QlaInsight, QlaQuestion, RagRating, SampleComment, Theme};
    use serde_json::json;

    fn create_test_report() -> DashboardReport {
        let metadata = ReportMetadata {
            establishment_name: "Northgate Academy".to_string(),
            academic_year: "2024-25".to_string(),
            cycle: 2,
            generated_at: Utc::now(),
            active_filters: vec![
                ("cycle".to_string(), "2".to_string()),
                ("academic_year".to_string(), "2024-25".to_string()),
                ("year_group".to_string(), "11".to_string()),
            ],
        };

        let statistics: Statistics = serde_json::from_value(json!({
            "totalStudents": 450,
            "totalResponses": 412,
            "completionRate": 91.5,
            "averageScore": 3.4,
            "nationalERI": 70.2
        }))
        .unwrap();

        let qla = QlaData {
            top_questions: vec![QlaQuestion {
                id: "q14".to_string(),
                text: "I want to do well at school".to_string(),
                score: Some(4.6),
            }],
            bottom_questions: vec![QlaQuestion {
                id: "q20".to_string(),
                text: "I feel stressed about exams".to_string(),
                score: Some(2.1),
            }],
            insights: vec![QlaInsight {
                id: "growth_mindset".to_string(),
                title: "Growth Mindset".to_string(),
                percentage_agreement: 62.5,
                question_ids: vec!["q5".to_string(), "q26".to_string()],
                icon: String::new(),
                total_responses: 412,
            }],
        };

        let themes = CommentThemes {
            positive_themes: vec![Theme {
                id: None,
                name: "Supportive teachers".to_string(),
                count: 34,
            }],
            improvement_themes: vec![Theme {
                id: None,
                name: "More revision guidance".to_string(),
                count: 21,
            }],
            sample_comments: vec![SampleComment {
                text: "I'd like more past papers.".to_string(),
                year_group: Some("11".to_string()),
                date: None,
            }],
        };

        DashboardReport {
            metadata,
            dashboard: DashboardViewModel {
                statistics: Some(statistics),
                qla: Some(qla),
                word_cloud: Some(vec![
                    WordCloudEntry {
                        text: "revision".to_string(),
                        size: 45.0,
                        count: Some(234),
                    },
                    WordCloudEntry {
                        text: "homework".to_string(),
                        size: 60.0,
                        count: Some(310),
                    },
                ]),
                comment_themes: Some(themes),
            },
            student: None,
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("# Insight Dashboard Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("Northgate Academy"));
        assert!(markdown.contains("## Statistics"));
        assert!(markdown.contains("**Total Students:** 450"));
        assert!(markdown.contains("nationalERI"));
        assert!(markdown.contains("Growth Mindset"));
        assert!(markdown.contains("62.5%"));
        assert!(markdown.contains("Supportive teachers"));
    }

    #[test]
    fn test_metadata_section_filters_line() {
        let report = create_test_report();
        let section = generate_metadata_section(&report.metadata);

        assert!(section.contains("**Cycle:** 2"));
        assert!(section.contains("**Academic Year:** 2024-25"));
        assert!(section.contains("**Filters:** year_group=11"));
        // cycle has its own line and is not repeated in the filter list
        assert!(!section.contains("cycle=2"));
    }

    #[test]
    fn test_missing_qla_renders_placeholder() {
        let mut report = create_test_report();
        report.dashboard.qla = Some(QlaData::empty());
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("Question-level analysis was unavailable"));
    }

    #[test]
    fn test_word_cloud_sorted_and_limited() {
        let entries: Vec<WordCloudEntry> = (0..30)
            .map(|i| WordCloudEntry {
                text: format!("term{}", i),
                size: i as f64,
                count: None,
            })
            .collect();

        let section = generate_word_cloud_section(&entries);
        // Highest-weight term first, lowest 10 dropped
        assert!(section.contains("| term29 | 29 | - |"));
        assert!(!section.contains("| term5 |"));
    }

    #[test]
    fn test_student_section_scores_and_interpretations() {
        let student = StudentSection {
            student: StudentInfo {
                name: "Alex Doe".to_string(),
                email: "alex@school.test".to_string(),
            },
            summary: RagSummary {
                green: 10,
                amber: 4,
                red: 2,
                none: 1,
            },
            responses: vec![
                StudentResponse {
                    question_id: "q5".to_string(),
                    question_text: "No matter who you are, you can change your intelligence a lot"
                        .to_string(),
                    response_value: Some(json!(4)),
                    rag_rating: RagRating::Green,
                },
                StudentResponse {
                    question_id: "q20".to_string(),
                    question_text: String::new(),
                    response_value: None,
                    rag_rating: RagRating::None,
                },
            ],
            scores: vec![
                InsightScore {
                    category_id: "growth_mindset".to_string(),
                    mean: Some(4.5),
                    band: Some(Band::Excellent),
                    count: 2,
                },
                InsightScore {
                    category_id: "exam_confidence".to_string(),
                    mean: None,
                    band: None,
                    count: 0,
                },
            ],
        };

        let section = generate_student_section(&student);

        assert!(section.contains("Alex Doe"));
        assert!(section.contains("10 green / 4 amber / 2 red / 1 unrated"));
        // Blank question text falls back to the question id, missing values render as "-"
        assert!(section.contains("| q20 | - | none |"));
        assert!(section.contains("| 4 | green |"));
        assert!(section.contains("| Growth Mindset | 4.50 | Excellent |"));
        assert!(section.contains("| Exam Confidence | - | No data |"));
        // Interpretation block only for banded categories
        assert!(section.contains("Growth Mindset - Excellent"));
        assert!(section.contains(
            "**Assessment:** Most students believe they can improve their abilities"
        ));
        assert!(!section.contains("Exam Confidence -"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"establishment_name\""));
        assert!(json.contains("\"statistics\""));
        assert!(json.contains("\"qla\""));
        // no student section requested
        assert!(!json.contains("\"student\""));
    }
}
