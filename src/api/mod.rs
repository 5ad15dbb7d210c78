//! Analytics service interface.
//!
//! The orchestrator depends on the `AnalyticsApi` trait, never on the
//! concrete transport: production wires in the reqwest-backed
//! `AnalyticsClient`, tests wire in in-memory doubles.

pub mod client;

pub use client::AnalyticsClient;

use crate::error::DashboardError;
use crate::models::{
    CommentThemes, Establishment, QlaData, Statistics, StudentResponseReport, WordCloudEntry,
};
use async_trait::async_trait;

/// Active filter query parameters, canonical key names.
pub type FilterParams = [(&'static str, String)];

/// The external analytics service consumed by the dashboard engine.
#[async_trait]
pub trait AnalyticsApi: Send + Sync {
    /// Full establishment list, used for super-user scope selection.
    async fn get_establishments(&self) -> Result<Vec<Establishment>, DashboardError>;

    /// Whether the given email has the super-user role.
    async fn check_super_user(&self, email: &str) -> Result<bool, DashboardError>;

    /// Aggregate metrics facet.
    async fn get_statistics(
        &self,
        establishment_id: &str,
        filters: &FilterParams,
    ) -> Result<Statistics, DashboardError>;

    /// Question-level analysis facet.
    async fn get_question_level_analysis(
        &self,
        establishment_id: &str,
        filters: &FilterParams,
    ) -> Result<QlaData, DashboardError>;

    /// Comment word-cloud facet.
    async fn get_word_cloud(
        &self,
        establishment_id: &str,
        filters: &FilterParams,
    ) -> Result<Vec<WordCloudEntry>, DashboardError>;

    /// Comment-themes facet.
    async fn get_comment_themes(
        &self,
        establishment_id: &str,
        filters: &FilterParams,
    ) -> Result<CommentThemes, DashboardError>;

    /// Raw per-question responses for one student and cycle.
    async fn get_student_responses(
        &self,
        student_id: &str,
        cycle: u32,
    ) -> Result<StudentResponseReport, DashboardError>;
}
