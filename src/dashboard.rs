//! Data fusion orchestrator.
//!
//! Issues the four facet requests concurrently, merges the results into
//! one view model, and replaces the held snapshot atomically. The QLA
//! facet is special-cased: its failure is recovered with a well-formed
//! empty result so the rest of the view model still assembles. The other
//! three facets propagate failure to the caller.
//!
//! Concurrent loads are fenced with a generation token: a superseded
//! in-flight load may finish, but only the latest token's result is
//! committed to the shared view model.

use crate::api::AnalyticsApi;
use crate::error::DashboardError;
use crate::filters::FilterState;
use crate::models::{DashboardViewModel, QlaData};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Orchestrates facet fetches and owns the merged view model.
pub struct DashboardEngine {
    api: Arc<dyn AnalyticsApi>,
    /// Last committed snapshot, paired with the token that produced it so
    /// the compare-and-replace happens under one lock.
    view_model: Mutex<(u64, DashboardViewModel)>,
    generation: AtomicU64,
}

impl DashboardEngine {
    pub fn new(api: Arc<dyn AnalyticsApi>) -> Self {
        Self {
            api,
            view_model: Mutex::new((0, DashboardViewModel::default())),
            generation: AtomicU64::new(0),
        }
    }

    /// Load all four dashboard facets for the given establishment.
    ///
    /// Fails immediately, without any network activity, when no
    /// establishment is selected. Returns the merged view model; the
    /// shared snapshot is only replaced if this load has not been
    /// superseded by a newer one.
    pub async fn load_dashboard_data(
        &self,
        establishment_id: Option<&str>,
        filters: &FilterState,
    ) -> Result<DashboardViewModel, DashboardError> {
        let establishment_id =
            establishment_id.ok_or(DashboardError::NoEstablishmentSelected)?;

        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let active = filters.active_filters();
        debug!(
            "Loading dashboard data for {} with {} active filters (token {})",
            establishment_id,
            active.len(),
            token
        );

        let (statistics, qla, word_cloud, comment_themes) = tokio::join!(
            self.api.get_statistics(establishment_id, &active),
            self.api.get_question_level_analysis(establishment_id, &active),
            self.api.get_word_cloud(establishment_id, &active),
            self.api.get_comment_themes(establishment_id, &active),
        );

        let statistics = statistics.map_err(|e| facet_error("statistics", e))?;
        let word_cloud = word_cloud.map_err(|e| facet_error("word cloud", e))?;
        let comment_themes = comment_themes.map_err(|e| facet_error("comment themes", e))?;

        // QLA must never abort the batch.
        let qla = qla.unwrap_or_else(|e| {
            warn!("QLA facet failed ({}); substituting empty result", e);
            QlaData::empty()
        });

        let view_model = DashboardViewModel {
            statistics: Some(statistics),
            qla: Some(qla),
            word_cloud: Some(word_cloud),
            comment_themes: Some(comment_themes),
        };

        self.commit(token, view_model.clone());
        info!("Dashboard data loaded for {}", establishment_id);
        Ok(view_model)
    }

    /// Apply one filter update and, when a scope is selected, reload.
    ///
    /// An unrecognized filter key is a no-op and triggers no reload.
    pub async fn apply_filter_update(
        &self,
        filters: &mut FilterState,
        key: &str,
        value: &str,
        establishment_id: Option<&str>,
    ) -> Result<Option<DashboardViewModel>, DashboardError> {
        if !filters.update(key, value) {
            return Ok(None);
        }

        match establishment_id {
            Some(id) => self
                .load_dashboard_data(Some(id), filters)
                .await
                .map(Some),
            None => Ok(None),
        }
    }

    /// The last committed snapshot.
    pub fn view_model(&self) -> DashboardViewModel {
        self.view_model
            .lock()
            .expect("view model lock poisoned")
            .1
            .clone()
    }

    /// Replace the snapshot wholesale, unless a newer load has already
    /// committed. Token comparison and replacement happen under the same
    /// lock, so a stale load can never overwrite a newer snapshot.
    fn commit(&self, token: u64, view_model: DashboardViewModel) {
        let mut guard = self.view_model.lock().expect("view model lock poisoned");
        if token > guard.0 {
            *guard = (token, view_model);
        } else {
            debug!("Discarding superseded dashboard load (token {})", token);
        }
    }
}

fn facet_error(facet: &'static str, error: DashboardError) -> DashboardError {
    DashboardError::Facet {
        facet,
        message: error.to_string(),
    }
}
