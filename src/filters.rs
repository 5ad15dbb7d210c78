//! Filter state and the active-filter projection.
//!
//! Holds the current slicing parameters for every data request. The
//! `active_filters` projection drops unfiltered sentinel values ("all",
//! unset) and is what gets sent downstream.

use crate::context::default_academic_year;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sentinel value meaning "no filtering" for the optional dimensions.
const UNFILTERED: &str = "all";

/// The current dashboard slicing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterState {
    /// Survey cycle. A navigation dimension, not a transient filter:
    /// `reset` preserves it.
    pub cycle: u32,
    pub academic_year: String,
    pub year_group: Option<String>,
    pub group: Option<String>,
    pub faculty: Option<String>,
    pub gender: Option<String>,
    pub student_id: Option<String>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(default_academic_year())
    }
}

impl FilterState {
    /// Unfiltered state for the given academic year, cycle 1.
    pub fn new(academic_year: String) -> Self {
        Self {
            cycle: 1,
            academic_year,
            year_group: None,
            group: None,
            faculty: None,
            gender: None,
            student_id: None,
        }
    }

    /// Apply one filter update by key name.
    ///
    /// Returns true when the key is recognized and the value applied; an
    /// unrecognized key is a no-op, not an error. Callers reload dashboard
    /// data after a successful update if a scope is already selected.
    pub fn update(&mut self, key: &str, value: &str) -> bool {
        match key {
            "cycle" => match value.parse::<u32>() {
                Ok(cycle) if cycle >= 1 => {
                    self.cycle = cycle;
                    true
                }
                _ => {
                    debug!("ignoring invalid cycle value: {}", value);
                    false
                }
            },
            "academicYear" => {
                self.academic_year = value.to_string();
                true
            }
            "yearGroup" => {
                self.year_group = normalize(value);
                true
            }
            "group" => {
                self.group = normalize(value);
                true
            }
            "faculty" => {
                self.faculty = normalize(value);
                true
            }
            "gender" => {
                self.gender = normalize(value);
                true
            }
            "studentId" => {
                self.student_id = normalize(value);
                true
            }
            other => {
                debug!("ignoring unrecognized filter key: {}", other);
                false
            }
        }
    }

    /// Restore all filters to their unfiltered defaults, preserving the
    /// current cycle.
    pub fn reset(&mut self) {
        let cycle = self.cycle;
        *self = Self::new(default_academic_year());
        self.cycle = cycle;
    }

    /// Project the filters that are actually active, as canonical
    /// key/value query parameters. Entries at their unfiltered sentinel
    /// are excluded; everything else passes through unchanged.
    pub fn active_filters(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("cycle", self.cycle.to_string()),
            ("academic_year", self.academic_year.clone()),
        ];

        push_active(&mut params, "year_group", &self.year_group);
        push_active(&mut params, "group", &self.group);
        push_active(&mut params, "faculty", &self.faculty);
        push_active(&mut params, "gender", &self.gender);
        push_active(&mut params, "student_id", &self.student_id);

        params
    }
}

fn normalize(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(UNFILTERED) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn push_active(params: &mut Vec<(&'static str, String)>, key: &'static str, value: &Option<String>) {
    if let Some(v) = value {
        if !v.eq_ignore_ascii_case(UNFILTERED) {
            params.push((key, v.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> FilterState {
        FilterState::new("2024-25".to_string())
    }

    #[test]
    fn test_defaults_are_unfiltered() {
        let filters = state();
        assert_eq!(filters.cycle, 1);
        assert_eq!(filters.academic_year, "2024-25");
        assert!(filters.year_group.is_none());
        assert!(filters.student_id.is_none());
    }

    #[test]
    fn test_active_filters_drops_sentinels() {
        let mut filters = state();
        filters.update("yearGroup", "all");
        filters.update("cycle", "2");
        // student_id stays unset

        let active = filters.active_filters();
        assert!(active.iter().any(|(k, v)| *k == "cycle" && v == "2"));
        assert!(!active.iter().any(|(k, _)| *k == "year_group"));
        assert!(!active.iter().any(|(k, _)| *k == "student_id"));
    }

    #[test]
    fn test_active_filters_passes_values_unchanged() {
        let mut filters = state();
        filters.update("faculty", "Science");
        filters.update("gender", "Female");

        let active = filters.active_filters();
        assert!(active.iter().any(|(k, v)| *k == "faculty" && v == "Science"));
        assert!(active.iter().any(|(k, v)| *k == "gender" && v == "Female"));
        assert!(active
            .iter()
            .any(|(k, v)| *k == "academic_year" && v == "2024-25"));
    }

    #[test]
    fn test_update_unrecognized_key_is_noop() {
        let mut filters = state();
        let before = filters.clone();
        assert!(!filters.update("keyStage", "KS4"));
        assert_eq!(filters.active_filters(), before.active_filters());
    }

    #[test]
    fn test_update_invalid_cycle_is_noop() {
        let mut filters = state();
        assert!(!filters.update("cycle", "zero"));
        assert!(!filters.update("cycle", "0"));
        assert_eq!(filters.cycle, 1);
    }

    #[test]
    fn test_reset_preserves_cycle() {
        let mut filters = state();
        filters.update("cycle", "3");
        filters.update("yearGroup", "11");
        filters.update("studentId", "stu_42");

        filters.reset();

        assert_eq!(filters.cycle, 3);
        assert!(filters.year_group.is_none());
        assert!(filters.student_id.is_none());
    }

    #[test]
    fn test_update_all_sentinel_clears_filter() {
        let mut filters = state();
        filters.update("group", "Group A");
        assert_eq!(filters.group.as_deref(), Some("Group A"));

        filters.update("group", "all");
        assert!(filters.group.is_none());
    }
}
