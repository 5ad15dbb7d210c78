//! Error types for the dashboard engine.
//!
//! Errors that block establishing a usable scope are fatal and halt further
//! action; errors confined to a single data facet are contained by the
//! orchestrator and surfaced per facet.

use thiserror::Error;

/// Errors produced by the dashboard core.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// No user email could be obtained from any identity source.
    #[error("unable to determine user email; ensure you are logged in or pass --email")]
    IdentityUnresolved,

    /// A non-super-user could not be bound to exactly one establishment.
    #[error("unable to determine establishment: {0}")]
    ScopeUnresolved(String),

    /// A data load was requested before an establishment was selected.
    #[error("no establishment selected")]
    NoEstablishmentSelected,

    /// One of the dashboard facets failed to load.
    #[error("failed to load {facet}: {message}")]
    Facet {
        facet: &'static str,
        message: String,
    },

    /// A required request field was missing before any network call.
    #[error("required field missing: {0}")]
    MissingField(&'static str),

    /// Transport or protocol failure talking to the analytics service.
    #[error("analytics service error: {0}")]
    Api(String),
}

impl DashboardError {
    /// True when the error blocks establishing a usable scope (fatal),
    /// as opposed to a contained per-facet data error.
    pub fn is_scope_error(&self) -> bool {
        matches!(
            self,
            DashboardError::IdentityUnresolved
                | DashboardError::ScopeUnresolved(_)
                | DashboardError::NoEstablishmentSelected
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_errors_are_fatal() {
        assert!(DashboardError::NoEstablishmentSelected.is_scope_error());
        assert!(DashboardError::IdentityUnresolved.is_scope_error());
        assert!(DashboardError::ScopeUnresolved("no records".into()).is_scope_error());
    }

    #[test]
    fn test_facet_errors_are_contained() {
        let err = DashboardError::Facet {
            facet: "statistics",
            message: "timeout".into(),
        };
        assert!(!err.is_scope_error());
        assert_eq!(err.to_string(), "failed to load statistics: timeout");
    }
}
