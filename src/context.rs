//! Context resolution: who is asking, and for which establishment.
//!
//! Resolution is a small state machine: identity first, then the
//! super-user check, then scope. A super-user gets the full establishment
//! list and defers selection to an explicit choice; staff are bound to
//! exactly one establishment through the host's role-binding records, and
//! resolution fails if no binding exists. An authorization-service outage
//! is not fatal: the resolver degrades to the least-privileged assumption.

use crate::api::{AnalyticsApi, AnalyticsClient};
use crate::error::DashboardError;
use crate::models::{Establishment, UserContext};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// The academic year rolls over on 1 August.
const ACADEMIC_YEAR_START_MONTH: u32 = 8;

/// Academic year label for a given date, e.g. `2024-25`.
pub fn academic_year_for(date: NaiveDate) -> String {
    let year = date.year();
    if date.month() >= ACADEMIC_YEAR_START_MONTH {
        format!("{}-{:02}", year, (year + 1) % 100)
    } else {
        format!("{}-{:02}", year - 1, year % 100)
    }
}

/// Academic year label for today.
pub fn default_academic_year() -> String {
    academic_year_for(Utc::now().date_naive())
}

/// Host session capability: the places a user email may come from.
///
/// Sources are probed in declaration order; any of them may be absent.
pub trait SessionProvider: Send + Sync {
    /// Explicitly configured email (config file or CLI).
    fn config_email(&self) -> Option<String> {
        None
    }

    /// Email from the host session's user-attributes accessor.
    fn attribute_email(&self) -> Option<String> {
        None
    }

    /// Email from the host session's user object.
    fn session_email(&self) -> Option<String> {
        None
    }
}

/// A session backed only by an explicitly supplied email.
pub struct StaticSession {
    email: Option<String>,
}

impl StaticSession {
    pub fn new(email: Option<String>) -> Self {
        Self { email }
    }
}

impl SessionProvider for StaticSession {
    fn config_email(&self) -> Option<String> {
        self.email.clone()
    }
}

/// Host-owned role-binding record lookup.
#[async_trait]
pub trait RoleBindingStore: Send + Sync {
    /// The establishment bound to a staff email, if a binding record
    /// exists and carries an establishment reference.
    async fn establishment_for_email(&self, email: &str)
        -> Result<Option<String>, DashboardError>;
}

#[async_trait]
impl RoleBindingStore for AnalyticsClient {
    async fn establishment_for_email(
        &self,
        email: &str,
    ) -> Result<Option<String>, DashboardError> {
        self.lookup_role_binding(email).await
    }
}

/// Resolution progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    Unresolved,
    ResolvingIdentity,
    ResolvingScope,
    Ready,
    Failed,
}

/// Resolves the acting user's identity and establishment scope.
pub struct ContextResolver {
    api: Arc<dyn AnalyticsApi>,
    roles: Arc<dyn RoleBindingStore>,
    session: Box<dyn SessionProvider>,
    state: ResolverState,
    context: Option<UserContext>,
    establishments: Vec<Establishment>,
}

impl ContextResolver {
    pub fn new(
        api: Arc<dyn AnalyticsApi>,
        roles: Arc<dyn RoleBindingStore>,
        session: Box<dyn SessionProvider>,
    ) -> Self {
        Self {
            api,
            roles,
            session,
            state: ResolverState::Unresolved,
            context: None,
            establishments: Vec::new(),
        }
    }

    /// Run the full resolution: identity, super-user check, scope.
    pub async fn resolve(&mut self) -> Result<UserContext, DashboardError> {
        self.state = ResolverState::ResolvingIdentity;

        let email = match self.resolve_email() {
            Some(email) => email,
            None => return Err(self.fail(DashboardError::IdentityUnresolved)),
        };
        info!("Resolved user email: {}", email);

        let is_super_user = match self.api.check_super_user(&email).await {
            Ok(flag) => flag,
            Err(e) => {
                // Authorization outage: degrade to the least-privileged
                // assumption and continue.
                warn!("Super-user check failed ({}); assuming staff scope", e);
                false
            }
        };

        self.state = ResolverState::ResolvingScope;

        let establishment_id = if is_super_user {
            let establishments = match self.api.get_establishments().await {
                Ok(list) => list,
                Err(e) => return Err(self.fail(e)),
            };
            info!("Loaded {} establishments for selection", establishments.len());
            self.establishments = establishments;
            // Selection is deferred to an explicit choice.
            None
        } else {
            match self.roles.establishment_for_email(&email).await {
                Ok(Some(id)) => Some(id),
                Ok(None) => {
                    return Err(self.fail(DashboardError::ScopeUnresolved(format!(
                        "no role binding found for {}",
                        email
                    ))))
                }
                Err(e) => return Err(self.fail(e)),
            }
        };

        let context = UserContext {
            email,
            is_super_user,
            establishment_id,
        };

        self.context = Some(context.clone());
        self.state = ResolverState::Ready;
        Ok(context)
    }

    /// Record an explicit establishment choice (super-user flow).
    pub fn select_establishment(&mut self, id: &str) -> Result<(), DashboardError> {
        if id.trim().is_empty() {
            return Err(DashboardError::MissingField("establishment id"));
        }

        match self.context.as_mut() {
            Some(context) => {
                context.establishment_id = Some(id.to_string());
                Ok(())
            }
            None => Err(DashboardError::ScopeUnresolved(
                "context not resolved yet".to_string(),
            )),
        }
    }

    pub fn state(&self) -> ResolverState {
        self.state
    }

    /// Establishment list loaded for a super-user; empty for staff.
    pub fn establishments(&self) -> &[Establishment] {
        &self.establishments
    }

    pub fn context(&self) -> Option<&UserContext> {
        self.context.as_ref()
    }

    /// The currently selected establishment, if any.
    pub fn selected_establishment(&self) -> Option<&str> {
        self.context
            .as_ref()
            .and_then(|c| c.establishment_id.as_deref())
    }

    fn resolve_email(&self) -> Option<String> {
        self.session
            .config_email()
            .or_else(|| self.session.attribute_email())
            .or_else(|| self.session.session_email())
            .filter(|e| !e.trim().is_empty())
    }

    fn fail(&mut self, error: DashboardError) -> DashboardError {
        self.state = ResolverState::Failed;
        error
    }
}
