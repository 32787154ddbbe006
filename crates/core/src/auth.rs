//! The authorization gate in front of every workflow operation.

use crate::domain::identity::Identity;
use crate::errors::WorkflowError;
use crate::session::{self, SessionStore};

/// Explicit per-request identity context. Built once at the boundary from
/// the session and handed to the workflow; there is no ambient state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub identity: Option<Identity>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    pub fn of(identity: Identity) -> Self {
        Self { identity: Some(identity) }
    }

    pub fn from_session(store: &dyn SessionStore) -> Self {
        Self { identity: session::current_identity(store) }
    }

    /// First gate: an identity must be present at all.
    pub fn authenticated(&self) -> Result<&Identity, WorkflowError> {
        self.identity.as_ref().ok_or(WorkflowError::Unauthenticated)
    }

    /// Second gate, composed on the first: privileged operations require a
    /// Coordinator or Manager role.
    pub fn reviewer(&self) -> Result<&Identity, WorkflowError> {
        let identity = self.authenticated()?;
        if identity.role.is_reviewer() {
            Ok(identity)
        } else {
            Err(WorkflowError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::identity::{Identity, Role};
    use crate::errors::WorkflowError;

    use super::RequestContext;

    #[test]
    fn anonymous_context_fails_authentication() {
        let ctx = RequestContext::anonymous();
        assert_eq!(ctx.authenticated().unwrap_err(), WorkflowError::Unauthenticated);
        assert_eq!(ctx.reviewer().unwrap_err(), WorkflowError::Unauthenticated);
    }

    #[test]
    fn lecturer_passes_authentication_but_not_review_gate() {
        let ctx = RequestContext::of(Identity::new("lecturer@university.edu", Role::Lecturer));
        assert!(ctx.authenticated().is_ok());
        assert_eq!(ctx.reviewer().unwrap_err(), WorkflowError::Forbidden);
    }

    #[test]
    fn coordinator_and_manager_pass_the_review_gate() {
        for role in [Role::Coordinator, Role::Manager] {
            let ctx = RequestContext::of(Identity::new("reviewer@university.edu", role));
            assert!(ctx.reviewer().is_ok(), "{role} should pass the review gate");
        }
    }
}
