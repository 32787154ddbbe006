use thiserror::Error;

use crate::domain::claim::ClaimId;
use crate::uploads::FileRejection;
use crate::validation::FieldErrors;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Everything a workflow operation can fail with. Each variant carries
/// enough context for the boundary to pick a user-facing message and a
/// navigation outcome; nothing propagates uncaught past route handlers.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum WorkflowError {
    #[error("please correct the validation errors: {0}")]
    Validation(FieldErrors),
    #[error(transparent)]
    FileRejected(#[from] FileRejection),
    #[error("user session expired")]
    Unauthenticated,
    #[error("caller lacks permission for this action")]
    Forbidden,
    #[error("claim {0} not found")]
    NotFound(ClaimId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("document storage failure: {0}")]
    DocumentStorage(String),
}

/// Where the boundary should send the caller after a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    /// Redirect to the login entry point.
    Login,
    /// Redirect to the neutral home page.
    Home,
    /// Safe fallback: the caller's claim list.
    ClaimList,
    /// Re-render the current form with the caller's input preserved.
    Retain,
}

impl WorkflowError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(_) => "Please correct the validation errors.".to_string(),
            Self::FileRejected(rejection) => rejection.to_string(),
            Self::Unauthenticated => "User session expired. Please login again.".to_string(),
            Self::Forbidden => {
                "You don't have permission to perform this action.".to_string()
            }
            Self::NotFound(id) => format!("Claim with ID {id} not found."),
            Self::Repository(_) | Self::DocumentStorage(_) => {
                "An error occurred while processing your claim. Please try again.".to_string()
            }
        }
    }

    pub fn navigation(&self) -> Navigation {
        match self {
            Self::Validation(_) | Self::FileRejected(_) => Navigation::Retain,
            Self::Unauthenticated => Navigation::Login,
            Self::Forbidden => Navigation::Home,
            Self::NotFound(_) | Self::Repository(_) | Self::DocumentStorage(_) => {
                Navigation::ClaimList
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::claim::ClaimId;
    use crate::validation::FieldErrors;

    use super::{Navigation, RepositoryError, WorkflowError};

    #[test]
    fn unauthenticated_redirects_to_login() {
        assert_eq!(WorkflowError::Unauthenticated.navigation(), Navigation::Login);
    }

    #[test]
    fn forbidden_redirects_home() {
        assert_eq!(WorkflowError::Forbidden.navigation(), Navigation::Home);
    }

    #[test]
    fn recoverable_errors_retain_caller_input() {
        let mut errors = FieldErrors::default();
        errors.push("month", "Month must be between 1 and 12.");
        assert_eq!(WorkflowError::Validation(errors).navigation(), Navigation::Retain);
    }

    #[test]
    fn unexpected_errors_fall_back_to_the_claim_list_with_a_generic_message() {
        let error = WorkflowError::Repository(RepositoryError::Storage("disk full".to_string()));
        assert_eq!(error.navigation(), Navigation::ClaimList);
        assert!(!error.user_message().contains("disk full"));
    }

    #[test]
    fn not_found_names_the_claim_id() {
        let error = WorkflowError::NotFound(ClaimId("999".to_string()));
        assert!(error.user_message().contains("999"));
    }
}
