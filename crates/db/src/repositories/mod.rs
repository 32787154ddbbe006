use claimdesk_core::errors::RepositoryError;

pub mod claim;
pub mod memory;

pub use claim::SqlClaimRepository;
pub use memory::InMemoryClaimRepository;

pub(crate) fn storage_error(error: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Storage(error.to_string())
}
