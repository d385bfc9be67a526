//! Contracts for the session's external collaborators.

mod credential_store;
mod navigator;

pub use credential_store::CredentialStore;
pub use navigator::Navigator;
