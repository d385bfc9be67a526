//! hrms-file - File-backed credential store.
//!
//! Keeps the HRMS access and refresh tokens in a JSON file so a session
//! outlives the process that logged in.

mod store;

pub use store::FileCredentialStore;
