//! In-process credential stores.

mod cookie;
mod memory;

pub use cookie::{CookieCredentialStore, DEFAULT_REFRESH_COOKIE};
pub use memory::MemoryCredentialStore;
