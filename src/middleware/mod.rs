pub mod auth;
pub mod security_headers;

// Re-export for use in handlers and tests
#[allow(unused_imports)]
pub use auth::{AuthUser, Claims};
