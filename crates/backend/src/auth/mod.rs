//! Cookie-based session authentication.
//!
//! This module provides:
//! - JWT session token creation and validation
//! - `POST /jwt` issuing the session cookie
//! - `require_auth` middleware for protecting routes
//! - the ownership rule for per-user reads

mod handlers;
mod jwt;
mod middleware;
mod ownership;
pub mod types;

pub use handlers::{issue_token, logout};
pub use jwt::{create_token, validate_token};
pub use middleware::{build_auth_cookie, build_clear_cookie, extract_auth_user, require_auth};
pub use ownership::ensure_owner;
