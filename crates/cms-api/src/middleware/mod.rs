//! Request middleware: bearer authentication, the menu-driven path guard
//! and per-route-group access requirements.

pub mod auth;
pub mod authorization;

pub use auth::{authenticate, CurrentUser};
pub use authorization::{authorize_path, require_access};
