//! # CMS Shared
//!
//! Shared types, configuration, and telemetry for the CMS backend.

pub mod constants;
pub mod types;
pub mod telemetry;
pub mod config;
pub mod error;

pub use types::*;
pub use error::AppError;
