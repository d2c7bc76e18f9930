//! campus_pulse Library
//!
//! Re-exports modules for integration testing and external use.

pub mod analytics;
pub mod api;
pub mod catalog;
pub mod credential;
pub mod domain;
pub mod handlers;

// Private modules (used only by main.rs binary)
pub mod config;
pub mod db;
mod error;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use domain::{DomainError, EventCategory, EventStatus, OperationContext, UserRole};
