//! Domain module
//!
//! Infrastructure-free domain types, errors, and operation context.

pub mod context;
pub mod error;
pub mod types;

pub use context::OperationContext;
pub use error::DomainError;
pub use types::{EventCategory, EventStatus, Feedback, Registration, UnknownVariant, UserRole};
