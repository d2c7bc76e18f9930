//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors
///
/// These errors represent business rule violations and domain invariant
/// failures. They are independent of the web/infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Event exists but is not accepting registrations
    #[error("Event is not open for registration: {0}")]
    EventNotOpen(Uuid),

    /// User already holds a registration for this event
    #[error("Already registered for event {0}")]
    AlreadyRegistered(Uuid),

    /// Event has no seats left
    #[error("Event capacity exceeded: {0}")]
    CapacityExceeded(Uuid),

    /// Presented ticket token does not resolve to a registration
    #[error("Invalid ticket credential")]
    InvalidCredential,

    /// Event not found
    #[error("Event not found: {0}")]
    EventNotFound(Uuid),

    /// Registration not found
    #[error("Registration not found: {0}")]
    RegistrationNotFound(Uuid),

    /// Rating outside the 1..=5 range
    #[error("Invalid rating: {0} (must be between 1 and 5)")]
    InvalidRating(i32),

    /// Feedback requires an attended (checked-in) registration
    #[error("Feedback requires attendance for event {0}")]
    FeedbackNotAllowed(Uuid),

    /// Feedback already submitted for this event
    #[error("Feedback already submitted for event {0}")]
    FeedbackAlreadySubmitted(Uuid),

    /// Event capacity must be positive
    #[error("Invalid capacity: {0} (must be greater than zero)")]
    InvalidCapacity(i32),
}

impl DomainError {
    /// Check if this is a conflict with existing state (HTTP 409 family)
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::EventNotOpen(_)
                | Self::AlreadyRegistered(_)
                | Self::CapacityExceeded(_)
                | Self::FeedbackAlreadySubmitted(_)
        )
    }

    /// Check if this means the target does not exist (HTTP 404 family)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::EventNotFound(_) | Self::RegistrationNotFound(_) | Self::InvalidCredential
        )
    }
}
