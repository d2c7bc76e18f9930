//! Command definitions
//!
//! Commands represent intentions to change the system state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Registration;

/// Command to register a user for an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterCommand {
    pub event_id: Uuid,
    pub user_id: Uuid,
}

impl RegisterCommand {
    pub fn new(event_id: Uuid, user_id: Uuid) -> Self {
        Self { event_id, user_id }
    }
}

/// Result of a successful registration
///
/// Carries the presentable token and its scannable payload; neither is
/// recoverable from the server afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterResult {
    pub registration: Registration,
    pub credential: String,
    pub credential_image: String,
}

/// Command to check a registration in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInCommand {
    pub registration_id: Uuid,
}

impl CheckInCommand {
    pub fn new(registration_id: Uuid) -> Self {
        Self { registration_id }
    }
}

/// Outcome of a check-in attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInStatus {
    /// This call performed the transition
    Ok,
    /// The registration was already checked in; state unchanged
    AlreadyCheckedIn,
}

/// Result of a check-in attempt
///
/// `checked_in_at` is the timestamp of the one transition that happened,
/// regardless of which call performed it.
#[derive(Debug, Clone, Serialize)]
pub struct CheckInResult {
    pub status: CheckInStatus,
    pub checked_in_at: DateTime<Utc>,
}

/// Command to submit feedback for an attended event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackCommand {
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: String,
}

impl FeedbackCommand {
    pub fn new(event_id: Uuid, user_id: Uuid, rating: i32, comment: String) -> Self {
        Self {
            event_id,
            user_id,
            rating,
            comment,
        }
    }
}
