//! Core entity types and enumerations
//!
//! Roles, event lifecycle states, categories, and the records owned by the
//! registration core. Enum values are stored as lowercase text columns, so
//! each enum carries `as_str`/`FromStr` conversions used at the database
//! boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Error for parsing an unknown enum value from storage or a request
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Caller role, supplied by the upstream identity provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Organizer,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Organizer => "organizer",
            UserRole::Admin => "admin",
        }
    }

    /// Organizers and admins may create and manage events
    pub fn can_manage_events(&self) -> bool {
        matches!(self, UserRole::Organizer | UserRole::Admin)
    }
}

impl FromStr for UserRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(UserRole::Student),
            "organizer" => Ok(UserRole::Organizer),
            "admin" => Ok(UserRole::Admin),
            other => Err(UnknownVariant {
                kind: "user role",
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event lifecycle status
///
/// Only `Upcoming` events accept registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Upcoming => "upcoming",
            EventStatus::Ongoing => "ongoing",
            EventStatus::Completed => "completed",
            EventStatus::Cancelled => "cancelled",
        }
    }

    pub fn accepts_registrations(&self) -> bool {
        matches!(self, EventStatus::Upcoming)
    }
}

impl FromStr for EventStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(EventStatus::Upcoming),
            "ongoing" => Ok(EventStatus::Ongoing),
            "completed" => Ok(EventStatus::Completed),
            "cancelled" => Ok(EventStatus::Cancelled),
            other => Err(UnknownVariant {
                kind: "event status",
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event category used for dashboard breakdowns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Technical,
    Cultural,
    Sports,
    Workshop,
    Seminar,
    Fest,
    Other,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Technical => "technical",
            EventCategory::Cultural => "cultural",
            EventCategory::Sports => "sports",
            EventCategory::Workshop => "workshop",
            EventCategory::Seminar => "seminar",
            EventCategory::Fest => "fest",
            EventCategory::Other => "other",
        }
    }
}

impl FromStr for EventCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "technical" => Ok(EventCategory::Technical),
            "cultural" => Ok(EventCategory::Cultural),
            "sports" => Ok(EventCategory::Sports),
            "workshop" => Ok(EventCategory::Workshop),
            "seminar" => Ok(EventCategory::Seminar),
            "fest" => Ok(EventCategory::Fest),
            "other" => Ok(EventCategory::Other),
            other => Err(UnknownVariant {
                kind: "event category",
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's registration for one event
///
/// Invariants: unique per `(event_id, user_id)`; `checked_in_at` is set
/// exactly when `checked_in` is true; `checked_in` transitions false→true
/// exactly once and is never reversed. The credential hash is set at
/// creation and immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub registered_at: DateTime<Utc>,
    pub checked_in: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
}

/// Feedback from a checked-in attendee, at most one per `(event, user)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [UserRole::Student, UserRole::Organizer, UserRole::Admin] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert!("superuser".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_role_permissions() {
        assert!(!UserRole::Student.can_manage_events());
        assert!(UserRole::Organizer.can_manage_events());
        assert!(UserRole::Admin.can_manage_events());
    }

    #[test]
    fn test_status_accepts_registrations() {
        assert!(EventStatus::Upcoming.accepts_registrations());
        assert!(!EventStatus::Ongoing.accepts_registrations());
        assert!(!EventStatus::Completed.accepts_registrations());
        assert!(!EventStatus::Cancelled.accepts_registrations());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            EventStatus::Upcoming,
            EventStatus::Ongoing,
            EventStatus::Completed,
            EventStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<EventStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_category_round_trip() {
        let all = [
            EventCategory::Technical,
            EventCategory::Cultural,
            EventCategory::Sports,
            EventCategory::Workshop,
            EventCategory::Seminar,
            EventCategory::Fest,
            EventCategory::Other,
        ];
        for category in all {
            assert_eq!(category.as_str().parse::<EventCategory>().unwrap(), category);
        }
    }

    #[test]
    fn test_unknown_variant_message() {
        let err = "gala".parse::<EventCategory>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown event category: gala");
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&UserRole::Organizer).unwrap();
        assert_eq!(json, "\"organizer\"");

        let status: EventStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, EventStatus::Cancelled);
    }
}
