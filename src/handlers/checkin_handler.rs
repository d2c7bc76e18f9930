//! Check-In Handler
//!
//! Advances a registration from not-checked-in to checked-in exactly once.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::DomainError;
use crate::error::AppError;

use super::{CheckInCommand, CheckInResult, CheckInStatus};

/// Handler for the check-in state transition
pub struct CheckInHandler {
    pool: PgPool,
}

impl CheckInHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Execute the check-in command
    ///
    /// The transition is one conditional update, so of any set of concurrent
    /// duplicate calls exactly one stamps the timestamp; the rest observe
    /// `already_checked_in` with the original timestamp and mutate nothing.
    pub async fn execute(&self, command: CheckInCommand) -> Result<CheckInResult, AppError> {
        let stamped: Option<DateTime<Utc>> = sqlx::query_scalar(
            r#"
            UPDATE registrations
            SET checked_in = TRUE, checked_in_at = NOW()
            WHERE id = $1 AND checked_in = FALSE
            RETURNING checked_in_at
            "#,
        )
        .bind(command.registration_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(checked_in_at) = stamped {
            tracing::info!(
                registration_id = %command.registration_id,
                "Checked in"
            );
            return Ok(CheckInResult {
                status: CheckInStatus::Ok,
                checked_in_at,
            });
        }

        // No row transitioned: either already checked in or unknown id.
        // checked_in never reverses, so this read cannot race backwards.
        let existing: Option<Option<DateTime<Utc>>> =
            sqlx::query_scalar("SELECT checked_in_at FROM registrations WHERE id = $1")
                .bind(command.registration_id)
                .fetch_optional(&self.pool)
                .await?;

        match existing {
            Some(Some(checked_in_at)) => Ok(CheckInResult {
                status: CheckInStatus::AlreadyCheckedIn,
                checked_in_at,
            }),
            // Unreachable while the checked_in/checked_in_at CHECK holds
            Some(None) => Err(AppError::Internal(format!(
                "registration {} is checked in without a timestamp",
                command.registration_id
            ))),
            None => Err(DomainError::RegistrationNotFound(command.registration_id).into()),
        }
    }

    /// Event the registration belongs to, for ownership checks at the boundary
    pub async fn event_of(&self, registration_id: Uuid) -> Result<Uuid, AppError> {
        let event_id: Option<Uuid> =
            sqlx::query_scalar("SELECT event_id FROM registrations WHERE id = $1")
                .bind(registration_id)
                .fetch_optional(&self.pool)
                .await?;

        event_id.ok_or_else(|| DomainError::RegistrationNotFound(registration_id).into())
    }
}
