//! Register Handler
//!
//! Accepts a registration for an event: capacity check, duplicate check,
//! credential mint, and the count increment as one atomic unit.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::credential::CredentialIssuer;
use crate::domain::{DomainError, EventStatus, Registration, UnknownVariant};
use crate::error::AppError;

use super::{RegisterCommand, RegisterResult};

/// Handler for event registrations
///
/// The whole accept path runs inside one transaction holding a row lock on
/// the event, so concurrent racers for the same event serialize here and
/// `registered_count <= capacity` holds under any interleaving. Every error
/// return before commit rolls the transaction back in full.
pub struct RegisterHandler {
    pool: PgPool,
}

impl RegisterHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Execute the register command
    pub async fn execute(&self, command: RegisterCommand) -> Result<RegisterResult, AppError> {
        let mut tx = self.pool.begin().await?;

        // Lock the event row; serializes concurrent registrations per event
        let event: Option<(String, i32, i32)> = sqlx::query_as(
            r#"
            SELECT status, capacity, registered_count
            FROM events
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(command.event_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (status, capacity, registered_count) =
            event.ok_or(DomainError::EventNotFound(command.event_id))?;

        let status: EventStatus = status
            .parse()
            .map_err(|e: UnknownVariant| AppError::Internal(e.to_string()))?;

        if !status.accepts_registrations() {
            return Err(DomainError::EventNotOpen(command.event_id).into());
        }

        let already_registered: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM registrations WHERE event_id = $1 AND user_id = $2)",
        )
        .bind(command.event_id)
        .bind(command.user_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_registered {
            return Err(DomainError::AlreadyRegistered(command.event_id).into());
        }

        if registered_count >= capacity {
            return Err(DomainError::CapacityExceeded(command.event_id).into());
        }

        let minted = CredentialIssuer::mint();
        let registration_id = Uuid::new_v4();

        let registered_at: DateTime<Utc> = sqlx::query_scalar(
            r#"
            INSERT INTO registrations (id, event_id, user_id, credential_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING registered_at
            "#,
        )
        .bind(registration_id)
        .bind(command.event_id)
        .bind(command.user_id)
        .bind(&minted.hash)
        .fetch_one(&mut *tx)
        .await?;

        // The row lock makes this call the only writer; the condition still
        // refuses to break the invariant if the count drifted out of band
        let rows = sqlx::query(
            r#"
            UPDATE events
            SET registered_count = registered_count + 1
            WHERE id = $1 AND registered_count < capacity
            "#,
        )
        .bind(command.event_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(DomainError::CapacityExceeded(command.event_id).into());
        }

        tx.commit().await?;

        tracing::info!(
            event_id = %command.event_id,
            user_id = %command.user_id,
            registration_id = %registration_id,
            "Registration accepted"
        );

        Ok(RegisterResult {
            registration: Registration {
                id: registration_id,
                event_id: command.event_id,
                user_id: command.user_id,
                registered_at,
                checked_in: false,
                checked_in_at: None,
            },
            credential_image: CredentialIssuer::render_image(&minted.token),
            credential: minted.token,
        })
    }
}
