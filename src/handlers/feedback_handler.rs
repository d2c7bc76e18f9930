//! Feedback Handler
//!
//! Accepts one rating per attended event per user.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{DomainError, Feedback};
use crate::error::AppError;

use super::FeedbackCommand;

/// Handler for feedback submission
pub struct FeedbackHandler {
    pool: PgPool,
}

impl FeedbackHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Execute the feedback command
    pub async fn execute(&self, command: FeedbackCommand) -> Result<Feedback, AppError> {
        if !(1..=5).contains(&command.rating) {
            return Err(DomainError::InvalidRating(command.rating).into());
        }

        let attended: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM registrations
                WHERE event_id = $1 AND user_id = $2 AND checked_in
            )
            "#,
        )
        .bind(command.event_id)
        .bind(command.user_id)
        .fetch_one(&self.pool)
        .await?;

        if !attended {
            return Err(DomainError::FeedbackNotAllowed(command.event_id).into());
        }

        let feedback_id = Uuid::new_v4();

        // ON CONFLICT makes the one-feedback-per-pair rule atomic; a racer
        // that loses gets no row back
        let created_at: Option<DateTime<Utc>> = sqlx::query_scalar(
            r#"
            INSERT INTO feedbacks (id, event_id, user_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (event_id, user_id) DO NOTHING
            RETURNING created_at
            "#,
        )
        .bind(feedback_id)
        .bind(command.event_id)
        .bind(command.user_id)
        .bind(command.rating)
        .bind(&command.comment)
        .fetch_optional(&self.pool)
        .await?;

        let created_at =
            created_at.ok_or(DomainError::FeedbackAlreadySubmitted(command.event_id))?;

        Ok(Feedback {
            id: feedback_id,
            event_id: command.event_id,
            user_id: command.user_id,
            rating: command.rating,
            comment: command.comment,
            created_at,
        })
    }

    /// List feedback for an event, newest first
    pub async fn list_for_event(&self, event_id: Uuid) -> Result<Vec<Feedback>, AppError> {
        let rows: Vec<(Uuid, Uuid, Uuid, i32, String, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT id, event_id, user_id, rating, comment, created_at
            FROM feedbacks
            WHERE event_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(id, event_id, user_id, rating, comment, created_at)| Feedback {
                    id,
                    event_id,
                    user_id,
                    rating,
                    comment,
                    created_at,
                },
            )
            .collect())
    }
}
