//! Analytics Service
//!
//! Derives attendance and rating rollups from current state. Everything
//! here is a plain read recomputed per request: no cached state, no locks
//! that block writers, and no mutation of core entities. A dashboard
//! response is assembled from independent counts, each internally
//! consistent on its own.

use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::AppError;

/// Per-event attendance and rating rollup
#[derive(Debug, Clone, Serialize)]
pub struct EventAnalytics {
    pub total_registrations: i64,
    pub checked_in: i64,
    /// Percentage of registrants checked in; exactly 0 with no registrations
    pub attendance_rate: f64,
    pub feedback_count: i64,
    /// Mean rating rounded to one decimal; 0 with no feedback
    pub average_rating: f64,
}

/// Organization-wide dashboard rollup
#[derive(Debug, Clone, Serialize)]
pub struct DashboardAnalytics {
    pub total_users: i64,
    pub students: i64,
    pub organizers: i64,
    pub total_events: i64,
    pub total_registrations: i64,
    /// Categories without events are omitted, not zero-filled
    pub events_by_category: HashMap<String, i64>,
}

/// Round to one decimal for display
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Read-only analytics over registrations, feedback, users, and events
#[derive(Debug, Clone)]
pub struct AnalyticsService {
    pool: PgPool,
}

impl AnalyticsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Compute the rollup for one event
    pub async fn event_analytics(&self, event_id: Uuid) -> Result<EventAnalytics, AppError> {
        let (total_registrations, checked_in): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COUNT(*) FILTER (WHERE checked_in)
            FROM registrations
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        let (feedback_count, average_rating): (i64, Option<f64>) = sqlx::query_as(
            r#"
            SELECT COUNT(*), AVG(rating)::float8
            FROM feedbacks
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        let attendance_rate = if total_registrations == 0 {
            0.0
        } else {
            100.0 * checked_in as f64 / total_registrations as f64
        };

        Ok(EventAnalytics {
            total_registrations,
            checked_in,
            attendance_rate,
            feedback_count,
            average_rating: round_one_decimal(average_rating.unwrap_or(0.0)),
        })
    }

    /// Compute the organization-wide dashboard
    pub async fn dashboard(&self) -> Result<DashboardAnalytics, AppError> {
        let (total_users, students, organizers): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE role = 'student'),
                COUNT(*) FILTER (WHERE role = 'organizer')
            FROM users
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let total_events: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;

        let total_registrations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM registrations")
            .fetch_one(&self.pool)
            .await?;

        let by_category: Vec<(String, i64)> =
            sqlx::query_as("SELECT category, COUNT(*) FROM events GROUP BY category")
                .fetch_all(&self.pool)
                .await?;

        Ok(DashboardAnalytics {
            total_users,
            students,
            organizers,
            total_events,
            total_registrations,
            events_by_category: by_category.into_iter().collect(),
        })
    }
}
