//! Event Catalog
//!
//! Owns event records. The registration core consults it read-only; the
//! only writer of `registered_count` is the registration accept path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{DomainError, EventCategory, EventStatus};
use crate::error::AppError;

/// Full event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: EventCategory,
    pub venue: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub capacity: i32,
    pub registered_count: i32,
    pub organizer_id: Uuid,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an event
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub category: EventCategory,
    pub venue: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub capacity: i32,
    pub organizer_id: Uuid,
}

type EventRow = (
    Uuid,
    String,
    String,
    String,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
    i32,
    i32,
    Uuid,
    String,
    DateTime<Utc>,
);

const EVENT_COLUMNS: &str = "id, title, description, category, venue, start_date, end_date, \
                             capacity, registered_count, organizer_id, status, created_at";

fn row_to_event(row: EventRow) -> Result<EventRecord, AppError> {
    let (
        id,
        title,
        description,
        category,
        venue,
        start_date,
        end_date,
        capacity,
        registered_count,
        organizer_id,
        status,
        created_at,
    ) = row;

    // A value the CHECK constraints let through always parses; anything else
    // means the row was corrupted out of band
    let category = category
        .parse()
        .map_err(|e: crate::domain::UnknownVariant| AppError::Internal(e.to_string()))?;
    let status = status
        .parse()
        .map_err(|e: crate::domain::UnknownVariant| AppError::Internal(e.to_string()))?;

    Ok(EventRecord {
        id,
        title,
        description,
        category,
        venue,
        start_date,
        end_date,
        capacity,
        registered_count,
        organizer_id,
        status,
        created_at,
    })
}

/// Read and create operations over event records
#[derive(Debug, Clone)]
pub struct EventCatalog {
    pool: PgPool,
}

impl EventCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event with zero registrations, status `upcoming`
    pub async fn create_event(&self, new_event: NewEvent) -> Result<EventRecord, AppError> {
        if new_event.capacity <= 0 {
            return Err(DomainError::InvalidCapacity(new_event.capacity).into());
        }

        let event_id = Uuid::new_v4();

        let created_at: DateTime<Utc> = sqlx::query_scalar(
            r#"
            INSERT INTO events (id, title, description, category, venue,
                                start_date, end_date, capacity, organizer_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING created_at
            "#,
        )
        .bind(event_id)
        .bind(&new_event.title)
        .bind(&new_event.description)
        .bind(new_event.category.as_str())
        .bind(&new_event.venue)
        .bind(new_event.start_date)
        .bind(new_event.end_date)
        .bind(new_event.capacity)
        .bind(new_event.organizer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(EventRecord {
            id: event_id,
            title: new_event.title,
            description: new_event.description,
            category: new_event.category,
            venue: new_event.venue,
            start_date: new_event.start_date,
            end_date: new_event.end_date,
            capacity: new_event.capacity,
            registered_count: 0,
            organizer_id: new_event.organizer_id,
            status: EventStatus::Upcoming,
            created_at,
        })
    }

    /// Get one event by id
    pub async fn get_event(&self, event_id: Uuid) -> Result<EventRecord, AppError> {
        let row: Option<EventRow> = sqlx::query_as(&format!(
            "SELECT {} FROM events WHERE id = $1",
            EVENT_COLUMNS
        ))
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or(DomainError::EventNotFound(event_id))?;
        row_to_event(row)
    }

    /// List events with optional category/status filters, soonest first
    pub async fn list_events(
        &self,
        category: Option<EventCategory>,
        status: Option<EventStatus>,
    ) -> Result<Vec<EventRecord>, AppError> {
        let rows: Vec<EventRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM events
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY start_date ASC
            "#,
            EVENT_COLUMNS
        ))
        .bind(category.map(|c| c.as_str()))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_event).collect()
    }

    /// List events for an organizer (None lists all, for admins), newest first
    pub async fn list_for_organizer(
        &self,
        organizer_id: Option<Uuid>,
    ) -> Result<Vec<EventRecord>, AppError> {
        let rows: Vec<EventRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM events
            WHERE ($1::uuid IS NULL OR organizer_id = $1)
            ORDER BY created_at DESC
            "#,
            EVENT_COLUMNS
        ))
        .bind(organizer_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_event).collect()
    }
}
