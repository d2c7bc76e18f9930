//! API Routes
//!
//! HTTP endpoint definitions. Role and ownership checks live here, at the
//! boundary; the handlers below only enforce domain invariants.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::analytics::{AnalyticsService, DashboardAnalytics, EventAnalytics};
use crate::catalog::{EventCatalog, EventRecord, NewEvent};
use crate::credential::CredentialIssuer;
use crate::domain::{EventCategory, EventStatus, Feedback, Registration, UserRole};
use crate::error::AppError;
use crate::handlers::{
    CheckInCommand, CheckInHandler, CheckInResult, FeedbackCommand, FeedbackHandler,
    RegisterCommand, RegisterHandler,
};

use super::middleware::AuthenticatedUser;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: EventCategory,
    #[serde(default)]
    pub venue: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub capacity: i32,
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    #[serde(default)]
    pub category: Option<EventCategory>,
    #[serde(default)]
    pub status: Option<EventStatus>,
}

#[derive(Debug, Serialize)]
pub struct RegistrationCreatedResponse {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub registered_at: DateTime<Utc>,
    /// Presented at the venue; not recoverable from the server afterwards
    pub credential: String,
    /// Scannable payload, recomputable from the credential alone
    pub credential_image: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    /// Raw ticket token or the scanned payload wrapping it
    pub credential: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub event_id: Uuid,
    pub rating: i32,
    #[serde(default)]
    pub comment: String,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<PgPool> {
    Router::new()
        // Event catalog
        .route("/events", post(create_event).get(list_events))
        .route("/events/:event_id", get(get_event))
        .route("/events/organizer/my-events", get(my_events))
        // Registration lifecycle
        .route("/registrations/:event_id", post(register_for_event))
        .route("/registrations/my-registrations", get(my_registrations))
        .route("/registrations/event/:event_id", get(event_registrations))
        .route("/registrations/checkin/:registration_id", post(check_in))
        .route("/registrations/checkin", post(check_in_by_credential))
        // Feedback
        .route("/feedbacks", post(submit_feedback))
        .route("/feedbacks/event/:event_id", get(event_feedbacks))
        // Analytics
        .route("/analytics/event/:event_id", get(event_analytics))
        .route("/analytics/dashboard", get(dashboard_analytics))
}

/// Admins see every event; organizers only their own
async fn ensure_event_access(
    catalog: &EventCatalog,
    event_id: Uuid,
    user: &AuthenticatedUser,
) -> Result<EventRecord, AppError> {
    let event = catalog.get_event(event_id).await?;

    if user.role != UserRole::Admin && event.organizer_id != user.id {
        return Err(AppError::Forbidden(
            "Not the organizer of this event".to_string(),
        ));
    }

    Ok(event)
}

// =========================================================================
// POST /events
// =========================================================================

/// Create a new event (organizer/admin)
async fn create_event(
    State(pool): State<PgPool>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventRecord>), AppError> {
    if !user.role.can_manage_events() {
        return Err(AppError::Forbidden(
            "Only organizers and admins can create events".to_string(),
        ));
    }

    let catalog = EventCatalog::new(pool);

    let event = catalog
        .create_event(NewEvent {
            title: request.title,
            description: request.description,
            category: request.category,
            venue: request.venue,
            start_date: request.start_date,
            end_date: request.end_date,
            capacity: request.capacity,
            organizer_id: user.id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

// =========================================================================
// GET /events
// =========================================================================

/// List events with optional category/status filters
async fn list_events(
    State(pool): State<PgPool>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<EventRecord>>, AppError> {
    let catalog = EventCatalog::new(pool);
    let events = catalog.list_events(query.category, query.status).await?;

    Ok(Json(events))
}

// =========================================================================
// GET /events/:event_id
// =========================================================================

/// Get event by ID
async fn get_event(
    State(pool): State<PgPool>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventRecord>, AppError> {
    let catalog = EventCatalog::new(pool);
    let event = catalog.get_event(event_id).await?;

    Ok(Json(event))
}

// =========================================================================
// GET /events/organizer/my-events
// =========================================================================

/// List the caller's events (organizer) or all events (admin)
async fn my_events(
    State(pool): State<PgPool>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<EventRecord>>, AppError> {
    if !user.role.can_manage_events() {
        return Err(AppError::Forbidden("Not authorized".to_string()));
    }

    let organizer = match user.role {
        UserRole::Admin => None,
        _ => Some(user.id),
    };

    let catalog = EventCatalog::new(pool);
    let events = catalog.list_for_organizer(organizer).await?;

    Ok(Json(events))
}

// =========================================================================
// POST /registrations/:event_id
// =========================================================================

/// Register the caller for an event (student only)
async fn register_for_event(
    State(pool): State<PgPool>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(event_id): Path<Uuid>,
) -> Result<(StatusCode, Json<RegistrationCreatedResponse>), AppError> {
    if user.role != UserRole::Student {
        return Err(AppError::Forbidden(
            "Only students can register for events".to_string(),
        ));
    }

    let handler = RegisterHandler::new(pool);
    let result = handler
        .execute(RegisterCommand::new(event_id, user.id))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegistrationCreatedResponse {
            id: result.registration.id,
            event_id: result.registration.event_id,
            user_id: result.registration.user_id,
            registered_at: result.registration.registered_at,
            credential: result.credential,
            credential_image: result.credential_image,
        }),
    ))
}

// =========================================================================
// GET /registrations/my-registrations
// =========================================================================

/// List the caller's registrations, oldest first
async fn my_registrations(
    State(pool): State<PgPool>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Registration>>, AppError> {
    let registrations = list_registrations(&pool, "user_id", user.id).await?;

    Ok(Json(registrations))
}

// =========================================================================
// GET /registrations/event/:event_id
// =========================================================================

/// List registrations for an event (owning organizer or admin)
async fn event_registrations(
    State(pool): State<PgPool>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<Registration>>, AppError> {
    let catalog = EventCatalog::new(pool.clone());
    ensure_event_access(&catalog, event_id, &user).await?;

    let registrations = list_registrations(&pool, "event_id", event_id).await?;

    Ok(Json(registrations))
}

/// Registrations filtered on one column, in registered_at ascending order
async fn list_registrations(
    pool: &PgPool,
    column: &'static str,
    value: Uuid,
) -> Result<Vec<Registration>, AppError> {
    let rows: Vec<(Uuid, Uuid, Uuid, DateTime<Utc>, bool, Option<DateTime<Utc>>)> =
        sqlx::query_as(&format!(
            r#"
            SELECT id, event_id, user_id, registered_at, checked_in, checked_in_at
            FROM registrations
            WHERE {} = $1
            ORDER BY registered_at ASC
            "#,
            column
        ))
        .bind(value)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(
            |(id, event_id, user_id, registered_at, checked_in, checked_in_at)| Registration {
                id,
                event_id,
                user_id,
                registered_at,
                checked_in,
                checked_in_at,
            },
        )
        .collect())
}

// =========================================================================
// POST /registrations/checkin/:registration_id
// =========================================================================

/// Check a registration in (owning organizer or admin)
async fn check_in(
    State(pool): State<PgPool>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(registration_id): Path<Uuid>,
) -> Result<Json<CheckInResult>, AppError> {
    let handler = CheckInHandler::new(pool.clone());

    let event_id = handler.event_of(registration_id).await?;
    let catalog = EventCatalog::new(pool);
    ensure_event_access(&catalog, event_id, &user).await?;

    let result = handler.execute(CheckInCommand::new(registration_id)).await?;

    Ok(Json(result))
}

// =========================================================================
// POST /registrations/checkin
// =========================================================================

/// Check in by scanned credential (owning organizer or admin)
async fn check_in_by_credential(
    State(pool): State<PgPool>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CheckInRequest>,
) -> Result<Json<CheckInResult>, AppError> {
    // Scanners may post either the decoded token or the raw payload
    let token = CredentialIssuer::decode_image(&request.credential)
        .unwrap_or(request.credential);

    let issuer = CredentialIssuer::new(pool.clone());
    let registration_id = issuer.resolve(&token).await?;

    let handler = CheckInHandler::new(pool.clone());
    let event_id = handler.event_of(registration_id).await?;
    let catalog = EventCatalog::new(pool);
    ensure_event_access(&catalog, event_id, &user).await?;

    let result = handler.execute(CheckInCommand::new(registration_id)).await?;

    Ok(Json(result))
}

// =========================================================================
// POST /feedbacks
// =========================================================================

/// Submit feedback for an attended event
async fn submit_feedback(
    State(pool): State<PgPool>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<Feedback>), AppError> {
    let handler = FeedbackHandler::new(pool);

    let feedback = handler
        .execute(FeedbackCommand::new(
            request.event_id,
            user.id,
            request.rating,
            request.comment,
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(feedback)))
}

// =========================================================================
// GET /feedbacks/event/:event_id
// =========================================================================

/// List feedback for an event, newest first
async fn event_feedbacks(
    State(pool): State<PgPool>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<Feedback>>, AppError> {
    let handler = FeedbackHandler::new(pool);
    let feedbacks = handler.list_for_event(event_id).await?;

    Ok(Json(feedbacks))
}

// =========================================================================
// GET /analytics/event/:event_id
// =========================================================================

/// Attendance and rating rollup for one event (owning organizer or admin)
async fn event_analytics(
    State(pool): State<PgPool>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventAnalytics>, AppError> {
    let catalog = EventCatalog::new(pool.clone());
    ensure_event_access(&catalog, event_id, &user).await?;

    let analytics = AnalyticsService::new(pool);
    let rollup = analytics.event_analytics(event_id).await?;

    Ok(Json(rollup))
}

// =========================================================================
// GET /analytics/dashboard
// =========================================================================

/// Organization-wide dashboard (admin only)
async fn dashboard_analytics(
    State(pool): State<PgPool>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<DashboardAnalytics>, AppError> {
    if user.role != UserRole::Admin {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    let analytics = AnalyticsService::new(pool);
    let dashboard = analytics.dashboard().await?;

    Ok(Json(dashboard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_event_request_deserialize() {
        let json = r#"{
            "title": "Rust Workshop",
            "category": "workshop",
            "start_date": "2026-09-15T10:00:00Z",
            "end_date": "2026-09-15T16:00:00Z",
            "capacity": 40
        }"#;

        let request: CreateEventRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.title, "Rust Workshop");
        assert_eq!(request.category, EventCategory::Workshop);
        assert_eq!(request.capacity, 40);
        assert!(request.description.is_empty());
        assert!(request.venue.is_empty());
    }

    #[test]
    fn test_events_query_defaults() {
        let query: EventsQuery = serde_json::from_str("{}").unwrap();
        assert!(query.category.is_none());
        assert!(query.status.is_none());
    }

    #[test]
    fn test_events_query_rejects_unknown_category() {
        let result: Result<EventsQuery, _> = serde_json::from_str(r#"{"category": "gala"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_feedback_request_deserialize() {
        let json = r#"{
            "event_id": "550e8400-e29b-41d4-a716-446655440000",
            "rating": 5,
            "comment": "Excellent"
        }"#;

        let request: FeedbackRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.rating, 5);
        assert_eq!(request.comment, "Excellent");
    }
}
