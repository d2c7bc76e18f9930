//! Common test utilities

use chrono::{Duration, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

/// Setup test database - truncate tables for a fresh state
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    sqlx::query("TRUNCATE TABLE feedbacks, registrations, events, users CASCADE")
        .execute(&pool)
        .await
        .expect("Failed to clean up DB");

    pool
}

/// Seed a user with the given role and return its id
pub async fn seed_user(pool: &PgPool, name: &str, role: &str) -> Uuid {
    let id = Uuid::new_v4();

    sqlx::query("INSERT INTO users (id, email, name, role) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(format!("{}@campus.test", name))
        .bind(name)
        .bind(role)
        .execute(pool)
        .await
        .expect("Failed to seed user");

    id
}

/// Seed an open upcoming event and return its id
#[allow(dead_code)]
pub async fn seed_event(pool: &PgPool, organizer_id: Uuid, capacity: i32) -> Uuid {
    let id = Uuid::new_v4();
    let start = Utc::now() + Duration::days(7);
    let end = start + Duration::hours(4);

    sqlx::query(
        r#"
        INSERT INTO events
            (id, title, description, category, venue, start_date, end_date,
             capacity, registered_count, organizer_id, status)
        VALUES ($1, $2, '', 'workshop', 'Main Hall', $3, $4, $5, 0, $6, 'upcoming')
        "#,
    )
    .bind(id)
    .bind(format!("Event {}", id))
    .bind(start)
    .bind(end)
    .bind(capacity)
    .bind(organizer_id)
    .execute(pool)
    .await
    .expect("Failed to seed event");

    id
}
