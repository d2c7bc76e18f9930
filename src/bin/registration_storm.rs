//! Registration Storm Tool
//!
//! Seeds a capacity-bounded event plus a crowd of students, then fires all
//! registrations concurrently to stress the capacity invariant.
//!
//! Run with: cargo run --bin registration_storm --release -- --students 500 --capacity 100

use std::time::Instant;

use sqlx::postgres::PgPoolOptions;

use campus_pulse::handlers::{RegisterCommand, RegisterHandler};
use campus_pulse::{AppError, DomainError};

fn arg(args: &[String], name: &str, default: u64) -> u64 {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let students = arg(&args, "--students", 500);
    let capacity = arg(&args, "--capacity", 100) as i32;

    let database_url = std::env::var("DATABASE_URL")?;

    println!(
        "Registration Storm - {} students vs capacity {}",
        students, capacity
    );
    println!("Connecting to database...");

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&database_url)
        .await?;

    let organizer_id = uuid::Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, email, name, role) VALUES ($1, $2, 'Storm Organizer', 'organizer')")
        .bind(organizer_id)
        .bind(format!("storm-organizer-{}@campus.test", organizer_id))
        .execute(&pool)
        .await?;

    let event_id = uuid::Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO events
            (id, title, description, category, venue, start_date, end_date,
             capacity, registered_count, organizer_id, status)
        VALUES ($1, 'Storm Test Event', '', 'other', 'Stadium',
                NOW() + interval '1 day', NOW() + interval '1 day 4 hours',
                $2, 0, $3, 'upcoming')
        "#,
    )
    .bind(event_id)
    .bind(capacity)
    .bind(organizer_id)
    .execute(&pool)
    .await?;

    let mut student_ids = Vec::with_capacity(students as usize);
    for i in 0..students {
        let id = uuid::Uuid::new_v4();
        sqlx::query("INSERT INTO users (id, email, name, role) VALUES ($1, $2, $3, 'student')")
            .bind(id)
            .bind(format!("storm-{}-{}@campus.test", event_id, i))
            .bind(format!("Storm Student {}", i))
            .execute(&pool)
            .await?;
        student_ids.push(id);
    }

    println!("Seeded event and {} students, firing...", students);

    let start = Instant::now();

    let mut tasks = Vec::with_capacity(student_ids.len());
    for user_id in student_ids {
        let handler = RegisterHandler::new(pool.clone());
        tasks.push(tokio::spawn(async move {
            handler.execute(RegisterCommand::new(event_id, user_id)).await
        }));
    }

    let mut accepted = 0u64;
    let mut full = 0u64;
    let mut failed = 0u64;
    for task in tasks {
        match task.await? {
            Ok(_) => accepted += 1,
            Err(AppError::Domain(DomainError::CapacityExceeded(_))) => full += 1,
            Err(e) => {
                eprintln!("Registration failed: {}", e);
                failed += 1;
            }
        }
    }

    let elapsed = start.elapsed();
    let rate = (accepted + full) as f64 / elapsed.as_secs_f64();

    let registered_count: i32 =
        sqlx::query_scalar("SELECT registered_count FROM events WHERE id = $1")
            .bind(event_id)
            .fetch_one(&pool)
            .await?;

    println!("\n=== Registration Storm Results ===");
    println!("Accepted: {}", accepted);
    println!("Rejected (full): {}", full);
    println!("Errors: {}", failed);
    println!("Final registered_count: {} (capacity {})", registered_count, capacity);
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Rate: {:.0} attempts/sec", rate);

    if registered_count > capacity || accepted as i32 != registered_count {
        anyhow::bail!("Capacity invariant violated");
    }

    Ok(())
}
