use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::db::decode_err;
use crate::models::worker::{Availability, NewWorker, RoleCategory, Worker};

const WORKER_COLUMNS: &str = "id, worker_id, name, phone, email, role, availability, earning, \
     rating_average, rating_count, created_at, updated_at";

fn worker_from_row(row: &PgRow) -> Result<Worker, sqlx::Error> {
    let role: String = row.try_get("role")?;
    let availability: String = row.try_get("availability")?;

    Ok(Worker {
        id: row.try_get("id")?,
        worker_id: row.try_get("worker_id")?,
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        role: role.parse::<RoleCategory>().map_err(decode_err)?,
        availability: availability.parse::<Availability>().map_err(decode_err)?,
        earning: row.try_get("earning")?,
        rating_average: row.try_get("rating_average")?,
        rating_count: row.try_get("rating_count")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Register a new worker
pub async fn create_worker(pool: &PgPool, new: &NewWorker) -> Result<Worker, sqlx::Error> {
    let query = format!(
        r#"
        INSERT INTO workers (worker_id, name, phone, email, role)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {WORKER_COLUMNS}
        "#
    );

    let row = sqlx::query(&query)
        .bind(&new.worker_id)
        .bind(&new.name)
        .bind(&new.phone)
        .bind(&new.email)
        .bind(new.role.to_string())
        .fetch_one(pool)
        .await?;

    worker_from_row(&row)
}

/// Get a worker by their public identifier
pub async fn get_worker(pool: &PgPool, worker_id: &str) -> Result<Option<Worker>, sqlx::Error> {
    let query = format!("SELECT {WORKER_COLUMNS} FROM workers WHERE worker_id = $1");
    let row = sqlx::query(&query).bind(worker_id).fetch_optional(pool).await?;
    row.as_ref().map(worker_from_row).transpose()
}

/// All workers holding a role, for broadcast at task creation.
pub async fn list_workers_by_role(
    pool: &PgPool,
    role: RoleCategory,
) -> Result<Vec<Worker>, sqlx::Error> {
    let query = format!("SELECT {WORKER_COLUMNS} FROM workers WHERE role = $1 ORDER BY worker_id");
    let rows = sqlx::query(&query)
        .bind(role.to_string())
        .fetch_all(pool)
        .await?;
    rows.iter().map(worker_from_row).collect()
}

/// Update a worker's availability, returning the stored value.
pub async fn update_availability(
    pool: &PgPool,
    worker_id: &str,
    availability: Availability,
) -> Result<Option<Availability>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        UPDATE workers
        SET availability = $1, updated_at = NOW()
        WHERE worker_id = $2
        RETURNING availability
        "#,
    )
    .bind(availability.to_string())
    .bind(worker_id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(r) => {
            let stored: String = r.try_get("availability")?;
            Ok(Some(stored.parse::<Availability>().map_err(decode_err)?))
        }
        None => Ok(None),
    }
}

/// Atomic balance increment. Read-then-write would lose updates when two
/// settlements touching the same worker commit concurrently.
pub async fn credit_earning(
    tx: &mut Transaction<'_, Postgres>,
    worker_id: &str,
    amount: f64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE workers
        SET earning = earning + $1, updated_at = NOW()
        WHERE worker_id = $2
        "#,
    )
    .bind(amount)
    .bind(worker_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
