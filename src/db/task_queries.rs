use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::db::{decode_err, is_unique_violation};
use crate::models::task::{Assignment, CartLine, NewTask, ServiceOtp, Task, TaskStatus};
use crate::models::worker::RoleCategory;
use crate::services::assignment;

const TASK_COLUMNS: &str = "id, order_id, customer_name, phone, email, address, pincode, cart, \
     subtotal, discount, total, payment_method, date, time_slot, assigned_workers, status, \
     is_approved, is_rejected, is_completed, is_canceled, is_requested, otp_code, otp_verified, \
     created_at";

fn task_from_row(row: &PgRow) -> Result<Task, sqlx::Error> {
    let status: String = row.try_get("status")?;
    let cart: Json<Vec<CartLine>> = row.try_get("cart")?;
    let assigned_workers: Json<Vec<Assignment>> = row.try_get("assigned_workers")?;

    Ok(Task {
        id: row.try_get("id")?,
        order_id: row.try_get("order_id")?,
        customer_name: row.try_get("customer_name")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        address: row.try_get("address")?,
        pincode: row.try_get("pincode")?,
        cart: cart.0,
        subtotal: row.try_get("subtotal")?,
        discount: row.try_get("discount")?,
        total: row.try_get("total")?,
        payment_method: row.try_get("payment_method")?,
        date: row.try_get("date")?,
        time_slot: row.try_get("time_slot")?,
        assigned_workers: assigned_workers.0,
        status: status.parse::<TaskStatus>().map_err(decode_err)?,
        is_approved: row.try_get("is_approved")?,
        is_rejected: row.try_get("is_rejected")?,
        is_completed: row.try_get("is_completed")?,
        is_canceled: row.try_get("is_canceled")?,
        is_requested: row.try_get("is_requested")?,
        service_otp: ServiceOtp {
            code: row.try_get("otp_code")?,
            verified: row.try_get("otp_verified")?,
        },
        created_at: row.try_get("created_at")?,
    })
}

/// Insert a new task with a generated order id, retrying on an order-id
/// collision. The roster and the id derive from the same category lookup,
/// done once by the caller.
pub async fn create_task(
    pool: &PgPool,
    new: &NewTask,
    role: RoleCategory,
    roster: &[Assignment],
    max_retries: u32,
) -> Result<Task, sqlx::Error> {
    let mut attempts = 0;
    loop {
        let order_id = assignment::generate_order_id(role);
        match insert_task(pool, new, &order_id, roster).await {
            Ok(task) => return Ok(task),
            Err(e) if is_unique_violation(&e, Some("tasks_order_id_key")) && attempts < max_retries => {
                tracing::debug!(order_id = %order_id, "order id collision, regenerating");
                attempts += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn insert_task(
    pool: &PgPool,
    new: &NewTask,
    order_id: &str,
    roster: &[Assignment],
) -> Result<Task, sqlx::Error> {
    let query = format!(
        r#"
        INSERT INTO tasks (order_id, customer_name, phone, email, address, pincode, cart,
                           subtotal, discount, total, payment_method, date, time_slot,
                           assigned_workers)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING {TASK_COLUMNS}
        "#
    );

    let row = sqlx::query(&query)
        .bind(order_id)
        .bind(&new.customer_name)
        .bind(&new.phone)
        .bind(&new.email)
        .bind(&new.address)
        .bind(&new.pincode)
        .bind(Json(&new.cart))
        .bind(new.subtotal)
        .bind(new.discount)
        .bind(new.total)
        .bind(&new.payment_method)
        .bind(&new.date)
        .bind(&new.time_slot)
        .bind(Json(roster))
        .fetch_one(pool)
        .await?;

    task_from_row(&row)
}

/// Get a task by internal id
pub async fn get_task(pool: &PgPool, task_id: Uuid) -> Result<Option<Task>, sqlx::Error> {
    let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
    let row = sqlx::query(&query).bind(task_id).fetch_optional(pool).await?;
    row.as_ref().map(task_from_row).transpose()
}

/// Get a task by its customer-facing order id
pub async fn get_task_by_order(pool: &PgPool, order_id: &str) -> Result<Option<Task>, sqlx::Error> {
    let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE order_id = $1");
    let row = sqlx::query(&query).bind(order_id).fetch_optional(pool).await?;
    row.as_ref().map(task_from_row).transpose()
}

/// Lock and fetch a task by internal id. Serializes concurrent mutations of
/// the same task for the duration of the enclosing transaction.
pub async fn fetch_task_for_update(
    tx: &mut Transaction<'_, Postgres>,
    task_id: Uuid,
) -> Result<Option<Task>, sqlx::Error> {
    let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 FOR UPDATE");
    let row = sqlx::query(&query)
        .bind(task_id)
        .fetch_optional(&mut **tx)
        .await?;
    row.as_ref().map(task_from_row).transpose()
}

/// Lock and fetch a task by order id.
pub async fn fetch_task_by_order_for_update(
    tx: &mut Transaction<'_, Postgres>,
    order_id: &str,
) -> Result<Option<Task>, sqlx::Error> {
    let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE order_id = $1 FOR UPDATE");
    let row = sqlx::query(&query)
        .bind(order_id)
        .fetch_optional(&mut **tx)
        .await?;
    row.as_ref().map(task_from_row).transpose()
}

/// Write back every lifecycle-mutable field in one statement, so roster,
/// status projection, flags, and OTP state can never persist partially.
pub async fn persist_lifecycle(
    tx: &mut Transaction<'_, Postgres>,
    task: &Task,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE tasks
        SET assigned_workers = $1,
            status = $2,
            is_approved = $3,
            is_rejected = $4,
            is_completed = $5,
            is_canceled = $6,
            is_requested = $7,
            otp_code = $8,
            otp_verified = $9
        WHERE id = $10
        "#,
    )
    .bind(Json(&task.assigned_workers))
    .bind(task.status.to_string())
    .bind(task.is_approved)
    .bind(task.is_rejected)
    .bind(task.is_completed)
    .bind(task.is_canceled)
    .bind(task.is_requested)
    .bind(&task.service_otp.code)
    .bind(task.service_otp.verified)
    .bind(task.id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Tasks visible to a worker: order id shares the worker's role prefix.
pub async fn list_tasks_by_prefix(pool: &PgPool, prefix: &str) -> Result<Vec<Task>, sqlx::Error> {
    let query = format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE order_id LIKE $1 || '%' ORDER BY created_at DESC"
    );
    let rows = sqlx::query(&query).bind(prefix).fetch_all(pool).await?;
    rows.iter().map(task_from_row).collect()
}
