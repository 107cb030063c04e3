use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::models::earning::EarningRecord;
use crate::services::settlement::LedgerLine;

fn record_from_row(row: &PgRow) -> Result<EarningRecord, sqlx::Error> {
    Ok(EarningRecord {
        id: row.try_get("id")?,
        worker_id: row.try_get("worker_id")?,
        order_id: row.try_get("order_id")?,
        service_name: row.try_get("service_name")?,
        amount: row.try_get("amount")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Record one settlement credit. Returns false when the (worker, order,
/// service) triple was already credited, which is how a replayed completion
/// skips lines instead of paying twice.
pub async fn record_credit(
    tx: &mut Transaction<'_, Postgres>,
    order_id: &str,
    line: &LedgerLine,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO worker_earnings (worker_id, order_id, service_name, amount)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (worker_id, order_id, service_name) DO NOTHING
        "#,
    )
    .bind(&line.worker_id)
    .bind(order_id)
    .bind(&line.service_name)
    .bind(line.amount)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Ledger entries for a worker, newest first
pub async fn list_for_worker(
    pool: &PgPool,
    worker_id: &str,
) -> Result<Vec<EarningRecord>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, worker_id, order_id, service_name, amount, created_at
        FROM worker_earnings
        WHERE worker_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(worker_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(record_from_row).collect()
}

/// Lifetime settled total for a worker
pub async fn total_for_worker(pool: &PgPool, worker_id: &str) -> Result<f64, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT COALESCE(SUM(amount), 0) AS total
        FROM worker_earnings
        WHERE worker_id = $1
        "#,
    )
    .bind(worker_id)
    .fetch_one(pool)
    .await?;

    row.try_get("total")
}
