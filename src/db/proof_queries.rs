use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::models::proof::Proof;

fn proof_from_row(row: &PgRow) -> Result<Proof, sqlx::Error> {
    Ok(Proof {
        id: row.try_get("id")?,
        worker_id: row.try_get("worker_id")?,
        order_id: row.try_get("order_id")?,
        image: row.try_get("image")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Store a proof-of-work image (base64 data URI)
pub async fn create_proof(
    pool: &PgPool,
    worker_id: &str,
    order_id: &str,
    image: &str,
) -> Result<Proof, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO proofs (worker_id, order_id, image)
        VALUES ($1, $2, $3)
        RETURNING id, worker_id, order_id, image, created_at
        "#,
    )
    .bind(worker_id)
    .bind(order_id)
    .bind(image)
    .fetch_one(pool)
    .await?;

    proof_from_row(&row)
}

/// Proofs attached to an order
pub async fn list_for_order(pool: &PgPool, order_id: &str) -> Result<Vec<Proof>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, worker_id, order_id, image, created_at
        FROM proofs
        WHERE order_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(proof_from_row).collect()
}
