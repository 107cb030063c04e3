use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use crate::models::catalog::{CatalogService, ServiceAccessory, ServiceProduct};

fn service_from_row(row: &PgRow) -> Result<CatalogService, sqlx::Error> {
    let products: Json<Vec<ServiceProduct>> = row.try_get("products")?;
    let accessories: Json<Vec<ServiceAccessory>> = row.try_get("accessories")?;

    Ok(CatalogService {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        price: row.try_get("price")?,
        products: products.0,
        accessories: accessories.0,
        active: row.try_get("active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Case-insensitive exact-name lookup of an active catalog service.
pub async fn find_by_name(
    pool: &PgPool,
    name: &str,
) -> Result<Option<CatalogService>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, name, category, price, products, accessories, active, created_at, updated_at
        FROM service_catalog
        WHERE LOWER(name) = LOWER($1) AND active
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(service_from_row).transpose()
}
