use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A consumable used while delivering a service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceProduct {
    pub name: String,
    #[serde(default = "default_product_quantity")]
    pub quantity: i32,
    /// gm, ml, pcs, bottle.
    #[serde(default = "default_product_unit")]
    pub unit: String,
}

fn default_product_quantity() -> i32 {
    1
}

fn default_product_unit() -> String {
    "pcs".to_string()
}

/// A reusable tool or accessory required for a service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAccessory {
    pub name: String,
    #[serde(default = "default_reusable")]
    pub reusable: bool,
}

fn default_reusable() -> bool {
    true
}

/// A published catalog service: price plus required consumables and tools.
/// Read-only from the task core's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogService {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub products: Vec<ServiceProduct>,
    pub accessories: Vec<ServiceAccessory>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
