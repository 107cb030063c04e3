use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Proof-of-work image attached to an order by its accepted worker.
/// The image is stored inline as a base64 data URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proof {
    pub id: Uuid,
    pub worker_id: String,
    pub order_id: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
}
