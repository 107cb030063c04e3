use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One settlement ledger entry. The (worker_id, order_id, service_name)
/// triple is unique at the storage layer, so re-running settlement can never
/// credit the same service line twice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarningRecord {
    pub id: Uuid,
    pub worker_id: String,
    pub order_id: String,
    pub service_name: String,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}
