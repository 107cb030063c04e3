use sqlx::PgPool;
use std::sync::Arc;

use crate::services::delivery::OtpDelivery;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub delivery: Arc<dyn OtpDelivery>,
    /// Bounded retries when a generated order id collides.
    pub order_id_retries: u32,
}

impl AppState {
    pub fn new(db: PgPool, delivery: Arc<dyn OtpDelivery>, order_id_retries: u32) -> Self {
        Self {
            db,
            delivery,
            order_id_retries,
        }
    }
}
