use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Task-level lifecycle status. Serialized in one canonical snake_case form
/// everywhere (wire and storage).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    WaitingForApproval,
    Accepted,
    Rejected,
    InProgress,
    Completed,
    Canceled,
}

/// Per-roster-entry response status. `accepted` and `rejected` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AssignmentStatus {
    Pending,
    Accepted,
    Rejected,
}

/// One roster entry: a worker the task was broadcast to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assignment {
    pub worker_id: String,
    pub status: AssignmentStatus,
}

/// One cart line of a customer order.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CartLine {
    #[garde(length(min = 1, max = 200))]
    pub name: String,

    #[garde(range(min = 0.0))]
    pub price: f64,

    #[garde(range(min = 1))]
    #[serde(default = "default_quantity")]
    pub quantity: i32,

    #[garde(length(min = 1, max = 100))]
    pub category: String,

    /// Per-unit worker earning for this line; lines without one are
    /// non-billable for settlement.
    #[garde(inner(range(min = 0.0)))]
    #[serde(default)]
    pub earning: Option<f64>,
}

fn default_quantity() -> i32 {
    1
}

/// Task-scoped one-time code confirming on-site presence.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServiceOtp {
    pub code: Option<String>,
    pub verified: bool,
}

/// A customer service order and its broadcast roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub order_id: String,
    pub customer_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: String,
    pub pincode: String,
    pub cart: Vec<CartLine>,
    pub subtotal: f64,
    pub discount: f64,
    pub total: f64,
    pub payment_method: String,
    pub date: String,
    pub time_slot: String,
    pub assigned_workers: Vec<Assignment>,
    pub status: TaskStatus,
    pub is_approved: bool,
    pub is_rejected: bool,
    pub is_completed: bool,
    pub is_canceled: bool,
    pub is_requested: bool,
    pub service_otp: ServiceOtp,
    pub created_at: DateTime<Utc>,
}

/// Customer order submission.
#[derive(Debug, Deserialize, Validate)]
pub struct NewTask {
    #[garde(length(min = 1, max = 200))]
    pub customer_name: String,

    #[garde(length(min = 5, max = 20))]
    pub phone: String,

    #[garde(inner(length(min = 3, max = 200)))]
    pub email: Option<String>,

    #[garde(length(min = 1, max = 500))]
    pub address: String,

    #[garde(length(min = 4, max = 10))]
    pub pincode: String,

    #[garde(length(min = 1), dive)]
    pub cart: Vec<CartLine>,

    #[garde(range(min = 0.0))]
    pub subtotal: f64,

    #[garde(range(min = 0.0))]
    pub discount: f64,

    #[garde(range(min = 0.0))]
    pub total: f64,

    #[garde(skip)]
    #[serde(default = "default_payment_method")]
    pub payment_method: String,

    #[garde(length(min = 1, max = 40))]
    pub date: String,

    #[garde(length(min = 1, max = 40))]
    pub time_slot: String,
}

fn default_payment_method() -> String {
    "Pay After Service".to_string()
}
