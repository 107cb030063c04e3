use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Service role categories. The two-letter code doubles as the legacy
/// identifier prefix on worker and order ids; the enum is authoritative.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
pub enum RoleCategory {
    #[serde(rename = "MU")]
    #[strum(serialize = "MU")]
    Makeup,
    #[serde(rename = "CL")]
    #[strum(serialize = "CL")]
    Cleaning,
    #[serde(rename = "ED")]
    #[strum(serialize = "ED")]
    EventDecor,
    #[serde(rename = "OR")]
    #[strum(serialize = "OR")]
    Other,
}

impl RoleCategory {
    /// Identifier prefix for this role (worker ids and order ids).
    pub fn prefix(&self) -> &'static str {
        match self {
            RoleCategory::Makeup => "MU",
            RoleCategory::Cleaning => "CL",
            RoleCategory::EventDecor => "ED",
            RoleCategory::Other => "OR",
        }
    }

    /// Derive the role from a cart category via case-insensitive substring
    /// match. Unknown categories fall back to the general pool.
    pub fn from_category(category: &str) -> Self {
        let category = category.to_lowercase();
        if category.contains("makeup") || category.contains("woman") {
            RoleCategory::Makeup
        } else if category.contains("event") || category.contains("decor") {
            RoleCategory::EventDecor
        } else if category.contains("clean") {
            RoleCategory::Cleaning
        } else {
            RoleCategory::Other
        }
    }
}

/// Worker availability as toggled from the field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Availability {
    Available,
    Busy,
    Offline,
}

/// A registered field worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    pub id: Uuid,
    pub worker_id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub role: RoleCategory,
    pub availability: Availability,
    /// Cumulative settled earnings. Only ever increased, by settlement.
    pub earning: f64,
    pub rating_average: f64,
    pub rating_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Administrative worker registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct NewWorker {
    #[garde(length(min = 3, max = 32))]
    pub worker_id: String,

    #[garde(length(min = 1, max = 200))]
    pub name: String,

    #[garde(length(min = 5, max = 20))]
    pub phone: String,

    #[garde(inner(length(min = 3, max = 200)))]
    pub email: Option<String>,

    #[garde(skip)]
    pub role: RoleCategory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_substring_mapping() {
        assert_eq!(RoleCategory::from_category("Makeup"), RoleCategory::Makeup);
        assert_eq!(RoleCategory::from_category("Woman's Salon"), RoleCategory::Makeup);
        assert_eq!(RoleCategory::from_category("deep CLEANING"), RoleCategory::Cleaning);
        assert_eq!(RoleCategory::from_category("event planning"), RoleCategory::EventDecor);
        assert_eq!(RoleCategory::from_category("Decor"), RoleCategory::EventDecor);
        assert_eq!(RoleCategory::from_category("plumbing"), RoleCategory::Other);
    }

    #[test]
    fn role_round_trips_through_code() {
        for role in [
            RoleCategory::Makeup,
            RoleCategory::Cleaning,
            RoleCategory::EventDecor,
            RoleCategory::Other,
        ] {
            assert_eq!(role.to_string(), role.prefix());
            assert_eq!(role.prefix().parse::<RoleCategory>().unwrap(), role);
        }
    }
}
