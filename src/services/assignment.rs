//! Broadcast rule: derive the role category from the order's first cart line,
//! synthesize a role-prefixed order id, and fan the task out to every worker
//! holding that role at creation time.

use rand::Rng;

use crate::models::task::{Assignment, AssignmentStatus, CartLine};
use crate::models::worker::{RoleCategory, Worker};

/// Role category for a new order, taken from the first cart line. An empty
/// cart never passes request validation, but falls back to the general pool.
pub fn derive_role(cart: &[CartLine]) -> RoleCategory {
    cart.first()
        .map(|line| RoleCategory::from_category(&line.category))
        .unwrap_or(RoleCategory::Other)
}

/// Synthesize an order id: role prefix followed by a 4-digit integer in
/// [1000, 9999]. Collisions are handled by the storage layer's uniqueness
/// constraint (regenerate and retry).
pub fn generate_order_id(role: RoleCategory) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(1000..=9999);
    format!("{}{}", role.prefix(), suffix)
}

/// One pending roster entry per matching worker. An empty pool yields an
/// empty roster, which is accepted behavior: no worker can ever act on the
/// task, but creation still succeeds.
pub fn build_roster(workers: &[Worker]) -> Vec<Assignment> {
    workers
        .iter()
        .map(|w| Assignment {
            worker_id: w.worker_id.clone(),
            status: AssignmentStatus::Pending,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::models::worker::Availability;

    fn cart_line(category: &str) -> CartLine {
        CartLine {
            name: "Deep Clean".to_string(),
            price: 500.0,
            quantity: 1,
            category: category.to_string(),
            earning: Some(100.0),
        }
    }

    fn worker(worker_id: &str, role: RoleCategory) -> Worker {
        Worker {
            id: Uuid::new_v4(),
            worker_id: worker_id.to_string(),
            name: "Test Worker".to_string(),
            phone: format!("99999{worker_id}"),
            email: None,
            role,
            availability: Availability::Available,
            earning: 0.0,
            rating_average: 0.0,
            rating_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn order_id_has_prefix_and_four_digits() {
        for _ in 0..100 {
            let id = generate_order_id(RoleCategory::Cleaning);
            assert!(id.starts_with("CL"));
            let suffix: u32 = id[2..].parse().expect("numeric suffix");
            assert!((1000..=9999).contains(&suffix), "suffix out of range: {suffix}");
        }
    }

    #[test]
    fn role_derived_from_first_line_only() {
        let cart = vec![cart_line("cleaning"), cart_line("makeup")];
        assert_eq!(derive_role(&cart), RoleCategory::Cleaning);
    }

    #[test]
    fn empty_cart_falls_back_to_general_pool() {
        assert_eq!(derive_role(&[]), RoleCategory::Other);
    }

    #[test]
    fn roster_is_one_pending_entry_per_worker() {
        let pool = vec![
            worker("CL001", RoleCategory::Cleaning),
            worker("CL002", RoleCategory::Cleaning),
        ];
        let roster = build_roster(&pool);
        assert_eq!(roster.len(), 2);
        assert!(roster.iter().all(|a| a.status == AssignmentStatus::Pending));
        assert_eq!(roster[0].worker_id, "CL001");
        assert_eq!(roster[1].worker_id, "CL002");
    }

    #[test]
    fn empty_pool_yields_empty_roster() {
        assert!(build_roster(&[]).is_empty());
    }
}
