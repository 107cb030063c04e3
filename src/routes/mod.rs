pub mod catalog;
pub mod health;
pub mod metrics;
pub mod proof;
pub mod tasks;
pub mod workers;
