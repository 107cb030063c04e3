//! Gig-Worker Task Marketplace
//!
//! This library provides the core functionality for the gig-dispatch system:
//! customer orders are broadcast to field workers by role category, accepted
//! under a first-come exclusivity rule, gated by a customer-held OTP, and
//! settled into per-worker earning balances on completion.

pub mod app_state;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
