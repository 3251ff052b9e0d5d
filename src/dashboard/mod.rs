//! Dashboard module
//!
//! Provides an overview of a user's finances: totals, the most recent
//! transactions and per-category breakdowns.

mod aggregation;
mod handlers;

pub use handlers::{DashboardState, get_dashboard_summary};
