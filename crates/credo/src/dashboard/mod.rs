//! The dashboard facade and its local JSON API.

pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use router::dashboard_router;
pub use service::{emi_for, DashboardError, DashboardService, Overview};
