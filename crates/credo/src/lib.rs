//! Credit health analytics: profile metrics, synthetic-data models, what-if simulation and
//! threshold alerts, with the JSON API the dashboard drives.

pub mod alerts;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod finance;
pub mod modeling;
pub mod predict;
pub mod storage;
pub mod telemetry;
