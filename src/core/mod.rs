//! Core client settings

pub mod config;

pub use config::DashboardConfig;
