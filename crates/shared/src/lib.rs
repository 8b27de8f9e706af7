//! Shared types, errors, and configuration for Tally.
//!
//! This crate provides common types used across all other crates:
//! - Decimal money helpers (sums and 2-decimal percentages)
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AnalyticsConfig, AppConfig};
pub use error::{AppError, AppResult};
