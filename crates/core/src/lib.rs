//! Core business logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `period` - Calendar-aligned period presets used to seed budgets
//! - `budget` - Budget vs. actual comparison, overview aggregation and pace estimation

pub mod budget;
pub mod period;
