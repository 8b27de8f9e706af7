//! Calendar-aligned period presets.
//!
//! Budgets are seeded with concrete `{start, end}` pairs produced here:
//! "this month", "this year", an arbitrary month or year, or a custom range.

pub mod error;
pub mod preset;

pub use error::PeriodError;
pub use preset::{
    DateRange, PeriodPreset, PresetKind, current_month_preset, current_year_preset,
    format_preset_name, monthly_preset, yearly_preset,
};
