//! `SeaORM` entity definitions.

pub mod budget_items;
pub mod budgets;
pub mod sea_orm_active_enums;
pub mod tags;
pub mod transaction_tags;
pub mod transactions;
pub mod users;
