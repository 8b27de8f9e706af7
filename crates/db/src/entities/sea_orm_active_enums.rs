//! `SeaORM` active enums mapped to PostgreSQL enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `transaction_type` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_type")]
pub enum TransactionType {
    /// Money leaving the user.
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Money reaching the user.
    #[sea_orm(string_value = "income")]
    Income,
}

impl From<TransactionType> for tally_core::budget::TransactionType {
    fn from(value: TransactionType) -> Self {
        match value {
            TransactionType::Expense => Self::Expense,
            TransactionType::Income => Self::Income,
        }
    }
}

impl From<tally_core::budget::TransactionType> for TransactionType {
    fn from(value: tally_core::budget::TransactionType) -> Self {
        match value {
            tally_core::budget::TransactionType::Expense => Self::Expense,
            tally_core::budget::TransactionType::Income => Self::Income,
        }
    }
}
