use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::category::UNCATEGORIZED;
use super::money::Money;

/// One withdrawal from a bank statement.
///
/// Records are only ever built from rows whose date, narration and amount all
/// parsed, so none of those fields is optional. `category` is the only field
/// that changes after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    pub category: String,
}

impl TransactionRecord {
    /// Builds an uncategorized record.
    pub fn new(date: NaiveDate, description: impl Into<String>, amount: Money) -> Self {
        TransactionRecord {
            date,
            description: description.into(),
            amount,
            category: UNCATEGORIZED.to_string(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Case-insensitive substring test against the narration.
    pub fn mentions(&self, keyword: &str) -> bool {
        self.description
            .to_lowercase()
            .contains(&keyword.to_lowercase())
    }
}
