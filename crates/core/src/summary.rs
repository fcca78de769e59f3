use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::money::Money;
use super::transaction::TransactionRecord;

/// Total spend per category, sorted by category label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorySummary {
    totals: BTreeMap<String, Money>,
}

impl CategorySummary {
    /// Groups `records` by category and sums their amounts. Categories with no
    /// records never appear.
    pub fn summarize<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a TransactionRecord>,
    {
        let mut totals: BTreeMap<String, Money> = BTreeMap::new();
        for record in records {
            let entry = totals
                .entry(record.category.clone())
                .or_insert_with(Money::zero);
            *entry = *entry + record.amount;
        }
        CategorySummary { totals }
    }

    pub fn get(&self, category: &str) -> Option<Money> {
        self.totals.get(category).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Money)> {
        self.totals.iter().map(|(c, m)| (c.as_str(), *m))
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn grand_total(&self) -> Money {
        self.totals.values().copied().sum()
    }
}
