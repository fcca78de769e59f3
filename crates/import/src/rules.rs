use kharcha_core::{TransactionRecord, DEFAULT_KEYWORDS, UNCATEGORIZED};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleSource {
    BuiltIn,
    UserTaught,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keyword: String,
    pub category: String,
    pub source: RuleSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    Unchanged,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("Keyword must not be empty")]
    EmptyKeyword,
    #[error("Category must not be empty")]
    EmptyCategory,
}

/// Keyword rules in scan order.
///
/// Classification walks the rules front to back and the first keyword found
/// in a description wins, so an earlier keyword shadows any later one that
/// matches the same text. Overwriting a keyword keeps its slot.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<KeywordRule>,
    /// keyword → position in `rules`
    index: HashMap<String, usize>,
}

impl RuleTable {
    /// An empty table with no built-ins.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding the built-in keywords in their seed order.
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        for (keyword, category) in DEFAULT_KEYWORDS {
            table.push(keyword, category, RuleSource::BuiltIn);
        }
        table
    }

    /// Adds or overwrites a user-taught rule. Repeating a call with the same
    /// arguments leaves the table untouched.
    pub fn upsert(&mut self, keyword: &str, category: &str) -> Result<UpsertOutcome, RuleError> {
        let keyword = keyword.trim().to_lowercase();
        let category = category.trim();
        if keyword.is_empty() {
            return Err(RuleError::EmptyKeyword);
        }
        if category.is_empty() {
            return Err(RuleError::EmptyCategory);
        }

        let existing = self.index.get(&keyword).copied();
        match existing {
            Some(pos) => {
                let rule = &mut self.rules[pos];
                if rule.category == category {
                    return Ok(UpsertOutcome::Unchanged);
                }
                rule.category = category.to_string();
                rule.source = RuleSource::UserTaught;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                self.push(&keyword, category, RuleSource::UserTaught);
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    fn push(&mut self, keyword: &str, category: &str, source: RuleSource) {
        self.index.insert(keyword.to_string(), self.rules.len());
        self.rules.push(KeywordRule {
            keyword: keyword.to_string(),
            category: category.to_string(),
            source,
        });
    }

    /// First rule whose keyword occurs in `text`, ignoring case.
    pub fn find_matching_rule(&self, text: &str) -> Option<&KeywordRule> {
        let text = text.to_lowercase();
        self.rules.iter().find(|r| text.contains(&r.keyword))
    }

    pub fn lookup(&self, text: &str) -> Option<&str> {
        self.find_matching_rule(text).map(|r| r.category.as_str())
    }

    /// Category for a narration, or `Uncategorized` when nothing matches.
    pub fn classify(&self, description: &str) -> &str {
        self.lookup(description).unwrap_or(UNCATEGORIZED)
    }

    /// Recomputes every record's category from scratch and returns how many
    /// labels changed.
    pub fn reclassify(&self, records: &mut [TransactionRecord]) -> usize {
        let mut changed = 0;
        for record in records.iter_mut() {
            let category = self.classify(&record.description);
            if record.category != category {
                record.category = category.to_string();
                changed += 1;
            }
        }
        changed
    }

    pub fn get(&self, keyword: &str) -> Option<&KeywordRule> {
        self.index
            .get(&keyword.trim().to_lowercase())
            .map(|&pos| &self.rules[pos])
    }

    pub fn rules(&self) -> impl Iterator<Item = &KeywordRule> {
        self.rules.iter()
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for rule in &self.rules {
            if !out.contains(&rule.category.as_str()) {
                out.push(&rule.category);
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use kharcha_core::Money;

    fn make_record(desc: &str) -> TransactionRecord {
        TransactionRecord::new(
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            desc,
            Money::from_paise(10_000),
        )
    }

    fn keywords(table: &RuleTable) -> Vec<&str> {
        table.rules().map(|r| r.keyword.as_str()).collect()
    }

    #[test]
    fn defaults_keep_seed_order() {
        let table = RuleTable::with_defaults();
        assert_eq!(table.len(), 15);
        assert_eq!(keywords(&table)[..3], ["swiggy", "zomato", "dominos"]);
        assert_eq!(keywords(&table)[14], "salary");
        assert!(table.rules().all(|r| r.source == RuleSource::BuiltIn));
    }

    #[test]
    fn classify_defaults_case_insensitive() {
        let table = RuleTable::with_defaults();
        assert_eq!(table.classify("UPI-SWIGGY-8765-ybl"), "Food");
        assert_eq!(table.classify("POS AMAZON PAY INDIA"), "Shopping");
        assert_eq!(table.classify("NEFT SALARY APR"), "Income");
        assert_eq!(table.classify("ATM WDL MG ROAD"), "Cash Withdrawal");
        assert_eq!(table.classify("BESCOM BILL PAY"), "Utilities");
    }

    #[test]
    fn classify_unmatched_is_uncategorized() {
        let table = RuleTable::with_defaults();
        assert_eq!(table.classify("xyz-unrelated-text"), "Uncategorized");
        assert_eq!(table.lookup("xyz-unrelated-text"), None);
    }

    #[test]
    fn classify_empty_table() {
        assert_eq!(RuleTable::new().classify("UPI-SWIGGY"), "Uncategorized");
    }

    #[test]
    fn first_registered_keyword_wins() {
        let mut table = RuleTable::new();
        table.upsert("swiggy", "Food").unwrap();
        table.upsert("foodbook", "Snacks").unwrap();
        assert_eq!(table.classify("swiggy foodbook order"), "Food");
        assert_eq!(table.classify("foodbook order"), "Snacks");
    }

    #[test]
    fn builtin_substring_shadows_later_keyword() {
        let mut table = RuleTable::with_defaults();
        table.upsert("rentomojo", "Shopping").unwrap();
        // "rent" is seeded earlier and also occurs in "rentomojo".
        assert_eq!(table.classify("UPI-RENTOMOJO-123"), "Housing");
        assert_eq!(table.find_matching_rule("UPI-RENTOMOJO-123").unwrap().keyword, "rent");
    }

    #[test]
    fn classify_is_deterministic() {
        let table = RuleTable::with_defaults();
        let first = table.classify("UBER OLA PETROL").to_string();
        for _ in 0..10 {
            assert_eq!(table.classify("UBER OLA PETROL"), first);
        }
        assert_eq!(first, "Transport");
    }

    #[test]
    fn upsert_new_keyword_appends() {
        let mut table = RuleTable::with_defaults();
        assert_eq!(table.upsert("Foodbook", "Food"), Ok(UpsertOutcome::Inserted));
        assert_eq!(keywords(&table).last(), Some(&"foodbook"));
        assert_eq!(table.get("FOODBOOK").unwrap().source, RuleSource::UserTaught);
    }

    #[test]
    fn upsert_is_idempotent() {
        let mut table = RuleTable::with_defaults();
        assert_eq!(table.upsert("foodbook", "Food"), Ok(UpsertOutcome::Inserted));
        let before: Vec<KeywordRule> = table.rules().cloned().collect();
        assert_eq!(table.upsert("foodbook", "Food"), Ok(UpsertOutcome::Unchanged));
        let after: Vec<KeywordRule> = table.rules().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn upsert_overwrite_keeps_position() {
        let mut table = RuleTable::with_defaults();
        assert_eq!(table.upsert("swiggy", "Snacks"), Ok(UpsertOutcome::Updated));
        assert_eq!(keywords(&table)[0], "swiggy");
        assert_eq!(table.len(), 15);
        let rule = table.get("swiggy").unwrap();
        assert_eq!(rule.category, "Snacks");
        assert_eq!(rule.source, RuleSource::UserTaught);
        assert_eq!(table.classify("swiggy zomato"), "Snacks");
    }

    #[test]
    fn upsert_rejects_blank_input() {
        let mut table = RuleTable::new();
        assert_eq!(table.upsert("  ", "Food"), Err(RuleError::EmptyKeyword));
        assert_eq!(table.upsert("foodbook", ""), Err(RuleError::EmptyCategory));
        assert!(table.is_empty());
    }

    #[test]
    fn reclassify_overwrites_and_counts_changes() {
        let mut table = RuleTable::with_defaults();
        let mut records = vec![
            make_record("UPI-FOODBOOK-9876543210-ybl"),
            make_record("UPI-SWIGGY-1"),
            make_record("MISC CHARGE"),
        ];
        assert_eq!(table.reclassify(&mut records), 1);
        assert_eq!(records[1].category, "Food");

        table.upsert("foodbook", "Food").unwrap();
        assert_eq!(table.reclassify(&mut records), 1);
        assert_eq!(records[0].category, "Food");
        assert_eq!(records[2].category, "Uncategorized");

        assert_eq!(table.reclassify(&mut records), 0);
    }

    #[test]
    fn categories_first_seen_order() {
        let mut table = RuleTable::with_defaults();
        table.upsert("apollo", "Health").unwrap();
        assert_eq!(
            table.categories(),
            vec![
                "Food",
                "Shopping",
                "Transport",
                "Utilities",
                "Housing",
                "Cash Withdrawal",
                "Income",
                "Health"
            ]
        );
    }
}
