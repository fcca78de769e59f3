use kharcha_core::{selectable_categories, CategorySummary, TransactionRecord, CATEGORY_PLACEHOLDER};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::csv::{normalize, read_table, LoadError, RawTable, SchemaError, StatementProfile};
use crate::keyword::extract_keyword;
use crate::rules::{RuleError, RuleTable, UpsertOutcome};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    #[error("Please select a transaction")]
    SelectionRequired,
    #[error("Please choose a category")]
    CategoryRequired,
    #[error("No valid keyword found for matching in '{description}'")]
    NoKeywordFound { description: String },
    #[error(transparent)]
    Rule(#[from] RuleError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub loaded: usize,
    pub dropped: usize,
}

/// What teaching a category did to the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Applied {
    pub keyword: String,
    pub category: String,
    /// Rows whose category changed.
    pub affected: usize,
    /// Rows that mention the keyword but still match an earlier rule first.
    pub shadowed: usize,
    /// Category the selected row carries afterwards. Differs from `category`
    /// when an earlier rule matches the selected narration first.
    pub selected_category: String,
    /// Earlier keyword that wins for the first shadowed row.
    pub shadowed_by: Option<String>,
}

impl Applied {
    /// Whether the selected row itself kept an earlier rule's category.
    pub fn selection_shadowed(&self) -> bool {
        self.selected_category != self.category
    }
}

/// The working dataset and the rules that label it.
///
/// Every mutating call takes `&mut self`, so one session never has more
/// than one load or rule application in flight.
#[derive(Debug, Clone)]
pub struct Session {
    profile: StatementProfile,
    rules: RuleTable,
    records: Vec<TransactionRecord>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(StatementProfile::default())
    }
}

impl Session {
    pub fn new(profile: StatementProfile) -> Self {
        Session {
            profile,
            rules: RuleTable::with_defaults(),
            records: Vec::new(),
        }
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    /// Loads a statement file, replacing the dataset. On any error the current
    /// dataset is kept.
    pub fn load_file(&mut self, path: &Path) -> Result<LoadReport, LoadError> {
        tracing::info!("Loading statement: {}", path.display());
        let file = File::open(path)?;
        self.load_reader(file)
    }

    pub fn load_reader<R: Read>(&mut self, data: R) -> Result<LoadReport, LoadError> {
        let table = read_table(data, &self.profile)?;
        Ok(self.load_table(&table)?)
    }

    pub fn load_table(&mut self, table: &RawTable) -> Result<LoadReport, SchemaError> {
        let mut normalized = normalize(table, &self.profile)?;
        self.rules.reclassify(&mut normalized.records);

        let report = LoadReport {
            loaded: normalized.records.len(),
            dropped: normalized.dropped,
        };
        tracing::info!(loaded = report.loaded, dropped = report.dropped, "Statement loaded");

        self.records = normalized.records;
        Ok(report)
    }

    /// Teaches `category` for the counterparty named in the selected narration
    /// and relabels the whole dataset.
    ///
    /// Nothing changes unless a keyword is found and the rule is accepted.
    pub fn apply_user_category(
        &mut self,
        selected: Option<&str>,
        category: Option<&str>,
    ) -> Result<Applied, ApplyError> {
        let description = selected
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ApplyError::SelectionRequired)?;
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != CATEGORY_PLACEHOLDER)
            .ok_or(ApplyError::CategoryRequired)?;

        let keyword = extract_keyword(description).ok_or_else(|| ApplyError::NoKeywordFound {
            description: description.to_string(),
        })?;

        let outcome = self.rules.upsert(&keyword, category)?;
        let affected = if outcome == UpsertOutcome::Unchanged {
            0
        } else {
            self.rules.reclassify(&mut self.records)
        };

        let shadowed_rows: Vec<&TransactionRecord> = self
            .records
            .iter()
            .filter(|r| r.mentions(&keyword) && r.category != category)
            .collect();
        let shadowed = shadowed_rows.len();
        let shadowed_by = shadowed_rows
            .first()
            .and_then(|r| self.rules.find_matching_rule(&r.description))
            .map(|rule| rule.keyword.clone());
        if let Some(earlier) = &shadowed_by {
            tracing::warn!(
                keyword = %keyword,
                shadowed,
                earlier = %earlier,
                "Taught keyword is shadowed by an earlier rule"
            );
        }

        let selected_category = self.rules.classify(description).to_string();
        tracing::info!(keyword = %keyword, category, affected, ?outcome, "Applied category");
        Ok(Applied {
            keyword,
            category: category.to_string(),
            affected,
            shadowed,
            selected_category,
            shadowed_by,
        })
    }

    pub fn summary(&self) -> CategorySummary {
        CategorySummary::summarize(&self.records)
    }

    /// Categories a user may pick from: every rule category, then the
    /// manual-only extras.
    pub fn selectable_categories(&self) -> Vec<String> {
        selectable_categories(self.rules.categories())
    }
}
