use anyhow::{Context, Result};
use comfy_table::{Cell, CellAlignment, Table};
use kharcha_core::{CategorySummary, Money, TransactionRecord};
use kharcha_import::{extract_keyword, Applied, LoadReport, Session, StatementProfile};
use serde::Serialize;
use std::path::Path;

/// A `ROW=CATEGORY` request from the command line. Rows are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Teach {
    pub row: usize,
    pub category: String,
}

pub fn parse_teach(s: &str) -> Result<Teach, String> {
    let (row, category) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ROW=CATEGORY, got '{s}'"))?;
    let row: usize = row
        .trim()
        .parse()
        .map_err(|_| format!("row must be a positive number, got '{row}'"))?;
    if row == 0 {
        return Err("rows are numbered from 1".to_string());
    }
    Ok(Teach {
        row,
        category: category.trim().to_string(),
    })
}

#[derive(Debug, Serialize)]
struct CategorizeOutput<'a> {
    report: LoadReport,
    records: &'a [TransactionRecord],
    summary: CategorySummary,
    total: Money,
}

pub fn categorize(file: &Path, profile: Option<&Path>, teach: &[Teach], json: bool) -> Result<()> {
    let profile = match profile {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read profile {}", path.display()))?;
            StatementProfile::from_toml(&content)?
        }
        None => StatementProfile::default(),
    };

    let mut session = Session::new(profile);
    let report = session
        .load_file(file)
        .with_context(|| format!("Failed to process {}", file.display()))?;

    for request in teach {
        let selected = session
            .records()
            .get(request.row - 1)
            .map(|r| r.description.clone());
        match session.apply_user_category(selected.as_deref(), Some(request.category.as_str())) {
            Ok(applied) => {
                tracing::info!(
                    row = request.row,
                    keyword = %applied.keyword,
                    category = %applied.category,
                    affected = applied.affected,
                    "Taught keyword"
                );
                eprintln!(
                    "Categorized all entries with keyword '{}' → {} ({} changed)",
                    applied.keyword, applied.category, applied.affected
                );
                if let Some(note) = shadow_note(&applied) {
                    eprintln!("  {note}");
                }
            }
            Err(e) => {
                tracing::warn!(row = request.row, error = %e, "Teach request rejected");
                eprintln!("Row {}: {e}", request.row);
            }
        }
    }

    let summary = session.summary();
    if json {
        let output = CategorizeOutput {
            report,
            records: session.records(),
            total: summary.grand_total(),
            summary,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", records_table(session.records()));
    println!();
    println!("{}", summary_table(&summary));
    if report.dropped > 0 {
        tracing::warn!(dropped = report.dropped, "Skipped unparsable rows");
        eprintln!("{}", skipped_rows_message(report.dropped));
    }
    Ok(())
}

fn shadow_note(applied: &Applied) -> Option<String> {
    if applied.selection_shadowed() {
        return Some(format!(
            "the selected row kept '{}' because an earlier keyword matches it first",
            applied.selected_category
        ));
    }
    (applied.shadowed > 0).then(|| {
        format!(
            "{} matching row(s) kept an earlier rule's category",
            applied.shadowed
        )
    })
}

fn skipped_rows_message(dropped: usize) -> String {
    format!("{dropped} row(s) skipped: unparsable date, amount or narration")
}

pub fn keyword(description: &str) -> Result<()> {
    match extract_keyword(description) {
        Some(keyword) => println!("{keyword}"),
        None => anyhow::bail!("No valid keyword found for matching in '{description}'"),
    }
    Ok(())
}

pub fn categories() -> Result<()> {
    for category in Session::default().selectable_categories() {
        println!("{category}");
    }
    Ok(())
}

fn records_table(records: &[TransactionRecord]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Date", "Description", "Amount", "Category"]);
    for (idx, record) in records.iter().enumerate() {
        table.add_row(vec![
            Cell::new(idx + 1),
            Cell::new(record.date),
            Cell::new(&record.description),
            Cell::new(record.amount).set_alignment(CellAlignment::Right),
            Cell::new(&record.category),
        ]);
    }
    table
}

fn summary_table(summary: &CategorySummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Total"]);
    for (category, total) in summary.iter() {
        table.add_row(vec![
            Cell::new(category),
            Cell::new(total).set_alignment(CellAlignment::Right),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total"),
        Cell::new(summary.grand_total()).set_alignment(CellAlignment::Right),
    ]);
    table
}
