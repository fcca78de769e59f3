use chrono::NaiveDate;
use kharcha_core::{Money, TransactionRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, BufReader, Read};
use std::str::FromStr;
use thiserror::Error;

/// Describes where the withdrawal columns live in a bank statement export.
///
/// The defaults match the bank's CSV statement download: twenty lines of
/// account details before the header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementProfile {
    pub preamble_rows: usize,
    pub date_column: String,
    pub description_column: String,
    pub amount_column: String,
    pub delimiter: String,
}

impl Default for StatementProfile {
    fn default() -> Self {
        Self {
            preamble_rows: 20,
            date_column: "Date".to_string(),
            description_column: "Narration".to_string(),
            amount_column: "Withdrawal Amt.".to_string(),
            delimiter: ",".to_string(),
        }
    }
}

impl StatementProfile {
    pub fn from_toml(toml_content: &str) -> Result<Self, ProfileError> {
        let profile: StatementProfile = toml::from_str(toml_content)?;
        profile.delimiter_byte()?;
        Ok(profile)
    }

    fn delimiter_byte(&self) -> Result<u8, ProfileError> {
        match self.delimiter.as_bytes() {
            [b] => Ok(*b),
            _ => Err(ProfileError::InvalidDelimiter(self.delimiter.clone())),
        }
    }

    fn required_columns(&self) -> [&str; 3] {
        [
            self.date_column.as_str(),
            self.description_column.as_str(),
            self.amount_column.as_str(),
        ]
    }
}

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Invalid profile: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Delimiter must be a single byte, got '{0}'")]
    InvalidDelimiter(String),
}

/// The header row is missing one or more required columns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Missing expected columns: {}", .missing.join(", "))]
pub struct SchemaError {
    pub missing: Vec<String>,
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

/// Why a data row was left out of the dataset.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowRejection {
    #[error("line {line}: invalid date '{value}'")]
    InvalidDate { line: u64, value: String },
    #[error("line {line}: invalid amount '{value}'")]
    InvalidAmount { line: u64, value: String },
    #[error("line {line}: empty narration")]
    EmptyDescription { line: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line in the source file.
    pub line: u64,
    pub fields: Vec<String>,
}

/// A statement after the preamble has been skipped, before any typing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Builds a table from in-memory rows, numbering them as if the header
    /// were on line 1.
    pub fn new<H, S>(headers: H, rows: Vec<Vec<S>>) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        S: Into<String>,
    {
        RawTable {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: rows
                .into_iter()
                .enumerate()
                .map(|(idx, fields)| RawRow {
                    line: idx as u64 + 2,
                    fields: fields.into_iter().map(Into::into).collect(),
                })
                .collect(),
        }
    }
}

/// Records that survived normalization plus a count of the rows dropped.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub records: Vec<TransactionRecord>,
    pub dropped: usize,
}

/// Positions of the required columns within a header row.
struct ColumnIndex {
    date: usize,
    description: usize,
    amount: usize,
}

impl ColumnIndex {
    fn locate(headers: &[String], profile: &StatementProfile) -> Result<Self, SchemaError> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<String> = profile
            .required_columns()
            .into_iter()
            .filter(|&name| position(name).is_none())
            .map(str::to_string)
            .collect();

        match (
            position(profile.date_column.as_str()),
            position(profile.description_column.as_str()),
            position(profile.amount_column.as_str()),
        ) {
            (Some(date), Some(description), Some(amount)) => Ok(ColumnIndex {
                date,
                description,
                amount,
            }),
            _ => Err(SchemaError { missing }),
        }
    }

    fn parse_row(&self, row: &RawRow) -> Result<TransactionRecord, RowRejection> {
        let field = |idx: usize| row.fields.get(idx).map(String::as_str).unwrap_or_default();

        let raw_date = field(self.date);
        let date = parse_date(raw_date).ok_or_else(|| RowRejection::InvalidDate {
            line: row.line,
            value: raw_date.to_string(),
        })?;

        let raw_amount = field(self.amount);
        let amount = parse_amount(raw_amount).ok_or_else(|| RowRejection::InvalidAmount {
            line: row.line,
            value: raw_amount.to_string(),
        })?;

        let description = field(self.description).trim();
        if description.is_empty() {
            return Err(RowRejection::EmptyDescription { line: row.line });
        }

        Ok(TransactionRecord::new(date, description, amount))
    }
}

/// Skips the preamble and reads the header and data rows.
///
/// A stream that ends inside the preamble yields an empty header row.
pub fn read_table<R: Read>(data: R, profile: &StatementProfile) -> Result<RawTable, LoadError> {
    let delimiter = profile.delimiter_byte()?;
    let mut buffered = BufReader::new(data);

    let mut skipped = 0u64;
    while skipped < profile.preamble_rows as u64 && skip_line(&mut buffered)? {
        skipped += 1;
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(buffered);

    let headers = reader.byte_headers()?.iter().map(lossy).collect();

    let mut rows = Vec::new();
    for result in reader.byte_records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line()) + skipped;
        rows.push(RawRow {
            line,
            fields: record.iter().map(lossy).collect(),
        });
    }

    Ok(RawTable { headers, rows })
}

/// Consumes one physical line ending in `\n`, `\r\n` or a bare `\r`.
/// Returns `false` at end of input.
fn skip_line<R: BufRead>(reader: &mut R) -> io::Result<bool> {
    let mut consumed_any = false;
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(consumed_any);
        }
        consumed_any = true;
        match buf.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(end) => {
                let ended_by_cr = buf[end] == b'\r';
                reader.consume(end + 1);
                if ended_by_cr && reader.fill_buf()?.first() == Some(&b'\n') {
                    reader.consume(1);
                }
                return Ok(true);
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    }
}

/// Turns a raw table into typed withdrawal records.
///
/// Fails only when a required column is absent. Rows with an unparsable
/// date or amount, or an empty narration, are dropped and counted.
pub fn normalize(table: &RawTable, profile: &StatementProfile) -> Result<Normalized, SchemaError> {
    tracing::debug!(columns = ?table.headers, "Detected columns");
    let columns = ColumnIndex::locate(&table.headers, profile)?;

    let mut normalized = Normalized::default();
    for row in &table.rows {
        match columns.parse_row(row) {
            Ok(record) => normalized.records.push(record),
            Err(rejection) => {
                tracing::debug!(%rejection, "Dropping row");
                normalized.dropped += 1;
            }
        }
    }

    Ok(normalized)
}

pub fn normalize_reader<R: Read>(
    data: R,
    profile: &StatementProfile,
) -> Result<Normalized, LoadError> {
    let table = read_table(data, profile)?;
    Ok(normalize(&table, profile)?)
}

fn lossy(field: &[u8]) -> String {
    String::from_utf8_lossy(field).into_owned()
}

/// Two-digit year shapes come first so that `01/04/24` is not read as year 24.
const DAY_FIRST_FORMATS: &[&str] = &[
    "%d/%m/%y", "%d/%m/%Y", "%d-%m-%y", "%d-%m-%Y", "%d.%m.%y", "%d.%m.%Y", "%Y-%m-%d",
    "%d %b %Y", "%d-%b-%y", "%d-%b-%Y",
];

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DAY_FIRST_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn parse_amount(s: &str) -> Option<Money> {
    let s = s.trim().replace(',', "");
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(&s)
        .or_else(|_| Decimal::from_scientific(&s))
        .ok()
        .map(Money::from_decimal)
}
