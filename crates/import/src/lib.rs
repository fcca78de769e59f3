pub mod csv;
pub mod keyword;
pub mod rules;
pub mod session;

pub use self::csv::{
    normalize, normalize_reader, read_table, LoadError, Normalized, ProfileError, RawRow,
    RawTable, RowRejection, SchemaError, StatementProfile,
};
pub use keyword::{extract_keyword, STOPLIST};
pub use rules::{KeywordRule, RuleError, RuleSource, RuleTable, UpsertOutcome};
pub use session::{Applied, ApplyError, LoadReport, Session};
