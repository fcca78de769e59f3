pub mod category;
pub mod money;
pub mod summary;
pub mod transaction;

pub use category::{
    selectable_categories, CATEGORY_PLACEHOLDER, DEFAULT_KEYWORDS, MANUAL_CATEGORIES,
    UNCATEGORIZED,
};
pub use money::Money;
pub use summary::CategorySummary;
pub use transaction::TransactionRecord;
