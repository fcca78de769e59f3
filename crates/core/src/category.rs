/// Label given to a transaction that no keyword rule matches.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Categories offered for manual choice that no built-in keyword produces.
/// They are only reachable by teaching a rule for them.
pub const MANUAL_CATEGORIES: &[&str] = &["Subscription", "Health", "Gift", "Other"];

/// Placeholder shown by pickers before the user chooses anything.
pub const CATEGORY_PLACEHOLDER: &str = "Select Category";

/// Keyword → category pairs seeded into every rule table, in scan order.
pub const DEFAULT_KEYWORDS: &[(&str, &str)] = &[
    ("swiggy", "Food"),
    ("zomato", "Food"),
    ("dominos", "Food"),
    ("amazon", "Shopping"),
    ("flipkart", "Shopping"),
    ("petrol", "Transport"),
    ("uber", "Transport"),
    ("ola", "Transport"),
    ("electricity", "Utilities"),
    ("bescom", "Utilities"),
    ("mobile", "Utilities"),
    ("recharge", "Utilities"),
    ("rent", "Housing"),
    ("atm", "Cash Withdrawal"),
    ("salary", "Income"),
];

/// Merges rule categories (already in first-seen order) with the manual-only
/// extras, dropping duplicates.
pub fn selectable_categories<'a, I>(rule_categories: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out: Vec<String> = Vec::new();
    for category in rule_categories.into_iter().chain(MANUAL_CATEGORIES.iter().copied()) {
        if !out.iter().any(|c| c == category) {
            out.push(category.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_keywords_are_lowercase() {
        for (keyword, _) in DEFAULT_KEYWORDS {
            assert_eq!(*keyword, keyword.to_lowercase());
        }
    }

    #[test]
    fn selectable_appends_manual_extras() {
        let cats = selectable_categories(["Food", "Shopping", "Food"]);
        assert_eq!(
            cats,
            vec!["Food", "Shopping", "Subscription", "Health", "Gift", "Other"]
        );
    }

    #[test]
    fn selectable_does_not_duplicate_taught_extra() {
        let cats = selectable_categories(["Food", "Health"]);
        assert_eq!(cats, vec!["Food", "Health", "Subscription", "Gift", "Other"]);
    }

    #[test]
    fn uncategorized_is_not_selectable_by_default() {
        let cats = selectable_categories(DEFAULT_KEYWORDS.iter().map(|(_, c)| *c));
        assert!(!cats.iter().any(|c| c == UNCATEGORIZED));
    }
}
