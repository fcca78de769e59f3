//! Picks a counterparty keyword out of a UPI-style narration so a category
//! chosen for one transaction can be taught as a rule for the rest.

/// Payment-rail and bank tokens that say nothing about the counterparty.
pub const STOPLIST: &[&str] = &[
    "upi", "paytm", "gpay", "google", "india", "digital", "com", "recharge", "ybl", "axis", "ok",
    "bharatpe",
];

/// Shortest token accepted as a keyword.
const MIN_KEYWORD_LEN: usize = 5;

/// Returns the first `-`-separated token of the lowercased narration that is
/// purely alphabetic, longer than four characters and not on the stoplist.
///
/// `UPI-FOODBOOK-9876543210-ybl` yields `foodbook`.
pub fn extract_keyword(description: &str) -> Option<String> {
    description
        .to_lowercase()
        .split('-')
        .find(|token| is_candidate(token))
        .map(str::to_string)
}

/// Alphabetic means `char::is_alphabetic`, which also admits the vowel signs
/// of Indic scripts, so a Devanagari merchant name counts as one token.
fn is_candidate(token: &str) -> bool {
    !token.is_empty()
        && token.chars().all(char::is_alphabetic)
        && token.chars().count() >= MIN_KEYWORD_LEN
        && !STOPLIST.contains(&token)
}
