//! Tokenizer for the keyword backend
//!
//! Lowercases, splits on non-alphanumeric characters and drops tokens
//! shorter than two characters. No stemming or stopwords.

/// Tokenize text into searchable terms
///
/// # Example
///
/// ```
/// use concord_search::tokenizer::tokenize;
///
/// let tokens = tokenize("location: Kitchen, 2nd floor");
/// assert_eq!(tokens, vec!["location", "kitchen", "2nd", "floor"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| s.chars().count() >= 2)
        .map(String::from)
        .collect()
}

/// Tokenize and deduplicate, keeping first occurrence order
pub fn tokenize_unique(text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tokenize(text)
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}
