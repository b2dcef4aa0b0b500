//! Text normalization for fair transcript comparison

/// Normalize raw text into a canonical sequence of word tokens.
///
/// Steps:
/// 1. Lowercase (Unicode-aware)
/// 2. Remove every character that is neither alphanumeric nor whitespace
/// 3. Split on whitespace runs
/// 4. Drop empty tokens
///
/// Punctuation is deleted, not replaced: apostrophes inside a token are
/// stripped, so "don't" becomes "dont". The output is canonical:
/// normalizing a joined result yields the same sequence.
pub fn normalize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    cleaned.split_whitespace().map(str::to_owned).collect()
}
