use std::collections::BTreeSet;

use crate::matching::stop_words::is_stop_word;

/// Splits text into lowercase runs of word characters (alphanumerics and `_`).
/// Single-character tokens are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().nth(1).is_some())
        .map(str::to_lowercase)
        .collect()
}

/// Tokens of `text` with English stop words removed.
pub fn content_tokens(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|token| !is_stop_word(token))
        .collect()
}

/// Distinct lowercase keywords of `text`, sorted, with stop words removed.
///
/// Unlike [`tokenize`], single characters survive and `+`/`#` stay part of a
/// word, so skills such as `C`, `R`, `C++` and `C#` are kept.
pub fn keyword_set(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '+' | '#')))
        .filter(|word| word.chars().any(char::is_alphanumeric))
        .map(str::to_lowercase)
        .filter(|word| !is_stop_word(word))
        .collect()
}
