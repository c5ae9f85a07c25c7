// Résumé matching: tokenization, TF-IDF vectorization, and the pluggable
// matcher backends behind the upload endpoint.

pub mod handlers;
pub mod matcher;
pub mod stop_words;
pub mod tfidf;
pub mod tokenizer;
