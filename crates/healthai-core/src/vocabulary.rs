//! Symptom vocabulary: the ordered feature names of the training table.
//!
//! Tokens are lowercase with words joined by underscores (`skin_rash`).
//! The position of a token is its index in every feature vector, and it
//! never changes once the vocabulary is built.

use std::collections::HashMap;

/// Convert free text to vocabulary form: trim, lowercase, spaces to underscores.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

/// Display form of a token: underscores to spaces, first letter upper, rest lower.
pub fn display(token: &str) -> String {
    let spaced = token.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomVocabulary {
    tokens: Vec<String>,
    index: HashMap<String, usize>,
}

impl SymptomVocabulary {
    /// Build from column headers, skipping `label_column`. Duplicate headers keep their first position.
    pub fn from_headers<S: AsRef<str>>(headers: &[S], label_column: &str) -> Self {
        let mut tokens = Vec::with_capacity(headers.len());
        let mut index = HashMap::with_capacity(headers.len());
        for h in headers.iter().map(AsRef::as_ref).filter(|h| *h != label_column) {
            if !index.contains_key(h) {
                index.insert(h.to_string(), tokens.len());
                tokens.push(h.to_string());
            }
        }
        Self { tokens, index }
    }

    pub fn len(&self) -> usize { self.tokens.len() }

    pub fn is_empty(&self) -> bool { self.tokens.is_empty() }

    pub fn tokens(&self) -> &[String] { &self.tokens }

    pub fn index_of(&self, token: &str) -> Option<usize> { self.index.get(token).copied() }

    pub fn token(&self, idx: usize) -> Option<&str> { self.tokens.get(idx).map(String::as_str) }

    /// Normalize raw inputs and keep the recognized ones in input order. Repeats are kept.
    pub fn recognize<S: AsRef<str>>(&self, inputs: &[S]) -> Vec<String> {
        inputs
            .iter()
            .map(|raw| normalize(raw.as_ref()))
            .filter(|token| self.index.contains_key(token))
            .collect()
    }

    /// Dense binary vector with a 1 at the index of every recognized token.
    pub fn feature_vector<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<u8> {
        let mut vector = vec![0u8; self.tokens.len()];
        for token in tokens {
            if let Some(slot) = self.index_of(token.as_ref()).and_then(|i| vector.get_mut(i)) {
                *slot = 1;
            }
        }
        vector
    }

    /// All tokens in display form, in vocabulary order.
    pub fn display_tokens(&self) -> Vec<String> {
        self.tokens.iter().map(|t| display(t)).collect()
    }
}
