//! Name-membership relevance filter.
//!
//! A front end typically parses a header together with everything it
//! includes; only declarations actually named in the requested source
//! files are relevant. The filter is a plain identifier set harvested
//! from source text.

use std::collections::HashSet;

/// A set of identifiers considered relevant to a translation run.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    names: HashSet<String>,
}

impl NameFilter {
    /// Build an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Harvest every identifier-shaped word from a source text.
    ///
    /// Words are split at any non-identifier character, so `Node*`
    /// contributes `Node` and `std::string` contributes both parts.
    pub fn from_source(text: &str) -> Self {
        let mut filter = Self::new();
        filter.add_source(text);
        filter
    }

    /// Add every identifier from another source text to the filter.
    pub fn add_source(&mut self, text: &str) {
        for word in text.split(|c: char| !(c.is_alphanumeric() || c == '_')) {
            if is_identifier(word) {
                self.names.insert(word.to_string());
            }
        }
    }

    /// Whether a name is in the filter.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of distinct identifiers harvested.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the filter holds no identifiers.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Whether a word is a syntactically valid identifier: a letter or
/// underscore followed by letters, digits, or underscores.
pub fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}
