//! Raw attribute tag parsing.
//!
//! A tag is a comma-separated list of tokens. `key=value` tokens are stored
//! under `key`; bare tokens are stored under the scope key supplied by the
//! caller. Values under one key are deduplicated and keep first-seen order.

use crate::error::TagError;

///
/// TagPairs
///
/// Multi-valued key → values mapping for one attribute.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TagPairs {
    pairs: Vec<(String, Vec<String>)>,
}

impl TagPairs {
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Parse a raw tag string, storing bare tokens under `scope_key`.
    pub fn parse(tag: &str, scope_key: &str) -> Result<Self, TagError> {
        let mut tp = Self::new();

        for token in tag.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match token.split_once('=') {
                None => tp.add(scope_key, token),
                Some((key, value)) => {
                    if value.contains('=') {
                        return Err(TagError::MultipleAssignments {
                            token: token.to_string(),
                        });
                    }
                    let (key, value) = (key.trim(), value.trim());
                    if key.is_empty() {
                        return Err(TagError::EmptyKey {
                            token: token.to_string(),
                        });
                    }
                    if value.is_empty() {
                        return Err(TagError::EmptyValue {
                            token: token.to_string(),
                        });
                    }
                    tp.add(key, value);
                }
            }
        }

        Ok(tp)
    }

    /// All values stored under `key`, in first-seen order.
    #[must_use]
    pub fn get(&self, key: &str) -> &[String] {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map_or(&[], |(_, values)| values.as_slice())
    }

    /// First value stored under `key`.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).first().map(String::as_str)
    }

    pub fn add(&mut self, key: &str, value: &str) {
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => {
                if !values.iter().any(|v| v == value) {
                    values.push(value.to_string());
                }
            }
            None => self.pairs.push((key.to_string(), vec![value.to_string()])),
        }
    }

    #[must_use]
    pub fn exists(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    #[must_use]
    pub fn pair_exists(&self, key: &str, value: &str) -> bool {
        self.get(key).iter().any(|v| v == value)
    }
}
