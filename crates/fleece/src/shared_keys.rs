//! Shared-key tables.
//!
//! Stores that hold many documents with the same field names keep the names
//! once in a table (persisted as a Fleece array of strings under the
//! `SharedKeys` info key) and encode dictionary keys as small integer indexes
//! into it. A table belongs to exactly one store and must not be used to
//! decode documents from another.

use crate::error::{DecodeError, KeyError};
use crate::{FleeceDecoder, Value};

/// Name under which stores persist their shared-key table.
pub const SHARED_KEYS_INFO_KEY: &str = "SharedKeys";

/// Read-only table of shared dictionary keys, indexed from zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedKeys {
    keys: Vec<String>,
}

impl SharedKeys {
    /// Creates a table from keys in index order.
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }

    /// Decodes a persisted table. The root must be an array of strings.
    pub fn from_header(header: &[u8]) -> Result<Self, DecodeError> {
        let decoder = FleeceDecoder::new(header, None);
        let malformed = |reason| DecodeError::KeyResolution {
            offset: decoder.root_offset().max(0) as usize,
            reason: KeyError::MalformedTable(reason),
        };
        let Value::Array(items) = decoder.decode()? else {
            return Err(malformed("root is not an array"));
        };
        items
            .into_iter()
            .map(|item| match item {
                Value::Str(s) => Ok(s),
                _ => Err(malformed("entry is not a string")),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    /// Returns the key at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.keys.get(index).map(String::as_str)
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if the table holds no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the keys in index order.
    pub fn as_slice(&self) -> &[String] {
        &self.keys
    }

    /// Iterates over the keys in index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

impl AsRef<[String]> for SharedKeys {
    fn as_ref(&self) -> &[String] {
        &self.keys
    }
}

impl FromIterator<String> for SharedKeys {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
