//! Cache key normalization
//!
//! Raw job keys are opaque labels (street names, ids, anything a spreadsheet
//! can hold). They become file names, so path-hostile characters are removed.

use std::fmt;

/// Characters that would let a key escape or split its namespace directory
const PATH_HOSTILE: [char; 3] = ['/', '\\', ':'];

/// A filesystem-safe cache key derived from a raw job key
///
/// An empty normalized key is a sentinel: nothing is ever persisted under it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    /// Normalize a raw key
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(normalize_key(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether persistence must be short-circuited for this key
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// File name inside a namespace directory, e.g. `Main St.json`
    #[must_use]
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{extension}", self.0)
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Strip `/`, `\` and `:` from a raw key, then trim surrounding whitespace.
///
/// Empty input is returned unchanged. The function is idempotent:
/// `normalize_key(&normalize_key(k)) == normalize_key(k)`.
#[must_use]
pub fn normalize_key(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let stripped: String = raw.chars().filter(|c| !PATH_HOSTILE.contains(c)).collect();
    stripped.trim().to_string()
}
