//! Utility types for validation.

use std::collections::HashMap;

/// A set that performs case-insensitive lookups but preserves original names.
///
/// Used to match rule field names against mapped column names.
#[derive(Debug, Clone, Default)]
pub struct CaseInsensitiveSet {
    /// Maps lowercase name -> original name
    inner: HashMap<String, String>,
}

impl CaseInsensitiveSet {
    /// Create a set from an iterator of strings.
    pub fn from_names<I, S>(iter: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            inner: iter
                .into_iter()
                .map(|s| (s.as_ref().to_lowercase(), s.as_ref().to_string()))
                .collect(),
        }
    }

    /// Get the original column name for a field (case-insensitive lookup).
    pub fn get(&self, value: impl AsRef<str>) -> Option<&str> {
        self.inner
            .get(&value.as_ref().to_lowercase())
            .map(String::as_str)
    }
}
