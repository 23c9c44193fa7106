//! Key/value pairs for headers, query parameters and form fields.

/// An immutable key/value pair used for headers, query parameters and
/// urlencoded form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormData {
    key: String,
    value: String,
}

impl FormData {
    /// Creates a new pair.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Returns the key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns `true` when the key or the value is empty or whitespace-only.
    ///
    /// Empty entries are dropped before transmission; settings-provided
    /// header tables may legitimately contain blank rows.
    pub fn is_empty_entry(&self) -> bool {
        self.key.trim().is_empty() || self.value.trim().is_empty()
    }
}

/// An ordered list of [`FormData`] entries with unique keys.
///
/// Within one request envelope keys are unique: inserting an entry whose key
/// already exists replaces the prior value in place (last write wins).
/// Insertion order is preserved for transmission but carries no transport
/// semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormDataList {
    entries: Vec<FormData>,
}

impl FormDataList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a pair, replacing the value of an existing key in place.
    pub fn upsert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let entry = FormData::new(key, value);
        match self.entries.iter_mut().find(|e| e.key == entry.key) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(FormData::value)
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &FormData> {
        self.entries.iter()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the list holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a FormDataList {
    type Item = &'a FormData;
    type IntoIter = std::slice::Iter<'a, FormData>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<FormData> for FormDataList {
    fn from_iter<T: IntoIterator<Item = FormData>>(iter: T) -> Self {
        let mut list = Self::new();
        for entry in iter {
            list.upsert(entry.key, entry.value);
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_appends_new_keys_in_order() {
        let mut list = FormDataList::new();
        list.upsert("a", "1");
        list.upsert("b", "2");
        list.upsert("c", "3");

        let keys: Vec<_> = list.iter().map(FormData::key).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_upsert_replaces_existing_key_in_place() {
        let mut list = FormDataList::new();
        list.upsert("a", "1");
        list.upsert("b", "2");
        list.upsert("a", "99");

        assert_eq!(list.len(), 2);
        assert_eq!(list.get("a"), Some("99"));

        // Position of the replaced key is preserved.
        let keys: Vec<_> = list.iter().map(FormData::key).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_repeated_upsert_keeps_most_recent_value() {
        let mut list = FormDataList::new();
        for i in 0..5 {
            list.upsert("key", i.to_string());
        }
        assert_eq!(list.len(), 1);
        assert_eq!(list.get("key"), Some("4"));
    }

    #[test]
    fn test_empty_entry_detection() {
        assert!(FormData::new("", "value").is_empty_entry());
        assert!(FormData::new("key", "   ").is_empty_entry());
        assert!(!FormData::new("key", "value").is_empty_entry());
    }
}
