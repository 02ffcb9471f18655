//! Name/value records collected from command-line input.
//!
//! A `RecordCollection` is built once per invocation from `-S`/`-L`/`-P`,
//! `-F NAME -V VALUE` pairs, positional words, and interactive lines.  It
//! is consumed by the action resolver and the command handlers, then
//! dropped.  Nothing here touches the vault file.

use std::slice;

/// Delimiter between name and value in `NAME=VALUE` input.
pub const DEFAULT_DELIMITER: &str = "=";

/// Capacity of a freshly constructed collection.
pub const INITIAL_CAPACITY: usize = 4;

/// A single `name = value` pair (e.g. `login = alice`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub value: String,
}

impl Record {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse `NAME<delimiter>VALUE`, splitting on the first delimiter.
    ///
    /// Returns `None` if the delimiter is missing or either side is empty.
    /// The value may itself contain the delimiter (`url=https://x?a=b`).
    pub fn parse(text: &str, delimiter: Option<&str>) -> Option<Self> {
        let delimiter = delimiter.unwrap_or(DEFAULT_DELIMITER);
        let (name, value) = text.split_once(delimiter)?;
        if name.is_empty() || value.is_empty() {
            return None;
        }
        Some(Self::new(name, value))
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }
}

/// Ordered, growable collection of records.
///
/// Storage starts at [`INITIAL_CAPACITY`] and doubles whenever it is full.
#[derive(Debug, Clone)]
pub struct RecordCollection {
    records: Vec<Record>,
}

impl Default for RecordCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordCollection {
    pub fn new() -> Self {
        Self {
            records: Vec::with_capacity(INITIAL_CAPACITY),
        }
    }

    /// Append a record, doubling the backing storage when it is full.
    pub fn add(&mut self, record: Record) {
        if self.records.len() == self.records.capacity() {
            let additional = self.records.capacity().max(INITIAL_CAPACITY);
            self.records.reserve_exact(additional);
        }
        self.records.push(record);
    }

    /// First record whose name starts with `name` (prefix match).
    pub fn get(&self, name: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.name.starts_with(name))
    }

    /// Value of the first record whose name starts with `name`.
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.get(name).map(|r| r.value.as_str())
    }

    /// Deduplicate by name: the record added last wins.
    ///
    /// Earlier records with a repeated name are dropped; survivors keep
    /// their relative order.
    pub fn unique(&mut self) {
        let mut keep = vec![true; self.records.len()];
        for i in (0..self.records.len()).rev() {
            if !keep[i] {
                continue;
            }
            for j in 0..i {
                if keep[j] && self.records[j].name == self.records[i].name {
                    keep[j] = false;
                }
            }
        }

        let mut flags = keep.into_iter();
        self.records.retain(|_| flags.next().unwrap_or(true));
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.records.capacity()
    }

    pub fn iter(&self) -> slice::Iter<'_, Record> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a RecordCollection {
    type Item = &'a Record;
    type IntoIter = slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<Record> for RecordCollection {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut collection = Self::new();
        for record in iter {
            collection.add(record);
        }
        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(pairs: &[(&str, &str)]) -> RecordCollection {
        pairs.iter().map(|(n, v)| Record::new(*n, *v)).collect()
    }

    fn names(c: &RecordCollection) -> Vec<(&str, &str)> {
        c.iter()
            .map(|r| (r.name.as_str(), r.value.as_str()))
            .collect()
    }

    #[test]
    fn parse_splits_on_first_delimiter() {
        let r = Record::parse("url=https://x?a=b", None).unwrap();
        assert_eq!(r.name, "url");
        assert_eq!(r.value, "https://x?a=b");
    }

    #[test]
    fn parse_custom_delimiter() {
        let r = Record::parse("login:alice", Some(":")).unwrap();
        assert_eq!(r, Record::new("login", "alice"));
    }

    #[test]
    fn parse_rejects_empty_parts() {
        assert!(Record::parse("=value", None).is_none());
        assert!(Record::parse("name=", None).is_none());
        assert!(Record::parse("no-delimiter", None).is_none());
    }

    #[test]
    fn setters_replace_parts() {
        let mut r = Record::new("login", "a");
        r.set_name("email");
        r.set_value("a@example.com");
        assert_eq!(r, Record::new("email", "a@example.com"));
    }

    #[test]
    fn new_collection_is_empty_with_initial_capacity() {
        let c = RecordCollection::new();
        assert!(c.is_empty());
        assert!(c.capacity() >= INITIAL_CAPACITY);
    }

    #[test]
    fn add_grows_past_initial_capacity() {
        let mut c = RecordCollection::new();
        for i in 0..9 {
            c.add(Record::new(format!("f{i}"), "v"));
        }
        assert_eq!(c.len(), 9);
        assert!(c.capacity() >= 9);
        assert_eq!(c.iter().last().unwrap().name, "f8");
    }

    #[test]
    fn get_returns_first_prefix_match() {
        let c = collection(&[("site", "a.com"), ("login", "alice"), ("login", "bob")]);
        assert_eq!(c.value_of("login"), Some("alice"));
        assert_eq!(c.value_of("site"), Some("a.com"));
        assert!(c.get("password").is_none());
    }

    #[test]
    fn get_matches_by_prefix() {
        let c = collection(&[("sitemap", "x")]);
        assert_eq!(c.value_of("site"), Some("x"));
    }

    #[test]
    fn unique_keeps_last_value_per_name() {
        let mut c = collection(&[("login", "a"), ("password", "x"), ("login", "b")]);
        c.unique();
        assert_eq!(names(&c), vec![("password", "x"), ("login", "b")]);
    }

    #[test]
    fn unique_handles_many_duplicates() {
        let mut c = collection(&[
            ("a", "1"),
            ("b", "1"),
            ("a", "2"),
            ("c", "1"),
            ("a", "3"),
            ("b", "2"),
        ]);
        c.unique();
        assert_eq!(names(&c), vec![("c", "1"), ("a", "3"), ("b", "2")]);
    }

    #[test]
    fn unique_without_duplicates_is_noop() {
        let mut c = collection(&[("site", "s"), ("login", "l")]);
        c.unique();
        assert_eq!(names(&c), vec![("site", "s"), ("login", "l")]);
    }
}
