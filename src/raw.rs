//! Raw locale records, exactly as found in the source dataset.
//!
//! A [`RawRecord`] holds one locale's own data with no inheritance applied.
//! Entries are keyed by `(category, dotted key path)` in an ordered map so
//! the merge performed by the resolver is explicit and iteration order is
//! deterministic.

pub mod category;
pub mod tree;

pub use category::{Category, MergePolicy};

use crate::{compile::CompileError, locale::LocaleId};
use std::collections::{BTreeMap, BTreeSet, btree_map::Entry};
use thiserror::Error;

/// `(category, key path) → value`, ordered by category then path.
pub type Entries = BTreeMap<Category, BTreeMap<String, Value>>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(f64),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Short type name for diagnostics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Strings of a list value, or `None` if any item is not a string.
    pub fn string_list(&self) -> Option<Vec<&str>> {
        self.as_list()?.iter().map(Value::as_str).collect()
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// One locale's own attributes. Built once during ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    locale: LocaleId,
    entries: Entries,
}

impl RawRecord {
    pub fn new(locale: LocaleId) -> Self {
        Self {
            locale,
            entries: Entries::new(),
        }
    }

    /// Add an entry. Duplicate paths and non-list values in additive
    /// categories are rejected.
    pub fn insert(
        &mut self,
        category: Category,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), CompileError> {
        let key = key.into();
        let value = value.into();
        if category.merge_policy() == MergePolicy::Additive && value.as_list().is_none() {
            return Err(CompileError::ExpectedList {
                locale: self.locale.clone(),
                category,
                key,
                found: value.kind(),
            });
        }
        match self.entries.entry(category).or_default().entry(key) {
            Entry::Occupied(slot) => Err(CompileError::DuplicateKey {
                locale: self.locale.clone(),
                category,
                key: slot.key().clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(())
            }
        }
    }

    #[inline]
    pub fn locale(&self) -> &LocaleId {
        &self.locale
    }

    #[inline]
    pub fn get(&self, category: Category, key: &str) -> Option<&Value> {
        self.entries.get(&category)?.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &str, &Value)> {
        self.entries.iter().flat_map(|(&category, keys)| {
            keys.iter()
                .map(move |(key, value)| (category, key.as_str(), value))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DatasetError {
    #[error("dataset has no root locale record")]
    MissingRoot,
    #[error("dataset holds two records for `{0}`")]
    DuplicateLocale(LocaleId),
}

/// Every raw record of a dataset, shared read-only by the resolver.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: BTreeMap<LocaleId, RawRecord>,
    languages: BTreeSet<String>,
}

impl Dataset {
    /// Collect records. A root record is required.
    pub fn new(records: impl IntoIterator<Item = RawRecord>) -> Result<Self, DatasetError> {
        let mut map = BTreeMap::new();
        for record in records {
            match map.entry(record.locale().clone()) {
                Entry::Occupied(slot) => {
                    return Err(DatasetError::DuplicateLocale(slot.key().clone()));
                }
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
            }
        }
        if !map.contains_key(&LocaleId::root()) {
            return Err(DatasetError::MissingRoot);
        }
        let languages = map
            .keys()
            .map(|id| id.language().to_owned())
            .collect();
        Ok(Self {
            records: map,
            languages,
        })
    }

    #[inline]
    pub fn record(&self, locale: &LocaleId) -> Option<&RawRecord> {
        self.records.get(locale)
    }

    /// Whether any record (at any level) exists for this language.
    #[inline]
    pub fn knows_language(&self, language: &str) -> bool {
        self.languages.contains(language)
    }

    pub fn locales(&self) -> impl Iterator<Item = &LocaleId> {
        self.records.keys()
    }

    pub fn records(&self) -> impl Iterator<Item = &RawRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(tag: &str) -> LocaleId {
        LocaleId::parse(tag).unwrap()
    }

    #[test]
    fn insert_rejects_duplicates() {
        let mut r = RawRecord::new(id("en"));
        r.insert(Category::Date, "gregorian.short", "M/d/yy").unwrap();
        let err = r.insert(Category::Date, "gregorian.short", "d/M/y").unwrap_err();
        assert!(matches!(err, CompileError::DuplicateKey { .. }));
        assert_eq!(r.get(Category::Date, "gregorian.short").and_then(Value::as_str), Some("M/d/yy"));
    }

    #[test]
    fn additive_categories_require_lists() {
        let mut r = RawRecord::new(id("en"));
        let err = r.insert(Category::CurrencySymbols, "USD", "$").unwrap_err();
        assert!(matches!(err, CompileError::ExpectedList { found: "string", .. }));
        r.insert(Category::CurrencySymbols, "USD", vec!["$"]).unwrap();
    }

    #[test]
    fn iteration_is_ordered_by_category_then_key() {
        let mut r = RawRecord::new(id("en"));
        r.insert(Category::Time, "b", "2").unwrap();
        r.insert(Category::Languages, "z", "1").unwrap();
        r.insert(Category::Time, "a", "3").unwrap();
        let keys: Vec<_> = r.iter().map(|(c, k, _)| (c, k)).collect();
        assert_eq!(
            keys,
            [(Category::Languages, "z"), (Category::Time, "a"), (Category::Time, "b")]
        );
        assert_eq!(r.len(), 3);
    }

    #[test]
    fn dataset_requires_root_and_unique_locales() {
        assert_eq!(
            Dataset::new([RawRecord::new(id("en"))]).unwrap_err(),
            DatasetError::MissingRoot
        );
        let dup = Dataset::new([
            RawRecord::new(LocaleId::root()),
            RawRecord::new(id("en")),
            RawRecord::new(id("en")),
        ]);
        assert_eq!(dup.unwrap_err(), DatasetError::DuplicateLocale(id("en")));

        let ds = Dataset::new([RawRecord::new(LocaleId::root()), RawRecord::new(id("en_GB"))]).unwrap();
        assert!(ds.knows_language("en"));
        assert!(!ds.knows_language("fr"));
    }
}
