//! Locale inheritance.
//!
//! A locale's effective data is its ancestor chain folded from the root
//! down: root, then the bare language, then language+script, then the
//! territory form, then the full identifier. Each category follows its
//! [`MergePolicy`].

use crate::{
    locale::LocaleId,
    raw::{Category, Dataset, Entries, MergePolicy, RawRecord, Value},
};
use std::collections::{BTreeMap, btree_map::Entry};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no data for any locale of language `{}` (requested `{locale}`)", locale.language())]
    UnknownLocale { locale: LocaleId },
}

/// A locale's effective data after inheritance. Immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBundle {
    locale: LocaleId,
    entries: Entries,
}

impl ResolvedBundle {
    pub(crate) fn from_parts(locale: LocaleId, entries: Entries) -> Self {
        Self { locale, entries }
    }

    #[inline]
    pub fn locale(&self) -> &LocaleId {
        &self.locale
    }

    #[inline]
    pub fn get(&self, category: Category, key: &str) -> Option<&Value> {
        self.entries.get(&category)?.get(key)
    }

    /// All keys of one category, in key order.
    pub fn category(&self, category: Category) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .get(&category)
            .into_iter()
            .flat_map(|keys| keys.iter().map(|(k, v)| (k.as_str(), v)))
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

/// Compute the effective data of `locale`.
///
/// A locale with no record of its own resolves purely by inheritance, as
/// long as some record of its language exists.
pub fn resolve(locale: &LocaleId, dataset: &Dataset) -> Result<ResolvedBundle, ResolveError> {
    if !locale.is_root() && !dataset.knows_language(locale.language()) {
        return Err(ResolveError::UnknownLocale {
            locale: locale.clone(),
        });
    }

    let mut entries = Entries::new();
    for ancestor in locale.ancestors().iter().rev() {
        if let Some(record) = dataset.record(ancestor) {
            fold(&mut entries, record);
        }
    }
    Ok(ResolvedBundle::from_parts(locale.clone(), entries))
}

fn fold(into: &mut Entries, record: &RawRecord) {
    let general = record.locale().is_root() || record.locale().is_language_only();
    for (category, key, value) in record.iter() {
        let policy = category.merge_policy();
        if policy == MergePolicy::LanguageScoped && !general {
            continue;
        }
        // Created only once a value lands, so bundles hold no empty categories.
        let keys = into.entry(category).or_default();
        match policy {
            MergePolicy::Override | MergePolicy::LanguageScoped => {
                keys.insert(key.to_owned(), value.clone());
            }
            MergePolicy::Additive => match keys.entry(key.to_owned()) {
                Entry::Occupied(mut slot) => {
                    if let (Value::List(have), Value::List(more)) = (slot.get_mut(), value) {
                        have.extend(more.iter().cloned());
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(value.clone());
                }
            },
        }
    }
}
