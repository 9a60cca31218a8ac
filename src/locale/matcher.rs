//! Picking the best available locale for a request.
//!
//! # Invariants
//!
//! 1. **Order independent**: the result depends only on the *set* of
//!    available locales, never on the order they are supplied in.
//! 2. **No silent default**: when every fallback is exhausted the matcher
//!    fails with [`MatchError::NoMatchingLocale`]; substituting a default is
//!    the caller's decision. Root is never reached by fallback.

use crate::locale::{
    LocaleId,
    alias::{Aliases, resolve_alias},
};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("no available locale matches `{requested}`")]
    NoMatchingLocale { requested: String },
}

/// Exact match first, then drop the variant, the territory and the script.
///
/// ```
/// use locdata::{LocaleId, match_locale};
///
/// let available = [LocaleId::parse("fr").unwrap()];
/// let got = match_locale(&LocaleId::parse("fr-CA").unwrap(), &available).unwrap();
/// assert_eq!(got.to_string(), "fr");
/// ```
pub fn match_locale<'a, I>(requested: &LocaleId, available: I) -> Result<LocaleId, MatchError>
where
    I: IntoIterator<Item = &'a LocaleId>,
{
    let available: HashSet<&LocaleId> = available.into_iter().collect();
    fallback(requested, &available).ok_or_else(|| MatchError::NoMatchingLocale {
        requested: requested.to_string(),
    })
}

/// Try each preferred locale in order.
///
/// For every candidate the exact identifier is tried first, then its alias
/// (when an alias table is given, e.g. `no` → `nb_NO`), then the usual
/// truncation fallback.
pub fn negotiate<'a, I>(
    preferred: &[LocaleId],
    available: I,
    aliases: Option<&Aliases>,
) -> Result<LocaleId, MatchError>
where
    I: IntoIterator<Item = &'a LocaleId>,
{
    let available: HashSet<&LocaleId> = available.into_iter().collect();
    for wanted in preferred {
        if available.contains(wanted) {
            return Ok(wanted.clone());
        }
        if let Some(alias) = aliases.and_then(|table| resolve_alias(table, wanted))
            && available.contains(&alias)
        {
            return Ok(alias);
        }
        if let Some(found) = fallback(wanted, &available) {
            return Ok(found);
        }
    }

    let requested = preferred
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    Err(MatchError::NoMatchingLocale { requested })
}

#[inline]
fn fallback(requested: &LocaleId, available: &HashSet<&LocaleId>) -> Option<LocaleId> {
    requested
        .truncations()
        .into_iter()
        .find(|candidate| available.contains(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::alias::LOCALE_ALIASES;
    use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

    fn ids(tags: &[&str]) -> Vec<LocaleId> {
        tags.iter().map(|t| LocaleId::parse(t).unwrap()).collect()
    }

    fn id(tag: &str) -> LocaleId {
        LocaleId::parse(tag).unwrap()
    }

    #[test]
    fn exact_match_wins() {
        let available = ids(&["fr", "fr_CA", "en"]);
        assert_eq!(match_locale(&id("fr_CA"), &available).unwrap(), id("fr_CA"));
    }

    #[test]
    fn territory_falls_back_to_language() {
        let available = ids(&["fr"]);
        assert_eq!(match_locale(&id("fr_CA"), &available).unwrap(), id("fr"));
    }

    #[test]
    fn drops_variant_then_territory_then_script() {
        let available = ids(&["zh_Hant", "zh"]);
        assert_eq!(match_locale(&id("zh_Hant_TW"), &available).unwrap(), id("zh_Hant"));
        let available = ids(&["en_US", "en"]);
        assert_eq!(match_locale(&id("en_US_POSIX"), &available).unwrap(), id("en_US"));
    }

    #[test]
    fn unknown_language_fails() {
        let available = ids(&["fr", "en", "root"]);
        assert_eq!(
            match_locale(&id("zz"), &available),
            Err(MatchError::NoMatchingLocale {
                requested: "zz".into()
            })
        );
    }

    #[test]
    fn result_is_independent_of_iteration_order() {
        let mut available = ids(&["de", "de_AT", "de_CH", "en", "en_GB", "fr", "zh_Hant"]);
        let wanted = [id("de_AT_1996"), id("en_GB"), id("zh_Hant_HK"), id("fr_BE")];
        let expected: Vec<_> = wanted
            .iter()
            .map(|w| match_locale(w, &available).unwrap())
            .collect();

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..32 {
            available.shuffle(&mut rng);
            let got: Vec<_> = wanted
                .iter()
                .map(|w| match_locale(w, &available).unwrap())
                .collect();
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn negotiate_walks_preferences_in_order() {
        let available = ids(&["de_DE", "de_AT"]);
        let got = negotiate(&ids(&["de_DE", "en_US"]), &available, None).unwrap();
        assert_eq!(got, id("de_DE"));

        let available = ids(&["en", "de"]);
        let got = negotiate(&ids(&["de_DE", "en_US"]), &available, None).unwrap();
        assert_eq!(got, id("de"));

        let available = ids(&["en_US"]);
        assert!(negotiate(&ids(&["de_DE", "de"]), &available, None).is_err());
    }

    #[test]
    fn negotiate_consults_aliases() {
        let available = ids(&["ja_JP", "en_US"]);
        let got = negotiate(&ids(&["ja", "en_US"]), &available, Some(&LOCALE_ALIASES)).unwrap();
        assert_eq!(got, id("ja_JP"));

        let available = ids(&["nb_NO", "sv_SE"]);
        let got = negotiate(&ids(&["no", "sv"]), &available, Some(&LOCALE_ALIASES)).unwrap();
        assert_eq!(got, id("nb_NO"));

        assert!(negotiate(&ids(&["no"]), &available, None).is_err());
    }
}
