//! Locale identifiers.
//!
//! A [`LocaleId`] is the structured form of a tag such as `zh_Hant_TW` or
//! `en-GB`. Components are stored in canonical case, so two identifiers that
//! name the same locale compare equal no matter how the tag was spelled.
//!
//! The ancestor chain of an identifier is a pure function of its components:
//! drop the variant, then the territory, then the script, then fall back to
//! the universal root.

pub mod alias;
pub mod matcher;

use memchr::memchr2;
use smallvec::SmallVec;
use std::{fmt, str::FromStr};
use thiserror::Error;

pub use matcher::{MatchError, match_locale, negotiate};

/// Language subtag of the universal root locale.
pub const ROOT: &str = "root";

/// Ancestor chains never exceed five links (full, -variant, -territory, -script, root).
pub type Chain = SmallVec<[LocaleId; 5]>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TagError {
    #[error("malformed locale tag `{tag}`: {reason}")]
    MalformedTag { tag: String, reason: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocaleId {
    language: String,
    script: Option<String>,
    territory: Option<String>,
    variant: Option<String>,
}

impl LocaleId {
    /// The universal root locale, ancestor of every other locale.
    #[inline]
    pub fn root() -> Self {
        Self {
            language: ROOT.to_owned(),
            script: None,
            territory: None,
            variant: None,
        }
    }

    /// Parse a locale tag.
    ///
    /// Both `-` and `_` separate subtags. A trailing charset (`.UTF-8`) or
    /// modifier (`@euro`) is ignored. `und` is accepted as a name for root.
    ///
    /// ```
    /// use locdata::LocaleId;
    ///
    /// let id = LocaleId::parse("zh-hant-tw").unwrap();
    /// assert_eq!(id.to_string(), "zh_Hant_TW");
    /// assert_eq!(LocaleId::parse("de_DE.iso885915@euro").unwrap().to_string(), "de_DE");
    /// ```
    pub fn parse(tag: &str) -> Result<Self, TagError> {
        let malformed = |reason| TagError::MalformedTag {
            tag: tag.to_owned(),
            reason,
        };

        let end = memchr2(b'.', b'@', tag.as_bytes()).unwrap_or(tag.len());
        let core = tag[..end].trim();
        if core.is_empty() {
            return Err(malformed("empty tag"));
        }

        let mut parts = core.split(['-', '_']).peekable();
        let language = parts.next().unwrap_or_default();
        if !is_alpha(language, 2, 8) {
            return Err(malformed("language subtag must be 2 to 8 letters"));
        }
        let mut language = language.to_ascii_lowercase();
        if language == "und" {
            language = ROOT.to_owned();
        }

        let script = parts
            .next_if(|p| is_alpha(p, 4, 4))
            .map(title_case);
        let territory = parts
            .next_if(|p| is_alpha(p, 2, 2) || is_numeric_region(p))
            .map(str::to_ascii_uppercase);
        let variant = parts.next_if(|p| is_variant(p)).map(str::to_ascii_uppercase);

        if parts.next().is_some() {
            return Err(malformed("unrecognized subtag"));
        }
        if language == ROOT && (script.is_some() || territory.is_some() || variant.is_some()) {
            return Err(malformed("the root locale takes no subtags"));
        }

        Ok(Self {
            language,
            script,
            territory,
            variant,
        })
    }

    #[inline]
    pub fn language(&self) -> &str {
        &self.language
    }

    #[inline]
    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    #[inline]
    pub fn territory(&self) -> Option<&str> {
        self.territory.as_deref()
    }

    #[inline]
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.language == ROOT
    }

    /// True for a bare language such as `en` (root excluded).
    #[inline]
    pub fn is_language_only(&self) -> bool {
        !self.is_root()
            && self.script.is_none()
            && self.territory.is_none()
            && self.variant.is_none()
    }

    /// The language-only identifier this locale belongs to.
    pub fn language_id(&self) -> Self {
        Self {
            language: self.language.clone(),
            script: None,
            territory: None,
            variant: None,
        }
    }

    /// The next, more general, locale: drop the variant, then the territory,
    /// then the script; a bare language falls back to root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let mut parent = self.clone();
        if parent.variant.take().is_some()
            || parent.territory.take().is_some()
            || parent.script.take().is_some()
        {
            return Some(parent);
        }
        Some(Self::root())
    }

    /// This locale followed by all of its ancestors, ending with root.
    pub fn ancestors(&self) -> Chain {
        std::iter::successors(Some(self.clone()), Self::parent).collect()
    }

    /// The candidates tried when matching: the ancestor chain without root.
    /// Root itself yields only `[root]`.
    pub fn truncations(&self) -> Chain {
        if self.is_root() {
            return std::iter::once(self.clone()).collect();
        }
        std::iter::successors(Some(self.clone()), Self::parent)
            .take_while(|id| !id.is_root())
            .collect()
    }

    /// Render with `-` separators, as in BCP 47.
    pub fn to_bcp47(&self) -> String {
        self.join('-')
    }

    fn join(&self, sep: char) -> String {
        let mut out = self.language.clone();
        for part in [&self.script, &self.territory, &self.variant]
            .into_iter()
            .flatten()
        {
            out.push(sep);
            out.push_str(part);
        }
        out
    }
}

impl fmt::Display for LocaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join('_'))
    }
}

impl FromStr for LocaleId {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[inline]
fn is_alpha(s: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_alphabetic())
}

#[inline]
fn is_numeric_region(s: &str) -> bool {
    s.len() == 3 && s.bytes().all(|b| b.is_ascii_digit())
}

#[inline]
fn is_variant(s: &str) -> bool {
    let Some(first) = s.bytes().next() else {
        return false;
    };
    let alnum = s.bytes().all(|b| b.is_ascii_alphanumeric());
    alnum
        && ((s.len() == 4 && first.is_ascii_digit())
            || ((5..=8).contains(&s.len()) && first.is_ascii_alphabetic()))
}

fn title_case(s: &str) -> String {
    let mut out = s.to_ascii_lowercase();
    if let Some(first) = out.get_mut(..1) {
        first.make_ascii_uppercase();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(tag: &str) -> LocaleId {
        LocaleId::parse(tag).unwrap()
    }

    #[test]
    fn parses_all_components() {
        let l = id("zh_hant_tw");
        assert_eq!(l.language(), "zh");
        assert_eq!(l.script(), Some("Hant"));
        assert_eq!(l.territory(), Some("TW"));
        assert_eq!(l.variant(), None);

        let l = id("en-US-posix");
        assert_eq!(l.territory(), Some("US"));
        assert_eq!(l.variant(), Some("POSIX"));

        assert_eq!(id("es-419").territory(), Some("419"));
        assert_eq!(id("de-1996").variant(), Some("1996"));
    }

    #[test]
    fn separators_and_case_are_irrelevant() {
        assert_eq!(id("EN-gb"), id("en_GB"));
        assert_eq!(id("en_GB").to_bcp47(), "en-GB");
        assert_eq!(id("en_GB").to_string(), "en_GB");
    }

    #[test]
    fn strips_charset_and_modifier() {
        assert_eq!(id("it_IT@euro"), id("it_IT"));
        assert_eq!(id("en_US.UTF-8"), id("en_US"));
        assert_eq!(id("de_DE.iso885915@euro"), id("de_DE"));
    }

    #[test]
    fn und_and_root_are_the_root_locale() {
        assert!(id("und").is_root());
        assert!(id("root").is_root());
        assert!(LocaleId::parse("root_US").is_err());
    }

    #[test]
    fn rejects_malformed_tags() {
        for bad in ["", "e", "en_", "not_a_LOCALE_String", "en--US", "12", "en_US_POSIX_x", "@euro"] {
            assert!(
                matches!(LocaleId::parse(bad), Err(TagError::MalformedTag { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn ancestor_chain_drops_variant_territory_script() {
        let chain: Vec<String> = id("zh_Hant_TW").ancestors().iter().map(ToString::to_string).collect();
        assert_eq!(chain, ["zh_Hant_TW", "zh_Hant", "zh", "root"]);

        let chain: Vec<String> = id("en_US_POSIX").ancestors().iter().map(ToString::to_string).collect();
        assert_eq!(chain, ["en_US_POSIX", "en_US", "en", "root"]);

        assert_eq!(LocaleId::root().ancestors().len(), 1);
    }

    #[test]
    fn truncations_exclude_root() {
        let t: Vec<String> = id("fr_CA").truncations().iter().map(ToString::to_string).collect();
        assert_eq!(t, ["fr_CA", "fr"]);
        assert_eq!(LocaleId::root().truncations().as_slice(), &[LocaleId::root()]);
    }
}
