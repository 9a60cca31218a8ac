//! The query surface over a loaded locale store.

use crate::{
    compile::Compilation,
    context::Context,
    format::{
        FormatError, FormatOptions, ListStyle, date, display, list, number,
        unit::{self, UnitWidth},
    },
    locale::{
        LocaleId, MatchError, TagError,
        alias::{Aliases, LOCALE_ALIASES},
        match_locale, negotiate,
    },
    plural::{PluralCategory, PluralOperands, PluralRuleSet, PluralType, RuleError},
    raw::{Category, Value},
    store::{self, Store, StoreError},
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::{collections::BTreeMap, path::Path, sync::OnceLock};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone)]
pub enum LocDataError {
    #[error(transparent)]
    Tag(#[from] TagError),
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// A loaded store plus matching policy. Every formatting call names its
/// locale. Plural rules are parsed once per locale, on first use.
pub struct LocData {
    store: Store,
    /// Plural rules parsed on first use, one slot per stored locale.
    plurals: BTreeMap<LocaleId, OnceLock<Result<PluralRuleSet, RuleError>>>,
    aliases: Option<&'static Aliases>,
    default_locale: Option<LocaleId>,
}

impl LocData {
    pub fn builder(store: Store) -> LocDataBuilder {
        LocDataBuilder {
            store,
            aliases: Some(&LOCALE_ALIASES),
            default_locale: None,
        }
    }

    pub fn new(store: Store) -> Self {
        Self::builder(store).build()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LocDataError> {
        Ok(Self::new(Store::load(path)?))
    }

    /// Serve a compilation from memory, through the same encoding a store
    /// file uses.
    pub fn from_compilation(compilation: &Compilation) -> Result<Self, LocDataError> {
        let bytes = store::to_bytes(&compilation.bundles)?;
        Ok(Self::new(Store::from_bytes(bytes)?))
    }

    #[inline]
    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn locales(&self) -> impl Iterator<Item = &LocaleId> {
        self.store.locales()
    }

    pub fn lookup(&self, locale: &LocaleId, category: Category, key: &str) -> Result<Option<&Value>, LocDataError> {
        Ok(self.store.lookup(locale, category, key)?)
    }

    /// Best stored locale for `tag`, falling back to the configured default
    /// locale when nothing matches.
    pub fn match_locale(&self, tag: &str) -> Result<LocaleId, LocDataError> {
        let requested = LocaleId::parse(tag)?;
        self.or_default(match_locale(&requested, self.store.locales()))
    }

    /// Best stored locale for a list of preferences, most preferred first.
    pub fn negotiate<S: AsRef<str>>(&self, preferred: &[S]) -> Result<LocaleId, LocDataError> {
        let preferred = preferred
            .iter()
            .map(|t| LocaleId::parse(t.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        self.or_default(negotiate(&preferred, self.store.locales(), self.aliases))
    }

    fn or_default(&self, found: Result<LocaleId, MatchError>) -> Result<LocaleId, LocDataError> {
        match (found, &self.default_locale) {
            (Ok(id), _) => Ok(id),
            (Err(e), Some(default)) => {
                debug!(error = %e, default = %default, "using default locale");
                Ok(default.clone())
            }
            (Err(e), None) => Err(e.into()),
        }
    }

    /// The formatting context of a stored locale.
    pub fn context(&self, locale: &LocaleId) -> Result<Context<'_>, LocDataError> {
        let bundle = self.store.bundle(locale)?;
        let slot = self
            .plurals
            .get(locale)
            .ok_or_else(|| StoreError::LocaleNotInStore(locale.clone()))?;
        let plurals = slot
            .get_or_init(|| PluralRuleSet::from_bundle(bundle))
            .as_ref()
            .map_err(|e| FormatError::from(e.clone()))?;
        Ok(Context::with_plurals(bundle, plurals))
    }

    // ─── Formatting ────────────────────────────────────────────────────────

    pub fn format_date(&self, locale: &LocaleId, value: &NaiveDate, opts: &FormatOptions) -> Result<String, LocDataError> {
        Ok(date::format_date(&self.context(locale)?, value, opts)?)
    }

    pub fn format_time(&self, locale: &LocaleId, value: &NaiveTime, opts: &FormatOptions) -> Result<String, LocDataError> {
        Ok(date::format_time(&self.context(locale)?, value, opts)?)
    }

    pub fn format_datetime(
        &self,
        locale: &LocaleId,
        value: &NaiveDateTime,
        opts: &FormatOptions,
    ) -> Result<String, LocDataError> {
        Ok(date::format_datetime(&self.context(locale)?, value, opts)?)
    }

    pub fn format_decimal(&self, locale: &LocaleId, value: f64, opts: &FormatOptions) -> Result<String, LocDataError> {
        Ok(number::format_decimal(&self.context(locale)?, value, opts)?)
    }

    pub fn format_percent(&self, locale: &LocaleId, value: f64, opts: &FormatOptions) -> Result<String, LocDataError> {
        Ok(number::format_percent(&self.context(locale)?, value, opts)?)
    }

    pub fn format_scientific(&self, locale: &LocaleId, value: f64, opts: &FormatOptions) -> Result<String, LocDataError> {
        Ok(number::format_scientific(&self.context(locale)?, value, opts)?)
    }

    pub fn format_currency(&self, locale: &LocaleId, value: f64, opts: &FormatOptions) -> Result<String, LocDataError> {
        Ok(number::format_currency(&self.context(locale)?, value, opts)?)
    }

    pub fn format_list<S: AsRef<str>>(
        &self,
        locale: &LocaleId,
        items: &[S],
        style: ListStyle,
    ) -> Result<String, LocDataError> {
        Ok(list::format_list(&self.context(locale)?, items, style)?)
    }

    pub fn format_unit(
        &self,
        locale: &LocaleId,
        value: f64,
        unit_name: &str,
        width: UnitWidth,
        opts: &FormatOptions,
    ) -> Result<String, LocDataError> {
        Ok(unit::format_unit(&self.context(locale)?, value, unit_name, width, opts)?)
    }

    /// `subject` named in the language of `locale`.
    pub fn display_name(&self, locale: &LocaleId, subject: &LocaleId) -> Result<String, LocDataError> {
        Ok(display::display_name(&self.context(locale)?, subject)?)
    }

    pub fn plural_category(
        &self,
        locale: &LocaleId,
        operands: &PluralOperands,
        ty: PluralType,
    ) -> Result<PluralCategory, LocDataError> {
        Ok(self.context(locale)?.plural_category(operands, ty))
    }

    // ─── Parsing ───────────────────────────────────────────────────────────

    pub fn parse_date(&self, locale: &LocaleId, text: &str, opts: &FormatOptions) -> Result<NaiveDate, LocDataError> {
        Ok(date::parse_date(&self.context(locale)?, text, opts)?)
    }

    pub fn parse_time(&self, locale: &LocaleId, text: &str, opts: &FormatOptions) -> Result<NaiveTime, LocDataError> {
        Ok(date::parse_time(&self.context(locale)?, text, opts)?)
    }

    pub fn parse_datetime(
        &self,
        locale: &LocaleId,
        text: &str,
        opts: &FormatOptions,
    ) -> Result<NaiveDateTime, LocDataError> {
        Ok(date::parse_datetime(&self.context(locale)?, text, opts)?)
    }

    pub fn parse_decimal(&self, locale: &LocaleId, text: &str, opts: &FormatOptions) -> Result<f64, LocDataError> {
        Ok(number::parse_decimal(&self.context(locale)?, text, opts)?)
    }

    pub fn parse_percent(&self, locale: &LocaleId, text: &str, opts: &FormatOptions) -> Result<f64, LocDataError> {
        Ok(number::parse_percent(&self.context(locale)?, text, opts)?)
    }

    pub fn parse_currency(
        &self,
        locale: &LocaleId,
        text: &str,
        opts: &FormatOptions,
    ) -> Result<(f64, String), LocDataError> {
        Ok(number::parse_currency(&self.context(locale)?, text, opts)?)
    }
}

pub struct LocDataBuilder {
    store: Store,
    aliases: Option<&'static Aliases>,
    default_locale: Option<LocaleId>,
}

impl LocDataBuilder {
    /// Alias table consulted by [`LocData::negotiate`]; `None` disables
    /// aliasing. Defaults to [`LOCALE_ALIASES`].
    pub fn aliases(mut self, aliases: Option<&'static Aliases>) -> Self {
        self.aliases = aliases;
        self
    }

    /// Locale returned when matching finds nothing. Unset by default, in
    /// which case matching fails with [`MatchError::NoMatchingLocale`].
    pub fn default_locale(mut self, locale: LocaleId) -> Self {
        self.default_locale = Some(locale);
        self
    }

    pub fn build(self) -> LocData {
        let plurals = self.store.locales().map(|id| (id.clone(), OnceLock::new())).collect();
        LocData {
            plurals,
            store: self.store,
            aliases: self.aliases,
            default_locale: self.default_locale,
        }
    }
}
