//! The explicit formatting context.
//!
//! There is no process-wide "current locale": every engine call receives a
//! [`Context`] built from one resolved bundle. A context borrows the bundle
//! (usually straight out of a loaded store) and either owns its parsed
//! plural rules or borrows them from a cache, so building one per call is
//! cheap and any number can coexist.

use crate::{
    format::{Digits, FormatError, NumberingSystem},
    locale::LocaleId,
    plural::{PluralCategory, PluralOperands, PluralRuleSet, PluralType},
    raw::{Category, Value},
    resolve::ResolvedBundle,
};
use chrono::Weekday;
use std::borrow::Cow;

#[derive(Debug, Clone)]
pub struct Context<'a> {
    bundle: &'a ResolvedBundle,
    plurals: Cow<'a, PluralRuleSet>,
}

impl<'a> Context<'a> {
    /// Fails only when the bundle's plural rules do not parse.
    pub fn new(bundle: &'a ResolvedBundle) -> Result<Self, FormatError> {
        Ok(Self {
            bundle,
            plurals: Cow::Owned(PluralRuleSet::from_bundle(bundle)?),
        })
    }

    /// With rules already parsed from this bundle.
    pub fn with_plurals(bundle: &'a ResolvedBundle, plurals: &'a PluralRuleSet) -> Self {
        Self {
            bundle,
            plurals: Cow::Borrowed(plurals),
        }
    }

    #[inline]
    pub fn locale(&self) -> &'a LocaleId {
        self.bundle.locale()
    }

    #[inline]
    pub fn bundle(&self) -> &'a ResolvedBundle {
        self.bundle
    }

    #[inline]
    pub fn plurals(&self) -> &PluralRuleSet {
        &self.plurals
    }

    #[inline]
    pub fn get(&self, category: Category, key: &str) -> Option<&'a Value> {
        self.bundle.get(category, key)
    }

    pub fn require(&self, category: Category, key: &str) -> Result<&'a Value, FormatError> {
        self.get(category, key).ok_or_else(|| FormatError::MissingData {
            locale: self.locale().clone(),
            category,
            key: key.to_owned(),
        })
    }

    pub fn require_str(&self, category: Category, key: &str) -> Result<&'a str, FormatError> {
        self.require(category, key)?
            .as_str()
            .ok_or_else(|| self.invalid(category, key, "expected a string"))
    }

    pub fn require_list(&self, category: Category, key: &str) -> Result<Vec<&'a str>, FormatError> {
        self.require(category, key)?
            .string_list()
            .ok_or_else(|| self.invalid(category, key, "expected a list of strings"))
    }

    pub fn require_number(&self, category: Category, key: &str) -> Result<f64, FormatError> {
        self.require(category, key)?
            .as_number()
            .ok_or_else(|| self.invalid(category, key, "expected a number"))
    }

    pub(crate) fn invalid(&self, category: Category, key: &str, reason: &'static str) -> FormatError {
        FormatError::InvalidData {
            locale: self.locale().clone(),
            category,
            key: key.to_owned(),
            reason,
        }
    }

    pub fn plural_category(&self, operands: &PluralOperands, ty: PluralType) -> PluralCategory {
        self.plurals.select(operands, ty)
    }

    /// A number symbol such as `decimal`, `group` or `minus`.
    #[inline]
    pub fn symbol(&self, name: &str) -> Result<&'a str, FormatError> {
        self.require_str(Category::Symbols, name)
    }

    /// Digits of the requested numbering system. A system without a
    /// `digits.<name>` entry must be `latn`.
    pub fn digits(&self, numbering: NumberingSystem) -> Result<Digits, FormatError> {
        let system = match self.get(Category::NumberingSystems, numbering.key()) {
            Some(v) => v
                .as_str()
                .ok_or_else(|| self.invalid(Category::NumberingSystems, numbering.key(), "expected a string"))?,
            None => "latn",
        };
        let key = format!("digits.{system}");
        match self.get(Category::NumberingSystems, &key) {
            Some(Value::String(digits)) => Digits::from_str_digits(digits)
                .ok_or_else(|| self.invalid(Category::NumberingSystems, &key, "expected ten digits")),
            Some(_) => Err(self.invalid(Category::NumberingSystems, &key, "expected ten digits")),
            None if system == "latn" => Ok(Digits::LATIN),
            None => Err(FormatError::MissingData {
                locale: self.locale().clone(),
                category: Category::NumberingSystems,
                key,
            }),
        }
    }

    pub fn first_week_day(&self) -> Result<Weekday, FormatError> {
        self.weekday("first_day")
    }

    /// Days of the first week that must fall in the new year.
    pub fn min_week_days(&self) -> Result<u8, FormatError> {
        let n = self.require_number(Category::Week, "min_days")?;
        if !(1.0..=7.0).contains(&n) || n.fract() != 0.0 {
            return Err(self.invalid(Category::Week, "min_days", "expected 1 to 7"));
        }
        Ok(n as u8)
    }

    pub fn weekend_start(&self) -> Result<Weekday, FormatError> {
        self.weekday("weekend_start")
    }

    pub fn weekend_end(&self) -> Result<Weekday, FormatError> {
        self.weekday("weekend_end")
    }

    /// Week days are stored as numbers, `0` for Sunday.
    fn weekday(&self, key: &str) -> Result<Weekday, FormatError> {
        let n = self.require_number(Category::Week, key)?;
        if n.fract() != 0.0 || !(0.0..=6.0).contains(&n) {
            return Err(self.invalid(Category::Week, key, "expected a day number 0 to 6"));
        }
        Ok(WEEKDAYS[n as usize])
    }
}

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];
