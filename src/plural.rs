//! Plural category selection.
//!
//! Rules live in the `plural` category of a bundle under
//! `cardinal.<category>` and `ordinal.<category>`. That category is
//! language-scoped at compile time, so every locale of a language carries
//! the same rules.

pub mod operands;
pub mod rule;

pub use operands::{OperandError, PluralOperands};
pub use rule::Rule;

use crate::{
    raw::{Category, Value},
    resolve::ResolvedBundle,
};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl PluralCategory {
    pub const ALL: [PluralCategory; 6] = [
        PluralCategory::Zero,
        PluralCategory::One,
        PluralCategory::Two,
        PluralCategory::Few,
        PluralCategory::Many,
        PluralCategory::Other,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            PluralCategory::Zero => "zero",
            PluralCategory::One => "one",
            PluralCategory::Two => "two",
            PluralCategory::Few => "few",
            PluralCategory::Many => "many",
            PluralCategory::Other => "other",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for PluralCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluralType {
    #[default]
    Cardinal,
    Ordinal,
}

impl PluralType {
    pub const fn name(self) -> &'static str {
        match self {
            PluralType::Cardinal => "cardinal",
            PluralType::Ordinal => "ordinal",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("plural rule `{rule}`: {reason} at byte {position}")]
    Syntax {
        rule: String,
        position: usize,
        reason: &'static str,
    },
    #[error("unknown plural rule key `{key}`")]
    UnknownKey { key: String },
    #[error("plural rule `{key}` is not a string")]
    NotAString { key: String },
}

type Rules = SmallVec<[(PluralCategory, Rule); 5]>;

/// The plural rules of one language.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluralRuleSet {
    cardinal: Rules,
    ordinal: Rules,
}

impl PluralRuleSet {
    pub fn from_bundle(bundle: &ResolvedBundle) -> Result<Self, RuleError> {
        let mut rules = Vec::new();
        for (key, value) in bundle.category(Category::Plural) {
            let Value::String(source) = value else {
                return Err(RuleError::NotAString { key: key.to_owned() });
            };
            rules.push((key, source.as_str()));
        }
        Self::from_rules(rules)
    }

    /// Build from `(key, condition)` pairs, keys as in the bundle
    /// (`cardinal.one`, `ordinal.few`, ...). `other` rules are accepted and
    /// ignored since `other` is the fallback.
    pub fn from_rules<'a>(rules: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self, RuleError> {
        let mut set = Self::default();
        for (key, source) in rules {
            let unknown = || RuleError::UnknownKey { key: key.to_owned() };
            let (ty, name) = key.split_once('.').ok_or_else(unknown)?;
            let category = PluralCategory::from_name(name).ok_or_else(unknown)?;
            let target = match ty {
                "cardinal" => &mut set.cardinal,
                "ordinal" => &mut set.ordinal,
                _ => return Err(unknown()),
            };
            let rule = Rule::parse(source)?;
            if category != PluralCategory::Other {
                target.push((category, rule));
            }
        }
        set.cardinal.sort_by_key(|(c, _)| *c);
        set.ordinal.sort_by_key(|(c, _)| *c);
        Ok(set)
    }

    /// The first category whose rule matches, in `zero, one, two, few, many`
    /// order, else `other`. Total over every operand value.
    pub fn select(&self, operands: &PluralOperands, ty: PluralType) -> PluralCategory {
        self.rules(ty)
            .iter()
            .find(|(_, rule)| rule.matches(operands))
            .map_or(PluralCategory::Other, |(c, _)| *c)
    }

    /// Categories this language distinguishes, always including `other`.
    pub fn categories(&self, ty: PluralType) -> SmallVec<[PluralCategory; 6]> {
        let mut out: SmallVec<[PluralCategory; 6]> = self.rules(ty).iter().map(|(c, _)| *c).collect();
        out.push(PluralCategory::Other);
        out
    }

    #[inline]
    fn rules(&self, ty: PluralType) -> &Rules {
        match ty {
            PluralType::Cardinal => &self.cardinal,
            PluralType::Ordinal => &self.ordinal,
        }
    }
}
