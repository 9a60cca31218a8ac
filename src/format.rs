//! Formatting and parsing engines.
//!
//! Every engine is a pure function of a [`Context`](crate::context::Context),
//! an input value and [`FormatOptions`]. Engines read the bundle, never
//! change it and keep no state between calls, so one loaded store can serve
//! any number of threads.

pub mod date;
pub mod display;
pub mod list;
pub mod number;
pub mod unit;
pub mod zone;

use crate::{locale::LocaleId, plural::RuleError, raw::Category};
use icu_normalizer::{ComposingNormalizer, ComposingNormalizerBorrowed};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::{str::FromStr, sync::LazyLock};
use thiserror::Error;

static ICU4X_NFKC: LazyLock<ComposingNormalizerBorrowed> =
    LazyLock::new(ComposingNormalizer::new_nfkc);

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormatError {
    #[error("unsupported token `{token}` in pattern `{pattern}`")]
    UnsupportedToken { token: String, pattern: String },
    #[error("unsupported calendar `{0}`")]
    UnsupportedCalendar(String),
    #[error("value `{value}` out of range: {reason}")]
    OutOfRange { value: String, reason: &'static str },
    #[error("{locale}: no data for `{category}.{key}`")]
    MissingData {
        locale: LocaleId,
        category: Category,
        key: String,
    },
    #[error("{locale}: invalid data at `{category}.{key}`: {reason}")]
    InvalidData {
        locale: LocaleId,
        category: Category,
        key: String,
        reason: &'static str,
    },
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: &'static str },
    #[error(transparent)]
    InvalidPluralRule(#[from] RuleError),
    #[error("cannot parse `{input}`: {reason}")]
    Unparseable { input: String, reason: &'static str },
    #[error("currency formatting needs a currency code")]
    MissingCurrency,
    #[error("pattern has a time zone field but no time zone was given")]
    MissingTimeZone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Calendar {
    #[default]
    Gregorian,
    /// Thai solar calendar: gregorian months and days, years counted from 543 BC.
    Buddhist,
}

impl Calendar {
    pub const fn key(self) -> &'static str {
        match self {
            Calendar::Gregorian => "gregorian",
            Calendar::Buddhist => "buddhist",
        }
    }

    /// Years added to the gregorian year.
    #[inline]
    pub(crate) const fn year_offset(self) -> i32 {
        match self {
            Calendar::Gregorian => 0,
            Calendar::Buddhist => 543,
        }
    }
}

impl FromStr for Calendar {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gregorian" | "gregory" => Ok(Calendar::Gregorian),
            "buddhist" => Ok(Calendar::Buddhist),
            other => Err(FormatError::UnsupportedCalendar(other.to_owned())),
        }
    }
}

/// Which of the locale's numbering systems to render digits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberingSystem {
    /// The locale's default system (`numsys.default`), usually `latn`.
    #[default]
    Default,
    /// The locale's native system (`numsys.native`), e.g. `arab` or `thai`.
    Native,
}

impl NumberingSystem {
    pub const fn key(self) -> &'static str {
        match self {
            NumberingSystem::Default => "default",
            NumberingSystem::Native => "native",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatLength {
    Short,
    #[default]
    Medium,
    Long,
    Full,
}

impl FormatLength {
    pub const fn key(self) -> &'static str {
        match self {
            FormatLength::Short => "short",
            FormatLength::Medium => "medium",
            FormatLength::Long => "long",
            FormatLength::Full => "full",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    /// "a, b, and c"
    #[default]
    Standard,
    /// "a, b, or c"
    Or,
    /// "3 feet, 7 inches"
    Unit,
}

impl ListStyle {
    pub const fn key(self) -> &'static str {
        match self {
            ListStyle::Standard => "standard",
            ListStyle::Or => "or",
            ListStyle::Unit => "unit",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    pub calendar: Calendar,
    pub numbering: NumberingSystem,
    pub length: FormatLength,
    /// ISO 4217 code, required by currency formatting.
    pub currency: Option<String>,
    /// Required by patterns with zone fields.
    pub time_zone: Option<zone::ZoneInfo>,
}

impl FormatOptions {
    pub fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }

    pub fn with_numbering(mut self, numbering: NumberingSystem) -> Self {
        self.numbering = numbering;
        self
    }

    pub fn with_length(mut self, length: FormatLength) -> Self {
        self.length = length;
        self
    }

    pub fn with_currency(mut self, code: impl Into<String>) -> Self {
        self.currency = Some(code.into());
        self
    }

    pub fn with_time_zone(mut self, zone: zone::ZoneInfo) -> Self {
        self.time_zone = Some(zone);
        self
    }
}

/// The ten digits of a numbering system, zero first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Digits([char; 10]);

impl Digits {
    pub const LATIN: Digits = Digits(['0', '1', '2', '3', '4', '5', '6', '7', '8', '9']);

    /// From a ten-character string such as `"٠١٢٣٤٥٦٧٨٩"`.
    pub fn from_str_digits(digits: &str) -> Option<Self> {
        let chars: SmallVec<[char; 10]> = digits.chars().collect();
        <[char; 10]>::try_from(chars.as_slice()).ok().map(Digits)
    }

    #[inline]
    pub fn is_latin(&self) -> bool {
        *self == Self::LATIN
    }

    /// Replace ASCII digits with this system's digits.
    pub fn localize(&self, ascii: &str) -> String {
        if self.is_latin() {
            return ascii.to_owned();
        }
        ascii
            .chars()
            .map(|c| c.to_digit(10).map_or(c, |d| self.0[d as usize]))
            .collect()
    }

    /// Replace this system's digits with ASCII digits.
    pub fn delocalize(&self, text: &str) -> String {
        if self.is_latin() {
            return text.to_owned();
        }
        text.chars()
            .map(|c| {
                self.0
                    .iter()
                    .position(|&d| d == c)
                    .map_or(c, |d| char::from(b'0' + d as u8))
            })
            .collect()
    }
}

/// Replace `{0}`, `{1}`, ... placeholders.
pub(crate) fn substitute(pattern: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(pattern.len() + args.iter().map(|a| a.len()).sum::<usize>());
    let mut rest = pattern;
    while let Some(open) = memchr::memchr(b'{', rest.as_bytes()) {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let arg = memchr::memchr(b'}', tail.as_bytes())
            .and_then(|close| tail[..close].parse::<usize>().ok().map(|i| (i, close)))
            .and_then(|(i, close)| args.get(i).map(|a| (a, close)));
        match arg {
            Some((a, close)) => {
                out.push_str(a);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Lenient comparison form: NFKC, lowercase, whitespace removed. No-break
/// and narrow no-break spaces compare equal to nothing at all.
pub(crate) fn fold(text: &str) -> String {
    ICU4X_NFKC
        .normalize(text)
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
