//! Decimal, percent, scientific and currency formatting.
//!
//! Patterns follow CLDR syntax: `#,##0.###`, `#,##0%`, `¤#,##0.00`,
//! `#E0`, with an optional `;`-separated negative subpattern whose affixes
//! replace the positive ones. Rounding is half-even on the exact binary
//! value.

use crate::{
    context::Context,
    format::{Digits, FormatError, FormatOptions, fold},
    plural::{PluralOperands, PluralType},
    raw::Category,
};
use smallvec::SmallVec;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Affix {
    Literal(String),
    Minus,
    Plus,
    Percent,
    PerMille,
    /// `¤` symbol, `¤¤` ISO code, `¤¤¤` display name.
    Currency(u8),
}

type Affixes = SmallVec<[Affix; 3]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Exponent {
    min_digits: usize,
    show_plus: bool,
}

/// A parsed number pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberPattern {
    prefix: Affixes,
    suffix: Affixes,
    negative: Option<(Affixes, Affixes)>,
    /// Size of the lowest group and of every group above it; `None` when
    /// the pattern does not group.
    grouping: Option<(usize, usize)>,
    min_int: usize,
    min_frac: usize,
    max_frac: usize,
    exponent: Option<Exponent>,
    multiplier: u32,
}

impl NumberPattern {
    pub fn parse(pattern: &str) -> Result<Self, FormatError> {
        let (positive, negative) = split_subpatterns(pattern);
        let p = Sub::parse(pattern, positive)?;
        let negative = match negative {
            Some(neg) => {
                let n = Sub::parse(pattern, neg)?;
                Some((n.prefix, n.suffix))
            }
            None => None,
        };
        let multiplier = p
            .prefix
            .iter()
            .chain(&p.suffix)
            .find_map(|a| match a {
                Affix::Percent => Some(100),
                Affix::PerMille => Some(1000),
                _ => None,
            })
            .unwrap_or(1);
        Ok(NumberPattern {
            prefix: p.prefix,
            suffix: p.suffix,
            negative,
            grouping: p.grouping,
            min_int: p.min_int,
            min_frac: p.min_frac,
            max_frac: p.max_frac,
            exponent: p.exponent,
            multiplier,
        })
    }

    fn with_fraction_digits(mut self, digits: usize) -> Self {
        self.min_frac = digits;
        self.max_frac = digits;
        self
    }

    fn uses_currency(&self) -> bool {
        self.affixes().any(|a| matches!(a, Affix::Currency(_)))
    }

    fn affixes(&self) -> impl Iterator<Item = &Affix> {
        let neg = self.negative.iter().flat_map(|(p, s)| p.iter().chain(s));
        self.prefix.iter().chain(&self.suffix).chain(neg)
    }

    /// `(prefix, suffix)` for the sign.
    fn sign_affixes(&self, negative: bool) -> (Affixes, Affixes) {
        match (&self.negative, negative) {
            (_, false) => (self.prefix.clone(), self.suffix.clone()),
            (Some((p, s)), true) => (p.clone(), s.clone()),
            (None, true) => {
                let mut prefix = Affixes::new();
                prefix.push(Affix::Minus);
                prefix.extend(self.prefix.iter().cloned());
                (prefix, self.suffix.clone())
            }
        }
    }

    /// The ASCII digits of `|value|` as this pattern rounds them, without
    /// grouping or affixes: `("1234", "50", exponent)`.
    fn digits_of(&self, value: f64) -> (String, String, Option<i32>) {
        let mut x = value.abs() * f64::from(self.multiplier);
        let mut exp = None;
        if self.exponent.is_some() {
            let int_digits = self.min_int.max(1) as i32;
            let mut e = if x == 0.0 { 0 } else { x.log10().floor() as i32 - (int_digits - 1) };
            let mut mantissa = x / 10f64.powi(e);
            let rounded: f64 = format!("{:.*}", self.max_frac, mantissa).parse().unwrap_or(mantissa);
            if rounded >= 10f64.powi(int_digits) {
                e += 1;
                mantissa = x / 10f64.powi(e);
            }
            x = mantissa;
            exp = Some(e);
        }

        let text = format!("{:.*}", self.max_frac, x);
        let (int, frac) = text.split_once('.').unwrap_or((&text, ""));
        let mut frac = frac.to_owned();
        while frac.len() > self.min_frac && frac.ends_with('0') {
            frac.pop();
        }
        let int = int.trim_start_matches('0');
        let int = if int.len() < self.min_int {
            format!("{}{int}", "0".repeat(self.min_int - int.len()))
        } else if int.is_empty() && frac.is_empty() {
            "0".to_owned()
        } else {
            int.to_owned()
        };
        (int, frac, exp)
    }
}

struct Sub {
    prefix: Affixes,
    suffix: Affixes,
    grouping: Option<(usize, usize)>,
    min_int: usize,
    min_frac: usize,
    max_frac: usize,
    exponent: Option<Exponent>,
}

impl Sub {
    fn parse(whole: &str, sub: &str) -> Result<Self, FormatError> {
        let invalid = |reason| FormatError::InvalidPattern {
            pattern: whole.to_owned(),
            reason,
        };
        let mut chars = sub.chars().peekable();
        let prefix = affixes(whole, &mut chars, true)?;

        let mut int = String::new();
        let mut frac = String::new();
        let mut seen_point = false;
        while let Some(&c) = chars.peek() {
            match c {
                '#' | '0' | ',' if !seen_point => int.push(c),
                '#' | '0' if seen_point => frac.push(c),
                '.' if !seen_point => seen_point = true,
                '@' | '1'..='9' => {
                    return Err(FormatError::UnsupportedToken {
                        token: c.to_string(),
                        pattern: whole.to_owned(),
                    });
                }
                _ => break,
            }
            chars.next();
        }
        if !int.contains(['#', '0']) && !frac.contains('0') {
            return Err(invalid("no digits"));
        }

        let mut exponent = None;
        if chars.next_if_eq(&'E').is_some() {
            let show_plus = chars.next_if_eq(&'+').is_some();
            let mut min_digits = 0;
            while chars.next_if_eq(&'0').is_some() {
                min_digits += 1;
            }
            if min_digits == 0 {
                return Err(invalid("exponent needs at least one 0"));
            }
            exponent = Some(Exponent { min_digits, show_plus });
        }

        let suffix = affixes(whole, &mut chars, false)?;

        let groups: SmallVec<[usize; 4]> = int.split(',').map(str::len).collect();
        let grouping = match groups.as_slice() {
            [_] => None,
            [.., secondary, primary] if groups.len() > 2 => Some((*primary, *secondary)),
            [_, primary] => Some((*primary, *primary)),
            _ => None,
        };
        if grouping.is_some_and(|(p, s)| p == 0 || s == 0) {
            return Err(invalid("empty digit group"));
        }

        Ok(Sub {
            prefix,
            suffix,
            grouping,
            min_int: int.matches('0').count(),
            min_frac: frac.matches('0').count(),
            max_frac: frac.len(),
            exponent,
        })
    }
}

fn split_subpatterns(pattern: &str) -> (&str, Option<&str>) {
    let mut quoted = false;
    for (i, c) in pattern.char_indices() {
        match c {
            '\'' => quoted = !quoted,
            ';' if !quoted => return (&pattern[..i], Some(&pattern[i + 1..])),
            _ => {}
        }
    }
    (pattern, None)
}

/// Affix tokens up to the number body (prefix) or the end (suffix).
fn affixes(
    whole: &str,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    prefix: bool,
) -> Result<Affixes, FormatError> {
    let mut out = Affixes::new();
    let mut literal = String::new();
    let flush = |literal: &mut String, out: &mut Affixes| {
        if !literal.is_empty() {
            out.push(Affix::Literal(std::mem::take(literal)));
        }
    };
    while let Some(&c) = chars.peek() {
        if prefix && matches!(c, '#' | '0'..='9' | ',' | '.' | '@') {
            break;
        }
        chars.next();
        let token = match c {
            '\'' => {
                if chars.next_if_eq(&'\'').is_some() {
                    literal.push('\'');
                    continue;
                }
                loop {
                    match chars.next() {
                        Some('\'') if chars.next_if_eq(&'\'').is_some() => literal.push('\''),
                        Some('\'') => break,
                        Some(q) => literal.push(q),
                        None => {
                            return Err(FormatError::InvalidPattern {
                                pattern: whole.to_owned(),
                                reason: "unterminated quote",
                            });
                        }
                    }
                }
                continue;
            }
            '-' => Affix::Minus,
            '+' => Affix::Plus,
            '%' => Affix::Percent,
            '‰' => Affix::PerMille,
            '¤' => {
                let mut n = 1;
                while n < 3 && chars.next_if_eq(&'¤').is_some() {
                    n += 1;
                }
                Affix::Currency(n)
            }
            '#' | '0'..='9' | ',' | '.' | '@' | 'E' if !prefix => {
                return Err(FormatError::UnsupportedToken {
                    token: c.to_string(),
                    pattern: whole.to_owned(),
                });
            }
            other => {
                literal.push(other);
                continue;
            }
        };
        flush(&mut literal, &mut out);
        out.push(token);
    }
    flush(&mut literal, &mut out);
    Ok(out)
}

/// A currency as rendered into `¤` affixes.
struct Currency<'a> {
    code: &'a str,
    symbol: &'a str,
    name: String,
}

struct Renderer<'c, 'a> {
    ctx: &'c Context<'a>,
    digits: Digits,
}

impl<'c, 'a> Renderer<'c, 'a> {
    fn new(ctx: &'c Context<'a>, opts: &FormatOptions) -> Result<Self, FormatError> {
        Ok(Renderer {
            ctx,
            digits: ctx.digits(opts.numbering)?,
        })
    }

    fn affix(&self, affixes: &Affixes, currency: Option<&Currency<'_>>, out: &mut String) -> Result<(), FormatError> {
        for a in affixes {
            match a {
                Affix::Literal(s) => out.push_str(s),
                Affix::Minus => out.push_str(self.ctx.symbol("minus")?),
                Affix::Plus => out.push_str(self.ctx.symbol("plus")?),
                Affix::Percent => out.push_str(self.ctx.symbol("percent")?),
                Affix::PerMille => out.push_str(self.ctx.symbol("permille")?),
                Affix::Currency(n) => {
                    let c = currency.ok_or(FormatError::MissingCurrency)?;
                    out.push_str(match n {
                        1 => c.symbol,
                        2 => c.code,
                        _ => c.name.as_str(),
                    });
                }
            }
        }
        Ok(())
    }

    fn format(&self, pattern: &NumberPattern, value: f64, currency: Option<&Currency<'_>>) -> Result<String, FormatError> {
        let mut out = String::new();
        if value.is_nan() {
            out.push_str(self.ctx.symbol("nan")?);
            return Ok(out);
        }
        let (int, frac, exp) = pattern.digits_of(value);
        let zero = int.bytes().chain(frac.bytes()).all(|b| b == b'0');
        let negative = value.is_sign_negative() && !zero;
        let (prefix, suffix) = pattern.sign_affixes(negative);

        self.affix(&prefix, currency, &mut out)?;
        if value.is_infinite() {
            out.push_str(self.ctx.symbol("infinity")?);
        } else {
            self.body(pattern, &int, &frac, &mut out)?;
            if let (Some(e), Some(ex)) = (exp, pattern.exponent) {
                out.push_str(self.ctx.symbol("exponential")?);
                if e < 0 {
                    out.push_str(self.ctx.symbol("minus")?);
                } else if ex.show_plus {
                    out.push_str(self.ctx.symbol("plus")?);
                }
                let e = e.unsigned_abs().to_string();
                let padded = format!("{}{e}", "0".repeat(ex.min_digits.saturating_sub(e.len())));
                out.push_str(&self.digits.localize(&padded));
            }
        }
        self.affix(&suffix, currency, &mut out)?;
        Ok(out)
    }

    fn body(&self, pattern: &NumberPattern, int: &str, frac: &str, out: &mut String) -> Result<(), FormatError> {
        match pattern.grouping {
            Some((primary, secondary)) if int.len() > primary => {
                let group = self.ctx.symbol("group")?;
                let split = int.len() - primary;
                let (high, low) = int.split_at(split);
                let mut groups: SmallVec<[&str; 8]> = SmallVec::new();
                let mut end = high.len();
                while end > secondary {
                    groups.push(&high[end - secondary..end]);
                    end -= secondary;
                }
                groups.push(&high[..end]);
                for g in groups.iter().rev() {
                    out.push_str(&self.digits.localize(g));
                    out.push_str(group);
                }
                out.push_str(&self.digits.localize(low));
            }
            _ => out.push_str(&self.digits.localize(int)),
        }
        if !frac.is_empty() {
            out.push_str(self.ctx.symbol("decimal")?);
            out.push_str(&self.digits.localize(frac));
        }
        Ok(())
    }
}

fn pattern_for(ctx: &Context<'_>, key: &str) -> Result<NumberPattern, FormatError> {
    NumberPattern::parse(ctx.require_str(Category::Numbers, key)?)
}

fn currency_digits(ctx: &Context<'_>, code: &str) -> Result<Option<usize>, FormatError> {
    let key = format!("{code}.digits");
    match ctx.get(Category::Currencies, &key) {
        None => Ok(None),
        Some(v) => match v.as_number() {
            Some(d) if (0.0..=18.0).contains(&d) && d.fract() == 0.0 => Ok(Some(d as usize)),
            _ => Err(ctx.invalid(Category::Currencies, &key, "expected 0 to 18 fraction digits")),
        },
    }
}

pub fn format_with_pattern(
    ctx: &Context<'_>,
    pattern: &NumberPattern,
    value: f64,
    opts: &FormatOptions,
) -> Result<String, FormatError> {
    let renderer = Renderer::new(ctx, opts)?;
    if pattern.uses_currency() {
        let code = currency_code(opts)?;
        let currency = currency(ctx, &code, pattern, value)?;
        return renderer.format(pattern, value, Some(&currency));
    }
    renderer.format(pattern, value, None)
}

/// `1234.5` → `1,234.5` with the locale's `numbers.decimal` pattern.
pub fn format_decimal(ctx: &Context<'_>, value: f64, opts: &FormatOptions) -> Result<String, FormatError> {
    Renderer::new(ctx, opts)?.format(&pattern_for(ctx, "decimal")?, value, None)
}

/// `0.25` → `25%`.
pub fn format_percent(ctx: &Context<'_>, value: f64, opts: &FormatOptions) -> Result<String, FormatError> {
    Renderer::new(ctx, opts)?.format(&pattern_for(ctx, "percent")?, value, None)
}

/// `1234.0` → `1E3` with the root `#E0` pattern.
pub fn format_scientific(ctx: &Context<'_>, value: f64, opts: &FormatOptions) -> Result<String, FormatError> {
    Renderer::new(ctx, opts)?.format(&pattern_for(ctx, "scientific")?, value, None)
}

/// Format an amount of `opts.currency`. The currency's own fraction digits
/// (`currencies.<CODE>.digits`) override the pattern's.
pub fn format_currency(ctx: &Context<'_>, value: f64, opts: &FormatOptions) -> Result<String, FormatError> {
    let code = currency_code(opts)?;
    let mut pattern = pattern_for(ctx, "currency")?;
    if let Some(d) = currency_digits(ctx, &code)? {
        pattern = pattern.with_fraction_digits(d);
    }
    let currency = currency(ctx, &code, &pattern, value)?;
    Renderer::new(ctx, opts)?.format(&pattern, value, Some(&currency))
}

fn currency_code(opts: &FormatOptions) -> Result<String, FormatError> {
    match &opts.currency {
        Some(code) if code.len() == 3 && code.bytes().all(|b| b.is_ascii_alphabetic()) => {
            Ok(code.to_ascii_uppercase())
        }
        Some(code) => Err(FormatError::OutOfRange {
            value: code.clone(),
            reason: "currency codes are three letters",
        }),
        None => Err(FormatError::MissingCurrency),
    }
}

fn currency<'a>(
    ctx: &Context<'a>,
    code: &'a str,
    pattern: &NumberPattern,
    value: f64,
) -> Result<Currency<'a>, FormatError> {
    let symbol = ctx
        .get(Category::Currencies, &format!("{code}.symbol"))
        .and_then(|v| v.as_str())
        .unwrap_or(code);
    let (int, frac, _) = pattern.digits_of(value);
    let plural = decimal_operands(&int, &frac)
        .map(|o| ctx.plural_category(&o, PluralType::Cardinal))
        .map_or("other", |c| c.name());
    let name = [plural, "other"]
        .iter()
        .find_map(|p| ctx.get(Category::Currencies, &format!("{code}.name.{p}")))
        .and_then(|v| v.as_str())
        .unwrap_or(code)
        .to_owned();
    Ok(Currency { code, symbol, name })
}

fn decimal_operands(int: &str, frac: &str) -> Option<PluralOperands> {
    let int = if int.is_empty() { "0" } else { int };
    let text = if frac.is_empty() { int.to_owned() } else { format!("{int}.{frac}") };
    PluralOperands::from_decimal_str(&text).ok()
}

/// Plural operands of `value` as the locale's decimal pattern shows it, so
/// `1.0` and `1` can select different categories.
pub(crate) fn displayed_operands(ctx: &Context<'_>, value: f64) -> Result<PluralOperands, FormatError> {
    let (int, frac, _) = pattern_for(ctx, "decimal")?.digits_of(value);
    decimal_operands(&int, &frac).ok_or_else(|| FormatError::OutOfRange {
        value: value.to_string(),
        reason: "no plural operands",
    })
}

// ─── Parsing ───────────────────────────────────────────────────────────────

struct Parsed {
    value: f64,
    code: Option<String>,
}

/// Parse a number written with the locale's `numbers.decimal` pattern.
pub fn parse_decimal(ctx: &Context<'_>, text: &str, opts: &FormatOptions) -> Result<f64, FormatError> {
    parse_with(ctx, &pattern_for(ctx, "decimal")?, text, opts, &[]).map(|p| p.value)
}

/// `25%` → `0.25`.
pub fn parse_percent(ctx: &Context<'_>, text: &str, opts: &FormatOptions) -> Result<f64, FormatError> {
    parse_with(ctx, &pattern_for(ctx, "percent")?, text, opts, &[]).map(|p| p.value)
}

/// Parse a currency amount, returning the value and the currency code it
/// was written in. With `opts.currency` set only that currency is accepted;
/// otherwise every currency the locale names is tried in code order.
pub fn parse_currency(ctx: &Context<'_>, text: &str, opts: &FormatOptions) -> Result<(f64, String), FormatError> {
    let codes: Vec<String> = match &opts.currency {
        Some(_) => vec![currency_code(opts)?],
        None => known_currencies(ctx),
    };
    let pattern = pattern_for(ctx, "currency")?;
    let candidates: Vec<(String, Vec<String>)> = codes
        .into_iter()
        .map(|code| {
            let symbols = currency_symbols(ctx, &code);
            (code, symbols)
        })
        .collect();
    let parsed = parse_with(ctx, &pattern, text, opts, &candidates)?;
    let code = parsed.code.ok_or_else(|| FormatError::Unparseable {
        input: text.to_owned(),
        reason: "no currency symbol found",
    })?;
    Ok((parsed.value, code))
}

fn known_currencies(ctx: &Context<'_>) -> Vec<String> {
    let codes: BTreeSet<String> = ctx
        .bundle()
        .category(Category::Currencies)
        .filter_map(|(k, _)| k.split_once('.').map(|(code, _)| code))
        .chain(ctx.bundle().category(Category::CurrencySymbols).map(|(k, _)| k))
        .map(str::to_owned)
        .collect();
    codes.into_iter().collect()
}

/// Every way the locale writes `code`: its symbol, the ISO code, its
/// display names and the alternates in `currency-symbols`.
fn currency_symbols(ctx: &Context<'_>, code: &str) -> Vec<String> {
    let mut out = vec![code.to_owned()];
    let prefix = format!("{code}.");
    for (key, value) in ctx.bundle().category(Category::Currencies) {
        if let Some(rest) = key.strip_prefix(&prefix)
            && (rest == "symbol" || rest.starts_with("name."))
            && let Some(s) = value.as_str()
        {
            out.push(s.to_owned());
        }
    }
    if let Some(list) = ctx.get(Category::CurrencySymbols, code).and_then(|v| v.string_list()) {
        out.extend(list.into_iter().map(str::to_owned));
    }
    // Longest first so `US$` is preferred over `$`.
    out.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    out.dedup();
    out
}

fn parse_with(
    ctx: &Context<'_>,
    pattern: &NumberPattern,
    text: &str,
    opts: &FormatOptions,
    currencies: &[(String, Vec<String>)],
) -> Result<Parsed, FormatError> {
    let unparseable = |reason| FormatError::Unparseable {
        input: text.to_owned(),
        reason,
    };
    let digits = ctx.digits(opts.numbering)?;
    let input = fold(&digits.delocalize(text));
    if input.is_empty() {
        return Err(unparseable("empty input"));
    }

    let renderer = Renderer { ctx, digits: Digits::LATIN };
    let group = fold(ctx.symbol("group")?);
    let decimal = fold(ctx.symbol("decimal")?);
    let exponential = fold(ctx.symbol("exponential")?);
    let minus = fold(ctx.symbol("minus")?);

    // Each attempt: (negative, prefix, suffix, currency code).
    let mut attempts: Vec<(bool, String, String, Option<&str>)> = Vec::new();
    for negative in [true, false] {
        let (prefix, suffix) = pattern.sign_affixes(negative);
        if pattern.uses_currency() {
            for (code, symbols) in currencies {
                for symbol in symbols {
                    let c = Currency {
                        code,
                        symbol,
                        name: symbol.clone(),
                    };
                    let (mut p, mut s) = (String::new(), String::new());
                    renderer.affix(&prefix, Some(&c), &mut p)?;
                    renderer.affix(&suffix, Some(&c), &mut s)?;
                    attempts.push((negative, fold(&p), fold(&s), Some(code.as_str())));
                }
            }
        } else {
            let (mut p, mut s) = (String::new(), String::new());
            renderer.affix(&prefix, None, &mut p)?;
            renderer.affix(&suffix, None, &mut s)?;
            attempts.push((negative, fold(&p), fold(&s), None));
        }
    }

    for (negative, prefix, suffix, code) in &attempts {
        let Some(body) = input
            .strip_prefix(prefix.as_str())
            .and_then(|rest| rest.strip_suffix(suffix.as_str()))
        else {
            continue;
        };
        let Some(mut value) = parse_body(body, &group, &decimal, &exponential, &minus) else {
            continue;
        };
        value /= f64::from(pattern.multiplier);
        if *negative {
            value = -value;
        }
        return Ok(Parsed {
            value,
            code: code.map(str::to_owned),
        });
    }
    Err(unparseable("does not match the number pattern"))
}

fn parse_body(body: &str, group: &str, decimal: &str, exponential: &str, minus: &str) -> Option<f64> {
    let (mantissa, exp) = match body.split_once(exponential) {
        Some((m, e)) if !exponential.is_empty() => (m, Some(e)),
        _ => (body, None),
    };
    let mut plain = if group.is_empty() {
        mantissa.to_owned()
    } else {
        mantissa.replace(group, "")
    };
    if !decimal.is_empty() && decimal != "." {
        plain = plain.replace(decimal, ".");
    }
    let ok = !plain.is_empty()
        && plain.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && plain.bytes().filter(|&b| b == b'.').count() <= 1
        && plain.bytes().any(|b| b.is_ascii_digit());
    if !ok {
        return None;
    }
    let mut value: f64 = plain.parse().ok()?;
    if let Some(e) = exp {
        let (negative, digits) = match e.strip_prefix(minus) {
            Some(d) if !minus.is_empty() => (true, d),
            _ => (false, e.strip_prefix('+').unwrap_or(e)),
        };
        let e: i32 = digits.parse().ok().filter(|_| digits.bytes().all(|b| b.is_ascii_digit()))?;
        value *= 10f64.powi(if negative { -e } else { e });
    }
    Some(value)
}
