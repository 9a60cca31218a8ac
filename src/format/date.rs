//! Date and time formatting and parsing with CLDR patterns.
//!
//! Supported fields:
//!
//! | Letter | Field | Letter | Field |
//! |---|---|---|---|
//! | `G` | era | `a` | day period |
//! | `y` | year | `h` `H` `K` `k` | hour (1-12, 0-23, 0-11, 1-24) |
//! | `M` `L` | month (format / stand-alone) | `m` | minute |
//! | `d` | day of month | `s` | second |
//! | `D` | day of year | `S` | fractional second |
//! | `E` `c` | weekday (format / stand-alone) | `Q` `q` | quarter |
//! | `z` `v` | zone name (specific / generic) | `Z` `O` | zone offset (ISO / GMT) |
//!
//! Zone fields need [`FormatOptions::time_zone`] and are format-only; see
//! [`zone`](crate::format::zone).
//!
//! Text between single quotes is literal; `''` is an apostrophe. Any other
//! ASCII letter is rejected with [`FormatError::UnsupportedToken`].
//!
//! Name lists live in the `calendar` category as
//! `<calendar>.<months|days|quarters>.<format|stand-alone>.<width>`,
//! `<calendar>.eras.<width>` and `<calendar>.periods.<width>`. Stand-alone
//! lists fall back to the format lists and Buddhist lists fall back to the
//! gregorian ones.

use crate::{
    context::Context,
    format::{Calendar, Digits, FormatError, FormatOptions, fold, substitute, zone},
    raw::Category,
};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use smallvec::SmallVec;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Field(char, usize),
}

type Tokens = SmallVec<[Token; 16]>;

const FIELDS: &str = "GyMLdDEcahHKkmsSQqzvZO";

fn tokenize(pattern: &str) -> Result<Tokens, FormatError> {
    let mut out = Tokens::new();
    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
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
                                pattern: pattern.to_owned(),
                                reason: "unterminated quote",
                            });
                        }
                    }
                }
            }
            c if c.is_ascii_alphabetic() => {
                let mut count = 1;
                while chars.next_if_eq(&c).is_some() {
                    count += 1;
                }
                if !FIELDS.contains(c) {
                    return Err(FormatError::UnsupportedToken {
                        token: c.to_string().repeat(count),
                        pattern: pattern.to_owned(),
                    });
                }
                if !literal.is_empty() {
                    out.push(Token::Literal(std::mem::take(&mut literal)));
                }
                out.push(Token::Field(c, count));
            }
            other => literal.push(other),
        }
    }
    if !literal.is_empty() {
        out.push(Token::Literal(literal));
    }
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Names {
    Months,
    Days,
    Quarters,
    Eras,
    Periods,
}

impl Names {
    const fn key(self) -> &'static str {
        match self {
            Names::Months => "months",
            Names::Days => "days",
            Names::Quarters => "quarters",
            Names::Eras => "eras",
            Names::Periods => "periods",
        }
    }

    const fn has_context(self) -> bool {
        matches!(self, Names::Months | Names::Days | Names::Quarters)
    }
}

const WIDTHS: [&str; 3] = ["abbreviated", "wide", "narrow"];

fn width(count: usize) -> &'static str {
    match count {
        4 => "wide",
        5.. => "narrow",
        _ => "abbreviated",
    }
}

/// A name list, with stand-alone → format and Buddhist → gregorian fallback.
fn names<'a>(
    ctx: &Context<'a>,
    calendar: Calendar,
    kind: Names,
    stand_alone: bool,
    width: &str,
) -> Result<Vec<&'a str>, FormatError> {
    let mut calendars: SmallVec<[&str; 2]> = SmallVec::new();
    calendars.push(calendar.key());
    if calendar != Calendar::Gregorian {
        calendars.push(Calendar::Gregorian.key());
    }
    let contexts: &[&str] = match (kind.has_context(), stand_alone) {
        (false, _) => &[""],
        (true, true) => &["stand-alone.", "format."],
        (true, false) => &["format."],
    };

    let first_key = format!("{}.{}.{}{width}", calendar.key(), kind.key(), contexts[0]);
    for cal in &calendars {
        for ctx_key in contexts {
            let key = format!("{cal}.{}.{ctx_key}{width}", kind.key());
            if ctx.get(Category::Calendar, &key).is_some() {
                return ctx.require_list(Category::Calendar, &key);
            }
        }
    }
    Err(FormatError::MissingData {
        locale: ctx.locale().clone(),
        category: Category::Calendar,
        key: first_key,
    })
}

fn name<'a>(list: &[&'a str], index: usize, ctx: &Context<'_>, kind: Names) -> Result<&'a str, FormatError> {
    list.get(index).copied().ok_or_else(|| {
        ctx.invalid(Category::Calendar, kind.key(), "name list is too short")
    })
}

/// The pattern at `<category>.<calendar>.<length>`, falling back to the
/// gregorian pattern.
fn pattern<'a>(ctx: &Context<'a>, category: Category, opts: &FormatOptions) -> Result<&'a str, FormatError> {
    let key = format!("{}.{}", opts.calendar.key(), opts.length.key());
    if ctx.get(category, &key).is_none() && opts.calendar != Calendar::Gregorian {
        let fallback = format!("{}.{}", Calendar::Gregorian.key(), opts.length.key());
        if ctx.get(category, &fallback).is_some() {
            return ctx.require_str(category, &fallback);
        }
    }
    ctx.require_str(category, &key)
}

fn datetime_pattern(ctx: &Context<'_>, opts: &FormatOptions) -> Result<String, FormatError> {
    let glue = pattern(ctx, Category::DateTime, opts)?;
    let date = pattern(ctx, Category::Date, opts)?;
    let time = pattern(ctx, Category::Time, opts)?;
    Ok(substitute(glue, &[time, date]))
}

// ─── Formatting ────────────────────────────────────────────────────────────

pub fn format_date(ctx: &Context<'_>, date: &NaiveDate, opts: &FormatOptions) -> Result<String, FormatError> {
    let pattern = pattern(ctx, Category::Date, opts)?;
    render(ctx, pattern, Some(*date), None, opts)
}

pub fn format_time(ctx: &Context<'_>, time: &NaiveTime, opts: &FormatOptions) -> Result<String, FormatError> {
    let pattern = pattern(ctx, Category::Time, opts)?;
    render(ctx, pattern, None, Some(*time), opts)
}

/// Date and time joined by the locale's `datetime` glue pattern, where
/// `{1}` is the date and `{0}` the time.
pub fn format_datetime(ctx: &Context<'_>, value: &NaiveDateTime, opts: &FormatOptions) -> Result<String, FormatError> {
    let pattern = datetime_pattern(ctx, opts)?;
    render(ctx, &pattern, Some(value.date()), Some(value.time()), opts)
}

/// Format with an explicit pattern such as `"EEEE d MMMM y"`.
pub fn format_pattern(
    ctx: &Context<'_>,
    pattern: &str,
    value: &NaiveDateTime,
    opts: &FormatOptions,
) -> Result<String, FormatError> {
    render(ctx, pattern, Some(value.date()), Some(value.time()), opts)
}

fn render(
    ctx: &Context<'_>,
    pattern: &str,
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    opts: &FormatOptions,
) -> Result<String, FormatError> {
    let digits = ctx.digits(opts.numbering)?;
    let cal = opts.calendar;
    let mut out = String::with_capacity(pattern.len() * 2);

    let need_date = || {
        date.ok_or(FormatError::InvalidPattern {
            pattern: pattern.to_owned(),
            reason: "date field used to format a time",
        })
    };
    let need_time = || {
        time.ok_or(FormatError::InvalidPattern {
            pattern: pattern.to_owned(),
            reason: "time field used to format a date",
        })
    };
    let num = |out: &mut String, n: u32, width: usize| {
        out.push_str(&digits.localize(&format!("{n:0width$}")));
    };

    for token in tokenize(pattern)? {
        let (field, count) = match token {
            Token::Literal(s) => {
                out.push_str(&s);
                continue;
            }
            Token::Field(f, c) => (f, c),
        };
        match field {
            'G' => {
                let d = need_date()?;
                let list = names(ctx, cal, Names::Eras, false, width(count))?;
                out.push_str(name(&list, era_index(cal, d.year()), ctx, Names::Eras)?);
            }
            'y' => {
                let year = era_year(cal, need_date()?.year())?;
                match count {
                    2 => num(&mut out, year % 100, 2),
                    n => num(&mut out, year, n),
                }
            }
            'M' | 'L' => {
                let month = need_date()?.month();
                if count <= 2 {
                    num(&mut out, month, count);
                } else {
                    let list = names(ctx, cal, Names::Months, field == 'L', width(count))?;
                    out.push_str(name(&list, month as usize - 1, ctx, Names::Months)?);
                }
            }
            'd' => num(&mut out, need_date()?.day(), count),
            'D' => num(&mut out, need_date()?.ordinal(), count),
            'E' | 'c' => {
                let weekday = need_date()?.weekday();
                if field == 'c' && count <= 2 {
                    let first = ctx.first_week_day()?.num_days_from_sunday();
                    num(&mut out, (weekday.num_days_from_sunday() + 7 - first) % 7 + 1, count);
                } else {
                    let list = names(ctx, cal, Names::Days, field == 'c', width(count))?;
                    out.push_str(name(&list, weekday.num_days_from_sunday() as usize, ctx, Names::Days)?);
                }
            }
            'Q' | 'q' => {
                let quarter = need_date()?.month0() / 3;
                if count <= 2 {
                    num(&mut out, quarter + 1, count);
                } else {
                    let list = names(ctx, cal, Names::Quarters, field == 'q', width(count))?;
                    out.push_str(name(&list, quarter as usize, ctx, Names::Quarters)?);
                }
            }
            'a' => {
                let list = names(ctx, cal, Names::Periods, false, width(count))?;
                let pm = need_time()?.hour() >= 12;
                out.push_str(name(&list, usize::from(pm), ctx, Names::Periods)?);
            }
            'h' => num(&mut out, (need_time()?.hour() + 11) % 12 + 1, count),
            'H' => num(&mut out, need_time()?.hour(), count),
            'K' => num(&mut out, need_time()?.hour() % 12, count),
            'k' => num(&mut out, (need_time()?.hour() + 23) % 24 + 1, count),
            'm' => num(&mut out, need_time()?.minute(), count),
            's' => num(&mut out, need_time()?.second(), count),
            'S' => {
                let nanos = format!("{:09}", need_time()?.nanosecond().min(999_999_999));
                let shown: String = nanos.chars().chain(std::iter::repeat('0')).take(count).collect();
                out.push_str(&digits.localize(&shown));
            }
            f if zone::is_zone_field(f) => {
                let tz = opts.time_zone.as_ref().ok_or(FormatError::MissingTimeZone)?;
                out.push_str(&zone::render(ctx, f, count, tz, &digits, pattern)?);
            }
            other => return Err(unsupported(other, pattern)),
        }
    }
    Ok(out)
}

fn unsupported(field: char, pattern: &str) -> FormatError {
    FormatError::UnsupportedToken {
        token: field.to_string(),
        pattern: pattern.to_owned(),
    }
}

fn era_index(cal: Calendar, year: i32) -> usize {
    match cal {
        Calendar::Gregorian => usize::from(year > 0),
        Calendar::Buddhist => 0,
    }
}

/// The year as counted within its era.
fn era_year(cal: Calendar, year: i32) -> Result<u32, FormatError> {
    let shown = match cal {
        Calendar::Gregorian if year <= 0 => 1 - year,
        _ => year + cal.year_offset(),
    };
    u32::try_from(shown)
        .ok()
        .filter(|&y| y > 0)
        .ok_or_else(|| FormatError::OutOfRange {
            value: year.to_string(),
            reason: "year precedes the calendar's epoch",
        })
}

// ─── Parsing ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Fields {
    era: Option<usize>,
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    day_of_year: Option<u32>,
    weekday: Option<Weekday>,
    pm: Option<bool>,
    hour: Option<(char, u32)>,
    minute: Option<u32>,
    second: Option<u32>,
    nano: Option<u32>,
}

pub fn parse_date(ctx: &Context<'_>, text: &str, opts: &FormatOptions) -> Result<NaiveDate, FormatError> {
    let pattern = pattern(ctx, Category::Date, opts)?;
    let fields = scan(ctx, pattern, text, opts)?;
    build_date(&fields, text, opts.calendar)
}

pub fn parse_time(ctx: &Context<'_>, text: &str, opts: &FormatOptions) -> Result<NaiveTime, FormatError> {
    let pattern = pattern(ctx, Category::Time, opts)?;
    let fields = scan(ctx, pattern, text, opts)?;
    build_time(&fields, text)
}

pub fn parse_datetime(ctx: &Context<'_>, text: &str, opts: &FormatOptions) -> Result<NaiveDateTime, FormatError> {
    let pattern = datetime_pattern(ctx, opts)?;
    parse_pattern(ctx, &pattern, text, opts)
}

/// Parse with an explicit pattern. The pattern must identify a date; time
/// fields it lacks are zero.
pub fn parse_pattern(
    ctx: &Context<'_>,
    pattern: &str,
    text: &str,
    opts: &FormatOptions,
) -> Result<NaiveDateTime, FormatError> {
    let fields = scan(ctx, pattern, text, opts)?;
    let date = build_date(&fields, text, opts.calendar)?;
    let time = build_time(&fields, text)?;
    Ok(date.and_time(time))
}

struct Cursor<'t> {
    rest: &'t str,
}

impl<'t> Cursor<'t> {
    fn skip_space(&mut self) {
        self.rest = self.rest.trim_start();
    }

    /// Up to `max` ASCII digits.
    fn digits(&mut self, max: usize) -> Option<(u32, usize)> {
        let len = self
            .rest
            .bytes()
            .take(max)
            .take_while(u8::is_ascii_digit)
            .count();
        if len == 0 {
            return None;
        }
        let n = self.rest[..len].parse().ok()?;
        self.rest = &self.rest[len..];
        Some((n, len))
    }

    /// Index of the longest name the input starts with.
    fn name(&mut self, lists: &[Vec<String>]) -> Option<usize> {
        let (index, len) = lists
            .iter()
            .flat_map(|list| list.iter().enumerate())
            .filter(|(_, n)| !n.is_empty() && self.rest.starts_with(n.as_str()))
            .map(|(i, n)| (i, n.len()))
            .max_by_key(|&(i, len)| (len, std::cmp::Reverse(i)))?;
        self.rest = &self.rest[len..];
        Some(index)
    }
}

fn scan(ctx: &Context<'_>, pattern: &str, text: &str, opts: &FormatOptions) -> Result<Fields, FormatError> {
    let unparseable = |reason| FormatError::Unparseable {
        input: text.to_owned(),
        reason,
    };
    let digits: Digits = ctx.digits(opts.numbering)?;
    let input = lenient(&digits.delocalize(text));
    let mut cur = Cursor { rest: &input };
    let tokens = tokenize(pattern)?;
    let cal = opts.calendar;
    let mut f = Fields::default();

    let all_widths = |kind: Names, stand_alone: bool| -> Result<Vec<Vec<String>>, FormatError> {
        let mut lists = Vec::new();
        for w in WIDTHS {
            match names(ctx, cal, kind, stand_alone, w) {
                Ok(list) => lists.push(list.iter().map(|n| lenient(n)).collect()),
                Err(FormatError::MissingData { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(lists)
    };

    for (i, token) in tokens.iter().enumerate() {
        let (field, count) = match token {
            Token::Literal(lit) => {
                for c in lit.chars() {
                    cur.skip_space();
                    if c.is_whitespace() {
                        continue;
                    }
                    for fc in fold(c.encode_utf8(&mut [0; 4])).chars() {
                        cur.rest = cur
                            .rest
                            .strip_prefix(fc)
                            .ok_or_else(|| unparseable("literal text does not match the pattern"))?;
                    }
                }
                continue;
            }
            Token::Field(field, count) => (*field, *count),
        };
        if zone::is_zone_field(field) {
            return Err(unsupported(field, pattern));
        }
        cur.skip_space();

        let numeric = is_numeric(field, count);
        if numeric {
            let abutting = matches!(tokens.get(i + 1), Some(Token::Field(f2, c2)) if is_numeric(*f2, *c2));
            let max = if abutting { count } else { 10 };
            let (n, len) = cur.digits(max).ok_or_else(|| unparseable("expected digits"))?;
            match field {
                'y' => {
                    let y = i32::try_from(n).map_err(|_| out_of_range(text, "year too large"))?;
                    f.year = Some(if count == 2 && len == 2 && cal == Calendar::Gregorian {
                        if y < 50 { 2000 + y } else { 1900 + y }
                    } else {
                        y
                    });
                }
                'M' | 'L' => f.month = Some(n),
                'd' => f.day = Some(n),
                'D' => f.day_of_year = Some(n),
                'c' => {
                    let first = ctx.first_week_day()?.num_days_from_sunday();
                    if !(1..=7).contains(&n) {
                        return Err(out_of_range(text, "weekday number must be 1 to 7"));
                    }
                    f.weekday = Some(weekday_from_sunday((first + n - 1) as usize));
                }
                'Q' | 'q' => {
                    if !(1..=4).contains(&n) {
                        return Err(out_of_range(text, "quarter must be 1 to 4"));
                    }
                }
                'h' | 'H' | 'K' | 'k' => f.hour = Some((field, n)),
                'm' => f.minute = Some(n),
                's' => f.second = Some(n),
                'S' => {
                    let scale = 10u64.pow(9u32.saturating_sub(len as u32));
                    let nanos = if len > 9 { 0 } else { u64::from(n) * scale };
                    f.nano = Some(nanos as u32);
                }
                other => return Err(unsupported(other, pattern)),
            }
            continue;
        }

        let (kind, stand_alone) = match field {
            'G' => (Names::Eras, false),
            'M' | 'L' => (Names::Months, field == 'L'),
            'E' | 'c' => (Names::Days, field == 'c'),
            'Q' | 'q' => (Names::Quarters, field == 'q'),
            'a' => (Names::Periods, false),
            other => return Err(unsupported(other, pattern)),
        };
        let lists = all_widths(kind, stand_alone)?;
        if lists.is_empty() {
            // Nothing to match against: report the width the pattern asked for.
            names(ctx, cal, kind, stand_alone, width(count))?;
        }
        let index = cur.name(&lists).ok_or_else(|| unparseable("unknown name"))?;
        match kind {
            Names::Eras => f.era = Some(index),
            Names::Months => f.month = Some(index as u32 + 1),
            Names::Days => f.weekday = Some(weekday_from_sunday(index)),
            Names::Quarters => {}
            Names::Periods => f.pm = Some(index == 1),
        }
    }

    cur.skip_space();
    if !cur.rest.is_empty() {
        return Err(unparseable("trailing text"));
    }
    Ok(f)
}

fn is_numeric(field: char, count: usize) -> bool {
    match field {
        'M' | 'L' | 'Q' | 'q' | 'c' => count <= 2,
        'G' | 'E' | 'a' => false,
        _ => true,
    }
}

fn weekday_from_sunday(index: usize) -> Weekday {
    (0..index % 7).fold(Weekday::Sun, |d, _| d.succ())
}

fn out_of_range(text: &str, reason: &'static str) -> FormatError {
    FormatError::OutOfRange {
        value: text.to_owned(),
        reason,
    }
}

/// NFKC and lowercase with whitespace runs collapsed to one space.
fn lenient(text: &str) -> String {
    let folded: String = text
        .split_whitespace()
        .map(fold)
        .collect::<Vec<_>>()
        .join(" ");
    folded
}

fn build_date(f: &Fields, text: &str, cal: Calendar) -> Result<NaiveDate, FormatError> {
    let year = f.year.ok_or_else(|| FormatError::Unparseable {
        input: text.to_owned(),
        reason: "no year",
    })?;
    let year = match (cal, f.era) {
        (Calendar::Gregorian, Some(0)) => 1i32.checked_sub(year),
        _ => year.checked_sub(cal.year_offset()),
    }
    .ok_or_else(|| out_of_range(text, "year too large"))?;
    let date = match (f.month, f.day, f.day_of_year) {
        (Some(m), Some(d), _) => {
            if !(1..=12).contains(&m) {
                return Err(out_of_range(text, "month must be 1 to 12"));
            }
            NaiveDate::from_ymd_opt(year, m, d)
        }
        (None, None, Some(doy)) => NaiveDate::from_yo_opt(year, doy),
        _ => {
            return Err(FormatError::Unparseable {
                input: text.to_owned(),
                reason: "no month and day",
            });
        }
    }
    .ok_or_else(|| out_of_range(text, "no such date"))?;

    if let Some(w) = f.weekday
        && w != date.weekday()
    {
        return Err(out_of_range(text, "weekday does not match the date"));
    }
    Ok(date)
}

fn build_time(f: &Fields, text: &str) -> Result<NaiveTime, FormatError> {
    let hour = match (f.hour, f.pm) {
        (None, _) => 0,
        (Some(('H', h)), _) => h,
        (Some(('k', h)), _) => h % 24,
        (Some((_, _)), None) => {
            return Err(FormatError::Unparseable {
                input: text.to_owned(),
                reason: "12-hour clock without a day period",
            });
        }
        (Some(('h', h)), Some(pm)) if (1..=12).contains(&h) => h % 12 + if pm { 12 } else { 0 },
        (Some(('K', h)), Some(pm)) if h < 12 => h + if pm { 12 } else { 0 },
        (Some(_), Some(_)) => return Err(out_of_range(text, "hour out of range for a 12-hour clock")),
    };
    NaiveTime::from_hms_nano_opt(hour, f.minute.unwrap_or(0), f.second.unwrap_or(0), f.nano.unwrap_or(0))
        .ok_or_else(|| out_of_range(text, "no such time"))
}
