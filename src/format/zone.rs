//! Time zone fields of date patterns.
//!
//! Data layout:
//!
//! * `time-zones`: `<zone>.city`, `<zone>.meta` (metazone id) and
//!   `<zone>.<long|short>.<standard|daylight|generic>`.
//! * `meta-zones`: `<meta>.<long|short>.<standard|daylight|generic>`.
//! * `zone-formats`: `gmt` (`GMT{0}`), `gmt_zero` (`GMT`), `hour`
//!   (`+HH:mm;-HH:mm`) and `region` (`{0} Time`).
//!
//! Names fall back from the zone to its metazone, then to the location
//! format (generic names only), then to the localized GMT format.

use crate::{
    context::Context,
    format::{Digits, FormatError, substitute},
    raw::Category,
};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

/// The zone a value is displayed in. The caller supplies the offset that
/// applies at that instant; no zone rules are evaluated here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneInfo {
    /// Olson id such as `Europe/Berlin`.
    pub id: String,
    /// Offset from UTC in seconds, east positive.
    pub offset_seconds: i32,
    /// Whether daylight saving time is in effect.
    pub daylight: bool,
}

impl ZoneInfo {
    pub fn new(id: impl Into<String>, offset: FixedOffset) -> Self {
        Self {
            id: id.into(),
            offset_seconds: offset.local_minus_utc(),
            daylight: false,
        }
    }

    pub fn with_daylight(mut self, daylight: bool) -> Self {
        self.daylight = daylight;
        self
    }

    /// Exemplar city derived from the id: `America/New_York` → `New York`.
    /// `Etc/*` zones and ids without an area have no location.
    fn exemplar_city(&self) -> Option<String> {
        let (area, city) = self.id.rsplit_once('/')?;
        if area == "Etc" || area.starts_with("Etc/") {
            return None;
        }
        Some(city.replace('_', " "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Standard,
    Daylight,
    Generic,
}

impl Kind {
    const fn key(self) -> &'static str {
        match self {
            Kind::Standard => "standard",
            Kind::Daylight => "daylight",
            Kind::Generic => "generic",
        }
    }
}

pub(crate) fn is_zone_field(field: char) -> bool {
    matches!(field, 'z' | 'v' | 'Z' | 'O')
}

/// Render one zone field.
pub(crate) fn render(
    ctx: &Context<'_>,
    field: char,
    count: usize,
    zone: &ZoneInfo,
    digits: &Digits,
    pattern: &str,
) -> Result<String, FormatError> {
    let long = count >= 4;
    match field {
        'z' => {
            let kind = if zone.daylight { Kind::Daylight } else { Kind::Standard };
            match zone_name(ctx, zone, long, kind)? {
                Some(name) => Ok(name.to_owned()),
                None => localized_gmt(ctx, zone, long, digits),
            }
        }
        'v' => {
            if let Some(name) = zone_name(ctx, zone, long, Kind::Generic)? {
                return Ok(name.to_owned());
            }
            match location(ctx, zone)? {
                Some(text) => Ok(text),
                None => localized_gmt(ctx, zone, long, digits),
            }
        }
        'Z' => match count {
            4 => localized_gmt(ctx, zone, true, digits),
            5 if zone.offset_seconds == 0 => Ok("Z".to_owned()),
            5 => Ok(digits.localize(&iso_offset(zone.offset_seconds, true))),
            _ => Ok(digits.localize(&iso_offset(zone.offset_seconds, false))),
        },
        'O' => localized_gmt(ctx, zone, long, digits),
        other => Err(FormatError::UnsupportedToken {
            token: other.to_string().repeat(count),
            pattern: pattern.to_owned(),
        }),
    }
}

/// A zone name of the zone itself, else of its metazone.
fn zone_name<'a>(ctx: &Context<'a>, zone: &ZoneInfo, long: bool, kind: Kind) -> Result<Option<&'a str>, FormatError> {
    let width = if long { "long" } else { "short" };
    let own = format!("{}.{width}.{}", zone.id, kind.key());
    if ctx.get(Category::TimeZones, &own).is_some() {
        return ctx.require_str(Category::TimeZones, &own).map(Some);
    }
    let meta_key = format!("{}.meta", zone.id);
    if ctx.get(Category::TimeZones, &meta_key).is_none() {
        return Ok(None);
    }
    let meta = ctx.require_str(Category::TimeZones, &meta_key)?;
    let key = format!("{meta}.{width}.{}", kind.key());
    match ctx.get(Category::MetaZones, &key) {
        Some(_) => ctx.require_str(Category::MetaZones, &key).map(Some),
        None => Ok(None),
    }
}

/// The generic location format, `{0} Time` with the zone's city.
fn location(ctx: &Context<'_>, zone: &ZoneInfo) -> Result<Option<String>, FormatError> {
    let key = format!("{}.city", zone.id);
    let city = match ctx.get(Category::TimeZones, &key) {
        Some(_) => ctx.require_str(Category::TimeZones, &key)?.to_owned(),
        None => match zone.exemplar_city() {
            Some(city) => city,
            None => return Ok(None),
        },
    };
    let region = ctx.require_str(Category::ZoneFormats, "region")?;
    Ok(Some(substitute(region, &[&city])))
}

/// `GMT+01:00` (long) or `GMT+1` (short); the zero offset is `gmt_zero`.
fn localized_gmt(ctx: &Context<'_>, zone: &ZoneInfo, long: bool, digits: &Digits) -> Result<String, FormatError> {
    let minutes = zone.offset_seconds / 60;
    if minutes == 0 {
        return ctx.require_str(Category::ZoneFormats, "gmt_zero").map(str::to_owned);
    }
    let hour_format = ctx.require_str(Category::ZoneFormats, "hour")?;
    let (positive, negative) = hour_format
        .split_once(';')
        .ok_or_else(|| ctx.invalid(Category::ZoneFormats, "hour", "expected `positive;negative`"))?;
    let sub = if minutes < 0 { negative } else { positive };
    let (h, m) = (minutes.unsigned_abs() / 60, minutes.unsigned_abs() % 60);

    let offset = if long {
        sub.replace("HH", &format!("{h:02}"))
            .replace('H', &h.to_string())
            .replace("mm", &format!("{m:02}"))
    } else {
        let sign = sub.split('H').next().unwrap_or_default();
        match m {
            0 => format!("{sign}{h}"),
            _ => format!("{sign}{h}:{m:02}"),
        }
    };
    let gmt = ctx.require_str(Category::ZoneFormats, "gmt")?;
    Ok(substitute(gmt, &[&digits.localize(&offset)]))
}

/// `+0100` (basic) or `+01:00` (extended).
fn iso_offset(seconds: i32, extended: bool) -> String {
    let minutes = seconds / 60;
    let sign = if minutes < 0 { '-' } else { '+' };
    let (h, m) = (minutes.unsigned_abs() / 60, minutes.unsigned_abs() % 60);
    if extended {
        format!("{sign}{h:02}:{m:02}")
    } else {
        format!("{sign}{h:02}{m:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        locale::LocaleId,
        raw::{Entries, Value},
        resolve::ResolvedBundle,
    };

    fn bundle() -> ResolvedBundle {
        let mut map = Entries::new();
        let mut put = |c: Category, k: &str, v: &str| {
            map.entry(c).or_default().insert(k.to_owned(), Value::from(v));
        };
        put(Category::ZoneFormats, "gmt", "GMT{0}");
        put(Category::ZoneFormats, "gmt_zero", "GMT");
        put(Category::ZoneFormats, "hour", "+HH:mm;-HH:mm");
        put(Category::ZoneFormats, "region", "{0} Time");
        put(Category::TimeZones, "Europe/Berlin.meta", "Europe_Central");
        put(Category::TimeZones, "Europe/London.long.daylight", "British Summer Time");
        put(Category::TimeZones, "America/St_Johns.city", "St. John's");
        put(Category::MetaZones, "Europe_Central.long.standard", "Central European Standard Time");
        put(Category::MetaZones, "Europe_Central.long.generic", "Central European Time");
        ResolvedBundle::from_parts(LocaleId::parse("en").unwrap(), map)
    }

    fn zone(id: &str, hours: f32) -> ZoneInfo {
        let seconds = (hours * 3600.0) as i32;
        ZoneInfo::new(id, FixedOffset::east_opt(seconds).unwrap())
    }

    fn fmt(field: char, count: usize, z: &ZoneInfo) -> String {
        let b = bundle();
        let ctx = Context::new(&b).unwrap();
        render(&ctx, field, count, z, &Digits::LATIN, "").unwrap()
    }

    #[test]
    fn specific_names_come_from_zone_then_metazone() {
        let london = zone("Europe/London", 1.0).with_daylight(true);
        assert_eq!(fmt('z', 4, &london), "British Summer Time");
        assert_eq!(fmt('z', 4, &zone("Europe/Berlin", 1.0)), "Central European Standard Time");
        // No short names: localized GMT.
        assert_eq!(fmt('z', 1, &zone("Europe/Berlin", 1.0)), "GMT+1");
    }

    #[test]
    fn generic_names_fall_back_to_location() {
        assert_eq!(fmt('v', 4, &zone("Europe/Berlin", 1.0)), "Central European Time");
        assert_eq!(fmt('v', 4, &zone("America/St_Johns", -3.5)), "St. John's Time");
        assert_eq!(fmt('v', 4, &zone("America/New_York", -5.0)), "New York Time");
        assert_eq!(fmt('v', 1, &zone("Etc/GMT-3", 3.0)), "GMT+3");
    }

    #[test]
    fn offsets() {
        let nf = zone("America/St_Johns", -3.5);
        assert_eq!(fmt('Z', 1, &nf), "-0330");
        assert_eq!(fmt('Z', 4, &nf), "GMT-03:30");
        assert_eq!(fmt('Z', 5, &nf), "-03:30");
        assert_eq!(fmt('O', 1, &nf), "GMT-3:30");
        let utc = zone("Etc/UTC", 0.0);
        assert_eq!(fmt('Z', 5, &utc), "Z");
        assert_eq!(fmt('O', 4, &utc), "GMT");
    }

    #[test]
    fn missing_zone_formats_are_reported() {
        let b = ResolvedBundle::from_parts(LocaleId::parse("en").unwrap(), Entries::new());
        let ctx = Context::new(&b).unwrap();
        assert!(matches!(
            render(&ctx, 'O', 4, &zone("Europe/Paris", 1.0), &Digits::LATIN, "OOOO"),
            Err(FormatError::MissingData { .. })
        ));
    }
}
