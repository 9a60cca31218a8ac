//! Measurement units: `units.<unit>.<width>.<plural>` patterns with the
//! formatted number substituted for `{0}`.

use crate::{
    context::Context,
    format::{
        FormatError, FormatOptions,
        number::{displayed_operands, format_decimal},
        substitute,
    },
    plural::{PluralCategory, PluralType},
    raw::Category,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitWidth {
    /// "5 kilometers"
    #[default]
    Long,
    /// "5 km"
    Short,
    /// "5km"
    Narrow,
}

impl UnitWidth {
    pub const fn key(self) -> &'static str {
        match self {
            UnitWidth::Long => "long",
            UnitWidth::Short => "short",
            UnitWidth::Narrow => "narrow",
        }
    }
}

/// Format `value` in `unit` (e.g. `length-kilometer`). The plural form is
/// chosen from the number as displayed, with `other` as the fallback.
pub fn format_unit(
    ctx: &Context<'_>,
    value: f64,
    unit: &str,
    width: UnitWidth,
    opts: &FormatOptions,
) -> Result<String, FormatError> {
    let number = format_decimal(ctx, value, opts)?;
    let plural = ctx.plural_category(&displayed_operands(ctx, value)?, PluralType::Cardinal);
    let key = |p: PluralCategory| format!("{unit}.{}.{}", width.key(), p.name());

    let pattern = match ctx.get(Category::Units, &key(plural)) {
        Some(v) => v
            .as_str()
            .ok_or_else(|| ctx.invalid(Category::Units, &key(plural), "expected a string"))?,
        None => ctx.require_str(Category::Units, &key(PluralCategory::Other))?,
    };
    Ok(substitute(pattern, &[&number]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{locale::LocaleId, raw::Entries, raw::Value, resolve::ResolvedBundle};

    fn english() -> ResolvedBundle {
        let mut entries = Entries::new();
        let mut put = |c: Category, k: &str, v: &str| {
            entries.entry(c).or_default().insert(k.into(), Value::from(v));
        };
        put(Category::Symbols, "decimal", ".");
        put(Category::Symbols, "group", ",");
        put(Category::Symbols, "minus", "-");
        put(Category::Numbers, "decimal", "#,##0.###");
        put(Category::Plural, "cardinal.one", "i = 1 and v = 0");
        put(Category::Units, "length-kilometer.long.one", "{0} kilometer");
        put(Category::Units, "length-kilometer.long.other", "{0} kilometers");
        put(Category::Units, "length-kilometer.short.other", "{0} km");
        ResolvedBundle::from_parts(LocaleId::parse("en").unwrap(), entries)
    }

    #[test]
    fn picks_plural_form() {
        let b = english();
        let ctx = Context::new(&b).unwrap();
        let opts = FormatOptions::default();
        let fmt = |v: f64, w: UnitWidth| format_unit(&ctx, v, "length-kilometer", w, &opts).unwrap();
        assert_eq!(fmt(1.0, UnitWidth::Long), "1 kilometer");
        assert_eq!(fmt(1.5, UnitWidth::Long), "1.5 kilometers");
        assert_eq!(fmt(1234.0, UnitWidth::Long), "1,234 kilometers");
        assert_eq!(fmt(1.0, UnitWidth::Short), "1 km");
    }

    #[test]
    fn unknown_unit_is_missing_data() {
        let b = english();
        let ctx = Context::new(&b).unwrap();
        assert!(matches!(
            format_unit(&ctx, 2.0, "mass-gram", UnitWidth::Long, &FormatOptions::default()),
            Err(FormatError::MissingData { .. })
        ));
    }
}
