//! List formatting with the CLDR `2`/`start`/`middle`/`end` patterns.
//!
//! Two items use `2`. Longer lists are built from the right: the last two
//! items go through `end`, every inner item is prepended with `middle`, and
//! the first with `start`.

use crate::{
    context::Context,
    format::{FormatError, ListStyle, substitute},
    raw::Category,
};

/// The pattern for `part` of `style`, falling back to the standard style.
fn part<'a>(ctx: &Context<'a>, style: ListStyle, part: &str) -> Result<&'a str, FormatError> {
    let key = format!("{}.{part}", style.key());
    if ctx.get(Category::List, &key).is_none() && style != ListStyle::Standard {
        return ctx.require_str(Category::List, &format!("{}.{part}", ListStyle::Standard.key()));
    }
    ctx.require_str(Category::List, &key)
}

pub fn format_list<S: AsRef<str>>(ctx: &Context<'_>, items: &[S], style: ListStyle) -> Result<String, FormatError> {
    match items {
        [] => Ok(String::new()),
        [only] => Ok(only.as_ref().to_owned()),
        [a, b] => Ok(substitute(part(ctx, style, "2")?, &[a.as_ref(), b.as_ref()])),
        [first, middle @ .., before_last, last] => {
            let mut out = substitute(part(ctx, style, "end")?, &[before_last.as_ref(), last.as_ref()]);
            let inner = part(ctx, style, "middle")?;
            for item in middle.iter().rev() {
                out = substitute(inner, &[item.as_ref(), &out]);
            }
            Ok(substitute(part(ctx, style, "start")?, &[first.as_ref(), &out]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{locale::LocaleId, raw::Entries, raw::Value, resolve::ResolvedBundle};

    fn english() -> ResolvedBundle {
        let mut entries = Entries::new();
        let list = entries.entry(Category::List).or_default();
        for (k, v) in [
            ("standard.2", "{0} and {1}"),
            ("standard.start", "{0}, {1}"),
            ("standard.middle", "{0}, {1}"),
            ("standard.end", "{0}, and {1}"),
            ("or.2", "{0} or {1}"),
            ("or.end", "{0}, or {1}"),
        ] {
            list.insert(k.into(), Value::from(v));
        }
        ResolvedBundle::from_parts(LocaleId::parse("en").unwrap(), entries)
    }

    #[test]
    fn joins_by_length() {
        let b = english();
        let ctx = Context::new(&b).unwrap();
        let fmt = |items: &[&str]| format_list(&ctx, items, ListStyle::Standard).unwrap();
        assert_eq!(fmt(&[]), "");
        assert_eq!(fmt(&["a"]), "a");
        assert_eq!(fmt(&["a", "b"]), "a and b");
        assert_eq!(fmt(&["a", "b", "c"]), "a, b, and c");
        assert_eq!(fmt(&["a", "b", "c", "d", "e"]), "a, b, c, d, and e");
    }

    #[test]
    fn missing_style_parts_fall_back_to_standard() {
        let b = english();
        let ctx = Context::new(&b).unwrap();
        assert_eq!(
            format_list(&ctx, &["a", "b", "c"], ListStyle::Or).unwrap(),
            "a, b, or c"
        );
        assert!(matches!(
            format_list(&ctx, &["a", "b"], ListStyle::Unit),
            Ok(s) if s == "a and b"
        ));
    }
}
