//! Locale display names such as `English (United Kingdom)`.
//!
//! The language name is required. Script, territory and variant names are
//! appended when the identifier has them and the bundle names them; a
//! component without a name is left out rather than shown as a code.

use crate::{context::Context, format::FormatError, format::substitute, locale::LocaleId, raw::Category};
use smallvec::SmallVec;

pub fn display_name(ctx: &Context<'_>, locale: &LocaleId) -> Result<String, FormatError> {
    let language = ctx.require_str(Category::Languages, locale.language())?;

    let details: SmallVec<[&str; 3]> = [
        (Category::Scripts, locale.script()),
        (Category::Territories, locale.territory()),
        (Category::Variants, locale.variant()),
    ]
    .into_iter()
    .filter_map(|(category, code)| ctx.get(category, code?)?.as_str())
    .collect();

    let Some((first, rest)) = details.split_first() else {
        return Ok(language.to_owned());
    };
    let separator = ctx.require_str(Category::Display, "separator")?;
    let joined = rest
        .iter()
        .fold((*first).to_owned(), |acc, d| substitute(separator, &[&acc, d]));
    Ok(substitute(ctx.require_str(Category::Display, "pattern")?, &[language, &joined]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{raw::Entries, raw::Value, resolve::ResolvedBundle};

    fn english() -> ResolvedBundle {
        let mut entries = Entries::new();
        let mut put = |c: Category, k: &str, v: &str| {
            entries.entry(c).or_default().insert(k.into(), Value::from(v));
        };
        put(Category::Languages, "en", "English");
        put(Category::Languages, "zh", "Chinese");
        put(Category::Scripts, "Hant", "Traditional");
        put(Category::Territories, "GB", "United Kingdom");
        put(Category::Territories, "TW", "Taiwan");
        put(Category::Display, "pattern", "{0} ({1})");
        put(Category::Display, "separator", "{0}, {1}");
        ResolvedBundle::from_parts(LocaleId::parse("en").unwrap(), entries)
    }

    #[test]
    fn names_components() {
        let b = english();
        let ctx = Context::new(&b).unwrap();
        let name = |tag: &str| display_name(&ctx, &LocaleId::parse(tag).unwrap()).unwrap();
        assert_eq!(name("en"), "English");
        assert_eq!(name("en_GB"), "English (United Kingdom)");
        assert_eq!(name("zh_Hant_TW"), "Chinese (Traditional, Taiwan)");
        // unnamed territory is dropped
        assert_eq!(name("en_ZA"), "English");
    }

    #[test]
    fn unknown_language_is_missing_data() {
        let b = english();
        let ctx = Context::new(&b).unwrap();
        assert!(matches!(
            display_name(&ctx, &LocaleId::parse("fr").unwrap()),
            Err(FormatError::MissingData { .. })
        ));
    }
}
