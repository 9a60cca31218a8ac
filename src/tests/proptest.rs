#[cfg(test)]
mod prop_tests {
    use crate::{
        FormatLength, FormatOptions, LocData, LocaleId, PluralOperands, PluralType, match_locale,
        testing::fixtures,
    };
    use chrono::{NaiveDate, NaiveTime};
    use proptest::prelude::*;
    use std::sync::LazyLock;

    static DATA: LazyLock<LocData> =
        LazyLock::new(|| LocData::from_compilation(&fixtures::compiled().unwrap()).unwrap());

    const LANGUAGES: [&str; 8] = ["root", "en", "fr", "de", "ru", "ar", "zh", "th"];

    fn id(tag: &str) -> LocaleId {
        LocaleId::parse(tag).unwrap()
    }

    fn date_strategy() -> impl Strategy<Value = NaiveDate> {
        (1i32..=9999, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    proptest! {
        #[test]
        fn plural_selection_is_total(int in 0u64..100_000_000, frac in 0u32..1000, scale in 0usize..4) {
            let text = if scale == 0 {
                int.to_string()
            } else {
                format!("{int}.{:0scale$}", frac % 10u32.pow(scale as u32))
            };
            let operands = PluralOperands::from_decimal_str(&text).unwrap();
            for tag in LANGUAGES {
                let ctx = DATA.context(&id(tag)).unwrap();
                for ty in [PluralType::Cardinal, PluralType::Ordinal] {
                    let category = ctx.plural_category(&operands, ty);
                    prop_assert!(ctx.plurals().categories(ty).contains(&category));
                }
            }
        }

        #[test]
        fn plural_selection_accepts_any_float(x in 0.0f64..1e15) {
            let operands = PluralOperands::try_from(x).unwrap();
            for tag in LANGUAGES {
                let ctx = DATA.context(&id(tag)).unwrap();
                let _ = ctx.plural_category(&operands, PluralType::Cardinal);
            }
        }

        #[test]
        fn dates_parse_back(date in date_strategy()) {
            for tag in ["en", "en_GB", "fr", "fr_CA", "de", "ar", "zh"] {
                for length in [FormatLength::Medium, FormatLength::Long, FormatLength::Full] {
                    let opts = FormatOptions::default().with_length(length);
                    let Ok(text) = DATA.format_date(&id(tag), &date, &opts) else { continue };
                    prop_assert_eq!(DATA.parse_date(&id(tag), &text, &opts).unwrap(), date, "{} {}", tag, text);
                }
            }
        }

        #[test]
        fn times_parse_back(h in 0u32..24, m in 0u32..60, s in 0u32..60) {
            let time = NaiveTime::from_hms_opt(h, m, s).unwrap();
            let opts = FormatOptions::default();
            for tag in ["en", "fr", "ar"] {
                let text = DATA.format_time(&id(tag), &time, &opts).unwrap();
                prop_assert_eq!(DATA.parse_time(&id(tag), &text, &opts).unwrap(), time, "{} {}", tag, text);
            }
        }

        #[test]
        fn currency_amounts_parse_back(cents in -100_000_000i64..100_000_000) {
            let value = cents as f64 / 100.0;
            for (tag, code) in [("en", "USD"), ("en", "EUR"), ("fr", "EUR"), ("de", "EUR"), ("ar", "EUR"), ("fr_CA", "CAD")] {
                let opts = FormatOptions::default().with_currency(code);
                let text = DATA.format_currency(&id(tag), value, &opts).unwrap();
                let (parsed, found) = DATA.parse_currency(&id(tag), &text, &opts).unwrap();
                prop_assert_eq!(parsed, value, "{} {}", tag, text);
                prop_assert_eq!(found, code);
            }
            let text = DATA.format_currency(&id("en"), value, &FormatOptions::default().with_currency("USD")).unwrap();
            let (_, found) = DATA.parse_currency(&id("en"), &text, &FormatOptions::default()).unwrap();
            prop_assert_eq!(found, "USD");
        }

        #[test]
        fn decimals_parse_back(thousandths in -10_000_000_000i64..10_000_000_000) {
            let value = thousandths as f64 / 1000.0;
            let opts = FormatOptions::default();
            for tag in ["en", "fr", "de", "ru", "ar"] {
                let text = DATA.format_decimal(&id(tag), value, &opts).unwrap();
                prop_assert_eq!(DATA.parse_decimal(&id(tag), &text, &opts).unwrap(), value, "{} {}", tag, text);
            }
        }

        #[test]
        fn tags_round_trip_through_display(
            lang in "[a-z]{2,3}",
            script in proptest::option::of("[A-Z][a-z]{3}"),
            territory in proptest::option::of("[A-Z]{2}"),
        ) {
            prop_assume!(lang != "und");
            let mut tag = lang.clone();
            for part in [&script, &territory].into_iter().flatten() {
                tag.push('-');
                tag.push_str(part);
            }
            let parsed = LocaleId::parse(&tag).unwrap();
            prop_assert_eq!(LocaleId::parse(&parsed.to_string()).unwrap(), parsed.clone());
            prop_assert_eq!(LocaleId::parse(&parsed.to_bcp47()).unwrap(), parsed.clone());

            let chain = parsed.ancestors();
            prop_assert_eq!(chain.first(), Some(&parsed));
            prop_assert!(chain.last().is_some_and(LocaleId::is_root));
            prop_assert_eq!(chain.len(), 2 + usize::from(script.is_some()) + usize::from(territory.is_some()));
        }

        #[test]
        fn matching_ignores_available_order(
            available in Just(vec!["en", "en_GB", "fr", "zh_Hant", "de", "root"]).prop_shuffle(),
            requested in prop::sample::select(vec!["en-AU", "en-GB", "fr-CA", "zh-Hant-HK", "de", "zz", "root"]),
        ) {
            let mut ids: Vec<LocaleId> = available.iter().map(|t| id(t)).collect();
            let requested = id(requested);
            let first = match_locale(&requested, &ids);
            ids.reverse();
            prop_assert_eq!(first, match_locale(&requested, &ids));
        }
    }
}
