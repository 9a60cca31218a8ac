//! Language-only tags commonly sent by user agents, mapped to the locale
//! they usually mean. `no` is an outdated code for Norwegian Bokmål.

use crate::locale::LocaleId;
use phf::{Map, phf_map};

pub type Aliases = Map<&'static str, &'static str>;

pub static LOCALE_ALIASES: Aliases = phf_map! {
    "ar" => "ar_SY", "bg" => "bg_BG", "bs" => "bs_BA", "ca" => "ca_ES", "cs" => "cs_CZ",
    "da" => "da_DK", "de" => "de_DE", "el" => "el_GR", "en" => "en_US", "es" => "es_ES",
    "et" => "et_EE", "fa" => "fa_IR", "fi" => "fi_FI", "fr" => "fr_FR", "gl" => "gl_ES",
    "he" => "he_IL", "hu" => "hu_HU", "id" => "id_ID", "is" => "is_IS", "it" => "it_IT",
    "ja" => "ja_JP", "km" => "km_KH", "ko" => "ko_KR", "lt" => "lt_LT", "lv" => "lv_LV",
    "mk" => "mk_MK", "nl" => "nl_NL", "nn" => "nn_NO", "no" => "nb_NO", "pl" => "pl_PL",
    "pt" => "pt_PT", "ro" => "ro_RO", "ru" => "ru_RU", "sk" => "sk_SK", "sl" => "sl_SI",
    "sv" => "sv_SE", "th" => "th_TH", "tr" => "tr_TR", "uk" => "uk_UA",
};

/// Alias target for `locale`, if the table has one. Keys are canonical
/// `_`-joined tags.
#[inline]
pub fn resolve_alias(aliases: &Aliases, locale: &LocaleId) -> Option<LocaleId> {
    aliases
        .get(locale.to_string().as_str())
        .and_then(|target| LocaleId::parse(target).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_alias_target_parses() {
        for (from, to) in LOCALE_ALIASES.entries() {
            assert!(LocaleId::parse(from).is_ok(), "{from}");
            assert!(LocaleId::parse(to).is_ok(), "{to}");
        }
    }

    #[test]
    fn norwegian_maps_to_bokmal() {
        let no = LocaleId::parse("no").unwrap();
        assert_eq!(
            resolve_alias(&LOCALE_ALIASES, &no),
            Some(LocaleId::parse("nb_NO").unwrap())
        );
        let fr_ca = LocaleId::parse("fr_CA").unwrap();
        assert_eq!(resolve_alias(&LOCALE_ALIASES, &fr_ca), None);
    }
}
