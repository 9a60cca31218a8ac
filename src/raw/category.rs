use phf::{Map, phf_map};
use std::{fmt, str::FromStr};

/// How values of one category combine along the ancestor chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// A more specific locale replaces the inherited value.
    Override,
    /// Lists concatenate: ancestor entries first, then the more specific
    /// locale's entries, each in dataset order.
    Additive,
    /// Only root and the bare-language record contribute. Script, territory
    /// and variant records are ignored for the category.
    LanguageScoped,
}

/// ---------------------------------------------------------------------------
///    Macro – generates the enum, its wire tags and the name table
/// ---------------------------------------------------------------------------
macro_rules! define_categories {
    ($(
        $variant:ident = $tag:literal, $name:literal, $policy:ident
    );* $(;)?) => {
        /// A top-level data category of a locale record.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum Category {
            $( $variant = $tag, )*
        }

        impl Category {
            pub const ALL: &'static [Category] = &[$(Category::$variant),*];

            /// Element name in the source tree and prefix in dotted paths.
            #[inline]
            pub const fn name(self) -> &'static str {
                match self {
                    $( Category::$variant => $name, )*
                }
            }

            #[inline]
            pub const fn merge_policy(self) -> MergePolicy {
                match self {
                    $( Category::$variant => MergePolicy::$policy, )*
                }
            }

            /// Stable one-byte tag used by the store format.
            #[inline]
            pub const fn wire_tag(self) -> u8 {
                self as u8
            }

            #[inline]
            pub const fn from_wire_tag(tag: u8) -> Option<Self> {
                match tag {
                    $( $tag => Some(Category::$variant), )*
                    _ => None,
                }
            }
        }

        static CATEGORY_TABLE: Map<&'static str, Category> = phf_map! {
            $( $name => Category::$variant, )*
        };
    };
}

// ---------------------------------------------------------------------------
//    Category definitions (single source of truth)
//    Wire tags are part of the store format: append, never renumber.
// ---------------------------------------------------------------------------
define_categories! {
    Languages       = 0,  "languages",        Override;
    Scripts         = 1,  "scripts",          Override;
    Territories     = 2,  "territories",      Override;
    Variants        = 3,  "variants",         Override;
    Display         = 4,  "display",          Override;
    Symbols         = 5,  "symbols",          Override;
    Numbers         = 6,  "numbers",          Override;
    NumberingSystems = 7, "numsys",           Override;
    Currencies      = 8,  "currencies",       Override;
    CurrencySymbols = 9,  "currency-symbols", Additive;
    Calendar        = 10, "calendar",         Override;
    Date            = 11, "date",             Override;
    Time            = 12, "time",             Override;
    DateTime        = 13, "datetime",         Override;
    Week            = 14, "week",             Override;
    Plural          = 15, "plural",           LanguageScoped;
    List            = 16, "list",             Override;
    Units           = 17, "units",            Override;
    TimeZones       = 18, "time-zones",       Override;
    MetaZones       = 19, "meta-zones",       Override;
    ZoneFormats     = 20, "zone-formats",     Override;
}

impl Category {
    #[inline]
    pub fn from_name(name: &str) -> Option<Self> {
        CATEGORY_TABLE.get(name).copied()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| s.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_wire_tags_round_trip() {
        for &c in Category::ALL {
            assert_eq!(Category::from_name(c.name()), Some(c));
            assert_eq!(Category::from_wire_tag(c.wire_tag()), Some(c));
        }
        assert_eq!(Category::from_wire_tag(200), None);
        assert!("dates".parse::<Category>().is_err());
    }

    #[test]
    fn merge_policies_are_explicit() {
        let additive: Vec<_> = Category::ALL
            .iter()
            .filter(|c| c.merge_policy() == MergePolicy::Additive)
            .collect();
        assert_eq!(additive, [&Category::CurrencySymbols]);
        assert_eq!(Category::Plural.merge_policy(), MergePolicy::LanguageScoped);
        assert_eq!(Category::Date.merge_policy(), MergePolicy::Override);
    }
}
