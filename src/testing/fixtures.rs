//! A small hand-built dataset covering the shapes the engines read: root,
//! `en`, `en_GB`, `fr`, `fr_CA`, `de`, `ru`, `ar`, `zh`, `zh_Hant`, `th`.
//!
//! Values are trimmed CLDR data. `en_GB` carries a plural rule of its own
//! that compilation must ignore, and `currency-symbols` is defined at two
//! levels so the additive merge shows up in the resolved `en` bundles.

use crate::{
    compile::{BuildError, Compilation, compile},
    config::CompileConfig,
    locale::LocaleId,
    raw::tree::{Node, Source, leaf, list, number},
};

/// Build a nested element chain from a dotted key; the last segment is
/// made by `make`.
fn nest(key: &str, make: impl FnOnce(&str) -> Node) -> Node {
    match key.rsplit_once('.') {
        None => make(key),
        Some((parents, last)) => parents
            .rsplit('.')
            .fold(make(last), |node, segment| Node::new(segment).child(node)),
    }
}

fn s(key: &str, text: &str) -> Node {
    nest(key, |name| leaf(name, text))
}

fn n(key: &str, value: f64) -> Node {
    nest(key, |name| number(name, value))
}

fn l(key: &str, items: &[&str]) -> Node {
    nest(key, |name| list(name, items))
}

fn category(name: &str, entries: Vec<Node>) -> Node {
    Node::new(name).children(entries)
}

fn source(tag: &str, categories: Vec<Node>) -> Source {
    let mut tree = Node::new("ldml");
    if let Ok(id) = LocaleId::parse(tag)
        && !id.is_root()
    {
        let mut identity = Node::new("identity").child(Node::new("language").attr("type", id.language()));
        for (name, part) in [("script", id.script()), ("territory", id.territory()), ("variant", id.variant())] {
            if let Some(p) = part {
                identity = identity.child(Node::new(name).attr("type", p));
            }
        }
        tree = tree.child(identity);
    }
    Source::new(tag, tree.children(categories))
}

// ─── Locales ───────────────────────────────────────────────────────────────

pub fn root() -> Source {
    source(
        "root",
        vec![
            category("display", vec![s("pattern", "{0} ({1})"), s("separator", "{0}, {1}")]),
            category(
                "symbols",
                vec![
                    s("decimal", "."),
                    s("group", ","),
                    s("minus", "-"),
                    s("plus", "+"),
                    s("percent", "%"),
                    s("permille", "‰"),
                    s("exponential", "E"),
                    s("infinity", "∞"),
                    s("nan", "NaN"),
                ],
            ),
            category(
                "numbers",
                vec![
                    s("decimal", "#,##0.###"),
                    s("percent", "#,##0%"),
                    s("currency", "¤ #,##0.00"),
                    s("scientific", "#E0"),
                ],
            ),
            category("numsys", vec![s("default", "latn"), s("native", "latn")]),
            category(
                "currencies",
                vec![s("USD.symbol", "US$"), s("EUR.symbol", "€"), n("JPY.digits", 0.0)],
            ),
            category("currency-symbols", vec![l("USD", &["US$"])]),
            category(
                "calendar",
                vec![
                    l(
                        "gregorian.months.format.abbreviated",
                        &["M01", "M02", "M03", "M04", "M05", "M06", "M07", "M08", "M09", "M10", "M11", "M12"],
                    ),
                    l("gregorian.days.format.abbreviated", &["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]),
                    l("gregorian.quarters.format.abbreviated", &["Q1", "Q2", "Q3", "Q4"]),
                    l("gregorian.eras.abbreviated", &["BCE", "CE"]),
                    l("gregorian.periods.abbreviated", &["AM", "PM"]),
                ],
            ),
            category(
                "date",
                vec![
                    s("gregorian.short", "y-MM-dd"),
                    s("gregorian.medium", "y MMM d"),
                    s("gregorian.long", "y MMMM d"),
                    s("gregorian.full", "y MMMM d, EEEE"),
                ],
            ),
            category(
                "time",
                vec![
                    s("gregorian.short", "HH:mm"),
                    s("gregorian.medium", "HH:mm:ss"),
                    s("gregorian.long", "HH:mm:ss"),
                    s("gregorian.full", "HH:mm:ss"),
                ],
            ),
            category(
                "datetime",
                vec![
                    s("gregorian.short", "{1} {0}"),
                    s("gregorian.medium", "{1} {0}"),
                    s("gregorian.long", "{1} {0}"),
                    s("gregorian.full", "{1} {0}"),
                ],
            ),
            category(
                "week",
                vec![
                    n("first_day", 1.0),
                    n("min_days", 1.0),
                    n("weekend_start", 6.0),
                    n("weekend_end", 0.0),
                ],
            ),
            category(
                "list",
                vec![
                    s("standard.2", "{0}, {1}"),
                    s("standard.start", "{0}, {1}"),
                    s("standard.middle", "{0}, {1}"),
                    s("standard.end", "{0}, {1}"),
                ],
            ),
            category(
                "zone-formats",
                vec![
                    s("gmt", "GMT{0}"),
                    s("gmt_zero", "GMT"),
                    s("hour", "+HH:mm;-HH:mm"),
                    s("region", "{0}"),
                ],
            ),
            category(
                "time-zones",
                vec![
                    s("Europe/Berlin.meta", "Europe_Central"),
                    s("Europe/Paris.meta", "Europe_Central"),
                    s("Europe/London.meta", "GMT"),
                    s("America/New_York.meta", "America_Eastern"),
                ],
            ),
        ],
    )
}

const EN_MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September", "October", "November",
    "December",
];

pub fn en() -> Source {
    source(
        "en",
        vec![
            category(
                "languages",
                vec![
                    s("en", "English"),
                    s("fr", "French"),
                    s("de", "German"),
                    s("ru", "Russian"),
                    s("ar", "Arabic"),
                    s("zh", "Chinese"),
                    s("th", "Thai"),
                ],
            ),
            category("scripts", vec![s("Hans", "Simplified"), s("Hant", "Traditional")]),
            category(
                "territories",
                vec![
                    s("GB", "United Kingdom"),
                    s("US", "United States"),
                    s("CA", "Canada"),
                    s("FR", "France"),
                    s("TW", "Taiwan"),
                ],
            ),
            category("numbers", vec![s("currency", "¤#,##0.00")]),
            category(
                "currencies",
                vec![
                    s("USD.symbol", "$"),
                    s("USD.name.one", "US dollar"),
                    s("USD.name.other", "US dollars"),
                    s("EUR.name.one", "euro"),
                    s("EUR.name.other", "euros"),
                    s("GBP.symbol", "£"),
                    s("JPY.symbol", "¥"),
                ],
            ),
            category("currency-symbols", vec![l("USD", &["$"])]),
            category("zone-formats", vec![s("region", "{0} Time")]),
            category(
                "time-zones",
                vec![
                    s("Europe/London.long.daylight", "British Summer Time"),
                    s("America/St_Johns.city", "St. John's"),
                ],
            ),
            category(
                "meta-zones",
                vec![
                    s("Europe_Central.long.standard", "Central European Standard Time"),
                    s("Europe_Central.long.daylight", "Central European Summer Time"),
                    s("Europe_Central.long.generic", "Central European Time"),
                    s("America_Eastern.long.standard", "Eastern Standard Time"),
                    s("America_Eastern.long.daylight", "Eastern Daylight Time"),
                    s("America_Eastern.long.generic", "Eastern Time"),
                    s("America_Eastern.short.standard", "EST"),
                    s("America_Eastern.short.daylight", "EDT"),
                    s("America_Eastern.short.generic", "ET"),
                    s("GMT.long.standard", "Greenwich Mean Time"),
                ],
            ),
            category(
                "calendar",
                vec![
                    l(
                        "gregorian.months.format.abbreviated",
                        &["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"],
                    ),
                    l("gregorian.months.format.wide", &EN_MONTHS),
                    l("gregorian.months.format.narrow", &["J", "F", "M", "A", "M", "J", "J", "A", "S", "O", "N", "D"]),
                    l(
                        "gregorian.days.format.wide",
                        &["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"],
                    ),
                    l("gregorian.days.format.narrow", &["S", "M", "T", "W", "T", "F", "S"]),
                    l(
                        "gregorian.quarters.format.wide",
                        &["1st quarter", "2nd quarter", "3rd quarter", "4th quarter"],
                    ),
                    l("gregorian.eras.abbreviated", &["BC", "AD"]),
                    l("gregorian.eras.wide", &["Before Christ", "Anno Domini"]),
                ],
            ),
            category(
                "date",
                vec![
                    s("gregorian.short", "M/d/yy"),
                    s("gregorian.medium", "MMM d, y"),
                    s("gregorian.long", "MMMM d, y"),
                    s("gregorian.full", "EEEE, MMMM d, y"),
                ],
            ),
            category(
                "time",
                vec![
                    s("gregorian.short", "h:mm a"),
                    s("gregorian.medium", "h:mm:ss a"),
                    s("gregorian.long", "h:mm:ss a"),
                    s("gregorian.full", "h:mm:ss a"),
                ],
            ),
            category(
                "datetime",
                vec![
                    s("gregorian.short", "{1}, {0}"),
                    s("gregorian.medium", "{1}, {0}"),
                    s("gregorian.long", "{1} 'at' {0}"),
                    s("gregorian.full", "{1} 'at' {0}"),
                ],
            ),
            category("week", vec![n("first_day", 0.0)]),
            category(
                "plural",
                vec![
                    s("cardinal.one", "i = 1 and v = 0 @integer 1"),
                    s("cardinal.other", " @integer 0, 2~16, 100, 1000"),
                    s("ordinal.one", "n % 10 = 1 and n % 100 != 11"),
                    s("ordinal.two", "n % 10 = 2 and n % 100 != 12"),
                    s("ordinal.few", "n % 10 = 3 and n % 100 != 13"),
                ],
            ),
            category(
                "list",
                vec![
                    s("standard.2", "{0} and {1}"),
                    s("standard.end", "{0}, and {1}"),
                    s("or.2", "{0} or {1}"),
                    s("or.end", "{0}, or {1}"),
                ],
            ),
            category(
                "units",
                vec![
                    s("length-kilometer.long.one", "{0} kilometer"),
                    s("length-kilometer.long.other", "{0} kilometers"),
                    s("length-kilometer.short.other", "{0} km"),
                    s("duration-hour.long.one", "{0} hour"),
                    s("duration-hour.long.other", "{0} hours"),
                ],
            ),
        ],
    )
}

pub fn en_gb() -> Source {
    source(
        "en_GB",
        vec![
            category(
                "date",
                vec![
                    s("gregorian.short", "dd/MM/y"),
                    s("gregorian.medium", "d MMM y"),
                    s("gregorian.long", "d MMMM y"),
                    s("gregorian.full", "EEEE d MMMM y"),
                ],
            ),
            category("time", vec![s("gregorian.short", "HH:mm"), s("gregorian.medium", "HH:mm:ss")]),
            category("week", vec![n("first_day", 1.0), n("min_days", 4.0)]),
            category("currency-symbols", vec![l("GBP", &["£"])]),
            // Plural rules are per language; this one must never take effect.
            category("plural", vec![s("cardinal.one", "n = 0")]),
        ],
    )
}

pub fn fr() -> Source {
    source(
        "fr",
        vec![
            category(
                "languages",
                vec![s("fr", "français"), s("en", "anglais"), s("de", "allemand")],
            ),
            category("territories", vec![s("FR", "France"), s("CA", "Canada")]),
            category(
                "symbols",
                vec![s("decimal", ","), s("group", "\u{202f}"), s("percent", "%")],
            ),
            category(
                "numbers",
                vec![
                    s("percent", "#,##0\u{a0}%"),
                    s("currency", "#,##0.00\u{a0}¤"),
                ],
            ),
            category("currencies", vec![s("USD.symbol", "$US"), s("EUR.name.other", "euros")]),
            category(
                "calendar",
                vec![
                    l(
                        "gregorian.months.format.abbreviated",
                        &[
                            "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.",
                            "déc.",
                        ],
                    ),
                    l(
                        "gregorian.months.format.wide",
                        &[
                            "janvier",
                            "février",
                            "mars",
                            "avril",
                            "mai",
                            "juin",
                            "juillet",
                            "août",
                            "septembre",
                            "octobre",
                            "novembre",
                            "décembre",
                        ],
                    ),
                    l(
                        "gregorian.days.format.wide",
                        &["dimanche", "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi"],
                    ),
                    l("gregorian.eras.abbreviated", &["av. J.-C.", "ap. J.-C."]),
                ],
            ),
            category(
                "date",
                vec![
                    s("gregorian.short", "dd/MM/y"),
                    s("gregorian.medium", "d MMM y"),
                    s("gregorian.long", "d MMMM y"),
                    s("gregorian.full", "EEEE d MMMM y"),
                ],
            ),
            category("datetime", vec![s("gregorian.long", "{1} 'à' {0}")]),
            category("week", vec![n("min_days", 4.0)]),
            category("plural", vec![s("cardinal.one", "i = 0,1")]),
            category(
                "zone-formats",
                vec![s("gmt", "UTC{0}"), s("gmt_zero", "UTC"), s("region", "heure : {0}")],
            ),
            category(
                "meta-zones",
                vec![
                    s("Europe_Central.long.standard", "heure normale d’Europe centrale"),
                    s("Europe_Central.long.daylight", "heure d’été d’Europe centrale"),
                    s("Europe_Central.long.generic", "heure d’Europe centrale"),
                ],
            ),
            category(
                "list",
                vec![s("standard.2", "{0} et {1}"), s("standard.end", "{0} et {1}")],
            ),
        ],
    )
}

pub fn fr_ca() -> Source {
    source(
        "fr_CA",
        vec![
            category("date", vec![s("gregorian.short", "y-MM-dd")]),
            category("currencies", vec![s("USD.symbol", "$\u{a0}US"), s("CAD.symbol", "$")]),
            category("currency-symbols", vec![l("CAD", &["$"])]),
            category("week", vec![n("first_day", 0.0)]),
        ],
    )
}

pub fn de() -> Source {
    source(
        "de",
        vec![
            category("languages", vec![s("de", "Deutsch"), s("en", "Englisch")]),
            category("symbols", vec![s("decimal", ","), s("group", ".")]),
            category(
                "numbers",
                vec![s("percent", "#,##0\u{a0}%"), s("currency", "#,##0.00\u{a0}¤")],
            ),
            category(
                "calendar",
                vec![l(
                    "gregorian.months.format.wide",
                    &[
                        "Januar",
                        "Februar",
                        "März",
                        "April",
                        "Mai",
                        "Juni",
                        "Juli",
                        "August",
                        "September",
                        "Oktober",
                        "November",
                        "Dezember",
                    ],
                )],
            ),
            category(
                "date",
                vec![
                    s("gregorian.short", "dd.MM.yy"),
                    s("gregorian.medium", "dd.MM.y"),
                    s("gregorian.long", "d. MMMM y"),
                ],
            ),
            category("week", vec![n("min_days", 4.0)]),
            category("plural", vec![s("cardinal.one", "i = 1 and v = 0")]),
        ],
    )
}

pub fn ru() -> Source {
    source(
        "ru",
        vec![
            category("symbols", vec![s("decimal", ","), s("group", "\u{a0}")]),
            category(
                "plural",
                vec![
                    s("cardinal.one", "v = 0 and i % 10 = 1 and i % 100 != 11"),
                    s("cardinal.few", "v = 0 and i % 10 = 2..4 and i % 100 != 12..14"),
                    s(
                        "cardinal.many",
                        "v = 0 and i % 10 = 0 or v = 0 and i % 10 = 5..9 or v = 0 and i % 100 = 11..14",
                    ),
                ],
            ),
            category(
                "units",
                vec![
                    s("duration-hour.long.one", "{0} час"),
                    s("duration-hour.long.few", "{0} часа"),
                    s("duration-hour.long.many", "{0} часов"),
                    s("duration-hour.long.other", "{0} часа"),
                ],
            ),
        ],
    )
}

pub fn ar() -> Source {
    source(
        "ar",
        vec![
            category(
                "numsys",
                vec![s("default", "arab"), s("native", "arab"), s("digits.arab", "٠١٢٣٤٥٦٧٨٩")],
            ),
            category("symbols", vec![s("decimal", "٫"), s("group", "٬"), s("percent", "٪")]),
            category(
                "calendar",
                vec![
                    l(
                        "gregorian.months.format.wide",
                        &[
                            "يناير", "فبراير", "مارس", "أبريل", "مايو", "يونيو", "يوليو", "أغسطس", "سبتمبر", "أكتوبر",
                            "نوفمبر", "ديسمبر",
                        ],
                    ),
                    l("gregorian.periods.abbreviated", &["ص", "م"]),
                ],
            ),
            category("date", vec![s("gregorian.short", "d/M/y"), s("gregorian.long", "d MMMM y")]),
            category(
                "week",
                vec![n("first_day", 6.0), n("weekend_start", 5.0), n("weekend_end", 6.0)],
            ),
            category(
                "plural",
                vec![
                    s("cardinal.zero", "n = 0"),
                    s("cardinal.one", "n = 1"),
                    s("cardinal.two", "n = 2"),
                    s("cardinal.few", "n % 100 = 3..10"),
                    s("cardinal.many", "n % 100 = 11..99"),
                ],
            ),
        ],
    )
}

pub fn zh() -> Source {
    source(
        "zh",
        vec![
            category("languages", vec![s("zh", "中文"), s("en", "英语")]),
            category("scripts", vec![s("Hans", "简体"), s("Hant", "繁体")]),
            category(
                "calendar",
                vec![l(
                    "gregorian.months.format.abbreviated",
                    &["1月", "2月", "3月", "4月", "5月", "6月", "7月", "8月", "9月", "10月", "11月", "12月"],
                )],
            ),
            category(
                "date",
                vec![s("gregorian.short", "y/M/d"), s("gregorian.long", "y年M月d日")],
            ),
        ],
    )
}

pub fn zh_hant() -> Source {
    source(
        "zh_Hant",
        vec![
            category("languages", vec![s("zh", "中文"), s("en", "英文")]),
            category("scripts", vec![s("Hans", "簡體"), s("Hant", "繁體")]),
        ],
    )
}

const TH_MONTHS: [&str; 12] = [
    "มกราคม",
    "กุมภาพันธ์",
    "มีนาคม",
    "เมษายน",
    "พฤษภาคม",
    "มิถุนายน",
    "กรกฎาคม",
    "สิงหาคม",
    "กันยายน",
    "ตุลาคม",
    "พฤศจิกายน",
    "ธันวาคม",
];

pub fn th() -> Source {
    source(
        "th",
        vec![
            category(
                "numsys",
                vec![s("native", "thai"), s("digits.thai", "๐๑๒๓๔๕๖๗๘๙")],
            ),
            category(
                "calendar",
                vec![
                    l("gregorian.months.format.wide", &TH_MONTHS),
                    l("gregorian.eras.abbreviated", &["ก่อน ค.ศ.", "ค.ศ."]),
                    l("buddhist.eras.abbreviated", &["พ.ศ."]),
                ],
            ),
            category(
                "date",
                vec![
                    s("gregorian.short", "d/M/yy"),
                    s("gregorian.long", "d MMMM G y"),
                    s("buddhist.long", "d MMMM G y"),
                ],
            ),
        ],
    )
}

/// Every fixture locale, root first.
pub fn sources() -> Vec<Source> {
    vec![
        root(),
        en(),
        en_gb(),
        fr(),
        fr_ca(),
        de(),
        ru(),
        ar(),
        zh(),
        zh_hant(),
        th(),
    ]
}

/// The fixture dataset compiled with the default configuration.
pub fn compiled() -> Result<Compilation, BuildError> {
    compile(&sources(), &CompileConfig::default())
}
