pub mod compile;
pub mod config;
pub mod context;
pub mod format;
pub mod locale;
pub mod locdata;
pub mod plural;
pub mod raw;
pub mod resolve;
pub mod store;
#[doc(hidden)]
pub mod testing;

pub use compile::{BuildError, Compilation, CompileError, compile, compile_dataset};
pub use config::{CompileConfig, ConfigError};
pub use context::Context;
pub use format::{
    Calendar, FormatError, FormatLength, FormatOptions, ListStyle, NumberingSystem, unit::UnitWidth, zone::ZoneInfo,
};
pub use locale::{LocaleId, MatchError, TagError, match_locale, negotiate};
pub use locdata::{LocData, LocDataError};
pub use plural::{PluralCategory, PluralOperands, PluralRuleSet, PluralType};
pub use raw::{Category, Dataset, MergePolicy, RawRecord, Value};
pub use raw::tree::{Node, Source};
pub use resolve::{ResolveError, ResolvedBundle, resolve};
pub use store::{Store, StoreError};
