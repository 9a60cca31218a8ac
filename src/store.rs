//! The runtime locale data store.
//!
//! ```text
//! header := "LCDT" major:u16 minor:u16 count:u32
//! table  := (tag:str16 offset:u64 length:u32) × count     sorted by locale
//! blocks := bundle block × count                          see [`codec`]
//! ```
//!
//! Loading reads the header and the offset table only. A block is decoded
//! the first time one of its keys is looked up and then cached for the life
//! of the store, so lookups after the first are a map access with no
//! inheritance walk. A loaded store is immutable and `Send + Sync`.

pub mod codec;

use crate::{
    locale::LocaleId,
    raw::{Category, Value},
    resolve::ResolvedBundle,
};
use codec::{Reader, Writer};
use rayon::prelude::*;
use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{self, BufReader, Read, Seek, SeekFrom},
    path::Path,
    sync::{Arc, OnceLock},
};
use thiserror::Error;
use tracing::{debug, trace};

pub const MAGIC: [u8; 4] = *b"LCDT";
pub const FORMAT_MAJOR: u16 = 1;
pub const FORMAT_MINOR: u16 = 0;

const HEADER_LEN: usize = 12;

#[derive(Debug, Error, Clone)]
pub enum StoreError {
    #[error("incompatible store format {found}, this build reads {expected}; recompile the data")]
    IncompatibleFormat { found: String, expected: String },
    #[error("corrupt store: {0}")]
    Corrupt(String),
    #[error("{what} of {len} bytes or items does not fit the store format")]
    TooLarge { what: &'static str, len: usize },
    #[error("locale `{0}` is not in the store")]
    LocaleNotInStore(LocaleId),
    #[error("store I/O failed: {0}")]
    Io(Arc<io::Error>),
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(Arc::new(e))
    }
}

#[derive(Debug)]
struct Slot {
    offset: usize,
    len: usize,
    bundle: OnceLock<Result<ResolvedBundle, StoreError>>,
}

#[derive(Debug)]
pub struct Store {
    bytes: Vec<u8>,
    index: BTreeMap<LocaleId, Slot>,
    version: (u16, u16),
}

impl Store {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        debug!(path = %path.display(), bytes = bytes.len(), "loading locale store");
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, StoreError> {
        let mut r = Reader::new(&bytes);
        let (version, count) = header(&mut r)?;

        let mut index = BTreeMap::new();
        for _ in 0..count {
            let (locale, offset, len) = table_entry(&mut r)?;
            let in_bounds = offset
                .checked_add(len)
                .is_some_and(|end| offset >= HEADER_LEN && end <= bytes.len());
            if !in_bounds {
                return Err(StoreError::Corrupt(format!("block of `{locale}` is out of bounds")));
            }
            let slot = Slot {
                offset,
                len,
                bundle: OnceLock::new(),
            };
            if index.insert(locale.clone(), slot).is_some() {
                return Err(StoreError::Corrupt(format!("`{locale}` appears twice")));
            }
        }
        debug!(locales = index.len(), major = version.0, minor = version.1, "locale store indexed");

        Ok(Self {
            bytes,
            index,
            version,
        })
    }

    /// `(major, minor)` of the loaded file.
    #[inline]
    pub fn version(&self) -> (u16, u16) {
        self.version
    }

    pub fn locales(&self) -> impl Iterator<Item = &LocaleId> {
        self.index.keys()
    }

    #[inline]
    pub fn contains(&self, locale: &LocaleId) -> bool {
        self.index.contains_key(locale)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The decoded bundle of `locale`, decoding its block on first use.
    pub fn bundle(&self, locale: &LocaleId) -> Result<&ResolvedBundle, StoreError> {
        let slot = self
            .index
            .get(locale)
            .ok_or_else(|| StoreError::LocaleNotInStore(locale.clone()))?;
        slot.bundle
            .get_or_init(|| {
                trace!(locale = %locale, bytes = slot.len, "decoding store block");
                let block = &self.bytes[slot.offset..slot.offset + slot.len];
                decode_block(block, locale)
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// `Ok(None)` when the locale exists but has no such key.
    pub fn lookup(
        &self,
        locale: &LocaleId,
        category: Category,
        key: &str,
    ) -> Result<Option<&Value>, StoreError> {
        Ok(self.bundle(locale)?.get(category, key))
    }
}

/// Encode a whole store. Blocks are serialized in parallel, each into its
/// own buffer, then laid out in locale order.
pub fn to_bytes(bundles: &BTreeMap<LocaleId, ResolvedBundle>) -> Result<Vec<u8>, StoreError> {
    let blocks: Vec<(String, Vec<u8>)> = bundles
        .par_iter()
        .map(|(id, bundle)| Ok((id.to_string(), codec::serialize(bundle)?)))
        .collect::<Result<_, StoreError>>()?;

    let table_len: usize = blocks.iter().map(|(tag, _)| 2 + tag.len() + 8 + 4).sum();
    let body_len: usize = blocks.iter().map(|(_, b)| b.len()).sum();

    let mut w = Writer(Vec::with_capacity(HEADER_LEN + table_len + body_len));
    w.0.extend_from_slice(&MAGIC);
    w.u16(FORMAT_MAJOR);
    w.u16(FORMAT_MINOR);
    w.len32(blocks.len(), "locale count")?;

    let mut offset = HEADER_LEN + table_len;
    for (tag, block) in &blocks {
        w.str16(tag)?;
        w.u64(offset as u64);
        w.len32(block.len(), "block")?;
        offset += block.len();
    }
    for (_, block) in blocks {
        w.0.extend_from_slice(&block);
    }
    Ok(w.0)
}

/// Write a store file. The file is written beside `path` and renamed into
/// place, so readers never see a partial store.
pub fn write(path: impl AsRef<Path>, bundles: &BTreeMap<LocaleId, ResolvedBundle>) -> Result<(), StoreError> {
    let path = path.as_ref();
    let bytes = to_bytes(bundles)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, &bytes)?;
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), locales = bundles.len(), bytes = bytes.len(), "locale store written");
    Ok(())
}

/// Read one locale's bundle from a store file without loading the others.
pub fn read_bundle(path: impl AsRef<Path>, locale: &LocaleId) -> Result<ResolvedBundle, StoreError> {
    let mut file = BufReader::new(File::open(path)?);

    let mut head = [0u8; HEADER_LEN];
    file.read_exact(&mut head)
        .map_err(|_| StoreError::Corrupt("file shorter than the store header".into()))?;
    let (_, count) = header(&mut Reader::new(&head))?;

    for _ in 0..count {
        let mut len = [0u8; 2];
        file.read_exact(&mut len)?;
        let mut rest = vec![0u8; u16::from_le_bytes(len) as usize + 12];
        file.read_exact(&mut rest)?;
        let mut entry = len.to_vec();
        entry.extend_from_slice(&rest);
        let (id, offset, len) = table_entry(&mut Reader::new(&entry))?;
        if &id != locale {
            continue;
        }
        file.seek(SeekFrom::Start(offset as u64))?;
        let mut block = vec![0u8; len];
        file.read_exact(&mut block)?;
        return decode_block(&block, locale);
    }
    Err(StoreError::LocaleNotInStore(locale.clone()))
}

fn header(r: &mut Reader<'_>) -> Result<((u16, u16), u32), StoreError> {
    let expected = format!("{FORMAT_MAJOR}.{FORMAT_MINOR}");
    let magic = r.take(4).map_err(|_| StoreError::IncompatibleFormat {
        found: "truncated header".into(),
        expected: expected.clone(),
    })?;
    if magic != MAGIC {
        return Err(StoreError::IncompatibleFormat {
            found: "not a locale store".into(),
            expected,
        });
    }
    let major = r.u16()?;
    let minor = r.u16()?;
    if major != FORMAT_MAJOR {
        return Err(StoreError::IncompatibleFormat {
            found: format!("{major}.{minor}"),
            expected,
        });
    }
    let count = r.u32()?;
    Ok(((major, minor), count))
}

fn table_entry(r: &mut Reader<'_>) -> Result<(LocaleId, usize, usize), StoreError> {
    let tag = r.str16()?;
    let locale = LocaleId::parse(tag)
        .map_err(|e| StoreError::Corrupt(format!("offset table: {e}")))?;
    let offset = usize::try_from(r.u64()?)
        .map_err(|_| StoreError::Corrupt(format!("offset of `{locale}` overflows")))?;
    let len = r.u32()? as usize;
    Ok((locale, offset, len))
}

fn decode_block(block: &[u8], locale: &LocaleId) -> Result<ResolvedBundle, StoreError> {
    let bundle = codec::deserialize(block)?;
    if bundle.locale() != locale {
        return Err(StoreError::Corrupt(format!(
            "block indexed as `{locale}` holds `{}`",
            bundle.locale()
        )));
    }
    Ok(bundle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::Entries;

    fn bundles() -> BTreeMap<LocaleId, ResolvedBundle> {
        ["root", "en", "en_GB"]
            .into_iter()
            .map(|tag| {
                let id = LocaleId::parse(tag).unwrap();
                let mut entries = Entries::new();
                entries
                    .entry(Category::Languages)
                    .or_default()
                    .insert("en".into(), Value::from(format!("English ({tag})")));
                (id.clone(), ResolvedBundle::from_parts(id, entries))
            })
            .collect()
    }

    #[test]
    fn lookup_hits_and_misses() {
        let store = Store::from_bytes(to_bytes(&bundles()).unwrap()).unwrap();
        let gb = LocaleId::parse("en_GB").unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.version(), (FORMAT_MAJOR, FORMAT_MINOR));
        assert_eq!(
            store.lookup(&gb, Category::Languages, "en").unwrap(),
            Some(&Value::from("English (en_GB)"))
        );
        assert_eq!(store.lookup(&gb, Category::Languages, "fr").unwrap(), None);
        assert!(matches!(
            store.lookup(&LocaleId::parse("fr").unwrap(), Category::Languages, "en"),
            Err(StoreError::LocaleNotInStore(_))
        ));
    }

    #[test]
    fn rejects_other_major_versions_and_magic() {
        let mut bytes = to_bytes(&bundles()).unwrap();
        bytes[4..6].copy_from_slice(&2u16.to_le_bytes());
        assert!(matches!(
            Store::from_bytes(bytes.clone()),
            Err(StoreError::IncompatibleFormat { .. })
        ));
        bytes[0] = b'X';
        assert!(matches!(
            Store::from_bytes(bytes),
            Err(StoreError::IncompatibleFormat { .. })
        ));
        assert!(matches!(
            Store::from_bytes(Vec::new()),
            Err(StoreError::IncompatibleFormat { .. })
        ));
    }

    #[test]
    fn newer_minor_version_still_loads() {
        let mut bytes = to_bytes(&bundles()).unwrap();
        bytes[6..8].copy_from_slice(&7u16.to_le_bytes());
        assert_eq!(Store::from_bytes(bytes).unwrap().version(), (FORMAT_MAJOR, 7));
    }

    #[test]
    fn out_of_bounds_table_is_corrupt() {
        let mut bytes = to_bytes(&bundles()).unwrap();
        let len = bytes.len();
        bytes.truncate(len - 3);
        assert!(matches!(Store::from_bytes(bytes), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn write_then_read_single_block() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locales.lcdt");
        write(&path, &bundles()).unwrap();

        let en = LocaleId::parse("en").unwrap();
        let bundle = read_bundle(&path, &en).unwrap();
        assert_eq!(&bundle, &bundles()[&en]);
        assert!(matches!(
            read_bundle(&path, &LocaleId::parse("de").unwrap()),
            Err(StoreError::LocaleNotInStore(_))
        ));
        assert_eq!(Store::load(&path).unwrap().len(), 3);
    }
}
