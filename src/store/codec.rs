//! Bundle block encoding.
//!
//! ```text
//! block  := tag:str16 count:u32 entry*
//! entry  := category:u8 key:str16 value
//! value  := 0 len:u32 utf8          string
//!         | 1 bits:u64              number (f64)
//!         | 2 count:u32 value*      list
//!         | 3 count:u32 (str16 value)*   map
//! str16  := len:u16 utf8
//! ```
//!
//! All integers are little endian. Entries are written in bundle order, which
//! is sorted, so equal bundles encode to identical bytes.

use crate::{
    locale::LocaleId,
    raw::{Category, Entries, Value},
    resolve::ResolvedBundle,
    store::StoreError,
};
use std::collections::BTreeMap;

const STRING: u8 = 0;
const NUMBER: u8 = 1;
const LIST: u8 = 2;
const MAP: u8 = 3;

/// Lists and maps nested deeper than this are rejected as corrupt.
const MAX_DEPTH: usize = 32;

/// Fails with [`StoreError::TooLarge`] when a key, string or collection does
/// not fit its length field.
pub fn serialize(bundle: &ResolvedBundle) -> Result<Vec<u8>, StoreError> {
    let mut w = Writer(Vec::with_capacity(bundle.len() * 32));
    w.str16(&bundle.locale().to_string())?;
    w.len32(bundle.len(), "entry count")?;
    for (category, key, value) in bundle.iter() {
        w.u8(category.wire_tag());
        w.str16(key)?;
        w.value(value)?;
    }
    Ok(w.0)
}

pub fn deserialize(bytes: &[u8]) -> Result<ResolvedBundle, StoreError> {
    let mut r = Reader::new(bytes);
    let tag = r.str16()?;
    let locale = LocaleId::parse(tag)
        .map_err(|e| StoreError::Corrupt(format!("block tag: {e}")))?;
    let count = r.u32()?;

    let mut entries = Entries::new();
    for _ in 0..count {
        let wire = r.u8()?;
        let category = Category::from_wire_tag(wire)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown category tag {wire}")))?;
        let key = r.str16()?.to_owned();
        let value = r.value(0)?;
        if entries.entry(category).or_default().insert(key, value).is_some() {
            return Err(StoreError::Corrupt(format!("duplicate entry in block `{locale}`")));
        }
    }
    if !r.is_empty() {
        return Err(StoreError::Corrupt(format!("trailing bytes in block `{locale}`")));
    }
    Ok(ResolvedBundle::from_parts(locale, entries))
}

pub(crate) struct Writer(pub(crate) Vec<u8>);

impl Writer {
    #[inline]
    pub(crate) fn u8(&mut self, v: u8) {
        self.0.push(v);
    }

    #[inline]
    pub(crate) fn u16(&mut self, v: u16) {
        self.0.extend_from_slice(&v.to_le_bytes());
    }

    #[inline]
    pub(crate) fn u32(&mut self, v: u32) {
        self.0.extend_from_slice(&v.to_le_bytes());
    }

    #[inline]
    pub(crate) fn u64(&mut self, v: u64) {
        self.0.extend_from_slice(&v.to_le_bytes());
    }

    /// A length that must fit a `u32` field.
    pub(crate) fn len32(&mut self, len: usize, what: &'static str) -> Result<(), StoreError> {
        let len = u32::try_from(len).map_err(|_| StoreError::TooLarge { what, len })?;
        self.u32(len);
        Ok(())
    }

    pub(crate) fn str16(&mut self, s: &str) -> Result<(), StoreError> {
        let len = u16::try_from(s.len()).map_err(|_| StoreError::TooLarge {
            what: "key",
            len: s.len(),
        })?;
        self.u16(len);
        self.0.extend_from_slice(s.as_bytes());
        Ok(())
    }

    fn value(&mut self, value: &Value) -> Result<(), StoreError> {
        match value {
            Value::String(s) => {
                self.u8(STRING);
                self.len32(s.len(), "string")?;
                self.0.extend_from_slice(s.as_bytes());
            }
            Value::Number(n) => {
                self.u8(NUMBER);
                self.u64(n.to_bits());
            }
            Value::List(items) => {
                self.u8(LIST);
                self.len32(items.len(), "list")?;
                for item in items {
                    self.value(item)?;
                }
            }
            Value::Map(map) => {
                self.u8(MAP);
                self.len32(map.len(), "map")?;
                for (k, v) in map {
                    self.str16(k)?;
                    self.value(v)?;
                }
            }
        }
        Ok(())
    }
}

pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.pos == self.bytes.len()
    }

    #[inline]
    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8], StoreError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| StoreError::Corrupt(format!("unexpected end of data at byte {}", self.pos)))?;
        let out = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], StoreError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub(crate) fn u8(&mut self) -> Result<u8, StoreError> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn u16(&mut self) -> Result<u16, StoreError> {
        self.array().map(u16::from_le_bytes)
    }

    pub(crate) fn u32(&mut self) -> Result<u32, StoreError> {
        self.array().map(u32::from_le_bytes)
    }

    pub(crate) fn u64(&mut self) -> Result<u64, StoreError> {
        self.array().map(u64::from_le_bytes)
    }

    pub(crate) fn str16(&mut self) -> Result<&'a str, StoreError> {
        let len = self.u16()? as usize;
        utf8(self.take(len)?)
    }

    fn value(&mut self, depth: usize) -> Result<Value, StoreError> {
        if depth > MAX_DEPTH {
            return Err(StoreError::Corrupt("values nested too deeply".into()));
        }
        match self.u8()? {
            STRING => {
                let len = self.u32()? as usize;
                Ok(Value::String(utf8(self.take(len)?)?.to_owned()))
            }
            NUMBER => Ok(Value::Number(f64::from_bits(self.u64()?))),
            LIST => {
                let count = self.u32()? as usize;
                // Every value takes at least one byte.
                let mut items = Vec::with_capacity(count.min(self.bytes.len() - self.pos));
                for _ in 0..count {
                    items.push(self.value(depth + 1)?);
                }
                Ok(Value::List(items))
            }
            MAP => {
                let count = self.u32()?;
                let mut map = BTreeMap::new();
                for _ in 0..count {
                    let key = self.str16()?.to_owned();
                    let value = self.value(depth + 1)?;
                    map.insert(key, value);
                }
                Ok(Value::Map(map))
            }
            other => Err(StoreError::Corrupt(format!("unknown value tag {other}"))),
        }
    }
}

#[cfg(feature = "simd")]
#[inline]
fn utf8(bytes: &[u8]) -> Result<&str, StoreError> {
    simdutf8::basic::from_utf8(bytes).map_err(|_| StoreError::Corrupt("invalid UTF-8".into()))
}

#[cfg(not(feature = "simd"))]
#[inline]
fn utf8(bytes: &[u8]) -> Result<&str, StoreError> {
    std::str::from_utf8(bytes).map_err(|_| StoreError::Corrupt("invalid UTF-8".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle() -> ResolvedBundle {
        let mut entries = Entries::new();
        let date = entries.entry(Category::Date).or_default();
        date.insert("gregorian.short".into(), Value::from("d/M/y"));
        let week = entries.entry(Category::Week).or_default();
        week.insert("first_day".into(), Value::Number(1.0));
        let cur = entries.entry(Category::Currencies).or_default();
        cur.insert(
            "EUR".into(),
            Value::Map(BTreeMap::from([
                ("symbol".into(), Value::from("€")),
                ("digits".into(), Value::Number(2.0)),
                ("alts".into(), Value::from(vec!["EUR", "euro"])),
            ])),
        );
        ResolvedBundle::from_parts(LocaleId::parse("fr_CA").unwrap(), entries)
    }

    #[test]
    fn decodes_what_it_encodes() {
        let b = bundle();
        assert_eq!(deserialize(&serialize(&b).unwrap()).unwrap(), b);
    }

    #[test]
    fn encoding_is_deterministic() {
        assert_eq!(serialize(&bundle()).unwrap(), serialize(&bundle().clone()).unwrap());
    }

    #[test]
    fn truncated_block_is_corrupt() {
        let bytes = serialize(&bundle()).unwrap();
        for cut in [0, 1, 5, bytes.len() / 2, bytes.len() - 1] {
            assert!(
                matches!(deserialize(&bytes[..cut]), Err(StoreError::Corrupt(_))),
                "cut at {cut}"
            );
        }
        let mut extra = bytes.clone();
        extra.push(0);
        assert!(matches!(deserialize(&extra), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn unknown_tags_are_corrupt() {
        let mut bytes = serialize(&bundle()).unwrap();
        // tag "fr_CA" is 2 + 5 bytes, count 4 bytes, then the first category.
        bytes[11] = 250;
        assert!(matches!(deserialize(&bytes), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn oversized_keys_are_refused_not_truncated() {
        let mut entries = Entries::new();
        entries
            .entry(Category::Languages)
            .or_default()
            .insert("k".repeat(u16::MAX as usize + 1), Value::from("x"));
        let b = ResolvedBundle::from_parts(LocaleId::parse("en").unwrap(), entries);
        assert!(matches!(
            serialize(&b),
            Err(StoreError::TooLarge { what: "key", len: 65_536 })
        ));
    }

    #[test]
    fn longest_key_still_fits() {
        let mut entries = Entries::new();
        entries
            .entry(Category::Languages)
            .or_default()
            .insert("k".repeat(u16::MAX as usize), Value::from("x"));
        let b = ResolvedBundle::from_parts(LocaleId::parse("en").unwrap(), entries);
        assert_eq!(deserialize(&serialize(&b).unwrap()).unwrap(), b);
    }
}
