//! Ingestion of parsed source trees into [`RawRecord`]s.
//!
//! The XML reader is an external collaborator: it hands over one [`Node`]
//! tree per locale. Below the top element every child names a [`Category`];
//! below a category each element contributes one key segment (its `type`
//! attribute when present, otherwise its name) until a value is reached:
//!
//! | Element | Value |
//! |---------|-------|
//! | leaf with text (or empty) | `Value::String` |
//! | `kind="number"` | `Value::Number` |
//! | `kind="list"` | `Value::List` of the children |
//! | `kind="map"` | `Value::Map` keyed by child segment |
//!
//! Elements with an `alt` attribute, `alias` elements and, unless enabled,
//! `draft="unconfirmed"|"provisional"` elements are skipped.

use crate::{
    compile::CompileError,
    config::CompileConfig,
    locale::LocaleId,
    raw::{Category, RawRecord, Value},
};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use tracing::trace;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    #[inline]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Key segment contributed by this element.
    #[inline]
    fn segment(&self) -> &str {
        self.attribute("type").unwrap_or(&self.name)
    }

    #[inline]
    fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

/// `<name>text</name>`
pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Node {
    Node::new(name).text(text)
}

/// `<name kind="number">n</name>`
pub fn number(name: impl Into<String>, n: impl ToString) -> Node {
    Node::new(name).attr("kind", "number").text(n.to_string())
}

/// `<name kind="list"><item>…</item>…</name>`
pub fn list<S: AsRef<str>>(name: impl Into<String>, items: &[S]) -> Node {
    Node::new(name)
        .attr("kind", "list")
        .children(items.iter().map(|i| leaf("item", i.as_ref())))
}

/// One locale's parsed tree, named by its source tag (usually the file stem).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub tag: String,
    pub tree: Node,
}

impl Source {
    pub fn new(tag: impl Into<String>, tree: Node) -> Self {
        Self {
            tag: tag.into(),
            tree,
        }
    }
}

type Path<'n> = SmallVec<[&'n str; 8]>;

/// Flatten a source tree into a raw record.
pub fn ingest(source: &Source, config: &CompileConfig) -> Result<RawRecord, CompileError> {
    let locale = LocaleId::parse(&source.tag).map_err(|e| CompileError::Tag {
        tag: source.tag.clone(),
        source: e,
    })?;
    let mut ingest = Ingest {
        record: RawRecord::new(locale.clone()),
        config,
    };

    for child in &source.tree.children {
        if child.name == "identity" {
            check_identity(&locale, child)?;
            continue;
        }
        if ingest.skipped(child) {
            continue;
        }
        let category =
            Category::from_name(&child.name).ok_or_else(|| CompileError::UnknownCategory {
                locale: locale.clone(),
                name: child.name.clone(),
            })?;
        if child.has_text() {
            return Err(ingest.malformed(child, "category element holds text"));
        }
        let mut path = Path::new();
        for node in &child.children {
            ingest.walk(category, node, &mut path)?;
        }
    }

    trace!(locale = %locale, entries = ingest.record.len(), "ingested source tree");
    Ok(ingest.record)
}

struct Ingest<'c> {
    record: RawRecord,
    config: &'c CompileConfig,
}

impl Ingest<'_> {
    fn skipped(&self, node: &Node) -> bool {
        let skip = node.name == "alias"
            || node.attribute("alt").is_some()
            || (!self.config.include_unconfirmed
                && matches!(node.attribute("draft"), Some("unconfirmed" | "provisional")));
        if skip {
            trace!(locale = %self.record.locale(), element = %node.name, "skipping element");
        }
        skip
    }

    fn malformed(&self, node: &Node, reason: &'static str) -> CompileError {
        CompileError::Malformed {
            locale: self.record.locale().clone(),
            element: node.name.clone(),
            reason,
        }
    }

    fn walk<'n>(
        &mut self,
        category: Category,
        node: &'n Node,
        path: &mut Path<'n>,
    ) -> Result<(), CompileError> {
        if self.skipped(node) {
            return Ok(());
        }
        path.push(node.segment());
        match node.attribute("kind") {
            Some(_) => {
                let value = self.value(node, &path.join("."))?;
                self.record.insert(category, path.join("."), value)?;
            }
            None if node.children.is_empty() => {
                let text = node.text.clone().unwrap_or_default();
                self.record.insert(category, path.join("."), text)?;
            }
            None => {
                if node.has_text() {
                    return Err(self.malformed(node, "element holds both text and children"));
                }
                for child in &node.children {
                    self.walk(category, child, path)?;
                }
            }
        }
        path.pop();
        Ok(())
    }

    fn value(&self, node: &Node, key: &str) -> Result<Value, CompileError> {
        match node.attribute("kind") {
            Some("number") => {
                let text = node.text.as_deref().unwrap_or_default().trim();
                text.parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .map(Value::Number)
                    .ok_or_else(|| CompileError::InvalidNumber {
                        locale: self.record.locale().clone(),
                        key: key.to_owned(),
                        text: text.to_owned(),
                    })
            }
            Some("list") => {
                if node.has_text() {
                    return Err(self.malformed(node, "list element holds text"));
                }
                node.children
                    .iter()
                    .filter(|c| !self.skipped(c))
                    .map(|c| self.item(c, key))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::List)
            }
            Some("map") => {
                if node.has_text() {
                    return Err(self.malformed(node, "map element holds text"));
                }
                let mut map = BTreeMap::new();
                for child in node.children.iter().filter(|c| !self.skipped(c)) {
                    let segment = child.segment().to_owned();
                    let value = self.item(child, key)?;
                    if map.insert(segment.clone(), value).is_some() {
                        return Err(CompileError::Malformed {
                            locale: self.record.locale().clone(),
                            element: segment,
                            reason: "duplicate map key",
                        });
                    }
                }
                Ok(Value::Map(map))
            }
            Some(_) => Err(self.malformed(node, "unknown `kind` attribute")),
            None => Err(self.malformed(node, "element has no value kind")),
        }
    }

    /// A list item or map member: either a typed element or a text leaf.
    fn item(&self, node: &Node, key: &str) -> Result<Value, CompileError> {
        if node.attribute("kind").is_some() {
            return self.value(node, key);
        }
        if !node.children.is_empty() {
            return Err(self.malformed(node, "nested element without a value kind"));
        }
        Ok(Value::String(node.text.clone().unwrap_or_default()))
    }
}

fn check_identity(locale: &LocaleId, identity: &Node) -> Result<(), CompileError> {
    let mut parts: SmallVec<[&str; 4]> = SmallVec::new();
    for component in ["language", "script", "territory", "variant"] {
        if let Some(t) = identity
            .children
            .iter()
            .find(|c| c.name == component)
            .and_then(|c| c.attribute("type"))
        {
            parts.push(t);
        }
    }
    if parts.is_empty() {
        return Ok(());
    }
    let found = parts.join("_");
    match LocaleId::parse(&found) {
        Ok(declared) if &declared == locale => Ok(()),
        _ => Err(CompileError::IdentityMismatch {
            locale: locale.clone(),
            found,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingest_default(tag: &str, tree: Node) -> Result<RawRecord, CompileError> {
        ingest(&Source::new(tag, tree), &CompileConfig::default())
    }

    #[test]
    fn flattens_nested_elements_into_dotted_paths() {
        let tree = Node::new("ldml").child(
            Node::new("date").child(
                Node::new("calendar")
                    .attr("type", "gregorian")
                    .child(leaf("short", "d/M/y"))
                    .child(leaf("long", "d MMMM y")),
            ),
        );
        let r = ingest_default("en_GB", tree).unwrap();
        assert_eq!(r.get(Category::Date, "gregorian.short"), Some(&Value::from("d/M/y")));
        assert_eq!(r.get(Category::Date, "gregorian.long"), Some(&Value::from("d MMMM y")));
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn typed_values() {
        let tree = Node::new("ldml")
            .child(Node::new("week").child(number("first_day", 1)))
            .child(Node::new("currency-symbols").child(list("USD", &["US$", "$"])))
            .child(
                Node::new("currencies").child(
                    Node::new("USD")
                        .attr("kind", "map")
                        .child(leaf("symbol", "$"))
                        .child(number("digits", 2)),
                ),
            );
        let r = ingest_default("en", tree).unwrap();
        assert_eq!(r.get(Category::Week, "first_day"), Some(&Value::Number(1.0)));
        assert_eq!(
            r.get(Category::CurrencySymbols, "USD").and_then(Value::string_list),
            Some(vec!["US$", "$"])
        );
        let map = r.get(Category::Currencies, "USD").and_then(Value::as_map).unwrap();
        assert_eq!(map.get("digits"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn skips_alternates_aliases_and_drafts() {
        let tree = Node::new("ldml").child(
            Node::new("languages")
                .child(leaf("en", "English"))
                .child(leaf("en", "Anglais").attr("alt", "short"))
                .child(leaf("de", "German").attr("draft", "unconfirmed"))
                .child(Node::new("alias").attr("source", "locale")),
        );
        let r = ingest_default("en", tree.clone()).unwrap();
        assert_eq!(r.len(), 1);

        let config = CompileConfig {
            include_unconfirmed: true,
            ..Default::default()
        };
        let r = ingest(&Source::new("en", tree), &config).unwrap();
        assert_eq!(r.get(Category::Languages, "de"), Some(&Value::from("German")));
    }

    #[test]
    fn reports_malformed_input() {
        let unknown = Node::new("ldml").child(Node::new("dates"));
        assert!(matches!(
            ingest_default("en", unknown),
            Err(CompileError::UnknownCategory { .. })
        ));

        let bad_number = Node::new("ldml").child(Node::new("week").child(number("min_days", "x")));
        assert!(matches!(
            ingest_default("en", bad_number),
            Err(CompileError::InvalidNumber { .. })
        ));

        let mixed = Node::new("ldml").child(
            Node::new("date").child(Node::new("gregorian").text("oops").child(leaf("short", "y"))),
        );
        assert!(matches!(
            ingest_default("en", mixed),
            Err(CompileError::Malformed { .. })
        ));

        assert!(matches!(
            ingest_default("en__", Node::new("ldml")),
            Err(CompileError::Tag { .. })
        ));
    }

    #[test]
    fn identity_must_agree_with_tag() {
        let identity = |lang: &str, terr: &str| {
            Node::new("ldml").child(
                Node::new("identity")
                    .child(Node::new("language").attr("type", lang))
                    .child(Node::new("territory").attr("type", terr)),
            )
        };
        assert!(ingest_default("en_GB", identity("en", "GB")).is_ok());
        assert!(matches!(
            ingest_default("en_GB", identity("en", "US")),
            Err(CompileError::IdentityMismatch { .. })
        ));
    }
}
