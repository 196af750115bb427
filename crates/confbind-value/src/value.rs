//! Config tree values
//!
//! A [`ConfigValue`] is one node of a parsed or generated configuration tree:
//! a [`ValueKind`] plus presentation metadata (attached comments and the
//! [`Origin`] of the node). Equality only looks at the kind, so a tree read
//! back from text equals the tree it was rendered from.

use std::fmt::{self, Display, Formatter};

use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::number::Number;

/// Insertion-ordered map of config entries
pub type ConfigMap = IndexMap<String, ConfigValue>;

/// Where a node came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Built in memory from a Rust value
    #[default]
    Hardcoded,
    /// Decoded from a config document
    Text,
}

impl Origin {
    /// Human-readable description used for origin comments
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Hardcoded => "hardcoded value",
            Self::Text => "from text",
        }
    }
}

/// Shape of a config node
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ValueKind {
    /// Explicit null / absent value
    #[default]
    Null,
    /// Boolean scalar
    Bool(bool),
    /// Numeric scalar
    Number(Number),
    /// String scalar
    String(String),
    /// Ordered object
    Map(ConfigMap),
    /// Ordered list
    List(Vec<ConfigValue>),
}

impl ValueKind {
    /// Short lowercase name of the shape, for diagnostics
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Map(_) => "object",
            Self::List(_) => "list",
        }
    }
}

/// Node of a config tree
#[derive(Debug, Clone, Default)]
pub struct ConfigValue {
    kind: ValueKind,
    comments: Vec<String>,
    origin: Origin,
}

impl ConfigValue {
    /// Create a hardcoded node
    #[inline]
    #[must_use]
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            comments: Vec::new(),
            origin: Origin::Hardcoded,
        }
    }

    /// Null node
    #[inline]
    #[must_use]
    pub fn null() -> Self {
        Self::new(ValueKind::Null)
    }

    /// Replace the origin
    #[inline]
    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// Append a comment
    #[inline]
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comments.push(comment.into());
        self
    }

    /// Node shape
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    /// Mutable node shape
    #[inline]
    pub fn kind_mut(&mut self) -> &mut ValueKind {
        &mut self.kind
    }

    /// Consume the node, returning its shape
    #[inline]
    #[must_use]
    pub fn into_kind(self) -> ValueKind {
        self.kind
    }

    /// Comments attached to this node, in order
    #[inline]
    #[must_use]
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// Mutable comment list
    #[inline]
    pub fn comments_mut(&mut self) -> &mut Vec<String> {
        &mut self.comments
    }

    /// Node origin
    #[inline]
    #[must_use]
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Check for null
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self.kind, ValueKind::Null)
    }

    /// Boolean view
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            ValueKind::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Number view
    #[must_use]
    pub fn as_number(&self) -> Option<Number> {
        match self.kind {
            ValueKind::Number(n) => Some(n),
            _ => None,
        }
    }

    /// String view
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ValueKind::String(s) => Some(s),
            _ => None,
        }
    }

    /// Map view
    #[must_use]
    pub fn as_map(&self) -> Option<&ConfigMap> {
        match &self.kind {
            ValueKind::Map(m) => Some(m),
            _ => None,
        }
    }

    /// List view
    #[must_use]
    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match &self.kind {
            ValueKind::List(l) => Some(l),
            _ => None,
        }
    }

    /// Look up a direct child of a map node
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Look up a nested child by dot-separated keys
    ///
    /// List elements are addressed by their decimal index.
    #[must_use]
    pub fn lookup(&self, dotted: &str) -> Option<&ConfigValue> {
        dotted.split('.').try_fold(self, |node, segment| match &node.kind {
            ValueKind::Map(m) => m.get(segment),
            ValueKind::List(l) => segment.parse::<usize>().ok().and_then(|i| l.get(i)),
            _ => None,
        })
    }

    /// Set the origin of this node and every descendant
    pub fn set_origin_recursive(&mut self, origin: Origin) {
        self.origin = origin;
        match &mut self.kind {
            ValueKind::Map(m) => m.values_mut().for_each(|v| v.set_origin_recursive(origin)),
            ValueKind::List(l) => l.iter_mut().for_each(|v| v.set_origin_recursive(origin)),
            _ => {}
        }
    }
}

impl PartialEq for ConfigValue {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl From<ValueKind> for ConfigValue {
    fn from(kind: ValueKind) -> Self {
        Self::new(kind)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::new(ValueKind::Bool(value))
    }
}

impl From<Number> for ConfigValue {
    fn from(value: Number) -> Self {
        Self::new(ValueKind::Number(value))
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Number::from(value).into()
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        Number::from(value).into()
    }
}

impl From<u64> for ConfigValue {
    fn from(value: u64) -> Self {
        Number::from(value).into()
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        Number::from(value).into()
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::new(ValueKind::String(value.to_string()))
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::new(ValueKind::String(value))
    }
}

impl From<ConfigMap> for ConfigValue {
    fn from(value: ConfigMap) -> Self {
        Self::new(ValueKind::Map(value))
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(value: Vec<ConfigValue>) -> Self {
        Self::new(ValueKind::List(value))
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for ConfigValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let map: ConfigMap = iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        map.into()
    }
}

/// Compact stringification
///
/// Strings print without quotes, lists as `[a, b]` and maps as `{k: v}`.
/// This is the form substituted into comment templates.
impl Display for ConfigValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValueKind::Null => f.write_str("null"),
            ValueKind::Bool(b) => write!(f, "{b}"),
            ValueKind::Number(n) => write!(f, "{n}"),
            ValueKind::String(s) => f.write_str(s),
            ValueKind::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            ValueKind::Map(map) => {
                f.write_str("{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {item}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.kind {
            ValueKind::Null => serializer.serialize_unit(),
            ValueKind::Bool(b) => serializer.serialize_bool(*b),
            ValueKind::Number(Number::Int(i)) => serializer.serialize_i64(*i),
            ValueKind::Number(Number::UInt(u)) => serializer.serialize_u64(*u),
            ValueKind::Number(Number::Float(v)) => serializer.serialize_f64(*v),
            ValueKind::String(s) => serializer.serialize_str(s),
            ValueKind::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ValueKind::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, item) in map {
                    out.serialize_entry(key, item)?;
                }
                out.end()
            }
        }
    }
}

/// Decoded values are tagged [`Origin::Text`]
impl<'de> Deserialize<'de> for ConfigValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl ValueVisitor {
    fn text(kind: ValueKind) -> ConfigValue {
        ConfigValue::new(kind).with_origin(Origin::Text)
    }
}

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = ConfigValue;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a config value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Self::text(ValueKind::Bool(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Self::text(ValueKind::Number(Number::Int(v))))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Self::text(ValueKind::Number(Number::from(v))))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Self::text(ValueKind::Number(Number::Float(v))))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Self::text(ValueKind::String(v.to_string())))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Self::text(ValueKind::String(v)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Self::text(ValueKind::Null))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Self::text(ValueKind::Null))
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<ConfigValue>()? {
            items.push(item);
        }
        Ok(Self::text(ValueKind::List(items)))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = ConfigMap::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(key) = access.next_key::<String>()? {
            let item = access.next_value::<ConfigValue>()?;
            map.insert(key, item);
        }
        Ok(Self::text(ValueKind::Map(map)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConfigValue {
        ConfigValue::from_iter([
            ("name", ConfigValue::from("demo")),
            (
                "ports",
                ConfigValue::from(vec![ConfigValue::from(80), ConfigValue::from(443)]),
            ),
            ("nested", ConfigValue::from_iter([("on", true)])),
        ])
    }

    #[test]
    fn equality_ignores_metadata() {
        let plain = ConfigValue::from("x");
        let annotated = ConfigValue::from("x")
            .with_comment("note")
            .with_origin(Origin::Text);
        assert_eq!(plain, annotated);
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(
            sample().to_string(),
            "{name: demo, ports: [80, 443], nested: {on: true}}"
        );
        assert_eq!(ConfigValue::null().to_string(), "null");
    }

    #[test]
    fn map_keeps_insertion_order() {
        let value = sample();
        let keys: Vec<_> = value.as_map().map(|m| m.keys().cloned().collect()).unwrap_or_default();
        assert_eq!(keys, ["name", "ports", "nested"]);
    }

    #[test]
    fn lookup_walks_maps_and_lists() {
        let value = sample();
        assert_eq!(value.lookup("ports.1"), Some(&ConfigValue::from(443)));
        assert_eq!(value.lookup("nested.on"), Some(&ConfigValue::from(true)));
        assert_eq!(value.lookup("nested.off"), None);
        assert_eq!(value.lookup("name.deeper"), None);
    }

    #[test]
    fn origin_applies_to_descendants() {
        let mut value = sample();
        value.set_origin_recursive(Origin::Text);
        assert_eq!(value.origin(), Origin::Text);
        assert_eq!(value.lookup("nested.on").map(ConfigValue::origin), Some(Origin::Text));
    }

    #[test]
    fn type_names() {
        assert_eq!(ValueKind::Null.type_name(), "null");
        assert_eq!(sample().kind().type_name(), "object");
    }
}
