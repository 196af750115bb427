//! Value wrappers understood by the tree writer
//!
//! - [`Commented`] attaches a comment to a value from inside a `Serialize`
//!   impl, for types whose comment depends on runtime state.
//! - [`RawConfig`] splices a pre-rendered config snippet into the tree.
//!
//! Both serialize as newtype structs with reserved names that
//! [`crate::TreeWriter`] recognises. Other serializers see a
//! `(comment, value)` tuple and a plain string respectively.

use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::de::{self, Deserialize, Deserializer, Visitor};
use serde::ser::{Serialize, Serializer};

pub(crate) const COMMENTED_TOKEN: &str = "$confbind::private::Commented";
pub(crate) const RAW_TOKEN: &str = "$confbind::private::RawConfig";

/// Value with a comment attached on write
///
/// Reading ignores comments, so a read `Commented` has an empty comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commented<T> {
    comment: String,
    value: T,
}

impl<T> Commented<T> {
    /// Wrap a value
    #[must_use]
    pub fn new(comment: impl Into<String>, value: T) -> Self {
        Self {
            comment: comment.into(),
            value,
        }
    }

    /// Comment text
    #[inline]
    #[must_use]
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Unwrap the value
    #[inline]
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> Deref for Commented<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for Commented<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: Serialize> Serialize for Commented<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct(COMMENTED_TOKEN, &(&self.comment, &self.value))
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Commented<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(|value| Self {
            comment: String::new(),
            value,
        })
    }
}

/// Config snippet spliced into the tree as parsed structure
///
/// A snippet that fails to parse is written as null. Reading produces the
/// JSON rendering of the subtree at that position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RawConfig(pub String);

impl RawConfig {
    /// Wrap snippet text
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Snippet text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Serialize for RawConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct(RAW_TOKEN, &self.0)
    }
}

impl<'de> Deserialize<'de> for RawConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_newtype_struct(RAW_TOKEN, RawVisitor)
    }
}

struct RawVisitor;

impl<'de> Visitor<'de> for RawVisitor {
    type Value = RawConfig;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("config text")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RawConfig, E> {
        Ok(RawConfig(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<RawConfig, E> {
        Ok(RawConfig(v))
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(self, d: D) -> Result<RawConfig, D::Error> {
        String::deserialize(d).map(RawConfig)
    }
}
