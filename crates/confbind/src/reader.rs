//! Tree reader
//!
//! [`TreeReader`] walks a [`ConfigValue`] as a forward-only pull token stream
//! and is a serde [`Deserializer`], so any `Deserialize` type can be read
//! from a tree.
//!
//! The cursor is an explicit stack of frames, one per open container. Scalar
//! consumers and [`TreeReader::next_name`] advance the cursor; closing a
//! container pops its frame and advances the parent past it. Inside an object
//! the reader alternates between a name position and a value position, so
//! names and values always interleave one-for-one.
//!
//! Map keys that are not strings (`BTreeMap<u32, _>`) are read through key
//! mode: [`TreeReader::begin_key_read`] makes the next scalar consumer yield
//! the pending key instead of the value.

use std::fmt::{self, Display, Formatter};

use confbind_value::{render, ConfigMap, ConfigValue, Number, RenderOptions, ValueKind};
use serde::de::value::StringDeserializer;
use serde::de::{
    self, DeserializeSeed, Deserializer, EnumAccess, IntoDeserializer, MapAccess, SeqAccess,
    VariantAccess, Visitor,
};

use crate::commented::RAW_TOKEN;
use crate::error::{Error, Result};
use crate::field::{BoundField, FieldTable};
use crate::handler::FieldPipeline;
use crate::path::FieldPath;

/// Kind of the next token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// Start of a map
    BeginObject,
    /// End of the current map
    EndObject,
    /// Start of a list
    BeginArray,
    /// End of the current list
    EndArray,
    /// Object key
    Name,
    /// String scalar
    String,
    /// Numeric scalar
    Number,
    /// Boolean scalar
    Bool,
    /// Null
    Null,
    /// Root value consumed
    EndDocument,
}

impl Token {
    fn of(value: &ConfigValue) -> Self {
        match value.kind() {
            ValueKind::Null => Self::Null,
            ValueKind::Bool(_) => Self::Bool,
            ValueKind::Number(_) => Self::Number,
            ValueKind::String(_) => Self::String,
            ValueKind::Map(_) => Self::BeginObject,
            ValueKind::List(_) => Self::BeginArray,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BeginObject => "BEGIN_OBJECT",
            Self::EndObject => "END_OBJECT",
            Self::BeginArray => "BEGIN_ARRAY",
            Self::EndArray => "END_ARRAY",
            Self::Name => "NAME",
            Self::String => "STRING",
            Self::Number => "NUMBER",
            Self::Bool => "BOOLEAN",
            Self::Null => "NULL",
            Self::EndDocument => "END_DOCUMENT",
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Frame<'a> {
    Object {
        map: &'a ConfigMap,
        pos: usize,
        name_read: bool,
        key_mode: bool,
    },
    Array {
        items: &'a [ConfigValue],
        pos: usize,
    },
}

/// Pull adapter over a config tree
#[derive(Debug)]
pub struct TreeReader<'a> {
    root: Option<&'a ConfigValue>,
    stack: Vec<Frame<'a>>,
    base: FieldPath,
    pipeline: Option<&'a FieldPipeline>,
}

impl<'a> TreeReader<'a> {
    /// Create reader without field interception
    #[must_use]
    pub fn new(value: &'a ConfigValue) -> Self {
        Self {
            root: Some(value),
            stack: Vec::new(),
            base: FieldPath::root(),
            pipeline: None,
        }
    }

    /// Create reader running bound fields through `pipeline`
    #[must_use]
    pub fn with_pipeline(value: &'a ConfigValue, pipeline: &'a FieldPipeline) -> Self {
        Self {
            pipeline: Some(pipeline),
            ..Self::new(value)
        }
    }

    fn nested(value: &'a ConfigValue, base: FieldPath, pipeline: &'a FieldPipeline) -> Self {
        Self {
            root: Some(value),
            stack: Vec::new(),
            base,
            pipeline: Some(pipeline),
        }
    }

    /// Kind of the next token
    #[must_use]
    pub fn peek(&self) -> Token {
        match self.stack.last().copied() {
            None => self.root.map_or(Token::EndDocument, Token::of),
            Some(Frame::Object {
                map,
                pos,
                name_read,
                key_mode,
            }) => match map.get_index(pos) {
                None => Token::EndObject,
                Some(_) if key_mode => Token::String,
                Some((_, value)) if name_read => Token::of(value),
                Some(_) => Token::Name,
            },
            Some(Frame::Array { items, pos }) => items.get(pos).map_or(Token::EndArray, Token::of),
        }
    }

    /// Check if the current container has another element
    #[must_use]
    pub fn has_next(&self) -> bool {
        match self.stack.last().copied() {
            None => self.root.is_some(),
            Some(Frame::Object { map, pos, .. }) => pos < map.len(),
            Some(Frame::Array { items, pos }) => pos < items.len(),
        }
    }

    /// Current position
    #[must_use]
    pub fn path(&self) -> FieldPath {
        let mut path = self.base.clone();
        for frame in &self.stack {
            match *frame {
                Frame::Object { map, pos, .. } => {
                    if let Some((key, _)) = map.get_index(pos) {
                        path.push_key(key.as_str());
                    }
                }
                Frame::Array { pos, .. } => path.push_index(pos),
            }
        }
        path
    }

    /// Enter the object at the cursor
    ///
    /// # Errors
    ///
    /// Fails if the cursor is not on an object value.
    pub fn begin_object(&mut self) -> Result<()> {
        let value = self.current()?;
        match value.kind() {
            ValueKind::Map(map) => {
                self.stack.push(Frame::Object {
                    map,
                    pos: 0,
                    name_read: false,
                    key_mode: false,
                });
                Ok(())
            }
            _ => Err(self.invalid_type("object", value)),
        }
    }

    /// Leave the current object and advance past it
    ///
    /// # Errors
    ///
    /// Fails if the current container is not an object or still has entries.
    pub fn end_object(&mut self) -> Result<()> {
        match self.stack.last().copied() {
            Some(Frame::Object { map, pos, .. }) if pos >= map.len() => {
                self.stack.pop();
                self.advance();
                Ok(())
            }
            _ => Err(self.unexpected("END_OBJECT", self.peek())),
        }
    }

    /// Enter the list at the cursor
    ///
    /// # Errors
    ///
    /// Fails if the cursor is not on a list value.
    pub fn begin_array(&mut self) -> Result<()> {
        let value = self.current()?;
        match value.kind() {
            ValueKind::List(items) => {
                self.stack.push(Frame::Array { items, pos: 0 });
                Ok(())
            }
            _ => Err(self.invalid_type("list", value)),
        }
    }

    /// Leave the current list and advance past it
    ///
    /// # Errors
    ///
    /// Fails if the current container is not a list or still has elements.
    pub fn end_array(&mut self) -> Result<()> {
        match self.stack.last().copied() {
            Some(Frame::Array { items, pos }) if pos >= items.len() => {
                self.stack.pop();
                self.advance();
                Ok(())
            }
            _ => Err(self.unexpected("END_ARRAY", self.peek())),
        }
    }

    /// Consume the next object key
    ///
    /// # Errors
    ///
    /// Fails on root and list frames, past the end of the object, or when
    /// the key was already consumed.
    pub fn next_name(&mut self) -> Result<String> {
        let (map, pos, name_read, key_mode) = self.object_frame()?;
        match map.get_index(pos) {
            Some((key, _)) if !name_read && !key_mode => {
                self.set_cursor(true, false);
                Ok(key.clone())
            }
            Some(_) => Err(self.unexpected("NAME", self.peek())),
            None => Err(self.end_of_container()),
        }
    }

    /// Make the next scalar consumer yield the pending key
    ///
    /// Key mode ends after one read and leaves the cursor on the value.
    ///
    /// # Errors
    ///
    /// Fails unless the cursor is on an unread object key.
    pub fn begin_key_read(&mut self) -> Result<()> {
        let (map, pos, name_read, key_mode) = self.object_frame()?;
        match map.get_index(pos) {
            Some(_) if !name_read && !key_mode => {
                self.set_cursor(false, true);
                Ok(())
            }
            Some(_) => Err(self.unexpected("NAME", self.peek())),
            None => Err(self.end_of_container()),
        }
    }

    /// Consume a string; numbers and booleans are stringified
    ///
    /// # Errors
    ///
    /// Fails past the end of a container or on null and container values.
    pub fn next_string(&mut self) -> Result<String> {
        if let Some(key) = self.take_key() {
            return Ok(key);
        }
        let value = self.current()?;
        let text = match value.kind() {
            ValueKind::String(s) => s.clone(),
            ValueKind::Number(n) => n.to_string(),
            ValueKind::Bool(b) => b.to_string(),
            _ => return Err(self.invalid_type("string", value)),
        };
        self.advance();
        Ok(text)
    }

    /// Consume a boolean; strings are parsed
    ///
    /// # Errors
    ///
    /// Fails past the end of a container, on non-boolean values, and on
    /// strings other than `true` and `false`.
    pub fn next_bool(&mut self) -> Result<bool> {
        if let Some(key) = self.take_key() {
            return key.parse().map_err(|_| self.invalid_scalar("boolean", key));
        }
        let value = self.current()?;
        let parsed = match value.kind() {
            ValueKind::Bool(b) => *b,
            ValueKind::String(s) => s
                .parse()
                .map_err(|_| self.invalid_scalar("boolean", s.clone()))?,
            _ => return Err(self.invalid_type("boolean", value)),
        };
        self.advance();
        Ok(parsed)
    }

    /// Consume a number; strings are parsed
    ///
    /// # Errors
    ///
    /// Fails past the end of a container, on non-numeric values, and on
    /// strings that are not numbers.
    pub fn next_number(&mut self) -> Result<Number> {
        if let Some(key) = self.take_key() {
            return key.parse().map_err(|_| self.invalid_scalar("number", key));
        }
        let value = self.current()?;
        let parsed = match value.kind() {
            ValueKind::Number(n) => *n,
            ValueKind::String(s) => s
                .parse()
                .map_err(|_| self.invalid_scalar("number", s.clone()))?,
            _ => return Err(self.invalid_type("number", value)),
        };
        self.advance();
        Ok(parsed)
    }

    /// Consume a null
    ///
    /// # Errors
    ///
    /// Fails past the end of a container or on any other value.
    pub fn next_null(&mut self) -> Result<()> {
        let value = self.current()?;
        if !value.is_null() {
            return Err(self.invalid_type("null", value));
        }
        self.advance();
        Ok(())
    }

    /// Skip the next element
    ///
    /// On an object key this skips the key and its value. Containers are
    /// skipped whole.
    ///
    /// # Errors
    ///
    /// Fails past the end of a container.
    pub fn skip_value(&mut self) -> Result<()> {
        if self.take_key().is_some() {
            return Ok(());
        }
        if let Some(Frame::Object {
            map,
            pos,
            name_read: false,
            ..
        }) = self.stack.last().copied()
        {
            if pos < map.len() {
                self.advance();
                return Ok(());
            }
        }
        self.current()?;
        self.advance();
        Ok(())
    }

    /// Check that the whole document was consumed
    ///
    /// # Errors
    ///
    /// Fails if containers are still open or the root value was not read.
    pub fn finish(&self) -> Result<()> {
        match self.peek() {
            Token::EndDocument if self.stack.is_empty() => Ok(()),
            found => Err(self.unexpected("END_DOCUMENT", found)),
        }
    }

    /// Value at the cursor, without consuming it
    fn current(&self) -> Result<&'a ConfigValue> {
        match self.stack.last().copied() {
            None => self.root.ok_or_else(|| self.end_of_container()),
            Some(Frame::Object {
                map,
                pos,
                name_read,
                key_mode,
            }) => match map.get_index(pos) {
                Some((_, value)) if name_read && !key_mode => Ok(value),
                Some(_) => Err(self.unexpected("value", self.peek())),
                None => Err(self.end_of_container()),
            },
            Some(Frame::Array { items, pos }) => {
                items.get(pos).ok_or_else(|| self.end_of_container())
            }
        }
    }

    fn advance(&mut self) {
        match self.stack.last_mut() {
            None => self.root = None,
            Some(Frame::Object { pos, .. } | Frame::Array { pos, .. }) => *pos += 1,
        }
        self.set_cursor(false, false);
    }

    fn take_key(&mut self) -> Option<String> {
        let Some(Frame::Object {
            map,
            pos,
            key_mode: true,
            ..
        }) = self.stack.last().copied()
        else {
            return None;
        };
        let (key, _) = map.get_index(pos)?;
        self.set_cursor(true, false);
        Some(key.clone())
    }

    fn object_frame(&self) -> Result<(&'a ConfigMap, usize, bool, bool)> {
        match self.stack.last().copied() {
            None => Err(Error::NoName { frame: "root" }),
            Some(Frame::Array { .. }) => Err(Error::NoName { frame: "array" }),
            Some(Frame::Object {
                map,
                pos,
                name_read,
                key_mode,
            }) => Ok((map, pos, name_read, key_mode)),
        }
    }

    fn set_cursor(&mut self, name: bool, key: bool) {
        if let Some(Frame::Object {
            name_read,
            key_mode,
            ..
        }) = self.stack.last_mut()
        {
            *name_read = name;
            *key_mode = key;
        }
    }

    fn end_of_container(&self) -> Error {
        Error::EndOfContainer { path: self.path() }
    }

    fn unexpected(&self, expected: &'static str, found: Token) -> Error {
        Error::UnexpectedToken {
            path: self.path(),
            expected,
            found,
        }
    }

    fn invalid_type(&self, expected: &'static str, value: &ConfigValue) -> Error {
        Error::InvalidType {
            path: self.path(),
            expected,
            found: Token::of(value),
        }
    }

    fn invalid_scalar(&self, expected: &'static str, text: String) -> Error {
        Error::InvalidScalar {
            path: self.path(),
            expected,
            text,
        }
    }

    fn visit_number<'de, V: Visitor<'de>>(&mut self, visitor: V) -> Result<V::Value> {
        match self.next_number()? {
            Number::Int(i) => visitor.visit_i64(i),
            Number::UInt(u) => visitor.visit_u64(u),
            Number::Float(f) => visitor.visit_f64(f),
        }
    }

    fn raw_text(&mut self) -> Result<String> {
        let value = self.current()?;
        let text = render(value, &RenderOptions::json());
        self.advance();
        Ok(text.trim_end().to_string())
    }
}

impl<'de> Deserializer<'de> for &mut TreeReader<'_> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.peek() {
            Token::BeginObject => self.deserialize_map(visitor),
            Token::BeginArray => self.deserialize_seq(visitor),
            Token::String => visitor.visit_string(self.next_string()?),
            Token::Number => self.visit_number(visitor),
            Token::Bool => visitor.visit_bool(self.next_bool()?),
            Token::Null => {
                self.next_null()?;
                visitor.visit_unit()
            }
            Token::Name => visitor.visit_string(self.next_name()?),
            Token::EndObject | Token::EndArray | Token::EndDocument => {
                Err(self.end_of_container())
            }
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_bool(self.next_bool()?)
    }

    fn deserialize_i8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.visit_number(visitor)
    }

    fn deserialize_i16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.visit_number(visitor)
    }

    fn deserialize_i32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.visit_number(visitor)
    }

    fn deserialize_i64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.visit_number(visitor)
    }

    fn deserialize_i128<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.visit_number(visitor)
    }

    fn deserialize_u8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.visit_number(visitor)
    }

    fn deserialize_u16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.visit_number(visitor)
    }

    fn deserialize_u32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.visit_number(visitor)
    }

    fn deserialize_u64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.visit_number(visitor)
    }

    fn deserialize_u128<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.visit_number(visitor)
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.visit_number(visitor)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.visit_number(visitor)
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_string(self.next_string()?)
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_string(self.next_string()?)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_string(self.next_string()?)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.peek() {
            Token::BeginArray => self.deserialize_seq(visitor),
            _ => visitor.visit_byte_buf(self.next_string()?.into_bytes()),
        }
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        if self.peek() == Token::Null {
            self.next_null()?;
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.next_null()?;
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        if name == RAW_TOKEN {
            return visitor.visit_string(self.raw_text()?);
        }
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.begin_array()?;
        let value = visitor.visit_seq(SeqReader { reader: &mut *self })?;
        self.end_array()?;
        Ok(value)
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.begin_object()?;
        let value = visitor.visit_map(MapReader { reader: &mut *self })?;
        self.end_object()?;
        Ok(value)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        self.begin_object()?;
        let table = self
            .pipeline
            .and_then(|p| p.table(name))
            .filter(|t| t.matches(fields));
        let value = visitor.visit_map(StructReader {
            reader: &mut *self,
            table,
            field: None,
        })?;
        self.end_object()?;
        Ok(value)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self.peek() {
            Token::String => {
                let variant: StringDeserializer<Error> = self.next_string()?.into_deserializer();
                visitor.visit_enum(variant)
            }
            Token::BeginObject => {
                self.begin_object()?;
                let variant = self.next_name()?;
                let value = visitor.visit_enum(EnumReader {
                    reader: &mut *self,
                    variant,
                })?;
                self.end_object()?;
                Ok(value)
            }
            found => Err(Error::InvalidType {
                path: self.path(),
                expected: "enum",
                found,
            }),
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        if self.peek() == Token::Name {
            visitor.visit_string(self.next_name()?)
        } else {
            visitor.visit_string(self.next_string()?)
        }
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.skip_value()?;
        visitor.visit_unit()
    }
}

struct SeqReader<'r, 'a> {
    reader: &'r mut TreeReader<'a>,
}

impl<'de> SeqAccess<'de> for SeqReader<'_, '_> {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        if !self.reader.has_next() {
            return Ok(None);
        }
        seed.deserialize(&mut *self.reader).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        match self.reader.stack.last() {
            Some(Frame::Array { items, pos }) => Some(items.len().saturating_sub(*pos)),
            _ => None,
        }
    }
}

struct MapReader<'r, 'a> {
    reader: &'r mut TreeReader<'a>,
}

impl<'de> MapAccess<'de> for MapReader<'_, '_> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        if !self.reader.has_next() {
            return Ok(None);
        }
        self.reader.begin_key_read()?;
        seed.deserialize(&mut *self.reader).map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        seed.deserialize(&mut *self.reader)
    }
}

/// Reads struct fields, running bound fields through the pipeline
struct StructReader<'r, 'a> {
    reader: &'r mut TreeReader<'a>,
    table: Option<&'a FieldTable>,
    field: Option<&'a BoundField>,
}

impl<'de> MapAccess<'de> for StructReader<'_, '_> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        while self.reader.has_next() {
            let name = self.reader.next_name()?;
            self.field = self.table.and_then(|t| t.get(&name));
            let key = match self.field {
                Some(field) if !field.deserializes() => {
                    self.reader.skip_value()?;
                    continue;
                }
                Some(field) => field.name().to_string(),
                None => name,
            };
            let key: StringDeserializer<Error> = key.into_deserializer();
            return seed.deserialize(key).map(Some);
        }
        Ok(None)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        let (Some(field), Some(pipeline)) = (self.field.take(), self.reader.pipeline) else {
            return seed.deserialize(&mut *self.reader);
        };
        let path = self.reader.path();
        let raw = self.reader.current()?;
        match pipeline.read_field(field, &path, raw)? {
            None => seed.deserialize(&mut *self.reader),
            Some(replacement) => {
                self.reader.skip_value()?;
                let mut sub = TreeReader::nested(&replacement, path, pipeline);
                let value = seed.deserialize(&mut sub)?;
                sub.finish()?;
                Ok(value)
            }
        }
    }
}

struct EnumReader<'r, 'a> {
    reader: &'r mut TreeReader<'a>,
    variant: String,
}

impl<'de, 'r, 'a> EnumAccess<'de> for EnumReader<'r, 'a> {
    type Error = Error;
    type Variant = VariantReader<'r, 'a>;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self::Variant)> {
        let variant: StringDeserializer<Error> = self.variant.into_deserializer();
        let value = seed.deserialize(variant)?;
        Ok((value, VariantReader { reader: self.reader }))
    }
}

struct VariantReader<'r, 'a> {
    reader: &'r mut TreeReader<'a>,
}

impl<'de> VariantAccess<'de> for VariantReader<'_, '_> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        self.reader.next_null()
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        seed.deserialize(&mut *self.reader)
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_seq(&mut *self.reader, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        de::Deserializer::deserialize_map(&mut *self.reader, visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::RawConfig;
    use confbind_value::parse_str;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use std::collections::{BTreeMap, HashMap};

    fn tree(text: &str) -> ConfigValue {
        parse_str(text).expect("valid document")
    }

    #[test]
    fn names_and_values_interleave() {
        let value = tree(r#"{"key1": 1, "key2": 2}"#);
        let mut r = TreeReader::new(&value);
        assert_eq!(r.peek(), Token::BeginObject);
        r.begin_object().unwrap();

        let mut seen = Vec::new();
        while r.has_next() {
            seen.push(r.peek());
            r.next_name().unwrap();
            seen.push(r.peek());
            r.next_number().unwrap();
        }
        seen.push(r.peek());
        assert_eq!(
            seen,
            [Token::Name, Token::Number, Token::Name, Token::Number, Token::EndObject]
        );
        r.end_object().unwrap();
        assert_eq!(r.peek(), Token::EndDocument);
        r.finish().unwrap();
    }

    #[test]
    fn token_sequence_with_values() {
        let value = tree(r#"{"key1": 1, "key2": 2}"#);
        let mut r = TreeReader::new(&value);
        r.begin_object().unwrap();
        assert_eq!(r.next_name().unwrap(), "key1");
        assert_eq!(r.next_number().unwrap(), Number::Int(1));
        assert_eq!(r.next_name().unwrap(), "key2");
        assert_eq!(r.next_number().unwrap(), Number::Int(2));
        assert!(!r.has_next());
        assert_eq!(r.peek(), Token::EndObject);
        r.end_object().unwrap();
    }

    #[test]
    fn empty_map() {
        let value = tree("{}");
        let mut r = TreeReader::new(&value);
        r.begin_object().unwrap();
        assert!(!r.has_next());
        assert_eq!(r.peek(), Token::EndObject);
        r.end_object().unwrap();
        r.finish().unwrap();
    }

    #[test]
    fn empty_list() {
        let value = tree("[]");
        let mut r = TreeReader::new(&value);
        r.begin_array().unwrap();
        assert!(!r.has_next());
        assert_eq!(r.peek(), Token::EndArray);
        r.end_array().unwrap();
        r.finish().unwrap();
    }

    #[test]
    fn closing_container_advances_parent() {
        let value = tree("[[1], [], [2, 3]]");
        let mut r = TreeReader::new(&value);
        r.begin_array().unwrap();
        let mut sums = Vec::new();
        while r.has_next() {
            r.begin_array().unwrap();
            let mut sum = 0;
            while r.has_next() {
                sum += r.next_number().unwrap().as_i64().unwrap();
            }
            r.end_array().unwrap();
            sums.push(sum);
        }
        r.end_array().unwrap();
        assert_eq!(sums, [1, 0, 5]);
    }

    #[test]
    fn name_on_root_or_array_fails() {
        let value = tree("[1]");
        let mut r = TreeReader::new(&value);
        assert!(matches!(r.next_name(), Err(Error::NoName { frame: "root" })));
        r.begin_array().unwrap();
        let err = r.next_name().unwrap_err();
        assert_eq!(err.to_string(), "array node has no name property");
    }

    #[test]
    fn consuming_past_end_fails() {
        let value = tree("a: 1");
        let mut r = TreeReader::new(&value);
        r.begin_object().unwrap();
        r.next_name().unwrap();
        r.next_number().unwrap();
        let err = r.next_name().unwrap_err();
        assert!(matches!(err, Error::EndOfContainer { .. }));
        assert_eq!(err.kind(), ErrorKind::Io);
        r.end_object().unwrap();
        assert!(matches!(r.next_string(), Err(Error::EndOfContainer { .. })));
    }

    #[test]
    fn value_before_name_fails() {
        let value = tree("a: 1");
        let mut r = TreeReader::new(&value);
        r.begin_object().unwrap();
        let err = r.next_number().unwrap_err();
        assert!(matches!(err, Error::UnexpectedToken { found: Token::Name, .. }));
    }

    #[test]
    fn end_with_remaining_entries_fails() {
        let value = tree("a: 1");
        let mut r = TreeReader::new(&value);
        r.begin_object().unwrap();
        assert!(matches!(r.end_object(), Err(Error::UnexpectedToken { .. })));
        assert!(matches!(r.end_array(), Err(Error::UnexpectedToken { .. })));
    }

    #[test]
    fn scalars_coerce_from_strings() {
        let value = tree("n: '42'\nb: 'true'\nf: '2.5'\nbad: forty\ns: 7\n");
        let mut r = TreeReader::new(&value);
        r.begin_object().unwrap();
        r.next_name().unwrap();
        assert_eq!(r.next_number().unwrap(), Number::Int(42));
        r.next_name().unwrap();
        assert!(r.next_bool().unwrap());
        r.next_name().unwrap();
        assert_eq!(r.next_number().unwrap(), Number::Float(2.5));
        r.next_name().unwrap();
        let err = r.next_number().unwrap_err();
        assert_eq!(err.to_string(), "invalid number at $.bad: 'forty'");
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn stringifies_scalars() {
        let value = tree("[7, true]");
        let mut r = TreeReader::new(&value);
        r.begin_array().unwrap();
        assert_eq!(r.next_string().unwrap(), "7");
        assert_eq!(r.next_string().unwrap(), "true");
    }

    #[test]
    fn key_mode_reads_key_as_scalar() {
        let value = tree("'10': a\n'20': b\n");
        let mut r = TreeReader::new(&value);
        r.begin_object().unwrap();
        r.begin_key_read().unwrap();
        assert_eq!(r.peek(), Token::String);
        assert_eq!(r.next_number().unwrap(), Number::Int(10));
        assert_eq!(r.peek(), Token::String);
        assert_eq!(r.next_string().unwrap(), "a");
        assert_eq!(r.next_name().unwrap(), "20");
        assert_eq!(r.next_string().unwrap(), "b");
        r.end_object().unwrap();
    }

    #[test]
    fn key_mode_needs_unread_key() {
        let value = tree("a: 1");
        let mut r = TreeReader::new(&value);
        assert!(matches!(r.begin_key_read(), Err(Error::NoName { .. })));
        r.begin_object().unwrap();
        r.next_name().unwrap();
        assert!(r.begin_key_read().is_err());
    }

    #[test]
    fn skip_value_skips_whole_entries() {
        let value = tree("a: {x: [1, 2]}\nb: 2\n");
        let mut r = TreeReader::new(&value);
        r.begin_object().unwrap();
        r.skip_value().unwrap();
        assert_eq!(r.next_name().unwrap(), "b");
        r.skip_value().unwrap();
        assert!(!r.has_next());
    }

    #[test]
    fn path_tracks_position() {
        let value = tree("a:\n  items: [x, y]\n");
        let mut r = TreeReader::new(&value);
        assert_eq!(r.path().to_string(), "$");
        r.begin_object().unwrap();
        r.next_name().unwrap();
        r.begin_object().unwrap();
        r.next_name().unwrap();
        r.begin_array().unwrap();
        r.next_string().unwrap();
        assert_eq!(r.path().to_string(), "$.a.items[1]");
    }

    #[test]
    fn finish_requires_full_consumption() {
        let value = tree("[1]");
        let r = TreeReader::new(&value);
        assert!(r.finish().is_err());
    }

    #[derive(Debug, PartialEq, Deserialize)]
    enum Shape {
        Point,
        Circle(f64),
        Rect { w: u32, h: u32 },
        Pair(i8, i8),
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Scene {
        title: Option<String>,
        shapes: Vec<Shape>,
        weights: BTreeMap<u32, bool>,
        flags: HashMap<String, bool>,
        tuple: (u8, String),
        raw: RawConfig,
    }

    #[test]
    fn deserializes_serde_data_model() {
        let value = tree(
            "title: null\n\
             shapes:\n  - Point\n  - Circle: 1.5\n  - Rect: {w: 2, h: 3}\n  - Pair: [-1, 1]\n\
             weights: {'7': true, '9': false}\n\
             flags: {on: true}\n\
             tuple: [1, one]\n\
             unknown: [ignored]\n\
             raw: {x: 1}\n",
        );
        let mut r = TreeReader::new(&value);
        let scene = Scene::deserialize(&mut r).unwrap();
        r.finish().unwrap();
        assert_eq!(
            scene,
            Scene {
                title: None,
                shapes: vec![
                    Shape::Point,
                    Shape::Circle(1.5),
                    Shape::Rect { w: 2, h: 3 },
                    Shape::Pair(-1, 1),
                ],
                weights: BTreeMap::from([(7, true), (9, false)]),
                flags: HashMap::from([("on".to_string(), true)]),
                tuple: (1, "one".to_string()),
                raw: RawConfig::new("{\n  \"x\": 1\n}"),
            }
        );
    }

    #[test]
    fn type_mismatch_is_syntax_error() {
        let value = tree("[1, 2]");
        let mut r = TreeReader::new(&value);
        let err = String::deserialize(&mut r).unwrap_err();
        assert!(matches!(err, Error::InvalidType { found: Token::BeginArray, .. }));
        assert_eq!(err.kind(), ErrorKind::Syntax);

        let value = tree("1.5");
        let err = u8::deserialize(&mut TreeReader::new(&value)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn trailing_elements_fail() {
        let value = tree("[1, 2, 3]");
        let mut r = TreeReader::new(&value);
        assert!(<(u8, u8)>::deserialize(&mut r).is_err());
    }
}
