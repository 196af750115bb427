//! Tree writer
//!
//! [`TreeWriter`] builds a [`ConfigValue`] bottom-up from a push token stream
//! (`begin_object`, `name`, `value`, `end_object`, ...). It is also a serde
//! [`Serializer`], so any `Serialize` type can be written into a tree.
//!
//! Comments set with [`TreeWriter::set_comment`] stay pending until the next
//! value is stored at the current position and then attach to that value.
//! Comments pending when a container begins attach to the container.
//!
//! When the writer carries a [`FieldPipeline`], every field of a bound struct
//! is converted into a detached subtree first, the field handlers run with the
//! name already set, and then the subtree is stored.

use std::mem;

use confbind_value::{parse_str, ConfigMap, ConfigValue, Number, Origin, ValueKind};
use serde::ser::{
    self, Impossible, Serialize, SerializeMap, SerializeSeq, SerializeStruct,
    SerializeStructVariant, SerializeTuple, SerializeTupleStruct, SerializeTupleVariant,
    Serializer,
};

use crate::commented::{COMMENTED_TOKEN, RAW_TOKEN};
use crate::error::{Error, Result};
use crate::field::FieldTable;
use crate::handler::FieldPipeline;

/// Container under construction
#[derive(Debug)]
enum Frame {
    Object {
        map: ConfigMap,
        name: Option<String>,
        comments: Vec<String>,
    },
    Array {
        items: Vec<ConfigValue>,
        comments: Vec<String>,
    },
}

/// Push adapter building a config tree
#[derive(Debug, Default)]
pub struct TreeWriter<'p> {
    root: Option<ConfigValue>,
    stack: Vec<Frame>,
    pending_comments: Vec<String>,
    pipeline: Option<&'p FieldPipeline>,
}

impl TreeWriter<'static> {
    /// Create writer without field interception
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<'p> TreeWriter<'p> {
    /// Create writer running bound fields through `pipeline`
    #[must_use]
    pub fn with_pipeline(pipeline: &'p FieldPipeline) -> Self {
        Self {
            root: None,
            stack: Vec::new(),
            pending_comments: Vec::new(),
            pipeline: Some(pipeline),
        }
    }

    /// Number of open containers
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Comments waiting for the next value
    #[inline]
    #[must_use]
    pub fn pending_comments(&self) -> &[String] {
        &self.pending_comments
    }

    /// Attach a comment to the value stored next at the current position
    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.pending_comments.push(comment.into());
    }

    /// Open an object
    ///
    /// # Errors
    ///
    /// Fails if no value may be stored at the current position.
    pub fn begin_object(&mut self) -> Result<()> {
        self.check_slot()?;
        let comments = mem::take(&mut self.pending_comments);
        self.stack.push(Frame::Object {
            map: ConfigMap::new(),
            name: None,
            comments,
        });
        Ok(())
    }

    /// Close the innermost object and store it in its parent
    ///
    /// # Errors
    ///
    /// Fails if the innermost container is not an object or a name is still
    /// waiting for its value.
    pub fn end_object(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(Frame::Object {
                map,
                name: None,
                comments,
            }) => self.put(Self::finalize(map.into(), comments)),
            Some(Frame::Object { name: Some(_), .. }) => Err(Error::Nesting {
                expected: "value",
                found: "end_object",
            }),
            Some(Frame::Array { .. }) => Err(Error::Nesting {
                expected: "end_array",
                found: "end_object",
            }),
            None => Err(Error::Nesting {
                expected: "value",
                found: "end_object",
            }),
        }
    }

    /// Open a list
    ///
    /// # Errors
    ///
    /// Fails if no value may be stored at the current position.
    pub fn begin_array(&mut self) -> Result<()> {
        self.check_slot()?;
        let comments = mem::take(&mut self.pending_comments);
        self.stack.push(Frame::Array {
            items: Vec::new(),
            comments,
        });
        Ok(())
    }

    /// Close the innermost list and store it in its parent
    ///
    /// # Errors
    ///
    /// Fails if the innermost container is not a list.
    pub fn end_array(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(Frame::Array { items, comments }) => {
                self.put(Self::finalize(items.into(), comments))
            }
            Some(Frame::Object { .. }) => Err(Error::Nesting {
                expected: "end_object",
                found: "end_array",
            }),
            None => Err(Error::Nesting {
                expected: "value",
                found: "end_array",
            }),
        }
    }

    /// Set the key for the next value in the current object
    ///
    /// # Errors
    ///
    /// Fails on root and list positions, or if the previous name has no value
    /// yet.
    pub fn name(&mut self, key: impl Into<String>) -> Result<()> {
        match self.stack.last_mut() {
            None => Err(Error::NoName { frame: "root" }),
            Some(Frame::Array { .. }) => Err(Error::NoName { frame: "array" }),
            Some(Frame::Object { name: Some(_), .. }) => Err(Error::Nesting {
                expected: "value",
                found: "name",
            }),
            Some(Frame::Object { name, .. }) => {
                *name = Some(key.into());
                Ok(())
            }
        }
    }

    /// Store a finished value at the current position
    ///
    /// Pending comments are attached ahead of any comments the value
    /// already carries.
    ///
    /// # Errors
    ///
    /// Fails if an object has no pending name or the root is already set.
    pub fn value(&mut self, value: impl Into<ConfigValue>) -> Result<()> {
        self.put(value.into())
    }

    /// Store a boolean
    ///
    /// # Errors
    ///
    /// See [`TreeWriter::value`].
    pub fn bool_value(&mut self, value: bool) -> Result<()> {
        self.put(value.into())
    }

    /// Store a number
    ///
    /// # Errors
    ///
    /// See [`TreeWriter::value`].
    pub fn number_value(&mut self, value: impl Into<Number>) -> Result<()> {
        self.put(value.into().into())
    }

    /// Store a string
    ///
    /// # Errors
    ///
    /// See [`TreeWriter::value`].
    pub fn string_value(&mut self, value: impl Into<String>) -> Result<()> {
        self.put(value.into().into())
    }

    /// Store null
    ///
    /// # Errors
    ///
    /// See [`TreeWriter::value`].
    pub fn null_value(&mut self) -> Result<()> {
        self.put(ConfigValue::null())
    }

    /// Parse a config snippet and store the result
    ///
    /// A snippet that fails to parse stores null instead.
    ///
    /// # Errors
    ///
    /// Only the errors of [`TreeWriter::value`]; parse failures are not
    /// reported.
    pub fn json_value(&mut self, snippet: &str) -> Result<()> {
        let value = match parse_str(snippet) {
            Ok(mut value) => {
                value.set_origin_recursive(Origin::Hardcoded);
                value
            }
            Err(e) => {
                tracing::debug!("raw config snippet rejected, storing null: {}", e);
                ConfigValue::null()
            }
        };
        self.put(value)
    }

    /// Finish writing and return the tree
    ///
    /// A writer that received no value yields null.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnclosedContainer`] if containers are still open.
    pub fn finish(self) -> Result<ConfigValue> {
        if !self.stack.is_empty() {
            return Err(Error::UnclosedContainer(self.stack.len()));
        }
        Ok(self.root.unwrap_or_default())
    }

    fn finalize(mut value: ConfigValue, comments: Vec<String>) -> ConfigValue {
        *value.comments_mut() = comments;
        value
    }

    fn check_slot(&self) -> Result<()> {
        match self.stack.last() {
            None if self.root.is_some() => Err(Error::Nesting {
                expected: "end of document",
                found: "value",
            }),
            Some(Frame::Object { name: None, .. }) => Err(Error::MissingName),
            _ => Ok(()),
        }
    }

    pub(crate) fn put(&mut self, mut value: ConfigValue) -> Result<()> {
        if !self.pending_comments.is_empty() {
            let mut comments = mem::take(&mut self.pending_comments);
            comments.append(value.comments_mut());
            *value.comments_mut() = comments;
        }
        match self.stack.last_mut() {
            None if self.root.is_some() => Err(Error::Nesting {
                expected: "end of document",
                found: "value",
            }),
            None => {
                self.root = Some(value);
                Ok(())
            }
            Some(Frame::Object { map, name, .. }) => {
                let key = name.take().ok_or(Error::MissingName)?;
                map.insert(key, value);
                Ok(())
            }
            Some(Frame::Array { items, .. }) => {
                items.push(value);
                Ok(())
            }
        }
    }

    /// Serialize `value` into a separate tree sharing this writer's pipeline
    fn detached<T: ?Sized + Serialize>(&self, value: &T) -> Result<ConfigValue> {
        let mut sub = TreeWriter {
            root: None,
            stack: Vec::new(),
            pending_comments: Vec::new(),
            pipeline: self.pipeline,
        };
        value.serialize(&mut sub)?;
        sub.finish()
    }

    fn commented<T: ?Sized + Serialize>(&mut self, payload: &T) -> Result<()> {
        let tree = self.detached(payload)?;
        let ValueKind::List(mut items) = tree.into_kind() else {
            return Err(ser::Error::custom("malformed commented value"));
        };
        let (Some(value), Some(comment), true) = (items.pop(), items.pop(), items.is_empty())
        else {
            return Err(ser::Error::custom("malformed commented value"));
        };
        if let Some(text) = comment.as_str() {
            self.set_comment(text);
        }
        self.put(value)
    }

    fn raw<T: ?Sized + Serialize>(&mut self, payload: &T) -> Result<()> {
        let tree = self.detached(payload)?;
        match tree.as_str() {
            Some(snippet) => self.json_value(snippet),
            None => Err(ser::Error::custom("raw config must be a string")),
        }
    }
}

impl<'w, 'p> Serializer for &'w mut TreeWriter<'p> {
    type Ok = ();
    type Error = Error;
    type SerializeSeq = SeqWriter<'w, 'p>;
    type SerializeTuple = SeqWriter<'w, 'p>;
    type SerializeTupleStruct = SeqWriter<'w, 'p>;
    type SerializeTupleVariant = SeqWriter<'w, 'p>;
    type SerializeMap = MapWriter<'w, 'p>;
    type SerializeStruct = StructWriter<'w, 'p>;
    type SerializeStructVariant = StructWriter<'w, 'p>;

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.bool_value(v)
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.number_value(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.number_value(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.number_value(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        self.number_value(v)
    }

    fn serialize_i128(self, v: i128) -> Result<()> {
        if let Ok(i) = i64::try_from(v) {
            self.number_value(i)
        } else if let Ok(u) = u64::try_from(v) {
            self.number_value(u)
        } else {
            Err(ser::Error::custom(format!("integer {v} is out of range")))
        }
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.number_value(i64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.number_value(i64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.number_value(i64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        self.number_value(v)
    }

    fn serialize_u128(self, v: u128) -> Result<()> {
        u64::try_from(v)
            .map_err(|_| ser::Error::custom(format!("integer {v} is out of range")))
            .and_then(|u| self.number_value(u))
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        // Shortest decimal form, so 0.1f32 stays 0.1 rather than its exact widening.
        let wide = v.to_string().parse::<f64>().unwrap_or(f64::from(v));
        self.number_value(wide)
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        self.number_value(v)
    }

    fn serialize_char(self, v: char) -> Result<()> {
        self.string_value(v)
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.string_value(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        let items = v.iter().map(|&b| ConfigValue::from(i64::from(b))).collect::<Vec<_>>();
        self.put(items.into())
    }

    fn serialize_none(self) -> Result<()> {
        self.null_value()
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.null_value()
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.null_value()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.string_value(variant)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<()> {
        match name {
            COMMENTED_TOKEN => self.commented(value),
            RAW_TOKEN => self.raw(value),
            _ => value.serialize(self),
        }
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<()> {
        self.begin_object()?;
        self.name(variant)?;
        value.serialize(&mut *self)?;
        self.end_object()
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        self.begin_array()?;
        Ok(SeqWriter {
            writer: self,
            variant: false,
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        self.begin_object()?;
        self.name(variant)?;
        self.begin_array()?;
        Ok(SeqWriter {
            writer: self,
            variant: true,
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        self.begin_object()?;
        Ok(MapWriter { writer: self })
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        self.begin_object()?;
        let table = self.pipeline.and_then(|p| p.table(name));
        Ok(StructWriter {
            writer: self,
            table,
            pending: Vec::new(),
            variant: false,
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        self.begin_object()?;
        self.name(variant)?;
        self.begin_object()?;
        Ok(StructWriter {
            writer: self,
            table: None,
            pending: Vec::new(),
            variant: true,
        })
    }
}

/// Writes list elements
#[derive(Debug)]
pub struct SeqWriter<'w, 'p> {
    writer: &'w mut TreeWriter<'p>,
    variant: bool,
}

impl SeqWriter<'_, '_> {
    fn close(self) -> Result<()> {
        self.writer.end_array()?;
        if self.variant {
            self.writer.end_object()?;
        }
        Ok(())
    }
}

impl SerializeSeq for SeqWriter<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut *self.writer)
    }

    fn end(self) -> Result<()> {
        self.close()
    }
}

impl SerializeTuple for SeqWriter<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut *self.writer)
    }

    fn end(self) -> Result<()> {
        self.close()
    }
}

impl SerializeTupleStruct for SeqWriter<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut *self.writer)
    }

    fn end(self) -> Result<()> {
        self.close()
    }
}

impl SerializeTupleVariant for SeqWriter<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut *self.writer)
    }

    fn end(self) -> Result<()> {
        self.close()
    }
}

/// Writes map entries; keys are stringified
#[derive(Debug)]
pub struct MapWriter<'w, 'p> {
    writer: &'w mut TreeWriter<'p>,
}

impl SerializeMap for MapWriter<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        let key = key.serialize(KeySerializer)?;
        self.writer.name(key)
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut *self.writer)
    }

    fn end(self) -> Result<()> {
        self.writer.end_object()
    }
}

/// Writes struct fields through the field pipeline
///
/// Fields of a struct whose serde name has a table are held back until every
/// key is known to belong to that table. A struct that merely shares the name
/// is written without interception.
#[derive(Debug)]
pub struct StructWriter<'w, 'p> {
    writer: &'w mut TreeWriter<'p>,
    table: Option<&'p FieldTable>,
    pending: Vec<(&'static str, ConfigValue)>,
    variant: bool,
}

impl StructWriter<'_, '_> {
    fn field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        if let Some(table) = self.table {
            if table.knows_key(key) {
                let tree = self.writer.detached(value)?;
                self.pending.push((key, tree));
                return Ok(());
            }
            tracing::trace!(
                "struct '{}' has key '{key}' unknown to {}, not intercepted",
                table.struct_name(),
                table.type_name()
            );
            self.table = None;
            for (key, tree) in mem::take(&mut self.pending) {
                self.writer.name(key)?;
                self.writer.put(tree)?;
            }
        }
        self.writer.name(key)?;
        value.serialize(&mut *self.writer)
    }

    fn flush(&mut self) -> Result<()> {
        let (Some(table), Some(pipeline)) = (self.table, self.writer.pipeline) else {
            return Ok(());
        };
        for (key, tree) in mem::take(&mut self.pending) {
            match table.get(key) {
                Some(field) if !field.serializes() => {}
                Some(field) => {
                    self.writer.name(key)?;
                    pipeline.write_field(field, &tree, self.writer)?;
                    self.writer.put(tree)?;
                }
                None => {
                    self.writer.name(key)?;
                    self.writer.put(tree)?;
                }
            }
        }
        Ok(())
    }

    fn close(mut self) -> Result<()> {
        self.flush()?;
        self.writer.end_object()?;
        if self.variant {
            self.writer.end_object()?;
        }
        Ok(())
    }
}

impl SerializeStruct for StructWriter<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.field(key, value)
    }

    fn end(self) -> Result<()> {
        self.close()
    }
}

impl SerializeStructVariant for StructWriter<'_, '_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.field(key, value)
    }

    fn end(self) -> Result<()> {
        self.close()
    }
}

/// Stringifies scalar map keys
struct KeySerializer;

impl Serializer for KeySerializer {
    type Ok = String;
    type Error = Error;
    type SerializeSeq = Impossible<String, Error>;
    type SerializeTuple = Impossible<String, Error>;
    type SerializeTupleStruct = Impossible<String, Error>;
    type SerializeTupleVariant = Impossible<String, Error>;
    type SerializeMap = Impossible<String, Error>;
    type SerializeStruct = Impossible<String, Error>;
    type SerializeStructVariant = Impossible<String, Error>;

    fn serialize_bool(self, v: bool) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i8(self, v: i8) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i16(self, v: i16) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i32(self, v: i32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i64(self, v: i64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i128(self, v: i128) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u8(self, v: u8) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u16(self, v: u16) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u32(self, v: u32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u64(self, v: u64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u128(self, v: u128) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_f32(self, v: f32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_f64(self, v: f64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_char(self, v: char) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String> {
        Err(Error::KeyMustBeScalar)
    }

    fn serialize_none(self) -> Result<String> {
        Err(Error::KeyMustBeScalar)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<String> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<String> {
        Err(Error::KeyMustBeScalar)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String> {
        Err(Error::KeyMustBeScalar)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<String> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String> {
        Err(Error::KeyMustBeScalar)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(Error::KeyMustBeScalar)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(Error::KeyMustBeScalar)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(Error::KeyMustBeScalar)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::KeyMustBeScalar)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(Error::KeyMustBeScalar)
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(Error::KeyMustBeScalar)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Error::KeyMustBeScalar)
    }
}
