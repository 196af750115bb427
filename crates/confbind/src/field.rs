//! Bound field tables
//!
//! Every bound type gets one immutable [`FieldTable`] built at binder
//! construction. The table lists the fields serde reports for the type,
//! merged with the metadata the type declares through [`Annotated`]:
//!
//! ```rust
//! use confbind::{Annotated, FieldTableBuilder};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! impl Annotated for Person {
//!     fn annotate(fields: &mut FieldTableBuilder) {
//!         fields.field("name").comment("person name").none_of(["reserved"]);
//!         fields.field("age").comment("").int_range(0, 150);
//!     }
//! }
//! ```

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde::{forward_to_deserialize_any, Serialize};

use crate::error::{BindError, Error};
use crate::validate::FieldValidator;

/// Declared validation rule on a field
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Value must (or with `invert`, must not) be one of `values`
    OneOf { values: Vec<String>, invert: bool },
    /// Integer value must lie in `min..=max`
    IntRange { min: i64, max: i64 },
    /// Floating value must lie in `min..=max`
    FloatRange { min: f64, max: f64 },
    /// User-supplied rule
    Custom(Arc<dyn FieldValidator>),
}

/// One serializable/deserializable field of a bound type
#[derive(Debug, Clone)]
pub struct BoundField {
    name: String,
    aliases: Vec<String>,
    serialize: bool,
    deserialize: bool,
    comment: Option<String>,
    default_comment: bool,
    constraints: Vec<Constraint>,
}

impl BoundField {
    /// Create a field with no metadata
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            serialize: true,
            deserialize: true,
            comment: None,
            default_comment: false,
            constraints: Vec::new(),
        }
    }

    /// Resolved field name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alternate names accepted on read
    #[inline]
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Whether the field is written
    #[inline]
    #[must_use]
    pub fn serializes(&self) -> bool {
        self.serialize
    }

    /// Whether the field is read
    #[inline]
    #[must_use]
    pub fn deserializes(&self) -> bool {
        self.deserialize
    }

    /// Comment template; `$value` stands for the field value
    #[inline]
    #[must_use]
    pub fn comment_template(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Whether a `default value: ...` comment is generated
    #[inline]
    #[must_use]
    pub fn has_default_comment(&self) -> bool {
        self.default_comment
    }

    /// Declared constraints, in declaration order
    #[inline]
    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Set the comment template
    pub fn comment(&mut self, template: impl Into<String>) -> &mut Self {
        self.comment = Some(template.into());
        self
    }

    /// Document the current value as the default
    pub fn default_comment(&mut self) -> &mut Self {
        self.default_comment = true;
        self
    }

    /// Accept an alternate name on read
    pub fn alias(&mut self, alias: impl Into<String>) -> &mut Self {
        self.aliases.push(alias.into());
        self
    }

    /// Include or skip the field on write
    pub fn serialize(&mut self, enabled: bool) -> &mut Self {
        self.serialize = enabled;
        self
    }

    /// Include or skip the field on read
    pub fn deserialize(&mut self, enabled: bool) -> &mut Self {
        self.deserialize = enabled;
        self
    }

    /// Restrict the value to a fixed set of strings
    pub fn one_of<I, S>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraint(Constraint::OneOf {
            values: values.into_iter().map(Into::into).collect(),
            invert: false,
        })
    }

    /// Forbid a fixed set of strings
    pub fn none_of<I, S>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraint(Constraint::OneOf {
            values: values.into_iter().map(Into::into).collect(),
            invert: true,
        })
    }

    /// Restrict an integer value to `min..=max`
    pub fn int_range(&mut self, min: i64, max: i64) -> &mut Self {
        self.constraint(Constraint::IntRange { min, max })
    }

    /// Lower bound for an integer value
    ///
    /// Tightens an existing integer range, or opens one up to `i64::MAX`.
    pub fn min(&mut self, min: i64) -> &mut Self {
        match self.int_range_mut() {
            Some((lower, _)) => {
                *lower = min;
                self
            }
            None => self.int_range(min, i64::MAX),
        }
    }

    /// Upper bound for an integer value
    ///
    /// Tightens an existing integer range, or opens one down to `i64::MIN`.
    pub fn max(&mut self, max: i64) -> &mut Self {
        match self.int_range_mut() {
            Some((_, upper)) => {
                *upper = max;
                self
            }
            None => self.int_range(i64::MIN, max),
        }
    }

    fn int_range_mut(&mut self) -> Option<(&mut i64, &mut i64)> {
        self.constraints.iter_mut().rev().find_map(|c| match c {
            Constraint::IntRange { min, max } => Some((min, max)),
            _ => None,
        })
    }

    /// Restrict a floating value to `min..=max`
    pub fn float_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.constraint(Constraint::FloatRange { min, max })
    }

    /// Attach a user-supplied validator
    pub fn validator(&mut self, validator: Arc<dyn FieldValidator>) -> &mut Self {
        self.constraint(Constraint::Custom(validator))
    }

    /// Attach any constraint
    pub fn constraint(&mut self, constraint: Constraint) -> &mut Self {
        self.constraints.push(constraint);
        self
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    fn check_constraints(&self, type_name: &'static str) -> Result<(), BindError> {
        let invalid = |reason: String| BindError::InvalidConstraint {
            type_name,
            field: self.name.clone(),
            reason,
        };
        for constraint in &self.constraints {
            match *constraint {
                Constraint::IntRange { min, max } if min > max => {
                    return Err(invalid(format!("range [{min}, {max}] is empty")));
                }
                Constraint::FloatRange { min, max } if min.is_nan() || max.is_nan() => {
                    return Err(invalid("range bound is NaN".to_string()));
                }
                Constraint::FloatRange { min, max } if min > max => {
                    return Err(invalid(format!("range [{min}, {max}] is empty")));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Collects field metadata for one type
#[derive(Debug)]
pub struct FieldTableBuilder {
    type_name: &'static str,
    fields: Vec<BoundField>,
}

impl FieldTableBuilder {
    /// Create an empty builder for the named type
    #[must_use]
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            fields: Vec::new(),
        }
    }

    /// Metadata for the named field, created on first use
    pub fn field(&mut self, name: &str) -> &mut BoundField {
        let index = match self.fields.iter().position(|f| f.name == name) {
            Some(index) => index,
            None => {
                self.fields.push(BoundField::new(name));
                self.fields.len() - 1
            }
        };
        &mut self.fields[index]
    }

    /// Merge declared metadata with the fields serde reports
    ///
    /// # Errors
    ///
    /// Returns [`BindError`] for metadata on fields serde does not know,
    /// duplicate names or aliases, and unusable constraint bounds.
    pub fn build(
        self,
        struct_name: &'static str,
        serde_fields: &'static [&'static str],
    ) -> Result<FieldTable, BindError> {
        let type_name = self.type_name;
        let mut declared = self.fields;
        let mut fields = Vec::with_capacity(serde_fields.len() + declared.len());
        for &name in serde_fields {
            match declared.iter().position(|f| f.name == name) {
                Some(index) => fields.push(declared.remove(index)),
                None => fields.push(BoundField::new(name)),
            }
        }
        for field in declared {
            if field.deserialize {
                return Err(BindError::UnknownField {
                    type_name,
                    field: field.name,
                });
            }
            fields.push(field);
        }

        let mut index = HashMap::new();
        for (position, field) in fields.iter().enumerate() {
            field.check_constraints(type_name)?;
            for name in field.names() {
                if index.insert(name.to_string(), position).is_some() {
                    return Err(BindError::DuplicateField {
                        type_name,
                        name: name.to_string(),
                    });
                }
            }
        }

        Ok(FieldTable {
            type_name,
            struct_name,
            serde_fields,
            fields,
            index,
        })
    }
}

/// Immutable field table of one bound type
#[derive(Debug)]
pub struct FieldTable {
    type_name: &'static str,
    struct_name: &'static str,
    serde_fields: &'static [&'static str],
    fields: Vec<BoundField>,
    index: HashMap<String, usize>,
}

impl FieldTable {
    /// Rust type name
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Name serde uses for the struct
    #[inline]
    #[must_use]
    pub fn struct_name(&self) -> &'static str {
        self.struct_name
    }

    /// Field names serde reported for the bound type
    #[inline]
    #[must_use]
    pub fn serde_fields(&self) -> &'static [&'static str] {
        self.serde_fields
    }

    /// Whether a struct deserialized with `fields` is the bound type
    #[must_use]
    pub fn matches(&self, fields: &[&str]) -> bool {
        self.serde_fields == fields
    }

    /// Whether a serialized struct key belongs to the bound type
    #[must_use]
    pub fn knows_key(&self, key: &str) -> bool {
        self.serde_fields.iter().any(|f| *f == key)
            || self.get(key).is_some_and(|f| !f.deserializes())
    }

    /// All fields, in serde declaration order
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[BoundField] {
        &self.fields
    }

    /// Look up a field by name or alias
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BoundField> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// Get number of fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if table has no fields
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Type that can be bound to a [`crate::Binder`]
///
/// The default `annotate` declares no metadata; the type is still bound so
/// every handler sees its fields.
pub trait Annotated: Serialize + DeserializeOwned + 'static {
    /// Declare per-field metadata
    fn annotate(fields: &mut FieldTableBuilder) {
        let _ = fields;
    }
}

/// Field tables of all bound types
#[derive(Debug, Default)]
pub struct FieldRegistry {
    by_name: HashMap<&'static str, FieldTable>,
    by_type: HashMap<TypeId, &'static str>,
}

impl FieldRegistry {
    /// Create empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and store the table for `T`
    ///
    /// Registering the same type twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`BindError`] if `T` is not a struct, its serde name is already
    /// bound to another type, or its metadata is inconsistent.
    pub fn register<T: Annotated>(&mut self) -> Result<(), BindError> {
        if self.by_type.contains_key(&TypeId::of::<T>()) {
            return Ok(());
        }
        let (struct_name, serde_fields) = probe_struct::<T>()?;
        if self.by_name.contains_key(struct_name) {
            return Err(BindError::DuplicateStructName { name: struct_name });
        }
        let mut builder = FieldTableBuilder::new(std::any::type_name::<T>());
        T::annotate(&mut builder);
        let table = builder.build(struct_name, serde_fields)?;
        tracing::trace!(
            "bound {} as '{}' with {} fields",
            table.type_name(),
            struct_name,
            table.len()
        );
        self.by_type.insert(TypeId::of::<T>(), struct_name);
        self.by_name.insert(struct_name, table);
        Ok(())
    }

    /// Table by serde struct name
    #[must_use]
    pub fn get(&self, struct_name: &str) -> Option<&FieldTable> {
        self.by_name.get(struct_name)
    }

    /// Table by Rust type
    #[must_use]
    pub fn table_of<T: 'static>(&self) -> Option<&FieldTable> {
        self.by_type
            .get(&TypeId::of::<T>())
            .and_then(|name| self.by_name.get(name))
    }

    /// Get number of bound types
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Check if no type is bound
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

type StructShape = (&'static str, &'static [&'static str]);

/// Ask serde for the struct name and field list of `T`
fn probe_struct<T: DeserializeOwned>() -> Result<StructShape, BindError> {
    let mut found = None;
    // The probe always fails once it has seen the struct shape.
    let _ = T::deserialize(StructProbe { found: &mut found });
    found.ok_or(BindError::NotAStruct {
        type_name: std::any::type_name::<T>(),
    })
}

struct StructProbe<'c> {
    found: &'c mut Option<StructShape>,
}

impl<'de> Deserializer<'de> for StructProbe<'_> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Error> {
        Err(de::Error::custom("not a struct"))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Error> {
        *self.found = Some((name, fields));
        Err(de::Error::custom("struct probed"))
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map enum identifier ignored_any
    }
}
