//! Field interception
//!
//! A [`FieldHandler`] sees every bound field as it is written to or read from
//! a tree. Handlers run in registration order; on read each handler sees the
//! value left by the previous one.

use std::fmt::Debug;
use std::sync::Arc;

use confbind_value::ConfigValue;

use crate::error::Result;
use crate::field::{BoundField, FieldRegistry, FieldTable};
use crate::path::FieldPath;
use crate::writer::TreeWriter;

/// Token in comment templates replaced by the field value
pub const VALUE_TOKEN: &str = "$value";

/// Per-field interceptor
pub trait FieldHandler: Send + Sync + Debug {
    /// Called after the field name is set and before its value is stored
    ///
    /// `value` is the already converted field value. Comments set on
    /// `writer` attach to that value.
    ///
    /// # Errors
    ///
    /// Any error aborts the conversion.
    fn on_write(
        &self,
        field: &BoundField,
        value: &ConfigValue,
        writer: &mut TreeWriter<'_>,
    ) -> Result<()> {
        let _ = (field, value, writer);
        Ok(())
    }

    /// Called with the raw tree value before it is decoded
    ///
    /// Returns a replacement value, or `None` to keep the current one.
    ///
    /// # Errors
    ///
    /// Any error aborts the conversion.
    fn on_read(
        &self,
        field: &BoundField,
        path: &FieldPath,
        value: &ConfigValue,
    ) -> Result<Option<ConfigValue>> {
        let _ = (field, path, value);
        Ok(None)
    }
}

/// Writes the declared comment template
#[derive(Debug, Default, Clone, Copy)]
pub struct CommentHandler;

impl FieldHandler for CommentHandler {
    fn on_write(
        &self,
        field: &BoundField,
        value: &ConfigValue,
        writer: &mut TreeWriter<'_>,
    ) -> Result<()> {
        if let Some(template) = field.comment_template() {
            let comment = if template.contains(VALUE_TOKEN) {
                template.replace(VALUE_TOKEN, &value.to_string())
            } else {
                template.to_string()
            };
            writer.set_comment(comment);
        }
        Ok(())
    }
}

/// Documents the current value as the default
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultValueCommentHandler;

impl FieldHandler for DefaultValueCommentHandler {
    fn on_write(
        &self,
        field: &BoundField,
        value: &ConfigValue,
        writer: &mut TreeWriter<'_>,
    ) -> Result<()> {
        if field.has_default_comment() {
            writer.set_comment(format!("default value: {value}"));
        }
        Ok(())
    }
}

/// Bound field tables plus the handlers run over them
#[derive(Debug, Default)]
pub struct FieldPipeline {
    registry: FieldRegistry,
    handlers: Vec<Arc<dyn FieldHandler>>,
}

impl FieldPipeline {
    /// Create pipeline
    #[must_use]
    pub fn new(registry: FieldRegistry, handlers: Vec<Arc<dyn FieldHandler>>) -> Self {
        Self { registry, handlers }
    }

    /// Bound tables
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// Handlers, in run order
    #[inline]
    #[must_use]
    pub fn handlers(&self) -> &[Arc<dyn FieldHandler>] {
        &self.handlers
    }

    /// Table for a serde struct name
    #[inline]
    #[must_use]
    pub fn table(&self, struct_name: &str) -> Option<&FieldTable> {
        self.registry.get(struct_name)
    }

    /// Run every handler's write hook
    ///
    /// # Errors
    ///
    /// Stops at the first handler error.
    pub fn write_field(
        &self,
        field: &BoundField,
        value: &ConfigValue,
        writer: &mut TreeWriter<'_>,
    ) -> Result<()> {
        self.handlers
            .iter()
            .try_for_each(|handler| handler.on_write(field, value, writer))
    }

    /// Run every handler's read hook, chaining replacements
    ///
    /// Returns the final replacement, or `None` if no handler replaced the
    /// value.
    ///
    /// # Errors
    ///
    /// Stops at the first handler error.
    pub fn read_field(
        &self,
        field: &BoundField,
        path: &FieldPath,
        value: &ConfigValue,
    ) -> Result<Option<ConfigValue>> {
        let mut replaced: Option<ConfigValue> = None;
        for handler in &self.handlers {
            let current = replaced.as_ref().unwrap_or(value);
            if let Some(next) = handler.on_read(field, path, current)? {
                replaced = Some(next);
            }
        }
        Ok(replaced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_with(handler: &dyn FieldHandler, field: &BoundField, value: ConfigValue) -> Vec<String> {
        let mut writer = TreeWriter::new();
        handler
            .on_write(field, &value, &mut writer)
            .expect("on_write");
        writer.value(value).expect("value");
        writer
            .finish()
            .expect("finish")
            .comments()
            .to_vec()
    }

    #[test]
    fn comment_template_substitutes_value() {
        let mut field = BoundField::new("port");
        field.comment("listening on $value");
        assert_eq!(
            write_with(&CommentHandler, &field, 8080.into()),
            ["listening on 8080"]
        );
    }

    #[test]
    fn no_template_no_comment() {
        let field = BoundField::new("port");
        assert!(write_with(&CommentHandler, &field, 8080.into()).is_empty());
        assert!(write_with(&DefaultValueCommentHandler, &field, 8080.into()).is_empty());
    }

    #[test]
    fn default_value_comment() {
        let mut field = BoundField::new("mode");
        field.default_comment();
        assert_eq!(
            write_with(&DefaultValueCommentHandler, &field, "fast".into()),
            ["default value: fast"]
        );
    }

    #[derive(Debug)]
    struct Upper;

    impl FieldHandler for Upper {
        fn on_read(
            &self,
            _field: &BoundField,
            _path: &FieldPath,
            value: &ConfigValue,
        ) -> Result<Option<ConfigValue>> {
            Ok(value.as_str().map(|s| s.to_uppercase().into()))
        }
    }

    #[derive(Debug)]
    struct Exclaim;

    impl FieldHandler for Exclaim {
        fn on_read(
            &self,
            _field: &BoundField,
            _path: &FieldPath,
            value: &ConfigValue,
        ) -> Result<Option<ConfigValue>> {
            Ok(value.as_str().map(|s| format!("{s}!").into()))
        }
    }

    #[test]
    fn read_replacements_chain_in_order() {
        let handlers: Vec<Arc<dyn FieldHandler>> = vec![
            Arc::new(Upper) as Arc<dyn FieldHandler>,
            Arc::new(CommentHandler) as Arc<dyn FieldHandler>,
            Arc::new(Exclaim) as Arc<dyn FieldHandler>,
        ];
        let pipeline = FieldPipeline::new(FieldRegistry::new(), handlers);
        let field = BoundField::new("name");
        let out = pipeline
            .read_field(&field, &FieldPath::root(), &"hi".into())
            .expect("read");
        assert_eq!(out, Some(ConfigValue::from("HI!")));
        let untouched = pipeline
            .read_field(&field, &FieldPath::root(), &1.into())
            .expect("read");
        assert_eq!(untouched, None);
    }
}
