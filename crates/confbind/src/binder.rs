//! Facade
//!
//! [`Binder`] holds the bound field tables, the handler list and the default
//! render options. It converts values to trees and text and back, wrapping
//! and unwrapping one top-level root key for the text forms.
//!
//! ```rust,ignore
//! let binder = Binder::builder()
//!     .with_comments()
//!     .register_default_validators()
//!     .bind::<Server>()
//!     .build()?;
//!
//! let text = binder.to_text("server", &server)?;
//! let back: Server = binder.from_text(&text, "server")?;
//! ```

use std::fmt;
use std::sync::Arc;

use confbind_value::{parse_str, render, ConfigValue, RenderOptions};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{BindError, Error, Result};
use crate::field::{Annotated, FieldRegistry};
use crate::handler::{CommentHandler, DefaultValueCommentHandler, FieldHandler, FieldPipeline};
use crate::reader::TreeReader;
use crate::validate::{FieldValidator, ValidatorHandler};
use crate::writer::TreeWriter;

/// Lines holding nothing but an empty comment marker
static EMPTY_COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*#[ \t]*\r?\n").expect("empty comment pattern is valid")
});

/// Binder switches loadable from any serde source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinderOptions {
    /// Install the comment and default-value comment handlers
    pub comments: bool,
    /// Install the built-in validators
    pub default_validators: bool,
    /// Abort reads on invalid values instead of coercing them
    pub fail_on_invalid: bool,
    /// Default render options for text output
    pub render: RenderOptions,
}

impl Default for BinderOptions {
    fn default() -> Self {
        Self {
            comments: false,
            default_validators: false,
            fail_on_invalid: true,
            render: RenderOptions::default(),
        }
    }
}

#[derive(Clone, Copy)]
struct Binding {
    type_name: &'static str,
    register: fn(&mut FieldRegistry) -> Result<(), BindError>,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

/// Fluent [`Binder`] construction
#[derive(Debug, Clone, Default)]
pub struct BinderBuilder {
    options: BinderOptions,
    validators: Vec<Arc<dyn FieldValidator>>,
    handlers: Vec<Arc<dyn FieldHandler>>,
    bindings: Vec<Binding>,
}

impl BinderBuilder {
    /// Create builder with default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write declared comments and default-value comments
    #[must_use]
    pub fn with_comments(mut self) -> Self {
        self.options.comments = true;
        self
    }

    /// Check declared constraints with the built-in validators
    #[must_use]
    pub fn register_default_validators(mut self) -> Self {
        self.options.default_validators = true;
        self
    }

    /// Add a validator run after the built-in ones
    #[must_use]
    pub fn register_validator(mut self, validator: Arc<dyn FieldValidator>) -> Self {
        self.validators.push(validator);
        self
    }

    /// Abort reads on invalid values (`true`) or log and coerce (`false`)
    #[must_use]
    pub fn fail_on_invalid(mut self, fail: bool) -> Self {
        self.options.fail_on_invalid = fail;
        self
    }

    /// Add a handler run after the built-in ones
    #[must_use]
    pub fn register_handler(mut self, handler: Arc<dyn FieldHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Intercept the fields of `T`
    ///
    /// Structs are recognised by serde name and field list. Another type with
    /// the same name is read unintercepted unless its fields are identical,
    /// and written unintercepted once it emits a key `T` does not have.
    #[must_use]
    pub fn bind<T: Annotated>(mut self) -> Self {
        self.bindings.push(Binding {
            type_name: std::any::type_name::<T>(),
            register: FieldRegistry::register::<T>,
        });
        self
    }

    /// Default render options for [`Binder::to_text`]
    #[must_use]
    pub fn render_options(mut self, render: RenderOptions) -> Self {
        self.options.render = render;
        self
    }

    /// Replace all switches at once
    #[must_use]
    pub fn with_options(mut self, options: BinderOptions) -> Self {
        self.options = options;
        self
    }

    /// Current switches
    #[inline]
    #[must_use]
    pub fn options(&self) -> &BinderOptions {
        &self.options
    }

    /// Build field tables and freeze the handler list
    ///
    /// Handlers run in this order: comment, default-value comment,
    /// validators, then registered handlers.
    ///
    /// # Errors
    ///
    /// Returns the first [`BindError`] raised while building a field table.
    pub fn build(self) -> Result<Binder, BindError> {
        let mut registry = FieldRegistry::new();
        for binding in &self.bindings {
            tracing::trace!("binding {}", binding.type_name);
            (binding.register)(&mut registry)?;
        }

        let mut handlers: Vec<Arc<dyn FieldHandler>> = Vec::new();
        if self.options.comments {
            handlers.push(Arc::new(CommentHandler));
            handlers.push(Arc::new(DefaultValueCommentHandler));
        }
        if self.options.default_validators || !self.validators.is_empty() {
            let mut validator = if self.options.default_validators {
                ValidatorHandler::with_defaults(self.options.fail_on_invalid)
            } else {
                ValidatorHandler::new(self.options.fail_on_invalid)
            };
            for extra in self.validators {
                validator.register(extra);
            }
            handlers.push(Arc::new(validator));
        }
        handlers.extend(self.handlers);

        Ok(Binder {
            pipeline: Arc::new(FieldPipeline::new(registry, handlers)),
            render: self.options.render,
        })
    }
}

/// Converts between Rust values, config trees and config text
///
/// Immutable once built; clones share the same field tables.
#[derive(Debug, Clone, Default)]
pub struct Binder {
    pipeline: Arc<FieldPipeline>,
    render: RenderOptions,
}

impl Binder {
    /// Binder with no bound types and no handlers
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a binder
    #[must_use]
    pub fn builder() -> BinderBuilder {
        BinderBuilder::new()
    }

    /// Field tables and handlers in use
    #[inline]
    #[must_use]
    pub fn pipeline(&self) -> &FieldPipeline {
        &self.pipeline
    }

    /// Default render options
    #[inline]
    #[must_use]
    pub fn render_options(&self) -> &RenderOptions {
        &self.render
    }

    /// Convert a value into a tree
    ///
    /// # Errors
    ///
    /// Fails if serialization or a field handler fails.
    pub fn to_tree<T: Serialize + ?Sized>(&self, value: &T) -> Result<ConfigValue> {
        let mut writer = TreeWriter::with_pipeline(&self.pipeline);
        value.serialize(&mut writer)?;
        writer.finish()
    }

    /// Convert a value into a tree wrapped under `root_name`
    ///
    /// # Errors
    ///
    /// As [`Binder::to_tree`].
    pub fn to_config<T: Serialize + ?Sized>(
        &self,
        root_name: &str,
        value: &T,
    ) -> Result<ConfigValue> {
        let tree = self.to_tree(value)?;
        Ok(ConfigValue::from_iter([(root_name, tree)]))
    }

    /// Render a value as text under `root_name` with the default options
    ///
    /// # Errors
    ///
    /// As [`Binder::to_tree`].
    pub fn to_text<T: Serialize + ?Sized>(&self, root_name: &str, value: &T) -> Result<String> {
        self.to_text_with(root_name, value, &self.render)
    }

    /// Render a value as text under `root_name`
    ///
    /// # Errors
    ///
    /// As [`Binder::to_tree`].
    pub fn to_text_with<T: Serialize + ?Sized>(
        &self,
        root_name: &str,
        value: &T,
        options: &RenderOptions,
    ) -> Result<String> {
        let config = self.to_config(root_name, value)?;
        Ok(Self::render(&config, options))
    }

    /// Render a tree, dropping lines left by empty comments
    #[must_use]
    pub fn render(value: &ConfigValue, options: &RenderOptions) -> String {
        let text = render(value, options);
        EMPTY_COMMENT.replace_all(&text, "").into_owned()
    }

    /// Parse text and read the value under `root_name`
    ///
    /// # Errors
    ///
    /// Fails if the text does not parse, has no `root_name` key, or the
    /// value under it cannot be read as `T`.
    pub fn from_text<T: DeserializeOwned>(&self, text: &str, root_name: &str) -> Result<T> {
        let config = parse_str(text)?;
        let tree = config
            .get(root_name)
            .ok_or_else(|| Error::MissingRoot(root_name.to_string()))?;
        self.from_tree(tree)
    }

    /// Read a value from a tree
    ///
    /// # Errors
    ///
    /// Fails on a shape mismatch, a failed validation in fail-hard mode, or
    /// when part of the tree is left unread.
    pub fn from_tree<T: DeserializeOwned>(&self, tree: &ConfigValue) -> Result<T> {
        let mut reader = TreeReader::with_pipeline(tree, &self.pipeline);
        let value = T::deserialize(&mut reader)?;
        reader.finish()?;
        Ok(value)
    }
}
