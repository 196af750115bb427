//! confbind - serde binding for commented, validated config trees
//!
//! Converts any `Serialize`/`Deserialize` type to and from a
//! [`ConfigValue`] tree and config text:
//! - [`TreeWriter`] and [`TreeReader`] adapt the tree to push/pull token
//!   streams and act as serde `Serializer`/`Deserializer`
//! - [`Annotated`] types declare per-field comments, aliases and constraints
//! - [`FieldHandler`]s intercept bound fields on write and on read
//! - [`Binder`] ties the pieces together
//!
//! # Example
//!
//! ```rust
//! use confbind::{Annotated, Binder, FieldTableBuilder};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Person {
//!     name: String,
//!     age: i64,
//! }
//!
//! impl Annotated for Person {
//!     fn annotate(fields: &mut FieldTableBuilder) {
//!         fields.field("name").comment("full name");
//!         fields.field("age").int_range(0, 150);
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let binder = Binder::builder()
//!     .with_comments()
//!     .register_default_validators()
//!     .bind::<Person>()
//!     .build()?;
//!
//! let person = Person { name: "Ada".into(), age: 36 };
//! let text = binder.to_text("person", &person)?;
//! assert!(text.contains("# full name"));
//!
//! let back: Person = binder.from_text(&text, "person")?;
//! assert_eq!(back, person);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod binder;
pub mod commented;
pub mod error;
pub mod field;
pub mod handler;
pub mod path;
pub mod reader;
pub mod validate;
pub mod writer;

pub use binder::{Binder, BinderBuilder, BinderOptions};
pub use commented::{Commented, RawConfig};
pub use error::{BindError, Error, ErrorKind, Result};
pub use field::{Annotated, BoundField, Constraint, FieldRegistry, FieldTable, FieldTableBuilder};
pub use handler::{
    CommentHandler, DefaultValueCommentHandler, FieldHandler, FieldPipeline, VALUE_TOKEN,
};
pub use path::{FieldPath, PathSegment};
pub use reader::{Token, TreeReader};
pub use validate::{
    CustomValidator, FieldValidator, FloatRangeValidator, IntRangeValidator, StringSetValidator,
    ValidatorHandler,
};
pub use writer::TreeWriter;

pub use confbind_value::{
    parse_str, render, ConfigMap, ConfigValue, Number, Origin, ParseError, RenderOptions,
    ValueKind,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for binding config types
    pub use crate::{
        Annotated, Binder, BinderBuilder, Commented, ConfigValue, FieldTableBuilder, RawConfig,
        RenderOptions,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
