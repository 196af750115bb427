//! Config tree value model
//!
//! In-memory representation of structured configuration documents, plus the
//! text hand-off used by the binding layer.
//!
//! # Core Concepts
//!
//! - [`ConfigValue`]: a tree node with attached comments and [`Origin`]
//! - [`ValueKind`]: null, boolean, [`Number`], string, ordered map or list
//! - [`parse_str`]: YAML/JSON text to tree
//! - [`render`]: tree to commented YAML or JSON, driven by [`RenderOptions`]
//!
//! # Example
//!
//! ```rust
//! use confbind_value::{parse_str, render, RenderOptions};
//!
//! let tree = parse_str("server:\n  port: 8080\n").unwrap();
//! assert_eq!(render(&tree, &RenderOptions::default()), "server:\n  port: 8080\n");
//! ```

#![warn(unreachable_pub)]

mod number;
mod parse;
mod render;
mod value;

pub use number::{Number, NumberParseError};
pub use parse::{parse_str, ParseError};
pub use render::{render, RenderOptions};
pub use value::{ConfigMap, ConfigValue, Origin, ValueKind};
