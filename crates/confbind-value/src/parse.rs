//! Text to tree
//!
//! Documents are YAML (and therefore also JSON). Parsing is delegated to
//! `serde_yaml`; every node of the result is tagged [`Origin::Text`].

use crate::value::{ConfigValue, Origin};

/// Errors parsing a config document
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Syntax error reported by the YAML parser
    #[error("syntax error: {0}")]
    Syntax(#[from] serde_yaml::Error),
}

/// Parse a config document into a tree
///
/// A document holding nothing but blank lines and comments parses to null.
///
/// # Errors
///
/// Returns [`ParseError::Syntax`] if the text is not valid YAML.
pub fn parse_str(text: &str) -> Result<ConfigValue, ParseError> {
    let blank = text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    });
    if blank {
        return Ok(ConfigValue::null().with_origin(Origin::Text));
    }
    let mut value: ConfigValue = serde_yaml::from_str(text)?;
    value.set_origin_recursive(Origin::Text);
    Ok(value)
}
