//! Tree to text
//!
//! The default output is block-style YAML with each node's comments written
//! as `#` lines directly above the key or list item they belong to. With
//! [`RenderOptions::json_compatible`] the output is pretty-printed JSON and
//! comments are dropped.
//!
//! Scalar quoting is delegated to `serde_yaml` so rendered text always parses
//! back to the same scalar type. An empty comment line renders as `# ` with a
//! trailing space; callers that do not want such lines strip them.

use serde::{Deserialize, Serialize};

use crate::number::Number;
use crate::value::{ConfigValue, ValueKind};

const INDENT: usize = 2;

/// Rendering switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Emit JSON instead of YAML
    pub json_compatible: bool,
    /// Emit attached comments
    pub comments: bool,
    /// Emit a comment describing each node's origin
    pub origin_comments: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            json_compatible: false,
            comments: true,
            origin_comments: false,
        }
    }
}

impl RenderOptions {
    /// Plain YAML without any comments
    #[must_use]
    pub fn concise() -> Self {
        Self {
            json_compatible: false,
            comments: false,
            origin_comments: false,
        }
    }

    /// Pretty JSON
    #[must_use]
    pub fn json() -> Self {
        Self {
            json_compatible: true,
            comments: false,
            origin_comments: false,
        }
    }
}

/// Render a tree to text
///
/// Output always ends with a newline. Rendering is deterministic: the same
/// tree and options always produce the same text.
#[must_use]
pub fn render(value: &ConfigValue, options: &RenderOptions) -> String {
    if options.json_compatible {
        let mut out = format!("{:#}", to_json(value));
        out.push('\n');
        return out;
    }
    let mut out = String::new();
    Renderer { options, out: &mut out }.root(value);
    out
}

fn to_json(value: &ConfigValue) -> serde_json::Value {
    match value.kind() {
        ValueKind::Null => serde_json::Value::Null,
        ValueKind::Bool(b) => serde_json::Value::Bool(*b),
        ValueKind::Number(Number::Int(i)) => (*i).into(),
        ValueKind::Number(Number::UInt(u)) => (*u).into(),
        ValueKind::Number(Number::Float(f)) => serde_json::Number::from_f64(*f)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        ValueKind::String(s) => serde_json::Value::String(s.clone()),
        ValueKind::List(items) => items.iter().map(to_json).collect(),
        ValueKind::Map(map) => serde_json::Value::Object(
            map.iter().map(|(k, v)| (k.clone(), to_json(v))).collect(),
        ),
    }
}

struct Renderer<'o> {
    options: &'o RenderOptions,
    out: &'o mut String,
}

impl Renderer<'_> {
    fn root(&mut self, value: &ConfigValue) {
        self.comments(value, 0);
        match value.kind() {
            ValueKind::Map(map) if !map.is_empty() => self.entries(value, 0),
            ValueKind::List(items) if !items.is_empty() => self.items(items, 0),
            _ => {
                self.out.push_str(&inline(value));
                self.out.push('\n');
            }
        }
    }

    fn entries(&mut self, value: &ConfigValue, indent: usize) {
        let Some(map) = value.as_map() else {
            return;
        };
        for (key, child) in map {
            self.comments(child, indent);
            self.pad(indent);
            self.out.push_str(&quote(key));
            self.out.push(':');
            self.nested(child, indent);
        }
    }

    fn items(&mut self, items: &[ConfigValue], indent: usize) {
        for child in items {
            self.comments(child, indent);
            self.pad(indent);
            self.out.push('-');
            self.nested(child, indent);
        }
    }

    // Finishes the line opened by a key or `-` marker.
    fn nested(&mut self, child: &ConfigValue, indent: usize) {
        match child.kind() {
            ValueKind::Map(map) if !map.is_empty() => {
                self.out.push('\n');
                self.entries(child, indent + INDENT);
            }
            ValueKind::List(items) if !items.is_empty() => {
                self.out.push('\n');
                self.items(items, indent + INDENT);
            }
            _ => {
                self.out.push(' ');
                self.out.push_str(&inline(child));
                self.out.push('\n');
            }
        }
    }

    fn comments(&mut self, value: &ConfigValue, indent: usize) {
        if self.options.origin_comments {
            self.pad(indent);
            self.out.push_str("# ");
            self.out.push_str(value.origin().description());
            self.out.push('\n');
        }
        if !self.options.comments {
            return;
        }
        for comment in value.comments() {
            for line in comment.split('\n') {
                self.pad(indent);
                self.out.push_str("# ");
                self.out.push_str(line.trim_end_matches('\r'));
                self.out.push('\n');
            }
        }
    }

    fn pad(&mut self, indent: usize) {
        self.out.extend(std::iter::repeat(' ').take(indent));
    }
}

fn inline(value: &ConfigValue) -> String {
    match value.kind() {
        ValueKind::Null => "null".to_string(),
        ValueKind::Bool(b) => b.to_string(),
        ValueKind::Number(Number::Int(i)) => i.to_string(),
        ValueKind::Number(Number::UInt(u)) => u.to_string(),
        ValueKind::Number(Number::Float(f)) => float(*f),
        ValueKind::String(s) => quote(s),
        ValueKind::Map(_) => "{}".to_string(),
        ValueKind::List(_) => "[]".to_string(),
    }
}

fn float(f: f64) -> String {
    if f.is_nan() {
        ".nan".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { ".inf" } else { "-.inf" }.to_string()
    } else {
        // Debug keeps the fractional part and round-trips exactly.
        format!("{f:?}")
    }
}

// Single-line scalar form; block scalars fall back to a JSON string, which is
// also a valid YAML double-quoted scalar.
fn quote(s: &str) -> String {
    match serde_yaml::to_string(s) {
        Ok(yaml) => {
            let yaml = yaml.trim_end_matches('\n');
            if yaml.contains('\n') || yaml.starts_with('|') || yaml.starts_with('>') {
                json_quote(s)
            } else {
                yaml.to_string()
            }
        }
        Err(_) => json_quote(s),
    }
}

fn json_quote(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_str;
    use crate::value::{ConfigMap, Origin};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn server() -> ConfigValue {
        ConfigValue::from_iter([(
            "server",
            ConfigValue::from_iter([
                ("host", ConfigValue::from("localhost").with_comment("bind address")),
                (
                    "ports",
                    ConfigValue::from(vec![ConfigValue::from(80), ConfigValue::from(443)]),
                ),
                ("tags", ConfigValue::from(Vec::new())),
                ("extra", ConfigValue::from(ConfigMap::new())),
            ]),
        )])
    }

    #[test]
    fn block_layout_with_comments() {
        let text = render(&server(), &RenderOptions::default());
        assert_eq!(
            text,
            "server:\n  # bind address\n  host: localhost\n  ports:\n    - 80\n    - 443\n  tags: []\n  extra: {}\n"
        );
    }

    #[test]
    fn concise_drops_comments() {
        let text = render(&server(), &RenderOptions::concise());
        assert!(!text.contains('#'));
    }

    #[test]
    fn empty_comment_line_keeps_marker() {
        let value = ConfigValue::from_iter([("age", ConfigValue::from(3).with_comment(""))]);
        assert_eq!(render(&value, &RenderOptions::default()), "# \nage: 3\n");
    }

    #[test]
    fn multiline_comment_splits() {
        let value = ConfigValue::from_iter([("a", ConfigValue::from(1).with_comment("one\ntwo"))]);
        assert_eq!(render(&value, &RenderOptions::default()), "# one\n# two\na: 1\n");
    }

    #[test]
    fn origin_comments() {
        let value = ConfigValue::from_iter([("a", 1)]);
        let options = RenderOptions {
            origin_comments: true,
            ..RenderOptions::concise()
        };
        assert_eq!(render(&value, &options), "# hardcoded value\n# hardcoded value\na: 1\n");
    }

    #[test]
    fn list_of_maps() {
        let value = ConfigValue::from(vec![
            ConfigValue::from_iter([("a", 1), ("b", 2)]),
            ConfigValue::from(vec![ConfigValue::from(true)]),
        ]);
        assert_eq!(
            render(&value, &RenderOptions::default()),
            "-\n  a: 1\n  b: 2\n-\n  - true\n"
        );
    }

    #[test]
    fn ambiguous_strings_are_quoted() {
        let value = ConfigValue::from_iter([
            ("a", ConfigValue::from("true")),
            ("b", ConfigValue::from("42")),
            ("c", ConfigValue::from("")),
            ("d", ConfigValue::from("two\nlines")),
        ]);
        let text = render(&value, &RenderOptions::default());
        assert_eq!(parse_str(&text).expect("parse"), value);
        assert!(text.contains("d: \"two\\nlines\""));
    }

    #[test]
    fn floats_keep_their_type() {
        let value = ConfigValue::from_iter([("ratio", 2.0), ("nan", f64::NAN)]);
        let text = render(&value, &RenderOptions::default());
        assert_eq!(text, "ratio: 2.0\nnan: .nan\n");
    }

    #[test]
    fn json_mode() {
        let value = ConfigValue::from_iter([
            ("a", ConfigValue::from(1).with_comment("ignored")),
            ("b", ConfigValue::from(vec![ConfigValue::from("x")])),
            ("c", ConfigValue::from(f64::INFINITY)),
        ]);
        let text = render(&value, &RenderOptions::json());
        assert_eq!(text, "{\n  \"a\": 1,\n  \"b\": [\n    \"x\"\n  ],\n  \"c\": null\n}\n");
    }

    #[test]
    fn scalar_root() {
        assert_eq!(render(&ConfigValue::from("hi"), &RenderOptions::default()), "hi\n");
        assert_eq!(render(&ConfigValue::null(), &RenderOptions::default()), "null\n");
    }

    #[test]
    fn rendering_is_idempotent() {
        let options = RenderOptions::default();
        assert_eq!(render(&server(), &options), render(&server(), &options));
    }

    #[test]
    fn parsed_text_is_tagged() {
        let text = render(&server(), &RenderOptions::default());
        let parsed = parse_str(&text).expect("parse");
        assert_eq!(parsed, server());
        assert_eq!(parsed.lookup("server.host").map(ConfigValue::origin), Some(Origin::Text));
    }

    fn scalar() -> impl Strategy<Value = ConfigValue> {
        prop_oneof![
            Just(ConfigValue::null()),
            any::<bool>().prop_map(ConfigValue::from),
            any::<i64>().prop_map(ConfigValue::from),
            (-4000i32..4000).prop_map(|n| ConfigValue::from(f64::from(n) / 8.0)),
            "[a-zA-Z0-9 _.:#-]{0,12}".prop_map(ConfigValue::from),
        ]
    }

    fn tree() -> impl Strategy<Value = ConfigValue> {
        scalar().prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(ConfigValue::from),
                prop::collection::vec(("[a-z][a-z0-9_]{0,6}", inner), 0..4)
                    .prop_map(ConfigValue::from_iter),
            ]
        })
    }

    proptest! {
        #[test]
        fn render_then_parse_round_trips(value in tree()) {
            let wrapped = ConfigValue::from_iter([("root", value)]);
            let text = render(&wrapped, &RenderOptions::default());
            let parsed = parse_str(&text).map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(parsed, wrapped);
        }
    }
}
