//! Declarative field validation
//!
//! [`ValidatorHandler`] runs an ordered list of [`FieldValidator`]s over every
//! bound field. On write each validator may describe its constraint as a
//! comment; on read the first failing validator either aborts the conversion
//! or, in warn mode, logs the failure and substitutes a coerced value.

use std::fmt::{self, Debug};
use std::sync::Arc;

use confbind_value::{ConfigValue, Number, ValueKind};

use crate::error::{Error, Result};
use crate::field::{BoundField, Constraint};
use crate::handler::FieldHandler;
use crate::path::FieldPath;
use crate::writer::TreeWriter;

/// Rule that checks, describes and repairs field values
pub trait FieldValidator: Send + Sync + Debug {
    /// Check a value
    fn is_valid(&self, field: &BoundField, value: &ConfigValue) -> bool;

    /// Human-readable constraint description, if the field has one
    fn describe(&self, field: &BoundField) -> Option<String>;

    /// Nearest valid value
    fn coerce(&self, field: &BoundField, value: &ConfigValue) -> ConfigValue;
}

/// Membership in a fixed string set
#[derive(Debug, Default, Clone, Copy)]
pub struct StringSetValidator;

impl StringSetValidator {
    fn sets(field: &BoundField) -> impl Iterator<Item = (&[String], bool)> + '_ {
        field.constraints().iter().filter_map(|c| match c {
            Constraint::OneOf { values, invert } => Some((values.as_slice(), *invert)),
            _ => None,
        })
    }

    fn text(value: &ConfigValue) -> Option<String> {
        match value.kind() {
            ValueKind::String(s) => Some(s.clone()),
            ValueKind::Bool(_) | ValueKind::Number(_) => Some(value.to_string()),
            _ => None,
        }
    }
}

impl FieldValidator for StringSetValidator {
    fn is_valid(&self, field: &BoundField, value: &ConfigValue) -> bool {
        let Some(text) = Self::text(value) else {
            return true;
        };
        Self::sets(field).all(|(values, invert)| values.contains(&text) != invert)
    }

    fn describe(&self, field: &BoundField) -> Option<String> {
        let lines: Vec<_> = Self::sets(field)
            .map(|(values, invert)| {
                let label = if invert { "invalid" } else { "valid" };
                format!("{label} values: [{}]", values.join(", "))
            })
            .collect();
        (!lines.is_empty()).then(|| lines.join("\n"))
    }

    fn coerce(&self, field: &BoundField, value: &ConfigValue) -> ConfigValue {
        let Some(text) = Self::text(value) else {
            return value.clone();
        };
        for (values, invert) in Self::sets(field) {
            if values.contains(&text) == invert {
                return match (invert, values.first()) {
                    (false, Some(first)) => ConfigValue::from(first.as_str()),
                    (true, _) if !values.iter().any(String::is_empty) => ConfigValue::from(""),
                    _ => value.clone(),
                };
            }
        }
        value.clone()
    }
}

/// Inclusive range for integer fields
///
/// Numeric strings are checked too; non-numeric values pass and are left to
/// the type check.
#[derive(Debug, Default, Clone, Copy)]
pub struct IntRangeValidator;

impl IntRangeValidator {
    fn ranges(field: &BoundField) -> impl Iterator<Item = (i64, i64)> + '_ {
        field.constraints().iter().filter_map(|c| match *c {
            Constraint::IntRange { min, max } => Some((min, max)),
            _ => None,
        })
    }

    #[allow(clippy::cast_possible_truncation)]
    fn integer(value: &ConfigValue) -> Option<i128> {
        let number = match value.kind() {
            ValueKind::Number(n) => *n,
            ValueKind::String(s) => s.parse::<Number>().ok()?,
            _ => return None,
        };
        match number {
            Number::Int(i) => Some(i128::from(i)),
            Number::UInt(u) => Some(i128::from(u)),
            Number::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(f as i128),
            Number::Float(_) => None,
        }
    }
}

impl FieldValidator for IntRangeValidator {
    fn is_valid(&self, field: &BoundField, value: &ConfigValue) -> bool {
        let Some(n) = Self::integer(value) else {
            return true;
        };
        Self::ranges(field).all(|(min, max)| (i128::from(min)..=i128::from(max)).contains(&n))
    }

    fn describe(&self, field: &BoundField) -> Option<String> {
        let lines: Vec<_> = Self::ranges(field)
            .map(|(min, max)| format!("valid range: [{min}, {max}]"))
            .collect();
        (!lines.is_empty()).then(|| lines.join("\n"))
    }

    fn coerce(&self, field: &BoundField, value: &ConfigValue) -> ConfigValue {
        let Some(mut n) = Self::integer(value) else {
            return value.clone();
        };
        for (min, max) in Self::ranges(field) {
            n = n.clamp(i128::from(min), i128::from(max));
        }
        i64::try_from(n).map_or_else(|_| value.clone(), ConfigValue::from)
    }
}

/// Inclusive range for floating fields
///
/// NaN never satisfies a range and coerces to the lower bound.
#[derive(Debug, Default, Clone, Copy)]
pub struct FloatRangeValidator;

impl FloatRangeValidator {
    fn ranges(field: &BoundField) -> impl Iterator<Item = (f64, f64)> + '_ {
        field.constraints().iter().filter_map(|c| match *c {
            Constraint::FloatRange { min, max } => Some((min, max)),
            _ => None,
        })
    }

    fn float(value: &ConfigValue) -> Option<f64> {
        match value.kind() {
            ValueKind::Number(n) => Some(n.as_f64()),
            ValueKind::String(s) => s.parse::<Number>().ok().map(|n| n.as_f64()),
            _ => None,
        }
    }
}

impl FieldValidator for FloatRangeValidator {
    fn is_valid(&self, field: &BoundField, value: &ConfigValue) -> bool {
        let Some(f) = Self::float(value) else {
            return true;
        };
        Self::ranges(field).all(|(min, max)| (min..=max).contains(&f))
    }

    fn describe(&self, field: &BoundField) -> Option<String> {
        let lines: Vec<_> = Self::ranges(field)
            .map(|(min, max)| format!("valid range: [{min}, {max}]"))
            .collect();
        (!lines.is_empty()).then(|| lines.join("\n"))
    }

    fn coerce(&self, field: &BoundField, value: &ConfigValue) -> ConfigValue {
        let Some(mut f) = Self::float(value) else {
            return value.clone();
        };
        if f.is_nan() {
            f = Self::ranges(field)
                .next()
                .map(|(min, _)| min)
                .filter(|min| min.is_finite())
                .unwrap_or(0.0);
        }
        for (min, max) in Self::ranges(field) {
            f = f.max(min).min(max);
        }
        ConfigValue::from(f)
    }
}

/// Dispatches to the validators a field declares by reference
#[derive(Debug, Default, Clone, Copy)]
pub struct CustomValidator;

impl CustomValidator {
    fn declared(field: &BoundField) -> impl Iterator<Item = &Arc<dyn FieldValidator>> + '_ {
        field.constraints().iter().filter_map(|c| match c {
            Constraint::Custom(validator) => Some(validator),
            _ => None,
        })
    }
}

impl FieldValidator for CustomValidator {
    fn is_valid(&self, field: &BoundField, value: &ConfigValue) -> bool {
        Self::declared(field).all(|v| v.is_valid(field, value))
    }

    fn describe(&self, field: &BoundField) -> Option<String> {
        let lines: Vec<_> = Self::declared(field)
            .filter_map(|v| v.describe(field))
            .collect();
        (!lines.is_empty()).then(|| lines.join("\n"))
    }

    fn coerce(&self, field: &BoundField, value: &ConfigValue) -> ConfigValue {
        Self::declared(field)
            .find(|v| !v.is_valid(field, value))
            .map_or_else(|| value.clone(), |v| v.coerce(field, value))
    }
}

/// Field handler running validators in order
#[derive(Clone)]
pub struct ValidatorHandler {
    fail_hard: bool,
    validators: Vec<Arc<dyn FieldValidator>>,
}

impl ValidatorHandler {
    /// Create handler with no validators
    #[must_use]
    pub fn new(fail_hard: bool) -> Self {
        Self {
            fail_hard,
            validators: Vec::new(),
        }
    }

    /// Handler with the built-in validators: custom, integer range, float
    /// range, string set
    #[must_use]
    pub fn with_defaults(fail_hard: bool) -> Self {
        let mut handler = Self::new(fail_hard);
        handler.register(Arc::new(CustomValidator));
        handler.register(Arc::new(IntRangeValidator));
        handler.register(Arc::new(FloatRangeValidator));
        handler.register(Arc::new(StringSetValidator));
        handler
    }

    /// Append a validator
    pub fn register(&mut self, validator: Arc<dyn FieldValidator>) {
        self.validators.push(validator);
    }

    /// Whether failures abort the conversion
    #[inline]
    #[must_use]
    pub fn fails_hard(&self) -> bool {
        self.fail_hard
    }

    /// Get number of validators
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Check if handler has no validators
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl Debug for ValidatorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorHandler")
            .field("fail_hard", &self.fail_hard)
            .field("validators", &self.validators.len())
            .finish()
    }
}

impl FieldHandler for ValidatorHandler {
    fn on_write(
        &self,
        field: &BoundField,
        _value: &ConfigValue,
        writer: &mut TreeWriter<'_>,
    ) -> Result<()> {
        for validator in &self.validators {
            if let Some(description) = validator.describe(field) {
                writer.set_comment(description);
            }
        }
        Ok(())
    }

    fn on_read(
        &self,
        field: &BoundField,
        path: &FieldPath,
        value: &ConfigValue,
    ) -> Result<Option<ConfigValue>> {
        let mut replaced: Option<ConfigValue> = None;
        for validator in &self.validators {
            let current = replaced.as_ref().unwrap_or(value);
            if validator.is_valid(field, current) {
                continue;
            }
            let constraint = validator
                .describe(field)
                .unwrap_or_else(|| "invalid value".to_string());
            if self.fail_hard {
                return Err(Error::validation(path.clone(), current.to_string(), constraint));
            }
            tracing::warn!(
                "Field '{}' has incorrect value ({}): {}",
                path,
                current,
                constraint
            );
            replaced = Some(validator.coerce(field, current));
        }
        Ok(replaced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> BoundField {
        BoundField::new("value")
    }

    #[test]
    fn string_set() {
        let mut f = field();
        f.one_of(["foo", "bar"]);
        let v = StringSetValidator;
        assert!(v.is_valid(&f, &"foo".into()));
        assert!(!v.is_valid(&f, &"invalid".into()));
        assert!(v.is_valid(&f, &ConfigValue::null()));
        assert_eq!(v.describe(&f).as_deref(), Some("valid values: [foo, bar]"));
        assert_eq!(v.coerce(&f, &"invalid".into()), ConfigValue::from("foo"));
    }

    #[test]
    fn inverted_string_set() {
        let mut f = field();
        f.none_of(["reserved"]);
        let v = StringSetValidator;
        assert!(v.is_valid(&f, &"alice".into()));
        assert!(!v.is_valid(&f, &"reserved".into()));
        assert_eq!(v.describe(&f).as_deref(), Some("invalid values: [reserved]"));
        assert_eq!(v.coerce(&f, &"reserved".into()), ConfigValue::from(""));
    }

    #[test]
    fn int_range() {
        let mut f = field();
        f.int_range(0, 50);
        let v = IntRangeValidator;
        assert!(v.is_valid(&f, &5.into()));
        assert!(v.is_valid(&f, &"50".into()));
        assert!(!v.is_valid(&f, &100.into()));
        assert!(!v.is_valid(&f, &(-1).into()));
        assert!(v.is_valid(&f, &"abc".into()));
        assert_eq!(v.describe(&f).as_deref(), Some("valid range: [0, 50]"));
        assert_eq!(v.coerce(&f, &100.into()), ConfigValue::from(50));
        assert_eq!(v.coerce(&f, &u64::MAX.into()), ConfigValue::from(50));
    }

    #[test]
    fn float_range() {
        let mut f = field();
        f.float_range(0.5, 1.5);
        let v = FloatRangeValidator;
        assert!(v.is_valid(&f, &1.0.into()));
        assert!(v.is_valid(&f, &1.into()));
        assert!(!v.is_valid(&f, &2.0.into()));
        assert!(!v.is_valid(&f, &f64::NAN.into()));
        assert_eq!(v.coerce(&f, &2.0.into()), ConfigValue::from(1.5));
        assert_eq!(v.coerce(&f, &f64::NAN.into()), ConfigValue::from(0.5));
    }

    #[test]
    fn nan_coerces_to_lower_bound_even_when_zero_is_allowed() {
        let mut f = field();
        f.float_range(-5.0, 5.0);
        let v = FloatRangeValidator;
        assert!(!v.is_valid(&f, &f64::NAN.into()));
        assert_eq!(v.coerce(&f, &f64::NAN.into()), ConfigValue::from(-5.0));
        assert_eq!(v.coerce(&field(), &f64::NAN.into()), ConfigValue::from(0.0));
    }

    #[test]
    fn no_constraint_means_valid() {
        let f = field();
        assert!(StringSetValidator.is_valid(&f, &"x".into()));
        assert!(IntRangeValidator.is_valid(&f, &1000.into()));
        assert_eq!(IntRangeValidator.describe(&f), None);
    }

    #[derive(Debug)]
    struct Even;

    impl FieldValidator for Even {
        fn is_valid(&self, _field: &BoundField, value: &ConfigValue) -> bool {
            value
                .as_number()
                .and_then(|n| n.as_i64())
                .map_or(true, |n| n % 2 == 0)
        }

        fn describe(&self, _field: &BoundField) -> Option<String> {
            Some("must be even".to_string())
        }

        fn coerce(&self, _field: &BoundField, value: &ConfigValue) -> ConfigValue {
            value
                .as_number()
                .and_then(|n| n.as_i64())
                .map_or_else(|| value.clone(), |n| ConfigValue::from(n - 1))
        }
    }

    #[test]
    fn custom_dispatches_by_reference() {
        let mut f = field();
        f.validator(Arc::new(Even));
        let v = CustomValidator;
        assert!(v.is_valid(&f, &4.into()));
        assert!(!v.is_valid(&f, &3.into()));
        assert_eq!(v.describe(&f).as_deref(), Some("must be even"));
        assert_eq!(v.coerce(&f, &3.into()), ConfigValue::from(2));
    }

    #[test]
    fn fail_hard_reports_path_and_value() {
        let mut f = field();
        f.one_of(["foo", "bar"]);
        let handler = ValidatorHandler::with_defaults(true);
        let path = FieldPath::root().key("value");
        let err = handler.on_read(&f, &path, &"invalid".into()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "field '$.value' has incorrect value (invalid): valid values: [foo, bar]"
        );
        assert_eq!(handler.on_read(&f, &path, &"foo".into()).expect("valid"), None);
    }

    #[test]
    fn warn_mode_coerces() {
        let mut f = field();
        f.int_range(0, 50);
        let handler = ValidatorHandler::with_defaults(false);
        let out = handler
            .on_read(&f, &FieldPath::root(), &100.into())
            .expect("warn mode");
        assert_eq!(out, Some(ConfigValue::from(50)));
    }

    #[test]
    fn write_emits_descriptions() {
        let mut f = field();
        f.int_range(0, 150);
        let handler = ValidatorHandler::with_defaults(true);
        let mut writer = TreeWriter::new();
        writer.begin_object().expect("begin");
        writer.name("value").expect("name");
        handler.on_write(&f, &1.into(), &mut writer).expect("write");
        writer.value(1).expect("value");
        writer.end_object().expect("end");
        let tree = writer.finish().expect("finish");
        assert_eq!(
            tree.get("value").map(ConfigValue::comments),
            Some(&["valid range: [0, 150]".to_string()][..])
        );
    }
}
