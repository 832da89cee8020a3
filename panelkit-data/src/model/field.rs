//! Field declarations and type coercion

use serde::Deserialize;
use serde::Serialize;

use super::Value;

/// Declared type of a store field.
///
/// Coercion is applied to every record's value for the field when rows are
/// ingested. `Null` always passes through unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Integer, parsed from the leading digits of strings.
    Int,
    /// Floating point number.
    Float,
    /// Boolean: only `"true"`, `"TRUE"`, `true` and `1` are true.
    Boolean,
    /// String, scalars are rendered with their display form.
    String,
    /// Untyped value, kept as-is.
    #[default]
    #[serde(alias = "auto")]
    Object,
}

impl FieldType {
    /// Coerces a value into this type.
    pub fn coerce(self, value: Value) -> Value {
        if value.is_null() {
            return value;
        }
        match self {
            FieldType::Object => value,
            FieldType::Int => match value {
                Value::Int(n) => Value::Int(n),
                Value::Float(n) if n.is_finite() => Value::Int(n.trunc() as i64),
                Value::Bool(b) => Value::Int(b as i64),
                Value::String(s) => parse_leading_int(&s).map(Value::Int).unwrap_or_else(|| {
                    log::warn!("cannot coerce '{s}' to int");
                    Value::Null
                }),
                other => {
                    log::warn!("cannot coerce {} to int", other.type_name());
                    Value::Null
                }
            },
            FieldType::Float => match value {
                Value::Int(n) => Value::Float(n as f64),
                Value::Float(n) => Value::Float(n),
                Value::Bool(b) => Value::Float(if b { 1.0 } else { 0.0 }),
                Value::String(s) => s.trim().parse::<f64>().map(Value::Float).unwrap_or_else(|_| {
                    log::warn!("cannot coerce '{s}' to float");
                    Value::Null
                }),
                other => {
                    log::warn!("cannot coerce {} to float", other.type_name());
                    Value::Null
                }
            },
            FieldType::Boolean => Value::Bool(match value {
                Value::Bool(b) => b,
                Value::String(s) => s == "true" || s == "TRUE",
                Value::Int(n) => n == 1,
                Value::Float(n) => n == 1.0,
                _ => false,
            }),
            FieldType::String => match value {
                Value::String(s) => Value::String(s),
                other => Value::String(other.to_string()),
            },
        }
    }
}

fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|n| n * sign)
}

/// A declared field: name plus type.
///
/// Deserializes either from a bare name (`"title"`) or from an object
/// (`{"name": "price", "type": "float"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FieldDef")]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub kind: FieldType,
}

impl Field {
    /// Creates an untyped field.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldType::Object,
        }
    }

    /// Creates a typed field.
    pub fn typed(name: impl Into<String>, kind: FieldType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldDef {
    Name(String),
    Full {
        name: String,
        #[serde(rename = "type", default)]
        kind: FieldType,
    },
}

impl From<FieldDef> for Field {
    fn from(def: FieldDef) -> Self {
        match def {
            FieldDef::Name(name) => Field::new(name),
            FieldDef::Full { name, kind } => Field::typed(name, kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_truthy_literals() {
        for v in [Value::from("true"), Value::from("TRUE"), Value::from(true), Value::from(1)] {
            assert_eq!(FieldType::Boolean.coerce(v), Value::Bool(true));
        }
        for v in [Value::from("True"), Value::from("1"), Value::from(2), Value::from(false)] {
            assert_eq!(FieldType::Boolean.coerce(v), Value::Bool(false));
        }
    }

    #[test]
    fn test_null_passes_through() {
        for kind in [FieldType::Int, FieldType::Float, FieldType::Boolean, FieldType::String] {
            assert!(kind.coerce(Value::Null).is_null());
        }
    }

    #[test]
    fn test_int_parses_leading_digits() {
        assert_eq!(FieldType::Int.coerce(Value::from("42px")), Value::Int(42));
        assert_eq!(FieldType::Int.coerce(Value::from("-7")), Value::Int(-7));
        assert_eq!(FieldType::Int.coerce(Value::from(3.9)), Value::Int(3));
        assert!(FieldType::Int.coerce(Value::from("abc")).is_null());
    }

    #[test]
    fn test_field_deserializes_from_name_or_object() {
        let fields: Vec<Field> =
            serde_json::from_str(r#"["id", {"name": "price", "type": "float"}]"#).unwrap();
        assert_eq!(fields[0], Field::new("id"));
        assert_eq!(fields[1], Field::typed("price", FieldType::Float));
    }
}
