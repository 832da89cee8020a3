//! Filter types.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use nucleo_matcher::pattern::Atom;
use nucleo_matcher::pattern::AtomKind;
use nucleo_matcher::pattern::CaseMatching;
use nucleo_matcher::pattern::Normalization;
use nucleo_matcher::Config;
use nucleo_matcher::Matcher;
use nucleo_matcher::Utf32Str;
use regex::Regex;
use serde::Deserialize;
use serde::Serialize;

use super::keycode;
use crate::model::Record;
use crate::model::Value;

/// Comparison operator of a [`Filter`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    /// `=`
    #[default]
    Eq,
    /// `!=`
    Ne,
    /// `>=`
    Ge,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `<`
    Lt,
    /// Record value is a member of the filter array.
    In,
    /// Filter value is a member of the record array.
    InSet,
    /// Case-insensitive substring, or SQL pattern with `%`/`_`.
    Like,
    /// Substring over keystroke-normalized text.
    LikeCode,
    /// Unrecognized operator; never matches.
    Unknown(String),
}

impl Operator {
    /// Parses an operator token.
    pub fn parse(token: &str) -> Self {
        match token {
            "=" => Operator::Eq,
            "!=" => Operator::Ne,
            ">=" => Operator::Ge,
            ">" => Operator::Gt,
            "<=" => Operator::Le,
            "<" => Operator::Lt,
            "in" => Operator::In,
            "inset" => Operator::InSet,
            "like" => Operator::Like,
            "likecode" => Operator::LikeCode,
            other => Operator::Unknown(other.to_string()),
        }
    }

    /// The operator token.
    pub fn as_str(&self) -> &str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Ge => ">=",
            Operator::Gt => ">",
            Operator::Le => "<=",
            Operator::Lt => "<",
            Operator::In => "in",
            Operator::InSet => "inset",
            Operator::Like => "like",
            Operator::LikeCode => "likecode",
            Operator::Unknown(token) => token,
        }
    }
}

impl From<String> for Operator {
    fn from(token: String) -> Self {
        Operator::parse(&token)
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field filter: comparison value plus operator.
///
/// # Example
///
/// ```
/// use panelkit_data::query::{Filter, Filters};
///
/// let filters = Filters::new()
///     .with("name", Filter::like("an"))
///     .with("age", Filter::ge(18));
/// assert_eq!(filters.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Value compared against the record's field.
    pub value: Value,
    /// Comparison operator.
    #[serde(default)]
    pub operator: Operator,
}

impl Filter {
    /// Creates a filter with an explicit operator.
    pub fn new(value: impl Into<Value>, operator: Operator) -> Self {
        Self {
            value: value.into(),
            operator,
        }
    }

    /// Equality filter.
    pub fn eq(value: impl Into<Value>) -> Self {
        Self::new(value, Operator::Eq)
    }

    /// Not-equal filter.
    pub fn ne(value: impl Into<Value>) -> Self {
        Self::new(value, Operator::Ne)
    }

    /// Greater-than-or-equal filter.
    pub fn ge(value: impl Into<Value>) -> Self {
        Self::new(value, Operator::Ge)
    }

    /// Greater-than filter.
    pub fn gt(value: impl Into<Value>) -> Self {
        Self::new(value, Operator::Gt)
    }

    /// Less-than-or-equal filter.
    pub fn le(value: impl Into<Value>) -> Self {
        Self::new(value, Operator::Le)
    }

    /// Less-than filter.
    pub fn lt(value: impl Into<Value>) -> Self {
        Self::new(value, Operator::Lt)
    }

    /// Membership filter; the record value must be one of `values`.
    pub fn is_in(values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Self::new(
            Value::Array(values.into_iter().map(Into::into).collect()),
            Operator::In,
        )
    }

    /// Inverse membership; the record's array must contain `value`.
    pub fn in_set(value: impl Into<Value>) -> Self {
        Self::new(value, Operator::InSet)
    }

    /// Substring / pattern filter.
    pub fn like(pattern: impl Into<String>) -> Self {
        Self::new(Value::String(pattern.into()), Operator::Like)
    }

    /// Keystroke-normalized substring filter.
    pub fn like_code(pattern: impl Into<String>) -> Self {
        Self::new(Value::String(pattern.into()), Operator::LikeCode)
    }
}

/// Mapping of field to [`Filter`]. All filters must pass (AND).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filters {
    filters: BTreeMap<String, Filter>,
}

impl Filters {
    /// Creates an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter (builder pattern).
    pub fn with(mut self, field: impl Into<String>, filter: Filter) -> Self {
        self.filters.insert(field.into(), filter);
        self
    }

    /// Inserts or replaces the filter for a field.
    pub fn insert(&mut self, field: impl Into<String>, filter: Filter) {
        self.filters.insert(field.into(), filter);
    }

    /// Removes the filter for a field.
    pub fn remove(&mut self, field: &str) -> Option<Filter> {
        self.filters.remove(field)
    }

    /// Filter for a field.
    pub fn get(&self, field: &str) -> Option<&Filter> {
        self.filters.get(field)
    }

    /// Iterates over `(field, filter)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Filter)> {
        self.filters.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns `true` if no filter is active.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Number of filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Prepares the filters for matching many records.
    pub fn compile(&self) -> FilterSet {
        FilterSet {
            filters: self
                .filters
                .iter()
                .map(|(field, filter)| (field.clone(), CompiledFilter::new(filter)))
                .collect(),
            matcher: Matcher::new(Config::DEFAULT),
            buf: Vec::new(),
        }
    }

    /// Tests one record against every filter.
    pub fn matches(&self, record: &Record) -> bool {
        self.compile().matches(record)
    }
}

enum Pattern {
    Substring(Atom),
    Sql(Regex),
    Code(String),
    Empty,
}

struct CompiledFilter {
    filter: Filter,
    pattern: Option<Pattern>,
}

impl CompiledFilter {
    fn new(filter: &Filter) -> Self {
        let needle = filter.value.to_string();
        let pattern = match filter.operator {
            Operator::Like if needle.is_empty() => Some(Pattern::Empty),
            Operator::Like if needle.contains(['%', '_']) => sql_pattern(&needle).map(Pattern::Sql),
            Operator::Like => Some(Pattern::Substring(Atom::new(
                &needle.to_lowercase(),
                CaseMatching::Ignore,
                Normalization::Never,
                AtomKind::Substring,
                true,
            ))),
            Operator::LikeCode => Some(Pattern::Code(keycode::keycode(&needle))),
            _ => None,
        };
        Self {
            filter: filter.clone(),
            pattern,
        }
    }
}

fn sql_pattern(pattern: &str) -> Option<Regex> {
    let mut source = String::from("(?is)^");
    for c in pattern.chars() {
        match c {
            '%' => source.push_str(".*"),
            '_' => source.push('.'),
            other => source.push_str(&regex::escape(&other.to_string())),
        }
    }
    source.push('$');
    match Regex::new(&source) {
        Ok(regex) => Some(regex),
        Err(e) => {
            log::warn!("invalid like pattern '{pattern}': {e}");
            None
        }
    }
}

/// Compiled filters, reusable across records.
pub struct FilterSet {
    filters: Vec<(String, CompiledFilter)>,
    matcher: Matcher,
    buf: Vec<char>,
}

impl FilterSet {
    /// Returns `true` if the record passes every filter.
    pub fn matches(&mut self, record: &Record) -> bool {
        let Self {
            filters,
            matcher,
            buf,
        } = self;
        filters
            .iter()
            .all(|(field, compiled)| test_value(compiled, record.value(field), matcher, buf))
    }
}

fn test_value(compiled: &CompiledFilter, value: &Value, matcher: &mut Matcher, buf: &mut Vec<char>) -> bool {
    let expected = &compiled.filter.value;
    match &compiled.filter.operator {
        Operator::Eq => value.compare(expected) == Ordering::Equal,
        Operator::Ne => value.compare(expected) != Ordering::Equal,
        Operator::Ge => value.compare(expected) != Ordering::Less,
        Operator::Gt => value.compare(expected) == Ordering::Greater,
        Operator::Le => value.compare(expected) != Ordering::Greater,
        Operator::Lt => value.compare(expected) == Ordering::Less,
        Operator::In => match expected.as_array() {
            Some(options) if !value.is_array() => options.iter().any(|option| option == value),
            _ => false,
        },
        Operator::InSet => match value.as_array() {
            Some(items) if !expected.is_array() => items.iter().any(|item| item == expected),
            _ => false,
        },
        Operator::Like => match &compiled.pattern {
            Some(Pattern::Empty) => true,
            Some(Pattern::Sql(regex)) => regex.is_match(&value.to_string()),
            Some(Pattern::Substring(atom)) => {
                let haystack = value.to_string();
                atom.score(Utf32Str::new(&haystack, buf), matcher).is_some()
            }
            _ => false,
        },
        Operator::LikeCode => match &compiled.pattern {
            Some(Pattern::Code(needle)) => keycode::keycode(&value.to_string()).contains(needle.as_str()),
            _ => false,
        },
        Operator::Unknown(token) => {
            log::debug!("unknown filter operator '{token}', record rejected");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> Record {
        Record::new().set("name", name)
    }

    #[test]
    fn test_like_is_case_insensitive_substring() {
        let filters = Filters::new().with("name", Filter::like("AN"));
        assert!(filters.matches(&record("Banana")));
        assert!(!filters.matches(&record("Cherry")));
    }

    #[test]
    fn test_like_does_not_fold_accents() {
        let filters = Filters::new().with("name", Filter::like("e"));
        assert!(!filters.matches(&record("café")));
        assert!(filters.matches(&record("Cafe")));
    }

    #[test]
    fn test_like_sql_pattern_is_anchored() {
        let filters = Filters::new().with("name", Filter::like("b%a"));
        assert!(filters.matches(&record("banana")));
        assert!(!filters.matches(&record("abba!")));
    }

    #[test]
    fn test_operator_round_trips_through_serde() {
        let filter: Filter = serde_json::from_str(r#"{"value": 3, "operator": ">="}"#).unwrap();
        assert_eq!(filter.operator, Operator::Ge);
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json["operator"], ">=");
    }

    #[test]
    fn test_unknown_operator_fails_closed() {
        let filters = Filters::new().with("name", Filter::new("x", Operator::parse("~=")));
        assert!(!filters.matches(&record("x")));
    }
}
