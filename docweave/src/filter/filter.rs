use crate::collection::Document;
use crate::common::{Value, DOC_ID, FIELD_SEPARATOR};
use crate::errors::WeaveResult;
use itertools::Itertools;
use regex::{Regex, RegexBuilder};
use std::fmt::{Debug, Display, Formatter};

/// One element of a set-membership predicate.
#[derive(Clone)]
pub enum Matcher {
    /// Matches values equal to the given one.
    Exact(Value),
    /// Matches string values containing a match of the pattern.
    Pattern(Regex),
}

impl Matcher {
    /// Compiles a case-insensitive pattern matcher.
    pub fn pattern(pattern: &str) -> WeaveResult<Matcher> {
        Ok(Matcher::Pattern(case_insensitive(pattern)?))
    }

    fn is_match(&self, value: &Value) -> bool {
        match self {
            Matcher::Exact(expected) => value == expected,
            Matcher::Pattern(regex) => value.as_str().is_some_and(|s| regex.is_match(s)),
        }
    }
}

impl From<Value> for Matcher {
    fn from(value: Value) -> Self {
        Matcher::Exact(value)
    }
}

impl From<i64> for Matcher {
    fn from(value: i64) -> Self {
        Matcher::Exact(Value::I64(value))
    }
}

impl From<i32> for Matcher {
    fn from(value: i32) -> Self {
        Matcher::Exact(Value::from(value))
    }
}

impl From<&str> for Matcher {
    fn from(value: &str) -> Self {
        Matcher::Exact(Value::from(value))
    }
}

impl From<String> for Matcher {
    fn from(value: String) -> Self {
        Matcher::Exact(Value::String(value))
    }
}

impl Display for Matcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Matcher::Exact(value) => write!(f, "{}", value),
            Matcher::Pattern(regex) => write!(f, "/{}/i", regex.as_str()),
        }
    }
}

/// The condition a single field has to satisfy.
#[derive(Clone)]
pub enum Predicate {
    /// Field equals the value (or, for array fields, contains it).
    Eq(Value),
    /// Field matches any of the matchers.
    In(Vec<Matcher>),
    /// Field is a string matching the pattern.
    Matches(Regex),
    /// Field is less than the value; only numbers and strings compare.
    Lt(Value),
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::Eq(value) => write!(f, "{{$eq: {}}}", value),
            Predicate::In(matchers) => write!(f, "{{$in: [{}]}}", matchers.iter().join(", ")),
            Predicate::Matches(regex) => write!(f, "{{$regex: /{}/}}", regex.as_str()),
            Predicate::Lt(value) => write!(f, "{{$lt: {}}}", value),
        }
    }
}

/// A predicate bound to a (possibly dotted) field path.
#[derive(Clone)]
pub struct FieldFilter {
    field: String,
    predicate: Predicate,
}

impl FieldFilter {
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Whether the field path addresses a nested (or joined) field.
    pub fn is_dotted(&self) -> bool {
        self.field.contains(FIELD_SEPARATOR)
    }

    fn apply(&self, document: &Document) -> bool {
        let candidates = document.resolve_path(&self.field);
        match &self.predicate {
            Predicate::Eq(expected) => {
                if expected.is_null() && candidates.is_empty() {
                    return true;
                }
                any_value(&candidates, |v| v == expected)
            }
            Predicate::In(matchers) => {
                if candidates.is_empty() {
                    return matchers
                        .iter()
                        .any(|m| matches!(m, Matcher::Exact(Value::Null)));
                }
                any_value(&candidates, |v| matchers.iter().any(|m| m.is_match(v)))
            }
            Predicate::Matches(regex) => {
                any_value(&candidates, |v| v.as_str().is_some_and(|s| regex.is_match(s)))
            }
            Predicate::Lt(bound) => any_value(&candidates, |v| {
                (v.is_number() && bound.is_number() || v.is_string() && bound.is_string())
                    && v < bound
            }),
        }
    }
}

/// Tests every candidate and, for array candidates, each of their elements.
fn any_value<F: Fn(&Value) -> bool>(candidates: &[&Value], test: F) -> bool {
    candidates.iter().any(|candidate| {
        test(*candidate)
            || candidate
                .as_array()
                .is_some_and(|items| items.iter().any(&test))
    })
}

impl Display for FieldFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.predicate)
    }
}

/// A conjunction of field predicates.
///
/// An empty filter matches every document.
#[derive(Clone, Default)]
pub struct Filter {
    clauses: Vec<FieldFilter>,
}

impl Filter {
    /// Creates an empty filter matching every document.
    pub fn new() -> Self {
        Filter { clauses: Vec::new() }
    }

    /// Adds a predicate for `field`.
    pub fn with(mut self, field: &str, predicate: Predicate) -> Self {
        self.clauses.push(FieldFilter {
            field: field.to_string(),
            predicate,
        });
        self
    }

    /// Combines two filters; a document must satisfy both.
    pub fn and(mut self, other: Filter) -> Self {
        self.clauses.extend(other.clauses);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[FieldFilter] {
        &self.clauses
    }

    /// Evaluates the filter against a document.
    pub fn matches(&self, document: &Document) -> bool {
        self.clauses.iter().all(|clause| clause.apply(document))
    }

    /// Whether any clause addresses a dotted field path.
    pub fn has_dotted_field(&self) -> bool {
        self.clauses.iter().any(FieldFilter::is_dotted)
    }

    /// First path segments of the dotted clauses, deduplicated, in clause order.
    pub fn dotted_prefixes(&self) -> Vec<String> {
        self.clauses
            .iter()
            .filter(|c| c.is_dotted())
            .filter_map(|c| c.field.split(FIELD_SEPARATOR).next())
            .unique()
            .map(str::to_string)
            .collect()
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.clauses.iter().join(", "))
    }
}

impl Debug for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

/// Entry point of the fluent filter API, see [field].
pub struct FluentFilter {
    field: String,
}

impl FluentFilter {
    /// Field equals the value.
    pub fn eq<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new().with(&self.field, Predicate::Eq(value.into()))
    }

    /// Field equals any of the values.
    pub fn is_in<T: Into<Matcher>>(self, values: Vec<T>) -> Filter {
        let matchers = values.into_iter().map(Into::into).collect();
        Filter::new().with(&self.field, Predicate::In(matchers))
    }

    /// Field matches the case-sensitive pattern.
    pub fn regex(self, pattern: &str) -> WeaveResult<Filter> {
        let regex = Regex::new(pattern).inspect_err(|e| {
            log::error!("Invalid regex pattern '{}': {}", pattern, e);
        })?;
        Ok(Filter::new().with(&self.field, Predicate::Matches(regex)))
    }

    /// Field matches the pattern ignoring case.
    pub fn text(self, pattern: &str) -> WeaveResult<Filter> {
        let regex = case_insensitive(pattern)?;
        Ok(Filter::new().with(&self.field, Predicate::Matches(regex)))
    }

    /// Field is strictly less than the value.
    pub fn lt<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new().with(&self.field, Predicate::Lt(value.into()))
    }
}

fn case_insensitive(pattern: &str) -> WeaveResult<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .inspect_err(|e| log::error!("Invalid regex pattern '{}': {}", pattern, e))
        .map_err(Into::into)
}

/// Starts a filter on `name`.
pub fn field(name: &str) -> FluentFilter {
    FluentFilter {
        field: name.to_string(),
    }
}

/// A filter matching every document.
pub fn all() -> Filter {
    Filter::new()
}

/// A filter matching the document with the given `_id`.
pub fn by_id(id: i64) -> Filter {
    field(DOC_ID).eq(id)
}
