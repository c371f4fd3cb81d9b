//! Validation rule, rule set, and result types.
//!
//! Rules are plain data: they serialize to and from JSON so a rule set can
//! be shipped to a client, stored, or asserted on in tests without running
//! any UI code.

use std::collections::BTreeMap;

use chrono::Datelike;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Keyword used in serialized rules for [`Bound::CurrentYear`].
pub const CURRENT_YEAR_KEYWORD: &str = "current_year";

/// Field name -> error message. A field without an error is absent.
pub type ValidationErrors = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// Bound
// ---------------------------------------------------------------------------

/// A numeric bound for `min` / `max`.
///
/// `CurrentYear` is resolved against [`ValidationContext::current_year`] when
/// the rule is evaluated, never when the rule is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBound", into = "RawBound")]
pub enum Bound {
    Value(f64),
    CurrentYear,
}

impl Bound {
    /// Resolve the bound to a concrete number.
    pub fn resolve(self, current_year: i32) -> f64 {
        match self {
            Bound::Value(v) => v,
            Bound::CurrentYear => f64::from(current_year),
        }
    }
}

impl From<f64> for Bound {
    fn from(v: f64) -> Self {
        Bound::Value(v)
    }
}

impl From<i32> for Bound {
    fn from(v: i32) -> Self {
        Bound::Value(f64::from(v))
    }
}

/// Wire form of [`Bound`]: a JSON number or the `"current_year"` keyword.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawBound {
    Number(f64),
    Keyword(String),
}

impl TryFrom<RawBound> for Bound {
    type Error = String;

    fn try_from(raw: RawBound) -> Result<Self, Self::Error> {
        match raw {
            RawBound::Number(v) => Ok(Bound::Value(v)),
            RawBound::Keyword(k) if k == CURRENT_YEAR_KEYWORD => Ok(Bound::CurrentYear),
            RawBound::Keyword(k) => Err(format!(
                "unknown bound keyword '{k}', expected a number or '{CURRENT_YEAR_KEYWORD}'"
            )),
        }
    }
}

impl From<Bound> for RawBound {
    fn from(bound: Bound) -> Self {
        match bound {
            Bound::Value(v) => RawBound::Number(v),
            Bound::CurrentYear => RawBound::Keyword(CURRENT_YEAR_KEYWORD.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

/// A compiled regular expression that must match the whole value.
///
/// Compilation happens when the rule is authored (or deserialized), so an
/// invalid pattern surfaces as an error there and never during validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern as written by the rule author (unanchored).
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl TryFrom<String> for Pattern {
    type Error = regex::Error;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        Pattern::new(&source)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.source
    }
}

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// Constraints attached to one field. A rule with no constraints is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rule {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Other field -> values that make this field required (OR across fields).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub required_when: BTreeMap<String, Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<Bound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Bound>,
    /// Upper bound on the length of a sequence value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub integer: bool,
}

impl Rule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Require this field when `field` holds any of `values`.
    pub fn required_when<I, V>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.required_when
            .entry(field.to_string())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    pub fn min(mut self, bound: impl Into<Bound>) -> Self {
        self.min = Some(bound.into());
        self
    }

    pub fn max(mut self, bound: impl Into<Bound>) -> Self {
        self.max = Some(bound.into());
        self
    }

    pub fn max_items(mut self, limit: usize) -> Self {
        self.max_items = Some(limit);
        self
    }

    pub fn min_length(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self
    }

    pub fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    pub fn pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn integer(mut self) -> Self {
        self.integer = true;
        self
    }

    /// Whether the rule carries no constraint at all.
    pub fn is_noop(&self) -> bool {
        *self == Rule::default()
    }
}

// ---------------------------------------------------------------------------
// RuleSet
// ---------------------------------------------------------------------------

/// Rules keyed by field name. Fields without a rule are never validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: BTreeMap<String, Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the rule for `field`.
    pub fn with(mut self, field: &str, rule: Rule) -> Self {
        self.rules.insert(field.to_string(), rule);
        self
    }

    pub fn get(&self, field: &str) -> Option<&Rule> {
        self.rules.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Rule)> {
        self.rules.iter()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// `(field, dependency)` pairs whose `required_when` dependency is not a
    /// field of this rule set.
    pub fn dangling_dependencies(&self) -> Vec<(&str, &str)> {
        let rules = &self.rules;
        rules
            .iter()
            .flat_map(move |(field, rule)| {
                rule.required_when
                    .keys()
                    .filter(move |dep| !rules.contains_key(dep.as_str()))
                    .map(move |dep| (field.as_str(), dep.as_str()))
            })
            .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, Rule)> for RuleSet {
    fn from_iter<T: IntoIterator<Item = (K, Rule)>>(iter: T) -> Self {
        Self {
            rules: iter.into_iter().map(|(k, r)| (k.into(), r)).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Messages & context
// ---------------------------------------------------------------------------

/// The constraint a field violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    Required,
    Integer,
    Min,
    Max,
    MaxItems,
    MinLength,
    MaxLength,
    Pattern,
}

/// One user-facing message per constraint kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationMessages {
    pub required: String,
    pub integer: String,
    pub min: String,
    pub max: String,
    pub max_items: String,
    pub min_length: String,
    pub max_length: String,
    pub pattern: String,
}

impl Default for ValidationMessages {
    fn default() -> Self {
        Self {
            required: "This field is required.".to_string(),
            integer: "Must be a whole number.".to_string(),
            min: "Value too low.".to_string(),
            max: "Value too high.".to_string(),
            max_items: "Too many items.".to_string(),
            min_length: "Too short.".to_string(),
            max_length: "Too long.".to_string(),
            pattern: "Invalid format.".to_string(),
        }
    }
}

impl ValidationMessages {
    pub fn for_constraint(&self, constraint: Constraint) -> &str {
        match constraint {
            Constraint::Required => &self.required,
            Constraint::Integer => &self.integer,
            Constraint::Min => &self.min,
            Constraint::Max => &self.max,
            Constraint::MaxItems => &self.max_items,
            Constraint::MinLength => &self.min_length,
            Constraint::MaxLength => &self.max_length,
            Constraint::Pattern => &self.pattern,
        }
    }
}

/// Everything a validation run needs besides the values and rules.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationContext {
    /// Value substituted for [`Bound::CurrentYear`].
    pub current_year: i32,
    pub messages: ValidationMessages,
}

impl ValidationContext {
    pub fn new(current_year: i32) -> Self {
        Self {
            current_year,
            messages: ValidationMessages::default(),
        }
    }

    /// Context for the current UTC calendar year with default messages.
    pub fn now() -> Self {
        Self::new(chrono::Utc::now().year())
    }

    pub fn with_messages(mut self, messages: ValidationMessages) -> Self {
        self.messages = messages;
        self
    }
}
