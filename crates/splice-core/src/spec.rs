//! Declarative query wire format.
//!
//! A query is plain data: a root [`QuerySpec`] naming the node types it
//! accepts, and a tree of [`SubItemSpec`] constraints evaluated against the
//! matched node's named children. The JSON shape is:
//!
//! ```json
//! {
//!   "type": "expression_statement",
//!   "capture": "statement",
//!   "items": [
//!     {
//!       "type": "call_expression",
//!       "items": [{ "field": "function", "capture": "callee", "text": "console.log" }]
//!     }
//!   ]
//! }
//! ```
//!
//! Sub-items carry exactly one selector key (`type`, `field`, or
//! `wildcard`). Text predicates are either a literal string or a
//! `{ "regex": "..." }` object; type sets, field lists, and text predicates
//! all accept a single value or a list of alternatives.

use std::slice;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while decoding or encoding a query specification.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SpecError {
    /// The JSON document does not describe a valid query.
    #[error("invalid query specification: {0}")]
    Json(#[from] serde_json::Error),
}

/// A value given either alone or as a list of alternatives.
///
/// # Example
///
/// ```
/// use splice_core::OneOrMany;
///
/// let kinds = OneOrMany::Many(vec!["a", "b"]);
/// assert_eq!(kinds.iter().count(), 2);
/// assert_eq!(OneOrMany::One("a").iter().count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// A single value.
    One(T),
    /// A list of alternatives.
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Iterates over the alternatives in declaration order.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        match self {
            Self::One(value) => slice::from_ref(value).iter(),
            Self::Many(values) => values.iter(),
        }
    }

    /// Returns whether no alternatives are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(_) => false,
            Self::Many(values) => values.is_empty(),
        }
    }
}

impl<'a, T> IntoIterator for &'a OneOrMany<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<&str> for OneOrMany<String> {
    fn from(value: &str) -> Self {
        Self::One(value.to_owned())
    }
}

impl From<String> for OneOrMany<String> {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<Vec<String>> for OneOrMany<String> {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

impl From<&[&str]> for OneOrMany<String> {
    fn from(values: &[&str]) -> Self {
        Self::Many(values.iter().map(|value| (*value).to_owned()).collect())
    }
}

/// A text predicate tested against a node's full source slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextSpec {
    /// The node text must equal this string exactly.
    Literal(String),
    /// The node text must contain a match for this regular expression.
    Regex {
        /// Regular expression source, in `regex` crate syntax.
        regex: String,
    },
}

/// The node test a sub-item applies before anything else.
///
/// Serialised as the key that selects it: `"type"`, `"field"`, or
/// `"wildcard"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    /// The node type must be one of these tags.
    #[serde(rename = "type")]
    Kind(OneOrMany<String>),
    /// The node must occupy one of these fields of its parent.
    Field(OneOrMany<String>),
    /// Any node matches. Only `true` is meaningful.
    Wildcard(bool),
}

/// A constraint evaluated against the named children of a matched node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubItemSpec {
    /// The node test.
    #[serde(flatten)]
    pub selector: Selector,
    /// Name under which the satisfying child is captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture: Option<String>,
    /// Text predicates; any alternative may match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<OneOrMany<TextSpec>>,
    /// Constraints evaluated against the satisfying child's named children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<SubItemSpec>>,
    /// Whether absence of a satisfying child still counts as satisfied.
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,
}

impl SubItemSpec {
    fn with_selector(selector: Selector) -> Self {
        Self {
            selector,
            capture: None,
            text: None,
            items: None,
            optional: false,
        }
    }

    /// Creates a sub-item matching nodes of the given type(s).
    #[must_use]
    pub fn kind(kinds: impl Into<OneOrMany<String>>) -> Self {
        Self::with_selector(Selector::Kind(kinds.into()))
    }

    /// Creates a sub-item matching nodes that occupy the given field(s).
    #[must_use]
    pub fn field(fields: impl Into<OneOrMany<String>>) -> Self {
        Self::with_selector(Selector::Field(fields.into()))
    }

    /// Creates a sub-item matching any node.
    #[must_use]
    pub fn wildcard() -> Self {
        Self::with_selector(Selector::Wildcard(true))
    }

    /// Captures the satisfying child under `name`.
    #[must_use]
    pub fn with_capture(mut self, name: impl Into<String>) -> Self {
        self.capture = Some(name.into());
        self
    }

    /// Requires the child's text to equal `text`.
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_text_spec(TextSpec::Literal(text.into()))
    }

    /// Requires the child's text to match the regular expression `pattern`.
    #[must_use]
    pub fn with_regex(self, pattern: impl Into<String>) -> Self {
        self.with_text_spec(TextSpec::Regex {
            regex: pattern.into(),
        })
    }

    fn with_text_spec(mut self, spec: TextSpec) -> Self {
        self.text = Some(match self.text.take() {
            None => OneOrMany::One(spec),
            Some(OneOrMany::One(existing)) => OneOrMany::Many(vec![existing, spec]),
            Some(OneOrMany::Many(mut existing)) => {
                existing.push(spec);
                OneOrMany::Many(existing)
            }
        });
        self
    }

    /// Adds a nested constraint on the child's named children.
    #[must_use]
    pub fn with_item(mut self, item: Self) -> Self {
        self.items.get_or_insert_with(Vec::new).push(item);
        self
    }

    /// Marks this sub-item as optional.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// The root of a declarative query.
///
/// # Example
///
/// ```
/// use splice_core::{QuerySpec, SubItemSpec};
///
/// let spec = QuerySpec::new("call_expression")
///     .with_item(SubItemSpec::field("function").with_text("console.log").with_capture("callee"));
/// let json = spec.to_json()?;
/// assert_eq!(QuerySpec::from_json(&json)?, spec);
/// # Ok::<(), splice_core::SpecError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySpec {
    /// Node types accepted at the root.
    #[serde(rename = "type")]
    pub kinds: OneOrMany<String>,
    /// Name under which the root node is captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture: Option<String>,
    /// Constraints evaluated against the root's named children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<SubItemSpec>>,
    /// Emit one capture set per repeated group of children.
    #[serde(default, skip_serializing_if = "is_false")]
    pub capture_all: bool,
}

impl QuerySpec {
    /// Creates a query accepting nodes of the given type(s).
    #[must_use]
    pub fn new(kinds: impl Into<OneOrMany<String>>) -> Self {
        Self {
            kinds: kinds.into(),
            capture: None,
            items: None,
            capture_all: false,
        }
    }

    /// Captures the root node under `name`.
    #[must_use]
    pub fn with_capture(mut self, name: impl Into<String>) -> Self {
        self.capture = Some(name.into());
        self
    }

    /// Adds a constraint on the root's named children.
    #[must_use]
    pub fn with_item(mut self, item: SubItemSpec) -> Self {
        self.items.get_or_insert_with(Vec::new).push(item);
        self
    }

    /// Switches the query to capture-all mode.
    #[must_use]
    pub const fn with_capture_all(mut self) -> Self {
        self.capture_all = true;
        self
    }

    /// Decodes a query from its JSON wire format.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Json`] if the document is malformed.
    pub fn from_json(input: &str) -> Result<Self, SpecError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Encodes the query in its JSON wire format.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Json`] if serialisation fails.
    pub fn to_json(&self) -> Result<String, SpecError> {
        Ok(serde_json::to_string(self)?)
    }
}

// serde's `skip_serializing_if` hands over a reference.
const fn is_false(value: &bool) -> bool {
    !*value
}
