//! Compiled structural queries.
//!
//! A [`Query`] is compiled from a [`QuerySpec`] and evaluated against single
//! nodes with [`Query::match_node`], across a whole tree with
//! [`Query::find_all`], or as one [`DispatchTable`] among many in a shared
//! [`traverse`] walk via [`Query::dispatch_table`].
//!
//! Sub-items are evaluated independently and existentially: each must be
//! satisfied by at least one named child, and one child may satisfy several
//! sub-items.
//!
//! [`traverse`]: crate::traverse

mod capture;
mod matching;

use std::collections::HashSet;

use regex::Regex;
use splice_core::{OneOrMany, QuerySpec, Selector, SubItemSpec, TextSpec};
use tracing::debug;

use crate::error::SyntaxError;
use crate::node::SyntaxNode;
use crate::parser::ParseResult;
use crate::traverse::{DispatchTable, Visit, traverse};

pub use capture::CaptureSet;

const QUERY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::query");

/// What a match callback asks of the traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchAction {
    /// Keep descending into the matched node.
    #[default]
    Continue,
    /// Skip the matched node's subtree.
    Skip,
}

/// How a sub-item selects candidate nodes.
#[derive(Debug, Clone)]
enum NodeTest {
    Kind(Vec<String>),
    Field(Vec<String>),
    Wildcard,
}

#[derive(Debug, Clone)]
enum TextTest {
    Exact(String),
    Pattern(Regex),
}

#[derive(Debug, Clone)]
struct SubPattern {
    test: NodeTest,
    capture: Option<String>,
    text: Vec<TextTest>,
    items: Vec<SubPattern>,
    optional: bool,
}

/// A compiled query, ready to match nodes.
///
/// # Example
///
/// ```ignore
/// let query = Query::compile(&QuerySpec::new("call_expression").with_item(
///     SubItemSpec::field("function").with_text("console.log").with_capture("callee"),
/// ))?;
/// for captures in query.find_all(&parsed)? {
///     println!("{:?}", captures.byte_range("callee"));
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Query {
    kinds: Vec<String>,
    capture: Option<String>,
    items: Vec<SubPattern>,
    capture_all: bool,
}

impl Query {
    /// Compiles `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::InvalidQuery`] for empty type or field sets, a
    /// `wildcard: false` selector, or a regex that does not compile, and
    /// [`SyntaxError::DuplicateCapture`] when a capture name appears twice
    /// outside capture-all mode.
    pub fn compile(spec: &QuerySpec) -> Result<Self, SyntaxError> {
        let kinds = non_empty(&spec.kinds, "type")?;
        let items = spec
            .items
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(SubPattern::compile)
            .collect::<Result<Vec<_>, _>>()?;
        if !spec.capture_all {
            ensure_unique_captures(spec)?;
        }

        Ok(Self {
            kinds,
            capture: spec.capture.clone(),
            items,
            capture_all: spec.capture_all,
        })
    }

    /// Decodes and compiles a query from its JSON wire format.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::Spec`] for malformed JSON and any error
    /// [`Query::compile`] reports.
    pub fn from_json(input: &str) -> Result<Self, SyntaxError> {
        Self::compile(&QuerySpec::from_json(input)?)
    }

    /// Returns the node types accepted at the root.
    #[must_use]
    pub fn kinds(&self) -> &[String] {
        &self.kinds
    }

    /// Returns whether the query emits one capture set per repeated group.
    #[must_use]
    pub const fn is_capture_all(&self) -> bool {
        self.capture_all
    }

    /// Returns whether the root accepts nodes of type `kind`.
    #[must_use]
    pub fn accepts(&self, kind: &str) -> bool {
        self.kinds.iter().any(|accepted| accepted == kind)
    }

    /// Matches the query against `node` alone.
    ///
    /// Returns no capture sets when the node does not match, one when it
    /// does, and one per completed group in capture-all mode.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::DuplicateCapture`] if a capture name would be
    /// bound twice within one set.
    pub fn match_node<'t>(&self, node: SyntaxNode<'t>) -> Result<Vec<CaptureSet<'t>>, SyntaxError> {
        if !self.accepts(node.kind()) {
            return Ok(Vec::new());
        }
        let mut root = CaptureSet::new(node);
        if let Some(name) = &self.capture {
            root.insert(name, node)?;
        }
        if self.items.is_empty() {
            return Ok(vec![root]);
        }
        if self.capture_all {
            return self.match_groups(node, root);
        }
        Ok(self.match_all_items(node, root)?.into_iter().collect())
    }

    /// Collects every match in the parsed tree, in pre-order.
    ///
    /// Matched subtrees are still searched, so nested matches are reported.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Query::match_node`].
    pub fn find_all<'t>(&self, parsed: &'t ParseResult) -> Result<Vec<CaptureSet<'t>>, SyntaxError> {
        let mut found = Vec::new();
        let mut tables = [self.dispatch_table(
            |sink: &mut Vec<CaptureSet<'t>>, captures: &CaptureSet<'t>| {
                sink.push(captures.clone());
                Ok::<_, SyntaxError>(MatchAction::Continue)
            },
        )];
        let visited = traverse(parsed.root(), &mut found, &mut tables)?;
        debug!(
            target: QUERY_TARGET,
            kinds = ?self.kinds,
            visited,
            matches = found.len(),
            "query search complete"
        );
        Ok(found)
    }

    /// Wraps the query as a dispatch table for [`traverse`].
    ///
    /// `on_match` receives the shared traversal context and each capture set
    /// produced at a node. The subtree is skipped if any call returns
    /// [`MatchAction::Skip`].
    pub fn dispatch_table<'a, 't, C, E, F>(&'a self, mut on_match: F) -> DispatchTable<'a, 't, C, E>
    where
        F: FnMut(&mut C, &CaptureSet<'t>) -> Result<MatchAction, E> + 'a,
        E: From<SyntaxError>,
    {
        DispatchTable::new().on_kinds(&self.kinds, move |ctx: &mut C, node: SyntaxNode<'t>| {
            let mut visit = Visit::Continue;
            for captures in self.match_node(node)? {
                if on_match(ctx, &captures)? == MatchAction::Skip {
                    visit = Visit::Skip;
                }
            }
            Ok(visit)
        })
    }
}

impl SubPattern {
    fn compile(spec: &SubItemSpec) -> Result<Self, SyntaxError> {
        let test = match &spec.selector {
            Selector::Kind(kinds) => NodeTest::Kind(non_empty(kinds, "type")?),
            Selector::Field(fields) => NodeTest::Field(non_empty(fields, "field")?),
            Selector::Wildcard(true) => NodeTest::Wildcard,
            Selector::Wildcard(false) => {
                return Err(SyntaxError::invalid_query("`wildcard` selector must be true"));
            }
        };
        let text = spec
            .text
            .as_ref()
            .map(compile_text)
            .transpose()?
            .unwrap_or_default();
        let items = spec
            .items
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(Self::compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            test,
            capture: spec.capture.clone(),
            text,
            items,
            optional: spec.optional,
        })
    }
}

fn non_empty(values: &OneOrMany<String>, key: &str) -> Result<Vec<String>, SyntaxError> {
    let collected: Vec<String> = values.iter().cloned().collect();
    if collected.is_empty() || collected.iter().any(String::is_empty) {
        return Err(SyntaxError::invalid_query(format!(
            "`{key}` must list at least one non-empty name"
        )));
    }
    Ok(collected)
}

fn compile_text(alternatives: &OneOrMany<TextSpec>) -> Result<Vec<TextTest>, SyntaxError> {
    if alternatives.is_empty() {
        return Err(SyntaxError::invalid_query("`text` must list at least one predicate"));
    }
    alternatives
        .iter()
        .map(|spec| match spec {
            TextSpec::Literal(text) => Ok(TextTest::Exact(text.clone())),
            TextSpec::Regex { regex } => Regex::new(regex)
                .map(TextTest::Pattern)
                .map_err(|err| SyntaxError::invalid_query(format!("bad regex `{regex}`: {err}"))),
        })
        .collect()
}

fn ensure_unique_captures(spec: &QuerySpec) -> Result<(), SyntaxError> {
    let mut seen = HashSet::new();
    if let Some(name) = &spec.capture {
        seen.insert(name.as_str());
    }
    let mut pending: Vec<&SubItemSpec> = spec.items.iter().flatten().collect();
    while let Some(item) = pending.pop() {
        if let Some(name) = &item.capture
            && !seen.insert(name.as_str())
        {
            return Err(SyntaxError::duplicate_capture(name));
        }
        pending.extend(item.items.iter().flatten());
    }
    Ok(())
}
