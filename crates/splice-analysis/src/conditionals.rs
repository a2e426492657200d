//! Dead-conditional elimination.
//!
//! Every `if` statement and ternary expression whose condition resolves to a
//! boolean constant is replaced by the branch that always runs. A block
//! branch is unwrapped into the surrounding statement list and re-indented,
//! unless the block declares a name that shadows an outer binding or that a
//! sibling block already unwrapped into the same list, or the construct does
//! not sit directly in a statement list. Such blocks keep their braces. When the false branch is taken and there is
//! none, the construct is removed.

use std::collections::{HashMap, HashSet};

use splice_core::{CodeEdit, EngineConfig};
use splice_syntax::SyntaxNode;
use tracing::trace;

use crate::error::AnalysisError;
use crate::layout::{is_statement_list, line_indent, reindent, whole_lines};
use crate::pass::{AnalysisOutcome, run_passes};
use crate::resolve::{BooleanResolver, Resolution};
use crate::scope::ScopeAnalysis;

const CONDITIONALS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::conditionals");

/// Removes `if` statements and ternaries whose conditions are constant.
///
/// # Errors
///
/// Returns an error if the source cannot be parsed (or has syntax errors and
/// the configuration rejects them), declares a name twice in one scope, or
/// produces edits that fail validation.
///
/// # Example
///
/// ```ignore
/// use splice_analysis::eliminate_dead_conditionals;
/// use splice_core::EngineConfig;
///
/// let outcome = eliminate_dead_conditionals(
///     "if (true) {\n  console.log(a);\n}",
///     &EngineConfig::default(),
/// )?;
/// assert_eq!(outcome.output(), "console.log(a);");
/// ```
pub fn eliminate_dead_conditionals(source: &str, config: &EngineConfig) -> Result<AnalysisOutcome, AnalysisError> {
    run_passes("dead-conditionals", source, config, dead_conditional_edits)
}

/// What a resolved conditional turns into.
enum Replacement {
    /// Splice in this text.
    Text(String),
    /// Nothing remains of the construct.
    Remove,
}

/// Computes the edits for one pass over `analysis`.
///
/// Conditionals are visited in pre-order and a conditional inside an
/// already rewritten one is left alone, so the outermost edit wins.
pub(crate) fn dead_conditional_edits(analysis: &ScopeAnalysis<'_>) -> Vec<CodeEdit> {
    let mut pass = ConditionalPass::new(analysis);
    let mut edits = Vec::new();
    let mut covered_until = 0;
    for &node in analysis.conditionals() {
        if node.start_byte() < covered_until {
            trace!(target: CONDITIONALS_TARGET, start = node.start_byte(), "nested in a rewritten conditional");
            continue;
        }
        if let Some(edit) = pass.edit_for(node) {
            covered_until = edit.end_index.max(node.end_byte());
            edits.push(edit);
        }
    }
    edits
}

struct ConditionalPass<'s, 't> {
    analysis: &'s ScopeAnalysis<'t>,
    resolver: BooleanResolver<'s, 't>,
    /// Resolved conditions by node id; absent entries are unvisited.
    states: HashMap<usize, Resolution>,
    /// Names spliced into each statement list by unwrapped blocks this pass,
    /// keyed by list node id.
    introduced: HashMap<usize, HashSet<&'s str>>,
}

impl<'s, 't> ConditionalPass<'s, 't> {
    fn new(analysis: &'s ScopeAnalysis<'t>) -> Self {
        Self {
            analysis,
            resolver: BooleanResolver::new(analysis),
            states: HashMap::new(),
            introduced: HashMap::new(),
        }
    }

    fn edit_for(&mut self, node: SyntaxNode<'t>) -> Option<CodeEdit> {
        let value = self.condition(node).value()?;
        let list = node.parent().filter(|parent| is_statement_list(parent.kind()));
        let edit = match self.replacement(node, value, list)? {
            Replacement::Text(text) => CodeEdit::replace(node.byte_range(), text),
            Replacement::Remove if list.is_some() => CodeEdit::delete(whole_lines(node.source(), node.byte_range())),
            Replacement::Remove => CodeEdit::replace(node.byte_range(), "{}"),
        };
        Some(edit)
    }

    fn condition(&mut self, node: SyntaxNode<'t>) -> Resolution {
        if let Some(state) = self.states.get(&node.id()) {
            return *state;
        }
        let state = node
            .child_by_field("condition")
            .map_or(Resolution::Unresolved, |condition| self.resolver.resolve(condition));
        let (line, column) = node.start_position();
        trace!(target: CONDITIONALS_TARGET, kind = node.kind(), line, column, ?state, "condition resolved");
        self.states.insert(node.id(), state);
        state
    }

    /// Picks the branch of `node` that runs when its condition is `value`.
    ///
    /// `list` is the statement list the whole construct sits in, if any.
    /// Returns `None` when the tree is missing the branch it needs.
    fn replacement(
        &mut self,
        node: SyntaxNode<'t>,
        value: bool,
        list: Option<SyntaxNode<'t>>,
    ) -> Option<Replacement> {
        if value {
            let consequence = node.child_by_field("consequence")?;
            return Some(self.branch(consequence, node, list));
        }
        let Some(alternative) = node.child_by_field("alternative") else {
            return Some(Replacement::Remove);
        };
        let branch = if alternative.kind() == "else_clause" {
            alternative
                .named_children()
                .into_iter()
                .find(|child| child.kind() != "comment")?
        } else {
            alternative
        };
        if branch.kind() != "if_statement" {
            return Some(self.branch(branch, node, list));
        }
        // An `else if` takes the place of the whole construct: resolved, it
        // collapses in turn; unresolved, it is kept as written.
        match self.condition(branch) {
            Resolution::Resolved(inner) => self.replacement(branch, inner, list),
            Resolution::Unresolved => Some(Replacement::Text(branch.text().to_owned())),
        }
    }

    fn branch(
        &mut self,
        branch: SyntaxNode<'t>,
        construct: SyntaxNode<'t>,
        list: Option<SyntaxNode<'t>>,
    ) -> Replacement {
        if branch.kind() != "statement_block" {
            return Replacement::Text(branch.text().to_owned());
        }
        let kept = Replacement::Text(branch.text().to_owned());
        let Some(list) = list else {
            return kept;
        };
        let analysis = self.analysis;
        let Some(scope) = analysis.scope_of(branch) else {
            return kept;
        };
        if scope.shadows() {
            return kept;
        }
        // A sibling block unwrapped earlier may already have put one of these
        // names into the same list.
        let introduced = self.introduced.entry(list.id()).or_default();
        if scope.names.keys().any(|name| introduced.contains(name.as_str())) {
            trace!(
                target: CONDITIONALS_TARGET,
                start = branch.start_byte(),
                "block kept to avoid redeclaring a name unwrapped by a sibling"
            );
            return kept;
        }
        introduced.extend(scope.names.keys().map(String::as_str));
        unwrap_block(branch, construct).map_or(Replacement::Remove, Replacement::Text)
    }
}

/// Returns the statements of `block` re-indented to the line `construct`
/// starts on, or `None` for an empty block.
fn unwrap_block(block: SyntaxNode<'_>, construct: SyntaxNode<'_>) -> Option<String> {
    let statements = block.named_children();
    let (first, last) = (statements.first()?, statements.last()?);
    let source = block.source();
    let body = source.get(first.start_byte()..last.end_byte())?;
    let from = line_indent(source, first.start_byte());
    let to = line_indent(source, construct.start_byte());
    Some(reindent(body, from, to))
}
