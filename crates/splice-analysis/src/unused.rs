//! Unused-binding elimination.
//!
//! A variable declarator bound by a plain identifier is removable when
//! nothing refers to it, it is not exported, and it is not part of a loop
//! header. Removable declarators are grouped by their declaration statement:
//! a statement whose declarators are all unused is removed outright, and
//! otherwise each unused declarator goes together with one adjacent comma.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use splice_core::{CodeEdit, EngineConfig};
use splice_syntax::SyntaxNode;
use tracing::trace;

use crate::error::AnalysisError;
use crate::layout::{is_statement_list, whole_lines};
use crate::pass::{AnalysisOutcome, run_passes};
use crate::scope::{Binding, BindingKind, ScopeAnalysis};

const UNUSED_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::unused");

/// Removes variable declarations that are never referenced.
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
/// use splice_analysis::eliminate_unused_bindings;
/// use splice_core::EngineConfig;
///
/// let outcome = eliminate_unused_bindings(
///     "const a = 1;\nconst b = 1;\nconsole.log(a);",
///     &EngineConfig::default(),
/// )?;
/// assert_eq!(outcome.output(), "const a = 1;\nconsole.log(a);");
/// ```
pub fn eliminate_unused_bindings(source: &str, config: &EngineConfig) -> Result<AnalysisOutcome, AnalysisError> {
    run_passes("unused-bindings", source, config, unused_binding_edits)
}

/// Computes the edits for one pass over `analysis`, visiting scopes in the
/// order they were closed.
pub(crate) fn unused_binding_edits(analysis: &ScopeAnalysis<'_>) -> Vec<CodeEdit> {
    let mut statements: Vec<SyntaxNode<'_>> = Vec::new();
    let mut unused: HashMap<usize, HashSet<usize>> = HashMap::new();

    let bindings = analysis
        .exit_order()
        .iter()
        .filter_map(|id| analysis.scope(*id))
        .flat_map(|scope| scope.bindings().iter().filter_map(move |id| analysis.binding(*id)));
    for binding in bindings {
        if !is_removable(binding) {
            continue;
        }
        let declarator = binding.declaration();
        let Some(statement) = declarator.parent() else {
            continue;
        };
        trace!(
            target: UNUSED_TARGET,
            name = binding.name(),
            start = declarator.start_byte(),
            "unused binding scheduled for removal"
        );
        unused
            .entry(statement.id())
            .or_insert_with(|| {
                statements.push(statement);
                HashSet::new()
            })
            .insert(declarator.id());
    }

    let mut edits = Vec::new();
    for statement in statements {
        let Some(removed) = unused.get(&statement.id()) else {
            continue;
        };
        edits.extend(statement_edits(statement, removed));
    }
    edits
}

fn is_removable(binding: &Binding<'_>) -> bool {
    matches!(binding.kind(), BindingKind::Variable { .. })
        && binding.references() == 0
        && !binding.is_exported()
        && !binding.is_loop_header()
        && binding.declaration().child_by_field("name") == Some(binding.name_node())
}

/// Edits removing the declarators of `statement` listed in `removed`.
fn statement_edits(statement: SyntaxNode<'_>, removed: &HashSet<usize>) -> Vec<CodeEdit> {
    let declarators: Vec<_> = statement
        .named_children()
        .into_iter()
        .filter(|child| child.kind() == "variable_declarator")
        .collect();
    let is_unused = |node: &SyntaxNode<'_>| removed.contains(&node.id());

    if declarators.iter().all(is_unused) {
        let in_list = statement
            .parent()
            .is_some_and(|parent| is_statement_list(parent.kind()));
        if !in_list {
            trace!(target: UNUSED_TARGET, start = statement.start_byte(), "declaration kept outside a statement list");
            return Vec::new();
        }
        return vec![CodeEdit::delete(whole_lines(statement.source(), statement.byte_range()))];
    }

    // A leading run of unused declarators takes the comma after it; any
    // later one takes the comma before it.
    let mut ranges: Vec<Range<usize>> = Vec::new();
    let leading = declarators.iter().take_while(|node| is_unused(*node)).count();
    if let (Some(first), Some(kept)) = (declarators.first(), declarators.get(leading))
        && leading > 0
    {
        ranges.push(first.start_byte()..kept.start_byte());
    }
    for pair in declarators.windows(2).skip(leading) {
        let &[previous, current] = pair else {
            continue;
        };
        if is_unused(&current) {
            push_merged(&mut ranges, previous.end_byte()..current.end_byte());
        }
    }
    ranges.into_iter().map(CodeEdit::delete).collect()
}

/// Appends `range`, joining it to the last range when they touch.
fn push_merged(ranges: &mut Vec<Range<usize>>, range: Range<usize>) {
    if let Some(last) = ranges.last_mut()
        && last.end == range.start
    {
        last.end = range.end;
        return;
    }
    ranges.push(range);
}
