//! Bounded resolution of conditions to boolean constants.

use std::collections::HashSet;

use splice_syntax::SyntaxNode;

use crate::scope::{Binding, BindingId, BindingKind, ScopeAnalysis};

/// Longest chain of indirections followed before giving up.
const MAX_CHASE_DEPTH: usize = 64;

/// What a condition is known to evaluate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The condition always evaluates to this value.
    Resolved(bool),
    /// The value cannot be determined statically.
    Unresolved,
}

impl Resolution {
    /// Returns the resolved value, if any.
    #[must_use]
    pub const fn value(self) -> Option<bool> {
        match self {
            Self::Resolved(value) => Some(value),
            Self::Unresolved => None,
        }
    }
}

impl From<Option<bool>> for Resolution {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Self::Unresolved, Self::Resolved)
    }
}

/// Chases identifiers through constant declarations and call-site arguments
/// until a boolean literal is reached.
///
/// - `true` and `false` resolve to themselves; parentheses are looked
///   through.
/// - An identifier follows its resolved binding. Exported or mutated
///   bindings are unresolved.
/// - A `const` declarator resolves through its initializer.
/// - A parameter resolves through its default value when its function has
///   no call sites, and otherwise through the argument each call site
///   supplies (or the default where one is omitted). Every call site must
///   agree. Functions that are exported, reassigned, or referenced outside
///   callee position are unresolved.
///
/// Anything else is unresolved.
pub struct BooleanResolver<'s, 't> {
    analysis: &'s ScopeAnalysis<'t>,
    visiting: HashSet<BindingId>,
}

impl<'s, 't> BooleanResolver<'s, 't> {
    /// Creates a resolver over `analysis`.
    #[must_use]
    pub fn new(analysis: &'s ScopeAnalysis<'t>) -> Self {
        Self {
            analysis,
            visiting: HashSet::new(),
        }
    }

    /// Resolves `expression`.
    pub fn resolve(&mut self, expression: SyntaxNode<'t>) -> Resolution {
        self.chase(expression, 0).into()
    }

    fn chase(&mut self, node: SyntaxNode<'t>, depth: usize) -> Option<bool> {
        if depth > MAX_CHASE_DEPTH {
            return None;
        }
        match node.kind() {
            "true" => Some(true),
            "false" => Some(false),
            "parenthesized_expression" => {
                let inner = node
                    .named_children()
                    .into_iter()
                    .find(|child| child.kind() != "comment")?;
                self.chase(inner, depth + 1)
            }
            "identifier" => {
                let id = self.analysis.resolve(node)?;
                // A binding already on the chase path is a cycle.
                if !self.visiting.insert(id) {
                    return None;
                }
                let value = self.chase_binding(id, depth + 1);
                self.visiting.remove(&id);
                value
            }
            _ => None,
        }
    }

    fn chase_binding(&mut self, id: BindingId, depth: usize) -> Option<bool> {
        let analysis = self.analysis;
        let binding = analysis.binding(id)?;
        if binding.exported || binding.mutated {
            return None;
        }
        match binding.kind {
            BindingKind::Variable { constant: true } => {
                let value = binding.initializer()?;
                self.chase(value, depth)
            }
            BindingKind::Parameter { index } => self.chase_parameter(binding, index, depth),
            _ => None,
        }
    }

    fn chase_parameter(&mut self, parameter: &Binding<'t>, index: usize, depth: usize) -> Option<bool> {
        let declaration = parameter.declaration;
        // Destructured parameters have no single argument to follow.
        let default = if declaration == parameter.name_node {
            None
        } else if declaration.child_by_field("pattern") == Some(parameter.name_node) {
            declaration.child_by_field("value")
        } else {
            return None;
        };

        let analysis = self.analysis;
        let function = analysis.function(parameter.function?)?;
        let owner = analysis.binding(function.binding?)?;
        if owner.exported || owner.mutated || function.escapes {
            return None;
        }
        if function.call_sites.is_empty() {
            return self.chase(default?, depth);
        }

        let mut agreed = None;
        for arguments in &function.call_sites {
            let spread = arguments
                .iter()
                .take(index + 1)
                .any(|argument| argument.kind() == "spread_element");
            if spread {
                return None;
            }
            let supplied = arguments.get(index).copied().or(default)?;
            let value = self.chase(supplied, depth)?;
            if agreed.is_some_and(|previous| previous != value) {
                return None;
            }
            agreed = Some(value);
        }
        agreed
    }
}
