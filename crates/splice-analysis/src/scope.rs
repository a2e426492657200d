//! Lexical scopes, bindings, and resolved references of one TSX source.
//!
//! A [`ScopeAnalysis`] is built by a single traversal (see
//! [`ScopeAnalysis::collect`]) and is read-only afterwards. Scopes and
//! bindings live in arenas and refer to each other through [`ScopeId`] and
//! [`BindingId`] indices; nodes are borrowed from the parse result.

use std::collections::HashMap;

use splice_syntax::{ParseResult, SyntaxNode};

use crate::collect::ScopeCollector;
use crate::error::AnalysisError;

/// Index of a scope within its [`ScopeAnalysis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

impl ScopeId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Index of a binding within its [`ScopeAnalysis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(usize);

impl BindingId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// How a name was introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum BindingKind {
    /// A variable declarator; `constant` is set for `const` declarations.
    Variable {
        /// Whether the declaration uses `const`.
        constant: bool,
    },
    /// A function declaration name or a named function expression.
    Function,
    /// A class declaration name.
    Class,
    /// A function parameter at position `index`.
    Parameter {
        /// Zero-based position in the parameter list.
        index: usize,
    },
    /// The left-hand side of a declaring `for…in` or `for…of` loop.
    LoopVariable,
    /// The parameter of a `catch` clause.
    CatchParameter,
    /// A name brought in by an import statement.
    Import,
}

/// A single declared name.
#[derive(Debug, Clone)]
pub struct Binding<'t> {
    pub(crate) name: String,
    pub(crate) kind: BindingKind,
    pub(crate) name_node: SyntaxNode<'t>,
    pub(crate) declaration: SyntaxNode<'t>,
    pub(crate) scope: ScopeId,
    pub(crate) function: Option<SyntaxNode<'t>>,
    pub(crate) exported: bool,
    pub(crate) loop_header: bool,
    pub(crate) mutated: bool,
    pub(crate) references: usize,
}

impl<'t> Binding<'t> {
    /// Returns the declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns how the name was introduced.
    #[must_use]
    pub const fn kind(&self) -> BindingKind {
        self.kind
    }

    /// Returns the identifier node that declares the name.
    #[must_use]
    pub const fn name_node(&self) -> SyntaxNode<'t> {
        self.name_node
    }

    /// Returns the declaring construct: a declarator, parameter, function,
    /// class, or import node.
    #[must_use]
    pub const fn declaration(&self) -> SyntaxNode<'t> {
        self.declaration
    }

    /// Returns the scope the name is bound in.
    #[must_use]
    pub const fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Returns the function a parameter belongs to.
    #[must_use]
    pub const fn function(&self) -> Option<SyntaxNode<'t>> {
        self.function
    }

    /// Returns whether the declaration is directly exported.
    #[must_use]
    pub const fn is_exported(&self) -> bool {
        self.exported
    }

    /// Returns whether the binding is declared in a loop header.
    #[must_use]
    pub const fn is_loop_header(&self) -> bool {
        self.loop_header
    }

    /// Returns whether any reference writes to the binding.
    #[must_use]
    pub const fn is_mutated(&self) -> bool {
        self.mutated
    }

    /// Returns the number of references resolved to the binding.
    #[must_use]
    pub const fn references(&self) -> usize {
        self.references
    }

    /// Returns the initializer of a variable declarator bound by a plain
    /// identifier.
    pub(crate) fn initializer(&self) -> Option<SyntaxNode<'t>> {
        let named_directly = self.declaration.child_by_field("name") == Some(self.name_node);
        if self.declaration.kind() == "variable_declarator" && named_directly {
            self.declaration.child_by_field("value")
        } else {
            None
        }
    }
}

/// One lexical scope.
#[derive(Debug, Clone)]
pub struct Scope<'t> {
    pub(crate) parent: Option<ScopeId>,
    pub(crate) node: SyntaxNode<'t>,
    pub(crate) names: HashMap<String, BindingId>,
    pub(crate) bindings: Vec<BindingId>,
    pub(crate) shadows: bool,
}

impl<'t> Scope<'t> {
    pub(crate) fn new(parent: Option<ScopeId>, node: SyntaxNode<'t>) -> Self {
        Self {
            parent,
            node,
            names: HashMap::new(),
            bindings: Vec::new(),
            shadows: false,
        }
    }

    /// Returns the enclosing scope.
    #[must_use]
    pub const fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// Returns the node that introduced the scope.
    #[must_use]
    pub const fn node(&self) -> SyntaxNode<'t> {
        self.node
    }

    /// Returns the binding for `name` declared directly in this scope.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<BindingId> {
        self.names.get(name).copied()
    }

    /// Returns the bindings declared in this scope, in declaration order.
    #[must_use]
    pub fn bindings(&self) -> &[BindingId] {
        &self.bindings
    }

    /// Returns whether this scope redeclares a name bound by an enclosing
    /// scope.
    #[must_use]
    pub const fn shadows(&self) -> bool {
        self.shadows
    }
}

/// Call sites and escape status of a function.
#[derive(Debug, Clone, Default)]
pub(crate) struct FunctionInfo<'t> {
    /// The binding the function is reachable through, if any.
    pub(crate) binding: Option<BindingId>,
    /// Argument lists, one per call site whose callee resolves to the
    /// binding.
    pub(crate) call_sites: Vec<Vec<SyntaxNode<'t>>>,
    /// Whether the binding is referenced outside callee position.
    pub(crate) escapes: bool,
}

/// Scopes, bindings, and reference resolution for one parsed source.
#[derive(Debug)]
pub struct ScopeAnalysis<'t> {
    pub(crate) scopes: Vec<Scope<'t>>,
    pub(crate) bindings: Vec<Binding<'t>>,
    pub(crate) exit_order: Vec<ScopeId>,
    /// Scope introduced by each scope node, keyed by node id.
    pub(crate) scope_nodes: HashMap<usize, ScopeId>,
    /// Binding each reference resolved to, keyed by reference node id.
    pub(crate) resolved: HashMap<usize, BindingId>,
    /// Call information keyed by function node id.
    pub(crate) functions: HashMap<usize, FunctionInfo<'t>>,
    pub(crate) conditionals: Vec<SyntaxNode<'t>>,
}

impl<'t> ScopeAnalysis<'t> {
    /// Collects scopes and bindings from `parsed` in one traversal and
    /// resolves every reference.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::UnsupportedLanguage`] for trees that were
    /// not parsed with the TSX grammar, and [`AnalysisError::Redeclaration`]
    /// when a name is declared twice in one scope.
    pub fn collect(parsed: &'t ParseResult) -> Result<Self, AnalysisError> {
        ScopeCollector::run(parsed)
    }

    /// Returns every scope, indexed by [`ScopeId`].
    #[must_use]
    pub fn scopes(&self) -> &[Scope<'t>] {
        &self.scopes
    }

    /// Returns the scope with the given id.
    #[must_use]
    pub fn scope(&self, id: ScopeId) -> Option<&Scope<'t>> {
        self.scopes.get(id.index())
    }

    /// Returns every binding, indexed by [`BindingId`].
    #[must_use]
    pub fn bindings(&self) -> &[Binding<'t>] {
        &self.bindings
    }

    /// Returns the binding with the given id.
    #[must_use]
    pub fn binding(&self, id: BindingId) -> Option<&Binding<'t>> {
        self.bindings.get(id.index())
    }

    /// Returns the bindings declared under `name`, in declaration order.
    pub fn bindings_named<'s>(&'s self, name: &'s str) -> impl Iterator<Item = &'s Binding<'t>> {
        self.bindings.iter().filter(move |binding| binding.name == name)
    }

    /// Returns scopes in the order they were closed.
    #[must_use]
    pub fn exit_order(&self) -> &[ScopeId] {
        &self.exit_order
    }

    /// Returns the scope introduced by `node`, such as a statement block.
    #[must_use]
    pub fn scope_of(&self, node: SyntaxNode<'_>) -> Option<&Scope<'t>> {
        let id = self.scope_nodes.get(&node.id())?;
        self.scope(*id)
    }

    /// Returns the binding an identifier use resolved to.
    #[must_use]
    pub fn resolve(&self, reference: SyntaxNode<'_>) -> Option<BindingId> {
        self.resolved.get(&reference.id()).copied()
    }

    /// Returns the `if` statements and ternary expressions in pre-order.
    #[must_use]
    pub fn conditionals(&self) -> &[SyntaxNode<'t>] {
        &self.conditionals
    }

    /// Returns the call information recorded for a function node.
    pub(crate) fn function(&self, node: SyntaxNode<'_>) -> Option<&FunctionInfo<'t>> {
        self.functions.get(&node.id())
    }
}
