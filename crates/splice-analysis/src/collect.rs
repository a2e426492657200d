//! Single-traversal collection of scopes, bindings, references, call sites,
//! and conditionals.
//!
//! Three dispatch tables share one [`ScopeCollector`] context: declarations
//! (which also push and pop scopes), references, and conditionals. Every
//! reference records a snapshot of the scope stack at the point of use; names
//! are resolved against those snapshots only after the walk, so hoisted
//! declarations resolve like any other.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use splice_syntax::{DispatchTable, ParseResult, SupportedLanguage, SyntaxError, SyntaxNode, Visit, traverse};
use tracing::debug;

use crate::error::AnalysisError;
use crate::layout::is_statement_list;
use crate::scope::{Binding, BindingId, BindingKind, FunctionInfo, Scope, ScopeAnalysis, ScopeId};

const COLLECT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::collect");

/// Function-like nodes that introduce a parameter scope.
const FUNCTION_KINDS: [&str; 6] = [
    "function_declaration",
    "generator_function_declaration",
    "function_expression",
    "generator_function",
    "arrow_function",
    "method_definition",
];

/// Nodes whose identifiers may be uses of a binding.
const REFERENCE_KINDS: [&str; 3] = [
    "identifier",
    "shorthand_property_identifier",
    "shorthand_property_identifier_pattern",
];

type Table<'t> = DispatchTable<'static, 't, ScopeCollector<'t>, AnalysisError>;
type Step<'t> = Result<Visit<'static, ScopeCollector<'t>, AnalysisError>, AnalysisError>;

/// An identifier use and the scope stack it was seen under.
struct Reference<'t> {
    node: SyntaxNode<'t>,
    scopes: Rc<[ScopeId]>,
    write: bool,
}

/// A call whose callee is a bare identifier.
struct CallSite<'t> {
    callee: SyntaxNode<'t>,
    arguments: Vec<SyntaxNode<'t>>,
}

/// Traversal context accumulating everything a [`ScopeAnalysis`] holds.
pub(crate) struct ScopeCollector<'t> {
    scopes: Vec<Scope<'t>>,
    bindings: Vec<Binding<'t>>,
    stack: Vec<ScopeId>,
    /// Entries of `stack` that `var` declarations hoist to.
    var_scopes: Vec<ScopeId>,
    /// Bindings introduced by `var`, which may be declared again.
    var_bindings: HashSet<BindingId>,
    snapshot: Option<Rc<[ScopeId]>>,
    exit_order: Vec<ScopeId>,
    scope_nodes: HashMap<usize, ScopeId>,
    /// Identifier nodes that declare rather than use a name.
    binding_sites: HashSet<usize>,
    /// Binding of each identifier-named declarator, keyed by declarator id.
    declarators: HashMap<usize, BindingId>,
    functions: HashMap<usize, FunctionInfo<'t>>,
    references: Vec<Reference<'t>>,
    call_sites: Vec<CallSite<'t>>,
    conditionals: Vec<SyntaxNode<'t>>,
}

impl<'t> ScopeCollector<'t> {
    fn new() -> Self {
        Self {
            scopes: Vec::new(),
            bindings: Vec::new(),
            stack: Vec::new(),
            var_scopes: Vec::new(),
            var_bindings: HashSet::new(),
            snapshot: None,
            exit_order: Vec::new(),
            scope_nodes: HashMap::new(),
            binding_sites: HashSet::new(),
            declarators: HashMap::new(),
            functions: HashMap::new(),
            references: Vec::new(),
            call_sites: Vec::new(),
            conditionals: Vec::new(),
        }
    }

    /// Walks `parsed` once and resolves the collected references.
    pub(crate) fn run(parsed: &'t ParseResult) -> Result<ScopeAnalysis<'t>, AnalysisError> {
        if parsed.language() != SupportedLanguage::TypeScript {
            return Err(AnalysisError::unsupported_language(parsed.language()));
        }

        let mut collector = Self::new();
        let mut tables = [declaration_table(), reference_table(), conditional_table()];
        let visited = traverse(parsed.root(), &mut collector, &mut tables)?;
        let analysis = collector.finish();

        debug!(
            target: COLLECT_TARGET,
            visited,
            scopes = analysis.scopes.len(),
            bindings = analysis.bindings.len(),
            references = analysis.resolved.len(),
            conditionals = analysis.conditionals.len(),
            "scope collection complete"
        );
        Ok(analysis)
    }

    // -------------------------------------------------------------------------
    // Scope stack
    // -------------------------------------------------------------------------

    fn push_scope(&mut self, node: SyntaxNode<'t>) {
        let id = ScopeId::new(self.scopes.len());
        self.scopes.push(Scope::new(self.stack.last().copied(), node));
        self.scope_nodes.insert(node.id(), id);
        if hoists_var(node) {
            self.var_scopes.push(id);
        }
        self.stack.push(id);
        self.snapshot = None;
    }

    fn pop_scope(&mut self) {
        if let Some(id) = self.stack.pop() {
            if self.var_scopes.last() == Some(&id) {
                self.var_scopes.pop();
            }
            self.exit_order.push(id);
        }
        self.snapshot = None;
    }

    /// Shares one snapshot between consecutive references under the same
    /// stack.
    fn snapshot(&mut self) -> Rc<[ScopeId]> {
        let stack = &self.stack;
        Rc::clone(self.snapshot.get_or_insert_with(|| Rc::from(stack.as_slice())))
    }

    fn enter_scope(&mut self, node: SyntaxNode<'t>) -> Visit<'static, Self, AnalysisError> {
        self.push_scope(node);
        Visit::exit(|collector: &mut Self| {
            collector.pop_scope();
            Ok(())
        })
    }

    // -------------------------------------------------------------------------
    // Declarations
    // -------------------------------------------------------------------------

    fn declare(&mut self, name_node: SyntaxNode<'t>, binding: Declared<'t>) -> Result<BindingId, AnalysisError> {
        let target = if binding.hoisted {
            self.var_scopes.last()
        } else {
            self.stack.last()
        };
        let Some(&scope_id) = target else {
            return Err(SyntaxError::internal_error("declaration outside of any scope").into());
        };
        let id = BindingId::new(self.bindings.len());
        let name = name_node.text();
        let scope = self
            .scopes
            .get_mut(scope_id.index())
            .ok_or_else(|| SyntaxError::internal_error("scope stack refers to a missing scope"))?;
        if let Some(&existing) = scope.names.get(name) {
            // Declaring a `var` again behaves like assigning to it.
            if binding.hoisted && self.var_bindings.contains(&existing) {
                self.binding_sites.insert(name_node.id());
                if let Some(previous) = self.bindings.get_mut(existing.index()) {
                    previous.mutated = true;
                }
                return Ok(existing);
            }
            return Err(AnalysisError::redeclaration(name, name_node.start_position()));
        }
        scope.names.insert(name.to_owned(), id);
        scope.bindings.push(id);

        self.binding_sites.insert(name_node.id());
        if binding.hoisted {
            self.var_bindings.insert(id);
        }
        self.bindings.push(Binding {
            name: name.to_owned(),
            kind: binding.kind,
            name_node,
            declaration: binding.declaration,
            scope: scope_id,
            function: binding.function,
            exported: binding.exported,
            loop_header: binding.loop_header,
            mutated: false,
            references: 0,
        });
        Ok(id)
    }

    fn declare_pattern(&mut self, pattern: SyntaxNode<'t>, binding: &Declared<'t>) -> Result<(), AnalysisError> {
        for name in pattern_names(pattern) {
            self.declare(name, binding.clone())?;
        }
        Ok(())
    }

    fn declare_variable(&mut self, declarator: SyntaxNode<'t>) -> Step<'t> {
        let Some(name) = declarator.child_by_field("name") else {
            return Ok(Visit::Continue);
        };
        let statement = declarator.parent();
        let constant = statement.is_some_and(|parent| {
            parent.kind() == "lexical_declaration"
                && parent.children().first().is_some_and(|keyword| keyword.kind() == "const")
        });
        let loop_header = statement.is_some_and(|parent| {
            parent.occupies_field("initializer")
                && parent.parent().is_some_and(|outer| outer.kind() == "for_statement")
        });
        let function_scoped = statement.is_some_and(|parent| parent.kind() == "variable_declaration");
        let binding = Declared::new(BindingKind::Variable { constant }, declarator)
            .exported(statement.is_some_and(is_exported))
            .in_loop_header(loop_header)
            .hoisted(function_scoped);

        if name.kind() == "identifier" {
            let id = self.declare(name, binding)?;
            self.declarators.insert(declarator.id(), id);
        } else {
            self.declare_pattern(name, &binding)?;
        }
        Ok(Visit::Continue)
    }

    fn declare_class(&mut self, class: SyntaxNode<'t>) -> Step<'t> {
        if let Some(name) = class.child_by_field("name") {
            let binding = Declared::new(BindingKind::Class, class).exported(is_exported(class));
            self.declare(name, binding)?;
        }
        Ok(Visit::Continue)
    }

    fn enter_function(&mut self, function: SyntaxNode<'t>) -> Step<'t> {
        let declared_name = function
            .child_by_field("name")
            .filter(|name| name.kind() == "identifier");

        // Declarations bind their name in the enclosing scope; expressions
        // are reachable through the declarator they initialise.
        let owner = match function.kind() {
            "function_declaration" | "generator_function_declaration" => declared_name
                .map(|name| {
                    let binding = Declared::new(BindingKind::Function, function).exported(is_exported(function));
                    self.declare(name, binding)
                })
                .transpose()?,
            "method_definition" => None,
            _ => function
                .parent()
                .filter(|parent| parent.kind() == "variable_declarator" && function.occupies_field("value"))
                .and_then(|declarator| self.declarators.get(&declarator.id()).copied()),
        };
        self.functions.insert(
            function.id(),
            FunctionInfo {
                binding: owner,
                ..FunctionInfo::default()
            },
        );

        let step = self.enter_scope(function);
        if matches!(function.kind(), "function_expression" | "generator_function")
            && let Some(name) = declared_name
        {
            self.declare(name, Declared::new(BindingKind::Function, function))?;
        }
        self.declare_parameters(function)?;
        Ok(step)
    }

    fn declare_parameters(&mut self, function: SyntaxNode<'t>) -> Result<(), AnalysisError> {
        if let Some(single) = function.child_by_field("parameter") {
            let binding = Declared::new(BindingKind::Parameter { index: 0 }, single).of_function(function);
            return self.declare_pattern(single, &binding);
        }
        let Some(list) = function.child_by_field("parameters") else {
            return Ok(());
        };
        let parameters = list
            .named_children()
            .into_iter()
            .filter(|param| matches!(param.kind(), "required_parameter" | "optional_parameter"))
            .filter_map(|param| Some((param, param.child_by_field("pattern")?)))
            .filter(|(_, pattern)| pattern.kind() != "this");
        for (index, (param, pattern)) in parameters.enumerate() {
            let binding = Declared::new(BindingKind::Parameter { index }, param).of_function(function);
            self.declare_pattern(pattern, &binding)?;
        }
        Ok(())
    }

    fn enter_loop(&mut self, statement: SyntaxNode<'t>) -> Step<'t> {
        let step = self.enter_scope(statement);
        if statement.kind() == "for_in_statement"
            && statement.child_by_field("kind").is_some()
            && let Some(left) = statement.child_by_field("left")
        {
            let binding = Declared::new(BindingKind::LoopVariable, statement).in_loop_header(true);
            self.declare_pattern(left, &binding)?;
        }
        Ok(step)
    }

    fn enter_catch(&mut self, clause: SyntaxNode<'t>) -> Step<'t> {
        let step = self.enter_scope(clause);
        if let Some(parameter) = clause.child_by_field("parameter") {
            self.declare_pattern(parameter, &Declared::new(BindingKind::CatchParameter, clause))?;
        }
        Ok(step)
    }

    fn declare_imports(&mut self, statement: SyntaxNode<'t>) -> Step<'t> {
        for name in import_names(statement) {
            self.declare(name, Declared::new(BindingKind::Import, statement))?;
        }
        Ok(Visit::Skip)
    }

    // -------------------------------------------------------------------------
    // References
    // -------------------------------------------------------------------------

    fn record_reference(&mut self, node: SyntaxNode<'t>) {
        if self.binding_sites.contains(&node.id()) {
            return;
        }
        let scopes = self.snapshot();
        self.references.push(Reference {
            node,
            scopes,
            write: is_write_target(node),
        });
    }

    fn record_call(&mut self, call: SyntaxNode<'t>) {
        let Some(callee) = call.child_by_field("function").filter(|node| node.kind() == "identifier") else {
            return;
        };
        let Some(arguments) = call.child_by_field("arguments").filter(|node| node.kind() == "arguments") else {
            return;
        };
        let arguments = arguments
            .named_children()
            .into_iter()
            .filter(|argument| argument.kind() != "comment")
            .collect();
        self.call_sites.push(CallSite { callee, arguments });
    }

    // -------------------------------------------------------------------------
    // Resolution
    // -------------------------------------------------------------------------

    fn finish(mut self) -> ScopeAnalysis<'t> {
        let function_of: HashMap<BindingId, usize> = self
            .functions
            .iter()
            .filter_map(|(node, info)| Some((info.binding?, *node)))
            .collect();

        let mut resolved = HashMap::with_capacity(self.references.len());
        for reference in &self.references {
            let name = reference.node.text();
            let Some(id) = reference
                .scopes
                .iter()
                .rev()
                .find_map(|scope| self.scopes.get(scope.index())?.lookup(name))
            else {
                continue;
            };
            resolved.insert(reference.node.id(), id);
            if let Some(binding) = self.bindings.get_mut(id.index()) {
                binding.references += 1;
                binding.mutated |= reference.write;
            }
            if !is_callee(reference.node)
                && let Some(info) = function_of.get(&id).and_then(|node| self.functions.get_mut(node))
            {
                info.escapes = true;
            }
        }

        for site in self.call_sites {
            let info = resolved
                .get(&site.callee.id())
                .and_then(|id| function_of.get(id))
                .and_then(|node| self.functions.get_mut(node));
            if let Some(info) = info {
                info.call_sites.push(site.arguments);
            }
        }

        mark_shadowing(&mut self.scopes);

        ScopeAnalysis {
            scopes: self.scopes,
            bindings: self.bindings,
            exit_order: self.exit_order,
            scope_nodes: self.scope_nodes,
            resolved,
            functions: self.functions,
            conditionals: self.conditionals,
        }
    }
}

/// Attributes of a binding about to be declared.
#[derive(Clone)]
struct Declared<'t> {
    kind: BindingKind,
    declaration: SyntaxNode<'t>,
    function: Option<SyntaxNode<'t>>,
    exported: bool,
    loop_header: bool,
    /// Bound in the nearest function body or program, as `var` is.
    hoisted: bool,
}

impl<'t> Declared<'t> {
    const fn new(kind: BindingKind, declaration: SyntaxNode<'t>) -> Self {
        Self {
            kind,
            declaration,
            function: None,
            exported: false,
            loop_header: false,
            hoisted: false,
        }
    }

    const fn exported(mut self, exported: bool) -> Self {
        self.exported = exported;
        self
    }

    const fn in_loop_header(mut self, loop_header: bool) -> Self {
        self.loop_header = loop_header;
        self
    }

    const fn hoisted(mut self, hoisted: bool) -> Self {
        self.hoisted = hoisted;
        self
    }

    const fn of_function(mut self, function: SyntaxNode<'t>) -> Self {
        self.function = Some(function);
        self
    }
}

// =============================================================================
// Dispatch tables
// =============================================================================

fn declaration_table<'t>() -> Table<'t> {
    DispatchTable::new()
        .on_kinds(["program", "statement_block"], |collector: &mut ScopeCollector<'t>, node| {
            Ok(collector.enter_scope(node))
        })
        .on_kinds(FUNCTION_KINDS, |collector: &mut ScopeCollector<'t>, node| {
            collector.enter_function(node)
        })
        .on_kinds(["for_statement", "for_in_statement"], |collector: &mut ScopeCollector<'t>, node| {
            collector.enter_loop(node)
        })
        .on("catch_clause", |collector: &mut ScopeCollector<'t>, node| collector.enter_catch(node))
        .on("variable_declarator", |collector: &mut ScopeCollector<'t>, node| {
            collector.declare_variable(node)
        })
        .on_kinds(["class_declaration", "abstract_class_declaration"], |collector: &mut ScopeCollector<'t>, node| {
            collector.declare_class(node)
        })
        .on("import_statement", |collector: &mut ScopeCollector<'t>, node| {
            collector.declare_imports(node)
        })
}

fn reference_table<'t>() -> Table<'t> {
    DispatchTable::new()
        .on_kinds(REFERENCE_KINDS, |collector: &mut ScopeCollector<'t>, node| {
            collector.record_reference(node);
            Ok(Visit::Continue)
        })
        .on("call_expression", |collector: &mut ScopeCollector<'t>, node| {
            collector.record_call(node);
            Ok(Visit::Continue)
        })
}

fn conditional_table<'t>() -> Table<'t> {
    DispatchTable::new().on_kinds(
        ["if_statement", "ternary_expression"],
        |collector: &mut ScopeCollector<'t>, node| {
            collector.conditionals.push(node);
            Ok(Visit::Continue)
        },
    )
}

// =============================================================================
// Syntax helpers
// =============================================================================

/// Identifier nodes bound by a declaration pattern, in source order.
fn pattern_names(pattern: SyntaxNode<'_>) -> Vec<SyntaxNode<'_>> {
    let mut names = Vec::new();
    let mut pending = vec![pattern];
    while let Some(node) = pending.pop() {
        match node.kind() {
            "identifier" | "shorthand_property_identifier_pattern" => names.push(node),
            "object_pattern" | "array_pattern" | "rest_pattern" => {
                pending.extend(node.named_children().into_iter().rev());
            }
            "pair_pattern" => pending.extend(node.child_by_field("value")),
            "assignment_pattern" | "object_assignment_pattern" => {
                pending.extend(node.child_by_field("left"));
            }
            _ => {}
        }
    }
    names
}

/// Local names introduced by an import statement.
fn import_names(statement: SyntaxNode<'_>) -> Vec<SyntaxNode<'_>> {
    let mut names = Vec::new();
    let clauses = statement
        .named_children()
        .into_iter()
        .filter(|child| matches!(child.kind(), "import_clause" | "import_require_clause"));
    for clause in clauses {
        for part in clause.named_children() {
            match part.kind() {
                "identifier" => names.push(part),
                "namespace_import" => names.extend(
                    part.named_children()
                        .into_iter()
                        .filter(|child| child.kind() == "identifier"),
                ),
                "named_imports" => names.extend(
                    part.named_children()
                        .into_iter()
                        .filter(|child| child.kind() == "import_specifier")
                        .filter_map(|spec| spec.child_by_field("alias").or_else(|| spec.child_by_field("name"))),
                ),
                _ => {}
            }
        }
    }
    names
}

/// Whether `declaration` belongs to an `export` statement, looking through
/// wrappers such as `declare` up to the enclosing statement list.
fn is_exported(declaration: SyntaxNode<'_>) -> bool {
    declaration
        .ancestor(|node| {
            matches!(node.kind(), "export_statement" | "class_body") || is_statement_list(node.kind())
        })
        .is_some_and(|node| node.kind() == "export_statement")
}

/// Whether `var` declarations inside `node` bind in its scope: the program
/// and function bodies.
fn hoists_var(node: SyntaxNode<'_>) -> bool {
    match node.kind() {
        "program" => true,
        "statement_block" => {
            node.occupies_field("body")
                && node
                    .parent()
                    .is_some_and(|parent| FUNCTION_KINDS.contains(&parent.kind()))
        }
        _ => false,
    }
}

fn is_callee(node: SyntaxNode<'_>) -> bool {
    node.parent().is_some_and(|parent| parent.kind() == "call_expression") && node.occupies_field("function")
}

/// Whether `node` is assigned to, directly or through a destructuring
/// assignment pattern.
fn is_write_target(node: SyntaxNode<'_>) -> bool {
    let mut current = node;
    while let Some(parent) = current.parent() {
        let climbs = match parent.kind() {
            "array_pattern" | "object_pattern" | "rest_pattern" => true,
            "pair_pattern" => current.occupies_field("value"),
            "assignment_pattern" | "object_assignment_pattern" => current.occupies_field("left"),
            "assignment_expression" | "augmented_assignment_expression" | "for_in_statement" => {
                return current.occupies_field("left");
            }
            "update_expression" => return current.occupies_field("argument"),
            _ => false,
        };
        if !climbs {
            return false;
        }
        current = parent;
    }
    false
}

/// Flags every scope that declares a name also bound by an enclosing scope.
fn mark_shadowing(scopes: &mut [Scope<'_>]) {
    let flags: Vec<bool> = scopes
        .iter()
        .map(|scope| {
            scope.names.keys().any(|name| {
                let mut enclosing = scope.parent;
                while let Some(id) = enclosing {
                    let Some(outer) = scopes.get(id.index()) else {
                        return false;
                    };
                    if outer.names.contains_key(name) {
                        return true;
                    }
                    enclosing = outer.parent;
                }
                false
            })
        })
        .collect();
    for (scope, shadows) in scopes.iter_mut().zip(flags) {
        scope.shadows = shadows;
    }
}
