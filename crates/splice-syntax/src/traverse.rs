//! Single-pass tree traversal that multiplexes many dispatch tables.
//!
//! A [`DispatchTable`] maps node types to handlers. [`traverse`] walks a
//! tree once, in pre-order, and offers every node to every table. Handlers
//! share one mutable context that the caller passes in explicitly, so state
//! such as a scope stack is owned by the caller rather than captured by the
//! handlers.
//!
//! A handler steers the walk through its [`Visit`] result:
//!
//! - [`Visit::Continue`] descends normally.
//! - [`Visit::Skip`] prunes the node's subtree for *every* table.
//! - [`Visit::Exit`] registers a callback that runs once the node's subtree
//!   is complete, before its next sibling is entered.
//!
//! The walk is an explicit stack machine over one tree cursor, so deep trees
//! do not grow the call stack.

use std::collections::HashMap;

use tracing::trace;

use crate::node::SyntaxNode;

const TRAVERSE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::traverse");

/// A callback run after a node's subtree has been visited.
pub type Deferred<'a, C, E> = Box<dyn FnOnce(&mut C) -> Result<(), E> + 'a>;

type Handler<'a, 't, C, E> = Box<dyn FnMut(&mut C, SyntaxNode<'t>) -> Result<Visit<'a, C, E>, E> + 'a>;

/// What a handler asks the traversal to do after it ran.
pub enum Visit<'a, C, E> {
    /// Descend into the node's children.
    Continue,
    /// Do not descend into the node's children.
    Skip,
    /// Descend, then run the callback after the node's subtree.
    Exit(Deferred<'a, C, E>),
}

impl<'a, C, E> Visit<'a, C, E> {
    /// Wraps `callback` as an exit action.
    pub fn exit(callback: impl FnOnce(&mut C) -> Result<(), E> + 'a) -> Self {
        Self::Exit(Box::new(callback))
    }
}

/// Handlers keyed by node type.
pub struct DispatchTable<'a, 't, C, E> {
    routes: HashMap<String, usize>,
    handlers: Vec<Handler<'a, 't, C, E>>,
}

impl<'a, 't, C, E> DispatchTable<'a, 't, C, E> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            handlers: Vec::new(),
        }
    }

    /// Registers `handler` for nodes of type `kind`.
    ///
    /// A later registration for the same type replaces the earlier one.
    #[must_use]
    pub fn on(
        self,
        kind: &str,
        handler: impl FnMut(&mut C, SyntaxNode<'t>) -> Result<Visit<'a, C, E>, E> + 'a,
    ) -> Self {
        self.on_kinds([kind], handler)
    }

    /// Registers one `handler` shared by every type in `kinds`.
    #[must_use]
    pub fn on_kinds<I, S>(
        mut self,
        kinds: I,
        handler: impl FnMut(&mut C, SyntaxNode<'t>) -> Result<Visit<'a, C, E>, E> + 'a,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let slot = self.handlers.len();
        self.handlers.push(Box::new(handler));
        for kind in kinds {
            self.routes.insert(kind.as_ref().to_owned(), slot);
        }
        self
    }

    /// Returns whether a handler is registered for `kind`.
    #[must_use]
    pub fn handles(&self, kind: &str) -> bool {
        self.routes.contains_key(kind)
    }

    fn handler_for(&mut self, kind: &str) -> Option<&mut Handler<'a, 't, C, E>> {
        let slot = *self.routes.get(kind)?;
        self.handlers.get_mut(slot)
    }
}

impl<C, E> Default for DispatchTable<'_, '_, C, E> {
    fn default() -> Self {
        Self::new()
    }
}

/// The combined decision of every table at one node.
struct Dispatch<'a, C, E> {
    descend: bool,
    deferred: Vec<Deferred<'a, C, E>>,
}

/// Walks the subtree rooted at `root`, offering each node to every table.
///
/// Every node, named or anonymous, is visited exactly once. At each node all
/// tables run in registration order. If any handler returns [`Visit::Skip`]
/// the subtree is pruned for all tables, and the node's exit callbacks run
/// immediately. Otherwise exit callbacks run, in registration order, after
/// the whole subtree including the descendants' own exit callbacks.
///
/// Returns the number of nodes visited.
///
/// # Errors
///
/// When a handler or exit callback fails, the remaining handlers at that
/// node still run and the walk then stops with the first error.
pub fn traverse<'a, 't, C, E>(
    root: SyntaxNode<'t>,
    ctx: &mut C,
    tables: &mut [DispatchTable<'a, 't, C, E>],
) -> Result<usize, E> {
    let source = root.source();
    let mut cursor = root.raw().walk();
    // One frame of exit callbacks per entered node on the current path.
    let mut frames: Vec<Vec<Deferred<'a, C, E>>> = Vec::new();
    let mut visited: usize = 0;

    loop {
        let node = SyntaxNode::new(cursor.node(), source);
        visited += 1;

        let Dispatch { descend, deferred } = dispatch(tables, ctx, node)?;
        if descend && cursor.goto_first_child() {
            frames.push(deferred);
            continue;
        }
        run_deferred(deferred, ctx)?;

        // Climb until a sibling is available, closing each finished parent.
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                trace!(target: TRAVERSE_TARGET, visited, tables = tables.len(), "traversal complete");
                return Ok(visited);
            }
            run_deferred(frames.pop().unwrap_or_default(), ctx)?;
        }
    }
}

fn dispatch<'a, 't, C, E>(
    tables: &mut [DispatchTable<'a, 't, C, E>],
    ctx: &mut C,
    node: SyntaxNode<'t>,
) -> Result<Dispatch<'a, C, E>, E> {
    let mut descend = true;
    let mut deferred = Vec::new();
    let mut first_error = None;

    for table in tables.iter_mut() {
        let Some(handler) = table.handler_for(node.kind()) else {
            continue;
        };
        match handler(ctx, node) {
            Ok(Visit::Continue) => {}
            Ok(Visit::Skip) => descend = false,
            Ok(Visit::Exit(callback)) => deferred.push(callback),
            Err(err) => {
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
    }

    first_error.map_or_else(|| Ok(Dispatch { descend, deferred }), Err)
}

fn run_deferred<C, E>(callbacks: Vec<Deferred<'_, C, E>>, ctx: &mut C) -> Result<(), E> {
    for callback in callbacks {
        callback(ctx)?;
    }
    Ok(())
}
