//! Borrowed view of a syntax-tree node together with its source text.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;

/// A node of a parsed tree paired with the source it was parsed from.
///
/// `SyntaxNode` is `Copy` and never owns tree data; every node handed out by
/// this crate borrows from the tree and source of one [`ParseResult`].
///
/// [`ParseResult`]: crate::ParseResult
#[derive(Clone, Copy)]
pub struct SyntaxNode<'t> {
    node: tree_sitter::Node<'t>,
    source: &'t str,
}

impl<'t> SyntaxNode<'t> {
    /// Wraps a Tree-sitter node parsed from `source`.
    #[must_use]
    pub const fn new(node: tree_sitter::Node<'t>, source: &'t str) -> Self {
        Self { node, source }
    }

    const fn wrap(self, node: tree_sitter::Node<'t>) -> Self {
        Self::new(node, self.source)
    }

    /// Returns the underlying Tree-sitter node.
    #[must_use]
    pub const fn raw(self) -> tree_sitter::Node<'t> {
        self.node
    }

    /// Returns the full source text the node was parsed from.
    #[must_use]
    pub const fn source(self) -> &'t str {
        self.source
    }

    /// Returns the node's type tag.
    #[must_use]
    pub fn kind(self) -> &'static str {
        self.node.kind()
    }

    /// Returns an identifier unique to this node within its tree.
    #[must_use]
    pub fn id(self) -> usize {
        self.node.id()
    }

    /// Returns whether the node is named in the grammar.
    #[must_use]
    pub fn is_named(self) -> bool {
        self.node.is_named()
    }

    /// Returns the node's byte span in the source.
    #[must_use]
    pub fn byte_range(self) -> Range<usize> {
        self.node.byte_range()
    }

    /// Returns the start byte offset.
    #[must_use]
    pub fn start_byte(self) -> usize {
        self.node.start_byte()
    }

    /// Returns the end byte offset (exclusive).
    #[must_use]
    pub fn end_byte(self) -> usize {
        self.node.end_byte()
    }

    /// Returns the zero-based column of the node's first byte.
    #[must_use]
    pub fn start_column(self) -> usize {
        self.node.start_position().column
    }

    /// Returns the one-based `(line, column)` of the node's first byte.
    #[must_use]
    pub fn start_position(self) -> (u32, u32) {
        point_to_one_based(self.node.start_position())
    }

    /// Returns the source slice the node covers.
    #[must_use]
    pub fn text(self) -> &'t str {
        self.source.get(self.byte_range()).unwrap_or_default()
    }

    /// Returns the parent node, if any.
    #[must_use]
    pub fn parent(self) -> Option<Self> {
        self.node.parent().map(|parent| self.wrap(parent))
    }

    /// Returns all children, named and anonymous, in source order.
    #[must_use]
    pub fn children(self) -> Vec<Self> {
        let mut cursor = self.node.walk();
        self.node
            .children(&mut cursor)
            .map(|child| self.wrap(child))
            .collect()
    }

    /// Returns the named children in source order.
    #[must_use]
    pub fn named_children(self) -> Vec<Self> {
        let mut cursor = self.node.walk();
        self.node
            .named_children(&mut cursor)
            .map(|child| self.wrap(child))
            .collect()
    }

    /// Returns the first named child.
    #[must_use]
    pub fn first_named_child(self) -> Option<Self> {
        let mut cursor = self.node.walk();
        let first = self.node.named_children(&mut cursor).next();
        first.map(|child| self.wrap(child))
    }

    /// Returns the first child occupying field `name`.
    #[must_use]
    pub fn child_by_field(self, name: &str) -> Option<Self> {
        self.node
            .child_by_field_name(name)
            .map(|child| self.wrap(child))
    }

    /// Returns every child occupying field `name`.
    #[must_use]
    pub fn children_by_field(self, name: &str) -> Vec<Self> {
        let mut cursor = self.node.walk();
        self.node
            .children_by_field_name(name, &mut cursor)
            .map(|child| self.wrap(child))
            .collect()
    }

    /// Returns whether this node occupies field `name` of its parent.
    #[must_use]
    pub fn occupies_field(self, name: &str) -> bool {
        self.parent().is_some_and(|parent| {
            parent
                .children_by_field(name)
                .into_iter()
                .any(|child| child == self)
        })
    }

    /// Returns the previous sibling, named or anonymous.
    #[must_use]
    pub fn prev_sibling(self) -> Option<Self> {
        self.node.prev_sibling().map(|node| self.wrap(node))
    }

    /// Returns the next sibling, named or anonymous.
    #[must_use]
    pub fn next_sibling(self) -> Option<Self> {
        self.node.next_sibling().map(|node| self.wrap(node))
    }

    /// Returns the nearest proper ancestor satisfying `predicate`.
    #[must_use]
    pub fn ancestor(self, mut predicate: impl FnMut(Self) -> bool) -> Option<Self> {
        let mut current = self.parent();
        while let Some(node) = current {
            if predicate(node) {
                return Some(node);
            }
            current = node.parent();
        }
        None
    }

    /// Returns the nearest proper ancestor of type `kind`.
    #[must_use]
    pub fn ancestor_of_kind(self, kind: &str) -> Option<Self> {
        self.ancestor(|node| node.kind() == kind)
    }

    /// Iterates over this node and all of its descendants in pre-order.
    #[must_use]
    pub fn descendants(self) -> Descendants<'t> {
        Descendants {
            cursor: self.node.walk(),
            source: self.source,
            done: false,
        }
    }
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl Eq for SyntaxNode<'_> {}

impl Hash for SyntaxNode<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node.id().hash(state);
    }
}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxNode")
            .field("kind", &self.kind())
            .field("range", &self.byte_range())
            .finish()
    }
}

/// Pre-order iterator over a subtree, driven by a single tree cursor.
pub struct Descendants<'t> {
    cursor: tree_sitter::TreeCursor<'t>,
    source: &'t str,
    done: bool,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = SyntaxNode<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = SyntaxNode::new(self.cursor.node(), self.source);
        if !self.cursor.goto_first_child() {
            while !self.cursor.goto_next_sibling() {
                if !self.cursor.goto_parent() {
                    self.done = true;
                    break;
                }
            }
        }
        Some(current)
    }
}

/// Converts a zero-based Tree-sitter point to one-based display coordinates.
fn point_to_one_based(point: tree_sitter::Point) -> (u32, u32) {
    let line = u32::try_from(point.row.saturating_add(1)).unwrap_or(u32::MAX);
    let column = u32::try_from(point.column.saturating_add(1)).unwrap_or(u32::MAX);
    (line, column)
}
