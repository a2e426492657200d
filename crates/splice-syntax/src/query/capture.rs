//! Named captures produced by a query match.

use std::ops::Range;

use crate::error::SyntaxError;
use crate::node::SyntaxNode;

/// The captures bound by one completed match, in binding order.
///
/// Every set also remembers the node the query matched at, whether or not
/// the query captured it by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSet<'t> {
    node: SyntaxNode<'t>,
    entries: Vec<(String, SyntaxNode<'t>)>,
}

impl<'t> CaptureSet<'t> {
    /// Creates an empty set for a match rooted at `node`.
    #[must_use]
    pub const fn new(node: SyntaxNode<'t>) -> Self {
        Self {
            node,
            entries: Vec::new(),
        }
    }

    /// Returns the node the query matched at.
    #[must_use]
    pub const fn node(&self) -> SyntaxNode<'t> {
        self.node
    }

    /// Returns the node captured under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<SyntaxNode<'t>> {
        self.entries
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, node)| *node)
    }

    /// Returns the text of the node captured under `name`.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&'t str> {
        self.get(name).map(SyntaxNode::text)
    }

    /// Returns the byte range of the node captured under `name`.
    #[must_use]
    pub fn byte_range(&self, name: &str) -> Option<Range<usize>> {
        self.get(name).map(SyntaxNode::byte_range)
    }

    /// Returns whether `name` is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(bound, _)| bound == name)
    }

    /// Returns the bound names in binding order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Returns the number of bound names.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether nothing is bound.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Binds `node` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::DuplicateCapture`] if `name` is already bound;
    /// the existing binding is kept.
    pub fn insert(&mut self, name: &str, node: SyntaxNode<'t>) -> Result<(), SyntaxError> {
        if self.contains(name) {
            return Err(SyntaxError::duplicate_capture(name));
        }
        self.entries.push((name.to_owned(), node));
        Ok(())
    }

    pub(super) const fn checkpoint(&self) -> usize {
        self.entries.len()
    }

    pub(super) fn rollback(&mut self, checkpoint: usize) {
        self.entries.truncate(checkpoint);
    }
}
