//! Matching algorithms for compiled queries.

use std::mem;

use super::{CaptureSet, NodeTest, Query, SubPattern, TextTest};
use crate::error::SyntaxError;
use crate::node::SyntaxNode;

impl Query {
    /// Requires every top-level item to be satisfied among `node`'s named
    /// children, each independently of the others.
    pub(super) fn match_all_items<'t>(
        &self,
        node: SyntaxNode<'t>,
        mut captures: CaptureSet<'t>,
    ) -> Result<Option<CaptureSet<'t>>, SyntaxError> {
        let children = node.named_children();
        for item in &self.items {
            if !item.match_among(&children, &mut captures)? {
                return Ok(None);
            }
        }
        Ok(Some(captures))
    }

    /// Scans `node`'s named children in order, emitting a capture set each
    /// time every required top-level item has been satisfied.
    ///
    /// An item already satisfied in the current group is not tried again
    /// until the group is emitted. A trailing partial group is dropped.
    pub(super) fn match_groups<'t>(
        &self,
        node: SyntaxNode<'t>,
        root: CaptureSet<'t>,
    ) -> Result<Vec<CaptureSet<'t>>, SyntaxError> {
        let mut groups = Vec::new();
        let mut group = root.clone();
        let mut satisfied = vec![false; self.items.len()];

        for child in node.named_children() {
            for (item, done) in self.items.iter().zip(satisfied.iter_mut()) {
                if *done {
                    continue;
                }
                let checkpoint = group.checkpoint();
                if item.matches(child, &mut group)? {
                    *done = true;
                } else {
                    group.rollback(checkpoint);
                }
            }

            let complete = self
                .items
                .iter()
                .zip(&satisfied)
                .all(|(item, done)| *done || item.optional);
            if complete && satisfied.contains(&true) {
                groups.push(mem::replace(&mut group, root.clone()));
                satisfied.fill(false);
            }
        }
        Ok(groups)
    }
}

impl SubPattern {
    /// Returns whether some candidate satisfies this item, keeping the
    /// captures of the first one that does.
    ///
    /// Optional items are satisfied even when no candidate matches.
    fn match_among<'t>(
        &self,
        candidates: &[SyntaxNode<'t>],
        captures: &mut CaptureSet<'t>,
    ) -> Result<bool, SyntaxError> {
        for candidate in candidates {
            let checkpoint = captures.checkpoint();
            if self.matches(*candidate, captures)? {
                return Ok(true);
            }
            captures.rollback(checkpoint);
        }
        Ok(self.optional)
    }

    /// Tests `node` against this item and, on success, binds its capture and
    /// recurses into its nested items.
    ///
    /// On failure some captures may have been bound; callers roll back.
    pub(super) fn matches<'t>(
        &self,
        node: SyntaxNode<'t>,
        captures: &mut CaptureSet<'t>,
    ) -> Result<bool, SyntaxError> {
        if !self.test_node(node) || !self.test_text(node) {
            return Ok(false);
        }
        if let Some(name) = &self.capture {
            captures.insert(name, node)?;
        }
        if self.items.is_empty() {
            return Ok(true);
        }

        let children = node.named_children();
        for item in &self.items {
            if !item.match_among(&children, captures)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn test_node(&self, node: SyntaxNode<'_>) -> bool {
        match &self.test {
            NodeTest::Kind(kinds) => kinds.iter().any(|kind| kind == node.kind()),
            NodeTest::Field(fields) => fields.iter().any(|field| node.occupies_field(field)),
            NodeTest::Wildcard => true,
        }
    }

    fn test_text(&self, node: SyntaxNode<'_>) -> bool {
        if self.text.is_empty() {
            return true;
        }
        let text = node.text();
        self.text.iter().any(|test| match test {
            TextTest::Exact(expected) => text == expected,
            TextTest::Pattern(pattern) => pattern.is_match(text),
        })
    }
}
