//! Byte-range code edits and the engine that applies them.
//!
//! Edits always reference offsets in the *original* source. The engine walks
//! an ascending, non-overlapping edit list once, keeping a running adjustment
//! that absorbs the length change of every edit applied so far.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A half-open byte-range replacement into an original source text.
///
/// An edit whose range is empty is a pure insertion; an edit whose
/// replacement is empty is a pure deletion.
///
/// # Example
///
/// ```
/// use splice_core::CodeEdit;
///
/// let edit = CodeEdit::delete(4..9);
/// assert_eq!(edit.byte_range(), 4..9);
/// assert!(edit.new_text.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeEdit {
    /// Start byte offset in the original source (inclusive).
    pub start_index: usize,
    /// End byte offset in the original source (exclusive).
    pub end_index: usize,
    /// Replacement text spliced in place of the range.
    pub new_text: String,
}

impl CodeEdit {
    /// Creates an edit replacing `start_index..end_index` with `new_text`.
    #[must_use]
    pub fn new(start_index: usize, end_index: usize, new_text: impl Into<String>) -> Self {
        Self {
            start_index,
            end_index,
            new_text: new_text.into(),
        }
    }

    /// Creates an edit replacing `range` with `new_text`.
    #[must_use]
    pub fn replace(range: Range<usize>, new_text: impl Into<String>) -> Self {
        Self::new(range.start, range.end, new_text)
    }

    /// Creates an edit removing `range`.
    #[must_use]
    pub fn delete(range: Range<usize>) -> Self {
        Self::new(range.start, range.end, String::new())
    }

    /// Creates an edit inserting `new_text` at `offset`.
    #[must_use]
    pub fn insert(offset: usize, new_text: impl Into<String>) -> Self {
        Self::new(offset, offset, new_text)
    }

    /// Returns the original byte range covered by this edit.
    #[must_use]
    pub const fn byte_range(&self) -> Range<usize> {
        self.start_index..self.end_index
    }

    /// Length change this edit causes, or `None` when it cannot be expressed
    /// as an `isize` (or the range is inverted).
    fn length_delta(&self) -> Option<isize> {
        let removed = self.end_index.checked_sub(self.start_index)?;
        let added = isize::try_from(self.new_text.len()).ok()?;
        added.checked_sub(isize::try_from(removed).ok()?)
    }
}

/// Errors raised while validating or applying edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EditError {
    /// An edit ends before it starts.
    #[error("edit {index} has an inverted range {start}..{end}")]
    InvertedRange {
        /// Position of the edit in the list.
        index: usize,
        /// Start byte offset.
        start: usize,
        /// End byte offset.
        end: usize,
    },

    /// An edit starts before the edit preceding it.
    #[error("edit {index} starts before edit {previous} (edits must be sorted ascending)")]
    Unsorted {
        /// Position of the offending edit.
        index: usize,
        /// Position of the preceding edit.
        previous: usize,
    },

    /// An edit starts inside the range of the edit preceding it.
    #[error("edit {index} overlaps edit {previous}")]
    Overlapping {
        /// Position of the offending edit.
        index: usize,
        /// Position of the preceding edit.
        previous: usize,
    },

    /// An edit range falls outside the text being edited.
    #[error("edit range {start}..{end} is out of bounds for text of length {len}")]
    OutOfBounds {
        /// Start byte offset in the original source.
        start: usize,
        /// End byte offset in the original source.
        end: usize,
        /// Length of the buffer at the time the edit was applied.
        len: usize,
    },

    /// An edit boundary splits a UTF-8 character.
    #[error("edit boundary at byte {offset} is not on a UTF-8 character boundary")]
    NotCharBoundary {
        /// Offending byte offset in the original source.
        offset: usize,
    },
}

impl EditError {
    const fn out_of_bounds(edit: &CodeEdit, len: usize) -> Self {
        Self::OutOfBounds {
            start: edit.start_index,
            end: edit.end_index,
            len,
        }
    }
}

/// Checks the caller contract for [`apply_edits`]: every range well formed,
/// edits sorted ascending by start offset, and no two edits overlapping.
///
/// # Errors
///
/// Returns the first violation found.
///
/// # Example
///
/// ```
/// use splice_core::{CodeEdit, EditError, validate_edits};
///
/// let edits = [CodeEdit::delete(5..9), CodeEdit::delete(7..12)];
/// assert_eq!(
///     validate_edits(&edits),
///     Err(EditError::Overlapping { index: 1, previous: 0 })
/// );
/// ```
pub fn validate_edits(edits: &[CodeEdit]) -> Result<(), EditError> {
    let mut previous: Option<(usize, &CodeEdit)> = None;
    for (index, edit) in edits.iter().enumerate() {
        if edit.end_index < edit.start_index {
            return Err(EditError::InvertedRange {
                index,
                start: edit.start_index,
                end: edit.end_index,
            });
        }
        if let Some((previous_index, prior)) = previous {
            if edit.start_index < prior.start_index {
                return Err(EditError::Unsorted {
                    index,
                    previous: previous_index,
                });
            }
            if edit.start_index < prior.end_index {
                return Err(EditError::Overlapping {
                    index,
                    previous: previous_index,
                });
            }
        }
        previous = Some((index, edit));
    }
    Ok(())
}

/// Applies `edits` to `source` and returns the rewritten text.
///
/// `edits` must be sorted ascending by start offset and pairwise
/// non-overlapping, with every offset referring to the original `source`.
/// The contract is asserted in debug builds only; callers that need a checked
/// result in release builds should call [`validate_edits`] first.
///
/// # Errors
///
/// Returns [`EditError::OutOfBounds`] or [`EditError::NotCharBoundary`] when
/// an edit cannot be spliced into the buffer.
pub fn apply_edits(source: &str, edits: &[CodeEdit]) -> Result<String, EditError> {
    debug_assert!(
        validate_edits(edits).is_ok(),
        "edits must be sorted ascending and non-overlapping"
    );

    let mut buffer = source.to_owned();
    let mut adjustment: isize = 0;
    for edit in edits {
        let start = edit.start_index.checked_add_signed(adjustment);
        let end = edit.end_index.checked_add_signed(adjustment);
        let (Some(start), Some(end)) = (start, end) else {
            return Err(EditError::out_of_bounds(edit, buffer.len()));
        };
        if start > end || end > buffer.len() {
            return Err(EditError::out_of_bounds(edit, buffer.len()));
        }
        if !buffer.is_char_boundary(start) {
            return Err(EditError::NotCharBoundary {
                offset: edit.start_index,
            });
        }
        if !buffer.is_char_boundary(end) {
            return Err(EditError::NotCharBoundary {
                offset: edit.end_index,
            });
        }

        buffer.replace_range(start..end, &edit.new_text);

        // The adjustment accumulates across edits; each edit shifts every
        // later offset by its own length change.
        adjustment = edit
            .length_delta()
            .and_then(|delta| adjustment.checked_add(delta))
            .ok_or_else(|| EditError::out_of_bounds(edit, buffer.len()))?;
    }
    Ok(buffer)
}
