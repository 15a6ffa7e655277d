//! Range-replacement edits applied in a single pass.
//!
//! Edits are expressed against the *original* byte offsets of an immutable
//! base text. [`apply_edits`] walks them in ascending start order with a copy
//! cursor, so no running offset needs to be maintained by callers: the length
//! delta of each earlier replacement is absorbed by copying from the base.

use std::ops::Range;

/// Replace `range` of the base text with `replacement`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpliceEdit<'a> {
    /// Byte range in the base text.
    pub range: Range<usize>,
    /// Text written in place of `base[range]`.
    pub replacement: &'a str,
}

impl<'a> SpliceEdit<'a> {
    /// Create a new edit.
    #[must_use]
    pub const fn new(range: Range<usize>, replacement: &'a str) -> Self {
        Self { range, replacement }
    }

    /// Net change in length this edit introduces.
    #[must_use]
    pub fn delta(&self) -> isize {
        let replaced = self.range.end.saturating_sub(self.range.start);
        signed(self.replacement.len()) - signed(replaced)
    }
}

// Lengths of in-memory strings always fit in isize.
fn signed(len: usize) -> isize {
    isize::try_from(len).unwrap_or(isize::MAX)
}

/// Apply `edits` to `base` and return the resulting text.
///
/// Edits may be given in any order. An edit that starts before the end of an
/// already-applied edit (nested in, or overlapping, a replaced range) is
/// skipped, as are edits that fall outside `base` or split a UTF-8 character.
#[must_use]
pub fn apply_edits(base: &str, edits: &[SpliceEdit<'_>]) -> String {
    let mut ordered: Vec<&SpliceEdit<'_>> = edits.iter().collect();
    ordered.sort_by_key(|e| (e.range.start, e.range.end));

    let growth: isize = ordered.iter().map(|e| e.delta()).sum();
    let capacity = base.len().saturating_add_signed(growth);
    let mut result = String::with_capacity(capacity);
    let mut cursor = 0_usize;

    for edit in ordered {
        let Range { start, end } = edit.range;
        if start < cursor {
            tracing::debug!(start, end, cursor, "skipping edit nested in a replaced range");
            continue;
        }
        if start > end
            || end > base.len()
            || !base.is_char_boundary(start)
            || !base.is_char_boundary(end)
        {
            tracing::debug!(start, end, len = base.len(), "skipping out-of-bounds edit");
            continue;
        }

        result.push_str(&base[cursor..start]);
        result.push_str(edit.replacement);
        cursor = end;
    }

    result.push_str(&base[cursor..]);
    result
}
