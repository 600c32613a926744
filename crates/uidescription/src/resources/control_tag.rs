//! Control-tag catalog entries.
//!
//! A tag is written either as a decimal integer, as a four character code between
//! apostrophes (`'mytg'`), or as an expression the document evaluates on first use.

use core::cell::Cell;

use crate::node::{DescriptionNode, NodeKind};

const TAG: &str = "tag";

/// Cached tag value of a `control-tag` entry.
#[derive(Debug, Default)]
pub struct ControlTagState {
    cached: Cell<Option<i32>>,
}

impl ControlTagState {
    #[inline]
    pub fn invalidate(&self) {
        self.cached.set(None);
    }
}

/// Pack `'abcd'` big-endian. Exactly four bytes between the apostrophes.
pub fn parse_quoted_tag(text: &str) -> Option<i32> {
    match *text.as_bytes() {
        [b'\'', first, second, third, fourth, b'\''] => {
            Some(i32::from_be_bytes([first, second, third, fourth]))
        }
        _ => None,
    }
}

/// Literal value of a tag string: a quoted four character code or a whole decimal integer.
pub fn parse_tag_literal(text: &str) -> Option<i32> {
    parse_quoted_tag(text).or_else(|| text.parse::<i32>().ok())
}

impl DescriptionNode {
    /// Tag value when it is cached or a literal; `None` means it needs evaluation.
    pub fn tag(&self) -> Option<i32> {
        let NodeKind::ControlTag(state) = &self.kind else {
            return None;
        };
        if let Some(tag) = state.cached.get() {
            return Some(tag);
        }
        let tag = parse_tag_literal(self.attributes.get(TAG)?)?;
        state.cached.set(Some(tag));
        Some(tag)
    }

    /// Remember an evaluated tag value.
    #[inline]
    pub fn cache_tag(&self, tag: i32) {
        if let NodeKind::ControlTag(state) = &self.kind {
            state.cached.set(Some(tag));
        }
    }

    #[inline]
    pub fn tag_string(&self) -> Option<&str> {
        self.attributes.get(TAG)
    }

    /// Replace the tag source text and drop the cached value.
    pub fn set_tag_string(&mut self, text: &str) {
        if let NodeKind::ControlTag(state) = &self.kind {
            state.cached.set(None);
        }
        self.attributes.set(TAG, text);
    }
}
