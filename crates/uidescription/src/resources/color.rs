//! Color catalog entries.

use core::cell::Cell;

use crate::color::Color;
use crate::node::{DescriptionNode, NAME_ATTRIBUTE, NodeKind};

/// Cached color of a `color` entry.
#[derive(Debug, Default)]
pub struct ColorState {
    cached: Cell<Option<Color>>,
}

impl ColorState {
    #[inline]
    pub fn invalidate(&self) {
        self.cached.set(None);
    }
}

fn channel(node: &DescriptionNode, name: &str) -> Option<u8> {
    let value = node.attributes.get_int(name)?;
    Some(value.clamp(0, 255) as u8)
}

impl DescriptionNode {
    /// Resolved color of a color entry.
    ///
    /// Channels are read from `red`/`green`/`blue`/`alpha`, then overridden by `rgb` (opaque)
    /// and `rgba` literals when present.
    pub fn color(&self) -> Option<Color> {
        let NodeKind::Color(state) = &self.kind else {
            return None;
        };
        if let Some(color) = state.cached.get() {
            return Some(color);
        }
        let mut color = Color::new(
            channel(self, "red").unwrap_or(0),
            channel(self, "green").unwrap_or(0),
            channel(self, "blue").unwrap_or(0),
            channel(self, "alpha").unwrap_or(255),
        );
        if let Some(rgb) = self.attributes.get("rgb").and_then(Color::parse_hex) {
            color = rgb;
        }
        if let Some(rgba) = self.attributes.get("rgba").and_then(Color::parse_hex) {
            color = rgba;
        }
        log::trace!(target: "uidescription", "resolved color {:?} to {color}", self.name_attribute());
        state.cached.set(Some(color));
        Some(color)
    }

    /// Replace the entry's definition with a single `rgba` literal.
    pub fn set_color(&mut self, color: Color) {
        let NodeKind::Color(state) = &self.kind else {
            return;
        };
        state.cached.set(Some(color));
        self.attributes.retain_only(NAME_ATTRIBUTE);
        self.attributes.set("rgba", color.to_hex_string());
    }
}
