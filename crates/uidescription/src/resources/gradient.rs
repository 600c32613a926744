//! Gradient catalog entries and their color stops.

use core::cell::RefCell;
use std::rc::Rc;

use crate::attributes::AttributeMap;
use crate::color::Color;
use crate::node::{DescriptionNode, NodeKind};

const COLOR_STOP: &str = "color-stop";

/// One stop of a gradient: an offset in `0..=1` and its color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    pub start: f64,
    pub color: Color,
}

/// Color stops ordered by offset.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    stops: Vec<ColorStop>,
}

impl Gradient {
    /// Build a gradient from unordered stops. A repeated offset keeps the first stop.
    pub fn new(stops: impl IntoIterator<Item = ColorStop>) -> Self {
        let mut ordered: Vec<ColorStop> = Vec::new();
        for stop in stops {
            if !ordered
                .iter()
                .any(|existing| existing.start.to_bits() == stop.start.to_bits())
            {
                ordered.push(stop);
            }
        }
        ordered.sort_by(|left, right| left.start.total_cmp(&right.start));
        Self { stops: ordered }
    }

    #[inline]
    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }
}

/// Cached gradient of a `gradient` entry.
#[derive(Debug, Default)]
pub struct GradientState {
    cached: RefCell<Option<Rc<Gradient>>>,
}

impl GradientState {
    #[inline]
    pub fn invalidate(&self) {
        self.cached.replace(None);
    }
}

impl DescriptionNode {
    /// Resolved gradient; absent unless at least two valid stops exist.
    pub fn gradient(&self) -> Option<Rc<Gradient>> {
        let NodeKind::Gradient(state) = &self.kind else {
            return None;
        };
        if let Some(gradient) = state.cached.borrow().as_ref() {
            return Some(Rc::clone(gradient));
        }
        let stops = self
            .children
            .iter()
            .filter(|child| child.name() == COLOR_STOP)
            .filter_map(|child| {
                let start = child.attributes().get_double("start")?;
                let color = Color::parse_hex(child.attributes().get("rgba")?)?;
                Some(ColorStop { start, color })
            });
        let gradient = Gradient::new(stops);
        if gradient.stops.len() < 2 {
            return None;
        }
        let gradient = Rc::new(gradient);
        state.cached.replace(Some(Rc::clone(&gradient)));
        Some(gradient)
    }

    /// Replace the entry's stops with those of `gradient`.
    pub fn set_gradient(&mut self, gradient: Rc<Gradient>) {
        if !matches!(self.kind, NodeKind::Gradient(_)) {
            return;
        }
        self.children.remove_all();
        for stop in gradient.stops() {
            let mut attributes = AttributeMap::new();
            attributes.set_double("start", stop.start);
            attributes.set("rgba", stop.color.to_hex_string());
            self.children
                .add(DescriptionNode::with_attributes(COLOR_STOP, attributes));
        }
        if let NodeKind::Gradient(state) = &self.kind {
            state.cached.replace(Some(gradient));
        }
    }
}
