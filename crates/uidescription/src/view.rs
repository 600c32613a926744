//! The minimal view model that templates are compiled into.
//!
//! Views here carry only the state that description attributes configure; drawing and
//! event handling belong to the embedding toolkit.

use core::any::Any;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::color::Color;
use crate::controller::{ControlListener, Controller};
use crate::geometry::{Point, Rect};
use crate::resources::bitmap::Bitmap;

bitflags::bitflags! {
    /// Boolean view state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ViewFlags: u8 {
        const TRANSPARENT   = 0b001;
        const MOUSE_ENABLED = 0b010;
        const WANTS_FOCUS   = 0b100;
    }
}

bitflags::bitflags! {
    /// Edges and directions a view follows when its parent resizes.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Autosize: u8 {
        const LEFT   = 0b00_0001;
        const TOP    = 0b00_0010;
        const RIGHT  = 0b00_0100;
        const BOTTOM = 0b00_1000;
        const ROW    = 0b01_0000;
        const COLUMN = 0b10_0000;
    }
}

const AUTOSIZE_NAMES: [(Autosize, &str); 6] = [
    (Autosize::LEFT, "left"),
    (Autosize::TOP, "top"),
    (Autosize::RIGHT, "right"),
    (Autosize::BOTTOM, "bottom"),
    (Autosize::ROW, "row"),
    (Autosize::COLUMN, "column"),
];

impl Autosize {
    /// Parse a space separated list such as `"left right"`. Unknown words are ignored.
    pub fn parse(text: &str) -> Self {
        let mut flags = Self::empty();
        for word in text.split_whitespace() {
            if let Some((flag, _)) = AUTOSIZE_NAMES.iter().find(|(_, name)| *name == word) {
                flags.insert(*flag);
            }
        }
        flags
    }

    pub fn to_attribute_string(self) -> String {
        let names: Vec<&str> = AUTOSIZE_NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        names.join(" ")
    }
}

/// State shared by every view.
pub struct ViewProperties {
    pub rect: Rect,
    pub opacity: f64,
    pub flags: ViewFlags,
    pub background: Option<Rc<Bitmap>>,
    pub disabled_background: Option<Rc<Bitmap>>,
    pub autosize: Autosize,
    pub tooltip: Option<String>,
    pub custom_view_name: Option<String>,
    pub sub_controller_name: Option<String>,
    /// Opaque attributes keyed by their four character id
    pub attributes: BTreeMap<u32, Vec<u8>>,
    /// Class the view was created or configured as
    pub class_name: Option<String>,
    /// Attribute text as written in the description, for values that resolve by name
    pub remembered: BTreeMap<String, String>,
    /// Template the view was instantiated from
    pub template_name: Option<String>,
    /// Sub-controller owning this view's subtree
    pub controller: Option<Rc<dyn Controller>>,
}

impl Default for ViewProperties {
    fn default() -> Self {
        Self {
            rect: Rect::default(),
            opacity: 1.0,
            flags: ViewFlags::MOUSE_ENABLED,
            background: None,
            disabled_background: None,
            autosize: Autosize::empty(),
            tooltip: None,
            custom_view_name: None,
            sub_controller_name: None,
            attributes: BTreeMap::new(),
            class_name: None,
            remembered: BTreeMap::new(),
            template_name: None,
            controller: None,
        }
    }
}

impl ViewProperties {
    /// Store an opaque attribute. An id of zero is ignored.
    pub fn set_attribute(&mut self, id: u32, value: Vec<u8>) -> bool {
        if id == 0 {
            return false;
        }
        self.attributes.insert(id, value);
        true
    }

    #[inline]
    pub fn attribute(&self, id: u32) -> Option<&[u8]> {
        self.attributes.get(&id).map(Vec::as_slice)
    }

    #[inline]
    pub fn remember_attribute(&mut self, name: &str, value: &str) {
        self.remembered.insert(name.to_owned(), value.to_owned());
    }

    #[inline]
    pub fn remembered_attribute(&self, name: &str) -> Option<&str> {
        self.remembered.get(name).map(String::as_str)
    }
}

/// A node of a view graph.
pub trait View: Any {
    fn properties(&self) -> &ViewProperties;
    fn properties_mut(&mut self) -> &mut ViewProperties;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn as_container(&self) -> Option<&dyn ViewContainer> {
        None
    }

    fn as_container_mut(&mut self) -> Option<&mut dyn ViewContainer> {
        None
    }
}

/// A view owning child views.
pub trait ViewContainer {
    fn add_view(&mut self, view: Box<dyn View>);
    fn views(&self) -> &[Box<dyn View>];
    fn views_mut(&mut self) -> &mut Vec<Box<dyn View>>;

    fn view_count(&self) -> usize {
        self.views().len()
    }
}

macro_rules! impl_view {
    ($view:ty) => {
        impl View for $view {
            fn properties(&self) -> &ViewProperties {
                &self.properties
            }

            fn properties_mut(&mut self) -> &mut ViewProperties {
                &mut self.properties
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }
    };
}

/// A plain view.
#[derive(Default)]
pub struct BasicView {
    pub properties: ViewProperties,
}

impl_view!(BasicView);

/// A view holding child views.
#[derive(Default)]
pub struct ContainerView {
    pub properties: ViewProperties,
    pub background_color: Option<Color>,
    children: Vec<Box<dyn View>>,
}

impl ViewContainer for ContainerView {
    fn add_view(&mut self, view: Box<dyn View>) {
        self.children.push(view);
    }

    fn views(&self) -> &[Box<dyn View>] {
        &self.children
    }

    fn views_mut(&mut self) -> &mut Vec<Box<dyn View>> {
        &mut self.children
    }
}

impl View for ContainerView {
    fn properties(&self) -> &ViewProperties {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut ViewProperties {
        &mut self.properties
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_container(&self) -> Option<&dyn ViewContainer> {
        Some(self)
    }

    fn as_container_mut(&mut self) -> Option<&mut dyn ViewContainer> {
        Some(self)
    }
}

/// A view with a tagged value reported to a listener.
pub struct ControlView {
    pub properties: ViewProperties,
    pub tag: i32,
    pub listener: Option<Rc<dyn ControlListener>>,
    pub value: f64,
    pub default_value: f64,
    pub min: f64,
    pub max: f64,
    pub wheel_increment: f64,
    pub background_offset: Point,
}

impl Default for ControlView {
    fn default() -> Self {
        Self {
            properties: ViewProperties::default(),
            tag: -1,
            listener: None,
            value: 0.0,
            default_value: 0.5,
            min: 0.0,
            max: 1.0,
            wheel_increment: 0.1,
            background_offset: Point::default(),
        }
    }
}

impl ControlView {
    /// Set the value clamped to `min..=max` and notify the listener.
    pub fn set_value(&mut self, value: f64) {
        let low = self.min.min(self.max);
        let high = self.max.max(self.min);
        self.value = value.max(low).min(high);
        if let Some(listener) = &self.listener {
            listener.value_changed(self.tag, self.value);
        }
    }
}

impl_view!(ControlView);

/// Downcast helper for views behind `dyn View`.
pub fn downcast_ref<T: View>(view: &dyn View) -> Option<&T> {
    view.as_any().downcast_ref::<T>()
}
