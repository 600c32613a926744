//! Registry of view classes and the creator chains that configure them.
//!
//! Each [`ViewCreator`] knows how to build one class and how to apply and read back the
//! attributes that class declares. A creator may name a base class; applying attributes
//! walks from the concrete class up through its bases, so a control view also receives
//! every plain view attribute.

pub mod builtin;

use std::collections::{HashMap, HashSet};

use crate::attributes::AttributeMap;
use crate::document::UiDescription;
use crate::view::View;

/// Attribute used to select the view class of a template node.
pub const CLASS_ATTRIBUTE: &str = "class";

/// Default class for nodes without a `class` attribute.
pub const DEFAULT_CLASS: &str = "CViewContainer";

/// Declared value type of a creator attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Boolean,
    Integer,
    Float,
    Point,
    Rect,
    String,
    Color,
    Font,
    Bitmap,
    Tag,
    Gradient,
    List,
    Unknown,
}

impl AttributeType {
    /// Types whose values are names resolved through the document.
    #[inline]
    pub const fn is_named_resource(self) -> bool {
        matches!(self, Self::Color | Self::Tag | Self::Font | Self::Gradient)
    }
}

pub type CreateFn = Box<dyn Fn(&AttributeMap, &UiDescription) -> Option<Box<dyn View>>>;
pub type ApplyFn = Box<dyn Fn(&mut dyn View, &AttributeMap, &UiDescription) -> bool>;
pub type ReadFn = Box<dyn Fn(&dyn View, &str, &UiDescription) -> Option<String>>;

/// Builds and configures one view class.
pub struct ViewCreator {
    class_name: String,
    base_class_name: Option<String>,
    create: CreateFn,
    apply: ApplyFn,
    read: ReadFn,
    attributes: Vec<(String, AttributeType)>,
}

impl ViewCreator {
    /// A creator with no attributes of its own.
    pub fn new(
        class_name: impl Into<String>,
        base_class_name: Option<&str>,
        create: impl Fn(&AttributeMap, &UiDescription) -> Option<Box<dyn View>> + 'static,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            base_class_name: base_class_name.map(str::to_owned),
            create: Box::new(create),
            apply: Box::new(|_, _, _| true),
            read: Box::new(|_, _, _| None),
            attributes: Vec::new(),
        }
    }

    /// Set the function applying this class's attributes. Returning `false` stops the
    /// chain before the base classes.
    #[must_use]
    pub fn with_apply(
        mut self,
        apply: impl Fn(&mut dyn View, &AttributeMap, &UiDescription) -> bool + 'static,
    ) -> Self {
        self.apply = Box::new(apply);
        self
    }

    /// Set the function reading an attribute of this class back as text.
    #[must_use]
    pub fn with_read(
        mut self,
        read: impl Fn(&dyn View, &str, &UiDescription) -> Option<String> + 'static,
    ) -> Self {
        self.read = Box::new(read);
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, name: &str, attribute_type: AttributeType) -> Self {
        self.attributes.push((name.to_owned(), attribute_type));
        self
    }

    #[inline]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    #[inline]
    pub fn base_class_name(&self) -> Option<&str> {
        self.base_class_name.as_deref()
    }

    /// Declared attributes in declaration order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|(name, _)| name.as_str())
    }

    pub fn attribute_type(&self, name: &str) -> Option<AttributeType> {
        self.attributes
            .iter()
            .find(|(declared, _)| declared == name)
            .map(|&(_, attribute_type)| attribute_type)
    }
}

/// String-keyed registry of view creators.
#[derive(Default)]
pub struct ViewFactory {
    creators: HashMap<String, ViewCreator>,
}

impl ViewFactory {
    /// An empty registry.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding `CView`, `CViewContainer` and `CControl`.
    pub fn with_builtin_creators() -> Self {
        let mut factory = Self::new();
        builtin::register_all(&mut factory);
        factory
    }

    /// Add a creator, replacing one registered for the same class.
    pub fn register(&mut self, creator: ViewCreator) {
        self.creators.insert(creator.class_name.clone(), creator);
    }

    pub fn unregister(&mut self, class_name: &str) -> bool {
        self.creators.remove(class_name).is_some()
    }

    #[inline]
    pub fn creator(&self, class_name: &str) -> Option<&ViewCreator> {
        self.creators.get(class_name)
    }

    /// Creators from `class_name` up through its bases. A repeated class ends the walk.
    pub fn chain(&self, class_name: &str) -> Vec<&ViewCreator> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(class_name);
        while let Some(name) = next {
            if !seen.insert(name) {
                log::debug!(target: "uidescription", "class chain of {class_name} loops at {name}");
                break;
            }
            let Some(creator) = self.creators.get(name) else {
                break;
            };
            chain.push(creator);
            next = creator.base_class_name();
        }
        chain
    }

    /// Build a view of `class_name` and apply `attributes` through its creator chain.
    pub fn create_view_by_name(
        &self,
        class_name: &str,
        attributes: &AttributeMap,
        description: &UiDescription,
    ) -> Option<Box<dyn View>> {
        let Some(creator) = self.creators.get(class_name) else {
            log::debug!(target: "uidescription", "no view creator for class {class_name}");
            return None;
        };
        let mut view = (creator.create)(attributes, description)?;
        view.properties_mut().class_name = Some(creator.class_name.clone());
        let evaluated = self.evaluate_and_remember(view.as_mut(), attributes, description);
        self.apply_chain(class_name, view.as_mut(), &evaluated, description);
        Some(view)
    }

    /// Build a view of the class named by the `class` attribute, or a container.
    pub fn create_view(
        &self,
        attributes: &AttributeMap,
        description: &UiDescription,
    ) -> Option<Box<dyn View>> {
        let class_name = attributes.get(CLASS_ATTRIBUTE).unwrap_or(DEFAULT_CLASS);
        self.create_view_by_name(class_name, attributes, description)
    }

    /// Apply `attributes` through the chain of the class the view was created as.
    pub fn apply_attribute_values(
        &self,
        view: &mut dyn View,
        attributes: &AttributeMap,
        description: &UiDescription,
    ) -> bool {
        let Some(class_name) = view.properties().class_name.clone() else {
            return false;
        };
        let evaluated = self.evaluate_and_remember(view, attributes, description);
        self.apply_chain(&class_name, view, &evaluated, description)
    }

    /// Configure a view built outside the factory as if it were a `base_class_name`.
    pub fn apply_custom_view_attribute_values(
        &self,
        view: &mut dyn View,
        base_class_name: &str,
        attributes: &AttributeMap,
        description: &UiDescription,
    ) -> bool {
        if let Some(creator) = self.creators.get(base_class_name) {
            view.properties_mut().class_name = Some(creator.class_name.clone());
        }
        let evaluated = self.evaluate_and_remember(view, attributes, description);
        self.apply_chain(base_class_name, view, &evaluated, description)
    }

    fn apply_chain(
        &self,
        class_name: &str,
        view: &mut dyn View,
        attributes: &AttributeMap,
        description: &UiDescription,
    ) -> bool {
        let mut result = false;
        for creator in self.chain(class_name) {
            result = (creator.apply)(view, attributes, description);
            if !result {
                break;
            }
        }
        result
    }

    /// Replace values naming a variable by the variable's text and remember the original
    /// text of values that resolve by name.
    fn evaluate_and_remember(
        &self,
        view: &mut dyn View,
        attributes: &AttributeMap,
        description: &UiDescription,
    ) -> AttributeMap {
        let mut evaluated = AttributeMap::new();
        for (name, value) in attributes {
            if let Some(variable) = description.get_variable_string(value) {
                view.properties_mut().remember_attribute(name, value);
                evaluated.set(name.as_str(), variable);
                continue;
            }
            if self.attribute_type(view, name).is_named_resource() {
                view.properties_mut().remember_attribute(name, value);
            }
            evaluated.set(name.as_str(), value.as_str());
        }
        evaluated
    }

    /// Class the view was created or configured as.
    #[inline]
    pub fn view_class_name<'view>(&self, view: &'view dyn View) -> Option<&'view str> {
        view.properties().class_name.as_deref()
    }

    /// Every attribute declared along the view's chain.
    pub fn attribute_names_for_view(&self, view: &dyn View) -> Vec<String> {
        let Some(class_name) = self.view_class_name(view) else {
            return Vec::new();
        };
        self.chain(class_name)
            .into_iter()
            .flat_map(ViewCreator::attribute_names)
            .map(str::to_owned)
            .collect()
    }

    /// Current text of an attribute: the remembered value first, then the first reader
    /// along the chain that knows it.
    pub fn attribute_value(
        &self,
        view: &dyn View,
        name: &str,
        description: &UiDescription,
    ) -> Option<String> {
        if let Some(remembered) = view.properties().remembered_attribute(name) {
            return Some(remembered.to_owned());
        }
        let class_name = self.view_class_name(view)?;
        self.chain(class_name)
            .into_iter()
            .find_map(|creator| (creator.read)(view, name, description))
    }

    pub fn attribute_type(&self, view: &dyn View, name: &str) -> AttributeType {
        self.view_class_name(view)
            .and_then(|class_name| {
                self.chain(class_name)
                    .into_iter()
                    .find_map(|creator| creator.attribute_type(name))
            })
            .unwrap_or(AttributeType::Unknown)
    }

    /// Every readable attribute of the view plus its `class`.
    pub fn attributes_for_view(
        &self,
        view: &dyn View,
        description: &UiDescription,
    ) -> Option<AttributeMap> {
        let class_name = self.view_class_name(view)?;
        let mut attributes = AttributeMap::new();
        for name in self.attribute_names_for_view(view) {
            if let Some(value) = self.attribute_value(view, &name, description) {
                attributes.set(name, value);
            }
        }
        attributes.set(CLASS_ATTRIBUTE, class_name);
        Some(attributes)
    }

    /// Registered class names, sorted. With a filter, only classes whose chain contains
    /// the filter class are listed.
    pub fn collect_registered_view_names(&self, base_class_filter: Option<&str>) -> Vec<String> {
        let mut names: Vec<String> = self
            .creators
            .keys()
            .filter(|class_name| {
                base_class_filter.is_none_or(|filter| {
                    self.chain(class_name).iter().any(|creator| {
                        creator.class_name == filter || creator.base_class_name() == Some(filter)
                    })
                })
            })
            .cloned()
            .collect();
        names.sort_unstable();
        names
    }
}
