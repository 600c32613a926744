//! Templates and the views instantiated from them.

use std::rc::Rc;

use super::{TEMPLATE_NODE_NAME, UiDescription};
use crate::attributes::AttributeMap;
use crate::controller::{Controller, ControllerScope};
use crate::factory::{CLASS_ATTRIBUTE, DEFAULT_CLASS};
use crate::geometry::Point;
use crate::node::{DescriptionNode, NAME_ATTRIBUTE};
use crate::view::{ContainerView, View};

/// Element name of view nodes inside templates.
pub const VIEW_NODE_NAME: &str = "view";

const ATTRIBUTE_NODE_NAME: &str = "attribute";
const TEMPLATE_ATTRIBUTE: &str = "template";
const SUB_CONTROLLER_ATTRIBUTE: &str = "sub-controller";

fn is_template(node: &DescriptionNode, name: &str) -> bool {
    node.name() == TEMPLATE_NODE_NAME && node.name_attribute() == Some(name)
}

/// Id of an `attribute` child: four characters packed big-endian, else a decimal number.
fn parse_attribute_id(text: &str) -> u32 {
    match <[u8; 4]>::try_from(text.as_bytes()) {
        Ok(bytes) => u32::from_be_bytes(bytes),
        Err(_) => text.trim().parse().unwrap_or(0),
    }
}

/// Views below `view` that were instantiated from templates, without descending into them.
fn collect_template_views<'view>(
    view: &'view dyn View,
    found: &mut Vec<(&'view str, &'view dyn View)>,
) {
    let Some(container) = view.as_container() else {
        return;
    };
    for child in container.views() {
        match child.properties().template_name.as_deref() {
            Some(name) => found.push((name, child.as_ref())),
            None => collect_template_views(child.as_ref(), found),
        }
    }
}

impl UiDescription {
    fn template_position(&self, name: &str) -> Option<usize> {
        self.root
            .as_ref()?
            .children()
            .iter()
            .position(|node| is_template(node, name))
    }

    fn template_node(&self, name: &str) -> Option<&DescriptionNode> {
        self.root
            .as_ref()?
            .children()
            .iter()
            .find(|node| is_template(node, name))
    }

    fn template_node_mut(&mut self, name: &str) -> Option<&mut DescriptionNode> {
        let position = self.template_position(name)?;
        self.root
            .as_mut()?
            .children_mut()
            .get_mut_unindexed(position)
    }

    fn notify_templates_changed(&self) {
        self.notify(|listener, description| listener.template_changed(description));
    }

    /// Attributes of template `name`.
    pub fn get_view_attributes(&self, name: &str) -> Option<&AttributeMap> {
        self.template_node(name).map(DescriptionNode::attributes)
    }

    /// Names of every template in document order.
    pub fn collect_template_view_names(&self) -> Vec<String> {
        self.root
            .as_ref()
            .map(|root| {
                root.children()
                    .iter()
                    .filter(|node| node.name() == TEMPLATE_NODE_NAME)
                    .filter_map(DescriptionNode::name_attribute)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Add an empty template `name` carrying `attributes`. Fails when it exists.
    pub fn add_new_template(&mut self, name: &str, mut attributes: AttributeMap) -> bool {
        if self.template_position(name).is_some() {
            return false;
        }
        let Some(root) = self.root.as_mut() else {
            return false;
        };
        attributes.set(NAME_ATTRIBUTE, name);
        root.children_mut()
            .add(DescriptionNode::with_attributes(TEMPLATE_NODE_NAME, attributes));
        self.notify_templates_changed();
        true
    }

    pub fn remove_template(&mut self, name: &str) -> bool {
        let Some(position) = self.template_position(name) else {
            return false;
        };
        let removed = self
            .root
            .as_mut()
            .and_then(|root| root.children_mut().remove(position));
        if removed.is_none() {
            return false;
        }
        self.notify_templates_changed();
        true
    }

    pub fn change_template_name(&mut self, name: &str, new_name: &str) -> bool {
        let Some(node) = self.template_node_mut(name) else {
            return false;
        };
        node.attributes_mut().set(NAME_ATTRIBUTE, new_name);
        self.notify_templates_changed();
        true
    }

    /// Append a deep copy of template `name` called `duplicate_name`.
    pub fn duplicate_template(&mut self, name: &str, duplicate_name: &str) -> bool {
        let Some(mut duplicate) = self.template_node(name).cloned() else {
            return false;
        };
        let Some(root) = self.root.as_mut() else {
            return false;
        };
        duplicate.attributes_mut().set(NAME_ATTRIBUTE, duplicate_name);
        root.children_mut().add(duplicate);
        self.notify_templates_changed();
        true
    }

    /// Instantiate template `name` with `controller` as the current controller.
    ///
    /// The returned view remembers the template it came from.
    pub fn create_view(
        &self,
        name: &str,
        controller: Option<Rc<dyn Controller>>,
    ) -> Option<Box<dyn View>> {
        let _scope = ControllerScope::enter(&self.controller, controller);
        let Some(node) = self.template_node(name) else {
            log::debug!(target: "uidescription", "no template named {name}");
            return None;
        };
        let mut view = self.create_view_from_node(node)?;
        view.properties_mut().template_name = Some(name.to_owned());
        Some(view)
    }

    /// Build the view described by `node` and its `view` children.
    pub fn create_view_from_node(&self, node: &DescriptionNode) -> Option<Box<dyn View>> {
        if let Some(template_name) = node.attributes().get(TEMPLATE_ATTRIBUTE) {
            return self.create_nested_template(template_name, node.attributes());
        }
        let sub_controller = match (self.controller(), node.attributes().get(SUB_CONTROLLER_ATTRIBUTE)) {
            (Some(controller), Some(name)) => controller.create_sub_controller(name, self),
            _ => None,
        };
        let scope = sub_controller
            .as_ref()
            .map(|controller| ControllerScope::enter(&self.controller, Some(Rc::clone(controller))));
        let view = self.build_view(node);
        drop(scope);
        let mut view = view?;
        if sub_controller.is_some() {
            view.properties_mut().controller = sub_controller;
        }
        Some(view)
    }

    /// Instantiate another template from inside a template, then overlay `attributes`.
    fn create_nested_template(
        &self,
        template_name: &str,
        attributes: &AttributeMap,
    ) -> Option<Box<dyn View>> {
        let depth = self.template_depth.get();
        if depth >= self.config.max_template_depth {
            log::debug!(target: "uidescription", "template nesting limit reached at {template_name}");
            return None;
        }
        self.template_depth.set(depth + 1);
        let view = self.create_view(template_name, self.controller());
        self.template_depth.set(depth);
        let mut view = view?;
        self.factory
            .apply_attribute_values(view.as_mut(), attributes, self);
        Some(view)
    }

    fn build_view(&self, node: &DescriptionNode) -> Option<Box<dyn View>> {
        let attributes = node.attributes();
        let mut view = self
            .controller()
            .and_then(|controller| controller.create_view(attributes, self));
        if let Some(custom) = view.as_mut()
            && let Some(class_name) = attributes.get(CLASS_ATTRIBUTE)
        {
            self.factory
                .apply_custom_view_attribute_values(custom.as_mut(), class_name, attributes, self);
        }
        if view.is_none() {
            view = self.factory.create_view(attributes, self);
        }
        if view.is_none() && !attributes.has(CLASS_ATTRIBUTE) {
            let mut container: Box<dyn View> = Box::new(ContainerView::default());
            self.factory.apply_custom_view_attribute_values(
                container.as_mut(),
                DEFAULT_CLASS,
                attributes,
                self,
            );
            view = Some(container);
        }
        let Some(mut view) = view else {
            log::debug!(target: "uidescription", "skipping view of class {:?}", attributes.get(CLASS_ATTRIBUTE));
            return None;
        };
        for child in node.children() {
            match child.name() {
                VIEW_NODE_NAME => {
                    if let Some(container) = view.as_container_mut()
                        && let Some(child_view) = self.create_view_from_node(child)
                    {
                        container.add_view(child_view);
                    }
                }
                ATTRIBUTE_NODE_NAME => {
                    let child_attributes = child.attributes();
                    if let (Some(id), Some(value)) =
                        (child_attributes.get("id"), child_attributes.get("value"))
                    {
                        view.properties_mut()
                            .set_attribute(parse_attribute_id(id), value.as_bytes().to_vec());
                    }
                }
                _ => {}
            }
        }
        match self.controller() {
            Some(controller) => Some(controller.verify_view(view, attributes, self)),
            None => Some(view),
        }
    }

    /// Name of the template `view` was instantiated from.
    #[inline]
    pub fn get_template_name_from_view<'view>(&self, view: &'view dyn View) -> Option<&'view str> {
        view.properties().template_name.as_deref()
    }

    /// Write the attributes of `view` into `node`; with `deep`, describe its sub-views as
    /// `view` children. Sub-views instantiated from a template become `view` nodes naming
    /// that template. Returns whether the factory could describe `view` itself.
    pub fn update_attributes_for_view(
        &self,
        node: &mut DescriptionNode,
        view: &dyn View,
        deep: bool,
    ) -> bool {
        let described = match self.factory.attributes_for_view(view, self) {
            Some(attributes) => {
                node.attributes_mut().merge(&attributes);
                true
            }
            None => false,
        };
        if !deep {
            return described;
        }
        let Some(container) = view.as_container() else {
            return described;
        };
        for sub_view in container.views() {
            let sub_view = sub_view.as_ref();
            if let Some(template_name) = self.get_template_name_from_view(sub_view) {
                let mut sub_node = DescriptionNode::with_attributes(
                    VIEW_NODE_NAME,
                    AttributeMap::from_pairs([(TEMPLATE_ATTRIBUTE, template_name)]),
                );
                self.update_attributes_for_view(&mut sub_node, sub_view, false);
                node.children_mut().add(sub_node);
                continue;
            }
            let mut sub_node = DescriptionNode::new(VIEW_NODE_NAME);
            if self.update_attributes_for_view(&mut sub_node, sub_view, true) {
                node.children_mut().add(sub_node);
            } else {
                let children = sub_node.children_mut();
                while let Some(grandchild) = children.remove(0) {
                    node.children_mut().add(grandchild);
                }
            }
        }
        described
    }

    /// Rewrite template `name` from the live view tree rooted at `view`.
    ///
    /// Sub-views that came from other templates update those templates too, with their
    /// origin reset. A listener may veto the update.
    pub fn update_view_description(&mut self, name: &str, view: &dyn View) -> bool {
        let listeners = self.listeners.borrow().clone();
        let vetoed = listeners
            .iter()
            .any(|listener| !listener.should_update_template(self, name));
        if vetoed {
            return false;
        }
        let mut attributes = self
            .get_view_attributes(name)
            .cloned()
            .unwrap_or_default();
        attributes.set(NAME_ATTRIBUTE, name);
        let mut node = DescriptionNode::with_attributes(TEMPLATE_NODE_NAME, attributes);
        self.update_attributes_for_view(&mut node, view, true);
        match self.template_node_mut(name) {
            Some(existing) => *existing = node,
            None => {
                let Some(root) = self.root.as_mut() else {
                    return false;
                };
                root.children_mut().add(node);
            }
        }
        let mut nested = Vec::new();
        collect_template_views(view, &mut nested);
        for (template_name, sub_view) in nested {
            if template_name == name {
                continue;
            }
            if self.update_view_description(template_name, sub_view)
                && let Some(template) = self.template_node_mut(template_name)
                && template.attributes().has("origin")
            {
                template
                    .attributes_mut()
                    .set_point("origin", Point::default());
            }
        }
        true
    }
}
