//! Hooks the embedding application plugs into a description.

use core::cell::RefCell;
use std::rc::Rc;

use crate::attributes::AttributeMap;
use crate::document::UiDescription;
use crate::resources::bitmap::BitmapSource;
use crate::view::View;

/// Application side of view creation. Every method has a pass-through default.
pub trait Controller {
    /// Offer to build the view for a template node before the factory does.
    fn create_view(
        &self,
        _attributes: &AttributeMap,
        _description: &UiDescription,
    ) -> Option<Box<dyn View>> {
        None
    }

    /// Inspect or replace a fully configured view.
    fn verify_view(
        &self,
        view: Box<dyn View>,
        _attributes: &AttributeMap,
        _description: &UiDescription,
    ) -> Box<dyn View> {
        view
    }

    /// Override the tag registered for `name`; `registered_tag` is `-1` when unknown.
    fn tag_for_name(&self, _name: &str, registered_tag: i32) -> i32 {
        registered_tag
    }

    fn control_listener(&self, _name: &str) -> Option<Rc<dyn ControlListener>> {
        None
    }

    /// Controller for a subtree whose node carries `sub-controller="name"`.
    fn create_sub_controller(
        &self,
        _name: &str,
        _description: &UiDescription,
    ) -> Option<Rc<dyn Controller>> {
        None
    }
}

/// Receives value changes of tagged controls.
pub trait ControlListener {
    fn value_changed(&self, tag: i32, value: f64);
}

/// Supplies bitmap pixels for entries without inline data.
pub trait BitmapCreator {
    fn create_bitmap(&self, attributes: &AttributeMap) -> Option<BitmapSource>;
}

/// Observer of document changes.
pub trait DescriptionListener {
    fn template_changed(&self, _description: &UiDescription) {}
    fn color_changed(&self, _description: &UiDescription) {}
    fn font_changed(&self, _description: &UiDescription) {}
    fn bitmap_changed(&self, _description: &UiDescription) {}
    fn gradient_changed(&self, _description: &UiDescription) {}
    fn tag_changed(&self, _description: &UiDescription) {}
    fn before_save(&self, _description: &UiDescription) {}

    /// Whether `update_view_description` may rewrite the template `name`.
    fn should_update_template(&self, _description: &UiDescription, _name: &str) -> bool {
        true
    }
}

/// Installs a controller (or none) as the current one and restores the previous one on drop.
pub(crate) struct ControllerScope<'slot> {
    slot: &'slot RefCell<Option<Rc<dyn Controller>>>,
    previous: Option<Rc<dyn Controller>>,
}

impl<'slot> ControllerScope<'slot> {
    pub(crate) fn enter(
        slot: &'slot RefCell<Option<Rc<dyn Controller>>>,
        controller: Option<Rc<dyn Controller>>,
    ) -> Self {
        let previous = slot.replace(controller);
        Self { slot, previous }
    }
}

impl Drop for ControllerScope<'_> {
    fn drop(&mut self) {
        self.slot.replace(self.previous.take());
    }
}
