//! Resource lookups and catalog edits of [`UiDescription`].

use core::ptr;
use std::rc::Rc;

use super::UiDescription;
use crate::attributes::AttributeMap;
use crate::color::Color;
use crate::controller::{ControlListener, DescriptionListener};
use crate::geometry::Rect;
use crate::node::{DescriptionNode, NAME_ATTRIBUTE, NodeKind};
use crate::resources::Catalog;
use crate::resources::bitmap::{Bitmap, decode_scale_factor_from_name, remove_scale_factor_from_name};
use crate::resources::font::FontDescription;
use crate::resources::gradient::Gradient;
use crate::resources::variable::VariableValue;

const FOCUS_DRAWING: &str = "FocusDrawing";

/// How focused views are outlined, stored as the custom attributes `FocusDrawing`.
#[derive(Clone, Debug, PartialEq)]
pub struct FocusDrawing {
    pub enabled: bool,
    pub width: f64,
    /// Name of a catalog color
    pub color_name: String,
}

impl Default for FocusDrawing {
    fn default() -> Self {
        Self {
            enabled: false,
            width: 1.0,
            color_name: String::new(),
        }
    }
}

fn named_entry(catalog: Catalog, name: &str) -> DescriptionNode {
    catalog.new_entry(AttributeMap::from_pairs([(NAME_ATTRIBUTE, name)]))
}

/// Which listener callback a catalog change triggers.
fn notify_change(catalog: Catalog) -> fn(&dyn DescriptionListener, &UiDescription) {
    match catalog {
        Catalog::Bitmaps => |listener, description| listener.bitmap_changed(description),
        Catalog::Fonts => |listener, description| listener.font_changed(description),
        Catalog::Colors => |listener, description| listener.color_changed(description),
        Catalog::Gradients => |listener, description| listener.gradient_changed(description),
        Catalog::ControlTags => |listener, description| listener.tag_changed(description),
        Catalog::Variables | Catalog::Custom => |_, _| {},
    }
}

impl UiDescription {
    /// Bitmap entry `name`, with its scale variants attached on first lookup.
    pub fn get_bitmap(&self, name: &str) -> Option<Rc<Bitmap>> {
        let node = self.entry(Catalog::Bitmaps, name)?;
        let bitmap = self.resolve_bitmap(node)?;
        if !node.scaled_bitmaps_added() {
            if decode_scale_factor_from_name(name).is_none() {
                self.attach_scale_variants(name, node, &bitmap);
            }
            node.mark_scaled_bitmaps_added();
        }
        Some(bitmap)
    }

    fn resolve_bitmap(&self, node: &DescriptionNode) -> Option<Rc<Bitmap>> {
        node.bitmap(self.bitmap_creator.as_deref(), self.base_dir())
    }

    /// Add the representations of every sibling named `name` plus a scale suffix.
    fn attach_scale_variants(&self, name: &str, base: &DescriptionNode, bitmap: &Bitmap) {
        self.scale_scan_count.set(self.scale_scan_count.get() + 1);
        let Some(catalog) = self.catalog(Catalog::Bitmaps) else {
            return;
        };
        for sibling in catalog.children() {
            if ptr::eq(sibling, base) || !matches!(sibling.kind(), NodeKind::Bitmap(_)) {
                continue;
            }
            let Some(sibling_name) = sibling.name_attribute() else {
                continue;
            };
            if remove_scale_factor_from_name(sibling_name) != Some(name) {
                continue;
            }
            sibling.mark_scaled_bitmaps_added();
            if let Some(variant) = self.resolve_bitmap(sibling) {
                for representation in variant.representations() {
                    bitmap.add_representation(representation);
                }
            }
            log::trace!(target: "uidescription", "attached {sibling_name} to bitmap {name}");
        }
    }

    pub fn get_font(&self, name: &str) -> Option<Rc<FontDescription>> {
        self.entry(Catalog::Fonts, name)?.font()
    }

    /// Color entry `name`, or `name` itself read as a `#rrggbb[aa]` literal.
    pub fn get_color(&self, name: &str) -> Option<Color> {
        match self.entry(Catalog::Colors, name) {
            Some(node) => node.color(),
            None => Color::parse_hex(name),
        }
    }

    pub fn get_gradient(&self, name: &str) -> Option<Rc<Gradient>> {
        self.entry(Catalog::Gradients, name)?.gradient()
    }

    /// Tag registered for `name`, adjusted by the current controller; `-1` when unknown.
    pub fn get_tag_for_name(&self, name: &str) -> i32 {
        let registered = self
            .entry(Catalog::ControlTags, name)
            .and_then(|node| self.resolve_tag(node))
            .unwrap_or(-1);
        match self.controller() {
            Some(controller) => controller.tag_for_name(name, registered),
            None => registered,
        }
    }

    /// Literal or cached tag of a control-tag entry, evaluating its text when needed.
    fn resolve_tag(&self, node: &DescriptionNode) -> Option<i32> {
        if let Some(tag) = node.tag() {
            return Some(tag);
        }
        let value = self.calculate_string_value(node.tag_string()?).ok()?;
        let tag = value as i32;
        node.cache_tag(tag);
        Some(tag)
    }

    pub fn get_control_listener(&self, name: &str) -> Option<Rc<dyn ControlListener>> {
        self.controller()?.control_listener(name)
    }

    /// Numeric value of variable `name`; string variables are evaluated as expressions.
    pub fn get_variable_number(&self, name: &str) -> Option<f64> {
        let node = self.entry(Catalog::Variables, name)?;
        match node.variable_value()? {
            VariableValue::Number(value) => Some(value),
            VariableValue::String => self.calculate_string_value(node.variable_string()).ok(),
            VariableValue::Unknown => None,
        }
    }

    /// Raw value text of variable `name`.
    pub fn get_variable_string(&self, name: &str) -> Option<String> {
        self.entry(Catalog::Variables, name)
            .map(|node| node.variable_string().to_owned())
    }

    #[inline]
    pub fn has_color_name(&self, name: &str) -> bool {
        self.entry(Catalog::Colors, name).is_some()
    }

    #[inline]
    pub fn has_font_name(&self, name: &str) -> bool {
        self.entry(Catalog::Fonts, name).is_some()
    }

    #[inline]
    pub fn has_bitmap_name(&self, name: &str) -> bool {
        self.entry(Catalog::Bitmaps, name).is_some()
    }

    #[inline]
    pub fn has_gradient_name(&self, name: &str) -> bool {
        self.entry(Catalog::Gradients, name).is_some()
    }

    #[inline]
    pub fn has_tag_name(&self, name: &str) -> bool {
        self.entry(Catalog::ControlTags, name).is_some()
    }

    /// Name of the first entry of `catalog` accepted by `matches`.
    fn lookup_name(
        &self,
        catalog: Catalog,
        mut matches: impl FnMut(&DescriptionNode) -> bool,
    ) -> Option<String> {
        self.catalog(catalog)?
            .children()
            .iter()
            .find(|&node| node.name_attribute().is_some() && matches(node))
            .and_then(DescriptionNode::name_attribute)
            .map(str::to_owned)
    }

    pub fn lookup_color_name(&self, color: Color) -> Option<String> {
        self.lookup_name(Catalog::Colors, |node| node.color() == Some(color))
    }

    pub fn lookup_font_name(&self, font: &FontDescription) -> Option<String> {
        self.lookup_name(Catalog::Fonts, |node| {
            node.font().is_some_and(|candidate| *candidate == *font)
        })
    }

    /// Name of the entry resolving to `bitmap`, or to a bitmap with the same path.
    pub fn lookup_bitmap_name(&self, bitmap: &Rc<Bitmap>) -> Option<String> {
        self.lookup_name(Catalog::Bitmaps, |node| {
            self.resolve_bitmap(node).is_some_and(|candidate| {
                Rc::ptr_eq(&candidate, bitmap) || candidate.path() == bitmap.path()
            })
        })
    }

    pub fn lookup_gradient_name(&self, gradient: &Gradient) -> Option<String> {
        self.lookup_name(Catalog::Gradients, |node| {
            node.gradient()
                .is_some_and(|candidate| candidate.stops() == gradient.stops())
        })
    }

    pub fn lookup_control_tag_name(&self, tag: i32) -> Option<String> {
        self.lookup_name(Catalog::ControlTags, |node| {
            self.resolve_tag(node) == Some(tag)
        })
    }

    pub fn collect_color_names(&self) -> Vec<String> {
        self.entry_names(Catalog::Colors)
    }

    pub fn collect_font_names(&self) -> Vec<String> {
        self.entry_names(Catalog::Fonts)
    }

    pub fn collect_bitmap_names(&self) -> Vec<String> {
        self.entry_names(Catalog::Bitmaps)
    }

    pub fn collect_gradient_names(&self) -> Vec<String> {
        self.entry_names(Catalog::Gradients)
    }

    pub fn collect_control_tag_names(&self) -> Vec<String> {
        self.entry_names(Catalog::ControlTags)
    }

    /// Apply `edit` to entry `name` of `catalog`, creating the entry when it is missing.
    ///
    /// No-export entries are left alone. Returns whether anything was edited.
    fn edit_or_create_entry(
        &mut self,
        catalog: Catalog,
        name: &str,
        edit: impl FnOnce(&mut DescriptionNode),
    ) -> bool {
        let Some(catalog_node) = self.catalog_mut(catalog) else {
            return false;
        };
        let children = catalog_node.children_mut();
        match children.position_by_attribute(NAME_ATTRIBUTE, name) {
            Some(position) => {
                let Some(mut entry) = children.get_mut(position) else {
                    return false;
                };
                if entry.no_export() {
                    return false;
                }
                edit(&mut *entry);
            }
            None => {
                let mut entry = named_entry(catalog, name);
                edit(&mut entry);
                children.add(entry);
                children.sort();
            }
        }
        true
    }

    /// Apply `edit` to the existing entry `name` of `catalog`.
    fn edit_entry<T>(
        &mut self,
        catalog: Catalog,
        name: &str,
        edit: impl FnOnce(&mut DescriptionNode) -> T,
    ) -> Option<T> {
        let children = self.existing_catalog_mut(catalog)?.children_mut();
        let position = children.position_by_attribute(NAME_ATTRIBUTE, name)?;
        let mut entry = children.get_mut(position)?;
        Some(edit(&mut *entry))
    }

    pub fn change_color(&mut self, name: &str, color: Color) {
        if self.edit_or_create_entry(Catalog::Colors, name, |node| node.set_color(color)) {
            self.notify(notify_change(Catalog::Colors));
        }
    }

    pub fn change_font(&mut self, name: &str, font: Rc<FontDescription>) {
        if self.edit_or_create_entry(Catalog::Fonts, name, |node| node.set_font(font)) {
            self.notify(notify_change(Catalog::Fonts));
        }
    }

    pub fn change_gradient(&mut self, name: &str, gradient: Rc<Gradient>) {
        if self.edit_or_create_entry(Catalog::Gradients, name, |node| {
            node.set_gradient(gradient);
        }) {
            self.notify(notify_change(Catalog::Gradients));
        }
    }

    /// Point bitmap `name` at `path`, replacing its nine-part offsets.
    pub fn change_bitmap(&mut self, name: &str, path: &str, nine_part_offsets: Option<Rect>) {
        if self.edit_or_create_entry(Catalog::Bitmaps, name, |node| {
            node.set_bitmap(path);
            node.set_nine_part_tiled_offsets(nine_part_offsets);
        }) {
            self.notify(notify_change(Catalog::Bitmaps));
        }
    }

    /// Rename an entry and keep the catalog sorted.
    fn change_entry_name(&mut self, catalog: Catalog, old_name: &str, new_name: &str) {
        let renamed = self.edit_entry(catalog, old_name, |node| {
            node.attributes_mut().set(NAME_ATTRIBUTE, new_name);
        });
        if renamed.is_none() {
            return;
        }
        if let Some(catalog_node) = self.existing_catalog_mut(catalog) {
            catalog_node.children_mut().sort();
        }
        self.notify(notify_change(catalog));
    }

    #[inline]
    pub fn change_color_name(&mut self, old_name: &str, new_name: &str) {
        self.change_entry_name(Catalog::Colors, old_name, new_name);
    }

    #[inline]
    pub fn change_font_name(&mut self, old_name: &str, new_name: &str) {
        self.change_entry_name(Catalog::Fonts, old_name, new_name);
    }

    #[inline]
    pub fn change_bitmap_name(&mut self, old_name: &str, new_name: &str) {
        self.change_entry_name(Catalog::Bitmaps, old_name, new_name);
    }

    #[inline]
    pub fn change_gradient_name(&mut self, old_name: &str, new_name: &str) {
        self.change_entry_name(Catalog::Gradients, old_name, new_name);
    }

    #[inline]
    pub fn change_tag_name(&mut self, old_name: &str, new_name: &str) {
        self.change_entry_name(Catalog::ControlTags, old_name, new_name);
    }

    pub fn get_control_tag_string(&self, name: &str) -> Option<String> {
        self.entry(Catalog::ControlTags, name)?
            .tag_string()
            .map(str::to_owned)
    }

    /// Replace the source text of control tag `name`.
    ///
    /// With `create` the tag must not exist yet and is added; without it the tag must
    /// exist. Returns whether the document changed.
    pub fn change_control_tag_string(&mut self, name: &str, tag_string: &str, create: bool) -> bool {
        let exists = self.entry(Catalog::ControlTags, name).is_some();
        let changed = match (exists, create) {
            (true, false) => self
                .edit_entry(Catalog::ControlTags, name, |node| node.set_tag_string(tag_string))
                .is_some(),
            (false, true) => {
                self.edit_or_create_entry(Catalog::ControlTags, name, |node| {
                    node.set_tag_string(tag_string);
                })
            }
            _ => false,
        };
        if changed {
            self.notify(notify_change(Catalog::ControlTags));
        }
        changed
    }

    pub fn get_alternative_font_names(&self, name: &str) -> Option<String> {
        self.entry(Catalog::Fonts, name)?
            .alternative_font_names()
            .map(str::to_owned)
    }

    pub fn change_alternative_font_names(&mut self, name: &str, names: &str) {
        if self
            .edit_entry(Catalog::Fonts, name, |node| node.set_alternative_font_names(names))
            .is_some()
        {
            self.notify(notify_change(Catalog::Fonts));
        }
    }

    /// Replace the filter descriptions stored with bitmap `name`.
    pub fn change_bitmap_filters(&mut self, name: &str, filters: &[AttributeMap]) {
        if self
            .edit_entry(Catalog::Bitmaps, name, |node| node.set_bitmap_filters(filters))
            .is_some()
        {
            self.notify(notify_change(Catalog::Bitmaps));
        }
    }

    pub fn collect_bitmap_filters(&self, name: &str) -> Vec<AttributeMap> {
        self.entry(Catalog::Bitmaps, name)
            .map(DescriptionNode::bitmap_filters)
            .unwrap_or_default()
    }

    /// Remove entry `name` unless it is a no-export entry.
    /// Remove entry `name` of `catalog`, notifying listeners only when an entry went away.
    fn remove_entry(&mut self, catalog: Catalog, name: &str) {
        let Some(catalog_node) = self.existing_catalog_mut(catalog) else {
            return;
        };
        let children = catalog_node.children_mut();
        let removed = children
            .position_by_attribute(NAME_ATTRIBUTE, name)
            .filter(|&position| children.get(position).is_some_and(|node| !node.no_export()))
            .and_then(|position| children.remove(position));
        if removed.is_some() {
            self.notify(notify_change(catalog));
        }
    }

    #[inline]
    pub fn remove_color(&mut self, name: &str) {
        self.remove_entry(Catalog::Colors, name);
    }

    #[inline]
    pub fn remove_font(&mut self, name: &str) {
        self.remove_entry(Catalog::Fonts, name);
    }

    #[inline]
    pub fn remove_bitmap(&mut self, name: &str) {
        self.remove_entry(Catalog::Bitmaps, name);
    }

    #[inline]
    pub fn remove_gradient(&mut self, name: &str) {
        self.remove_entry(Catalog::Gradients, name);
    }

    #[inline]
    pub fn remove_tag(&mut self, name: &str) {
        self.remove_entry(Catalog::ControlTags, name);
    }

    /// Store `attributes` as the custom entry `name`. Fails when the entry exists.
    pub fn set_custom_attributes(&mut self, name: &str, mut attributes: AttributeMap) -> bool {
        if self.custom_attributes(name).is_some() {
            return false;
        }
        let Some(custom) = self.catalog_mut(Catalog::Custom) else {
            return false;
        };
        attributes.set(NAME_ATTRIBUTE, name);
        custom.children_mut().add(Catalog::Custom.new_entry(attributes));
        true
    }

    pub fn custom_attributes(&self, name: &str) -> Option<&AttributeMap> {
        self.entry(Catalog::Custom, name)
            .map(DescriptionNode::attributes)
    }

    /// Mutable custom entry `name`, created empty when missing and `create` is set.
    pub fn custom_attributes_mut(&mut self, name: &str, create: bool) -> Option<&mut AttributeMap> {
        if create && self.custom_attributes(name).is_none() {
            self.set_custom_attributes(name, AttributeMap::new());
        }
        let children = self.existing_catalog_mut(Catalog::Custom)?.children_mut();
        let position = children.position_by_attribute(NAME_ATTRIBUTE, name)?;
        children
            .get_mut_unindexed(position)
            .map(DescriptionNode::attributes_mut)
    }

    pub fn get_focus_drawing_settings(&self) -> FocusDrawing {
        let mut settings = FocusDrawing::default();
        if let Some(attributes) = self.custom_attributes(FOCUS_DRAWING) {
            if let Some(enabled) = attributes.get_bool("enabled") {
                settings.enabled = enabled;
            }
            if let Some(width) = attributes.get_double("width") {
                settings.width = width;
            }
            if let Some(color) = attributes.get("color") {
                color.clone_into(&mut settings.color_name);
            }
        }
        settings
    }

    pub fn set_focus_drawing_settings(&mut self, settings: &FocusDrawing) {
        let Some(attributes) = self.custom_attributes_mut(FOCUS_DRAWING, true) else {
            return;
        };
        attributes.set_bool("enabled", settings.enabled);
        attributes.set_double("width", settings.width);
        attributes.set("color", settings.color_name.as_str());
    }
}
