//! Creators for the built-in `CView`, `CViewContainer` and `CControl` classes.

use crate::attributes::{AttributeMap, format_double, format_point};
use crate::document::UiDescription;
use crate::factory::{AttributeType, ViewCreator, ViewFactory};
use crate::geometry::Rect;
use crate::view::{Autosize, BasicView, ContainerView, ControlView, View, ViewFlags};

const FLAG_ATTRIBUTES: [(ViewFlags, &str); 3] = [
    (ViewFlags::TRANSPARENT, "transparent"),
    (ViewFlags::MOUSE_ENABLED, "mouse-enabled"),
    (ViewFlags::WANTS_FOCUS, "wants-focus"),
];

/// Register every built-in creator.
pub fn register_all(factory: &mut ViewFactory) {
    factory.register(view_creator());
    factory.register(container_creator());
    factory.register(control_creator());
}

fn view_creator() -> ViewCreator {
    ViewCreator::new("CView", None, |_, _| Some(Box::new(BasicView::default())))
        .with_apply(apply_view)
        .with_read(read_view)
        .with_attribute("origin", AttributeType::Point)
        .with_attribute("size", AttributeType::Point)
        .with_attribute("opacity", AttributeType::Float)
        .with_attribute("transparent", AttributeType::Boolean)
        .with_attribute("mouse-enabled", AttributeType::Boolean)
        .with_attribute("wants-focus", AttributeType::Boolean)
        .with_attribute("bitmap", AttributeType::Bitmap)
        .with_attribute("disabled-bitmap", AttributeType::Bitmap)
        .with_attribute("autosize", AttributeType::List)
        .with_attribute("tooltip", AttributeType::String)
        .with_attribute("custom-view-name", AttributeType::String)
        .with_attribute("sub-controller", AttributeType::String)
}

fn apply_view(view: &mut dyn View, attributes: &AttributeMap, description: &UiDescription) -> bool {
    let properties = view.properties_mut();
    let origin = attributes
        .get_point("origin")
        .unwrap_or_else(|| properties.rect.origin());
    let size = attributes
        .get_point("size")
        .unwrap_or_else(|| properties.rect.size());
    properties.rect = Rect::from_origin_size(origin, size);
    if let Some(opacity) = attributes.get_double("opacity") {
        properties.opacity = opacity;
    }
    for (flag, name) in FLAG_ATTRIBUTES {
        if let Some(value) = attributes.get_bool(name) {
            properties.flags.set(flag, value);
        }
    }
    if let Some(name) = attributes.get("bitmap") {
        properties.background = description.get_bitmap(name);
    }
    if let Some(name) = attributes.get("disabled-bitmap") {
        properties.disabled_background = description.get_bitmap(name);
    }
    if let Some(words) = attributes.get("autosize") {
        properties.autosize = Autosize::parse(words);
    }
    if let Some(tooltip) = attributes.get("tooltip") {
        properties.tooltip = Some(tooltip.to_owned());
    }
    if let Some(name) = attributes.get("custom-view-name") {
        properties.custom_view_name = Some(name.to_owned());
    }
    if let Some(name) = attributes.get("sub-controller") {
        properties.sub_controller_name = Some(name.to_owned());
    }
    true
}

fn read_view(view: &dyn View, name: &str, description: &UiDescription) -> Option<String> {
    let properties = view.properties();
    match name {
        "origin" => Some(format_point(properties.rect.origin())),
        "size" => Some(format_point(properties.rect.size())),
        "opacity" => Some(format_double(properties.opacity)),
        "bitmap" => description.lookup_bitmap_name(properties.background.as_ref()?),
        "disabled-bitmap" => {
            description.lookup_bitmap_name(properties.disabled_background.as_ref()?)
        }
        "autosize" => Some(properties.autosize.to_attribute_string()),
        "tooltip" => properties.tooltip.clone(),
        "custom-view-name" => properties.custom_view_name.clone(),
        "sub-controller" => properties.sub_controller_name.clone(),
        _ => FLAG_ATTRIBUTES
            .iter()
            .find(|(_, flag_name)| *flag_name == name)
            .map(|(flag, _)| properties.flags.contains(*flag).to_string()),
    }
}

fn container_creator() -> ViewCreator {
    ViewCreator::new("CViewContainer", Some("CView"), |_, _| {
        Some(Box::new(ContainerView::default()))
    })
    .with_apply(|view, attributes, description| {
        if let Some(container) = view.as_any_mut().downcast_mut::<ContainerView>()
            && let Some(name) = attributes.get("background-color")
        {
            container.background_color = description.get_color(name);
        }
        true
    })
    .with_read(|view, name, description| {
        if name != "background-color" {
            return None;
        }
        let color = view
            .as_any()
            .downcast_ref::<ContainerView>()?
            .background_color?;
        Some(
            description
                .lookup_color_name(color)
                .unwrap_or_else(|| color.to_hex_string()),
        )
    })
    .with_attribute("background-color", AttributeType::Color)
}

fn control_creator() -> ViewCreator {
    ViewCreator::new("CControl", Some("CView"), |_, _| {
        Some(Box::new(ControlView::default()))
    })
    .with_apply(apply_control)
    .with_read(read_control)
    .with_attribute("control-tag", AttributeType::Tag)
    .with_attribute("default-value", AttributeType::Float)
    .with_attribute("min-value", AttributeType::Float)
    .with_attribute("max-value", AttributeType::Float)
    .with_attribute("wheel-inc-value", AttributeType::Float)
    .with_attribute("background-offset", AttributeType::Point)
}

fn apply_control(
    view: &mut dyn View,
    attributes: &AttributeMap,
    description: &UiDescription,
) -> bool {
    let Some(control) = view.as_any_mut().downcast_mut::<ControlView>() else {
        return true;
    };
    if let Some(name) = attributes.get("control-tag") {
        if name.is_empty() {
            control.tag = -1;
        } else {
            let tag = description.get_tag_for_name(name);
            control.tag = if tag == -1 {
                name.trim().parse().unwrap_or(-1)
            } else {
                tag
            };
            control.listener = description.get_control_listener(name);
        }
    }
    if let Some(value) = attributes.get_double("default-value") {
        control.default_value = value;
    }
    if let Some(value) = attributes.get_double("min-value") {
        control.min = value;
    }
    if let Some(value) = attributes.get_double("max-value") {
        control.max = value;
    }
    if let Some(value) = attributes.get_double("wheel-inc-value") {
        control.wheel_increment = value;
    }
    if let Some(offset) = attributes.get_point("background-offset") {
        control.background_offset = offset;
    }
    true
}

fn read_control(view: &dyn View, name: &str, description: &UiDescription) -> Option<String> {
    let control = view.as_any().downcast_ref::<ControlView>()?;
    match name {
        "control-tag" => (control.tag != -1).then(|| {
            description
                .lookup_control_tag_name(control.tag)
                .unwrap_or_else(|| control.tag.to_string())
        }),
        "default-value" => Some(format_double(control.default_value)),
        "min-value" => Some(format_double(control.min)),
        "max-value" => Some(format_double(control.max)),
        "wheel-inc-value" => Some(format_double(control.wheel_increment)),
        "background-offset" => Some(format_point(control.background_offset)),
        _ => None,
    }
}
