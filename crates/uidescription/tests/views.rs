//! Templates, view instantiation, reading views back and the view-list clipboard.

#[cfg(test)]
mod tests {
    use core::cell::Cell;
    use std::rc::Rc;

    use anyhow::{Context as _, Result, ensure};
    use uidescription::view::downcast_ref;
    use uidescription::{
        AttributeMap, AttributeType, BasicView, ControlView, Controller, DescriptionConfig,
        DescriptionListener, DescriptionNode, Point, StoreError, UiDescription, View,
        ViewContainer, ViewCreator, ViewFactory,
    };

    const VIEWS: &str = "<vstgui-ui-description>\
        <control-tags><control-tag name=\"gain\" tag=\"7\"/></control-tags>\
        <template class=\"CViewContainer\" name=\"panel\" size=\"100, 100\">\
            <view class=\"CControl\" custom-view-name=\"Knob\" control-tag=\"gain\" origin=\"1, 2\" size=\"3, 4\"/>\
            <view class=\"Unknown\"/>\
            <view class=\"CView\">\
                <attribute id=\"abcd\" value=\"xy\"/>\
                <attribute id=\"42\" value=\"z\"/>\
                <attribute id=\"0\" value=\"ignored\"/>\
            </view>\
        </template>\
        <template class=\"CViewContainer\" name=\"simple\" size=\"100, 100\">\
            <view class=\"CControl\" control-tag=\"gain\" origin=\"1, 2\" size=\"3, 4\"/>\
        </template>\
        <template class=\"CControl\" name=\"inner\" size=\"10, 10\"/>\
        <template class=\"CViewContainer\" name=\"outer\" size=\"50, 50\">\
            <view origin=\"5, 5\" template=\"inner\"/>\
        </template>\
        <template class=\"CViewContainer\" name=\"nested\">\
            <view class=\"CView\" sub-controller=\"detail\"/>\
        </template>\
        <template class=\"CViewContainer\" name=\"siblings\">\
            <view class=\"CViewContainer\" sub-controller=\"detail\">\
                <view class=\"CControl\" custom-view-name=\"Knob\" control-tag=\"gain\"/>\
            </view>\
            <view class=\"CControl\" custom-view-name=\"Knob\" control-tag=\"gain\"/>\
        </template>\
        <template class=\"CViewContainer\" name=\"cycle\"><view template=\"cycle\"/></template>\
        </vstgui-ui-description>";

    fn init_logging() {
        if let Err(error) = env_logger::builder().is_test(true).try_init() {
            log::trace!(target: "uidescription", "logger already installed: {error}");
        }
    }

    /// # Errors
    /// Returns an error if the document does not parse.
    fn views_document() -> Result<UiDescription> {
        let mut description = UiDescription::new();
        description.parse_str(VIEWS)?;
        Ok(description)
    }

    fn children(view: &dyn View) -> &[Box<dyn View>] {
        view.as_container()
            .map(ViewContainer::views)
            .unwrap_or_default()
    }

    fn template<'doc>(
        description: &'doc UiDescription,
        name: &str,
    ) -> Option<&'doc DescriptionNode> {
        description
            .root()?
            .children()
            .find_by_attribute("name", name)
    }

    /// Builds knobs, overrides tags and counts verified views.
    #[derive(Default)]
    struct Host {
        verified: Cell<usize>,
        detail: Rc<Detail>,
    }

    impl Controller for Host {
        fn create_view(
            &self,
            attributes: &AttributeMap,
            _description: &UiDescription,
        ) -> Option<Box<dyn View>> {
            if attributes.get("custom-view-name") != Some("Knob") {
                return None;
            }
            let mut knob = ControlView::default();
            knob.properties.tooltip = Some("host knob".to_owned());
            Some(Box::new(knob))
        }

        fn verify_view(
            &self,
            view: Box<dyn View>,
            _attributes: &AttributeMap,
            _description: &UiDescription,
        ) -> Box<dyn View> {
            self.verified.set(self.verified.get() + 1);
            view
        }

        fn tag_for_name(&self, name: &str, registered_tag: i32) -> i32 {
            if name == "gain" {
                registered_tag * 10
            } else {
                registered_tag
            }
        }

        fn create_sub_controller(
            &self,
            name: &str,
            _description: &UiDescription,
        ) -> Option<Rc<dyn Controller>> {
            (name == "detail").then(|| Rc::clone(&self.detail) as Rc<dyn Controller>)
        }
    }

    #[derive(Default)]
    struct Detail {
        verified: Cell<usize>,
    }

    impl Controller for Detail {
        fn verify_view(
            &self,
            view: Box<dyn View>,
            _attributes: &AttributeMap,
            _description: &UiDescription,
        ) -> Box<dyn View> {
            self.verified.set(self.verified.get() + 1);
            view
        }
    }

    /// # Errors
    /// Returns an error if the document does not parse.
    #[test]
    fn templates_are_added_created_and_removed() -> Result<()> {
        init_logging();
        let mut description = views_document()?;
        let attributes = AttributeMap::from_pairs([("class", "CControl"), ("size", "30, 40")]);
        assert!(description.add_new_template("T", attributes.clone()));
        assert!(!description.add_new_template("T", attributes));

        let view = description.create_view("T", None).context("view of T")?;
        assert_eq!(view.properties().class_name.as_deref(), Some("CControl"));
        assert_eq!(description.get_template_name_from_view(view.as_ref()), Some("T"));
        assert_eq!(view.properties().rect.size(), Point::new(30.0, 40.0));
        assert!(downcast_ref::<ControlView>(view.as_ref()).is_some());

        assert!(description.remove_template("T"));
        assert!(!description.remove_template("T"));
        assert!(description.create_view("T", None).is_none());
        Ok(())
    }

    /// # Errors
    /// Returns an error if the document does not parse.
    #[test]
    fn templates_are_renamed_and_duplicated() -> Result<()> {
        init_logging();
        let mut description = views_document()?;
        assert!(description.change_template_name("simple", "plain"));
        assert!(!description.change_template_name("simple", "other"));
        assert!(description.duplicate_template("plain", "copy"));
        assert!(!description.duplicate_template("missing", "copy2"));
        assert_eq!(
            description.collect_template_view_names(),
            ["panel", "plain", "inner", "outer", "nested", "siblings", "cycle", "copy"]
        );
        let copy = template(&description, "copy").context("copy")?;
        assert_eq!(copy.children().len(), 1);
        assert_eq!(
            description
                .get_view_attributes("copy")
                .and_then(|attributes| attributes.get("size")),
            Some("100, 100")
        );
        let view = description.create_view("copy", None).context("view of copy")?;
        assert_eq!(children(view.as_ref()).len(), 1);
        Ok(())
    }

    /// A class known only through its base still receives the base's attributes.
    ///
    /// # Errors
    /// Returns an error if the document does not parse or the view is missing.
    #[test]
    fn derived_creators_apply_base_attributes() -> Result<()> {
        init_logging();
        let mut factory = ViewFactory::new();
        factory.register(
            ViewCreator::new("Base", None, |_, _| Some(Box::new(BasicView::default())))
                .with_apply(|view, attributes, _| {
                    if let Some(label) = attributes.get("label") {
                        view.properties_mut().tooltip = Some(label.to_owned());
                    }
                    true
                })
                .with_attribute("label", AttributeType::String),
        );
        factory.register(ViewCreator::new("Derived", Some("Base"), |_, _| {
            Some(Box::new(BasicView::default()))
        }));
        let mut description =
            UiDescription::with_factory(Rc::new(factory), DescriptionConfig::default());
        description.parse_str("<vstgui-ui-description/>")?;
        description.add_new_template(
            "T",
            AttributeMap::from_pairs([("class", "Derived"), ("label", "hello")]),
        );
        let view = description.create_view("T", None).context("view of T")?;
        assert_eq!(view.properties().class_name.as_deref(), Some("Derived"));
        assert_eq!(view.properties().tooltip.as_deref(), Some("hello"));
        assert_eq!(
            description.view_factory().attribute_type(view.as_ref(), "label"),
            AttributeType::String
        );
        Ok(())
    }

    /// The controller builds knobs, adjusts tags and sees every view; unknown classes are
    /// skipped and packed attribute ids are stored.
    ///
    /// # Errors
    /// Returns an error if the document does not parse or a view is missing.
    #[test]
    fn controller_takes_part_in_view_creation() -> Result<()> {
        init_logging();
        let description = views_document()?;
        let host = Rc::new(Host::default());
        let panel = description
            .create_view("panel", Some(Rc::clone(&host) as Rc<dyn Controller>))
            .context("panel")?;
        assert!(description.controller().is_none());

        let views = children(panel.as_ref());
        assert_eq!(views.len(), 2);
        let knob = views
            .first()
            .and_then(|view| downcast_ref::<ControlView>(view.as_ref()))
            .context("knob")?;
        assert_eq!(knob.properties.tooltip.as_deref(), Some("host knob"));
        assert_eq!(knob.properties.class_name.as_deref(), Some("CControl"));
        assert_eq!(knob.properties.rect.origin(), Point::new(1.0, 2.0));
        assert_eq!(knob.tag, 70);
        assert_eq!(host.verified.get(), 3);

        let plain = views.get(1).context("plain view")?;
        let packed = u32::from_be_bytes(*b"abcd");
        assert_eq!(plain.properties().attribute(packed), Some(b"xy".as_slice()));
        assert_eq!(plain.properties().attribute(42), Some(b"z".as_slice()));
        assert_eq!(plain.properties().attributes.len(), 2);

        let without_host = description.create_view("panel", None).context("panel")?;
        let knob = children(without_host.as_ref())
            .first()
            .and_then(|view| downcast_ref::<ControlView>(view.as_ref()))
            .context("knob")?;
        assert_eq!(knob.tag, 7);
        assert!(knob.properties.tooltip.is_none());
        Ok(())
    }

    /// # Errors
    /// Returns an error if the document does not parse or a view is missing.
    #[test]
    fn sub_controllers_scope_their_subtree() -> Result<()> {
        init_logging();
        let description = views_document()?;
        let host = Rc::new(Host::default());
        let view = description
            .create_view("nested", Some(Rc::clone(&host) as Rc<dyn Controller>))
            .context("nested")?;
        let detail_view = children(view.as_ref()).first().context("detail view")?;
        assert!(detail_view.properties().controller.is_some());
        assert_eq!(
            detail_view.properties().sub_controller_name.as_deref(),
            Some("detail")
        );
        assert_eq!(host.verified.get(), 1);
        assert_eq!(host.detail.verified.get(), 1);
        assert!(description.controller().is_none());
        Ok(())
    }

    fn control(view: &dyn View) -> Option<&ControlView> {
        downcast_ref::<ControlView>(view)
    }

    /// A sub-controller serves its own subtree only; the sibling built after it is
    /// created, tagged and verified by the parent controller again.
    ///
    /// # Errors
    /// Returns an error if the document does not parse or a view is missing.
    #[test]
    fn sub_controllers_do_not_leak_to_siblings() -> Result<()> {
        init_logging();
        let description = views_document()?;
        let host = Rc::new(Host::default());
        let view = description
            .create_view("siblings", Some(Rc::clone(&host) as Rc<dyn Controller>))
            .context("siblings")?;
        assert!(description.controller().is_none());

        let views = children(view.as_ref());
        assert_eq!(views.len(), 2);
        let scoped = views.first().context("scoped container")?;
        assert!(scoped.properties().controller.is_some());
        let inner_knob = children(scoped.as_ref())
            .first()
            .and_then(|child| control(child.as_ref()))
            .context("knob under the sub-controller")?;
        assert!(inner_knob.properties.tooltip.is_none());
        assert_eq!(inner_knob.tag, 7);

        let sibling = views
            .get(1)
            .and_then(|child| control(child.as_ref()))
            .context("sibling knob")?;
        assert_eq!(sibling.properties.tooltip.as_deref(), Some("host knob"));
        assert_eq!(sibling.tag, 70);
        assert!(sibling.properties.controller.is_none());

        assert_eq!(host.detail.verified.get(), 2);
        assert_eq!(host.verified.get(), 2);
        Ok(())
    }

    /// # Errors
    /// Returns an error if the document does not parse or a view is missing.
    #[test]
    fn nested_templates_are_instantiated_with_overrides() -> Result<()> {
        init_logging();
        let description = views_document()?;
        let outer = description.create_view("outer", None).context("outer")?;
        let inner = children(outer.as_ref()).first().context("inner")?;
        assert_eq!(description.get_template_name_from_view(inner.as_ref()), Some("inner"));
        assert_eq!(inner.properties().rect.origin(), Point::new(5.0, 5.0));
        assert_eq!(inner.properties().rect.size(), Point::new(10.0, 10.0));
        Ok(())
    }

    fn nesting_depth(view: &dyn View) -> usize {
        1 + children(view)
            .iter()
            .map(|child| nesting_depth(child.as_ref()))
            .max()
            .unwrap_or(0)
    }

    /// # Errors
    /// Returns an error if the document does not parse or the view is missing.
    #[test]
    fn recursive_templates_stop_at_the_depth_limit() -> Result<()> {
        init_logging();
        let config = DescriptionConfig {
            max_template_depth: 3,
            ..DescriptionConfig::default()
        };
        let mut description = UiDescription::with_config(config);
        description.parse_str(VIEWS)?;
        let cycle = description.create_view("cycle", None).context("cycle")?;
        assert_eq!(nesting_depth(cycle.as_ref()), 4);
        Ok(())
    }

    /// Editing a live view and reading it back rewrites its template.
    ///
    /// # Errors
    /// Returns an error if the document does not parse or a node is missing.
    #[test]
    fn update_view_description_reads_views_back() -> Result<()> {
        init_logging();
        let mut description = views_document()?;
        let mut view = description.create_view("simple", None).context("simple")?;
        let child = view
            .as_container_mut()
            .and_then(|container| container.views_mut().first_mut())
            .context("child")?;
        child
            .properties_mut()
            .rect
            .set_origin(Point::new(50.0, 60.0));

        assert!(description.update_view_description("simple", view.as_ref()));
        let node = template(&description, "simple").context("template")?;
        assert_eq!(node.attributes().get("class"), Some("CViewContainer"));
        assert_eq!(node.attributes().get("size"), Some("100, 100"));
        let child_node = node.children().get(0).context("child node")?;
        assert_eq!(child_node.name(), "view");
        assert_eq!(child_node.attributes().get("origin"), Some("50, 60"));
        assert_eq!(child_node.attributes().get("control-tag"), Some("gain"));
        assert_eq!(child_node.attributes().get("class"), Some("CControl"));
        assert_eq!(node.children().len(), 1);
        Ok(())
    }

    /// # Errors
    /// Returns an error if the document does not parse or a node is missing.
    #[test]
    fn templated_sub_views_update_their_own_templates() -> Result<()> {
        init_logging();
        let mut description = views_document()?;
        let outer = description.create_view("outer", None).context("outer")?;
        assert!(description.update_view_description("outer", outer.as_ref()));
        let outer_node = template(&description, "outer").context("outer template")?;
        let reference = outer_node.children().get(0).context("reference")?;
        assert_eq!(reference.attributes().get("template"), Some("inner"));
        assert_eq!(reference.attributes().get("origin"), Some("5, 5"));
        let inner_node = template(&description, "inner").context("inner template")?;
        assert_eq!(inner_node.attributes().get("origin"), Some("0, 0"));
        assert_eq!(inner_node.attributes().get("size"), Some("10, 10"));
        Ok(())
    }

    struct Veto;

    impl DescriptionListener for Veto {
        fn should_update_template(&self, _description: &UiDescription, name: &str) -> bool {
            name != "simple"
        }
    }

    /// # Errors
    /// Returns an error if the document does not parse or a node is missing.
    #[test]
    fn listeners_can_veto_template_updates() -> Result<()> {
        init_logging();
        let mut description = views_document()?;
        description.register_listener(Rc::new(Veto));
        let mut view = description.create_view("simple", None).context("simple")?;
        view.properties_mut().rect.set_origin(Point::new(9.0, 9.0));
        assert!(!description.update_view_description("simple", view.as_ref()));
        let node = template(&description, "simple").context("template")?;
        assert!(!node.attributes().has("origin"));
        Ok(())
    }

    /// # Errors
    /// Returns an error if the document does not parse or a view is missing.
    #[test]
    fn views_survive_the_clipboard() -> Result<()> {
        init_logging();
        let description = views_document()?;
        let view = description.create_view("simple", None).context("simple")?;
        let custom = AttributeMap::from_pairs([("source", "editor")]);
        let text = description.store_views(&[view.as_ref()], Some(&custom))?;
        ensure!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"), "{text}");
        ensure!(text.contains("<vstgui-ui-description-view-list>"), "{text}");

        let (views, restored_custom) = description.restore_views(&text);
        assert_eq!(restored_custom, Some(custom));
        assert_eq!(views.len(), 1);
        let restored = views.first().context("restored view")?;
        assert_eq!(restored.properties().rect.size(), Point::new(100.0, 100.0));
        let control = children(restored.as_ref())
            .first()
            .and_then(|child| downcast_ref::<ControlView>(child.as_ref()))
            .context("restored control")?;
        assert_eq!(control.tag, 7);
        assert_eq!(control.properties.rect.origin(), Point::new(1.0, 2.0));
        Ok(())
    }

    /// # Errors
    /// Returns an error if the document does not parse.
    #[test]
    fn clipboard_rejects_empty_and_foreign_input() -> Result<()> {
        init_logging();
        let description = views_document()?;
        assert!(matches!(
            description.store_views(&[], None),
            Err(StoreError::NoViews)
        ));
        let (views, custom) = description.restore_views(VIEWS);
        assert!(views.is_empty());
        assert!(custom.is_none());
        let (broken, _) = description.restore_views("<vstgui-ui-description-view-list><view>");
        assert!(broken.is_empty());
        Ok(())
    }
}
