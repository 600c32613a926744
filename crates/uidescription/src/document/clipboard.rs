//! Copying view trees as standalone view-list documents.

use super::UiDescription;
use super::templates::VIEW_NODE_NAME;
use crate::attributes::AttributeMap;
use crate::error::StoreError;
use crate::node::DescriptionNode;
use crate::parser::{DescriptionHandler, VIEW_LIST_ROOT_NODE_NAME, parse_document};
use crate::view::View;
use crate::writer::write_document;

const CUSTOM_NODE_NAME: &str = "custom";

impl UiDescription {
    /// Describe `views` and their sub-views as a view-list document, with `custom` stored
    /// in a `custom` node.
    ///
    /// # Errors
    /// Fails when `views` is empty or the document cannot be written.
    pub fn store_views(
        &self,
        views: &[&dyn View],
        custom: Option<&AttributeMap>,
    ) -> Result<String, StoreError> {
        if views.is_empty() {
            return Err(StoreError::NoViews);
        }
        let mut root = DescriptionNode::new(VIEW_LIST_ROOT_NODE_NAME);
        for &view in views {
            let mut node = DescriptionNode::new(VIEW_NODE_NAME);
            if self.update_attributes_for_view(&mut node, view, true) {
                root.children_mut().add(node);
            } else {
                log::debug!(target: "uidescription", "skipping view without a registered class");
            }
        }
        if let Some(custom) = custom {
            root.children_mut()
                .add(DescriptionNode::with_attributes(CUSTOM_NODE_NAME, custom.clone()));
        }
        let mut out = Vec::new();
        write_document(&mut out, &root)?;
        Ok(String::from_utf8(out)?)
    }

    /// Rebuild the views of a view-list document written by [`Self::store_views`].
    ///
    /// Returns the views in document order and the custom attributes, if any. Text that
    /// does not parse as a view list yields nothing.
    pub fn restore_views(&self, text: &str) -> (Vec<Box<dyn View>>, Option<AttributeMap>) {
        let mut handler = DescriptionHandler::new();
        let result = parse_document(&mut handler, text.as_bytes());
        let is_view_list = handler.is_view_list();
        let root = handler.finish();
        let root = match (result, root) {
            (Ok(()), Some(root)) if is_view_list => root,
            (Err(error), _) => {
                log::debug!(target: "uidescription", "cannot restore views: {error}");
                return (Vec::new(), None);
            }
            _ => {
                log::debug!(target: "uidescription", "cannot restore views from a description document");
                return (Vec::new(), None);
            }
        };
        let mut views = Vec::new();
        let mut custom = None;
        for node in root.children() {
            if node.is_comment() {
                continue;
            }
            if node.name() == CUSTOM_NODE_NAME {
                custom = Some(node.attributes().clone());
            } else if let Some(view) = self.create_view_from_node(node) {
                views.push(view);
            }
        }
        (views, custom)
    }
}
