//! Building description trees from XML.
//!
//! [`DescriptionHandler`] receives element, text and comment events and enforces the
//! document shape: a `vstgui-ui-description` root holding catalogs and templates, or a
//! `vstgui-ui-description-view-list` root holding views and one custom node. Anything
//! else stops the parse. [`parse_document`] drives a handler from a `quick-xml` reader.

use core::str;

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};

use crate::attributes::AttributeMap;
use crate::error::ParseError;
use crate::node::DescriptionNode;
use crate::resources::Catalog;

/// Root element of a description document.
pub const ROOT_NODE_NAME: &str = "vstgui-ui-description";

/// Root element of a copied view list.
pub const VIEW_LIST_ROOT_NODE_NAME: &str = "vstgui-ui-description-view-list";

/// Whether a handler accepts more events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Event sink assembling a [`DescriptionNode`] tree.
#[derive(Debug, Default)]
pub struct DescriptionHandler {
    open: Vec<DescriptionNode>,
    root: Option<DescriptionNode>,
    restore_views: bool,
}

impl DescriptionHandler {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the root announced a view list.
    #[inline]
    pub fn is_view_list(&self) -> bool {
        self.restore_views
    }

    /// Name of the innermost open element.
    #[inline]
    pub fn open_element(&self) -> Option<&str> {
        self.open.last().map(DescriptionNode::name)
    }

    pub fn start_element(&mut self, name: &str, attributes: AttributeMap) -> Flow {
        let node = match self.open.len() {
            0 => {
                if self.root.is_some() {
                    return Flow::Stop;
                }
                match name {
                    ROOT_NODE_NAME => {}
                    VIEW_LIST_ROOT_NODE_NAME => self.restore_views = true,
                    _ => return Flow::Stop,
                }
                DescriptionNode::with_attributes(name, attributes)
            }
            1 if self.restore_views => {
                if !matches!(name, "view" | "custom") {
                    return Flow::Stop;
                }
                DescriptionNode::with_attributes(name, attributes)
            }
            1 => {
                if let Some(catalog) = Catalog::from_node_name(name) {
                    let mut node = catalog.new_node();
                    node.attributes = attributes;
                    node
                } else if name == "template" {
                    DescriptionNode::with_attributes(name, attributes)
                } else {
                    return Flow::Stop;
                }
            }
            2 if !self.restore_views => {
                let parent_catalog = self
                    .open
                    .last()
                    .and_then(|parent| Catalog::from_node_name(parent.name()));
                match parent_catalog {
                    Some(catalog) if catalog.entry_name() == name => catalog.new_entry(attributes),
                    Some(_) => return Flow::Stop,
                    None => DescriptionNode::with_attributes(name, attributes),
                }
            }
            _ => DescriptionNode::with_attributes(name, attributes),
        };
        self.open.push(node);
        Flow::Continue
    }

    pub fn end_element(&mut self, _name: &str) {
        let Some(node) = self.open.pop() else {
            return;
        };
        match self.open.last_mut() {
            Some(parent) => {
                parent.children.add(node);
            }
            None => self.root = Some(node),
        }
    }

    /// Append printable characters of `text` to the open element's data.
    pub fn char_data(&mut self, text: &str) {
        let Some(node) = self.open.last_mut() else {
            return;
        };
        let printable: String = text
            .chars()
            .filter(|&character| u32::from(character) > 0x20)
            .collect();
        if !printable.is_empty() {
            node.append_data(&printable);
        }
    }

    pub fn comment(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.open.last_mut() {
            Some(node) => {
                node.children.add(DescriptionNode::comment(text));
            }
            None => {
                log::warn!(target: "uidescription", "dropping comment outside the root element");
            }
        }
    }

    /// Close every open element and return the root, if one was started.
    pub fn finish(mut self) -> Option<DescriptionNode> {
        while !self.open.is_empty() {
            self.end_element("");
        }
        self.root
    }
}

fn read_attributes(start: &BytesStart<'_>) -> Result<AttributeMap, ParseError> {
    let mut attributes = AttributeMap::new();
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = str::from_utf8(attribute.key.as_ref())?;
        let value = attribute.unescape_value()?;
        attributes.set(key, value.into_owned());
    }
    Ok(attributes)
}

fn start(handler: &mut DescriptionHandler, event: &BytesStart<'_>) -> Result<String, ParseError> {
    let name = str::from_utf8(event.name().as_ref())?.to_owned();
    let attributes = read_attributes(event)?;
    if handler.start_element(&name, attributes) == Flow::Stop {
        log::debug!(target: "uidescription", "parse stopped at <{name}>");
        return Err(ParseError::Stopped { element: name });
    }
    Ok(name)
}

/// Text of an entity or character reference in element content.
fn resolve_reference(reference: &BytesRef<'_>) -> Result<String, ParseError> {
    if let Some(character) = reference.resolve_char_ref()? {
        return Ok(character.to_string());
    }
    let name = reference.decode()?;
    resolve_predefined_entity(&name)
        .map(str::to_owned)
        .ok_or_else(|| ParseError::UnknownEntity(name.into_owned()))
}

/// Feed the XML document in `bytes` to `handler`.
///
/// # Errors
/// Returns an error for malformed XML, for unknown entity references, for elements the
/// handler rejects, for input ending inside an element and for input without a root
/// element. The handler keeps whatever was built before the error.
pub fn parse_document(handler: &mut DescriptionHandler, bytes: &[u8]) -> Result<(), ParseError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    let mut saw_root = false;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(event) => {
                start(handler, &event)?;
                saw_root = true;
            }
            Event::Empty(event) => {
                let name = start(handler, &event)?;
                handler.end_element(&name);
                saw_root = true;
            }
            Event::End(event) => {
                let name = str::from_utf8(event.name().as_ref())?.to_owned();
                handler.end_element(&name);
            }
            Event::Text(text) => handler.char_data(&text.decode()?),
            Event::CData(data) => handler.char_data(&data.decode()?),
            Event::GeneralRef(reference) => handler.char_data(&resolve_reference(&reference)?),
            Event::Comment(comment) => handler.comment(&comment.decode()?),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    if let Some(open) = handler.open_element() {
        return Err(ParseError::Unterminated(open.to_owned()));
    }
    if !saw_root {
        return Err(ParseError::Empty);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{DescriptionHandler, parse_document};
    use crate::error::ParseError;
    use crate::node::NodeKind;

    fn parse(text: &str) -> (Result<(), ParseError>, DescriptionHandler) {
        let mut handler = DescriptionHandler::new();
        let result = parse_document(&mut handler, text.as_bytes());
        (result, handler)
    }

    #[test]
    fn catalog_entries_get_resource_kinds() {
        let (result, handler) = parse(
            "<vstgui-ui-description><colors><color name=\"c\" rgb=\"#ff0000\"/></colors>\
             <control-tags><control-tag name=\"t\" tag=\"1\"/></control-tags>\
             </vstgui-ui-description>",
        );
        assert!(matches!(result, Ok(())));
        let root = handler.finish();
        let colors = root.as_ref().and_then(|node| node.children().find_by_name("colors"));
        let entry = colors.and_then(|node| node.children().get(0));
        assert!(matches!(entry.map(|node| node.kind()), Some(NodeKind::Color(_))));
        assert!(colors.is_some_and(|node| node.children().is_indexed()));
    }

    #[test]
    fn wrong_entry_name_stops() {
        let (result, handler) = parse(
            "<vstgui-ui-description><colors><font name=\"f\"/></colors></vstgui-ui-description>",
        );
        assert!(matches!(result, Err(ParseError::Stopped { element }) if element == "font"));
        let root = handler.finish();
        assert!(root.is_some_and(|node| node.children().find_by_name("colors").is_some()));
    }

    #[test]
    fn unknown_second_level_stops() {
        let (result, _) = parse("<vstgui-ui-description><views/></vstgui-ui-description>");
        assert!(matches!(result, Err(ParseError::Stopped { .. })));
        let (view_list, _) = parse(
            "<vstgui-ui-description-view-list><template/></vstgui-ui-description-view-list>",
        );
        assert!(matches!(view_list, Err(ParseError::Stopped { .. })));
    }

    #[test]
    fn char_data_drops_whitespace() {
        let (result, handler) = parse(
            "<vstgui-ui-description><bitmaps><bitmap name=\"b\" path=\"b.png\">\
             <data encoding=\"base64\">\n\t\tAAEC\n\t\tAwQF\n</data></bitmap></bitmaps>\
             </vstgui-ui-description>",
        );
        assert!(matches!(result, Ok(())));
        let root = handler.finish();
        let data = root
            .as_ref()
            .and_then(|node| node.children().find_by_name("bitmaps"))
            .and_then(|node| node.children().get(0))
            .and_then(|node| node.children().find_by_name("data"))
            .map(|node| node.data().to_owned());
        assert_eq!(data.as_deref(), Some("AAECAwQF"));
    }

    #[test]
    fn truncated_and_empty_input_fail() {
        let (truncated, handler) = parse("<vstgui-ui-description><template name=\"a\">");
        assert!(matches!(truncated, Err(_)));
        assert!(handler.finish().is_some());
        let (empty, _) = parse("<!-- nothing -->");
        assert!(matches!(empty, Err(ParseError::Empty)));
    }

    fn note_data(text: &str) -> (Result<(), ParseError>, Option<String>) {
        let (result, handler) = parse(&format!(
            "<vstgui-ui-description><template name=\"t\"><note>{text}</note></template>\
             </vstgui-ui-description>"
        ));
        let data = handler
            .finish()
            .as_ref()
            .and_then(|root| root.children().find_by_name("template"))
            .and_then(|template| template.children().find_by_name("note"))
            .map(|note| note.data().to_owned());
        (result, data)
    }

    #[test]
    fn references_in_text_are_resolved() {
        let (result, data) = note_data("a&amp;b&lt;c&gt;d&#65;&#x42;&apos;&quot;");
        assert!(matches!(result, Ok(())));
        assert_eq!(data.as_deref(), Some("a&b<c>dAB'\""));
    }

    #[test]
    fn unknown_entity_fails() {
        let (result, data) = note_data("a&nbsp;b");
        assert!(matches!(result, Err(ParseError::UnknownEntity(name)) if name == "nbsp"));
        assert_eq!(data.as_deref(), Some("a"));
    }
}
