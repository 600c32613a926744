//! The description tree: named nodes carrying attributes, children and a raw text payload.
//!
//! Ownership is strictly top-down. A [`NodeList`] owns its nodes; removing a node from its
//! list drops the whole subtree. Lists used for resource catalogs keep a side index from the
//! `name` attribute to the node position, kept exact by routing every mutation through the
//! list (see [`NodeMut`]).

use core::cmp::Ordering;
use core::ops::{Deref, DerefMut};
use core::slice;
use std::collections::HashMap;

use crate::attributes::AttributeMap;
use crate::resources::bitmap::BitmapState;
use crate::resources::color::ColorState;
use crate::resources::control_tag::ControlTagState;
use crate::resources::font::FontState;
use crate::resources::gradient::GradientState;

/// Element name used for comment nodes.
pub const COMMENT_NODE_NAME: &str = "comment";

/// Attribute used as the lookup key of catalog entries and templates.
pub const NAME_ATTRIBUTE: &str = "name";

/// Resource variant of a node together with its lazily filled cache.
///
/// Cloning produces the same variant with an empty cache.
#[derive(Debug, Default)]
pub enum NodeKind {
    #[default]
    Generic,
    Comment,
    Bitmap(BitmapState),
    Font(FontState),
    Color(ColorState),
    Gradient(GradientState),
    ControlTag(ControlTagState),
    Variable,
}

impl NodeKind {
    /// Drop any cached resource so the next access rebuilds it from the attributes.
    pub fn invalidate(&self) {
        match self {
            Self::Bitmap(state) => state.invalidate(),
            Self::Font(state) => state.invalidate(),
            Self::Color(state) => state.invalidate(),
            Self::Gradient(state) => state.invalidate(),
            Self::ControlTag(state) => state.invalidate(),
            Self::Generic | Self::Comment | Self::Variable => {}
        }
    }

    const fn discriminant(&self) -> u8 {
        match self {
            Self::Generic => 0,
            Self::Comment => 1,
            Self::Bitmap(_) => 2,
            Self::Font(_) => 3,
            Self::Color(_) => 4,
            Self::Gradient(_) => 5,
            Self::ControlTag(_) => 6,
            Self::Variable => 7,
        }
    }
}

impl Clone for NodeKind {
    fn clone(&self) -> Self {
        match self {
            Self::Generic => Self::Generic,
            Self::Comment => Self::Comment,
            Self::Bitmap(_) => Self::Bitmap(BitmapState::default()),
            Self::Font(_) => Self::Font(FontState::default()),
            Self::Color(_) => Self::Color(ColorState::default()),
            Self::Gradient(_) => Self::Gradient(GradientState::default()),
            Self::ControlTag(_) => Self::ControlTag(ControlTagState::default()),
            Self::Variable => Self::Variable,
        }
    }
}

/// One element of the description tree.
#[derive(Clone, Debug)]
pub struct DescriptionNode {
    pub(crate) name: String,
    pub(crate) attributes: AttributeMap,
    pub(crate) children: NodeList,
    pub(crate) data: String,
    pub(crate) no_export: bool,
    pub(crate) implicit: bool,
    pub(crate) kind: NodeKind,
}

impl DescriptionNode {
    /// A generic node without attributes.
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_attributes(name, AttributeMap::new())
    }

    #[inline]
    pub fn with_attributes(name: impl Into<String>, attributes: AttributeMap) -> Self {
        Self::with_kind(name, attributes, NodeKind::Generic)
    }

    /// A node whose children are indexed by their `name` attribute.
    #[inline]
    pub fn with_indexed_children(name: impl Into<String>, attributes: AttributeMap) -> Self {
        let mut node = Self::with_attributes(name, attributes);
        node.children = NodeList::indexed();
        node
    }

    #[inline]
    pub fn with_kind(name: impl Into<String>, attributes: AttributeMap, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            attributes,
            children: NodeList::new(),
            data: String::new(),
            no_export: false,
            implicit: false,
            kind,
        }
    }

    /// A comment node; the text is kept verbatim as the node data.
    #[inline]
    pub fn comment(text: impl Into<String>) -> Self {
        let mut node = Self::with_kind(COMMENT_NODE_NAME, AttributeMap::new(), NodeKind::Comment);
        node.data = text.into();
        node
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    /// Mutable attribute access. Any cached resource is dropped since the defining
    /// attributes may change.
    #[inline]
    pub fn attributes_mut(&mut self) -> &mut AttributeMap {
        self.kind.invalidate();
        &mut self.attributes
    }

    /// Value of the `name` attribute.
    #[inline]
    pub fn name_attribute(&self) -> Option<&str> {
        self.attributes.get(NAME_ATTRIBUTE)
    }

    #[inline]
    pub fn children(&self) -> &NodeList {
        &self.children
    }

    /// Mutable child access. Drops the cached resource, since gradients resolve from their
    /// children.
    #[inline]
    pub fn children_mut(&mut self) -> &mut NodeList {
        self.kind.invalidate();
        &mut self.children
    }

    /// Raw text payload (whitespace-stripped character data, or comment text).
    #[inline]
    pub fn data(&self) -> &str {
        &self.data
    }

    #[inline]
    pub fn set_data(&mut self, data: impl Into<String>) {
        self.data = data.into();
    }

    #[inline]
    pub(crate) fn append_data(&mut self, chunk: &str) {
        self.data.push_str(chunk);
    }

    /// Whether the writer skips this node.
    #[inline]
    pub fn no_export(&self) -> bool {
        self.no_export
    }

    #[inline]
    pub fn set_no_export(&mut self, no_export: bool) {
        self.no_export = no_export;
    }

    /// Whether the node was added by the document rather than read from input. The writer
    /// leaves out implicit nodes that have nothing to export.
    #[inline]
    pub fn implicit(&self) -> bool {
        self.implicit
    }

    #[inline]
    pub fn set_implicit(&mut self, implicit: bool) {
        self.implicit = implicit;
    }

    /// Whether the writer emits this node: it is exported and, when implicit, carries data
    /// or a written child.
    pub fn is_written(&self) -> bool {
        !self.no_export && (!self.implicit || !self.data.is_empty() || self.has_written_children())
    }

    /// Whether any child would be written.
    pub fn has_written_children(&self) -> bool {
        self.children.iter().any(Self::is_written)
    }

    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[inline]
    pub fn is_comment(&self) -> bool {
        matches!(self.kind, NodeKind::Comment)
    }

    /// Drop cached resources of this node only.
    #[inline]
    pub fn invalidate(&self) {
        self.kind.invalidate();
    }

    /// Drop cached resources of this node and its whole subtree.
    pub fn free_platform_resources(&self) {
        self.kind.invalidate();
        for child in &self.children {
            child.free_platform_resources();
        }
    }

    /// Copy of the subtree with comments and no-export nodes removed, used to compare
    /// trees across a write/parse cycle.
    pub fn exported(&self) -> Self {
        let mut copy = Self::with_kind(self.name.clone(), self.attributes.clone(), self.kind.clone());
        copy.data.clone_from(&self.data);
        if self.children.is_indexed() {
            copy.children = NodeList::indexed();
        }
        for child in &self.children {
            if !child.no_export && !child.is_comment() {
                copy.children.add(child.exported());
            }
        }
        copy
    }
}

impl PartialEq for DescriptionNode {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.attributes == other.attributes
            && self.data == other.data
            && self.no_export == other.no_export
            && self.kind.discriminant() == other.kind.discriminant()
            && self.children == other.children
    }
}

/// Ordered list of owned nodes, optionally indexed by the `name` attribute.
#[derive(Clone, Debug, Default)]
pub struct NodeList {
    nodes: Vec<DescriptionNode>,
    name_index: Option<HashMap<String, usize>>,
}

impl NodeList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// A list that answers `name` attribute lookups from a side index.
    #[inline]
    pub fn indexed() -> Self {
        Self {
            nodes: Vec::new(),
            name_index: Some(HashMap::new()),
        }
    }

    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.name_index.is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, DescriptionNode> {
        self.nodes.iter()
    }

    #[inline]
    pub fn get(&self, position: usize) -> Option<&DescriptionNode> {
        self.nodes.get(position)
    }

    /// Mutable access through a guard that re-synchronises the name index on drop.
    #[inline]
    pub fn get_mut(&mut self, position: usize) -> Option<NodeMut<'_>> {
        let old_name = self
            .nodes
            .get(position)?
            .name_attribute()
            .map(str::to_owned);
        Some(NodeMut {
            list: self,
            position,
            old_name,
        })
    }

    /// Plain mutable access; `None` for indexed lists, which need [`Self::get_mut`].
    #[inline]
    pub fn get_mut_unindexed(&mut self, position: usize) -> Option<&mut DescriptionNode> {
        if self.name_index.is_some() {
            return None;
        }
        self.nodes.get_mut(position)
    }

    /// Append a node, returning its position.
    pub fn add(&mut self, node: DescriptionNode) -> usize {
        let position = self.nodes.len();
        if let Some(index) = self.name_index.as_mut()
            && let Some(name) = node.name_attribute()
        {
            index.entry(name.to_owned()).or_insert(position);
        }
        self.nodes.push(node);
        position
    }

    /// Remove and return the node at `position`.
    pub fn remove(&mut self, position: usize) -> Option<DescriptionNode> {
        if position >= self.nodes.len() {
            return None;
        }
        let removed = self.nodes.remove(position);
        self.rebuild_index();
        Some(removed)
    }

    /// Remove every node.
    pub fn remove_all(&mut self) {
        self.nodes.clear();
        if let Some(index) = self.name_index.as_mut() {
            index.clear();
        }
    }

    /// Keep only nodes matching `keep`.
    pub fn retain(&mut self, keep: impl FnMut(&DescriptionNode) -> bool) {
        self.nodes.retain(keep);
        self.rebuild_index();
    }

    /// First node with the given element name.
    #[inline]
    pub fn find_by_name(&self, node_name: &str) -> Option<&DescriptionNode> {
        self.nodes.iter().find(|node| node.name == node_name)
    }

    #[inline]
    pub fn position_by_name(&self, node_name: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.name == node_name)
    }

    /// First node whose attribute `attribute` equals `value`.
    #[inline]
    pub fn find_by_attribute(&self, attribute: &str, value: &str) -> Option<&DescriptionNode> {
        self.position_by_attribute(attribute, value)
            .and_then(|position| self.nodes.get(position))
    }

    pub fn position_by_attribute(&self, attribute: &str, value: &str) -> Option<usize> {
        if attribute == NAME_ATTRIBUTE
            && let Some(index) = &self.name_index
        {
            return index.get(value).copied();
        }
        self.nodes
            .iter()
            .position(|node| node.attributes.get(attribute) == Some(value))
    }

    /// Sort by `name` attribute; named nodes come before unnamed ones, whose relative
    /// order is kept.
    pub fn sort(&mut self) {
        self.nodes.sort_by(|left, right| {
            match (left.name_attribute(), right.name_attribute()) {
                (Some(left_name), Some(right_name)) => left_name.cmp(right_name),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        });
        self.rebuild_index();
    }

    /// Mutable access to every node for operations that cannot change `name` attributes.
    pub(crate) fn for_each_mut(&mut self, mut visit: impl FnMut(&mut DescriptionNode)) {
        for node in &mut self.nodes {
            visit(node);
        }
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        let Some(index) = self.name_index.as_mut() else {
            return;
        };
        index.clear();
        for (position, node) in self.nodes.iter().enumerate() {
            if let Some(name) = node.name_attribute() {
                index.entry(name.to_owned()).or_insert(position);
            }
        }
    }
}

impl PartialEq for NodeList {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl<'list> IntoIterator for &'list NodeList {
    type Item = &'list DescriptionNode;
    type IntoIter = slice::Iter<'list, DescriptionNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

/// Mutable handle to a node inside a [`NodeList`].
///
/// When dropped, a changed `name` attribute is reflected in the list's index.
pub struct NodeMut<'list> {
    list: &'list mut NodeList,
    position: usize,
    old_name: Option<String>,
}

impl Deref for NodeMut<'_> {
    type Target = DescriptionNode;

    fn deref(&self) -> &Self::Target {
        &self.list.nodes[self.position]
    }
}

impl DerefMut for NodeMut<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.list.nodes[self.position]
    }
}

impl Drop for NodeMut<'_> {
    fn drop(&mut self) {
        if self.list.name_index.is_none() {
            return;
        }
        let new_name = self.list.nodes[self.position].name_attribute();
        if new_name != self.old_name.as_deref() {
            self.list.rebuild_index();
        }
    }
}
