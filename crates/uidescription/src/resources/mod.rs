//! Resource catalogs and the per-node resource caches.
//!
//! Each catalog entry is a [`DescriptionNode`](crate::node::DescriptionNode) whose
//! [`NodeKind`](crate::node::NodeKind) owns a lazily filled cache of the resolved value.
//! The accessors live next to their cache types in the submodules.

pub mod bitmap;
pub mod color;
pub mod control_tag;
pub mod font;
pub mod gradient;
pub mod variable;

use crate::attributes::AttributeMap;
use crate::node::{DescriptionNode, NodeKind};

/// The named resource catalogs below the document root.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Catalog {
    Bitmaps,
    Fonts,
    Colors,
    ControlTags,
    Gradients,
    Variables,
    Custom,
}

impl Catalog {
    pub const ALL: [Self; 7] = [
        Self::Bitmaps,
        Self::Fonts,
        Self::Colors,
        Self::ControlTags,
        Self::Gradients,
        Self::Variables,
        Self::Custom,
    ];

    /// Element name of the catalog node.
    #[inline]
    pub const fn node_name(self) -> &'static str {
        match self {
            Self::Bitmaps => "bitmaps",
            Self::Fonts => "fonts",
            Self::Colors => "colors",
            Self::ControlTags => "control-tags",
            Self::Gradients => "gradients",
            Self::Variables => "variables",
            Self::Custom => "custom",
        }
    }

    /// Element name every entry of the catalog must carry.
    #[inline]
    pub const fn entry_name(self) -> &'static str {
        match self {
            Self::Bitmaps => "bitmap",
            Self::Fonts => "font",
            Self::Colors => "color",
            Self::ControlTags => "control-tag",
            Self::Gradients => "gradient",
            Self::Variables => "var",
            Self::Custom => "attributes",
        }
    }

    pub fn from_node_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|catalog| catalog.node_name() == name)
    }

    /// Catalogs answering name lookups from an index.
    #[inline]
    pub const fn is_indexed(self) -> bool {
        matches!(self, Self::ControlTags | Self::Colors | Self::Bitmaps)
    }

    /// Catalogs served by the shared-resources document when one is attached.
    #[inline]
    pub const fn is_shareable(self) -> bool {
        matches!(
            self,
            Self::Bitmaps | Self::Fonts | Self::Colors | Self::Gradients
        )
    }

    /// An empty catalog node.
    pub fn new_node(self) -> DescriptionNode {
        if self.is_indexed() {
            DescriptionNode::with_indexed_children(self.node_name(), AttributeMap::new())
        } else {
            DescriptionNode::new(self.node_name())
        }
    }

    /// A new entry of this catalog carrying `attributes`.
    pub fn new_entry(self, attributes: AttributeMap) -> DescriptionNode {
        let kind = match self {
            Self::Bitmaps => NodeKind::Bitmap(bitmap::BitmapState::default()),
            Self::Fonts => NodeKind::Font(font::FontState::default()),
            Self::Colors => NodeKind::Color(color::ColorState::default()),
            Self::ControlTags => NodeKind::ControlTag(control_tag::ControlTagState::default()),
            Self::Gradients => NodeKind::Gradient(gradient::GradientState::default()),
            Self::Variables => NodeKind::Variable,
            Self::Custom => NodeKind::Generic,
        };
        DescriptionNode::with_kind(self.entry_name(), attributes, kind)
    }
}
