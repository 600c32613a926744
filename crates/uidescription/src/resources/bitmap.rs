//! Bitmap catalog entries, inline image data and scale-factor naming.
//!
//! A bitmap entry names an image by `path`. The image bytes may also be embedded as a
//! base64 `data` child, which wins over the path when the bitmap is resolved. High
//! resolution variants are separate entries whose name carries a `#2x` or `_2x` suffix;
//! the document attaches them to the base bitmap on first lookup.

use core::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::attributes::{AttributeMap, parse_double};
use crate::controller::BitmapCreator;
use crate::geometry::Rect;
use crate::node::{DescriptionNode, NAME_ATTRIBUTE, NodeKind};

const PATH: &str = "path";
const SCALE_FACTOR: &str = "scale-factor";
const NINE_PART_OFFSETS: &str = "nineparttiled-offsets";
const DATA: &str = "data";
const FILTER: &str = "filter";
const PROPERTY: &str = "property";

/// Where the pixels of one bitmap representation come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BitmapSource {
    /// Encoded image bytes, usually PNG.
    Encoded(Vec<u8>),
    /// Image file on disk.
    Path(PathBuf),
}

/// One resolution of a bitmap.
#[derive(Clone, Debug, PartialEq)]
pub struct BitmapRepresentation {
    pub source: BitmapSource,
    pub scale_factor: f64,
}

/// A resolved bitmap: its resource path, optional nine-part tiling offsets and every known
/// resolution.
#[derive(Debug)]
pub struct Bitmap {
    path: String,
    part_offsets: Option<Rect>,
    representations: RefCell<Vec<BitmapRepresentation>>,
}

impl Bitmap {
    pub fn new(path: impl Into<String>, part_offsets: Option<Rect>) -> Self {
        Self {
            path: path.into(),
            part_offsets,
            representations: RefCell::new(Vec::new()),
        }
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Nine-part tiling offsets; `None` for a plain bitmap.
    #[inline]
    pub fn part_offsets(&self) -> Option<Rect> {
        self.part_offsets
    }

    #[inline]
    pub fn representations(&self) -> Vec<BitmapRepresentation> {
        self.representations.borrow().clone()
    }

    /// Add a resolution; one with an already known scale factor is ignored.
    pub fn add_representation(&self, representation: BitmapRepresentation) -> bool {
        let mut representations = self.representations.borrow_mut();
        if representations.iter().any(|existing| {
            existing.scale_factor.to_bits() == representation.scale_factor.to_bits()
        }) {
            return false;
        }
        representations.push(representation);
        true
    }

    /// Scale factors of the known resolutions, in insertion order.
    pub fn scale_factors(&self) -> Vec<f64> {
        self.representations
            .borrow()
            .iter()
            .map(|representation| representation.scale_factor)
            .collect()
    }
}

/// Cached bitmap of a `bitmap` entry.
#[derive(Debug, Default)]
pub struct BitmapState {
    cached: RefCell<Option<Rc<Bitmap>>>,
    scaled_bitmaps_added: Cell<bool>,
}

impl BitmapState {
    #[inline]
    pub fn invalidate(&self) {
        self.cached.replace(None);
        self.scaled_bitmaps_added.set(false);
    }
}

fn scale_factor_with_indicator(name: &str, indicator: char) -> Option<f64> {
    let indicator_index = name.rfind(indicator)?;
    let x_index = name.rfind('x')?;
    let factor = parse_double(name.get(indicator_index + 1..x_index)?)?;
    (factor != 0.0).then_some(factor)
}

/// Scale factor encoded in a resource name: the number between the last `#` (or `_`) and
/// the last `x`, as in `knob#2x.png` or `knob_1.5x`.
pub fn decode_scale_factor_from_name(name: &str) -> Option<f64> {
    scale_factor_with_indicator(name, '#').or_else(|| scale_factor_with_indicator(name, '_'))
}

/// `name` without its scale-factor suffix, or `None` when it has none.
pub fn remove_scale_factor_from_name(name: &str) -> Option<&str> {
    let index = name.rfind('#').or_else(|| name.rfind('_'))?;
    let x_index = name.rfind('x')?;
    if index > x_index {
        return None;
    }
    name.get(..index)
}

impl DescriptionNode {
    /// Value of the `path` attribute.
    #[inline]
    pub fn bitmap_path(&self) -> Option<&str> {
        self.attributes.get(PATH)
    }

    /// Decoded bytes of a non-empty base64 `data` child.
    pub fn inline_bitmap_data(&self) -> Option<Vec<u8>> {
        let node = self
            .children
            .find_by_name(DATA)
            .filter(|node| !node.data().is_empty())?;
        if node.attributes().get("encoding") != Some("base64") {
            return None;
        }
        let compact: String = node
            .data()
            .chars()
            .filter(|character| !character.is_ascii_whitespace())
            .collect();
        match STANDARD.decode(compact) {
            Ok(bytes) => Some(bytes),
            Err(error) => {
                log::debug!(target: "uidescription", "invalid inline data for bitmap {:?}: {error}", self.name_attribute());
                None
            }
        }
    }

    /// Resolve the bitmap of a bitmap entry.
    ///
    /// The pixels come from inline data, else from `creator`, else from the file at `path`
    /// (relative paths are joined onto `base_dir` when given).
    pub fn bitmap(
        &self,
        creator: Option<&dyn BitmapCreator>,
        base_dir: Option<&Path>,
    ) -> Option<Rc<Bitmap>> {
        let NodeKind::Bitmap(state) = &self.kind else {
            return None;
        };
        if let Some(bitmap) = state.cached.borrow().as_ref() {
            return Some(Rc::clone(bitmap));
        }
        let path = self.attributes.get(PATH)?;
        let bitmap = Rc::new(Bitmap::new(path, self.attributes.get_rect(NINE_PART_OFFSETS)));
        let source = self
            .inline_bitmap_data()
            .map(BitmapSource::Encoded)
            .or_else(|| creator.and_then(|hook| hook.create_bitmap(&self.attributes)))
            .unwrap_or_else(|| BitmapSource::Path(resolve_path(path, base_dir)));
        let scale_factor = self
            .attributes
            .get_double(SCALE_FACTOR)
            .or_else(|| decode_scale_factor_from_name(path))
            .unwrap_or(1.0);
        bitmap.add_representation(BitmapRepresentation {
            source,
            scale_factor,
        });
        log::trace!(target: "uidescription", "resolved bitmap {path} at scale {scale_factor}");
        state.cached.replace(Some(Rc::clone(&bitmap)));
        Some(bitmap)
    }

    pub(crate) fn scaled_bitmaps_added(&self) -> bool {
        matches!(&self.kind, NodeKind::Bitmap(state) if state.scaled_bitmaps_added.get())
    }

    pub(crate) fn mark_scaled_bitmaps_added(&self) {
        if let NodeKind::Bitmap(state) = &self.kind {
            state.scaled_bitmaps_added.set(true);
        }
    }

    /// Point the entry at a new image path.
    ///
    /// Drops the cached bitmap and any inline data, and records a scale factor encoded in
    /// the path.
    pub fn set_bitmap(&mut self, path: &str) {
        self.kind.invalidate();
        self.attributes.set(PATH, path);
        if let Some(factor) = decode_scale_factor_from_name(path) {
            self.attributes.set_double(SCALE_FACTOR, factor);
        }
        self.remove_inline_data();
    }

    pub fn set_nine_part_tiled_offsets(&mut self, offsets: Option<Rect>) {
        self.kind.invalidate();
        match offsets {
            Some(rect) => self.attributes.set_rect(NINE_PART_OFFSETS, rect),
            None => {
                self.attributes.remove(NINE_PART_OFFSETS);
            }
        }
    }

    /// Remove the `data` child.
    pub fn remove_inline_data(&mut self) {
        self.children.retain(|child| child.name() != DATA);
    }

    /// Embed the image file as a base64 `data` child.
    ///
    /// A non-empty existing `data` child is kept and an empty one is replaced. Returns
    /// whether the entry carries data afterwards.
    pub fn embed_inline_data(&mut self, base_dir: Option<&Path>) -> bool {
        if let Some(existing) = self.children.find_by_name(DATA) {
            if !existing.data().is_empty() {
                return true;
            }
            self.remove_inline_data();
        }
        let Some(path) = self.attributes.get(PATH) else {
            return false;
        };
        let file = resolve_path(path, base_dir);
        if base_dir.is_none() && file.is_relative() {
            return false;
        }
        match fs::read(&file) {
            Ok(bytes) => {
                let mut node = DescriptionNode::with_attributes(
                    DATA,
                    AttributeMap::from_pairs([("encoding", "base64")]),
                );
                node.set_data(STANDARD.encode(bytes));
                self.children.add(node);
                true
            }
            Err(error) => {
                log::warn!(target: "uidescription", "could not embed bitmap {}: {error}", file.display());
                false
            }
        }
    }

    /// Filter descriptions stored below the entry; each map carries the filter `name` plus
    /// its properties.
    pub fn bitmap_filters(&self) -> Vec<AttributeMap> {
        self.children
            .iter()
            .filter(|child| child.name() == FILTER)
            .filter_map(|filter| {
                let mut description =
                    AttributeMap::from_pairs([(NAME_ATTRIBUTE, filter.name_attribute()?)]);
                for property in &filter.children {
                    if property.name() != PROPERTY {
                        continue;
                    }
                    if let (Some(name), Some(value)) = (
                        property.attributes().get(NAME_ATTRIBUTE),
                        property.attributes().get("value"),
                    ) {
                        description.set(name, value);
                    }
                }
                Some(description)
            })
            .collect()
    }

    /// Replace the stored filter descriptions. Descriptions without a `name` are skipped.
    pub fn set_bitmap_filters(&mut self, filters: &[AttributeMap]) {
        self.kind.invalidate();
        self.children.retain(|child| child.name() != FILTER);
        for filter in filters {
            let Some(filter_name) = filter.get(NAME_ATTRIBUTE) else {
                continue;
            };
            let mut filter_node = DescriptionNode::with_attributes(
                FILTER,
                AttributeMap::from_pairs([(NAME_ATTRIBUTE, filter_name)]),
            );
            for (key, value) in filter.sorted() {
                if key == NAME_ATTRIBUTE {
                    continue;
                }
                filter_node.children.add(DescriptionNode::with_attributes(
                    PROPERTY,
                    AttributeMap::from_pairs([(NAME_ATTRIBUTE, key), ("value", value)]),
                ));
            }
            self.children.add(filter_node);
        }
    }
}

fn resolve_path(path: &str, base_dir: Option<&Path>) -> PathBuf {
    let candidate = PathBuf::from(path);
    match base_dir {
        Some(dir) if candidate.is_relative() => dir.join(candidate),
        _ => candidate,
    }
}
