//! The description document: the parsed tree plus everything needed to resolve it.
//!
//! A [`UiDescription`] owns the node tree, the view factory used to instantiate templates,
//! the current controller, registered listeners and an optional shared-resources document
//! that serves bitmaps, fonts, colors and gradients. All state is single-threaded; caches
//! and the controller slot use interior mutability so resolution works through `&self`.

mod clipboard;
mod resources;
mod save;
mod templates;

use core::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context as _;

pub use resources::FocusDrawing;
pub use save::SaveFlags;

use crate::attributes::AttributeMap;
use crate::color::Color;
use crate::config::DescriptionConfig;
use crate::controller::{BitmapCreator, Controller, DescriptionListener};
use crate::error::{EvalError, ParseError};
use crate::expression::{self, ValueResolver};
use crate::factory::ViewFactory;
use crate::node::{DescriptionNode, NAME_ATTRIBUTE};
use crate::parser::{DescriptionHandler, ROOT_NODE_NAME, parse_document};
use crate::resources::Catalog;
use crate::resources::font::{FontDescription, FontStyle};

/// Element name of template nodes.
pub const TEMPLATE_NODE_NAME: &str = "template";

const DEFAULT_FONTS: [(&str, &str, f64); 8] = [
    ("~ SystemFont", "Arial", 12.0),
    ("~ NormalFontVeryBig", "Arial", 18.0),
    ("~ NormalFontBig", "Arial", 14.0),
    ("~ NormalFont", "Arial", 12.0),
    ("~ NormalFontSmall", "Arial", 11.0),
    ("~ NormalFontSmaller", "Arial", 10.0),
    ("~ NormalFontVerySmall", "Arial", 9.0),
    ("~ SymbolFont", "Symbol", 12.0),
];

const DEFAULT_COLORS: [(&str, Color); 10] = [
    ("~ BlackCColor", Color::BLACK),
    ("~ WhiteCColor", Color::WHITE),
    ("~ GreyCColor", Color::GREY),
    ("~ RedCColor", Color::RED),
    ("~ GreenCColor", Color::GREEN),
    ("~ BlueCColor", Color::BLUE),
    ("~ YellowCColor", Color::YELLOW),
    ("~ CyanCColor", Color::CYAN),
    ("~ MagentaCColor", Color::MAGENTA),
    ("~ TransparentCColor", Color::TRANSPARENT),
];

/// A UI description document.
pub struct UiDescription {
    root: Option<DescriptionNode>,
    factory: Rc<ViewFactory>,
    config: DescriptionConfig,
    file_path: Option<PathBuf>,
    controller: RefCell<Option<Rc<dyn Controller>>>,
    listeners: RefCell<Vec<Rc<dyn DescriptionListener>>>,
    bitmap_creator: Option<Rc<dyn BitmapCreator>>,
    shared_resources: Option<Rc<UiDescription>>,
    evaluation_depth: Cell<usize>,
    template_depth: Cell<usize>,
    scale_scan_count: Cell<usize>,
}

impl Default for UiDescription {
    fn default() -> Self {
        Self::new()
    }
}

impl UiDescription {
    /// An unparsed document using the built-in view classes and default configuration.
    pub fn new() -> Self {
        Self::with_config(DescriptionConfig::default())
    }

    pub fn with_config(config: DescriptionConfig) -> Self {
        Self::with_factory(Rc::new(ViewFactory::with_builtin_creators()), config)
    }

    /// An unparsed document instantiating views through `factory`.
    pub fn with_factory(factory: Rc<ViewFactory>, config: DescriptionConfig) -> Self {
        Self {
            root: None,
            factory,
            config,
            file_path: None,
            controller: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            bitmap_creator: None,
            shared_resources: None,
            evaluation_depth: Cell::new(0),
            template_depth: Cell::new(0),
            scale_scan_count: Cell::new(0),
        }
    }

    /// Parse `text` into this document.
    ///
    /// # Errors
    /// See [`Self::parse_bytes`].
    #[inline]
    pub fn parse_str(&mut self, text: &str) -> Result<(), ParseError> {
        self.parse_bytes(text.as_bytes())
    }

    /// Parse an XML document into this description. A document that is already parsed is
    /// left unchanged.
    ///
    /// On failure the partial tree built so far is kept; when not even the root element
    /// was read, an empty document is installed instead.
    ///
    /// # Errors
    /// Returns the [`ParseError`] that stopped the parse.
    pub fn parse_bytes(&mut self, bytes: &[u8]) -> Result<(), ParseError> {
        if self.parsed() {
            return Ok(());
        }
        let mut handler = DescriptionHandler::new();
        let result = parse_document(&mut handler, bytes);
        let built = handler.finish();
        match (&result, built) {
            (Ok(()), Some(root)) => {
                self.root = Some(root);
                self.add_default_nodes();
            }
            (Err(error), Some(partial)) => {
                log::debug!(target: "uidescription", "keeping partial document after parse error: {error}");
                self.root = Some(partial);
            }
            (_, None) => {
                self.root = Some(DescriptionNode::new(ROOT_NODE_NAME));
                self.add_default_nodes();
            }
        }
        result
    }

    /// Read and parse the file at `path`, which also becomes the document's file path.
    ///
    /// # Errors
    /// Fails when the file cannot be read or does not parse.
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .with_context(|| format!("failed to read UI description {}", path.display()))?;
        self.set_file_path(path);
        self.parse_bytes(&bytes)
            .with_context(|| format!("failed to parse UI description {}", path.display()))
    }

    /// Whether a document tree is present.
    #[inline]
    pub fn parsed(&self) -> bool {
        self.root.is_some()
    }

    /// Root element of the document tree.
    #[inline]
    pub fn root(&self) -> Option<&DescriptionNode> {
        self.root.as_ref()
    }

    #[inline]
    pub fn set_file_path(&mut self, path: impl Into<PathBuf>) {
        self.file_path = Some(path.into());
    }

    #[inline]
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    #[inline]
    pub fn config(&self) -> &DescriptionConfig {
        &self.config
    }

    #[inline]
    pub fn view_factory(&self) -> &ViewFactory {
        &self.factory
    }

    /// Directory relative bitmap paths are resolved against.
    fn base_dir(&self) -> Option<&Path> {
        self.file_path.as_deref().and_then(Path::parent)
    }

    /// Attach or detach the document serving bitmaps, fonts, colors and gradients.
    #[inline]
    pub fn set_shared_resources(&mut self, resources: Option<Rc<Self>>) {
        self.shared_resources = resources;
    }

    #[inline]
    pub fn shared_resources(&self) -> Option<&Rc<Self>> {
        self.shared_resources.as_ref()
    }

    #[inline]
    pub fn set_bitmap_creator(&mut self, creator: Option<Rc<dyn BitmapCreator>>) {
        self.bitmap_creator = creator;
    }

    /// Replace the current controller.
    #[inline]
    pub fn set_controller(&self, controller: Option<Rc<dyn Controller>>) {
        self.controller.replace(controller);
    }

    #[inline]
    pub fn controller(&self) -> Option<Rc<dyn Controller>> {
        self.controller.borrow().clone()
    }

    pub fn register_listener(&self, listener: Rc<dyn DescriptionListener>) {
        self.listeners.borrow_mut().push(listener);
    }

    pub fn unregister_listener(&self, listener: &Rc<dyn DescriptionListener>) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|registered| !Rc::ptr_eq(registered, listener));
        listeners.len() != before
    }

    /// Call `notify` for every listener registered at the time of the call.
    fn notify(&self, notify: impl Fn(&dyn DescriptionListener, &Self)) {
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            notify(listener.as_ref(), self);
        }
    }

    /// Number of times sibling scale variants were searched for a base bitmap.
    #[inline]
    pub fn scale_scan_count(&self) -> usize {
        self.scale_scan_count.get()
    }

    /// Drop every cached color, font, gradient, tag and bitmap.
    pub fn free_platform_resources(&self) {
        if let Some(root) = &self.root {
            root.free_platform_resources();
        }
    }

    /// Evaluate an arithmetic expression that may refer to tags and variables of this
    /// document.
    ///
    /// # Errors
    /// Fails for malformed expressions, unknown identifiers and references nested deeper
    /// than [`DescriptionConfig::max_expression_depth`].
    pub fn calculate_string_value(&self, text: &str) -> Result<f64, EvalError> {
        let depth = self.evaluation_depth.get();
        if depth >= self.config.max_expression_depth {
            log::debug!(target: "uidescription", "expression nesting limit reached evaluating {text:?}");
            return Err(EvalError::RecursionLimit);
        }
        self.evaluation_depth.set(depth + 1);
        let result = expression::evaluate(text, self);
        self.evaluation_depth.set(depth);
        result
    }

    /// Catalog node for `catalog`, served by the shared-resources document where it applies.
    fn catalog(&self, catalog: Catalog) -> Option<&DescriptionNode> {
        if catalog.is_shareable()
            && let Some(shared) = &self.shared_resources
        {
            return shared.catalog(catalog);
        }
        self.root.as_ref()?.children().find_by_name(catalog.node_name())
    }

    /// Entry `name` of `catalog`.
    fn entry(&self, catalog: Catalog, name: &str) -> Option<&DescriptionNode> {
        self.catalog(catalog)?
            .children()
            .find_by_attribute(NAME_ATTRIBUTE, name)
    }

    /// Names of the entries of `catalog` in document order.
    fn entry_names(&self, catalog: Catalog) -> Vec<String> {
        self.catalog(catalog)
            .map(|node| {
                node.children()
                    .iter()
                    .filter_map(DescriptionNode::name_attribute)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether changes to `catalog` are refused because another document serves it.
    fn is_catalog_shared(&self, catalog: Catalog) -> bool {
        let shared = catalog.is_shareable() && self.shared_resources.is_some();
        if shared {
            log::debug!(target: "uidescription", "refusing to change shared {} catalog", catalog.node_name());
        }
        shared
    }

    /// Mutable catalog node, created when missing.
    fn catalog_mut(&mut self, catalog: Catalog) -> Option<&mut DescriptionNode> {
        if self.is_catalog_shared(catalog) {
            return None;
        }
        let children = self.root.as_mut()?.children_mut();
        let position = match children.position_by_name(catalog.node_name()) {
            Some(position) => position,
            None => {
                let mut node = catalog.new_node();
                node.set_implicit(true);
                children.add(node)
            }
        };
        children.get_mut_unindexed(position)
    }

    /// Mutable catalog node when it already exists.
    fn existing_catalog_mut(&mut self, catalog: Catalog) -> Option<&mut DescriptionNode> {
        if self.is_catalog_shared(catalog) {
            return None;
        }
        let children = self.root.as_mut()?.children_mut();
        let position = children.position_by_name(catalog.node_name())?;
        children.get_mut_unindexed(position)
    }

    fn add_default_nodes(&mut self) {
        if self.shared_resources.is_some() {
            return;
        }
        if let Some(fonts) = self.catalog_mut(Catalog::Fonts) {
            for (name, face, size) in DEFAULT_FONTS {
                let mut node =
                    Catalog::Fonts.new_entry(AttributeMap::from_pairs([(NAME_ATTRIBUTE, name)]));
                node.set_font(Rc::new(FontDescription::new(face, size, FontStyle::empty())));
                node.set_no_export(true);
                fonts.children_mut().add(node);
            }
        }
        if let Some(colors) = self.catalog_mut(Catalog::Colors) {
            for (name, color) in DEFAULT_COLORS {
                let mut node =
                    Catalog::Colors.new_entry(AttributeMap::from_pairs([(NAME_ATTRIBUTE, name)]));
                node.set_color(color);
                node.set_no_export(true);
                colors.children_mut().add(node);
            }
        }
    }
}

impl ValueResolver for UiDescription {
    fn tag_for_name(&self, name: &str) -> Option<i32> {
        Some(self.get_tag_for_name(name))
    }

    fn variable(&self, name: &str) -> Option<f64> {
        self.get_variable_number(name)
    }
}
