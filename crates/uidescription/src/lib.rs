//! XML user-interface descriptions.
//!
//! A description document holds resource catalogs (bitmaps, fonts, colors, gradients,
//! control tags, variables and custom attribute sets) and named view templates. This crate
//! parses such documents into a node tree, resolves resources by name with caching,
//! evaluates arithmetic over tags and variables, instantiates view trees through a
//! registry of view creators, reads live views back into templates and writes the tree
//! back out as XML.

#![forbid(unsafe_code)]

/// Attribute maps and the typed value codecs used by every node
pub mod attributes;
pub mod color;
pub mod config;
/// Hooks the application implements: controllers, listeners and bitmap creators
pub mod controller;
mod document;
pub mod error;
/// Arithmetic over numbers, tags and variables
pub mod expression;
pub mod factory;
pub mod geometry;
pub mod node;
/// Parse-event handler and the `quick-xml` driver
pub mod parser;
pub mod resources;
pub mod view;
pub mod writer;

pub use attributes::AttributeMap;
pub use color::Color;
pub use config::DescriptionConfig;
pub use controller::{BitmapCreator, ControlListener, Controller, DescriptionListener};
pub use document::{FocusDrawing, SaveFlags, TEMPLATE_NODE_NAME, UiDescription};
pub use error::{EvalError, ParseError, StoreError};
pub use factory::{AttributeType, ViewCreator, ViewFactory};
pub use geometry::{Point, Rect};
pub use node::{DescriptionNode, NodeKind, NodeList};
pub use resources::Catalog;
pub use view::{BasicView, ContainerView, ControlView, View, ViewContainer, ViewProperties};
