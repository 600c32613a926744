//! Font catalog entries.

use core::cell::RefCell;
use std::rc::Rc;

use crate::attributes::format_double;
use crate::node::{DescriptionNode, NAME_ATTRIBUTE, NodeKind};

const FONT_NAME: &str = "font-name";
const SIZE: &str = "size";
const ALTERNATIVE_NAMES: &str = "alternative-font-names";
const DEFAULT_SIZE: f64 = 12.0;

bitflags::bitflags! {
    /// Font style flags.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct FontStyle: u8 {
        const BOLD           = 0b0001;
        const ITALIC         = 0b0010;
        const UNDERLINE      = 0b0100;
        const STRIKE_THROUGH = 0b1000;
    }
}

/// Attribute name of each style flag.
const STYLE_ATTRIBUTES: [(FontStyle, &str); 4] = [
    (FontStyle::BOLD, "bold"),
    (FontStyle::ITALIC, "italic"),
    (FontStyle::UNDERLINE, "underline"),
    (FontStyle::STRIKE_THROUGH, "strike-through"),
];

/// A resolved font: family, point size and style.
#[derive(Clone, Debug, PartialEq)]
pub struct FontDescription {
    pub name: String,
    pub size: f64,
    pub style: FontStyle,
}

impl FontDescription {
    #[inline]
    pub fn new(name: impl Into<String>, size: f64, style: FontStyle) -> Self {
        Self {
            name: name.into(),
            size,
            style,
        }
    }
}

/// Cached font of a `font` entry.
#[derive(Debug, Default)]
pub struct FontState {
    cached: RefCell<Option<Rc<FontDescription>>>,
}

impl FontState {
    #[inline]
    pub fn invalidate(&self) {
        self.cached.replace(None);
    }
}

/// Leading decimal integer of `text`, zero when there is none.
fn leading_integer(text: &str) -> i32 {
    let trimmed = text.trim_start();
    let digits_end = trimmed
        .char_indices()
        .find(|&(position, character)| {
            !(character.is_ascii_digit() || (position == 0 && matches!(character, '+' | '-')))
        })
        .map_or(trimmed.len(), |(position, _)| position);
    trimmed[..digits_end].parse().unwrap_or(0)
}

impl DescriptionNode {
    /// Resolved font of a font entry; absent without a `font-name`.
    pub fn font(&self) -> Option<Rc<FontDescription>> {
        let NodeKind::Font(state) = &self.kind else {
            return None;
        };
        if let Some(font) = state.cached.borrow().as_ref() {
            return Some(Rc::clone(font));
        }
        let family = self.attributes.get(FONT_NAME)?;
        let size = self
            .attributes
            .get(SIZE)
            .map_or(DEFAULT_SIZE, |text| f64::from(leading_integer(text)));
        let mut style = FontStyle::empty();
        for (flag, attribute) in STYLE_ATTRIBUTES {
            if self.attributes.get(attribute) == Some("true") {
                style.insert(flag);
            }
        }
        let font = Rc::new(FontDescription::new(family, size, style));
        state.cached.replace(Some(Rc::clone(&font)));
        Some(font)
    }

    /// Rewrite the entry from `font`, keeping the entry name and alternative names.
    pub fn set_font(&mut self, font: Rc<FontDescription>) {
        let NodeKind::Font(state) = &self.kind else {
            return;
        };
        let alternatives = self.attributes.remove(ALTERNATIVE_NAMES);
        self.attributes.retain_only(NAME_ATTRIBUTE);
        self.attributes.set(FONT_NAME, font.name.clone());
        self.attributes.set(SIZE, format_double(font.size));
        for (flag, attribute) in STYLE_ATTRIBUTES {
            if font.style.contains(flag) {
                self.attributes.set(attribute, "true");
            }
        }
        if let Some(names) = alternatives {
            self.attributes.set(ALTERNATIVE_NAMES, names);
        }
        state.cached.replace(Some(font));
    }

    /// Raw comma separated list of fallback families.
    #[inline]
    pub fn alternative_font_names(&self) -> Option<&str> {
        self.attributes.get(ALTERNATIVE_NAMES)
    }

    /// Fallback families with surrounding whitespace removed.
    pub fn alternative_font_name_list(&self) -> Vec<String> {
        self.attributes
            .get_string_array(ALTERNATIVE_NAMES)
            .unwrap_or_default()
            .iter()
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Store the fallback list; an empty list removes the attribute.
    pub fn set_alternative_font_names(&mut self, names: &str) {
        if names.is_empty() {
            self.attributes.remove(ALTERNATIVE_NAMES);
        } else {
            self.attributes.set(ALTERNATIVE_NAMES, names);
        }
    }
}
