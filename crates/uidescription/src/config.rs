//! Runtime limits and save defaults for description documents.
//!
//! Configuration can be loaded from environment variables or constructed directly.

use std::env;

const DEFAULT_MAX_EXPRESSION_DEPTH: usize = 32;
const DEFAULT_MAX_TEMPLATE_DEPTH: usize = 64;

/// Settings shared by every operation of a [`UiDescription`](crate::UiDescription).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescriptionConfig {
    /// Nesting limit for expressions that reference other tags or variables
    pub max_expression_depth: usize,
    /// Nesting limit for templates instantiated from other templates
    pub max_template_depth: usize,
    /// Whether `save` embeds bitmap files when no flags are given explicitly
    pub embed_bitmaps: bool,
    /// Whether the `.old` backup written by `save` is kept after success
    pub keep_backup: bool,
}

impl DescriptionConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `UIDESC_MAX_EXPRESSION_DEPTH`: expression nesting limit (default: 32)
    /// - `UIDESC_MAX_TEMPLATE_DEPTH`: template nesting limit (default: 64)
    /// - `UIDESC_EMBED_BITMAPS`: set to "1" to embed bitmaps on save
    /// - `UIDESC_KEEP_BACKUP`: set to "1" to keep the backup file after saving
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        let max_expression_depth = env::var("UIDESC_MAX_EXPRESSION_DEPTH")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_EXPRESSION_DEPTH)
            .max(1);
        let max_template_depth = env::var("UIDESC_MAX_TEMPLATE_DEPTH")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_TEMPLATE_DEPTH)
            .max(1);
        let embed_bitmaps = env::var("UIDESC_EMBED_BITMAPS").ok().as_deref() == Some("1");
        let keep_backup = env::var("UIDESC_KEEP_BACKUP").ok().as_deref() == Some("1");
        Self {
            max_expression_depth,
            max_template_depth,
            embed_bitmaps,
            keep_backup,
        }
    }
}

impl Default for DescriptionConfig {
    #[inline]
    fn default() -> Self {
        Self {
            max_expression_depth: DEFAULT_MAX_EXPRESSION_DEPTH,
            max_template_depth: DEFAULT_MAX_TEMPLATE_DEPTH,
            embed_bitmaps: false,
            keep_backup: false,
        }
    }
}
