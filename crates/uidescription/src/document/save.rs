//! Writing a description back to disk.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use super::UiDescription;
use crate::node::{DescriptionNode, NodeKind};
use crate::resources::Catalog;
use crate::writer::write_document;

bitflags::bitflags! {
    /// Options for [`UiDescription::save`].
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct SaveFlags: u8 {
        /// Store bitmap files as base64 `data` children
        const EMBED_BITMAPS         = 0b01;
        /// Also write a Windows resource script listing every bitmap
        const WINDOWS_RESOURCE_FILE = 0b10;
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

impl UiDescription {
    /// Flags implied by the document's configuration.
    pub fn default_save_flags(&self) -> SaveFlags {
        if self.config.embed_bitmaps {
            SaveFlags::EMBED_BITMAPS
        } else {
            SaveFlags::empty()
        }
    }

    /// Embed or strip inline bitmap data according to `flags`.
    fn prepare_bitmaps(&mut self, flags: SaveFlags) {
        if self.shared_resources.is_some() {
            return;
        }
        let base_dir = self.base_dir().map(Path::to_path_buf);
        let Some(bitmaps) = self.existing_catalog_mut(Catalog::Bitmaps) else {
            return;
        };
        bitmaps.children_mut().for_each_mut(|node| {
            if !matches!(node.kind(), NodeKind::Bitmap(_)) {
                return;
            }
            if flags.contains(SaveFlags::EMBED_BITMAPS) {
                node.embed_inline_data(base_dir.as_deref());
            } else {
                node.remove_inline_data();
            }
        });
    }

    /// Write the document to `out`.
    ///
    /// Listeners see `before_save` first. The root is stamped with `version="1"`.
    ///
    /// # Errors
    /// Fails when nothing was parsed or `out` fails.
    pub fn save_to_writer<W: Write>(&mut self, out: W, flags: SaveFlags) -> io::Result<()> {
        self.notify(|listener, description| listener.before_save(description));
        self.prepare_bitmaps(flags);
        let Some(root) = self.root.as_mut() else {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "no document to save"));
        };
        root.attributes_mut().set("version", "1");
        write_document(out, root)
    }

    /// The document as XML text.
    ///
    /// # Errors
    /// See [`Self::save_to_writer`].
    pub fn save_to_string(&mut self, flags: SaveFlags) -> io::Result<String> {
        let mut out = Vec::new();
        self.save_to_writer(&mut out, flags)?;
        String::from_utf8(out).map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))
    }

    /// Save the document to `path`.
    ///
    /// An existing file is first moved to `<path>.old`, which is removed again once the
    /// new file is complete unless the configuration keeps backups. With
    /// [`SaveFlags::WINDOWS_RESOURCE_FILE`] a resource script is written next to the file,
    /// named by replacing the extension with `rc`.
    ///
    /// # Errors
    /// Fails when the backup, the document or the resource script cannot be written.
    pub fn save(&mut self, path: impl AsRef<Path>, flags: SaveFlags) -> anyhow::Result<()> {
        let path = path.as_ref();
        let backup = if path.exists() {
            let backup = with_suffix(path, ".old");
            fs::rename(path, &backup)
                .with_context(|| format!("failed to back up {}", path.display()))?;
            Some(backup)
        } else {
            None
        };
        let file =
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        self.save_to_writer(BufWriter::new(file), flags)
            .with_context(|| format!("failed to write {}", path.display()))?;
        if flags.contains(SaveFlags::WINDOWS_RESOURCE_FILE) && path.extension().is_some() {
            let rc_path = path.with_extension("rc");
            self.save_windows_resource_file(&rc_path)?;
        }
        if let Some(backup) = backup
            && !self.config.keep_backup
        {
            fs::remove_file(&backup)
                .with_context(|| format!("failed to remove {}", backup.display()))?;
        }
        log::debug!(target: "uidescription", "saved {}", path.display());
        Ok(())
    }

    /// Write a resource script with one `PNG` line per bitmap path.
    ///
    /// Skipped when bitmaps come from shared resources.
    fn save_windows_resource_file(&self, path: &Path) -> anyhow::Result<()> {
        if self.shared_resources.is_some() {
            return Ok(());
        }
        let mut script = String::new();
        if let Some(bitmaps) = self.catalog(Catalog::Bitmaps) {
            for bitmap_path in bitmaps.children().iter().filter_map(DescriptionNode::bitmap_path) {
                if !bitmap_path.is_empty() {
                    script.push_str(&format!("{bitmap_path}\t PNG \"{bitmap_path}\"\r"));
                }
            }
        }
        fs::write(path, script).with_context(|| format!("failed to write {}", path.display()))
    }
}
