//! Parsing, writing and saving whole description documents.

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use anyhow::{Context as _, Result, ensure};
    use uidescription::writer::write_document;
    use uidescription::{Color, DescriptionConfig, ParseError, SaveFlags, UiDescription};

    const FULL: &str = include_str!("fixtures/full.uidesc");

    fn init_logging() {
        if let Err(error) = env_logger::builder().is_test(true).try_init() {
            log::trace!(target: "uidescription", "logger already installed: {error}");
        }
    }

    /// Parse the full fixture into a fresh document.
    ///
    /// # Errors
    /// Returns an error if the fixture does not parse.
    fn full_document() -> Result<UiDescription> {
        let mut description = UiDescription::new();
        description.parse_str(FULL)?;
        Ok(description)
    }

    /// Saving an unmodified document with embedded bitmaps reproduces the input.
    ///
    /// # Errors
    /// Returns an error if parsing or writing fails.
    #[test]
    fn saving_full_document_is_byte_identical() -> Result<()> {
        init_logging();
        let mut description = full_document()?;
        let saved = description.save_to_string(SaveFlags::EMBED_BITMAPS)?;
        assert_eq!(saved, FULL);
        Ok(())
    }

    /// Writing a parsed tree and parsing the output gives an equal tree.
    ///
    /// # Errors
    /// Returns an error if any step fails.
    #[test]
    fn written_tree_parses_back_equal() -> Result<()> {
        init_logging();
        let description = full_document()?;
        let root = description.root().context("no root")?;
        let mut out = Vec::new();
        write_document(&mut out, root)?;
        let mut reparsed = UiDescription::new();
        reparsed.parse_bytes(&out)?;
        let reparsed_root = reparsed.root().context("no reparsed root")?;
        assert!(reparsed_root.exported() == root.exported());
        Ok(())
    }

    #[test]
    fn unknown_top_level_element_fails_and_keeps_partial_tree() {
        init_logging();
        let mut description = UiDescription::new();
        let result = description
            .parse_str("<vstgui-ui-description><unknown-top-level/></vstgui-ui-description>");
        assert!(
            matches!(result, Err(ParseError::Stopped { element }) if element == "unknown-top-level")
        );
        assert!(description.parsed());
        assert!(!description.has_font_name("~ SystemFont"));
    }

    #[test]
    fn input_without_root_installs_empty_document() {
        init_logging();
        let mut description = UiDescription::new();
        let result = description.parse_str("<!-- nothing here -->");
        assert!(matches!(result, Err(ParseError::Empty)));
        assert!(description.parsed());
        assert!(description.has_font_name("~ SystemFont"));
        assert!(description.has_color_name("~ TransparentCColor"));
        assert!(description.collect_template_view_names().is_empty());
    }

    /// A second parse leaves the first document in place.
    ///
    /// # Errors
    /// Returns an error if the first parse fails.
    #[test]
    fn parsing_twice_keeps_first_document() -> Result<()> {
        init_logging();
        let mut description = full_document()?;
        description.parse_str("<vstgui-ui-description><template name=\"other\"/></vstgui-ui-description>")?;
        assert_eq!(description.collect_template_view_names(), ["main"]);
        Ok(())
    }

    /// Default entries are never written.
    ///
    /// # Errors
    /// Returns an error if parsing or writing fails.
    #[test]
    fn default_entries_are_not_exported() -> Result<()> {
        init_logging();
        let mut description = UiDescription::new();
        description.parse_str("<vstgui-ui-description/>")?;
        assert!(description.has_color_name("~ BlackCColor"));
        let saved = description.save_to_string(SaveFlags::empty())?;
        ensure!(!saved.contains("SystemFont"), "default font written: {saved}");
        ensure!(!saved.contains("CColor"), "default color written: {saved}");
        ensure!(saved.contains("version=\"1\""), "missing version: {saved}");
        Ok(())
    }

    /// Saving without embedding strips inline bitmap data.
    ///
    /// # Errors
    /// Returns an error if parsing or writing fails.
    #[test]
    fn saving_without_embedding_strips_data() -> Result<()> {
        init_logging();
        let mut description = full_document()?;
        let saved = description.save_to_string(SaveFlags::empty())?;
        ensure!(!saved.contains("<data"), "data kept: {saved}");
        ensure!(saved.contains("<bitmap name=\"knob\" path=\"knob.png\"/>"), "{saved}");
        Ok(())
    }

    /// `save` backs up the previous file, removes the backup and writes the resource script.
    ///
    /// # Errors
    /// Returns an error if any file operation fails.
    #[test]
    fn save_replaces_file_and_writes_resource_script() -> Result<()> {
        init_logging();
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("editor.uidesc");
        fs::write(&path, "previous")?;
        let mut description = full_document()?;
        description.save(
            &path,
            SaveFlags::EMBED_BITMAPS | SaveFlags::WINDOWS_RESOURCE_FILE,
        )?;
        assert_eq!(fs::read_to_string(&path)?, FULL);
        assert!(!dir.path().join("editor.uidesc.old").exists());
        let script = fs::read_to_string(dir.path().join("editor.rc"))?;
        assert_eq!(
            script,
            "knob.png\t PNG \"knob.png\"\rknob#2x.png\t PNG \"knob#2x.png\"\r"
        );
        Ok(())
    }

    /// With `keep_backup` the previous file survives as `<path>.old`.
    ///
    /// # Errors
    /// Returns an error if any file operation fails.
    #[test]
    fn save_keeps_backup_when_configured() -> Result<()> {
        init_logging();
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("editor.uidesc");
        fs::write(&path, "previous")?;
        let config = DescriptionConfig {
            keep_backup: true,
            ..DescriptionConfig::default()
        };
        let mut description = UiDescription::with_config(config);
        description.parse_str(FULL)?;
        description.save(&path, description.default_save_flags())?;
        assert_eq!(
            fs::read_to_string(dir.path().join("editor.uidesc.old"))?,
            "previous"
        );
        assert!(!dir.path().join("editor.rc").exists());
        Ok(())
    }

    fn write_icon(dir: &Path) -> Result<()> {
        fs::write(dir.join("icon.png"), [1u8, 2, 3])?;
        Ok(())
    }

    /// Embedding reads bitmap files relative to the document's directory.
    ///
    /// # Errors
    /// Returns an error if any file operation fails.
    #[test]
    fn embedding_reads_files_next_to_the_document() -> Result<()> {
        init_logging();
        let dir = tempfile::tempdir()?;
        write_icon(dir.path())?;
        let path = dir.path().join("icons.uidesc");
        fs::write(
            &path,
            "<vstgui-ui-description><bitmaps><bitmap name=\"icon\" path=\"icon.png\"/>\
             </bitmaps></vstgui-ui-description>",
        )?;
        let mut description = UiDescription::new();
        description.parse_file(&path)?;
        assert_eq!(description.file_path(), Some(path.as_path()));
        let saved = description.save_to_string(SaveFlags::EMBED_BITMAPS)?;
        ensure!(saved.contains("<data encoding=\"base64\">\n\t\t\t\tAQID\n\t\t\t</data>"), "{saved}");
        Ok(())
    }

    #[test]
    fn missing_file_reports_path() {
        init_logging();
        let mut description = UiDescription::new();
        let result = description.parse_file("/nonexistent/editor.uidesc");
        let message = result.err().map(|error| error.to_string()).unwrap_or_default();
        assert!(message.contains("/nonexistent/editor.uidesc"), "{message}");
        assert!(!description.parsed());
    }

    /// Catalogs that hold only the built-in defaults are not written.
    ///
    /// # Errors
    /// Returns an error if parsing or writing fails.
    #[test]
    fn minimal_document_saves_unchanged() -> Result<()> {
        init_logging();
        let minimal = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<vstgui-ui-description version=\"1\"/>\n";
        let mut description = UiDescription::new();
        description.parse_str(minimal)?;
        assert!(description.has_font_name("~ SystemFont"));
        assert_eq!(description.save_to_string(SaveFlags::empty())?, minimal);

        description.change_color("Added", Color::RED);
        let saved = description.save_to_string(SaveFlags::empty())?;
        ensure!(saved.contains("<colors>"), "{saved}");
        ensure!(!saved.contains("<fonts"), "{saved}");
        description.remove_color("Added");
        assert_eq!(description.save_to_string(SaveFlags::empty())?, minimal);
        Ok(())
    }

    /// Entity and character references in element text survive a save.
    ///
    /// # Errors
    /// Returns an error if parsing or writing fails.
    #[test]
    fn escaped_text_round_trips() -> Result<()> {
        init_logging();
        let mut description = UiDescription::new();
        description.parse_str(
            "<vstgui-ui-description><template name=\"t\"><note>a&amp;b&lt;c&#62;d</note>\
             </template></vstgui-ui-description>",
        )?;
        let note = description
            .root()
            .and_then(|root| root.children().find_by_name("template"))
            .and_then(|template| template.children().find_by_name("note"))
            .context("note")?;
        assert_eq!(note.data(), "a&b<c>d");
        let saved = description.save_to_string(SaveFlags::empty())?;
        ensure!(saved.contains("\t\t\ta&amp;b&lt;c&gt;d\n"), "{saved}");

        let mut reparsed = UiDescription::new();
        reparsed.parse_str(&saved)?;
        let reparsed_root = reparsed.root().context("no reparsed root")?;
        let root = description.root().context("no root")?;
        assert!(reparsed_root.exported() == root.exported());
        Ok(())
    }

    /// Attributes with empty values are not written, so they are absent after reparsing.
    ///
    /// # Errors
    /// Returns an error if parsing or writing fails.
    #[test]
    fn empty_attribute_values_are_dropped_on_save() -> Result<()> {
        init_logging();
        let mut description = UiDescription::new();
        description.parse_str(
            "<vstgui-ui-description><template name=\"t\" tooltip=\"\"/></vstgui-ui-description>",
        )?;
        assert!(
            description
                .get_view_attributes("t")
                .is_some_and(|attributes| attributes.has("tooltip"))
        );
        let saved = description.save_to_string(SaveFlags::empty())?;
        ensure!(saved.contains("<template name=\"t\"/>"), "{saved}");
        let mut reparsed = UiDescription::new();
        reparsed.parse_str(&saved)?;
        assert!(
            reparsed
                .get_view_attributes("t")
                .is_some_and(|attributes| !attributes.has("tooltip"))
        );
        Ok(())
    }

    #[test]
    fn default_save_flags_follow_configuration() {
        let config = DescriptionConfig {
            embed_bitmaps: true,
            ..DescriptionConfig::default()
        };
        assert_eq!(
            UiDescription::with_config(config).default_save_flags(),
            SaveFlags::EMBED_BITMAPS
        );
        assert_eq!(UiDescription::new().default_save_flags(), SaveFlags::empty());
    }
}
