//! Serialising description trees back to XML.

use std::io::{self, Write};

use crate::node::DescriptionNode;

/// Characters per data line before the writer breaks and re-indents.
const DATA_LINE_LENGTH: usize = 82;

const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Writes a node tree with one tab of indentation per level.
pub struct DocumentWriter<W> {
    out: W,
    level: usize,
}

impl<W: Write> DocumentWriter<W> {
    #[inline]
    pub const fn new(out: W) -> Self {
        Self { out, level: 0 }
    }

    /// Write the XML header followed by `root`.
    ///
    /// # Errors
    /// Propagates failures of the underlying writer.
    pub fn write(&mut self, root: &DescriptionNode) -> io::Result<()> {
        self.level = 0;
        self.out.write_all(XML_HEADER.as_bytes())?;
        self.write_node(root)?;
        self.out.flush()
    }

    /// Give back the underlying writer.
    #[inline]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn indent(&mut self) -> io::Result<()> {
        for _ in 0..self.level {
            self.out.write_all(b"\t")?;
        }
        Ok(())
    }

    fn write_node(&mut self, node: &DescriptionNode) -> io::Result<()> {
        if !node.is_written() {
            return Ok(());
        }
        let has_children = node.has_written_children();
        self.indent()?;
        if node.is_comment() {
            return writeln!(self.out, "<!--{}-->", node.data());
        }
        write!(self.out, "<{}", node.name())?;
        for (key, value) in node.attributes().sorted() {
            if !value.is_empty() {
                write!(self.out, " {key}=\"{}\"", escape_attribute(value))?;
            }
        }
        if !has_children && node.data().is_empty() {
            return self.out.write_all(b"/>\n");
        }
        self.out.write_all(b">\n")?;
        self.level += 1;
        if !node.data().is_empty() {
            self.write_data(node.data())?;
        }
        for child in node.children() {
            self.write_node(child)?;
        }
        self.level -= 1;
        self.indent()?;
        writeln!(self.out, "</{}>", node.name())
    }

    fn write_data(&mut self, data: &str) -> io::Result<()> {
        self.indent()?;
        let mut line_length = 0;
        let mut buffer = [0; 4];
        for character in data.chars() {
            let text = match character {
                '&' => "&amp;",
                '<' => "&lt;",
                '>' => "&gt;",
                other => &*other.encode_utf8(&mut buffer),
            };
            self.out.write_all(text.as_bytes())?;
            line_length += 1;
            if line_length == DATA_LINE_LENGTH {
                self.out.write_all(b"\n")?;
                self.indent()?;
                line_length = 0;
            }
        }
        self.out.write_all(b"\n")
    }
}

/// Replace the five XML special characters by their entities.
pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for character in value.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Write `root` to `out` as a complete document.
///
/// # Errors
/// Propagates failures of `out`.
pub fn write_document<W: Write>(out: W, root: &DescriptionNode) -> io::Result<()> {
    DocumentWriter::new(out).write(root)
}
