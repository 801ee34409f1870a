//! Descriptor reading.

use crate::ArcadeDescriptor;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use quick_xml::Reader;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use std::path::Path;
use tracing::instrument;

const CORE_VERSION_TAG: &[u8] = b"mameversion";
const CORE_ID_TAG: &[u8] = b"rbf";
const ROM_TAG: &[u8] = b"rom";
const ZIP_ATTRIBUTE: &[u8] = b"zip";
const ARCHIVE_SEPARATOR: char = '|';

/// Reads and parses the descriptor at `path`.
///
/// Invalid UTF-8 is replaced with U+FFFD before parsing. Duplicate
/// declarations are logged against this span (and therefore the path).
#[instrument(fields(path = %path.display()))]
pub fn read(path: &Path) -> Result<ArcadeDescriptor> {
    let bytes = std::fs::read(path).or_raise(|| ErrorKind::Unreadable(path.to_path_buf()))?;
    parse(&String::from_utf8_lossy(&bytes))
}

/// Parses a descriptor document.
///
/// # Examples
///
/// ```rust
/// let descriptor = arcadedb_mra::parse(r#"
///     <misterromdescription>
///         <mameversion>0220</mameversion>
///         <rbf>CPS2</rbf>
///         <rom index="0" zip="Foo.zip|hbmame/bar.zip" md5="None"/>
///     </misterromdescription>
/// "#).unwrap();
///
/// assert_eq!(descriptor.core_version.as_deref(), Some("0220"));
/// assert_eq!(descriptor.core_id.as_deref(), Some("cps2"));
/// assert_eq!(descriptor.archive_names().collect::<Vec<_>>(), ["foo.zip", "hbmame/bar.zip"]);
/// ```
pub fn parse(document: &str) -> Result<ArcadeDescriptor> {
    let lowered = document.to_lowercase();
    let mut reader = Reader::from_str(&lowered);
    reader.config_mut().check_end_names = true;
    let mut parser = Parser::default();
    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => exn::bail!(ErrorKind::Malformed(format!("{e} at byte {}", reader.error_position()))),
        };
        match event {
            Event::Start(element) => {
                parser.open(&element)?;
                parser.depth += 1;
            },
            Event::Empty(element) => {
                parser.open(&element)?;
                parser.flush();
            },
            Event::End(_) => parser.close()?,
            Event::Text(text) => {
                let text = text.unescape().or_raise(|| ErrorKind::Malformed("invalid character data".to_string()))?;
                parser.text(&text)?;
            },
            Event::CData(data) => parser.text(&String::from_utf8_lossy(&data))?,
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctype.
            _ => {},
        }
    }
    parser.finish()
}

#[derive(Clone, Copy, Debug)]
enum Field {
    CoreVersion,
    CoreId,
}

impl Field {
    fn tag(self) -> &'static str {
        match self {
            Field::CoreVersion => "mameversion",
            Field::CoreId => "rbf",
        }
    }
}

#[derive(Default)]
struct Parser {
    descriptor: ArcadeDescriptor,
    depth: usize,
    seen_root: bool,
    /// Field whose element is open, plus the text collected so far.
    pending: Option<(Field, String)>,
}

impl Parser {
    fn open(&mut self, element: &BytesStart) -> Result<()> {
        self.flush();
        if self.depth == 0 {
            if self.seen_root {
                exn::bail!(ErrorKind::Malformed("content after the root element".to_string()));
            }
            self.seen_root = true;
        }
        let name = element.name();
        for attribute in element.attributes() {
            let attribute = attribute.or_raise(|| ErrorKind::Malformed("invalid attribute".to_string()))?;
            if name.as_ref() == ROM_TAG && attribute.key.as_ref().trim_ascii() == ZIP_ATTRIBUTE {
                self.archives(&attribute)?;
            }
        }
        match name.as_ref() {
            CORE_VERSION_TAG => self.pending = Some((Field::CoreVersion, String::new())),
            CORE_ID_TAG => self.pending = Some((Field::CoreId, String::new())),
            _ => {},
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.flush();
        if self.depth == 0 {
            exn::bail!(ErrorKind::Malformed("closing tag without an open element".to_string()));
        }
        self.depth -= 1;
        Ok(())
    }

    /// Adds the archive names listed in a `zip` attribute.
    fn archives(&mut self, attribute: &Attribute) -> Result<()> {
        let value = attribute
            .unescape_value()
            .or_raise(|| ErrorKind::Malformed("invalid attribute value".to_string()))?;
        let names = value.split(ARCHIVE_SEPARATOR).map(str::trim).filter(|name| !name.is_empty());
        self.descriptor.archives.extend(names.map(ToString::to_string));
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<()> {
        if self.depth == 0 {
            if !text.trim().is_empty() {
                exn::bail!(ErrorKind::Malformed("text outside the root element".to_string()));
            }
            return Ok(());
        }
        if let Some((_, collected)) = &mut self.pending {
            collected.push_str(text);
        }
        Ok(())
    }

    /// Commits the text of a pending field once its element closes or a child opens.
    fn flush(&mut self) {
        let Some((field, text)) = self.pending.take() else {
            return;
        };
        let value = text.trim();
        if value.is_empty() {
            return;
        }
        let slot = match field {
            Field::CoreVersion => &mut self.descriptor.core_version,
            Field::CoreId => &mut self.descriptor.core_id,
        };
        if let Some(first) = slot.as_deref() {
            tracing::warn!(tag = field.tag(), first, later = value, "Duplicated tag; keeping first value");
            return;
        }
        *slot = Some(value.to_string());
    }

    fn finish(mut self) -> Result<ArcadeDescriptor> {
        if self.depth > 0 {
            exn::bail!(ErrorKind::Malformed("unclosed element at end of document".to_string()));
        }
        if !self.seen_root {
            exn::bail!(ErrorKind::Malformed("no root element".to_string()));
        }
        self.flush();
        Ok(self.descriptor)
    }
}
