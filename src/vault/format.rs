//! Vault file format: an XML document read and written whole.
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <vaults master-key="">
//!   <vault name="work" default="yes">
//!     <site name="example.com">
//!       <record>
//!         <record-field name="login">alice</record-field>
//!         <record-field name="password">hunter2</record-field>
//!       </record>
//!     </site>
//!   </vault>
//! </vaults>
//! ```
//!
//! - **`vaults`**: document root, carries the `master-key` attribute.
//! - **`vault`**: `name` is unique; at most one carries `default="yes"`.
//! - **`site`**: `name` is unique within its vault.
//! - **`record`**: ordered, addressed by 1-based position.
//! - **`record-field`**: `name` attribute, text content is the value.

use std::fs;
use std::io::Write;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::tree::{FieldNode, RecordNode, SiteNode, VaultNode, VaultsDocument};
use crate::errors::{GpamError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Written into an empty vault file by `VaultStore::initialize`.
pub const SKELETON: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                            <vaults master-key=\"\">\n\
                            </vaults>\n";

/// Value of the `default` attribute on the default vault.
pub const DEFAULT_MARKER: &str = "yes";

const ROOT: &str = "vaults";
const VAULT: &str = "vault";
const SITE: &str = "site";
const RECORD: &str = "record";
const FIELD: &str = "record-field";

const ATTR_NAME: &str = "name";
const ATTR_DEFAULT: &str = "default";
const ATTR_MASTER_KEY: &str = "master-key";

// ---------------------------------------------------------------------------
// Disk I/O
// ---------------------------------------------------------------------------

/// Read and parse the vault file at `path`.
pub fn read_document(path: &Path) -> Result<VaultsDocument> {
    let xml = fs::read_to_string(path).map_err(|source| GpamError::Access {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&xml)
}

/// Serialize `doc` and write it to `path` **atomically**.
///
/// The document is written to a temp file in the same directory and then
/// renamed over the target, so readers never see a half-written file.
pub fn write_document(path: &Path, doc: &VaultsDocument) -> Result<()> {
    let xml = render_document(doc)?;
    write_atomic(path, xml.as_bytes())
}

/// Write raw bytes via temp-file + rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    let access = |source| GpamError::Access {
        path: path.to_path_buf(),
        source,
    };
    // A stale temp file would keep its old mode; start from a fresh one.
    match fs::remove_file(&tmp_path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(access(e)),
        _ => {}
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(&tmp_path).map_err(access)?;
    file.write_all(bytes).map_err(access)?;
    file.sync_all().map_err(access)?;
    drop(file);

    fs::rename(&tmp_path, path).map_err(access)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a vault document from XML text.
pub fn parse_document(xml: &str) -> Result<VaultsDocument> {
    let mut reader = Reader::from_str(xml);
    let mut builder = TreeBuilder::default();

    loop {
        match reader.read_event().map_err(invalid)? {
            Event::Start(e) => {
                let level = builder.open(&e)?;
                builder.stack.push(level);
            }
            Event::Empty(e) => {
                builder.open(&e)?;
            }
            Event::End(_) => {
                builder.stack.pop();
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(invalid)?;
                builder.text(&text)?;
            }
            Event::CData(c) => {
                builder.text(&String::from_utf8_lossy(&c))?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    builder.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Vaults,
    Vault,
    Site,
    Record,
    Field,
}

/// Builds the typed tree from a stream of XML events.
#[derive(Default)]
struct TreeBuilder {
    doc: Option<VaultsDocument>,
    stack: Vec<Level>,
}

impl TreeBuilder {
    /// Handle an opening (or self-closing) tag and return its level.
    fn open(&mut self, e: &BytesStart<'_>) -> Result<Level> {
        let parent = self.stack.last().copied();
        let tag = e.name();
        let tag = tag.as_ref();

        match parent {
            None if tag == ROOT.as_bytes() => {
                if self.doc.is_some() {
                    return Err(invalid("more than one <vaults> root"));
                }
                self.doc = Some(VaultsDocument {
                    master_key: attribute(e, ATTR_MASTER_KEY)?.unwrap_or_default(),
                    vaults: Vec::new(),
                });
                Ok(Level::Vaults)
            }
            Some(Level::Vaults) if tag == VAULT.as_bytes() => {
                let vault = VaultNode {
                    name: required_attribute(e, ATTR_NAME)?,
                    is_default: attribute(e, ATTR_DEFAULT)?.as_deref() == Some(DEFAULT_MARKER),
                    sites: Vec::new(),
                };
                self.doc_mut()?.vaults.push(vault);
                Ok(Level::Vault)
            }
            Some(Level::Vault) if tag == SITE.as_bytes() => {
                let site = SiteNode {
                    name: required_attribute(e, ATTR_NAME)?,
                    records: Vec::new(),
                };
                self.current_vault()?.sites.push(site);
                Ok(Level::Site)
            }
            Some(Level::Site) if tag == RECORD.as_bytes() => {
                self.current_site()?.records.push(RecordNode::default());
                Ok(Level::Record)
            }
            Some(Level::Record) if tag == FIELD.as_bytes() => {
                let field = FieldNode {
                    name: required_attribute(e, ATTR_NAME)?,
                    value: String::new(),
                };
                self.current_record()?.fields.push(field);
                Ok(Level::Field)
            }
            _ => Err(invalid(format!(
                "unexpected element <{}>",
                String::from_utf8_lossy(tag)
            ))),
        }
    }

    /// Text only matters inside `<record-field>`.
    fn text(&mut self, text: &str) -> Result<()> {
        if self.stack.last() == Some(&Level::Field) {
            let field = self
                .current_record()?
                .fields
                .last_mut()
                .ok_or_else(|| invalid("text outside of a record-field"))?;
            field.value.push_str(text);
        }
        Ok(())
    }

    fn finish(self) -> Result<VaultsDocument> {
        if !self.stack.is_empty() {
            return Err(invalid("unexpected end of document"));
        }
        self.doc.ok_or_else(|| invalid("missing <vaults> root"))
    }

    fn doc_mut(&mut self) -> Result<&mut VaultsDocument> {
        self.doc
            .as_mut()
            .ok_or_else(|| invalid("missing <vaults> root"))
    }

    fn current_vault(&mut self) -> Result<&mut VaultNode> {
        self.doc_mut()?
            .vaults
            .last_mut()
            .ok_or_else(|| invalid("site outside of a vault"))
    }

    fn current_site(&mut self) -> Result<&mut SiteNode> {
        self.current_vault()?
            .sites
            .last_mut()
            .ok_or_else(|| invalid("record outside of a site"))
    }

    fn current_record(&mut self) -> Result<&mut RecordNode> {
        self.current_site()?
            .records
            .last_mut()
            .ok_or_else(|| invalid("record-field outside of a record"))
    }
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(invalid)?;
        if attr.key.as_ref() == key.as_bytes() {
            let value = attr.unescape_value().map_err(invalid)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn required_attribute(e: &BytesStart<'_>, key: &str) -> Result<String> {
    attribute(e, key)?.ok_or_else(|| {
        invalid(format!(
            "<{}> is missing the '{key}' attribute",
            String::from_utf8_lossy(e.name().as_ref())
        ))
    })
}

fn invalid(e: impl std::fmt::Display) -> GpamError {
    GpamError::InvalidDocument(e.to_string())
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render the document as indented XML.
pub fn render_document(doc: &VaultsDocument) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    let mut root = BytesStart::new(ROOT);
    root.push_attribute((ATTR_MASTER_KEY, doc.master_key.as_str()));
    emit(&mut writer, Event::Start(root))?;

    for vault in &doc.vaults {
        let mut tag = BytesStart::new(VAULT);
        tag.push_attribute((ATTR_NAME, vault.name.as_str()));
        if vault.is_default {
            tag.push_attribute((ATTR_DEFAULT, DEFAULT_MARKER));
        }
        if vault.sites.is_empty() {
            emit(&mut writer, Event::Empty(tag))?;
            continue;
        }
        emit(&mut writer, Event::Start(tag))?;
        for site in &vault.sites {
            render_site(&mut writer, site)?;
        }
        emit(&mut writer, Event::End(BytesEnd::new(VAULT)))?;
    }

    emit(&mut writer, Event::End(BytesEnd::new(ROOT)))?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(|e| GpamError::Serialization(e.to_string()))
}

fn render_site(writer: &mut Writer<Vec<u8>>, site: &SiteNode) -> Result<()> {
    let mut tag = BytesStart::new(SITE);
    tag.push_attribute((ATTR_NAME, site.name.as_str()));
    if site.records.is_empty() {
        return emit(writer, Event::Empty(tag));
    }

    emit(writer, Event::Start(tag))?;
    for record in &site.records {
        if record.fields.is_empty() {
            emit(writer, Event::Empty(BytesStart::new(RECORD)))?;
            continue;
        }
        emit(writer, Event::Start(BytesStart::new(RECORD)))?;
        for field in &record.fields {
            let mut tag = BytesStart::new(FIELD);
            tag.push_attribute((ATTR_NAME, field.name.as_str()));
            if field.value.is_empty() {
                emit(writer, Event::Empty(tag))?;
            } else {
                emit(writer, Event::Start(tag))?;
                emit(writer, Event::Text(BytesText::new(&field.value)))?;
                emit(writer, Event::End(BytesEnd::new(FIELD)))?;
            }
        }
        emit(writer, Event::End(BytesEnd::new(RECORD)))?;
    }
    emit(writer, Event::End(BytesEnd::new(SITE)))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| GpamError::Serialization(e.to_string()))
}
