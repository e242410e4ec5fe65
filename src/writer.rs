//! IDMEF writer for rendering element trees to XML.
//!
//! Objects produce [`Element`] trees through [`IdmefElement::to_xml`]; this
//! module turns those trees into text with proper namespace declarations.
//!
//! # Example
//!
//! ```rust
//! use idmef_rs::document::Document;
//! use idmef_rs::objects::{Checksum, ChecksumAlgorithm, File, FileCategory, IdmefElement};
//! use idmef_rs::writer;
//!
//! let file = File::builder("passwd", "/etc", FileCategory::Current)
//!     .data_size(1834)
//!     .add_checksum(Checksum::new("d41d8cd98f00b204e9800998ecf8427e", ChecksumAlgorithm::Md5).unwrap())
//!     .build()
//!     .unwrap();
//!
//! let elem = file.to_xml(&Document::new()).unwrap();
//! let xml = writer::to_string_compact(&elem).unwrap();
//! assert!(xml.contains("<idmef:data-size>1834</idmef:data-size>"));
//! ```
//!
//! [`IdmefElement::to_xml`]: crate::objects::IdmefElement::to_xml

use crate::document::{Element, Node};
use crate::error::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;
use tracing::debug;

/// Configuration options for the IDMEF writer.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Whether to indent the output for readability
    pub indent: bool,
    /// Indentation string (default: two spaces)
    pub indent_string: String,
    /// Whether to include the XML declaration
    pub xml_declaration: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            indent: true,
            indent_string: "  ".to_string(),
            xml_declaration: true,
        }
    }
}

impl WriterConfig {
    /// Creates a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a compact configuration (no indentation).
    pub fn compact() -> Self {
        Self {
            indent: false,
            indent_string: String::new(),
            xml_declaration: true,
        }
    }

    /// Sets whether to indent the output.
    pub fn with_indent(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the indentation string.
    pub fn with_indent_string(mut self, s: impl Into<String>) -> Self {
        self.indent_string = s.into();
        self
    }

    /// Sets whether to emit the XML declaration.
    pub fn with_xml_declaration(mut self, declaration: bool) -> Self {
        self.xml_declaration = declaration;
        self
    }
}

/// Namespace bindings in effect while writing: (prefix, uri).
type Scope = Vec<(Option<String>, String)>;

/// IDMEF XML writer.
///
/// Namespace bindings are declared on the first element that uses them and
/// inherited by descendants.
pub struct IdmefWriter {
    config: WriterConfig,
}

impl IdmefWriter {
    /// Creates a new writer with default configuration.
    pub fn new() -> Self {
        Self {
            config: WriterConfig::default(),
        }
    }

    /// Creates a new writer with the specified configuration.
    pub fn with_config(config: WriterConfig) -> Self {
        Self { config }
    }

    /// Writes an element tree to a string.
    pub fn write_to_string(&self, elem: &Element) -> Result<String> {
        let mut buffer = Vec::new();
        self.write(elem, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Writes an element tree to any Write implementation.
    pub fn write<W: Write>(&self, elem: &Element, writer: W) -> Result<()> {
        let mut xml_writer = self.xml_writer(writer);
        self.write_declaration(&mut xml_writer)?;

        debug!(root = %elem.qualified_name(), "writing IDMEF element");
        self.write_element(&mut xml_writer, elem, &mut Scope::new())
    }

    /// Writes `elems` as children of `container`, producing one document.
    ///
    /// The container is the single root element: its attributes and any
    /// nodes it already holds are written first, followed by `elems` in
    /// order. Namespaces declared on the container are inherited by the
    /// children, so a shared prefix is declared only once.
    pub fn write_collection<'a, W, I>(
        &self,
        container: &Element,
        elems: I,
        writer: W,
    ) -> Result<()>
    where
        W: Write,
        I: IntoIterator<Item = &'a Element>,
    {
        let mut xml_writer = self.xml_writer(writer);
        self.write_declaration(&mut xml_writer)?;

        let name = container.qualified_name();
        debug!(root = %name, "writing IDMEF collection");

        let mut scope = Scope::new();
        let start = Self::start_tag(container, &name, &mut scope);
        xml_writer.write_event(Event::Start(start))?;
        self.write_nodes(&mut xml_writer, container, &mut scope)?;

        let mut count = 0usize;
        for elem in elems {
            self.write_element(&mut xml_writer, elem, &mut scope)?;
            count += 1;
        }
        xml_writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;

        debug!(root = %name, count, "collection written");
        Ok(())
    }

    fn xml_writer<W: Write>(&self, writer: W) -> Writer<W> {
        if self.config.indent {
            let indent_char = self.config.indent_string.bytes().next().unwrap_or(b' ');
            Writer::new_with_indent(writer, indent_char, self.config.indent_string.len())
        } else {
            Writer::new(writer)
        }
    }

    fn write_declaration<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        if self.config.xml_declaration {
            writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
            if self.config.indent {
                writer.get_mut().write_all(b"\n")?;
            }
        }
        Ok(())
    }

    /// Builds the start tag for `elem`, declaring its namespace if the
    /// binding is not already in scope.
    fn start_tag<'n>(elem: &Element, name: &'n str, scope: &mut Scope) -> BytesStart<'n> {
        let mut start = BytesStart::new(name);

        let prefix = elem.prefix().map(str::to_string);
        let namespace = elem.namespace().unwrap_or("").to_string();
        let bound = scope
            .iter()
            .rev()
            .find(|(p, _)| *p == prefix)
            .map(|(_, ns)| ns.as_str())
            .unwrap_or("");

        if bound != namespace {
            let attr = match prefix {
                Some(ref p) => format!("xmlns:{}", p),
                None => "xmlns".to_string(),
            };
            start.push_attribute((attr.as_str(), namespace.as_str()));
            scope.push((prefix, namespace));
        }

        for (attr_name, value) in elem.attributes() {
            start.push_attribute((attr_name.as_str(), value.as_str()));
        }
        start
    }

    /// Writes one element and its subtree.
    fn write_element<W: Write>(
        &self,
        writer: &mut Writer<W>,
        elem: &Element,
        scope: &mut Scope,
    ) -> Result<()> {
        let name = elem.qualified_name();
        let depth = scope.len();
        let start = Self::start_tag(elem, &name, scope);

        if elem.nodes().is_empty() {
            writer.write_event(Event::Empty(start))?;
        } else {
            writer.write_event(Event::Start(start))?;
            self.write_nodes(writer, elem, scope)?;
            writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
        }

        scope.truncate(depth);
        Ok(())
    }

    fn write_nodes<W: Write>(
        &self,
        writer: &mut Writer<W>,
        elem: &Element,
        scope: &mut Scope,
    ) -> Result<()> {
        for node in elem.nodes() {
            match node {
                Node::Element(child) => self.write_element(writer, child, scope)?,
                Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
            }
        }
        Ok(())
    }
}

impl Default for IdmefWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to write an element to a string.
pub fn to_string(elem: &Element) -> Result<String> {
    IdmefWriter::new().write_to_string(elem)
}

/// Convenience function to write an element to a string without indentation.
pub fn to_string_compact(elem: &Element) -> Result<String> {
    IdmefWriter::with_config(WriterConfig::compact()).write_to_string(elem)
}

/// Convenience function to write an element to a writer.
pub fn write<W: Write>(elem: &Element, writer: W) -> Result<()> {
    IdmefWriter::new().write(elem, writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::objects::{
        Checksum, ChecksumAlgorithm, File, FileCategory, IdmefElement, Inode, XMLNS_IDMEF,
    };

    fn sample_file() -> Element {
        File::builder("passwd", "/etc", FileCategory::Current)
            .data_size(1834)
            .inode(Inode::new())
            .add_checksum(Checksum::new("abc", ChecksumAlgorithm::Md5).unwrap())
            .build()
            .unwrap()
            .to_xml(&Document::new())
            .unwrap()
    }

    #[test]
    fn test_write_with_declaration() {
        let xml = to_string(&sample_file()).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<idmef:File xmlns:idmef=\"http://iana.org/idmef\""));
        assert!(xml.contains("<idmef:name>passwd</idmef:name>"));
        assert!(xml.contains("<idmef:data-size>1834</idmef:data-size>"));
        assert!(xml.contains("<idmef:Inode/>"));
        assert!(xml.contains("<idmef:Checksum category=\"md5\">"));
        assert!(xml.trim_end().ends_with("</idmef:File>"));
    }

    #[test]
    fn test_namespace_declared_once() {
        let xml = to_string_compact(&sample_file()).unwrap();
        assert_eq!(xml.matches("xmlns:idmef=").count(), 1);
    }

    #[test]
    fn test_write_compact() {
        let xml = to_string_compact(&sample_file()).unwrap();
        let content_start = xml.find("<idmef:File").unwrap();
        assert!(!xml[content_start..].contains('\n'));
    }

    #[test]
    fn test_indented_output() {
        let xml = to_string(&sample_file()).unwrap();
        assert!(xml.contains("\n  <idmef:name>passwd</idmef:name>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let file = File::new("a<b>&c", "/tmp", FileCategory::Current).unwrap();
        let elem = file.to_xml(&Document::new()).unwrap();
        let xml = to_string_compact(&elem).unwrap();
        assert!(xml.contains("<idmef:name>a&lt;b&gt;&amp;c</idmef:name>"));
    }

    #[test]
    fn test_foreign_namespace_child_is_declared() {
        let doc = Document::new();
        let other = Document::with_prefix("ext", "urn:example:ext").unwrap();

        let mut parent = doc.create_element("File").unwrap();
        parent.append_child(other.text_element("note", "x").unwrap());
        parent.append_child(doc.text_element("name", "y").unwrap());

        let xml = IdmefWriter::with_config(WriterConfig::compact().with_xml_declaration(false))
            .write_to_string(&parent)
            .unwrap();
        assert_eq!(
            xml,
            format!(
                "<idmef:File xmlns:idmef=\"{}\">\
                 <ext:note xmlns:ext=\"urn:example:ext\">x</ext:note>\
                 <idmef:name>y</idmef:name></idmef:File>",
                XMLNS_IDMEF
            )
        );
    }

    #[test]
    fn test_write_collection_has_single_root() {
        let doc = Document::new();
        let files: Vec<Element> = ["a", "b"]
            .into_iter()
            .map(|name| {
                File::new(name, "/x", FileCategory::Current)
                    .unwrap()
                    .to_xml(&doc)
                    .unwrap()
            })
            .collect();
        let mut container = doc.create_element("IDMEF-Message").unwrap();
        container.set_attribute("version", "1.0");

        let mut out = Vec::new();
        IdmefWriter::with_config(WriterConfig::compact())
            .write_collection(&container, &files, &mut out)
            .unwrap();
        let xml = String::from_utf8(out).unwrap();

        assert_eq!(
            xml,
            format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
                 <idmef:IDMEF-Message xmlns:idmef=\"{ns}\" version=\"1.0\">\
                 <idmef:File ident=\"0\" category=\"current\">\
                 <idmef:name>a</idmef:name><idmef:path>/x</idmef:path></idmef:File>\
                 <idmef:File ident=\"0\" category=\"current\">\
                 <idmef:name>b</idmef:name><idmef:path>/x</idmef:path></idmef:File>\
                 </idmef:IDMEF-Message>",
                ns = XMLNS_IDMEF
            )
        );
    }

    #[test]
    fn test_write_empty_collection() {
        let container = Document::new().create_element("IDMEF-Message").unwrap();
        let mut out = Vec::new();
        IdmefWriter::with_config(WriterConfig::compact().with_xml_declaration(false))
            .write_collection(&container, Vec::<&Element>::new(), &mut out)
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!(
                "<idmef:IDMEF-Message xmlns:idmef=\"{}\"></idmef:IDMEF-Message>",
                XMLNS_IDMEF
            )
        );
    }

    #[test]
    fn test_sibling_scopes_are_independent() {
        let idmef = Document::new();
        let other = Document::with_prefix("ext", "urn:example:ext").unwrap();

        let mut parent = idmef.create_element("File").unwrap();
        parent.append_child(other.text_element("a", "1").unwrap());
        parent.append_child(other.text_element("b", "2").unwrap());

        let xml = to_string_compact(&parent).unwrap();
        assert_eq!(xml.matches("xmlns:ext=").count(), 2);
    }
}
