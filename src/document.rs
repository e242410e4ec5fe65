//! Document-building context and the element tree it produces.
//!
//! IDMEF objects do not write XML text directly. They ask a [`Document`] for
//! namespace-qualified elements, fill in attributes and children, and hand
//! the resulting [`Element`] back to the caller, who may attach it under a
//! larger message tree or render it with [`crate::writer::IdmefWriter`].

use crate::error::{Error, Result};
use crate::objects::{IDMEF_PREFIX, XMLNS_IDMEF};

/// Returns true if `name` is a valid XML NCName (a name without a colon).
fn is_ncname(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Factory for namespace-qualified elements.
///
/// A `Document` holds only the prefix/namespace binding used for new
/// elements. It is cheap to clone and carries no node storage of its own,
/// so separate documents can be populated from different threads freely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    prefix: String,
    namespace: String,
}

impl Document {
    /// Creates a context binding the `idmef` prefix to the IDMEF namespace.
    pub fn new() -> Self {
        Self {
            prefix: IDMEF_PREFIX.to_string(),
            namespace: XMLNS_IDMEF.to_string(),
        }
    }

    /// Creates a context with a custom prefix and namespace.
    ///
    /// An empty prefix places elements in the default namespace. A non-empty
    /// prefix must be an NCName other than `xml` or `xmlns` and needs a
    /// non-empty namespace to bind to.
    pub fn with_prefix(prefix: impl Into<String>, namespace: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        let namespace = namespace.into();
        if !prefix.is_empty()
            && (!is_ncname(&prefix) || prefix == "xml" || prefix == "xmlns" || namespace.is_empty())
        {
            return Err(Error::InvalidName(prefix));
        }
        Ok(Self { prefix, namespace })
    }

    /// Returns the prefix used for new elements (may be empty).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the namespace URI used for new elements.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Creates an empty element in this document's namespace.
    pub fn create_element(&self, local_name: &str) -> Result<Element> {
        if !is_ncname(local_name) {
            return Err(Error::InvalidName(local_name.to_string()));
        }
        Ok(Element {
            prefix: (!self.prefix.is_empty()).then(|| self.prefix.clone()),
            namespace: Some(self.namespace.clone()),
            local_name: local_name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        })
    }

    /// Creates an element whose only child is a text node.
    pub fn text_element(&self, local_name: &str, text: impl Into<String>) -> Result<Element> {
        let mut elem = self.create_element(local_name)?;
        elem.append_text(text);
        Ok(elem)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A nested element
    Element(Element),
    /// Character data
    Text(String),
}

/// An XML element with a namespace, unqualified attributes and ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    prefix: Option<String>,
    namespace: Option<String>,
    local_name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Returns the local (unprefixed) name.
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Returns the namespace prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Returns the namespace URI, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the name as written in XML (`prefix:local` or `local`).
    pub fn qualified_name(&self) -> String {
        match self.prefix {
            Some(ref p) => format!("{}:{}", p, self.local_name),
            None => self.local_name.clone(),
        }
    }

    /// Sets an attribute, replacing any existing value with the same name.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Gets an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns all attributes in insertion order.
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Appends a child element.
    pub fn append_child(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Appends a text node.
    pub fn append_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    /// Returns all child nodes in document order.
    pub fn nodes(&self) -> &[Node] {
        &self.children
    }

    /// Iterates over child elements, skipping text.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Returns the first child element with the given local name.
    pub fn child(&self, local_name: &str) -> Option<&Element> {
        self.children().find(|e| e.local_name == local_name)
    }

    /// Iterates over child elements with the given local name.
    pub fn children_named<'a>(
        &'a self,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children().filter(move |e| e.local_name == local_name)
    }

    /// Concatenates the element's direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Returns true if the element has no attributes and no children.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_element_is_qualified() {
        let doc = Document::new();
        let elem = doc.create_element("File").unwrap();
        assert_eq!(elem.local_name(), "File");
        assert_eq!(elem.prefix(), Some("idmef"));
        assert_eq!(elem.namespace(), Some(XMLNS_IDMEF));
        assert_eq!(elem.qualified_name(), "idmef:File");
        assert!(elem.is_empty());
    }

    #[test]
    fn test_default_namespace_prefix() {
        let doc = Document::with_prefix("", XMLNS_IDMEF).unwrap();
        let elem = doc.create_element("Checksum").unwrap();
        assert_eq!(elem.prefix(), None);
        assert_eq!(elem.qualified_name(), "Checksum");
    }

    #[test]
    fn test_invalid_names_rejected() {
        let doc = Document::new();
        assert!(matches!(doc.create_element(""), Err(Error::InvalidName(_))));
        assert!(matches!(doc.create_element("1st"), Err(Error::InvalidName(_))));
        assert!(matches!(doc.create_element("a:b"), Err(Error::InvalidName(_))));
        assert!(Document::with_prefix("bad prefix", XMLNS_IDMEF).is_err());
        assert!(doc.create_element("create-time").is_ok());
    }

    #[test]
    fn test_prefix_binding_rejected() {
        for (prefix, ns) in [("xml", XMLNS_IDMEF), ("xmlns", XMLNS_IDMEF), ("x", "")] {
            assert!(
                matches!(Document::with_prefix(prefix, ns), Err(Error::InvalidName(ref p)) if p == prefix),
                "prefix {:?} bound to {:?} should be rejected",
                prefix,
                ns
            );
        }
        assert!(Document::with_prefix("", "").is_ok());
        assert!(Document::with_prefix("xmlext", XMLNS_IDMEF).is_ok());
    }

    #[test]
    fn test_set_attribute_replaces() {
        let doc = Document::new();
        let mut elem = doc.create_element("File").unwrap();
        elem.set_attribute("ident", "0");
        elem.set_attribute("category", "current");
        elem.set_attribute("ident", "42");
        assert_eq!(elem.attribute("ident"), Some("42"));
        assert_eq!(elem.attributes().len(), 2);
        assert_eq!(elem.attributes()[0].0, "ident");
    }

    #[test]
    fn test_children_and_text() {
        let doc = Document::new();
        let mut parent = doc.create_element("File").unwrap();
        parent.append_child(doc.text_element("name", "passwd").unwrap());
        parent.append_child(doc.text_element("path", "/etc").unwrap());

        assert_eq!(parent.children().count(), 2);
        assert_eq!(parent.child("path").unwrap().text(), "/etc");
        assert_eq!(parent.children_named("name").count(), 1);
        assert!(parent.child("inode").is_none());
        assert_eq!(parent.text(), "");
    }
}
