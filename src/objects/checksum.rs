//! Checksum - a digest of file content tagged with its algorithm.

use crate::document::{Document, Element};
use crate::error::{Error, Result};
use crate::objects::common::{non_empty, ChecksumAlgorithm, IdmefElement, Label};
use tracing::{debug, trace};

/// A hash value over a file's content.
///
/// The value is required; the key is only meaningful for keyed algorithms
/// and is omitted from output when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Checksum {
    value: String,
    key: Option<String>,
    algorithm: ChecksumAlgorithm,
}

impl Checksum {
    /// Creates a checksum, failing if `value` is empty.
    pub fn new(value: impl Into<String>, algorithm: ChecksumAlgorithm) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            debug!(%algorithm, "rejecting Checksum without a value");
            return Err(Error::validation("Checksum", "Checksum must have a value node."));
        }
        Ok(Self {
            value,
            key: None,
            algorithm,
        })
    }

    /// Creates a keyed checksum. An empty key is treated as no key.
    pub fn with_key(
        value: impl Into<String>,
        key: impl Into<String>,
        algorithm: ChecksumAlgorithm,
    ) -> Result<Self> {
        let mut checksum = Self::new(value, algorithm)?;
        checksum.key = non_empty(Some(key.into()));
        Ok(checksum)
    }

    /// Returns the digest text.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the key, if any.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Returns the algorithm.
    pub fn algorithm(&self) -> ChecksumAlgorithm {
        self.algorithm
    }
}

impl IdmefElement for Checksum {
    fn to_xml(&self, doc: &Document) -> Result<Element> {
        trace!(algorithm = %self.algorithm, "serializing Checksum");

        let mut elem = doc.create_element("Checksum")?;
        elem.set_attribute("category", self.algorithm.label());
        elem.append_child(doc.text_element("value", self.value.as_str())?);
        if let Some(ref key) = self.key {
            elem.append_child(doc.text_element("key", key.as_str())?);
        }
        Ok(elem)
    }
}
