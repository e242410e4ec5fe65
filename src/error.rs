//! Error types for the IDMEF library.

use thiserror::Error;

/// Errors that can occur when building or rendering IDMEF objects.
#[derive(Error, Debug)]
pub enum Error {
    /// A required field was missing or empty, or an enum held a disallowed value.
    ///
    /// Raised only while constructing an object; no partially built value is
    /// ever returned alongside it.
    #[error("Invalid {entity}: {reason}")]
    Validation {
        /// The IDMEF class being constructed
        entity: &'static str,
        /// Description of the violated rule
        reason: String,
    },

    /// A name handed to the document context is not a valid XML NCName
    #[error("Invalid XML name: {0:?}")]
    InvalidName(String),

    /// A string did not match any label of an IDMEF enumeration
    #[error("Unknown {kind} label: {value}")]
    UnknownLabel {
        /// The enumeration being parsed
        kind: &'static str,
        /// The rejected input
        value: String,
    },

    /// XML writing error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Rendered output was not valid UTF-8
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] on the given entity.
    pub(crate) fn validation(entity: &'static str, reason: impl Into<String>) -> Self {
        Error::Validation {
            entity,
            reason: reason.into(),
        }
    }

    /// Returns true if this is a construction-time validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }
}

/// Result type alias for IDMEF operations.
pub type Result<T> = std::result::Result<T, Error>;
