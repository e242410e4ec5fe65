//! IDMEF (Intrusion Detection Message Exchange Format, RFC 4765) file
//! objects for Rust.
//!
//! This crate models the file-system artifacts of an IDMEF message, a
//! `File` and the `Checksum`s computed over it, and renders them to
//! namespace-qualified XML in the IDMEF namespace.
//!
//! # Features
//!
//! - **Core Types**: `File`, `Checksum` and the objects a file composes
//!   (`Inode`, `Linkage`, `FileAccess`), validated at construction.
//! - **Element Trees**: every object projects itself into an [`document::Element`]
//!   that can be attached under a larger message.
//! - **Writer**: Render element trees as XML text.
//! - **Serde Support**: Optional serialization with the `serde` feature.
//! - **Harvesting**: Build `File` objects from a live file system with the `cli` feature.
//!
//! # Quick Start
//!
//! ```rust
//! use idmef_rs::{Checksum, ChecksumAlgorithm, Document, File, FileCategory, IdmefElement};
//!
//! let checksum = Checksum::with_key("deadbeef", "k1", ChecksumAlgorithm::Md5)?;
//! let file = File::builder("passwd", "/etc", FileCategory::Config)
//!     .add_checksum(checksum)
//!     .build()?;
//!
//! let elem = file.to_xml(&Document::new())?;
//! let xml = idmef_rs::writer::to_string(&elem)?;
//! println!("{}", xml);
//! # Ok::<(), idmef_rs::Error>(())
//! ```
//!
//! # Module Structure
//!
//! - [`objects`] - IDMEF data structures
//! - [`document`] - Element creation context and element tree
//! - [`writer`] - XML output
//! - [`error`] - Error types
//!
//! # Optional Features
//!
//! - `serde` - Enable serde serialization support
//! - `cli` - File-system harvesting and the `file_to_idmef` binary

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod document;
pub mod error;
#[cfg(feature = "cli")]
pub mod harvest;
pub mod objects;
pub mod writer;

// Re-export commonly used types at the crate root
pub use document::{Document, Element};
pub use error::{Error, Result};
pub use objects::{
    Checksum, ChecksumAlgorithm, File, FileBuilder, FileCategory, FileSystemType, IdmefElement,
    Label, XMLNS_IDMEF,
};
pub use writer::{IdmefWriter, WriterConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
