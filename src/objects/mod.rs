//! IDMEF object types.
//!
//! This module contains the data structures for the file-related part of
//! the IDMEF object graph:
//!
//! - [`File`] - A file with identity, timestamps, sizes and child objects
//! - [`Checksum`] - A digest of file content
//! - [`Inode`], [`Linkage`], [`FileAccess`], [`UserId`] - Objects a `File` composes
//!
//! Also provides common types:
//! - [`IdmefElement`] - Projection of an object into an element tree
//! - [`Label`] - Enum-to-schema-string resolution
//! - [`format_timestamp`] - Timestamp text format

mod checksum;
mod common;
mod file;
mod support;

// Re-export common types
pub use common::{
    format_timestamp, ChecksumAlgorithm, FileCategory, FileSystemType, IdmefElement, Label,
    LinkageCategory, Permission, UserIdType, DEFAULT_IDENT, IDMEF_PREFIX, XMLNS_IDMEF,
};

// Re-export main object types
pub use checksum::Checksum;
pub use file::{File, FileBuilder};
pub use support::{DeviceNumber, FileAccess, Inode, InodeNumber, Linkage, UserId};
