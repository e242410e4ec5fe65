//! File - represents a file in IDMEF.
//!
//! A `File` records identity (name, path, category) plus optional
//! timestamps, sizes and child objects. All optional data is supplied
//! through [`FileBuilder`]; once built, a `File` does not change.

use crate::document::{Document, Element};
use crate::error::{Error, Result};
use crate::objects::checksum::Checksum;
use crate::objects::common::{
    format_timestamp, non_empty, normalize_ident, FileCategory, FileSystemType, IdmefElement,
    Label,
};
use crate::objects::support::{FileAccess, Inode, Linkage};
use chrono::{DateTime, FixedOffset};
use tracing::{debug, trace};

/// Represents a file object in IDMEF.
///
/// Contains:
/// - Identification (ident, name, path, category, fstype, file-type)
/// - Timestamps (create, modify, access)
/// - Sizes (data and on-disk)
/// - Child objects (access grants, links, inode, checksums)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct File {
    // === Identification ===
    ident: String,
    name: String,
    path: String,
    category: FileCategory,
    fstype: Option<FileSystemType>,
    file_type: Option<String>,

    // === Timestamps ===
    create_time: Option<DateTime<FixedOffset>>,
    modify_time: Option<DateTime<FixedOffset>>,
    access_time: Option<DateTime<FixedOffset>>,

    // === Size ===
    data_size: Option<u64>,
    disk_size: Option<u64>,

    // === Children ===
    file_access: Vec<FileAccess>,
    linkage: Vec<Linkage>,
    inode: Option<Inode>,
    checksum: Vec<Checksum>,
}

impl File {
    /// Creates a File with only the required fields.
    ///
    /// Fails if `name` or `path` is empty, or `category` is
    /// [`FileCategory::Unknown`].
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        category: FileCategory,
    ) -> Result<Self> {
        Self::builder(name, path, category).build()
    }

    /// Starts building a File with the required fields.
    pub fn builder(
        name: impl Into<String>,
        path: impl Into<String>,
        category: FileCategory,
    ) -> FileBuilder {
        FileBuilder {
            name: name.into(),
            path: path.into(),
            category,
            ident: None,
            fstype: None,
            file_type: None,
            create_time: None,
            modify_time: None,
            access_time: None,
            data_size: None,
            disk_size: None,
            file_access: Vec::new(),
            linkage: Vec::new(),
            inode: None,
            checksum: Vec::new(),
        }
    }

    /// Returns the ident (`"0"` when none was given).
    pub fn ident(&self) -> &str {
        &self.ident
    }

    /// Returns the file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the category.
    pub fn category(&self) -> FileCategory {
        self.category
    }

    /// Returns the file system type.
    pub fn fstype(&self) -> Option<FileSystemType> {
        self.fstype
    }

    /// Returns the free-text file type.
    pub fn file_type(&self) -> Option<&str> {
        self.file_type.as_deref()
    }

    /// Returns the creation time.
    pub fn create_time(&self) -> Option<&DateTime<FixedOffset>> {
        self.create_time.as_ref()
    }

    /// Returns the modification time.
    pub fn modify_time(&self) -> Option<&DateTime<FixedOffset>> {
        self.modify_time.as_ref()
    }

    /// Returns the access time.
    pub fn access_time(&self) -> Option<&DateTime<FixedOffset>> {
        self.access_time.as_ref()
    }

    /// Returns the logical data size in bytes.
    pub fn data_size(&self) -> Option<u64> {
        self.data_size
    }

    /// Returns the allocated on-disk size in bytes.
    pub fn disk_size(&self) -> Option<u64> {
        self.disk_size
    }

    /// Returns the access grants.
    pub fn file_access(&self) -> &[FileAccess] {
        &self.file_access
    }

    /// Returns the links.
    pub fn linkage(&self) -> &[Linkage] {
        &self.linkage
    }

    /// Returns the inode.
    pub fn inode(&self) -> Option<&Inode> {
        self.inode.as_ref()
    }

    /// Returns the checksums.
    pub fn checksums(&self) -> &[Checksum] {
        &self.checksum
    }
}

impl IdmefElement for File {
    fn to_xml(&self, doc: &Document) -> Result<Element> {
        trace!(ident = %self.ident, name = %self.name, "serializing File");

        let mut elem = doc.create_element("File")?;

        elem.set_attribute("ident", self.ident.as_str());
        elem.set_attribute("category", self.category.label());
        if let Some(fstype) = self.fstype {
            elem.set_attribute("fstype", fstype.label());
        }
        if let Some(ref file_type) = self.file_type {
            elem.set_attribute("file-type", file_type.as_str());
        }

        // Children in IDMEF schema order
        elem.append_child(doc.text_element("name", self.name.as_str())?);
        elem.append_child(doc.text_element("path", self.path.as_str())?);

        if let Some(ref t) = self.create_time {
            elem.append_child(doc.text_element("create-time", format_timestamp(t))?);
        }
        if let Some(ref t) = self.modify_time {
            elem.append_child(doc.text_element("modify-time", format_timestamp(t))?);
        }
        if let Some(ref t) = self.access_time {
            elem.append_child(doc.text_element("access-time", format_timestamp(t))?);
        }
        if let Some(size) = self.data_size {
            elem.append_child(doc.text_element("data-size", size.to_string())?);
        }
        if let Some(size) = self.disk_size {
            elem.append_child(doc.text_element("disk-size", size.to_string())?);
        }

        for fa in &self.file_access {
            elem.append_child(fa.to_xml(doc)?);
        }
        for link in &self.linkage {
            elem.append_child(link.to_xml(doc)?);
        }
        if let Some(ref inode) = self.inode {
            elem.append_child(inode.to_xml(doc)?);
        }
        for checksum in &self.checksum {
            elem.append_child(checksum.to_xml(doc)?);
        }

        Ok(elem)
    }
}

/// Builder for [`File`].
///
/// Collection setters accept any iterator, so sparse input such as
/// `Vec<Option<Checksum>>` can be passed through `.into_iter().flatten()`.
#[derive(Debug, Clone)]
#[must_use]
pub struct FileBuilder {
    name: String,
    path: String,
    category: FileCategory,
    ident: Option<String>,
    fstype: Option<FileSystemType>,
    file_type: Option<String>,
    create_time: Option<DateTime<FixedOffset>>,
    modify_time: Option<DateTime<FixedOffset>>,
    access_time: Option<DateTime<FixedOffset>>,
    data_size: Option<u64>,
    disk_size: Option<u64>,
    file_access: Vec<FileAccess>,
    linkage: Vec<Linkage>,
    inode: Option<Inode>,
    checksum: Vec<Checksum>,
}

impl FileBuilder {
    /// Sets the ident. An empty ident becomes `"0"`.
    pub fn ident(mut self, ident: impl Into<String>) -> Self {
        self.ident = Some(ident.into());
        self
    }

    /// Sets the file system type.
    pub fn fstype(mut self, fstype: FileSystemType) -> Self {
        self.fstype = Some(fstype);
        self
    }

    /// Sets the free-text file type. An empty value is ignored.
    pub fn file_type(mut self, file_type: impl Into<String>) -> Self {
        self.file_type = Some(file_type.into());
        self
    }

    /// Sets the creation time.
    pub fn create_time(mut self, time: DateTime<FixedOffset>) -> Self {
        self.create_time = Some(time);
        self
    }

    /// Sets the modification time.
    pub fn modify_time(mut self, time: DateTime<FixedOffset>) -> Self {
        self.modify_time = Some(time);
        self
    }

    /// Sets the access time.
    pub fn access_time(mut self, time: DateTime<FixedOffset>) -> Self {
        self.access_time = Some(time);
        self
    }

    /// Sets the logical data size.
    pub fn data_size(mut self, size: u64) -> Self {
        self.data_size = Some(size);
        self
    }

    /// Sets the on-disk size.
    pub fn disk_size(mut self, size: u64) -> Self {
        self.disk_size = Some(size);
        self
    }

    /// Appends access grants.
    pub fn file_access(mut self, entries: impl IntoIterator<Item = FileAccess>) -> Self {
        self.file_access.extend(entries);
        self
    }

    /// Appends one access grant.
    pub fn add_file_access(mut self, entry: FileAccess) -> Self {
        self.file_access.push(entry);
        self
    }

    /// Appends links.
    pub fn linkage(mut self, links: impl IntoIterator<Item = Linkage>) -> Self {
        self.linkage.extend(links);
        self
    }

    /// Appends one link.
    pub fn add_linkage(mut self, link: Linkage) -> Self {
        self.linkage.push(link);
        self
    }

    /// Sets the inode.
    pub fn inode(mut self, inode: Inode) -> Self {
        self.inode = Some(inode);
        self
    }

    /// Appends checksums.
    pub fn checksums(mut self, checksums: impl IntoIterator<Item = Checksum>) -> Self {
        self.checksum.extend(checksums);
        self
    }

    /// Appends one checksum.
    pub fn add_checksum(mut self, checksum: Checksum) -> Self {
        self.checksum.push(checksum);
        self
    }

    /// Validates the required fields and produces the File.
    pub fn build(self) -> Result<File> {
        if self.name.is_empty() {
            debug!(path = %self.path, "rejecting File without a name");
            return Err(Error::validation("File", "File must have a name node."));
        }
        if self.path.is_empty() {
            debug!(name = %self.name, "rejecting File without a path");
            return Err(Error::validation("File", "File must have a path node."));
        }
        if self.category == FileCategory::Unknown {
            debug!(name = %self.name, "rejecting File with unknown category");
            return Err(Error::validation(
                "File",
                "File must have a category attribute.",
            ));
        }

        Ok(File {
            ident: normalize_ident(self.ident),
            name: self.name,
            path: self.path,
            category: self.category,
            fstype: self.fstype,
            file_type: non_empty(self.file_type),
            create_time: self.create_time,
            modify_time: self.modify_time,
            access_time: self.access_time,
            data_size: self.data_size,
            disk_size: self.disk_size,
            file_access: self.file_access,
            linkage: self.linkage,
            inode: self.inode,
            checksum: self.checksum,
        })
    }
}
