//! Objects a `File` composes besides checksums: inode data, links and
//! access grants.

use crate::document::{Document, Element};
use crate::error::{Error, Result};
use crate::objects::common::{
    format_timestamp, non_empty, normalize_ident, IdmefElement, Label, LinkageCategory,
    Permission, UserIdType, DEFAULT_IDENT,
};
use chrono::{DateTime, FixedOffset};
use tracing::{debug, trace};

// ============================================================================
// Inode
// ============================================================================

/// Inode number together with the device it lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InodeNumber {
    /// Inode number
    pub number: u64,
    /// Major device number of the containing device
    pub major_device: u64,
    /// Minor device number of the containing device
    pub minor_device: u64,
}

/// Major/minor pair of a character or block device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceNumber {
    /// Major device number
    pub major: u64,
    /// Minor device number
    pub minor: u64,
}

/// Inode metadata of a file.
///
/// The inode number and the device numbers only appear as complete
/// groups ([`InodeNumber`], [`DeviceNumber`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Inode {
    change_time: Option<DateTime<FixedOffset>>,
    number: Option<InodeNumber>,
    char_device: Option<DeviceNumber>,
}

impl Inode {
    /// Creates an empty Inode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the inode change time.
    pub fn with_change_time(mut self, time: DateTime<FixedOffset>) -> Self {
        self.change_time = Some(time);
        self
    }

    /// Sets the inode number and its device.
    pub fn with_number(mut self, number: InodeNumber) -> Self {
        self.number = Some(number);
        self
    }

    /// Sets the device numbers for a device-special file.
    pub fn with_char_device(mut self, device: DeviceNumber) -> Self {
        self.char_device = Some(device);
        self
    }

    /// Returns the change time.
    pub fn change_time(&self) -> Option<&DateTime<FixedOffset>> {
        self.change_time.as_ref()
    }

    /// Returns the inode number group.
    pub fn number(&self) -> Option<InodeNumber> {
        self.number
    }

    /// Returns the device-special numbers.
    pub fn char_device(&self) -> Option<DeviceNumber> {
        self.char_device
    }
}

impl IdmefElement for Inode {
    fn to_xml(&self, doc: &Document) -> Result<Element> {
        let mut elem = doc.create_element("Inode")?;

        if let Some(ref t) = self.change_time {
            elem.append_child(doc.text_element("change-time", format_timestamp(t))?);
        }
        if let Some(n) = self.number {
            elem.append_child(doc.text_element("number", n.number.to_string())?);
            elem.append_child(doc.text_element("major-device", n.major_device.to_string())?);
            elem.append_child(doc.text_element("minor-device", n.minor_device.to_string())?);
        }
        if let Some(d) = self.char_device {
            elem.append_child(doc.text_element("c-major-device", d.major.to_string())?);
            elem.append_child(doc.text_element("c-minor-device", d.minor.to_string())?);
        }

        Ok(elem)
    }
}

// ============================================================================
// Linkage
// ============================================================================

/// A link relationship (hard link, symlink, stream, ...) of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Linkage {
    category: LinkageCategory,
    name: String,
    path: String,
}

impl Linkage {
    /// Creates a linkage; `name` and `path` must be non-empty.
    pub fn new(
        category: LinkageCategory,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        let path = path.into();
        if name.is_empty() {
            return Err(Error::validation("Linkage", "Linkage must have a name node."));
        }
        if path.is_empty() {
            return Err(Error::validation("Linkage", "Linkage must have a path node."));
        }
        Ok(Self {
            category,
            name,
            path,
        })
    }

    /// Returns the link category.
    pub fn category(&self) -> LinkageCategory {
        self.category
    }

    /// Returns the link name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the link path.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl IdmefElement for Linkage {
    fn to_xml(&self, doc: &Document) -> Result<Element> {
        let mut elem = doc.create_element("Linkage")?;
        elem.set_attribute("category", self.category.label());
        elem.append_child(doc.text_element("name", self.name.as_str())?);
        elem.append_child(doc.text_element("path", self.path.as_str())?);
        Ok(elem)
    }
}

// ============================================================================
// UserId / FileAccess
// ============================================================================

/// A user or group identity.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UserId {
    ident: String,
    kind: UserIdType,
    tcp_port: Option<u16>,
    name: Option<String>,
    number: Option<u32>,
}

impl UserId {
    /// Creates a user id; at least one of `name` or `number` is required.
    pub fn new(kind: UserIdType, name: Option<String>, number: Option<u32>) -> Result<Self> {
        let name = non_empty(name);
        if name.is_none() && number.is_none() {
            debug!(%kind, "rejecting UserId without name or number");
            return Err(Error::validation(
                "UserId",
                "UserId must have a name or number node.",
            ));
        }
        Ok(Self {
            ident: DEFAULT_IDENT.to_string(),
            kind,
            tcp_port: None,
            name,
            number,
        })
    }

    /// Sets the ident; an empty value resets it to `"0"`.
    pub fn with_ident(mut self, ident: impl Into<String>) -> Self {
        self.ident = normalize_ident(Some(ident.into()));
        self
    }

    /// Sets the TCP port the identity was observed on.
    pub fn with_tcp_port(mut self, port: u16) -> Self {
        self.tcp_port = Some(port);
        self
    }

    /// Returns the ident.
    pub fn ident(&self) -> &str {
        &self.ident
    }

    /// Returns the identity type.
    pub fn kind(&self) -> UserIdType {
        self.kind
    }

    /// Returns the user or group name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the numeric uid/gid.
    pub fn number(&self) -> Option<u32> {
        self.number
    }
}

impl IdmefElement for UserId {
    fn to_xml(&self, doc: &Document) -> Result<Element> {
        let mut elem = doc.create_element("UserId")?;
        elem.set_attribute("ident", self.ident.as_str());
        elem.set_attribute("type", self.kind.label());
        if let Some(port) = self.tcp_port {
            elem.set_attribute("tcp-port", port.to_string());
        }
        if let Some(ref name) = self.name {
            elem.append_child(doc.text_element("name", name.as_str())?);
        }
        if let Some(number) = self.number {
            elem.append_child(doc.text_element("number", number.to_string())?);
        }
        Ok(elem)
    }
}

/// Permissions a particular identity holds on a file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FileAccess {
    user_id: UserId,
    permissions: Vec<Permission>,
}

impl FileAccess {
    /// Creates an access entry; at least one permission is required.
    pub fn new(user_id: UserId, permissions: impl IntoIterator<Item = Permission>) -> Result<Self> {
        let permissions: Vec<_> = permissions.into_iter().collect();
        if permissions.is_empty() {
            return Err(Error::validation(
                "FileAccess",
                "FileAccess must have at least one permission.",
            ));
        }
        Ok(Self {
            user_id,
            permissions,
        })
    }

    /// Returns the identity.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the permissions in order.
    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }
}

impl IdmefElement for FileAccess {
    fn to_xml(&self, doc: &Document) -> Result<Element> {
        trace!(permissions = self.permissions.len(), "serializing FileAccess");

        let mut elem = doc.create_element("FileAccess")?;
        elem.append_child(self.user_id.to_xml(doc)?);
        for perm in &self.permissions {
            let mut p = doc.create_element("Permission")?;
            p.set_attribute("perms", perm.label());
            elem.append_child(p);
        }
        Ok(elem)
    }
}
