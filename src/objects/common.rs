//! Common types shared across IDMEF objects.
//!
//! This module contains:
//! - Namespace constants
//! - [`IdmefElement`] - the serializer contract every object implements
//! - [`Label`] - static enum-to-schema-string resolution
//! - The IDMEF enumerations used by `File` and its children
//! - [`format_timestamp`] - the timestamp text format

use crate::document::{Document, Element};
use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset, SecondsFormat};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// IDMEF Namespaces and Constants
// ============================================================================

/// IDMEF namespace (RFC 4765)
pub const XMLNS_IDMEF: &str = "http://iana.org/idmef";

/// Conventional prefix bound to [`XMLNS_IDMEF`]
pub const IDMEF_PREFIX: &str = "idmef";

/// Ident value used when none is supplied
pub const DEFAULT_IDENT: &str = "0";

/// Normalizes an optional ident, mapping absent or empty values to [`DEFAULT_IDENT`].
pub(crate) fn normalize_ident(ident: Option<String>) -> String {
    match ident {
        Some(s) if !s.is_empty() => s,
        _ => DEFAULT_IDENT.to_string(),
    }
}

/// Drops empty strings.
pub(crate) fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.is_empty())
}

// ============================================================================
// Serialization contract
// ============================================================================

/// An IDMEF object that can project itself into an element tree.
///
/// Implementations are pure: they read the object's state, create nodes
/// through the [`Document`], and return a single element ready to append
/// under a parent. Errors from the document are returned unchanged.
pub trait IdmefElement {
    /// Builds this object's element.
    fn to_xml(&self, doc: &Document) -> Result<Element>;
}

// ============================================================================
// Labels
// ============================================================================

/// Maps an enum constant to its canonical IDMEF schema string.
pub trait Label: Copy + Sized + 'static {
    /// Every variant, in declaration order.
    const ALL: &'static [Self];

    /// Name of the enumeration, used in error messages.
    const KIND: &'static str;

    /// The schema string for this variant.
    fn label(&self) -> &'static str;

    /// Resolves a schema string back to a variant.
    fn from_label(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.label() == s)
    }
}

/// Declares an IDMEF enumeration together with its label table.
///
/// The generated `label()` is a plain `match`, so adding a variant without
/// a label fails to compile.
macro_rules! idmef_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl Label for $name {
            const ALL: &'static [Self] = &[ $( $name::$variant, )+ ];
            const KIND: &'static str = $kind;

            fn label(&self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                <$name as Label>::from_label(s).ok_or_else(|| Error::UnknownLabel {
                    kind: $kind,
                    value: s.to_string(),
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.label())
            }
        }
    };
}

idmef_enum! {
    /// Hash algorithm of a `Checksum`.
    ChecksumAlgorithm, "checksum algorithm" {
        /// MD4
        Md4 => "md4",
        /// MD5 (128-bit)
        Md5 => "md5",
        /// SHA-1 (160-bit)
        Sha1 => "sha1",
        /// SHA-2 256-bit
        Sha2_256 => "sha2-256",
        /// SHA-2 384-bit
        Sha2_384 => "sha2-384",
        /// SHA-2 512-bit
        Sha2_512 => "sha2-512",
        /// CRC-32
        Crc32 => "crc-32",
        /// HAVAL
        Haval => "haval",
        /// Tiger
        Tiger => "tiger",
        /// GOST R 34.11-94
        Gost => "gost",
    }
}

idmef_enum! {
    /// Category of a `File`: which state of the file the record describes.
    FileCategory, "file category" {
        /// Not set; rejected when a `File` is constructed
        Unknown => "unknown",
        /// The file as it exists now
        Current => "current",
        /// The file as it existed before the event
        Original => "original",
        /// A configuration file
        Config => "config",
    }
}

idmef_enum! {
    /// File system a `File` lives on.
    FileSystemType, "file system type" {
        /// Unix File System
        Ufs => "ufs",
        /// Extent File System
        Efs => "efs",
        /// Network File System
        Nfs => "nfs",
        /// Andrew File System
        Afs => "afs",
        /// Windows NT File System
        Ntfs => "ntfs",
        /// FAT16
        Fat16 => "fat16",
        /// FAT32
        Fat32 => "fat32",
        /// PC (MS-DOS) FAT
        Pcfat => "pcfat",
        /// Joliet CD-ROM
        Joliet => "joliet",
        /// ISO 9660 CD-ROM
        Iso9660 => "iso9660",
    }
}

idmef_enum! {
    /// Kind of link described by a `Linkage`.
    LinkageCategory, "linkage category" {
        /// Hard link
        HardLink => "hard-link",
        /// Mount point
        MountPoint => "mount-point",
        /// NTFS reparse point
        ReparsePoint => "reparse-point",
        /// Windows shortcut
        Shortcut => "shortcut",
        /// Alternate data stream
        Stream => "stream",
        /// Symbolic link
        SymbolicLink => "symbolic-link",
    }
}

idmef_enum! {
    /// Role of a `UserId`.
    UserIdType, "user id type" {
        /// The user the process currently runs as
        CurrentUser => "current-user",
        /// The user that originally started the activity
        OriginalUser => "original-user",
        /// The user the activity targets
        TargetUser => "target-user",
        /// Privileges granted to the owning user
        UserPrivs => "user-privs",
        /// The group the process currently runs as
        CurrentGroup => "current-group",
        /// Privileges granted to the owning group
        GroupPrivs => "group-privs",
        /// Privileges granted to everyone else
        OtherPrivs => "other-privs",
    }
}

idmef_enum! {
    /// A single access right held through a `FileAccess` entry.
    Permission, "permission" {
        /// No access at all
        NoAccess => "noAccess",
        /// Read
        Read => "read",
        /// Write
        Write => "write",
        /// Execute
        Execute => "execute",
        /// Directory search
        Search => "search",
        /// Delete
        Delete => "delete",
        /// Execute as another user
        ExecuteAs => "executeAs",
        /// Change permissions
        ChangePermissions => "changePermissions",
        /// Take ownership
        TakeOwnership => "takeOwnership",
    }
}

// ============================================================================
// Timestamps
// ============================================================================

/// Renders a timestamp in round-trip ISO 8601 form.
///
/// Fractional seconds are written with as many digits as the value needs
/// (none, 3, 6 or 9), and a zero offset is written as `Z`.
pub fn format_timestamp(time: &DateTime<FixedOffset>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_checksum_algorithm_labels() {
        assert_eq!(ChecksumAlgorithm::Md5.label(), "md5");
        assert_eq!(ChecksumAlgorithm::Sha2_256.label(), "sha2-256");
        assert_eq!(ChecksumAlgorithm::Crc32.to_string(), "crc-32");
        assert_eq!(
            "sha2-512".parse::<ChecksumAlgorithm>().unwrap(),
            ChecksumAlgorithm::Sha2_512
        );
    }

    #[test]
    fn test_label_tables_are_unique_and_reversible() {
        fn check<T: Label + PartialEq + fmt::Debug>() {
            for (i, v) in T::ALL.iter().enumerate() {
                assert_eq!(T::from_label(v.label()), Some(*v));
                assert!(T::ALL[i + 1..].iter().all(|o| o.label() != v.label()));
            }
        }
        check::<ChecksumAlgorithm>();
        check::<FileCategory>();
        check::<FileSystemType>();
        check::<LinkageCategory>();
        check::<UserIdType>();
        check::<Permission>();
    }

    #[test]
    fn test_unknown_label_rejected() {
        let err = "whirlpool".parse::<ChecksumAlgorithm>().unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownLabel { kind: "checksum algorithm", .. }
        ));
        // Labels are case-sensitive, as in the schema
        assert!("MD5".parse::<ChecksumAlgorithm>().is_err());
    }

    #[test]
    fn test_permission_labels_keep_schema_case() {
        assert_eq!(Permission::NoAccess.label(), "noAccess");
        assert_eq!(
            "takeOwnership".parse::<Permission>().unwrap(),
            Permission::TakeOwnership
        );
    }

    #[test]
    fn test_format_timestamp_preserves_fraction() {
        let t = Utc
            .with_ymd_and_hms(2024, 1, 15, 10, 30, 0)
            .unwrap()
            .fixed_offset();
        assert_eq!(format_timestamp(&t), "2024-01-15T10:30:00Z");

        let t = DateTime::parse_from_rfc3339("2024-01-15T10:30:00.123456+02:00").unwrap();
        let text = format_timestamp(&t);
        assert_eq!(text, "2024-01-15T10:30:00.123456+02:00");
        assert_eq!(DateTime::parse_from_rfc3339(&text).unwrap(), t);

        let t = DateTime::parse_from_rfc3339("2024-01-15T10:30:00.000000001Z").unwrap();
        assert_eq!(format_timestamp(&t), "2024-01-15T10:30:00.000000001Z");
    }

    #[test]
    fn test_normalize_ident() {
        assert_eq!(normalize_ident(None), "0");
        assert_eq!(normalize_ident(Some(String::new())), "0");
        assert_eq!(normalize_ident(Some("abc".to_string())), "abc");
    }
}
