//! Build IDMEF `File` objects from a live file system.
//!
//! Collects metadata, optionally computes checksums over file content, and
//! fills in inode, link and permission data where the platform exposes it.
//!
//! Requires the `cli` feature.

use std::fs::{self, Metadata};
use std::io::{self, Read};
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, FixedOffset, Utc};
use digest::DynDigest;
use tracing::{trace, warn};

use crate::error::Result;
use crate::objects::{
    Checksum, ChecksumAlgorithm, File, FileBuilder, FileCategory, FileSystemType, Linkage,
    LinkageCategory,
};

/// Read buffer size used while hashing.
const HASH_BUFFER_SIZE: usize = 1024 * 1024;

/// Algorithms [`compute_checksums`] can produce.
pub const SUPPORTED_ALGORITHMS: &[ChecksumAlgorithm] = &[
    ChecksumAlgorithm::Md5,
    ChecksumAlgorithm::Sha1,
    ChecksumAlgorithm::Sha2_256,
    ChecksumAlgorithm::Sha2_384,
    ChecksumAlgorithm::Sha2_512,
];

/// Settings for turning paths into `File` objects.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// Checksums to compute for regular files, in output order
    pub algorithms: Vec<ChecksumAlgorithm>,
    /// Category recorded on every file
    pub category: FileCategory,
    /// File system type recorded on every file
    pub fstype: Option<FileSystemType>,
    /// Whether to attach inode data (Unix only)
    pub inode: bool,
    /// Whether to attach owner/group/other permissions (Unix only)
    pub access: bool,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            algorithms: vec![ChecksumAlgorithm::Md5, ChecksumAlgorithm::Sha2_256],
            category: FileCategory::Current,
            fstype: None,
            inode: true,
            access: true,
        }
    }
}

impl HarvestConfig {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Disables checksum computation.
    pub fn without_checksums(mut self) -> Self {
        self.algorithms.clear();
        self
    }
}

/// Returns a hasher for the algorithm, if one is available.
fn hasher_for(algorithm: ChecksumAlgorithm) -> Option<Box<dyn DynDigest>> {
    match algorithm {
        ChecksumAlgorithm::Md5 => Some(Box::new(md5::Md5::default())),
        ChecksumAlgorithm::Sha1 => Some(Box::new(sha1::Sha1::default())),
        ChecksumAlgorithm::Sha2_256 => Some(Box::new(sha2::Sha256::default())),
        ChecksumAlgorithm::Sha2_384 => Some(Box::new(sha2::Sha384::default())),
        ChecksumAlgorithm::Sha2_512 => Some(Box::new(sha2::Sha512::default())),
        _ => None,
    }
}

/// Returns true if [`compute_checksums`] can produce this algorithm.
pub fn is_supported(algorithm: ChecksumAlgorithm) -> bool {
    SUPPORTED_ALGORITHMS.contains(&algorithm)
}

/// Hashes a file's content once per requested algorithm.
///
/// Algorithms without an implementation are skipped with a warning. The
/// returned checksums follow the order of `algorithms`.
pub fn compute_checksums(path: &Path, algorithms: &[ChecksumAlgorithm]) -> Result<Vec<Checksum>> {
    let mut hashers = Vec::with_capacity(algorithms.len());
    for &algorithm in algorithms {
        match hasher_for(algorithm) {
            Some(hasher) => hashers.push((algorithm, hasher)),
            None => warn!(%algorithm, "no digest implementation, skipping"),
        }
    }
    if hashers.is_empty() {
        return Ok(Vec::new());
    }

    let mut file = fs::File::open(path)?;
    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];
    loop {
        let n = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        for (_, hasher) in hashers.iter_mut() {
            hasher.update(&buffer[..n]);
        }
    }

    hashers
        .into_iter()
        .map(|(algorithm, hasher)| Checksum::new(hex::encode(hasher.finalize()), algorithm))
        .collect()
}

/// Converts a SystemTime to a UTC timestamp.
fn system_time_to_datetime(st: SystemTime) -> DateTime<FixedOffset> {
    DateTime::<Utc>::from(st).fixed_offset()
}

/// Splits a Linux `dev_t` into (major, minor).
#[cfg(target_os = "linux")]
fn split_dev(dev: u64) -> Option<(u64, u64)> {
    let major = ((dev >> 8) & 0xfff) | ((dev >> 32) & !0xfff);
    let minor = (dev & 0xff) | ((dev >> 12) & !0xff);
    Some((major, minor))
}

/// Splits a Darwin `dev_t` (8-bit major, 24-bit minor).
#[cfg(target_os = "macos")]
fn split_dev(dev: u64) -> Option<(u64, u64)> {
    Some(((dev >> 24) & 0xff, dev & 0xff_ffff))
}

/// Device number layout is unknown on this platform.
#[cfg(all(unix, not(any(target_os = "linux", target_os = "macos"))))]
fn split_dev(_dev: u64) -> Option<(u64, u64)> {
    None
}

#[cfg(unix)]
fn unix_inode(metadata: &Metadata) -> crate::objects::Inode {
    use crate::objects::{DeviceNumber, Inode, InodeNumber};
    use std::os::unix::fs::{FileTypeExt, MetadataExt};

    let mut inode = Inode::new();
    match split_dev(metadata.dev()) {
        Some((major_device, minor_device)) => {
            inode = inode.with_number(InodeNumber {
                number: metadata.ino(),
                major_device,
                minor_device,
            });
        }
        None => tracing::debug!(
            dev = metadata.dev(),
            "device number layout unknown, omitting inode number"
        ),
    }

    if let Ok(nsec) = u32::try_from(metadata.ctime_nsec()) {
        if let Some(ctime) = DateTime::from_timestamp(metadata.ctime(), nsec) {
            inode = inode.with_change_time(ctime.fixed_offset());
        }
    }

    let file_type = metadata.file_type();
    if file_type.is_char_device() || file_type.is_block_device() {
        if let Some((major, minor)) = split_dev(metadata.rdev()) {
            inode = inode.with_char_device(DeviceNumber { major, minor });
        }
    }

    inode
}

/// Maps a 3-bit rwx triple to IDMEF permissions.
#[cfg(unix)]
fn rwx_permissions(bits: u32, is_dir: bool) -> Vec<crate::objects::Permission> {
    use crate::objects::Permission;

    let mut perms = Vec::new();
    if bits & 0o4 != 0 {
        perms.push(Permission::Read);
    }
    if bits & 0o2 != 0 {
        perms.push(Permission::Write);
    }
    if bits & 0o1 != 0 {
        perms.push(if is_dir {
            Permission::Search
        } else {
            Permission::Execute
        });
    }
    if perms.is_empty() {
        perms.push(Permission::NoAccess);
    }
    perms
}

#[cfg(unix)]
fn unix_access(metadata: &Metadata) -> Result<Vec<crate::objects::FileAccess>> {
    use crate::objects::{FileAccess, UserId, UserIdType};
    use std::os::unix::fs::MetadataExt;

    let mode = metadata.mode();
    let is_dir = metadata.is_dir();
    let entries = [
        (UserIdType::UserPrivs, Some(metadata.uid()), mode >> 6),
        (UserIdType::GroupPrivs, Some(metadata.gid()), mode >> 3),
        (UserIdType::OtherPrivs, None, mode),
    ];

    entries
        .into_iter()
        .map(|(kind, number, bits)| {
            let user = match number {
                Some(n) => UserId::new(kind, None, Some(n))?,
                None => UserId::new(kind, Some("other".to_string()), None)?,
            };
            FileAccess::new(user, rwx_permissions(bits & 0o7, is_dir))
        })
        .collect()
}

/// Collects everything known about `path` into a [`FileBuilder`].
///
/// The name is the final path component and the path is its parent
/// directory. Callers may add an ident or other data before building.
/// Symbolic links are not followed.
pub fn builder_from_path(path: &Path, config: &HarvestConfig) -> Result<FileBuilder> {
    let metadata = fs::symlink_metadata(path)?;
    trace!(path = %path.display(), "harvesting file metadata");

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_string_lossy().into_owned(),
        Some(_) => ".".to_string(),
        None => path.to_string_lossy().into_owned(),
    };

    let mut builder = File::builder(name, dir, config.category);
    if let Some(fstype) = config.fstype {
        builder = builder.fstype(fstype);
    }

    if let Ok(t) = metadata.created() {
        builder = builder.create_time(system_time_to_datetime(t));
    }
    if let Ok(t) = metadata.modified() {
        builder = builder.modify_time(system_time_to_datetime(t));
    }
    if let Ok(t) = metadata.accessed() {
        builder = builder.access_time(system_time_to_datetime(t));
    }

    let file_type = metadata.file_type();
    if file_type.is_file() {
        builder = builder.data_size(metadata.len());
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            builder = builder.disk_size(metadata.blocks() * 512);
        }
    }

    #[cfg(unix)]
    if config.access {
        builder = builder.file_access(unix_access(&metadata)?);
    }

    if file_type.is_symlink() {
        if let Ok(target) = fs::read_link(path) {
            let target_name = target
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| target.to_string_lossy().into_owned());
            match Linkage::new(
                LinkageCategory::SymbolicLink,
                target_name,
                target.to_string_lossy(),
            ) {
                Ok(link) => builder = builder.add_linkage(link),
                Err(e) => warn!(path = %path.display(), error = %e, "unusable link target"),
            }
        }
    }

    #[cfg(unix)]
    if config.inode {
        builder = builder.inode(unix_inode(&metadata));
    }

    if file_type.is_file() {
        match compute_checksums(path, &config.algorithms) {
            Ok(checksums) => builder = builder.checksums(checksums),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping checksums"),
        }
    }

    Ok(builder)
}

/// Builds a [`File`] for `path` with the default ident.
pub fn file_from_path(path: &Path, config: &HarvestConfig) -> Result<File> {
    builder_from_path(path, config)?.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::objects::IdmefElement;
    use std::io::Write;

    const HELLO_MD5: &str = "5d41402abc4b2a76b9719d911017c592";
    const HELLO_SHA1: &str = "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d";
    const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    fn write_hello(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("hello.txt");
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(b"hello").unwrap();
        path
    }

    #[test]
    fn test_compute_checksums() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_hello(dir.path());

        let checksums = compute_checksums(
            &path,
            &[
                ChecksumAlgorithm::Sha2_256,
                ChecksumAlgorithm::Tiger,
                ChecksumAlgorithm::Md5,
                ChecksumAlgorithm::Sha1,
            ],
        )
        .unwrap();

        let values: Vec<_> = checksums
            .iter()
            .map(|c| (c.algorithm(), c.value()))
            .collect();
        assert_eq!(
            values,
            [
                (ChecksumAlgorithm::Sha2_256, HELLO_SHA256),
                (ChecksumAlgorithm::Md5, HELLO_MD5),
                (ChecksumAlgorithm::Sha1, HELLO_SHA1),
            ]
        );
    }

    #[test]
    fn test_compute_checksums_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = compute_checksums(&dir.path().join("nope"), &[ChecksumAlgorithm::Md5]);
        assert!(matches!(err, Err(crate::error::Error::Io(_))));
    }

    #[test]
    fn test_file_from_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_hello(dir.path());

        let config = HarvestConfig {
            fstype: Some(FileSystemType::Ufs),
            ..HarvestConfig::default()
        };
        let file = file_from_path(&path, &config).unwrap();

        assert_eq!(file.name(), "hello.txt");
        assert_eq!(file.path(), dir.path().to_string_lossy());
        assert_eq!(file.category(), FileCategory::Current);
        assert_eq!(file.fstype(), Some(FileSystemType::Ufs));
        assert_eq!(file.data_size(), Some(5));
        assert!(file.modify_time().is_some());
        assert_eq!(file.checksums().len(), 2);
        assert_eq!(file.checksums()[0].value(), HELLO_MD5);
        assert_eq!(file.checksums()[1].value(), HELLO_SHA256);

        let elem = file.to_xml(&Document::new()).unwrap();
        assert_eq!(elem.attribute("fstype"), Some("ufs"));
        assert_eq!(elem.child("data-size").unwrap().text(), "5");
        assert_eq!(elem.children_named("Checksum").count(), 2);
    }

    #[test]
    fn test_directory_has_no_size_or_checksums() {
        let dir = tempfile::tempdir().unwrap();
        let file = file_from_path(dir.path(), &HarvestConfig::default()).unwrap();

        assert_eq!(file.data_size(), None);
        assert_eq!(file.disk_size(), None);
        assert!(file.checksums().is_empty());
    }

    #[test]
    fn test_without_checksums() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_hello(dir.path());
        let file = file_from_path(&path, &HarvestConfig::new().without_checksums()).unwrap();
        assert!(file.checksums().is_empty());
        assert_eq!(file.data_size(), Some(5));
    }

    #[test]
    fn test_builder_accepts_ident() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_hello(dir.path());
        let file = builder_from_path(&path, &HarvestConfig::default())
            .unwrap()
            .ident("7")
            .build()
            .unwrap();
        assert_eq!(file.ident(), "7");
    }

    #[cfg(unix)]
    #[test]
    fn test_unix_inode_and_access() {
        use crate::objects::{Permission, UserIdType};
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = write_hello(dir.path());
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        let file = file_from_path(&path, &HarvestConfig::default()).unwrap();

        let inode = file.inode().unwrap();
        assert!(inode.change_time().is_some());
        if cfg!(any(target_os = "linux", target_os = "macos")) {
            assert!(inode.number().is_some());
        }
        assert!(inode.char_device().is_none());

        let access = file.file_access();
        assert_eq!(access.len(), 3);
        assert_eq!(access[0].user_id().kind(), UserIdType::UserPrivs);
        assert_eq!(access[0].permissions(), [Permission::Read, Permission::Write]);
        assert_eq!(access[1].permissions(), [Permission::Read]);
        assert_eq!(access[2].user_id().name(), Some("other"));
        assert_eq!(access[2].permissions(), [Permission::NoAccess]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_linkage() {
        let dir = tempfile::tempdir().unwrap();
        let target = write_hello(dir.path());
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let file = file_from_path(&link, &HarvestConfig::default()).unwrap();
        assert_eq!(file.name(), "link");
        assert!(file.checksums().is_empty());

        let links = file.linkage();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].category(), LinkageCategory::SymbolicLink);
        assert_eq!(links[0].name(), "hello.txt");
        assert_eq!(links[0].path(), target.to_string_lossy());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_split_dev_linux() {
        assert_eq!(split_dev((8 << 8) | 1), Some((8, 1)));
        assert_eq!(split_dev((259 << 8) | 3), Some((259, 3)));
        // Minor numbers above 255 use the high bits
        assert_eq!(split_dev((4 << 8) | 0x2c | (0x100 << 12)), Some((4, 0x12c)));
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn test_split_dev_darwin() {
        assert_eq!(split_dev((1 << 24) | 4), Some((1, 4)));
        assert_eq!(split_dev((16 << 24) | 0x1_0002), Some((16, 0x1_0002)));
    }

    #[cfg(all(unix, not(any(target_os = "linux", target_os = "macos"))))]
    #[test]
    fn test_split_dev_unknown_layout() {
        assert_eq!(split_dev((8 << 8) | 1), None);
    }

    #[test]
    fn test_supported_algorithms() {
        assert!(is_supported(ChecksumAlgorithm::Sha2_512));
        assert!(!is_supported(ChecksumAlgorithm::Gost));
        for &a in SUPPORTED_ALGORITHMS {
            assert!(hasher_for(a).is_some());
        }
    }
}
