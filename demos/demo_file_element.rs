//! demo_file_element - Build an IDMEF File with children and print it.
//!
//! Shows the builder, the collaborator objects, and both writer modes.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example demo_file_element
//! ```

use chrono::DateTime;

use idmef_rs::document::Document;
use idmef_rs::objects::{
    Checksum, ChecksumAlgorithm, FileAccess, FileCategory, FileSystemType, IdmefElement, Inode,
    InodeNumber, Linkage, LinkageCategory, Permission, UserId, UserIdType,
};
use idmef_rs::writer::{self, IdmefWriter, WriterConfig};
use idmef_rs::File;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let modified = DateTime::parse_from_rfc3339("2024-01-15T10:30:00.123456Z")?;

    let root = UserId::new(UserIdType::UserPrivs, Some("root".to_string()), Some(0))?;
    let others = UserId::new(UserIdType::OtherPrivs, Some("other".to_string()), None)?;

    let file = File::builder("passwd", "/etc", FileCategory::Current)
        .ident("file-1")
        .fstype(FileSystemType::Ufs)
        .file_type("text/plain")
        .modify_time(modified)
        .data_size(1834)
        .disk_size(4096)
        .add_file_access(FileAccess::new(root, [Permission::Read, Permission::Write])?)
        .add_file_access(FileAccess::new(others, [Permission::Read])?)
        .add_linkage(Linkage::new(
            LinkageCategory::HardLink,
            "passwd.bak",
            "/etc/passwd.bak",
        )?)
        .inode(Inode::new().with_change_time(modified).with_number(InodeNumber {
            number: 131_074,
            major_device: 8,
            minor_device: 1,
        }))
        .add_checksum(Checksum::new(
            "d41d8cd98f00b204e9800998ecf8427e",
            ChecksumAlgorithm::Md5,
        )?)
        .add_checksum(Checksum::with_key("9f86d081", "k1", ChecksumAlgorithm::Sha2_256)?)
        .build()?;

    let elem = file.to_xml(&Document::new())?;

    println!("{}", writer::to_string(&elem)?);
    println!();

    let fragment = IdmefWriter::with_config(WriterConfig::compact().with_xml_declaration(false));
    println!("{}", fragment.write_to_string(&elem)?);

    Ok(())
}
