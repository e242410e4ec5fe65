//! file_to_idmef - Walk a directory tree and print IDMEF File elements.
//!
//! This tool recursively walks a directory, collecting file metadata and
//! optionally computing checksums, then writes one namespace-qualified
//! IDMEF `File` element per path to stdout, all enclosed in a single
//! `IDMEF-Message` root.
//!
//! # Usage
//!
//! ```bash
//! file_to_idmef [OPTIONS] [PATH]
//! ```
//!
//! # Examples
//!
//! ```bash
//! # Walk current directory
//! file_to_idmef > files.xml
//!
//! # Walk /etc with 4 threads, SHA-1 and SHA-256 only
//! file_to_idmef -j 4 -a sha1 -a sha2-256 /etc
//!
//! # Skip checksums and record the files as their original state on NTFS
//! file_to_idmef --ignore-hashes --category original --fstype ntfs /mnt/evidence
//! ```

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use rayon::prelude::*;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use idmef_rs::document::Document;
use idmef_rs::harvest::{self, HarvestConfig};
use idmef_rs::objects::{ChecksumAlgorithm, FileCategory, FileSystemType, IdmefElement};
use idmef_rs::writer::{IdmefWriter, WriterConfig};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `version` attribute of the enclosing `IDMEF-Message`.
const IDMEF_VERSION: &str = "1.0";

/// Walk a directory tree and print IDMEF File elements.
#[derive(Parser, Debug)]
#[command(name = "file_to_idmef")]
#[command(version = VERSION)]
#[command(about = "Walk a directory tree and print IDMEF File elements")]
#[command(long_about = "Recursively walks a directory, collecting file metadata and \
    optionally computing checksums, then writes one IDMEF File element per path to stdout.")]
struct Args {
    /// Directory to walk (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Checksum algorithm to compute (can be specified multiple times)
    #[arg(short, long = "algorithm", value_name = "ALGORITHM")]
    algorithms: Vec<ChecksumAlgorithm>,

    /// Do not calculate any checksums
    #[arg(long)]
    ignore_hashes: bool,

    /// File category to record
    #[arg(long, default_value = "current")]
    category: FileCategory,

    /// File system type to record
    #[arg(long)]
    fstype: Option<FileSystemType>,

    /// Do not attach inode data
    #[arg(long)]
    no_inode: bool,

    /// Do not attach owner/group/other permissions
    #[arg(long)]
    no_access: bool,

    /// Number of file-processing threads to run
    #[arg(short, long, default_value = "1")]
    jobs: usize,

    /// Follow symbolic links when walking directories
    #[arg(long)]
    follow_links: bool,

    /// Output compact XML (no indentation)
    #[arg(long)]
    compact: bool,
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Assembles the harvest configuration from the command line.
fn harvest_config(args: &Args) -> Result<HarvestConfig, String> {
    if args.category == FileCategory::Unknown {
        return Err("category must not be 'unknown'".to_string());
    }

    let mut config = HarvestConfig {
        category: args.category,
        fstype: args.fstype,
        inode: !args.no_inode,
        access: !args.no_access,
        ..HarvestConfig::default()
    };

    if args.ignore_hashes {
        config.algorithms.clear();
    } else if !args.algorithms.is_empty() {
        if let Some(bad) = args.algorithms.iter().find(|a| !harvest::is_supported(**a)) {
            return Err(format!("cannot compute '{}' checksums", bad));
        }
        config.algorithms = args.algorithms.clone();
    }

    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.debug);

    debug!(path = ?args.path, jobs = args.jobs, "starting walk");

    // Validate jobs count
    if args.jobs == 0 {
        eprintln!("Error: jobs must be at least 1");
        std::process::exit(1);
    }

    let config = match harvest_config(&args) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            std::process::exit(1);
        }
    };
    debug!(?config, "harvest configuration");

    // Canonicalize base path
    let base_path = args.path.canonicalize().unwrap_or_else(|_| args.path.clone());

    // Collect all paths first
    let mut paths: Vec<PathBuf> = Vec::new();
    let walker = WalkDir::new(&base_path)
        .follow_links(args.follow_links)
        .sort_by_file_name();

    for entry in walker {
        match entry {
            Ok(e) => paths.push(e.path().to_path_buf()),
            Err(e) => warn!(error = %e, "error walking directory"),
        }
    }

    info!(count = paths.len(), "found paths");

    let harvest_one = |(i, path): (usize, &PathBuf)| {
        harvest::builder_from_path(path, &config)
            .and_then(|b| b.ident((i + 1).to_string()).build())
            .map_err(|e| warn!(path = %path.display(), error = %e, "skipping path"))
            .ok()
    };

    // Indexed parallel iterators keep walk order on collect
    let files: Vec<_> = if args.jobs > 1 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.jobs)
            .build_global()
            .ok();
        paths.par_iter().enumerate().map(harvest_one).collect()
    } else {
        paths.iter().enumerate().map(harvest_one).collect()
    };

    let doc = Document::new();
    let elements = files
        .into_iter()
        .flatten()
        .map(|f| f.to_xml(&doc))
        .collect::<idmef_rs::Result<Vec<_>>>()?;

    let config = if args.compact {
        WriterConfig::compact()
    } else {
        WriterConfig::default()
    };

    let mut message = doc.create_element("IDMEF-Message")?;
    message.set_attribute("version", IDMEF_VERSION);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    IdmefWriter::with_config(config).write_collection(&message, &elements, &mut handle)?;
    handle.write_all(b"\n")?;

    Ok(())
}
