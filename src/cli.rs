//! CLI option parsing with clap for dupesweep.

use bytesize::ByteSize;
use clap::Parser;
use std::path::PathBuf;

use crate::disposition::{Action, CollisionPolicy};
use crate::fingerprint::HashAlgorithm;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Find duplicate files and report, delete, or quarantine the copies"
)]
pub struct Opts {
    /// Root directory to scan
    pub root: PathBuf,

    /// What to do with each duplicate (the first file seen with a given
    /// content is kept untouched)
    #[arg(long, value_enum, default_value = "report")]
    pub action: Action,

    /// Digest used for content fingerprints
    #[arg(long, value_enum, default_value = "blake3")]
    pub algo: HashAlgorithm,

    /// Read granularity while fingerprinting (e.g. 256KB, 4MB)
    #[arg(long, default_value = "1MB")]
    pub chunk_size: ByteSize,

    /// Where the quarantine holding directory gets created
    #[arg(long, default_value = ".")]
    pub quarantine_into: PathBuf,

    /// What to do when a quarantined file's name is already taken
    #[arg(long, value_enum, default_value = "reject")]
    pub on_collision: CollisionPolicy,

    /// Follow symlinks instead of treating them as opaque
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories
    #[arg(long)]
    pub skip_hidden: bool,

    /// Minimum file size to consider (e.g. 1KB); 0 scans everything
    #[arg(long, default_value = "0B")]
    pub min_size: ByteSize,

    /// Output machine-readable JSON instead of human text
    #[arg(long)]
    pub json: bool,

    /// Quiet human output: suppress per-pair listings and print only the
    /// final summary
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Allow delete/quarantine to modify the filesystem
    #[arg(long, short = 'y')]
    pub yes: bool,
}
