//! Typed failures for scanning and disposition.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong during a sweep.
///
/// Only `RootInvalid` and `QuarantineDirCreateFailed` abort a run; the
/// per-file and per-pair variants are collected and surfaced in the final
/// report while the sweep keeps going.
#[derive(Debug, Error)]
pub enum SweepError {
    /// The scan root is missing or not a directory. Checked before any
    /// walking starts.
    #[error("root {} does not exist or is not a directory", .path.display())]
    RootInvalid { path: PathBuf },

    /// A candidate file could not be stat'ed or read. The path is excluded
    /// from the index and from any duplicate pair.
    #[error("cannot access {}: {}", .path.display(), .source)]
    PathInaccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The quarantine holding directory could not be created. Nothing can be
    /// quarantined without it.
    #[error("cannot create quarantine directory {}: {}", .path.display(), .source)]
    QuarantineDirCreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Delete or move failed for one duplicate; the rest of the batch still
    /// runs.
    #[error("cannot dispose of {}: {}", .path.display(), .source)]
    DispositionFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
