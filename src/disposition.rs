//! Side-effectful handling of detected duplicates: delete in place or move
//! into a per-run quarantine directory. Only ever touches the duplicate side
//! of a pair.

use chrono::Local;
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::detect::DuplicatePair;
use crate::error::SweepError;

/// What to do with each duplicate. `Report` leaves the filesystem alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Action {
    Report,
    Delete,
    Quarantine,
}

/// Behavior when a quarantined file's base name is already taken inside the
/// holding directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CollisionPolicy {
    Reject,
    Rename,
}

/// Per-pair outcome of a mutating action.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    /// The duplicate was gone by the time we got to it.
    Skipped,
    Failed {
        reason: String,
    },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Applied => write!(f, "applied"),
            Outcome::Skipped => write!(f, "skipped (already gone)"),
            Outcome::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DispositionRecord {
    pub duplicate: PathBuf,
    pub outcome: Outcome,
}

/// Tallies over one disposition run.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct ActionStats {
    pub applied: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ActionStats {
    pub fn from_records(records: &[DispositionRecord]) -> Self {
        let mut stats = Self::default();
        for r in records {
            match r.outcome {
                Outcome::Applied => stats.applied += 1,
                Outcome::Skipped => stats.skipped += 1,
                Outcome::Failed { .. } => stats.failed += 1,
            }
        }
        stats
    }
}

/// Applies one policy to a batch of pairs. The quarantine holding directory
/// is created lazily on the first pair that needs it and reused for the rest
/// of the run.
pub struct DispositionEngine {
    action: Action,
    quarantine_base: PathBuf,
    on_collision: CollisionPolicy,
    holding_dir: Option<PathBuf>,
}

impl DispositionEngine {
    pub fn new(action: Action, quarantine_base: PathBuf, on_collision: CollisionPolicy) -> Self {
        Self {
            action,
            quarantine_base,
            on_collision,
            holding_dir: None,
        }
    }

    /// Apply the policy to every pair in order. Per-pair failures are
    /// recorded and the batch keeps going; the only fatal error is failing
    /// to create the quarantine directory, without which quarantine mode
    /// cannot do anything at all.
    pub fn apply(&mut self, pairs: &[DuplicatePair]) -> Result<Vec<DispositionRecord>, SweepError> {
        let mut records = Vec::with_capacity(pairs.len());
        if self.action == Action::Report {
            return Ok(records);
        }
        for pair in pairs {
            let outcome = match self.action {
                Action::Report => unreachable!(),
                Action::Delete => self.delete(&pair.duplicate),
                Action::Quarantine => self.quarantine(&pair.duplicate)?,
            };
            records.push(DispositionRecord {
                duplicate: pair.duplicate.clone(),
                outcome,
            });
        }
        Ok(records)
    }

    fn delete(&self, duplicate: &Path) -> Outcome {
        match fs::remove_file(duplicate) {
            Ok(()) => Outcome::Applied,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Outcome::Skipped,
            Err(source) => failed(duplicate, source),
        }
    }

    fn quarantine(&mut self, duplicate: &Path) -> Result<Outcome, SweepError> {
        if fs::symlink_metadata(duplicate).is_err() {
            return Ok(Outcome::Skipped);
        }
        let dir = self.ensure_holding_dir()?;
        let dest = match self.destination(&dir, duplicate) {
            Ok(d) => d,
            Err(reason) => return Ok(Outcome::Failed { reason }),
        };
        Ok(match move_file(duplicate, &dest) {
            Ok(()) => Outcome::Applied,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Outcome::Skipped,
            Err(source) => failed(duplicate, source),
        })
    }

    /// Create (once) and return the holding directory for this run. The name
    /// carries the start time to millisecond resolution plus the process id;
    /// a numeric suffix disambiguates if that still collides.
    fn ensure_holding_dir(&mut self) -> Result<PathBuf, SweepError> {
        if let Some(dir) = &self.holding_dir {
            return Ok(dir.clone());
        }
        fs::create_dir_all(&self.quarantine_base).map_err(|source| {
            SweepError::QuarantineDirCreateFailed {
                path: self.quarantine_base.clone(),
                source,
            }
        })?;
        let token = format!(
            "duplicates_{}_{}",
            Local::now().format("%Y%m%d_%H%M%S_%3f"),
            std::process::id()
        );
        let mut dir = self.quarantine_base.join(&token);
        let mut n = 0u32;
        loop {
            match fs::create_dir(&dir) {
                Ok(()) => break,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    n += 1;
                    dir = self.quarantine_base.join(format!("{token}-{n}"));
                }
                Err(source) => {
                    return Err(SweepError::QuarantineDirCreateFailed { path: dir, source })
                }
            }
        }
        log::info!("quarantine directory: {}", dir.display());
        self.holding_dir = Some(dir.clone());
        Ok(dir)
    }

    /// Where `duplicate` should land inside the holding directory. Keeps the
    /// original base name; on a name collision, either rejects or probes for
    /// a free `.N` suffix per the configured policy.
    fn destination(&self, dir: &Path, duplicate: &Path) -> Result<PathBuf, String> {
        let name = duplicate
            .file_name()
            .ok_or_else(|| format!("{} has no file name", duplicate.display()))?;
        let dest = dir.join(name);
        if !dest.exists() {
            return Ok(dest);
        }
        match self.on_collision {
            CollisionPolicy::Reject => Err(format!(
                "{} already exists in quarantine",
                dest.display()
            )),
            CollisionPolicy::Rename => {
                for n in 1u32..10_000 {
                    let candidate = dir.join(format!("{}.{}", name.to_string_lossy(), n));
                    if !candidate.exists() {
                        return Ok(candidate);
                    }
                }
                Err(format!(
                    "no free name for {} in quarantine",
                    dest.display()
                ))
            }
        }
    }
}

fn failed(duplicate: &Path, source: io::Error) -> Outcome {
    let err = SweepError::DispositionFailed {
        path: duplicate.to_path_buf(),
        source,
    };
    log::warn!("{err}");
    Outcome::Failed {
        reason: err.to_string(),
    }
}

/// Rename, falling back to a guarded copy-then-remove across filesystems.
/// A failed copy cleans up the destination and leaves the source untouched,
/// so the duplicate is never left half-moved.
fn move_file(src: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => match fs::copy(src, dest) {
            Ok(_) => {
                File::open(dest)?.sync_all()?;
                fs::remove_file(src)
            }
            Err(copy_err) => {
                let _ = fs::remove_file(dest);
                Err(copy_err)
            }
        },
        Err(e) => Err(e),
    }
}
