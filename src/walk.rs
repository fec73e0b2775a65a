//! Lazy traversal of a directory tree, yielding regular files.

use ignore::{DirEntry, WalkBuilder};
use std::path::{Path, PathBuf};

/// Filters applied during the walk. The defaults admit every regular file,
/// hidden ones included; symlinks are treated as opaque unless following is
/// switched on.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkOptions {
    pub follow_symlinks: bool,
    pub skip_hidden: bool,
    pub min_size: u64,
}

/// Walks `root` depth-first, yielding paths to regular files lazily.
///
/// Entries are sorted by file name within each directory, so the order is
/// stable for a fixed tree. Directories and files that cannot be read are
/// warned about and skipped; nothing here is fatal.
pub fn walk(root: &Path, opts: WalkOptions) -> impl Iterator<Item = PathBuf> {
    let mut wb = WalkBuilder::new(root);
    wb.standard_filters(false);
    wb.hidden(opts.skip_hidden);
    wb.follow_links(opts.follow_symlinks);
    wb.sort_by_file_name(|a, b| a.cmp(b));

    wb.build().filter_map(move |res| {
        let ent = match res {
            Ok(e) => e,
            Err(e) => {
                log::warn!("skipping unreadable entry: {e}");
                return None;
            }
        };
        if !is_regular_file(&ent) {
            return None;
        }
        if opts.min_size > 0 {
            match ent.metadata() {
                Ok(m) if m.len() < opts.min_size => return None,
                Ok(_) => {}
                Err(e) => {
                    log::warn!("metadata failed for {}: {e}", ent.path().display());
                    return None;
                }
            }
        }
        Some(ent.into_path())
    })
}

fn is_regular_file(ent: &DirEntry) -> bool {
    ent.file_type().map(|ft| ft.is_file()).unwrap_or(false)
}
