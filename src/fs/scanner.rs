//! Directory listing for the tree.
//!
//! A scan lists the immediate entries of one directory, drops hidden names
//! unless asked not to, and sorts directories first, then by case-insensitive
//! name. Scans never fail: an unreadable path looks like an empty directory.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::error::Result;

/// One immediate child of a scanned directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Filesystem access used by the tree controller.
///
/// Implementations are called from a blocking worker thread and must not touch
/// tree state.
pub trait DirScanner: Send + Sync + 'static {
    fn scan(&self, path: &Path, show_hidden: bool) -> Vec<ScanEntry>;
}

/// Scanner backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsScanner;

impl DirScanner for FsScanner {
    fn scan(&self, path: &Path, show_hidden: bool) -> Vec<ScanEntry> {
        scan(path, show_hidden)
    }
}

/// List, filter and sort the entries of `path`.
///
/// Errors are logged and degrade to an empty list.
pub fn scan(path: &Path, show_hidden: bool) -> Vec<ScanEntry> {
    match read_entries(path, show_hidden) {
        Ok(mut entries) => {
            sort_entries(&mut entries);
            debug!(path = %path.display(), count = entries.len(), "scanned directory");
            entries
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "scan failed, treating as empty");
            Vec::new()
        }
    }
}

fn read_entries(path: &Path, show_hidden: bool) -> Result<Vec<ScanEntry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(path)? {
        // Entries that vanish or can't be read mid-listing are skipped.
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        // The lossy name is for display only; identity comes from the raw path.
        let name = entry.file_name().to_string_lossy().to_string();
        if !show_hidden && is_hidden_name(&name) {
            continue;
        }
        let full_path = entry.path();
        // Follows symlinks, so a link to a directory is listed as a directory.
        let is_dir = full_path.is_dir();
        entries.push(ScanEntry {
            name,
            path: full_path,
            is_dir,
        });
    }
    Ok(entries)
}

/// Hidden-name convention: a leading dot.
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.')
}

/// Sort directories before files, then by case-insensitive name.
pub fn sort_entries(entries: &mut [ScanEntry]) {
    entries.sort_by(compare_entries);
}

fn compare_entries(a: &ScanEntry, b: &ScanEntry) -> Ordering {
    b.is_dir
        .cmp(&a.is_dir)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.name.cmp(&b.name))
}

/// Run a scan on the blocking pool so the caller's task never waits on I/O.
pub async fn scan_off_thread(
    scanner: Arc<dyn DirScanner>,
    path: PathBuf,
    show_hidden: bool,
) -> Vec<ScanEntry> {
    let shown = path.display().to_string();
    match tokio::task::spawn_blocking(move || scanner.scan(&path, show_hidden)).await {
        Ok(entries) => entries,
        Err(e) => {
            error!(path = %shown, error = %e, "scan task failed, treating as empty");
            Vec::new()
        }
    }
}
