//! Enumeration of the entries of a template tree.
//!
//! Entries come out in pre-order: a directory is always yielded before anything
//! it contains, which is what lets the injector rename directories first and
//! resolve file paths against the renamed ancestors afterwards.

use crate::constants::CONFIG_FILES;
use crate::error::Result;
use crate::ignore::build_ignore_set;
use globset::GlobSet;
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

/// A file or directory of the template tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
    /// Path as found on disk
    pub path: PathBuf,
    /// Path relative to the template root
    pub relative: PathBuf,
    pub kind: EntryKind,
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Final component of the path, lossily decoded.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.file_name().to_str().map(|name| name.starts_with('.')).unwrap_or(false)
}

/// Walks a template root, honoring ignore patterns.
#[derive(Debug)]
pub struct TreeFilter {
    root: PathBuf,
    ignore: GlobSet,
    include_hidden: bool,
}

impl TreeFilter {
    /// Compiles `ignore_patterns` once for the whole command.
    pub fn new<P: AsRef<Path>, S: AsRef<str>>(
        root: P,
        ignore_patterns: &[S],
        include_hidden: bool,
    ) -> Result<Self> {
        Ok(Self {
            root: root.as_ref().to_path_buf(),
            ignore: build_ignore_set(ignore_patterns)?,
            include_hidden,
        })
    }

    fn is_ignored(&self, relative: &Path) -> bool {
        if relative.parent() == Some(Path::new(""))
            && CONFIG_FILES.iter().any(|file| relative == Path::new(file))
        {
            return true;
        }
        self.ignore.is_match(relative)
    }

    /// Lazily yields the entries below the root, directories before their content.
    ///
    /// Unreadable entries and symbolic links are skipped. The iterator reads the
    /// file system as it goes: callers that rename entries must collect it first.
    pub fn entries(&self) -> impl Iterator<Item = Entry> + '_ {
        let include_hidden = self.include_hidden;
        WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| include_hidden || !is_hidden(entry))
            .filter_map(move |entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        debug!("Skipping unreadable entry: {e}");
                        return None;
                    }
                };
                let kind = if entry.file_type().is_dir() {
                    EntryKind::Directory
                } else if entry.file_type().is_file() {
                    EntryKind::File
                } else {
                    debug!("Skipping {}: not a regular file", entry.path().display());
                    return None;
                };
                let relative = entry.path().strip_prefix(&self.root).ok()?.to_path_buf();
                if self.is_ignored(&relative) {
                    debug!("Ignoring {}", relative.display());
                    return None;
                }
                Some(Entry { path: entry.path().to_path_buf(), relative, kind })
            })
    }
}
