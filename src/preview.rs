//! Dry-run of an injection.
//!
//! Computes the renames and content changes an injection would perform
//! without writing anything. Unreadable files are skipped silently.

use crate::processor::Processor;
use crate::tree::Entry;
use crate::workers::scatter_gather;
use log::debug;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// A content line an injection would change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineChange {
    pub raw: String,
    pub rewritten: String,
    /// 1-based line number
    pub line: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preview {
    pub directories: BTreeMap<PathBuf, PathBuf>,
    pub files: BTreeMap<PathBuf, PathBuf>,
    pub contents: BTreeMap<PathBuf, Vec<LineChange>>,
}

impl Preview {
    pub fn content_change_count(&self) -> usize {
        self.contents.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.files.is_empty() && self.contents.is_empty()
    }
}

struct FilePreview {
    target: PathBuf,
    changes: Vec<LineChange>,
}

fn preview_file(processor: &Processor<'_>, entry: &Entry) -> Option<FilePreview> {
    let content = match fs::read_to_string(&entry.path) {
        Ok(content) => content,
        Err(e) => {
            debug!("Skipping {}: {}", entry.path.display(), e);
            return None;
        }
    };
    let changes = content
        .lines()
        .enumerate()
        .filter_map(|(index, raw)| {
            let rewritten = processor.substitute(raw);
            (rewritten != raw).then(|| LineChange { raw: raw.to_string(), rewritten, line: index + 1 })
        })
        .collect();
    Some(FilePreview { target: processor.substitute_path(&entry.relative), changes })
}

/// Previews the injection of `entries` with the processor's values.
///
/// Renamed paths are reported relative to the template root.
pub fn preview<I: IntoIterator<Item = Entry>>(processor: &Processor<'_>, entries: I) -> Preview {
    let (directories, files): (Vec<Entry>, Vec<Entry>) =
        entries.into_iter().partition(|entry| entry.is_dir());
    let mut preview = Preview::default();

    for directory in &directories {
        let target = processor.substitute_path(&directory.relative);
        if target != directory.relative {
            preview.directories.insert(directory.relative.clone(), target);
        }
    }

    let results = scatter_gather(&files, |file| preview_file(processor, file));
    for (file, result) in files.iter().zip(results) {
        let Some(FilePreview { target, changes }) = result.flatten() else {
            continue;
        };
        if target != file.relative {
            preview.files.insert(file.relative.clone(), target);
        }
        if !changes.is_empty() {
            preview.contents.insert(file.relative.clone(), changes);
        }
    }
    preview
}
