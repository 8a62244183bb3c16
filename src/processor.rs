//! Template injection.
//!
//! Injection runs in two passes over the filtered tree. Directories are renamed
//! first, sequentially and in pre-order, so that every ancestor already carries
//! its final name when the file pass starts. Files are then rewritten
//! concurrently, each one resolving its location through the renamed ancestors.

use crate::config::VariableSpec;
use crate::error::{Error, Result};
use crate::pattern::{self, Values};
use crate::tree::Entry;
use crate::workers::scatter_gather;
use indexmap::IndexMap;
use log::debug;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of an injection.
#[derive(Debug, Default)]
pub struct InjectionReport {
    /// Directories renamed, in rename order
    pub directories: Vec<(PathBuf, PathBuf)>,
    /// Per-file result keyed by the original path: the written path or the failure
    pub files: BTreeMap<PathBuf, std::result::Result<PathBuf, String>>,
    /// Set when a directory could not be renamed; the file pass did not run
    pub aborted: Option<String>,
}

impl InjectionReport {
    /// True when no directory rename failed and every file was written.
    pub fn success(&self) -> bool {
        self.aborted.is_none() && self.files.values().all(|result| result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&PathBuf, &String)> {
        self.files.iter().filter_map(|(path, result)| result.as_ref().err().map(|e| (path, e)))
    }
}

/// Substitutes resolved values into the names and contents of a template tree.
pub struct Processor<'a> {
    root: &'a Path,
    variables: &'a IndexMap<String, VariableSpec>,
    values: &'a Values,
}

impl<'a> Processor<'a> {
    pub fn new(root: &'a Path, variables: &'a IndexMap<String, VariableSpec>, values: &'a Values) -> Self {
        Self { root, variables, values }
    }

    pub fn substitute(&self, text: &str) -> String {
        pattern::substitute(text, self.variables, self.values)
    }

    /// Substitutes every component of a root-relative path.
    pub fn substitute_path(&self, relative: &Path) -> PathBuf {
        relative
            .components()
            .map(|component| match component.as_os_str().to_str() {
                Some(name) => PathBuf::from(self.substitute(name)),
                None => PathBuf::from(component.as_os_str()),
            })
            .collect()
    }

    /// Current location of `entry` once all its ancestors have been renamed,
    /// together with the location it is renamed to.
    pub fn locate(&self, entry: &Entry) -> Result<(PathBuf, PathBuf)> {
        let parent = self.root.join(self.substitute_path(entry.relative.parent().unwrap_or(Path::new(""))));
        let name = entry.relative.file_name().ok_or_else(|| {
            Error::ProcessError(format!("'{}' has no name", entry.relative.display()))
        })?;
        let renamed = match name.to_str() {
            Some(name) => self.substitute(name),
            None => name.to_string_lossy().into_owned(),
        };
        if renamed.trim().is_empty() {
            return Err(Error::ProcessError(format!(
                "'{}' would be renamed to an empty name",
                entry.relative.display()
            )));
        }
        Ok((parent.join(name), parent.join(renamed)))
    }

    fn rename_directory(&self, entry: &Entry) -> Result<Option<(PathBuf, PathBuf)>> {
        let (current, target) = self.locate(entry)?;
        if current == target {
            return Ok(None);
        }
        if target.exists() {
            return Err(Error::ProcessError(format!("'{}' already exists", target.display())));
        }
        debug!("Renaming directory {} to {}", current.display(), target.display());
        fs::rename(&current, &target)?;
        Ok(Some((current, target)))
    }

    fn inject_file(&self, entry: &Entry) -> Result<PathBuf> {
        let (current, target) = self.locate(entry)?;
        if current != target && target.exists() {
            return Err(Error::ProcessError(format!("'{}' already exists", target.display())));
        }
        let content = fs::read_to_string(&current)?;
        fs::write(&target, self.substitute(&content))?;
        if current != target {
            if let Err(e) = fs::remove_file(&current) {
                debug!("Could not remove {}: {}", current.display(), e);
            }
        }
        debug!("Injected {}", target.display());
        Ok(target)
    }

    /// Injects every entry: directories first, then all files concurrently.
    ///
    /// A failed directory rename aborts the injection. File failures are
    /// recorded and do not stop sibling files.
    pub fn inject<I: IntoIterator<Item = Entry>>(&self, entries: I) -> InjectionReport {
        let (directories, files): (Vec<Entry>, Vec<Entry>) =
            entries.into_iter().partition(|entry| entry.is_dir());
        let mut report = InjectionReport::default();

        for directory in &directories {
            match self.rename_directory(directory) {
                Ok(Some(renamed)) => report.directories.push(renamed),
                Ok(None) => {}
                Err(e) => {
                    report.aborted = Some(format!("{}: {}", directory.relative.display(), e));
                    return report;
                }
            }
        }

        let results = scatter_gather(&files, |file| self.inject_file(file));
        for (file, result) in files.iter().zip(results) {
            let result = match result {
                Some(Ok(target)) => Ok(target),
                Some(Err(e)) => Err(e.to_string()),
                None => Err("injection task panicked".to_string()),
            };
            report.files.insert(file.path.clone(), result);
        }
        report
    }
}
