//! Variable reference extraction and reconciliation.
//!
//! Lint scans a template tree for placeholders and compares what the tree
//! references with what the configuration declares.

use crate::config::VariableSpec;
use crate::pattern;
use crate::tree::Entry;
use crate::workers::scatter_gather;
use indexmap::IndexMap;
use log::debug;
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

/// A placeholder found in the template tree.
///
/// `line` is 1-based for content references and 0 for name references.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reference {
    pub source_path: PathBuf,
    pub line: usize,
    pub name: String,
    pub is_directory: bool,
    pub is_file: bool,
}

impl Reference {
    pub fn in_content<P: Into<PathBuf>, S: Into<String>>(name: S, source_path: P, line: usize) -> Self {
        Self { source_path: source_path.into(), line, name: name.into(), is_directory: false, is_file: false }
    }

    pub fn in_file_name<P: Into<PathBuf>, S: Into<String>>(name: S, source_path: P) -> Self {
        Self { source_path: source_path.into(), line: 0, name: name.into(), is_directory: false, is_file: true }
    }

    pub fn in_directory_name<P: Into<PathBuf>, S: Into<String>>(name: S, source_path: P) -> Self {
        Self { source_path: source_path.into(), line: 0, name: name.into(), is_directory: true, is_file: false }
    }

    pub fn is_content(&self) -> bool {
        !self.is_directory && !self.is_file
    }
}

/// Undeclared references and unreferenced declarations of a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    pub undeclared: Vec<Reference>,
    pub unreferenced: Vec<String>,
}

impl LintReport {
    pub fn issue_count(&self) -> usize {
        self.undeclared.len() + self.unreferenced.len()
    }

    pub fn is_clean(&self) -> bool {
        self.issue_count() == 0
    }
}

fn extract_from_file(entry: &Entry) -> std::io::Result<BTreeSet<Reference>> {
    let content = fs::read_to_string(&entry.path)?;
    let mut references = BTreeSet::new();
    for (index, line) in content.lines().enumerate() {
        for name in pattern::extract(line) {
            references.insert(Reference::in_content(name, &entry.path, index + 1));
        }
    }
    for name in pattern::extract(&entry.name()) {
        references.insert(Reference::in_file_name(name, &entry.path));
    }
    Ok(references)
}

/// Placeholders referenced by one entry.
///
/// Directories contribute the placeholders of their name. Files contribute the
/// placeholders of every content line and of their name. A file that cannot
/// be read as UTF-8 text contributes nothing.
pub fn extract_from(entry: &Entry) -> BTreeSet<Reference> {
    if entry.is_dir() {
        return pattern::extract(&entry.name())
            .into_iter()
            .map(|name| Reference::in_directory_name(name, &entry.path))
            .collect();
    }
    match extract_from_file(entry) {
        Ok(references) => references,
        Err(e) => {
            debug!("Skipping {}: {}", entry.path.display(), e);
            BTreeSet::new()
        }
    }
}

/// Placeholders referenced anywhere in `entries`, files scanned concurrently.
pub fn extract_tree<I: IntoIterator<Item = Entry>>(entries: I) -> BTreeSet<Reference> {
    let (directories, files): (Vec<Entry>, Vec<Entry>) =
        entries.into_iter().partition(|entry| entry.is_dir());

    let mut references: BTreeSet<Reference> = directories.iter().flat_map(extract_from).collect();
    for found in scatter_gather(&files, extract_from).into_iter().flatten() {
        references.extend(found);
    }
    references
}

/// Classifies references against the declared variables.
///
/// `undeclared` keeps the reference order (path, line, name); `unreferenced`
/// keeps the declaration order.
pub fn reconcile(
    references: &BTreeSet<Reference>,
    variables: &IndexMap<String, VariableSpec>,
) -> LintReport {
    let mut table: IndexMap<&str, Vec<&Reference>> =
        variables.keys().map(|name| (name.as_str(), Vec::new())).collect();
    let mut undeclared = Vec::new();

    for reference in references {
        match table.get_mut(reference.name.as_str()) {
            Some(found) => found.push(reference),
            None => undeclared.push(reference.clone()),
        }
    }

    let unreferenced = table
        .into_iter()
        .filter(|(_, found)| found.is_empty())
        .map(|(name, _)| name.to_string())
        .collect();

    LintReport { undeclared, unreferenced }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VariableType;
    use crate::tree::{EntryKind, TreeFilter};
    use tempfile::TempDir;

    fn declared(names: &[&str]) -> IndexMap<String, VariableSpec> {
        names
            .iter()
            .map(|name| (name.to_string(), VariableSpec::new(*name, VariableType::String)))
            .collect()
    }

    fn file_entry(dir: &TempDir, relative: &str, content: &[u8]) -> Entry {
        let path = dir.path().join(relative);
        fs::write(&path, content).unwrap();
        Entry { path, relative: relative.into(), kind: EntryKind::File }
    }

    #[test]
    fn file_references_carry_line_numbers_and_name_flag() {
        let dir = TempDir::new().unwrap();
        let entry = file_entry(&dir, "{{ module }}.rs", b"fn {{ a }}() {}\n\n{{b}} {{a}}\n{{{{ c }}}}\n");
        let references = extract_from(&entry);

        let expected: BTreeSet<Reference> = [
            Reference::in_content("a", &entry.path, 1),
            Reference::in_content("b", &entry.path, 3),
            Reference::in_content("a", &entry.path, 3),
            Reference::in_file_name("module", &entry.path),
        ]
        .into_iter()
        .collect();
        assert_eq!(references, expected);
    }

    #[test]
    fn directory_references_come_from_the_name_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("{{ pkg }}");
        fs::create_dir(&path).unwrap();
        let entry = Entry { path: path.clone(), relative: "{{ pkg }}".into(), kind: EntryKind::Directory };

        let references = extract_from(&entry);
        assert_eq!(references.len(), 1);
        let reference = references.into_iter().next().unwrap();
        assert!(reference.is_directory);
        assert_eq!(reference.name, "pkg");
        assert_eq!(reference.line, 0);
    }

    #[test]
    fn unreadable_files_contribute_nothing() {
        let dir = TempDir::new().unwrap();
        let entry = file_entry(&dir, "binary.bin", &[0xff, 0xfe, b'{', b'{', b'x', b'}', b'}']);
        assert!(extract_from(&entry).is_empty());

        let missing = Entry {
            path: dir.path().join("gone"),
            relative: "gone".into(),
            kind: EntryKind::File,
        };
        assert!(extract_from(&missing).is_empty());
    }

    #[test]
    fn reconcile_splits_undeclared_and_unreferenced() {
        let references: BTreeSet<Reference> = [
            Reference::in_content("name", "a.txt", 1),
            Reference::in_content("ghost", "a.txt", 2),
            Reference::in_directory_name("ghost", "dir"),
        ]
        .into_iter()
        .collect();
        let report = reconcile(&references, &declared(&["name", "unused"]));

        assert_eq!(report.unreferenced, vec!["unused"]);
        assert_eq!(report.undeclared.len(), 2);
        assert!(report.undeclared.iter().all(|r| r.name == "ghost"));
        assert_eq!(report.issue_count(), 3);
    }

    #[test]
    fn reconcile_is_idempotent() {
        let references: BTreeSet<Reference> = [
            Reference::in_content("b", "x", 3),
            Reference::in_file_name("a", "y"),
        ]
        .into_iter()
        .collect();
        let variables = declared(&["a", "c"]);
        assert_eq!(reconcile(&references, &variables), reconcile(&references, &variables));
    }

    #[test]
    fn extract_tree_merges_every_entry() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("{{ d }}/sub")).unwrap();
        fs::write(dir.path().join("{{ d }}/sub/{{ f }}.txt"), "{{ c }}").unwrap();
        for i in 0..20 {
            fs::write(dir.path().join(format!("file{i}.txt")), format!("{{{{ v{i} }}}}")).unwrap();
        }

        let filter = TreeFilter::new(dir.path(), &[] as &[&str], true).unwrap();
        let references = extract_tree(filter.entries());
        let names: BTreeSet<_> = references.iter().map(|r| r.name.as_str()).collect();

        assert!(names.contains("d"));
        assert!(names.contains("f"));
        assert!(names.contains("c"));
        assert!((0..20).all(|i| names.contains(format!("v{i}").as_str())));
        assert_eq!(references.iter().filter(|r| r.is_directory).count(), 1);
    }
}
