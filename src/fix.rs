//! Automatic repair of lint issues.
//!
//! Undeclared placeholders are escaped or cleared in file contents, file names
//! and directory names; unreferenced variables are pruned from the
//! configuration. Anything that cannot be repaired safely is reported back as
//! an [`UnfixableIssue`] and left untouched.

use crate::config::{ConfigFile, VariableSpec};
use crate::error::Result;
use crate::lint::Reference;
use crate::pattern::{rewrite, FixStrategy};
use crate::workers::scatter_gather;
use indexmap::IndexMap;
use log::debug;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// A lint issue the fixer could not repair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnfixableIssue {
    pub issue: Reference,
    pub reason: String,
}

type Buckets<'r> = BTreeMap<&'r Path, Vec<&'r Reference>>;

fn unfixable(references: &[&Reference], reason: &str) -> Vec<UnfixableIssue> {
    references
        .iter()
        .map(|reference| UnfixableIssue { issue: (*reference).clone(), reason: reason.to_string() })
        .collect()
}

fn repair_content(path: &Path, variables: &IndexMap<String, VariableSpec>, strategy: FixStrategy) -> std::io::Result<()> {
    let content = fs::read_to_string(path)?;
    let repaired = rewrite(&content, variables, strategy);
    if repaired != content {
        debug!("Repairing content of {}", path.display());
        fs::write(path, repaired)?;
    }
    Ok(())
}

/// Renames `path` to its repaired name, refusing to overwrite anything.
fn repair_name(
    path: &Path,
    variables: &IndexMap<String, VariableSpec>,
    strategy: FixStrategy,
) -> std::result::Result<(), String> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| "name is not valid UTF-8".to_string())?;
    let repaired = rewrite(name, variables, strategy);
    if repaired.trim().is_empty() {
        return Err(format!("'{name}' would be renamed to an empty name"));
    }
    let target = path.with_file_name(&repaired);
    if target == path {
        return Ok(());
    }
    if target.exists() {
        return Err(format!("cannot rename to '{}': destination already exists", target.display()));
    }
    debug!("Renaming {} to {}", path.display(), target.display());
    fs::rename(path, &target).map_err(|e| format!("cannot rename to '{}': {}", target.display(), e))
}

/// Repairs undeclared references and prunes unreferenced variables.
///
/// Contents are repaired first (concurrently), then file names, then
/// directory names deepest first, so that no rename invalidates a path that
/// still has to be repaired. The configuration is saved only when at least
/// one variable was actually removed.
///
/// # Returns
/// * `Result<Vec<UnfixableIssue>>` - Issues left unrepaired, with the reason
///
/// # Errors
/// * Any error raised while saving the configuration
pub fn fix(
    undeclared: &[Reference],
    unreferenced: &[String],
    config_file: &mut ConfigFile,
    strategy: FixStrategy,
) -> Result<Vec<UnfixableIssue>> {
    let mut content_issues: Buckets = BTreeMap::new();
    let mut file_issues: Buckets = BTreeMap::new();
    let mut directory_issues: Buckets = BTreeMap::new();
    for reference in undeclared {
        let bucket = if reference.is_directory {
            &mut directory_issues
        } else if reference.is_file {
            &mut file_issues
        } else {
            &mut content_issues
        };
        bucket.entry(reference.source_path.as_path()).or_default().push(reference);
    }

    let variables = config_file.variables().clone();
    let mut unfixable_issues = Vec::new();

    let files: Vec<(&Path, Vec<&Reference>)> = content_issues.into_iter().collect();
    let results = scatter_gather(&files, |(path, _)| repair_content(path, &variables, strategy));
    for ((_, references), result) in files.iter().zip(results) {
        match result {
            Some(Ok(())) => {}
            Some(Err(e)) => unfixable_issues.extend(unfixable(references, &e.to_string())),
            None => unfixable_issues.extend(unfixable(references, "content repair panicked")),
        }
    }

    for (path, references) in &file_issues {
        if let Err(reason) = repair_name(path, &variables, strategy) {
            unfixable_issues.extend(unfixable(references, &reason));
        }
    }

    let mut directories: Vec<(&Path, Vec<&Reference>)> = directory_issues.into_iter().collect();
    directories.sort_by_key(|(path, _)| std::cmp::Reverse(path.components().count()));
    for (path, references) in &directories {
        if let Err(reason) = repair_name(path, &variables, strategy) {
            unfixable_issues.extend(unfixable(references, &reason));
        }
    }

    if config_file.remove_variables(unreferenced) > 0 {
        debug!("Pruned unreferenced variables from {}", config_file.path.display());
        config_file.save()?;
    }

    Ok(unfixable_issues)
}
