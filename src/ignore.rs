//! Ignore pattern handling for replica templates.
//! Compiles the `template.ignorePatterns` globs of the configuration into a
//! single set matched against template-relative paths.

use crate::error::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;

/// Compiles ignore patterns into a set of glob matchers.
///
/// # Arguments
/// * `patterns` - Glob patterns, e.g. `.git`, `.git/**`, `**/*.pyc`
///
/// # Errors
/// * `Error::GlobError` if a pattern is not a valid glob
///
/// # Example
/// ```
/// let set = replica::ignore::build_ignore_set(&[".git", ".git/**"]).unwrap();
/// assert!(set.is_match(".git/config"));
/// assert!(!set.is_match("src/main.rs"));
/// ```
pub fn build_ignore_set<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.as_ref().trim();
        if pattern.is_empty() {
            continue;
        }
        debug!("Ignoring '{pattern}'");
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
