//! Git repository handling for generated projects.

use crate::error::Result;
use git2::{Repository, RepositoryInitOptions};
use log::debug;
use std::fs;
use std::path::Path;

/// Removes the `.git` directory of `dir`, if any.
pub fn remove_git_folder<P: AsRef<Path>>(dir: P) -> Result<()> {
    let git_dir = dir.as_ref().join(".git");
    if git_dir.is_dir() {
        debug!("Removing '{}'.", git_dir.display());
        fs::remove_dir_all(&git_dir)?;
    }
    Ok(())
}

/// Initializes a fresh repository in `dir` on `main_branch`, optionally
/// pointing `origin` at `remote`.
pub fn init_repository<P: AsRef<Path>>(dir: P, main_branch: &str, remote: Option<&str>) -> Result<Repository> {
    let dir = dir.as_ref();
    let mut options = RepositoryInitOptions::new();
    options.initial_head(main_branch);

    let repo = Repository::init_opts(dir, &options)?;
    debug!("Initialized repository in '{}' on '{}'.", dir.display(), main_branch);

    if let Some(url) = remote {
        repo.remote("origin", url)?;
        debug!("Added remote 'origin' -> '{url}'.");
    }
    Ok(repo)
}
