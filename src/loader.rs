//! Template acquisition.
//! Copies a local template or clones a git repository into the output
//! directory, which then becomes the tree that gets injected.

use crate::error::{Error, Result};
use crate::git::remove_git_folder;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;
use walkdir::WalkDir;

/// Represents the source location of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Local filesystem template path
    FileSystem(PathBuf),
    /// Git repository URL (HTTPS, git or SSH)
    Git(String),
}

impl std::fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateSource::FileSystem(path) => write!(f, "local path: '{}'", path.display()),
            TemplateSource::Git(repo) => write!(f, "git repository: '{repo}'"),
        }
    }
}

impl TemplateSource {
    /// Classifies a template location. URLs with an `https`, `git` or `ssh`
    /// scheme and scp-like `git@host:path` strings are git sources, anything
    /// else is a local path.
    pub fn from_string(s: &str) -> Self {
        if let Ok(url) = Url::parse(s) {
            if matches!(url.scheme(), "https" | "http" | "git" | "ssh") {
                return Self::Git(s.to_string());
            }
        }
        if s.starts_with("git@") {
            return Self::Git(s.to_string());
        }
        Self::FileSystem(PathBuf::from(s))
    }

    /// Name a project gets when no output directory is given.
    pub fn default_project_name(&self) -> String {
        let raw = match self {
            TemplateSource::FileSystem(path) => fs::canonicalize(path)
                .unwrap_or_else(|_| path.clone())
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            TemplateSource::Git(repo) => repo
                .trim_end_matches('/')
                .rsplit(['/', ':'])
                .next()
                .unwrap_or_default()
                .trim_end_matches(".git")
                .to_string(),
        };
        if raw.is_empty() {
            "project".to_string()
        } else {
            raw
        }
    }

    /// Verifies that a local template exists. Git sources are checked by
    /// the clone itself.
    pub fn check_access(&self) -> Result<()> {
        match self {
            TemplateSource::FileSystem(path) if !path.is_dir() => {
                Err(Error::TemplateError(format!("'{}' is not a directory", path.display())))
            }
            _ => Ok(()),
        }
    }
}

/// Trait for loading templates from different sources.
pub trait TemplateLoader {
    /// Materializes the template into `destination`, which must not exist.
    fn load(&self, destination: &Path) -> Result<()>;
}

/// Loader for templates from the local filesystem.
pub struct LocalLoader<P: AsRef<Path>> {
    path: P,
}

impl<P: AsRef<Path>> LocalLoader<P> {
    pub fn new(path: P) -> Self {
        Self { path }
    }
}

impl<P: AsRef<Path>> TemplateLoader for LocalLoader<P> {
    /// Copies the template tree. Symbolic links are not followed.
    fn load(&self, destination: &Path) -> Result<()> {
        let source = self.path.as_ref();
        debug!("Copying '{}' to '{}'.", source.display(), destination.display());

        for entry in WalkDir::new(source).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::TemplateError(e.to_string()))?;
            let relative = entry
                .path()
                .strip_prefix(source)
                .map_err(|e| Error::TemplateError(e.to_string()))?;
            let target = destination.join(relative);
            let file_type = entry.file_type();
            if file_type.is_dir() {
                fs::create_dir_all(&target)?;
            } else if file_type.is_file() {
                fs::copy(entry.path(), &target)?;
            } else {
                debug!("Skipping '{}'.", entry.path().display());
            }
        }
        Ok(())
    }
}

/// Loader for templates from git repositories.
pub struct GitLoader<S: AsRef<str>> {
    repo: S,
}

impl<S: AsRef<str>> GitLoader<S> {
    pub fn new(repo: S) -> Self {
        Self { repo }
    }
}

impl<S: AsRef<str>> TemplateLoader for GitLoader<S> {
    fn load(&self, destination: &Path) -> Result<()> {
        let repo_url = self.repo.as_ref();
        debug!("Cloning repository '{}' to '{}'.", repo_url, destination.display());

        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, _allowed_types| {
            let username = username_from_url.unwrap_or("git");
            git2::Cred::ssh_key_from_agent(username).or_else(|_| {
                let home = dirs::home_dir()
                    .ok_or_else(|| git2::Error::from_str("cannot locate the home directory"))?;
                git2::Cred::ssh_key(username, None, &home.join(".ssh").join("id_rsa"), None)
            })
        });

        let mut fetch_opts = git2::FetchOptions::new();
        fetch_opts.remote_callbacks(callbacks);

        let mut builder = git2::build::RepoBuilder::new();
        builder.fetch_options(fetch_opts);
        builder.clone(repo_url, destination)?;
        Ok(())
    }
}

/// Fails when `output_dir` already exists.
pub fn ensure_output_dir<P: AsRef<Path>>(output_dir: P) -> Result<()> {
    let output_dir = output_dir.as_ref();
    if output_dir.exists() {
        return Err(Error::OutputDirectoryExistsError {
            output_dir: output_dir.display().to_string(),
        });
    }
    Ok(())
}

/// Materializes `source` into `destination`, without any git history.
///
/// # Errors
/// * `Error::OutputDirectoryExistsError` if `destination` exists
/// * `Error::TemplateError` if a local source is missing
/// * `Error::Git2Error` if the clone fails
pub fn load_template(source: &TemplateSource, destination: &Path) -> Result<()> {
    ensure_output_dir(destination)?;
    source.check_access()?;

    let loader: Box<dyn TemplateLoader> = match source {
        TemplateSource::Git(repo) => Box::new(GitLoader::new(repo.as_str())),
        TemplateSource::FileSystem(path) => Box::new(LocalLoader::new(path.as_path())),
    };
    loader.load(destination)?;
    remove_git_folder(destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_template_source_display() {
        let fs_source = TemplateSource::FileSystem(PathBuf::from("/path/to/template"));
        assert_eq!(format!("{fs_source}"), "local path: '/path/to/template'");

        let git_source = TemplateSource::Git("git@github.com:user/repo".to_string());
        assert_eq!(format!("{git_source}"), "git repository: 'git@github.com:user/repo'");
    }

    #[test]
    fn sources_are_classified() {
        assert!(matches!(TemplateSource::from_string("https://github.com/a/b.git"), TemplateSource::Git(_)));
        assert!(matches!(TemplateSource::from_string("ssh://git@host/a/b"), TemplateSource::Git(_)));
        assert!(matches!(TemplateSource::from_string("git@github.com:a/b.git"), TemplateSource::Git(_)));
        assert!(matches!(TemplateSource::from_string("./templates/rust"), TemplateSource::FileSystem(_)));
        assert!(matches!(TemplateSource::from_string("file:///tmp/x"), TemplateSource::FileSystem(_)));
    }

    #[test]
    fn project_names_come_from_the_last_component() {
        assert_eq!(TemplateSource::from_string("https://github.com/a/starter.git").default_project_name(), "starter");
        assert_eq!(TemplateSource::from_string("git@github.com:a/web").default_project_name(), "web");
        assert_eq!(TemplateSource::from_string("/no/such/tpl").default_project_name(), "tpl");
    }

    #[test]
    fn local_templates_are_copied() {
        let source = TempDir::new().unwrap();
        fs::create_dir_all(source.path().join("a/b")).unwrap();
        fs::write(source.path().join("a/b/c.txt"), "c").unwrap();
        fs::write(source.path().join(".hidden"), "h").unwrap();
        let target = TempDir::new().unwrap();
        let destination = target.path().join("out");

        load_template(&TemplateSource::FileSystem(source.path().to_path_buf()), &destination).unwrap();
        assert!(!dir_diff::is_different(source.path(), &destination).unwrap());
    }

    #[test]
    fn existing_destinations_and_missing_sources_are_refused() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        let local = TemplateSource::FileSystem(source.path().to_path_buf());

        assert!(matches!(
            load_template(&local, target.path()),
            Err(Error::OutputDirectoryExistsError { .. })
        ));
        let missing = TemplateSource::FileSystem(source.path().join("missing"));
        assert!(matches!(
            load_template(&missing, &target.path().join("out")),
            Err(Error::TemplateError(_))
        ));
    }
}
