//! Error handling for replica.
//! Defines the error type and result alias used throughout the application.

use std::io;
use thiserror::Error;

/// Errors that abort a replica command.
///
/// Best-effort failures (a single unreadable file during lint or preview) and
/// partial failures (files that could not be injected or fixed) are not
/// errors: they are reported through the result types of the operation that
/// produced them.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// The configuration file could not be read or parsed
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// The configuration file does not conform to the schema
    #[error("Configuration '{config_path}' is invalid ({} issue(s)).", issues.len())]
    ConfigValidationError { config_path: String, issues: Vec<String> },

    /// The template directory is already initialized
    #[error("'{template_dir}' already contains a configuration file.")]
    ConfigAlreadyExistsError { template_dir: String },

    /// Template source could not be resolved or acquired
    #[error("Template error: {0}.")]
    TemplateError(String),

    /// The output directory exists and cloning into it would fail
    #[error("Output directory '{output_dir}' already exists.")]
    OutputDirectoryExistsError { output_dir: String },

    /// Represents all errors raised by libgit2
    #[error("Git error: {0}.")]
    Git2Error(#[from] git2::Error),

    /// Invalid ignore pattern
    #[error("Ignore pattern error: {0}.")]
    GlobError(#[from] globset::Error),

    /// Represents errors that occur during hook execution
    #[error("Hook execution error: {0}.")]
    HookError(String),

    /// Terminal interaction failed
    #[error("Prompt error: {0}.")]
    PromptError(#[from] dialoguer::Error),

    /// The alias wallet is missing or malformed
    #[error("Alias wallet error: {0}.")]
    AliasError(String),

    /// Lint, fix or clone finished but reported problems
    #[error("{0}")]
    ProcessError(String),
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
pub fn default_error_handler(err: Error) -> ! {
    log::error!("{err}");
    if let Error::ConfigValidationError { issues, .. } = &err {
        for issue in issues {
            log::error!("{issue}");
        }
    }
    std::process::exit(1);
}
