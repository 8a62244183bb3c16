//! replica turns template directories into projects.
//! Templates mark variable parts of file names, directory names and file
//! contents with `{{ name }}` placeholders; replica clones a template,
//! asks for values and injects them, and lints templates for placeholders
//! that do not match the declared variables.

/// Alias wallet mapping short names to template locations
pub mod alias;

/// Command-line interface module for the replica application
pub mod cli;

/// Command implementations (clone, lint, preview, init, alias)
pub mod cmd;

/// Template configuration handling
/// Supports JSON and YAML formats (.replica, .replica.json, .replica.yml, .replica.yaml)
pub mod config;

pub mod constants;

/// Error types and handling for the replica application
pub mod error;

/// Automatic repair of lint issues
pub mod fix;

/// Git repository handling for generated projects
pub mod git;

/// Pre and post injection hooks
pub mod hooks;

/// Glob based ignore patterns
pub mod ignore;

/// Extraction of placeholder references and reconciliation with the configuration
pub mod lint;

/// Template acquisition from local directories and git repositories
pub mod loader;

pub mod logger;

/// Placeholder grammar: extraction, substitution and rewriting
pub mod pattern;

/// Dry-run of an injection
pub mod preview;

/// Template injection
/// Renames directories, then rewrites files concurrently
pub mod processor;

/// User input and interaction handling
pub mod prompt;

/// Filtered pre-order walk of a template tree
pub mod tree;

/// Scatter/gather over scoped threads
pub mod workers;
