//! Command implementations.
//! Each command loads what it needs, calls into the engine modules and
//! reports to the console.

use crate::alias::default_wallet_path;
use crate::cli::{Args, Commands};
use crate::config::Config;
use crate::constants::DEFAULT_IGNORE_PATTERNS;
use crate::error::Result;
use crate::hooks::ShellExecutor;
use crate::prompt::DialoguerPrompter;
use crate::tree::TreeFilter;
use std::path::Path;

pub mod alias;
pub mod clone;
pub mod init;
pub mod lint;
pub mod preview;

/// Dispatches parsed arguments to their command.
pub fn run(args: Args) -> Result<()> {
    let prompt = DialoguerPrompter::new();
    let wallet = args.wallet.unwrap_or_else(default_wallet_path);

    match args.command {
        Commands::Clone { uri, out_dir, unsafe_mode } => {
            let options = clone::CloneOptions { uri, out_dir, unsafe_mode, wallet };
            clone::run(&options, &prompt, &ShellExecutor)
        }
        Commands::Lint { dir, fix } => lint::run(&dir, fix),
        Commands::Preview { dir } => preview::run(&dir, &prompt),
        Commands::Init { dir } => init::run(&dir),
        Commands::Alias { action } => alias::run(action, &wallet),
    }
}

/// Filter over a template tree: the configured ignore patterns plus the git
/// directory, hidden files included.
pub fn template_filter(dir: &Path, config: &Config) -> Result<TreeFilter> {
    let mut ignore_patterns: Vec<&str> = DEFAULT_IGNORE_PATTERNS.to_vec();
    ignore_patterns.extend(config.template.ignore_patterns.iter().map(String::as_str));
    TreeFilter::new(dir, &ignore_patterns, true)
}
