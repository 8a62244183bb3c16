//! Command-line interface for replica.
//! Provides argument parsing and help text formatting using clap.

use crate::constants::WALLET_ENV;
use crate::pattern::FixStrategy;
use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments structure for replica.
#[derive(Parser, Debug)]
#[command(author, version, about = "replica: placeholder based project templates", long_about = None)]
pub struct Args {
    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Alias wallet file
    #[arg(long, global = true, env = WALLET_ENV, value_name = "FILE")]
    pub wallet: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a project from a template directory, git repository or alias
    Clone {
        /// Template path, git URL or alias
        #[arg(value_name = "TEMPLATE")]
        uri: String,

        /// Directory where the project will be created
        #[arg(value_name = "OUTPUT_DIR")]
        out_dir: Option<PathBuf>,

        /// Run hook steps without asking for confirmation
        #[arg(long = "unsafe")]
        unsafe_mode: bool,
    },

    /// Report undeclared placeholders and unused variables
    Lint {
        #[arg(value_name = "TEMPLATE_DIR", default_value = ".")]
        dir: PathBuf,

        /// Repair the reported issues
        #[arg(long, value_name = "STRATEGY")]
        fix: Option<FixStrategy>,
    },

    /// Show what an injection would change, without writing anything
    Preview {
        #[arg(value_name = "TEMPLATE_DIR", default_value = ".")]
        dir: PathBuf,
    },

    /// Write a starter configuration into a template directory
    Init {
        #[arg(value_name = "TEMPLATE_DIR", default_value = ".")]
        dir: PathBuf,
    },

    /// Manage template aliases
    Alias {
        #[command(subcommand)]
        action: AliasCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum AliasCommand {
    /// Register an alias for a template location
    Add { name: String, uri: String },

    /// Remove an alias
    Rm { name: String },

    /// List registered aliases
    List,

    /// Create an empty wallet
    Init,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 and the help text if no subcommand is given
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::MissingSubcommand
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            | ErrorKind::MissingRequiredArgument => {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            }
            _ => e.exit(),
        },
    }
}
