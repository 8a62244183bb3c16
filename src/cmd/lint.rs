//! `replica lint`: report, and optionally fix, placeholder mismatches.

use super::template_filter;
use crate::config::{find_config, ConfigFile};
use crate::error::{Error, Result};
use crate::fix::fix;
use crate::lint::{extract_tree, reconcile, Reference};
use crate::logger::success;
use crate::pattern::FixStrategy;
use colored::Colorize;
use log::{error, info, warn};
use std::path::Path;

/// One console line describing an undeclared reference.
pub fn describe(reference: &Reference, config_name: &str) -> String {
    let placeholder = format!("{{{{ {} }}}}", reference.name);
    let path = reference.source_path.display();
    if reference.is_file {
        format!("{path}: {placeholder} in file name but missing from {config_name}")
    } else if reference.is_directory {
        format!("{path}: {placeholder} in directory name but missing from {config_name}")
    } else {
        format!("{path} line {}: {placeholder} is missing from {config_name}", reference.line)
    }
}

fn print_issue<S: AsRef<str>>(line: S) {
    println!("{}", line.as_ref().yellow());
}

pub fn run(dir: &Path, strategy: Option<FixStrategy>) -> Result<()> {
    let Some(config_path) = find_config(dir) else {
        warn!("No configuration file found in '{}', nothing to lint", dir.display());
        return Ok(());
    };
    let mut config_file = ConfigFile::load(&config_path)?;
    let config_name = config_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let filter = template_filter(dir, &config_file.config)?;
    let report = reconcile(&extract_tree(filter.entries()), config_file.variables());

    if let Some(strategy) = strategy {
        let initial = report.issue_count();
        if initial == 0 {
            success(format!("No issue to fix in '{}'", dir.display()));
            return Ok(());
        }
        let unfixable = fix(&report.undeclared, &report.unreferenced, &mut config_file, strategy)?;
        success(format!("fixed {}/{} issue(s)", initial - unfixable.len(), initial));
        if !unfixable.is_empty() {
            error!("Could not fix {} issue(s):", unfixable.len());
            for issue in &unfixable {
                print_issue(format!("{}: {}", issue.issue.source_path.display(), issue.reason));
            }
            return Err(Error::ProcessError(format!("{} issue(s) left unfixed", unfixable.len())));
        }
        return Ok(());
    }

    if report.is_clean() {
        success(format!("{}: no errors found", config_path.display()));
        return Ok(());
    }

    if !report.undeclared.is_empty() {
        info!(
            "{} placeholder(s) in '{}' not declared in {}",
            report.undeclared.len(),
            dir.display(),
            config_name
        );
        for reference in &report.undeclared {
            print_issue(describe(reference, &config_name));
        }
    }
    if !report.unreferenced.is_empty() {
        info!(
            "{}: {} variable(s) declared but not used",
            config_path.display(),
            report.unreferenced.len()
        );
        for name in &report.unreferenced {
            print_issue(format!("- {name}"));
        }
    }
    info!("You can fix these issues with \"replica lint --fix escape|clear\"");
    Ok(())
}
