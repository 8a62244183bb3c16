//! `replica clone`: acquire a template and turn it into a project.

use super::template_filter;
use crate::alias;
use crate::config::{ConfigFile, HookPhase};
use crate::error::{Error, Result};
use crate::git::init_repository;
use crate::hooks::{HookContext, StepExecutor};
use crate::loader::{load_template, TemplateSource};
use crate::logger::success;
use crate::processor::Processor;
use crate::prompt::{resolve_values, Prompter};
use log::{error, info, warn};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct CloneOptions {
    /// Template path, git URL or alias
    pub uri: String,
    pub out_dir: Option<PathBuf>,
    pub unsafe_mode: bool,
    pub wallet: PathBuf,
}

/// Clones a template into a new project directory.
///
/// # Flow
/// 1. Resolves aliases and copies or clones the template
/// 2. Loads the configuration and removes it from the project
/// 3. Re-initializes git when enabled
/// 4. Collects values for the declared variables
/// 5. Runs `pre_template_injection` hooks
/// 6. Injects the values into the tree, files that cannot be injected are
///    logged and left untouched
/// 7. Runs `post_template_injection` hooks, unless the pre phase failed
pub fn run(options: &CloneOptions, prompt: &dyn Prompter, executor: &dyn StepExecutor) -> Result<()> {
    let uri = alias::resolve(&options.wallet, &options.uri)?;
    if uri != options.uri {
        info!("{} has been resolved to {}", options.uri, uri);
    }

    let source = TemplateSource::from_string(&uri);
    info!("Checking access to {source}");
    source.check_access()?;

    let project_dir = options
        .out_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(source.default_project_name()));
    info!("Cloning {} in '{}'", uri, project_dir.display());
    load_template(&source, &project_dir)?;
    success(format!("{uri} cloned"));

    let Some(config_file) = ConfigFile::discover(&project_dir)? else {
        warn!("No configuration file found in '{}', nothing more to do", project_dir.display());
        return Ok(());
    };
    fs::remove_file(&config_file.path)?;
    let config = &config_file.config;

    if config.git.enabled {
        info!(
            "Initializing a git repository in '{}' with main_branch={}",
            project_dir.display(),
            config.git.main_branch
        );
        let remote = prompt.ask_text("remote origin <skip empty>".to_string(), false)?;
        init_repository(&project_dir, &config.git.main_branch, remote.as_deref())?;
    }

    info!("Collecting user input(s)");
    let variables = config_file.variables();
    let values = resolve_values(prompt, variables)?;

    let hooks = HookContext { prompt, executor, unsafe_mode: options.unsafe_mode };
    let pre_hooks_ok = hooks.run_phase(
        &project_dir,
        &config.hooks_for(HookPhase::PreInjection),
        HookPhase::PreInjection,
        variables,
        &values,
    );
    if pre_hooks_ok {
        info!("Generating '{}'", project_dir.display());
    } else {
        warn!(
            "\"{}\" hooks failed, the project is still generated but \"{}\" hooks are skipped",
            HookPhase::PreInjection,
            HookPhase::PostInjection
        );
    }

    let filter = template_filter(&project_dir, config)?;
    let report = Processor::new(&project_dir, variables, &values).inject(filter.entries());

    if let Some(reason) = &report.aborted {
        return Err(Error::ProcessError(format!("Injection aborted: {reason}")));
    }
    if report.success() {
        success(format!("'{}' generated", project_dir.display()));
    } else {
        for (path, reason) in report.failures() {
            error!("{}: {}", path.display(), reason);
        }
        warn!(
            "'{}' generated, {} file(s) were left as is",
            project_dir.display(),
            report.failures().count()
        );
    }

    if !pre_hooks_ok {
        return Err(Error::HookError(format!("\"{}\" hooks failed", HookPhase::PreInjection)));
    }
    let post_hooks_ok = hooks.run_phase(
        &project_dir,
        &config.hooks_for(HookPhase::PostInjection),
        HookPhase::PostInjection,
        variables,
        &values,
    );
    if !post_hooks_ok {
        return Err(Error::HookError(format!("\"{}\" hooks failed", HookPhase::PostInjection)));
    }
    Ok(())
}
